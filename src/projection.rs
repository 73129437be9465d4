//! Argument projection
//!
//! Maps a dense hidden state to the constructor arguments of a parametric
//! distribution: one independent affine transform per named argument,
//! followed by a domain map that bounds the raw outputs.
//!
//! ## Tensor Shapes
//!
//! | Tensor | Shape | Description |
//! |--------|-------|-------------|
//! | `x` | `[batch..., d_input]` | Hidden features, any leading rank |
//! | raw argument `i` | `[batch..., w_i]` | Output of projection `i` |
//! | mapped argument `i` | domain map dependent | Usually `[batch..., w_i]` |

use crate::error::Error;
use burn::config::Config;
use burn::module::{Ignored, Module};
use burn::nn::{Linear, LinearConfig};
use burn::tensor::backend::Backend;
use burn::tensor::Tensor;
use serde::{Deserialize, Serialize};

/// Ordered mapping from argument name to projection width
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ArgsDim {
    entries: Vec<(String, usize)>,
}

impl ArgsDim {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an argument; later arguments are projected after earlier ones
    pub fn with(mut self, name: impl Into<String>, width: usize) -> Self {
        self.entries.push((name.into(), width));
        self
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Width of a named argument
    pub fn width(&self, name: &str) -> Option<usize> {
        self.entries
            .iter()
            .find(|(n, _)| n == name)
            .map(|&(_, w)| w)
    }

    /// Argument names in projection order
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(n, _)| n.as_str())
    }

    /// Argument widths in projection order
    pub fn widths(&self) -> impl Iterator<Item = usize> + '_ {
        self.entries.iter().map(|&(_, w)| w)
    }

    /// Sum of all widths
    pub fn total_width(&self) -> usize {
        self.widths().sum()
    }

    fn validate(&self) -> crate::Result<()> {
        if self.entries.is_empty() {
            return Err(Error::InvalidArgsDim("no arguments declared".to_string()));
        }
        if let Some((name, _)) = self.entries.iter().find(|&&(_, w)| w == 0) {
            return Err(Error::InvalidArgsDim(format!(
                "argument `{}` has zero width",
                name
            )));
        }
        Ok(())
    }
}

impl<S: Into<String>> FromIterator<(S, usize)> for ArgsDim {
    fn from_iter<I: IntoIterator<Item = (S, usize)>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().map(|(n, w)| (n.into(), w)).collect(),
        }
    }
}

/// Converts unbounded projected tensors into valid distribution parameters.
///
/// Implementations must be pure and must return as many tensors as the
/// projection produced, in the same order. A domain map is stored inside
/// [`ArgProj`], so it is also a (usually parameter-free) [`Module`].
pub trait DomainMap<B: Backend>: Module<B> {
    fn domain_map<const D: usize>(
        &self,
        args: Vec<Tensor<B, D>>,
    ) -> crate::Result<Vec<Tensor<B, D>>>;
}

/// Pass-through domain map
#[derive(Module, Debug, Clone, Copy, Default)]
pub struct IdentityDomainMap;

impl<B: Backend> DomainMap<B> for IdentityDomainMap {
    fn domain_map<const D: usize>(
        &self,
        args: Vec<Tensor<B, D>>,
    ) -> crate::Result<Vec<Tensor<B, D>>> {
        Ok(args)
    }
}

/// Configuration for [`ArgProj`]
#[derive(Config, Debug)]
pub struct ArgProjConfig {
    /// Width of the hidden features fed to the projection
    pub d_input: usize,
    /// Named output widths
    pub args_dim: ArgsDim,
    /// Whether each affine transform carries a bias
    #[config(default = true)]
    pub bias: bool,
}

impl ArgProjConfig {
    /// Initialize one projection per argument on `device`
    pub fn init<B: Backend, M: DomainMap<B>>(
        &self,
        domain_map: M,
        device: &B::Device,
    ) -> crate::Result<ArgProj<B, M>> {
        self.args_dim.validate()?;

        let layers = self
            .args_dim
            .widths()
            .map(|width| {
                LinearConfig::new(self.d_input, width)
                    .with_bias(self.bias)
                    .init(device)
            })
            .collect();

        tracing::debug!(
            d_input = self.d_input,
            args = self.args_dim.len(),
            total_width = self.args_dim.total_width(),
            "initialized argument projection"
        );

        Ok(ArgProj {
            layers,
            args_dim: Ignored(self.args_dim.clone()),
            d_input: self.d_input,
            domain_map,
        })
    }
}

/// Projects hidden features onto distribution arguments
///
/// # Type Parameters
/// * `B` - The backend type
/// * `M` - The domain map applied after projection
#[derive(Module, Debug)]
pub struct ArgProj<B: Backend, M: Module<B>> {
    layers: Vec<Linear<B>>, // One per argument, in ArgsDim order
    args_dim: Ignored<ArgsDim>,
    d_input: usize,
    domain_map: M,
}

impl<B: Backend, M: DomainMap<B>> ArgProj<B, M> {
    /// Get input width
    pub fn d_input(&self) -> usize {
        self.d_input
    }

    /// Get the argument widths this projection was built with
    pub fn args_dim(&self) -> &ArgsDim {
        &self.args_dim.0
    }

    /// Get the domain map
    pub fn domain_map(&self) -> &M {
        &self.domain_map
    }

    /// Learnable projections, one per argument in order
    pub fn layers(&self) -> &[Linear<B>] {
        &self.layers
    }

    /// Project `x` and apply the domain map
    ///
    /// # Arguments
    /// * `x` - Hidden features of shape `[batch..., d_input]`
    ///
    /// # Returns
    /// The domain-mapped arguments in [`ArgsDim`] order
    pub fn forward<const D: usize>(
        &self,
        x: Tensor<B, D>,
    ) -> crate::Result<Vec<Tensor<B, D>>> {
        let raw = self
            .layers
            .iter()
            .map(|layer| layer.forward(x.clone()))
            .collect();

        self.domain_map.domain_map(raw)
    }
}

//! Affine change of variables for denormalizing distribution outputs.
//!
//! A model usually works on series divided by a per-series scale and shifted
//! by a per-series location. [`AffineTransformed`] maps a distribution fitted
//! in that normalized space back with `y = x * scale + loc`, and corrects the
//! log-density by the log-Jacobian of the transform.

use super::{sum_event_axes, Distribution};
use burn::tensor::backend::Backend;
use burn::tensor::Tensor;

/// Distribution of `base * scale + loc`
///
/// A missing `loc` acts as 0 and a missing `scale` as 1. Both must broadcast
/// against the base distribution's `batch_shape ++ event_shape`.
#[derive(Debug, Clone)]
pub struct AffineTransformed<B: Backend, X, const D: usize> {
    base: X,
    loc: Option<Tensor<B, D>>,
    scale: Option<Tensor<B, D>>,
}

impl<B: Backend, X: Distribution<B, D>, const D: usize> AffineTransformed<B, X, D> {
    pub fn new(base: X, loc: Option<Tensor<B, D>>, scale: Option<Tensor<B, D>>) -> Self {
        Self { base, loc, scale }
    }

    pub fn base(&self) -> &X {
        &self.base
    }

    pub fn loc(&self) -> Option<&Tensor<B, D>> {
        self.loc.as_ref()
    }

    pub fn scale(&self) -> Option<&Tensor<B, D>> {
        self.scale.as_ref()
    }

    fn forward(&self, x: Tensor<B, D>) -> Tensor<B, D> {
        let x = match &self.scale {
            Some(scale) => x * scale.clone(),
            None => x,
        };
        match &self.loc {
            Some(loc) => x + loc.clone(),
            None => x,
        }
    }

    fn inverse(&self, y: Tensor<B, D>) -> Tensor<B, D> {
        let y = match &self.loc {
            Some(loc) => y - loc.clone(),
            None => y,
        };
        match &self.scale {
            Some(scale) => y / scale.clone(),
            None => y,
        }
    }
}

impl<B: Backend, X: Distribution<B, D>, const D: usize> Distribution<B, D>
    for AffineTransformed<B, X, D>
{
    fn batch_shape(&self) -> Vec<usize> {
        self.base.batch_shape()
    }

    fn event_shape(&self) -> Vec<usize> {
        self.base.event_shape()
    }

    fn mean(&self) -> Tensor<B, D> {
        self.forward(self.base.mean())
    }

    fn stddev(&self) -> Tensor<B, D> {
        let stddev = self.base.stddev();
        match &self.scale {
            Some(scale) => stddev * scale.clone().abs(),
            None => stddev,
        }
    }

    fn sample(&self) -> Tensor<B, D> {
        self.forward(self.base.sample())
    }

    fn log_prob(&self, y: Tensor<B, D>) -> Tensor<B, D> {
        let dims = y.dims();
        let log_prob = self.base.log_prob(self.inverse(y));

        match &self.scale {
            Some(scale) => {
                // ln|dy/dx| accumulates once per event element
                let log_det: Tensor<B, D> = scale.clone().abs().log().expand(dims);
                log_prob - sum_event_axes(log_det, self.base.event_dim())
            }
            None => log_prob,
        }
    }
}

/// The distribution returned by
/// [`DistributionOutput::distribution`](super::DistributionOutput::distribution)
///
/// `Base` when neither location nor scale was supplied, `Affine` otherwise.
#[derive(Debug, Clone)]
pub enum OutputDistribution<B: Backend, X, const D: usize> {
    Base(X),
    Affine(AffineTransformed<B, X, D>),
}

impl<B: Backend, X: Distribution<B, D>, const D: usize> OutputDistribution<B, X, D> {
    /// Whether an affine transform wraps the family distribution
    pub fn is_affine(&self) -> bool {
        matches!(self, Self::Affine(_))
    }

    /// The untransformed family distribution
    pub fn base(&self) -> &X {
        match self {
            Self::Base(distr) => distr,
            Self::Affine(affine) => affine.base(),
        }
    }

    fn inner(&self) -> &dyn Distribution<B, D> {
        match self {
            Self::Base(distr) => distr,
            Self::Affine(affine) => affine,
        }
    }
}

impl<B: Backend, X: Distribution<B, D>, const D: usize> Distribution<B, D>
    for OutputDistribution<B, X, D>
{
    fn batch_shape(&self) -> Vec<usize> {
        self.inner().batch_shape()
    }

    fn event_shape(&self) -> Vec<usize> {
        self.inner().event_shape()
    }

    fn mean(&self) -> Tensor<B, D> {
        self.inner().mean()
    }

    fn stddev(&self) -> Tensor<B, D> {
        self.inner().stddev()
    }

    fn variance(&self) -> Tensor<B, D> {
        self.inner().variance()
    }

    fn sample(&self) -> Tensor<B, D> {
        self.inner().sample()
    }

    fn log_prob(&self, x: Tensor<B, D>) -> Tensor<B, D> {
        self.inner().log_prob(x)
    }
}

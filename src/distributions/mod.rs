//! # Parametric Distributions and Distribution Outputs
//!
//! This module provides the distribution families a forecasting head can emit,
//! the [`AffineTransformed`] decorator used to denormalize them, and the
//! [`DistributionOutput`] factory trait that ties a family to its argument
//! projection.
//!
//! ## Families
//!
//! | Distribution | Output | Arguments | Event shape |
//! |--------------|--------|-----------|-------------|
//! | [`Gaussian`] | [`GaussianOutput`] | `mu: 1, sigma: 1` | `[]` |
//! | [`Laplace`] | [`LaplaceOutput`] | `mu: 1, b: 1` | `[]` |
//! | [`IndependentGaussian`] | [`IndependentGaussianOutput`] | `mu: k, sigma: k` | `[k]` |
//!
//! ## Rank Convention
//!
//! Parameters are rank-`D` tensors. Univariate families treat every axis as a
//! batch axis, so arguments straight out of an [`ArgProj`](crate::projection::ArgProj)
//! keep a trailing unit axis. Multivariate families treat the trailing axis as
//! the event axis. [`Distribution::log_prob`] reduces over event axes but keeps
//! them with size 1, so its result is always rank `D`.
//!
//! ## Example
//!
//! ```rust
//! use burn::backend::NdArray;
//! use burn::tensor::Tensor;
//! use tshead::distributions::{Distribution, DistributionOutput, GaussianOutput};
//!
//! type Backend = NdArray<f32>;
//! let device = Default::default();
//!
//! let output = GaussianOutput;
//! let proj = DistributionOutput::<Backend>::get_args_proj(&output, 16, &device).unwrap();
//!
//! let hidden = Tensor::<Backend, 3>::zeros([4, 24, 16], &device);
//! let args = proj.forward(hidden).unwrap();
//!
//! let scale = Tensor::<Backend, 3>::full([4, 1, 1], 10.0, &device);
//! let distr = output.distribution(args, None, Some(scale)).unwrap();
//! assert_eq!(distr.sample().dims(), [4, 24, 1]);
//! ```

pub mod affine;
pub mod gaussian;
pub mod independent_gaussian;
pub mod laplace;
pub mod output;

pub use affine::{AffineTransformed, OutputDistribution};
pub use gaussian::{Gaussian, GaussianOutput};
pub use independent_gaussian::{IndependentGaussian, IndependentGaussianOutput};
pub use laplace::{Laplace, LaplaceOutput};
pub use output::DistributionOutput;

use burn::tensor::backend::Backend;
use burn::tensor::Tensor;

/// `0.5 * ln(2π)`
pub(crate) const HALF_LN_2PI: f32 = 0.918_938_5;

/// A parametric probability distribution over rank-`D` tensors
pub trait Distribution<B: Backend, const D: usize> {
    /// Shape of the independent batch of distributions
    fn batch_shape(&self) -> Vec<usize>;

    /// Shape of one realization, excluding batch axes
    fn event_shape(&self) -> Vec<usize>;

    /// Number of event axes
    fn event_dim(&self) -> usize {
        self.event_shape().len()
    }

    fn mean(&self) -> Tensor<B, D>;

    fn stddev(&self) -> Tensor<B, D>;

    fn variance(&self) -> Tensor<B, D> {
        self.stddev().powf_scalar(2.0)
    }

    /// Draw one sample with shape `batch_shape ++ event_shape`
    fn sample(&self) -> Tensor<B, D>;

    /// Log-density of `x`, summed over event axes (kept with size 1)
    fn log_prob(&self, x: Tensor<B, D>) -> Tensor<B, D>;

    /// Negative log-likelihood of `x`
    fn loss(&self, x: Tensor<B, D>) -> Tensor<B, D> {
        self.log_prob(x).neg()
    }
}

/// Sum `tensor` over its trailing `event_dim` axes, keeping them with size 1.
pub(crate) fn sum_event_axes<B: Backend, const D: usize>(
    tensor: Tensor<B, D>,
    event_dim: usize,
) -> Tensor<B, D> {
    (0..event_dim).fold(tensor, |acc, i| acc.sum_dim(D - 1 - i))
}

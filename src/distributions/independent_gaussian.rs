//! Multivariate Gaussian with diagonal covariance.
//!
//! The trailing axis is the event axis: a parameter tensor of shape
//! `[batch..., k]` describes a batch of `k`-dimensional distributions.

use super::{sum_event_axes, Distribution, DistributionOutput, HALF_LN_2PI};
use crate::activation::DomainActivation;
use crate::error::take_args;
use crate::projection::{ArgsDim, DomainMap};
use burn::module::Module;
use burn::tensor::backend::Backend;
use burn::tensor::{Distribution as TensorDistribution, Tensor};

/// `k` independent normals sharing one event
#[derive(Debug, Clone)]
pub struct IndependentGaussian<B: Backend, const D: usize> {
    mu: Tensor<B, D>,
    sigma: Tensor<B, D>,
}

impl<B: Backend, const D: usize> IndependentGaussian<B, D> {
    pub fn new(mu: Tensor<B, D>, sigma: Tensor<B, D>) -> Self {
        Self { mu, sigma }
    }
}

impl<B: Backend, const D: usize> Distribution<B, D> for IndependentGaussian<B, D> {
    fn batch_shape(&self) -> Vec<usize> {
        let dims = self.mu.dims();
        dims[..D - 1].to_vec()
    }

    fn event_shape(&self) -> Vec<usize> {
        vec![self.mu.dims()[D - 1]]
    }

    fn mean(&self) -> Tensor<B, D> {
        self.mu.clone()
    }

    fn stddev(&self) -> Tensor<B, D> {
        self.sigma.clone()
    }

    fn sample(&self) -> Tensor<B, D> {
        let eps = Tensor::<B, D>::random(
            self.mu.dims(),
            TensorDistribution::Normal(0.0, 1.0),
            &self.mu.device(),
        );
        self.mu.clone() + eps * self.sigma.clone()
    }

    fn log_prob(&self, x: Tensor<B, D>) -> Tensor<B, D> {
        let z = (x - self.mu.clone()) / self.sigma.clone();
        let per_dim = z
            .powf_scalar(2.0)
            .mul_scalar(-0.5)
            .sub(self.sigma.clone().log())
            .sub_scalar(HALF_LN_2PI);

        sum_event_axes(per_dim, 1)
    }
}

/// Output head producing [`IndependentGaussian`] distributions of dimension `dim`
#[derive(Module, Debug, Clone, Copy, PartialEq, Eq)]
pub struct IndependentGaussianOutput {
    dim: usize,
}

impl IndependentGaussianOutput {
    pub fn new(dim: usize) -> Self {
        Self { dim }
    }

    pub fn dim(&self) -> usize {
        self.dim
    }
}

impl<B: Backend> DomainMap<B> for IndependentGaussianOutput {
    fn domain_map<const D: usize>(
        &self,
        args: Vec<Tensor<B, D>>,
    ) -> crate::Result<Vec<Tensor<B, D>>> {
        let [mu, sigma] = take_args(args)?;
        Ok(vec![mu, sigma.positive()])
    }
}

impl<B: Backend> DistributionOutput<B> for IndependentGaussianOutput {
    type Distr<const D: usize> = IndependentGaussian<B, D>;

    fn args_dim(&self) -> ArgsDim {
        ArgsDim::new().with("mu", self.dim).with("sigma", self.dim)
    }

    fn event_shape(&self) -> Vec<usize> {
        vec![self.dim]
    }

    fn distr<const D: usize>(&self, args: Vec<Tensor<B, D>>) -> crate::Result<Self::Distr<D>> {
        let [mu, sigma] = take_args(args)?;
        Ok(IndependentGaussian::new(mu, sigma))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use burn::backend::NdArray;

    type TestBackend = NdArray<f32>;

    #[test]
    fn test_shapes() {
        let device = Default::default();
        let distr = IndependentGaussian::new(
            Tensor::<TestBackend, 3>::zeros([2, 5, 3], &device),
            Tensor::<TestBackend, 3>::ones([2, 5, 3], &device),
        );

        assert_eq!(distr.batch_shape(), vec![2, 5]);
        assert_eq!(distr.event_shape(), vec![3]);
        assert_eq!(distr.event_dim(), 1);
        assert_eq!(distr.sample().dims(), [2, 5, 3]);
    }

    #[test]
    fn test_log_prob_sums_over_event() {
        let device = Default::default();
        let distr = IndependentGaussian::new(
            Tensor::<TestBackend, 2>::zeros([1, 4], &device),
            Tensor::<TestBackend, 2>::ones([1, 4], &device),
        );

        let lp = distr.log_prob(Tensor::<TestBackend, 2>::zeros([1, 4], &device));
        assert_eq!(lp.dims(), [1, 1]);

        let expected = -4.0 * HALF_LN_2PI;
        assert!((lp.into_scalar() - expected).abs() < 1e-5);
    }
}

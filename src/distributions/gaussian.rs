//! Univariate Gaussian distribution and its output head.

use super::{Distribution, DistributionOutput, HALF_LN_2PI};
use crate::activation::DomainActivation;
use crate::error::take_args;
use crate::projection::{ArgsDim, DomainMap};
use burn::module::Module;
use burn::tensor::backend::Backend;
use burn::tensor::{Distribution as TensorDistribution, Tensor};

/// Normal distribution with element-wise mean `mu` and standard deviation `sigma`
#[derive(Debug, Clone)]
pub struct Gaussian<B: Backend, const D: usize> {
    mu: Tensor<B, D>,
    sigma: Tensor<B, D>,
}

impl<B: Backend, const D: usize> Gaussian<B, D> {
    /// `mu` and `sigma` must share a shape; `sigma` must be positive
    pub fn new(mu: Tensor<B, D>, sigma: Tensor<B, D>) -> Self {
        Self { mu, sigma }
    }

    pub fn mu(&self) -> &Tensor<B, D> {
        &self.mu
    }

    pub fn sigma(&self) -> &Tensor<B, D> {
        &self.sigma
    }
}

impl<B: Backend, const D: usize> Distribution<B, D> for Gaussian<B, D> {
    fn batch_shape(&self) -> Vec<usize> {
        self.mu.dims().to_vec()
    }

    fn event_shape(&self) -> Vec<usize> {
        vec![]
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
        // -0.5 * z^2 - ln(sigma) - 0.5 * ln(2π)
        let z = (x - self.mu.clone()) / self.sigma.clone();
        z.powf_scalar(2.0)
            .mul_scalar(-0.5)
            .sub(self.sigma.clone().log())
            .sub_scalar(HALF_LN_2PI)
    }
}

/// Output head producing [`Gaussian`] distributions
///
/// Arguments: `mu` (width 1, unbounded), `sigma` (width 1, soft-plus).
#[derive(Module, Debug, Clone, Copy, Default)]
pub struct GaussianOutput;

impl<B: Backend> DomainMap<B> for GaussianOutput {
    fn domain_map<const D: usize>(
        &self,
        args: Vec<Tensor<B, D>>,
    ) -> crate::Result<Vec<Tensor<B, D>>> {
        let [mu, sigma] = take_args(args)?;
        Ok(vec![mu, sigma.positive()])
    }
}

impl<B: Backend> DistributionOutput<B> for GaussianOutput {
    type Distr<const D: usize> = Gaussian<B, D>;

    fn args_dim(&self) -> ArgsDim {
        ArgsDim::new().with("mu", 1).with("sigma", 1)
    }

    fn event_shape(&self) -> Vec<usize> {
        vec![]
    }

    fn distr<const D: usize>(&self, args: Vec<Tensor<B, D>>) -> crate::Result<Self::Distr<D>> {
        let [mu, sigma] = take_args(args)?;
        Ok(Gaussian::new(mu, sigma))
    }
}

//! Univariate Laplace distribution and its output head.

use super::{Distribution, DistributionOutput};
use crate::activation::DomainActivation;
use crate::error::take_args;
use crate::projection::{ArgsDim, DomainMap};
use burn::module::Module;
use burn::tensor::backend::Backend;
use burn::tensor::{Distribution as TensorDistribution, Tensor};

/// Lower bound of the uniform draws used for sampling, keeps `ln(u)` finite
const UNIFORM_FLOOR: f64 = 1.0e-7;

/// Laplace distribution with location `mu` and scale `b`
#[derive(Debug, Clone)]
pub struct Laplace<B: Backend, const D: usize> {
    mu: Tensor<B, D>,
    b: Tensor<B, D>,
}

impl<B: Backend, const D: usize> Laplace<B, D> {
    /// `mu` and `b` must share a shape; `b` must be positive
    pub fn new(mu: Tensor<B, D>, b: Tensor<B, D>) -> Self {
        Self { mu, b }
    }

    pub fn mu(&self) -> &Tensor<B, D> {
        &self.mu
    }

    pub fn b(&self) -> &Tensor<B, D> {
        &self.b
    }
}

impl<B: Backend, const D: usize> Distribution<B, D> for Laplace<B, D> {
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
        self.b.clone().mul_scalar(std::f32::consts::SQRT_2)
    }

    fn sample(&self) -> Tensor<B, D> {
        // The difference of two standard exponentials is standard Laplace
        let device = self.mu.device();
        let dims = self.mu.dims();
        let u1 = Tensor::<B, D>::random(dims, TensorDistribution::Uniform(UNIFORM_FLOOR, 1.0), &device);
        let u2 = Tensor::<B, D>::random(dims, TensorDistribution::Uniform(UNIFORM_FLOOR, 1.0), &device);

        self.mu.clone() + (u1.log() - u2.log()) * self.b.clone()
    }

    fn log_prob(&self, x: Tensor<B, D>) -> Tensor<B, D> {
        // -ln(2b) - |x - mu| / b
        let dev = (x - self.mu.clone()).abs() / self.b.clone();
        dev.neg().sub(self.b.clone().mul_scalar(2.0).log())
    }
}

/// Output head producing [`Laplace`] distributions
///
/// Arguments: `mu` (width 1, unbounded), `b` (width 1, soft-plus).
#[derive(Module, Debug, Clone, Copy, Default)]
pub struct LaplaceOutput;

impl<B: Backend> DomainMap<B> for LaplaceOutput {
    fn domain_map<const D: usize>(
        &self,
        args: Vec<Tensor<B, D>>,
    ) -> crate::Result<Vec<Tensor<B, D>>> {
        let [mu, b] = take_args(args)?;
        Ok(vec![mu, b.positive()])
    }
}

impl<B: Backend> DistributionOutput<B> for LaplaceOutput {
    type Distr<const D: usize> = Laplace<B, D>;

    fn args_dim(&self) -> ArgsDim {
        ArgsDim::new().with("mu", 1).with("b", 1)
    }

    fn event_shape(&self) -> Vec<usize> {
        vec![]
    }

    fn distr<const D: usize>(&self, args: Vec<Tensor<B, D>>) -> crate::Result<Self::Distr<D>> {
        let [mu, b] = take_args(args)?;
        Ok(Laplace::new(mu, b))
    }
}

//! Distribution output factory
//!
//! A [`DistributionOutput`] owns everything a model head needs to know about
//! one distribution family: the widths of its arguments, how raw projections
//! are mapped into the family's parameter domain, and how a distribution is
//! built from the mapped arguments.
//!
//! ## Workflow
//!
//! ```text
//! hidden ──get_args_proj()──► ArgProj ──forward()──► mapped args
//!                                                        │
//!                       loc, scale ──distribution()──────┘──► OutputDistribution
//! ```
//!
//! Every concrete output must provide `event_shape` and `domain_map`. Leaving
//! either out is a compile error:
//!
//! ```compile_fail
//! use burn::module::Module;
//! use burn::tensor::{backend::Backend, Tensor};
//! use tshead::distributions::{DistributionOutput, Gaussian};
//! use tshead::projection::{ArgsDim, DomainMap};
//!
//! #[derive(Module, Clone, Debug)]
//! struct Incomplete;
//!
//! impl<B: Backend> DomainMap<B> for Incomplete {
//!     fn domain_map<const D: usize>(
//!         &self,
//!         args: Vec<Tensor<B, D>>,
//!     ) -> tshead::Result<Vec<Tensor<B, D>>> {
//!         Ok(args)
//!     }
//! }
//!
//! impl<B: Backend> DistributionOutput<B> for Incomplete {
//!     type Distr<const D: usize> = Gaussian<B, D>;
//!
//!     fn args_dim(&self) -> ArgsDim {
//!         ArgsDim::new().with("mu", 1).with("sigma", 1)
//!     }
//!
//!     fn distr<const D: usize>(&self, args: Vec<Tensor<B, D>>) -> tshead::Result<Gaussian<B, D>> {
//!         let mut args = args.into_iter();
//!         Ok(Gaussian::new(args.next().unwrap(), args.next().unwrap()))
//!     }
//! }
//! ```

use super::{AffineTransformed, Distribution, OutputDistribution};
use crate::projection::{ArgProj, ArgProjConfig, ArgsDim, DomainMap};
use burn::tensor::backend::Backend;
use burn::tensor::Tensor;

/// Factory tying a distribution family to its argument projection
///
/// # Type Parameters
/// * `B` - The backend type
pub trait DistributionOutput<B: Backend>: DomainMap<B> {
    /// The family this output constructs, for parameters of rank `D`
    type Distr<const D: usize>: Distribution<B, D>;

    /// Names and widths of the arguments, in projection order
    fn args_dim(&self) -> ArgsDim;

    /// Shape of one realization of the distribution
    fn event_shape(&self) -> Vec<usize>;

    /// Number of event axes, always `event_shape().len()`
    fn event_dim(&self) -> usize {
        self.event_shape().len()
    }

    /// A value inside the support, used to pad series of irregular length
    ///
    /// Overrides are not checked against the family's support.
    fn value_in_support(&self) -> f64 {
        0.0
    }

    /// Build the family distribution from domain-mapped arguments
    fn distr<const D: usize>(&self, args: Vec<Tensor<B, D>>) -> crate::Result<Self::Distr<D>>;

    /// Build the distribution, optionally denormalized by `loc` and `scale`
    ///
    /// # Arguments
    /// * `distr_args` - Arguments already passed through the domain map
    /// * `loc` - Optional shift, broadcast against the distribution's shape
    /// * `scale` - Optional scale, broadcast against the distribution's shape
    ///
    /// # Returns
    /// [`OutputDistribution::Base`] when both `loc` and `scale` are `None`,
    /// otherwise [`OutputDistribution::Affine`] over `value * scale + loc`
    fn distribution<const D: usize>(
        &self,
        distr_args: Vec<Tensor<B, D>>,
        loc: Option<Tensor<B, D>>,
        scale: Option<Tensor<B, D>>,
    ) -> crate::Result<OutputDistribution<B, Self::Distr<D>, D>> {
        let distr = self.distr(distr_args)?;

        if loc.is_none() && scale.is_none() {
            return Ok(OutputDistribution::Base(distr));
        }
        Ok(OutputDistribution::Affine(AffineTransformed::new(
            distr, loc, scale,
        )))
    }

    /// Create the argument projection for hidden features of width `d_input`
    fn get_args_proj(
        &self,
        d_input: usize,
        device: &B::Device,
    ) -> crate::Result<ArgProj<B, Self>> {
        ArgProjConfig::new(d_input, self.args_dim()).init(self.clone(), device)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::distributions::{GaussianOutput, IndependentGaussianOutput, LaplaceOutput};
    use crate::error::Error;
    use burn::backend::NdArray;
    use burn::module::Module;
    use burn::tensor::backend::Backend as BurnBackend;

    type TestBackend = NdArray<f32>;
    type TestDevice = <TestBackend as BurnBackend>::Device;

    fn get_test_device() -> TestDevice {
        Default::default()
    }

    /// A positive-support output that overrides the padding value
    #[derive(Module, Debug, Clone, Copy)]
    struct PositiveOutput;

    impl<B: Backend> DomainMap<B> for PositiveOutput {
        fn domain_map<const D: usize>(
            &self,
            args: Vec<Tensor<B, D>>,
        ) -> crate::Result<Vec<Tensor<B, D>>> {
            DomainMap::<B>::domain_map(&LaplaceOutput, args)
        }
    }

    impl<B: Backend> DistributionOutput<B> for PositiveOutput {
        type Distr<const D: usize> = <LaplaceOutput as DistributionOutput<B>>::Distr<D>;

        fn args_dim(&self) -> ArgsDim {
            DistributionOutput::<B>::args_dim(&LaplaceOutput)
        }

        fn event_shape(&self) -> Vec<usize> {
            vec![]
        }

        fn value_in_support(&self) -> f64 {
            1.0
        }

        fn distr<const D: usize>(&self, args: Vec<Tensor<B, D>>) -> crate::Result<Self::Distr<D>> {
            LaplaceOutput.distr(args)
        }
    }

    #[test]
    fn test_value_in_support_default_and_override() {
        assert_eq!(
            DistributionOutput::<TestBackend>::value_in_support(&GaussianOutput),
            0.0
        );
        assert_eq!(
            DistributionOutput::<TestBackend>::value_in_support(&PositiveOutput),
            1.0
        );
    }

    #[test]
    fn test_event_dim_matches_event_shape() {
        let gaussian = DistributionOutput::<TestBackend>::event_shape(&GaussianOutput);
        assert_eq!(
            DistributionOutput::<TestBackend>::event_dim(&GaussianOutput),
            gaussian.len()
        );

        let laplace = DistributionOutput::<TestBackend>::event_shape(&LaplaceOutput);
        assert_eq!(
            DistributionOutput::<TestBackend>::event_dim(&LaplaceOutput),
            laplace.len()
        );

        for dim in [1, 3, 8] {
            let output = IndependentGaussianOutput::new(dim);
            let shape = DistributionOutput::<TestBackend>::event_shape(&output);
            assert_eq!(shape, vec![dim]);
            assert_eq!(DistributionOutput::<TestBackend>::event_dim(&output), 1);
        }
    }

    #[test]
    fn test_distribution_without_transform_is_base() {
        let device = get_test_device();
        let mu = Tensor::<TestBackend, 2>::zeros([3, 1], &device);
        let sigma = Tensor::<TestBackend, 2>::ones([3, 1], &device);

        let distr = GaussianOutput.distribution(vec![mu, sigma], None, None).unwrap();
        assert!(!distr.is_affine());
    }

    #[test]
    fn test_distribution_with_loc_only_is_affine() {
        let device = get_test_device();
        let mu = Tensor::<TestBackend, 2>::zeros([3, 1], &device);
        let sigma = Tensor::<TestBackend, 2>::ones([3, 1], &device);
        let loc = Tensor::<TestBackend, 2>::full([3, 1], 4.0, &device);

        let distr = GaussianOutput
            .distribution(vec![mu, sigma], Some(loc), None)
            .unwrap();

        assert!(distr.is_affine());
        assert!((distr.mean().mean().into_scalar() - 4.0).abs() < 1e-6);
    }

    #[test]
    fn test_distribution_arity_error() {
        let device = get_test_device();
        let mu = Tensor::<TestBackend, 2>::zeros([3, 1], &device);

        let result = GaussianOutput.distribution(vec![mu], None, None);
        assert!(matches!(
            result,
            Err(Error::ArgumentCount {
                expected: 2,
                actual: 1
            })
        ));
    }

    #[test]
    fn test_get_args_proj_uses_args_dim() {
        let device = get_test_device();
        let output = IndependentGaussianOutput::new(4);
        let proj = DistributionOutput::<TestBackend>::get_args_proj(&output, 12, &device).unwrap();

        assert_eq!(proj.d_input(), 12);
        assert_eq!(proj.args_dim().widths().collect::<Vec<_>>(), vec![4, 4]);

        let hidden = Tensor::<TestBackend, 3>::zeros([2, 7, 12], &device);
        let args = proj.forward(hidden).unwrap();
        assert_eq!(args[0].dims(), [2, 7, 4]);
        assert_eq!(args[1].dims(), [2, 7, 4]);
        assert!(args[1].clone().min().into_scalar() > 0.0);
    }
}

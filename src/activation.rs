//! Activation functions used by distribution domain maps
//!
//! This module provides the positivity map that turns unbounded projections
//! into valid scale parameters.

use burn::tensor::{activation, backend::Backend, Tensor};

/// Smallest scale a positive domain map will emit.
pub const MIN_SCALE: f32 = f32::EPSILON;

/// Soft-plus positivity map.
///
/// This map is defined as:
/// `f(x) = max(ln(1 + exp(x)), MIN_SCALE)`
///
/// Saturated negative inputs are clamped to `MIN_SCALE` instead of an exactly
/// zero scale.
///
/// # Example
///
/// ```rust
/// use burn::backend::NdArray;
/// use burn::tensor::Tensor;
/// use tshead::activation::SoftPlus;
///
/// type Backend = NdArray<f32>;
/// let device = Default::default();
///
/// let x = Tensor::<Backend, 1>::from_floats([-30.0, 0.0, 30.0], &device);
/// let y = SoftPlus::forward(x);
/// assert!(y.min().into_scalar() > 0.0);
/// ```
pub struct SoftPlus;

impl SoftPlus {
    /// Applies the soft-plus map element-wise.
    pub fn forward<B: Backend, const D: usize>(x: Tensor<B, D>) -> Tensor<B, D> {
        activation::softplus(x, 1.0).clamp_min(MIN_SCALE)
    }
}

/// Extension trait for applying domain maps directly on tensors.
pub trait DomainActivation {
    /// Applies [`SoftPlus`]
    fn positive(self) -> Self;
}

impl<B: Backend, const D: usize> DomainActivation for Tensor<B, D> {
    fn positive(self) -> Self {
        SoftPlus::forward(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use burn::backend::NdArray;
    use burn::tensor::Tensor;

    type Backend = NdArray<f32>;

    #[test]
    fn test_softplus_values() {
        let device = Default::default();

        for &val in &[-5.0f32, -1.0, 0.0, 1.0, 5.0] {
            let x = Tensor::<Backend, 1>::full([1], val, &device);
            let result = SoftPlus::forward(x).into_scalar();
            let expected = (1.0f32 + val.exp()).ln().max(MIN_SCALE);

            assert!(
                (result - expected).abs() < 1e-5,
                "soft-plus incorrect at x={}",
                val
            );
        }
    }

    #[test]
    fn test_softplus_strictly_positive() {
        let device = Default::default();
        let x = Tensor::<Backend, 1>::full([4], -100.0f32, &device);
        let y = SoftPlus::forward(x);

        assert!(y.min().into_scalar() >= MIN_SCALE);
    }

    #[test]
    fn test_softplus_clamps_at_min_scale() {
        let device = Default::default();
        let x = Tensor::<Backend, 1>::from_floats([-200.0f32, -50.0, 2.0], &device);
        let y = SoftPlus::forward(x).into_data().to_vec::<f32>().unwrap();

        assert_eq!(y[0], MIN_SCALE);
        assert_eq!(y[1], MIN_SCALE);
        // no offset away from the floor
        assert!((y[2] - (1.0f32 + 2.0f32.exp()).ln()).abs() < 1e-6);
    }

    #[test]
    fn test_trait_matches_direct() {
        let device = Default::default();
        let x = Tensor::<Backend, 1>::from_floats([0.0f32, 1.0, -1.0], &device);

        let y_trait = x.clone().positive();
        let y_direct = SoftPlus::forward(x);

        let diff = (y_trait - y_direct).abs().max().into_scalar();
        assert!(diff < 1e-6);
    }
}

//! # tshead - probabilistic forecasting heads on Burn
//!
//! Building blocks for probabilistic time-series models using the Burn framework.
//!
//! ## Features
//!
//! - **Argument projection**: one affine map per distribution argument, followed by
//!   a domain map that bounds the raw outputs
//! - **Distribution outputs**: factories tying a family (Gaussian, Laplace,
//!   independent Gaussian) to its arguments, with affine denormalization
//! - **Residual cells**: `output + input` around any recurrent cell, with a
//!   length-masked sequence unroll
//!
//! ## Quick Start
//!
//! ```rust
//! use burn::backend::NdArray;
//! use burn::tensor::Tensor;
//! use tshead::prelude::*;
//!
//! type Backend = NdArray<f32>;
//! let device = Default::default();
//!
//! let output = GaussianOutput;
//! let proj = DistributionOutput::<Backend>::get_args_proj(&output, 32, &device).unwrap();
//!
//! let hidden = Tensor::<Backend, 2>::zeros([8, 32], &device);
//! let distr = output
//!     .distribution(proj.forward(hidden).unwrap(), None, None)
//!     .unwrap();
//!
//! assert_eq!(distr.batch_shape(), vec![8, 1]);
//! ```
//!
//! ## Cell-level Usage
//!
//! ```ignore
//! use tshead::cells::{LSTMCell, ResidualCell, RecurrentCell};
//!
//! let cell = ResidualCell::new(LSTMCell::<Backend>::new(16, 16, &device));
//! let (output, states) = cell.step(input, cell.begin_state(batch, &device));
//! ```

pub mod activation;
pub mod cells;
pub mod distributions;
pub mod error;
pub mod projection;

pub use error::{Error, Result};

pub mod prelude {
    pub use crate::activation::{DomainActivation, SoftPlus};
    pub use crate::cells::{
        CellState, GRUCell, LSTMCell, Layout, RecurrentCell, ResidualCell, Sequence,
        UnrollOptions,
    };
    pub use crate::distributions::{
        AffineTransformed, Distribution, DistributionOutput, Gaussian, GaussianOutput,
        IndependentGaussian, IndependentGaussianOutput, Laplace, LaplaceOutput,
        OutputDistribution,
    };
    pub use crate::error::Error;
    pub use crate::projection::{ArgProj, ArgProjConfig, ArgsDim, DomainMap, IdentityDomainMap};
}

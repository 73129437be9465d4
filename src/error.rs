//! Error types for configuration and argument bookkeeping.
//!
//! Shape and dtype mismatches are reported by the tensor backend itself and are
//! not represented here.

use thiserror::Error;

/// Errors raised while configuring projections or building distributions
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    /// An argument mapping was empty or declared a zero width
    #[error("invalid argument widths: {0}")]
    InvalidArgsDim(String),

    /// A domain map or distribution constructor received the wrong number of tensors
    #[error("expected {expected} distribution arguments, got {actual}")]
    ArgumentCount { expected: usize, actual: usize },
}

pub type Result<T> = std::result::Result<T, Error>;

/// Unpack exactly `N` arguments, in order.
pub(crate) fn take_args<T, const N: usize>(args: Vec<T>) -> Result<[T; N]> {
    let actual = args.len();
    args.try_into()
        .map_err(|_| Error::ArgumentCount { expected: N, actual })
}

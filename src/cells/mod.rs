//! # Recurrent Cell Implementations
//!
//! This module provides single-timestep recurrent cells, the [`RecurrentCell`]
//! abstraction that unrolls them over sequences, and the [`ResidualCell`]
//! wrapper that adds each step's input back to the wrapped cell's output.
//!
//! ## Cell Types
//!
//! | Cell | States | Description |
//! |------|--------|-------------|
//! | [`LSTMCell`] | `[h, c]` | Standard LSTM |
//! | [`GRUCell`] | `[h]` | Gated recurrent unit |
//! | [`ResidualCell`] | wrapped cell's | `output + input` around any cell |
//!
//! ## Tensor Shapes
//!
//! Cells process one timestep of 2D tensors:
//!
//! | Tensor | Shape | Description |
//! |--------|-------|-------------|
//! | `input` | `[batch, input_size]` | Input features |
//! | `states[i]` | `[batch, state_sizes()[i]]` | Recurrent state |
//! | `output` | `[batch, output_size]` | Cell output |
//!
//! Sequences are passed as a [`Sequence`]: either one merged rank-3 tensor
//! (`[batch, time, features]` or `[time, batch, features]`, see [`Layout`]) or
//! one 2D tensor per step.
//!
//! ## Example: Residual Unroll
//!
//! ```rust
//! use burn::backend::NdArray;
//! use burn::tensor::{Int, Tensor};
//! use tshead::cells::{GRUCell, RecurrentCell, ResidualCell, Sequence, UnrollOptions};
//!
//! type Backend = NdArray<f32>;
//! let device = Default::default();
//!
//! // residual connections need input_size == hidden_size
//! let cell = ResidualCell::new(GRUCell::<Backend>::new(8, 8, &device));
//!
//! let inputs = Sequence::Merged(Tensor::<Backend, 3>::zeros([4, 10, 8], &device));
//! let options = UnrollOptions::new()
//!     .with_valid_length(Tensor::<Backend, 1, Int>::from_ints([10, 7, 3, 10], &device));
//!
//! let (outputs, states) = cell.unroll(inputs, None, &options);
//! assert!(outputs.is_merged());
//! assert_eq!(states[0].dims(), [4, 8]);
//! ```

pub mod gru_cell;
pub mod lstm_cell;
pub mod residual_cell;
pub mod sequence;

pub use gru_cell::GRUCell;
pub use lstm_cell::LSTMCell;
pub use residual_cell::ResidualCell;
pub use sequence::{Layout, Sequence, UnrollOptions};

use burn::tensor::backend::Backend;
use burn::tensor::Tensor;

/// Recurrent state: one `[batch, size]` tensor per entry of `state_sizes()`
pub type CellState<B> = Vec<Tensor<B, 2>>;

/// A single-timestep recurrent cell
///
/// # Type Parameters
/// * `B` - The backend type
pub trait RecurrentCell<B: Backend> {
    /// Width of each state tensor
    fn state_sizes(&self) -> Vec<usize>;

    /// Width of the per-step output
    fn output_size(&self) -> usize;

    /// Zero-initialized state for a batch
    fn begin_state(&self, batch_size: usize, device: &B::Device) -> CellState<B> {
        self.state_sizes()
            .into_iter()
            .map(|size| Tensor::zeros([batch_size, size], device))
            .collect()
    }

    /// Process one timestep
    ///
    /// # Returns
    /// Tuple of (output, new_states)
    fn step(&self, input: Tensor<B, 2>, states: CellState<B>) -> (Tensor<B, 2>, CellState<B>);

    /// Process a whole sequence
    ///
    /// # Arguments
    /// * `inputs` - Merged or per-step input sequence
    /// * `begin_state` - Initial state, zeros if `None`
    /// * `options` - Layout, output convention, valid lengths and residual flag
    ///
    /// # Returns
    /// Tuple of (outputs, final_states). With `valid_length`, outputs beyond
    /// each sequence's end are zero and its state is the one after its last
    /// valid step.
    fn unroll(
        &self,
        inputs: Sequence<B>,
        begin_state: Option<CellState<B>>,
        options: &UnrollOptions<B>,
    ) -> (Sequence<B>, CellState<B>) {
        unroll_steps(self, inputs, begin_state, options)
    }
}

/// Step-by-step unroll shared by every cell
pub fn unroll_steps<B: Backend, C: RecurrentCell<B> + ?Sized>(
    cell: &C,
    inputs: Sequence<B>,
    begin_state: Option<CellState<B>>,
    options: &UnrollOptions<B>,
) -> (Sequence<B>, CellState<B>) {
    let layout = options.layout;
    let merge = options.merge_outputs.unwrap_or(inputs.is_merged());
    let length = inputs.len(layout);

    tracing::trace!(length, merge, masked = options.valid_length.is_some(), "unroll");

    if length == 0 {
        let outputs = match inputs {
            Sequence::Merged(tensor) if merge => {
                let mut dims = tensor.dims();
                dims[2] = cell.output_size();
                Sequence::Merged(Tensor::zeros(dims, &tensor.device()))
            }
            _ => Sequence::PerStep(vec![]),
        };
        return (outputs, begin_state.unwrap_or_default());
    }

    let steps = inputs.into_steps(layout);
    let batch_size = steps[0].dims()[0];
    let device = steps[0].device();

    let mut states = begin_state.unwrap_or_else(|| cell.begin_state(batch_size, &device));
    let mut outputs = Vec::with_capacity(length);

    for (t, step_input) in steps.into_iter().enumerate() {
        let (output, new_states) = cell.step(step_input, states.clone());

        match &options.valid_length {
            Some(valid_length) if new_states.len() == states.len() => {
                // [batch, 1]; 1 while the sequence is still running
                let mask: Tensor<B, 2> =
                    sequence::step_mask(valid_length, t).unsqueeze_dim::<2>(1);

                let dims = output.dims();
                outputs.push(output * mask.clone().expand(dims));

                states = new_states
                    .into_iter()
                    .zip(states)
                    .map(|(new, old)| {
                        let dims = new.dims();
                        let keep = mask.clone().expand(dims);
                        let hold = keep.clone().neg().add_scalar(1.0);
                        new * keep + old * hold
                    })
                    .collect();
            }
            Some(valid_length) => {
                // no previous state to hold; only the outputs are masked
                let mask: Tensor<B, 2> =
                    sequence::step_mask(valid_length, t).unsqueeze_dim::<2>(1);
                let dims = output.dims();
                outputs.push(output * mask.expand(dims));
                states = new_states;
            }
            None => {
                outputs.push(output);
                states = new_states;
            }
        }
    }

    (Sequence::PerStep(outputs).normalize(layout, merge), states)
}

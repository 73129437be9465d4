//! Residual connection around a recurrent cell.

use super::{CellState, RecurrentCell, Sequence, UnrollOptions};
use burn::module::Module;
use burn::tensor::backend::Backend;
use burn::tensor::Tensor;
use core::marker::PhantomData;

/// Adds each step's input to the output of the wrapped cell
///
/// The wrapper holds no state of its own: states are passed to and returned
/// from the wrapped cell untouched. The wrapped cell's output width must equal
/// its input width.
///
/// # Type Parameters
/// * `B` - The backend type
/// * `C` - The wrapped cell
#[derive(Module, Debug)]
pub struct ResidualCell<B: Backend, C: Module<B>> {
    base_cell: C,
    _backend: PhantomData<B>,
}

impl<B: Backend, C: RecurrentCell<B> + Module<B>> ResidualCell<B, C> {
    pub fn new(base_cell: C) -> Self {
        Self {
            base_cell,
            _backend: PhantomData,
        }
    }

    /// Get the wrapped cell
    pub fn base_cell(&self) -> &C {
        &self.base_cell
    }

    pub fn into_inner(self) -> C {
        self.base_cell
    }
}

impl<B: Backend, C: RecurrentCell<B> + Module<B>> RecurrentCell<B> for ResidualCell<B, C> {
    fn state_sizes(&self) -> Vec<usize> {
        self.base_cell.state_sizes()
    }

    fn output_size(&self) -> usize {
        self.base_cell.output_size()
    }

    fn begin_state(&self, batch_size: usize, device: &B::Device) -> CellState<B> {
        self.base_cell.begin_state(batch_size, device)
    }

    fn step(&self, input: Tensor<B, 2>, states: CellState<B>) -> (Tensor<B, 2>, CellState<B>) {
        let (output, states) = self.base_cell.step(input.clone(), states);
        (output + input, states)
    }

    /// Unroll the wrapped cell, then add the inputs once
    ///
    /// The wrapped cell is unrolled with `apply_residual = false`, so residual
    /// wrappers nested inside it do not add their inputs a second time. This
    /// differs from [`step`](RecurrentCell::step), where every level adds its
    /// input: for `ResidualCell(ResidualCell(identity))` a step returns `3x`
    /// while an unroll returns `2x`. Inputs
    /// are converted to the convention the wrapped cell produced and, when
    /// `valid_length` is given, zeroed beyond each sequence's end before the
    /// addition.
    fn unroll(
        &self,
        inputs: Sequence<B>,
        begin_state: Option<CellState<B>>,
        options: &UnrollOptions<B>,
    ) -> (Sequence<B>, CellState<B>) {
        let inner_options = options.clone().with_residual(false);
        let (outputs, states) = self
            .base_cell
            .unroll(inputs.clone(), begin_state, &inner_options);

        if !options.apply_residual {
            return (outputs, states);
        }

        let layout = options.layout;
        let merge = options.merge_outputs.unwrap_or(outputs.is_merged());

        tracing::debug!(
            length = inputs.len(layout),
            merge,
            masked = options.valid_length.is_some(),
            "residual unroll"
        );

        let inputs = inputs.normalize(layout, merge);
        let inputs = match &options.valid_length {
            Some(valid_length) => inputs.mask(valid_length, layout),
            None => inputs,
        };

        (outputs.add(inputs, layout), states)
    }
}

use super::{CellState, RecurrentCell};
use burn::module::Module;
use burn::nn::{Linear, LinearConfig};
use burn::tensor::activation;
use burn::tensor::backend::Backend;
use burn::tensor::Tensor;

/// Gated recurrent unit
///
/// Implements the GRU equations:
/// - r = sigmoid(W_ir @ x + b_ir + W_hr @ h + b_hr)
/// - z = sigmoid(W_iz @ x + b_iz + W_hz @ h + b_hz)
/// - n = tanh(W_in @ x + b_in + r * (W_hn @ h + b_hn))
/// - h' = (1 - z) * n + z * h
///
/// Its state list is `[h]` and its output is `h'`.
#[derive(Module, Debug)]
pub struct GRUCell<B: Backend> {
    input_size: usize,
    hidden_size: usize,
    input_map: Linear<B>,     // Maps input to 3 * hidden_size
    recurrent_map: Linear<B>, // Maps hidden state to 3 * hidden_size
}

impl<B: Backend> GRUCell<B> {
    /// Create a new GRU cell
    pub fn new(input_size: usize, hidden_size: usize, device: &B::Device) -> Self {
        let input_map = LinearConfig::new(input_size, 3 * hidden_size)
            .with_bias(true)
            .init(device);

        let recurrent_map = LinearConfig::new(hidden_size, 3 * hidden_size)
            .with_bias(true)
            .init(device);

        Self {
            input_size,
            hidden_size,
            input_map,
            recurrent_map,
        }
    }

    /// Get the input size
    pub fn input_size(&self) -> usize {
        self.input_size
    }

    /// Get the hidden size
    pub fn hidden_size(&self) -> usize {
        self.hidden_size
    }

    /// Perform a forward pass through the GRU cell
    ///
    /// # Arguments
    /// * `input` - Input tensor of shape `[batch_size, input_size]`
    /// * `hidden` - Hidden state of shape `[batch_size, hidden_size]`
    ///
    /// # Returns
    /// The new hidden state
    pub fn forward(&self, input: Tensor<B, 2>, hidden: Tensor<B, 2>) -> Tensor<B, 2> {
        let x = self.input_map.forward(input).chunk(3, 1);
        let h = self.recurrent_map.forward(hidden.clone()).chunk(3, 1);

        let reset = activation::sigmoid(x[0].clone() + h[0].clone());
        let update = activation::sigmoid(x[1].clone() + h[1].clone());
        let candidate = (x[2].clone() + reset * h[2].clone()).tanh();

        let keep = update.clone().neg().add_scalar(1.0);
        candidate * keep + hidden * update
    }
}

impl<B: Backend> RecurrentCell<B> for GRUCell<B> {
    fn state_sizes(&self) -> Vec<usize> {
        vec![self.hidden_size]
    }

    fn output_size(&self) -> usize {
        self.hidden_size
    }

    fn step(&self, input: Tensor<B, 2>, states: CellState<B>) -> (Tensor<B, 2>, CellState<B>) {
        let hidden = match states.into_iter().next() {
            Some(hidden) => hidden,
            None => Tensor::zeros([input.dims()[0], self.hidden_size], &input.device()),
        };

        let new_hidden = self.forward(input, hidden);
        (new_hidden.clone(), vec![new_hidden])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use burn::backend::NdArray;
    use burn::tensor::backend::Backend as BurnBackend;

    type TestBackend = NdArray<f32>;
    type TestDevice = <TestBackend as BurnBackend>::Device;

    fn get_test_device() -> TestDevice {
        Default::default()
    }

    #[test]
    fn test_gru_cell_creation() {
        let device = get_test_device();
        let cell = GRUCell::<TestBackend>::new(12, 24, &device);

        assert_eq!(cell.input_size(), 12);
        assert_eq!(cell.hidden_size(), 24);
        assert_eq!(cell.state_sizes(), vec![24]);
    }

    #[test]
    fn test_gru_step_shapes() {
        let device = get_test_device();
        let cell = GRUCell::<TestBackend>::new(12, 24, &device);

        for batch_size in [1, 5, 16] {
            let input = Tensor::<TestBackend, 2>::zeros([batch_size, 12], &device);
            let (output, states) = cell.step(input, cell.begin_state(batch_size, &device));

            assert_eq!(output.dims(), [batch_size, 24]);
            assert_eq!(states.len(), 1);
            assert_eq!(states[0].dims(), [batch_size, 24]);
        }
    }

    #[test]
    fn test_gru_hidden_bounded() {
        let device = get_test_device();
        let cell = GRUCell::<TestBackend>::new(4, 8, &device);

        let input = Tensor::<TestBackend, 2>::random(
            [3, 4],
            burn::tensor::Distribution::Uniform(-5.0, 5.0),
            &device,
        );
        let mut states = cell.begin_state(3, &device);
        for _ in 0..10 {
            let (_, next) = cell.step(input.clone(), states);
            states = next;
        }

        // convex mix of tanh outputs and a zero start stays in [-1, 1]
        let max = states[0].clone().abs().max().into_scalar();
        assert!(max <= 1.0 + 1e-6);
    }

    #[test]
    fn test_gru_state_changes() {
        let device = get_test_device();
        let cell = GRUCell::<TestBackend>::new(4, 8, &device);

        let input = Tensor::<TestBackend, 2>::ones([2, 4], &device);
        let hidden = Tensor::<TestBackend, 2>::zeros([2, 8], &device);

        let new_hidden = cell.forward(input, hidden.clone());
        let diff = (new_hidden - hidden).abs().mean().into_scalar();
        assert!(diff > 0.0, "State should change after forward pass");
    }
}

//! Sequence containers, layouts and unroll options shared by all cells.

use burn::tensor::backend::Backend;
use burn::tensor::{Int, Tensor};
use serde::{Deserialize, Serialize};

/// Position of the time axis in a merged sequence tensor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Layout {
    /// `[batch, time, features]`
    #[default]
    BatchMajor,
    /// `[time, batch, features]`
    TimeMajor,
}

impl Layout {
    pub fn time_axis(&self) -> usize {
        match self {
            Layout::BatchMajor => 1,
            Layout::TimeMajor => 0,
        }
    }

    pub fn batch_axis(&self) -> usize {
        match self {
            Layout::BatchMajor => 0,
            Layout::TimeMajor => 1,
        }
    }
}

/// A batch of sequences, either stacked along the time axis or one tensor per step
#[derive(Debug, Clone)]
pub enum Sequence<B: Backend> {
    /// One rank-3 tensor laid out according to a [`Layout`]
    Merged(Tensor<B, 3>),
    /// One `[batch, features]` tensor per time step
    PerStep(Vec<Tensor<B, 2>>),
}

impl<B: Backend> Sequence<B> {
    pub fn is_merged(&self) -> bool {
        matches!(self, Sequence::Merged(_))
    }

    /// Number of time steps
    pub fn len(&self, layout: Layout) -> usize {
        match self {
            Sequence::Merged(tensor) => tensor.dims()[layout.time_axis()],
            Sequence::PerStep(steps) => steps.len(),
        }
    }

    pub fn is_empty(&self, layout: Layout) -> bool {
        self.len(layout) == 0
    }

    /// Split into one `[batch, features]` tensor per step
    pub fn into_steps(self, layout: Layout) -> Vec<Tensor<B, 2>> {
        match self {
            Sequence::Merged(tensor) => {
                let axis = layout.time_axis();
                (0..tensor.dims()[axis])
                    .map(|t| tensor.clone().narrow(axis, t, 1).squeeze(axis))
                    .collect()
            }
            Sequence::PerStep(steps) => steps,
        }
    }

    /// Convert to the requested convention
    ///
    /// An empty per-step sequence cannot be stacked and stays per-step.
    pub fn normalize(self, layout: Layout, merge: bool) -> Self {
        match (self, merge) {
            (Sequence::PerStep(steps), true) if !steps.is_empty() => {
                Sequence::Merged(Tensor::stack(steps, layout.time_axis()))
            }
            (seq @ Sequence::Merged(_), false) => Sequence::PerStep(seq.into_steps(layout)),
            (seq, _) => seq,
        }
    }

    /// Zero every step at or beyond each sequence's valid length
    ///
    /// # Arguments
    /// * `valid_length` - Number of real steps per sequence, shape `[batch]`
    pub fn mask(self, valid_length: &Tensor<B, 1, Int>, layout: Layout) -> Self {
        match self {
            Sequence::Merged(tensor) => {
                let dims = tensor.dims();
                let masks = (0..dims[layout.time_axis()])
                    .map(|t| step_mask(valid_length, t))
                    .collect::<Vec<_>>();
                if masks.is_empty() {
                    return Sequence::Merged(tensor);
                }
                // [batch, time] or [time, batch], then broadcast over features
                let mask: Tensor<B, 2> = Tensor::stack(masks, layout.time_axis());
                let mask: Tensor<B, 3> = mask.unsqueeze_dim::<3>(2).expand(dims);
                Sequence::Merged(tensor * mask)
            }
            Sequence::PerStep(steps) => Sequence::PerStep(
                steps
                    .into_iter()
                    .enumerate()
                    .map(|(t, step)| {
                        let dims = step.dims();
                        let mask: Tensor<B, 2> =
                            step_mask(valid_length, t).unsqueeze_dim::<2>(1).expand(dims);
                        step * mask
                    })
                    .collect(),
            ),
        }
    }

    /// Element-wise sum, converting `other` to this sequence's convention first
    pub fn add(self, other: Sequence<B>, layout: Layout) -> Self {
        match self {
            Sequence::Merged(lhs) => match other.normalize(layout, true) {
                Sequence::Merged(rhs) => Sequence::Merged(lhs + rhs),
                // an empty rhs has nothing to contribute
                Sequence::PerStep(_) => Sequence::Merged(lhs),
            },
            Sequence::PerStep(lhs) => {
                let rhs = other.into_steps(layout);
                Sequence::PerStep(lhs.into_iter().zip(rhs).map(|(a, b)| a + b).collect())
            }
        }
    }
}

/// `1.0` where `t < valid_length[b]`, `0.0` elsewhere; shape `[batch]`
pub(crate) fn step_mask<B: Backend>(valid_length: &Tensor<B, 1, Int>, t: usize) -> Tensor<B, 1> {
    valid_length.clone().greater_elem(t as i64).float()
}

/// Options for [`RecurrentCell::unroll`](super::RecurrentCell::unroll)
#[derive(Debug, Clone)]
pub struct UnrollOptions<B: Backend> {
    /// Layout of merged inputs and outputs
    pub layout: Layout,
    /// `Some(true)` stacks outputs, `Some(false)` keeps them per step,
    /// `None` follows the input convention
    pub merge_outputs: Option<bool>,
    /// Valid steps per sequence, shape `[batch]`
    pub valid_length: Option<Tensor<B, 1, Int>>,
    /// Whether residual wrappers add their input at this level
    pub apply_residual: bool,
}

impl<B: Backend> Default for UnrollOptions<B> {
    fn default() -> Self {
        Self {
            layout: Layout::default(),
            merge_outputs: None,
            valid_length: None,
            apply_residual: true,
        }
    }
}

impl<B: Backend> UnrollOptions<B> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the sequence layout (default: batch-major)
    pub fn with_layout(mut self, layout: Layout) -> Self {
        self.layout = layout;
        self
    }

    /// Force merged (`true`) or per-step (`false`) outputs
    pub fn with_merge_outputs(mut self, merge: bool) -> Self {
        self.merge_outputs = Some(merge);
        self
    }

    /// Mask steps beyond each sequence's valid length
    pub fn with_valid_length(mut self, valid_length: Tensor<B, 1, Int>) -> Self {
        self.valid_length = Some(valid_length);
        self
    }

    /// Enable or disable residual addition for this unroll level
    pub fn with_residual(mut self, apply_residual: bool) -> Self {
        self.apply_residual = apply_residual;
        self
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
    fn test_layout_axes() {
        assert_eq!(Layout::BatchMajor.time_axis(), 1);
        assert_eq!(Layout::BatchMajor.batch_axis(), 0);
        assert_eq!(Layout::TimeMajor.time_axis(), 0);
        assert_eq!(Layout::TimeMajor.batch_axis(), 1);
        assert_eq!(Layout::default(), Layout::BatchMajor);
    }

    #[test]
    fn test_layout_serde() {
        let json = serde_json::to_string(&Layout::TimeMajor).unwrap();
        let layout: Layout = serde_json::from_str(&json).unwrap();
        assert_eq!(layout, Layout::TimeMajor);
    }

    #[test]
    fn test_split_and_stack() {
        let device = get_test_device();

        for layout in [Layout::BatchMajor, Layout::TimeMajor] {
            let shape = match layout {
                Layout::BatchMajor => [2, 5, 3],
                Layout::TimeMajor => [5, 2, 3],
            };
            let tensor = Tensor::<TestBackend, 3>::random(
                shape,
                burn::tensor::Distribution::Uniform(-1.0, 1.0),
                &device,
            );
            let seq = Sequence::Merged(tensor.clone());
            assert_eq!(seq.len(layout), 5);

            let per_step = seq.normalize(layout, false);
            assert!(!per_step.is_merged());
            assert_eq!(per_step.len(layout), 5);

            let merged = per_step.normalize(layout, true);
            match merged {
                Sequence::Merged(back) => {
                    assert_eq!(back.dims(), shape);
                    let diff = (back - tensor).abs().max().into_scalar();
                    assert!(diff < 1e-6);
                }
                Sequence::PerStep(_) => panic!("expected merged sequence"),
            }
        }
    }

    #[test]
    fn test_mask_merged() {
        let device = get_test_device();
        let seq = Sequence::Merged(Tensor::<TestBackend, 3>::ones([2, 4, 3], &device));
        let valid = Tensor::<TestBackend, 1, Int>::from_ints([4, 1], &device);

        let masked = match seq.mask(&valid, Layout::BatchMajor) {
            Sequence::Merged(t) => t,
            Sequence::PerStep(_) => panic!("mask must keep the convention"),
        };

        let first = masked.clone().narrow(0, 0, 1).sum().into_scalar();
        let second = masked.clone().narrow(0, 1, 1).sum().into_scalar();
        assert_eq!(first, 12.0);
        assert_eq!(second, 3.0);
    }

    #[test]
    fn test_mask_time_major_per_step() {
        let device = get_test_device();
        let steps = (0..3)
            .map(|_| Tensor::<TestBackend, 2>::ones([2, 2], &device))
            .collect();
        let valid = Tensor::<TestBackend, 1, Int>::from_ints([2, 0], &device);

        let masked = Sequence::PerStep(steps).mask(&valid, Layout::TimeMajor);
        let sums: Vec<f32> = masked
            .into_steps(Layout::TimeMajor)
            .into_iter()
            .map(|s| s.sum().into_scalar())
            .collect();

        assert_eq!(sums, vec![2.0, 2.0, 0.0]);
    }

    #[test]
    fn test_add_mixed_conventions() {
        let device = get_test_device();
        let merged = Sequence::Merged(Tensor::<TestBackend, 3>::ones([2, 3, 4], &device));
        let per_step = Sequence::PerStep(
            (0..3)
                .map(|_| Tensor::<TestBackend, 2>::ones([2, 4], &device))
                .collect(),
        );

        let sum = merged.add(per_step, Layout::BatchMajor);
        match sum {
            Sequence::Merged(t) => assert_eq!(t.sum().into_scalar(), 48.0),
            Sequence::PerStep(_) => panic!("expected merged sum"),
        }
    }

    #[test]
    fn test_empty_sequence_stays_empty() {
        let seq: Sequence<TestBackend> = Sequence::PerStep(vec![]);
        let seq = seq.normalize(Layout::BatchMajor, true);

        assert!(!seq.is_merged());
        assert!(seq.is_empty(Layout::BatchMajor));
    }

    #[test]
    fn test_options_builder() {
        let device = get_test_device();
        let options = UnrollOptions::<TestBackend>::new()
            .with_layout(Layout::TimeMajor)
            .with_merge_outputs(false)
            .with_valid_length(Tensor::from_ints([1, 2], &device))
            .with_residual(false);

        assert_eq!(options.layout, Layout::TimeMajor);
        assert_eq!(options.merge_outputs, Some(false));
        assert!(options.valid_length.is_some());
        assert!(!options.apply_residual);
        assert!(UnrollOptions::<TestBackend>::default().apply_residual);
    }
}

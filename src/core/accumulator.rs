// Copyright @yucwang 2026

use std::sync::Mutex;

use crate::math::bitmap::Bitmap;
use crate::math::constants::Float;

struct AccumulatorState {
    mean: Bitmap,
    num_samples: u64,
}

/// Running per-pixel mean over whole-image samples. Workers hand in one
/// frame at a time and the mean is folded incrementally, so the estimate
/// can be read out at any moment without waiting for the workers.
pub struct SampleAccumulator {
    state: Mutex<AccumulatorState>,
}

impl SampleAccumulator {
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            state: Mutex::new(AccumulatorState {
                mean: Bitmap::new(width, height),
                num_samples: 0,
            }),
        }
    }

    /// Fold one full-image sample into the running mean:
    /// mean' = mean * n / (n + 1) + sample / (n + 1).
    pub fn add_sample(&self, sample: &Bitmap) {
        let mut state = self.state.lock().unwrap();

        let n = state.num_samples as Float;
        let old_weight = n / (n + 1.0);
        let new_weight = 1.0 / (n + 1.0);

        for y in 0..state.mean.height() {
            for x in 0..state.mean.width() {
                let folded = state.mean[(x, y)] * old_weight
                             + sample[(x, y)] * new_weight;
                state.mean[(x, y)] = folded;
            }
        }
        state.num_samples += 1;
    }

    /// Copy the current mean into `out` and return how many samples it
    /// averages. Reading does not disturb the accumulation.
    pub fn get_combined(&self, out: &mut Bitmap) -> u64 {
        let state = self.state.lock().unwrap();
        out.copy_from(&state.mean);
        state.num_samples
    }

    pub fn num_samples(&self) -> u64 {
        self.state.lock().unwrap().num_samples
    }
}

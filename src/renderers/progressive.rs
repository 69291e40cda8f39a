// Copyright @yucwang 2026

use std::sync::Arc;
use std::sync::atomic::{ AtomicBool, Ordering };
use std::thread;

use crate::core::accumulator::SampleAccumulator;
use crate::core::rng::LcgRng;
use crate::core::scene::Scene;
use crate::integrators::PathTracer;
use crate::math::bitmap::Bitmap;

/// Progressive renderer: every worker thread repeatedly traces a full
/// one-sample frame into its own bitmap and folds it into the shared
/// accumulator. The image sharpens for as long as the workers run; the
/// caller decides when it has converged enough and stops them.
pub struct ProgressiveRenderer {
    width: usize,
    height: usize,
    num_workers: usize,
    max_bounces: u32,
    seed: u64,
}

/// Handle to a running render: read the accumulator at any time, stop
/// when satisfied.
pub struct RenderSession {
    accumulator: Arc<SampleAccumulator>,
    stop: Arc<AtomicBool>,
    workers: Vec<thread::JoinHandle<()>>,
}

impl ProgressiveRenderer {
    pub fn new(width: usize, height: usize, num_workers: usize,
               max_bounces: u32, seed: u64) -> Self {
        Self { width, height, num_workers: num_workers.max(1), max_bounces, seed }
    }

    pub fn spawn(&self, scene: Arc<Scene>) -> RenderSession {
        let accumulator = Arc::new(SampleAccumulator::new(self.width, self.height));
        let stop = Arc::new(AtomicBool::new(false));

        log::info!("spawning {} render workers for a {}x{} film",
                   self.num_workers, self.width, self.height);

        let workers = (0..self.num_workers).map(|worker| {
            let scene = Arc::clone(&scene);
            let accumulator = Arc::clone(&accumulator);
            let stop = Arc::clone(&stop);
            let tracer = PathTracer::new(self.max_bounces);
            let width = self.width;
            let height = self.height;
            // decorrelate the workers' sample streams
            let seed = self.seed.wrapping_add(worker as u64)
                                .wrapping_mul(0x9e3779b97f4a7c15)
                                .wrapping_add(1);

            thread::spawn(move || {
                let mut rng = LcgRng::new(seed);
                let mut frame = Bitmap::new(width, height);
                while !stop.load(Ordering::Relaxed) {
                    tracer.trace_frame(&scene, &mut frame, &mut rng);
                    accumulator.add_sample(&frame);
                }
            })
        }).collect();

        RenderSession { accumulator, stop, workers }
    }
}

impl RenderSession {
    pub fn accumulator(&self) -> &SampleAccumulator {
        &self.accumulator
    }

    pub fn num_samples(&self) -> u64 {
        self.accumulator.num_samples()
    }

    /// Signal the workers, wait for the frames already in flight to land,
    /// and hand the accumulator back.
    pub fn stop(self) -> Arc<SampleAccumulator> {
        self.stop.store(true, Ordering::Relaxed);
        for worker in self.workers {
            if worker.join().is_err() {
                log::error!("a render worker panicked");
            }
        }
        self.accumulator
    }
}

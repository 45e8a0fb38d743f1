//! 2D crossfade fallback used when the GPU gate reports unavailable.
//!
//! Runs the same step protocol as the 3D styles but publishes nothing more
//! than a per-slide opacity list: outgoing slide fades 1 to 0, incoming 0 to
//! 1 over the configured duration. The public index/direction contract is
//! unchanged.

use crate::engine::{Snapshot, Step, TransitionStyle};
use crate::loader::ResourceSet;

#[derive(Debug, Clone)]
pub struct CrossfadeSnapshot {
    /// One opacity per slide; exactly one is 1.0 at rest, all others 0.
    pub opacities: Vec<f32>,
}

#[derive(Debug)]
pub struct CrossfadeFallback {
    slide_count: usize,
    displayed: usize,
    pair: Option<(usize, usize)>,
    alpha: f32,
}

impl CrossfadeFallback {
    #[must_use]
    pub fn new() -> Self {
        Self {
            slide_count: 0,
            displayed: 0,
            pair: None,
            alpha: 0.0,
        }
    }
}

impl Default for CrossfadeFallback {
    fn default() -> Self {
        Self::new()
    }
}

impl TransitionStyle for CrossfadeFallback {
    fn bind_resources(&mut self, resources: &ResourceSet, _target_aspect: f32, displayed: usize) {
        self.slide_count = resources.len();
        self.displayed = displayed;
        self.pair = None;
        self.alpha = 0.0;
    }

    fn begin_step(&mut self, step: Step) {
        self.pair = Some((step.from, step.to));
        self.alpha = 0.0;
    }

    fn commit_step(&mut self, displayed: usize) {
        self.displayed = displayed;
        self.pair = None;
        self.alpha = 0.0;
    }

    fn update(&mut self, progress: f32, _dt: f32) {
        self.alpha = progress.clamp(0.0, 1.0);
    }

    fn snapshot(&self) -> Snapshot {
        let mut opacities = vec![0.0; self.slide_count];
        match self.pair {
            Some((from, to)) => {
                if let Some(slot) = opacities.get_mut(from) {
                    *slot = 1.0 - self.alpha;
                }
                if let Some(slot) = opacities.get_mut(to) {
                    *slot = self.alpha;
                }
            }
            None => {
                if let Some(slot) = opacities.get_mut(self.displayed) {
                    *slot = 1.0;
                }
            }
        }
        Snapshot::Crossfade(CrossfadeSnapshot { opacities })
    }
}

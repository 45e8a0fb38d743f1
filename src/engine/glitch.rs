//! Glitch style: shader uniform values, not geometry.
//!
//! An envelope with a long hold at the peak drives chromatic aberration,
//! two erratically jittered ghost layers, scanlines and film grain. The
//! displayed texture flips from current to next discretely at progress 0.5,
//! so the swap itself lands under peak distortion and is never seen as a
//! crossfade.

use rand::Rng;
use rand::SeedableRng;
use rand::rngs::StdRng;

use crate::engine::{Snapshot, Step, TransitionStyle, ease};
use crate::layout::{CoverFit, cover_fit};
use crate::loader::ResourceSet;

/// Largest ghost-layer UV displacement at full envelope.
const LAYER_MAX_UV_OFFSET: f32 = 0.08;
/// Largest ghost-layer hue rotation, radians.
const LAYER_MAX_HUE: f32 = std::f32::consts::PI;
/// Exponential smoothing rate toward the jitter target, per second.
const JITTER_SMOOTHING: f32 = 18.0;
/// Jitter re-randomization interval: `MIN_HOLD + r^2 * EXTRA` seconds.
/// Squaring `r` skews toward frequent short bursts.
const JITTER_MIN_HOLD: f32 = 0.02;
const JITTER_EXTRA_HOLD: f32 = 0.25;

/// One ghost overlay layer as the shader sees it.
#[derive(Debug, Clone, Copy)]
pub struct GlitchLayer {
    pub uv_offset: [f32; 2],
    /// Hue rotation in radians.
    pub hue: f32,
}

#[derive(Debug, Clone)]
pub struct GlitchSnapshot {
    /// The slide texture to sample: current before progress 0.5, next after.
    pub texture: usize,
    pub uv: CoverFit,
    /// Envelope-scaled intensities, each already multiplied by its knob.
    pub aberration: f32,
    pub scanline: f32,
    pub grain: f32,
    /// Ghost layers, offsets already envelope-scaled.
    pub layers: [GlitchLayer; 2],
    /// Raw envelope value, used as the ghost-layer blend weight.
    pub layer_strength: f32,
    /// Monotonic seconds for the grain hash.
    pub time: f32,
}

/// Jump-and-decay jitter: a random target reached by exponential smoothing,
/// re-randomized at random intervals.
#[derive(Debug, Clone, Copy)]
struct JitterLayer {
    offset: [f32; 2],
    hue: f32,
    target_offset: [f32; 2],
    target_hue: f32,
    hold: f32,
}

impl JitterLayer {
    fn new() -> Self {
        Self {
            offset: [0.0, 0.0],
            hue: 0.0,
            target_offset: [0.0, 0.0],
            target_hue: 0.0,
            hold: 0.0,
        }
    }

    fn update(&mut self, dt: f32, rng: &mut StdRng) {
        self.hold -= dt;
        if self.hold <= 0.0 {
            let r: f32 = rng.random();
            self.hold = JITTER_MIN_HOLD + r * r * JITTER_EXTRA_HOLD;
            self.target_offset = [
                rng.random_range(-1.0..1.0) * LAYER_MAX_UV_OFFSET,
                rng.random_range(-1.0..1.0) * LAYER_MAX_UV_OFFSET,
            ];
            self.target_hue = rng.random_range(-1.0..1.0) * LAYER_MAX_HUE;
        }
        let k = 1.0 - (-dt * JITTER_SMOOTHING).exp();
        self.offset[0] += (self.target_offset[0] - self.offset[0]) * k;
        self.offset[1] += (self.target_offset[1] - self.offset[1]) * k;
        self.hue += (self.target_hue - self.hue) * k;
    }
}

#[derive(Debug)]
pub struct GlitchStyle {
    aberration_knob: f32,
    scanline_knob: f32,
    grain_knob: f32,
    rng: StdRng,
    layers: [JitterLayer; 2],
    progress: f32,
    time: f32,
    current: usize,
    incoming: Option<usize>,
    uvs: Vec<CoverFit>,
}

impl GlitchStyle {
    #[must_use]
    pub fn new(aberration: f32, scanline: f32, grain: f32) -> Self {
        Self::with_rng(aberration, scanline, grain, StdRng::from_os_rng())
    }

    /// Deterministic jitter for tests.
    #[must_use]
    pub fn with_seed(aberration: f32, scanline: f32, grain: f32, seed: u64) -> Self {
        Self::with_rng(aberration, scanline, grain, StdRng::seed_from_u64(seed))
    }

    fn with_rng(aberration: f32, scanline: f32, grain: f32, rng: StdRng) -> Self {
        Self {
            aberration_knob: aberration,
            scanline_knob: scanline,
            grain_knob: grain,
            rng,
            layers: [JitterLayer::new(), JitterLayer::new()],
            progress: 0.0,
            time: 0.0,
            current: 0,
            incoming: None,
            uvs: Vec::new(),
        }
    }

    /// The texture the shader samples this frame. The instant swap at 0.5
    /// is deliberate; peak distortion masks it.
    #[must_use]
    pub fn displayed_texture(&self) -> usize {
        match self.incoming {
            Some(next) if self.progress >= 0.5 => next,
            _ => self.current,
        }
    }

    fn uv(&self, texture: usize) -> CoverFit {
        self.uvs.get(texture).copied().unwrap_or(CoverFit::IDENTITY)
    }
}

impl TransitionStyle for GlitchStyle {
    fn bind_resources(&mut self, resources: &ResourceSet, target_aspect: f32, displayed: usize) {
        self.uvs = resources
            .aspects()
            .into_iter()
            .map(|aspect| cover_fit(aspect, target_aspect))
            .collect();
        self.current = displayed;
        self.incoming = None;
        self.progress = 0.0;
    }

    fn begin_step(&mut self, step: Step) {
        self.incoming = Some(step.to);
        self.progress = 0.0;
    }

    fn commit_step(&mut self, displayed: usize) {
        self.current = displayed;
        self.incoming = None;
        self.progress = 0.0;
    }

    fn update(&mut self, progress: f32, dt: f32) {
        self.progress = progress;
        self.time += dt;
        if self.incoming.is_some() {
            for layer in &mut self.layers {
                layer.update(dt, &mut self.rng);
            }
        }
    }

    fn snapshot(&self) -> Snapshot {
        let envelope = if self.incoming.is_some() {
            ease::glitch_envelope(self.progress)
        } else {
            0.0
        };
        let texture = self.displayed_texture();
        Snapshot::Glitch(GlitchSnapshot {
            texture,
            uv: self.uv(texture),
            aberration: envelope * self.aberration_knob,
            scanline: envelope * self.scanline_knob,
            grain: envelope * self.grain_knob,
            layers: [
                GlitchLayer {
                    uv_offset: [
                        self.layers[0].offset[0] * envelope,
                        self.layers[0].offset[1] * envelope,
                    ],
                    hue: self.layers[0].hue,
                },
                GlitchLayer {
                    uv_offset: [
                        self.layers[1].offset[0] * envelope,
                        self.layers[1].offset[1] * envelope,
                    ],
                    hue: self.layers[1].hue,
                },
            ],
            layer_strength: envelope,
            time: self.time,
        })
    }
}

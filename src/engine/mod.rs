//! Transition animation engine.
//!
//! The engine is a frame-driven state machine: the control surface
//! ([`Slider`]) turns navigation requests into a target index, the shared
//! [`Stepper`] walks one slide at a time toward that target, and the active
//! style turns step progress into a plain-data [`Snapshot`] that a
//! presentation layer applies to whatever graphics API is in use. None of
//! this touches the GPU, so all of the animation math is unit-testable.

pub mod cascade;
pub mod clock;
pub mod cube;
pub mod ease;
pub mod fallback;
pub mod glitch;

use std::sync::Arc;

use crossbeam_channel::Receiver;
use tracing::debug;

use crate::capability;
use crate::config::{SliderConfig, StyleKind};
use crate::error::Error;
use crate::loader::{ResourceSet, spawn_loader};
use crate::slide::Slide;

pub use cascade::{CascadeSnapshot, CascadeStyle, grid_size};
pub use clock::FrameClock;
pub use cube::{Axis, CubeSnapshot, CubeStyle};
pub use fallback::{CrossfadeFallback, CrossfadeSnapshot};
pub use glitch::{GlitchSnapshot, GlitchStyle};

/// Caller-declared travel direction. Derived from next/prev semantics, never
/// from numeric index comparison: wrapping from the last slide to slide 0
/// via `next()` is still `Forward`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Forward,
    Backward,
}

impl Direction {
    #[must_use]
    pub fn signum(self) -> i64 {
        match self {
            Self::Forward => 1,
            Self::Backward => -1,
        }
    }
}

/// One single-slide transition, the atomic unit of animation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Step {
    pub from: usize,
    pub to: usize,
    pub direction: Direction,
}

/// What happened inside one `Stepper::advance` call, in order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepEvent {
    Began(Step),
    Committed(usize),
}

/// Speed multiplier applied while further steps are queued behind the
/// in-flight one, so a burst of navigation catches up instead of dragging.
pub const RUSH_FACTOR: f32 = 4.0;

/// The shared single-step-at-a-time advancement protocol.
///
/// The stepper never jumps to the target: it advances one slide per step in
/// the direction of the current flag, committing the displayed index only
/// when a step's progress reaches 1. Retargeting mid-flight queues; the
/// in-flight step always finishes untouched.
#[derive(Debug)]
pub struct Stepper {
    slide_count: usize,
    displayed: usize,
    target: usize,
    direction: Direction,
    progress: f32,
    active: Option<Step>,
}

impl Stepper {
    #[must_use]
    pub fn new(slide_count: usize) -> Self {
        Self {
            slide_count,
            displayed: 0,
            target: 0,
            direction: Direction::Forward,
            progress: 0.0,
            active: None,
        }
    }

    #[must_use]
    pub fn displayed(&self) -> usize {
        self.displayed
    }

    #[must_use]
    pub fn target(&self) -> usize {
        self.target
    }

    #[must_use]
    pub fn direction(&self) -> Direction {
        self.direction
    }

    #[must_use]
    pub fn progress(&self) -> f32 {
        self.progress
    }

    #[must_use]
    pub fn is_animating(&self) -> bool {
        self.active.is_some()
    }

    /// Update where future steps head. Never touches the in-flight step.
    /// Out-of-range targets are ignored.
    pub fn retarget(&mut self, target: usize, direction: Direction) {
        if target >= self.slide_count {
            return;
        }
        self.target = target;
        self.direction = direction;
    }

    fn neighbor(&self, index: usize, direction: Direction) -> usize {
        match direction {
            Direction::Forward => (index + 1) % self.slide_count,
            Direction::Backward => (index + self.slide_count - 1) % self.slide_count,
        }
    }

    /// Steps still queued once the machine stands at `from`, walking in the
    /// current direction.
    fn steps_remaining_from(&self, from: usize) -> usize {
        match self.direction {
            Direction::Forward => (self.target + self.slide_count - from) % self.slide_count,
            Direction::Backward => (from + self.slide_count - self.target) % self.slide_count,
        }
    }

    /// Accumulate `dt` seconds of animation at `1000 / duration_ms` progress
    /// per second. Progress clamps to 1 (never overshoots); a commit that
    /// leaves the target unreached immediately begins the next step, which
    /// is what turns rapid navigation into one continuous sweep.
    pub fn advance(&mut self, dt: f32, duration_ms: f32) -> Vec<StepEvent> {
        let mut events = Vec::new();
        if self.slide_count == 0 {
            return events;
        }
        let mut budget = dt.max(0.0) * (1000.0 / duration_ms.max(1.0));
        loop {
            if self.active.is_none() {
                if self.displayed == self.target {
                    break;
                }
                let step = Step {
                    from: self.displayed,
                    to: self.neighbor(self.displayed, self.direction),
                    direction: self.direction,
                };
                self.active = Some(step);
                self.progress = 0.0;
                events.push(StepEvent::Began(step));
            }
            if budget <= 0.0 {
                break;
            }
            let step = self.active.expect("stepper has an active step");
            let rush = if self.steps_remaining_from(step.to) > 0 {
                RUSH_FACTOR
            } else {
                1.0
            };
            let needed = 1.0 - self.progress;
            let gain = budget * rush;
            if gain < needed {
                self.progress += gain;
                break;
            }
            // Step boundary: clamp to exactly 1, commit, keep walking with
            // whatever budget is left.
            budget -= needed / rush;
            self.progress = 1.0;
            self.displayed = step.to;
            self.active = None;
            events.push(StepEvent::Committed(step.to));
        }
        events
    }
}

/// Per-frame visual state handed to the presentation layer.
#[derive(Debug, Clone)]
pub enum Snapshot {
    /// The load barrier has not completed; nothing to draw yet.
    Loading,
    Cube(CubeSnapshot),
    Cascade(CascadeSnapshot),
    Glitch(GlitchSnapshot),
    Crossfade(CrossfadeSnapshot),
}

/// A transition style: owns its geometry/uniform state exclusively and
/// publishes it as a snapshot each frame.
pub trait TransitionStyle {
    /// Bind the decoded resource set once the load barrier completes.
    fn bind_resources(&mut self, resources: &ResourceSet, target_aspect: f32, displayed: usize);

    /// A step begins: assign current/next textures to the geometry.
    fn begin_step(&mut self, step: Step);

    /// A step committed: adopt `displayed` and reset to rest pose.
    fn commit_step(&mut self, displayed: usize);

    /// Per-frame update. `progress` is the in-flight step progress, 0 when
    /// idle; `dt` is the frame delta in seconds.
    fn update(&mut self, progress: f32, dt: f32);

    fn snapshot(&self) -> Snapshot;
}

/// The public control surface of the widget.
///
/// Owns the stepper, the active style and the loader barrier. Navigation
/// requests arriving before readiness coalesce into the target that is
/// current when loading completes; no animation advances before then.
pub struct Slider {
    config: SliderConfig,
    slide_count: usize,
    stepper: Stepper,
    style: Box<dyn TransitionStyle>,
    resources: Option<Arc<ResourceSet>>,
    loader_rx: Option<Receiver<Arc<ResourceSet>>>,
    ready: bool,
    fallback_active: bool,
    gpu_missing: bool,
    on_slide_change: Option<Box<dyn FnMut(usize)>>,
    on_ready: Option<Box<dyn FnOnce()>>,
    on_gpu_unavailable: Option<Box<dyn FnOnce()>>,
}

impl Slider {
    /// Create a slider and start loading `slides` in the background.
    ///
    /// # Errors
    /// Returns [`Error::BadSlideSet`] for an empty slide list.
    pub fn new(slides: Vec<Slide>, config: SliderConfig) -> Result<Self, Error> {
        if slides.is_empty() {
            return Err(Error::BadSlideSet("slide list is empty".into()));
        }
        let slide_count = slides.len();
        let loader_rx = spawn_loader(slides);
        Ok(Self::build(config, slide_count, None, Some(loader_rx)))
    }

    /// Create a slider over an already-decoded resource set. This is the
    /// shared-cache path: any number of sliders may hold the same `Arc`.
    ///
    /// # Errors
    /// Returns [`Error::BadSlideSet`] for an empty resource set.
    pub fn with_resources(
        resources: Arc<ResourceSet>,
        config: SliderConfig,
    ) -> Result<Self, Error> {
        if resources.is_empty() {
            return Err(Error::BadSlideSet("resource set is empty".into()));
        }
        let slide_count = resources.len();
        Ok(Self::build(config, slide_count, Some(resources), None))
    }

    fn build(
        config: SliderConfig,
        slide_count: usize,
        resources: Option<Arc<ResourceSet>>,
        loader_rx: Option<Receiver<Arc<ResourceSet>>>,
    ) -> Self {
        let (style, fallback_active, gpu_missing) = make_style(&config);
        Self {
            stepper: Stepper::new(slide_count),
            config,
            slide_count,
            style,
            resources,
            loader_rx,
            ready: false,
            fallback_active,
            gpu_missing,
            on_slide_change: None,
            on_ready: None,
            on_gpu_unavailable: None,
        }
    }

    #[must_use]
    pub fn current_index(&self) -> usize {
        self.stepper.displayed()
    }

    #[must_use]
    pub fn slide_count(&self) -> usize {
        self.slide_count
    }

    #[must_use]
    pub fn is_ready(&self) -> bool {
        self.ready
    }

    #[must_use]
    pub fn is_animating(&self) -> bool {
        self.stepper.is_animating()
    }

    /// True when the crossfade fallback is presenting, either because the
    /// GPU gate reported unavailable or because the config forced it.
    #[must_use]
    pub fn fallback_active(&self) -> bool {
        self.fallback_active
    }

    #[must_use]
    pub fn resources(&self) -> Option<&Arc<ResourceSet>> {
        self.resources.as_ref()
    }

    #[must_use]
    pub fn config(&self) -> &SliderConfig {
        &self.config
    }

    /// Request one step forward. No-op at the last slide when `loop` is off.
    pub fn next(&mut self) {
        if self.slide_count == 0 {
            return;
        }
        let from = self.stepper.target();
        if !self.config.looping && from + 1 >= self.slide_count {
            return;
        }
        let target = (from + 1) % self.slide_count;
        self.stepper.retarget(target, Direction::Forward);
    }

    /// Request one step backward. No-op at slide 0 when `loop` is off.
    pub fn prev(&mut self) {
        if self.slide_count == 0 {
            return;
        }
        let from = self.stepper.target();
        if !self.config.looping && from == 0 {
            return;
        }
        let target = (from + self.slide_count - 1) % self.slide_count;
        self.stepper.retarget(target, Direction::Backward);
    }

    /// Request a jump to `index`; direction is `Forward` iff `index` is
    /// greater than the currently displayed slide. Out-of-range indices are
    /// silently ignored.
    pub fn go_to(&mut self, index: usize) {
        if index >= self.slide_count {
            return;
        }
        if index == self.stepper.displayed() && index == self.stepper.target() {
            return;
        }
        let direction = if index > self.stepper.displayed() {
            Direction::Forward
        } else {
            Direction::Backward
        };
        self.stepper.retarget(index, direction);
    }

    /// Fired whenever the authoritative index changes, plus once at mount.
    pub fn set_on_slide_change(&mut self, cb: impl FnMut(usize) + 'static) {
        self.on_slide_change = Some(Box::new(cb));
    }

    /// One-shot: the load barrier completed.
    pub fn set_on_ready(&mut self, cb: impl FnOnce() + 'static) {
        self.on_ready = Some(Box::new(cb));
    }

    /// One-shot: the GPU gate reported unavailable and the fallback took
    /// over.
    pub fn set_on_gpu_unavailable(&mut self, cb: impl FnOnce() + 'static) {
        self.on_gpu_unavailable = Some(Box::new(cb));
    }

    /// The per-frame tick: polls the load barrier, drives the stepper and
    /// the style, and returns the visual state to present.
    pub fn advance(&mut self, dt: f32) -> Snapshot {
        if self.gpu_missing
            && let Some(cb) = self.on_gpu_unavailable.take()
        {
            cb();
        }

        if !self.ready {
            if self.resources.is_none()
                && let Some(rx) = &self.loader_rx
                && let Ok(set) = rx.try_recv()
            {
                self.resources = Some(set);
            }
            let Some(set) = &self.resources else {
                return Snapshot::Loading;
            };
            self.loader_rx = None;
            self.ready = true;
            self.style
                .bind_resources(set, self.config.aspect_ratio, self.stepper.displayed());
            debug!(slides = set.len(), "load barrier complete");
            if let Some(cb) = self.on_ready.take() {
                cb();
            }
            if let Some(cb) = &mut self.on_slide_change {
                cb(self.stepper.displayed());
            }
            // First animated frame starts on the next tick; requests that
            // arrived during loading are already coalesced in the target.
            return self.style.snapshot();
        }

        for event in self.stepper.advance(dt, self.config.duration_ms()) {
            match event {
                StepEvent::Began(step) => self.style.begin_step(step),
                StepEvent::Committed(index) => {
                    self.style.commit_step(index);
                    if let Some(cb) = &mut self.on_slide_change {
                        cb(index);
                    }
                }
            }
        }
        let progress = if self.stepper.is_animating() {
            self.stepper.progress()
        } else {
            0.0
        };
        self.style.update(progress, dt);
        self.style.snapshot()
    }
}

fn make_style(config: &SliderConfig) -> (Box<dyn TransitionStyle>, bool, bool) {
    let gpu_missing = !capability::gpu_available();
    if gpu_missing || config.force_fallback {
        return (Box::new(CrossfadeFallback::new()), true, gpu_missing);
    }
    let style: Box<dyn TransitionStyle> = match config.style {
        StyleKind::Cube => Box::new(CubeStyle::new()),
        StyleKind::Cascade => Box::new(CascadeStyle::new(config.min_tiles, config.aspect_ratio)),
        StyleKind::Glitch => Box::new(GlitchStyle::new(
            config.aberration_intensity,
            config.scanline_intensity,
            config.grain_intensity,
        )),
    };
    (style, false, false)
}

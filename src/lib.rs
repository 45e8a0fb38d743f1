//! Slideshow widget with 3D transition animations.
//!
//! The engine (state machines, loader, cover-fit) is pure and GPU-free; the
//! `render` module binds its per-frame snapshots to wgpu.

pub mod capability;
pub mod config;
pub mod engine;
pub mod error;
pub mod layout;
pub mod loader;
pub mod render;
pub mod slide;

pub use config::{SliderConfig, StyleKind};
pub use engine::{Direction, Slider, Snapshot};
pub use error::Error;
pub use layout::{CoverFit, cover_fit};
pub use slide::Slide;

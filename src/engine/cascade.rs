//! Cascading tile-grid style.
//!
//! The viewport is cut into a grid of tiles; each tile rotates 90 degrees
//! about its vertical edge to reveal the next slide on its back face. Tile
//! timing is staggered along a diagonal wave running from one corner to the
//! opposite one, mirrored for backward steps.

use crate::engine::{Direction, Snapshot, Step, TransitionStyle, ease};
use crate::layout::{CoverFit, cover_fit};
use crate::loader::ResourceSet;

/// Fraction of the step spent sweeping the wave across the grid; the
/// remaining `1 - WAVE_SPREAD` is each tile's local rotation window.
pub const WAVE_SPREAD: f32 = 0.7;

/// Grid dimensions `(rows, cols)` for a target aspect ratio: the shorter
/// screen dimension gets exactly `min_tiles`, the longer one scales by the
/// aspect, and both are at least 2.
#[must_use]
#[allow(clippy::cast_precision_loss, clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn grid_size(min_tiles: u32, aspect: f32) -> (u32, u32) {
    let min_tiles = min_tiles.max(2);
    if !aspect.is_finite() || aspect <= 0.0 {
        return (min_tiles, min_tiles);
    }
    if aspect >= 1.0 {
        let cols = (min_tiles as f32 * aspect).round() as u32;
        (min_tiles, cols.max(2))
    } else {
        let rows = (min_tiles as f32 / aspect).round() as u32;
        (rows.max(2), min_tiles)
    }
}

#[derive(Debug, Clone)]
pub struct CascadeSnapshot {
    pub rows: u32,
    pub cols: u32,
    /// Current rotation of every tile in degrees, row-major. All zero at
    /// rest; full `90 * sign` once the wave has passed a tile.
    pub angles: Vec<f32>,
    /// Sign of the full per-tile rotation for the in-flight step.
    pub rotation_sign: f32,
    pub front_texture: usize,
    pub back_texture: Option<usize>,
    pub front_uv: CoverFit,
    pub back_uv: CoverFit,
}

#[derive(Debug)]
pub struct CascadeStyle {
    rows: u32,
    cols: u32,
    forward: bool,
    rotation_sign: f32,
    front: usize,
    back: Option<usize>,
    angles: Vec<f32>,
    uvs: Vec<CoverFit>,
}

impl CascadeStyle {
    #[must_use]
    pub fn new(min_tiles: u32, aspect: f32) -> Self {
        let (rows, cols) = grid_size(min_tiles, aspect);
        Self {
            rows,
            cols,
            forward: true,
            rotation_sign: 0.0,
            front: 0,
            back: None,
            angles: vec![0.0; (rows * cols) as usize],
            uvs: Vec::new(),
        }
    }

    #[must_use]
    pub fn rows(&self) -> u32 {
        self.rows
    }

    #[must_use]
    pub fn cols(&self) -> u32 {
        self.cols
    }

    /// A tile's slice of the step, as `(start, end)` in step progress. The
    /// diagonal index runs from the bottom-left corner for forward steps and
    /// is mirrored horizontally for backward ones; a tile shows no rotation
    /// until `start` and holds the full turn after `end`.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn tile_window(&self, row: u32, col: u32) -> (f32, f32) {
        let wave_col = if self.forward { col } else { self.cols - 1 - col };
        let diagonal = wave_col + (self.rows - 1 - row);
        let max_diagonal = (self.rows - 1) + (self.cols - 1);
        let normalized = if max_diagonal > 0 {
            diagonal as f32 / max_diagonal as f32
        } else {
            0.0
        };
        let start = normalized * WAVE_SPREAD;
        (start, start + (1.0 - WAVE_SPREAD))
    }

    fn uv(&self, texture: usize) -> CoverFit {
        self.uvs.get(texture).copied().unwrap_or(CoverFit::IDENTITY)
    }
}

impl TransitionStyle for CascadeStyle {
    fn bind_resources(&mut self, resources: &ResourceSet, target_aspect: f32, displayed: usize) {
        self.uvs = resources
            .aspects()
            .into_iter()
            .map(|aspect| cover_fit(aspect, target_aspect))
            .collect();
        self.front = displayed;
        self.back = None;
        self.angles.fill(0.0);
    }

    fn begin_step(&mut self, step: Step) {
        self.forward = step.direction == Direction::Forward;
        self.rotation_sign = match step.direction {
            Direction::Forward => -1.0,
            Direction::Backward => 1.0,
        };
        self.back = Some(step.to);
        self.angles.fill(0.0);
    }

    fn commit_step(&mut self, displayed: usize) {
        // Full-grid completion: every tile snaps to the new slide at rest.
        self.front = displayed;
        self.back = None;
        self.rotation_sign = 0.0;
        self.angles.fill(0.0);
    }

    fn update(&mut self, progress: f32, _dt: f32) {
        if self.back.is_none() {
            return;
        }
        for row in 0..self.rows {
            for col in 0..self.cols {
                let (start, end) = self.tile_window(row, col);
                let local = ((progress - start) / (end - start)).clamp(0.0, 1.0);
                let index = (row * self.cols + col) as usize;
                self.angles[index] = ease::cubic_in_out(local) * 90.0 * self.rotation_sign;
            }
        }
    }

    fn snapshot(&self) -> Snapshot {
        Snapshot::Cascade(CascadeSnapshot {
            rows: self.rows,
            cols: self.cols,
            angles: self.angles.clone(),
            rotation_sign: self.rotation_sign,
            front_texture: self.front,
            back_texture: self.back,
            front_uv: self.uv(self.front),
            back_uv: self.back.map_or(CoverFit::IDENTITY, |t| self.uv(t)),
        })
    }
}

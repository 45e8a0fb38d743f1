//! Cube rotation style.
//!
//! Two face planes share a pivot: the front face carries the current slide,
//! the incoming face is pre-positioned on the adjacent cube face chosen by
//! step parity (even steps rotate horizontally about Y, odd steps vertically
//! about X). The pivot rotates 90 degrees with a cubic ease and snaps back
//! to identity at the commit.

use crate::engine::{Step, TransitionStyle};
use crate::engine::{Snapshot, ease};
use crate::layout::{CoverFit, cover_fit};
use crate::loader::ResourceSet;

use super::Direction;

/// Rotation axis for the in-flight step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    X,
    Y,
}

/// One textured face plane.
#[derive(Debug, Clone, Copy)]
pub struct FaceQuad {
    pub texture: usize,
    pub uv: CoverFit,
}

#[derive(Debug, Clone)]
pub struct CubeSnapshot {
    pub axis: Axis,
    /// Eased pivot angle in degrees; 0 at rest.
    pub angle_deg: f32,
    /// Where the incoming face sits on the cube relative to the front face,
    /// in degrees about `axis`. Always the negation of the full step angle,
    /// so the pivot rotation carries it exactly to the front.
    pub incoming_offset_deg: f32,
    pub front: FaceQuad,
    pub incoming: Option<FaceQuad>,
}

#[derive(Debug)]
pub struct CubeStyle {
    /// Advances on forward steps, retreats on backward steps; the face edge
    /// it lands on picks the rotation axis, which is what keeps a direction
    /// reversal rotating back through the same face it came from.
    parity: i64,
    axis: Axis,
    /// Signed full rotation for the in-flight step (+/-90), 0 at rest.
    step_angle_deg: f32,
    /// Eased current pivot angle.
    angle_deg: f32,
    current: usize,
    incoming: Option<usize>,
    uvs: Vec<CoverFit>,
}

impl CubeStyle {
    #[must_use]
    pub fn new() -> Self {
        Self {
            parity: 0,
            axis: Axis::Y,
            step_angle_deg: 0.0,
            angle_deg: 0.0,
            current: 0,
            incoming: None,
            uvs: Vec::new(),
        }
    }

    fn uv(&self, texture: usize) -> CoverFit {
        self.uvs.get(texture).copied().unwrap_or(CoverFit::IDENTITY)
    }

    #[must_use]
    pub fn axis(&self) -> Axis {
        self.axis
    }

    #[must_use]
    pub fn step_angle_deg(&self) -> f32 {
        self.step_angle_deg
    }
}

impl Default for CubeStyle {
    fn default() -> Self {
        Self::new()
    }
}

impl TransitionStyle for CubeStyle {
    fn bind_resources(&mut self, resources: &ResourceSet, target_aspect: f32, displayed: usize) {
        self.uvs = resources
            .aspects()
            .into_iter()
            .map(|aspect| cover_fit(aspect, target_aspect))
            .collect();
        self.current = displayed;
        self.incoming = None;
        self.angle_deg = 0.0;
    }

    fn begin_step(&mut self, step: Step) {
        // A forward step consumes the edge at the counter and advances; a
        // backward step retreats first and reuses that edge, undoing the
        // matching forward step's rotation.
        let edge = match step.direction {
            Direction::Forward => {
                let e = self.parity;
                self.parity += 1;
                e
            }
            Direction::Backward => {
                self.parity -= 1;
                self.parity
            }
        };
        self.axis = if edge.rem_euclid(2) == 0 {
            Axis::Y
        } else {
            Axis::X
        };
        // Backward mirrors the forward sign for the same parity.
        self.step_angle_deg = match step.direction {
            Direction::Forward => -90.0,
            Direction::Backward => 90.0,
        };
        self.incoming = Some(step.to);
        self.angle_deg = 0.0;
    }

    fn commit_step(&mut self, displayed: usize) {
        // Rest pose: pivot back to identity, new texture on the front face.
        self.current = displayed;
        self.incoming = None;
        self.step_angle_deg = 0.0;
        self.angle_deg = 0.0;
    }

    fn update(&mut self, progress: f32, _dt: f32) {
        if self.incoming.is_some() {
            self.angle_deg = ease::cubic_in_out(progress) * self.step_angle_deg;
        }
    }

    fn snapshot(&self) -> Snapshot {
        Snapshot::Cube(CubeSnapshot {
            axis: self.axis,
            angle_deg: self.angle_deg,
            incoming_offset_deg: -self.step_angle_deg,
            front: FaceQuad {
                texture: self.current,
                uv: self.uv(self.current),
            },
            incoming: self.incoming.map(|texture| FaceQuad {
                texture,
                uv: self.uv(texture),
            }),
        })
    }
}

//! Cover-fit layout math shared by every transition style.
//!
//! The same crop rectangle feeds cube-face UVs, cascade tile UVs and the
//! glitch shader uniforms, so the math lives in exactly one place.

/// Normalized texture crop reproducing CSS `object-fit: cover`.
///
/// `scale_*` is the visible fraction of the source along each axis and
/// `offset_*` the left/top inset, both in `[0, 1]` texture coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CoverFit {
    pub scale_u: f32,
    pub scale_v: f32,
    pub offset_u: f32,
    pub offset_v: f32,
}

impl CoverFit {
    pub const IDENTITY: Self = Self {
        scale_u: 1.0,
        scale_v: 1.0,
        offset_u: 0.0,
        offset_v: 0.0,
    };

    /// Map a UV coordinate in the target rectangle into the cropped source.
    #[must_use]
    pub fn apply(&self, u: f32, v: f32) -> (f32, f32) {
        (
            self.offset_u + u * self.scale_u,
            self.offset_v + v * self.scale_v,
        )
    }
}

/// Compute the centered crop that fills a target rectangle of aspect
/// `target_aspect` with a source image of aspect `source_aspect`, with no
/// letterboxing.
///
/// A wider source is cropped left/right; a taller (or equal) source is
/// cropped top/bottom. Excess is always split symmetrically. Degenerate
/// aspects (zero, negative, non-finite) fall back to the identity crop.
#[must_use]
pub fn cover_fit(source_aspect: f32, target_aspect: f32) -> CoverFit {
    if !source_aspect.is_finite()
        || !target_aspect.is_finite()
        || source_aspect <= 0.0
        || target_aspect <= 0.0
    {
        return CoverFit::IDENTITY;
    }

    if source_aspect > target_aspect {
        // Source wider than target: crop left/right.
        let scale_u = target_aspect / source_aspect;
        CoverFit {
            scale_u,
            scale_v: 1.0,
            offset_u: (1.0 - scale_u) / 2.0,
            offset_v: 0.0,
        }
    } else {
        // Source taller or equal: crop top/bottom.
        let scale_v = source_aspect / target_aspect;
        CoverFit {
            scale_u: 1.0,
            scale_v,
            offset_u: 0.0,
            offset_v: (1.0 - scale_v) / 2.0,
        }
    }
}

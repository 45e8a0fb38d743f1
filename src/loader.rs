//! Background slide resource loader.
//!
//! Decodes every slide image off the render thread and delivers the whole
//! set at once: readiness is an all-or-nothing barrier, not a streaming
//! reveal. A slide whose image is missing or fails to decode gets a solid
//! placeholder instead of failing the batch.

use std::sync::Arc;
use std::thread;

use crossbeam_channel::{Receiver, bounded};
use tracing::{debug, warn};

use crate::slide::Slide;

/// Side of the synthesized solid-color placeholder.
const PLACEHOLDER_DIM: u32 = 16;

/// Decoded images larger than this on either side are downscaled before
/// upload so a stray 50-megapixel photo cannot blow the texture budget.
const MAX_DECODE_DIM: u32 = 4096;

/// One decoded drawable, ready for GPU upload.
#[derive(Debug, Clone)]
pub struct Resource {
    pub width: u32,
    pub height: u32,
    /// RGBA8 pixel buffer, `width * height * 4` bytes.
    pub pixels: Vec<u8>,
    /// Source aspect ratio (width / height) of the original image, not of
    /// the possibly-downscaled buffer.
    pub source_aspect: f32,
    /// True when this resource is a placeholder rather than a decoded image.
    pub placeholder: bool,
}

/// The loader's output: one [`Resource`] per slide, in input order.
///
/// Shared read-only (via [`Arc`]) between every style instance and the
/// viewer; dropping the last reference releases the decoded pixels.
#[derive(Debug)]
pub struct ResourceSet {
    resources: Vec<Resource>,
}

impl ResourceSet {
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&Resource> {
        self.resources.get(index)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.resources.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.resources.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Resource> {
        self.resources.iter()
    }

    /// Source aspect per slide, in order.
    #[must_use]
    pub fn aspects(&self) -> Vec<f32> {
        self.resources.iter().map(|r| r.source_aspect).collect()
    }
}

fn placeholder(slide: &Slide) -> Resource {
    let [r, g, b] = slide.background_color;
    let mut pixels = Vec::with_capacity((PLACEHOLDER_DIM * PLACEHOLDER_DIM * 4) as usize);
    for _ in 0..PLACEHOLDER_DIM * PLACEHOLDER_DIM {
        pixels.extend_from_slice(&[r, g, b, 255]);
    }
    Resource {
        width: PLACEHOLDER_DIM,
        height: PLACEHOLDER_DIM,
        pixels,
        source_aspect: 1.0,
        placeholder: true,
    }
}

fn decode_slide(slide: &Slide) -> Resource {
    let Some(path) = &slide.image else {
        return placeholder(slide);
    };
    match image::open(path) {
        Ok(img) => {
            let (src_w, src_h) = (img.width().max(1), img.height().max(1));
            #[allow(clippy::cast_precision_loss)]
            let source_aspect = src_w as f32 / src_h as f32;
            let img = if src_w > MAX_DECODE_DIM || src_h > MAX_DECODE_DIM {
                img.resize(MAX_DECODE_DIM, MAX_DECODE_DIM, image::imageops::Triangle)
            } else {
                img
            };
            let rgba = img.to_rgba8();
            let (width, height) = rgba.dimensions();
            debug!(id = %slide.id, width, height, "decoded slide image");
            Resource {
                width,
                height,
                pixels: rgba.into_raw(),
                source_aspect,
                placeholder: false,
            }
        }
        Err(err) => {
            // Recover locally: the barrier still completes with a placeholder.
            warn!(id = %slide.id, path = %path.display(), %err, "decode failed, using placeholder");
            placeholder(slide)
        }
    }
}

/// Decode every slide synchronously, in input order.
#[must_use]
pub fn load_resources(slides: &[Slide]) -> ResourceSet {
    ResourceSet {
        resources: slides.iter().map(decode_slide).collect(),
    }
}

/// Spawn the loader thread. Exactly one [`ResourceSet`] arrives on the
/// returned channel once every slide has settled; dropping the receiver
/// cancels delivery without leaving detached state behind.
#[must_use]
pub fn spawn_loader(slides: Vec<Slide>) -> Receiver<Arc<ResourceSet>> {
    let (tx, rx) = bounded(1);
    thread::spawn(move || {
        let set = Arc::new(load_resources(&slides));
        let _ = tx.send(set);
    });
    rx
}

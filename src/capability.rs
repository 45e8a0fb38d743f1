//! Process-wide GPU capability gate.
//!
//! The probe runs once per process and the verdict is cached; style
//! instances must never re-probe. Tests force the verdict instead of
//! touching real hardware.

use std::sync::atomic::{AtomicU8, Ordering};

use tracing::info;

const UNKNOWN: u8 = 0;
const AVAILABLE: u8 = 1;
const MISSING: u8 = 2;

static VERDICT: AtomicU8 = AtomicU8::new(UNKNOWN);

/// Report whether a GPU adapter can be acquired, probing on first call and
/// returning the cached verdict afterwards.
pub fn gpu_available() -> bool {
    match VERDICT.load(Ordering::Acquire) {
        AVAILABLE => true,
        MISSING => false,
        _ => {
            let ok = probe();
            info!(available = ok, "gpu capability probed");
            VERDICT.store(if ok { AVAILABLE } else { MISSING }, Ordering::Release);
            ok
        }
    }
}

/// Force (`Some`) or reset (`None`) the cached verdict. Test isolation hook;
/// never called on the production path.
pub fn override_for_tests(verdict: Option<bool>) {
    let raw = match verdict {
        Some(true) => AVAILABLE,
        Some(false) => MISSING,
        None => UNKNOWN,
    };
    VERDICT.store(raw, Ordering::Release);
}

fn probe() -> bool {
    let instance = wgpu::Instance::new(wgpu::InstanceDescriptor::default());
    pollster::block_on(instance.request_adapter(&wgpu::RequestAdapterOptions {
        power_preference: wgpu::PowerPreference::HighPerformance,
        compatible_surface: None,
        force_fallback_adapter: false,
    }))
    .is_some()
}

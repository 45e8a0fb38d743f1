//! Forced fallback with a working GPU gate. Separate test binary so the
//! process-global gate override does not collide with the fallback tests.

use std::cell::RefCell;
use std::rc::Rc;
use std::sync::Arc;

use slider3d::engine::Slider;
use slider3d::loader::load_resources;
use slider3d::{Slide, SliderConfig, Snapshot, capability};

fn slides(n: usize) -> Vec<Slide> {
    (0..n)
        .map(|i| Slide {
            id: format!("slide-{i}"),
            image: None,
            background_color: [128, 128, 128],
        })
        .collect()
}

#[test]
fn forced_fallback_presents_crossfade_without_the_gpu_callback() {
    capability::override_for_tests(Some(true));
    let mut config = SliderConfig::default();
    config.force_fallback = true;

    let resources = Arc::new(load_resources(&slides(2)));
    let mut slider = Slider::with_resources(resources, config).unwrap();
    let fired = Rc::new(RefCell::new(false));
    let sink = Rc::clone(&fired);
    slider.set_on_gpu_unavailable(move || *sink.borrow_mut() = true);

    let _ = slider.advance(0.0);
    assert!(slider.fallback_active());
    match slider.advance(0.016) {
        Snapshot::Crossfade(_) => {}
        other => panic!("expected crossfade snapshot, got {other:?}"),
    }
    // The GPU is present; forcing the fallback must not report it missing.
    assert!(!*fired.borrow());
}

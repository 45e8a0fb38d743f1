//! Runs with the GPU gate forced to "missing". Lives in its own test binary
//! because the gate verdict is process-global.

use std::cell::RefCell;
use std::rc::Rc;
use std::sync::Arc;
use std::time::Duration;

use slider3d::engine::Slider;
use slider3d::error::Error;
use slider3d::loader::load_resources;
use slider3d::render::viewer::run_slider;
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

fn ready_slider(n: usize, config: SliderConfig) -> Slider {
    capability::override_for_tests(Some(false));
    let resources = Arc::new(load_resources(&slides(n)));
    let mut slider = Slider::with_resources(resources, config).unwrap();
    let _ = slider.advance(0.0);
    assert!(slider.is_ready());
    slider
}

#[test]
fn missing_gpu_presents_the_crossfade() {
    let mut slider = ready_slider(3, SliderConfig::default());
    assert!(slider.fallback_active());
    match slider.advance(0.016) {
        Snapshot::Crossfade(snap) => {
            assert_eq!(snap.opacities, vec![1.0, 0.0, 0.0]);
        }
        other => panic!("expected crossfade snapshot, got {other:?}"),
    }
}

#[test]
fn gpu_unavailable_callback_fires_exactly_once() {
    capability::override_for_tests(Some(false));
    let resources = Arc::new(load_resources(&slides(2)));
    let mut slider = Slider::with_resources(resources, SliderConfig::default()).unwrap();
    let count = Rc::new(RefCell::new(0u32));
    let sink = Rc::clone(&count);
    slider.set_on_gpu_unavailable(move || *sink.borrow_mut() += 1);

    let _ = slider.advance(0.0);
    let _ = slider.advance(0.016);
    let _ = slider.advance(0.016);
    assert_eq!(*count.borrow(), 1);
}

#[test]
fn viewer_refuses_to_start_with_a_render_error() {
    capability::override_for_tests(Some(false));
    let resources = Arc::new(load_resources(&slides(2)));
    let mut slider = Slider::with_resources(resources, SliderConfig::default()).unwrap();
    let fired = Rc::new(RefCell::new(false));
    let sink = Rc::clone(&fired);
    slider.set_on_gpu_unavailable(move || *sink.borrow_mut() = true);

    match run_slider(slider) {
        Err(Error::Render(_)) => {}
        other => panic!("expected render error, got {other:?}"),
    }
    // The one-shot still fires before the viewer gives up.
    assert!(*fired.borrow());
}

#[test]
fn mid_step_opacities_cross_linearly() {
    let mut config = SliderConfig::default();
    config.transition_duration = Duration::from_millis(1000);
    let mut slider = ready_slider(3, config);

    slider.next();
    // Half the step in one frame: outgoing 0.5, incoming 0.5.
    match slider.advance(0.5) {
        Snapshot::Crossfade(snap) => {
            assert!((snap.opacities[0] - 0.5).abs() < 1e-5);
            assert!((snap.opacities[1] - 0.5).abs() < 1e-5);
            assert_eq!(snap.opacities[2], 0.0);
        }
        other => panic!("expected crossfade snapshot, got {other:?}"),
    }
}

#[test]
fn committed_step_rests_on_the_new_slide() {
    let mut config = SliderConfig::default();
    config.transition_duration = Duration::from_millis(100);
    let mut slider = ready_slider(3, config);

    slider.next();
    for _ in 0..400 {
        let _ = slider.advance(0.016);
        if !slider.is_animating() && slider.current_index() == 1 {
            break;
        }
    }
    match slider.advance(0.016) {
        Snapshot::Crossfade(snap) => {
            assert_eq!(snap.opacities, vec![0.0, 1.0, 0.0]);
        }
        other => panic!("expected crossfade snapshot, got {other:?}"),
    }
}

#[test]
fn navigation_contract_is_unchanged_under_fallback() {
    let mut config = SliderConfig::default();
    config.transition_duration = Duration::from_millis(100);
    let mut slider = ready_slider(4, config);
    let changes = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&changes);
    slider.set_on_slide_change(move |idx| sink.borrow_mut().push(idx));

    slider.go_to(2);
    for _ in 0..800 {
        let _ = slider.advance(0.016);
        if !slider.is_animating() && slider.current_index() == 2 {
            break;
        }
    }
    assert_eq!(*changes.borrow(), vec![1, 2]);
}

use slider3d::Direction;
use slider3d::Slide;
use slider3d::engine::{CascadeStyle, Snapshot, Step, TransitionStyle, grid_size};
use slider3d::loader::load_resources;

fn resources(n: usize) -> slider3d::loader::ResourceSet {
    let slides: Vec<Slide> = (0..n)
        .map(|i| Slide {
            id: format!("slide-{i}"),
            image: None,
            background_color: [128, 128, 128],
        })
        .collect();
    load_resources(&slides)
}

fn cascade_snapshot(style: &CascadeStyle) -> slider3d::engine::CascadeSnapshot {
    match style.snapshot() {
        Snapshot::Cascade(snap) => snap,
        other => panic!("expected cascade snapshot, got {other:?}"),
    }
}

#[test]
fn grid_size_scales_the_longer_dimension() {
    // Landscape: rows stay at min_tiles, columns stretch with the aspect.
    assert_eq!(grid_size(10, 2.0), (10, 20));
    assert_eq!(grid_size(10, 1.5), (10, 15));
    // Portrait mirrors: columns stay, rows stretch.
    assert_eq!(grid_size(10, 0.5), (20, 10));
    // Square.
    assert_eq!(grid_size(10, 1.0), (10, 10));
}

#[test]
fn grid_size_clamps_to_at_least_two_per_axis() {
    assert_eq!(grid_size(1, 1.0), (2, 2));
    assert_eq!(grid_size(0, 1.0), (2, 2));
    // Degenerate aspect falls back to a square grid.
    assert_eq!(grid_size(10, 0.0), (10, 10));
    assert_eq!(grid_size(10, f32::NAN), (10, 10));
}

#[test]
fn forward_wave_starts_at_the_bottom_left() {
    let mut style = CascadeStyle::new(2, 1.0);
    assert_eq!((style.rows(), style.cols()), (2, 2));
    style.bind_resources(&resources(2), 1.0, 0);
    style.begin_step(Step {
        from: 0,
        to: 1,
        direction: Direction::Forward,
    });

    // max diagonal = 2, wave spread 0.7, local window 0.3 wide.
    assert_eq!(style.tile_window(1, 0), (0.0, 0.3));
    let (start, end) = style.tile_window(0, 0);
    assert!((start - 0.35).abs() < 1e-6 && (end - 0.65).abs() < 1e-6);
    let (start, end) = style.tile_window(1, 1);
    assert!((start - 0.35).abs() < 1e-6 && (end - 0.65).abs() < 1e-6);
    let (start, end) = style.tile_window(0, 1);
    assert!((start - 0.7).abs() < 1e-6 && (end - 1.0).abs() < 1e-6);
}

#[test]
fn backward_wave_is_mirrored_horizontally() {
    let mut style = CascadeStyle::new(2, 1.0);
    style.bind_resources(&resources(2), 1.0, 1);
    style.begin_step(Step {
        from: 1,
        to: 0,
        direction: Direction::Backward,
    });

    // The bottom-right tile now leads.
    assert_eq!(style.tile_window(1, 1), (0.0, 0.3));
    let (start, end) = style.tile_window(0, 0);
    assert!((start - 0.7).abs() < 1e-6 && (end - 1.0).abs() < 1e-6);
}

#[test]
fn leading_tile_finishes_before_the_trailing_one_starts() {
    let mut style = CascadeStyle::new(2, 1.0);
    style.bind_resources(&resources(2), 1.0, 0);
    style.begin_step(Step {
        from: 0,
        to: 1,
        direction: Direction::Forward,
    });

    style.update(0.35, 0.016);
    let snap = cascade_snapshot(&style);
    // Row-major: [top-left, top-right, bottom-left, bottom-right].
    let bottom_left = snap.angles[2];
    let top_right = snap.angles[1];
    assert!((bottom_left - -90.0).abs() < 1e-4, "leader done: {bottom_left}");
    assert_eq!(top_right, 0.0, "trailer untouched");
}

#[test]
fn full_progress_turns_every_tile() {
    let mut style = CascadeStyle::new(3, 1.5);
    style.bind_resources(&resources(2), 1.5, 0);
    style.begin_step(Step {
        from: 0,
        to: 1,
        direction: Direction::Forward,
    });
    style.update(1.0, 0.016);
    let snap = cascade_snapshot(&style);
    assert_eq!(snap.rotation_sign, -1.0);
    assert_eq!(snap.back_texture, Some(1));
    for angle in &snap.angles {
        assert!((angle - -90.0).abs() < 1e-4);
    }
}

#[test]
fn backward_rotation_sign_is_positive() {
    let mut style = CascadeStyle::new(2, 1.0);
    style.bind_resources(&resources(2), 1.0, 1);
    style.begin_step(Step {
        from: 1,
        to: 0,
        direction: Direction::Backward,
    });
    style.update(1.0, 0.016);
    let snap = cascade_snapshot(&style);
    assert_eq!(snap.rotation_sign, 1.0);
    for angle in &snap.angles {
        assert!((angle - 90.0).abs() < 1e-4);
    }
}

#[test]
fn commit_snaps_the_grid_flat_on_the_new_slide() {
    let mut style = CascadeStyle::new(2, 1.0);
    style.bind_resources(&resources(2), 1.0, 0);
    style.begin_step(Step {
        from: 0,
        to: 1,
        direction: Direction::Forward,
    });
    style.update(1.0, 0.016);
    style.commit_step(1);

    let snap = cascade_snapshot(&style);
    assert_eq!(snap.front_texture, 1);
    assert_eq!(snap.back_texture, None);
    assert_eq!(snap.rotation_sign, 0.0);
    assert!(snap.angles.iter().all(|a| *a == 0.0));
}

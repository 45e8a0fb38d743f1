use slider3d::Direction;
use slider3d::engine::{Axis, CubeStyle, Snapshot, Step, TransitionStyle};
use slider3d::loader::load_resources;
use slider3d::Slide;

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

fn step(from: usize, to: usize, direction: Direction) -> Step {
    Step { from, to, direction }
}

fn cube_snapshot(style: &CubeStyle) -> slider3d::engine::CubeSnapshot {
    match style.snapshot() {
        Snapshot::Cube(snap) => snap,
        other => panic!("expected cube snapshot, got {other:?}"),
    }
}

#[test]
fn forward_steps_alternate_axes() {
    let mut style = CubeStyle::new();
    style.bind_resources(&resources(4), 1.5, 0);

    style.begin_step(step(0, 1, Direction::Forward));
    assert_eq!(style.axis(), Axis::Y);
    style.commit_step(1);

    style.begin_step(step(1, 2, Direction::Forward));
    assert_eq!(style.axis(), Axis::X);
    style.commit_step(2);

    style.begin_step(step(2, 3, Direction::Forward));
    assert_eq!(style.axis(), Axis::Y);
}

#[test]
fn backward_step_undoes_the_matching_forward_rotation() {
    let mut style = CubeStyle::new();
    style.bind_resources(&resources(3), 1.5, 0);

    style.begin_step(step(0, 1, Direction::Forward));
    assert_eq!(style.axis(), Axis::Y);
    assert_eq!(style.step_angle_deg(), -90.0);
    style.commit_step(1);

    // Going back rotates about the same edge, mirrored.
    style.begin_step(step(1, 0, Direction::Backward));
    assert_eq!(style.axis(), Axis::Y);
    assert_eq!(style.step_angle_deg(), 90.0);
    style.commit_step(0);

    // The parity counter is back where it started.
    style.begin_step(step(0, 1, Direction::Forward));
    assert_eq!(style.axis(), Axis::Y);
}

#[test]
fn deeper_backward_runs_walk_the_parity_down() {
    let mut style = CubeStyle::new();
    style.bind_resources(&resources(5), 1.5, 0);
    for (from, to) in [(0, 1), (1, 2), (2, 3)] {
        style.begin_step(step(from, to, Direction::Forward));
        style.commit_step(to);
    }
    // Three forward steps used edges 0, 1, 2; backing up revisits 2, 1, 0.
    style.begin_step(step(3, 2, Direction::Backward));
    assert_eq!(style.axis(), Axis::Y);
    style.commit_step(2);
    style.begin_step(step(2, 1, Direction::Backward));
    assert_eq!(style.axis(), Axis::X);
    style.commit_step(1);
    style.begin_step(step(1, 0, Direction::Backward));
    assert_eq!(style.axis(), Axis::Y);
}

#[test]
fn pivot_angle_follows_the_cubic_ease() {
    let mut style = CubeStyle::new();
    style.bind_resources(&resources(2), 1.5, 0);
    style.begin_step(step(0, 1, Direction::Forward));

    style.update(0.0, 0.016);
    assert_eq!(cube_snapshot(&style).angle_deg, 0.0);

    // cubic_in_out(0.5) = 0.5, so the pivot sits at half the step angle.
    style.update(0.5, 0.016);
    assert!((cube_snapshot(&style).angle_deg - -45.0).abs() < 1e-4);

    style.update(1.0, 0.016);
    assert!((cube_snapshot(&style).angle_deg - -90.0).abs() < 1e-4);
}

#[test]
fn incoming_face_offset_negates_the_step_angle() {
    let mut style = CubeStyle::new();
    style.bind_resources(&resources(2), 1.5, 0);

    style.begin_step(step(0, 1, Direction::Forward));
    let snap = cube_snapshot(&style);
    assert_eq!(snap.incoming_offset_deg, 90.0);
    assert_eq!(snap.front.texture, 0);
    assert_eq!(snap.incoming.unwrap().texture, 1);

    style.commit_step(1);
    style.begin_step(step(1, 0, Direction::Backward));
    assert_eq!(cube_snapshot(&style).incoming_offset_deg, -90.0);
}

#[test]
fn commit_returns_to_rest_pose() {
    let mut style = CubeStyle::new();
    style.bind_resources(&resources(3), 1.5, 0);
    style.begin_step(step(0, 1, Direction::Forward));
    style.update(0.8, 0.016);
    style.commit_step(1);

    let snap = cube_snapshot(&style);
    assert_eq!(snap.angle_deg, 0.0);
    assert_eq!(snap.incoming_offset_deg, 0.0);
    assert_eq!(snap.front.texture, 1);
    assert!(snap.incoming.is_none());
}

#[test]
fn faces_carry_cover_fit_uvs() {
    // Placeholder textures are square; on a 2:1 target the vertical span is
    // cropped to half.
    let mut style = CubeStyle::new();
    style.bind_resources(&resources(2), 2.0, 0);
    let snap = cube_snapshot(&style);
    assert!((snap.front.uv.scale_v - 0.5).abs() < 1e-6);
    assert!((snap.front.uv.offset_v - 0.25).abs() < 1e-6);
    assert!((snap.front.uv.scale_u - 1.0).abs() < 1e-6);
}

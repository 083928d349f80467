use cgmath::MetricSpace;
use instant::Duration;
use rocket_folio::{
    settings::Settings,
    sim::{
        camera_rig::{CameraMode, CameraRig},
        clock::FixedStep,
        day_night::DayNight,
        input::{Controls, Trigger},
        platforms::Platforms,
        projects::{Accordion, window_title},
        rocket::RocketState,
    },
};
use winit::keyboard::KeyCode;

const FRAME: Duration = Duration::from_millis(16);

#[test]
fn flying_forward_reaches_the_first_platform() {
    let settings = Settings::default();
    let mut controls = Controls::default();
    let mut rocket = RocketState::default();
    let mut platforms = Platforms::new(&settings.platforms, settings.projects.len());
    let mut clock = FixedStep::default();

    controls.handle_key(KeyCode::KeyW, true, false);
    let mut nearest = None;
    for _ in 0..2000 {
        for _ in 0..clock.advance(FRAME) {
            rocket.step(&controls, &settings.flight);
            platforms.step();
        }
        nearest = platforms.nearest(rocket.position).map(|p| p.project);
        if nearest.is_some() {
            break;
        }
    }
    assert_eq!(nearest, Some(0));
    assert!(rocket.speed > 0.0);
    assert!(rocket.exhaust().visible);

    controls.handle_key(KeyCode::KeyE, true, false);
    assert!(controls.take_trigger(Trigger::Interact));
    assert!(!controls.take_trigger(Trigger::Interact));

    let base = &settings.window.title;
    let mut accordion = Accordion::default();
    assert_eq!(window_title(base, &settings.projects, accordion.open()), base.as_str());

    let id = nearest.expect("a platform is in reach");
    assert!(accordion.toggle(id));
    let title = window_title(base, &settings.projects, accordion.open());
    assert_eq!(title, format!("{} | {}", base, settings.projects[0].summary()));
    assert!(title.contains(&settings.projects[0].link));

    assert!(!accordion.toggle(id));
    assert_eq!(window_title(base, &settings.projects, accordion.open()), base.as_str());
}

#[test]
fn releasing_the_throttle_brings_the_rocket_to_rest() {
    let settings = Settings::default();
    let mut controls = Controls::default();
    let mut rocket = RocketState::default();

    controls.handle_key(KeyCode::KeyW, true, false);
    for _ in 0..120 {
        rocket.step(&controls, &settings.flight);
    }
    controls.handle_key(KeyCode::KeyW, false, false);
    for _ in 0..2000 {
        rocket.step(&controls, &settings.flight);
    }
    assert_eq!(rocket.speed, 0.0);
    assert!(!rocket.exhaust().visible);
}

#[test]
fn chase_camera_trails_behind_the_rocket() {
    let settings = Settings::default();
    let mut controls = Controls::default();
    let mut rocket = RocketState::default();
    let mut rig = CameraRig::new(CameraMode::Chase);

    controls.handle_key(KeyCode::KeyW, true, false);
    for _ in 0..300 {
        rocket.step(&controls, &settings.flight);
        rig.step(&rocket, &settings.camera);
    }
    assert_eq!(rig.target, rocket.position);
    assert!(rig.eye.z > rocket.position.z);
    assert!(rig.eye.distance(rocket.position) > 5.0);

    rig.toggle();
    rig.step(&rocket, &settings.camera);
    assert_eq!(rig.eye, rocket.nose());
    assert!(rig.target.z < rig.eye.z);
}

#[test]
fn a_full_day_returns_to_the_starting_light() {
    let settings = Settings::default();
    let mut cycle = DayNight::new(&settings.day_night);
    let before = cycle.lighting();

    let mut clock = FixedStep::default();
    let mut simulated = 0.0;
    while simulated < settings.day_night.period_secs {
        let steps = clock.advance(FRAME);
        simulated += steps as f32 * FixedStep::step_secs();
        cycle.advance(steps as f32 * FixedStep::step_secs());
    }
    let after = cycle.lighting();
    for (a, b) in before.clear_colour.iter().zip(after.clear_colour.iter()) {
        assert!((a - b).abs() < 0.05, "{:?} vs {:?}", before.clear_colour, after.clear_colour);
    }
}

#[test]
fn yaml_settings_override_only_what_they_name() {
    let settings = Settings::from_yaml(
        r#"
seed: 7
flight:
  max_speed: 1.0
projects:
  - title: Solo
    description: The only one
    link: https://example.org
"#,
    )
    .expect("settings should parse");

    assert_eq!(settings.seed, 7);
    assert_eq!(settings.flight.max_speed, 1.0);
    assert_eq!(settings.flight.drag, Settings::default().flight.drag);
    assert_eq!(settings.projects.len(), 1);
    assert_eq!(settings.projects[0].summary(), "Solo - The only one -> https://example.org");

    let platforms = Platforms::new(&settings.platforms, settings.projects.len());
    assert_eq!(platforms.platforms.len(), 1);
}

#[test]
fn invalid_settings_are_rejected() {
    assert!(Settings::from_yaml("flight:\n  drag: 1.5\n").is_err());
    assert!(Settings::from_yaml("camera:\n  near: 0.0\n").is_err());
}

use cgmath::Point3;
use instant::Duration;
use proptest::prelude::*;
use proptest::test_runner::Config;
use rocket_folio::{
    settings::{FireworkSettings, FlightSettings},
    sim::{
        clock::FixedStep,
        fireworks::Fireworks,
        input::Controls,
        projects::Accordion,
        rocket::RocketState,
    },
};
use winit::keyboard::KeyCode;

const FLIGHT_KEYS: [KeyCode; 7] = [
    KeyCode::KeyW,
    KeyCode::KeyS,
    KeyCode::KeyA,
    KeyCode::KeyD,
    KeyCode::Space,
    KeyCode::KeyC,
    KeyCode::ShiftLeft,
];

/// Each step toggles one key and then runs `hold` simulation steps.
fn key_script() -> impl Strategy<Value = Vec<(usize, bool, u8)>> {
    prop::collection::vec((0..FLIGHT_KEYS.len(), any::<bool>(), 1u8..40), 1..60)
}

proptest! {
    #![proptest_config(Config::with_cases(128))]
    #[test]
    fn speed_stays_within_the_boosted_caps(script in key_script()) {
        let flight = FlightSettings::default();
        let mut controls = Controls::default();
        let mut rocket = RocketState::default();
        let cap = flight.max_speed * flight.boost_multiplier;

        for (key, pressed, hold) in script {
            controls.handle_key(FLIGHT_KEYS[key], pressed, false);
            for _ in 0..hold {
                rocket.step(&controls, &flight);
                prop_assert!(rocket.speed <= cap + 1e-6, "speed {}", rocket.speed);
                prop_assert!(rocket.speed >= -flight.max_reverse_speed - 1e-6, "speed {}", rocket.speed);
                prop_assert!(rocket.velocity_x.abs() <= flight.max_lateral_speed + 1e-6);
                prop_assert!(rocket.velocity_y.abs() <= flight.max_lateral_speed + 1e-6);
            }
        }
    }

    #[test]
    fn rocket_never_leaves_the_corridor(script in key_script()) {
        let flight = FlightSettings::default();
        let mut controls = Controls::default();
        let mut rocket = RocketState::default();

        for (key, pressed, hold) in script {
            controls.handle_key(FLIGHT_KEYS[key], pressed, false);
            for _ in 0..hold {
                rocket.step(&controls, &flight);
                prop_assert!(rocket.position.x.abs() <= flight.bounds);
                prop_assert!(rocket.position.y.abs() <= flight.bounds);
            }
        }
    }

    #[test]
    fn bounce_keeps_speed_in_range(speed in -0.5f32..1.0, x in -5.0f32..5.0, y in -5.0f32..5.0) {
        let flight = FlightSettings::default();
        let mut rocket = RocketState { speed, ..RocketState::default() };
        rocket.bounce(Point3::new(x, y, -1.0), &flight);
        prop_assert!(rocket.speed <= flight.max_speed * flight.boost_multiplier);
        prop_assert!(rocket.speed >= -flight.max_reverse_speed);
        prop_assert!(rocket.velocity_x.abs() <= flight.max_lateral_speed + 1e-6);
    }

    #[test]
    fn fixed_step_hands_out_at_most_the_frame_budget(frames in prop::collection::vec(0u64..500, 1..100)) {
        let mut clock = FixedStep::new(5);
        for millis in frames {
            let steps = clock.advance(Duration::from_millis(millis));
            prop_assert!(steps <= 5);
        }
    }

    #[test]
    fn at_most_one_project_is_open(toggles in prop::collection::vec(0usize..6, 0..40)) {
        let mut accordion = Accordion::default();
        for id in toggles {
            accordion.toggle(id);
            let open = (0..6).filter(|i| accordion.is_open(*i)).count();
            prop_assert!(open <= 1);
            prop_assert_eq!(open == 1, accordion.open().is_some());
        }
    }

    #[test]
    fn fireworks_never_exceed_their_pool(bursts in 1usize..20, seed in any::<u64>()) {
        let settings = FireworkSettings { capacity: 100, ..FireworkSettings::default() };
        let mut fireworks = Fireworks::new(&settings, seed);
        for i in 0..bursts {
            fireworks.burst(Point3::new(i as f32, 0.0, 0.0), &[[1.0, 0.0, 0.0], [0.0, 1.0, 0.0]]);
            prop_assert!(fireworks.sparks.len() <= settings.capacity);
            fireworks.step();
        }
    }
}

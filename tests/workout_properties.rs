use mapty::kv::MemoryStore;
use mapty::persistence::PersistenceGateway;
use mapty::workout::round1;
use mapty::{App, AppError, Coords, ValidationError, Workout, WorkoutInput, WorkoutKind, WorkoutStore};
use proptest::prelude::*;

fn valid_input() -> impl Strategy<Value = WorkoutInput> {
    (
        prop_oneof![Just(WorkoutKind::Running), Just(WorkoutKind::Cycling)],
        -90.0f64..90.0,
        -180.0f64..180.0,
        0.01f64..500.0,
        0.1f64..1500.0,
        1u32..300,
        0.0f64..9000.0,
    )
        .prop_map(|(kind, lat, lng, distance, duration, cadence, elevation)| WorkoutInput {
            kind,
            coords: Coords::new(lat, lng).unwrap(),
            distance,
            duration,
            extra: match kind {
                WorkoutKind::Running => f64::from(cadence),
                WorkoutKind::Cycling => elevation,
            },
        })
}

fn bad_positive() -> impl Strategy<Value = f64> {
    prop_oneof![
        -1000.0f64..=0.0,
        Just(f64::NAN),
        Just(f64::INFINITY),
        Just(f64::NEG_INFINITY),
    ]
}

fn bad_cadence() -> impl Strategy<Value = f64> {
    prop_oneof![
        bad_positive(),
        (1u32..300).prop_map(|c| f64::from(c) + 0.5),
    ]
}

fn bad_elevation() -> impl Strategy<Value = f64> {
    prop_oneof![
        -5000.0f64..-0.001,
        Just(f64::NAN),
        Just(f64::INFINITY),
    ]
}

/// A valid input with exactly one field broken, plus that field's name.
fn invalid_input() -> impl Strategy<Value = (WorkoutInput, &'static str)> {
    prop_oneof![
        (valid_input(), bad_positive())
            .prop_map(|(i, distance)| (WorkoutInput { distance, ..i }, "distance")),
        (valid_input(), bad_positive())
            .prop_map(|(i, duration)| (WorkoutInput { duration, ..i }, "duration")),
        (valid_input(), bad_cadence()).prop_map(|(i, extra)| (
            WorkoutInput {
                kind: WorkoutKind::Running,
                extra,
                ..i
            },
            "cadence"
        )),
        (valid_input(), bad_elevation()).prop_map(|(i, extra)| (
            WorkoutInput {
                kind: WorkoutKind::Cycling,
                extra,
                ..i
            },
            "elevationGain"
        )),
    ]
}

fn validation_field(e: &ValidationError) -> &'static str {
    match *e {
        ValidationError::NotFinite { field, .. }
        | ValidationError::NotPositive { field, .. }
        | ValidationError::Negative { field, .. }
        | ValidationError::NotWhole { field, .. } => field,
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn prop_derived_metric_matches_formula(input in valid_input()) {
        let w = Workout::create(input).unwrap();
        let expected = match input.kind {
            WorkoutKind::Running => round1(input.duration / input.distance),
            WorkoutKind::Cycling => round1(input.distance / (input.duration / 60.0)),
        };
        prop_assert_eq!(w.metric().value, expected);
    }

    #[test]
    fn prop_save_load_restore_is_lossless(inputs in prop::collection::vec(valid_input(), 0..12)) {
        let workouts: Vec<Workout> = inputs.into_iter().map(|i| Workout::create(i).unwrap()).collect();

        let mut gw = PersistenceGateway::new(MemoryStore::default());
        gw.save(&workouts).unwrap();

        let mut store = WorkoutStore::new();
        let report = store.restore(&gw.load().unwrap());
        prop_assert!(report.skipped.is_empty());
        prop_assert_eq!(store.all(), workouts.as_slice());

        // and again from the restored copy
        gw.save(store.all()).unwrap();
        let mut again = WorkoutStore::new();
        again.restore(&gw.load().unwrap());
        prop_assert_eq!(again.all(), workouts.as_slice());
    }

    #[test]
    fn prop_invalid_input_is_rejected_and_store_unchanged(
        seed in valid_input(),
        (input, field) in invalid_input(),
    ) {
        let mut app = App::new(MemoryStore::default());
        app.create_workout(seed).unwrap();
        let before = app.list_workouts().to_vec();

        match app.create_workout(input) {
            Err(AppError::Validation(v)) => {
                prop_assert_eq!(validation_field(&v), field);
            }
            other => panic!("expected a validation error, got {other:?}"),
        }
        prop_assert_eq!(app.list_workouts(), before.as_slice());
        prop_assert_eq!(app.gateway().load().unwrap().len(), 1);
    }
}

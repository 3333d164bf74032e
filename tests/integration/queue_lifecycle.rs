//! Queue lifecycle tests driven directly against the engine

use crate::fixtures::{create_engine_with_counters, create_test_engine, queue_of, total_users};
use proptest::prelude::*;
use smart_queue::error::QueueError;
use smart_queue::types::UserStatus;

#[test]
fn test_alice_bob_carol_scenario() {
    let engine = create_test_engine();

    // Step 1: three empty counters, Alice goes to counter 0
    let alice = engine.enroll("Alice").unwrap();
    assert_eq!(alice.counter, 0);
    assert_eq!(queue_of(&engine, 0), vec![("Alice".to_string(), UserStatus::Unset)]);

    // Step 2: counter 0 now has one active user, Bob goes to counter 1
    let bob = engine.enroll("Bob").unwrap();
    assert_eq!(bob.counter, 1);
    assert_eq!(queue_of(&engine, 1), vec![("Bob".to_string(), UserStatus::Unset)]);

    // Step 3: Alice is marked red and stops counting toward load
    engine.set_status(0, 0, UserStatus::Red).unwrap();
    assert_eq!(engine.active_count(0).unwrap(), 0);

    // Step 4: counters 0 and 2 tie at zero active users, lowest index wins
    let carol = engine.enroll("Carol").unwrap();
    assert_eq!(carol.counter, 0);
    assert_eq!(carol.position, 1);

    assert_eq!(
        queue_of(&engine, 0),
        vec![
            ("Alice".to_string(), UserStatus::Red),
            ("Carol".to_string(), UserStatus::Unset),
        ]
    );
    assert_eq!(queue_of(&engine, 1), vec![("Bob".to_string(), UserStatus::Unset)]);
    assert!(queue_of(&engine, 2).is_empty());
}

#[test]
fn test_serve_and_skip_cycle() {
    let engine = create_engine_with_counters(1);
    for name in ["A", "B", "C"] {
        engine.enroll(name).unwrap();
    }

    // Serve A, send them to the back
    engine.set_status(0, 0, UserStatus::Green).unwrap();
    engine.rotate(0).unwrap();
    assert_eq!(
        queue_of(&engine, 0),
        vec![
            ("B".to_string(), UserStatus::Unset),
            ("C".to_string(), UserStatus::Unset),
            ("A".to_string(), UserStatus::Green),
        ]
    );

    // Skip B
    engine.set_status(0, 0, UserStatus::Red).unwrap();
    engine.rotate(0).unwrap();
    let names: Vec<String> = queue_of(&engine, 0).into_iter().map(|(n, _)| n).collect();
    assert_eq!(names, vec!["C", "A", "B"]);
    assert_eq!(engine.active_count(0).unwrap(), 2);
}

#[test]
fn test_stale_position_after_rotation_cannot_touch_other_counters() {
    let engine = create_test_engine();
    engine.enroll("Alice").unwrap();
    engine.enroll("Bob").unwrap();

    // Counter 0 has one user; a stale position past the end is rejected
    engine.rotate(0).unwrap();
    let err = engine.set_status(0, 1, UserStatus::Red).unwrap_err();
    assert!(matches!(err, QueueError::NotFound { .. }));

    assert_eq!(queue_of(&engine, 0), vec![("Alice".to_string(), UserStatus::Unset)]);
    assert_eq!(queue_of(&engine, 1), vec![("Bob".to_string(), UserStatus::Unset)]);
}

#[test]
fn test_engine_keeps_serving_after_errors() {
    let engine = create_test_engine();

    assert!(engine.enroll("").is_err());
    assert!(engine.rotate(0).is_err());
    assert!(engine.set_status(4, 0, UserStatus::Red).is_err());

    let enrollment = engine.enroll("Dana").unwrap();
    assert_eq!(enrollment.counter, 0);

    let stats = engine.stats();
    assert_eq!(stats.rejected_operations, 3);
    assert_eq!(stats.users_enrolled, 1);
}

#[derive(Debug, Clone)]
enum Operation {
    Enroll(String),
    SetStatus(usize, usize, bool),
    Rotate(usize),
}

fn operation_strategy() -> impl Strategy<Value = Operation> {
    prop_oneof![
        "[a-z]{0,4}".prop_map(Operation::Enroll),
        (0usize..4, 0usize..6, any::<bool>())
            .prop_map(|(c, u, red)| Operation::SetStatus(c, u, red)),
        (0usize..4).prop_map(Operation::Rotate),
    ]
}

proptest! {
    #[test]
    fn size_grows_only_on_successful_enroll(ops in prop::collection::vec(operation_strategy(), 1..40)) {
        let engine = create_test_engine();

        for op in ops {
            let before = total_users(&engine);
            match op {
                Operation::Enroll(name) => {
                    let result = engine.enroll(&name);
                    prop_assert_eq!(result.is_ok(), !name.is_empty());
                    let expected = if result.is_ok() { before + 1 } else { before };
                    prop_assert_eq!(total_users(&engine), expected);
                }
                Operation::SetStatus(counter, position, red) => {
                    let status = if red { UserStatus::Red } else { UserStatus::Green };
                    let _ = engine.set_status(counter, position, status);
                    prop_assert_eq!(total_users(&engine), before);
                }
                Operation::Rotate(counter) => {
                    let _ = engine.rotate(counter);
                    prop_assert_eq!(total_users(&engine), before);
                }
            }
        }
    }

    #[test]
    fn enrollment_joins_least_loaded_counter(names in prop::collection::vec("[a-z]{1,4}", 1..20)) {
        let engine = create_test_engine();

        for name in names {
            let loads = engine.loads();
            let min = loads.iter().map(|l| l.active).min().unwrap();
            let expected = loads.iter().position(|l| l.active == min).unwrap();

            let enrollment = engine.enroll(&name).unwrap();
            prop_assert_eq!(enrollment.counter, expected);
        }
    }
}

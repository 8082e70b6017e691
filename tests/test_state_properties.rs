//! Property tests for the world-state algebra the planner leans on.

use passage_planner::{FactValue, WorldState};
use proptest::prelude::*;
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

fn fact_value() -> impl Strategy<Value = FactValue> {
    prop_oneof![
        any::<bool>().prop_map(FactValue::from),
        (-1000i64..1000).prop_map(FactValue::from),
        "[a-z]{1,8}".prop_map(FactValue::from),
    ]
}

fn world_state() -> impl Strategy<Value = WorldState> {
    prop::collection::hash_map("[a-z]{1,6}", fact_value(), 0..8).prop_map(WorldState::from)
}

fn hash_of(state: &WorldState) -> u64 {
    let mut hasher = DefaultHasher::new();
    state.hash(&mut hasher);
    hasher.finish()
}

proptest! {
    #[test]
    fn satisfies_is_reflexive(s in world_state()) {
        prop_assert!(s.satisfies(&s));
    }

    #[test]
    fn empty_requirement_always_satisfied(s in world_state()) {
        prop_assert!(s.satisfies(&WorldState::new()));
    }

    #[test]
    fn apply_is_idempotent(s in world_state(), e in world_state()) {
        let once = s.apply(&e);
        let twice = once.apply(&e);
        prop_assert_eq!(&once, &twice);
    }

    #[test]
    fn applied_state_satisfies_its_effects(s in world_state(), e in world_state()) {
        prop_assert!(s.apply(&e).satisfies(&e));
    }

    #[test]
    fn apply_retains_untouched_keys(s in world_state(), e in world_state()) {
        let next = s.apply(&e);
        for (key, value) in s.iter() {
            if e.get(key).is_none() {
                prop_assert_eq!(next.get(key), Some(value));
            }
        }
    }

    #[test]
    fn equal_states_hash_equally(s in world_state()) {
        // Rebuild through an iterator to vary insertion order.
        let rebuilt: WorldState = s.iter().map(|(k, v)| (k.clone(), v.clone())).collect();
        prop_assert_eq!(&s, &rebuilt);
        prop_assert_eq!(hash_of(&s), hash_of(&rebuilt));
    }

    #[test]
    fn json_round_trip_preserves_state(s in world_state()) {
        let json = serde_json::to_string(&s).unwrap();
        let back = WorldState::from_json(&json).unwrap();
        prop_assert_eq!(s, back);
    }
}

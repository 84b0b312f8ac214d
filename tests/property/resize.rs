//! Resize properties: contents, poison and guards survive every reallocation.

use super::common::{assert_stack_well_formed, budgeted, stack_with};
use guardstack::{Corruption, StackConfig, Status, GUARD, POISON};
use proptest::prelude::*;

proptest! {
    /// Property: any sequence of doublings and halvings keeps the live prefix,
    /// poisons the rest and rewrites both data guards.
    #[test]
    fn prop_resize_preserves_contents_and_poison(
        values in prop::collection::vec(any::<i32>(), 0..50),
        grows in prop::collection::vec(any::<bool>(), 1..12),
    ) {
        let mut stack = stack_with(StackConfig::default(), &values);

        for grow in grows {
            let before = stack.capacity();
            let multiplier = if grow { 2.0 } else { 0.5 };
            let status = stack.resize(multiplier);

            if status.is_clean() {
                let expected = if grow { before * 2 } else { before / 2 };
                prop_assert_eq!(stack.capacity(), expected);
            } else {
                // Only a shrink to zero or below the live count is refused
                prop_assert!(!grow);
                prop_assert_eq!(status, Status::from(Corruption::WrongSize));
                prop_assert!(before / 2 == 0 || before / 2 < values.len());
                prop_assert_eq!(stack.capacity(), before);
            }

            prop_assert_eq!(stack.to_vec(), values.clone());
            let buffer = stack.buffer().unwrap();
            prop_assert!(buffer.slots().skip(values.len()).all(|slot| slot == POISON));
            prop_assert_eq!(buffer.left_guard(), Some(GUARD));
            prop_assert_eq!(buffer.right_guard(), Some(GUARD));
            assert_stack_well_formed(&stack);
        }
    }

    /// Property: pushing past the budget never inserts and never dirties.
    #[test]
    fn prop_budget_refusal_is_clean(extra in 1usize..20) {
        let values: Vec<i32> = (0..16).collect();
        let mut stack = stack_with(budgeted(16), &values);

        for value in 0..extra {
            let status = stack.push(value as i32);
            prop_assert_eq!(status, Status::from(Corruption::WrongSize));
        }
        prop_assert!(stack.verify().is_clean());
        prop_assert_eq!(stack.to_vec(), values);
    }
}

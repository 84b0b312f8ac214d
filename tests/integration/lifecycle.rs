//! Lifecycle tests: init, push, pop, resize and destroy through the public API.

use super::common::{
    all_protection_configs, assert_contents, assert_stack_well_formed, budgeted, stack_with,
};
use guardstack::{
    ChecksumKind, Corruption, GuardedStack, StackConfig, Status, BASE_CAPACITY, POISON,
};

// ============================================================================
// GROWTH AND SHRINK
// ============================================================================

/// Ten pushes double the base capacity once; popping everything halves it back.
#[test]
fn test_ten_pushes_then_ten_pops() {
    let mut stack = GuardedStack::new(StackConfig::default()).unwrap();

    for _ in 0..10 {
        assert!(stack.push(10).is_clean());
    }
    assert_eq!(stack.len(), 10);
    assert_eq!(stack.capacity(), 16);
    assert_stack_well_formed(&stack);

    for _ in 0..10 {
        let (value, status) = stack.pop();
        assert_eq!(value, Some(10));
        assert!(status.is_clean());
    }
    assert!(stack.is_empty());
    assert_eq!(stack.capacity(), BASE_CAPACITY);
    assert_stack_well_formed(&stack);
}

#[test]
fn test_lifo_order_across_growth() {
    let values: Vec<i32> = (0..40).collect();
    let mut stack = stack_with(StackConfig::default(), &values);
    assert_eq!(stack.capacity(), 64);

    for expected in values.iter().rev() {
        assert_eq!(stack.pop().0, Some(*expected));
    }
    assert_eq!(stack.pop(), (None, Status::CLEAN));
}

/// Shrinking waits until fewer than a quarter of the slots are live.
#[test]
fn test_shrink_threshold() {
    let values: Vec<i32> = (0..17).collect();
    let mut stack = stack_with(StackConfig::default(), &values);
    assert_eq!(stack.capacity(), 32);

    while stack.len() > 8 {
        stack.pop();
    }
    assert_eq!(stack.capacity(), 32, "8 of 32 live is not below a quarter");

    stack.pop();
    assert_eq!(stack.len(), 7);
    assert_eq!(stack.capacity(), 16);
    assert_stack_well_formed(&stack);
}

#[test]
fn test_never_shrinks_below_base() {
    let config = StackConfig::default().with_base_capacity(4);
    let mut stack = stack_with(config, &[1]);
    stack.pop();
    assert_eq!(stack.capacity(), 4);
}

#[test]
fn test_explicit_resize_round_trip() {
    let mut stack = stack_with(StackConfig::default(), &[1, 2, 3]);

    assert!(stack.resize(2.0).is_clean());
    assert_eq!(stack.capacity(), 16);
    assert!(stack.resize(0.5).is_clean());
    assert_eq!(stack.capacity(), 8);

    assert_contents(&stack, &[1, 2, 3]);
    assert_stack_well_formed(&stack);
}

// ============================================================================
// FAILURE PATHS
// ============================================================================

/// A refused growth leaves the stack clean with the value not inserted.
#[test]
fn test_growth_failure_rejects_push() {
    let values: Vec<i32> = (0..8).collect();
    let mut stack = stack_with(budgeted(8), &values);

    let status = stack.push(99);

    assert_eq!(status, Status::from(Corruption::WrongSize));
    assert!(stack.status().is_clean());
    assert!(stack.verify().is_clean());
    assert_contents(&stack, &values);
    assert_eq!(stack.capacity(), 8);

    // Popping makes room again
    assert_eq!(stack.pop().0, Some(7));
    assert!(stack.push(99).is_clean());
}

#[test]
fn test_init_failure_reports_null_data() {
    let config = StackConfig::default().with_base_capacity(usize::MAX / 2);
    let mut stack = GuardedStack::new(config).unwrap();

    assert!(stack.status().contains(Corruption::NullData));
    assert!(stack.verify().contains(Corruption::NullData));
    assert!(stack.push(1).contains(Corruption::NullData));
    let (value, status) = stack.pop();
    assert_eq!(value, None);
    assert!(status.contains(Corruption::NullData));
}

#[test]
fn test_pop_on_empty_is_clean() {
    for config in all_protection_configs() {
        let mut stack = GuardedStack::new(config).unwrap();
        assert_eq!(stack.pop(), (None, Status::CLEAN));
        assert_eq!(stack.peek(), (None, Status::CLEAN));
        assert!(stack.verify().is_clean());
    }
}

#[test]
fn test_invalid_config_is_rejected() {
    assert!(GuardedStack::new(StackConfig::default().with_base_capacity(0)).is_err());
    assert!(GuardedStack::new(StackConfig::default().with_max_capacity(2)).is_err());
}

// ============================================================================
// DESTROY
// ============================================================================

#[test]
fn test_destroy_blocks_every_operation() {
    for config in all_protection_configs() {
        let mut stack = stack_with(config, &[1, 2, 3]);

        assert!(stack.destroy().is_clean());
        assert_eq!(stack.status(), Status::from(Corruption::DestroyedStack));

        assert!(stack.verify().contains(Corruption::DestroyedStack));
        assert!(stack.push(4).contains(Corruption::DestroyedStack));
        assert_eq!(stack.pop().0, None);
        assert!(stack.resize(2.0).contains(Corruption::DestroyedStack));
        assert_eq!(stack.destroy(), Status::from(Corruption::DestroyedStack));
        assert!(stack.buffer().is_none());
    }
}

#[test]
fn test_init_after_destroy_starts_fresh() {
    let mut stack = stack_with(StackConfig::default(), &[5, 6]);
    stack.destroy();

    assert!(stack.init().is_clean());
    assert!(stack.is_empty());
    assert_eq!(stack.capacity(), BASE_CAPACITY);
    assert!(stack.push(7).is_clean());
    assert_stack_well_formed(&stack);
}

// ============================================================================
// VALUES AND CONFIGURATIONS
// ============================================================================

/// The poison value is a legal element; only unused slots must hold it.
#[test]
fn test_poison_value_can_be_pushed() {
    let mut stack = stack_with(StackConfig::default(), &[POISON, i32::MIN, i32::MAX]);
    assert!(stack.verify().is_clean());
    assert_eq!(stack.pop().0, Some(i32::MAX));
    assert_eq!(stack.pop().0, Some(i32::MIN));
    assert_eq!(stack.pop().0, Some(POISON));
}

#[test]
fn test_every_protection_combination_behaves_alike() {
    let values: Vec<i32> = (100..130).collect();
    for config in all_protection_configs() {
        let name = config.name.clone();
        let mut stack = stack_with(config, &values);
        assert_contents(&stack, &values);
        assert_stack_well_formed(&stack);
        for expected in values.iter().rev() {
            assert_eq!(stack.pop().0, Some(*expected), "config {name}");
        }
    }
}

#[test]
fn test_crc32_from_json_config() {
    let config =
        StackConfig::from_json_str(r#"{"name":"crc","checksumKind":"crc32","baseCapacity":2}"#)
            .unwrap();
    assert_eq!(config.checksum_kind, ChecksumKind::Crc32);

    let mut stack = stack_with(config, &[1, 2, 3, 4, 5]);
    assert_eq!(stack.capacity(), 8);
    assert!(stack.verify().is_clean());
    assert_stack_well_formed(&stack);
}

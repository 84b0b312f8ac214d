//! Operation sequences against a `Vec` model.

use super::common::{
    all_protection_configs, assert_stack_well_formed, corrupt, is_power_of_two_multiple, Tamper,
};
use guardstack::{ChecksumKind, GuardedStack, StackConfig, Status, BASE_CAPACITY};
use proptest::prelude::*;

// ============================================================================
// STRATEGIES
// ============================================================================

#[derive(Debug, Clone, Copy)]
enum Op {
    Push(i32),
    Pop,
    Peek,
}

fn op_strategy() -> impl Strategy<Value = Op> {
    prop_oneof![
        3 => any::<i32>().prop_map(Op::Push),
        2 => Just(Op::Pop),
        1 => Just(Op::Peek),
    ]
}

fn config_strategy() -> impl Strategy<Value = StackConfig> {
    (
        prop::sample::select(all_protection_configs()),
        prop_oneof![Just(ChecksumKind::Weighted), Just(ChecksumKind::Crc32)],
    )
        .prop_map(|(config, kind)| config.with_checksum_kind(kind))
}

// ============================================================================
// MODEL PROPERTIES
// ============================================================================

proptest! {
    /// Property: the stack agrees with a Vec and stays clean after every op.
    #[test]
    fn prop_matches_vec_model(
        config in config_strategy(),
        ops in prop::collection::vec(op_strategy(), 0..200),
    ) {
        let mut stack = GuardedStack::new(config).unwrap();
        let mut model: Vec<i32> = Vec::new();

        for op in ops {
            match op {
                Op::Push(value) => {
                    prop_assert_eq!(stack.push(value), Status::CLEAN);
                    model.push(value);
                }
                Op::Pop => {
                    let (value, status) = stack.pop();
                    prop_assert_eq!(status, Status::CLEAN);
                    prop_assert_eq!(value, model.pop());
                }
                Op::Peek => {
                    let (value, status) = stack.peek();
                    prop_assert_eq!(status, Status::CLEAN);
                    prop_assert_eq!(value, model.last().copied());
                }
            }

            prop_assert_eq!(stack.verify(), Status::CLEAN);
            prop_assert_eq!(stack.to_vec(), model.clone());
            prop_assert!(stack.len() <= stack.capacity());
            prop_assert!(
                is_power_of_two_multiple(stack.capacity(), BASE_CAPACITY),
                "capacity {} is not base times a power of two",
                stack.capacity()
            );
            assert_stack_well_formed(&stack);
        }
    }

    /// Property: flipping any payload byte is caught when checksums are on.
    #[test]
    fn prop_any_payload_flip_detected(
        values in prop::collection::vec(any::<i32>(), 0..40),
        offset_seed in any::<usize>(),
        mask in 1u8..=255,
        kind in prop_oneof![Just(ChecksumKind::Weighted), Just(ChecksumKind::Crc32)],
    ) {
        let config = StackConfig::default().with_checksum_kind(kind);
        let mut stack = super::common::stack_with(config, &values);
        let payload_len = stack.buffer().unwrap().payload().len();
        let offset = offset_seed % payload_len;

        let tampered = corrupt(&mut stack, Tamper::PayloadByte { offset, mask });
        prop_assert!(tampered);
        let status = stack.verify();
        prop_assert!(!status.is_clean());
        prop_assert!(stack.push(0).bits() != 0);
    }
}

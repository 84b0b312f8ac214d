//! Corruption detection tests.
//!
//! Each simulated stray write must raise exactly the flag that names it, and
//! a stack that reports corruption must refuse to mutate.

use super::common::{corrupt, stack_with, Tamper};
use guardstack::contracts::{check_poisoned, check_well_formed};
use guardstack::{ChecksumKind, ContractViolation, Corruption, StackConfig, Status, POISON};

fn protected() -> StackConfig {
    StackConfig::default().with_name("protected")
}

// ============================================================================
// SINGLE-FLAG DETECTION
// ============================================================================

/// Every tamper target on a fully protected stack maps to one flag.
#[test]
fn test_each_tamper_raises_its_own_flag() {
    let cases: &[(&str, Tamper, Corruption)] = &[
        ("left struct guard", Tamper::LeftStructGuard(0), Corruption::LeftCanaryScreams),
        ("right struct guard", Tamper::RightStructGuard(1), Corruption::RightCanaryScreams),
        ("left data guard", Tamper::LeftDataGuard(0), Corruption::LeftDataCanary),
        ("right data guard", Tamper::RightDataGuard(u64::MAX), Corruption::RightDataCanary),
        ("payload byte", Tamper::PayloadByte { offset: 5, mask: 0x80 }, Corruption::DataHashError),
        ("live slot", Tamper::Slot { index: 0, value: -1 }, Corruption::DataHashError),
        ("negative size", Tamper::Size(-1), Corruption::WrongPos),
        ("size past capacity", Tamper::Size(9), Corruption::PosHigherSize),
        ("capacity mismatch", Tamper::Capacity(4), Corruption::WrongSize),
        ("data checksum", Tamper::DataChecksum(0), Corruption::DataHashError),
        ("control checksum", Tamper::ControlChecksum(0), Corruption::StructHashError),
        ("data checksum at 0xdead", Tamper::DataChecksum(0xDEAD), Corruption::DataHashError),
        ("control checksum at 0xdead", Tamper::ControlChecksum(0xDEAD), Corruption::StructHashError),
        ("destroyed sentinel", Tamper::DestroyedSize, Corruption::DestroyedStack),
    ];

    for &(label, tamper, expected) in cases {
        let mut stack = stack_with(protected(), &[1, 2, 3]);
        assert!(corrupt(&mut stack, tamper), "{label}: tamper not applied");

        let status = stack.verify();
        assert_eq!(status, Status::from(expected), "{label}: got {status}");
    }
}

#[test]
fn test_payload_change_caught_by_both_checksum_kinds() {
    for kind in [ChecksumKind::Weighted, ChecksumKind::Crc32] {
        let mut stack = stack_with(protected().with_checksum_kind(kind), &[10, 20]);
        corrupt(&mut stack, Tamper::PayloadByte { offset: 0, mask: 0x01 });
        assert_eq!(stack.verify(), Status::from(Corruption::DataHashError), "{kind:?}");
    }
}

/// A genuine checksum can equal the destroyed word without the stack being
/// destroyed. The weighted sum of this payload is 0xdead.
#[test]
fn test_checksum_equal_to_destroyed_word_is_live() {
    let mut stack = stack_with(protected(), &[0, 0, 0, 8179]);
    assert_eq!(stack.checksums().0, 0xDEAD);

    assert!(stack.verify().is_clean());
    assert!(stack.push(1).is_clean());
    assert_eq!(stack.pop(), (Some(1), Status::CLEAN));
    assert_eq!(stack.pop(), (Some(8179), Status::CLEAN));
    assert!(stack.verify().is_clean());
}

// ============================================================================
// PROTECTION LAYERS SWITCHED OFF
// ============================================================================

#[test]
fn test_payload_change_undetected_without_checksums() {
    let mut stack = stack_with(protected().with_checksums(false), &[10, 20]);
    corrupt(&mut stack, Tamper::PayloadByte { offset: 0, mask: 0x01 });
    assert!(stack.verify().is_clean());
}

#[test]
fn test_guards_ignored_when_disabled() {
    let mut stack = stack_with(protected().with_guards(false), &[1]);

    assert!(corrupt(&mut stack, Tamper::LeftStructGuard(0)));
    assert!(!corrupt(&mut stack, Tamper::LeftDataGuard(0)), "unguarded buffer");
    assert!(stack.verify().is_clean());
}

/// Structural checks run under every configuration.
#[test]
fn test_structural_checks_always_run() {
    let mut stack = stack_with(StackConfig::unprotected(), &[1, 2]);
    corrupt(&mut stack, Tamper::Size(-3));
    assert!(stack.verify().contains(Corruption::WrongPos));
}

/// Poison is audited by the contract check, not by verification.
#[test]
fn test_overwritten_poison_found_by_contract_check() {
    let mut stack = stack_with(StackConfig::unprotected(), &[1, 2]);
    corrupt(&mut stack, Tamper::Slot { index: 6, value: 42 });

    assert!(stack.verify().is_clean());
    assert!(matches!(
        check_poisoned(&stack),
        Err(ContractViolation::UnpoisonedSlot { index: 6, value: 42 })
    ));
}

// ============================================================================
// AFTER DETECTION
// ============================================================================

#[test]
fn test_corrupted_stack_refuses_mutation() {
    let mut stack = stack_with(protected(), &[1, 2, 3]);
    corrupt(&mut stack, Tamper::RightDataGuard(0));

    assert!(stack.push(4).contains(Corruption::RightDataCanary));
    let (value, status) = stack.pop();
    assert_eq!(value, None);
    assert!(status.contains(Corruption::RightDataCanary));
    assert!(stack.resize(2.0).contains(Corruption::RightDataCanary));

    // Contents are withheld once the stack is flagged, but nothing moved
    assert!(stack.to_vec().is_empty());
    assert_eq!(stack.len(), 3);
    assert_eq!(stack.capacity(), 8);
    let slots: Vec<i32> = stack.buffer().unwrap().slots().take(3).collect();
    assert_eq!(slots, vec![1, 2, 3]);
}

/// Once recorded, a flag survives even if the damaged word is restored.
#[test]
fn test_status_is_sticky() {
    let mut stack = stack_with(protected(), &[1]);
    let guard = stack.struct_guards().0;

    corrupt(&mut stack, Tamper::LeftStructGuard(0));
    stack.verify();
    corrupt(&mut stack, Tamper::LeftStructGuard(guard));

    assert!(stack.status().contains(Corruption::LeftCanaryScreams));
    assert!(stack.verify().contains(Corruption::LeftCanaryScreams));
    assert!(check_well_formed(&stack).is_err());
}

#[test]
fn test_check_does_not_record() {
    let mut stack = stack_with(protected(), &[1]);
    corrupt(&mut stack, Tamper::ControlChecksum(7));

    assert!(stack.check().contains(Corruption::StructHashError));
    assert!(stack.status().is_clean());
}

#[test]
fn test_poison_slots_hold_sentinel() {
    let stack = stack_with(protected(), &[1, 2, 3]);
    let buffer = stack.buffer().unwrap();
    assert!(buffer.slots().skip(3).all(|slot| slot == POISON));
    assert_eq!(buffer.slots().count(), 8);
}

// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

fn generous_budget() -> EbpfBudget {
    EbpfBudget { cpu_percent: 100.0, memory_bytes: 1024 * 1024 * 1024, events_per_sec: 1_000_000, packets_per_sec: 10_000_000 }
}

#[test]
fn enabling_tc_classifier_also_enables_its_dependency() {
    let coordinator = BudgetCoordinator::new(generous_budget());
    let added = coordinator.try_enable(EbpfFeature::TcClassifier).expect("enable");
    assert_eq!(added, vec![EbpfFeature::XdpBlocklist, EbpfFeature::TcClassifier]);
    assert!(coordinator.is_enabled(EbpfFeature::XdpBlocklist));
}

#[test]
fn enabling_an_already_satisfied_dependency_does_not_double_enable() {
    let coordinator = BudgetCoordinator::new(generous_budget());
    coordinator.try_enable(EbpfFeature::XdpBlocklist).expect("enable base");
    let added = coordinator.try_enable(EbpfFeature::SocketFilter).expect("enable dependent");
    assert_eq!(added, vec![EbpfFeature::SocketFilter]);
}

#[test]
fn over_budget_enable_is_rejected_and_changes_nothing() {
    let coordinator = BudgetCoordinator::new(EbpfBudget { cpu_percent: 1.0, memory_bytes: 1, events_per_sec: 1, packets_per_sec: 1 });
    let err = coordinator.try_enable(EbpfFeature::XdpBlocklist).unwrap_err();
    assert_eq!(err, BudgetError::Exceeded(EbpfFeature::XdpBlocklist));
    assert!(!coordinator.is_enabled(EbpfFeature::XdpBlocklist));
}

#[test]
fn disabling_a_dependency_cascades_to_dependents() {
    let coordinator = BudgetCoordinator::new(generous_budget());
    coordinator.try_enable(EbpfFeature::TcClassifier).expect("enable");
    coordinator.try_enable(EbpfFeature::SocketFilter).expect("enable");

    let removed = coordinator.disable(EbpfFeature::XdpBlocklist);
    assert!(removed.contains(&EbpfFeature::XdpBlocklist));
    assert!(removed.contains(&EbpfFeature::TcClassifier));
    assert!(removed.contains(&EbpfFeature::SocketFilter));
    assert!(!coordinator.is_enabled(EbpfFeature::SocketFilter));
}

#[test]
fn disabling_an_unknown_feature_is_a_no_op() {
    let coordinator = BudgetCoordinator::new(generous_budget());
    assert!(coordinator.disable(EbpfFeature::DnsBloom).is_empty());
}

//! Integration tests for the collective-symmetry invariant: for a fixed
//! verbosity configuration, every rank issues the same collective calls
//! in the same order, whatever its local error state. A rank that
//! conditionally skipped a call would deadlock a real run; here the
//! instrumented communicator makes the call sequence assertable.

use std::thread;

use firn_comm::{LocalComm, ThreadComm};
use firn_core::{FieldTag, PartitionId, StepConfig, StepErrorKind};
use firn_engine::ForwardEulerStep;
use firn_test_utils::{
    single_column_domain, split_pair_domains, CollectiveCall, CountingComm,
    FailingEvaluator, NoopDiagnostics, UniformThinning,
};
use indexmap::IndexMap;

use firn_mesh::Domain;

const HALO: CollectiveCall = CollectiveCall::Halo(FieldTag::LayerThicknessTendency);

fn counted_local_domain() -> (Domain, std::sync::Arc<std::sync::Mutex<Vec<CollectiveCall>>>) {
    let comm = CountingComm::new(LocalComm::new());
    let log = comm.log();
    // Rebuild the fixture with the instrumented communicator.
    let partitions = single_column_domain(10.0).into_partitions();
    (Domain::new(partitions, Box::new(comm)), log)
}

#[test]
fn quiet_step_issues_exactly_one_collective() {
    let (mut domain, log) = counted_local_domain();
    let mut driver = ForwardEulerStep::new(
        Box::new(UniformThinning::new(-1.0)),
        Box::new(NoopDiagnostics),
        StepConfig::new(1.0),
    )
    .unwrap();

    driver.step(&mut domain, 1.0);
    driver.step(&mut domain, 1.0);

    let calls = log.lock().unwrap();
    assert_eq!(*calls, vec![HALO, HALO]);
}

#[test]
fn verbose_step_issues_halo_then_min_then_max() {
    let (mut domain, log) = counted_local_domain();
    let mut driver = ForwardEulerStep::new(
        Box::new(UniformThinning::new(-1.0)),
        Box::new(NoopDiagnostics),
        StepConfig::new(1.0).with_verbose_diagnostics(),
    )
    .unwrap();

    driver.step(&mut domain, 1.0);

    let calls = log.lock().unwrap();
    assert_eq!(
        *calls,
        vec![HALO, CollectiveCall::MinF64, CollectiveCall::MaxI64]
    );
}

#[test]
fn failing_rank_still_matches_its_peers_call_for_call() {
    let routing: IndexMap<PartitionId, u32> =
        [(PartitionId(0), 0), (PartitionId(1), 1)].into_iter().collect();
    let mut comms = ThreadComm::create(2, routing).into_iter();
    let comm0 = CountingComm::new(comms.next().unwrap());
    let comm1 = CountingComm::new(comms.next().unwrap());
    let log0 = comm0.log();
    let log1 = comm1.log();

    let (mut d0, mut d1) = split_pair_domains(Box::new(comm0), Box::new(comm1));

    let steps = 3;
    let h0 = thread::spawn(move || {
        let mut driver = ForwardEulerStep::new(
            Box::new(UniformThinning::new(-1.0)),
            Box::new(NoopDiagnostics),
            StepConfig::new(1.0).with_verbose_diagnostics(),
        )
        .unwrap();
        (0..steps).map(|_| driver.step(&mut d0, 1.0)).collect::<Vec<_>>()
    });
    let h1 = thread::spawn(move || {
        // This rank's evaluator fails every step; the collective
        // sequence must not change because of it.
        let mut driver = ForwardEulerStep::new(
            Box::new(FailingEvaluator::immediate()),
            Box::new(NoopDiagnostics),
            StepConfig::new(1.0).with_verbose_diagnostics(),
        )
        .unwrap();
        (0..steps).map(|_| driver.step(&mut d1, 1.0)).collect::<Vec<_>>()
    });

    let outcomes0 = h0.join().unwrap();
    let outcomes1 = h1.join().unwrap();

    // Healthy rank: clean steps. Failing rank: tendency errors, but
    // every step completed.
    for outcome in &outcomes0 {
        assert!(outcome.is_ok(), "healthy rank failed: {outcome}");
    }
    for outcome in &outcomes1 {
        assert!(outcome.errors.contains(StepErrorKind::Tendency));
        assert!(!outcome.errors.contains(StepErrorKind::HaloExchange));
        assert!(!outcome.errors.contains(StepErrorKind::Reduction));
    }

    let per_step = vec![HALO, CollectiveCall::MinF64, CollectiveCall::MaxI64];
    let expected: Vec<CollectiveCall> = per_step
        .iter()
        .cycle()
        .take(per_step.len() * steps)
        .copied()
        .collect();
    assert_eq!(*log0.lock().unwrap(), expected);
    assert_eq!(*log1.lock().unwrap(), expected);
}

#[test]
fn failed_rank_imposes_no_stability_bound() {
    let routing: IndexMap<PartitionId, u32> =
        [(PartitionId(0), 0), (PartitionId(1), 1)].into_iter().collect();
    let mut comms = ThreadComm::create(2, routing).into_iter();
    let comm0 = comms.next().unwrap();
    let comm1 = comms.next().unwrap();
    let (mut d0, mut d1) = split_pair_domains(Box::new(comm0), Box::new(comm1));

    let h0 = thread::spawn(move || {
        let mut driver = ForwardEulerStep::new(
            Box::new(UniformThinning::with_bound(-1.0, 1200.0)),
            Box::new(NoopDiagnostics),
            StepConfig::new(1.0).with_verbose_diagnostics(),
        )
        .unwrap();
        driver.step(&mut d0, 1.0)
    });
    let h1 = thread::spawn(move || {
        let mut driver = ForwardEulerStep::new(
            Box::new(FailingEvaluator::immediate()),
            Box::new(NoopDiagnostics),
            StepConfig::new(1.0).with_verbose_diagnostics(),
        )
        .unwrap();
        driver.step(&mut d1, 1.0)
    });

    let outcome0 = h0.join().unwrap();
    let outcome1 = h1.join().unwrap();

    // Both ranks agree on the binding bound and on who is limiting.
    assert_eq!(outcome0.metrics.global_allowable_dt, Some(1200.0));
    assert_eq!(outcome1.metrics.global_allowable_dt, Some(1200.0));
    assert_eq!(outcome0.metrics.limiting_rank, Some(0));
    assert_eq!(outcome1.metrics.limiting_rank, Some(0));
}

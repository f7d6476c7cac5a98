//! Mock collaborators: evaluators, diagnostics solvers, and the
//! call-counting communicator wrapper.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use firn_comm::{CommError, Communicator, HaloMessage};
use firn_core::FieldTag;
use firn_mesh::Mesh;
use firn_state::{StateLevel, Tendency};
use firn_tendency::{
    DiagnosticsError, DiagnosticsSolver, TendencyError, TendencyEvaluator,
};

/// Evaluator applying one constant rate to every active layer of every
/// owned cell, with a configurable stability bound.
pub struct UniformThinning {
    pub rate: f64,
    pub allowable_dt: f64,
}

impl UniformThinning {
    pub fn new(rate: f64) -> Self {
        Self {
            rate,
            allowable_dt: f64::INFINITY,
        }
    }

    pub fn with_bound(rate: f64, allowable_dt: f64) -> Self {
        Self { rate, allowable_dt }
    }
}

impl TendencyEvaluator for UniformThinning {
    fn name(&self) -> &str {
        "uniform_thinning"
    }

    fn evaluate(
        &self,
        mesh: &Mesh,
        _state: &StateLevel,
        _dt: f64,
        tendency: &mut Tendency,
    ) -> Result<f64, TendencyError> {
        for cell in 0..mesh.owned_cells() {
            let active = mesh.active_levels(cell);
            tendency.column_mut(cell)[..active].fill(self.rate);
        }
        Ok(self.allowable_dt)
    }
}

/// Evaluator that copies each owned cell's old column total into its
/// layer-0 tendency. Gives every partition distinct boundary rates, so
/// halo tests can verify which side's value a ghost cell ends up with.
pub struct EchoThickness;

impl TendencyEvaluator for EchoThickness {
    fn name(&self) -> &str {
        "echo_thickness"
    }

    fn evaluate(
        &self,
        mesh: &Mesh,
        state: &StateLevel,
        _dt: f64,
        tendency: &mut Tendency,
    ) -> Result<f64, TendencyError> {
        for cell in 0..mesh.owned_cells() {
            tendency.column_mut(cell)[0] = state.thickness[cell];
        }
        Ok(f64::INFINITY)
    }
}

/// Evaluator that succeeds for a configurable number of calls, then
/// fails every call after that.
///
/// Uses an atomic counter so it satisfies `Send` (required by the
/// `TendencyEvaluator` trait bound).
pub struct FailingEvaluator {
    succeed_count: usize,
    call_count: AtomicUsize,
}

impl FailingEvaluator {
    /// Fails from the first call.
    pub fn immediate() -> Self {
        Self::after(0)
    }

    /// Succeeds `succeed_count` calls, then fails.
    pub fn after(succeed_count: usize) -> Self {
        Self {
            succeed_count,
            call_count: AtomicUsize::new(0),
        }
    }
}

impl TendencyEvaluator for FailingEvaluator {
    fn name(&self) -> &str {
        "failing_evaluator"
    }

    fn evaluate(
        &self,
        _mesh: &Mesh,
        _state: &StateLevel,
        _dt: f64,
        _tendency: &mut Tendency,
    ) -> Result<f64, TendencyError> {
        let call = self.call_count.fetch_add(1, Ordering::Relaxed);
        if call < self.succeed_count {
            Ok(f64::INFINITY)
        } else {
            Err(TendencyError::SolveFailed {
                reason: format!("injected failure on call {call}"),
            })
        }
    }
}

/// Diagnostics solver that does nothing and always succeeds.
pub struct NoopDiagnostics;

impl DiagnosticsSolver for NoopDiagnostics {
    fn name(&self) -> &str {
        "noop_diagnostics"
    }

    fn recompute(&self, _mesh: &Mesh, _state: &mut StateLevel) -> Result<(), DiagnosticsError> {
        Ok(())
    }
}

/// Diagnostics solver that counts its invocations.
///
/// Used to assert that the orchestrator visits every partition exactly
/// once per step, failures elsewhere notwithstanding.
pub struct RecordingDiagnostics {
    calls: Arc<AtomicUsize>,
}

impl RecordingDiagnostics {
    pub fn new() -> Self {
        Self {
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Shared handle to the invocation counter.
    pub fn counter(&self) -> Arc<AtomicUsize> {
        Arc::clone(&self.calls)
    }
}

impl Default for RecordingDiagnostics {
    fn default() -> Self {
        Self::new()
    }
}

impl DiagnosticsSolver for RecordingDiagnostics {
    fn name(&self) -> &str {
        "recording_diagnostics"
    }

    fn recompute(&self, _mesh: &Mesh, _state: &mut StateLevel) -> Result<(), DiagnosticsError> {
        self.calls.fetch_add(1, Ordering::Relaxed);
        Ok(())
    }
}

/// One collective call observed by [`CountingComm`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CollectiveCall {
    Halo(FieldTag),
    MinF64,
    MaxI64,
}

/// Communicator wrapper that logs every collective call it forwards.
///
/// The log is shared: clone the handle from [`CountingComm::log`] before
/// moving the communicator onto a rank thread, then inspect the sequence
/// after the threads join. Collective-symmetry tests assert that every
/// rank produced the identical sequence.
pub struct CountingComm<C> {
    inner: C,
    log: Arc<Mutex<Vec<CollectiveCall>>>,
}

impl<C: Communicator> CountingComm<C> {
    pub fn new(inner: C) -> Self {
        Self {
            inner,
            log: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Shared handle to the call log.
    pub fn log(&self) -> Arc<Mutex<Vec<CollectiveCall>>> {
        Arc::clone(&self.log)
    }

    fn record(&self, call: CollectiveCall) {
        self.log.lock().expect("call log poisoned").push(call);
    }
}

impl<C: Communicator> Communicator for CountingComm<C> {
    fn rank(&self) -> u32 {
        self.inner.rank()
    }

    fn size(&self) -> u32 {
        self.inner.size()
    }

    fn exchange_halo(
        &self,
        field: FieldTag,
        outgoing: Vec<HaloMessage>,
    ) -> Result<Vec<HaloMessage>, CommError> {
        self.record(CollectiveCall::Halo(field));
        self.inner.exchange_halo(field, outgoing)
    }

    fn min_f64(&self, local: f64) -> Result<f64, CommError> {
        self.record(CollectiveCall::MinF64);
        self.inner.min_f64(local)
    }

    fn max_i64(&self, local: i64) -> Result<i64, CommError> {
        self.record(CollectiveCall::MaxI64);
        self.inner.max_i64(local)
    }
}

//! Per-run context shared between the caller and a running solver.
//!
//! A [`SolverSession`] bundles the cancellation flag, the benchmark log and
//! the instrumentation sink. The solver borrows it for the duration of a
//! call; nothing is process-global.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::benchmark::Benchmark;
use crate::output::{InstrumentationSink, TracingSink};

/// Cooperative cancellation flag.
///
/// Clones share the flag, so a clone handed to another thread (a signal
/// handler, a timeout watchdog) can stop a running solve. The solver polls it
/// before every node evaluation and every search iteration.
#[derive(Debug, Clone, Default)]
pub struct CancellationToken {
    flag: Arc<AtomicBool>,
}

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.flag.store(true, Ordering::Release);
    }

    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::Acquire)
    }

    /// Clear the flag so the session can be reused.
    pub fn reset(&self) {
        self.flag.store(false, Ordering::Release);
    }
}

/// Context object threaded through decomposition and solving.
pub struct SolverSession {
    cancel: CancellationToken,
    benchmark: Benchmark,
    sink: Box<dyn InstrumentationSink>,
}

impl Default for SolverSession {
    fn default() -> Self {
        Self::new()
    }
}

impl SolverSession {
    /// Session reporting through a text [`TracingSink`].
    pub fn new() -> Self {
        Self::with_sink(TracingSink::default())
    }

    pub fn with_sink<S>(sink: S) -> Self
    where
        S: InstrumentationSink + 'static,
    {
        Self {
            cancel: CancellationToken::new(),
            benchmark: Benchmark::new(),
            sink: Box::new(sink),
        }
    }

    pub fn cancellation(&self) -> &CancellationToken {
        &self.cancel
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }

    pub fn benchmark(&self) -> &Benchmark {
        &self.benchmark
    }

    pub fn sink(&self) -> &dyn InstrumentationSink {
        self.sink.as_ref()
    }
}

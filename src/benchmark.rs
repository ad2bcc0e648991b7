//! Phase timestamps for a solve.
//!
//! The solver registers a named timestamp after each phase; a report turns
//! consecutive timestamps into per-phase wall and CPU durations.

use std::io::{self, Write};
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

/// Process CPU time split into user and system time.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CpuTimes {
    pub user: Duration,
    pub system: Duration,
}

impl CpuTimes {
    /// CPU time consumed by this process so far.
    #[cfg(unix)]
    pub fn now() -> Self {
        use nix::sys::resource::{getrusage, UsageWho};

        match getrusage(UsageWho::RUSAGE_SELF) {
            Ok(usage) => Self {
                user: timeval_to_duration(usage.user_time()),
                system: timeval_to_duration(usage.system_time()),
            },
            Err(errno) => {
                tracing::debug!(%errno, "getrusage failed, reporting zero CPU time");
                Self::default()
            }
        }
    }

    #[cfg(not(unix))]
    pub fn now() -> Self {
        Self::default()
    }

    fn saturating_sub(self, earlier: Self) -> Self {
        Self {
            user: self.user.saturating_sub(earlier.user),
            system: self.system.saturating_sub(earlier.system),
        }
    }
}

#[cfg(unix)]
fn timeval_to_duration(tv: nix::sys::time::TimeVal) -> Duration {
    let secs = u64::try_from(tv.tv_sec()).unwrap_or(0);
    let micros = u64::try_from(tv.tv_usec()).unwrap_or(0);
    Duration::from_secs(secs) + Duration::from_micros(micros)
}

#[derive(Debug, Clone)]
pub struct Timestamp {
    pub wall: Instant,
    pub cpu: CpuTimes,
    pub name: String,
}

/// Duration of the phase ending at the named timestamp.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhaseDuration {
    pub name: String,
    pub wall: Duration,
    pub cpu: CpuTimes,
}

/// Timestamp log, safe to share between threads.
#[derive(Debug)]
pub struct Benchmark {
    start: Instant,
    timestamps: Mutex<Vec<Timestamp>>,
}

impl Default for Benchmark {
    fn default() -> Self {
        Self::new()
    }
}

impl Benchmark {
    pub fn new() -> Self {
        Self {
            start: Instant::now(),
            timestamps: Mutex::new(Vec::new()),
        }
    }

    fn records(&self) -> MutexGuard<'_, Vec<Timestamp>> {
        self.timestamps.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn register_timestamp(&self, name: impl Into<String>) {
        let stamp = Timestamp {
            wall: Instant::now(),
            cpu: CpuTimes::now(),
            name: name.into(),
        };
        self.records().push(stamp);
    }

    pub fn len(&self) -> usize {
        self.records().len()
    }

    pub fn is_empty(&self) -> bool {
        self.records().is_empty()
    }

    /// Names of the registered timestamps, oldest first.
    pub fn names(&self) -> Vec<String> {
        self.records().iter().map(|t| t.name.clone()).collect()
    }

    /// Wall time since the log was created.
    pub fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }

    /// Remove every timestamp and return the phases they delimit.
    ///
    /// The first phase is all-zero; every later phase is the difference to
    /// the timestamp registered before it.
    pub fn drain_report(&self) -> Vec<PhaseDuration> {
        let stamps = std::mem::take(&mut *self.records());
        let mut phases = Vec::with_capacity(stamps.len());
        let mut previous: Option<&Timestamp> = None;
        for stamp in &stamps {
            let (wall, cpu) = match previous {
                Some(prev) => (
                    stamp.wall.saturating_duration_since(prev.wall),
                    stamp.cpu.saturating_sub(prev.cpu),
                ),
                None => (Duration::ZERO, CpuTimes::default()),
            };
            phases.push(PhaseDuration {
                name: stamp.name.clone(),
                wall,
                cpu,
            });
            previous = Some(stamp);
        }
        phases
    }

    /// Drain the log and render it, one phase per line.
    pub fn write_report<W: Write>(&self, out: &mut W, csv: bool) -> io::Result<()> {
        let phases = self.drain_report();
        if csv {
            writeln!(out, "phase,wall_s,user_s,system_s")?;
            for p in &phases {
                writeln!(
                    out,
                    "{},{:.6},{:.6},{:.6}",
                    p.name,
                    p.wall.as_secs_f64(),
                    p.cpu.user.as_secs_f64(),
                    p.cpu.system.as_secs_f64()
                )?;
            }
        } else {
            for p in &phases {
                writeln!(
                    out,
                    "{:<28} wall {:>10.6}s  user {:>10.6}s  sys {:>10.6}s",
                    p.name,
                    p.wall.as_secs_f64(),
                    p.cpu.user.as_secs_f64(),
                    p.cpu.system.as_secs_f64()
                )?;
            }
        }
        Ok(())
    }
}

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};
use sysinfo::System;

/// Per-run measurements collected while the agent loop executes.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct EvaluationReport {
    pub duration: Duration,
    /// Resident memory of this process when the run finished.
    pub process_memory_bytes: u64,
    pub iterations: usize,
    pub tool_calls: usize,
    pub failures: usize,
    pub calls_by_tool: BTreeMap<String, usize>,
    pub success: bool,
}

impl EvaluationReport {
    pub fn success_rate(reports: &[Self]) -> f32 {
        if reports.is_empty() {
            return 0.0;
        }
        let successes = reports.iter().filter(|r| r.success).count();
        successes as f32 / reports.len() as f32
    }
}

#[derive(Default, Clone)]
pub struct MetricsTracker {
    reports: Arc<Mutex<Vec<EvaluationReport>>>,
}

impl MetricsTracker {
    pub fn start_run(&self) -> RunGuard {
        RunGuard {
            start: Instant::now(),
            iterations: 0,
            tool_calls: 0,
            failures: 0,
            calls_by_tool: BTreeMap::new(),
            metrics: self.clone(),
        }
    }

    pub fn reports(&self) -> Vec<EvaluationReport> {
        match self.reports.lock() {
            Ok(reports) => reports.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }
}

pub struct RunGuard {
    start: Instant,
    iterations: usize,
    tool_calls: usize,
    failures: usize,
    calls_by_tool: BTreeMap<String, usize>,
    metrics: MetricsTracker,
}

impl RunGuard {
    pub fn record_iteration(&mut self) {
        self.iterations += 1;
    }

    pub fn record_tool_call(&mut self, tool: impl Into<String>) {
        self.tool_calls += 1;
        *self.calls_by_tool.entry(tool.into()).or_default() += 1;
    }

    pub fn record_failure(&mut self) {
        self.failures += 1;
    }

    /// A run succeeds when it ends without contract violations and no goal failed.
    pub fn finish(self, success: bool) -> EvaluationReport {
        let report = EvaluationReport {
            duration: self.start.elapsed(),
            process_memory_bytes: process_memory_bytes(),
            iterations: self.iterations,
            tool_calls: self.tool_calls,
            failures: self.failures,
            calls_by_tool: self.calls_by_tool,
            success,
        };
        match self.metrics.reports.lock() {
            Ok(mut reports) => reports.push(report.clone()),
            Err(poisoned) => poisoned.into_inner().push(report.clone()),
        }
        report
    }
}

fn process_memory_bytes() -> u64 {
    let Ok(pid) = sysinfo::get_current_pid() else {
        return 0;
    };
    let mut system = System::new();
    system.refresh_process(pid);
    system.process(pid).map(|process| process.memory()).unwrap_or(0)
}

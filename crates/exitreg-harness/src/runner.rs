//! Scenario execution engine.

use std::sync::{Arc, Weak};

use exitreg_core::{Args, ExitRegistry, Handler, HandlerFailure, MemorySink};
use parking_lot::Mutex;
use serde::Serialize;

use crate::error::HarnessError;
use crate::scenario::{Behavior, DrainOutcome, HandlerSpec, Scenario, ScenarioSet};
use crate::structured_log::{LogEmitter, LogEntry, LogLevel, Outcome};

type CallLog = Arc<Mutex<Vec<(String, Args)>>>;

/// Result of running one scenario.
#[derive(Debug, Clone, Serialize)]
pub struct ScenarioReport {
    pub name: String,
    /// Handler names in invocation order.
    pub invoked: Vec<String>,
    /// Rendered calls, e.g. `x3(5, "bar")`.
    pub calls: Vec<String>,
    pub outcome: DrainOutcome,
    pub diagnostics: usize,
    pub passed: bool,
    pub mismatches: Vec<String>,
}

/// Runs scenarios, each through its own registry.
pub struct ScenarioRunner {
    /// Name of the run campaign.
    pub campaign: String,
}

impl ScenarioRunner {
    #[must_use]
    pub fn new(campaign: impl Into<String>) -> Self {
        Self {
            campaign: campaign.into(),
        }
    }

    /// Registers the scenario's handlers in order, drains once, and compares
    /// against the scenario's expectations.
    pub fn run(
        &self,
        scenario: &Scenario,
        mut log: Option<&mut LogEmitter>,
    ) -> Result<ScenarioReport, HarnessError> {
        if let Some(emitter) = log.as_deref_mut() {
            emitter.emit_entry(
                self.entry(LogLevel::Info, "scenario_start", scenario)
                    .with_details(serde_json::json!({ "handlers": scenario.handlers.len() })),
            )?;
        }

        let sink = MemorySink::new();
        let registry = Arc::new(ExitRegistry::with_sink(sink.clone()));
        let calls = CallLog::default();
        let weak = Arc::downgrade(&registry);
        for spec in &scenario.handlers {
            registry.register(build_handler(spec, &calls, &weak), spec.args.clone());
        }

        let result = registry.run_pending();
        let outcome = DrainOutcome::from_result(&result);
        let calls = std::mem::take(&mut *calls.lock());

        let invoked: Vec<String> = calls.iter().map(|(name, _)| name.clone()).collect();
        let rendered: Vec<String> = calls
            .iter()
            .map(|(name, args)| format!("{name}({args})"))
            .collect();
        let mismatches = compare(scenario, &invoked, &outcome, sink.len());
        let passed = mismatches.is_empty();

        if let Some(emitter) = log.as_deref_mut() {
            for (name, args) in &calls {
                emitter.emit_entry(
                    self.entry(LogLevel::Debug, "handler_invoked", scenario)
                        .with_handler(name)
                        .with_details(serde_json::to_value(args)?),
                )?;
            }
            let level = if passed { LogLevel::Info } else { LogLevel::Warn };
            let mut complete = self
                .entry(level, "drain_complete", scenario)
                .with_outcome(if passed { Outcome::Pass } else { Outcome::Fail })
                .with_details(serde_json::json!({
                    "outcome": outcome,
                    "diagnostics": sink.len(),
                    "mismatches": mismatches,
                }));
            if let Err(HandlerFailure::TerminationRequest { status }) = &result {
                complete = complete.with_exit_code(*status);
            }
            emitter.emit_entry(complete)?;
        }

        Ok(ScenarioReport {
            name: scenario.name.clone(),
            invoked,
            calls: rendered,
            outcome,
            diagnostics: sink.len(),
            passed,
            mismatches,
        })
    }

    /// Log entry tagged with this runner's campaign; the emitter assigns the
    /// trace id.
    fn entry(&self, level: LogLevel, event: &str, scenario: &Scenario) -> LogEntry {
        LogEntry::new("", level, event)
            .with_campaign(&self.campaign)
            .with_scenario(&scenario.name)
    }

    /// Runs every scenario in the set.
    pub fn run_set(
        &self,
        set: &ScenarioSet,
        mut log: Option<&mut LogEmitter>,
    ) -> Result<Vec<ScenarioReport>, HarnessError> {
        set.scenarios
            .iter()
            .map(|scenario| self.run(scenario, log.as_deref_mut()))
            .collect()
    }
}

fn build_handler(spec: &HandlerSpec, calls: &CallLog, registry: &Weak<ExitRegistry>) -> Handler {
    let name = spec.name.clone();
    let behavior = spec.behavior.clone();
    let calls = Arc::clone(calls);
    let registry = Weak::clone(registry);
    Arc::new(move |args: &Args| {
        calls.lock().push((name.clone(), args.clone()));
        match &behavior {
            Behavior::Ok => Ok(()),
            Behavior::Error { error, message } => {
                Err(HandlerFailure::error(error.clone(), message.clone()))
            }
            Behavior::Exit { status } => Err(HandlerFailure::exit(*status)),
            Behavior::Panic { message } => panic!("{message}"),
            Behavior::Register { child } => {
                if let Some(registry) = registry.upgrade() {
                    let handler = build_handler(child, &calls, &Arc::downgrade(&registry));
                    registry.register(handler, child.args.clone());
                }
                Ok(())
            }
        }
    })
}

fn compare(
    scenario: &Scenario,
    invoked: &[String],
    outcome: &DrainOutcome,
    diagnostics: usize,
) -> Vec<String> {
    let mut mismatches = Vec::new();
    if let Some(expected) = &scenario.expected_order
        && expected.as_slice() != invoked
    {
        mismatches.push(format!(
            "order: expected {expected:?}, got {invoked:?}"
        ));
    }
    if let Some(expected) = &scenario.expected_outcome
        && expected != outcome
    {
        mismatches.push(format!("outcome: expected {expected:?}, got {outcome:?}"));
    }
    if let Some(expected) = scenario.expected_diagnostics
        && expected != diagnostics
    {
        mismatches.push(format!(
            "diagnostics: expected {expected}, got {diagnostics}"
        ));
    }
    mismatches
}

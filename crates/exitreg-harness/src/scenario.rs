//! Scenario definitions loaded from JSON.

use std::path::Path;

use exitreg_core::{Args, HandlerFailure};
use serde::{Deserialize, Serialize};

use crate::error::HarnessError;

/// What a scenario handler does when invoked.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Behavior {
    /// Return normally.
    #[default]
    Ok,
    /// Fail with an ordinary handler error.
    Error { error: String, message: String },
    /// Request process exit with `status`.
    Exit { status: i32 },
    /// Panic with `message`.
    Panic { message: String },
    /// Register `child` on the same registry, then return normally.
    Register { child: Box<HandlerSpec> },
}

/// One handler in a scenario, registered in list order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HandlerSpec {
    pub name: String,
    #[serde(default)]
    pub args: Args,
    #[serde(default)]
    pub behavior: Behavior,
}

/// Final result of a drain, comparable against an expectation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DrainOutcome {
    Ok,
    Error { error: String, message: String },
    Exit { status: i32 },
}

impl DrainOutcome {
    #[must_use]
    pub fn from_result(result: &Result<(), HandlerFailure>) -> Self {
        match result {
            Ok(()) => Self::Ok,
            Err(HandlerFailure::TerminationRequest { status }) => Self::Exit { status: *status },
            Err(HandlerFailure::HandlerError { kind, message, .. }) => Self::Error {
                error: kind.clone(),
                message: message.clone(),
            },
        }
    }
}

/// A registration script plus what the drain should produce.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Scenario {
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub handlers: Vec<HandlerSpec>,
    /// Handler names in expected invocation order.
    #[serde(default)]
    pub expected_order: Option<Vec<String>>,
    #[serde(default)]
    pub expected_outcome: Option<DrainOutcome>,
    /// Number of failure diagnostics the drain should report.
    #[serde(default)]
    pub expected_diagnostics: Option<usize>,
}

/// A versioned collection of scenarios.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScenarioSet {
    pub version: String,
    pub scenarios: Vec<Scenario>,
}

impl ScenarioSet {
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    pub fn from_file(path: &Path) -> Result<Self, HarnessError> {
        let content = std::fs::read_to_string(path).map_err(|source| HarnessError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(Self::from_json(&content)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use exitreg_core::args;

    #[test]
    fn parses_all_behaviors() {
        let set = ScenarioSet::from_json(
            r#"{
                "version":"v1",
                "scenarios":[{
                    "name":"mixed",
                    "handlers":[
                        {"name":"plain"},
                        {"name":"bad","behavior":{"kind":"error","error":"ValueError","message":"nope"}},
                        {"name":"quit","behavior":{"kind":"exit","status":2}},
                        {"name":"boom","behavior":{"kind":"panic","message":"kaboom"}},
                        {"name":"spawn","behavior":{"kind":"register","child":{"name":"kid","args":{"positional":[1]}}}}
                    ],
                    "expected_outcome":{"kind":"error","error":"panic","message":"kaboom"}
                }]
            }"#,
        )
        .expect("valid scenario json");

        let handlers = &set.scenarios[0].handlers;
        assert_eq!(handlers[0].behavior, Behavior::Ok);
        assert!(handlers[0].args.is_empty());
        assert_eq!(
            handlers[1].behavior,
            Behavior::Error {
                error: "ValueError".into(),
                message: "nope".into()
            }
        );
        assert_eq!(handlers[2].behavior, Behavior::Exit { status: 2 });
        match &handlers[4].behavior {
            Behavior::Register { child } => {
                assert_eq!(child.name, "kid");
                assert_eq!(child.args, args![1]);
            }
            other => panic!("unexpected behavior {other:?}"),
        }
        assert_eq!(
            set.scenarios[0].expected_outcome,
            Some(DrainOutcome::Error {
                error: "panic".into(),
                message: "kaboom".into()
            })
        );
        assert!(set.scenarios[0].expected_order.is_none());
    }

    #[test]
    fn outcome_from_result() {
        assert_eq!(DrainOutcome::from_result(&Ok(())), DrainOutcome::Ok);
        assert_eq!(
            DrainOutcome::from_result(&Err(HandlerFailure::exit(9))),
            DrainOutcome::Exit { status: 9 }
        );
        assert_eq!(
            DrainOutcome::from_result(&Err(HandlerFailure::error("K", "m"))),
            DrainOutcome::Error {
                error: "K".into(),
                message: "m".into()
            }
        );
    }

    #[test]
    fn missing_file_reports_path() {
        let err = ScenarioSet::from_file(Path::new("/nonexistent/exitreg/scenarios.json"))
            .unwrap_err();
        assert!(matches!(err, HarnessError::Read { .. }));
        assert!(err.to_string().contains("/nonexistent/exitreg/scenarios.json"));
    }
}

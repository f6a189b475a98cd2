use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum StepOutcome {
    Passed,
    Failed { reason: String },
    Skipped { reason: String },
}

impl StepOutcome {
    pub fn is_failure(&self) -> bool {
        matches!(self, StepOutcome::Failed { .. })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StepRecord {
    pub timestamp: DateTime<Utc>,
    pub label: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<u16>,
    #[serde(flatten)]
    pub outcome: StepOutcome,
}

impl StepRecord {
    pub fn new(label: impl Into<String>, status: Option<u16>, outcome: StepOutcome) -> Self {
        Self {
            timestamp: Utc::now(),
            label: label.into(),
            status,
            outcome,
        }
    }
}

pub trait Recorder {
    fn record(&mut self, step: StepRecord);
    fn records(&self) -> &[StepRecord];

    fn failures(&self) -> usize {
        self.records()
            .iter()
            .filter(|r| r.outcome.is_failure())
            .count()
    }
}

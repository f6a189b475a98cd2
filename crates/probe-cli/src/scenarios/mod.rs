//! Scripted walks through the API. Each scenario registers its own user, prints
//! every exchange and records one [`StepRecord`] per checked call.

mod auth;
mod boards;
mod comments;
mod list_validation;
mod lists;
mod session;

use std::fmt::Display;
use std::io::Write;

use clap::ValueEnum;
use probe_client::render::{render_compact, render_exchange, RULE_WIDTH};
use probe_client::{ApiClient, EntityId, Exchange};
use probe_core::{ProbeConfig, ProbeResult, Recorder, StepOutcome, StepRecord};
use serde::Serialize;

use crate::context::ProbeContext;

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Scenario {
    /// Register a user and log in
    Auth,
    /// Board CRUD and membership
    Boards,
    /// List CRUD inside a fixture board
    Lists,
    /// Comment CRUD on a fixture card
    Comments,
    /// Error statuses of list creation
    ListValidation,
    /// Every scenario above, in order
    All,
}

impl Scenario {
    const SEQUENCE: [Scenario; 5] = [
        Scenario::Auth,
        Scenario::Boards,
        Scenario::Lists,
        Scenario::Comments,
        Scenario::ListValidation,
    ];

    pub fn expand(self) -> Vec<Scenario> {
        match self {
            Scenario::All => Self::SEQUENCE.to_vec(),
            single => vec![single],
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            Scenario::Auth => "Testing Authentication",
            Scenario::Boards => "Testing Board Operations",
            Scenario::Lists => "Testing List Operations",
            Scenario::Comments => "Testing Comment Operations",
            Scenario::ListValidation => "Testing List Validation",
            Scenario::All => "Testing All Operations",
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ScenarioReport {
    pub scenario: Scenario,
    pub steps: Vec<StepRecord>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub aborted: Option<String>,
}

impl ScenarioReport {
    pub fn new(scenario: Scenario) -> Self {
        Self {
            scenario,
            steps: Vec::new(),
            aborted: None,
        }
    }

    fn count(&self, pred: impl Fn(&StepOutcome) -> bool) -> usize {
        self.steps.iter().filter(|s| pred(&s.outcome)).count()
    }

    pub fn passed(&self) -> usize {
        self.count(|o| *o == StepOutcome::Passed)
    }

    pub fn skipped(&self) -> usize {
        self.count(|o| matches!(o, StepOutcome::Skipped { .. }))
    }

    pub fn summary_line(&self) -> String {
        let name = self
            .scenario
            .to_possible_value()
            .map(|v| v.get_name().to_string())
            .unwrap_or_default();
        let mut line = format!(
            "{}: {} passed, {} failed, {} skipped",
            name,
            self.passed(),
            self.failures(),
            self.skipped()
        );
        if let Some(reason) = &self.aborted {
            line.push_str(&format!(" (aborted: {reason})"));
        }
        line
    }
}

impl Recorder for ScenarioReport {
    fn record(&mut self, step: StepRecord) {
        self.steps.push(step);
    }

    fn records(&self) -> &[StepRecord] {
        &self.steps
    }
}

/// What a step needs from the response to pass.
#[derive(Debug, Clone, Copy)]
pub struct Expect {
    pub statuses: &'static [u16],
    pub field: Option<&'static str>,
}

impl Expect {
    pub const OK: Expect = Expect::status(&[200]);
    pub const CREATED: Expect = Expect {
        statuses: &[201],
        field: Some("id"),
    };
    pub const DELETED: Expect = Expect::status(&[200, 204]);
    pub const NOT_FOUND: Expect = Expect::status(&[404]);
    pub const BAD_REQUEST: Expect = Expect::status(&[400]);
    pub const REGISTERED: Expect = Expect {
        statuses: &[201],
        field: Some("user"),
    };
    pub const LOGGED_IN: Expect = Expect {
        statuses: &[200],
        field: Some("token"),
    };

    pub const fn status(statuses: &'static [u16]) -> Self {
        Self {
            statuses,
            field: None,
        }
    }

    pub fn evaluate(&self, exchange: &Exchange) -> StepOutcome {
        if !exchange.is_status(self.statuses) {
            let expected: Vec<String> = self.statuses.iter().map(u16::to_string).collect();
            return StepOutcome::Failed {
                reason: format!(
                    "expected status {}, got {}",
                    expected.join(" or "),
                    exchange.status()
                ),
            };
        }
        match self.field {
            Some(field) if exchange.field(field).is_none() => StepOutcome::Failed {
                reason: format!("response has no `{field}` field"),
            },
            _ => StepOutcome::Passed,
        }
    }
}

/// Drives one scenario: owns a client with its own token, the console and
/// the report being built.
pub struct Runner<'a> {
    pub client: ApiClient,
    pub config: &'a ProbeConfig,
    report: ScenarioReport,
    out: Box<dyn Write + Send>,
    counter: usize,
}

impl<'a> Runner<'a> {
    pub fn new(
        scenario: Scenario,
        client: ApiClient,
        config: &'a ProbeConfig,
        out: Box<dyn Write + Send>,
    ) -> Self {
        Self {
            client,
            config,
            report: ScenarioReport::new(scenario),
            out,
            counter: 0,
        }
    }

    pub fn say(&mut self, text: impl Display) -> ProbeResult<()> {
        writeln!(self.out, "{text}")?;
        Ok(())
    }

    pub fn heading(&mut self, title: &str) -> ProbeResult<()> {
        self.say(title)?;
        self.say("=".repeat(RULE_WIDTH))
    }

    /// Numbered step header, e.g. `3. Testing GET /api/boards/:id`.
    pub fn announce(&mut self, text: impl Display) -> ProbeResult<()> {
        self.counter += 1;
        writeln!(self.out, "\n{}. {}", self.counter, text)?;
        Ok(())
    }

    /// Prints the full exchange and records the step.
    pub fn check(&mut self, label: &str, exchange: &Exchange, expect: Expect) -> ProbeResult<bool> {
        write!(self.out, "{}", render_exchange(exchange))?;
        Ok(self.record(label, exchange, expect))
    }

    pub fn check_compact(
        &mut self,
        label: &str,
        exchange: &Exchange,
        expect: Expect,
    ) -> ProbeResult<bool> {
        writeln!(self.out, "{}", render_compact(exchange))?;
        Ok(self.record(label, exchange, expect))
    }

    /// Records the step without printing it; used for setup calls.
    pub fn record(&mut self, label: &str, exchange: &Exchange, expect: Expect) -> bool {
        let outcome = expect.evaluate(exchange);
        if let StepOutcome::Failed { reason } = &outcome {
            tracing::warn!(
                step = label,
                status = exchange.status(),
                body = %exchange.response.text,
                "{reason}"
            );
        }
        let passed = outcome == StepOutcome::Passed;
        self.report
            .record(StepRecord::new(label, Some(exchange.status()), outcome));
        passed
    }

    /// Like [`Runner::check`], returning the created id when the step passed.
    pub fn check_created(&mut self, label: &str, exchange: &Exchange) -> ProbeResult<Option<EntityId>> {
        let passed = self.check(label, exchange, Expect::CREATED)?;
        Ok(if passed { exchange.id() } else { None })
    }

    /// Quiet setup variant of [`Runner::check_created`].
    pub fn fixture(&mut self, label: &str, exchange: &Exchange) -> Option<EntityId> {
        if self.record(label, exchange, Expect::CREATED) {
            exchange.id()
        } else {
            None
        }
    }

    pub fn skip(&mut self, label: &str, reason: &str) {
        self.report.record(StepRecord::new(
            label,
            None,
            StepOutcome::Skipped {
                reason: reason.to_string(),
            },
        ));
    }

    /// One skipped record per step that will not run.
    pub fn skip_all(&mut self, labels: &[&str], reason: &str) {
        for label in labels {
            self.skip(label, reason);
        }
    }

    pub fn abort(&mut self, reason: impl Into<String>) -> ProbeResult<()> {
        let reason = reason.into();
        tracing::warn!(scenario = ?self.report.scenario, "{reason}");
        self.say(&reason)?;
        self.report.aborted = Some(reason);
        Ok(())
    }

    pub fn finish(mut self) -> ScenarioReport {
        let _ = self.out.flush();
        self.report
    }
}

/// Runs `scenario` (expanded when it is `all`) after the startup delay.
pub async fn run(ctx: &ProbeContext, scenario: Scenario) -> Vec<ScenarioReport> {
    let delay = ctx.config.startup_delay();
    if !delay.is_zero() {
        tracing::debug!(?delay, "waiting for the server to come up");
        tokio::time::sleep(delay).await;
    }

    let mut reports = Vec::new();
    for (index, scenario) in scenario.expand().into_iter().enumerate() {
        let mut out = ctx.console();
        if index > 0 {
            let _ = writeln!(out);
        }
        reports.push(run_one(ctx, scenario, out).await);
    }
    reports
}

async fn run_one(ctx: &ProbeContext, scenario: Scenario, out: Box<dyn Write + Send>) -> ScenarioReport {
    let mut client = ctx.client.clone();
    client.clear_token();
    let mut runner = Runner::new(scenario, client, &ctx.config, out);

    let result = match runner.heading(scenario.title()) {
        Ok(()) => match scenario {
            Scenario::Auth => auth::run(&mut runner).await,
            Scenario::Boards => boards::run(&mut runner).await,
            Scenario::Lists => lists::run(&mut runner).await,
            Scenario::Comments => comments::run(&mut runner).await,
            Scenario::ListValidation => list_validation::run(&mut runner).await,
            Scenario::All => Ok(()),
        },
        Err(e) => Err(e),
    };

    if let Err(e) = result {
        let _ = runner.abort(format!("Aborted: {e}"));
    }
    runner.finish()
}

#[cfg(test)]
mod tests {
    use super::*;
    use probe_client::{RequestRecord, ResponseRecord};

    fn exchange(status: u16, body: &str) -> Exchange {
        Exchange {
            request: RequestRecord {
                method: "POST".into(),
                url: "http://localhost:8080/api/boards".into(),
                headers: Vec::new(),
                body: None,
            },
            response: ResponseRecord::new(status, Vec::new(), body.to_string()),
        }
    }

    #[test]
    fn test_all_expands_in_order() {
        assert_eq!(
            Scenario::All.expand(),
            vec![
                Scenario::Auth,
                Scenario::Boards,
                Scenario::Lists,
                Scenario::Comments,
                Scenario::ListValidation
            ]
        );
        assert_eq!(Scenario::Lists.expand(), vec![Scenario::Lists]);
    }

    #[test]
    fn test_created_requires_id() {
        assert_eq!(
            Expect::CREATED.evaluate(&exchange(201, r#"{"id":1}"#)),
            StepOutcome::Passed
        );
        assert!(Expect::CREATED
            .evaluate(&exchange(201, r#"{"title":"x"}"#))
            .is_failure());
        assert!(Expect::CREATED
            .evaluate(&exchange(400, r#"{"id":1}"#))
            .is_failure());
    }

    #[test]
    fn test_deleted_accepts_200_and_204() {
        assert_eq!(Expect::DELETED.evaluate(&exchange(204, "")), StepOutcome::Passed);
        assert_eq!(
            Expect::DELETED.evaluate(&exchange(200, r#"{"message":"List deleted"}"#)),
            StepOutcome::Passed
        );
        match Expect::DELETED.evaluate(&exchange(500, "")) {
            StepOutcome::Failed { reason } => {
                assert_eq!(reason, "expected status 200 or 204, got 500")
            }
            other => panic!("unexpected outcome {other:?}"),
        }
    }

    #[test]
    fn test_runner_records_steps_and_abort() {
        let config = ProbeConfig::default();
        let client = ApiClient::new("http://127.0.0.1:9/api", config.request_timeout()).unwrap();
        let mut runner = Runner::new(Scenario::Boards, client, &config, Box::new(std::io::sink()));

        assert!(runner.check("GET /boards", &exchange(200, "[]"), Expect::OK).unwrap());
        assert!(!runner
            .check("GET /boards/:id", &exchange(500, "oops"), Expect::OK)
            .unwrap());
        runner.skip_all(&["PUT /boards/:id", "DELETE /boards/:id"], "board was not created");
        runner.abort("Failed to create board. Exiting.").unwrap();

        let report = runner.finish();
        assert_eq!(report.passed(), 1);
        assert_eq!(report.failures(), 1);
        assert_eq!(report.skipped(), 2);
        assert_eq!(
            report.summary_line(),
            "boards: 1 passed, 1 failed, 2 skipped (aborted: Failed to create board. Exiting.)"
        );
    }

    #[test]
    fn test_report_serializes_scenario_name() {
        let report = ScenarioReport::new(Scenario::ListValidation);
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["scenario"], "list-validation");
        assert!(json.get("aborted").is_none());
    }
}

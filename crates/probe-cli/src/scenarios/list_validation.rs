use probe_client::{BoardInput, EntityId, Exchange, ListInput, Resource};
use probe_core::ProbeResult;

use super::session::register_and_authenticate;
use super::{Expect, Runner};

/// Board id that no server is expected to have.
const MISSING_BOARD: i64 = 99999;

pub async fn run(runner: &mut Runner<'_>) -> ProbeResult<()> {
    if register_and_authenticate(runner, "valtest", "Validation")
        .await?
        .is_none()
    {
        return runner.abort("Failed to get token");
    }

    let board = runner
        .client
        .boards()
        .create(&BoardInput {
            title: "Validation Test Board".into(),
            description: "Board for validation testing".into(),
        })
        .await?;
    let Some(board_id) = runner.fixture("POST /boards (fixture)", &board) else {
        return runner.abort("Failed to create board");
    };
    runner.say(format!("Created board with ID: {board_id}"))?;

    runner.say("\nTesting POST /api/lists validation errors...")?;

    runner.announce("Testing missing 'board' field:")?;
    let missing = runner
        .client
        .lists()
        .create(&ListInput {
            title: Some("Test List".into()),
            board_id: None,
        })
        .await?;
    runner.check_compact("POST /lists (missing board)", &missing, Expect::BAD_REQUEST)?;

    runner.announce("Testing non-existent board:")?;
    let unknown = runner
        .client
        .lists()
        .create(&ListInput {
            title: Some("Test List".into()),
            board_id: Some(EntityId::from(MISSING_BOARD)),
        })
        .await?;
    runner.check_compact("POST /lists (unknown board)", &unknown, Expect::NOT_FOUND)?;

    runner.announce("Testing validation error (empty title):")?;
    let empty = runner
        .client
        .lists()
        .create(&ListInput {
            title: Some(String::new()),
            board_id: Some(board_id.clone()),
        })
        .await?;
    runner.check_compact("POST /lists (empty title)", &empty, Expect::BAD_REQUEST)?;

    runner.announce("Testing valid creation:")?;
    let valid = runner
        .client
        .lists()
        .create(&ListInput {
            title: Some("Valid Test List".into()),
            board_id: Some(board_id),
        })
        .await?;
    report_creation(runner, &valid)
}

fn report_creation(runner: &mut Runner<'_>, valid: &Exchange) -> ProbeResult<()> {
    runner.say(format!("Status: {}", valid.status()))?;
    let line = if runner.record("POST /lists (valid)", valid, Expect::CREATED) {
        format!("Created list: {}", valid.response.text)
    } else {
        format!("Response: {}", valid.response.text)
    };
    runner.say(line)?;
    runner.say("")
}

use probe_client::{BoardInput, BoardPatch, Fetch, Resource};
use probe_core::ProbeResult;

use super::session::register_and_authenticate;
use super::{Expect, Runner};

pub async fn run(runner: &mut Runner<'_>) -> ProbeResult<()> {
    runner.announce("Authenticating user...")?;
    if register_and_authenticate(runner, "boardtest", "Board")
        .await?
        .is_none()
    {
        return runner.abort("Failed to authenticate user. Exiting.");
    }

    runner.announce("Testing GET /api/boards (empty list)")?;
    let listed = runner.client.boards().list().await?;
    runner.check("GET /boards", &listed, Expect::OK)?;

    runner.announce("Testing POST /api/boards (create board)")?;
    let created = runner
        .client
        .boards()
        .create(&BoardInput {
            title: "My Test Board".into(),
            description: "This is a test board".into(),
        })
        .await?;
    let Some(board_id) = runner.check_created("POST /boards", &created)? else {
        runner.skip_all(
            &[
                "GET /boards/:id",
                "PUT /boards/:id",
                "GET /boards/:id/members",
                "GET /boards",
                "DELETE /boards/:id",
                "GET /boards/:id (deleted)",
            ],
            "board was not created",
        );
        return runner.say("Board testing complete.");
    };

    runner.announce("Testing GET /api/boards/:id")?;
    let fetched = runner.client.boards().get(&board_id).await?;
    runner.check("GET /boards/:id", &fetched, Expect::OK)?;

    runner.announce("Testing PUT /api/boards/:id")?;
    let updated = runner
        .client
        .boards()
        .update(
            &board_id,
            &BoardPatch {
                title: Some("Updated Test Board".into()),
                description: Some("Updated description".into()),
            },
        )
        .await?;
    runner.check("PUT /boards/:id", &updated, Expect::OK)?;

    runner.announce("Testing GET /api/boards/:boardId/members")?;
    let members = runner.client.boards().members(&board_id).await?;
    runner.check("GET /boards/:id/members", &members, Expect::OK)?;

    runner.announce("Testing GET /api/boards (with created board)")?;
    let listed = runner.client.boards().list().await?;
    runner.check("GET /boards", &listed, Expect::OK)?;

    runner.announce("Testing DELETE /api/boards/:id")?;
    let deleted = runner.client.boards().delete(&board_id).await?;
    runner.check("DELETE /boards/:id", &deleted, Expect::DELETED)?;

    runner.announce("Testing GET /api/boards/:id (deleted board)")?;
    let gone = runner.client.boards().get(&board_id).await?;
    runner.check("GET /boards/:id (deleted)", &gone, Expect::NOT_FOUND)?;

    runner.say("Board testing complete.")
}

use probe_client::{BoardInput, Fetch, ListInput, Resource};
use probe_core::ProbeResult;

use super::session::register_and_authenticate;
use super::{Expect, Runner};

pub async fn run(runner: &mut Runner<'_>) -> ProbeResult<()> {
    runner.announce("Authenticating user...")?;
    if register_and_authenticate(runner, "listtest", "List")
        .await?
        .is_none()
    {
        return runner.abort("Failed to authenticate user. Exiting.");
    }

    runner.announce("Creating a test board...")?;
    let board = runner
        .client
        .boards()
        .create(&BoardInput {
            title: "List Test Board".into(),
            description: "Board for list testing".into(),
        })
        .await?;
    let Some(board_id) = runner.fixture("POST /boards (fixture)", &board) else {
        return runner.abort("Failed to create board. Exiting.");
    };
    runner.say(format!("Created board with ID: {board_id}"))?;

    runner.announce(format!("Testing GET /api/lists?board_id={board_id}"))?;
    let listed = runner.client.lists().list(Some(&board_id)).await?;
    runner.check("GET /lists?board_id=", &listed, Expect::OK)?;

    runner.announce("Testing POST /api/lists (create list)")?;
    let created = runner
        .client
        .lists()
        .create(&ListInput {
            title: Some("Test List".into()),
            board_id: Some(board_id.clone()),
        })
        .await?;
    let Some(list_id) = runner.check_created("POST /lists", &created)? else {
        runner.skip_all(
            &[
                "GET /lists?board_id=",
                "GET /lists/:id",
                "PUT /lists/:id (title)",
                "PUT /lists/:id (board)",
                "DELETE /lists/:id",
                "GET /lists?board_id= (after delete)",
                "GET /lists/:id (deleted)",
            ],
            "list was not created",
        );
        return runner.say("List testing complete.");
    };

    runner.announce(format!(
        "Testing GET /api/lists?board_id={board_id} (with created list)"
    ))?;
    let listed = runner.client.lists().list(Some(&board_id)).await?;
    runner.check("GET /lists?board_id=", &listed, Expect::OK)?;

    runner.announce("Testing GET /api/lists/:id")?;
    let fetched = runner.client.lists().get(&list_id).await?;
    runner.check("GET /lists/:id", &fetched, Expect::OK)?;

    runner.announce("Testing PUT /api/lists/:id (update title)")?;
    let renamed = runner
        .client
        .lists()
        .update(
            &list_id,
            &ListInput {
                title: Some("Updated Test List".into()),
                board_id: None,
            },
        )
        .await?;
    runner.check("PUT /lists/:id (title)", &renamed, Expect::OK)?;

    runner.announce("Testing PUT /api/lists/:id (same board)")?;
    let moved = runner
        .client
        .lists()
        .update(
            &list_id,
            &ListInput {
                title: None,
                board_id: Some(board_id.clone()),
            },
        )
        .await?;
    runner.check("PUT /lists/:id (board)", &moved, Expect::OK)?;

    runner.announce("Testing DELETE /api/lists/:id")?;
    let deleted = runner.client.lists().delete(&list_id).await?;
    runner.check("DELETE /lists/:id", &deleted, Expect::DELETED)?;

    runner.announce(format!(
        "Testing GET /api/lists?board_id={board_id} (after deletion)"
    ))?;
    let listed = runner.client.lists().list(Some(&board_id)).await?;
    runner.check("GET /lists?board_id= (after delete)", &listed, Expect::OK)?;

    runner.announce("Testing GET /api/lists/:id (deleted list)")?;
    let gone = runner.client.lists().get(&list_id).await?;
    runner.check("GET /lists/:id (deleted)", &gone, Expect::NOT_FOUND)?;

    runner.say("List testing complete.")
}

use probe_client::{BoardInput, CardInput, CommentInput, CommentPatch, EntityId, ListInput, Resource};
use probe_core::ProbeResult;

use super::session::register_and_authenticate;
use super::{Expect, Runner};

/// Board, list and card the comments hang off. `None` once a fixture failed
/// and the scenario was aborted.
async fn fixtures(runner: &mut Runner<'_>) -> ProbeResult<Option<EntityId>> {
    runner.announce("Creating a test board...")?;
    let board = runner
        .client
        .boards()
        .create(&BoardInput {
            title: "Comment Test Board".into(),
            description: "Board for comment testing".into(),
        })
        .await?;
    let Some(board_id) = runner.fixture("POST /boards (fixture)", &board) else {
        runner.abort("Failed to create board. Exiting.")?;
        return Ok(None);
    };
    runner.say(format!("Created board with ID: {board_id}"))?;

    runner.announce("Creating a test list...")?;
    let list = runner
        .client
        .lists()
        .create(&ListInput {
            title: Some("Comment Test List".into()),
            board_id: Some(board_id),
        })
        .await?;
    let Some(list_id) = runner.fixture("POST /lists (fixture)", &list) else {
        runner.abort("Failed to create list. Exiting.")?;
        return Ok(None);
    };
    runner.say(format!("Created list with ID: {list_id}"))?;

    runner.announce("Creating a test card...")?;
    let card = runner
        .client
        .cards()
        .create(&CardInput {
            title: Some("Comment Test Card".into()),
            description: Some("Card for testing comments".into()),
            list_id: Some(list_id),
        })
        .await?;
    let Some(card_id) = runner.fixture("POST /cards (fixture)", &card) else {
        runner.abort("Failed to create card. Exiting.")?;
        return Ok(None);
    };
    runner.say(format!("Created card with ID: {card_id}"))?;

    Ok(Some(card_id))
}

async fn list_comments(runner: &mut Runner<'_>, card_id: &EntityId, note: &str) -> ProbeResult<()> {
    runner.announce(format!("Testing GET /api/comments/{card_id}{note}"))?;
    let listed = runner.client.comments().for_card(card_id).await?;
    runner.check("GET /comments/:cardId", &listed, Expect::OK)?;
    Ok(())
}

async fn post_comment(
    runner: &mut Runner<'_>,
    card_id: &EntityId,
    text: &str,
) -> ProbeResult<Option<EntityId>> {
    let created = runner
        .client
        .comments()
        .create(&CommentInput {
            text: text.into(),
            card_id: card_id.clone(),
        })
        .await?;
    runner.check_created("POST /comments", &created)
}

pub async fn run(runner: &mut Runner<'_>) -> ProbeResult<()> {
    runner.announce("Authenticating user...")?;
    if register_and_authenticate(runner, "commenttest", "Comment")
        .await?
        .is_none()
    {
        return runner.abort("Failed to authenticate user. Exiting.");
    }

    let Some(card_id) = fixtures(runner).await? else {
        return Ok(());
    };

    list_comments(runner, &card_id, " (empty list)").await?;

    runner.announce("Testing POST /api/comments (create comment)")?;
    let Some(comment_id) = post_comment(runner, &card_id, "This is a test comment").await? else {
        runner.skip_all(
            &[
                "GET /comments/:cardId",
                "PUT /comments/:id",
                "POST /comments",
                "GET /comments/:cardId",
                "DELETE /comments/:id",
                "GET /comments/:cardId",
                "DELETE /comments/:id (cleanup)",
            ],
            "comment was not created",
        );
        return runner.say("Comment testing complete.");
    };

    list_comments(runner, &card_id, " (with created comment)").await?;

    runner.announce(format!("Testing PUT /api/comments/{comment_id}"))?;
    let updated = runner
        .client
        .comments()
        .update(
            &comment_id,
            &CommentPatch {
                text: "Updated test comment".into(),
            },
        )
        .await?;
    runner.check("PUT /comments/:id", &updated, Expect::OK)?;

    runner.announce("Testing POST /api/comments (create second comment)")?;
    let second = post_comment(runner, &card_id, "Second test comment").await?;

    list_comments(runner, &card_id, " (with multiple comments)").await?;

    runner.announce(format!("Testing DELETE /api/comments/{comment_id}"))?;
    let deleted = runner.client.comments().delete(&comment_id).await?;
    runner.check("DELETE /comments/:id", &deleted, Expect::DELETED)?;

    list_comments(runner, &card_id, " (after deletion)").await?;

    if let Some(second_id) = second {
        runner.announce(format!("Cleaning up: DELETE /api/comments/{second_id}"))?;
        let cleanup = runner.client.comments().delete(&second_id).await?;
        runner.check("DELETE /comments/:id (cleanup)", &cleanup, Expect::DELETED)?;
    }

    runner.say("Comment testing complete.")
}

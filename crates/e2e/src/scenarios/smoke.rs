//! Smoke scenarios: the happy paths through boards, lists and cards

use kanban_common::BoardUpdate;

use crate::error::{ensure, E2eResult};
use crate::fixtures::{self, data};
use crate::scenario::{expect_eq, Scenario, ScenarioContext, Setup, Suite};

use super::task_board;

/// Every smoke scenario starts from an empty board list
fn smoke(scenario: Scenario) -> Scenario {
    scenario.setup(Setup::DeleteAllBoards)
}

pub fn scenarios() -> Vec<Scenario> {
    vec![
        smoke(scenario!(Suite::Smoke, "smoke::board::create_first_board", create_first_board))
            .tags(&["board"]),
        smoke(scenario!(Suite::Smoke, "smoke::board::create_board", create_board)).tags(&["board"]),
        smoke(scenario!(Suite::Smoke, "smoke::board::create_and_star_board", create_and_star_board))
            .tags(&["board"]),
        smoke(scenario!(Suite::Smoke, "smoke::board::rename_board", rename_board)).tags(&["board"]),
        smoke(scenario!(Suite::Smoke, "smoke::list::create_lists_on_board", create_lists_on_board))
            .tags(&["list"]),
        smoke(scenario!(Suite::Smoke, "smoke::list::create_lists_via_api", create_lists_via_api))
            .tags(&["list", "api"]),
        smoke(scenario!(Suite::Smoke, "smoke::card::create_card", create_card)).tags(&["card"]),
        smoke(scenario!(Suite::Smoke, "smoke::card::edit_card_details", edit_card_details))
            .tags(&["card"]),
        smoke(scenario!(Suite::Smoke, "smoke::card::mark_card_complete", mark_card_complete))
            .tags(&["card"]),
        smoke(scenario!(Suite::Smoke, "smoke::card::delete_card", delete_card)).tags(&["card"]),
        smoke(scenario!(Suite::Smoke, "smoke::flow::full_board_workflow", full_board_workflow))
            .tags(&["board", "list", "card"]),
        smoke(scenario!(Suite::Smoke, "smoke::flow::empty_board_state", empty_board_state))
            .tags(&["board"]),
        smoke(scenario!(Suite::Smoke, "smoke::api::reset_database", reset_database)).tags(&["api"]),
        smoke(scenario!(Suite::Smoke, "smoke::api::create_board", api_create_board)).tags(&["api"]),
        smoke(scenario!(Suite::Smoke, "smoke::api::update_board", api_update_board)).tags(&["api"]),
        smoke(scenario!(
            Suite::Smoke,
            "smoke::api::create_lists_and_cards",
            api_create_lists_and_cards
        ))
        .tags(&["api"]),
        smoke(scenario!(Suite::Smoke, "smoke::api::board_builder", api_board_builder))
            .tags(&["api"]),
    ]
}

async fn create_first_board(ctx: &mut ScenarioContext) -> E2eResult<()> {
    let mut script = ctx.script("first board");
    script.home().visit().create_first_board("test");
    script.board().assert_board_loaded().assert_board_title("test");
    ctx.run(script).await?;
    Ok(())
}

async fn create_board(ctx: &mut ScenarioContext) -> E2eResult<()> {
    // the create button only shows once a board exists
    ctx.api.create_board(data::PERSONAL_BOARD).await?;

    let mut script = ctx.script("create board");
    script.home().visit().create_board(data::PROJECT_BOARD);
    script
        .board()
        .assert_board_loaded()
        .assert_board_title(data::PROJECT_BOARD);
    ctx.run(script).await?;
    Ok(())
}

async fn create_and_star_board(ctx: &mut ScenarioContext) -> E2eResult<()> {
    let board = ctx.api.create_board(data::PERSONAL_BOARD).await?;

    let mut script = ctx.script("star board");
    script
        .board()
        .visit(board.id)
        .assert_board_loaded()
        .toggle_star()
        .assert_starred();
    ctx.run(script).await?;
    Ok(())
}

async fn rename_board(ctx: &mut ScenarioContext) -> E2eResult<()> {
    let board = ctx.api.create_board(data::PROJECT_BOARD).await?;

    let mut script = ctx.script("rename board");
    script
        .board()
        .visit(board.id)
        .change_board_title("Renamed Board")
        .assert_board_title("Renamed Board");
    ctx.run(script).await?;
    Ok(())
}

async fn create_lists_on_board(ctx: &mut ScenarioContext) -> E2eResult<()> {
    let board = ctx.api.create_board(data::STANDARD_BOARD).await?;

    let mut script = ctx.script("create lists");
    let mut page = script.board();
    page.visit(board.id);
    for name in data::KANBAN_LISTS {
        page.create_list(name);
    }
    page.assert_list_count(data::KANBAN_LISTS.len());
    ctx.run(script).await?;
    Ok(())
}

async fn create_lists_via_api(ctx: &mut ScenarioContext) -> E2eResult<()> {
    let board = ctx.api.create_board(data::STANDARD_BOARD).await?;
    for name in data::SPRINT_LISTS {
        ctx.api.create_list(board.id, name).await?;
    }

    let mut script = ctx.script("api lists");
    script
        .board()
        .visit(board.id)
        .assert_list_count(data::SPRINT_LISTS.len());
    ctx.run(script).await?;
    Ok(())
}

async fn create_card(ctx: &mut ScenarioContext) -> E2eResult<()> {
    let (board_id, lists) = task_board(ctx).await?;
    let list_id = lists[0];
    ctx.api.create_card(board_id, list_id, "New Task").await?;

    let mut script = ctx.script("create card");
    script.board().visit(board_id).assert_card_exists("New Task");
    ctx.run(script).await?;
    Ok(())
}

async fn edit_card_details(ctx: &mut ScenarioContext) -> E2eResult<()> {
    let (board_id, lists) = task_board(ctx).await?;
    let list_id = lists[0];
    ctx.api.create_card(board_id, list_id, "Edit Me").await?;

    let mut script = ctx.script("edit card");
    script.board().visit(board_id).open_card("Edit Me");
    script
        .card_detail()
        .assert_card_detail_visible()
        .change_card_title("Updated Task")
        .assert_card_title("Updated Task");
    ctx.run(script).await?;
    Ok(())
}

async fn mark_card_complete(ctx: &mut ScenarioContext) -> E2eResult<()> {
    let (board_id, lists) = task_board(ctx).await?;
    let list_id = lists[0];
    ctx.api.create_card(board_id, list_id, "Complete Me").await?;

    let mut script = ctx.script("complete card");
    script.board().visit(board_id).open_card("Complete Me");
    script.card_detail().toggle_complete().assert_completed();
    ctx.run(script).await?;
    Ok(())
}

async fn delete_card(ctx: &mut ScenarioContext) -> E2eResult<()> {
    let (board_id, lists) = task_board(ctx).await?;
    let list_id = lists[0];
    ctx.api.create_card(board_id, list_id, "Delete Me").await?;

    let mut script = ctx.script("delete card");
    script
        .board()
        .visit(board_id)
        .assert_card_count(1)
        .open_card("Delete Me");
    script.card_detail().delete_card();
    script.board().assert_card_count(0);
    ctx.run(script).await?;
    Ok(())
}

async fn full_board_workflow(ctx: &mut ScenarioContext) -> E2eResult<()> {
    let specs = data::full_board();
    let built =
        fixtures::create_board_with_lists_and_cards(&ctx.api, data::FULL_BOARD_NAME, &specs).await?;

    let mut script = ctx.script("full workflow");
    let mut page = script.board();
    page.visit(built.board.id)
        .assert_board_loaded()
        .assert_board_title(data::FULL_BOARD_NAME)
        .assert_list_count(specs.len())
        .assert_card_count(built.card_count());
    for card in specs.iter().flat_map(|s| s.cards.iter()) {
        page.assert_card_exists(card);
    }
    ctx.run(script).await?;
    Ok(())
}

async fn empty_board_state(ctx: &mut ScenarioContext) -> E2eResult<()> {
    let mut script = ctx.script("empty board");
    script.home().visit().create_first_board("Empty Board");
    script
        .board()
        .assert_board_loaded()
        .assert_list_count(0)
        .assert_card_count(0);
    ctx.run(script).await?;
    Ok(())
}

async fn reset_database(ctx: &mut ScenarioContext) -> E2eResult<()> {
    ctx.api.create_board(data::STANDARD_BOARD).await?;
    let boards = ctx.api.get_boards().await?;
    ensure(!boards.is_empty(), || "expected at least one board before reset".to_string())?;

    ctx.api.reset_database().await?;
    let boards = ctx.api.get_boards().await?;
    expect_eq("boards after reset", boards.len(), 0)?;

    ctx.api.reset_database().await?;
    let boards = ctx.api.get_boards().await?;
    expect_eq("boards after second reset", boards.len(), 0)
}

async fn api_create_board(ctx: &mut ScenarioContext) -> E2eResult<()> {
    let board = ctx.api.create_board("API Created Board").await?;
    expect_eq("board name", board.name.as_str(), "API Created Board")?;

    let boards = ctx.api.get_boards().await?;
    let named: Vec<_> = boards.iter().filter(|b| b.name == "API Created Board").collect();
    expect_eq("boards named 'API Created Board'", named.len(), 1)?;
    expect_eq("fetched board id", named[0].id, board.id)?;
    expect_eq("fetched board starred", named[0].starred, false)
}

async fn api_update_board(ctx: &mut ScenarioContext) -> E2eResult<()> {
    let board = ctx.api.create_board("Original Name").await?;
    let update = BoardUpdate {
        name: Some("Updated Name".to_string()),
        starred: Some(true),
    };
    let updated = ctx.api.update_board(board.id, &update).await?;
    expect_eq("board name", updated.name.as_str(), "Updated Name")?;
    expect_eq("board starred", updated.starred, true)
}

async fn api_create_lists_and_cards(ctx: &mut ScenarioContext) -> E2eResult<()> {
    let board = ctx.api.create_board(data::STANDARD_BOARD).await?;
    let list = ctx.api.create_list(board.id, "List 1").await?;
    let card = ctx.api.create_card(board.id, list.id, "Card 1").await?;

    expect_eq("card name", card.name.as_str(), "Card 1")?;
    expect_eq("card list", card.list_id, list.id)?;
    expect_eq("card board", card.board_id, board.id)
}

async fn api_board_builder(ctx: &mut ScenarioContext) -> E2eResult<()> {
    let built =
        fixtures::create_board_with_lists(&ctx.api, "Builder Board", &data::KANBAN_LISTS).await?;

    expect_eq("board name", built.board.name.as_str(), "Builder Board")?;
    let names: Vec<&str> = built.lists.iter().map(|l| l.name.as_str()).collect();
    expect_eq("list names", names, data::KANBAN_LISTS.to_vec())
}

//! Regression scenarios: boundaries, odd input, duplicates and volume

use crate::error::E2eResult;
use crate::fixtures::data;
use crate::pages::base::by_test_id;
use crate::scenario::{Scenario, ScenarioContext, Setup, Suite};
use crate::step::{Step, UrlMatch};

use super::task_board;

const UNICODE_BOARD: &str = "测试 Board 🚀 Тест";
const UNICODE_LIST: &str = "列表 List 📋 Список";
const UNICODE_CARD: &str = "任务 Card 📝 Задача";

fn regression(scenario: Scenario, tags: &[&'static str]) -> Scenario {
    scenario.setup(Setup::DeleteAllBoards).tags(tags)
}

pub fn scenarios() -> Vec<Scenario> {
    const R: Suite = Suite::Regression;

    vec![
        // boards
        regression(
            scenario!(R, "regression::board::max_length_title", board_max_length_title),
            &["board", "boundary"],
        ),
        regression(
            scenario!(R, "regression::board::min_length_title", board_min_length_title),
            &["board", "boundary"],
        ),
        regression(
            scenario!(R, "regression::board::special_characters", board_special_characters),
            &["board", "boundary"],
        ),
        regression(
            scenario!(R, "regression::board::unicode_title", board_unicode_title),
            &["board", "unicode"],
        ),
        regression(
            scenario!(R, "regression::board::surrounding_spaces", board_surrounding_spaces),
            &["board", "whitespace"],
        ),
        regression(
            scenario!(R, "regression::board::empty_title_rejected", board_empty_title_rejected),
            &["board", "validation"],
        ),
        regression(
            scenario!(
                R,
                "regression::board::whitespace_title_rejected",
                board_whitespace_title_rejected
            ),
            &["board", "validation", "whitespace"],
        ),
        regression(
            scenario!(
                R,
                "regression::board::rename_to_empty_restores",
                board_rename_to_empty_restores
            ),
            &["board"],
        ),
        regression(
            scenario!(R, "regression::board::consecutive_renames", board_consecutive_renames),
            &["board"],
        ),
        regression(
            scenario!(R, "regression::board::rename_survives_reload", board_rename_survives_reload),
            &["board"],
        ),
        regression(
            scenario!(R, "regression::board::toggle_star_repeatedly", board_toggle_star_repeatedly),
            &["board"],
        ),
        regression(
            scenario!(R, "regression::board::star_survives_reload", board_star_survives_reload),
            &["board"],
        ),
        regression(
            scenario!(R, "regression::board::duplicate_names", board_duplicate_names),
            &["board", "duplicate"],
        ),
        regression(
            scenario!(R, "regression::board::many_boards", board_many_boards),
            &["board", "volume"],
        ),
        // lists
        regression(
            scenario!(R, "regression::list::max_length_name", list_max_length_name),
            &["list", "boundary"],
        ),
        regression(
            scenario!(R, "regression::list::min_length_name", list_min_length_name),
            &["list", "boundary"],
        ),
        regression(
            scenario!(R, "regression::list::special_characters", list_special_characters),
            &["list", "boundary"],
        ),
        regression(
            scenario!(R, "regression::list::unicode_name", list_unicode_name),
            &["list", "unicode"],
        ),
        regression(
            scenario!(
                R,
                "regression::list::surrounding_spaces_trimmed",
                list_surrounding_spaces_trimmed
            ),
            &["list", "whitespace"],
        ),
        regression(
            scenario!(R, "regression::list::empty_name_rejected", list_empty_name_rejected),
            &["list", "validation"],
        ),
        regression(
            scenario!(
                R,
                "regression::list::whitespace_name_rejected",
                list_whitespace_name_rejected
            ),
            &["list", "validation", "whitespace"],
        ),
        regression(
            scenario!(R, "regression::list::duplicate_names", list_duplicate_names),
            &["list", "duplicate"],
        ),
        regression(
            scenario!(R, "regression::list::many_lists", list_many_lists),
            &["list", "volume"],
        ),
        regression(
            scenario!(R, "regression::list::order_survives_reload", list_order_survives_reload),
            &["list"],
        ),
        regression(
            scenario!(R, "regression::list::api_lists_displayed", list_api_lists_displayed),
            &["list", "api"],
        ),
        regression(
            scenario!(R, "regression::list::ui_list_after_api_lists", list_ui_after_api_lists),
            &["list", "api"],
        ),
        regression(
            scenario!(R, "regression::list::rapid_creation", list_rapid_creation),
            &["list", "volume"],
        ),
        // cards
        regression(
            scenario!(R, "regression::card::max_length_title", card_max_length_title),
            &["card", "boundary"],
        ),
        regression(
            scenario!(R, "regression::card::min_length_title", card_min_length_title),
            &["card", "boundary"],
        ),
        regression(
            scenario!(R, "regression::card::special_characters", card_special_characters),
            &["card", "boundary"],
        ),
        regression(
            scenario!(R, "regression::card::unicode_title", card_unicode_title),
            &["card", "unicode"],
        ),
        regression(
            scenario!(R, "regression::card::surrounding_spaces", card_surrounding_spaces),
            &["card", "whitespace"],
        ),
        regression(
            scenario!(R, "regression::card::numeric_title", card_numeric_title),
            &["card", "boundary"],
        ),
        regression(
            scenario!(R, "regression::card::empty_title_rejected", card_empty_title_rejected),
            &["card", "validation"],
        ),
        regression(
            scenario!(
                R,
                "regression::card::whitespace_title_rejected",
                card_whitespace_title_rejected
            ),
            &["card", "validation", "whitespace"],
        ),
        regression(
            scenario!(
                R,
                "regression::card::rename_to_empty_restores",
                card_rename_to_empty_restores
            ),
            &["card"],
        ),
        regression(
            scenario!(R, "regression::card::consecutive_renames", card_consecutive_renames),
            &["card"],
        ),
        regression(
            scenario!(R, "regression::card::rename_survives_reopen", card_rename_survives_reopen),
            &["card"],
        ),
        regression(
            scenario!(R, "regression::card::rename_survives_reload", card_rename_survives_reload),
            &["card"],
        ),
        regression(
            scenario!(
                R,
                "regression::card::toggle_complete_repeatedly",
                card_toggle_complete_repeatedly
            ),
            &["card"],
        ),
        regression(
            scenario!(
                R,
                "regression::card::complete_survives_reload",
                card_complete_survives_reload
            ),
            &["card"],
        ),
        regression(
            scenario!(
                R,
                "regression::card::complete_survives_reopen",
                card_complete_survives_reopen
            ),
            &["card"],
        ),
        regression(
            scenario!(R, "regression::card::duplicate_titles", card_duplicate_titles),
            &["card", "duplicate"],
        ),
        regression(
            scenario!(R, "regression::card::many_cards", card_many_cards),
            &["card", "volume"],
        ),
        regression(
            scenario!(R, "regression::card::cards_across_lists", card_cards_across_lists),
            &["card"],
        ),
        regression(
            scenario!(R, "regression::card::delete_last_card", card_delete_last_card),
            &["card"],
        ),
        regression(
            scenario!(
                R,
                "regression::card::deletion_survives_reload",
                card_deletion_survives_reload
            ),
            &["card"],
        ),
        regression(
            scenario!(R, "regression::card::rapid_ui_creation", card_rapid_ui_creation),
            &["card", "volume"],
        ),
        regression(
            scenario!(R, "regression::card::rapid_operations", card_rapid_operations),
            &["card"],
        ),
    ]
}

// boards

/// Create the first board through the home page and check its title
async fn first_board_titled(ctx: &ScenarioContext, label: &str, title: &str) -> E2eResult<()> {
    let mut script = ctx.script(label);
    script.home().visit().create_first_board(title);
    script.board().assert_board_loaded().assert_board_title(title);
    ctx.run(script).await?;
    Ok(())
}

async fn board_max_length_title(ctx: &mut ScenarioContext) -> E2eResult<()> {
    first_board_titled(ctx, "max length", &"A".repeat(100)).await
}

async fn board_min_length_title(ctx: &mut ScenarioContext) -> E2eResult<()> {
    first_board_titled(ctx, "min length", "A").await
}

async fn board_special_characters(ctx: &mut ScenarioContext) -> E2eResult<()> {
    first_board_titled(ctx, "special characters", data::PUNCTUATION).await
}

async fn board_unicode_title(ctx: &mut ScenarioContext) -> E2eResult<()> {
    first_board_titled(ctx, "unicode", UNICODE_BOARD).await
}

async fn board_surrounding_spaces(ctx: &mut ScenarioContext) -> E2eResult<()> {
    // board titles keep their spaces
    first_board_titled(ctx, "surrounding spaces", "  Board Name  ").await
}

async fn board_empty_title_rejected(ctx: &mut ScenarioContext) -> E2eResult<()> {
    let mut script = ctx.script("empty title");
    script.home().visit();
    script
        .push(Step::Press {
            locator: Some(by_test_id("first-board")),
            key: "Enter".to_string(),
        })
        .push(Step::AssertUrl {
            matcher: UrlMatch::Path("/".to_string()),
        })
        .push(Step::AssertVisible {
            locator: by_test_id("first-board"),
        });
    ctx.run(script).await?;
    Ok(())
}

async fn board_whitespace_title_rejected(ctx: &mut ScenarioContext) -> E2eResult<()> {
    let mut script = ctx.script("whitespace title");
    script.home().visit().create_first_board("   ");
    script.home().assert_home_page_visible();
    ctx.run(script).await?;
    Ok(())
}

async fn board_rename_to_empty_restores(ctx: &mut ScenarioContext) -> E2eResult<()> {
    let board = ctx.api.create_board("Original Board Name").await?;

    let mut script = ctx.script("rename to empty");
    script
        .board()
        .visit(board.id)
        .change_board_title("")
        .assert_board_title("Original Board Name");
    ctx.run(script).await?;
    Ok(())
}

async fn board_consecutive_renames(ctx: &mut ScenarioContext) -> E2eResult<()> {
    let board = ctx.api.create_board("Original Board Name").await?;

    let mut script = ctx.script("consecutive renames");
    let mut page = script.board();
    page.visit(board.id);
    for title in ["First Rename", "Second Rename", "Third Rename"] {
        page.change_board_title(title).assert_board_title(title);
    }
    ctx.run(script).await?;
    Ok(())
}

async fn board_rename_survives_reload(ctx: &mut ScenarioContext) -> E2eResult<()> {
    let board = ctx.api.create_board("Original Board Name").await?;

    let mut script = ctx.script("rename then reload");
    script.board().visit(board.id).change_board_title("Persistent Name");
    script.push(Step::Reload);
    script
        .board()
        .assert_board_loaded()
        .assert_board_title("Persistent Name");
    ctx.run(script).await?;
    Ok(())
}

async fn board_toggle_star_repeatedly(ctx: &mut ScenarioContext) -> E2eResult<()> {
    let board = ctx.api.create_board(data::STANDARD_BOARD).await?;

    let mut script = ctx.script("toggle star");
    script
        .board()
        .visit(board.id)
        .toggle_star()
        .assert_starred()
        .toggle_star()
        .assert_not_starred()
        .toggle_star()
        .assert_starred();
    ctx.run(script).await?;
    Ok(())
}

async fn board_star_survives_reload(ctx: &mut ScenarioContext) -> E2eResult<()> {
    let board = ctx.api.create_board(data::STANDARD_BOARD).await?;

    let mut script = ctx.script("star then reload");
    script.board().visit(board.id).toggle_star().assert_starred();
    script.push(Step::Reload);
    script.board().assert_board_loaded().assert_starred();
    ctx.run(script).await?;
    Ok(())
}

async fn board_duplicate_names(ctx: &mut ScenarioContext) -> E2eResult<()> {
    for _ in 0..3 {
        ctx.api.create_board("Duplicate Board").await?;
    }

    let mut script = ctx.script("duplicate boards");
    script.home().visit().assert_board_count(3);
    ctx.run(script).await?;
    Ok(())
}

async fn board_many_boards(ctx: &mut ScenarioContext) -> E2eResult<()> {
    for name in data::numbered("Board", 10) {
        ctx.api.create_board(&name).await?;
    }

    let mut script = ctx.script("many boards");
    script.home().visit().assert_board_count(10);
    ctx.run(script).await?;
    Ok(())
}

// lists

/// Create one list through the UI on an empty "Test Board"
async fn list_created_as(
    ctx: &ScenarioContext,
    label: &str,
    name: &str,
    shown_as: &str,
    count: Option<usize>,
) -> E2eResult<()> {
    let board = ctx.api.create_board(data::STANDARD_BOARD).await?;

    let mut script = ctx.script(label);
    let mut page = script.board();
    page.visit(board.id).create_list(name).assert_list_exists(shown_as);
    if let Some(count) = count {
        page.assert_list_count(count);
    }
    ctx.run(script).await?;
    Ok(())
}

async fn list_max_length_name(ctx: &mut ScenarioContext) -> E2eResult<()> {
    let name = "L".repeat(100);
    list_created_as(ctx, "max length", &name, &name, Some(1)).await
}

async fn list_min_length_name(ctx: &mut ScenarioContext) -> E2eResult<()> {
    list_created_as(ctx, "min length", "L", "L", Some(1)).await
}

async fn list_special_characters(ctx: &mut ScenarioContext) -> E2eResult<()> {
    list_created_as(ctx, "special characters", data::PUNCTUATION, data::PUNCTUATION, None).await
}

async fn list_unicode_name(ctx: &mut ScenarioContext) -> E2eResult<()> {
    list_created_as(ctx, "unicode", UNICODE_LIST, UNICODE_LIST, None).await
}

async fn list_surrounding_spaces_trimmed(ctx: &mut ScenarioContext) -> E2eResult<()> {
    list_created_as(ctx, "surrounding spaces", "  List Name  ", "List Name", None).await
}

async fn list_empty_name_rejected(ctx: &mut ScenarioContext) -> E2eResult<()> {
    let board = ctx.api.create_board(data::STANDARD_BOARD).await?;

    let mut script = ctx.script("empty list name");
    script.board().visit(board.id);
    script.push(Step::Click {
        locator: by_test_id("add-list"),
    });
    script.board().assert_list_count(0);
    ctx.run(script).await?;
    Ok(())
}

async fn list_whitespace_name_rejected(ctx: &mut ScenarioContext) -> E2eResult<()> {
    let board = ctx.api.create_board(data::STANDARD_BOARD).await?;

    let mut script = ctx.script("whitespace list name");
    script.board().visit(board.id);
    script
        .push(Step::Type {
            locator: by_test_id("add-list-input"),
            text: "   ".to_string(),
        })
        .push(Step::Click {
            locator: by_test_id("add-list"),
        });
    script.board().assert_list_count(0);
    ctx.run(script).await?;
    Ok(())
}

async fn list_duplicate_names(ctx: &mut ScenarioContext) -> E2eResult<()> {
    let board = ctx.api.create_board(data::STANDARD_BOARD).await?;
    for _ in 0..3 {
        ctx.api.create_list(board.id, "Duplicate List").await?;
    }

    let mut script = ctx.script("duplicate lists");
    script.board().visit(board.id).assert_list_count(3);
    ctx.run(script).await?;
    Ok(())
}

async fn list_many_lists(ctx: &mut ScenarioContext) -> E2eResult<()> {
    let board = ctx.api.create_board(data::STANDARD_BOARD).await?;
    for name in data::numbered("List", 20) {
        ctx.api.create_list(board.id, &name).await?;
    }

    let mut script = ctx.script("many lists");
    script.board().visit(board.id).assert_list_count(20);
    ctx.run(script).await?;
    Ok(())
}

async fn list_order_survives_reload(ctx: &mut ScenarioContext) -> E2eResult<()> {
    let names = ["First List", "Second List", "Third List"];
    let board = ctx.api.create_board(data::STANDARD_BOARD).await?;
    for name in names {
        ctx.api.create_list(board.id, name).await?;
    }

    let mut script = ctx.script("list order");
    script.board().visit(board.id).assert_list_count(3);
    script.push(Step::Reload);
    script.board().assert_board_loaded().assert_list_count(3);
    for (i, name) in names.iter().enumerate() {
        script.push(Step::AssertValue {
            locator: by_test_id("list-name").nth(i),
            value: name.to_string(),
        });
    }
    ctx.run(script).await?;
    Ok(())
}

async fn list_api_lists_displayed(ctx: &mut ScenarioContext) -> E2eResult<()> {
    let board = ctx.api.create_board(data::STANDARD_BOARD).await?;
    ctx.api.create_list(board.id, "API List 1").await?;
    ctx.api.create_list(board.id, "API List 2").await?;

    let mut script = ctx.script("api lists");
    script
        .board()
        .visit(board.id)
        .assert_list_exists("API List 1")
        .assert_list_exists("API List 2")
        .assert_list_count(2);
    ctx.run(script).await?;
    Ok(())
}

async fn list_ui_after_api_lists(ctx: &mut ScenarioContext) -> E2eResult<()> {
    let board = ctx.api.create_board(data::STANDARD_BOARD).await?;
    ctx.api.create_list(board.id, "API List").await?;

    let mut script = ctx.script("ui list after api list");
    script
        .board()
        .visit(board.id)
        .create_list("UI List")
        .assert_list_count(2)
        .assert_list_exists("API List")
        .assert_list_exists("UI List");
    ctx.run(script).await?;
    Ok(())
}

async fn list_rapid_creation(ctx: &mut ScenarioContext) -> E2eResult<()> {
    let board = ctx.api.create_board(data::STANDARD_BOARD).await?;

    let mut script = ctx.script("rapid lists");
    let mut page = script.board();
    page.visit(board.id);
    for name in data::numbered("Rapid List", 5) {
        page.create_list(&name);
    }
    page.assert_list_count(5);
    ctx.run(script).await?;
    Ok(())
}

// cards

/// Create a card through the API in the first list and find it on the board
async fn card_shown(ctx: &ScenarioContext, label: &str, title: &str) -> E2eResult<()> {
    let (board_id, lists) = task_board(ctx).await?;
    ctx.api.create_card(board_id, lists[0], title).await?;

    let mut script = ctx.script(label);
    script.board().visit(board_id).assert_card_exists(title);
    ctx.run(script).await?;
    Ok(())
}

/// Task board with one card named `title`, opened in the detail view
async fn opened_card(
    ctx: &ScenarioContext,
    label: &str,
    title: &str,
) -> E2eResult<crate::script::Script> {
    let (board_id, lists) = task_board(ctx).await?;
    ctx.api.create_card(board_id, lists[0], title).await?;

    let mut script = ctx.script(label);
    script.board().visit(board_id).open_card(title);
    Ok(script)
}

async fn card_max_length_title(ctx: &mut ScenarioContext) -> E2eResult<()> {
    card_shown(ctx, "max length", &"C".repeat(200)).await
}

async fn card_min_length_title(ctx: &mut ScenarioContext) -> E2eResult<()> {
    card_shown(ctx, "min length", "C").await
}

async fn card_special_characters(ctx: &mut ScenarioContext) -> E2eResult<()> {
    card_shown(ctx, "special characters", data::PUNCTUATION).await
}

async fn card_unicode_title(ctx: &mut ScenarioContext) -> E2eResult<()> {
    card_shown(ctx, "unicode", UNICODE_CARD).await
}

async fn card_surrounding_spaces(ctx: &mut ScenarioContext) -> E2eResult<()> {
    card_shown(ctx, "surrounding spaces", "  Card Title  ").await
}

async fn card_numeric_title(ctx: &mut ScenarioContext) -> E2eResult<()> {
    card_shown(ctx, "numeric", "123456789").await
}

async fn card_empty_title_rejected(ctx: &mut ScenarioContext) -> E2eResult<()> {
    let (board_id, _) = task_board(ctx).await?;

    let mut script = ctx.script("empty card title");
    script.board().visit(board_id);
    script
        .push(Step::Click {
            locator: by_test_id("new-card").nth(0),
        })
        .push(Step::Click {
            locator: by_test_id("new-card-submit"),
        });
    script.board().assert_card_count(0);
    ctx.run(script).await?;
    Ok(())
}

async fn card_whitespace_title_rejected(ctx: &mut ScenarioContext) -> E2eResult<()> {
    let (board_id, _) = task_board(ctx).await?;

    let mut script = ctx.script("whitespace card title");
    script.board().visit(board_id);
    script
        .push(Step::Click {
            locator: by_test_id("new-card").nth(0),
        })
        .push(Step::Type {
            locator: by_test_id("new-card-input"),
            text: "   ".to_string(),
        })
        .push(Step::Click {
            locator: by_test_id("new-card-submit"),
        });
    script.board().assert_card_count(0);
    ctx.run(script).await?;
    Ok(())
}

async fn card_rename_to_empty_restores(ctx: &mut ScenarioContext) -> E2eResult<()> {
    let mut script = opened_card(ctx, "rename to empty", "Original Card Title").await?;
    script
        .card_detail()
        .change_card_title("")
        .assert_card_title("Original Card Title");
    ctx.run(script).await?;
    Ok(())
}

async fn card_consecutive_renames(ctx: &mut ScenarioContext) -> E2eResult<()> {
    let mut script = opened_card(ctx, "consecutive renames", "Original Card Title").await?;
    let mut detail = script.card_detail();
    for title in ["First Update", "Second Update", "Third Update"] {
        detail.change_card_title(title).assert_card_title(title);
    }
    ctx.run(script).await?;
    Ok(())
}

async fn card_rename_survives_reopen(ctx: &mut ScenarioContext) -> E2eResult<()> {
    let mut script = opened_card(ctx, "rename then reopen", "Original Card Title").await?;
    script.card_detail().change_card_title("Updated Title").close();
    script.board().open_card("Updated Title");
    script.card_detail().assert_card_title("Updated Title");
    ctx.run(script).await?;
    Ok(())
}

async fn card_rename_survives_reload(ctx: &mut ScenarioContext) -> E2eResult<()> {
    let mut script = opened_card(ctx, "rename then reload", "Original Card Title").await?;
    script.card_detail().change_card_title("Persistent Title").close();
    script.push(Step::Reload);
    script
        .board()
        .assert_board_loaded()
        .assert_card_exists("Persistent Title");
    ctx.run(script).await?;
    Ok(())
}

async fn card_toggle_complete_repeatedly(ctx: &mut ScenarioContext) -> E2eResult<()> {
    let mut script = opened_card(ctx, "toggle complete", "Toggle Card").await?;
    script
        .card_detail()
        .toggle_complete()
        .assert_completed()
        .toggle_complete()
        .assert_not_completed()
        .toggle_complete()
        .assert_completed();
    ctx.run(script).await?;
    Ok(())
}

async fn card_complete_survives_reload(ctx: &mut ScenarioContext) -> E2eResult<()> {
    let mut script = opened_card(ctx, "complete then reload", "Toggle Card").await?;
    script.card_detail().toggle_complete().assert_completed();
    script.push(Step::Reload);
    script
        .board()
        .assert_board_loaded()
        .open_card("Toggle Card");
    script.card_detail().assert_completed();
    ctx.run(script).await?;
    Ok(())
}

async fn card_complete_survives_reopen(ctx: &mut ScenarioContext) -> E2eResult<()> {
    let mut script = opened_card(ctx, "complete then reopen", "Toggle Card").await?;
    script
        .card_detail()
        .toggle_complete()
        .assert_completed()
        .close();
    script.board().open_card("Toggle Card");
    script.card_detail().assert_completed();
    ctx.run(script).await?;
    Ok(())
}

async fn card_duplicate_titles(ctx: &mut ScenarioContext) -> E2eResult<()> {
    let (board_id, lists) = task_board(ctx).await?;
    for _ in 0..3 {
        ctx.api.create_card(board_id, lists[0], "Duplicate Card").await?;
    }

    let mut script = ctx.script("duplicate cards");
    script.board().visit(board_id).assert_card_count(3);
    ctx.run(script).await?;
    Ok(())
}

async fn card_many_cards(ctx: &mut ScenarioContext) -> E2eResult<()> {
    let (board_id, lists) = task_board(ctx).await?;
    for name in data::numbered("Card", 20) {
        ctx.api.create_card(board_id, lists[0], &name).await?;
    }

    let mut script = ctx.script("many cards");
    script.board().visit(board_id).assert_card_count(20);
    ctx.run(script).await?;
    Ok(())
}

async fn card_cards_across_lists(ctx: &mut ScenarioContext) -> E2eResult<()> {
    let (board_id, lists) = task_board(ctx).await?;
    let names = ["Card in To Do", "Card in Progress", "Card Done"];
    for (list_id, name) in lists.iter().zip(names) {
        ctx.api.create_card(board_id, *list_id, name).await?;
    }

    let mut script = ctx.script("cards across lists");
    script.board().visit(board_id).assert_card_count(3);
    ctx.run(script).await?;
    Ok(())
}

async fn card_delete_last_card(ctx: &mut ScenarioContext) -> E2eResult<()> {
    let (board_id, lists) = task_board(ctx).await?;
    ctx.api.create_card(board_id, lists[0], "Only Card").await?;

    let mut script = ctx.script("delete last card");
    script
        .board()
        .visit(board_id)
        .assert_card_count(1)
        .open_card("Only Card");
    script.card_detail().delete_card();
    script.board().assert_card_count(0);
    ctx.run(script).await?;
    Ok(())
}

async fn card_deletion_survives_reload(ctx: &mut ScenarioContext) -> E2eResult<()> {
    let mut script = opened_card(ctx, "delete then reload", "Card to Delete").await?;
    script.card_detail().delete_card();
    script.push(Step::Reload);
    script.board().assert_board_loaded().assert_card_count(0);
    ctx.run(script).await?;
    Ok(())
}

async fn card_rapid_ui_creation(ctx: &mut ScenarioContext) -> E2eResult<()> {
    let (board_id, _) = task_board(ctx).await?;

    let mut script = ctx.script("rapid cards");
    let mut page = script.board();
    page.visit(board_id);
    for name in data::numbered("Rapid Card", 5) {
        page.create_card(0, &name);
    }
    page.assert_card_count(5);
    ctx.run(script).await?;
    Ok(())
}

async fn card_rapid_operations(ctx: &mut ScenarioContext) -> E2eResult<()> {
    let mut script = opened_card(ctx, "rapid operations", "Operations Card").await?;
    script
        .card_detail()
        .change_card_title("Updated Operations Card")
        .toggle_complete()
        .assert_completed()
        .delete_card();
    script.board().assert_card_count(0);
    ctx.run(script).await?;
    Ok(())
}

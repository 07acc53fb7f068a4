//! Visual checkpoint scenarios
//!
//! Each scenario brings the page into a known state and takes one full-page
//! checkpoint. The runner compares checkpoints against baselines once the
//! body returns.

use kanban_common::BoardWithListsAndCards;

use crate::error::E2eResult;
use crate::fixtures::{self, data, ListSpec};
use crate::pages::base::by_test_id;
use crate::scenario::{Scenario, ScenarioContext, Setup, Suite};
use crate::step::Step;

fn visual(scenario: Scenario, tags: &[&'static str]) -> Scenario {
    scenario.setup(Setup::DeleteAllBoards).tags(tags)
}

pub fn scenarios() -> Vec<Scenario> {
    const V: Suite = Suite::Visual;

    vec![
        // boards
        visual(scenario!(V, "visual::board::empty_home_page", empty_home_page), &["board"]),
        visual(scenario!(V, "visual::board::creation_modal", board_creation_modal), &["board"]),
        visual(scenario!(V, "visual::board::new_board", new_board), &["board"]),
        visual(scenario!(V, "visual::board::starred_board", starred_board), &["board"]),
        visual(scenario!(V, "visual::board::multiple_boards", multiple_boards), &["board"]),
        visual(scenario!(V, "visual::board::long_title", board_long_title), &["board"]),
        visual(
            scenario!(V, "visual::board::special_characters", board_special_characters),
            &["board", "unicode"],
        ),
        // lists
        visual(scenario!(V, "visual::list::single_list", single_list), &["list"]),
        visual(scenario!(V, "visual::list::multiple_lists", multiple_lists), &["list"]),
        visual(scenario!(V, "visual::list::creation_form", list_creation_form), &["list"]),
        visual(scenario!(V, "visual::list::long_title", list_long_title), &["list"]),
        visual(scenario!(V, "visual::list::many_lists", many_lists), &["list", "volume"]),
        visual(scenario!(V, "visual::list::empty_placeholder", empty_list_placeholder), &["list"]),
        visual(
            scenario!(V, "visual::list::special_characters", list_special_characters),
            &["list", "unicode"],
        ),
        // cards
        visual(scenario!(V, "visual::card::single_card", single_card), &["card"]),
        visual(scenario!(V, "visual::card::multiple_cards", multiple_cards), &["card"]),
        visual(scenario!(V, "visual::card::detail_modal", card_detail_modal), &["card"]),
        visual(scenario!(V, "visual::card::long_title", card_long_title), &["card"]),
        visual(scenario!(V, "visual::card::across_lists", cards_across_lists), &["card"]),
        visual(scenario!(V, "visual::card::many_cards", many_cards), &["card", "volume"]),
        visual(
            scenario!(V, "visual::card::special_characters", card_special_characters),
            &["card", "unicode"],
        ),
        visual(scenario!(V, "visual::card::creation_form", card_creation_form), &["card"]),
        visual(scenario!(V, "visual::card::completed_card", completed_card), &["card"]),
    ]
}

/// Where a checkpoint is taken
enum Start<'a> {
    Home,
    Board(i64),
    FirstBoard(&'a str),
}

/// Bring the page to `start`, apply `extra` steps and take one checkpoint
async fn capture(
    ctx: &mut ScenarioContext,
    start: Start<'_>,
    extra: Vec<Step>,
    tag: &str,
) -> E2eResult<()> {
    let mut script = ctx.visual_script(tag);
    match start {
        Start::Home => {
            script.home().visit();
        }
        Start::Board(id) => {
            script.board().visit(id).assert_board_loaded();
        }
        Start::FirstBoard(title) => {
            script.home().visit().create_first_board(title);
            script.board().assert_board_loaded();
        }
    }
    for step in extra {
        script.push(step);
    }

    ctx.checkpoint(&mut script, tag);
    ctx.run(script).await?;
    Ok(())
}

async fn board_with_lists(ctx: &ScenarioContext, lists: &[String]) -> E2eResult<i64> {
    Ok(fixtures::create_board_with_lists(&ctx.api, data::STANDARD_BOARD, lists)
        .await?
        .board
        .id)
}

async fn board_with_cards(
    ctx: &ScenarioContext,
    specs: &[ListSpec],
) -> E2eResult<BoardWithListsAndCards> {
    fixtures::create_board_with_lists_and_cards(&ctx.api, data::STANDARD_BOARD, specs).await
}

fn to_do(cards: &[&str]) -> Vec<ListSpec> {
    vec![ListSpec::new("To Do", cards.iter().copied())]
}

// boards

async fn empty_home_page(ctx: &mut ScenarioContext) -> E2eResult<()> {
    capture(ctx, Start::Home, vec![], "Empty Home Page").await
}

async fn board_creation_modal(ctx: &mut ScenarioContext) -> E2eResult<()> {
    let open = Step::Click {
        locator: by_test_id("first-board"),
    };
    capture(ctx, Start::Home, vec![open], "Board Creation Modal").await
}

async fn new_board(ctx: &mut ScenarioContext) -> E2eResult<()> {
    capture(ctx, Start::FirstBoard("Visual Test Board"), vec![], "Empty Board View").await
}

async fn starred_board(ctx: &mut ScenarioContext) -> E2eResult<()> {
    let board = ctx.api.create_board("Starred Board").await?;
    let star = Step::Click {
        locator: by_test_id("star"),
    };
    capture(ctx, Start::Board(board.id), vec![star], "Board with Star Active").await
}

async fn multiple_boards(ctx: &mut ScenarioContext) -> E2eResult<()> {
    for name in data::numbered("Board", 3) {
        ctx.api.create_board(&name).await?;
    }
    capture(ctx, Start::Home, vec![], "Multiple Boards").await
}

async fn board_long_title(ctx: &mut ScenarioContext) -> E2eResult<()> {
    capture(ctx, Start::FirstBoard(data::LONG_BOARD_TITLE), vec![], "Board with Long Title").await
}

async fn board_special_characters(ctx: &mut ScenarioContext) -> E2eResult<()> {
    let title = data::special_title("Board");
    capture(ctx, Start::FirstBoard(&title), vec![], "Board with Special Characters").await
}

// lists

async fn single_list(ctx: &mut ScenarioContext) -> E2eResult<()> {
    let id = board_with_lists(ctx, &["To Do".to_string()]).await?;
    capture(ctx, Start::Board(id), vec![], "Board with Single List").await
}

async fn multiple_lists(ctx: &mut ScenarioContext) -> E2eResult<()> {
    let lists: Vec<String> = data::KANBAN_LISTS.iter().map(|s| s.to_string()).collect();
    let id = board_with_lists(ctx, &lists).await?;
    capture(ctx, Start::Board(id), vec![], "Board with Multiple Lists").await
}

async fn list_creation_form(ctx: &mut ScenarioContext) -> E2eResult<()> {
    let board = ctx.api.create_board(data::STANDARD_BOARD).await?;
    let focus = Step::Click {
        locator: by_test_id("add-list-input"),
    };
    capture(ctx, Start::Board(board.id), vec![focus], "List Creation Form Active").await
}

async fn list_long_title(ctx: &mut ScenarioContext) -> E2eResult<()> {
    let id = board_with_lists(ctx, &[data::LONG_LIST_TITLE.to_string()]).await?;
    capture(ctx, Start::Board(id), vec![], "List with Long Title").await
}

async fn many_lists(ctx: &mut ScenarioContext) -> E2eResult<()> {
    let id = board_with_lists(ctx, &data::numbered("List", 10)).await?;
    capture(ctx, Start::Board(id), vec![], "Board with Many Lists").await
}

async fn empty_list_placeholder(ctx: &mut ScenarioContext) -> E2eResult<()> {
    let id = board_with_lists(ctx, &["Empty List".to_string()]).await?;
    capture(ctx, Start::Board(id), vec![], "Empty List Placeholder").await
}

async fn list_special_characters(ctx: &mut ScenarioContext) -> E2eResult<()> {
    let name = format!("{} List {} {}", data::CHINESE, data::EMOJI, data::SYMBOLS);
    let id = board_with_lists(ctx, &[name]).await?;
    capture(ctx, Start::Board(id), vec![], "List with Special Characters").await
}

// cards

async fn single_card(ctx: &mut ScenarioContext) -> E2eResult<()> {
    let built = board_with_cards(ctx, &to_do(&["Task 1"])).await?;
    capture(ctx, Start::Board(built.board.id), vec![], "List with Single Card").await
}

async fn multiple_cards(ctx: &mut ScenarioContext) -> E2eResult<()> {
    let cards = data::numbered("Task", 5);
    let specs = vec![ListSpec::new("To Do", cards)];
    let built = board_with_cards(ctx, &specs).await?;
    capture(ctx, Start::Board(built.board.id), vec![], "List with Multiple Cards").await
}

async fn card_detail_modal(ctx: &mut ScenarioContext) -> E2eResult<()> {
    let built = board_with_cards(ctx, &to_do(&["Task 1"])).await?;
    let open = Step::Click {
        locator: by_test_id("card").first(),
    };
    capture(ctx, Start::Board(built.board.id), vec![open], "Card Detail Modal Open").await
}

async fn card_long_title(ctx: &mut ScenarioContext) -> E2eResult<()> {
    let built = board_with_cards(ctx, &to_do(&[data::LONG_CARD_TITLE])).await?;
    capture(ctx, Start::Board(built.board.id), vec![], "Card with Long Title").await
}

async fn cards_across_lists(ctx: &mut ScenarioContext) -> E2eResult<()> {
    let specs = vec![
        ListSpec::new("To Do", ["Task 1", "Task 2", "Task 3"]),
        ListSpec::new("In Progress", ["Task 4", "Task 5"]),
        ListSpec::new("Done", ["Task 6"]),
    ];
    let built = board_with_cards(ctx, &specs).await?;
    capture(ctx, Start::Board(built.board.id), vec![], "Cards Across Multiple Lists").await
}

async fn many_cards(ctx: &mut ScenarioContext) -> E2eResult<()> {
    let specs = vec![ListSpec::new("To Do", data::numbered("Card", 15))];
    let built = board_with_cards(ctx, &specs).await?;
    capture(ctx, Start::Board(built.board.id), vec![], "List with Many Cards").await
}

async fn card_special_characters(ctx: &mut ScenarioContext) -> E2eResult<()> {
    let title = format!("{} Card {} {}", data::CHINESE, data::EMOJI, data::SYMBOLS);
    let built = board_with_cards(ctx, &to_do(&[title.as_str()])).await?;
    capture(ctx, Start::Board(built.board.id), vec![], "Card with Special Characters").await
}

async fn card_creation_form(ctx: &mut ScenarioContext) -> E2eResult<()> {
    let id = board_with_lists(ctx, &["To Do".to_string()]).await?;
    let open = Step::Click {
        locator: by_test_id("new-card").first(),
    };
    capture(ctx, Start::Board(id), vec![open], "Card Creation Form Active").await
}

async fn completed_card(ctx: &mut ScenarioContext) -> E2eResult<()> {
    let specs = vec![ListSpec::new("Done", ["Completed Task"])];
    let built = board_with_cards(ctx, &specs).await?;
    for card in built.lists.iter().flat_map(|l| l.cards.iter()) {
        ctx.api.mark_card_complete(card.id).await?;
    }
    capture(ctx, Start::Board(built.board.id), vec![], "List with Completed Card").await
}

//! Accessibility scenarios
//!
//! Component audits run with the known-issue allow-list applied and only
//! report. Known issues are documented one rule at a time. The full WCAG and
//! rule-enabling audits are expected to fail until the known issues are fixed,
//! and the keyboard navigation group waits for application support.

use tracing::info;

use crate::a11y::{AuditPolicy, AxeConfig, Impact, KNOWN_ISSUES};
use crate::error::E2eResult;
use crate::pages::base::by_test_id;
use crate::scenario::{Scenario, ScenarioContext, Setup, Suite};
use crate::script::Script;
use crate::step::{Locator, Step, UrlMatch};

const AUDIT: &str = "audit";
const WCAG_2_AA: [&str; 2] = ["wcag2a", "wcag2aa"];
const KNOWN_VIOLATIONS: &str = "color-contrast and image-alt violations are known issues";
const KEYBOARD_PENDING: &str = "keyboard navigation is not fully supported by the application";

fn a11y(scenario: Scenario, tags: &[&'static str]) -> Scenario {
    scenario.setup(Setup::DeleteAllBoards).tags(&["a11y"]).tags(tags)
}

fn xfail(scenario: Scenario, tags: &[&'static str]) -> Scenario {
    a11y(scenario, tags).tags(&["xfail"]).xfail(KNOWN_VIOLATIONS)
}

fn keyboard(scenario: Scenario) -> Scenario {
    a11y(scenario, &["keyboard"]).skip(KEYBOARD_PENDING)
}

pub fn scenarios() -> Vec<Scenario> {
    const S: Suite = Suite::Accessibility;

    vec![
        // board pages, allow-list applied
        a11y(
            scenario!(S, "accessibility::board::empty_page_critical", board_empty_page_critical),
            &["board"],
        ),
        a11y(
            scenario!(S, "accessibility::board::document_structure", board_document_structure),
            &["board"],
        ),
        a11y(scenario!(S, "accessibility::board::creation_area", board_creation_area), &["board"]),
        a11y(
            scenario!(S, "accessibility::board::boards_displayed", board_boards_displayed),
            &["board"],
        ),
        a11y(
            scenario!(
                S,
                "accessibility::board::boards_displayed_critical",
                board_boards_displayed_critical
            ),
            &["board"],
        ),
        // known issues
        a11y(
            scenario!(S, "accessibility::known_issues::color_contrast", known_color_contrast),
            &["known-issue"],
        ),
        a11y(
            scenario!(S, "accessibility::known_issues::image_alt", known_image_alt),
            &["known-issue"],
        ),
        a11y(
            scenario!(S, "accessibility::known_issues::page_has_heading_one", known_heading_one),
            &["known-issue"],
        ),
        a11y(scenario!(S, "accessibility::known_issues::region", known_region), &["known-issue"]),
        // lists
        xfail(
            scenario!(S, "accessibility::list::empty_board_wcag", list_empty_board_wcag),
            &["list"],
        ),
        xfail(
            scenario!(S, "accessibility::list::creation_form_wcag", list_creation_form_wcag),
            &["list"],
        ),
        xfail(
            scenario!(S, "accessibility::list::single_list_wcag", list_single_list_wcag),
            &["list"],
        ),
        xfail(
            scenario!(S, "accessibility::list::multiple_lists_wcag", list_multiple_lists_wcag),
            &["list"],
        ),
        xfail(
            scenario!(S, "accessibility::list::aria_attributes", list_aria_attributes),
            &["list", "aria"],
        ),
        xfail(
            scenario!(S, "accessibility::list::keyboard_creation", list_keyboard_creation),
            &["list", "keyboard"],
        ),
        xfail(scenario!(S, "accessibility::list::form_focus", list_form_focus), &["list", "focus"]),
        xfail(scenario!(S, "accessibility::list::form_labels", list_form_labels), &["list"]),
        xfail(
            scenario!(S, "accessibility::list::header_contrast", list_header_contrast),
            &["list"],
        ),
        xfail(
            scenario!(S, "accessibility::list::semantic_structure", list_semantic_structure),
            &["list"],
        ),
        xfail(
            scenario!(S, "accessibility::list::live_region", list_live_region),
            &["list", "aria"],
        ),
        // cards
        xfail(
            scenario!(S, "accessibility::card::creation_form_wcag", card_creation_form_wcag),
            &["card"],
        ),
        xfail(
            scenario!(S, "accessibility::card::single_card_wcag", card_single_card_wcag),
            &["card"],
        ),
        xfail(
            scenario!(S, "accessibility::card::multiple_cards_wcag", card_multiple_cards_wcag),
            &["card"],
        ),
        xfail(
            scenario!(S, "accessibility::card::detail_modal_wcag", card_detail_modal_wcag),
            &["card"],
        ),
        xfail(
            scenario!(S, "accessibility::card::aria_attributes", card_aria_attributes),
            &["card", "aria"],
        ),
        a11y(
            scenario!(S, "accessibility::card::keyboard_creation", card_keyboard_creation),
            &["card", "keyboard"],
        )
        .skip("the new card trigger is not a focusable element"),
        xfail(
            scenario!(S, "accessibility::card::keyboard_open_detail", card_keyboard_open_detail),
            &["card", "keyboard"],
        ),
        xfail(
            scenario!(S, "accessibility::card::modal_focus", card_modal_focus),
            &["card", "focus"],
        ),
        xfail(
            scenario!(S, "accessibility::card::close_button_name", card_close_button_name),
            &["card"],
        ),
        xfail(scenario!(S, "accessibility::card::contrast", card_contrast), &["card"]),
        xfail(
            scenario!(
                S,
                "accessibility::card::completion_live_region",
                card_completion_live_region
            ),
            &["card", "aria"],
        ),
        xfail(
            scenario!(S, "accessibility::card::semantic_structure", card_semantic_structure),
            &["card"],
        ),
        xfail(
            scenario!(S, "accessibility::card::escape_closes_detail", card_escape_closes_detail),
            &["card", "keyboard"],
        ),
        // keyboard navigation
        keyboard(scenario!(S, "accessibility::keyboard::home_tab_order", keyboard_home_tab_order)),
        keyboard(scenario!(
            S,
            "accessibility::keyboard::create_board_enter",
            keyboard_create_board_enter
        )),
        keyboard(scenario!(
            S,
            "accessibility::keyboard::create_board_modal_escape",
            keyboard_create_board_modal_escape
        )),
        keyboard(scenario!(
            S,
            "accessibility::keyboard::open_board_enter",
            keyboard_open_board_enter
        )),
        keyboard(scenario!(S, "accessibility::keyboard::create_list", keyboard_create_list)),
        keyboard(scenario!(
            S,
            "accessibility::keyboard::card_detail_escape",
            keyboard_card_detail_escape
        )),
        keyboard(scenario!(
            S,
            "accessibility::keyboard::submit_board_form",
            keyboard_submit_board_form
        )),
        keyboard(scenario!(S, "accessibility::keyboard::wcag_keyboard", keyboard_wcag)),
        keyboard(scenario!(S, "accessibility::keyboard::no_traps", keyboard_no_traps)),
    ]
}

fn wcag_2_aa() -> AxeConfig {
    AxeConfig::all().tags(WCAG_2_AA)
}

/// Every rule, with `rules` explicitly switched on
fn rules_enabled(rules: &[&str]) -> AxeConfig {
    rules.iter().fold(AxeConfig::all(), |config, rule| config.enable(rule))
}

fn push_audit(script: &mut Script, config: &AxeConfig) {
    script.push(Step::Audit {
        label: AUDIT.to_string(),
        config: config.clone(),
    });
}

/// Append an audit, run the script and fail on any counted violation
async fn enforce(ctx: &ScenarioContext, mut script: Script, config: AxeConfig) -> E2eResult<()> {
    push_audit(&mut script, &config);
    let report = ctx.run(script).await?;
    ctx.check_audit(&report, AUDIT, &config, AuditPolicy::Enforce)?;
    Ok(())
}

fn visible(script: &mut Script, locator: Locator) {
    script.push(Step::AssertVisible { locator });
}

fn click(script: &mut Script, locator: Locator) {
    script.push(Step::Click { locator });
}

fn press(script: &mut Script, locator: Option<Locator>, key: &str) {
    script.push(Step::Press {
        locator,
        key: key.to_string(),
    });
}

// board pages

/// Report critical violations that are not on the allow-list
async fn report_critical(ctx: &ScenarioContext, label: &str) -> E2eResult<()> {
    let config = ctx.component_audit().with_impacts([Impact::Critical]);

    let mut script = ctx.script(label);
    script.home().visit();
    push_audit(&mut script, &config);
    let report = ctx.run(script).await?;

    let found = ctx.check_audit(&report, AUDIT, &config, AuditPolicy::Report)?;
    if found > 0 {
        info!("{} critical accessibility violation(s) outside the allow-list", found);
    }
    Ok(())
}

async fn board_empty_page_critical(ctx: &mut ScenarioContext) -> E2eResult<()> {
    report_critical(ctx, "empty page").await
}

async fn board_document_structure(ctx: &mut ScenarioContext) -> E2eResult<()> {
    let mut script = ctx.script("document structure");
    script.home().visit();
    script
        .push(Step::AssertAttribute {
            locator: Locator::css("html"),
            name: "lang".to_string(),
            value: None,
        })
        .push(Step::AssertAttached {
            locator: Locator::css("title"),
        });
    ctx.run(script).await?;
    Ok(())
}

async fn board_creation_area(ctx: &mut ScenarioContext) -> E2eResult<()> {
    let mut script = ctx.script("creation area");
    script.home().visit();
    script.push(Step::AssertMinCount {
        locator: Locator::css(r#"button, [role="button"], a, input"#),
        min: 1,
    });
    ctx.run(script).await?;
    Ok(())
}

async fn board_boards_displayed(ctx: &mut ScenarioContext) -> E2eResult<()> {
    ctx.api.create_board("Test Board").await?;

    let mut script = ctx.script("boards displayed");
    script.home().visit();
    script.push(Step::AssertAttached {
        locator: by_test_id("board-item").first(),
    });
    ctx.run(script).await?;
    Ok(())
}

async fn board_boards_displayed_critical(ctx: &mut ScenarioContext) -> E2eResult<()> {
    ctx.api.create_board("Board 1").await?;
    ctx.api.create_board("Board 2").await?;
    report_critical(ctx, "boards displayed").await
}

// known issues

/// Audit the home page for a single known-issue rule and log what is left of it
async fn document_known_issue(ctx: &ScenarioContext, rule: &str) -> E2eResult<()> {
    let config =
        AxeConfig::specific_rules([rule]).with_impacts([Impact::Critical, Impact::Serious]);

    let mut script = ctx.script(rule);
    script.home().visit();
    push_audit(&mut script, &config);
    let report = ctx.run(script).await?;
    ctx.check_audit(&report, AUDIT, &config, AuditPolicy::Report)?;

    let description = KNOWN_ISSUES
        .iter()
        .find(|issue| issue.rule == rule)
        .map(|issue| issue.description)
        .unwrap_or(rule);
    let remaining = report
        .audit(AUDIT)
        .map(|audit| audit.violations_of(rule).count())
        .unwrap_or(0);

    if remaining > 0 {
        info!("Known issue {}: {} ({} violation(s))", rule, description, remaining);
    } else if ctx.is_live() {
        info!("Known issue {} not found, it may be fixed", rule);
    }
    Ok(())
}

async fn known_color_contrast(ctx: &mut ScenarioContext) -> E2eResult<()> {
    document_known_issue(ctx, "color-contrast").await
}

async fn known_image_alt(ctx: &mut ScenarioContext) -> E2eResult<()> {
    document_known_issue(ctx, "image-alt").await
}

async fn known_heading_one(ctx: &mut ScenarioContext) -> E2eResult<()> {
    document_known_issue(ctx, "page-has-heading-one").await
}

async fn known_region(ctx: &mut ScenarioContext) -> E2eResult<()> {
    document_known_issue(ctx, "region").await
}

// lists

async fn list_board(ctx: &ScenarioContext, label: &str) -> E2eResult<Script> {
    let board = ctx.api.create_board("Accessibility Test Board").await?;
    let mut script = ctx.script(label);
    script.board().visit(board.id);
    Ok(script)
}

/// Board with one list created through the UI
async fn board_with_ui_list(ctx: &ScenarioContext, label: &str, name: &str) -> E2eResult<Script> {
    let mut script = list_board(ctx, label).await?;
    script.board().create_list(name);
    visible(&mut script, by_test_id("list").first());
    Ok(script)
}

async fn list_empty_board_wcag(ctx: &mut ScenarioContext) -> E2eResult<()> {
    let script = list_board(ctx, "empty board").await?;
    enforce(ctx, script, wcag_2_aa()).await
}

async fn list_creation_form_wcag(ctx: &mut ScenarioContext) -> E2eResult<()> {
    let mut script = list_board(ctx, "list form").await?;
    click(&mut script, by_test_id("add-list"));
    visible(&mut script, by_test_id("add-list-form"));
    let config = wcag_2_aa().with_context(crate::step::test_id_selector("add-list-form"));
    enforce(ctx, script, config).await
}

async fn list_single_list_wcag(ctx: &mut ScenarioContext) -> E2eResult<()> {
    let script = board_with_ui_list(ctx, "single list", "Accessible List").await?;
    enforce(ctx, script, wcag_2_aa()).await
}

async fn list_multiple_lists_wcag(ctx: &mut ScenarioContext) -> E2eResult<()> {
    let mut script = list_board(ctx, "multiple lists").await?;
    let mut page = script.board();
    for name in ["List 1", "List 2", "List 3"] {
        page.create_list(name);
    }
    script.push(Step::AssertMinCount {
        locator: by_test_id("list"),
        min: 3,
    });
    enforce(ctx, script, wcag_2_aa()).await
}

async fn list_aria_attributes(ctx: &mut ScenarioContext) -> E2eResult<()> {
    let mut script = board_with_ui_list(ctx, "list aria", "ARIA Test List").await?;
    visible(&mut script, by_test_id("list-title").first());
    enforce(ctx, script, rules_enabled(&["aria-required-attr", "aria-valid-attr"])).await
}

async fn list_keyboard_creation(ctx: &mut ScenarioContext) -> E2eResult<()> {
    let mut script = list_board(ctx, "keyboard list").await?;
    script.push(Step::Focus {
        locator: by_test_id("add-list"),
    });
    press(&mut script, Some(by_test_id("add-list")), "Enter");
    script.push(Step::Type {
        locator: by_test_id("add-list-input"),
        text: "Keyboard List".to_string(),
    });
    press(&mut script, Some(by_test_id("add-list-input")), "Enter");
    script.board().assert_list_exists("Keyboard List");
    enforce(ctx, script, wcag_2_aa()).await
}

async fn list_form_focus(ctx: &mut ScenarioContext) -> E2eResult<()> {
    let mut script = list_board(ctx, "list form focus").await?;
    click(&mut script, by_test_id("add-list"));
    script.push(Step::AssertFocusedVisible);
    enforce(ctx, script, rules_enabled(&["focus-order-semantics"])).await
}

async fn list_form_labels(ctx: &mut ScenarioContext) -> E2eResult<()> {
    let mut script = list_board(ctx, "list form labels").await?;
    click(&mut script, by_test_id("add-list"));
    enforce(ctx, script, rules_enabled(&["label", "label-title-only"])).await
}

async fn list_header_contrast(ctx: &mut ScenarioContext) -> E2eResult<()> {
    let script = board_with_ui_list(ctx, "list contrast", "Contrast List").await?;
    enforce(ctx, script, rules_enabled(&["color-contrast"])).await
}

async fn list_semantic_structure(ctx: &mut ScenarioContext) -> E2eResult<()> {
    let script = board_with_ui_list(ctx, "list semantics", "Semantic List").await?;
    enforce(ctx, script, rules_enabled(&["landmark-one-main", "region"])).await
}

async fn list_live_region(ctx: &mut ScenarioContext) -> E2eResult<()> {
    let mut script = board_with_ui_list(ctx, "list announcements", "Announced List").await?;
    visible(&mut script, by_test_id("list-title").first());
    enforce(ctx, script, rules_enabled(&["aria-live-region"])).await
}

// cards

/// Board with a "Test List" holding `cards`, visited; cards are shown when any exist
async fn card_board(ctx: &ScenarioContext, label: &str, cards: &[&str]) -> E2eResult<Script> {
    let board = ctx.api.create_board("Card A11y Test Board").await?;
    let list = ctx.api.create_list(board.id, "Test List").await?;
    for name in cards {
        ctx.api.create_card(board.id, list.id, name).await?;
    }

    let mut script = ctx.script(label);
    script.board().visit(board.id);
    if !cards.is_empty() {
        visible(&mut script, by_test_id("card").first());
    }
    Ok(script)
}

/// Board with one card whose detail modal is open
async fn open_detail(ctx: &ScenarioContext, label: &str, card: &str) -> E2eResult<Script> {
    let mut script = card_board(ctx, label, &[card]).await?;
    click(&mut script, by_test_id("card").first());
    visible(&mut script, by_test_id("card-detail-modal"));
    Ok(script)
}

async fn card_creation_form_wcag(ctx: &mut ScenarioContext) -> E2eResult<()> {
    let mut script = card_board(ctx, "card form", &[]).await?;
    click(&mut script, by_test_id("new-card").first());
    visible(&mut script, by_test_id("new-card-input"));
    enforce(ctx, script, wcag_2_aa()).await
}

async fn card_single_card_wcag(ctx: &mut ScenarioContext) -> E2eResult<()> {
    let script = card_board(ctx, "single card", &["Accessible Card"]).await?;
    enforce(ctx, script, wcag_2_aa()).await
}

async fn card_multiple_cards_wcag(ctx: &mut ScenarioContext) -> E2eResult<()> {
    let mut script = card_board(ctx, "multiple cards", &["Card 1", "Card 2", "Card 3"]).await?;
    script.push(Step::AssertMinCount {
        locator: by_test_id("card"),
        min: 3,
    });
    enforce(ctx, script, wcag_2_aa()).await
}

async fn card_detail_modal_wcag(ctx: &mut ScenarioContext) -> E2eResult<()> {
    let script = open_detail(ctx, "card detail", "Detail Test Card").await?;
    let config = wcag_2_aa().with_context(crate::step::test_id_selector("card-detail-modal"));
    enforce(ctx, script, config).await
}

async fn card_aria_attributes(ctx: &mut ScenarioContext) -> E2eResult<()> {
    let script = card_board(ctx, "card aria", &["ARIA Test Card"]).await?;
    enforce(ctx, script, rules_enabled(&["aria-required-attr", "aria-valid-attr"])).await
}

async fn card_keyboard_creation(ctx: &mut ScenarioContext) -> E2eResult<()> {
    let mut script = card_board(ctx, "keyboard card", &[]).await?;
    script.push(Step::Focus {
        locator: by_test_id("new-card").first(),
    });
    press(&mut script, Some(by_test_id("new-card").first()), "Enter");
    script.push(Step::Type {
        locator: by_test_id("new-card-input"),
        text: "Keyboard Card".to_string(),
    });
    press(&mut script, Some(by_test_id("new-card-input")), "Enter");
    script.board().assert_card_exists("Keyboard Card");
    enforce(ctx, script, wcag_2_aa()).await
}

async fn card_keyboard_open_detail(ctx: &mut ScenarioContext) -> E2eResult<()> {
    let mut script = card_board(ctx, "keyboard detail", &["Keyboard Detail Card"]).await?;
    script.push(Step::Focus {
        locator: by_test_id("card").first(),
    });
    press(&mut script, Some(by_test_id("card").first()), "Enter");
    visible(&mut script, by_test_id("card-detail-modal"));
    enforce(ctx, script, wcag_2_aa()).await
}

async fn card_modal_focus(ctx: &mut ScenarioContext) -> E2eResult<()> {
    let mut script = open_detail(ctx, "modal focus", "Focus Trap Card").await?;
    script.push(Step::AssertFocusedVisible);
    enforce(ctx, script, rules_enabled(&["focus-order-semantics"])).await
}

async fn card_close_button_name(ctx: &mut ScenarioContext) -> E2eResult<()> {
    let mut script = open_detail(ctx, "close button", "Close Button Card").await?;
    visible(&mut script, by_test_id("close-card-detail"));
    enforce(ctx, script, rules_enabled(&["button-name"])).await
}

async fn card_contrast(ctx: &mut ScenarioContext) -> E2eResult<()> {
    let script = card_board(ctx, "card contrast", &["Contrast Card"]).await?;
    enforce(ctx, script, rules_enabled(&["color-contrast"])).await
}

async fn card_completion_live_region(ctx: &mut ScenarioContext) -> E2eResult<()> {
    let mut script = open_detail(ctx, "completion status", "Completion Status Card").await?;
    script.push(Step::AssertAttached {
        locator: by_test_id("card-completed"),
    });
    enforce(ctx, script, rules_enabled(&["aria-live-region"])).await
}

async fn card_semantic_structure(ctx: &mut ScenarioContext) -> E2eResult<()> {
    let script = card_board(ctx, "card semantics", &["Semantic Card"]).await?;
    enforce(ctx, script, rules_enabled(&["list", "listitem"])).await
}

async fn card_escape_closes_detail(ctx: &mut ScenarioContext) -> E2eResult<()> {
    let mut script = open_detail(ctx, "escape detail", "ESC Key Card").await?;
    press(&mut script, None, "Escape");
    script.push(Step::AssertAbsent {
        locator: by_test_id("card-detail-modal"),
    });
    enforce(ctx, script, wcag_2_aa()).await
}

// keyboard navigation

async fn keyboard_home_tab_order(ctx: &mut ScenarioContext) -> E2eResult<()> {
    ctx.api.create_board("Tab Navigation Board").await?;

    let mut script = ctx.script("tab order");
    script.home().visit();
    visible(&mut script, by_test_id("board-item").first());
    for _ in 0..2 {
        press(&mut script, None, "Tab");
        script.push(Step::AssertFocusedVisible);
    }
    enforce(ctx, script, rules_enabled(&["focus-order-semantics"])).await
}

async fn keyboard_create_board_enter(ctx: &mut ScenarioContext) -> E2eResult<()> {
    let mut script = ctx.script("create board with enter");
    script.home().visit();
    script.push(Step::Focus {
        locator: by_test_id("create-board-button"),
    });
    press(&mut script, Some(by_test_id("create-board-button")), "Enter");
    visible(&mut script, by_test_id("new-board-modal"));
    ctx.run(script).await?;
    Ok(())
}

async fn keyboard_create_board_modal_escape(ctx: &mut ScenarioContext) -> E2eResult<()> {
    let mut script = ctx.script("close modal with escape");
    script.home().visit().click_create_board();
    visible(&mut script, by_test_id("new-board-modal"));
    press(&mut script, None, "Escape");
    script.push(Step::AssertAbsent {
        locator: by_test_id("new-board-modal"),
    });
    ctx.run(script).await?;
    Ok(())
}

async fn keyboard_open_board_enter(ctx: &mut ScenarioContext) -> E2eResult<()> {
    let board = ctx.api.create_board("Keyboard Open Board").await?;

    let mut script = ctx.script("open board with enter");
    script.home().visit();
    let item = by_test_id("board-item").first();
    script.push(Step::Focus {
        locator: item.clone(),
    });
    press(&mut script, Some(item), "Enter");
    script.push(Step::AssertUrl {
        matcher: UrlMatch::Includes(format!("/board/{}", board.id)),
    });
    ctx.run(script).await?;
    Ok(())
}

async fn keyboard_create_list(ctx: &mut ScenarioContext) -> E2eResult<()> {
    let board = ctx.api.create_board("Keyboard Nav Board").await?;

    let mut script = ctx.script("keyboard list");
    script.board().visit(board.id);
    script.push(Step::Focus {
        locator: by_test_id("add-list"),
    });
    press(&mut script, Some(by_test_id("add-list")), "Enter");
    script.push(Step::Type {
        locator: by_test_id("add-list-input"),
        text: "Keyboard List".to_string(),
    });
    press(&mut script, Some(by_test_id("add-list-input")), "Enter");
    script.board().assert_list_exists("Keyboard List");
    ctx.run(script).await?;
    Ok(())
}

async fn keyboard_card_detail_escape(ctx: &mut ScenarioContext) -> E2eResult<()> {
    let mut script = open_detail(ctx, "escape card detail", "ESC Card").await?;
    press(&mut script, None, "Escape");
    script.push(Step::AssertAbsent {
        locator: by_test_id("card-detail-modal"),
    });
    ctx.run(script).await?;
    Ok(())
}

async fn keyboard_submit_board_form(ctx: &mut ScenarioContext) -> E2eResult<()> {
    ctx.api.create_board("Existing Board").await?;

    let mut script = ctx.script("submit with enter");
    script.home().visit().click_create_board();
    script.push(Step::Type {
        locator: by_test_id("new-board-input"),
        text: "Enter Board".to_string(),
    });
    press(&mut script, Some(by_test_id("new-board-input")), "Enter");
    script.push(Step::AssertUrl {
        matcher: UrlMatch::Includes("/board/".to_string()),
    });
    ctx.run(script).await?;
    Ok(())
}

async fn keyboard_wcag(ctx: &mut ScenarioContext) -> E2eResult<()> {
    let mut script = ctx.script("wcag keyboard");
    script.home().visit();
    enforce(ctx, script, AxeConfig::wcag().enable("keyboard")).await
}

async fn keyboard_no_traps(ctx: &mut ScenarioContext) -> E2eResult<()> {
    ctx.api.create_board("Trap Test Board").await?;

    let mut script = ctx.script("no keyboard traps");
    script.home().visit();
    visible(&mut script, by_test_id("board-item").first());
    for _ in 0..20 {
        press(&mut script, None, "Tab");
    }
    script.push(Step::AssertFocusedVisible);
    ctx.run(script).await?;
    Ok(())
}

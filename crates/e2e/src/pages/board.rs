use crate::script::Script;
use crate::step::Step;

use super::base::{assert_value, by_test_id, clear_and_type, click, type_text};

/// A single board at `/board/{id}`
pub struct BoardPage<'a> {
    script: &'a mut Script,
}

impl<'a> BoardPage<'a> {
    pub fn new(script: &'a mut Script) -> Self {
        Self { script }
    }

    pub fn visit(&mut self, board_id: i64) -> &mut Self {
        self.script.push(Step::Visit {
            path: format!("/board/{}", board_id),
        });
        self
    }

    pub fn assert_board_loaded(&mut self) -> &mut Self {
        self.script.push(Step::AssertVisible {
            locator: by_test_id("board-detail"),
        });
        self
    }

    pub fn assert_board_title(&mut self, title: &str) -> &mut Self {
        assert_value(self.script, by_test_id("board-title"), title);
        self
    }

    /// Clear the title, type the new one if any, and blur to save
    pub fn change_board_title(&mut self, new_title: &str) -> &mut Self {
        clear_and_type(self.script, by_test_id("board-title"), new_title);
        self.script.push(Step::Blur {
            locator: by_test_id("board-title"),
        });
        self
    }

    pub fn toggle_star(&mut self) -> &mut Self {
        click(self.script, by_test_id("star"));
        self
    }

    pub fn assert_starred(&mut self) -> &mut Self {
        self.script.push(Step::AssertClass {
            locator: by_test_id("star"),
            class: "text-yellow-300".to_string(),
        });
        self
    }

    pub fn assert_not_starred(&mut self) -> &mut Self {
        self.script.push(Step::AssertClass {
            locator: by_test_id("star"),
            class: "text-white".to_string(),
        });
        self
    }

    /// The create-list button is only shown once the board has lists
    pub fn create_list(&mut self, list_name: &str) -> &mut Self {
        self.script.push(Step::Wait { ms: 100 });
        self.script.push(Step::ClickIfVisible {
            locator: by_test_id("create-list"),
        });
        type_text(self.script, by_test_id("add-list-input"), list_name);
        click(self.script, by_test_id("add-list"));
        self
    }

    /// List names are editable inputs, so this checks their values
    pub fn assert_list_exists(&mut self, list_name: &str) -> &mut Self {
        self.script.push(Step::AssertValuesInclude {
            locator: by_test_id("list-name"),
            value: list_name.to_string(),
        });
        self
    }

    pub fn create_card(&mut self, list_index: usize, card_name: &str) -> &mut Self {
        click(self.script, by_test_id("new-card").nth(list_index));
        type_text(self.script, by_test_id("new-card-input"), card_name);
        click(self.script, by_test_id("new-card-submit"));
        self
    }

    pub fn assert_card_exists(&mut self, card_name: &str) -> &mut Self {
        self.script.push(Step::AssertVisible {
            locator: by_test_id("card").containing(card_name).first(),
        });
        self
    }

    pub fn open_card(&mut self, card_name: &str) -> &mut Self {
        click(self.script, by_test_id("card").containing(card_name).first());
        self
    }

    pub fn assert_card_count(&mut self, count: usize) -> &mut Self {
        self.script.push(Step::AssertCount {
            locator: by_test_id("card"),
            count,
        });
        self
    }

    pub fn assert_list_count(&mut self, count: usize) -> &mut Self {
        self.script.push(Step::AssertCount {
            locator: by_test_id("list"),
            count,
        });
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::step::{Locator, Pick};

    #[test]
    fn test_rename_to_empty_only_clears_and_blurs() {
        let mut script = Script::new("rename");
        script.board().change_board_title("");

        let steps = script.steps();
        assert_eq!(steps.len(), 2);
        assert!(matches!(steps[0], Step::Clear { .. }));
        assert!(matches!(steps[1], Step::Blur { .. }));
    }

    #[test]
    fn test_create_list_reveals_input_when_needed() {
        let mut script = Script::new("list");
        script.board().create_list("To Do");

        let steps = script.steps();
        assert!(matches!(steps[0], Step::Wait { ms: 100 }));
        assert!(matches!(
            &steps[1],
            Step::ClickIfVisible { locator } if *locator == Locator::test_id("create-list")
        ));
        assert!(matches!(&steps[2], Step::Type { text, .. } if text == "To Do"));
        assert!(matches!(steps[3], Step::Click { .. }));
    }

    #[test]
    fn test_create_card_targets_list_by_index() {
        let mut script = Script::new("card");
        script.board().visit(7).create_card(2, "Task");

        match &script.steps()[1] {
            Step::Click { locator } => assert_eq!(locator.pick, Some(Pick::Nth(2))),
            other => panic!("unexpected step: {:?}", other),
        }
        assert!(matches!(&script.steps()[0], Step::Visit { path } if path == "/board/7"));
    }

    #[test]
    fn test_star_assertions_check_classes() {
        let mut script = Script::new("star");
        script.board().toggle_star().assert_starred().toggle_star().assert_not_starred();

        let classes: Vec<&str> = script
            .steps()
            .iter()
            .filter_map(|s| match s {
                Step::AssertClass { class, .. } => Some(class.as_str()),
                _ => None,
            })
            .collect();
        assert_eq!(classes, vec!["text-yellow-300", "text-white"]);
    }
}

use crate::script::Script;
use crate::step::{Step, UrlMatch};

use super::base::{assert_visible, by_test_id, click, type_text};

/// The board overview at `/`
pub struct HomePage<'a> {
    script: &'a mut Script,
}

impl<'a> HomePage<'a> {
    pub fn new(script: &'a mut Script) -> Self {
        Self { script }
    }

    pub fn visit(&mut self) -> &mut Self {
        self.script.push(Step::Visit {
            path: "/".to_string(),
        });
        self
    }

    /// Create a board through the empty-state input
    pub fn create_first_board(&mut self, board_name: &str) -> &mut Self {
        type_text(self.script, by_test_id("first-board"), board_name);
        self.script.push(Step::Press {
            locator: Some(by_test_id("first-board")),
            key: "Enter".to_string(),
        });
        self
    }

    pub fn click_create_board(&mut self) -> &mut Self {
        click(self.script, by_test_id("create-board"));
        self
    }

    pub fn create_board(&mut self, board_name: &str) -> &mut Self {
        click(self.script, by_test_id("create-board"));
        type_text(self.script, by_test_id("new-board-input"), board_name);
        click(self.script, by_test_id("new-board-create"));
        self
    }

    pub fn open_board(&mut self, board_name: &str) -> &mut Self {
        click(
            self.script,
            by_test_id("board-item").containing(board_name).first(),
        );
        self
    }

    pub fn assert_board_exists(&mut self, board_name: &str) -> &mut Self {
        assert_visible(
            self.script,
            by_test_id("board-item").containing(board_name).first(),
        );
        self
    }

    pub fn assert_board_count(&mut self, count: usize) -> &mut Self {
        self.script.push(Step::AssertCount {
            locator: by_test_id("board-item"),
            count,
        });
        self
    }

    /// The URL is exactly the application root
    pub fn assert_home_page_visible(&mut self) -> &mut Self {
        self.script.push(Step::AssertUrl {
            matcher: UrlMatch::Path("/".to_string()),
        });
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_first_board_presses_enter() {
        let mut script = Script::new("home");
        script.home().visit().create_first_board("Groceries");

        let steps = script.steps();
        assert_eq!(steps.len(), 3);
        assert!(matches!(&steps[1], Step::Type { text, .. } if text == "Groceries"));
        assert!(matches!(&steps[2], Step::Press { key, locator: Some(_) } if key == "Enter"));
    }

    #[test]
    fn test_create_board_uses_dialog() {
        let mut script = Script::new("home");
        script.home().create_board("Project Alpha");

        let names: Vec<String> = script.steps().iter().map(Step::name).collect();
        assert_eq!(
            names,
            vec![
                r#"click:[data-cy="create-board"]"#,
                r#"type:[data-cy="new-board-input"]"#,
                r#"click:[data-cy="new-board-create"]"#,
            ]
        );
    }
}

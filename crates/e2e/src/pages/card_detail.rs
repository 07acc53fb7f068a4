use crate::script::Script;
use crate::step::{Locator, Step};

use super::base::{assert_value, assert_visible, by_test_id, clear_and_type, click};

/// The card detail modal
///
/// Reached by opening a card on a [`BoardPage`](super::BoardPage); it has no
/// URL of its own.
pub struct CardDetailPage<'a> {
    script: &'a mut Script,
}

/// The completion checkbox inside the DUE DATE section of the modal
fn completion_checkbox() -> Locator {
    Locator::css(r#"div:has(> h2:has-text("DUE DATE")) [data-cy="card-checkbox"]"#).first()
}

impl<'a> CardDetailPage<'a> {
    pub fn new(script: &'a mut Script) -> Self {
        Self { script }
    }

    pub fn assert_card_detail_visible(&mut self) -> &mut Self {
        assert_visible(self.script, by_test_id("card-detail-title"));
        self
    }

    pub fn assert_card_title(&mut self, title: &str) -> &mut Self {
        assert_value(self.script, by_test_id("card-detail-title"), title);
        self
    }

    pub fn change_card_title(&mut self, new_title: &str) -> &mut Self {
        clear_and_type(self.script, by_test_id("card-detail-title"), new_title);
        self.script.push(Step::Blur {
            locator: by_test_id("card-detail-title"),
        });
        self
    }

    pub fn set_description(&mut self, description: &str) -> &mut Self {
        click(self.script, by_test_id("card-description-button"));
        clear_and_type(self.script, by_test_id("card-description-input"), description);
        click(self.script, by_test_id("card-description-save"));
        self
    }

    pub fn assert_description(&mut self, description: &str) -> &mut Self {
        assert_value(self.script, by_test_id("card-description-input"), description);
        self
    }

    pub fn toggle_complete(&mut self) -> &mut Self {
        click(self.script, completion_checkbox());
        self
    }

    pub fn assert_completed(&mut self) -> &mut Self {
        self.script.push(Step::AssertChecked {
            locator: completion_checkbox(),
            checked: true,
        });
        self
    }

    pub fn assert_not_completed(&mut self) -> &mut Self {
        self.script.push(Step::AssertChecked {
            locator: completion_checkbox(),
            checked: false,
        });
        self
    }

    pub fn close(&mut self) -> &mut Self {
        click(self.script, by_test_id("card-detail-close"));
        self
    }

    pub fn delete_card(&mut self) -> &mut Self {
        click(self.script, by_test_id("card-detail-delete"));
        self
    }

    pub fn set_due_date(&mut self, date: &str) -> &mut Self {
        clear_and_type(self.script, by_test_id("due-date"), date);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_completion_checkbox_is_scoped_to_due_date_section() {
        let mut script = Script::new("complete");
        script.card_detail().toggle_complete().assert_completed();

        match &script.steps()[1] {
            Step::AssertChecked { locator, checked } => {
                assert!(*checked);
                assert!(locator.describe().contains("DUE DATE"));
            }
            other => panic!("unexpected step: {:?}", other),
        }
    }

    #[test]
    fn test_set_description_saves() {
        let mut script = Script::new("description");
        script.card_detail().set_description("Details");

        let last = script.steps().last().map(Step::name);
        assert_eq!(last.as_deref(), Some(r#"click:[data-cy="card-description-save"]"#));
    }
}

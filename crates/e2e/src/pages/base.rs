//! Step helpers shared by the page objects

use crate::script::Script;
use crate::step::{Locator, Step, UrlMatch};

pub fn by_test_id(test_id: &str) -> Locator {
    Locator::test_id(test_id)
}

pub fn click(script: &mut Script, locator: Locator) {
    script.push(Step::Click { locator });
}

pub fn type_text(script: &mut Script, locator: Locator, text: &str) {
    script.push(Step::Type {
        locator,
        text: text.to_string(),
    });
}

/// Clear the field, then type `text` unless it is empty
pub fn clear_and_type(script: &mut Script, locator: Locator, text: &str) {
    script.push(Step::Clear {
        locator: locator.clone(),
    });
    if !text.is_empty() {
        type_text(script, locator, text);
    }
}

pub fn assert_visible(script: &mut Script, locator: Locator) {
    script.push(Step::AssertVisible { locator });
}

pub fn assert_text(script: &mut Script, locator: Locator, text: &str) {
    script.push(Step::AssertContainsText {
        locator,
        text: text.to_string(),
    });
}

pub fn assert_value(script: &mut Script, locator: Locator, value: &str) {
    script.push(Step::AssertValue {
        locator,
        value: value.to_string(),
    });
}

/// Wait until the page URL matches a regular expression
pub fn wait_for_url(script: &mut Script, pattern: &str) {
    script.push(Step::AssertUrl {
        matcher: UrlMatch::Pattern(pattern.to_string()),
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clear_and_type_skips_empty_text() {
        let mut script = Script::new("empty");
        clear_and_type(&mut script, by_test_id("board-title"), "");
        assert_eq!(script.steps().len(), 1);
        assert!(matches!(script.steps()[0], Step::Clear { .. }));

        clear_and_type(&mut script, by_test_id("board-title"), "Renamed");
        assert_eq!(script.steps().len(), 3);
        assert!(matches!(&script.steps()[2], Step::Type { text, .. } if text == "Renamed"));
    }
}

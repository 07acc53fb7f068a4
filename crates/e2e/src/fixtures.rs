//! Entity builders: boards with lists, and boards with lists and cards
//!
//! Creation is strictly sequential. The application orders lists and cards by
//! insertion, and scenarios assert on ordinal positions, so no call is issued
//! before the previous one has answered. A failed call aborts the build and
//! leaves whatever was already created in place; the next scenario's setup
//! hook clears it.

use serde::{Deserialize, Serialize};
use tracing::debug;

use kanban_common::{BoardWithLists, BoardWithListsAndCards, ListWithCards};

use crate::api::ApiClient;
use crate::error::E2eResult;

/// A list to create together with the names of its cards
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListSpec {
    pub list_name: String,
    #[serde(default)]
    pub cards: Vec<String>,
}

impl ListSpec {
    pub fn new<I, S>(list_name: impl Into<String>, cards: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            list_name: list_name.into(),
            cards: cards.into_iter().map(Into::into).collect(),
        }
    }

    pub fn empty(list_name: impl Into<String>) -> Self {
        Self {
            list_name: list_name.into(),
            cards: Vec::new(),
        }
    }
}

/// Create a board, then one list per name in the given order
pub async fn create_board_with_lists<S: AsRef<str>>(
    api: &ApiClient,
    board_name: &str,
    list_names: &[S],
) -> E2eResult<BoardWithLists> {
    let board = api.create_board(board_name).await?;

    let mut lists = Vec::with_capacity(list_names.len());
    for name in list_names {
        lists.push(api.create_list(board.id, name.as_ref()).await?);
    }

    debug!("Built board {} with {} list(s)", board.id, lists.len());
    Ok(BoardWithLists { board, lists })
}

/// Create a board, then each list followed by that list's cards
pub async fn create_board_with_lists_and_cards(
    api: &ApiClient,
    board_name: &str,
    specs: &[ListSpec],
) -> E2eResult<BoardWithListsAndCards> {
    let board = api.create_board(board_name).await?;

    let mut lists = Vec::with_capacity(specs.len());
    for spec in specs {
        let list = api.create_list(board.id, &spec.list_name).await?;

        let mut cards = Vec::with_capacity(spec.cards.len());
        for card_name in &spec.cards {
            cards.push(api.create_card(board.id, list.id, card_name).await?);
        }

        lists.push(ListWithCards { list, cards });
    }

    let result = BoardWithListsAndCards { board, lists };
    debug!(
        "Built board {} with {} list(s) and {} card(s)",
        result.board.id,
        result.lists.len(),
        result.card_count()
    );
    Ok(result)
}

/// Named test data shared by the scenarios
pub mod data {
    use super::ListSpec;

    pub const CHINESE: &str = "测试";
    pub const EMOJI: &str = "🎉🎊";
    pub const SYMBOLS: &str = "!@#$%^&*()";

    pub const LONG_BOARD_TITLE: &str = "This is a very long board name that should test how the UI handles lengthy text content without breaking the layout";
    pub const LONG_LIST_TITLE: &str = "This is a very long list name that should test how the UI handles lengthy text content without breaking the layout";
    pub const LONG_CARD_TITLE: &str = "This is a very long card name that should test how the UI handles lengthy text content without breaking the layout or causing display issues";

    pub const STANDARD_BOARD: &str = "Test Board";
    pub const STANDARD_LIST: &str = "Test List";
    pub const STANDARD_CARD: &str = "Test Card";

    pub const PROJECT_BOARD: &str = "Project Alpha";
    pub const PERSONAL_BOARD: &str = "Personal Tasks";

    pub const PUNCTUATION: &str = "!@#$%^&*()_+-=[]{}|;:,.<>?";

    pub const KANBAN_LISTS: [&str; 3] = ["To Do", "In Progress", "Done"];
    pub const SPRINT_LISTS: [&str; 4] = ["Backlog", "Sprint", "Review", "Released"];

    pub const FULL_BOARD_NAME: &str = "Full Workflow Board";

    /// Board used by the end-to-end workflow scenario
    pub fn full_board() -> Vec<ListSpec> {
        vec![
            ListSpec::new("To Do", ["Write specs", "Design UI"]),
            ListSpec::new("In Progress", ["Build API"]),
            ListSpec::new("Done", ["Project setup", "Pick stack", "Kickoff"]),
        ]
    }

    /// Special characters from every script the visual scenarios exercise
    pub fn special_title(kind: &str) -> String {
        format!("{} {} {} Special {}", CHINESE, kind, EMOJI, SYMBOLS)
    }

    /// `count` names of the form `"{prefix} 1"`, `"{prefix} 2"`, ...
    pub fn numbered(prefix: &str, count: usize) -> Vec<String> {
        (1..=count).map(|i| format!("{} {}", prefix, i)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_list_spec_deserializes_camel_case_json() {
        let spec: ListSpec =
            serde_json::from_str(r#"{"listName":"To Do","cards":["Task 1","Task 2"]}"#).unwrap();
        assert_eq!(spec, ListSpec::new("To Do", ["Task 1", "Task 2"]));
    }

    #[test]
    fn test_numbered_names() {
        assert_eq!(data::numbered("List", 3), vec!["List 1", "List 2", "List 3"]);
        assert!(data::numbered("Card", 0).is_empty());
    }

    #[test]
    fn test_full_board_card_total() {
        let total: usize = data::full_board().iter().map(|l| l.cards.len()).sum();
        assert_eq!(total, 6);
    }
}

//! Read-only access to the application's JSON-file database
//!
//! The application persists everything in a single JSON document. The test kit
//! only ever looks at the `users` collection, to decide whether a test user
//! still needs to be signed up.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::{Error, Result};

/// A row of the `users` collection
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredUser {
    #[serde(default)]
    pub id: Option<i64>,
    pub email: String,
    #[serde(default)]
    pub password: Option<String>,
}

/// Snapshot of the users stored in the application's database file
#[derive(Debug, Clone)]
pub struct UserStore {
    path: PathBuf,
    users: Vec<StoredUser>,
}

impl UserStore {
    /// Load the `users` collection from the database file at `path`.
    ///
    /// A missing file is treated as an empty database, since the application
    /// only creates it on first write.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();

        if !path.exists() {
            debug!("Database file {} does not exist yet", path.display());
            return Ok(Self { path, users: Vec::new() });
        }

        let content = std::fs::read_to_string(&path)?;
        let document: serde_json::Value = serde_json::from_str(&content)?;

        let users = match document.get("users") {
            Some(users) => serde_json::from_value(users.clone())?,
            None => {
                return Err(Error::MissingCollection {
                    path: path.display().to_string(),
                    collection: "users".to_string(),
                })
            }
        };

        Ok(Self { path, users })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn users(&self) -> &[StoredUser] {
        &self.users
    }

    /// Whether a user with exactly this email exists
    pub fn contains_email(&self, email: &str) -> bool {
        self.users.iter().any(|u| u.email == email)
    }

    pub fn len(&self) -> usize {
        self.users.len()
    }

    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;
    use test_case::test_case;

    fn write_db(dir: &TempDir, content: &str) -> PathBuf {
        let path = dir.path().join("database.json");
        std::fs::write(&path, content).unwrap();
        path
    }

    #[test_case("filip@example.com", true ; "existing user")]
    #[test_case("FILIP@example.com", false ; "email match is exact")]
    #[test_case("nobody@example.com", false ; "unknown user")]
    fn test_contains_email(email: &str, expected: bool) {
        let dir = TempDir::new().unwrap();
        let path = write_db(
            &dir,
            r#"{"boards":[],"users":[{"id":1,"email":"filip@example.com","password":"x"}]}"#,
        );

        let store = UserStore::load(&path).unwrap();
        assert_eq!(store.contains_email(email), expected);
    }

    #[test]
    fn test_missing_file_is_empty() {
        let dir = TempDir::new().unwrap();
        let store = UserStore::load(dir.path().join("absent.json")).unwrap();
        assert!(store.is_empty());
    }

    #[test]
    fn test_missing_users_collection_is_an_error() {
        let dir = TempDir::new().unwrap();
        let path = write_db(&dir, r#"{"boards":[]}"#);

        let err = UserStore::load(&path).unwrap_err();
        assert!(matches!(err, Error::MissingCollection { .. }));
    }
}

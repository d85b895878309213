//! Project models and list payloads

use serde::{Deserialize, Serialize};

pub mod project;

pub use project::{Project, ProjectForm, ProjectStatus};

/// Reference to a user, as embedded in projects and returned by the user
/// list
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserRef {
    pub id: i64,
    pub username: String,
    #[serde(default)]
    pub email: Option<String>,
}

/// Paginated list response; only `results` is used
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Page<T> {
    #[serde(default)]
    pub count: Option<u64>,
    #[serde(default)]
    pub next: Option<String>,
    #[serde(default)]
    pub previous: Option<String>,
    pub results: Vec<T>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_requires_results_array() {
        let page: Page<UserRef> = serde_json::from_value(serde_json::json!({
            "count": 1,
            "next": null,
            "previous": null,
            "results": [{"id": 1, "username": "alice"}]
        }))
        .unwrap();
        assert_eq!(page.results[0].username, "alice");
        assert_eq!(page.results[0].email, None);

        let not_a_list =
            serde_json::from_value::<Page<UserRef>>(serde_json::json!({"results": {"id": 1}}));
        assert!(not_a_list.is_err());
    }
}

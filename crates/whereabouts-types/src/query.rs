//! Request and response bodies for the Whereabouts HTTP API.

use serde::{Deserialize, Serialize};

/// Body for `POST /save`: a free-text statement to remember.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SaveMemoryRequest {
    pub user_id: i64,
    pub text: String,
}

/// One newly stored fact in a save response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SavedItem {
    pub vector_id: String,
    pub location: String,
    pub item: String,
}

/// Successful save: composed confirmation plus the ids superseded along
/// the way and the facts that were stored.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SaveMemoryResponse {
    pub user_id: i64,
    pub success_message: String,
    pub deleted_entries: Vec<String>,
    pub items: Vec<SavedItem>,
}

/// Query parameters for `GET /retrieve`.
#[derive(Debug, Clone, Deserialize)]
pub struct RetrieveQuery {
    pub user_id: i64,
    pub text: String,
}

/// Answer for a retrieval query. `status` mirrors the HTTP status code
/// (200 if at least one target resolved, 404 otherwise).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetrieveResponse {
    pub answer: String,
    pub status: u16,
}

/// Body for `PUT /rename-location`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RenameLocationRequest {
    pub user_id: i64,
    pub vector_ids: Vec<String>,
    pub original_location: String,
    pub modified_location: String,
}

/// Body for `DELETE /delete`: remove specific facts by id.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeleteFactsRequest {
    pub user_id: i64,
    pub vector_ids: Vec<String>,
}

/// Generic status + message body (rename/delete responses).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusMessage {
    pub status: u16,
    pub message: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_save_request_deserialize() {
        let json = r#"{"user_id": 12, "text": "I kept my keys in the drawer"}"#;
        let req: SaveMemoryRequest = serde_json::from_str(json).unwrap();
        assert_eq!(req.user_id, 12);
        assert_eq!(req.text, "I kept my keys in the drawer");
    }

    #[test]
    fn test_save_response_shape() {
        let resp = SaveMemoryResponse {
            user_id: 12,
            success_message: "Keys stored in drawer.".into(),
            deleted_entries: vec!["abc".into()],
            items: vec![SavedItem {
                vector_id: "abc-2".into(),
                location: "drawer".into(),
                item: "keys".into(),
            }],
        };
        let json = serde_json::to_string(&resp).unwrap();
        assert!(json.contains("\"success_message\""));
        assert!(json.contains("\"deleted_entries\":[\"abc\"]"));
        assert!(json.contains("\"vector_id\":\"abc-2\""));
    }

    #[test]
    fn test_rename_request_deserialize() {
        let json = r#"{
            "user_id": 5,
            "vector_ids": ["a", "b"],
            "original_location": "Drawer",
            "modified_location": "Shelf"
        }"#;
        let req: RenameLocationRequest = serde_json::from_str(json).unwrap();
        assert_eq!(req.vector_ids.len(), 2);
        assert_eq!(req.modified_location, "Shelf");
    }
}

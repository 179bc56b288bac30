use serde::{Deserialize, Serialize};

/// A stored memory snippet as returned by the backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MemoryRecord {
    pub id: String,
    pub content: String,
    #[serde(default)]
    pub score: f64,
    #[serde(default)]
    pub created: String,
}

/// Response body of `GET /memories`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MemoryList {
    #[serde(default)]
    pub memories: Vec<MemoryRecord>,
}

/// Request body of `POST /memories`. The server assigns everything else.
#[derive(Debug, Clone, Serialize)]
pub struct NewMemory {
    pub content: String,
}

/// Response body of `DELETE /memories/{id}`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DeleteResponse {
    #[serde(default)]
    pub success: bool,
}

/// One hit from `GET /search/{query}`.
///
/// The backend normally wraps the record as `{memory, relevance_score}` but
/// bare records are accepted too.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "SearchResultWire")]
pub struct SearchResult {
    pub memory: MemoryRecord,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub relevance_score: Option<f64>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum SearchResultWire {
    Wrapped {
        memory: MemoryRecord,
        #[serde(default)]
        relevance_score: Option<f64>,
    },
    Bare(MemoryRecord),
}

impl From<SearchResultWire> for SearchResult {
    fn from(wire: SearchResultWire) -> Self {
        match wire {
            SearchResultWire::Wrapped {
                memory,
                relevance_score,
            } => Self {
                memory,
                relevance_score,
            },
            SearchResultWire::Bare(memory) => Self {
                memory,
                relevance_score: None,
            },
        }
    }
}

/// Response body of `GET /models`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ModelCatalog {
    #[serde(default)]
    pub available: Vec<String>,
    #[serde(default)]
    pub current: String,
}

/// Success body of `POST /models`. A refused switch comes back as a 400,
/// which the transport reports as a failed call.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ModelSwitch {
    #[serde(default)]
    pub success: bool,
    pub current: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_search_result_accepts_wrapped_hit() {
        let hit: SearchResult = serde_json::from_value(json!({
            "memory": {"id": "m1", "content": "coffee at nine", "score": 0.4, "created": "2024-05-01"},
            "relevance_score": 0.82
        }))
        .unwrap();

        assert_eq!(hit.memory.id, "m1");
        assert_eq!(hit.relevance_score, Some(0.82));
    }

    #[test]
    fn test_search_result_accepts_bare_record() {
        let hit: SearchResult = serde_json::from_value(json!({
            "id": "m2", "content": "tea at four", "score": 0.1, "created": "2024-05-02"
        }))
        .unwrap();

        assert_eq!(hit.memory.content, "tea at four");
        assert!(hit.relevance_score.is_none());
    }

    #[test]
    fn test_created_record_without_score_still_parses() {
        let record: MemoryRecord =
            serde_json::from_value(json!({"id": "m3", "content": "fresh"})).unwrap();
        assert_eq!(record.score, 0.0);
        assert!(record.created.is_empty());
    }

    #[test]
    fn test_record_without_id_is_rejected() {
        let result = serde_json::from_value::<MemoryRecord>(json!({"content": "orphan"}));
        assert!(result.is_err());
    }
}

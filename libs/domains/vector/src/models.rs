use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// A stored `(id, embedding)` pair
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VectorRecord {
    pub id: String,
    pub embedding: Vec<f32>,
}

impl VectorRecord {
    pub fn new(id: impl Into<String>, embedding: Vec<f32>) -> Self {
        Self {
            id: id.into(),
            embedding,
        }
    }

    pub fn dimension(&self) -> usize {
        self.embedding.len()
    }
}

/// One ranked hit. Serialized as `[id, score]`.
#[derive(Debug, Clone, PartialEq)]
pub struct SimilarityResult {
    pub id: String,
    pub score: f32,
}

impl Serialize for SimilarityResult {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        (&self.id, self.score).serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for SimilarityResult {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let (id, score) = <(String, f32)>::deserialize(deserializer)?;
        Ok(Self { id, score })
    }
}

/// Outcome marker shared by every response envelope
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum OperationStatus {
    Success,
    Error,
}

// ===== Request/Response DTOs =====

fn default_measure_type() -> String {
    "l2".to_string()
}

fn default_count() -> usize {
    10
}

/// `POST /insert` body: `{"data": [["doc-1", [0.1, 0.2]], ...]}`
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct InsertRequest {
    #[schema(value_type = Vec<Vec<Object>>, example = json!([["doc-1", [0.1, 0.2, 0.3]]]))]
    pub data: Vec<(String, Vec<f32>)>,
}

impl InsertRequest {
    pub fn into_records(self) -> Vec<VectorRecord> {
        self.data
            .into_iter()
            .map(|(id, embedding)| VectorRecord { id, embedding })
            .collect()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct InsertResponse {
    pub status: OperationStatus,
    pub message: String,
    pub inserted_count: usize,
}

/// `POST /search` body
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct SearchRequest {
    /// One or more query vectors; `result[i]` answers `vectors[i]`
    #[schema(example = json!([[0.1, 0.2, 0.3]]))]
    pub vectors: Vec<Vec<f32>>,

    /// `l2` (default), `cosine` or `dot`
    #[serde(default = "default_measure_type")]
    #[schema(example = "l2")]
    pub measure_type: String,

    /// Hits per query
    #[serde(default = "default_count")]
    #[schema(example = 10)]
    pub count: usize,

    /// Ranked entries skipped before taking `count`
    #[serde(default)]
    pub offset: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct SearchResponse {
    pub status: OperationStatus,
    pub message: String,
    #[schema(value_type = Vec<Vec<Vec<Object>>>, example = json!([[["doc-1", 0.93], ["doc-7", 0.41]]]))]
    pub result: Vec<Vec<SimilarityResult>>,
}

/// `POST /delete` body
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct DeleteRequest {
    #[schema(example = json!(["doc-1", "doc-7"]))]
    pub ids: Vec<String>,
}

/// Response of `/delete` and `/drop`
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct DeleteResponse {
    pub status: OperationStatus,
    pub message: String,
    pub deleted_count: u64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_insert_request_shape() {
        let req: InsertRequest =
            serde_json::from_str(r#"{"data": [["a", [1.0, 2.0]], ["b", [3.0, 4.0]]]}"#).unwrap();
        let records = req.into_records();
        assert_eq!(records.len(), 2);
        assert_eq!(records[1], VectorRecord::new("b", vec![3.0, 4.0]));
    }

    #[test]
    fn test_search_request_defaults() {
        let req: SearchRequest = serde_json::from_str(r#"{"vectors": [[1.0]]}"#).unwrap();
        assert_eq!(req.measure_type, "l2");
        assert_eq!(req.count, 10);
        assert_eq!(req.offset, 0);
    }

    #[test]
    fn test_search_request_rejects_negative_count() {
        let result: Result<SearchRequest, _> =
            serde_json::from_str(r#"{"vectors": [[1.0]], "count": -1}"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_similarity_result_is_a_pair() {
        let response = SearchResponse {
            status: OperationStatus::Success,
            message: "ok".into(),
            result: vec![vec![SimilarityResult {
                id: "a".into(),
                score: 0.5,
            }]],
        };
        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["status"], "success");
        assert_eq!(json["result"], json!([[["a", 0.5]]]));
    }
}

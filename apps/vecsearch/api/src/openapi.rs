use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    components(
        schemas(axum_helpers::ErrorResponse, axum_helpers::HealthResponse)
    ),
    info(
        title = "Vector Search API",
        version = "0.1.0",
        description = "Exact top-k similarity search over a ClickHouse-backed vector collection"
    )
)]
struct ServiceDoc;

/// Service info plus the vector routes, all mounted at the root
pub struct ApiDoc;

impl OpenApi for ApiDoc {
    fn openapi() -> utoipa::openapi::OpenApi {
        let mut doc = ServiceDoc::openapi();
        doc.merge(domain_vector::VectorApiDoc::openapi());
        doc
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_doc_lists_vector_routes() {
        let doc = ApiDoc::openapi();
        for path in ["/insert", "/search", "/delete", "/drop", "/ready"] {
            assert!(doc.paths.paths.contains_key(path), "missing {path}");
        }
        assert_eq!(doc.info.title, "Vector Search API");
    }
}

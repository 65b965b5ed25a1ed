use serde::Serialize;

/// Wire shape for insert acknowledgements (POST /tips).
#[derive(Debug, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct InsertResponse {
    pub inserted_id: String,
}

/// Wire shape for update/upsert acknowledgements, mirroring the driver's
/// result metadata the legacy API exposed.
#[derive(Debug, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MutationResponse {
    pub matched_count: u64,
    pub modified_count: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub upserted_id: Option<String>,
}

impl From<mongodb::results::UpdateResult> for MutationResponse {
    fn from(result: mongodb::results::UpdateResult) -> Self {
        MutationResponse {
            matched_count: result.matched_count,
            modified_count: result.modified_count,
            upserted_id: result
                .upserted_id
                .and_then(|id| id.as_object_id().map(|oid| oid.to_hex())),
        }
    }
}

/// Wire shape for delete acknowledgements.
#[derive(Debug, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DeleteResponse {
    pub deleted_count: u64,
}

impl From<mongodb::results::DeleteResult> for DeleteResponse {
    fn from(result: mongodb::results::DeleteResult) -> Self {
        DeleteResponse {
            deleted_count: result.deleted_count,
        }
    }
}

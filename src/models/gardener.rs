use mongodb::bson::oid::ObjectId;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum GardenerStatus {
    Active,
    Inactive,
}

/// Gardener profile (stored in MongoDB). Keyed externally by `uid`;
/// every profile attribute is independently optional.
#[derive(Debug, Clone, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Gardener {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<String>)]
    pub id: Option<ObjectId>,

    /// External identity key. Unique, immutable after creation.
    pub uid: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(rename = "photoURL", default, skip_serializing_if = "Option::is_none")]
    pub photo_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub age: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gender: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bio: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<GardenerStatus>,

    /// Free-text experience entries, user-ordered.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub experiences: Option<Vec<String>>,

    /// Informational counter maintained by the client, not derived from
    /// the tip collection.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_tips_shared: Option<i64>,
}

/// Body for POST /gardeners (upsert on first sign-in) and for
/// PUT /gardeners/{uid} where `uid` is taken from the path instead.
/// Only supplied fields are written.
#[derive(Debug, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct GardenerPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(rename = "photoURL", default, skip_serializing_if = "Option::is_none")]
    pub photo_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub age: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gender: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bio: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<GardenerStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub experiences: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_tips_shared: Option<i64>,
}

/// Body for POST /gardeners: a patch plus the mandatory identity key.
#[derive(Debug, Deserialize, utoipa::ToSchema)]
pub struct UpsertGardenerRequest {
    #[serde(default)]
    pub uid: Option<String>,
    #[serde(flatten)]
    pub profile: GardenerPatch,
}

/// Gardener as returned by the API.
#[derive(Debug, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct GardenerResponse {
    pub id: String,
    pub uid: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(rename = "photoURL", skip_serializing_if = "Option::is_none")]
    pub photo_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub age: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gender: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bio: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<GardenerStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub experiences: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_tips_shared: Option<i64>,
}

impl From<Gardener> for GardenerResponse {
    fn from(g: Gardener) -> Self {
        GardenerResponse {
            id: g.id.map(|id| id.to_hex()).unwrap_or_default(),
            uid: g.uid,
            name: g.name,
            email: g.email,
            photo_url: g.photo_url,
            age: g.age,
            gender: g.gender,
            phone: g.phone,
            address: g.address,
            bio: g.bio,
            location: g.location,
            status: g.status,
            experiences: g.experiences,
            total_tips_shared: g.total_tips_shared,
        }
    }
}

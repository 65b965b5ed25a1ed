use mongodb::bson::oid::ObjectId;
use serde::{Deserialize, Serialize};

/// How hard the tip is to follow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, utoipa::ToSchema)]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
}

/// Visibility of a tip in public listings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, utoipa::ToSchema)]
pub enum Availability {
    Public,
    Hidden,
}

/// Identity stamp written on owner updates.
#[derive(Debug, Clone, Serialize, Deserialize, utoipa::ToSchema)]
pub struct UpdatedBy {
    pub uid: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

/// Gardening tip (stored in MongoDB, camelCase on the wire).
///
/// `total_liked` mirrors the length of `liked_by`; both are only ever
/// mutated together in a single store operation.
#[derive(Debug, Clone, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Tip {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<String>)]
    pub id: Option<ObjectId>,

    pub title: String,
    pub plant_type: String,
    pub category: String,
    pub difficulty: Difficulty,
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,

    pub availability: Availability,

    /// Denormalized author identity, copied from the verified token claims
    /// at creation.
    pub user_id: String,
    pub user_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_avatar: Option<String>,

    #[serde(default)]
    pub total_liked: i64,
    #[serde(default)]
    pub liked_by: Vec<String>,

    /// Unix timestamp (seconds).
    pub created_at: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_by: Option<UpdatedBy>,
}

/// Request body for POST /tips. Author identity comes from the bearer
/// token, never from the body.
#[derive(Debug, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateTipRequest {
    pub title: String,
    pub plant_type: String,
    pub category: String,
    pub difficulty: Difficulty,
    pub description: String,
    #[serde(default)]
    pub image_url: Option<String>,
    pub availability: Availability,
}

/// Request body for PUT /tips/{id}. Only supplied fields are written.
#[derive(Debug, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateTipRequest {
    pub title: Option<String>,
    pub plant_type: Option<String>,
    pub category: Option<String>,
    pub difficulty: Option<Difficulty>,
    pub description: Option<String>,
    pub image_url: Option<String>,
    pub availability: Option<Availability>,
}

/// Tip as returned by the API, with the ObjectId rendered as hex.
#[derive(Debug, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TipResponse {
    pub id: String,
    pub title: String,
    pub plant_type: String,
    pub category: String,
    pub difficulty: Difficulty,
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    pub availability: Availability,
    pub user_id: String,
    pub user_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_avatar: Option<String>,
    pub total_liked: i64,
    pub liked_by: Vec<String>,
    pub created_at: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_by: Option<UpdatedBy>,
}

impl From<Tip> for TipResponse {
    fn from(tip: Tip) -> Self {
        TipResponse {
            id: tip.id.map(|id| id.to_hex()).unwrap_or_default(),
            title: tip.title,
            plant_type: tip.plant_type,
            category: tip.category,
            difficulty: tip.difficulty,
            description: tip.description,
            image_url: tip.image_url,
            availability: tip.availability,
            user_id: tip.user_id,
            user_name: tip.user_name,
            user_avatar: tip.user_avatar,
            total_liked: tip.total_liked,
            liked_by: tip.liked_by,
            created_at: tip.created_at,
            updated_at: tip.updated_at,
            updated_by: tip.updated_by,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tip_serializes_camel_case() {
        let tip = Tip {
            id: None,
            title: "Pruning basil".into(),
            plant_type: "Basil".into(),
            category: "Herbs".into(),
            difficulty: Difficulty::Easy,
            description: "Pinch above a leaf pair.".into(),
            image_url: None,
            availability: Availability::Public,
            user_id: "u1".into(),
            user_name: "Flora".into(),
            user_avatar: None,
            total_liked: 0,
            liked_by: vec![],
            created_at: 1_700_000_000,
            updated_at: None,
            updated_by: None,
        };

        let json = serde_json::to_value(&tip).unwrap();
        assert_eq!(json["plantType"], "Basil");
        assert_eq!(json["difficulty"], "Easy");
        assert_eq!(json["availability"], "Public");
        assert_eq!(json["totalLiked"], 0);
        assert_eq!(json["createdAt"], 1_700_000_000i64);
        // unset _id must not appear in the stored document
        assert!(json.get("_id").is_none());
        assert!(json.get("updatedAt").is_none());
    }

    #[test]
    fn tip_deserializes_with_missing_counters() {
        // Documents written before like-tracking existed have neither field
        let json = serde_json::json!({
            "title": "Water deeply",
            "plantType": "Tomato",
            "category": "Vegetables",
            "difficulty": "Medium",
            "description": "Less often, more volume.",
            "availability": "Hidden",
            "userId": "u2",
            "userName": "Sam",
            "createdAt": 1_690_000_000i64,
        });

        let tip: Tip = serde_json::from_value(json).unwrap();
        assert_eq!(tip.total_liked, 0);
        assert!(tip.liked_by.is_empty());
        assert_eq!(tip.availability, Availability::Hidden);
    }

    #[test]
    fn response_renders_object_id_as_hex() {
        let oid = ObjectId::new();
        let tip = Tip {
            id: Some(oid),
            title: "t".into(),
            plant_type: "p".into(),
            category: "c".into(),
            difficulty: Difficulty::Hard,
            description: "d".into(),
            image_url: None,
            availability: Availability::Public,
            user_id: "u".into(),
            user_name: "n".into(),
            user_avatar: None,
            total_liked: 2,
            liked_by: vec!["a".into(), "b".into()],
            created_at: 0,
            updated_at: None,
            updated_by: None,
        };

        let resp = TipResponse::from(tip);
        assert_eq!(resp.id, oid.to_hex());
        assert_eq!(resp.total_liked as usize, resp.liked_by.len());
    }
}

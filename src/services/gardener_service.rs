use futures::stream::StreamExt;
use mongodb::bson::{doc, Document};
use mongodb::Collection;

use crate::{
    database::{MongoDB, GARDENERS_COLLECTION},
    middleware::Claims,
    models::{DeleteResponse, Gardener, GardenerPatch, MutationResponse, UpsertGardenerRequest},
    utils::AppError,
};

fn gardeners(db: &MongoDB) -> Collection<Gardener> {
    db.collection::<Gardener>(GARDENERS_COLLECTION)
}

/// Optional status filter for listings.
fn list_filter(status: Option<&str>) -> Document {
    let mut filter = doc! {};
    if let Some(status) = status {
        filter.insert("status", status);
    }
    filter
}

fn patch_document(patch: &GardenerPatch) -> Result<Document, AppError> {
    mongodb::bson::to_document(patch)
        .map_err(|e| AppError::InvalidRequest(format!("unserializable profile: {}", e)))
}

/// Upserts and lookups key on the external identity alone.
fn uid_filter(uid: &str) -> Document {
    doc! { "uid": uid }
}

/// `$set` document for an upsert: the supplied fields plus the identity
/// key, so a fresh insert lands with its uid in place.
fn upsert_document(uid: &str, patch: &GardenerPatch) -> Result<Document, AppError> {
    let mut set = patch_document(patch)?;
    set.insert("uid", uid);
    Ok(doc! { "$set": set })
}

/// Upsert a profile keyed by uid. The uid must be present in the body and
/// belong to the caller; repeated calls leave exactly one record per uid.
pub async fn upsert(
    db: &MongoDB,
    request: UpsertGardenerRequest,
    user: &Claims,
) -> Result<MutationResponse, AppError> {
    let uid = request
        .uid
        .ok_or_else(|| AppError::InvalidRequest("UID is required".to_string()))?;

    if uid != user.sub {
        return Err(AppError::Forbidden(
            "uid does not match the authenticated user".to_string(),
        ));
    }

    let result = gardeners(db)
        .update_one(uid_filter(&uid), upsert_document(&uid, &request.profile)?)
        .upsert(true)
        .await?;

    Ok(result.into())
}

/// List profiles, optionally by status, in store-native order.
pub async fn list(
    db: &MongoDB,
    status: Option<&str>,
    limit: Option<i64>,
) -> Result<Vec<Gardener>, AppError> {
    let collection = gardeners(db);
    let mut find = collection.find(list_filter(status));
    if let Some(limit) = limit {
        find = find.limit(limit);
    }

    let mut cursor = find.await?;
    let mut out = Vec::new();
    while let Some(result) = cursor.next().await {
        out.push(result?);
    }
    Ok(out)
}

pub async fn get_by_uid(db: &MongoDB, uid: &str) -> Result<Gardener, AppError> {
    gardeners(db)
        .find_one(uid_filter(uid))
        .await?
        .ok_or_else(|| AppError::NotFound(format!("gardener {}", uid)))
}

/// Update the caller's own profile. Only supplied fields are written;
/// an unmatched uid is a 404, not a silent zero-rows success.
pub async fn update_by_uid(
    db: &MongoDB,
    uid: &str,
    patch: GardenerPatch,
    user: &Claims,
) -> Result<MutationResponse, AppError> {
    if uid != user.sub {
        return Err(AppError::Forbidden(
            "you can only update your own profile".to_string(),
        ));
    }

    let set = patch_document(&patch)?;
    if set.is_empty() {
        return Err(AppError::InvalidRequest("empty profile update".to_string()));
    }

    let result = gardeners(db)
        .update_one(uid_filter(uid), doc! { "$set": set })
        .await?;

    if result.matched_count == 0 {
        return Err(AppError::NotFound(format!("gardener {}", uid)));
    }

    Ok(result.into())
}

/// Delete the caller's own profile, keyed by uid like every other
/// gardener route.
pub async fn delete_by_uid(db: &MongoDB, uid: &str, user: &Claims) -> Result<DeleteResponse, AppError> {
    if uid != user.sub {
        return Err(AppError::Forbidden(
            "you can only delete your own profile".to_string(),
        ));
    }

    let result = gardeners(db).delete_one(uid_filter(uid)).await?;

    if result.deleted_count == 0 {
        return Err(AppError::NotFound(format!("gardener {}", uid)));
    }

    Ok(result.into())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::GardenerStatus;

    #[test]
    fn list_filter_is_empty_without_status() {
        assert!(list_filter(None).is_empty());

        let filter = list_filter(Some("active"));
        assert_eq!(filter.get_str("status").unwrap(), "active");
    }

    #[test]
    fn patch_document_skips_unset_fields() {
        let patch = GardenerPatch {
            name: None,
            email: None,
            photo_url: None,
            age: Some(34),
            gender: None,
            phone: None,
            address: None,
            bio: Some("Rooftop gardener".into()),
            location: None,
            status: Some(GardenerStatus::Active),
            experiences: Some(vec!["worm bin".into()]),
            total_tips_shared: None,
        };

        let doc = patch_document(&patch).unwrap();
        assert_eq!(doc.len(), 4);
        assert_eq!(doc.get_i32("age").unwrap(), 34);
        assert_eq!(doc.get_str("status").unwrap(), "active");
        assert_eq!(
            doc.get_array("experiences").unwrap().len(),
            1
        );
        assert!(!doc.contains_key("name"));
        // patches can never rewrite the identity key
        assert!(!doc.contains_key("uid"));
    }

    #[test]
    fn upsert_filter_keys_on_uid_alone() {
        let filter = uid_filter("g1");
        assert_eq!(filter.len(), 1);
        assert_eq!(filter.get_str("uid").unwrap(), "g1");
    }

    #[test]
    fn upsert_document_carries_uid_plus_supplied_fields() {
        let patch = GardenerPatch {
            name: Some("Sam".into()),
            email: None,
            photo_url: None,
            age: None,
            gender: None,
            phone: None,
            address: None,
            bio: None,
            location: None,
            status: Some(GardenerStatus::Inactive),
            experiences: None,
            total_tips_shared: None,
        };

        let update = upsert_document("g1", &patch).unwrap();
        let set = update.get_document("$set").unwrap();

        assert_eq!(set.len(), 3);
        assert_eq!(set.get_str("uid").unwrap(), "g1");
        assert_eq!(set.get_str("name").unwrap(), "Sam");
        assert_eq!(set.get_str("status").unwrap(), "inactive");
        assert!(!set.contains_key("email"));
    }
}

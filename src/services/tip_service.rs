use futures::stream::StreamExt;
use mongodb::bson::{doc, oid::ObjectId, Document};
use mongodb::Collection;

use crate::{
    database::{MongoDB, TIPS_COLLECTION},
    middleware::Claims,
    models::{CreateTipRequest, DeleteResponse, InsertResponse, MutationResponse, Tip, UpdateTipRequest},
    utils::AppError,
};

pub const DEFAULT_LIST_LIMIT: i64 = 20;
pub const DEFAULT_SAMPLE_LIMIT: i64 = 3;

fn tips(db: &MongoDB) -> Collection<Tip> {
    db.collection::<Tip>(TIPS_COLLECTION)
}

/// A non-positive limit falls back to the default; limit(0) would mean
/// "unbounded" to the store, not "default page".
fn effective_limit(limit: Option<i64>, default: i64) -> i64 {
    limit.filter(|l| *l > 0).unwrap_or(default)
}

/// Parse a path id into an ObjectId before any store round-trip.
fn parse_tip_id(id: &str) -> Result<ObjectId, AppError> {
    ObjectId::parse_str(id)
        .map_err(|_| AppError::InvalidRequest(format!("invalid tip id format: {}", id)))
}

/// Filter for the public feed: availability is always pinned to Public,
/// optional category/difficulty narrow it further.
fn public_filter(category: Option<&str>, difficulty: Option<&str>) -> Document {
    let mut filter = doc! { "availability": "Public" };
    if let Some(category) = category {
        filter.insert("category", category);
    }
    if let Some(difficulty) = difficulty {
        filter.insert("difficulty", difficulty);
    }
    filter
}

/// Filter that only matches when `user_id` has not liked the tip yet.
/// Pairing it with [`like_update`] makes the membership check and the
/// mutation a single atomic store call.
fn like_filter(id: ObjectId, user_id: &str) -> Document {
    doc! { "_id": id, "likedBy": { "$ne": user_id } }
}

fn like_update(user_id: &str) -> Document {
    doc! {
        "$inc": { "totalLiked": 1 },
        "$push": { "likedBy": user_id },
    }
}

/// Ownership-scoped match: id and author travel in the same predicate,
/// never as a separate check-then-act step.
fn owned_filter(id: ObjectId, user_id: &str) -> Document {
    doc! { "_id": id, "userId": user_id }
}

/// `$set` document for an owner update: supplied fields plus the audit stamp.
fn update_document(patch: &UpdateTipRequest, editor: &Claims, now: i64) -> Document {
    let mut set = doc! {
        "updatedAt": now,
        "updatedBy": { "uid": &editor.sub, "name": editor.name.as_deref().unwrap_or_default() },
    };

    if let Some(title) = &patch.title {
        set.insert("title", title);
    }
    if let Some(plant_type) = &patch.plant_type {
        set.insert("plantType", plant_type);
    }
    if let Some(category) = &patch.category {
        set.insert("category", category);
    }
    if let Some(difficulty) = &patch.difficulty {
        set.insert(
            "difficulty",
            mongodb::bson::to_bson(difficulty).unwrap_or_default(),
        );
    }
    if let Some(description) = &patch.description {
        set.insert("description", description);
    }
    if let Some(image_url) = &patch.image_url {
        set.insert("imageUrl", image_url);
    }
    if let Some(availability) = &patch.availability {
        set.insert(
            "availability",
            mongodb::bson::to_bson(availability).unwrap_or_default(),
        );
    }

    doc! { "$set": set }
}

async fn collect_tips(mut cursor: mongodb::Cursor<Tip>) -> Result<Vec<Tip>, AppError> {
    let mut out = Vec::new();
    while let Some(result) = cursor.next().await {
        out.push(result?);
    }
    Ok(out)
}

/// Insert a new tip. Author identity comes from the verified claims;
/// engagement counters start empty.
pub async fn create(
    db: &MongoDB,
    request: CreateTipRequest,
    author: &Claims,
) -> Result<InsertResponse, AppError> {
    let tip = Tip {
        id: None,
        title: request.title,
        plant_type: request.plant_type,
        category: request.category,
        difficulty: request.difficulty,
        description: request.description,
        image_url: request.image_url,
        availability: request.availability,
        user_id: author.sub.clone(),
        user_name: author.name.clone().unwrap_or_default(),
        user_avatar: author.picture.clone(),
        total_liked: 0,
        liked_by: vec![],
        created_at: chrono::Utc::now().timestamp(),
        updated_at: None,
        updated_by: None,
    };

    let result = tips(db).insert_one(&tip).await?;

    Ok(InsertResponse {
        inserted_id: result
            .inserted_id
            .as_object_id()
            .map(|id| id.to_hex())
            .unwrap_or_default(),
    })
}

/// Public feed: only Public tips, newest first.
pub async fn list_public(
    db: &MongoDB,
    category: Option<&str>,
    difficulty: Option<&str>,
    limit: Option<i64>,
) -> Result<Vec<Tip>, AppError> {
    let cursor = tips(db)
        .find(public_filter(category, difficulty))
        .sort(doc! { "createdAt": -1 })
        .limit(effective_limit(limit, DEFAULT_LIST_LIMIT))
        .await?;

    collect_tips(cursor).await
}

/// Detail view. Returns the record regardless of availability; the client
/// only links here from listings it is allowed to see.
pub async fn get_by_id(db: &MongoDB, id: &str) -> Result<Tip, AppError> {
    let oid = parse_tip_id(id)?;

    tips(db)
        .find_one(doc! { "_id": oid })
        .await?
        .ok_or_else(|| AppError::NotFound(format!("tip {}", id)))
}

/// All tips by one author, any availability, newest first.
pub async fn list_by_author(db: &MongoDB, user_id: &str) -> Result<Vec<Tip>, AppError> {
    let cursor = tips(db)
        .find(doc! { "userId": user_id })
        .sort(doc! { "createdAt": -1 })
        .await?;

    collect_tips(cursor).await
}

/// Record a like, at most once per user. The filter re-checks membership
/// inside the update, so two concurrent likers can never both count and a
/// repeat liker can never match.
pub async fn like(db: &MongoDB, id: &str, user: &Claims) -> Result<MutationResponse, AppError> {
    let oid = parse_tip_id(id)?;
    let collection = tips(db);

    let result = collection
        .update_one(like_filter(oid, &user.sub), like_update(&user.sub))
        .await?;

    if result.matched_count == 0 {
        // Zero matches means either the tip is gone or this user already
        // liked it; one lookup tells the two apart.
        return match collection.find_one(doc! { "_id": oid }).await? {
            Some(_) => Err(AppError::AlreadyLiked),
            None => Err(AppError::NotFound(format!("tip {}", id))),
        };
    }

    Ok(result.into())
}

/// Owner-scoped update. Zero matches are promoted to an explicit error
/// instead of the legacy zero-rows success.
pub async fn update(
    db: &MongoDB,
    id: &str,
    patch: UpdateTipRequest,
    user: &Claims,
) -> Result<MutationResponse, AppError> {
    let oid = parse_tip_id(id)?;
    let collection = tips(db);

    let update = update_document(&patch, user, chrono::Utc::now().timestamp());
    let result = collection
        .update_one(owned_filter(oid, &user.sub), update)
        .await?;

    if result.matched_count == 0 {
        return Err(classify_zero_match(&collection, oid, id).await?);
    }

    Ok(result.into())
}

/// Owner-scoped delete, same contract as [`update`].
pub async fn delete(db: &MongoDB, id: &str, user: &Claims) -> Result<DeleteResponse, AppError> {
    let oid = parse_tip_id(id)?;
    let collection = tips(db);

    let result = collection.delete_one(owned_filter(oid, &user.sub)).await?;

    if result.deleted_count == 0 {
        return Err(classify_zero_match(&collection, oid, id).await?);
    }

    Ok(result.into())
}

/// Tell apart "tip missing" and "tip owned by someone else" after an
/// ownership-scoped mutation matched nothing.
async fn classify_zero_match(
    collection: &Collection<Tip>,
    oid: ObjectId,
    id: &str,
) -> Result<AppError, AppError> {
    Ok(match collection.find_one(doc! { "_id": oid }).await? {
        Some(_) => AppError::Forbidden("you do not own this tip".to_string()),
        None => AppError::NotFound(format!("tip {}", id)),
    })
}

/// Pseudo-random sample of the public feed, no repeats within one call.
pub async fn random_sample(db: &MongoDB, limit: Option<i64>) -> Result<Vec<Tip>, AppError> {
    let pipeline = vec![
        doc! { "$match": { "availability": "Public" } },
        doc! { "$sample": { "size": effective_limit(limit, DEFAULT_SAMPLE_LIMIT) } },
    ];

    let mut cursor = db
        .collection::<Document>(TIPS_COLLECTION)
        .aggregate(pipeline)
        .await?;

    let mut out = Vec::new();
    while let Some(result) = cursor.next().await {
        let document = result?;
        match mongodb::bson::from_document::<Tip>(document) {
            Ok(tip) => out.push(tip),
            Err(e) => log::warn!("skipping malformed tip document in sample: {}", e),
        }
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Availability, Difficulty};

    fn claims(uid: &str, name: Option<&str>) -> Claims {
        Claims {
            sub: uid.into(),
            name: name.map(String::from),
            picture: None,
            exp: 0,
        }
    }

    #[test]
    fn public_filter_always_pins_availability() {
        let filter = public_filter(None, None);
        assert_eq!(filter.get_str("availability").unwrap(), "Public");

        let filter = public_filter(Some("Herbs"), Some("Easy"));
        assert_eq!(filter.get_str("availability").unwrap(), "Public");
        assert_eq!(filter.get_str("category").unwrap(), "Herbs");
        assert_eq!(filter.get_str("difficulty").unwrap(), "Easy");
    }

    #[test]
    fn like_filter_excludes_previous_likers() {
        let oid = ObjectId::new();
        let filter = like_filter(oid, "u1");
        assert_eq!(filter.get_object_id("_id").unwrap(), oid);
        assert_eq!(
            filter.get_document("likedBy").unwrap().get_str("$ne").unwrap(),
            "u1"
        );
    }

    #[test]
    fn like_update_increments_and_appends_together() {
        let update = like_update("u1");
        assert_eq!(
            update.get_document("$inc").unwrap().get_i32("totalLiked").unwrap(),
            1
        );
        assert_eq!(
            update.get_document("$push").unwrap().get_str("likedBy").unwrap(),
            "u1"
        );
    }

    #[test]
    fn owned_filter_carries_id_and_author() {
        let oid = ObjectId::new();
        let filter = owned_filter(oid, "u1");
        assert_eq!(filter.get_object_id("_id").unwrap(), oid);
        assert_eq!(filter.get_str("userId").unwrap(), "u1");
    }

    #[test]
    fn update_document_sets_only_supplied_fields_plus_audit() {
        let patch = UpdateTipRequest {
            title: Some("New title".into()),
            plant_type: None,
            category: None,
            difficulty: Some(Difficulty::Hard),
            description: None,
            image_url: None,
            availability: Some(Availability::Hidden),
        };

        let update = update_document(&patch, &claims("u1", Some("Flora")), 1_700_000_000);
        let set = update.get_document("$set").unwrap();

        assert_eq!(set.get_str("title").unwrap(), "New title");
        assert_eq!(set.get_str("difficulty").unwrap(), "Hard");
        assert_eq!(set.get_str("availability").unwrap(), "Hidden");
        assert_eq!(set.get_i64("updatedAt").unwrap(), 1_700_000_000);

        let updated_by = set.get_document("updatedBy").unwrap();
        assert_eq!(updated_by.get_str("uid").unwrap(), "u1");
        assert_eq!(updated_by.get_str("name").unwrap(), "Flora");

        assert!(!set.contains_key("plantType"));
        assert!(!set.contains_key("description"));
        // counters are never writable through a patch
        assert!(!set.contains_key("totalLiked"));
        assert!(!set.contains_key("likedBy"));
    }

    #[test]
    fn non_positive_limits_fall_back_to_the_default() {
        assert_eq!(effective_limit(None, DEFAULT_LIST_LIMIT), DEFAULT_LIST_LIMIT);
        assert_eq!(effective_limit(Some(0), DEFAULT_LIST_LIMIT), DEFAULT_LIST_LIMIT);
        assert_eq!(effective_limit(Some(-5), DEFAULT_SAMPLE_LIMIT), DEFAULT_SAMPLE_LIMIT);
        assert_eq!(effective_limit(Some(10), DEFAULT_LIST_LIMIT), 10);
    }

    #[test]
    fn malformed_ids_fail_before_any_store_call() {
        assert!(matches!(
            parse_tip_id("not-an-object-id"),
            Err(AppError::InvalidRequest(_))
        ));
        assert!(parse_tip_id(&ObjectId::new().to_hex()).is_ok());
    }
}

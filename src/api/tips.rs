use actix_web::{web, HttpResponse};
use serde::Deserialize;

use crate::{
    database::MongoDB,
    middleware::Claims,
    models::{CreateTipRequest, TipResponse, UpdateTipRequest},
    services::tip_service,
    utils::AppError,
};

#[derive(Debug, Deserialize, utoipa::IntoParams)]
pub struct TipListQuery {
    pub category: Option<String>,
    pub difficulty: Option<String>,
    pub limit: Option<i64>,
}

#[derive(Debug, Deserialize, utoipa::IntoParams)]
pub struct RandomQuery {
    pub limit: Option<i64>,
}

#[derive(Debug, Deserialize, utoipa::IntoParams)]
#[serde(rename_all = "camelCase")]
pub struct DeleteTipQuery {
    /// Legacy parameter kept for client compatibility; when present it must
    /// match the verified identity.
    pub user_id: Option<String>,
}

/// POST /tips - create a tip authored by the verified caller
#[utoipa::path(
    post,
    path = "/tips",
    tag = "Tips",
    request_body = CreateTipRequest,
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Tip created", body = crate::models::InsertResponse),
        (status = 401, description = "Missing or invalid token"),
    )
)]
pub async fn create_tip(
    user: Claims,
    db: web::Data<MongoDB>,
    body: web::Json<CreateTipRequest>,
) -> Result<HttpResponse, AppError> {
    log::info!("🌱 POST /tips - new tip by {}", user.sub);

    let result = tip_service::create(&db, body.into_inner(), &user).await?;
    Ok(HttpResponse::Ok().json(result))
}

/// GET /tips - public feed, newest first
#[utoipa::path(
    get,
    path = "/tips",
    tag = "Tips",
    params(TipListQuery),
    responses(
        (status = 200, description = "Public tips, newest first", body = [TipResponse]),
    )
)]
pub async fn list_public_tips(
    db: web::Data<MongoDB>,
    query: web::Query<TipListQuery>,
) -> Result<HttpResponse, AppError> {
    let tips = tip_service::list_public(
        &db,
        query.category.as_deref(),
        query.difficulty.as_deref(),
        query.limit,
    )
    .await?;

    let tips: Vec<TipResponse> = tips.into_iter().map(TipResponse::from).collect();
    Ok(HttpResponse::Ok().json(tips))
}

/// GET /tips/random - random public sample
#[utoipa::path(
    get,
    path = "/tips/random",
    tag = "Tips",
    params(RandomQuery),
    responses(
        (status = 200, description = "Random public tips", body = [TipResponse]),
    )
)]
pub async fn random_tips(
    db: web::Data<MongoDB>,
    query: web::Query<RandomQuery>,
) -> Result<HttpResponse, AppError> {
    let tips = tip_service::random_sample(&db, query.limit).await?;

    let tips: Vec<TipResponse> = tips.into_iter().map(TipResponse::from).collect();
    Ok(HttpResponse::Ok().json(tips))
}

/// GET /tips/{id} - detail view, any availability
#[utoipa::path(
    get,
    path = "/tips/{id}",
    tag = "Tips",
    params(("id" = String, Path, description = "Tip ObjectId")),
    responses(
        (status = 200, description = "Tip", body = TipResponse),
        (status = 400, description = "Malformed id"),
        (status = 404, description = "Tip not found"),
    )
)]
pub async fn get_tip(
    db: web::Data<MongoDB>,
    path: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    let tip = tip_service::get_by_id(&db, &path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(TipResponse::from(tip)))
}

/// PATCH /tips/{id}/like - like once per user
#[utoipa::path(
    patch,
    path = "/tips/{id}/like",
    tag = "Tips",
    params(("id" = String, Path, description = "Tip ObjectId")),
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Like recorded", body = crate::models::MutationResponse),
        (status = 400, description = "Malformed id or already liked"),
        (status = 404, description = "Tip not found"),
    )
)]
pub async fn like_tip(
    user: Claims,
    db: web::Data<MongoDB>,
    path: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    let id = path.into_inner();
    log::info!("👍 PATCH /tips/{}/like by {}", id, user.sub);

    let result = tip_service::like(&db, &id, &user).await?;
    Ok(HttpResponse::Ok().json(result))
}

/// GET /gardeners/{userId}/tips - all tips by one author
#[utoipa::path(
    get,
    path = "/gardeners/{userId}/tips",
    tag = "Tips",
    params(("userId" = String, Path, description = "Author uid")),
    responses(
        (status = 200, description = "Author's tips, newest first", body = [TipResponse]),
    )
)]
pub async fn list_author_tips(
    db: web::Data<MongoDB>,
    path: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    let tips = tip_service::list_by_author(&db, &path.into_inner()).await?;

    let tips: Vec<TipResponse> = tips.into_iter().map(TipResponse::from).collect();
    Ok(HttpResponse::Ok().json(tips))
}

/// PUT /tips/{id} - owner-only update
#[utoipa::path(
    put,
    path = "/tips/{id}",
    tag = "Tips",
    params(("id" = String, Path, description = "Tip ObjectId")),
    request_body = UpdateTipRequest,
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Tip updated", body = crate::models::MutationResponse),
        (status = 403, description = "Not the owner"),
        (status = 404, description = "Tip not found"),
    )
)]
pub async fn update_tip(
    user: Claims,
    db: web::Data<MongoDB>,
    path: web::Path<String>,
    body: web::Json<UpdateTipRequest>,
) -> Result<HttpResponse, AppError> {
    let id = path.into_inner();
    log::info!("✏️  PUT /tips/{} by {}", id, user.sub);

    let result = tip_service::update(&db, &id, body.into_inner(), &user).await?;
    Ok(HttpResponse::Ok().json(result))
}

/// DELETE /tips/{id} - owner-only delete
#[utoipa::path(
    delete,
    path = "/tips/{id}",
    tag = "Tips",
    params(("id" = String, Path, description = "Tip ObjectId"), DeleteTipQuery),
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Tip deleted", body = crate::models::DeleteResponse),
        (status = 403, description = "Not the owner"),
        (status = 404, description = "Tip not found"),
    )
)]
pub async fn delete_tip(
    user: Claims,
    db: web::Data<MongoDB>,
    path: web::Path<String>,
    query: web::Query<DeleteTipQuery>,
) -> Result<HttpResponse, AppError> {
    let id = path.into_inner();

    if let Some(claimed) = &query.user_id {
        if claimed != &user.sub {
            return Err(AppError::Forbidden(
                "userId does not match the authenticated user".to_string(),
            ));
        }
    }

    log::info!("🗑️  DELETE /tips/{} by {}", id, user.sub);

    let result = tip_service::delete(&db, &id, &user).await?;
    Ok(HttpResponse::Ok().json(result))
}

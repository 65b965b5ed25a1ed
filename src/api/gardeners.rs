use actix_web::{web, HttpResponse};
use serde::Deserialize;

use crate::{
    database::MongoDB,
    middleware::Claims,
    models::{GardenerPatch, GardenerResponse, UpsertGardenerRequest},
    services::gardener_service,
    utils::AppError,
};

#[derive(Debug, Deserialize, utoipa::IntoParams)]
pub struct GardenerListQuery {
    pub status: Option<String>,
    pub limit: Option<i64>,
}

/// POST /gardeners - upsert the caller's profile (first sign-in and edits)
#[utoipa::path(
    post,
    path = "/gardeners",
    tag = "Gardeners",
    request_body = UpsertGardenerRequest,
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Profile upserted", body = crate::models::MutationResponse),
        (status = 400, description = "UID is required"),
        (status = 403, description = "UID belongs to another user"),
    )
)]
pub async fn upsert_gardener(
    user: Claims,
    db: web::Data<MongoDB>,
    body: web::Json<UpsertGardenerRequest>,
) -> Result<HttpResponse, AppError> {
    log::info!("🪴 POST /gardeners - upsert by {}", user.sub);

    let result = gardener_service::upsert(&db, body.into_inner(), &user).await?;
    Ok(HttpResponse::Ok().json(result))
}

/// GET /gardeners - list profiles, optionally by status
#[utoipa::path(
    get,
    path = "/gardeners",
    tag = "Gardeners",
    params(GardenerListQuery),
    responses(
        (status = 200, description = "Gardener profiles", body = [GardenerResponse]),
    )
)]
pub async fn list_gardeners(
    db: web::Data<MongoDB>,
    query: web::Query<GardenerListQuery>,
) -> Result<HttpResponse, AppError> {
    let gardeners = gardener_service::list(&db, query.status.as_deref(), query.limit).await?;

    let gardeners: Vec<GardenerResponse> =
        gardeners.into_iter().map(GardenerResponse::from).collect();
    Ok(HttpResponse::Ok().json(gardeners))
}

/// GET /gardeners/{uid} - single profile
#[utoipa::path(
    get,
    path = "/gardeners/{uid}",
    tag = "Gardeners",
    params(("uid" = String, Path, description = "External identity key")),
    responses(
        (status = 200, description = "Gardener profile", body = GardenerResponse),
        (status = 404, description = "Gardener not found"),
    )
)]
pub async fn get_gardener(
    db: web::Data<MongoDB>,
    path: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    let gardener = gardener_service::get_by_uid(&db, &path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(GardenerResponse::from(gardener)))
}

/// PUT /gardeners/{uid} - update the caller's own profile
#[utoipa::path(
    put,
    path = "/gardeners/{uid}",
    tag = "Gardeners",
    params(("uid" = String, Path, description = "External identity key")),
    request_body = GardenerPatch,
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Profile updated", body = crate::models::MutationResponse),
        (status = 403, description = "Not the caller's profile"),
        (status = 404, description = "Gardener not found"),
    )
)]
pub async fn update_gardener(
    user: Claims,
    db: web::Data<MongoDB>,
    path: web::Path<String>,
    body: web::Json<GardenerPatch>,
) -> Result<HttpResponse, AppError> {
    let uid = path.into_inner();
    log::info!("✏️  PUT /gardeners/{} by {}", uid, user.sub);

    let result = gardener_service::update_by_uid(&db, &uid, body.into_inner(), &user).await?;
    Ok(HttpResponse::Ok().json(result))
}

/// DELETE /gardeners/{id} - delete the caller's own profile (keyed by uid)
#[utoipa::path(
    delete,
    path = "/gardeners/{id}",
    tag = "Gardeners",
    params(("id" = String, Path, description = "External identity key")),
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Profile deleted", body = crate::models::DeleteResponse),
        (status = 403, description = "Not the caller's profile"),
        (status = 404, description = "Gardener not found"),
    )
)]
pub async fn delete_gardener(
    user: Claims,
    db: web::Data<MongoDB>,
    path: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    let uid = path.into_inner();
    log::info!("🗑️  DELETE /gardeners/{} by {}", uid, user.sub);

    let result = gardener_service::delete_by_uid(&db, &uid, &user).await?;
    Ok(HttpResponse::Ok().json(result))
}

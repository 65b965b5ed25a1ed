use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Garden Hub API",
        version = "1.0.0",
        description = "REST backend for the Garden Hub community gardening platform.\n\n**Authentication:** mutating endpoints require a bearer token from the identity provider; ownership checks use the verified `sub` claim.",
    ),
    paths(
        // Health
        crate::api::health::health_check,

        // Gardeners
        crate::api::gardeners::upsert_gardener,
        crate::api::gardeners::list_gardeners,
        crate::api::gardeners::get_gardener,
        crate::api::gardeners::update_gardener,
        crate::api::gardeners::delete_gardener,

        // Tips
        crate::api::tips::create_tip,
        crate::api::tips::list_public_tips,
        crate::api::tips::random_tips,
        crate::api::tips::get_tip,
        crate::api::tips::like_tip,
        crate::api::tips::list_author_tips,
        crate::api::tips::update_tip,
        crate::api::tips::delete_tip,
    ),
    components(
        schemas(
            crate::api::health::HealthResponse,
            crate::models::Tip,
            crate::models::TipResponse,
            crate::models::CreateTipRequest,
            crate::models::UpdateTipRequest,
            crate::models::Difficulty,
            crate::models::Availability,
            crate::models::UpdatedBy,
            crate::models::Gardener,
            crate::models::GardenerResponse,
            crate::models::GardenerPatch,
            crate::models::UpsertGardenerRequest,
            crate::models::GardenerStatus,
            crate::models::InsertResponse,
            crate::models::MutationResponse,
            crate::models::DeleteResponse,
        )
    ),
    tags(
        (name = "Health", description = "Service status."),
        (name = "Gardeners", description = "Gardener profiles keyed by external identity (uid)."),
        (name = "Tips", description = "Gardening tips: public feed, detail, likes, owner-scoped mutation."),
    ),
    modifiers(&SecurityAddon)
)]
pub struct ApiDoc;

struct SecurityAddon;

impl utoipa::Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .description(Some("Identity provider bearer token"))
                        .build(),
                ),
            );
        }
    }
}

mod api;
mod database;
mod middleware;
mod models;
mod services;
mod utils;

use actix_cors::Cors;
use actix_web::{middleware::Logger, web, App, HttpServer};
use dotenv::dotenv;
use std::env;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // Load environment variables
    dotenv().ok();

    // Initialize logger
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    // Get configuration from environment
    let host = env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
    let port = env::var("PORT").unwrap_or_else(|_| "5000".to_string());
    let database_url = env::var("MONGODB_URL").expect("MONGODB_URL must be set");

    log::info!("🌿 Starting Garden Hub Service...");

    // Initialize MongoDB connection
    let db = database::MongoDB::new(&database_url)
        .await
        .expect("Failed to connect to MongoDB");

    let db_data = web::Data::new(db);

    log::info!("✅ MongoDB connected successfully");
    log::info!("🌐 Server starting on {}:{}", host, port);
    log::info!("📚 Swagger UI available at: http://{}:{}/swagger-ui/", host, port);

    // Start HTTP server
    HttpServer::new(move || {
        let cors = Cors::default()
            .allowed_origin("http://localhost:5173") // Vite dev server
            .allowed_origin("http://localhost:4173")
            .allowed_origin("http://127.0.0.1:5173")
            .allowed_methods(vec!["GET", "POST", "PUT", "PATCH", "DELETE", "OPTIONS"])
            .allowed_headers(vec![
                actix_web::http::header::AUTHORIZATION,
                actix_web::http::header::CONTENT_TYPE,
                actix_web::http::header::ACCEPT,
            ])
            .supports_credentials()
            .max_age(3600);

        // Generate OpenAPI specification
        let openapi = api::swagger::ApiDoc::openapi();

        App::new()
            .app_data(db_data.clone())
            .wrap(cors)
            .wrap(Logger::default())
            .service(
                SwaggerUi::new("/swagger-ui/{_:.*}")
                    .url("/api-docs/openapi.json", openapi.clone()),
            )
            .route("/", web::get().to(api::health::root))
            .route("/health", web::get().to(api::health::health_check))
            .service(
                web::scope("/gardeners")
                    .route("", web::post().to(api::gardeners::upsert_gardener))
                    .route("", web::get().to(api::gardeners::list_gardeners))
                    .route("/{userId}/tips", web::get().to(api::tips::list_author_tips))
                    .route("/{uid}", web::get().to(api::gardeners::get_gardener))
                    .route("/{uid}", web::put().to(api::gardeners::update_gardener))
                    .route("/{uid}", web::delete().to(api::gardeners::delete_gardener)),
            )
            .service(
                web::scope("/tips")
                    // /random must register before the /{id} catch-all
                    .route("/random", web::get().to(api::tips::random_tips))
                    .route("", web::post().to(api::tips::create_tip))
                    .route("", web::get().to(api::tips::list_public_tips))
                    .route("/{id}/like", web::patch().to(api::tips::like_tip))
                    .route("/{id}", web::get().to(api::tips::get_tip))
                    .route("/{id}", web::put().to(api::tips::update_tip))
                    .route("/{id}", web::delete().to(api::tips::delete_tip)),
            )
    })
    .bind(format!("{}:{}", host, port))?
    .run()
    .await
}

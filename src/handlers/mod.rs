pub mod generation_handlers;
pub mod outline_handlers;
pub mod presentation_handlers;

use std::sync::Arc;

use actix_web::{HttpResponse, http::Method, middleware::DefaultHeaders, web};

use crate::generation::Orchestrator;
use crate::providers::OutlineGenerator;
use crate::store::SlideStore;

/// Process-wide collaborators, built once at startup and shared by every
/// worker.
pub struct AppState {
    pub orchestrator: Arc<Orchestrator>,
    pub store: Arc<dyn SlideStore>,
    pub outlines: Arc<dyn OutlineGenerator>,
}

/// CORS headers matching what browser clients of the edge API expect.
pub fn cors_headers() -> DefaultHeaders {
    DefaultHeaders::new()
        .add(("Access-Control-Allow-Origin", "*"))
        .add((
            "Access-Control-Allow-Headers",
            "authorization, x-client-info, apikey, content-type",
        ))
        .add(("Access-Control-Allow-Methods", "GET, POST, PATCH, OPTIONS"))
}

async fn preflight() -> HttpResponse {
    HttpResponse::Ok().finish()
}

fn preflight_route() -> actix_web::Route {
    web::method(Method::OPTIONS).to(preflight)
}

/// Configure `/api` routes. Every resource also answers CORS preflight.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api")
            .service(
                web::resource("/generate-outline")
                    .route(web::post().to(outline_handlers::generate))
                    .route(preflight_route()),
            )
            .service(
                web::resource("/generate-slides")
                    .route(web::post().to(generation_handlers::generate_slides))
                    .route(preflight_route()),
            )
            .service(
                web::resource("/presentations")
                    .route(web::get().to(presentation_handlers::list))
                    .route(preflight_route()),
            )
            .service(
                web::resource("/presentations/{id}")
                    .route(web::get().to(presentation_handlers::read))
                    .route(preflight_route()),
            )
            .service(
                web::resource("/slides/{id}")
                    .route(web::patch().to(presentation_handlers::update_slide))
                    .route(preflight_route()),
            ),
    );
}

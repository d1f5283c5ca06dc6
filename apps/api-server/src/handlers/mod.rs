//! HTTP handlers and route configuration.

mod auth;
mod health;
mod posts;
mod webhook;

use actix_web::web;

/// Configure all application routes.
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api")
            // Public routes
            .route("/health", web::get().to(health::health_check))
            .service(web::scope("/auth").route("/login", web::post().to(auth::login)))
            // WhatsApp webhook
            .service(
                web::resource("/webhook/whatsapp")
                    .route(web::get().to(webhook::verify))
                    .route(web::post().to(webhook::receive)),
            )
            // Management routes (Bearer token)
            .service(
                web::scope("/posts")
                    .route("", web::get().to(posts::list))
                    .route("", web::post().to(posts::create))
                    .route("/{id}", web::get().to(posts::get))
                    .route("/{id}/approve", web::post().to(posts::approve))
                    .route("/{id}/reject", web::post().to(posts::reject))
                    .route("/{id}/regenerate", web::post().to(posts::regenerate)),
            ),
    );
}

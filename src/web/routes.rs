use actix_web::web;
use crate::web::handlers;

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.app_data(handlers::json_config())
        .route("/", web::get().to(handlers::index))
        .route("/health", web::get().to(handlers::health_check))
        .route("/chatbot/message", web::post().to(handlers::chat))
        .route("/register", web::post().to(handlers::register))
        .route("/login", web::post().to(handlers::login))
        .route("/save-data", web::post().to(handlers::save_data))
        .service(
            web::scope("/chatbots")
                .route("", web::get().to(handlers::list_chatbots))
                .route("/{id}", web::get().to(handlers::get_chatbot)),
        );
}

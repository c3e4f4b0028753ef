//! HTTP driver for local runs: `POST /gen` feeds the raw body to the
//! dispatcher as a proxy event and replays the gateway response verbatim.

use crate::{dispatcher::RequestDispatcher, models::GatewayResponse};
use actix_web::{
    http::StatusCode, middleware::Logger, web, App, HttpResponse, HttpServer,
};
use serde_json::json;
use std::sync::Arc;

pub const DEFAULT_PORT: u16 = 8080;

pub async fn run(dispatcher: Arc<RequestDispatcher>, port: u16) -> std::io::Result<()> {
    let bind_addr = format!("0.0.0.0:{}", port);
    log::info!("🌐 Starting HTTP server on {}", bind_addr);

    let state = web::Data::from(dispatcher);
    HttpServer::new(move || {
        App::new()
            .app_data(state.clone())
            .wrap(Logger::default())
            .configure(configure_routes)
    })
    .bind(&bind_addr)?
    .run()
    .await?;

    log::info!("HTTP server stopped");
    Ok(())
}

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.route("/gen", web::post().to(generate))
        .route("/health", web::get().to(health_check));
}

async fn generate(dispatcher: web::Data<RequestDispatcher>, body: String) -> HttpResponse {
    let event = json!({ "body": body });
    into_http(dispatcher.handle(&event).await)
}

async fn health_check() -> HttpResponse {
    HttpResponse::Ok().json(json!({
        "status": "healthy",
        "timestamp": chrono::Utc::now().to_rfc3339(),
        "version": env!("CARGO_PKG_VERSION")
    }))
}

fn into_http(response: GatewayResponse) -> HttpResponse {
    let status =
        StatusCode::from_u16(response.status_code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    let mut builder = HttpResponse::build(status);
    for (name, value) in &response.headers {
        builder.insert_header((name.as_str(), value.as_str()));
    }
    builder.body(response.body)
}

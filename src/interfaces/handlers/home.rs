use actix_web::{get, HttpResponse, Responder};

#[get("/")]
pub async fn home() -> impl Responder {
    HttpResponse::Ok().json(serde_json::json!({
        "message": "TLC vehicle and plate rental listings",
        "status": "Ok",
        "version": env!("CARGO_PKG_VERSION"),
        "health": "/health",
        "api": "/api/v1"
    }))
}

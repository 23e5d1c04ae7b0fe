use actix_web::web;

use crate::handlers::payments;

pub fn config_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/payments")
            .service(
                web::resource("/check-requirement")
                    .route(web::get().to(payments::check_requirement))
            )
            .service(
                web::resource("/subscription-info")
                    .route(web::get().to(payments::subscription_info))
            )
            .service(
                web::resource("/retry/{listing_id}")
                    .route(web::post().to(payments::retry_payment))
            )
            .service(
                web::resource("/status/{listing_id}")
                    .route(web::get().to(payments::payment_status))
            )
    );
}

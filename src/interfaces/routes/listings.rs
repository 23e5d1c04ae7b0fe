use actix_web::web;

use crate::handlers::listings;

pub fn config_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/listings")
            .service(
                web::resource("")
                    .route(web::get().to(listings::browse_listings))
            )
            .service(
                web::resource("/user/{user_id}")
                    .route(web::get().to(listings::get_user_listings))
            )
            .service(
                web::resource("/photos/{public_id}")
                    .route(web::delete().to(listings::delete_photo))
            )
            .service(
                web::resource("/{listing_id}")
                    .route(web::get().to(listings::get_listing))
                    .route(web::delete().to(listings::delete_listing))
            )
    );
}

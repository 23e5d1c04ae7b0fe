use actix_web::web;

use crate::handlers::trips;

pub fn config_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::resource("/trips/density")
            .route(web::get().to(trips::density_heatmap))
    );
}

use actix_web::web;

use crate::handlers::previews;

pub fn config_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::resource("/previews/{preview_id}")
            .route(web::get().to(previews::get_preview))
    );
}

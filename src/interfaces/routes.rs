use actix_web::web;

use crate::handlers::{home::home, system::health_check};

mod drafts;
mod listings;
mod payments;
mod previews;
mod trips;
mod json_error;

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(home);
    cfg.route("/health", web::get().to(health_check));

    cfg.service(
        web::scope("/api/v1")
            .configure(drafts::config_routes)
            .configure(listings::config_routes)
            .configure(payments::config_routes)
            .configure(trips::config_routes)
            .configure(previews::config_routes)
    );

    cfg.configure(json_error::config_routes);
}

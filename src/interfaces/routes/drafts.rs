use actix_web::web;

use crate::handlers::drafts;

pub fn config_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/drafts")
            .service(
                web::resource("")
                    .route(web::post().to(drafts::create_draft))
            )
            .service(
                web::resource("/edit/{listing_id}")
                    .route(web::post().to(drafts::open_edit_draft))
            )
            .service(
                web::resource("/{form_id}")
                    .route(web::get().to(drafts::get_draft))
                    .route(web::patch().to(drafts::update_draft))
                    .route(web::delete().to(drafts::discard_draft))
            )
            .service(
                web::resource("/{form_id}/images")
                    .route(web::post().to(drafts::attach_images))
            )
            .service(
                web::resource("/{form_id}/images/{index}")
                    .route(web::delete().to(drafts::remove_image))
            )
            .service(
                web::resource("/{form_id}/validate")
                    .route(web::post().to(drafts::validate_draft))
            )
            .service(
                web::resource("/{form_id}/submit")
                    .route(web::post().to(drafts::submit_draft))
            )
    );
}

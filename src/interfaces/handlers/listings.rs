use actix_web::{web, HttpResponse, Responder};
use tracing::instrument;

use crate::{
    entities::listing::ListingQuery,
    errors::AppError,
    use_cases::extractors::{AuthToken, MaybeAuthToken},
    AppState,
};

#[instrument(skip(state))]
pub async fn browse_listings(
    state: web::Data<AppState>,
    query: web::Query<ListingQuery>,
) -> Result<impl Responder, AppError> {
    let page = state.listing_handler.browse(query.into_inner()).await?;
    Ok(HttpResponse::Ok().json(page))
}

#[instrument(skip(token, state))]
pub async fn get_listing(
    token: MaybeAuthToken,
    state: web::Data<AppState>,
    listing_id: web::Path<String>,
) -> Result<impl Responder, AppError> {
    let listing = state
        .listing_handler
        .get_listing(token.0.as_ref(), &listing_id.into_inner())
        .await?;

    Ok(HttpResponse::Ok().json(listing))
}

#[instrument(skip(token, state))]
pub async fn get_user_listings(
    token: AuthToken,
    state: web::Data<AppState>,
    user_id: web::Path<String>,
) -> Result<impl Responder, AppError> {
    let page = state
        .listing_handler
        .user_listings(&token.0, &user_id.into_inner())
        .await?;

    Ok(HttpResponse::Ok().json(page))
}

#[instrument(skip(token, state))]
pub async fn delete_listing(
    token: AuthToken,
    state: web::Data<AppState>,
    listing_id: web::Path<String>,
) -> Result<impl Responder, AppError> {
    let deleted = state
        .listing_handler
        .delete_listing(&token.0, &listing_id.into_inner())
        .await?;

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "message": "Listing deleted",
        "listing": deleted
    })))
}

#[instrument(skip(token, state))]
pub async fn delete_photo(
    token: AuthToken,
    state: web::Data<AppState>,
    public_id: web::Path<String>,
) -> Result<impl Responder, AppError> {
    state
        .listing_handler
        .delete_photo(&token.0, &public_id.into_inner())
        .await?;

    Ok(HttpResponse::NoContent().finish())
}

use actix_web::{http::header::LOCATION, web, HttpResponse, Responder};
use tracing::instrument;

use crate::{errors::AppError, use_cases::extractors::AuthToken, AppState};

#[instrument(skip(token, state))]
pub async fn check_requirement(
    token: AuthToken,
    state: web::Data<AppState>,
) -> Result<impl Responder, AppError> {
    let requirement = state.payment_handler.requirement(&token.0).await?;
    Ok(HttpResponse::Ok().json(requirement))
}

#[instrument(skip(token, state))]
pub async fn subscription_info(
    token: AuthToken,
    state: web::Data<AppState>,
) -> Result<impl Responder, AppError> {
    let info = state.payment_handler.subscription(&token.0).await?;
    Ok(HttpResponse::Ok().json(info))
}

#[instrument(skip(token, state))]
pub async fn retry_payment(
    token: AuthToken,
    state: web::Data<AppState>,
    listing_id: web::Path<String>,
) -> Result<impl Responder, AppError> {
    let redirect = state
        .payment_handler
        .retry_payment(&token.0, &listing_id.into_inner())
        .await?;

    Ok(HttpResponse::SeeOther()
        .insert_header((LOCATION, redirect.checkout_url.clone()))
        .json(redirect))
}

#[instrument(skip(token, state))]
pub async fn payment_status(
    token: AuthToken,
    state: web::Data<AppState>,
    listing_id: web::Path<String>,
) -> Result<impl Responder, AppError> {
    let status = state
        .payment_handler
        .payment_status(&token.0, &listing_id.into_inner())
        .await?;

    Ok(HttpResponse::Ok().json(status))
}

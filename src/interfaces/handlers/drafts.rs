use actix_multipart::form::MultipartForm;
use actix_web::{http::header::LOCATION, web, HttpRequest, HttpResponse, Responder};
use tracing::instrument;
use uuid::Uuid;

use crate::{
    entities::{draft::DraftUpdate, image::ImagesUpload},
    errors::AppError,
    limiter::rate_limiter::client_key,
    use_cases::extractors::AuthToken,
    AppState,
};

/// Spends one unit of the caller's budget for routes that allocate forms or photos.
fn throttle(req: &HttpRequest, state: &AppState) -> Result<(), AppError> {
    let key = client_key(req, state.trust_forwarded_for);

    state.draft_limiter.check(&key).map_err(|retry_after| {
        tracing::warn!(client = %key, retry_after, "Draft rate limit exceeded");
        AppError::TooManyRequests {
            message: "Too many requests. Please slow down and try again shortly.".to_string(),
            retry_after: Some(retry_after),
        }
    })
}

#[instrument(skip(req, token, state))]
pub async fn create_draft(
    req: HttpRequest,
    token: AuthToken,
    state: web::Data<AppState>,
) -> Result<impl Responder, AppError> {
    throttle(&req, &state)?;

    let view = state.draft_handler.create_draft(&token.0)?;
    Ok(HttpResponse::Created().json(view))
}

#[instrument(skip(req, token, state))]
pub async fn open_edit_draft(
    req: HttpRequest,
    token: AuthToken,
    state: web::Data<AppState>,
    listing_id: web::Path<String>,
) -> Result<impl Responder, AppError> {
    throttle(&req, &state)?;

    let view = state
        .draft_handler
        .open_edit_draft(&token.0, &listing_id.into_inner())
        .await?;

    Ok(HttpResponse::Created().json(view))
}

#[instrument(skip(_token, state))]
pub async fn get_draft(
    _token: AuthToken,
    state: web::Data<AppState>,
    form_id: web::Path<Uuid>,
) -> Result<impl Responder, AppError> {
    let view = state.draft_handler.view(form_id.into_inner())?;
    Ok(HttpResponse::Ok().json(view))
}

#[instrument(skip(_token, state, data))]
pub async fn update_draft(
    _token: AuthToken,
    state: web::Data<AppState>,
    form_id: web::Path<Uuid>,
    data: web::Json<DraftUpdate>,
) -> Result<impl Responder, AppError> {
    let view = state
        .draft_handler
        .update(form_id.into_inner(), data.into_inner())?;

    Ok(HttpResponse::Ok().json(view))
}

#[instrument(skip(req, _token, state, upload))]
pub async fn attach_images(
    req: HttpRequest,
    _token: AuthToken,
    state: web::Data<AppState>,
    form_id: web::Path<Uuid>,
    upload: MultipartForm<ImagesUpload>,
) -> Result<impl Responder, AppError> {
    throttle(&req, &state)?;

    let files = upload.into_inner().into_files();
    let view = state.draft_handler.attach_images(form_id.into_inner(), files)?;

    Ok(HttpResponse::Ok().json(view))
}

#[instrument(skip(token, state))]
pub async fn remove_image(
    token: AuthToken,
    state: web::Data<AppState>,
    path: web::Path<(Uuid, usize)>,
) -> Result<impl Responder, AppError> {
    let (form_id, index) = path.into_inner();
    let view = state
        .draft_handler
        .remove_image(&token.0, form_id, index)
        .await?;

    Ok(HttpResponse::Ok().json(view))
}

#[instrument(skip(_token, state))]
pub async fn validate_draft(
    _token: AuthToken,
    state: web::Data<AppState>,
    form_id: web::Path<Uuid>,
) -> Result<impl Responder, AppError> {
    let report = state.draft_handler.validate(form_id.into_inner())?;
    Ok(HttpResponse::Ok().json(report))
}

/// Submits a form. Success answers `303 See Other` pointing at either the
/// listing detail page or the hosted checkout.
#[instrument(skip(token, state))]
pub async fn submit_draft(
    token: AuthToken,
    state: web::Data<AppState>,
    form_id: web::Path<Uuid>,
) -> Result<impl Responder, AppError> {
    let form_id = form_id.into_inner();

    let mut form = state.draft_handler.checkout(form_id)?;
    let outcome = state.submission_handler.submit(&token.0, &mut form).await?;
    drop(form);

    state.draft_handler.finish(form_id);

    Ok(HttpResponse::SeeOther()
        .insert_header((LOCATION, outcome.redirect_to().to_string()))
        .json(outcome))
}

#[instrument(skip(_token, state))]
pub async fn discard_draft(
    _token: AuthToken,
    state: web::Data<AppState>,
    form_id: web::Path<Uuid>,
) -> Result<impl Responder, AppError> {
    state.draft_handler.discard(form_id.into_inner())?;
    Ok(HttpResponse::NoContent().finish())
}

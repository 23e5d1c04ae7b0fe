use actix_web::{http::header::CacheControl, http::header::CacheDirective, web, HttpResponse, Responder};
use uuid::Uuid;

use crate::{errors::AppError, AppState};

/// Serves the in-memory preview of a photo picked in an open form.
pub async fn get_preview(
    state: web::Data<AppState>,
    preview_id: web::Path<Uuid>,
) -> Result<impl Responder, AppError> {
    let preview = state
        .draft_handler
        .preview(&preview_id)
        .ok_or_else(|| AppError::NotFound("Preview not found".to_string()))?;

    Ok(HttpResponse::Ok()
        .content_type(preview.image_type.mime_type())
        .insert_header(CacheControl(vec![CacheDirective::Private, CacheDirective::NoStore]))
        .body(preview.data.to_vec()))
}

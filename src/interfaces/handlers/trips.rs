use actix_web::{web, HttpResponse, Responder};
use tracing::instrument;

use crate::{entities::trip_density::TripDensityQuery, errors::AppError, AppState};

#[instrument(skip(state))]
pub async fn density_heatmap(
    state: web::Data<AppState>,
    query: web::Query<TripDensityQuery>,
) -> Result<impl Responder, AppError> {
    let regions = state.trip_handler.heatmap(&query).await?;

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "regions": regions
    })))
}

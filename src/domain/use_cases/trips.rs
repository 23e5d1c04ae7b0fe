use validator::Validate;

use crate::{
    entities::trip_density::{HeatmapLayer, HeatmapRegion, TripDensityQuery},
    errors::AppError,
    repositories::trips::TripsRepository,
};

pub struct TripHandler<T>
where
    T: TripsRepository,
{
    pub trips_repo: T,
}

impl<T> TripHandler<T>
where
    T: TripsRepository,
{
    pub fn new(trips_repo: T) -> Self {
        TripHandler { trips_repo }
    }

    pub async fn density_layer(&self, query: &TripDensityQuery) -> Result<HeatmapLayer, AppError> {
        query.validate()?;

        let rows = self.trips_repo.trip_density(query).await?;
        tracing::debug!(zones = rows.len(), "Trip densities loaded");
        Ok(HeatmapLayer::from_densities(rows))
    }

    pub async fn heatmap(&self, query: &TripDensityQuery) -> Result<Vec<HeatmapRegion>, AppError> {
        Ok(self.density_layer(query).await?.regions())
    }
}

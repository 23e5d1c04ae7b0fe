use async_trait::async_trait;
use reqwest::Method;

use crate::{
    api_errors::RemoteError,
    entities::trip_density::{TripDensity, TripDensityQuery},
    http::client::ApiClient,
};

#[async_trait]
pub trait TripsRepository: Send + Sync {
    async fn trip_density(&self, query: &TripDensityQuery) -> Result<Vec<TripDensity>, RemoteError>;
}

#[async_trait]
impl TripsRepository for ApiClient {
    async fn trip_density(&self, query: &TripDensityQuery) -> Result<Vec<TripDensity>, RemoteError> {
        let builder = self
            .request(Method::GET, "trips/density", None)?
            .query(&query.to_params());
        self.send_json(builder).await
    }
}

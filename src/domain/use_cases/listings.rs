use crate::{
    entities::{
        listing::{ListingPage, ListingQuery, ListingRecord},
        session::AccessToken,
    },
    errors::AppError,
    repositories::listings::ListingsRepository,
};

pub struct ListingHandler<L>
where
    L: ListingsRepository,
{
    pub listings_repo: L,
}

impl<L> ListingHandler<L>
where
    L: ListingsRepository,
{
    pub fn new(listings_repo: L) -> Self {
        ListingHandler { listings_repo }
    }

    pub async fn browse(&self, query: ListingQuery) -> Result<ListingPage, AppError> {
        let query = query.normalized();
        Ok(self.listings_repo.list_listings(&query).await?)
    }

    pub async fn get_listing(&self, token: Option<&AccessToken>, listing_id: &str) -> Result<ListingRecord, AppError> {
        let listing = match token {
            Some(token) => self.listings_repo.get_listing(token, listing_id).await?,
            None => self.listings_repo.get_public_listing(listing_id).await?,
        };
        Ok(listing)
    }

    pub async fn user_listings(&self, token: &AccessToken, user_id: &str) -> Result<ListingPage, AppError> {
        Ok(self.listings_repo.list_user_listings(token, user_id).await?)
    }

    pub async fn delete_listing(&self, token: &AccessToken, listing_id: &str) -> Result<ListingRecord, AppError> {
        let deleted = self.listings_repo.delete_listing(token, listing_id).await?;
        tracing::info!(listing_id = %listing_id, "Listing deleted");
        Ok(deleted)
    }

    /// Deletes a hosted photo on its own, outside any form.
    pub async fn delete_photo(&self, token: &AccessToken, public_id: &str) -> Result<(), AppError> {
        self.listings_repo.delete_photo(token, public_id).await?;
        tracing::info!(public_id = %public_id, "Listing photo deleted");
        Ok(())
    }
}

use async_trait::async_trait;
use reqwest::{multipart::{Form, Part}, Method};

use crate::{
    api_errors::RemoteError,
    entities::{
        listing::{ListingPage, ListingQuery, ListingRecord, ListingUpload},
        session::AccessToken,
    },
    http::client::ApiClient,
};

#[async_trait]
pub trait ListingsRepository: Send + Sync {
    async fn create_listing(&self, token: &AccessToken, upload: &ListingUpload) -> Result<ListingRecord, RemoteError>;
    async fn update_listing(&self, token: &AccessToken, id: &str, upload: &ListingUpload) -> Result<ListingRecord, RemoteError>;
    async fn get_listing(&self, token: &AccessToken, id: &str) -> Result<ListingRecord, RemoteError>;
    /// Anonymous read, as the public detail page does it.
    async fn get_public_listing(&self, id: &str) -> Result<ListingRecord, RemoteError>;
    async fn list_listings(&self, query: &ListingQuery) -> Result<ListingPage, RemoteError>;
    async fn list_user_listings(&self, token: &AccessToken, user_id: &str) -> Result<ListingPage, RemoteError>;
    async fn delete_listing(&self, token: &AccessToken, id: &str) -> Result<ListingRecord, RemoteError>;
    async fn delete_photo(&self, token: &AccessToken, public_id: &str) -> Result<(), RemoteError>;
}

/// Builds the multipart body: one `listing` JSON part, one `images` part per file.
pub fn upload_form(upload: &ListingUpload) -> Result<Form, RemoteError> {
    let listing_json = serde_json::to_string(&upload.listing)?;

    let mut form = Form::new().part(
        "listing",
        Part::text(listing_json).mime_str("application/json")?,
    );

    for image in &upload.images {
        let part = Part::bytes(image.data.to_vec())
            .file_name(image.file_name.clone())
            .mime_str(image.content_type)?;
        form = form.part("images", part);
    }

    Ok(form)
}

fn listing_path(id: &str) -> String {
    format!("listings/{}", urlencoding::encode(id))
}

#[async_trait]
impl ListingsRepository for ApiClient {
    async fn create_listing(&self, token: &AccessToken, upload: &ListingUpload) -> Result<ListingRecord, RemoteError> {
        let builder = self
            .request(Method::POST, "listings", Some(token))?
            .multipart(upload_form(upload)?);

        self.send_json(builder).await
    }

    async fn update_listing(&self, token: &AccessToken, id: &str, upload: &ListingUpload) -> Result<ListingRecord, RemoteError> {
        let builder = self
            .request(Method::PUT, &listing_path(id), Some(token))?
            .multipart(upload_form(upload)?);

        self.send_json(builder).await
    }

    async fn get_listing(&self, token: &AccessToken, id: &str) -> Result<ListingRecord, RemoteError> {
        let builder = self.request(Method::GET, &listing_path(id), Some(token))?;
        self.send_json(builder).await
    }

    async fn get_public_listing(&self, id: &str) -> Result<ListingRecord, RemoteError> {
        let builder = self.request(Method::GET, &listing_path(id), None)?;
        self.send_json(builder).await
    }

    async fn list_listings(&self, query: &ListingQuery) -> Result<ListingPage, RemoteError> {
        let mut params = vec![
            ("page", query.page.to_string()),
            ("per_page", query.per_page.to_string()),
        ];
        if let Some(q) = &query.q {
            params.push(("q", q.clone()));
        }

        let builder = self.request(Method::GET, "listings", None)?.query(&params);
        self.send_json(builder).await
    }

    async fn list_user_listings(&self, token: &AccessToken, user_id: &str) -> Result<ListingPage, RemoteError> {
        let path = format!("listings/user/{}", urlencoding::encode(user_id));
        let builder = self.request(Method::GET, &path, Some(token))?;
        self.send_json(builder).await
    }

    async fn delete_listing(&self, token: &AccessToken, id: &str) -> Result<ListingRecord, RemoteError> {
        let builder = self.request(Method::DELETE, &listing_path(id), Some(token))?;
        self.send_json(builder).await
    }

    async fn delete_photo(&self, token: &AccessToken, public_id: &str) -> Result<(), RemoteError> {
        let path = format!("listings/photos/{}", urlencoding::encode(public_id));
        let builder = self.request(Method::DELETE, &path, Some(token))?;
        self.send_empty(builder).await
    }
}

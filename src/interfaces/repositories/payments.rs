use async_trait::async_trait;
use reqwest::Method;

use crate::{
    api_errors::RemoteError,
    entities::{
        payment::{CheckoutSession, CheckoutSessionRequest, PaymentRequirement, SubscriptionInfo},
        session::AccessToken,
    },
    http::client::ApiClient,
};

#[async_trait]
pub trait PaymentsRepository: Send + Sync {
    /// Never cached: the free-tier count can change between two calls.
    async fn check_payment_requirement(&self, token: &AccessToken) -> Result<PaymentRequirement, RemoteError>;
    async fn create_checkout_session(&self, token: &AccessToken, request: &CheckoutSessionRequest) -> Result<CheckoutSession, RemoteError>;
    async fn subscription_info(&self, token: &AccessToken) -> Result<SubscriptionInfo, RemoteError>;
}

#[async_trait]
impl PaymentsRepository for ApiClient {
    async fn check_payment_requirement(&self, token: &AccessToken) -> Result<PaymentRequirement, RemoteError> {
        let builder = self.request(Method::GET, "payments/check-requirement", Some(token))?;
        self.send_json(builder).await
    }

    async fn create_checkout_session(&self, token: &AccessToken, request: &CheckoutSessionRequest) -> Result<CheckoutSession, RemoteError> {
        let builder = self
            .request(Method::POST, "payments/create-checkout-session", Some(token))?
            .json(request);
        self.send_json(builder).await
    }

    async fn subscription_info(&self, token: &AccessToken) -> Result<SubscriptionInfo, RemoteError> {
        let builder = self.request(Method::GET, "payments/subscription-info", Some(token))?;
        self.send_json(builder).await
    }
}

use crate::{
    entities::{
        payment::{CheckoutRedirect, PaymentRequirement, PaymentStatus, SubscriptionInfo},
        session::AccessToken,
    },
    errors::AppError,
    repositories::{listings::ListingsRepository, payments::PaymentsRepository},
    use_cases::submission::RedirectTargets,
};

/// Payment screens outside the submission itself: the requirement banner,
/// the billing summary, checkout recovery and the post-checkout page.
pub struct PaymentHandler<L, P>
where
    L: ListingsRepository,
    P: PaymentsRepository,
{
    pub listings_repo: L,
    pub payments_repo: P,
    pub redirects: RedirectTargets,
}

impl<L, P> PaymentHandler<L, P>
where
    L: ListingsRepository,
    P: PaymentsRepository,
{
    pub fn new(listings_repo: L, payments_repo: P, redirects: RedirectTargets) -> Self {
        PaymentHandler {
            listings_repo,
            payments_repo,
            redirects,
        }
    }

    /// Informational only; submission asks again.
    pub async fn requirement(&self, token: &AccessToken) -> Result<PaymentRequirement, AppError> {
        Ok(self.payments_repo.check_payment_requirement(token).await?)
    }

    pub async fn subscription(&self, token: &AccessToken) -> Result<SubscriptionInfo, AppError> {
        Ok(self.payments_repo.subscription_info(token).await?)
    }

    /// Issues a fresh checkout session for a listing left inactive by an
    /// interrupted submission.
    pub async fn retry_payment(&self, token: &AccessToken, listing_id: &str) -> Result<CheckoutRedirect, AppError> {
        let listing = self.listings_repo.get_listing(token, listing_id).await?;
        if listing.active {
            return Err(AppError::Conflict(format!("Listing {} is already active", listing_id)));
        }

        let request = self.redirects.checkout_request(&listing.id);
        let session = self.payments_repo.create_checkout_session(token, &request).await?;

        let Some(checkout_url) = session.redirect_url().map(str::to_string) else {
            return Err(AppError::PaymentIncomplete {
                listing_id: listing.id,
                message: if session.message.is_empty() {
                    "Failed to create checkout session".to_string()
                } else {
                    session.message
                },
            });
        };

        tracing::info!(listing_id = %listing.id, "Checkout session reissued");
        Ok(CheckoutRedirect {
            listing_id: listing.id,
            checkout_url,
            session_id: session.session_id,
        })
    }

    /// State of a listing after the hosted checkout sent the user back.
    pub async fn payment_status(&self, token: &AccessToken, listing_id: &str) -> Result<PaymentStatus, AppError> {
        let listing = self.listings_repo.get_listing(token, listing_id).await?;
        Ok(PaymentStatus {
            listing_id: listing.id.clone(),
            active: listing.active,
            listing,
        })
    }
}

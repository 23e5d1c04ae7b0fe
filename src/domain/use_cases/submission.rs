use serde::Serialize;

use crate::{
    domain::validation::{validate_listing, ValidationReport},
    entities::{
        draft::{FormMode, ListingForm, SubmissionState},
        listing::Listing,
        payment::{CheckoutSessionRequest, PaymentRequirement, PaymentType},
        session::AccessToken,
    },
    errors::{AppError, SUBMIT_RETRY_MESSAGE},
    repositories::{listings::ListingsRepository, payments::PaymentsRepository},
};

/// Browser-facing pages the workflow redirects to.
#[derive(Debug, Clone, PartialEq)]
pub struct RedirectTargets {
    public_base: String,
}

impl RedirectTargets {
    pub fn new(public_base: &str) -> Self {
        RedirectTargets {
            public_base: public_base.trim_end_matches('/').to_string(),
        }
    }

    pub fn listing_detail(&self, listing_id: &str) -> String {
        format!("{}/listings/{}", self.public_base, urlencoding::encode(listing_id))
    }

    pub fn checkout_success(&self, listing_id: &str) -> String {
        format!(
            "{}/listings/success?listing_id={}",
            self.public_base,
            urlencoding::encode(listing_id)
        )
    }

    pub fn checkout_cancel(&self, listing_id: &str) -> String {
        format!(
            "{}/listings/payment-failed?listing_id={}",
            self.public_base,
            urlencoding::encode(listing_id)
        )
    }

    /// Checkout session request for an inactive listing.
    pub fn checkout_request(&self, listing_id: &str) -> CheckoutSessionRequest {
        CheckoutSessionRequest {
            payment_type: PaymentType::Listing,
            listing_id: listing_id.to_string(),
            success_url: self.checkout_success(listing_id),
            cancel_url: self.checkout_cancel(listing_id),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum SubmissionOutcome {
    /// Free-tier listing created active.
    Published { listing_id: String, redirect_to: String },
    /// Listing created inactive; the browser goes to hosted checkout.
    CheckoutRequired {
        listing_id: String,
        redirect_to: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        session_id: Option<String>,
    },
    /// Existing listing updated.
    Saved { listing_id: String, redirect_to: String },
}

impl SubmissionOutcome {
    pub fn listing_id(&self) -> &str {
        match self {
            SubmissionOutcome::Published { listing_id, .. }
            | SubmissionOutcome::CheckoutRequired { listing_id, .. }
            | SubmissionOutcome::Saved { listing_id, .. } => listing_id,
        }
    }

    pub fn redirect_to(&self) -> &str {
        match self {
            SubmissionOutcome::Published { redirect_to, .. }
            | SubmissionOutcome::CheckoutRequired { redirect_to, .. }
            | SubmissionOutcome::Saved { redirect_to, .. } => redirect_to,
        }
    }
}

pub struct SubmissionHandler<L, P>
where
    L: ListingsRepository,
    P: PaymentsRepository,
{
    pub listings_repo: L,
    pub payments_repo: P,
    pub redirects: RedirectTargets,
}

impl<L, P> SubmissionHandler<L, P>
where
    L: ListingsRepository,
    P: PaymentsRepository,
{
    pub fn new(listings_repo: L, payments_repo: P, redirects: RedirectTargets) -> Self {
        SubmissionHandler {
            listings_repo,
            payments_repo,
            redirects,
        }
    }

    /// Local checks only; no remote calls.
    pub fn validate(&self, listing: &Listing) -> ValidationReport {
        validate_listing(listing)
    }

    /// Asks the remote API whether the next listing must be paid for.
    pub async fn check_payment_requirement(&self, token: &AccessToken) -> Result<PaymentRequirement, AppError> {
        Ok(self.payments_repo.check_payment_requirement(token).await?)
    }

    /// Runs the submission sequence for a form. The `&mut` borrow is what
    /// keeps a form to one submission at a time.
    pub async fn submit(&self, token: &AccessToken, form: &mut ListingForm) -> Result<SubmissionOutcome, AppError> {
        if form.state().is_terminal() {
            return Err(AppError::Conflict("This form has already been submitted".to_string()));
        }

        match form.mode.clone() {
            FormMode::Create => self.publish(token, form).await,
            FormMode::Edit { listing_id } => self.save_edits(token, &listing_id, form).await,
        }
    }

    async fn publish(&self, token: &AccessToken, form: &mut ListingForm) -> Result<SubmissionOutcome, AppError> {
        validate_form(form)?;

        // Re-queried at submit time even if the banner already asked.
        form.transition(SubmissionState::CheckingPayment);
        let requirement = self
            .payments_repo
            .check_payment_requirement(token)
            .await
            .map_err(|e| abort(form, e))?;

        let active = !requirement.requires_payment;
        form.transition(SubmissionState::Creating { active });

        let upload = form.listing.to_upload(active);
        let record = self
            .listings_repo
            .create_listing(token, &upload)
            .await
            .map_err(|e| abort(form, e))?;

        if active {
            form.release_previews();
            form.transition(SubmissionState::Done { listing_id: record.id.clone() });
            tracing::info!(listing_id = %record.id, "Listing published");

            return Ok(SubmissionOutcome::Published {
                redirect_to: self.redirects.listing_detail(&record.id),
                listing_id: record.id,
            });
        }

        let request = self.redirects.checkout_request(&record.id);
        let session = match self.payments_repo.create_checkout_session(token, &request).await {
            Ok(session) => session,
            Err(e) => {
                tracing::error!(listing_id = %record.id, "Checkout session failed: {}", e);
                form.transition(SubmissionState::Editing);
                return Err(AppError::PaymentIncomplete {
                    listing_id: record.id,
                    message: e.to_string(),
                });
            }
        };

        let Some(checkout_url) = session.redirect_url().map(str::to_string) else {
            tracing::error!(listing_id = %record.id, "Checkout session unusable: {}", session.message);
            form.transition(SubmissionState::Editing);
            return Err(AppError::PaymentIncomplete {
                listing_id: record.id,
                message: if session.message.is_empty() {
                    "Failed to create checkout session".to_string()
                } else {
                    session.message
                },
            });
        };

        form.release_previews();
        form.transition(SubmissionState::RedirectingToCheckout {
            listing_id: record.id.clone(),
            checkout_url: checkout_url.clone(),
        });
        tracing::info!(listing_id = %record.id, "Listing awaiting payment");

        Ok(SubmissionOutcome::CheckoutRequired {
            listing_id: record.id,
            redirect_to: checkout_url,
            session_id: session.session_id,
        })
    }

    async fn save_edits(
        &self,
        token: &AccessToken,
        listing_id: &str,
        form: &mut ListingForm,
    ) -> Result<SubmissionOutcome, AppError> {
        validate_form(form)?;

        form.transition(SubmissionState::Saving);
        let upload = form.listing.to_upload(form.listing.active);
        let record = self
            .listings_repo
            .update_listing(token, listing_id, &upload)
            .await
            .map_err(|e| abort(form, e))?;

        form.release_previews();
        form.transition(SubmissionState::Done { listing_id: record.id.clone() });
        tracing::info!(listing_id = %record.id, "Listing updated");

        Ok(SubmissionOutcome::Saved {
            redirect_to: self.redirects.listing_detail(&record.id),
            listing_id: record.id,
        })
    }
}

fn validate_form(form: &mut ListingForm) -> Result<(), AppError> {
    form.transition(SubmissionState::Validating);

    let report = validate_listing(&form.listing);
    if !report.valid {
        tracing::debug!(form_id = %form.id, errors = ?report.field_errors, "Listing rejected");
        form.transition(SubmissionState::Editing);
        return Err(report.into());
    }

    Ok(())
}

/// Back to editing; the form keeps everything the user entered.
fn abort(form: &mut ListingForm, err: impl Into<AppError>) -> AppError {
    form.transition(SubmissionState::Editing);
    match err.into() {
        AppError::Upstream(_) => AppError::Upstream(SUBMIT_RETRY_MESSAGE.to_string()),
        other => other,
    }
}

mod domain;
mod interfaces;
mod infrastructure;
pub mod api_errors;
pub mod errors;
pub mod settings;
pub mod constants;
pub mod graceful_shutdown;
pub mod background_task;

pub use domain::{entities, use_cases, validation};
pub use interfaces::{handlers, repositories, middlewares, routes};
pub use infrastructure::{http, limiter, media, store};

use actix_multipart::form::MultipartFormConfig;
use actix_web::web;

use api_errors::RemoteError;
use http::client::ApiClient;
use limiter::rate_limiter::RateLimiter;
use media::{image_check::ImagePolicy, previews::PreviewRegistry};
use store::draft_store::{DraftStore, StoreLimits};
use use_cases::{
    drafts::DraftHandler,
    listings::ListingHandler,
    payments::PaymentHandler,
    submission::{RedirectTargets, SubmissionHandler},
    trips::TripHandler,
};

pub struct AppState {
    pub draft_handler: AppDraftHandler,
    pub submission_handler: AppSubmissionHandler,
    pub listing_handler: AppListingHandler,
    pub payment_handler: AppPaymentHandler,
    pub trip_handler: AppTripHandler,
    pub api_client: ApiClient,
    pub draft_limiter: RateLimiter,
    pub trust_forwarded_for: bool,
}

pub type AppDraftHandler = DraftHandler<ApiClient>;
pub type AppSubmissionHandler = SubmissionHandler<ApiClient, ApiClient>;
pub type AppListingHandler = ListingHandler<ApiClient>;
pub type AppPaymentHandler = PaymentHandler<ApiClient, ApiClient>;
pub type AppTripHandler = TripHandler<ApiClient>;

impl AppState {
    pub fn new(config: &settings::AppConfig) -> Result<Self, RemoteError> {
        let api_client = ApiClient::from_config(config)?;
        Ok(Self::with_client(config, api_client))
    }

    /// Wires every handler onto one shared remote API client.
    pub fn with_client(config: &settings::AppConfig, api_client: ApiClient) -> Self {
        let redirects = RedirectTargets::new(&config.public_base_url);
        let policy = ImagePolicy {
            max_bytes: config.max_image_bytes,
            max_images: config.max_images,
        };
        let limits = StoreLimits {
            max_forms: config.max_open_forms,
            max_per_owner: config.max_forms_per_user,
        };

        AppState {
            draft_handler: DraftHandler::new(
                api_client.clone(),
                DraftStore::with_limits(limits),
                PreviewRegistry::new(),
                policy,
            ),
            submission_handler: SubmissionHandler::new(
                api_client.clone(),
                api_client.clone(),
                redirects.clone(),
            ),
            listing_handler: ListingHandler::new(api_client.clone()),
            payment_handler: PaymentHandler::new(api_client.clone(), api_client.clone(), redirects),
            trip_handler: TripHandler::new(api_client.clone()),
            api_client,
            draft_limiter: RateLimiter::new(config.draft_rate_burst, config.draft_rate_per_minute),
            trust_forwarded_for: config.trust_x_forwarded_for,
        }
    }
}

/// Body limits for photo uploads: a full set of maximum-size photos plus
/// room for multipart framing.
pub fn multipart_config(config: &settings::AppConfig) -> MultipartFormConfig {
    let limit = config.max_images * config.max_image_bytes + 1024 * 1024;
    MultipartFormConfig::default()
        .total_limit(limit)
        .memory_limit(limit)
}

/// Everything an `App` needs besides its middleware.
pub fn configure_app(state: web::Data<AppState>, config: &settings::AppConfig) -> impl FnOnce(&mut web::ServiceConfig) {
    let multipart = multipart_config(config);

    move |cfg: &mut web::ServiceConfig| {
        cfg.app_data(state)
            .app_data(multipart)
            .configure(routes::configure_routes);
    }
}

#![allow(dead_code)]

use actix_web::{
    middleware::NormalizePath,
    web, App, HttpRequest, HttpResponse, HttpServer
};
use tlc_listings::{
    configure_app,
    entities::listing::ListingRecord,
    http::client::ApiClient,
    middlewares::auth::AuthMiddleware,
    settings::{AppConfig, AppEnvironment},
    AppState
};
use reqwest::{redirect::Policy, Client};
use serde_json::{json, Value};
use std::{net::TcpListener, sync::{Arc, Mutex}, time::Duration};


use test_fixtures::listing_record;

pub const PUBLIC_SITE: &str = "https://tlc.example.com";
pub const CHECKOUT_URL: &str = "https://checkout.example.com/pay/cs_test_1";

/// What the fake remote API saw and how it should answer.
#[derive(Debug, Default)]
pub struct UpstreamLog {
    pub requires_payment: bool,
    pub calls: Vec<String>,
    pub created_active: Vec<bool>,
    pub checkout_requests: Vec<Value>,
    pub authorization: Vec<String>,
    pub last_query: Option<String>,
}

/// In-process stand-in for the remote marketplace API.
#[derive(Clone)]
pub struct FakeUpstream {
    pub address: String,
    pub log: Arc<Mutex<UpstreamLog>>,
}

impl FakeUpstream {
    pub async fn spawn(requires_payment: bool) -> Self {
        let log = Arc::new(Mutex::new(UpstreamLog {
            requires_payment,
            ..UpstreamLog::default()
        }));

        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port();
        let address = format!("http://127.0.0.1:{}", port);

        let shared = web::Data::new(log.clone());
        let server = HttpServer::new(move || {
            App::new()
                .app_data(shared.clone())
                .app_data(web::PayloadConfig::new(32 * 1024 * 1024))
                .route("/wakeup", web::get().to(wakeup))
                .route("/payments/check-requirement", web::get().to(check_requirement))
                .route("/payments/create-checkout-session", web::post().to(create_checkout_session))
                .route("/listings", web::post().to(create_listing))
                .route("/listings/{id}", web::get().to(get_listing))
                .route("/trips/density", web::get().to(trip_density))
        })
        .listen(listener)
        .expect("Failed to bind fake upstream")
        .workers(1)
        .run();

        tokio::spawn(server);

        Self { address, log }
    }

    pub fn calls(&self) -> Vec<String> {
        self.log.lock().unwrap().calls.clone()
    }

    pub fn created_active(&self) -> Vec<bool> {
        self.log.lock().unwrap().created_active.clone()
    }

    pub fn checkout_requests(&self) -> Vec<Value> {
        self.log.lock().unwrap().checkout_requests.clone()
    }
}

type Log = web::Data<Arc<Mutex<UpstreamLog>>>;

fn record(log: &Log, req: &HttpRequest) {
    let mut log = log.lock().unwrap();
    log.calls.push(format!("{} {}", req.method(), req.path()));
    if let Some(auth) = req.headers().get("Authorization").and_then(|h| h.to_str().ok()) {
        log.authorization.push(auth.to_string());
    }
}

async fn wakeup(log: Log, req: HttpRequest) -> HttpResponse {
    record(&log, &req);
    HttpResponse::Ok().json(json!({ "status": "awake" }))
}

async fn check_requirement(log: Log, req: HttpRequest) -> HttpResponse {
    record(&log, &req);
    let requires_payment = log.lock().unwrap().requires_payment;
    HttpResponse::Ok().json(json!({
        "requires_payment": requires_payment,
        "active_listings_count": if requires_payment { 1 } else { 0 },
        "free_listings_remaining": if requires_payment { 0 } else { 1 },
        "message": ""
    }))
}

async fn create_listing(log: Log, req: HttpRequest, body: web::Bytes) -> HttpResponse {
    record(&log, &req);
    let body = String::from_utf8_lossy(&body);
    let active = body.contains("\"active\":true");
    log.lock().unwrap().created_active.push(active);

    let created: ListingRecord = listing_record("abc", active);
    HttpResponse::Created().json(created)
}

async fn get_listing(log: Log, req: HttpRequest, id: web::Path<String>) -> HttpResponse {
    record(&log, &req);
    HttpResponse::Ok().json(listing_record(&id, false))
}

async fn create_checkout_session(log: Log, req: HttpRequest, body: web::Json<Value>) -> HttpResponse {
    record(&log, &req);
    log.lock().unwrap().checkout_requests.push(body.into_inner());
    HttpResponse::Ok().json(json!({
        "success": true,
        "message": "Checkout session created",
        "payment_id": "pay_1",
        "session_id": "cs_test_1",
        "checkout_url": CHECKOUT_URL,
        "requires_payment": true
    }))
}

async fn trip_density(log: Log, req: HttpRequest) -> HttpResponse {
    record(&log, &req);
    log.lock().unwrap().last_query = Some(req.query_string().to_string());
    HttpResponse::Ok().json(json!([
        { "location_id": 132, "density": 12500 },
        { "location_id": 4, "density": 300 }
    ]))
}

#[derive(Clone)]
pub struct TestApp {
    pub state: web::Data<AppState>,
    pub address: String,
    pub client: Client,
    pub config: AppConfig,
    pub upstream: FakeUpstream,
}

impl TestApp {
    pub async fn spawn(requires_payment: bool) -> Self {
        Self::spawn_with(requires_payment, |_| {}).await
    }

    /// Like [`TestApp::spawn`], with a chance to adjust the config first.
    pub async fn spawn_with(requires_payment: bool, adjust: impl FnOnce(&mut AppConfig)) -> Self {
        let upstream = FakeUpstream::spawn(requires_payment).await;
        let mut config = test_config(&upstream.address);
        adjust(&mut config);

        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port();
        let address = format!("http://127.0.0.1:{}", port);

        let api_client = ApiClient::new(&config.api_base_url, Duration::from_secs(5))
            .expect("Failed to build API client");
        let state = web::Data::new(AppState::with_client(&config, api_client));

        let state_clone = state.clone();
        let server_config = config.clone();
        let server = HttpServer::new(move || {
            App::new()
                .wrap(AuthMiddleware)
                .wrap(NormalizePath::trim())
                .configure(configure_app(state_clone.clone(), &server_config))
        })
        .listen(listener)
        .expect("Failed to bind server")
        .workers(config.worker_count)
        .run();

        tokio::spawn(server);

        // Redirects are asserted on, never followed.
        let client = Client::builder()
            .redirect(Policy::none())
            .build()
            .unwrap();

        while client.get(format!("{}/", address)).send().await.is_err() {
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        while client.get(format!("{}/wakeup", upstream.address)).send().await.is_err() {
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        upstream.log.lock().unwrap().calls.clear();

        Self {
            state,
            address,
            client,
            config,
            upstream,
        }
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.address, path)
    }
}

pub fn test_config(api_base_url: &str) -> AppConfig {
    AppConfig {
        env: AppEnvironment::Testing,
        name: "TLC-Listings Test".to_string(),
        port: 0,
        host: "127.0.0.1".to_string(),
        worker_count: 1,
        api_base_url: api_base_url.to_string(),
        public_base_url: PUBLIC_SITE.to_string(),
        cors_allowed_origins: vec!["*".to_string()],
        request_timeout_secs: 5,
        max_image_bytes: 5 * 1024 * 1024,
        max_images: 8,
        draft_ttl_minutes: 60,
        purge_interval_secs: 300,
        wakeup_interval_secs: 0,
        max_open_forms: 100,
        max_forms_per_user: 5,
        draft_rate_burst: 50,
        draft_rate_per_minute: 600,
        trust_x_forwarded_for: false,
    }
}

use actix_cors::Cors;
use actix_web::{http::header, middleware::NormalizePath, web, App, HttpServer};
use tracing_actix_web::TracingLogger;
use tracing_subscriber::EnvFilter;
use tlc_listings::{
    background_task::{start_draft_purge_task, start_wakeup_task},
    configure_app,
    graceful_shutdown::shutdown_signal,
    middlewares::auth::AuthMiddleware,
    settings::AppConfig, AppState
};

fn init_tracing(json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    if json {
        tracing_subscriber::fmt().with_env_filter(filter).json().init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).with_target(true).init();
    }
}

fn build_cors(config: &AppConfig) -> Cors {
    let origins = config.cors_origins();

    let cors = if origins.iter().any(|o| o == "*") {
        Cors::default().allow_any_origin()
    } else {
        origins
            .iter()
            .fold(Cors::default(), |cors, origin| cors.allowed_origin(origin))
    };

    cors.allowed_methods(vec!["GET", "POST", "PUT", "PATCH", "DELETE", "OPTIONS"])
        .allowed_headers(vec![header::AUTHORIZATION, header::CONTENT_TYPE, header::ACCEPT])
        .expose_headers(vec![header::LOCATION])
        .max_age(3600)
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    let loaded = AppConfig::new();
    init_tracing(loaded.as_ref().is_ok_and(|cfg| cfg.is_production()));

    let config = match loaded {
        Ok(cfg) => {
            tracing::info!("Loaded configuration: {:?}", cfg);
            cfg
        },
        Err(e) => {
            tracing::error!("Configuration error: {}", e);
            std::process::exit(1);
        }
    };

    let app_state = match AppState::new(&config) {
        Ok(state) => web::Data::new(state),
        Err(e) => {
            tracing::error!("Failed to build remote API client: {}", e);
            std::process::exit(1);
        }
    };

    let server_addr = format!("{}:{}", config.host, config.port);

    tracing::info!(
        "🚀 Starting {} v{} on {} (remote API {})",
        config.name,
        env!("CARGO_PKG_VERSION"),
        server_addr,
        config.api_base_url
    );

    tokio::spawn(start_draft_purge_task(
        app_state.clone(),
        config.purge_interval_secs,
        config.draft_ttl_minutes,
    ));

    if config.wakeup_interval_secs > 0 {
        tokio::spawn(start_wakeup_task(
            app_state.api_client.clone(),
            config.wakeup_interval_secs,
        ));
    }

    let server_config = config.clone();
    let server = HttpServer::new(move || {
        App::new()
            .wrap(AuthMiddleware)
            .wrap(build_cors(&server_config))
            .wrap(NormalizePath::trim())
            .wrap(TracingLogger::default())
            .configure(configure_app(app_state.clone(), &server_config))
    })
    .workers(config.worker_count)
    .bind(server_addr)?
    .run();

    tokio::select! {
        res = server => res,
        _ = shutdown_signal() => Ok(()),
    }
}

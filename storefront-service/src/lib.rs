pub mod config;
pub mod dtos;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod services;
pub mod utils;

use axum::extract::FromRef;
use axum::middleware::from_fn;
use axum::{
    routing::{get, patch, post},
    Router,
};
use mongodb::{options::ClientOptions, Client};
use secrecy::ExposeSecret;
use site_core::middleware::{metrics::metrics_middleware, tracing::request_id_middleware};
use std::net::SocketAddr;
use tower_http::trace::TraceLayer;

use config::Config;
use services::{GatewayClient, JwtService, StoreRepository};

#[derive(Clone)]
pub struct AppState {
    pub db: mongodb::Database,
    pub config: Config,
    pub repository: StoreRepository,
    pub gateway: GatewayClient,
    pub jwt: JwtService,
}

impl FromRef<AppState> for JwtService {
    fn from_ref(state: &AppState) -> JwtService {
        state.jwt.clone()
    }
}

pub struct Application {
    port: u16,
    router: Router,
}

impl Application {
    pub async fn build(config: Config) -> anyhow::Result<Self> {
        let mut client_options = ClientOptions::parse(config.database.url.expose_secret()).await?;
        client_options.app_name = Some("storefront-service".to_string());

        let client = Client::with_options(client_options)?;
        let db = client.database(&config.database.db_name);

        let repository = StoreRepository::new(&db);
        repository.init_indexes().await?;

        let gateway = GatewayClient::new(config.gateway.clone());
        if gateway.is_configured() {
            tracing::info!("Payment gateway client initialized");
        } else {
            tracing::warn!("Gateway credentials not configured - checkout will be unavailable");
        }

        let jwt = JwtService::new(
            config.auth.jwt_secret.expose_secret(),
            config.auth.token_expiry_minutes,
        );

        services::metrics::init_metrics();

        let state = AppState {
            db,
            config: config.clone(),
            repository,
            gateway,
            jwt,
        };

        let router = Router::new()
            .route("/health", get(handlers::health_check))
            .route("/metrics", get(handlers::metrics_endpoint))
            // Identity gate
            .route("/auth/check", post(handlers::auth::check_email))
            .route("/auth/quick", post(handlers::auth::quick_auth))
            .route("/auth/admin/login", post(handlers::auth::admin_login))
            // Orders (customer-scoped)
            .route(
                "/orders",
                post(handlers::orders::create_order).get(handlers::orders::list_my_orders),
            )
            .route("/orders/:id", get(handlers::orders::get_order))
            .route("/payments/verify", post(handlers::orders::verify_payment))
            // Gateway callbacks
            .route("/webhooks/gateway", post(handlers::webhooks::gateway_webhook))
            // Admin surface
            .route("/admin/orders", get(handlers::admin::list_orders))
            .route(
                "/admin/orders/:id/status",
                patch(handlers::admin::update_order_status),
            )
            .layer(from_fn(metrics_middleware))
            .layer(from_fn(request_id_middleware))
            .layer(
                TraceLayer::new_for_http().make_span_with(|request: &axum::http::Request<_>| {
                    let request_id = request
                        .headers()
                        .get("x-request-id")
                        .and_then(|value| value.to_str().ok())
                        .unwrap_or("-");

                    tracing::info_span!(
                        "http_request",
                        request_id = %request_id,
                        method = %request.method(),
                        uri = %request.uri(),
                        version = ?request.version(),
                    )
                }),
            )
            .with_state(state);

        Ok(Self {
            port: config.server.port,
            router,
        })
    }

    pub async fn run_until_stopped(self) -> anyhow::Result<()> {
        let addr = SocketAddr::from(([0, 0, 0, 0], self.port));
        tracing::info!("Listening on {}", addr);

        let listener = tokio::net::TcpListener::bind(addr).await?;
        axum::serve(listener, self.router).await?;

        Ok(())
    }

    pub fn port(&self) -> u16 {
        self.port
    }
}

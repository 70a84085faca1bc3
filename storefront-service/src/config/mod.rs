use anyhow::Result;
use dotenvy::dotenv;
use secrecy::Secret;
use serde::Deserialize;
use std::env;

#[derive(Deserialize, Clone, Debug)]
pub struct Config {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub auth: AuthConfig,
    pub gateway: GatewayConfig,
    pub service_name: String,
}

#[derive(Deserialize, Clone, Debug)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Deserialize, Clone, Debug)]
pub struct DatabaseConfig {
    pub url: Secret<String>,
    pub db_name: String,
}

#[derive(Deserialize, Clone, Debug)]
pub struct AuthConfig {
    pub jwt_secret: Secret<String>,
    pub token_expiry_minutes: i64,
}

#[derive(Deserialize, Clone, Debug)]
pub struct GatewayConfig {
    pub key_id: String,
    pub key_secret: Secret<String>,
    pub webhook_secret: Secret<String>,
    pub api_base_url: String,
    pub currency: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenv().ok();

        let host = env::var("STOREFRONT_HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
        let port = env::var("STOREFRONT_PORT")
            .unwrap_or_else(|_| "3001".to_string())
            .parse()?;

        let db_url =
            env::var("STOREFRONT_DATABASE_URL").expect("STOREFRONT_DATABASE_URL must be set");
        let db_name =
            env::var("STOREFRONT_DATABASE_NAME").unwrap_or_else(|_| "storefront_db".to_string());

        let jwt_secret = env::var("STOREFRONT_JWT_SECRET").expect("STOREFRONT_JWT_SECRET must be set");
        let token_expiry_minutes = env::var("STOREFRONT_TOKEN_EXPIRY_MINUTES")
            .unwrap_or_else(|_| "1440".to_string())
            .parse()
            .unwrap_or(1440);

        let gateway_key_id = env::var("GATEWAY_KEY_ID").unwrap_or_default();
        let gateway_key_secret = env::var("GATEWAY_KEY_SECRET").unwrap_or_default();
        let gateway_webhook_secret = env::var("GATEWAY_WEBHOOK_SECRET").unwrap_or_default();
        let gateway_api_base_url = env::var("GATEWAY_API_BASE_URL")
            .unwrap_or_else(|_| "https://api.razorpay.com/v1".to_string());
        let currency = env::var("STOREFRONT_CURRENCY").unwrap_or_else(|_| "INR".to_string());

        Ok(Self {
            server: ServerConfig { host, port },
            database: DatabaseConfig {
                url: Secret::new(db_url),
                db_name,
            },
            auth: AuthConfig {
                jwt_secret: Secret::new(jwt_secret),
                token_expiry_minutes,
            },
            gateway: GatewayConfig {
                key_id: gateway_key_id,
                key_secret: Secret::new(gateway_key_secret),
                webhook_secret: Secret::new(gateway_webhook_secret),
                api_base_url: gateway_api_base_url,
                currency,
            },
            service_name: "storefront-service".to_string(),
        })
    }
}

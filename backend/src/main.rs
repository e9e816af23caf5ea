//! Backend entry-point: loads settings, prepares storage and serves the API.

mod server;

use std::sync::Arc;

use actix_web::web;
use color_eyre::eyre::{Context, eyre};
use ortho_config::OrthoConfig;
use rand::RngCore;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt};
use zeroize::Zeroizing;

use khedma::domain::ports::SmsSender;
use khedma::inbound::http::health::HealthState;
use khedma::outbound::credentials::JwtSettings;
use khedma::outbound::persistence::{DbPool, PoolConfig, run_pending_migrations};
use khedma::outbound::sms::{HttpSmsSender, LoggingSmsSender, SmsGatewaySettings};

use server::{ServerConfig, ServerSettings, create_server};

fn ephemeral_secret() -> Zeroizing<String> {
    let mut bytes = [0_u8; 32];
    rand::thread_rng().fill_bytes(&mut bytes);
    Zeroizing::new(hex::encode(bytes))
}

fn jwt_settings(settings: &ServerSettings) -> color_eyre::Result<JwtSettings> {
    if let Some(secrets) = settings.token_secrets() {
        return Ok(JwtSettings::with_secrets(
            Zeroizing::new(secrets.access),
            Zeroizing::new(secrets.refresh),
            Zeroizing::new(secrets.verification),
        ));
    }
    if cfg!(debug_assertions) || settings.allow_ephemeral_secrets {
        warn!("using temporary token secrets; issued tokens will not survive a restart");
        return Ok(JwtSettings::with_secrets(
            ephemeral_secret(),
            ephemeral_secret(),
            ephemeral_secret(),
        ));
    }
    Err(eyre!(
        "KHEDMA_JWT_ACCESS_SECRET, KHEDMA_JWT_REFRESH_SECRET and KHEDMA_JWT_VERIFICATION_SECRET must be set"
    ))
}

fn sms_sender(settings: &ServerSettings) -> color_eyre::Result<Arc<dyn SmsSender>> {
    let Some(url) = settings.sms_gateway_url.as_deref() else {
        warn!("no SMS gateway configured; one-time codes are only logged");
        return Ok(Arc::new(LoggingSmsSender));
    };
    let endpoint = reqwest::Url::parse(url).wrap_err("invalid SMS gateway URL")?;
    let sender = HttpSmsSender::new(SmsGatewaySettings {
        endpoint,
        username: settings.sms_username.clone().unwrap_or_default(),
        password: Zeroizing::new(settings.sms_password.clone().unwrap_or_default()),
        sender_id: settings.sms_sender_id().to_owned(),
        timeout: settings.sms_timeout(),
    })
    .wrap_err("failed to build SMS client")?;
    Ok(Arc::new(sender))
}

async fn attach_storage(
    config: ServerConfig,
    settings: &ServerSettings,
) -> color_eyre::Result<ServerConfig> {
    let Some(database_url) = settings.database_url.as_deref() else {
        warn!("no database configured; using the in-memory store, data is lost on restart");
        return Ok(config);
    };

    run_pending_migrations(database_url)
        .await
        .wrap_err("failed to apply migrations")?;
    let pool = DbPool::new(
        PoolConfig::new(database_url).with_max_size(settings.db_max_connections()),
    )
    .await
    .wrap_err("failed to build database pool")?;
    pool.ping().await.wrap_err("database is not answering")?;
    info!("database pool ready");

    Ok(config.with_db_pool(pool))
}

/// Application bootstrap.
#[actix_web::main]
async fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;
    if let Err(e) = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .try_init()
    {
        warn!(error = %e, "tracing init failed");
    }

    let settings = ServerSettings::load_from_iter(std::env::args_os())
        .map_err(|err| eyre!("failed to load settings: {err}"))?;
    let bind_addr = settings
        .bind_addr()
        .wrap_err("invalid KHEDMA_HOST or KHEDMA_PORT")?;

    let jwt = settings.token_lifetimes(jwt_settings(&settings)?);
    let config = ServerConfig::new(bind_addr, jwt)
        .with_sms_sender(sms_sender(&settings)?)
        .with_otp_policy(settings.otp_policy());
    let config = attach_storage(config, &settings).await?;

    let health_state = web::Data::new(HealthState::new());
    let server = create_server(health_state.clone(), config)?;
    let result = server.await;
    health_state.mark_unhealthy();
    result.wrap_err("HTTP server failed")
}

//! # Short Link Registry - نقطه ورود برنامه
//!
//! ## مفاهیم Rust در این فایل:
//! - `async fn main()`: تابع اصلی غیرهمزمان با tokio
//! - `anyhow::Result`: خطای باینری با context
//! - Graceful shutdown با `ctrl_c`

use anyhow::Context;
use tokio::net::TcpListener;
use tracing::{info, warn};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use shortlink_registry::{
    api::create_router,
    config::{Config, LogFormat},
    services::AppState,
    store,
};

/// نقطه ورود اصلی برنامه
///
/// # Errors
/// خطا برمیگردونه اگه:
/// - تنظیمات لود نشن
/// - store متصل نشه
/// - سرور استارت نشه
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // اگه فایل .env نباشه اوکیه
    dotenvy::dotenv().ok();

    let config = Config::from_env().context("failed to load configuration")?;

    init_tracing(config.log_format);

    info!("🚀 Starting Short Link Registry...");
    info!(environment = ?config.environment, "✅ Configuration loaded");

    if config.environment.is_production() && config.database_url.starts_with("memory") {
        warn!("In-memory store in production: links are lost on restart");
    }

    let store = store::connect(&config.database_url)
        .await
        .with_context(|| format!("failed to open store at {}", config.database_url))?;
    info!("✅ Store ready");

    let addr = config.server_addr();
    let app = create_router(AppState::new(store, config));

    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;
    info!("🌐 Server listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    info!("👋 Server stopped");
    Ok(())
}

/// راه‌اندازی سیستم tracing برای لاگینگ
///
/// # مفاهیم:
/// - EnvFilter: فیلتر کردن لاگ‌ها بر اساس `RUST_LOG`
/// - خروجی pretty برای توسعه، JSON برای production
fn init_tracing(format: LogFormat) {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("shortlink_registry=debug,tower_http=debug"));

    let registry = tracing_subscriber::registry().with(env_filter);

    match format {
        LogFormat::Json => registry
            .with(fmt::layer().json().with_current_span(true))
            .init(),
        LogFormat::Pretty => registry
            .with(
                fmt::layer()
                    .with_target(true)
                    .with_thread_ids(true)
                    .with_file(true)
                    .with_line_number(true)
                    .pretty(),
            )
            .init(),
    }
}

/// منتظر Ctrl+C
async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}

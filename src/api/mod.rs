//! # لایه API
//!
//! این ماژول HTTP handlers و routing رو مدیریت میکنه.
//!
//! ## مفاهیم Rust + Axum:
//! - **Router**: تعریف مسیرها
//! - **Extractors**: استخراج داده از request
//! - **State**: اشتراک state بین handlers
//! - **Tower**: زیرساخت middleware
//!
//! ## ساختار URL‌ها:
//! - `POST /links` - ساخت لینک کوتاه
//! - `GET /links` - لیست لینک‌ها
//! - `GET /links/:code` - آمار لینک
//! - `POST /links/:code/resolve` - resolve به صورت JSON
//! - `DELETE /links/:code` - حذف لینک
//! - `GET /logs` - audit log
//! - `DELETE /logs` - خالی کردن audit log
//! - `GET /:code` - Redirect به URL اصلی
//! - `GET /health` - Health check
//!
//! اولین segment مسیرهای ثابت در `utils::RESERVED_CODES` ثبت شده؛
//! route جدید اضافه میکنید، اونجا هم اضافه کنید.

mod extractors;
mod handlers;
mod middleware;

pub use extractors::*;
pub use handlers::*;
pub use middleware::*;

use std::time::Duration;

use axum::{
    middleware as axum_middleware,
    routing::{get, post},
    Router,
};
use tower::ServiceBuilder;
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::services::AppState;

/// حداکثر زمان پردازش هر request
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

// =====================================
// Router Builder
// =====================================
/// ساخت Router اصلی برنامه
///
/// # مفاهیم:
/// - `.route()`: اضافه کردن route
/// - `.nest()`: گروه‌بندی route‌ها
/// - `.layer()`: اضافه کردن middleware
/// - `.with_state()`: تزریق state
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .nest("/links", link_routes())
        .route(
            "/logs",
            get(handlers::logs::get_logs).delete(handlers::logs::clear_logs),
        )
        .route("/health", get(handlers::health::health_check))
        // Route اصلی redirect؛ مسیرهای ثابت بالا اولویت دارن
        .route("/:code", get(handlers::redirect::redirect_handler))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(axum_middleware::from_fn(request_id))
                .layer(axum_middleware::from_fn(request_timing))
                .layer(TimeoutLayer::new(REQUEST_TIMEOUT))
                .layer(CompressionLayer::new())
                .layer(
                    CorsLayer::new()
                        .allow_origin(Any)
                        .allow_methods(Any)
                        .allow_headers(Any),
                ),
        )
        .with_state(state)
}

/// Route‌های لینک
fn link_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            post(handlers::links::create_link).get(handlers::links::list_links),
        )
        .route(
            "/:code",
            get(handlers::links::get_link).delete(handlers::links::delete_link),
        )
        .route("/:code/resolve", post(handlers::links::resolve_link))
}

//! # ماژول سرویس‌ها (Business Logic Layer)
//!
//! ## لایه‌بندی معماری
//!
//! ```text
//! ┌──────────────────────┐
//! │      API Layer       │  <-- HTTP handlers (axum)
//! ├──────────────────────┤
//! │   ShortLinkService   │  <-- Facade عملیات
//! ├──────────────────────┤
//! │   ActionMiddleware   │  <-- action.start / success / error
//! ├──────────────────────┤
//! │ Registry │ Tracker   │  <-- منطق لینک‌ها و دسترسی‌ها
//! ├──────────────────────┤
//! │    KeyValueStore     │  <-- Memory / SQLite
//! └──────────────────────┘
//! ```
//!
//! `AuditLog` مستقل از مسیر داده Registry نوشته میشه و به همه لایه‌ها
//! تزریق میشه.

mod access_tracker;
mod action_middleware;
mod audit_log;
mod code_generator;
mod registry;
mod shortlink_service;

pub use access_tracker::*;
pub use action_middleware::*;
pub use audit_log::*;
pub use code_generator::*;
pub use registry::*;
pub use shortlink_service::*;

use std::sync::Arc;

use crate::{
    config::Config,
    store::KeyValueStore,
    utils::{Clock, SystemClock},
};

// =====================================
// Application State
// =====================================
/// وضعیت برنامه که بین همه handlers اشتراک‌گذاری میشه
///
/// # مفاهیم:
/// - `Arc<T>`: Reference counting برای thread-safe sharing
/// - `Clone`: فقط Arc‌ها clone میشن، نه داده
#[derive(Clone)]
pub struct AppState {
    /// تنظیمات برنامه
    pub config: Arc<Config>,

    /// سرویس لینک کوتاه
    pub service: Arc<ShortLinkService>,

    /// store برای health check
    pub store: Arc<dyn KeyValueStore>,
}

impl AppState {
    /// ساخت AppState با ساعت سیستم
    #[must_use]
    pub fn new(store: Arc<dyn KeyValueStore>, config: Config) -> Self {
        Self::with_clock(store, config, Arc::new(SystemClock))
    }

    /// ساخت AppState با clock دلخواه (تست‌ها `ManualClock` میدن)
    #[must_use]
    pub fn with_clock(store: Arc<dyn KeyValueStore>, config: Config, clock: Arc<dyn Clock>) -> Self {
        let service = Arc::new(ShortLinkService::new(store.clone(), &config, clock));

        Self {
            config: Arc::new(config),
            service,
            store,
        }
    }
}

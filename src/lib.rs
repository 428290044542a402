//! # Short Link Registry Library
//!
//! این کتابخانه یک سرویس لینک کوتاه با انقضا، آمار دسترسی و audit log
//! سقف‌دار ارائه میده.
//!
//! ## ساختار پروژه
//!
//! ```text
//! src/
//! ├── lib.rs          # نقطه ورود کتابخانه - اینجا!
//! ├── main.rs         # نقطه ورود باینری
//! ├── config/         # مدیریت تنظیمات
//! ├── error/          # تعریف خطاها
//! ├── store/          # لایه key-value (Memory / SQLite)
//! ├── models/         # مدل‌های داده
//! ├── services/       # منطق کسب‌وکار
//! ├── api/            # لایه API
//! └── utils/          # توابع کمکی و Clock
//! ```
//!
//! ## مثال استفاده
//!
//! ```rust,no_run
//! use shortlink_registry::prelude::*;
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     let config = Config::from_env()?;
//!     let store = shortlink_registry::store::connect(&config.database_url).await?;
//!     let state = AppState::new(store, config);
//!
//!     let record = state
//!         .service
//!         .create_short_link(CreateLinkRequest::new("https://example.com"))
//!         .await?;
//!     println!("{}", record.code);
//!     Ok(())
//! }
//! ```

// =====================================
// Module Declarations
// =====================================

/// ماژول مدیریت تنظیمات برنامه
pub mod config;

/// ماژول تعریف و مدیریت خطاها
pub mod error;

/// ماژول ذخیره‌سازی key-value
pub mod store;

/// ماژول مدل‌های داده (Domain Models)
pub mod models;

/// ماژول سرویس‌ها (Business Logic)
pub mod services;

/// ماژول API و HTTP Handlers
pub mod api;

/// ماژول توابع کمکی
pub mod utils;

// =====================================
// Re-exports
// =====================================

/// نتیجه عملیات با خطای سفارشی ما
pub use error::Result;

/// خطای اصلی برنامه
pub use error::AppError;

// =====================================
// Prelude Module
// =====================================
/// ماژول prelude برای import راحت‌تر آیتم‌های پرکاربرد
///
/// کاربرد:
/// ```rust
/// use shortlink_registry::prelude::*;
/// ```
pub mod prelude {
    pub use crate::config::Config;
    pub use crate::error::{AppError, Result};
    pub use crate::models::*;
    pub use crate::services::*;
    pub use crate::store::KeyValueStore;
    pub use crate::utils::{Clock, ManualClock, SystemClock};
}

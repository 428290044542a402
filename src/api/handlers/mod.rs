//! # HTTP Handlers
//!
//! ## Handler چیه؟
//! تابعی که request میگیره و response برمیگردونه.
//! در axum، هر handler یک async function هست.
//!
//! ## مفاهیم:
//! - Extractors: برای گرفتن داده از request
//! - State: برای دسترسی به سرویس‌ها
//! - IntoResponse: برای ساخت response

pub mod health;
pub mod links;
pub mod logs;
pub mod redirect;

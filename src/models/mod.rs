//! # ماژول مدل‌ها (Domain Models)
//!
//! این ماژول مدل‌های داده برنامه رو تعریف میکنه.
//!
//! ## تفاوت انواع مدل:
//! - **Entity**: داده‌ای که در store ذخیره میشه (`LinkRecord`، `AuditLogEntry`)
//! - **DTO (Data Transfer Object)**: برای ارسال/دریافت از API
//! - **Outcome**: نتیجه ساختاریافته عملیات (`ResolveOutcome`)
//!
//! ## فرمت ذخیره‌سازی
//! فیلدها به صورت camelCase و timestamp‌ها به صورت میلی‌ثانیه epoch
//! سریالایز میشن.

mod audit;
mod dto;
mod link;

pub use audit::*;
pub use dto::*;
pub use link::*;

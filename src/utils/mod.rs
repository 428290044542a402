//! # ماژول توابع کمکی (Utilities)
//!
//! ثابت‌ها، الگوهای Regex، تولید کاراکترهای تصادفی و اعتبارسنجی URL.
//!
//! ## مفاهیم Rust:
//! - **once_cell::Lazy**: مقداردهی اولیه تنبل برای Regex
//! - **rand**: تولید اعداد تصادفی
//! - **url**: parse کردن آدرس‌ها

mod clock;

pub use clock::*;

use once_cell::sync::Lazy;
use rand::Rng;
use regex::Regex;

use crate::error::{AppError, Result};

// =====================================
// Constants
// =====================================
/// الفبای ۶۲ کاراکتری برای کدهای تولیدی
pub const SHORT_CODE_CHARS: &[u8] =
    b"abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

/// حداکثر طول URL اصلی
pub const MAX_URL_LENGTH: usize = 2048;

/// حداقل طول short code
pub const MIN_CUSTOM_CODE_LENGTH: usize = 3;

/// حداکثر طول short code
pub const MAX_CUSTOM_CODE_LENGTH: usize = 20;

/// تعداد entry‌های history که در پاسخ stats نمایش داده میشه
pub const HISTORY_DISPLAY_LIMIT: usize = 50;

/// مسیرهای ثابت router که روی `/:code` اولویت دارن
///
/// کدی با این نام‌ها هیچوقت به redirect نمیرسه.
pub const RESERVED_CODES: &[&str] = &["links", "logs", "health"];

/// آیا کد با یک مسیر ثابت router تداخل داره؟
#[must_use]
pub fn is_reserved_code(code: &str) -> bool {
    RESERVED_CODES.contains(&code)
}

// =====================================
// Lazy Statics (Regex patterns)
// =====================================
/// الگوی کاراکترهای مجاز short code
pub static VALID_SHORT_CODE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[A-Za-z0-9_-]+$").expect("Invalid regex pattern")
});

// =====================================
// Random Fragments
// =====================================
/// تولید رشته تصادفی از الفبای ۶۲ کاراکتری
///
/// هر کاراکتر به صورت یکنواخت انتخاب میشه.
///
/// # مثال
/// ```rust
/// use shortlink_registry::utils::random_alphanumeric;
///
/// let code = random_alphanumeric(10);
/// assert_eq!(code.len(), 10);
/// ```
#[must_use]
pub fn random_alphanumeric(length: usize) -> String {
    let mut rng = rand::thread_rng();

    (0..length)
        .map(|_| {
            let idx = rng.gen_range(0..SHORT_CODE_CHARS.len());
            SHORT_CODE_CHARS[idx] as char
        })
        .collect()
}

/// قطعه زمانی با دقت میلی‌ثانیه (base62)
///
/// چون زمان فقط جلو میره، دو فراخوانی با فاصله حداقل یک میلی‌ثانیه
/// قطعه‌های متفاوت میدن.
#[must_use]
pub fn millis_fragment(epoch_millis: u64) -> String {
    base62::encode(epoch_millis)
}

// =====================================
// Validation Functions
// =====================================
/// اعتبارسنجی و trim کردن URL بلند
///
/// # Returns
/// نسخه trim شده URL
///
/// # Errors
/// `Validation` اگه خالی باشه، از `MAX_URL_LENGTH` بلندتر باشه،
/// یا یک آدرس مطلق http/https نباشه
pub fn validate_long_url(raw: &str) -> Result<String> {
    let trimmed = raw.trim();

    if trimmed.is_empty() {
        return Err(AppError::Validation("Long URL must not be empty".to_string()));
    }

    if trimmed.len() > MAX_URL_LENGTH {
        return Err(AppError::Validation(format!(
            "Long URL exceeds {} characters",
            MAX_URL_LENGTH
        )));
    }

    match url::Url::parse(trimmed) {
        Ok(parsed) if matches!(parsed.scheme(), "http" | "https") => Ok(trimmed.to_string()),
        Ok(parsed) => Err(AppError::Validation(format!(
            "Unsupported URL scheme '{}'",
            parsed.scheme()
        ))),
        Err(e) => Err(AppError::Validation(format!("Malformed long URL: {}", e))),
    }
}

//! # تولیدکننده کد کوتاه
//!
//! تولید کدهای تصادفی، اعتبارسنجی کد سفارشی و پیدا کردن کد یکتا.
//!
//! ## الگوریتم `find_unique`
//! 1. حداکثر ۱۰ تلاش؛ هر ۳ تلاش یک کاراکتر به طول اضافه میشه
//! 2. بعد از آن، کد = قطعه تصادفی + قطعه زمانی میلی‌ثانیه، تا وقتی که
//!    تکراری نباشه. قطعه زمانی از wall-clock (`Utc::now()`) خونده میشه،
//!    نه از `Clock` تزریق‌شده به Registry؛ با `ManualClock` ثابت هم
//!    بین تلاش‌ها (با یک میلی‌ثانیه صبر) جلو میره و حلقه تموم میشه.

use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use tracing::{debug, warn};

use crate::{
    error::Result,
    utils::{self, MAX_CUSTOM_CODE_LENGTH, MIN_CUSTOM_CODE_LENGTH, VALID_SHORT_CODE},
};

/// حداکثر تعداد تلاش تصادفی قبل از fallback زمانی
pub const MAX_GENERATION_ATTEMPTS: usize = 10;

/// هر چند تلاش یک کاراکتر به طول اضافه میشه
pub const LENGTH_STEP_ATTEMPTS: usize = 3;

/// طول قطعه تصادفی در کدهای fallback
const FALLBACK_RANDOM_LENGTH: usize = 4;

/// بررسی وجود یک کد
///
/// Registry این trait رو پیاده‌سازی میکنه؛ تست‌ها با mock برخوردها رو
/// شبیه‌سازی میکنن.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CodeLookup: Send + Sync {
    async fn code_exists(&self, code: &str) -> Result<bool>;
}

/// نتیجه اعتبارسنجی کد سفارشی
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CodeValidation {
    Valid,
    /// دلیل نامعتبر بودن
    Invalid(String),
}

impl CodeValidation {
    #[must_use]
    pub fn is_valid(&self) -> bool {
        matches!(self, Self::Valid)
    }
}

/// تولیدکننده کد
#[derive(Debug, Clone, Copy, Default)]
pub struct CodeGenerator;

impl CodeGenerator {
    /// کد تصادفی با طول مشخص؛ یکتا بودن تضمین نمیشه
    #[must_use]
    pub fn generate(length: usize) -> String {
        utils::random_alphanumeric(length)
    }

    /// اعتبارسنجی کد سفارشی
    ///
    /// معتبر اگه طول بین ۳ تا ۲۰ باشه و فقط `[A-Za-z0-9_-]` داشته باشه.
    #[must_use]
    pub fn validate_custom(code: &str) -> CodeValidation {
        let len = code.chars().count();

        if !(MIN_CUSTOM_CODE_LENGTH..=MAX_CUSTOM_CODE_LENGTH).contains(&len) {
            return CodeValidation::Invalid(format!(
                "Custom code must be {}-{} characters, got {}",
                MIN_CUSTOM_CODE_LENGTH, MAX_CUSTOM_CODE_LENGTH, len
            ));
        }

        if !VALID_SHORT_CODE.is_match(code) {
            return CodeValidation::Invalid(
                "Custom code may only contain letters, digits, '_' and '-'".to_string(),
            );
        }

        CodeValidation::Valid
    }

    /// شکل بولین `validate_custom`
    #[must_use]
    pub fn is_valid_custom(code: &str) -> bool {
        Self::validate_custom(code).is_valid()
    }

    /// پیدا کردن کدی که در `lookup` وجود نداره
    ///
    /// # Errors
    /// فقط خطای خود `lookup` (مثلا خطای store)
    pub async fn find_unique<L>(lookup: &L, base_length: usize) -> Result<String>
    where
        L: CodeLookup + ?Sized,
    {
        for attempt in 0..MAX_GENERATION_ATTEMPTS {
            let length = (base_length + attempt / LENGTH_STEP_ATTEMPTS).min(MAX_CUSTOM_CODE_LENGTH);
            let candidate = Self::generate(length);

            if !lookup.code_exists(&candidate).await? {
                return Ok(candidate);
            }

            debug!(attempt, length, "Generated code collided");
        }

        warn!(
            attempts = MAX_GENERATION_ATTEMPTS,
            "Random codes exhausted, falling back to time-based codes"
        );

        loop {
            let candidate = Self::time_based_candidate();

            if !lookup.code_exists(&candidate).await? {
                return Ok(candidate);
            }

            tokio::time::sleep(Duration::from_millis(1)).await;
        }
    }

    /// قطعه تصادفی + قطعه زمانی از wall-clock (`Utc::now()`)
    fn time_based_candidate() -> String {
        let millis = u64::try_from(Utc::now().timestamp_millis()).unwrap_or_default();
        format!(
            "{}{}",
            Self::generate(FALLBACK_RANDOM_LENGTH),
            utils::millis_fragment(millis)
        )
    }
}

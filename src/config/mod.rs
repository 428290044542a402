//! # ماژول تنظیمات (Configuration)
//!
//! این ماژول مسئول خوندن و مدیریت تنظیمات برنامه هست.
//!
//! ## منابع تنظیمات (به ترتیب اولویت)
//! 1. متغیرهای محیطی (`PORT`، `DATABASE_URL`، `AUDIT_LOG_CAP`، ...)
//! 2. فایل `.env` (توسط `dotenvy` در `main` لود میشه)
//! 3. مقادیر پیش‌فرض `Config::default()`
//!
//! لایه‌بندی منابع با crate `config` انجام میشه.

use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};
use crate::utils::{MAX_CUSTOM_CODE_LENGTH, MIN_CUSTOM_CODE_LENGTH};

/// مدت اعتبار پیش‌فرض لینک (دقیقه)
pub const DEFAULT_VALIDITY_MINS: u32 = 30;

/// سقف پیش‌فرض تعداد رکوردهای audit log
pub const DEFAULT_AUDIT_LOG_CAP: usize = 1000;

/// تنظیمات اصلی برنامه
///
/// # مثال
/// ```rust
/// use shortlink_registry::config::Config;
///
/// let config = Config::default();
/// assert_eq!(config.default_validity_mins, 30);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// آدرس هاست سرور
    pub host: String,

    /// پورت سرور
    pub port: u16,

    /// آدرس پایه برای لینک‌های کوتاه
    pub base_url: String,

    /// آدرس store؛ `memory` یعنی backend درون حافظه
    pub database_url: String,

    /// مدت اعتبار وقتی درخواست چیزی مشخص نکرده (دقیقه)
    pub default_validity_mins: u32,

    /// طول پایه کدهای تولیدی
    pub code_length: usize,

    /// حداکثر تعداد رکورد در audit log
    pub audit_log_cap: usize,

    /// حداکثر طول history هر لینک؛ صفر یعنی بدون محدودیت
    pub history_limit: usize,

    /// فرمت خروجی لاگ
    pub log_format: LogFormat,

    /// محیط اجرا (development, production)
    pub environment: Environment,
}

/// محیط اجرای برنامه
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase", from = "String")]
pub enum Environment {
    /// محیط توسعه
    #[default]
    Development,

    /// محیط تست
    Testing,

    /// محیط تولید
    Production,
}

impl Environment {
    /// آیا در محیط تولید هستیم؟
    #[must_use]
    pub fn is_production(&self) -> bool {
        matches!(self, Environment::Production)
    }
}

impl From<String> for Environment {
    fn from(s: String) -> Self {
        match s.to_lowercase().as_str() {
            "production" | "prod" => Environment::Production,
            "testing" | "test" => Environment::Testing,
            _ => Environment::Development,
        }
    }
}

/// فرمت لاگ‌ها
///
/// `pretty` برای ترمینال، `json` برای جمع‌آوری لاگ در production
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase", from = "String")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

impl From<String> for LogFormat {
    fn from(s: String) -> Self {
        match s.to_lowercase().as_str() {
            "json" => LogFormat::Json,
            _ => LogFormat::Pretty,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 3000,
            base_url: "http://localhost:3000".to_string(),
            database_url: "sqlite://data/shortlinks.db?mode=rwc".to_string(),
            default_validity_mins: DEFAULT_VALIDITY_MINS,
            code_length: 6,
            audit_log_cap: DEFAULT_AUDIT_LOG_CAP,
            history_limit: 0,
            log_format: LogFormat::Pretty,
            environment: Environment::Development,
        }
    }
}

impl Config {
    /// ساخت تنظیمات از متغیرهای محیطی
    ///
    /// مقادیر پیش‌فرض اول اضافه میشن و متغیرهای محیطی روشون override میشن.
    /// با `try_parsing` مقادیر عددی مثل `PORT=8080` درست تبدیل میشن.
    ///
    /// # Errors
    /// خطا برمیگردونه اگه یه متغیر قابل تبدیل به نوع فیلد نباشه
    pub fn from_env() -> Result<Self> {
        let settings = config::Config::builder()
            .add_source(config::Config::try_from(&Self::default())?)
            .add_source(config::Environment::default().try_parsing(true))
            .build()?;

        let config: Self = settings.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// اعتبارسنجی تنظیمات
    pub fn validate(&self) -> Result<()> {
        if self.port == 0 {
            return Err(AppError::Config("PORT cannot be 0".to_string()));
        }

        if self.default_validity_mins == 0 {
            return Err(AppError::Config(
                "DEFAULT_VALIDITY_MINS must be positive".to_string(),
            ));
        }

        if !(MIN_CUSTOM_CODE_LENGTH..=MAX_CUSTOM_CODE_LENGTH).contains(&self.code_length) {
            return Err(AppError::Config(format!(
                "CODE_LENGTH must be between {} and {}",
                MIN_CUSTOM_CODE_LENGTH, MAX_CUSTOM_CODE_LENGTH
            )));
        }

        if self.audit_log_cap == 0 {
            return Err(AppError::Config("AUDIT_LOG_CAP must be positive".to_string()));
        }

        Ok(())
    }

    /// آدرس کامل سرور
    #[must_use]
    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// سقف history به صورت Option (صفر = بدون سقف)
    #[must_use]
    pub fn history_limit(&self) -> Option<usize> {
        (self.history_limit > 0).then_some(self.history_limit)
    }
}

// =====================================
// Builder Pattern
// =====================================
/// ساخت Config با Builder Pattern
///
/// # مثال
/// ```rust
/// use shortlink_registry::config::ConfigBuilder;
///
/// let config = ConfigBuilder::new()
///     .port(8080)
///     .database_url("memory")
///     .build();
/// assert_eq!(config.port, 8080);
/// ```
#[derive(Debug, Default)]
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    /// ساخت builder جدید
    #[must_use]
    pub fn new() -> Self {
        Self {
            config: Config::default(),
        }
    }

    #[must_use]
    pub fn port(mut self, port: u16) -> Self {
        self.config.port = port;
        self
    }

    #[must_use]
    pub fn host(mut self, host: impl Into<String>) -> Self {
        self.config.host = host.into();
        self
    }

    #[must_use]
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.config.base_url = url.into();
        self
    }

    #[must_use]
    pub fn database_url(mut self, url: impl Into<String>) -> Self {
        self.config.database_url = url.into();
        self
    }

    /// تنظیم مدت اعتبار پیش‌فرض (دقیقه)
    #[must_use]
    pub fn default_validity_mins(mut self, mins: u32) -> Self {
        self.config.default_validity_mins = mins;
        self
    }

    #[must_use]
    pub fn code_length(mut self, length: usize) -> Self {
        self.config.code_length = length;
        self
    }

    /// تنظیم سقف audit log
    #[must_use]
    pub fn audit_log_cap(mut self, cap: usize) -> Self {
        self.config.audit_log_cap = cap;
        self
    }

    /// تنظیم سقف history (صفر = بدون سقف)
    #[must_use]
    pub fn history_limit(mut self, limit: usize) -> Self {
        self.config.history_limit = limit;
        self
    }

    #[must_use]
    pub fn environment(mut self, env: Environment) -> Self {
        self.config.environment = env;
        self
    }

    /// ساخت Config نهایی
    #[must_use]
    pub fn build(self) -> Config {
        self.config
    }

    /// ساخت Config با اعتبارسنجی
    ///
    /// # Errors
    /// خطا برمیگردونه اگه اعتبارسنجی fail بشه
    pub fn build_validated(self) -> Result<Config> {
        let config = self.build();
        config.validate()?;
        Ok(config)
    }
}

//! # ActionMiddleware
//!
//! هر عمل کسب‌وکار رو بین دو رویداد audit میپیچه:
//!
//! ```text
//! action.start {actionName, argCount}
//!     ├── Ok  → action.success {actionName}
//!     └── Err → action.error   {actionName, message}  (و همون خطا برمیگرده)
//! ```
//!
//! شکست در نوشتن audit هیچوقت نتیجه خود عمل رو عوض نمیکنه.

use std::future::Future;

use serde_json::json;
use tracing::{debug, info_span, warn, Instrument};

use super::AuditLog;
use crate::{error::Result, models::event_types};

/// Middleware ثبت عمل‌ها
#[derive(Clone)]
pub struct ActionMiddleware {
    audit: AuditLog,
}

impl ActionMiddleware {
    #[must_use]
    pub fn new(audit: AuditLog) -> Self {
        Self { audit }
    }

    /// اجرای `action` با رویدادهای شروع/موفقیت/خطا
    ///
    /// # Arguments
    /// * `action_name` - نام عمل در رویدادها (مثلا `createShortLink`)
    /// * `arg_count` - تعداد ورودی‌های ارائه‌شده
    /// * `action` - خود عمل
    ///
    /// # Errors
    /// دقیقا همون خطای `action`، بدون تغییر
    pub async fn wrap<T, F, Fut>(&self, action_name: &str, arg_count: usize, action: F) -> Result<T>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        self.audit
            .record(
                event_types::ACTION_START,
                json!({ "actionName": action_name, "argCount": arg_count }),
            )
            .await;

        let result = action()
            .instrument(info_span!("action", action = %action_name))
            .await;

        match &result {
            Ok(_) => {
                debug!(action = %action_name, "Action succeeded");
                self.audit
                    .record(
                        event_types::ACTION_SUCCESS,
                        json!({ "actionName": action_name }),
                    )
                    .await;
            }
            Err(e) => {
                warn!(action = %action_name, error = %e, "Action failed");
                self.audit
                    .record(
                        event_types::ACTION_ERROR,
                        json!({ "actionName": action_name, "message": e.to_string() }),
                    )
                    .await;
            }
        }

        result
    }
}

//! # منبع زمان (Clock)
//!
//! همه محاسبات انقضا و timestamp‌ها از یک `Clock` تزریق‌شده زمان رو میخونن،
//! تا تست‌ها بتونن با `ManualClock` زمان رو جلو ببرن.

use std::fmt::Debug;
use std::sync::{Arc, Mutex};

use chrono::{DateTime, Duration, SubsecRound, Utc};

/// منبع زمان فعلی
///
/// دقت زمان‌ها میلی‌ثانیه است، همون دقتی که در store ذخیره میشه؛
/// پس رکورد برگشتی از `create` با رکورد خونده‌شده از store برابره.
pub trait Clock: Send + Sync + Debug {
    fn now(&self) -> DateTime<Utc>;
}

/// ساعت سیستم
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now().trunc_subsecs(3)
    }
}

/// ساعت دستی برای تست
///
/// Clone‌ها زمان مشترک دارن، پس میشه یکی رو به سرویس داد و
/// با دیگری زمان رو جلو برد.
///
/// # مثال
/// ```rust
/// use chrono::Duration;
/// use shortlink_registry::utils::{Clock, ManualClock};
///
/// let clock = ManualClock::default();
/// let start = clock.now();
/// clock.advance(Duration::seconds(61));
/// assert_eq!(clock.now() - start, Duration::seconds(61));
/// ```
#[derive(Debug, Clone)]
pub struct ManualClock {
    current: Arc<Mutex<DateTime<Utc>>>,
}

impl ManualClock {
    #[must_use]
    pub fn new(start: DateTime<Utc>) -> Self {
        Self {
            current: Arc::new(Mutex::new(start.trunc_subsecs(3))),
        }
    }

    /// جلو بردن زمان
    pub fn advance(&self, by: Duration) {
        let mut current = self.current.lock().unwrap_or_else(|e| e.into_inner());
        *current = (*current + by).trunc_subsecs(3);
    }

    /// تنظیم مستقیم زمان
    pub fn set(&self, to: DateTime<Utc>) {
        *self.current.lock().unwrap_or_else(|e| e.into_inner()) = to.trunc_subsecs(3);
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new(Utc::now())
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        *self.current.lock().unwrap_or_else(|e| e.into_inner())
    }
}

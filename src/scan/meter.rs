//! Weekly free-scan metering.
//!
//! One record per user, stored under `scan_usage:{user}`. Staleness is checked
//! on every read: when the stored week differs from the current one the
//! weekly fields are reset in place and the lifetime total is kept. Missed
//! weeks are not replayed.

use std::{future::Future, sync::Arc};

use axum::extract::FromRef;
use serde::{Deserialize, Serialize};
use time::{Date, OffsetDateTime};
use tracing::info;
use uuid::Uuid;

use crate::{
    clock::{iso_date, week_start, Clock},
    state::AppState,
    storage::{keys, load, save, KeyLocks, KvStore, StoreError},
};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScanUsage {
    pub user_id: Uuid,
    #[serde(with = "iso_date")]
    pub week_start: Date,
    /// Scans this week.
    pub count: u32,
    /// Lifetime scans; never reset.
    pub total_scans: u32,
    /// First moment this week the count reached the cap.
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub hit_limit_at: Option<OffsetDateTime>,
    #[serde(default)]
    pub early_access_clicked: bool,
}

impl ScanUsage {
    pub fn fresh(user_id: Uuid, week_start: Date) -> Self {
        Self {
            user_id,
            week_start,
            count: 0,
            total_scans: 0,
            hit_limit_at: None,
            early_access_clicked: false,
        }
    }

    /// Moves the record into `week`. Returns whether anything was reset.
    pub fn roll_to(&mut self, week: Date) -> bool {
        if self.week_start == week {
            return false;
        }
        self.week_start = week;
        self.count = 0;
        self.hit_limit_at = None;
        self.early_access_clicked = false;
        true
    }

    /// Counts one scan. Stamps `hit_limit_at` only on the first crossing of
    /// the cap within the week. Returns whether this scan stamped it.
    pub fn record_scan(&mut self, cap: u32, now: OffsetDateTime) -> bool {
        let first_hit = self.count + 1 >= cap && self.hit_limit_at.is_none();
        self.count += 1;
        self.total_scans += 1;
        if first_hit {
            self.hit_limit_at = Some(now);
        }
        first_hit
    }

    pub fn can_scan(&self, cap: u32) -> bool {
        self.count < cap
    }

    pub fn remaining(&self, cap: u32) -> u32 {
        cap.saturating_sub(self.count)
    }
}

/// Outcome of a metered action.
#[derive(Debug)]
pub enum Metered<T> {
    Granted { value: T, usage: ScanUsage },
    /// Cap already reached; the action did not run and nothing was counted.
    Denied { usage: ScanUsage },
}

#[derive(Clone)]
pub struct UsageMeter {
    store: Arc<dyn KvStore>,
    clock: Arc<dyn Clock>,
    locks: Arc<KeyLocks>,
    cap: u32,
}

impl FromRef<AppState> for UsageMeter {
    fn from_ref(state: &AppState) -> Self {
        Self::new(
            state.store.clone(),
            state.clock.clone(),
            state.locks.clone(),
            state.config.scan.weekly_cap,
        )
    }
}

impl UsageMeter {
    pub fn new(
        store: Arc<dyn KvStore>,
        clock: Arc<dyn Clock>,
        locks: Arc<KeyLocks>,
        cap: u32,
    ) -> Self {
        Self {
            store,
            clock,
            locks,
            cap,
        }
    }

    pub fn cap(&self) -> u32 {
        self.cap
    }

    /// Current usage, creating or resetting the stored record as needed.
    pub async fn get_usage(&self, user_id: Uuid) -> Result<ScanUsage, StoreError> {
        let key = keys::scan_usage(user_id);
        let _guard = self.locks.lock(&key).await;
        self.current(user_id, &key).await
    }

    pub async fn increment(&self, user_id: Uuid) -> Result<ScanUsage, StoreError> {
        let key = keys::scan_usage(user_id);
        let _guard = self.locks.lock(&key).await;
        let mut usage = self.current(user_id, &key).await?;
        self.count_scan(&key, &mut usage).await?;
        Ok(usage)
    }

    pub async fn mark_early_access_clicked(&self, user_id: Uuid) -> Result<ScanUsage, StoreError> {
        let key = keys::scan_usage(user_id);
        let _guard = self.locks.lock(&key).await;
        let mut usage = self.current(user_id, &key).await?;
        if !usage.early_access_clicked {
            usage.early_access_clicked = true;
            save(self.store.as_ref(), &key, &usage).await?;
            info!(%user_id, "early access clicked");
        }
        Ok(usage)
    }

    pub async fn can_scan(&self, user_id: Uuid) -> Result<bool, StoreError> {
        Ok(self.get_usage(user_id).await?.can_scan(self.cap))
    }

    /// Runs `work` only while under the cap and counts it only if it
    /// succeeds. The user's record stays locked for the whole sequence, so
    /// parallel requests cannot overshoot the cap.
    pub async fn metered<T, E, F, Fut>(&self, user_id: Uuid, work: F) -> Result<Metered<T>, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: From<StoreError>,
    {
        let key = keys::scan_usage(user_id);
        let _guard = self.locks.lock(&key).await;
        let mut usage = self.current(user_id, &key).await?;
        if !usage.can_scan(self.cap) {
            info!(%user_id, count = usage.count, cap = self.cap, "scan refused at weekly cap");
            return Ok(Metered::Denied { usage });
        }
        let value = work().await?;
        self.count_scan(&key, &mut usage).await?;
        Ok(Metered::Granted { value, usage })
    }

    /// Stored record without rollover, as persisted.
    pub async fn peek(&self, user_id: Uuid) -> Result<Option<ScanUsage>, StoreError> {
        load(self.store.as_ref(), &keys::scan_usage(user_id)).await
    }

    async fn current(&self, user_id: Uuid, key: &str) -> Result<ScanUsage, StoreError> {
        let week = week_start(self.clock.today());
        match load::<ScanUsage>(self.store.as_ref(), key).await? {
            None => {
                let fresh = ScanUsage::fresh(user_id, week);
                save(self.store.as_ref(), key, &fresh).await?;
                Ok(fresh)
            }
            Some(mut usage) => {
                let previous = usage.week_start;
                if usage.roll_to(week) {
                    save(self.store.as_ref(), key, &usage).await?;
                    info!(%user_id, %previous, week = %week, "weekly scan count reset");
                }
                Ok(usage)
            }
        }
    }

    async fn count_scan(&self, key: &str, usage: &mut ScanUsage) -> Result<(), StoreError> {
        let now = self.clock.now();
        if usage.record_scan(self.cap, now) {
            info!(user_id = %usage.user_id, count = usage.count, "weekly scan cap reached");
        }
        save(self.store.as_ref(), key, usage).await
    }
}

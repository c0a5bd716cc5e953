// SPDX-FileCopyrightText: 2026 The calport authors
//
// SPDX-License-Identifier: Apache-2.0

//! Periodic refresh of a remote calendar URL into a store.

use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use serde::Deserialize;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use crate::handler::{IcsHandler, ImportOptions};
use crate::store::CalendarStore;

/// Configuration of a calendar subscription.
#[derive(Debug, Clone, Deserialize)]
pub struct SubscriptionConfig {
    /// Remote calendar URL.
    pub url: String,

    /// Seconds between refreshes.
    #[serde(default = "default_interval_secs")]
    pub interval_secs: u64,

    /// Import policies applied on every refresh.
    #[serde(default)]
    pub import: ImportOptions,
}

fn default_interval_secs() -> u64 {
    3600
}

impl SubscriptionConfig {
    /// A config for the given URL with the default hourly interval and
    /// default import policies.
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            interval_secs: default_interval_secs(),
            import: ImportOptions::default(),
        }
    }
}

/// Lifecycle state of a subscription.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubscriptionStatus {
    /// Refreshing on schedule; the last refresh succeeded.
    Active,
    /// The last refresh failed; the schedule keeps running.
    Error,
    /// Stopped by the caller, or never started.
    Stopped,
}

/// A background task that refreshes a remote calendar into a shared handler
/// on a fixed interval.
///
/// The handler mutex is held for the whole of each refresh, so a manual
/// [`refresh`](Self::refresh) and the scheduled one never interleave imports.
#[derive(Debug)]
pub struct Subscription<S: CalendarStore + Send + 'static> {
    handler: Arc<tokio::sync::Mutex<IcsHandler<S>>>,
    config: SubscriptionConfig,
    status: Arc<Mutex<SubscriptionStatus>>,
    task: Option<JoinHandle<()>>,
    shutdown: watch::Sender<bool>,
}

impl<S: CalendarStore + Send + 'static> Subscription<S> {
    /// Creates a stopped subscription over a shared handler.
    pub fn new(handler: Arc<tokio::sync::Mutex<IcsHandler<S>>>, config: SubscriptionConfig) -> Self {
        let (shutdown, _) = watch::channel(false);
        Self {
            handler,
            config,
            status: Arc::new(Mutex::new(SubscriptionStatus::Stopped)),
            task: None,
            shutdown,
        }
    }

    /// The shared handler, for reading store contents alongside the task.
    pub fn handler(&self) -> Arc<tokio::sync::Mutex<IcsHandler<S>>> {
        Arc::clone(&self.handler)
    }

    /// Current lifecycle state.
    pub fn status(&self) -> SubscriptionStatus {
        *self
            .status
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    /// Starts the refresh schedule. The first refresh runs immediately.
    /// Calling this on a running subscription is a no-op.
    pub fn start(&mut self) {
        if self.task.is_some() {
            return;
        }

        let handler = Arc::clone(&self.handler);
        let status = Arc::clone(&self.status);
        let config = self.config.clone();
        let mut shutdown = self.shutdown.subscribe();

        set_status(&self.status, SubscriptionStatus::Active);
        self.task = Some(tokio::spawn(async move {
            let mut ticker = tokio::time::interval(Duration::from_secs(config.interval_secs));
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                tokio::select! {
                    _ = ticker.tick() => {
                        refresh_once(&handler, &config, &status).await;
                    }
                    _ = shutdown.changed() => break,
                }
            }
        }));
        tracing::info!(url = %self.config.url, interval_secs = self.config.interval_secs, "subscription started");
    }

    /// Runs one refresh outside the schedule, on the caller's task.
    pub async fn refresh(&self) {
        refresh_once(&self.handler, &self.config, &self.status).await;
    }

    /// Stops the schedule and waits for the task to wind down.
    pub async fn stop(&mut self) {
        if let Some(task) = self.task.take() {
            let _ = self.shutdown.send(true);
            let _ = task.await;
        }
        set_status(&self.status, SubscriptionStatus::Stopped);
        tracing::info!(url = %self.config.url, "subscription stopped");
    }
}

async fn refresh_once<S: CalendarStore + Send + 'static>(
    handler: &tokio::sync::Mutex<IcsHandler<S>>,
    config: &SubscriptionConfig,
    status: &Mutex<SubscriptionStatus>,
) {
    let mut handler = handler.lock().await;
    match handler.import_from_url(&config.url, &config.import).await {
        Ok(outcome) => {
            set_status(status, SubscriptionStatus::Active);
            tracing::debug!(
                url = %config.url,
                imported = outcome.imported.len(),
                updated = outcome.updated.len(),
                "subscription refreshed"
            );
        }
        Err(e) => {
            set_status(status, SubscriptionStatus::Error);
            tracing::warn!(url = %config.url, error = %e, "subscription refresh failed");
        }
    }
}

fn set_status(status: &Mutex<SubscriptionStatus>, value: SubscriptionStatus) {
    *status.lock().unwrap_or_else(PoisonError::into_inner) = value;
}

//! Live monitor: poll `GET /status`, fall back to synthetic readings.

use std::sync::{Arc, Mutex, PoisonError};

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{interval, MissedTickBehavior};

use crate::context::DashContext;
use crate::display::Surface;
use crate::error::StatusError;
use crate::fallback::{generate, RngSource, SyntheticSource};
use crate::health::HealthClass;
use crate::logging::{agg_increment, log, log_tick, obj, tick_aggregator, v_num, Domain, Level};
use crate::reading::Reading;
use crate::render::{classify_and_render, Panel};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Source {
    Live,
    Synthetic,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TickOutcome {
    pub source: Source,
    pub reading: Reading,
    pub class: HealthClass,
}

pub struct LiveStatusPoller {
    ctx: DashContext,
    source: Mutex<Box<dyn SyntheticSource + Send>>,
}

impl LiveStatusPoller {
    /// Poller whose fallback is seeded from `config.fallback_seed`.
    pub fn new(ctx: DashContext) -> Self {
        let source = RngSource::from_seed(ctx.config.fallback_seed);
        Self::with_source(ctx, Box::new(source))
    }

    pub fn with_source(ctx: DashContext, source: Box<dyn SyntheticSource + Send>) -> Self {
        Self {
            ctx,
            source: Mutex::new(source),
        }
    }

    async fn fetch_live(&self) -> Result<Reading, StatusError> {
        let payload = self.ctx.backend.status().await?;
        payload.into_reading()
    }

    fn synthetic(&self) -> Reading {
        let mut source = self.source.lock().unwrap_or_else(PoisonError::into_inner);
        generate(&mut **source)
    }

    /// One poll. Never fails: any error is replaced by a synthetic reading.
    pub async fn tick(&self) -> TickOutcome {
        let (source, reading, cause) = match self.fetch_live().await {
            Ok(reading) => (Source::Live, reading, None),
            Err(err) => (Source::Synthetic, self.synthetic(), Some(err.to_string())),
        };

        let class = {
            let mut surface = self.ctx.surface();
            let class = classify_and_render(&mut *surface, Panel::Live, &reading);
            surface.flush();
            class
        };

        match source {
            Source::Live => agg_increment("live_tick"),
            Source::Synthetic => agg_increment("synthetic_tick"),
        }
        log_tick(
            match source {
                Source::Live => "live",
                Source::Synthetic => "synthetic",
            },
            reading.soh,
            reading.cycle,
            class.tier.as_str(),
            cause.as_deref(),
        );
        tick_aggregator();

        TickOutcome {
            source,
            reading,
            class,
        }
    }

    /// Tick immediately, then every `config.poll_interval()` until stopped.
    pub fn start(self: Arc<Self>) -> PollerHandle {
        let (stop_tx, mut stop_rx) = watch::channel(false);
        let period = self.ctx.config.poll_interval();
        log(
            Level::Info,
            Domain::Monitor,
            "poller_start",
            obj(&[("period_ms", v_num(period.as_millis() as f64))]),
        );
        let task = tokio::spawn(async move {
            let mut ticker = interval(period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                tokio::select! {
                    _ = ticker.tick() => {}
                    _ = stop_rx.changed() => break,
                }
                self.tick().await;
            }
            log(Level::Info, Domain::Monitor, "poller_stop", obj(&[]));
        });
        PollerHandle { stop_tx, task }
    }
}

/// Owns the polling task. Dropping the handle also ends the loop, without
/// waiting for it.
pub struct PollerHandle {
    stop_tx: watch::Sender<bool>,
    task: JoinHandle<()>,
}

impl PollerHandle {
    /// Signal the loop and wait for it; an in-flight tick completes first.
    pub async fn stop(self) {
        let _ = self.stop_tx.send(true);
        let _ = self.task.await;
    }
}

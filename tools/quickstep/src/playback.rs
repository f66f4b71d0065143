//! Manual and automatic playback on top of the replay engine.
//!
//! Both modes go through [`PlaybackController::next_step`], so automatic
//! playback is only a deadline in front of the same one-step contract.

use crate::config::AppConfig;
use crate::errors::QuickstepError;
use crate::logging::{JsonlLogger, LogEvent};
use crate::render::{Presenter, RenderInstruction};
use crate::replay::{Advance, ReplayEngine};
use crate::runtime::Clock;
use crate::trace::{fingerprint, generate};
use crate::types::PlaybackMode;
use serde_json::{json, Value};
use std::time::{Duration, Instant};

pub const MIN_INTERVAL_MS: u64 = 1;
pub const MAX_INTERVAL_MS: u64 = 5000;

pub const START_BANNER: &str = "--- Start ---";
pub const STOP_BANNER: &str = "--- Stop ---";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunSummary {
    pub steps_applied: usize,
    pub stopped_early: bool,
}

pub struct PlaybackController {
    engine: ReplayEngine,
    mode: PlaybackMode,
    interval: Duration,
    running: bool,
    shuffle_enabled: bool,
    next_tick: Option<Instant>,
    fingerprint: Option<String>,
    logger: Option<JsonlLogger>,
}

impl PlaybackController {
    pub fn new(cfg: &AppConfig) -> Result<Self, QuickstepError> {
        check_interval(cfg.playback.interval_ms)?;
        Ok(Self {
            engine: ReplayEngine::new(cfg.board.elements, cfg.bounds())?,
            mode: cfg.playback.mode,
            interval: Duration::from_millis(cfg.playback.interval_ms),
            running: false,
            shuffle_enabled: true,
            next_tick: None,
            fingerprint: None,
            logger: None,
        })
    }

    pub fn with_logger(mut self, logger: JsonlLogger) -> Self {
        self.logger = Some(logger);
        self
    }

    pub fn engine(&self) -> &ReplayEngine {
        &self.engine
    }

    pub fn mode(&self) -> PlaybackMode {
        self.mode
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn shuffle_enabled(&self) -> bool {
        self.shuffle_enabled
    }

    /// Fingerprint of the trace loaded by the latest `start`.
    pub fn trace_fingerprint(&self) -> Option<&str> {
        self.fingerprint.as_deref()
    }

    /// Generates a trace for `values`, resets the markers and plays the
    /// first step. Nothing changes if the values are rejected.
    pub fn start(
        &mut self,
        values: &[i64],
        presenter: &mut dyn Presenter,
    ) -> Result<Advance, QuickstepError> {
        if self.running {
            return Err(QuickstepError::Playback(
                "a run is already in progress; stop it first".to_string(),
            ));
        }
        self.engine.bounds().check(values.len())?;
        let trace = generate(values)?;
        let digest = fingerprint(&trace)?;

        self.engine.reset(values.len())?;
        let steps = trace.len();
        self.engine.load(trace);
        presenter.remove_markers();
        self.running = true;
        self.shuffle_enabled = false;
        self.next_tick = None;
        presenter.log_message(START_BANNER);
        self.record(LogEvent::info(
            "run_started",
            json!({
                "values": values,
                "steps": steps,
                "fingerprint": digest,
            }),
        ))?;
        self.fingerprint = Some(digest);

        self.next_step(presenter)
    }

    /// Discards the rest of the trace. Already applied exchanges stay.
    pub fn stop(&mut self, presenter: &mut dyn Presenter) -> Result<(), QuickstepError> {
        if !self.running {
            return Ok(());
        }
        let remaining = self.engine.remaining();
        self.engine.reset(self.engine.element_count())?;
        presenter.remove_markers();
        self.running = false;
        self.shuffle_enabled = true;
        self.next_tick = None;
        presenter.log_message(STOP_BANNER);
        self.record(LogEvent::info(
            "run_stopped",
            json!({ "discarded_steps": remaining }),
        ))
    }

    /// Applies exactly one step, or signals completion once the trace is
    /// exhausted (or was never loaded).
    pub fn next_step(&mut self, presenter: &mut dyn Presenter) -> Result<Advance, QuickstepError> {
        let advance = self.engine.advance();
        match &advance {
            Advance::Step { step, instructions } => {
                presenter.apply_all(instructions);
                let underflow = instructions
                    .iter()
                    .any(|i| matches!(i, RenderInstruction::NotifyUnderflow { .. }));
                let payload = json!({
                    "seq": self.engine.applied_steps(),
                    "kind": step.kind(),
                    "step": to_json(step)?,
                    "instructions": to_json(instructions)?,
                });
                if underflow {
                    self.record(LogEvent::warn("underflow", payload))?;
                } else {
                    self.record(LogEvent::info("step", payload))?;
                }
            }
            Advance::SortComplete => {
                presenter.notify_sort_complete();
                if self.running {
                    self.running = false;
                    self.shuffle_enabled = true;
                    self.next_tick = None;
                    self.record(LogEvent::info(
                        "sort_complete",
                        json!({ "steps": self.engine.applied_steps() }),
                    ))?;
                }
            }
        }
        Ok(advance)
    }

    pub fn set_auto_interval(&mut self, ms: u64) -> Result<(), QuickstepError> {
        check_interval(ms)?;
        self.interval = Duration::from_millis(ms);
        Ok(())
    }

    pub fn set_mode(&mut self, mode: PlaybackMode, now: Instant) {
        self.mode = mode;
        self.next_tick = match mode {
            PlaybackMode::Automatic if self.running => Some(now + self.interval),
            _ => None,
        };
    }

    pub fn toggle_auto(&mut self, now: Instant) -> PlaybackMode {
        let next = match self.mode {
            PlaybackMode::Manual => PlaybackMode::Automatic,
            PlaybackMode::Automatic => PlaybackMode::Manual,
        };
        self.set_mode(next, now);
        next
    }

    /// Time left until the automatic timer fires, if it is armed.
    pub fn time_until_tick(&self, now: Instant) -> Option<Duration> {
        if self.mode != PlaybackMode::Automatic || !self.running {
            return None;
        }
        Some(
            self.next_tick
                .map(|deadline| deadline.saturating_duration_since(now))
                .unwrap_or(self.interval),
        )
    }

    /// Timer callback: advances once when the automatic deadline has passed.
    pub fn tick(
        &mut self,
        now: Instant,
        presenter: &mut dyn Presenter,
    ) -> Result<Option<Advance>, QuickstepError> {
        if self.mode != PlaybackMode::Automatic || !self.running {
            return Ok(None);
        }
        let deadline = *self.next_tick.get_or_insert(now + self.interval);
        if now < deadline {
            return Ok(None);
        }
        let advance = self.next_step(presenter)?;
        if self.running {
            self.next_tick = Some(now + self.interval);
        }
        Ok(Some(advance))
    }

    /// Drives automatic playback until the sort completes or `should_stop`
    /// asks for a stop, sleeping on `clock` between ticks.
    pub fn run_to_completion(
        &mut self,
        clock: &dyn Clock,
        presenter: &mut dyn Presenter,
        should_stop: &mut dyn FnMut() -> bool,
    ) -> Result<RunSummary, QuickstepError> {
        self.set_mode(PlaybackMode::Automatic, clock.now());
        let mut summary = RunSummary {
            steps_applied: 0,
            stopped_early: false,
        };
        while self.running {
            if should_stop() {
                self.stop(presenter)?;
                summary.stopped_early = true;
                break;
            }
            let deadline = self.next_tick.unwrap_or_else(|| clock.now());
            clock.sleep_until(deadline)?;
            if let Some(Advance::Step { .. }) = self.tick(clock.now(), presenter)? {
                summary.steps_applied += 1;
            }
        }
        Ok(summary)
    }

    pub fn record_shuffle(&self, values: &[i64]) -> Result<(), QuickstepError> {
        self.record(LogEvent::info(
            "shuffled",
            json!({ "count": values.len(), "values": values }),
        ))
    }

    /// Changes the element count: any run is stopped first. An invalid count
    /// is rejected before anything changes.
    pub fn resize(
        &mut self,
        count: usize,
        presenter: &mut dyn Presenter,
    ) -> Result<(), QuickstepError> {
        self.engine.bounds().check(count)?;
        self.stop(presenter)?;
        let previous = self.engine.element_count();
        self.engine.reset(count)?;
        self.fingerprint = None;
        self.record(LogEvent::info(
            "resized",
            json!({ "from": previous, "to": count }),
        ))
    }

    fn record(&self, event: LogEvent<'_>) -> Result<(), QuickstepError> {
        match &self.logger {
            Some(logger) => logger.append(&event),
            None => Ok(()),
        }
    }
}

fn check_interval(ms: u64) -> Result<(), QuickstepError> {
    if !(MIN_INTERVAL_MS..=MAX_INTERVAL_MS).contains(&ms) {
        return Err(QuickstepError::InvalidInterval(ms));
    }
    Ok(())
}

fn to_json<T: serde::Serialize + ?Sized>(value: &T) -> Result<Value, QuickstepError> {
    serde_json::to_value(value).map_err(|e| QuickstepError::Io(e.to_string()))
}

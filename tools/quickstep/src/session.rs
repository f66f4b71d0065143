use crate::board::Board;
use crate::config::AppConfig;
use crate::errors::QuickstepError;
use crate::playback::{PlaybackController, MAX_INTERVAL_MS, MIN_INTERVAL_MS};
use crate::render::Presenter;
use crate::replay::Advance;
use crate::types::PlaybackMode;
use rand::rngs::SmallRng;
use rand::SeedableRng;
use std::time::Instant;

/// The board plus its playback controller, wired the way the front-ends use
/// them: shuffle, start/stop, single step, automatic mode and resizing.
pub struct Session {
    pub board: Board,
    pub playback: PlaybackController,
    rng: SmallRng,
}

impl Session {
    pub fn new(cfg: &AppConfig, seed: Option<u64>) -> Result<Self, QuickstepError> {
        let rng = match seed {
            Some(seed) => SmallRng::seed_from_u64(seed),
            None => SmallRng::from_os_rng(),
        };
        Ok(Self {
            board: Board::fresh(cfg.board.elements),
            playback: PlaybackController::new(cfg)?,
            rng,
        })
    }

    /// Starts from an explicit arrangement instead of `1..=n`.
    pub fn with_values(cfg: &AppConfig, values: &[i64]) -> Result<Self, QuickstepError> {
        let mut cfg = cfg.clone();
        cfg.board.elements = values.len();
        let mut session = Self::new(&cfg, Some(0))?;
        session.board = Board::from_values(values);
        Ok(session)
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng = SmallRng::seed_from_u64(seed);
        self
    }

    pub fn shuffle(&mut self) -> Result<(), QuickstepError> {
        if !self.playback.shuffle_enabled() {
            return Err(QuickstepError::Playback(
                "shuffling is disabled while a run is active".to_string(),
            ));
        }
        self.board.shuffle(&mut self.rng);
        self.playback.record_shuffle(&self.board.values())
    }

    /// Starts a run from the board's current order, or stops the active one.
    pub fn start_or_stop(&mut self) -> Result<Option<Advance>, QuickstepError> {
        if self.playback.is_running() {
            self.playback.stop(&mut self.board)?;
            return Ok(None);
        }
        let values = self.board.values();
        self.playback.start(&values, &mut self.board).map(Some)
    }

    pub fn next_step(&mut self) -> Result<Advance, QuickstepError> {
        self.playback.next_step(&mut self.board)
    }

    pub fn toggle_auto(&mut self, now: Instant) -> PlaybackMode {
        let mode = self.playback.toggle_auto(now);
        self.board
            .log_message(&format!("Playback mode: {}", mode.as_str()));
        mode
    }

    pub fn tick(&mut self, now: Instant) -> Result<Option<Advance>, QuickstepError> {
        self.playback.tick(now, &mut self.board)
    }

    /// Adjusts the automatic period, clamped to the allowed range.
    pub fn change_interval(&mut self, delta_ms: i64) -> Result<u64, QuickstepError> {
        let current = self.playback.interval().as_millis() as i64;
        let next = (current + delta_ms).clamp(MIN_INTERVAL_MS as i64, MAX_INTERVAL_MS as i64) as u64;
        self.playback.set_auto_interval(next)?;
        Ok(next)
    }

    pub fn resize(&mut self, count: usize) -> Result<(), QuickstepError> {
        let previous = self.board.len();
        self.playback.resize(count, &mut self.board)?;
        self.board.recreate(count);
        self.board.log_message(&format!(
            "Updated number of elements: {previous} -> {count}"
        ));
        Ok(())
    }
}

pub mod board;
pub mod config;
pub mod errors;
pub mod hotkeys;
pub mod log_retention;
pub mod logging;
pub mod playback;
pub mod render;
pub mod replay;
pub mod runtime;
pub mod session;
pub mod step;
pub mod trace;
pub mod tui;
pub mod types;

use clap::{error::ErrorKind, CommandFactory, Parser};
use config::{load_config, AppConfig, CliOverrides};
use errors::QuickstepError;
use logging::{structured_fallback_line, JsonlLogger};
use runtime::ProductionRuntime;
use session::Session;
use types::PlaybackMode;

#[derive(Debug, Clone, Parser)]
#[command(name = "quickstep")]
#[command(version)]
#[command(about = "Step-by-step Quicksort replay on a terminal board")]
pub struct Cli {
    #[arg(long)]
    pub config: Option<std::path::PathBuf>,
    /// Number of elements on a fresh board (values 1..=N).
    #[arg(long)]
    pub elements: Option<usize>,
    /// Explicit starting arrangement, e.g. `--values 3,1,2`.
    #[arg(long, value_delimiter = ',', allow_negative_numbers = true)]
    pub values: Vec<i64>,
    #[arg(long)]
    pub seed: Option<u64>,
    #[arg(long, default_value_t = false)]
    pub shuffle: bool,
    #[arg(long = "interval-ms")]
    pub interval_ms: Option<u64>,
    #[arg(long, default_value_t = false)]
    pub auto: bool,
    /// Replay to completion without the interactive board.
    #[arg(long, default_value_t = false)]
    pub headless: bool,
    /// Cross-check the replayed board against a direct replay of the trace.
    #[arg(long, default_value_t = false)]
    pub check: bool,
    #[arg(long = "log-path")]
    pub log_path: Option<std::path::PathBuf>,
}

pub fn run() -> Result<i32, QuickstepError> {
    let args = std::env::args_os().collect::<Vec<_>>();
    let runtime = ProductionRuntime::new();
    run_with_runtime(&args, &runtime)
}

pub fn run_with_runtime(
    args: &[std::ffi::OsString],
    runtime: &ProductionRuntime,
) -> Result<i32, QuickstepError> {
    let cli = match Cli::try_parse_from(args) {
        Ok(cli) => cli,
        Err(error) => match error.kind() {
            ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => {
                print!("{error}");
                return Ok(0);
            }
            _ => return Err(QuickstepError::Cli(error.to_string())),
        },
    };

    let elements = match (cli.elements, cli.values.len()) {
        (Some(count), given) if given > 0 && count != given => {
            return Err(QuickstepError::Cli(format!(
                "--elements {count} does not match the {given} values passed to --values"
            )));
        }
        (_, given) if given > 0 => Some(given),
        (count, _) => count,
    };

    let overrides = CliOverrides {
        config_path: cli.config.clone(),
        elements,
        interval_ms: cli.interval_ms,
        mode: cli.auto.then_some(PlaybackMode::Automatic),
        log_path: cli.log_path.clone(),
    };
    let cfg = load_config(&overrides, runtime.file_system.as_ref())?;
    let mut session = build_session(&cfg, &cli)?;

    if cli.shuffle {
        session.shuffle()?;
    }

    if cli.headless || !runtime.terminal.stdin_is_tty() {
        return run_headless(&mut session, &cli, runtime);
    }

    tui::run_interactive(&mut session)?;
    Ok(0)
}

fn build_session(cfg: &AppConfig, cli: &Cli) -> Result<Session, QuickstepError> {
    let mut session = if cli.values.is_empty() {
        Session::new(cfg, cli.seed)?
    } else {
        let session = Session::with_values(cfg, &cli.values)?;
        match cli.seed {
            Some(seed) => session.with_seed(seed),
            None => session,
        }
    };
    if cfg.logging.enabled {
        let mut logger = JsonlLogger::new(&cfg.logging.path);
        logger.max_payload_bytes = cfg.logging.max_payload_bytes;
        logger.budget_bytes = cfg.logging.budget_bytes;
        session.playback = session.playback.with_logger(logger);
    }
    Ok(session)
}

/// Plays the whole trace without a UI, then prints the board log and a
/// summary line. Exits non-zero if the board did not end sorted.
fn run_headless(
    session: &mut Session,
    cli: &Cli,
    runtime: &ProductionRuntime,
) -> Result<i32, QuickstepError> {
    let initial = session.board.values();
    session.start_or_stop()?;
    match session.playback.mode() {
        PlaybackMode::Automatic => {
            session.playback.run_to_completion(
                runtime.clock.as_ref(),
                &mut session.board,
                &mut || false,
            )?;
        }
        PlaybackMode::Manual => while !session.next_step()?.is_complete() {},
    }

    let terminal = runtime.terminal.as_ref();
    let plain = terminal.stdin_is_tty();
    for line in session.board.log_lines() {
        if plain {
            terminal.write_line(line)?;
        } else {
            terminal.write_line(&structured_fallback_line("replay", "log", line))?;
        }
    }

    if cli.check {
        let trace = trace::generate(&initial)?;
        let expected = trace::replay_values(&initial, &trace);
        if expected != session.board.values() {
            return Err(QuickstepError::PreconditionViolation(format!(
                "board replay diverged: expected {expected:?}, got {:?}",
                session.board.values()
            )));
        }
    }

    let sorted = session.board.is_sorted() && session.board.underflows().is_empty();
    terminal.write_line(&format!(
        "sorted={} steps={} fingerprint={}",
        sorted,
        session.playback.engine().applied_steps(),
        session.playback.trace_fingerprint().unwrap_or("-")
    ))?;
    Ok(if sorted { 0 } else { 1 })
}

pub fn render_help() -> String {
    let mut cmd = Cli::command();
    cmd.render_long_help().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use runtime::{FakeClock, FakeFileSystem, FakeTerminal};
    use std::ffi::OsString;
    use std::sync::Arc;

    fn fake_runtime(terminal: FakeTerminal) -> ProductionRuntime {
        ProductionRuntime {
            clock: Arc::new(FakeClock::new()),
            file_system: Arc::new(FakeFileSystem::default()),
            terminal: Arc::new(terminal),
        }
    }

    fn args(list: &[&str]) -> Vec<OsString> {
        std::iter::once("quickstep")
            .chain(list.iter().copied())
            .map(OsString::from)
            .collect()
    }

    #[test]
    fn headless_run_prints_log_and_summary() {
        let terminal = FakeTerminal::new(true);
        let runtime = fake_runtime(terminal.clone());
        let code = run_with_runtime(&args(&["--headless", "--values", "3,1,2", "--check"]), &runtime)
            .expect("run");
        assert_eq!(code, 0);

        let lines = terminal.written_lines();
        assert_eq!(lines.first().map(String::as_str), Some("--- Start ---"));
        assert!(lines.iter().any(|line| line == "Pivot: 3"));
        assert!(lines.iter().any(|line| line == "All elements are sorted"));
        let summary = lines.last().cloned().unwrap_or_default();
        assert!(summary.starts_with("sorted=true steps=12 fingerprint="), "{summary}");
    }

    #[test]
    fn automatic_headless_run_sleeps_on_the_clock() {
        let terminal = FakeTerminal::new(true);
        let clock = FakeClock::new();
        let runtime = ProductionRuntime {
            clock: Arc::new(clock.clone()),
            file_system: Arc::new(FakeFileSystem::default()),
            terminal: Arc::new(terminal.clone()),
        };
        let code = run_with_runtime(
            &args(&[
                "--headless",
                "--auto",
                "--interval-ms",
                "40",
                "--elements",
                "8",
                "--shuffle",
                "--seed",
                "9",
            ]),
            &runtime,
        )
        .expect("run");
        assert_eq!(code, 0);
        assert!(!clock.sleeps().is_empty());
        assert!(clock
            .sleeps()
            .iter()
            .all(|slept| *slept <= std::time::Duration::from_millis(40)));
        let lines = terminal.written_lines();
        assert_eq!(lines.first().map(String::as_str), Some("Shuffled 8 elements"));
    }

    #[test]
    fn non_tty_output_uses_structured_lines() {
        let terminal = FakeTerminal::new(false);
        let runtime = fake_runtime(terminal.clone());
        run_with_runtime(&args(&["--values", "2,1"]), &runtime).expect("run");
        let lines = terminal.written_lines();
        assert_eq!(
            lines.first().map(String::as_str),
            Some("component=replay state=log message=--- Start --- ")
        );
    }

    #[test]
    fn invalid_input_is_rejected() {
        let runtime = fake_runtime(FakeTerminal::new(false));
        assert!(matches!(
            run_with_runtime(&args(&["--headless", "--elements", "1"]), &runtime),
            Err(QuickstepError::InvalidElementCount { count: 1, .. })
        ));
        assert!(matches!(
            run_with_runtime(&args(&["--headless", "--values", "2,2,1"]), &runtime),
            Err(QuickstepError::PreconditionViolation(_))
        ));
        assert!(matches!(
            run_with_runtime(&args(&["--elements", "4", "--values", "2,1"]), &runtime),
            Err(QuickstepError::Cli(_))
        ));
        assert!(matches!(
            run_with_runtime(&args(&["--bogus"]), &runtime),
            Err(QuickstepError::Cli(_))
        ));
    }

    #[test]
    fn help_mentions_headless_mode() {
        let help = render_help();
        assert!(help.contains("--headless"));
        assert!(help.contains("--values"));
    }
}

//! Foreground countdown.
//!
//! Renders the remaining time once per zone-colored line, drives the engine
//! through a [`TimerRuntime`], and wires process suspension (Ctrl-Z /
//! SIGCONT) into the engine's suspend/resume hooks so the countdown snaps
//! back to the correct value after the process was stopped.

use std::io::{self, Write};
use std::sync::Arc;
use std::time::Duration;

use clap::Args;
use futures::stream::StreamExt;
use signal_hook::consts::{SIGCONT, SIGINT, SIGTERM, SIGTSTP};
use signal_hook_tokio::Signals;
use tracing::{debug, info};

use talktimer_core::{
    alert_delays, AlertScheduler, Config, Event, FinishSink, SystemClock, TimerConfig,
    TimerEngine, TimerRuntime, TimerStatus, Zone, ZoneTransitionSink,
};

use crate::common::parse_duration_secs;

#[derive(Args)]
pub struct RunArgs {
    /// Total talk time (e.g. 20m, 1200s, 20:00); defaults to the configured value
    #[arg(long)]
    pub total: Option<String>,
    /// Remaining time at which the display turns yellow
    #[arg(long)]
    pub yellow: Option<String>,
    /// Remaining time at which the display turns red
    #[arg(long)]
    pub red: Option<String>,
    /// Emit JSON snapshots instead of the ANSI display, exiting on finish
    #[arg(long)]
    pub json: bool,
}

pub fn run(args: RunArgs) -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load_or_default();
    let timer_config = resolve_timer_config(&config, &args)?;
    let sound = config.notifications.sound;

    let runtime = tokio::runtime::Runtime::new()?;
    runtime.block_on(run_countdown(timer_config, sound, args.json))
}

fn resolve_timer_config(
    config: &Config,
    args: &RunArgs,
) -> Result<TimerConfig, Box<dyn std::error::Error>> {
    let base = config.timer_config();
    let total = match &args.total {
        Some(s) => parse_duration_secs(s)?,
        None => base.total_secs(),
    };
    let yellow = match &args.yellow {
        Some(s) => parse_duration_secs(s)?,
        None => base.yellow_threshold_secs(),
    };
    let red = match &args.red {
        Some(s) => parse_duration_secs(s)?,
        None => base.red_threshold_secs(),
    };
    Ok(TimerConfig::new(total, yellow, red))
}

async fn run_countdown(
    config: TimerConfig,
    sound: bool,
    json: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let clock = Arc::new(SystemClock::new());
    let feedback = Arc::new(TerminalFeedback { sound });
    let engine = TimerEngine::with_feedback(
        config,
        clock,
        feedback.clone(),
        feedback.clone(),
        feedback,
    );
    let mut runtime = TimerRuntime::new(engine);

    let mut signals = Signals::new([SIGTSTP, SIGCONT, SIGINT, SIGTERM])?;
    let handle = signals.handle();

    runtime.start();
    info!("countdown started, {} seconds total", config.total_secs());

    let mut render = tokio::time::interval(Duration::from_millis(250));
    render.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
    let mut last_printed = None;

    let result = loop {
        tokio::select! {
            _ = render.tick() => {
                let Some(snapshot) = runtime.snapshot() else {
                    break Ok(());
                };
                if json {
                    let key = snapshot_key(&snapshot);
                    if key != last_printed {
                        match serde_json::to_string(&snapshot) {
                            Ok(line) => println!("{line}"),
                            Err(e) => break Err(e.into()),
                        }
                        last_printed = key;
                    }
                    if runtime.status() == Some(TimerStatus::Finished) {
                        break Ok(());
                    }
                } else if let Err(e) = render_plain(&snapshot) {
                    break Err(e.into());
                }
            }
            signal = signals.next() => match signal {
                Some(SIGTSTP) => {
                    runtime.handle_suspend();
                    // Actually stop, as an unhandled SIGTSTP would.
                    signal_hook::low_level::emulate_default_handler(SIGTSTP)?;
                }
                Some(SIGCONT) => {
                    runtime.handle_resume();
                }
                Some(_) | None => break Ok(()),
            },
        }
    };

    handle.close();
    if !json {
        println!();
    }
    result
}

fn snapshot_key(snapshot: &Event) -> Option<(TimerStatus, u32, bool)> {
    match snapshot {
        Event::StateSnapshot {
            status,
            remaining_secs,
            flash_white,
            ..
        } => Some((*status, *remaining_secs, *flash_white)),
        _ => None,
    }
}

fn render_plain(snapshot: &Event) -> io::Result<()> {
    let Event::StateSnapshot {
        status,
        zone,
        display,
        flash_white,
        ..
    } = snapshot
    else {
        return Ok(());
    };

    let style = if *zone == Zone::Flashing && *flash_white {
        Zone::flash_alternate_style()
    } else {
        zone.ansi_style()
    };
    let label = match status {
        TimerStatus::Finished => "time's up",
        TimerStatus::Running => "",
        TimerStatus::Paused => "paused",
        TimerStatus::Idle => "ready",
    };

    let mut out = io::stdout().lock();
    write!(out, "\r\x1b[2K{style}  {display}  \x1b[0m  {label}")?;
    out.flush()
}

/// Terminal stand-ins for the platform feedback collaborators. All methods
/// are fire-and-forget; nothing here can affect engine state.
struct TerminalFeedback {
    sound: bool,
}

impl TerminalFeedback {
    fn bell(&self) {
        let mut err = io::stderr().lock();
        let _ = err.write_all(b"\x07");
        let _ = err.flush();
    }
}

impl ZoneTransitionSink for TerminalFeedback {
    fn zone_transition(&self) {
        self.bell();
    }
}

impl FinishSink for TerminalFeedback {
    fn finished(&self) {
        if self.sound {
            self.bell();
        } else {
            debug!("finish sound suppressed by configuration");
        }
    }
}

impl AlertScheduler for TerminalFeedback {
    fn schedule_alerts(&self, remaining_secs: u32, yellow_threshold_secs: u32, red_threshold_secs: u32) {
        // The process is about to stop executing; record what a platform
        // notifier would fire so the user can see it on resume.
        let delays = alert_delays(remaining_secs, yellow_threshold_secs, red_threshold_secs);
        info!(?delays, "suspended with alerts pending");
    }

    fn cancel_all_alerts(&self) {
        debug!("pending alerts cancelled");
    }
}

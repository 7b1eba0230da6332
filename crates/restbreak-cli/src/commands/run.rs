use std::error::Error;
use std::io::{self, Write};

use clap::Args;
use restbreak_core::runtime::{self, Command};
use restbreak_core::{
    EndReason, EngineStatus, Event, OverlayCoordinator, ReminderEngine, SchedulerState,
    SettingsStore, StaticDisplays, TokioTimers,
};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::{mpsc, oneshot};
use tracing::{info, warn};

use crate::terminal::TerminalSurface;

#[derive(Args)]
pub struct RunArgs {
    /// Print events and status as JSON lines instead of overlay text
    #[arg(long)]
    json: bool,
    /// Seed for overlay colors (overrides overlay.theme_seed)
    #[arg(long)]
    seed: Option<u64>,
}

const HELP: &str = "\
commands:
  skip [N]        skip the next N breaks (default 1)
  dismiss         end the current break
  status          show scheduler and break state
  interval SECS   change the reminder interval
  break SECS      change the break length
  quit            stop and exit";

/// One line typed on stdin.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Input {
    Skip(u32),
    Dismiss,
    Status,
    Interval(u32),
    Break(u32),
    Help,
    Quit,
}

fn parse_seconds(word: &str) -> Result<u32, String> {
    word.parse()
        .map_err(|_| format!("'{word}' is not a whole number"))
}

fn parse_line(line: &str) -> Result<Option<Input>, String> {
    let mut words = line.split_whitespace();
    let Some(cmd) = words.next() else {
        return Ok(None);
    };
    let arg = words.next();
    if words.next().is_some() {
        return Err(format!("too many arguments for '{cmd}'"));
    }

    let input = match (cmd, arg) {
        ("skip", None) => Input::Skip(1),
        ("skip", Some(n)) => match parse_seconds(n)? {
            0 => return Err("skip count must be at least 1".into()),
            n => Input::Skip(n),
        },
        ("interval", Some(secs)) => Input::Interval(parse_seconds(secs)?),
        ("break", Some(secs)) => Input::Break(parse_seconds(secs)?),
        ("interval" | "break", None) => {
            return Err(format!("'{cmd}' needs a number of seconds"));
        }
        ("dismiss", None) => Input::Dismiss,
        ("status", None) => Input::Status,
        ("help", None) => Input::Help,
        ("quit" | "exit", None) => Input::Quit,
        ("dismiss" | "status" | "help" | "quit" | "exit", Some(_)) => {
            return Err(format!("'{cmd}' takes no arguments"));
        }
        _ => return Err(format!("unknown command '{cmd}' (try 'help')")),
    };
    Ok(Some(input))
}

/// Human-readable line for an event. Countdown ticks are left to the
/// overlay surface.
fn describe(event: &Event) -> Option<String> {
    let text = match event {
        Event::SchedulerArmed { interval_secs, .. } => {
            format!("next break in {interval_secs}s")
        }
        Event::SchedulerStopped { .. } => "reminders stopped".to_string(),
        Event::SkipsUpdated { pending_skips, .. } => {
            format!("skipping the next {pending_skips} break(s)")
        }
        Event::BreakSkipped { pending_skips, .. } => {
            format!("break skipped, {pending_skips} more to skip")
        }
        Event::BreakStarted {
            total_seconds,
            overlays,
            ..
        } => format!("break started: {total_seconds}s on {overlays} display(s)"),
        Event::BreakAlreadyActive { .. } => "break already in progress".to_string(),
        Event::CountdownTicked { .. } => return None,
        Event::BreakEnded {
            reason,
            elapsed_seconds,
            ..
        } => {
            let reason = match reason {
                EndReason::Dismissed => "dismissed",
                EndReason::Expired => "finished",
            };
            format!("break {reason} after {elapsed_seconds}s")
        }
    };
    Some(text)
}

fn print_event(event: &Event, json: bool) {
    if json {
        match serde_json::to_string(event) {
            Ok(line) => println!("{line}"),
            Err(e) => warn!(error = %e, "failed to encode event"),
        }
    } else if let Some(line) = describe(event) {
        println!("{line}");
    }
}

fn print_status(status: &EngineStatus, json: bool) -> Result<(), Box<dyn Error>> {
    if json {
        println!("{}", serde_json::to_string(status)?);
        return Ok(());
    }
    let state = match status.scheduler {
        SchedulerState::Idle => "idle",
        SchedulerState::Armed => "armed",
    };
    match (status.interval_secs, status.break_secs) {
        (Some(interval), Some(length)) => println!(
            "scheduler: {state}, {length}s break every {interval}s, {} skip(s) pending",
            status.pending_skips
        ),
        _ => println!("scheduler: {state}"),
    }
    match &status.session {
        Some(session) => println!(
            "break in progress: {}s of {}s left on {} overlay(s)",
            session.remaining_seconds,
            session.total_seconds,
            session.overlays.len()
        ),
        None => println!("no break in progress"),
    }
    Ok(())
}

pub fn run(args: RunArgs) -> Result<(), Box<dyn Error>> {
    let store = SettingsStore::open_default()?;
    let rt = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;
    let result = rt.block_on(serve(store, args));
    // A pending stdin read cannot be cancelled; don't wait for it.
    rt.shutdown_background();
    result
}

async fn serve(mut store: SettingsStore, args: RunArgs) -> Result<(), Box<dyn Error>> {
    let config = store.config().clone();
    let out: Box<dyn Write> = if args.json {
        Box::new(io::sink())
    } else {
        Box::new(io::stdout())
    };
    let overlays = OverlayCoordinator::new(
        StaticDisplays::new(config.displays()),
        TerminalSurface::new(out),
        args.seed.or(config.overlay.theme_seed),
    );
    let (timers, fired) = TokioTimers::new();
    let engine = ReminderEngine::new(timers, overlays);
    let (commands, command_rx) = mpsc::channel(16);
    let settings = store.subscribe();

    info!(
        config = %store.path().display(),
        interval = %config.reminder.interval_label(),
        length = %config.reminder.break_label(),
        displays = config.displays.len(),
        "starting reminders"
    );

    let json = args.json;
    let (_engine, read) = tokio::join!(
        runtime::run(engine, fired, settings, command_rx, |event| print_event(event, json)),
        read_commands(&mut store, commands, json),
    );
    read
}

/// Feed stdin lines to the run loop until `quit`, end of input or Ctrl-C.
/// Dropping `commands` on return stops the loop.
async fn read_commands(
    store: &mut SettingsStore,
    commands: mpsc::Sender<Command>,
    json: bool,
) -> Result<(), Box<dyn Error>> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);

    loop {
        let line = tokio::select! {
            line = lines.next_line() => line?,
            _ = &mut ctrl_c => {
                info!("interrupted");
                None
            }
        };
        let Some(line) = line else {
            break;
        };

        let input = match parse_line(&line) {
            Ok(Some(input)) => input,
            Ok(None) => continue,
            Err(message) => {
                eprintln!("error: {message}");
                continue;
            }
        };

        let delivered = match input {
            Input::Skip(n) => commands.send(Command::SkipNext(n)).await.is_ok(),
            Input::Dismiss => commands.send(Command::Dismiss).await.is_ok(),
            Input::Status => {
                let (reply, rx) = oneshot::channel();
                let sent = commands.send(Command::Status(reply)).await.is_ok();
                if let Ok(status) = rx.await {
                    print_status(&status, json)?;
                }
                sent
            }
            Input::Interval(secs) => {
                apply(store, "reminder.interval_seconds", secs);
                true
            }
            Input::Break(secs) => {
                apply(store, "reminder.break_seconds", secs);
                true
            }
            Input::Help => {
                println!("{HELP}");
                true
            }
            Input::Quit => {
                let _ = commands.send(Command::Quit).await;
                break;
            }
        };
        if !delivered {
            break;
        }
    }
    Ok(())
}

fn apply(store: &mut SettingsStore, key: &str, secs: u32) {
    if let Err(e) = store.set(key, &secs.to_string()) {
        warn!(key, error = %e, "settings change rejected");
    }
}

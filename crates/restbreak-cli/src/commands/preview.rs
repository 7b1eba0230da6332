use clap::Args;
use restbreak_core::{
    Config, ManualTimers, OverlayCoordinator, OverlayHandle, OverlaySurface, OverlayView,
    SessionSummary, StaticDisplays,
};
use serde::Serialize;

#[derive(Args)]
pub struct PreviewArgs {
    /// Seed for overlay colors (overrides overlay.theme_seed)
    #[arg(long)]
    seed: Option<u64>,
    /// Output as JSON
    #[arg(long)]
    json: bool,
}

/// Draws nothing; the preview only reads the session back.
struct Hidden;

impl OverlaySurface for Hidden {
    fn open(&mut self, _: &OverlayHandle, _: &OverlayView) {}
    fn update(&mut self, _: &OverlayHandle, _: &OverlayView) {}
    fn close(&mut self, _: &OverlayHandle) {}
}

#[derive(Serialize)]
struct Preview {
    interval_seconds: u32,
    break_seconds: u32,
    #[serde(flatten)]
    session: SessionSummary,
}

pub fn run(args: PreviewArgs) -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load()?;
    let mut timers = ManualTimers::new();
    let mut coordinator = OverlayCoordinator::new(
        StaticDisplays::new(config.displays()),
        Hidden,
        args.seed.or(config.overlay.theme_seed),
    );
    coordinator.start_session(&mut timers, config.reminder.break_seconds);
    let session = coordinator
        .session()
        .map(SessionSummary::from)
        .ok_or("no break session could be opened")?;

    let preview = Preview {
        interval_seconds: config.reminder.interval_seconds,
        break_seconds: config.reminder.break_seconds,
        session,
    };

    if args.json {
        println!("{}", serde_json::to_string_pretty(&preview)?);
        return Ok(());
    }

    println!(
        "{} break every {}",
        config.reminder.break_label(),
        config.reminder.interval_label()
    );
    println!(
        "colors: text {} on {}",
        preview.session.theme.foreground, preview.session.theme.background
    );
    for overlay in &preview.session.overlays {
        let frame = overlay.frame();
        println!(
            "  {:<12} {:.0}x{:.0} at {:.0},{:.0}",
            overlay.display_id(),
            frame.width,
            frame.height,
            frame.x,
            frame.y
        );
    }
    Ok(())
}

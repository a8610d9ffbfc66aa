use std::path::PathBuf;

use anyhow::Context as _;
use clap::{Parser, Subcommand};

use cardmotion::{
    App, BroadcastEvent, CLASS_BODY_HIDDEN, ChildInfo, CircleTrack, SliderState, TimelineId,
    Viewport,
};

#[derive(Parser, Debug)]
#[command(name = "cardmotion", version)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run an open-then-close gesture scenario headlessly and dump a JSON trace.
    Run(RunArgs),
    /// Dump the declared durations and offsets of one open sequence as JSON.
    Timings(TimingsArgs),
}

#[derive(Parser, Debug)]
struct RunArgs {
    /// Number of cards laid out in the demo page.
    #[arg(long, default_value_t = 3)]
    cards: usize,

    /// Card to open (0-based).
    #[arg(long, default_value_t = 1)]
    open: usize,

    /// Tick length in seconds.
    #[arg(long, default_value_t = 1.0 / 60.0)]
    dt: f64,

    /// Viewport width in pixels.
    #[arg(long, default_value_t = 1440.0)]
    width: f64,

    /// Viewport height in pixels.
    #[arg(long, default_value_t = 900.0)]
    height: f64,

    /// Output JSON path (stdout when omitted).
    #[arg(long)]
    out: Option<PathBuf>,
}

#[derive(Parser, Debug)]
struct TimingsArgs {
    /// Number of cards laid out in the demo page.
    #[arg(long, default_value_t = 3)]
    cards: usize,

    /// Card to open (0-based).
    #[arg(long, default_value_t = 0)]
    open: usize,

    /// Viewport width in pixels.
    #[arg(long, default_value_t = 1440.0)]
    width: f64,

    /// Viewport height in pixels.
    #[arg(long, default_value_t = 900.0)]
    height: f64,
}

#[derive(serde::Serialize)]
struct StateSnapshot {
    open_flags: Vec<bool>,
    slider: SliderState,
    body_hidden: bool,
    track: Option<CircleTrack>,
}

#[derive(serde::Serialize)]
struct RunTrace {
    cards: usize,
    viewport: Viewport,
    open_sequence_secs: f64,
    close_sequence_secs: f64,
    after_open: StateSnapshot,
    after_close: StateSnapshot,
    broadcasts: Vec<BroadcastEvent>,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    match cli.cmd {
        Command::Run(args) => cmd_run(args),
        Command::Timings(args) => cmd_timings(args),
    }
}

fn snapshot(app: &App) -> anyhow::Result<StateSnapshot> {
    let body = app.layout.body();
    Ok(StateSnapshot {
        open_flags: app.layout.cards().iter().map(|c| c.is_open()).collect(),
        slider: app.slider.state(),
        body_hidden: app.stage.has_class(body, CLASS_BODY_HIDDEN)?,
        track: app.track(),
    })
}

fn cmd_run(args: RunArgs) -> anyhow::Result<()> {
    let viewport = Viewport::new(args.width, args.height)?;
    let mut app = App::bootstrap(viewport, args.cards)?;

    let open_seq = app
        .click_card(args.open)?
        .context("open gesture was a no-op")?;
    let open_secs = app.player.duration(open_seq)?;
    app.run_until_idle(args.dt)?;
    let after_open = snapshot(&app)?;

    let close_seq = app.click_close()?.context("close gesture was a no-op")?;
    let close_secs = app.player.duration(close_seq)?;
    app.run_until_idle(args.dt)?;
    let after_close = snapshot(&app)?;

    let trace = RunTrace {
        cards: args.cards,
        viewport,
        open_sequence_secs: open_secs,
        close_sequence_secs: close_secs,
        after_open,
        after_close,
        broadcasts: app.bus.log().to_vec(),
    };

    let json = serde_json::to_string_pretty(&trace).context("serialize trace")?;
    match args.out {
        Some(path) => {
            std::fs::write(&path, json)
                .with_context(|| format!("write trace '{}'", path.display()))?;
            eprintln!("wrote {}", path.display());
        }
        None => println!("{json}"),
    }
    Ok(())
}

fn describe_tree(app: &App, id: TimelineId) -> anyhow::Result<serde_json::Value> {
    let mut children = Vec::new();
    for info in app.player.describe(id)? {
        let mut value = serde_json::to_value(&info).context("serialize child info")?;
        if let ChildInfo::Nested { timeline, .. } = info {
            value["children"] = describe_tree(app, timeline)?;
        }
        children.push(value);
    }
    Ok(serde_json::Value::Array(children))
}

fn cmd_timings(args: TimingsArgs) -> anyhow::Result<()> {
    let viewport = Viewport::new(args.width, args.height)?;
    let mut app = App::bootstrap(viewport, args.cards)?;

    let sequence = app
        .click_card(args.open)?
        .context("open gesture was a no-op")?;

    let out = serde_json::json!({
        "sequence": app.player.name(sequence)?,
        "duration_secs": app.player.duration(sequence)?,
        "children": describe_tree(&app, sequence)?,
    });
    println!("{}", serde_json::to_string_pretty(&out).context("serialize timings")?);
    Ok(())
}

use std::path::PathBuf;
use std::time::Duration;

use anyhow::Context as _;
use clap::{Parser, Subcommand};

use dayglow::{
    EventTrigger, JsonFileStore, MAX_SECONDS, World, WorldRunner, date_string_from_epoch,
    generate_day, make_time_string, seconds_from_time_string,
};

#[derive(Parser, Debug)]
#[command(name = "dayglow", version)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Render a single frame as a PNG.
    Frame(FrameArgs),
    /// Drive the day-cycle loop, printing the status line as it changes.
    Run(RunArgs),
    /// Print the generated schedule for a calendar day.
    Day(DayArgs),
    /// Convert a pixel JSON (DPaintJS or converted bitmap) into a world.
    Import(ImportArgs),
    /// Write a dated export of a world file.
    Export(ExportArgs),
}

#[derive(Parser, Debug)]
struct FrameArgs {
    /// Input world JSON.
    #[arg(long)]
    world: PathBuf,

    /// Time of day as H:MM:SS.
    #[arg(long, conflicts_with = "seconds")]
    time: Option<String>,

    /// Time of day in seconds.
    #[arg(long)]
    seconds: Option<f64>,

    /// Generate the day schedule for this date before rendering.
    #[arg(long)]
    day: Option<String>,

    /// Trigger this event id at the given progress.
    #[arg(long, requires = "event_progress")]
    event: Option<i64>,

    /// Progress in [0, 1] for --event.
    #[arg(long)]
    event_progress: Option<f64>,

    /// Output PNG path.
    #[arg(long)]
    out: PathBuf,
}

#[derive(Parser, Debug)]
struct RunArgs {
    /// Input world JSON.
    #[arg(long)]
    world: PathBuf,

    /// Frames per second to tick at.
    #[arg(long, default_value_t = 60.0)]
    fps: f64,

    /// Stop after this many frames (runs until interrupted by default).
    #[arg(long)]
    frames: Option<u64>,

    /// Scrub to this time of day (H:MM:SS) before starting.
    #[arg(long)]
    start: Option<String>,

    /// Generate today's ambient schedule before starting.
    #[arg(long, default_value_t = false)]
    day: bool,
}

#[derive(Parser, Debug)]
struct DayArgs {
    /// Input world JSON.
    #[arg(long)]
    world: PathBuf,

    /// Calendar date seeding the schedule (defaults to today, UTC).
    #[arg(long)]
    date: Option<String>,
}

#[derive(Parser, Debug)]
struct ImportArgs {
    /// Input pixel JSON.
    #[arg(long = "in")]
    in_path: PathBuf,

    /// World JSON to create or extend.
    #[arg(long)]
    out: PathBuf,

    /// Add the layers as overlays instead of replacing the base image.
    #[arg(long, default_value_t = false)]
    overlay: bool,
}

#[derive(Parser, Debug)]
struct ExportArgs {
    /// Input world JSON.
    #[arg(long)]
    world: PathBuf,

    /// Directory to write the export into.
    #[arg(long, default_value = ".")]
    dir: PathBuf,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt().with_target(false).init();

    let cli = Cli::parse();
    match cli.cmd {
        Command::Frame(args) => cmd_frame(args),
        Command::Run(args) => cmd_run(args),
        Command::Day(args) => cmd_day(args),
        Command::Import(args) => cmd_import(args),
        Command::Export(args) => cmd_export(args),
    }
}

fn load_world(path: &std::path::Path) -> anyhow::Result<World> {
    let json = std::fs::read_to_string(path)
        .with_context(|| format!("reading world '{}'", path.display()))?;
    Ok(World::from_json(&json)?)
}

fn today() -> String {
    let epoch = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map_or(0.0, |elapsed| elapsed.as_secs_f64());
    date_string_from_epoch(epoch)
}

fn cmd_frame(args: FrameArgs) -> anyhow::Result<()> {
    let mut world = load_world(&args.world)?;

    if let Some(date) = &args.day {
        world.make_day(date);
    }

    if let (Some(event), Some(progress)) = (args.event, args.event_progress) {
        world.make(EventTrigger::with_progress(event, progress));
    }

    let seconds = match (&args.time, args.seconds) {
        (Some(time), _) => seconds_from_time_string(time)?,
        (None, Some(seconds)) => seconds,
        (None, None) => 0.0,
    };

    let status = world.frame(seconds, seconds);
    let frame = world.frame_rgba();

    if let Some(parent) = args.out.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create output dir '{}'", parent.display()))?;
    }

    image::save_buffer_with_format(
        &args.out,
        &frame.data,
        frame.width,
        frame.height,
        image::ColorType::Rgba8,
        image::ImageFormat::Png,
    )
    .with_context(|| format!("write png '{}'", args.out.display()))?;

    eprintln!("wrote {}", args.out.display());
    println!("{status}");
    Ok(())
}

fn cmd_run(args: RunArgs) -> anyhow::Result<()> {
    let world = load_world(&args.world)?;
    let mut runner = WorldRunner::new(world);

    if args.day {
        let date = runner.date_string();
        runner.world.make_day(&date);
    }

    if let Some(start) = &args.start {
        runner.set_seconds(seconds_from_time_string(start)?);
    }

    let interval = Duration::from_secs_f64(1.0 / args.fps.max(1.0));
    let mut last_status = String::new();
    let mut remaining = args.frames;

    loop {
        let status = runner.tick();
        if status != last_status {
            let clock = make_time_string(runner.seconds().rem_euclid(MAX_SECONDS), true);
            println!("[{clock}] {status}");
            last_status = status;
        }

        if let Some(frames) = &mut remaining {
            if *frames <= 1 {
                break;
            }
            *frames -= 1;
        }

        std::thread::sleep(interval);
    }

    Ok(())
}

fn cmd_day(args: DayArgs) -> anyhow::Result<()> {
    let world = load_world(&args.world)?;
    let date = args.date.unwrap_or_else(today);
    let schedule = generate_day(world.data(), &date);

    println!("Schedule for {date}");

    for plan in &schedule.plans {
        let name = world
            .data()
            .modes
            .iter()
            .find(|mode| mode.id == plan.mode_id)
            .map_or("?", |mode| mode.name.as_str());
        println!(
            "  mode  {} - {}  {name}",
            make_time_string(plan.start_seconds, true),
            make_time_string(plan.end_seconds.rem_euclid(MAX_SECONDS), true),
        );
    }

    for trigger in &schedule.triggers {
        let name = world
            .data()
            .events
            .iter()
            .find(|event| event.id == trigger.event_info_id)
            .map_or("?", |event| event.name.as_str());
        println!(
            "  event {}  {name}",
            make_time_string(trigger.start_seconds, true)
        );
    }

    Ok(())
}

fn cmd_import(args: ImportArgs) -> anyhow::Result<()> {
    let json = std::fs::read_to_string(&args.in_path)
        .with_context(|| format!("reading '{}'", args.in_path.display()))?;
    let name = args
        .in_path
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_default();

    let data = dayglow::parse_pixel_json(&name, &json)?;

    // Mutations persist through the attached store as they apply.
    let mut world = World::with_store(Box::new(JsonFileStore::new(&args.out)));
    if args.overlay {
        world.load_overlay(&data)?;
    } else {
        world.load_image(&data)?;
    }

    eprintln!(
        "imported {} into {}",
        args.in_path.display(),
        args.out.display()
    );
    Ok(())
}

fn cmd_export(args: ExportArgs) -> anyhow::Result<()> {
    let world = load_world(&args.world)?;

    let name = if world.data().name.is_empty() {
        "World"
    } else {
        world.data().name.as_str()
    };
    let out = args.dir.join(format!("{name} {}.json", today()));

    std::fs::create_dir_all(&args.dir)
        .with_context(|| format!("create export dir '{}'", args.dir.display()))?;
    std::fs::write(&out, world.serialize()?)
        .with_context(|| format!("write export '{}'", out.display()))?;

    eprintln!("wrote {}", out.display());
    Ok(())
}

use std::path::{Path, PathBuf};

use anyhow::Context as _;
use clap::{Args, Parser, Subcommand};
use subcut::{Engine, EngineConfig, MergeMode, PipelineStep, Project, SplitMode};

#[derive(Parser, Debug)]
#[command(name = "subcut", version)]
struct Cli {
    /// Engine configuration JSON; defaults are used when omitted.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Increase log verbosity (-v debug, -vv trace).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print a summary of a project.
    Inspect(InspectArgs),
    /// Split one clip.
    Split(SplitArgs),
    /// Merge adjacent clips into one.
    Merge(MergeArgs),
    /// Proportionally retime a clip's words into a new span.
    Retime(RetimeArgs),
    /// Break every clip into lines that fit the configured width.
    LineBreak(LineBreakArgs),
    /// Run split/merge stages from a JSON file.
    Process(ProcessArgs),
    /// Write the back-to-back playback timeline as JSON.
    Linearize(IoArgs),
    /// Restore soft-deleted clips, or the original snapshot.
    Restore(RestoreArgs),
}

#[derive(Args, Debug)]
struct IoArgs {
    /// Input project JSON.
    #[arg(long = "in")]
    in_path: PathBuf,

    /// Output JSON path.
    #[arg(long)]
    out: PathBuf,
}

#[derive(Args, Debug)]
struct InspectArgs {
    /// Input project JSON.
    #[arg(long = "in")]
    in_path: PathBuf,
}

#[derive(Args, Debug)]
struct SplitArgs {
    #[command(flatten)]
    io: IoArgs,

    /// Clip to split.
    #[arg(long)]
    clip: String,

    /// Start the second clip at this word index.
    #[arg(long, conflicts_with = "fraction")]
    at_word: Option<usize>,

    /// Split at the word boundary nearest to this fraction of the clip span.
    #[arg(long)]
    fraction: Option<f64>,
}

#[derive(Args, Debug)]
struct MergeArgs {
    #[command(flatten)]
    io: IoArgs,

    /// Clips to merge, in document order (repeatable).
    #[arg(long = "clip", required = true, num_args = 1..)]
    clips: Vec<String>,
}

#[derive(Args, Debug)]
struct RetimeArgs {
    #[command(flatten)]
    io: IoArgs,

    #[arg(long)]
    clip: String,

    /// New start in seconds.
    #[arg(long)]
    start: f64,

    /// New end in seconds.
    #[arg(long)]
    end: f64,
}

#[derive(Args, Debug)]
struct LineBreakArgs {
    #[command(flatten)]
    io: IoArgs,

    /// Merge same-speaker runs that fit on one line afterwards.
    #[arg(long, default_value_t = false)]
    merge_speaker: bool,
}

#[derive(Args, Debug)]
struct ProcessArgs {
    #[command(flatten)]
    io: IoArgs,

    /// JSON array of pipeline steps.
    #[arg(long)]
    steps: PathBuf,
}

#[derive(Args, Debug)]
struct RestoreArgs {
    #[command(flatten)]
    io: IoArgs,

    /// Restore the original snapshot instead of soft-deleted clips.
    #[arg(long, default_value_t = false)]
    original: bool,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let level = match cli.verbose {
        0 => tracing::Level::INFO,
        1 => tracing::Level::DEBUG,
        _ => tracing::Level::TRACE,
    };
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_max_level(level)
        .init();

    let config = match &cli.config {
        Some(path) => EngineConfig::from_path(path)?,
        None => EngineConfig::default(),
    };
    match cli.cmd {
        Command::Inspect(args) => cmd_inspect(args, config),
        Command::Split(args) => cmd_split(args, config),
        Command::Merge(args) => cmd_merge(args, config),
        Command::Retime(args) => cmd_retime(args, config),
        Command::LineBreak(args) => cmd_line_break(args, config),
        Command::Process(args) => cmd_process(args, config),
        Command::Linearize(args) => cmd_linearize(args, config),
        Command::Restore(args) => cmd_restore(args, config),
    }
}

fn load_engine(path: &Path, config: EngineConfig) -> anyhow::Result<Engine> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("read project '{}'", path.display()))?;
    let project = Project::from_json_str(&raw)
        .with_context(|| format!("load project '{}'", path.display()))?;
    Ok(Engine::new(project, config)?)
}

fn write_json(path: &Path, json: &str) -> anyhow::Result<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create output dir '{}'", parent.display()))?;
    }
    std::fs::write(path, json).with_context(|| format!("write json '{}'", path.display()))?;
    eprintln!("wrote {}", path.display());
    Ok(())
}

fn save_project(engine: Engine, out: &Path) -> anyhow::Result<()> {
    let json = engine.into_project().to_json_string_pretty()?;
    write_json(out, &json)
}

fn cmd_inspect(args: InspectArgs, config: EngineConfig) -> anyhow::Result<()> {
    let engine = load_engine(&args.in_path, config)?;
    let project = engine.project();
    println!(
        "clips: {} ({} deleted)",
        project.clips.len(),
        project.deleted_clip_ids.len()
    );
    println!("words: {}", engine.index().word_count());
    println!("duration: {:.3}s", engine.timeline().total_duration);
    for clip in engine.active_clips() {
        let (start, end) = clip
            .time_range()
            .map_or((0.0, 0.0), |r| (r.start, r.end));
        println!(
            "{:>4} {:<12} [{start:.3}, {end:.3}] {}: {}",
            clip.timeline, clip.id, clip.speaker, clip.full_text
        );
    }
    Ok(())
}

fn cmd_split(args: SplitArgs, config: EngineConfig) -> anyhow::Result<()> {
    let mut engine = load_engine(&args.io.in_path, config)?;
    let mode = match (args.at_word, args.fraction) {
        (Some(index), _) => SplitMode::AtWord { index },
        (None, Some(fraction)) => SplitMode::AtFraction { fraction },
        (None, None) => SplitMode::Half,
    };
    let pieces = engine
        .split_clip(&args.clip, &mode)
        .with_context(|| format!("split clip '{}'", args.clip))?;
    tracing::info!(clip = %args.clip, pieces = pieces.len(), "split");
    save_project(engine, &args.io.out)
}

fn cmd_merge(args: MergeArgs, config: EngineConfig) -> anyhow::Result<()> {
    let mut engine = load_engine(&args.io.in_path, config)?;
    let merged = engine.merge_clips(&args.clips).context("merge clips")?;
    tracing::info!(merged = %merged, inputs = args.clips.len(), "merge");
    save_project(engine, &args.io.out)
}

fn cmd_retime(args: RetimeArgs, config: EngineConfig) -> anyhow::Result<()> {
    let mut engine = load_engine(&args.io.in_path, config)?;
    if !engine.update_clip_timing(&args.clip, args.start, args.end)? {
        anyhow::bail!(
            "clip '{}' cannot be retimed into [{}, {}]",
            args.clip,
            args.start,
            args.end
        );
    }
    save_project(engine, &args.io.out)
}

fn cmd_line_break(args: LineBreakArgs, config: EngineConfig) -> anyhow::Result<()> {
    let mut engine = load_engine(&args.io.in_path, config)?;
    let mut steps = vec![PipelineStep::Split {
        mode: SplitMode::LineBreak,
        only: None,
    }];
    if args.merge_speaker {
        steps.push(PipelineStep::Merge {
            mode: MergeMode::BySpeaker,
        });
    }
    engine.run_pipeline(&steps)?;
    save_project(engine, &args.io.out)
}

fn cmd_process(args: ProcessArgs, config: EngineConfig) -> anyhow::Result<()> {
    let raw = std::fs::read_to_string(&args.steps)
        .with_context(|| format!("read steps '{}'", args.steps.display()))?;
    let steps: Vec<PipelineStep> = serde_json::from_str(&raw)
        .with_context(|| format!("parse steps '{}'", args.steps.display()))?;
    let mut engine = load_engine(&args.io.in_path, config)?;
    engine.run_pipeline(&steps)?;
    save_project(engine, &args.io.out)
}

fn cmd_linearize(args: IoArgs, config: EngineConfig) -> anyhow::Result<()> {
    let mut engine = load_engine(&args.in_path, config)?;
    engine.linearize_document_order();
    let json = serde_json::to_string_pretty(engine.timeline())?;
    write_json(&args.out, &json)
}

fn cmd_restore(args: RestoreArgs, config: EngineConfig) -> anyhow::Result<()> {
    let mut engine = load_engine(&args.io.in_path, config)?;
    if args.original {
        if !engine.restore_original_clips() {
            anyhow::bail!("project has no original clips to restore");
        }
    } else {
        let restored = engine.restore_all_clips();
        tracing::info!(restored, "restored soft-deleted clips");
    }
    save_project(engine, &args.io.out)
}

mod console;

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;
use tunebench_contracts::events::EventWriter;
use tunebench_contracts::models::DEFAULT_SUNO_MODEL;
use tunebench_contracts::prompts::{default_corpus, load_corpus};
use tunebench_contracts::providers::BackendRegistry;
use tunebench_contracts::runs::report::{write_report, LocalRunReport, DEFAULT_QUESTION};
use tunebench_engine::compare::{
    new_run_id, ComparisonBackend, ComparisonRunner, MusicgenBackend, SunoBackend,
    MUSICGEN_LABEL,
};
use tunebench_engine::local::{LocalBackend, LocalConfig, DEFAULT_DURATION_S, DEFAULT_OUTPUT_DIR};
use tunebench_engine::suno::extract::extract_tracks;
use tunebench_engine::{
    CancellationToken, ExtendedParams, GenerationRequest, SunoClient, SunoConfig,
};

#[derive(Debug, Parser)]
#[command(name = "tunebench", version, about = "Suno vs local MusicGen generation bench")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Submit one Suno generation and wait for its tracks.
    Suno(SunoArgs),
    /// Print the raw record-info response for a Suno task.
    Status(StatusArgs),
    /// Generate one clip with the local model.
    Local(LocalArgs),
    /// Run the prompt corpus on both backends and write a report.
    Compare(CompareArgs),
}

#[derive(Debug, Parser)]
struct PollArgs {
    /// Seconds between status checks (overrides SUNO_POLL_INTERVAL).
    #[arg(long)]
    poll_interval: Option<f64>,
    /// Seconds to wait before giving up (overrides SUNO_MAX_WAIT).
    #[arg(long)]
    max_wait: Option<f64>,
}

#[derive(Debug, Parser)]
struct SunoArgs {
    #[arg(long, default_value = "")]
    prompt: String,
    #[arg(long)]
    custom: bool,
    #[arg(long)]
    instrumental: bool,
    #[arg(long)]
    style: Option<String>,
    #[arg(long)]
    title: Option<String>,
    #[arg(long, default_value = DEFAULT_SUNO_MODEL)]
    model: String,
    #[arg(long)]
    persona_id: Option<String>,
    #[arg(long)]
    persona_model: Option<String>,
    #[arg(long)]
    negative_tags: Option<String>,
    #[arg(long)]
    vocal_gender: Option<String>,
    #[arg(long)]
    style_weight: Option<f64>,
    #[arg(long)]
    weirdness_constraint: Option<f64>,
    #[arg(long)]
    audio_weight: Option<f64>,
    #[command(flatten)]
    poll: PollArgs,
}

#[derive(Debug, Parser)]
struct StatusArgs {
    #[arg(long)]
    task_id: String,
}

#[derive(Debug, Parser)]
struct LocalArgs {
    #[arg(long)]
    prompt: String,
    #[arg(long, default_value_t = DEFAULT_DURATION_S)]
    duration: u32,
    #[arg(long, default_value = DEFAULT_OUTPUT_DIR)]
    out_dir: PathBuf,
    #[arg(long)]
    file_name: Option<String>,
    /// Also write the result record as JSON to this path.
    #[arg(long)]
    out: Option<PathBuf>,
}

#[derive(Debug, Parser)]
struct CompareArgs {
    /// JSON prompt corpus; the built-in corpus is used when omitted.
    #[arg(long)]
    prompts: Option<PathBuf>,
    #[arg(long, default_value = "prompt_comparison.json")]
    out: PathBuf,
    /// Defaults to `events.jsonl` next to the report.
    #[arg(long)]
    events: Option<PathBuf>,
    #[arg(long, default_value = DEFAULT_OUTPUT_DIR)]
    audio_dir: PathBuf,
    #[arg(long, default_value = DEFAULT_QUESTION)]
    question: String,
    #[command(flatten)]
    poll: PollArgs,
}

fn main() {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    match run() {
        Ok(code) => std::process::exit(code),
        Err(err) => {
            eprintln!("tunebench error: {err:#}");
            std::process::exit(1);
        }
    }
}

fn run() -> Result<i32> {
    let cli = Cli::parse();
    match cli.command {
        Command::Suno(args) => run_suno(args),
        Command::Status(args) => run_status(args),
        Command::Local(args) => run_local(args),
        Command::Compare(args) => run_compare(args),
    }
}

fn suno_config(poll: &PollArgs) -> Result<SunoConfig> {
    let mut config = SunoConfig::from_env()?;
    if let Some(seconds) = poll.poll_interval {
        config.poll.poll_interval = seconds_arg("--poll-interval", seconds)?;
    }
    if let Some(seconds) = poll.max_wait {
        config.poll.max_wait = seconds_arg("--max-wait", seconds)?;
    }
    config
        .poll
        .validate()
        .context("invalid --poll-interval / SUNO_POLL_INTERVAL")?;
    Ok(config)
}

fn seconds_arg(flag: &str, seconds: f64) -> Result<Duration> {
    Duration::try_from_secs_f64(seconds)
        .with_context(|| format!("{flag} must be a non-negative number of seconds"))
}

fn run_suno(args: SunoArgs) -> Result<i32> {
    let config = suno_config(&args.poll)?;
    let request = GenerationRequest {
        prompt: args.prompt,
        custom_mode: args.custom,
        instrumental: args.instrumental,
        style: args.style,
        title: args.title,
        model: args.model,
        extended: ExtendedParams {
            persona_id: args.persona_id,
            persona_model: args.persona_model,
            negative_tags: args.negative_tags,
            vocal_gender: args.vocal_gender,
            style_weight: args.style_weight,
            weirdness_constraint: args.weirdness_constraint,
            audio_weight: args.audio_weight,
        },
    };

    let client = SunoClient::new(config)?;
    let generation = client.generate(&request, &CancellationToken::new())?;
    println!("Task {}", generation.task_id);
    print!("{}", console::format_tracks(&generation.tracks));
    Ok(0)
}

fn run_status(args: StatusArgs) -> Result<i32> {
    let client = SunoClient::new(SunoConfig::from_env()?)?;
    let envelope = client.task_status(&args.task_id)?;
    println!("{}", serde_json::to_string_pretty(&envelope)?);
    if let Some(data) = envelope.get("data") {
        let tracks = extract_tracks(data);
        if !tracks.is_empty() {
            print!("{}", console::format_tracks(&tracks));
        }
    }
    Ok(0)
}

fn run_local(args: LocalArgs) -> Result<i32> {
    let backend = LocalBackend::dryrun(LocalConfig {
        output_dir: args.out_dir,
        ..LocalConfig::default()
    });
    let generation = backend.generate_to(&args.prompt, args.duration, args.file_name.as_deref())?;
    print!("{}", console::format_local(&generation));

    if let Some(out) = &args.out {
        let report = LocalRunReport::new(
            MUSICGEN_LABEL,
            &generation.model,
            &generation.device,
            vec![generation.to_record()],
        );
        write_report(out, &report).with_context(|| format!("failed writing {}", out.display()))?;
        println!("  Results saved to: {}", out.display());
    }
    Ok(0)
}

fn run_compare(args: CompareArgs) -> Result<i32> {
    let cases = match &args.prompts {
        Some(path) => load_corpus(path)?,
        None => default_corpus()?,
    };
    let events_path = args.events.clone().unwrap_or_else(|| {
        args.out
            .parent()
            .map(|parent| parent.join("events.jsonl"))
            .unwrap_or_else(|| PathBuf::from("events.jsonl"))
    });
    let run_id = new_run_id();

    let mut backends: BackendRegistry<dyn ComparisonBackend> = BackendRegistry::new();
    backends.register(Box::new(SunoBackend::new(SunoClient::new(suno_config(
        &args.poll,
    )?)?)));
    backends.register(Box::new(MusicgenBackend::new(LocalBackend::dryrun(
        LocalConfig {
            output_dir: args.audio_dir.clone(),
            ..LocalConfig::default()
        },
    ))));

    let rule = "=".repeat(60);
    println!("{rule}");
    println!("  {} - Suno vs MusicGen", args.question);
    println!(
        "  {} prompts × {} backends = {} total generations",
        cases.len(),
        backends.len(),
        cases.len() * backends.len()
    );
    println!("{rule}");
    info!(run_id = %run_id, events = %events_path.display(), "starting comparison");

    let runner =
        ComparisonRunner::new(backends).with_events(EventWriter::new(events_path, run_id));
    let report = runner.run(&cases, &args.question)?;
    for result in &report.results {
        println!("  {}  ({})", console::format_status_line(result), result.prompt_name);
    }

    write_report(&args.out, &report)
        .with_context(|| format!("failed writing {}", args.out.display()))?;
    print!("{}", console::format_summary(&report.results));
    println!("\n  Results saved to: {}", args.out.display());
    Ok(0)
}

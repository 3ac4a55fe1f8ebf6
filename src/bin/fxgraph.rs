use std::path::{Path, PathBuf};

use anyhow::Context as _;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "fxgraph", version)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Validate every manifest in a directory and print each rejection.
    Validate(ValidateArgs),
    /// Compile the frame graph for one timeline time and print it.
    Compile(CompileArgs),
}

#[derive(Parser, Debug)]
struct ValidateArgs {
    /// Directory holding `*.json` manifests.
    dir: PathBuf,

    /// Kernel symbols available to the backend: one per line, or a JSON array of strings.
    #[arg(long)]
    kernels: PathBuf,
}

#[derive(Parser, Debug)]
struct CompileArgs {
    /// Directory holding `*.json` manifests.
    #[arg(long)]
    manifests: PathBuf,

    /// Kernel symbols available to the backend: one per line, or a JSON array of strings.
    #[arg(long)]
    kernels: PathBuf,

    /// Timeline JSON.
    #[arg(long)]
    timeline: PathBuf,

    /// Timeline time in seconds.
    #[arg(long)]
    at: f64,

    /// Session config JSON; its compile options replace the defaults.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Print the graph as JSON instead of the textual dump.
    #[arg(long)]
    json: bool,

    /// Also print the resource plan.
    #[arg(long)]
    plan: bool,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.cmd {
        Command::Validate(args) => cmd_validate(args),
        Command::Compile(args) => cmd_compile(args),
    }
}

fn read_kernels(path: &Path) -> anyhow::Result<fxgraph::KernelTable> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("read kernels '{}'", path.display()))?;
    let names: Vec<String> = if text.trim_start().starts_with('[') {
        serde_json::from_str(&text).with_context(|| "parse kernels JSON")?
    } else {
        text.lines()
            .map(str::trim)
            .filter(|l| !l.is_empty() && !l.starts_with('#'))
            .map(str::to_owned)
            .collect()
    };
    Ok(fxgraph::KernelTable::from_names(names))
}

fn cmd_validate(args: ValidateArgs) -> anyhow::Result<()> {
    let kernels = read_kernels(&args.kernels)?;
    let sources = fxgraph::ManifestSource::read_dir(&args.dir)?;
    let (registry, errors) = fxgraph::FeatureRegistry::load_report(&sources, kernels);

    for feature in registry.iter() {
        println!("ok    {} ({})", feature.id(), feature.source);
    }
    for e in &errors {
        println!("error {e}");
    }
    eprintln!(
        "{} manifest(s) registered, {} error(s)",
        registry.len(),
        errors.len()
    );

    if !errors.is_empty() {
        anyhow::bail!("validation failed for '{}'", args.dir.display());
    }
    Ok(())
}

fn cmd_compile(args: CompileArgs) -> anyhow::Result<()> {
    let kernels = read_kernels(&args.kernels)?;
    let sources = fxgraph::ManifestSource::read_dir(&args.manifests)?;
    let registry = fxgraph::FeatureRegistry::load(&sources, kernels)
        .map_err(fxgraph::FxGraphError::validation)?;

    let opts = match &args.config {
        Some(path) => fxgraph::SessionConfig::from_path(path)?.compile,
        None => fxgraph::CompileOpts::default(),
    };
    let timeline = fxgraph::Timeline::from_path(&args.timeline)?;

    let graph = fxgraph::TimelineCompiler::new(&registry, &opts)
        .compile(&timeline, args.at)
        .map_err(fxgraph::FxGraphError::compile)?;

    if args.json {
        let out = serde_json::to_string_pretty(&graph).with_context(|| "serialize graph")?;
        println!("{out}");
    } else {
        print!("{}", graph.dump());
    }
    if args.plan {
        let plan = fxgraph::ResourcePlan::build(&graph, opts.canvas, opts.pixel_format)
            .map_err(fxgraph::FxGraphError::from)?;
        print!("{}", plan.dump());
    }

    eprintln!("fingerprint {}", fxgraph::fingerprint_graph(&graph));
    Ok(())
}

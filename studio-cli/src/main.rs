//! `studio` binary: generate scripts in an influencer's style.
//!
//! Subcommands: `run` (generate a script), `graph` (export the pipeline), `styles` (list
//! style profiles).

use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand, ValueEnum};
use studio::{build_script_graph, generate_dot, generate_mermaid, MockLlm, PipelineSettings};
use studio_cli::{build_llm, render_output, run_once, ContentType, RunOptions, StyleLibrary};
use tokio_util::sync::CancellationToken;

#[derive(Parser, Debug)]
#[command(name = "studio")]
#[command(about = "Content studio: research, write, edit and score scripts in a chosen style")]
struct Args {
    #[command(subcommand)]
    cmd: Command,

    /// Verbose: log node execution and print state after each node
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Generate a script
    Run(RunArgs),
    /// Print the pipeline graph
    Graph(GraphArgs),
    /// List style profiles in the style library
    Styles(StylesArgs),
}

#[derive(clap::Args, Debug)]
struct RunArgs {
    /// Topic of the script
    #[arg(short, long)]
    topic: String,

    #[arg(short, long, value_enum, default_value_t = ContentType::Youtube)]
    content_type: ContentType,

    /// Target length in seconds (default 180 for youtube, 60 for instagram)
    #[arg(short, long, value_parser = clap::value_parser!(u32).range(30..=900))]
    duration: Option<u32>,

    /// Style profile name from the style library
    #[arg(short, long, value_name = "NAME")]
    influencer: Option<String>,

    /// Style profile JSON file (instead of, or overriding, the library entry)
    #[arg(long, value_name = "PATH")]
    style: Option<PathBuf>,

    #[arg(long, value_name = "DIR", env = "STUDIO_STYLES_DIR", default_value = ".")]
    styles_dir: PathBuf,

    /// Your own writing samples (text files) for voice calibration
    #[arg(long, value_name = "PATH", num_args = 1..)]
    samples: Vec<PathBuf>,

    /// Save the calibrated style as <NAME>_personalized
    #[arg(long, requires = "samples")]
    save_calibrated: bool,

    /// Keep standalone "Influencer" mentions in the printed script
    #[arg(long)]
    keep_influencer: bool,

    /// Print the final state as JSON
    #[arg(long)]
    json: bool,

    /// Write the output to this file instead of stdout
    #[arg(short, long, value_name = "PATH")]
    output: Option<PathBuf>,

    /// Use the offline demo model instead of the chat completions API
    #[arg(long)]
    mock: bool,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum GraphFormat {
    Mermaid,
    Dot,
}

#[derive(clap::Args, Debug)]
struct GraphArgs {
    #[arg(short, long, value_enum, default_value_t = GraphFormat::Mermaid)]
    format: GraphFormat,
}

#[derive(clap::Args, Debug)]
struct StylesArgs {
    #[arg(short, long, value_enum, default_value_t = ContentType::Youtube)]
    content_type: ContentType,

    #[arg(long, value_name = "DIR", env = "STUDIO_STYLES_DIR", default_value = ".")]
    styles_dir: PathBuf,
}

async fn run_command(args: RunArgs, verbose: bool) -> Result<(), Box<dyn std::error::Error>> {
    let settings = PipelineSettings::from_env();
    let llm = build_llm(args.mock, &settings);
    let opts = RunOptions {
        topic: args.topic,
        content_type: args.content_type,
        duration: args.duration,
        influencer: args.influencer,
        style_path: args.style,
        styles_dir: args.styles_dir,
        samples: args.samples,
        save_calibrated: args.save_calibrated,
        verbose,
        display_max_len: settings.display_max_len,
    };

    let cancel = CancellationToken::new();
    let on_signal = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            eprintln!("Interrupted, stopping before the next step...");
            on_signal.cancel();
        }
    });

    let (state, _style) = run_once(&opts, llm, &settings, cancel).await?;
    let out = render_output(&state, args.json, args.keep_influencer)?;
    match args.output {
        Some(path) => {
            std::fs::write(&path, out)?;
            eprintln!("Output written to {}", path.display());
        }
        None => print!("{}", out),
    }
    Ok(())
}

fn graph_command(args: GraphArgs) -> Result<(), Box<dyn std::error::Error>> {
    let graph = build_script_graph(Arc::new(MockLlm::new("")), &PipelineSettings::default())?;
    let text = match args.format {
        GraphFormat::Mermaid => generate_mermaid(&graph),
        GraphFormat::Dot => generate_dot(&graph),
    };
    println!("{}", text);
    Ok(())
}

fn styles_command(args: StylesArgs) -> Result<(), Box<dyn std::error::Error>> {
    let library = StyleLibrary::new(args.styles_dir);
    let content_type = args.content_type.as_str();
    let names = library.list(content_type)?;
    if names.is_empty() {
        eprintln!(
            "no {} styles in {}",
            content_type,
            library.dir_for(content_type).display()
        );
    }
    for name in names {
        println!("{}", name);
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let loaded = config::load_and_apply(config::APP_NAME, None::<&std::path::Path>);
    let args = Args::parse();
    config::tracing_init::init(args.verbose, None)?;
    if let Err(e) = loaded {
        tracing::warn!(error = %e, "config not loaded");
    }

    let result = match args.cmd {
        Command::Run(run_args) => run_command(run_args, args.verbose).await,
        Command::Graph(graph_args) => graph_command(graph_args),
        Command::Styles(styles_args) => styles_command(styles_args),
    };
    if let Err(e) = result {
        eprintln!("studio: {}", e);
        std::process::exit(1);
    }
    Ok(())
}

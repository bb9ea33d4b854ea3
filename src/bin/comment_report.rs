//! Build a comment report from a PDF of tabular public comments.
//!
//! Usage:
//!   comment-report econsult.pdf
//!   comment-report econsult.pdf --output-dir reports/ --verbose
//!
//! Model selection and the inference endpoint come from the
//! `COMMENT_REPORT_*` environment variables.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use comment_report::{run_document, PipelineConfig, PipelineContext};

#[derive(Parser, Debug)]
#[command(name = "comment-report", version, about)]
struct Args {
    /// PDF document containing the comment tables
    input: PathBuf,

    /// Directory for the report, CSV and images
    #[arg(short, long, default_value = ".")]
    output_dir: PathBuf,

    /// Font file for chart labels and word clouds
    #[arg(long)]
    font: Option<PathBuf>,

    /// Log debug output
    #[arg(short, long)]
    verbose: bool,
}

fn run(args: &Args) -> comment_report::Result<()> {
    let mut config = PipelineConfig::from_env()?;
    if let Some(font) = &args.font {
        config = config.with_font_path(font);
    }

    let ctx = PipelineContext::from_config(&config)?;
    let artifact = run_document(&ctx, &args.input, &args.output_dir)?;

    println!(
        "Report with {} row(s) written to {}",
        artifact.rows.len(),
        args.output_dir.join(&config.outputs.report).display()
    );
    Ok(())
}

fn main() -> ExitCode {
    let args = Args::parse();

    let default_level = if args.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .init();

    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        },
    }
}

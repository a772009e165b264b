//! Interactive price check: ask for an image URL, print each pipeline stage
//! and the final second-hand price analysis.

use std::process::ExitCode;

use ai_client::TokenUsage;
use anyhow::{Context, Result};
use clap::Parser;
use console::style;
use dialoguer::Input;
use tracing_subscriber::EnvFilter;

use price_checker::{
    Analysis, AnalysisMode, CheckerOptions, Config, IdentifyStrategy, ImageReference,
    PriceChecker, PriceReport, SearchFailurePolicy, Stage,
};

#[derive(Parser, Debug)]
#[command(name = "price-check")]
#[command(about = "Estimate a second-hand price in THB from an image URL")]
#[command(version)]
struct Args {
    /// Image URL (prompted for when omitted)
    #[arg(long)]
    url: Option<String>,

    /// Analysis output: narrative or structured
    #[arg(long)]
    mode: Option<AnalysisMode>,

    /// Skip item identification and search with a generic phrase
    #[arg(long)]
    generic_query: bool,

    /// Keep going with no results when the search provider fails
    #[arg(long)]
    continue_on_search_error: bool,

    /// Check that the URL answers with an image before calling the model
    #[arg(long)]
    verify_image: bool,
}

impl Args {
    fn apply(&self, mut options: CheckerOptions) -> CheckerOptions {
        if let Some(mode) = self.mode {
            options.analysis_mode = mode;
        }
        if self.generic_query {
            options.identify_strategy = IdentifyStrategy::Generic;
        }
        if self.continue_on_search_error {
            options.search_failure = SearchFailurePolicy::Empty;
        }
        options.verify_image |= self.verify_image;
        options
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    init_tracing();

    if let Err(e) = run(Args::parse()).await {
        eprintln!("{} {:#}", style("Error:").red().bold(), e);
        return ExitCode::from(1);
    }
    ExitCode::SUCCESS
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

async fn run(args: Args) -> Result<()> {
    let raw = match &args.url {
        Some(url) => url.clone(),
        None => Input::<String>::new()
            .with_prompt("Please enter the URL of the image")
            .interact_text()
            .context("failed to read image URL")?,
    };
    // Reject bad input before loading credentials.
    let image = ImageReference::parse(&raw)?;

    let config = Config::from_env()?;
    let checker = PriceChecker::from_config(&config)?;
    let options = args.apply(checker.options().clone());
    let checker = checker.with_options(options);

    let report = checker
        .check_with_progress(Some(image.as_str()), print_stage)
        .await?;

    print_report(&report)?;
    Ok(())
}

fn print_stage(stage: Stage<'_>) {
    match stage {
        Stage::Identifying => println!("{}", style("Identifying item...").dim()),
        Stage::Identified { item, usage } => {
            println!("{} {}", style("Identified:").green().bold(), item);
            println!("  {}", format_usage("keyword", &usage));
        }
        Stage::Searching { query } => {
            println!("{} {}", style("Searching:").dim(), query)
        }
        Stage::Searched { results } => {
            println!("{} {} result(s)", style("Found").green().bold(), results.len());
            for result in results {
                println!("- {} - {}", result.title, result.link);
            }
        }
        Stage::Analyzing => println!("{}", style("Analyzing price...").dim()),
    }
}

fn print_report(report: &PriceReport) -> Result<()> {
    println!("  {}", format_usage("analysis", &report.token_usage.analysis));
    println!("  {}", format_usage("total", &report.token_usage.total));
    println!();
    println!("{}", style("Analysis").cyan().bold());
    println!("{}", render_analysis(&report.analysis)?);
    Ok(())
}

fn format_usage(label: &str, usage: &TokenUsage) -> String {
    format!(
        "{label} tokens: prompt={} completion={} total={}",
        usage.prompt_tokens, usage.completion_tokens, usage.total_tokens
    )
}

fn render_analysis(analysis: &Analysis) -> Result<String> {
    match analysis {
        Analysis::Narrative(text) => Ok(text.clone()),
        Analysis::Structured(result) => Ok(serde_json::to_string_pretty(result)?),
    }
}

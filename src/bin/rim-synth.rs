// Copyright (c) 2025 - Cowboy AI, Inc.
//! Deployment Plan Synthesizer
//!
//! Builds the rim deployment graph from the environment and writes the
//! cloud assembly (`manifest.json` plus one template per stack).
//!
//! Run with: cargo run --bin rim-synth -- --out cdk.out --context Project=rim
//!
//! Required environment: OWNER, RIM_HOSTED_ZONE_NAME, WEBAPP_TOKEN, EMAIL,
//! CDK_DEFAULT_ACCOUNT, CDK_DEFAULT_REGION.

use anyhow::{Context, Result};
use clap::Parser;
use rim_infrastructure::{build_deployment, DeploymentConfig};
use std::path::PathBuf;
use tracing::{info, warn};

#[derive(Parser, Debug)]
#[command(name = "rim-synth", about = "Render the rim deployment plan")]
struct Cli {
    /// Directory receiving the cloud assembly
    #[arg(long, default_value = "cdk.out")]
    out: PathBuf,

    /// Print the assembly as one JSON document instead of writing files
    #[arg(long)]
    stdout: bool,

    /// Context override (Creator, Project or EC2KeyName), repeatable
    #[arg(long = "context", short = 'c', value_name = "KEY=VALUE")]
    context: Vec<String>,
}

fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    info!("🚀 Synthesizing rim deployment plan");

    let mut config = DeploymentConfig::from_env().context("Failed to load configuration")?;
    for entry in &cli.context {
        config
            .apply_context_entry(entry)
            .with_context(|| format!("Invalid --context {}", entry))?;
    }
    info!("📋 Configuration loaded:");
    info!("  - Owner: {}", config.owner);
    info!("  - Environment: aws://{}/{}", config.account, config.region);
    info!("  - Tags: {:?}", config.tags);

    let graph = build_deployment(&config).context("Failed to build deployment graph")?;
    let assembly = graph.render().context("Failed to render cloud assembly")?;

    let warnings: usize = assembly
        .manifest
        .artifacts
        .values()
        .map(|artifact| artifact.warnings().count())
        .sum();
    if warnings > 0 {
        warn!("⚠️  {} finding(s) recorded in the manifest, review before deploying", warnings);
    }

    if cli.stdout {
        let document = assembly
            .to_json_string()
            .context("Failed to serialize cloud assembly")?;
        println!("{}", document);
        return Ok(());
    }

    let written = assembly
        .write_to(&cli.out)
        .with_context(|| format!("Failed to write cloud assembly to {}", cli.out.display()))?;
    info!("✅ Wrote {} files to {}", written.len(), cli.out.display());

    Ok(())
}

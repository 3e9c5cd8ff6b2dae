// SPDX-License-Identifier: MIT
// Copyright (c) 2026 StarTuz

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use oz_weather_core::manifest::Manifest;
use oz_weather_core::{CivilTime, Deployment, PageDataLoader, SiteConfig, SystemClock, Variant};
use simplelog::{ColorChoice, Config, LevelFilter, TermLogger, TerminalMode};
use std::path::PathBuf;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// JSON site config file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Origin of the deployed site
    #[arg(long, env = "OZ_WEATHER_BASE_URL")]
    base_url: Option<String>,

    /// Static build directory to read instead of a server
    #[arg(long, env = "OZ_WEATHER_SITE_DIR")]
    site_dir: Option<PathBuf>,

    /// Use the production base path
    #[arg(long)]
    production: bool,

    /// Explicit base path, overrides --production
    #[arg(long)]
    base_path: Option<String>,

    /// IANA timezone for today/currentHour
    #[arg(long)]
    timezone: Option<String>,

    /// Per-request timeout in seconds
    #[arg(long)]
    timeout: Option<u64>,

    /// Log every fetch to stderr
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Load a page's data and print it as JSON
    Load {
        /// cities, weather or forecast
        variant: Variant,
        /// Exit with an error if the load fell back to empty defaults
        #[arg(long)]
        strict: bool,
        /// Single-line output
        #[arg(long)]
        compact: bool,
    },
    /// List the endpoints a page fetches
    Manifest { variant: Variant },
    /// Print today and the current hour for the configured timezone
    Now,
}

impl Cli {
    fn site_config(&self) -> Result<SiteConfig> {
        let mut config = match &self.config {
            Some(path) => {
                let mut config = SiteConfig::load(path)?;
                config.apply_env();
                config
            }
            None => SiteConfig::from_env(),
        };

        if let Some(url) = &self.base_url {
            config.base_url = Some(url.clone());
        }
        if let Some(dir) = &self.site_dir {
            config.site_dir = Some(dir.clone());
        }
        if self.production {
            config.deployment = Deployment::Production;
        }
        if let Some(path) = &self.base_path {
            config.base_path = Some(path.clone());
        }
        if let Some(tz) = &self.timezone {
            config.timezone = tz.clone();
        }
        if let Some(secs) = self.timeout {
            config.timeout_secs = secs;
        }
        Ok(config)
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = if cli.verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Warn
    };
    TermLogger::init(
        level,
        Config::default(),
        TerminalMode::Stderr,
        ColorChoice::Auto,
    )
    .context("Failed to initialise logging")?;

    let config = cli.site_config()?;

    match &cli.command {
        Commands::Load {
            variant,
            strict,
            compact,
        } => {
            let timezone = config.timezone()?;
            let loader = PageDataLoader::new(config.fetcher()?).with_timezone(timezone);
            let outcome = loader.load(*variant);

            let json = if *compact {
                serde_json::to_string(outcome.result())?
            } else {
                serde_json::to_string_pretty(outcome.result())?
            };
            println!("{}", json);

            if *strict && outcome.is_degraded() {
                bail!("Loading {} data failed; printed empty defaults", variant);
            }
        }
        Commands::Manifest { variant } => {
            println!("Endpoints for the {} page:", variant);
            match variant.manifest() {
                Manifest::Fixed(endpoints) => {
                    for endpoint in endpoints {
                        println!(
                            "  {:<14} {:<9} {}",
                            endpoint.field, endpoint.shape, endpoint.path
                        );
                    }
                }
                Manifest::Indexed(indexed) => {
                    println!("  {:<14} {:<9} {}", indexed.index_field, "list", indexed.index_path);
                    println!(
                        "  {:<14} {:<9} {}",
                        indexed.detail_field, "map", indexed.detail_template
                    );
                }
            }
            if variant.derives_civil_time() {
                println!("  today, currentHour derived in {}", config.timezone);
            }
        }
        Commands::Now => {
            let civil = CivilTime::now(&SystemClock, config.timezone()?);
            println!("today={} currentHour={}", civil.today, civil.current_hour);
        }
    }

    Ok(())
}

mod config;
mod error;
mod models;
mod pipeline;
mod request;
mod scraper;
mod utils;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde::Serialize;
use std::io::Read;
use std::process::ExitCode;
use tracing::error;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use crate::config::AppConfig;
use crate::models::QuotaQuery;
use crate::pipeline::Pipeline;
use crate::request::{bad_request_body, failure_body, parse_request};
use crate::scraper::{QuotaSource, TaricScraper};

#[derive(Parser)]
#[command(name = "taric-quota", about = "EU TARIC tariff quota lookup", version)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,
}

#[derive(Subcommand)]
enum Command {
    /// Search quotas by origin and/or order number
    Query {
        /// Origin country or group code (e.g. MA, 1011 for ERGA OMNES)
        #[arg(short, long)]
        origin: Option<String>,

        /// Quota order number (e.g. 091100)
        #[arg(short = 'n', long)]
        order_number: Option<String>,

        /// Search year (default: current year)
        #[arg(short, long)]
        year: Option<i32>,

        /// Result offset passed through to the site
        #[arg(long, default_value_t = 0)]
        offset: u32,

        /// Also fetch the details page of every result
        #[arg(short, long)]
        details: bool,
    },

    /// Answer a JSON request body (use `-` to read it from stdin)
    Request {
        body: String,
    },

    /// Fetch the details page of a single quota
    Detail {
        #[arg(short = 'n', long)]
        order_number: String,

        /// Start date as YYYY-MM-DD
        #[arg(short, long)]
        start_date: String,
    },
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    let filter = match cli.verbose {
        0 => "taric_quota_scraper=info,warn",
        1 => "taric_quota_scraper=debug,info",
        _ => "trace",
    };

    tracing_subscriber::registry()
        .with(fmt::layer().compact().with_target(false).with_writer(std::io::stderr))
        .with(EnvFilter::new(filter))
        .init();

    let config = AppConfig::load()?;

    match cli.command {
        Command::Query {
            origin,
            order_number,
            year,
            offset,
            details,
        } => {
            let body = serde_json::json!({
                "origin": origin,
                "order_number": order_number,
                "year": year,
                "offset": offset,
                "include_details": details,
            });
            answer(&config, &body.to_string()).await
        }

        Command::Request { body } => {
            let body = if body == "-" {
                let mut buf = String::new();
                std::io::stdin()
                    .read_to_string(&mut buf)
                    .context("Failed to read request body from stdin")?;
                buf
            } else {
                body
            };
            answer(&config, &body).await
        }

        Command::Detail {
            order_number,
            start_date,
        } => {
            let scraper = TaricScraper::new(&config.scraper)?;
            match scraper.fetch_detail(&order_number, &start_date).await {
                Ok(detail) => {
                    print_json(&detail)?;
                    Ok(ExitCode::SUCCESS)
                }
                Err(e) => {
                    error!("Error fetching quota details: {}", e);
                    print_json(&failure_body(&e))?;
                    Ok(ExitCode::FAILURE)
                }
            }
        }
    }
}

/// Bad input → exit 2, scraping failure → exit 1.
async fn answer(config: &AppConfig, body: &str) -> Result<ExitCode> {
    let query: QuotaQuery = match parse_request(body) {
        Ok(q) => q,
        Err(e) => {
            print_json(&bad_request_body(&e))?;
            return Ok(ExitCode::from(2));
        }
    };

    let result = match Pipeline::from_config(config) {
        Ok(pipeline) => pipeline.run(&query).await,
        Err(e) => Err(e),
    };

    match result {
        Ok(result) => {
            print_json(&result)?;
            Ok(ExitCode::SUCCESS)
        }
        Err(e) => {
            error!("Error in TARIC quota lookup: {}", e);
            print_json(&failure_body(&e))?;
            Ok(ExitCode::FAILURE)
        }
    }
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

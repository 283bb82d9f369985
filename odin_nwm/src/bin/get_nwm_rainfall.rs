/*
 * Copyright © 2024, United States Government, as represented by the Administrator of
 * the National Aeronautics and Space Administration. All rights reserved.
 *
 * The “ODIN” software is licensed under the Apache License, Version 2.0 (the "License");
 * you may not use this file except in compliance with the License. You may obtain a copy
 * of the License at http://www.apache.org/licenses/LICENSE-2.0.
 *
 * Unless required by applicable law or agreed to in writing, software distributed under
 * the License is distributed on an "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND,
 * either express or implied. See the License for the specific language governing permissions
 * and limitations under the License.
 */
#![allow(unused)]

use anyhow::{Result, bail};
use clap::Parser;
use reqwest::Client;
use tracing::{info, error};
use tracing_subscriber::EnvFilter;

use odin_common::{config::to_ron_string, datetime::parse_yyyymmdd};
use odin_nwm::{
    load_config, ingest_date, archive_and_remove, NwmConfig, HttpDirectory, RemoteDirectory,
    listing::expand_dir_url, op_failed
};

#[derive(Parser, Debug)]
#[command(version, about, long_about = "retrieve and reproject hourly NWM analysis rainfall for a date")]
pub struct Args {
    /// filename of the NWM config
    #[arg(short,long, default_value = "nwm_rainfall.ron")]
    pub config: String,

    /// date to retrieve (yyyyMMdd), defaults to the configured date or yesterday
    #[arg(short,long)]
    pub date: Option<String>,

    /// keep the date directory instead of archiving it
    #[arg(long)]
    pub keep: bool,

    /// print the default config and exit
    #[arg(long)]
    pub show_default_config: bool,
}

#[tokio::main]
async fn main()->Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter( EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))  // use RUST_LOG to set max level
        .init();

    let args = Args::parse();

    if args.show_default_config {
        println!("{}", to_ron_string( &NwmConfig::default())?);
        return Ok(())
    }

    let config: NwmConfig = load_config( &args.config)?;
    let date = match &args.date {
        Some(s) => parse_yyyymmdd(s).ok_or_else(|| op_failed( format!("invalid date {s}")))?,
        None => config.target_date()
    };

    let client = Client::builder().timeout( config.request_timeout).build()?;
    let ingest = ingest_date( &config, &date, |folder| {
        let url = expand_dir_url( &config.dir_url_pattern, &date, &folder.name);
        Ok( Box::new( HttpDirectory::new( client.clone(), url)) as Box<dyn RemoteDirectory> )
    }).await?;
    let report = &ingest.report;

    // archive whatever we got, even if some slots failed
    if config.archive && !args.keep {
        archive_and_remove( &ingest.date_dir, &config.archive_path( &date))?;
    }
    info!("done retrieving NWM rainfall for {date}: {} products", report.asc_files.len());

    if !report.is_complete() {
        for failure in &report.failed {
            error!("{failure}");
        }
        bail!("{} slots of {date} failed", report.failed.len());
    }

    Ok(())
}

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

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use odin_common::{config::to_ron_string, datetime::utc_now};
use odin_hrrr::{load_config, run_monitor, run_monitor_tick, CommandDispatcher, HrrrMonitorConfig, OpendapService};

#[derive(Parser, Debug)]
#[command(version, about, long_about = "monitor HRRR precipitation forecasts and run a model if they exceed a threshold")]
pub struct Args {
    /// filename of the monitor config
    #[arg(short,long, default_value = "hrrr_monitor.ron")]
    pub config: String,

    /// run a single check and exit
    #[arg(long)]
    pub once: bool,

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
        println!("{}", to_ron_string( &HrrrMonitorConfig::default())?);
        return Ok(())
    }

    let config: HrrrMonitorConfig = load_config( &args.config)?;
    let service = OpendapService::new( config.request_timeout)?;
    let mut dispatcher = CommandDispatcher::new( &config.model_command, config.model_args.clone());
    if let Some(dir) = &config.model_working_dir {
        dispatcher = dispatcher.with_working_dir( dir);
    }

    if args.once {
        let outcome = run_monitor_tick( &config, &service, &dispatcher, &utc_now()).await?;
        println!("{outcome}");
    } else {
        run_monitor( &config, &service, &dispatcher).await?;
    }

    Ok(())
}

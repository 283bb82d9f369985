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

//! monitor HRRR precipitation forecasts for a fixed area and trigger a (hydrologic) model run once the
//! forecast exceeds a threshold.
//!
//! Forecast cycles are retrieved through the OPeNDAP interface of the NOMADS GrADS data server
//! (e.g. `http://nomads.ncep.noaa.gov:9090/dods/hrrr/hrrr20240612/hrrr_sfc_14z`). If the most recent cycle is not
//! published yet we fall back to previous hours. For each forecast step we extract the window of the configured
//! variable that covers the area of interest and compute its maximum. If the overall maximum exceeds the
//! configured threshold and we have not triggered yet for this cycle we record the cycle in a ledger file
//! and run the configured model command.

use std::{path::PathBuf, time::Duration};
use serde::{Deserialize,Serialize};

use odin_common::{define_load_config, datetime::{self, secs}};

mod errors;
pub use errors::*;

pub mod grid;
pub use grid::{GridMapper, SpatialWindow, grid_index};

pub mod opendap;
pub use opendap::{DatasetService, RemoteDataset, OpendapService};

pub mod fetch;
pub use fetch::{ForecastCycle, FetchedDataset, fetch_latest_dataset};

pub mod trigger;
pub use trigger::{TriggerLedger, TriggerOutcome, adjust_issue_hour, trigger_id, evaluate_trigger};

pub mod dispatch;
pub use dispatch::{ModelDispatcher, CommandDispatcher, DispatchStatus};

pub mod monitor;
pub use monitor::{collect_window_maxima, run_monitor_tick, run_monitor};

define_load_config!{}

/// geographic (lon/lat degrees) bounding box of the area to monitor
#[derive(Clone,Copy,Serialize,Deserialize,Debug,PartialEq)]
pub struct GeoBounds {
    pub lon_min: f64,
    pub lon_max: f64,
    pub lat_min: f64,
    pub lat_max: f64,
}

/// the regular lon/lat grid of the data server. The server side grid has changed in the past so
/// we keep a version tag to make it explicit which one the parameters refer to
#[derive(Clone,Serialize,Deserialize,Debug,PartialEq)]
pub struct GridConfig {
    pub version: String,
    /// longitude of column 0
    pub origin_lon: f64,
    /// latitude of row 0
    pub origin_lat: f64,
    /// degrees per column
    pub res_lon: f64,
    /// degrees per row
    pub res_lat: f64,
}

impl Default for GridConfig {
    fn default()->Self {
        GridConfig {
            version: "nomads-gds-2024".to_string(),
            origin_lon: -134.09548,
            origin_lat: 21.140547,
            res_lon: 0.029,
            res_lat: 0.027,
        }
    }
}

#[derive(Clone,Serialize,Deserialize,Debug)]
pub struct HrrrMonitorConfig {
    /// OPeNDAP root of the model (e.g. http://nomads.ncep.noaa.gov:9090/dods/hrrr)
    pub base_url: String,

    /// model name as used in dataset paths ("hrrr")
    pub model: String,

    /// the variable we compute maxima for (total precipitation "apcpsfc")
    pub variable: String,

    pub grid: GridConfig,

    /// the area we monitor
    pub bbox: GeoBounds,

    /// trigger if any value in the window reaches this
    pub threshold: f64,

    /// hours to subtract from the (UTC) cycle hour to get the hour used in trigger ids
    pub tz_offset_hours: u32,

    /// max hours to go back from the current hour to find a published cycle
    pub max_lookback: u32,

    /// max attempts to read a single forecast step window
    pub max_slice_retry: u32,

    /// delay before the first slice retry, doubled for each subsequent retry
    #[serde(deserialize_with="datetime::deserialize_duration", serialize_with="datetime::serialize_duration")]
    pub initial_retry_delay: Duration,

    #[serde(deserialize_with="datetime::deserialize_duration", serialize_with="datetime::serialize_duration")]
    pub max_retry_delay: Duration,

    /// values at or above this are server side fill values
    pub fill_value: f64,

    /// file that keeps the ids of cycles we already triggered for
    pub ledger_path: PathBuf,

    /// the executable that runs the model. Gets the trigger id as last argument
    pub model_command: String,

    pub model_args: Vec<String>,

    /// directory the model command runs in (default is the current directory)
    #[serde(default)]
    pub model_working_dir: Option<PathBuf>,

    #[serde(deserialize_with="datetime::deserialize_duration", serialize_with="datetime::serialize_duration")]
    pub check_interval: Duration,

    /// run the first check immediately instead of waiting for `check_interval`
    pub check_at_start: bool,

    #[serde(deserialize_with="datetime::deserialize_duration", serialize_with="datetime::serialize_duration")]
    pub request_timeout: Duration,
}

impl Default for HrrrMonitorConfig {
    fn default()->Self {
        HrrrMonitorConfig {
            base_url: "http://nomads.ncep.noaa.gov:9090/dods/hrrr".to_string(),
            model: "hrrr".to_string(),
            variable: "apcpsfc".to_string(),
            grid: GridConfig::default(),

            // Hampton Roads study area shifted to the server grid
            bbox: GeoBounds {
                lon_min: -77.979315 - 0.4489797462,
                lon_max: -76.649286 - 0.455314383,
                lat_min: 36.321159 - 0.133,
                lat_max: 37.203955 - 0.122955,
            },

            threshold: 30.0,
            tz_offset_hours: 4,
            max_lookback: 24,
            max_slice_retry: 5,
            initial_retry_delay: secs(1),
            max_retry_delay: secs(30),
            fill_value: 9.999e20,
            ledger_path: PathBuf::from("forecasts.txt"),
            model_command: "./run_model.sh".to_string(),
            model_args: Vec::new(),
            model_working_dir: None,
            check_interval: datetime::hours(1),
            check_at_start: false,
            request_timeout: secs(60),
        }
    }
}

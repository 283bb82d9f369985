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

//! resolve the most recent published forecast cycle

use chrono::{DateTime, NaiveDate, Timelike, Utc};
use tracing::{info, warn};

use odin_common::datetime::{full_hour, yyyymmdd};
use crate::{HrrrMonitorConfig, opendap::{DatasetService, RemoteDataset}, errors::*};

/// a model run, identified by its issue date and hour (UTC)
#[derive(Debug,Clone,Copy,PartialEq,Eq)]
pub struct ForecastCycle {
    pub issue_date: NaiveDate,
    pub issue_hour: u32,
    /// hours before the reference time at which this cycle was found
    pub lead_hours: u32,
}

impl ForecastCycle {
    pub fn for_lookback (reference: &DateTime<Utc>, lookback_hours: u32)->Self {
        let dt = full_hour(reference) - chrono::Duration::hours( lookback_hours as i64);
        ForecastCycle { issue_date: dt.date_naive(), issue_hour: dt.hour(), lead_hours: lookback_hours }
    }

    /// dataset URL of this cycle on the data server (e.g. `<base>/hrrr20240612/hrrr_sfc_14z`)
    pub fn url (&self, base_url: &str, model: &str)->String {
        cycle_url( base_url, model, &self.issue_date, self.issue_hour)
    }
}

pub fn cycle_url (base_url: &str, model: &str, date: &NaiveDate, hour: u32)->String {
    format!("{}/{model}{}/{model}_sfc_{:02}z", base_url.trim_end_matches('/'), yyyymmdd(date), hour)
}

pub struct FetchedDataset {
    pub cycle: ForecastCycle,
    pub dataset: Box<dyn RemoteDataset>,
    /// number of datasets we tried to open, including the successful one
    pub attempts: u32,
}

/// open the most recent cycle that is published at `reference` - `initial_lookback` hours or earlier. Cycles that
/// cannot be opened or do not have any variables are skipped. Gives up after `max_lookback` hours
pub async fn fetch_latest_dataset (service: &dyn DatasetService, cfg: &HrrrMonitorConfig,
                                   reference: &DateTime<Utc>, initial_lookback: u32)->Result<FetchedDataset> {
    let mut attempts = 0;

    for lookback in initial_lookback..=cfg.max_lookback {
        let cycle = ForecastCycle::for_lookback( reference, lookback);
        let url = cycle.url( &cfg.base_url, &cfg.model);
        attempts += 1;

        match service.open( &url).await {
            Ok(dataset) => {
                if dataset.variable_names().is_empty() {
                    warn!("no variables in {url}, trying previous cycle");
                } else {
                    info!("using forecast cycle {url}");
                    return Ok( FetchedDataset { cycle, dataset, attempts } )
                }
            }
            Err(e) => {
                warn!("failed to open {url}: {e}, trying previous cycle");
            }
        }
    }

    Err( source_unavailable( format!("no {} cycle within {} hours of {reference} ({attempts} attempts)", cfg.model, cfg.max_lookback)))
}

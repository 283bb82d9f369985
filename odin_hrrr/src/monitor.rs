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

//! the periodic check: fetch the latest cycle, compute window maxima for all forecast steps and evaluate the trigger

use std::time::Duration;
use chrono::{DateTime, Utc};
use tracing::{debug, info, warn, error};

use odin_common::datetime::{secs, utc_now};
use crate::{
    HrrrMonitorConfig, GridMapper, SpatialWindow,
    opendap::{DatasetService, RemoteDataset},
    fetch::fetch_latest_dataset,
    trigger::{TriggerLedger, TriggerOutcome, adjust_issue_hour, trigger_id, evaluate_trigger},
    dispatch::ModelDispatcher,
    errors::*
};

/// max of all valid values. Non-finite values and server fill values are ignored
pub fn window_max (values: &[f64], fill_value: f64)->Option<f64> {
    values.iter()
        .filter( |v| v.is_finite() && **v < fill_value)
        .fold( None, |acc: Option<f64>, v| Some( acc.map_or( *v, |m| m.max(*v))))
}

pub fn overall_max (maxima: &[Option<f64>])->Option<f64> {
    maxima.iter().flatten().fold( None, |acc: Option<f64>, v| Some( acc.map_or( *v, |m| m.max(*v))))
}

/// read a window with up to `max_slice_retry` attempts for transient errors. The delay between attempts
/// starts at `initial_retry_delay` and doubles up to `max_retry_delay`
pub async fn read_window_with_retry (dataset: &dyn RemoteDataset, cfg: &HrrrMonitorConfig,
                                     time_step: usize, window: &SpatialWindow)->Result<Vec<f64>> {
    let max_attempts = cfg.max_slice_retry.max(1);
    let mut delay = cfg.initial_retry_delay;
    let mut attempt = 1;

    loop {
        match dataset.read_window( &cfg.variable, time_step, window).await {
            Ok(values) => return Ok(values),
            Err(e) if e.is_transient() => {
                if attempt < max_attempts {
                    warn!("reading {}[{time_step}]{window} failed: {e}, retry {attempt}/{max_attempts} in {delay:?}", cfg.variable);
                    tokio::time::sleep(delay).await;
                    delay = (delay * 2).min( cfg.max_retry_delay);
                    attempt += 1;
                } else {
                    return Err( source_unavailable( format!("{}[{time_step}] of {} after {attempt} attempts: {e}", cfg.variable, dataset.url())))
                }
            }
            Err(e) => return Err(e)
        }
    }
}

/// maxima of the configured variable within `window`, one entry per forecast step
pub async fn collect_window_maxima (dataset: &dyn RemoteDataset, cfg: &HrrrMonitorConfig, window: &SpatialWindow)->Result<Vec<Option<f64>>> {
    let n_steps = dataset.time_steps( &cfg.variable)?;
    let mut maxima: Vec<Option<f64>> = Vec::with_capacity( n_steps);

    for t in 0..n_steps {
        let values = read_window_with_retry( dataset, cfg, t, window).await?;
        let max = window_max( &values, cfg.fill_value);
        debug!("step {t}: max {max:?}");
        maxima.push( max);
    }

    Ok(maxima)
}

/// a single monitor check for reference time `now`
pub async fn run_monitor_tick (cfg: &HrrrMonitorConfig, service: &dyn DatasetService, dispatcher: &dyn ModelDispatcher,
                               now: &DateTime<Utc>)->Result<TriggerOutcome> {
    let mut ledger = TriggerLedger::load( &cfg.ledger_path);
    debug!("ledger {:?} has {} entries", ledger.path(), ledger.entries().len());

    let window = GridMapper::from( &cfg.grid).window( &cfg.bbox)?;
    let fetched = fetch_latest_dataset( service, cfg, now, 0).await?;
    let maxima = collect_window_maxima( fetched.dataset.as_ref(), cfg, &window).await?;
    let max = overall_max( &maxima);

    let cycle = &fetched.cycle;
    let (date, hour) = adjust_issue_hour( cycle.issue_date, cycle.issue_hour, cfg.tz_offset_hours);
    let id = trigger_id( &date, hour);
    info!("cycle {} {:02}z: {} steps, max {max:?}", cycle.issue_date, cycle.issue_hour, maxima.len());

    evaluate_trigger( &mut ledger, dispatcher, &id, max, cfg.threshold).await
}

/// run checks every `check_interval` until the process is terminated. Failed checks are logged and do not
/// stop the loop. Checks never overlap
pub async fn run_monitor (cfg: &HrrrMonitorConfig, service: &dyn DatasetService, dispatcher: &dyn ModelDispatcher)->Result<()> {
    let interval = chrono::Duration::from_std( cfg.check_interval).map_err( |e| op_failed(e))?;
    let mut next_check = if cfg.check_at_start { utc_now() } else { utc_now() + interval };
    info!("monitoring {} every {:?}, next check at {next_check}", cfg.variable, cfg.check_interval);

    loop {
        let now = utc_now();
        if now >= next_check {
            match run_monitor_tick( cfg, service, dispatcher, &now).await {
                Ok(outcome) => info!("check at {now}: {outcome}"),
                Err(e) => error!("check at {now} failed: {e}")
            }
            next_check = utc_now() + interval;
            info!("next check at {next_check}");
        }
        tokio::time::sleep( secs(1)).await;
    }
}

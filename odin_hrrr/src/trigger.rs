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

//! threshold trigger with a file backed ledger of the cycles we already triggered for.
//!
//! The ledger is always written before the model run is dispatched, i.e. a crash between the two
//! steps can lose a model run but never cause a duplicate one.

use std::{collections::HashSet, fmt, path::{Path,PathBuf}};
use chrono::{Duration, NaiveDate};
use tracing::{debug, info, warn, error};

use odin_common::{datetime::yyyymmdd, fs::{filepath_contents_as_string, replace_file_contents}};
use crate::{dispatch::ModelDispatcher, errors::*};

/// subtract `offset_hours` from a (UTC) issue hour, going back as many days as needed
pub fn adjust_issue_hour (date: NaiveDate, hour: u32, offset_hours: u32)->(NaiveDate,u32) {
    let h = hour as i64 - offset_hours as i64;
    let days_back = h.div_euclid(24);
    let adjusted_hour = h.rem_euclid(24) as u32;

    (date + Duration::days(days_back), adjusted_hour)
}

/// the ledger id for a cycle (e.g. "20240612-100000"). Note the hour is not zero padded
pub fn trigger_id (date: &NaiveDate, hour: u32)->String {
    format!("{}-{}0000", yyyymmdd(date), hour)
}

#[derive(Debug)]
pub struct TriggerLedger {
    path: PathBuf,
    /// in file order
    entries: Vec<String>,
    known: HashSet<String>,
}

impl TriggerLedger {
    /// read the ledger from `path`. Missing or unreadable files result in an empty ledger
    pub fn load (path: impl AsRef<Path>)->Self {
        let path = path.as_ref().to_path_buf();
        let mut entries: Vec<String> = Vec::new();
        let mut known: HashSet<String> = HashSet::new();

        if path.is_file() {
            match filepath_contents_as_string( &path) {
                Ok(contents) => {
                    for id in contents.lines().map( |l| l.trim()).filter( |l| !l.is_empty()) {
                        if known.insert( id.to_string()) {
                            entries.push( id.to_string());
                        }
                    }
                }
                Err(e) => warn!("ignoring unreadable ledger {path:?}: {e}")
            }
        } else {
            debug!("no ledger {path:?} yet");
        }

        TriggerLedger { path, entries, known }
    }

    pub fn path (&self)->&Path { &self.path }

    pub fn entries (&self)->&[String] { &self.entries }

    pub fn contains (&self, id: &str)->bool {
        self.known.contains(id)
    }

    /// add `id` and persist the ledger. Returns false if `id` was already recorded. The file is
    /// replaced atomically so that concurrent readers never see a partial ledger
    pub fn record (&mut self, id: &str)->Result<bool> {
        if self.contains(id) { return Ok(false) }

        let mut contents = String::with_capacity( (self.entries.len() + 1) * 16);
        for e in self.entries.iter().map( |s| s.as_str()).chain( std::iter::once(id)) {
            contents.push_str(e);
            contents.push('\n');
        }
        replace_file_contents( &self.path, contents.as_bytes())?;

        self.entries.push( id.to_string());
        self.known.insert( id.to_string());
        Ok(true)
    }
}

#[derive(Debug,Clone,PartialEq)]
pub enum TriggerOutcome {
    Triggered { id: String, max: f64 },
    AlreadyTriggered { id: String, max: f64 },
    BelowThreshold { max: Option<f64> },
}

impl fmt::Display for TriggerOutcome {
    fn fmt (&self, f: &mut fmt::Formatter<'_>)->fmt::Result {
        match self {
            TriggerOutcome::Triggered{id,max} => write!(f, "triggered {id} (max {max})"),
            TriggerOutcome::AlreadyTriggered{id,max} => write!(f, "already triggered {id} (max {max})"),
            TriggerOutcome::BelowThreshold{max: Some(max)} => write!(f, "below threshold (max {max})"),
            TriggerOutcome::BelowThreshold{max: None} => write!(f, "no valid values"),
        }
    }
}

/// record `id` and dispatch a model run if `max` reaches `threshold` and `id` is not yet in the ledger.
/// Failing to write the ledger is an error and suppresses the dispatch. Dispatch failures are only logged
pub async fn evaluate_trigger (ledger: &mut TriggerLedger, dispatcher: &dyn ModelDispatcher,
                               id: &str, max: Option<f64>, threshold: f64)->Result<TriggerOutcome> {
    match max {
        Some(max) if max >= threshold => {
            if ledger.contains(id) {
                info!("{id} max {max} exceeds threshold {threshold} but was already triggered");
                Ok( TriggerOutcome::AlreadyTriggered { id: id.to_string(), max } )

            } else {
                ledger.record(id)?;
                info!("{id} max {max} exceeds threshold {threshold}, dispatching model run");

                match dispatcher.dispatch(id).await {
                    Ok(status) => info!("model run for {id} finished: {status}"),
                    Err(e) => error!("model run for {id} failed: {e}")
                }
                Ok( TriggerOutcome::Triggered { id: id.to_string(), max } )
            }
        }
        _ => {
            info!("{id} below threshold {threshold} (max {max:?})");
            Ok( TriggerOutcome::BelowThreshold { max } )
        }
    }
}

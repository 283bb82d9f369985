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

//! in-memory data services and dispatchers for tests

use std::{path::PathBuf, sync::{Arc,Mutex}};
use async_trait::async_trait;

use odin_hrrr::{
    DatasetService, RemoteDataset, ModelDispatcher, DispatchStatus, SpatialWindow, HrrrMonitorConfig,
    OdinHrrrError, Result, server_error
};

/// a dataset that reports a fixed maximum per time step. The first `transient_failures` window reads fail
pub struct StubDataset {
    pub url: String,
    pub variables: Vec<String>,
    pub maxima: Vec<f64>,
    pub transient_failures: Mutex<u32>,
    pub reads: Arc<Mutex<u32>>,
}

#[async_trait]
impl RemoteDataset for StubDataset {
    fn url (&self)->&str { &self.url }

    fn variable_names (&self)->Vec<String> { self.variables.clone() }

    fn time_steps (&self, var: &str)->Result<usize> {
        if self.variables.iter().any(|v| v == var) {
            Ok( self.maxima.len())
        } else {
            Err( OdinHrrrError::NoSuchVariable( var.to_string()))
        }
    }

    async fn read_window (&self, var: &str, time_step: usize, window: &SpatialWindow)->Result<Vec<f64>> {
        *self.reads.lock().unwrap() += 1;
        {
            let mut n = self.transient_failures.lock().unwrap();
            if *n > 0 {
                *n -= 1;
                return Err( server_error("stub server busy"))
            }
        }

        let mut values = vec![0.0; window.len()];
        values[0] = 9.999e20; // fill value
        values[window.len()/2] = self.maxima[time_step];
        Ok(values)
    }
}

/// fails to open the first `failures` datasets, then returns datasets with the given maxima
pub struct StubService {
    pub failures: u32,
    pub empty_variables: bool,
    pub maxima: Vec<f64>,
    pub transient_read_failures: u32,
    pub opened: Mutex<Vec<String>>,
    pub reads: Arc<Mutex<u32>>,
}

impl StubService {
    pub fn new (failures: u32, maxima: Vec<f64>)->Self {
        StubService {
            failures, empty_variables: false, maxima, transient_read_failures: 0,
            opened: Mutex::new(Vec::new()), reads: Arc::new(Mutex::new(0))
        }
    }

    pub fn opened (&self)->Vec<String> { self.opened.lock().unwrap().clone() }
}

#[async_trait]
impl DatasetService for StubService {
    async fn open (&self, url: &str)->Result<Box<dyn RemoteDataset>> {
        let n = {
            let mut opened = self.opened.lock().unwrap();
            opened.push( url.to_string());
            opened.len() as u32
        };

        if n <= self.failures {
            Err( server_error( format!("{url} is not an available dataset")))
        } else {
            let variables = if self.empty_variables { Vec::new() } else { vec!["time".to_string(), "apcpsfc".to_string()] };
            Ok( Box::new( StubDataset {
                url: url.to_string(),
                variables,
                maxima: self.maxima.clone(),
                transient_failures: Mutex::new( self.transient_read_failures),
                reads: self.reads.clone(),
            }))
        }
    }
}

/// records dispatched ids together with the ledger contents at the time of the dispatch
pub struct RecordingDispatcher {
    pub ledger_path: PathBuf,
    pub dispatched: Mutex<Vec<(String,String)>>,
}

impl RecordingDispatcher {
    pub fn new (ledger_path: impl Into<PathBuf>)->Self {
        RecordingDispatcher { ledger_path: ledger_path.into(), dispatched: Mutex::new(Vec::new()) }
    }

    pub fn dispatched (&self)->Vec<(String,String)> { self.dispatched.lock().unwrap().clone() }
}

#[async_trait]
impl ModelDispatcher for RecordingDispatcher {
    async fn dispatch (&self, id: &str)->Result<DispatchStatus> {
        let ledger = std::fs::read_to_string( &self.ledger_path).unwrap_or_default();
        self.dispatched.lock().unwrap().push( (id.to_string(), ledger));
        Ok( DispatchStatus { success: true, exit_code: Some(0) } )
    }
}

pub fn test_config (ledger_path: impl Into<PathBuf>)->HrrrMonitorConfig {
    HrrrMonitorConfig {
        ledger_path: ledger_path.into(),
        initial_retry_delay: odin_common::datetime::millis(1),
        max_retry_delay: odin_common::datetime::millis(4),
        ..HrrrMonitorConfig::default()
    }
}

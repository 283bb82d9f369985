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

//! common utilities shared by the rainfall acquisition crates: filesystem, date/time, network
//! and configuration support

pub mod macros;
pub mod fs;
pub mod datetime;
pub mod net;
pub mod config;

/// a simple incremental min/max/mean/std accumulator (Welford)
#[derive(Debug,Clone,Copy)]
pub struct MinMaxAvg {
    pub n: usize,
    pub min: f64,
    pub max: f64,
    pub avg: f64,
    m2: f64,
}

impl MinMaxAvg {
    pub fn new()->Self { MinMaxAvg { n: 0, min: f64::MAX, max: f64::MIN, avg: f64::NAN, m2: 0.0 } }

    /// add a new observation
    pub fn add (&mut self, x: f64) {
        self.n += 1;

        if self.n > 1 {
            let delta = x - self.avg;
            self.avg = self.avg + delta / self.n as f64;
            self.m2 += delta * (x - self.avg);
            if x < self.min { self.min = x }
            if x > self.max { self.max = x }
        } else {
            self.min = x;
            self.max = x;
            self.avg = x;
        }
    }

    /// population standard deviation (NaN if there are no observations)
    pub fn std_dev (&self)->f64 {
        if self.n > 0 { (self.m2 / self.n as f64).sqrt() } else { f64::NAN }
    }

    pub fn is_empty (&self)->bool { self.n == 0 }
}

impl Default for MinMaxAvg {
    fn default()->Self { MinMaxAvg::new() }
}

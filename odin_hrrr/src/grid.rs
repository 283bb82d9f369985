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

//! mapping of geographic coordinates to indices of a regular lon/lat grid

use std::fmt;
use crate::{GeoBounds, GridConfig, errors::{Result, invalid_window}};

/// index of the grid cell that contains `value`. Values below `origin` yield negative indices
#[inline]
pub fn grid_index (value: f64, origin: f64, resolution: f64)->i64 {
    ((value - origin) / resolution).floor() as i64
}

/// half open index ranges `row_min..row_max`, `col_min..col_max` into a grid
#[derive(Debug,Clone,Copy,PartialEq,Eq)]
pub struct SpatialWindow {
    pub row_min: usize,
    pub row_max: usize,
    pub col_min: usize,
    pub col_max: usize,
}

impl SpatialWindow {
    pub fn rows (&self)->usize { self.row_max - self.row_min }
    pub fn cols (&self)->usize { self.col_max - self.col_min }
    pub fn len (&self)->usize { self.rows() * self.cols() }
    pub fn is_empty (&self)->bool { self.len() == 0 }
}

impl fmt::Display for SpatialWindow {
    fn fmt (&self, f: &mut fmt::Formatter<'_>)->fmt::Result {
        write!(f, "[{}..{}][{}..{}]", self.row_min, self.row_max, self.col_min, self.col_max)
    }
}

#[derive(Debug,Clone,Copy,PartialEq)]
pub struct GridMapper {
    pub origin_lon: f64,
    pub origin_lat: f64,
    pub res_lon: f64,
    pub res_lat: f64,
}

impl GridMapper {
    pub fn new (origin_lon: f64, origin_lat: f64, res_lon: f64, res_lat: f64)->Self {
        GridMapper { origin_lon, origin_lat, res_lon, res_lat }
    }

    pub fn col (&self, lon: f64)->i64 { grid_index( lon, self.origin_lon, self.res_lon) }

    pub fn row (&self, lat: f64)->i64 { grid_index( lat, self.origin_lat, self.res_lat) }

    /// the window covering `bounds`. Upper bounds are exclusive, i.e. the cell that contains
    /// `lon_max` (or `lat_max`) is not part of the window
    pub fn window (&self, bounds: &GeoBounds)->Result<SpatialWindow> {
        let col_min = self.col( bounds.lon_min);
        let col_max = self.col( bounds.lon_max);
        let row_min = self.row( bounds.lat_min);
        let row_max = self.row( bounds.lat_max);

        if col_min < 0 || row_min < 0 {
            return Err( invalid_window( format!("negative grid index for {bounds:?}")))
        }
        if col_max <= col_min || row_max <= row_min {
            return Err( invalid_window( format!("empty window for {bounds:?}")))
        }

        Ok( SpatialWindow {
            row_min: row_min as usize, row_max: row_max as usize,
            col_min: col_min as usize, col_max: col_max as usize
        })
    }
}

impl From<&GridConfig> for GridMapper {
    fn from (cfg: &GridConfig)->Self {
        GridMapper::new( cfg.origin_lon, cfg.origin_lat, cfg.res_lon, cfg.res_lat)
    }
}

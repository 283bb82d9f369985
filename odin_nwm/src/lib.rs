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

//! retrieve hourly National Water Model (NWM) analysis rainfall for a target date, reproject it into the
//! coordinate system of the study area and archive the resulting ASCII grids.
//!
//! For each configured data folder (e.g. `forcing_analysis_assim`) and each of the 24 hour slots of the
//! target date we wait for the corresponding file to show up in the NOMADS directory listing, download it,
//! convert the rain rate (mm/s) into hourly rainfall (mm) and push it through
//! [`reproject::reproject_timestep`]. Once all hours are processed the date directory is zipped and removed.

use std::{path::PathBuf, time::Duration};
use chrono::NaiveDate;
use serde::{Deserialize,Serialize};

use odin_common::{define_load_config, datetime::{self, secs}};

mod errors;
pub use errors::*;

pub mod listing;
pub use listing::{RemoteDirectory, HttpDirectory, LocalDirectory, await_file};

pub mod reproject;
pub use reproject::{TimestepRecord, RasterProduct, product_name, reproject_timestep};

pub mod ingest;
pub use ingest::{read_timestep, ingest_hour, ingest_folder, ingest_date, IngestReport, DateIngest, SlotFailure};

pub mod archive;
pub use archive::{zip_dir, archive_and_remove};

define_load_config!{}

/// native projection of the NWM CONUS forcing grids
pub const NWM_LCC_PROJ4: &str = "+proj=lcc +a=6370000.0 +f=0.0 +pm=0.0 +x_0=0.0 +y_0=0.0 +lon_0=-97.0 +lat_1=30.0 +lat_2=60.0 +lat_0=40.0000076294 +units=m +axis=enu +no_defs";

/// a NWM product folder (e.g. "forcing_analysis_assim") and how to process its files
#[derive(Clone,Serialize,Deserialize,Debug)]
pub struct DataFolderConfig {
    pub name: String,

    /// file name of the hour slot with `${HH}` as the (zero padded) hour placeholder
    pub file_template: String,

    /// the NetCDF variable to extract
    pub variable: String,

    /// factor to convert variable values into output units (RAINRATE mm/s -> mm/h)
    pub scale: f64,

    /// wait for missing hour slot files to be published. If false missing slots are skipped
    pub await_publication: bool,
}

impl Default for DataFolderConfig {
    fn default()->Self {
        DataFolderConfig {
            name: "forcing_analysis_assim".to_string(),
            file_template: "nwm.t${HH}z.analysis_assim.forcing.tm00.conus.nc".to_string(),
            variable: "RAINRATE".to_string(),
            scale: 3600.0,
            await_publication: true,
        }
    }
}

#[derive(Clone,Serialize,Deserialize,Debug)]
pub struct ReprojectConfig {
    /// projection of the downloaded grids (PROJ.4, WKT or EPSG:n)
    pub source_srs: String,

    /// projection of the products
    pub target_srs: String,

    /// (x,y) resolution of the products in target_srs units
    pub target_resolution: (f64,f64),

    /// value used for missing data in the raster files
    pub no_data: f64,
}

impl Default for ReprojectConfig {
    fn default()->Self {
        ReprojectConfig {
            source_srs: NWM_LCC_PROJ4.to_string(),
            target_srs: "+proj=utm +zone=18 +datum=NAD83".to_string(),
            target_resolution: (500.0, 500.0),
            no_data: -9999.0,
        }
    }
}

#[derive(Clone,Serialize,Deserialize,Debug)]
pub struct NwmConfig {
    /// directory listing URL with `${yyyyMMdd}` and `${folder}` placeholders
    pub dir_url_pattern: String,

    pub data_folders: Vec<DataFolderConfig>,

    /// delay between directory listing requests while waiting for a file
    #[serde(deserialize_with="datetime::deserialize_duration", serialize_with="datetime::serialize_duration")]
    pub poll_interval: Duration,

    /// max time to wait for a single file
    #[serde(deserialize_with="datetime::deserialize_duration", serialize_with="datetime::serialize_duration")]
    pub max_wait: Duration,

    #[serde(deserialize_with="datetime::deserialize_duration", serialize_with="datetime::serialize_duration")]
    pub request_timeout: Duration,

    /// products go into `<output_root>/<yyyyMMdd>/<folder>/realtime_rainfall`
    pub output_root: PathBuf,

    /// polygon file (shapefile, GeoJSON..) of the study area the products are clipped to
    pub boundary_path: PathBuf,

    pub reproject: ReprojectConfig,

    /// date to retrieve. Defaults to yesterday (UTC) since the server only keeps the last two days
    pub target_date: Option<NaiveDate>,

    /// zip the date directory into `<output_root>/<yyyyMMdd>.zip` and remove it
    pub archive: bool,
}

impl Default for NwmConfig {
    fn default()->Self {
        NwmConfig {
            dir_url_pattern: "https://nomads.ncep.noaa.gov/pub/data/nccf/com/nwm/prod/nwm.${yyyyMMdd}/${folder}".to_string(),
            data_folders: vec![ DataFolderConfig::default() ],
            poll_interval: secs(30),
            max_wait: datetime::hours(6),
            request_timeout: secs(300),
            output_root: PathBuf::from("."),
            boundary_path: PathBuf::from("../scripts_shapefiles/Hampton_Roads_model.shp"),
            reproject: ReprojectConfig::default(),
            target_date: None,
            archive: true,
        }
    }
}

impl NwmConfig {
    /// the configured target date or yesterday (UTC)
    pub fn target_date (&self)->NaiveDate {
        self.target_date.unwrap_or_else(|| (datetime::utc_now() - chrono::Duration::days(1)).date_naive())
    }

    pub fn date_dir (&self, date: &NaiveDate)->PathBuf {
        self.output_root.join( datetime::yyyymmdd(date))
    }

    pub fn folder_dir (&self, date: &NaiveDate, folder: &DataFolderConfig)->PathBuf {
        self.date_dir(date).join( &folder.name).join("realtime_rainfall")
    }

    pub fn archive_path (&self, date: &NaiveDate)->PathBuf {
        self.output_root.join( format!("{}.zip", datetime::yyyymmdd(date)))
    }
}

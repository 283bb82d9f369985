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

//! per date / folder / hour ingestion of NWM files

use std::{fmt, path::{Path,PathBuf}};
use chrono::NaiveDate;
use ndarray::Array2;
use tracing::{debug, info, warn, error};

use odin_common::fs::{ensure_dir, ensure_writable_dir, remove_files};
use odin_gdal::{nc_dataset, raster::read_band_array};
use crate::{
    NwmConfig, DataFolderConfig,
    listing::{RemoteDirectory, await_file},
    reproject::{TimestepRecord, RasterProduct, PipelinePaths, product_name, reproject_timestep},
    errors::*
};

/// the file name for hour slot `hour` of a `${HH}` template
pub fn slot_file_name (template: &str, hour: u32)->String {
    template.replace( "${HH}", &format!("{hour:02}"))
}

/// does `name` belong to hour slot `hour` (`<model>.tHHz.<..>.<..>.tm00.<..>`)
pub fn is_slot_file (name: &str, hour: u32)->bool {
    let fields: Vec<&str> = name.split('.').collect();
    fields.len() >= 7 && fields[1] == format!("t{hour:02}z") && fields[4] == "tm00"
}

/// read `variable` of a NetCDF file and multiply it with `scale`. Missing values become NaN
pub fn read_timestep (path: &Path, variable: &str, scale: f64, projection: &str)->Result<TimestepRecord> {
    let ds = nc_dataset( path, variable)?;
    let gt = ds.geo_transform().map_err( odin_gdal::Error::from)?;
    let values = read_band_array( &ds, 1)?.mapv( |v| v * scale);
    let (rows, cols) = values.dim();

    let x_coords: Vec<f64> = (0..cols).map( |i| gt[0] + gt[1]/2.0 + i as f64 * gt[1]).collect();
    let y_coords: Vec<f64> = (0..rows).map( |j| gt[3] + gt[5]/2.0 + j as f64 * gt[5]).collect();

    Ok( TimestepRecord { values, x_coords, y_coords, projection: projection.to_string() } )
}

/// download, read and reproject a single file, then remove the download and all intermediate files
async fn process_file (dir: &dyn RemoteDirectory, cfg: &NwmConfig, folder: &DataFolderConfig,
                       date: &NaiveDate, filename: &str, dest_dir: &Path)->Result<RasterProduct> {
    let name = product_name( date, filename)?;
    let local = dest_dir.join( filename);
    let paths = PipelinePaths::new( dest_dir, &name);

    let res = async {
        dir.fetch_file( filename, &local).await?;
        let record = read_timestep( &local, &folder.variable, folder.scale, &cfg.reproject.source_srs)?;
        reproject_timestep( &record, &name, dest_dir, &cfg.reproject, &cfg.boundary_path)
    }.await;

    let mut garbage = paths.intermediates();
    garbage.push( local);
    match remove_files( &garbage) {
        Ok(n) => debug!("removed {n} files for {name}"),
        Err(e) => warn!("failed to clean up files for {name}: {e}")
    }

    res
}

/// process all files of hour slot `hour`. Folders configured to await publication poll the directory for the
/// slot file, otherwise the slot is skipped if there is no matching file
pub async fn ingest_hour (dir: &dyn RemoteDirectory, cfg: &NwmConfig, folder: &DataFolderConfig,
                          date: &NaiveDate, hour: u32, dest_dir: &Path)->Result<Vec<RasterProduct>> {
    let files = if folder.await_publication {
        let slot_file = slot_file_name( &folder.file_template, hour);
        await_file( dir, &slot_file, cfg.poll_interval, cfg.max_wait).await?
    } else {
        dir.list_files().await?
    };

    let mut products: Vec<RasterProduct> = Vec::new();
    for filename in files.iter().filter( |f| is_slot_file( f, hour)) {
        let product = process_file( dir, cfg, folder, date, filename, dest_dir).await?;
        info!("created {:?}", product.asc_path);
        products.push( product);
    }

    if products.is_empty() {
        info!("no files for {} hour {hour:02}", folder.name);
    }
    Ok(products)
}

/// an hour slot that could not be processed
#[derive(Debug,Clone)]
pub struct SlotFailure {
    pub folder: String,
    /// None if the whole folder failed
    pub hour: Option<u32>,
    pub reason: String,
}

impl fmt::Display for SlotFailure {
    fn fmt (&self, f: &mut fmt::Formatter<'_>)->fmt::Result {
        match self.hour {
            Some(hour) => write!(f, "{} hour {hour:02}: {}", self.folder, self.reason),
            None => write!(f, "{}: {}", self.folder, self.reason)
        }
    }
}

#[derive(Debug,Default)]
pub struct IngestReport {
    /// the ASCII grid files that were created
    pub asc_files: Vec<PathBuf>,
    pub failed: Vec<SlotFailure>,
}

impl IngestReport {
    pub fn is_complete (&self)->bool { self.failed.is_empty() }

    fn merge (&mut self, other: IngestReport) {
        self.asc_files.extend( other.asc_files);
        self.failed.extend( other.failed);
    }
}

/// process the 24 hour slots of `date` in sequence. A failed slot is logged and recorded, and does not keep
/// the remaining slots from being processed
pub async fn ingest_folder (dir: &dyn RemoteDirectory, cfg: &NwmConfig, folder: &DataFolderConfig, date: &NaiveDate)->Result<IngestReport> {
    let dest_dir = cfg.folder_dir( date, folder);
    ensure_dir( &dest_dir)?;
    info!("retrieving {} for {date} from {}", folder.name, dir.location());

    let mut report = IngestReport::default();
    for hour in 0..24 {
        match ingest_hour( dir, cfg, folder, date, hour, &dest_dir).await {
            Ok(products) => report.asc_files.extend( products.into_iter().map( |p| p.asc_path)),
            Err(e) => {
                error!("failed to ingest {} hour {hour:02} of {date}: {e}", folder.name);
                report.failed.push( SlotFailure { folder: folder.name.clone(), hour: Some(hour), reason: e.to_string() });
            }
        }
    }
    Ok(report)
}

/// the outcome of ingesting all folders of a date
#[derive(Debug)]
pub struct DateIngest {
    /// directory that holds the products of all folders
    pub date_dir: PathBuf,
    pub report: IngestReport,
}

/// ingest all configured data folders for `date`. `open_dir` provides the directory of a folder. Folders that
/// cannot be opened are recorded as failed, the other folders are still processed. Only errors that prevent
/// writing any output (e.g. a non-writable output root) are returned as `Err`
pub async fn ingest_date<F> (cfg: &NwmConfig, date: &NaiveDate, mut open_dir: F)->Result<DateIngest>
    where F: FnMut(&DataFolderConfig)->Result<Box<dyn RemoteDirectory>>
{
    ensure_writable_dir( &cfg.output_root)?;
    let date_dir = cfg.date_dir( date);
    ensure_dir( &date_dir)?;

    let mut report = IngestReport::default();
    for folder in &cfg.data_folders {
        let res = match open_dir( folder) {
            Ok(dir) => ingest_folder( dir.as_ref(), cfg, folder, date).await,
            Err(e) => Err(e)
        };

        match res {
            Ok(folder_report) => {
                info!("{} products for {} on {date}, {} failed slots", folder_report.asc_files.len(), folder.name, folder_report.failed.len());
                report.merge( folder_report);
            }
            Err(e) => {
                error!("failed to ingest {} for {date}: {e}", folder.name);
                report.failed.push( SlotFailure { folder: folder.name.clone(), hour: None, reason: e.to_string() });
            }
        }
    }

    Ok( DateIngest { date_dir, report } )
}

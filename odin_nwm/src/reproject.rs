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

//! the reprojection chain for a single timestep:
//!   1. geo-raster construction in the native projection (`<name>.tif`)
//!   2. reprojection to the target SRS and resolution (`projected<name>.tif`)
//!   3. clip to the study area boundary (`clipped_<name>.tif`) and conversion to an ASCII grid (`<name>.asc`)
//!   4. re-extraction of the (unclipped) projected array with ascending y coordinates
//!
//! Each stage only consumes the output file of its predecessor.

use std::path::{Path,PathBuf};
use chrono::NaiveDate;
use ndarray::{Array2, s};
use tracing::{debug, info};

use odin_common::datetime::yyyymmdd;
use odin_gdal::{
    GeoTransform, new_geotransform, srs_from_user_input,
    apps::{GdalWarp, GdalTranslate},
    raster::{BandStatistics, create_raster_from_array, read_raster_array}
};
use crate::{ReprojectConfig, errors::*};

/// the extracted variable of one timestep in its native projection. Coordinates are cell centers,
/// `values` has one row per y coordinate
#[derive(Debug,Clone)]
pub struct TimestepRecord {
    pub values: Array2<f64>,
    pub x_coords: Vec<f64>,
    pub y_coords: Vec<f64>,
    pub projection: String,
}

/// the reprojected grid of a timestep. `y_coords` are ascending and `values` rows are ordered accordingly
#[derive(Debug,Clone)]
pub struct RasterProduct {
    pub name: String,
    pub asc_path: PathBuf,
    pub x_coords: Vec<f64>,
    pub y_coords: Vec<f64>,
    pub values: Array2<f64>,
    pub geo_transform: GeoTransform,
}

/// product name for a NWM file name, e.g. `nwm.t05z.analysis_assim.forcing.tm00.conus.nc` -> `20240611.t05z.rain.tm00`
pub fn product_name (date: &NaiveDate, nwm_filename: &str)->Result<String> {
    let fields: Vec<&str> = nwm_filename.split('.').collect();
    if fields.len() < 7 || !fields[1].starts_with('t') || !fields[1].ends_with('z') {
        return Err( OdinNwmError::InvalidFileName( nwm_filename.to_string()))
    }
    Ok( format!("{}.{}.rain.{}", yyyymmdd(date), fields[1], fields[4]) )
}

/// the files the pipeline creates for a product
#[derive(Debug,Clone)]
pub struct PipelinePaths {
    pub source_tif: PathBuf,
    pub projected_tif: PathBuf,
    pub clipped_tif: PathBuf,
    pub asc: PathBuf,
}

impl PipelinePaths {
    pub fn new (dir: &Path, name: &str)->Self {
        PipelinePaths {
            source_tif: dir.join( format!("{name}.tif")),
            projected_tif: dir.join( format!("projected{name}.tif")),
            clipped_tif: dir.join( format!("clipped_{name}.tif")),
            asc: dir.join( format!("{name}.asc")),
        }
    }

    /// all files except the ASCII grid, including GDAL auxiliary (statistics) files
    pub fn intermediates (&self)->Vec<PathBuf> {
        let mut list = Vec::with_capacity(6);
        for p in [&self.source_tif, &self.projected_tif, &self.clipped_tif] {
            list.push( p.clone());
            let mut aux = p.clone().into_os_string();
            aux.push(".aux.xml");
            list.push( PathBuf::from(aux));
        }
        list
    }
}

/// stage 1: write `record` as GeoTIFF with statistics attached to its band
pub fn create_source_raster (record: &TimestepRecord, path: &Path, no_data: f64)->Result<Option<BandStatistics>> {
    let (rows, cols) = record.values.dim();
    if record.x_coords.len() != cols || record.y_coords.len() != rows {
        return Err( invalid_data( format!("coordinates do not match {rows}x{cols} array")))
    }
    if cols < 2 || rows < 2 {
        return Err( invalid_data( "need at least 2x2 grid to compute resolution"))
    }

    let x_res = record.x_coords[1] - record.x_coords[0];
    let y_res = record.y_coords[1] - record.y_coords[0];
    let ulx = record.x_coords[0] - x_res / 2.0;
    let uly = record.y_coords[0] - y_res / 2.0;

    let gt = new_geotransform( ulx, x_res, 0.0, uly, 0.0, y_res);
    let srs = srs_from_user_input( &record.projection)?;

    let stats = create_raster_from_array( path, &record.values, &gt, &srs, Some(no_data))?;
    debug!("created {path:?} with {stats:?}");
    Ok(stats)
}

/// stage 2: warp into the target projection and resolution
pub fn project_raster (src: &Path, dst: &Path, cfg: &ReprojectConfig)->Result<()> {
    let (x_res, y_res) = cfg.target_resolution;
    GdalWarp::new()
        .target_srs( &cfg.target_srs)
        .target_resolution( x_res, y_res)
        .exec( src, dst)?;
    Ok(())
}

/// stage 3: clip to `boundary` and convert the clipped raster into an ASCII grid
pub fn clip_to_ascii_grid (src: &Path, clipped: &Path, asc: &Path, boundary: &Path)->Result<()> {
    GdalWarp::new()
        .cutline( boundary, true)
        .exec( src, clipped)?;

    GdalTranslate::new()
        .creation_option( "force_cellsize", "true")
        .output_format( "AAIGrid")
        .exec( clipped, asc)?;
    Ok(())
}

/// stage 4: read the projected raster back. Returns cell center coordinates with ascending y
pub fn extract_projected_array (path: &Path)->Result<(Vec<f64>, Vec<f64>, Array2<f64>, GeoTransform)> {
    let (values, gt) = read_raster_array( path)?;
    let (rows, cols) = values.dim();

    let x_coords: Vec<f64> = (0..cols).map( |i| gt[0] + gt[1]/2.0 + i as f64 * gt[1]).collect();
    let mut y_coords: Vec<f64> = (0..rows).map( |j| gt[3] + gt[5]/2.0 + j as f64 * gt[5]).collect();

    let values = if gt[5] < 0.0 { // north-up: flip so that rows match ascending y
        y_coords.reverse();
        values.slice( s![..;-1, ..]).to_owned()
    } else {
        values
    };

    Ok( (x_coords, y_coords, values, gt) )
}

/// run all stages for `record`, creating files `<dir>/..<name>..`. Intermediate files are left in place
/// (see [`PipelinePaths::intermediates`])
pub fn reproject_timestep (record: &TimestepRecord, name: &str, dir: &Path, cfg: &ReprojectConfig, boundary: &Path)->Result<RasterProduct> {
    let paths = PipelinePaths::new( dir, name);
    info!("reprojecting {name} to {}", cfg.target_srs);

    create_source_raster( record, &paths.source_tif, cfg.no_data)?;
    project_raster( &paths.source_tif, &paths.projected_tif, cfg)?;
    clip_to_ascii_grid( &paths.projected_tif, &paths.clipped_tif, &paths.asc, boundary)?;
    let (x_coords, y_coords, values, geo_transform) = extract_projected_array( &paths.projected_tif)?;

    Ok( RasterProduct { name: name.to_string(), asc_path: paths.asc, x_coords, y_coords, values, geo_transform } )
}

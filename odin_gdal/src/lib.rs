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

pub mod errors;
pub mod apps;
pub mod raster;

use gdal::errors::CplErrType;
use lazy_static::lazy_static;
use static_init::{constructor};
use std::{collections::HashMap, ffi::{CStr, CString}, path::Path, ptr::{null, null_mut}, sync::Mutex};
use libc::{c_char, c_int};

// we re-export these so that other crates don't have to use a direct gdal dependency to import.
// this is to ensure we run bindgen for new GDAL versions that don't yet have pre-computed bindings in gdal-sys
pub use gdal::{self, Driver, DriverManager, Metadata, Dataset, errors::GdalError, GeoTransform, GeoTransformEx, cpl::CslStringList};
pub use gdal::raster::{GdalType,GdalDataType,RasterBand,Buffer};
pub use gdal::spatial_ref::SpatialRef;

use gdal_sys::{self, CPLErr};

use odin_common::fs::extension;
use crate::errors::{Result, misc_error, last_gdal_error, OdinGdalError};

pub use errors::OdinGdalError as Error;

lazy_static! {
    // note that we can't automatically populate this by iterating over DriverManager since some
    // drivers use the same file extension
    static ref EXT_MAP: HashMap<&'static str, &'static str> = HashMap::from( [ // file extension -> driver short name
        //-- raster drivers
        ("tif", "GTiff"),
        ("tiff", "GTiff"),
        ("asc", "AAIGrid"),
        ("nc", "netCDF"),
        ("grib2", "GRIB"),

        //--- vector drivers (cutlines)
        ("json", "GeoJSON"),
        ("geojson", "GeoJSON"),
        ("shp", "ESRI Shapefile"),
        ("kml", "KML"),
    ]);
}

/// use this to protect non-threadsafe GDAL operations
static GLOB_GDAL_MUTEX: Mutex<usize> = Mutex::new(0);

#[constructor(0)]
extern "C" fn _initialize_gdal() {
    gdal::config::set_error_handler(no_error_output);
}

fn no_error_output (cpl_et: CplErrType, ec: i32, msg: &str) {}

/// Note that filename extension has to be lower case
pub fn get_driver_name_from_filename (path: impl AsRef<Path>) -> Option<&'static str> {
    extension(&path.as_ref()).and_then( |ext| EXT_MAP.get( ext)).map(|v| &**v)
}

pub fn get_driver_from_filename (path: impl AsRef<Path>) -> Result<Driver> {
    let path = path.as_ref();
    let name = get_driver_name_from_filename(path).ok_or_else(|| misc_error(format!("no driver for {path:?}")))?;
    Ok( DriverManager::get_driver_by_name(name)? )
}

pub fn path_to_cstring (path: impl AsRef<Path>) -> Result<CString> {
    let path = path.as_ref();
    let s = path.to_str().ok_or_else(|| OdinGdalError::InvalidFileName(format!("{path:?}")))?;
    Ok( CString::new(s)? )
}

pub fn ok_mut_non_null <R,F> (ptr: *mut R, err: F) -> Result<*mut R>  where F: FnOnce()->String {
    if ptr != null_mut() { return Ok(ptr) }  else {  Err(OdinGdalError::MiscError(err())) }
}

pub fn ok_ce_none (res: CPLErr::Type) -> Result<()> {
    if res == CPLErr::CE_None { return Ok(()) } else { Err(last_gdal_error()) }
}

/// run the provided closure with the global GDAL error handler disabled. Note this does not
/// change the return value but prevents GDAL from printing errors and warnings to the console
pub fn run_quiet<T,F> (f: F)->Result<T> where F: Fn()->Result<T> {
    let lock = GLOB_GDAL_MUTEX.lock().map_err(|_| misc_error("poisoned GDAL lock"))?;
    unsafe { gdal_sys::CPLPushErrorHandler( Some(gdal_sys::CPLQuietErrorHandler)); }
    let result = f();
    unsafe { gdal_sys::CPLPopErrorHandler(); }
    result
}

/// open a variable of a NetCDF file as a raster dataset
pub fn nc_dataset( nc_path: impl AsRef<Path>, var_name: &str) -> Result<Dataset> {
    let path = nc_path.as_ref().to_str().ok_or_else(|| OdinGdalError::InvalidFileName(format!("{:?}", nc_path.as_ref())))?;
    let path = format!("NETCDF:\"{}\":{}", path, var_name);

    // NetCDF files with non-CF-1 conforming SRS cause console warnings even if the dataset is usable
    run_quiet( move || Ok( Dataset::open(&path)? ) )
}

pub fn new_geotransform (x_upper_left: f64, x_resolution: f64, row_rotation: f64,
                         y_upper_left: f64, col_rotation: f64, y_resolution: f64) -> GeoTransform {
    [x_upper_left,x_resolution,row_rotation,y_upper_left,col_rotation,y_resolution]
}

pub fn srs_from_user_input (spec: &str) -> Result<SpatialRef> {
    if spec.trim_start().starts_with("+proj") {
        Ok( SpatialRef::from_proj4(spec)? )
    } else {
        Ok( SpatialRef::from_definition(spec)? )
    }
}

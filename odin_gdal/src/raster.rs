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

//! single band Float64 rasters backed by ndarray

use std::path::Path;
use ndarray::Array2;
use gdal::{Dataset, GeoTransform, raster::{Buffer, RasterBand}, spatial_ref::SpatialRef};

use odin_common::MinMaxAvg;
use crate::{get_driver_from_filename, ok_ce_none, errors::{Result, misc_error}};

#[derive(Debug,Clone,Copy,PartialEq)]
pub struct BandStatistics {
    pub min: f64,
    pub max: f64,
    pub mean: f64,
    pub std_dev: f64,
}

/// compute statistics over all finite values that are not `no_data`. Returns `None` if there are no such values
pub fn compute_statistics<'a> (values: impl IntoIterator<Item=&'a f64>, no_data: Option<f64>) -> Option<BandStatistics> {
    let mut acc = MinMaxAvg::new();
    for v in values {
        if v.is_finite() && Some(*v) != no_data {
            acc.add(*v);
        }
    }

    if acc.is_empty() {
        None
    } else {
        Some( BandStatistics { min: acc.min, max: acc.max, mean: acc.avg, std_dev: acc.std_dev() } )
    }
}

/// attach statistics as band metadata (STATISTICS_MINIMUM etc.)
pub fn set_band_statistics (band: &RasterBand, stats: &BandStatistics) -> Result<()> {
    let res = unsafe {
        gdal_sys::GDALSetRasterStatistics( band.c_rasterband(), stats.min, stats.max, stats.mean, stats.std_dev)
    };
    ok_ce_none(res)
}

/// get the statistics stored with a band without computing them
pub fn get_band_statistics (band: &RasterBand) -> Option<BandStatistics> {
    let mut min = 0.0;
    let mut max = 0.0;
    let mut mean = 0.0;
    let mut std_dev = 0.0;

    let res = unsafe {
        gdal_sys::GDALGetRasterStatistics( band.c_rasterband(), 0, 0, &mut min, &mut max, &mut mean, &mut std_dev)
    };
    if res == gdal_sys::CPLErr::CE_None {
        Some( BandStatistics { min, max, mean, std_dev } )
    } else {
        None
    }
}

/// create a single band Float64 raster file (driver derived from the file extension) for the given
/// values (rows x cols, first row is the top row of the geotransform). Band statistics are computed and attached
pub fn create_raster_from_array (path: impl AsRef<Path>, values: &Array2<f64>, geo_transform: &GeoTransform,
                                 srs: &SpatialRef, no_data: Option<f64>) -> Result<Option<BandStatistics>> {
    let path = path.as_ref();
    let (rows, cols) = values.dim();
    if rows == 0 || cols == 0 { return Err( misc_error(format!("empty raster array for {path:?}"))) }

    let driver = get_driver_from_filename(path)?;
    let mut ds = driver.create_with_band_type::<f64,_>( path, cols, rows, 1)?;
    ds.set_geo_transform( geo_transform)?;
    ds.set_spatial_ref( srs)?;

    let data: Vec<f64> = values.iter().map(|v| if v.is_finite() { *v } else { no_data.unwrap_or(*v) }).collect();
    let stats = compute_statistics( data.iter(), no_data);

    let mut band = ds.rasterband(1)?;
    if let Some(nd) = no_data {
        band.set_no_data_value( Some(nd))?;
    }

    let mut buf = Buffer::new( (cols, rows), data);
    band.write( (0, 0), (cols, rows), &mut buf)?;

    // attach after writing since some drivers invalidate statistics on data updates
    if let Some(stats) = &stats {
        set_band_statistics( &band, stats)?;
    }

    Ok(stats)
}

/// read band `band_index` of `ds` as rows x cols array. Scale and offset of the band are applied,
/// `no_data` values are mapped to NaN
pub fn read_band_array (ds: &Dataset, band_index: usize) -> Result<Array2<f64>> {
    let band = ds.rasterband(band_index)?;
    let (cols, rows) = band.size();
    let scale = band.scale().unwrap_or(1.0);
    let offset = band.offset().unwrap_or(0.0);
    let no_data = band.no_data_value();

    let buf: Buffer<f64> = band.read_as::<f64>( (0, 0), (cols, rows), (cols, rows), None)?;
    let values: Vec<f64> = buf.data().iter().map( |v| {
        if Some(*v) == no_data { f64::NAN } else { v * scale + offset }
    }).collect();

    Array2::from_shape_vec( (rows, cols), values).map_err(|e| misc_error(e))
}

/// open raster file and read its first band together with its geotransform
pub fn read_raster_array (path: impl AsRef<Path>) -> Result<(Array2<f64>, GeoTransform)> {
    let ds = Dataset::open( path.as_ref())?;
    let gt = ds.geo_transform()?;
    let values = read_band_array( &ds, 1)?;
    Ok( (values, gt) )
}

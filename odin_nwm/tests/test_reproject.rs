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

use std::{fs, path::{Path,PathBuf}};
use chrono::NaiveDate;
use ndarray::Array2;

use odin_gdal::raster::compute_statistics;
use odin_nwm::{
    ReprojectConfig, TimestepRecord, product_name, reproject_timestep, OdinNwmError,
    reproject::PipelinePaths,
    ingest::{slot_file_name, is_slot_file}
};

// run with "cargo test test_xx -- --nocapture"

/// GeoJSON polygon that covers the test grid
pub fn write_boundary (dir: &Path)->PathBuf {
    let path = dir.join("boundary.geojson");
    fs::write( &path, r#"{
  "type": "FeatureCollection",
  "features": [
    { "type": "Feature", "properties": { "name": "test area" },
      "geometry": { "type": "Polygon", "coordinates": [[ [-77.0,36.6], [-76.5,36.6], [-76.5,37.0], [-77.0,37.0], [-77.0,36.6] ]] }
    }
  ]
}"#).unwrap();
    path
}

/// 4 rows x 5 cols north-up grid of 0.1 deg cells covering lon -77.0..-76.5, lat 36.6..37.0
pub fn test_record ()->TimestepRecord {
    TimestepRecord {
        values: Array2::from_shape_fn( (4,5), |(i,j)| (i*5 + j) as f64),
        x_coords: (0..5).map(|i| -76.95 + i as f64 * 0.1).collect(),
        y_coords: (0..4).map(|j| 36.95 - j as f64 * 0.1).collect(),
        projection: "EPSG:4326".to_string(),
    }
}

#[test]
fn test_product_name() {
    let date = NaiveDate::from_ymd_opt( 2024, 6, 11).unwrap();
    assert_eq!( product_name( &date, "nwm.t05z.analysis_assim.forcing.tm00.conus.nc").unwrap(), "20240611.t05z.rain.tm00");
    assert!( matches!( product_name( &date, "readme.txt"), Err(OdinNwmError::InvalidFileName(_))));
}

#[test]
fn test_slot_files() {
    let template = "nwm.t${HH}z.analysis_assim.forcing.tm00.conus.nc";
    assert_eq!( slot_file_name( template, 7), "nwm.t07z.analysis_assim.forcing.tm00.conus.nc");

    assert!( is_slot_file( "nwm.t07z.analysis_assim.forcing.tm00.conus.nc", 7));
    assert!( !is_slot_file( "nwm.t07z.analysis_assim.forcing.tm01.conus.nc", 7));
    assert!( !is_slot_file( "nwm.t17z.analysis_assim.forcing.tm00.conus.nc", 7));
    assert!( !is_slot_file( "index.html", 7));
}

#[test]
fn test_pipeline_paths() {
    let paths = PipelinePaths::new( Path::new("/data"), "20240611.t05z.rain.tm00");
    assert_eq!( paths.projected_tif, Path::new("/data/projected20240611.t05z.rain.tm00.tif"));
    assert_eq!( paths.clipped_tif, Path::new("/data/clipped_20240611.t05z.rain.tm00.tif"));
    assert_eq!( paths.asc, Path::new("/data/20240611.t05z.rain.tm00.asc"));

    let intermediates = paths.intermediates();
    assert_eq!( intermediates.len(), 6);
    assert!( intermediates.contains( &PathBuf::from("/data/20240611.t05z.rain.tm00.tif.aux.xml")));
    assert!( !intermediates.contains( &paths.asc));
}

#[test]
fn test_reproject_timestep() {
    let dir = tempfile::tempdir().unwrap();
    let boundary = write_boundary( dir.path());
    let cfg = ReprojectConfig {
        source_srs: "EPSG:4326".to_string(),
        target_srs: "EPSG:4326".to_string(),
        target_resolution: (0.1, 0.1),
        no_data: -9999.0,
    };

    let product = reproject_timestep( &test_record(), "20240611.t05z.rain.tm00", dir.path(), &cfg, &boundary).unwrap();
    println!("x: {:?}", product.x_coords);
    println!("y: {:?}", product.y_coords);
    println!("{:?}", product.values);

    assert!( product.asc_path.is_file());
    let paths = PipelinePaths::new( dir.path(), "20240611.t05z.rain.tm00");
    assert!( paths.source_tif.is_file());
    assert!( paths.projected_tif.is_file());
    assert!( paths.clipped_tif.is_file());

    let stats = compute_statistics( product.values.iter(), None).unwrap();
    assert_eq!( (stats.min, stats.max), (0.0, 19.0));

    assert_eq!( product.values.dim(), (product.y_coords.len(), product.x_coords.len()));
    assert!( product.y_coords.windows(2).all(|w| w[0] < w[1]));
    assert!( product.x_coords.windows(2).all(|w| w[0] < w[1]));

    // after flipping rows go from south to north, i.e. the largest value (south-east corner) comes first
    let row_of = |v: f64| product.values.indexed_iter().find(|(_,x)| **x == v).map(|((r,_),_)| r).unwrap();
    assert!( row_of(19.0) < row_of(0.0));
}

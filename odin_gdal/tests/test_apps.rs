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

use ndarray::Array2;
use odin_gdal::{
    Dataset, new_geotransform, srs_from_user_input,
    apps::{GdalWarp, GdalTranslate},
    raster::{compute_statistics, create_raster_from_array, get_band_statistics, read_raster_array}
};

// run with "cargo test test_xx -- --nocapture"

fn test_array ()->Array2<f64> {
    Array2::from_shape_fn( (4,5), |(i,j)| (i*5 + j) as f64)
}

#[test]
fn test_compute_statistics() {
    let values = [1.0, f64::NAN, 3.0, -9999.0];
    let stats = compute_statistics( values.iter(), Some(-9999.0)).unwrap();
    assert_eq!( stats.min, 1.0);
    assert_eq!( stats.max, 3.0);
    assert_eq!( stats.mean, 2.0);
    assert_eq!( stats.std_dev, 1.0);

    assert!( compute_statistics( [f64::NAN].iter(), None).is_none());
}

#[test]
fn test_create_raster_with_statistics() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("src.tif");
    let srs = srs_from_user_input("EPSG:4326").unwrap();
    let gt = new_geotransform( -77.0, 0.1, 0.0, 37.0, 0.0, -0.1);

    let stats = create_raster_from_array( &path, &test_array(), &gt, &srs, Some(-9999.0)).unwrap().unwrap();
    assert_eq!( (stats.min, stats.max), (0.0, 19.0));

    let ds = Dataset::open(&path).unwrap();
    assert_eq!( ds.raster_size(), (5, 4));

    let band = ds.rasterband(1).unwrap();
    let stored = get_band_statistics( &band).expect("no statistics stored with band");
    assert_eq!( stored.min, 0.0);
    assert_eq!( stored.max, 19.0);
}

#[test]
fn test_warp_and_translate() {
    let dir = tempfile::tempdir().unwrap();
    let src = dir.path().join("src.tif");
    let warped = dir.path().join("warped.tif");
    let asc = dir.path().join("warped.asc");

    let srs = srs_from_user_input("EPSG:4326").unwrap();
    let gt = new_geotransform( -77.0, 0.1, 0.0, 37.0, 0.0, -0.1);
    create_raster_from_array( &src, &test_array(), &gt, &srs, Some(-9999.0)).unwrap();

    GdalWarp::new()
        .target_srs("EPSG:4326")
        .target_resolution( 0.1, 0.1)
        .exec( &src, &warped).unwrap();

    let (values, wgt) = read_raster_array( &warped).unwrap();
    println!("warped geotransform: {wgt:?}");
    let stats = compute_statistics( values.iter(), None).unwrap();
    assert_eq!( (stats.min, stats.max), (0.0, 19.0));

    GdalTranslate::new()
        .output_format("AAIGrid")
        .creation_option("force_cellsize", "true")
        .exec( &warped, &asc).unwrap();

    assert!( asc.is_file());
    let (asc_values, _) = read_raster_array( &asc).unwrap();
    assert_eq!( asc_values.dim(), values.dim());
}

#[test]
fn test_invalid_warp_args() {
    let dir = tempfile::tempdir().unwrap();
    let src = dir.path().join("src.tif");
    let srs = srs_from_user_input("EPSG:4326").unwrap();
    let gt = new_geotransform( -77.0, 0.1, 0.0, 37.0, 0.0, -0.1);
    create_raster_from_array( &src, &test_array(), &gt, &srs, None).unwrap();

    let res = GdalWarp::new().arg("-no_such_option").exec( &src, dir.path().join("out.tif"));
    assert!( res.is_err());
}

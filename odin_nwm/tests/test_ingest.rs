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

use std::{fs::{self,File}, path::{Path,PathBuf}};
use async_trait::async_trait;
use chrono::NaiveDate;
use ndarray::Array2;
use zip::ZipArchive;

use odin_common::datetime::{millis, secs};
use odin_gdal::{new_geotransform, srs_from_user_input, apps::GdalTranslate, raster::{compute_statistics, create_raster_from_array}};
use odin_nwm::{
    NwmConfig, DataFolderConfig, ReprojectConfig, LocalDirectory, RemoteDirectory,
    read_timestep, ingest_hour, ingest_date, archive_and_remove, op_failed
};

// run with "cargo test test_xx -- --nocapture"

const NC_FILE: &str = "nwm.t05z.analysis_assim.forcing.tm00.conus.nc";

fn write_boundary (dir: &Path)->PathBuf {
    let path = dir.join("boundary.geojson");
    fs::write( &path, r#"{
  "type": "FeatureCollection",
  "features": [
    { "type": "Feature", "properties": {},
      "geometry": { "type": "Polygon", "coordinates": [[ [-77.0,36.6], [-76.5,36.6], [-76.5,37.0], [-77.0,37.0], [-77.0,36.6] ]] }
    }
  ]
}"#).unwrap();
    path
}

/// a NetCDF file with a single 'Band1' variable of rain rates on a 4x5 lon/lat grid
fn write_nc_file (dir: &Path)->PathBuf {
    let tif = dir.join("rate.tif");
    let nc = dir.join( NC_FILE);
    let values = Array2::from_shape_fn( (4,5), |(i,j)| (i*5 + j) as f64 / 3600.0);
    let srs = srs_from_user_input("EPSG:4326").unwrap();
    let gt = new_geotransform( -77.0, 0.1, 0.0, 37.0, 0.0, -0.1);
    create_raster_from_array( &tif, &values, &gt, &srs, Some(-9999.0)).unwrap();

    GdalTranslate::new().output_format("netCDF").exec( &tif, &nc).unwrap();
    fs::remove_file( &tif).unwrap();
    let _ = fs::remove_file( dir.join("rate.tif.aux.xml"));
    nc
}

fn test_config (output_root: &Path, boundary: PathBuf, await_publication: bool)->NwmConfig {
    NwmConfig {
        data_folders: vec![ DataFolderConfig { variable: "Band1".to_string(), await_publication, ..DataFolderConfig::default() } ],
        poll_interval: millis(1),
        max_wait: secs(1),
        output_root: output_root.to_path_buf(),
        boundary_path: boundary,
        reproject: ReprojectConfig {
            source_srs: "EPSG:4326".to_string(),
            target_srs: "EPSG:4326".to_string(),
            target_resolution: (0.1, 0.1),
            no_data: -9999.0,
        },
        ..NwmConfig::default()
    }
}

fn date ()->NaiveDate { NaiveDate::from_ymd_opt( 2024, 6, 11).unwrap() }

#[test]
fn test_read_timestep() {
    let src = tempfile::tempdir().unwrap();
    let nc = write_nc_file( src.path());

    let record = read_timestep( &nc, "Band1", 3600.0, "EPSG:4326").unwrap();
    println!("x: {:?}\ny: {:?}", record.x_coords, record.y_coords);

    assert_eq!( record.values.dim(), (4,5));
    assert_eq!( record.x_coords.len(), 5);
    assert!( (record.x_coords[0] - -76.95).abs() < 1e-6);
    assert!( (record.y_coords[0] - 36.95).abs() < 1e-6); // north-up

    let stats = compute_statistics( record.values.iter(), None).unwrap();
    assert!( (stats.max - 19.0).abs() < 1e-9);
    assert!( stats.min.abs() < 1e-9);
}

#[tokio::test]
async fn test_ingest_hour() {
    let src = tempfile::tempdir().unwrap();
    let out = tempfile::tempdir().unwrap();
    write_nc_file( src.path());

    let cfg = test_config( out.path(), write_boundary( out.path()), true);
    let folder = &cfg.data_folders[0];
    let dest_dir = cfg.folder_dir( &date(), folder);
    fs::create_dir_all( &dest_dir).unwrap();
    let dir = LocalDirectory::new( src.path());

    let products = ingest_hour( &dir, &cfg, folder, &date(), 5, &dest_dir).await.unwrap();
    assert_eq!( products.len(), 1);
    let product = &products[0];
    assert_eq!( product.name, "20240611.t05z.rain.tm00");
    assert!( product.asc_path.is_file());

    let stats = compute_statistics( product.values.iter(), None).unwrap();
    assert!( (stats.max - 19.0).abs() < 1e-9);

    // download and intermediates are removed
    assert!( !dest_dir.join( NC_FILE).exists());
    assert!( !dest_dir.join("20240611.t05z.rain.tm00.tif").exists());
    assert!( !dest_dir.join("projected20240611.t05z.rain.tm00.tif").exists());
    assert!( !dest_dir.join("clipped_20240611.t05z.rain.tm00.tif").exists());

    // source file is still there
    assert!( src.path().join( NC_FILE).is_file());
}

#[tokio::test]
async fn test_skip_unpublished_hour() {
    let src = tempfile::tempdir().unwrap();
    let out = tempfile::tempdir().unwrap();
    write_nc_file( src.path());

    let cfg = test_config( out.path(), write_boundary( out.path()), false);
    let folder = &cfg.data_folders[0];
    let dest_dir = cfg.folder_dir( &date(), folder);
    fs::create_dir_all( &dest_dir).unwrap();
    let dir = LocalDirectory::new( src.path());

    let products = ingest_hour( &dir, &cfg, folder, &date(), 6, &dest_dir).await.unwrap();
    assert!( products.is_empty());
}

#[tokio::test]
async fn test_ingest_date_and_archive() {
    let src = tempfile::tempdir().unwrap();
    let out = tempfile::tempdir().unwrap();
    write_nc_file( src.path());

    let boundary_dir = tempfile::tempdir().unwrap();
    let cfg = test_config( out.path(), write_boundary( boundary_dir.path()), false);
    let src_path = src.path().to_path_buf();

    let ingest = ingest_date( &cfg, &date(), |_| {
        Ok( Box::new( LocalDirectory::new( &src_path)) as Box<dyn RemoteDirectory>)
    }).await.unwrap();
    assert!( ingest.report.is_complete());
    assert_eq!( ingest.report.asc_files.len(), 1);
    let date_dir = ingest.date_dir;
    assert_eq!( date_dir, out.path().join("20240611"));

    let zip_path = cfg.archive_path( &date());
    let n_files = archive_and_remove( &date_dir, &zip_path).unwrap();
    assert!( n_files >= 1);
    assert!( !date_dir.exists());

    let archive = ZipArchive::new( File::open( &zip_path).unwrap()).unwrap();
    let names: Vec<&str> = archive.file_names().collect();
    println!("{names:#?}");
    assert!( names.contains( &"forcing_analysis_assim/realtime_rainfall/20240611.t05z.rain.tm00.asc"));
}

/// a local directory that fails to deliver the file of one hour slot
struct BrokenSlotDirectory {
    dir: LocalDirectory,
    broken: String,
}

#[async_trait]
impl RemoteDirectory for BrokenSlotDirectory {
    fn location (&self)->String { self.dir.location() }

    async fn list_files (&self)->odin_nwm::Result<Vec<String>> { self.dir.list_files().await }

    async fn fetch_file (&self, name: &str, dest: &Path)->odin_nwm::Result<u64> {
        if name == self.broken {
            Err( op_failed( format!("connection reset while downloading {name}")))
        } else {
            self.dir.fetch_file( name, dest).await
        }
    }
}

#[tokio::test]
async fn test_failed_slots_do_not_stop_date() {
    let src = tempfile::tempdir().unwrap();
    let out = tempfile::tempdir().unwrap();
    let boundary_dir = tempfile::tempdir().unwrap();

    // all hours except 06 get published, downloading 09 fails
    let nc = write_nc_file( src.path());
    for hour in (0..24).filter( |h| *h != 5 && *h != 6) {
        fs::copy( &nc, src.path().join( format!("nwm.t{hour:02}z.analysis_assim.forcing.tm00.conus.nc"))).unwrap();
    }

    let mut cfg = test_config( out.path(), write_boundary( boundary_dir.path()), true);
    cfg.max_wait = millis(50);
    let src_path = src.path().to_path_buf();

    let ingest = ingest_date( &cfg, &date(), |_| {
        let dir = LocalDirectory::new( &src_path);
        let broken = "nwm.t09z.analysis_assim.forcing.tm00.conus.nc".to_string();
        Ok( Box::new( BrokenSlotDirectory { dir, broken }) as Box<dyn RemoteDirectory>)
    }).await.unwrap();

    let report = &ingest.report;
    for f in &report.failed { println!("{f}"); }
    assert!( !report.is_complete());
    let failed_hours: Vec<Option<u32>> = report.failed.iter().map( |f| f.hour).collect();
    assert_eq!( failed_hours, vec![Some(6), Some(9)]);
    assert_eq!( report.asc_files.len(), 22);

    let product_dir = cfg.folder_dir( &date(), &cfg.data_folders[0]);
    assert!( product_dir.join("20240611.t05z.rain.tm00.asc").is_file());
    assert!( product_dir.join("20240611.t07z.rain.tm00.asc").is_file());
    assert!( product_dir.join("20240611.t23z.rain.tm00.asc").is_file());
    assert!( !product_dir.join("20240611.t09z.rain.tm00.asc").exists());

    // what we got can still be archived
    let n_files = archive_and_remove( &ingest.date_dir, &cfg.archive_path( &date())).unwrap();
    assert!( n_files >= 22); // .asc plus projection sidecars
}

#[tokio::test]
async fn test_unavailable_folder_is_recorded() {
    let out = tempfile::tempdir().unwrap();
    let boundary_dir = tempfile::tempdir().unwrap();
    let cfg = test_config( out.path(), write_boundary( boundary_dir.path()), true);

    let ingest = ingest_date( &cfg, &date(), |folder| {
        Err( op_failed( format!("no directory for {}", folder.name)))
    }).await.unwrap();

    assert_eq!( ingest.report.failed.len(), 1);
    assert_eq!( ingest.report.failed[0].folder, "forcing_analysis_assim");
    assert!( ingest.report.failed[0].hour.is_none());
    assert!( ingest.date_dir.is_dir());
}

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

//! in-process versions of the `gdalwarp` and `gdal_translate` command line tools.
//!
//! Since the GDALWarpAppOptions and GDALTranslateOptions structs are opaque (C++ classes) we have to
//! collect the arguments as strings and let GDALWarpAppOptionsNew() / GDALTranslateOptionsNew() parse them,
//! i.e. the supported options are exactly the ones of the respective command line tools.

use std::{fmt::Display, fs, path::{Path,PathBuf}, ptr::null_mut};
use libc::{c_char, c_int};
use gdal::{Dataset, cpl::CslStringList};
use gdal_sys::{GDALDatasetH, GDALWarpAppOptions, GDALTranslateOptions};
use tracing::debug;

use crate::{path_to_cstring, ok_mut_non_null, errors::{Result, OdinGdalError, last_gdal_error, reset_last_gdal_error}};

fn csl_args (args: &[String]) -> Result<CslStringList> {
    let mut list = CslStringList::new();
    for a in args {
        list.add_string(a.as_str())?;
    }
    Ok(list)
}

/* #region warp ****************************************************************************************/

struct WarpAppOptions(*mut GDALWarpAppOptions);

impl WarpAppOptions {
    fn new (args: &[String]) -> Result<Self> {
        let argv = csl_args(args)?;
        let opts = unsafe { gdal_sys::GDALWarpAppOptionsNew( argv.as_ptr() as *mut *mut c_char, null_mut()) };
        let opts = ok_mut_non_null( opts, || format!("invalid warp options {args:?}"))?;
        Ok( WarpAppOptions(opts) )
    }
}

impl Drop for WarpAppOptions {
    fn drop (&mut self) {
        unsafe { gdal_sys::GDALWarpAppOptionsFree( self.0) }
    }
}

/// builder for a `gdalwarp` run with a single source dataset
#[derive(Debug,Clone,Default)]
pub struct GdalWarp {
    args: Vec<String>,
}

impl GdalWarp {
    pub fn new ()->Self { GdalWarp { args: Vec::new() } }

    /// add a raw gdalwarp argument
    pub fn arg (&mut self, a: impl Display)->&mut Self {
        self.args.push( a.to_string());
        self
    }

    /// `-t_srs <srs_def>` (WKT, PROJ.4 or EPSG:n)
    pub fn target_srs (&mut self, srs: &str)->&mut Self {
        self.arg("-t_srs").arg(srs)
    }

    /// `-tr <xres> <yres>` target resolution in target SRS units
    pub fn target_resolution (&mut self, x_res: f64, y_res: f64)->&mut Self {
        self.arg("-tr").arg(x_res).arg(y_res)
    }

    /// `-cutline <path> [-crop_to_cutline]`
    pub fn cutline (&mut self, path: impl AsRef<Path>, crop_to_cutline: bool)->&mut Self {
        let path = path.as_ref().to_string_lossy().to_string();
        self.arg("-cutline").arg(path);
        if crop_to_cutline { self.arg("-crop_to_cutline"); }
        self
    }

    /// `-of <driver>`
    pub fn output_format (&mut self, driver_name: &str)->&mut Self {
        self.arg("-of").arg(driver_name)
    }

    pub fn args (&self)->&[String] { &self.args }

    /// warp `src` into `dst`. Existing `dst` files are replaced
    pub fn exec (&self, src: impl AsRef<Path>, dst: impl AsRef<Path>)->Result<()> {
        let src = src.as_ref();
        let dst = dst.as_ref();
        debug!("gdalwarp {} {:?} {:?}", self.args.join(" "), src, dst);

        let src_ds = Dataset::open(src)?;
        if dst.is_file() { fs::remove_file(dst)? }

        let c_dst = path_to_cstring(dst)?;
        let opts = WarpAppOptions::new( &self.args)?;
        let mut h_src: GDALDatasetH = unsafe { src_ds.c_dataset() };
        let mut usage_error: c_int = 0;

        reset_last_gdal_error();
        let h_dst = unsafe { gdal_sys::GDALWarp( c_dst.as_ptr(), null_mut(), 1, &mut h_src, opts.0, &mut usage_error) };

        if h_dst.is_null() {
            if usage_error != 0 {
                Err( OdinGdalError::UsageError("GDALWarp", self.args.join(" ")))
            } else {
                Err( last_gdal_error())
            }
        } else {
            unsafe { gdal_sys::GDALClose(h_dst); } // flushes and closes the output file
            Ok(())
        }
    }
}

/* #endregion warp */

/* #region translate ***********************************************************************************/

struct TranslateOptions(*mut GDALTranslateOptions);

impl TranslateOptions {
    fn new (args: &[String]) -> Result<Self> {
        let argv = csl_args(args)?;
        let opts = unsafe { gdal_sys::GDALTranslateOptionsNew( argv.as_ptr() as *mut *mut c_char, null_mut()) };
        let opts = ok_mut_non_null( opts, || format!("invalid translate options {args:?}"))?;
        Ok( TranslateOptions(opts) )
    }
}

impl Drop for TranslateOptions {
    fn drop (&mut self) {
        unsafe { gdal_sys::GDALTranslateOptionsFree( self.0) }
    }
}

/// builder for a `gdal_translate` run
#[derive(Debug,Clone,Default)]
pub struct GdalTranslate {
    args: Vec<String>,
}

impl GdalTranslate {
    pub fn new ()->Self { GdalTranslate { args: Vec::new() } }

    pub fn arg (&mut self, a: impl Display)->&mut Self {
        self.args.push( a.to_string());
        self
    }

    /// `-of <driver>`
    pub fn output_format (&mut self, driver_name: &str)->&mut Self {
        self.arg("-of").arg(driver_name)
    }

    /// `-co <name>=<value>` driver specific creation option
    pub fn creation_option (&mut self, name: &str, value: &str)->&mut Self {
        self.arg("-co").arg( format!("{name}={value}"))
    }

    pub fn args (&self)->&[String] { &self.args }

    pub fn exec (&self, src: impl AsRef<Path>, dst: impl AsRef<Path>)->Result<()> {
        let src = src.as_ref();
        let dst = dst.as_ref();
        debug!("gdal_translate {} {:?} {:?}", self.args.join(" "), src, dst);

        let src_ds = Dataset::open(src)?;
        if dst.is_file() { fs::remove_file(dst)? }

        let c_dst = path_to_cstring(dst)?;
        let opts = TranslateOptions::new( &self.args)?;
        let mut usage_error: c_int = 0;

        reset_last_gdal_error();
        let h_dst = unsafe { gdal_sys::GDALTranslate( c_dst.as_ptr(), src_ds.c_dataset(), opts.0, &mut usage_error) };

        if h_dst.is_null() {
            if usage_error != 0 {
                Err( OdinGdalError::UsageError("GDALTranslate", self.args.join(" ")))
            } else {
                Err( last_gdal_error())
            }
        } else {
            unsafe { gdal_sys::GDALClose(h_dst); }
            Ok(())
        }
    }
}

/* #endregion translate */

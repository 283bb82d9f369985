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

use std::{fs::{self,File}, io, path::{Path,PathBuf}};
use tracing::info;
use zip::{ZipWriter, CompressionMethod, write::SimpleFileOptions};

use odin_common::fs::visit_dirs;
use crate::errors::*;

/// zip the contents of `dir` (recursively, deflated) into `zip_path`. Entry names are relative to `dir`
/// and use '/' separators. Returns the number of archived files
pub fn zip_dir (dir: &Path, zip_path: &Path)->Result<usize> {
    if !dir.is_dir() { return Err( op_failed( format!("not a directory {dir:?}"))) }

    let mut entries: Vec<PathBuf> = Vec::new();
    visit_dirs( dir, true, &mut |e| entries.push( e.path()))?;
    entries.sort();

    let options = SimpleFileOptions::default().compression_method( CompressionMethod::Deflated);
    let mut zip = ZipWriter::new( File::create( zip_path)?);
    let mut n_files = 0;

    for path in &entries {
        let rel = path.strip_prefix(dir).map_err(|e| op_failed(e))?;
        let name = rel.components().map( |c| c.as_os_str().to_string_lossy()).collect::<Vec<_>>().join("/");

        if path.is_dir() {
            zip.add_directory( format!("{name}/"), options)?;
        } else {
            zip.start_file( name, options)?;
            let mut file = File::open(path)?;
            io::copy( &mut file, &mut zip)?;
            n_files += 1;
        }
    }

    zip.finish()?;
    Ok(n_files)
}

/// zip `dir` into `zip_path` and remove `dir` once the archive is complete
pub fn archive_and_remove (dir: &Path, zip_path: &Path)->Result<usize> {
    let n_files = zip_dir( dir, zip_path)?;
    fs::remove_dir_all( dir)?;
    info!("archived {n_files} files of {dir:?} in {zip_path:?}");
    Ok(n_files)
}

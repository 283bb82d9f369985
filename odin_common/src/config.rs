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

//! RON based configuration files.
//!
//! Crates add a `load_config(filename)` function with the [`define_load_config`] macro. Config files are
//! looked up in this order:
//!   1. `filename` as a (relative or absolute) path
//!   2. `$ODIN_ROOT/configs/<crate>/<filename>`
//!   3. `<crate-dir>/configs/<filename>` (the defaults that come with the source repo)

use std::{env, fs, path::{Path,PathBuf}};
use serde::{Deserialize,Serialize};
use ron::ser::PrettyConfig;

use crate::define_error;

define_error!{ pub OdinConfigError =
    IOError(#[from] std::io::Error) : "config IO error {0}",
    RonError(#[from] ron::Error) : "config RON error {0}",
    RonSerdeError(#[from] ron::error::SpannedError) : "config serialize/deserialize RON error {0}",
    ResourceNotFoundError(String) : "config not found {0}"
}

pub type Result<T> = std::result::Result<T, OdinConfigError>;

pub fn find_config_file (resource_crate: &str, crate_dir: &str, filename: &str) -> Option<PathBuf> {
    let path = Path::new(filename);
    if path.is_file() { return Some(path.to_path_buf()) }

    if let Ok(odin_root) = env::var("ODIN_ROOT") {
        let path = Path::new(odin_root.as_str()).join("configs").join(resource_crate).join(filename);
        if path.is_file() { return Some(path) }
    }

    let path = Path::new(crate_dir).join("configs").join(filename);
    if path.is_file() { return Some(path) }

    None
}

pub fn load_config_path<C,P> (path: P) -> Result<C> where C: for <'a> Deserialize<'a>, P: AsRef<Path> {
    let data = fs::read(path.as_ref())?;
    Ok( ron::de::from_bytes( data.as_slice())? )
}

/// pretty printed RON, e.g. to generate a config file from the `Default` values
pub fn to_ron_string<C> (config: &C) -> Result<String> where C: Serialize {
    Ok( ron::ser::to_string_pretty( config, PrettyConfig::default())? )
}

/// define a crate level `load_config(filename)` function that uses the crate name and dir for lookup
#[macro_export]
macro_rules! define_load_config {
    () => {
        /// load config using the ODIN_ROOT / crate dir lookup mechanism
        pub fn load_config<C> (filename: &str) -> odin_common::config::Result<C> where C: for <'a> serde::Deserialize<'a> {
            let resource_crate = env!("CARGO_PKG_NAME");
            let crate_dir = env!("CARGO_MANIFEST_DIR");

            if let Some(path) = odin_common::config::find_config_file( resource_crate, crate_dir, filename) {
                odin_common::config::load_config_path( &path)
            } else {
                Err( odin_common::config::OdinConfigError::ResourceNotFoundError( filename.to_string()) )
            }
        }
    }
}
pub use define_load_config;

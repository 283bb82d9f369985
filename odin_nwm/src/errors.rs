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

use thiserror::Error;

pub type Result<T> = std::result::Result<T, OdinNwmError>;

#[derive(Error,Debug)]
pub enum OdinNwmError {
    #[error("IO error {0}")]
    IOError( #[from] std::io::Error),

    #[error("config error {0}")]
    ConfigError( #[from] odin_common::config::OdinConfigError),

    #[error("http error {0}")]
    HttpError( #[from] reqwest::Error),

    #[error("net error {0}")]
    NetError( #[from] odin_common::net::OdinNetError),

    #[error("gdal error {0}")]
    GdalError( #[from] odin_gdal::Error),

    #[error("zip error {0}")]
    ZipError( #[from] zip::result::ZipError),

    /// the expected file did not show up in the remote directory in time
    #[error("publication timeout {0}")]
    PublicationTimeout(String),

    #[error("invalid file name {0}")]
    InvalidFileName(String),

    #[error("invalid data {0}")]
    InvalidData(String),

    /// a generic error
    #[error("operation failed {0}")]
    OpFailed(String)
}

pub fn op_failed (msg: impl ToString)->OdinNwmError {
    OdinNwmError::OpFailed(msg.to_string())
}

pub fn invalid_data (msg: impl ToString)->OdinNwmError {
    OdinNwmError::InvalidData(msg.to_string())
}

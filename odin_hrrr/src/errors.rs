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
use reqwest;

pub type Result<T> = std::result::Result<T, OdinHrrrError>;

#[derive(Error,Debug)]
pub enum OdinHrrrError {
    #[error("IO error {0}")]
    IOError( #[from] std::io::Error),

    #[error("config error {0}")]
    ConfigError( #[from] odin_common::config::OdinConfigError),

    #[error("http error {0}")]
    HttpError( #[from] reqwest::Error),

    #[error("net error {0}")]
    NetError( #[from] odin_common::net::OdinNetError),

    /// the data server answered but could not deliver the requested data (might succeed later)
    #[error("server error {0}")]
    ServerError(String),

    #[error("parse error {0}")]
    ParseError(String),

    #[error("no variable {0}")]
    NoSuchVariable(String),

    /// window indices outside of the dataset grid or empty window
    #[error("invalid window {0}")]
    InvalidWindow(String),

    /// all retries / fallbacks exhausted
    #[error("source unavailable {0}")]
    SourceUnavailable(String),

    #[error("dispatch error {0}")]
    DispatchError(String),

    /// a generic error
    #[error("operation failed {0}")]
    OpFailed(String)
}

impl OdinHrrrError {
    /// errors that are worth retrying the same request for
    pub fn is_transient (&self)->bool {
        matches!( self, OdinHrrrError::ServerError(_) | OdinHrrrError::HttpError(_) | OdinHrrrError::NetError(_))
    }
}

pub fn op_failed (msg: impl ToString)->OdinHrrrError {
    OdinHrrrError::OpFailed(msg.to_string())
}

pub fn server_error (msg: impl ToString)->OdinHrrrError {
    OdinHrrrError::ServerError(msg.to_string())
}

pub fn parse_error (msg: impl ToString)->OdinHrrrError {
    OdinHrrrError::ParseError(msg.to_string())
}

pub fn invalid_window (msg: impl ToString)->OdinHrrrError {
    OdinHrrrError::InvalidWindow(msg.to_string())
}

pub fn source_unavailable (msg: impl ToString)->OdinHrrrError {
    OdinHrrrError::SourceUnavailable(msg.to_string())
}

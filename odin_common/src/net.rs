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

///! common utility functions for network operations

use std::{io::Write, path::{Path,PathBuf}};
use reqwest::{Client, StatusCode};
use tempfile::NamedTempFile;

use crate::define_error;

define_error!{ pub OdinNetError =
    IOError(#[from] std::io::Error) : "IO error: {0}",
    NotFoundError(String) : "not found {0}",
    HttpError(#[from] reqwest::Error) : "http error: {0}",
    OpFailed(String) : "operation failed: {0}"
}

pub type Result<T> = std::result::Result<T, OdinNetError>;

/// GET the text contents of `url`, mapping non-OK response status codes into errors
pub async fn get_text (client: &Client, url: &str) -> Result<String> {
    let response = client.get(url).send().await?;

    match response.status() {
        StatusCode::OK => Ok( response.text().await? ),
        StatusCode::NOT_FOUND => Err( OdinNetError::NotFoundError(format!("{url}"))),
        other => Err( OdinNetError::OpFailed(format!("response status {other:?}")))
    }
}

/// retrieve `url` in chunks and store it in `path`. Data is written to a temp file within the target dir
/// that is only renamed to `path` once the download is complete, i.e. there are never partial files at `path`
pub async fn download_url (client: &Client, url: &str, path: impl AsRef<Path>) -> Result<u64> {
    let path = path.as_ref();
    let dir = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
        _ => PathBuf::from(".")
    };

    let mut response = client.get(url).send().await?;

    match response.status() {
        StatusCode::OK => {
            let mut file = NamedTempFile::new_in(&dir)?;
            let mut len: u64 = 0;

            while let Some(chunk) = response.chunk().await? {
                len += chunk.len() as u64;
                file.write_all(&chunk)?;
            }
            file.flush()?;

            if len > 0 {
                file.persist(path).map_err(|e| e.error)?;
                Ok(len)
            } else {
                Err( OdinNetError::OpFailed(format!("empty file {url}")))
            }
        }
        StatusCode::NOT_FOUND => {
            Err( OdinNetError::NotFoundError(format!("{url}")))
        }
        other => {
            Err( OdinNetError::OpFailed(format!("response status {other:?}")))
        }
    }
}

/// join base URL and relative path with exactly one '/' in between
pub fn join_url (base: &str, rel: &str) -> String {
    format!("{}/{}", base.trim_end_matches('/'), rel.trim_start_matches('/'))
}

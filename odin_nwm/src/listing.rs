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

//! access to the directories the NWM products are published in

use std::{fs, io, path::{Path,PathBuf}, time::Duration};
use async_trait::async_trait;
use chrono::NaiveDate;
use lazy_static::lazy_static;
use regex::Regex;
use reqwest::Client;
use tempfile::NamedTempFile;
use tokio::time::Instant;
use tracing::{debug, info, warn};

use odin_common::{datetime::yyyymmdd, net::{download_url, get_text, join_url}};
use crate::errors::*;

#[async_trait]
pub trait RemoteDirectory: Send + Sync {
    /// where the directory lives (for log messages)
    fn location (&self)->String;

    /// names of the files currently in this directory
    async fn list_files (&self)->Result<Vec<String>>;

    /// copy file `name` to `dest`. The file only shows up at `dest` once it is complete
    async fn fetch_file (&self, name: &str, dest: &Path)->Result<u64>;
}

/* #region HTTP directory listings ***********************************************************************/

lazy_static! {
    // current line format (as of 06/2024):
    // <a href="nwm.t00z.analysis_assim.forcing.tm00.conus.nc">nwm.t00z.analysis_assim.forcing.tm00.conus.nc</a>  11-Jun-2024 01:04  28M
    static ref HREF_RE: Regex = Regex::new( r#"(?i)href\s*=\s*"([^"]+)""#).unwrap();
}

/// file names of an HTML directory index. Sub-directories, parent links and sort links are skipped
pub fn parse_listing (html: &str)->Vec<String> {
    let mut names: Vec<String> = Vec::new();

    for cap in HREF_RE.captures_iter(html) {
        let href = &cap[1];
        if href.ends_with('/') || href.starts_with('?') || href.starts_with('/') || href.contains("://") {
            continue
        }
        let name = href.trim_start_matches("./");
        if !name.is_empty() && !names.iter().any(|n| n == name) {
            names.push( name.to_string());
        }
    }
    names
}

/// expand `${yyyyMMdd}` and `${folder}` in a directory URL pattern
pub fn expand_dir_url (pattern: &str, date: &NaiveDate, folder: &str)->String {
    pattern.replace( "${yyyyMMdd}", &yyyymmdd(date)).replace( "${folder}", folder)
}

pub struct HttpDirectory {
    client: Client,
    url: String,
}

impl HttpDirectory {
    pub fn new (client: Client, url: impl ToString)->Self {
        HttpDirectory { client, url: url.to_string() }
    }

    pub fn url (&self)->&str { &self.url }
}

#[async_trait]
impl RemoteDirectory for HttpDirectory {
    fn location (&self)->String { self.url.clone() }

    async fn list_files (&self)->Result<Vec<String>> {
        let html = get_text( &self.client, &self.url).await?;
        Ok( parse_listing( &html) )
    }

    async fn fetch_file (&self, name: &str, dest: &Path)->Result<u64> {
        let url = join_url( &self.url, name);
        info!("downloading {url}..");
        let len = download_url( &self.client, &url, dest).await?;
        info!("{} kB saved to {:?}", len / 1024, dest);
        Ok(len)
    }
}

/* #endregion HTTP directory listings */

/// a local (mirror) directory
pub struct LocalDirectory {
    dir: PathBuf,
}

impl LocalDirectory {
    pub fn new (dir: impl Into<PathBuf>)->Self {
        LocalDirectory { dir: dir.into() }
    }
}

#[async_trait]
impl RemoteDirectory for LocalDirectory {
    fn location (&self)->String { self.dir.to_string_lossy().to_string() }

    async fn list_files (&self)->Result<Vec<String>> {
        let mut names: Vec<String> = Vec::new();
        for e in fs::read_dir( &self.dir)? {
            let e = e?;
            if e.path().is_file() {
                if let Some(name) = e.file_name().to_str() {
                    names.push( name.to_string());
                }
            }
        }
        names.sort();
        Ok(names)
    }

    async fn fetch_file (&self, name: &str, dest: &Path)->Result<u64> {
        let dir = match dest.parent() {
            Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
            _ => PathBuf::from(".")
        };

        let mut src = fs::File::open( self.dir.join(name))?;
        let mut file = NamedTempFile::new_in( &dir)?;
        let len = io::copy( &mut src, &mut file)?;
        file.persist(dest).map_err(|e| e.error)?;
        Ok(len)
    }
}

/// poll `dir` until it contains `name`, sleeping `poll_interval` between listings. Listing errors count as
/// unsuccessful polls. Returns the listing that contained `name`, or a `PublicationTimeout` error once
/// `max_wait` has elapsed
pub async fn await_file (dir: &dyn RemoteDirectory, name: &str, poll_interval: Duration, max_wait: Duration)->Result<Vec<String>> {
    let deadline = Instant::now() + max_wait;
    let mut polls = 0;

    loop {
        polls += 1;
        match dir.list_files().await {
            Ok(files) => {
                if files.iter().any(|f| f == name) {
                    debug!("{name} available after {polls} polls");
                    return Ok(files)
                }
            }
            Err(e) => warn!("listing {} failed: {e}", dir.location())
        }

        if Instant::now() + poll_interval > deadline {
            return Err( OdinNwmError::PublicationTimeout( format!("{name} not in {} after {:?}", dir.location(), max_wait)))
        }

        info!("waiting for {name} to be published ({polls})..");
        tokio::time::sleep( poll_interval).await;
    }
}

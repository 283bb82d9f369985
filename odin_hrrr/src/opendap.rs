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

//! a minimal DAP2 (OPeNDAP) client that covers what we need from GrADS data servers: dataset structure
//! from `<url>.dds` and hyperslabs of single variables from `<url>.ascii?<var>[..][..][..]`.
//!
//! Remote datasets are accessed through the [`DatasetService`] and [`RemoteDataset`] traits so that
//! the fetch and trigger logic can be tested without a server.

use std::time::Duration;
use async_trait::async_trait;
use lazy_static::lazy_static;
use regex::Regex;
use reqwest::Client;
use tracing::debug;

use odin_common::net::get_text;
use crate::{SpatialWindow, errors::*};

#[derive(Debug,Clone,PartialEq)]
pub struct DapDimension {
    pub name: String,
    pub size: usize,
}

#[derive(Debug,Clone,PartialEq)]
pub struct DapVariable {
    pub name: String,
    pub dims: Vec<DapDimension>,
}

impl DapVariable {
    /// size of the time dimension. This is the dimension named "time" or the first one if there is none
    pub fn time_steps (&self)->Option<usize> {
        self.dims.iter().find( |d| d.name == "time").or_else(|| self.dims.first()).map( |d| d.size)
    }
}

/* #region service abstraction *********************************************************************************/

/// an opened remote dataset
#[async_trait]
pub trait RemoteDataset: Send + Sync {
    fn url (&self)->&str;

    fn variable_names (&self)->Vec<String>;

    /// number of time steps of variable `var`
    fn time_steps (&self, var: &str)->Result<usize>;

    /// values of `var` at `time_step` within `window` (row major)
    async fn read_window (&self, var: &str, time_step: usize, window: &SpatialWindow)->Result<Vec<f64>>;
}

#[async_trait]
pub trait DatasetService: Send + Sync {
    async fn open (&self, url: &str)->Result<Box<dyn RemoteDataset>>;
}

/* #endregion service abstraction */

/* #region DAP2 client *****************************************************************************************/

pub struct OpendapService {
    client: Client,
}

impl OpendapService {
    pub fn new (request_timeout: Duration)->Result<Self> {
        let client = Client::builder().timeout( request_timeout).build()?;
        Ok( OpendapService { client } )
    }
}

#[async_trait]
impl DatasetService for OpendapService {
    async fn open (&self, url: &str)->Result<Box<dyn RemoteDataset>> {
        let dds_url = format!("{url}.dds");
        debug!("retrieving {dds_url}");

        let text = get_text( &self.client, &dds_url).await?;
        check_error_document( &text)?;
        let variables = parse_dds( &text)?;

        Ok( Box::new( OpendapDataset { client: self.client.clone(), url: url.to_string(), variables }) )
    }
}

pub struct OpendapDataset {
    client: Client,
    url: String,
    variables: Vec<DapVariable>,
}

impl OpendapDataset {
    pub fn variable (&self, var: &str)->Result<&DapVariable> {
        self.variables.iter().find( |v| v.name == var).ok_or_else(|| OdinHrrrError::NoSuchVariable(var.to_string()))
    }
}

#[async_trait]
impl RemoteDataset for OpendapDataset {
    fn url (&self)->&str { &self.url }

    fn variable_names (&self)->Vec<String> {
        self.variables.iter().map( |v| v.name.clone()).collect()
    }

    fn time_steps (&self, var: &str)->Result<usize> {
        let v = self.variable(var)?;
        v.time_steps().ok_or_else(|| parse_error( format!("variable {var} has no dimensions")))
    }

    async fn read_window (&self, var: &str, time_step: usize, window: &SpatialWindow)->Result<Vec<f64>> {
        let v = self.variable(var)?;
        check_window( v, time_step, window)?;

        let url = hyperslab_url( &self.url, var, time_step, window);
        debug!("retrieving {url}");

        let text = get_text( &self.client, &url).await?;
        check_error_document( &text)?;

        let values = parse_ascii_values( &text, var)?;
        if values.len() != window.len() {
            return Err( parse_error( format!("expected {} values for {var}{window}, got {}", window.len(), values.len())))
        }
        Ok(values)
    }
}

fn check_window (v: &DapVariable, time_step: usize, window: &SpatialWindow)->Result<()> {
    if v.dims.len() != 3 {
        return Err( invalid_window( format!("{} is not a time/lat/lon grid", v.name)))
    }
    if window.is_empty() {
        return Err( invalid_window( format!("empty window {window}")))
    }
    if time_step >= v.dims[0].size || window.row_max > v.dims[1].size || window.col_max > v.dims[2].size {
        return Err( invalid_window( format!("[{time_step}]{window} outside of {} {:?}", v.name, v.dims)))
    }
    Ok(())
}

/// the ASCII request URL for a single time step. DAP constraints use inclusive upper bounds
pub fn hyperslab_url (url: &str, var: &str, time_step: usize, window: &SpatialWindow)->String {
    format!("{url}.ascii?{var}[{time_step}:{time_step}][{}:{}][{}:{}]",
            window.row_min, window.row_max - 1, window.col_min, window.col_max - 1)
}

/* #endregion DAP2 client */

/* #region response parsing ************************************************************************************/

lazy_static! {
    static ref DECL_RE: Regex = Regex::new(
        r"^(?:Byte|Int16|UInt16|Int32|UInt32|Float32|Float64|String|Url)\s+([\w.\-]+)((?:\s*\[[^\]]*\])*)\s*;"
    ).unwrap();
    static ref DIM_RE: Regex = Regex::new( r"\[\s*(?:([\w.\-]+)\s*=\s*)?(\d+)\s*\]").unwrap();
    static ref CLOSE_RE: Regex = Regex::new( r"^\}\s*([^;]*);").unwrap();
    static ref ERR_MSG_RE: Regex = Regex::new( r#"message\s*=\s*"([^"]*)""#).unwrap();
    static ref ASCII_HEADER_RE: Regex = Regex::new( r"^([\w.\-]+)\s*,\s*(?:\[\d+\])+\s*$").unwrap();
    static ref INDEX_PREFIX_RE: Regex = Regex::new( r"^(?:[\w.\-]+)?(?:\[\d+\])+\s*,").unwrap();
}

/// DAP2 servers report request failures as `Error { code = ..; message = ".."; };` documents
pub fn check_error_document (text: &str)->Result<()> {
    let text = text.trim_start();
    if text.starts_with("Error") {
        let msg = ERR_MSG_RE.captures(text).and_then( |c| c.get(1)).map( |m| m.as_str()).unwrap_or("unknown");
        Err( server_error( msg))
    } else {
        Ok(())
    }
}

fn parse_decl (line: &str)->Option<DapVariable> {
    DECL_RE.captures(line).map( |c| {
        let name = c[1].to_string();
        let dims = DIM_RE.captures_iter( &c[2]).filter_map( |d| {
            let size = d[2].parse::<usize>().ok()?;
            let dim_name = d.get(1).map( |m| m.as_str().to_string()).unwrap_or_default();
            Some( DapDimension { name: dim_name, size })
        }).collect();
        DapVariable { name, dims }
    })
}

/// parse the top level variables of a DDS document. Grids are reported with the name and dimensions of their ARRAY part
pub fn parse_dds (text: &str)->Result<Vec<DapVariable>> {
    let mut vars: Vec<DapVariable> = Vec::new();
    let mut depth = 0;
    let mut seen_dataset = false;
    let mut in_grid = false;
    let mut grid_array: Option<DapVariable> = None;

    for line in text.lines().map( |l| l.trim()).filter( |l| !l.is_empty()) {
        if line.ends_with('{') {
            if !seen_dataset {
                if !line.starts_with("Dataset") { return Err( parse_error( format!("not a DDS: {line}"))) }
                seen_dataset = true;
            } else if depth == 1 && line.starts_with("Grid") {
                in_grid = true;
                grid_array = None;
            }
            depth += 1;

        } else if let Some(c) = CLOSE_RE.captures(line) {
            if depth == 0 { return Err( parse_error("unbalanced DDS")) }
            depth -= 1;
            if depth == 1 && in_grid {
                if let Some(mut v) = grid_array.take() {
                    v.name = c[1].trim().to_string();
                    vars.push(v);
                }
                in_grid = false;
            } else if depth == 0 {
                break;
            }

        } else if let Some(v) = parse_decl(line) {
            if depth == 1 {
                vars.push(v);
            } else if in_grid && depth == 2 && grid_array.is_none() { // first decl within a grid is the ARRAY
                grid_array = Some(v);
            }
        }
    }

    if !seen_dataset { return Err( parse_error("no Dataset in DDS")) }
    Ok(vars)
}

/// parse the values of `var` from a DAP2 ASCII response. Values are returned in row major order
pub fn parse_ascii_values (text: &str, var: &str)->Result<Vec<f64>> {
    let mut values: Vec<f64> = Vec::new();
    let mut lines = text.lines().map( |l| l.trim());

    let is_var_header = |line: &str| {
        ASCII_HEADER_RE.captures(line).map( |c| {
            let name = &c[1];
            name == var || name.ends_with( &format!(".{var}"))
        }).unwrap_or(false)
    };

    if lines.by_ref().find( |l| is_var_header(*l)).is_none() {
        return Err( parse_error( format!("no data for {var} in response")))
    }

    for line in lines {
        if line.is_empty() { break }

        let data = if let Some(m) = INDEX_PREFIX_RE.find(line) {
            &line[m.end()..]
        } else if values.is_empty() {
            line // single line of values without index prefix
        } else {
            break // next variable
        };

        for s in data.split(',').map( |s| s.trim()).filter( |s| !s.is_empty()) {
            let v = s.parse::<f64>().map_err( |_| parse_error( format!("invalid value '{s}' for {var}")))?;
            values.push(v);
        }
    }

    if values.is_empty() {
        Err( parse_error( format!("no values for {var}")))
    } else {
        Ok(values)
    }
}

/* #endregion response parsing */

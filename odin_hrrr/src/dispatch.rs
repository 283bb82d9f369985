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

use std::{fmt, path::PathBuf};
use async_trait::async_trait;
use tokio::process::Command;
use tracing::{info, warn};

use crate::errors::*;

#[derive(Debug,Clone,Copy,PartialEq,Eq)]
pub struct DispatchStatus {
    pub success: bool,
    /// None if the process was terminated by a signal
    pub exit_code: Option<i32>,
}

impl fmt::Display for DispatchStatus {
    fn fmt (&self, f: &mut fmt::Formatter<'_>)->fmt::Result {
        match self.exit_code {
            Some(code) => write!(f, "exit code {code}"),
            None => write!(f, "terminated by signal")
        }
    }
}

/// whatever runs the downstream model for a trigger id
#[async_trait]
pub trait ModelDispatcher: Send + Sync {
    async fn dispatch (&self, id: &str)->Result<DispatchStatus>;
}

/// runs `program [args..] <id>` as an external process and waits for it to terminate
#[derive(Debug,Clone)]
pub struct CommandDispatcher {
    pub program: String,
    pub args: Vec<String>,
    pub working_dir: Option<PathBuf>,
}

impl CommandDispatcher {
    pub fn new (program: impl ToString, args: Vec<String>)->Self {
        CommandDispatcher { program: program.to_string(), args, working_dir: None }
    }

    pub fn with_working_dir (mut self, dir: impl Into<PathBuf>)->Self {
        self.working_dir = Some(dir.into());
        self
    }
}

#[async_trait]
impl ModelDispatcher for CommandDispatcher {
    async fn dispatch (&self, id: &str)->Result<DispatchStatus> {
        let mut cmd = Command::new( &self.program);
        cmd.args( &self.args).arg(id);
        if let Some(dir) = &self.working_dir {
            cmd.current_dir(dir);
        }

        info!("running {} {} {id}", self.program, self.args.join(" "));
        let status = cmd.status().await
            .map_err( |e| OdinHrrrError::DispatchError( format!("failed to run {}: {e}", self.program)))?;

        let status = DispatchStatus { success: status.success(), exit_code: status.code() };
        if !status.success {
            warn!("{} returned {status}", self.program);
        }
        Ok(status)
    }
}

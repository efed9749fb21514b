// Licensed to the Apache Software Foundation (ASF) under one
// or more contributor license agreements.  See the NOTICE file
// distributed with this work for additional information
// regarding copyright ownership.  The ASF licenses this file
// to you under the Apache License, Version 2.0 (the
// "License"); you may not use this file except in compliance
// with the License.  You may obtain a copy of the License at
//
//   http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing,
// software distributed under the License is distributed on an
// "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY
// KIND, either express or implied.  See the License for the
// specific language governing permissions and limitations
// under the License.

use std::str::FromStr;

use async_trait::async_trait;
use bytes::Bytes;
use log::debug;
use log::log;
use log::Level;

use crate::raw::*;
use crate::*;

const LOGGING_TARGET: &str = "unidal::services";

/// Add [log](https://docs.rs/log/) for every operation.
///
/// # Logging
///
/// - unidal will log in structural way.
/// - Every operation will start with a `started` log entry.
/// - Every operation will finish with the following status:
///   - `finished`: the operation is successful.
///   - `errored`: the operation returns an expected error like `NotFound`.
///   - `failed`: the operation returns an unexpected error.
///
/// # Todo
///
/// We should migrate to log's kv api after it's ready.
///
/// # Examples
///
/// ```
/// use anyhow::Result;
/// use unidal::layers::LoggingLayer;
/// use unidal::services;
/// use unidal::Operator;
///
/// let _ = Operator::new(services::Memory::default())
///     .expect("must init")
///     .layer(LoggingLayer::default())
///     .expect("must apply");
/// ```
///
/// # Output
///
/// unidal is using [`log`](https://docs.rs/log/latest/log/) for logging internally.
///
/// To enable logging output, please set `RUST_LOG`:
///
/// ```shell
/// RUST_LOG=debug ./app
/// ```
///
/// To config logging output, please refer to [Configure Logging](https://rust-lang-nursery.github.io/rust-cookbook/development_tools/debugging/config_log.html):
///
/// ```shell
/// RUST_LOG="info,unidal::services=debug" ./app
/// ```
#[derive(Debug, Copy, Clone)]
pub struct LoggingLayer {
    error_level: Option<Level>,
    failure_level: Option<Level>,
}

impl Default for LoggingLayer {
    fn default() -> Self {
        Self {
            error_level: Some(Level::Warn),
            failure_level: Some(Level::Error),
        }
    }
}

impl LoggingLayer {
    /// Setting the log level while expected error happened.
    ///
    /// For example: accessor returns NotFound.
    ///
    /// `None` means disable the log for error.
    pub fn with_error_level(mut self, level: Option<&str>) -> Result<Self> {
        self.error_level = parse_level(level)?;
        Ok(self)
    }

    /// Setting the log level while unexpected failure happened.
    ///
    /// For example: accessor returns Unexpected network error.
    ///
    /// `None` means disable the log for failure.
    pub fn with_failure_level(mut self, level: Option<&str>) -> Result<Self> {
        self.failure_level = parse_level(level)?;
        Ok(self)
    }
}

fn parse_level(level: Option<&str>) -> Result<Option<Level>> {
    level
        .map(|v| {
            Level::from_str(v).map_err(|err| {
                Error::new(ErrorKind::ConfigInvalid, "invalid log level")
                    .with_context("level", v)
                    .set_source(err)
            })
        })
        .transpose()
}

impl Layer for LoggingLayer {
    fn layer(&self, inner: FusedAccessor) -> Result<FusedAccessor> {
        let info = inner.info();
        Ok(std::sync::Arc::new(LoggingAccessor {
            scheme: info.scheme(),
            inner,
            error_level: self.error_level,
            failure_level: self.failure_level,
        }))
    }

    fn name(&self) -> &'static str {
        "logging"
    }
}

#[derive(Debug)]
pub struct LoggingAccessor {
    scheme: Scheme,
    inner: FusedAccessor,

    error_level: Option<Level>,
    failure_level: Option<Level>,
}

impl LoggingAccessor {
    /// Pick the level for the given error.
    ///
    /// Unexpected errors and exhausted retries are failures, others
    /// are errors expected by callers.
    fn err_level(&self, err: &Error) -> (&'static str, Option<Level>) {
        match err.kind() {
            ErrorKind::Unexpected | ErrorKind::RetryExhausted => ("failed", self.failure_level),
            _ => ("errored", self.error_level),
        }
    }

    fn started(&self, op: Operation, path: &str) {
        debug!(
            target: LOGGING_TARGET,
            "service={} operation={} path={} -> started",
            self.scheme, op, path
        );
    }

    fn finish<T>(&self, op: Operation, path: &str, res: Result<T>) -> Result<T> {
        match res {
            Ok(v) => {
                debug!(
                    target: LOGGING_TARGET,
                    "service={} operation={} path={} -> finished",
                    self.scheme, op, path
                );
                Ok(v)
            }
            Err(err) => {
                if let (status, Some(lvl)) = self.err_level(&err) {
                    log!(
                        target: LOGGING_TARGET,
                        lvl,
                        "service={} operation={} path={} -> {}: {:?}",
                        self.scheme, op, path, status, err
                    );
                }
                Err(err)
            }
        }
    }
}

#[async_trait]
impl Accessor for LoggingAccessor {
    fn inner(&self) -> Option<FusedAccessor> {
        Some(self.inner.clone())
    }

    async fn read(&self, path: &str, args: OpRead) -> Result<Bytes> {
        self.started(Operation::Read, path);
        let res = self.inner.read(path, args).await;
        self.finish(Operation::Read, path, res)
    }

    async fn write(&self, path: &str, args: OpWrite, bs: Bytes) -> Result<()> {
        debug!(
            target: LOGGING_TARGET,
            "service={} operation={} path={} size={} -> started",
            self.scheme,
            Operation::Write,
            path,
            bs.len()
        );
        let res = self.inner.write(path, args, bs).await;
        self.finish(Operation::Write, path, res)
    }

    async fn stat(&self, path: &str, args: OpStat) -> Result<Metadata> {
        self.started(Operation::Stat, path);
        let res = self.inner.stat(path, args).await;
        self.finish(Operation::Stat, path, res)
    }

    async fn delete(&self, path: &str, args: OpDelete) -> Result<()> {
        self.started(Operation::Delete, path);
        let res = self.inner.delete(path, args).await;
        self.finish(Operation::Delete, path, res)
    }

    async fn list(&self, path: &str, args: OpList) -> Result<Vec<Entry>> {
        self.started(Operation::List, path);
        let res = self.inner.list(path, args).await;
        self.finish(Operation::List, path, res)
    }

    fn blocking_read(&self, path: &str, args: OpRead) -> Result<Bytes> {
        self.started(Operation::BlockingRead, path);
        let res = self.inner.blocking_read(path, args);
        self.finish(Operation::BlockingRead, path, res)
    }

    fn blocking_write(&self, path: &str, args: OpWrite, bs: Bytes) -> Result<()> {
        debug!(
            target: LOGGING_TARGET,
            "service={} operation={} path={} size={} -> started",
            self.scheme,
            Operation::BlockingWrite,
            path,
            bs.len()
        );
        let res = self.inner.blocking_write(path, args, bs);
        self.finish(Operation::BlockingWrite, path, res)
    }

    fn blocking_stat(&self, path: &str, args: OpStat) -> Result<Metadata> {
        self.started(Operation::BlockingStat, path);
        let res = self.inner.blocking_stat(path, args);
        self.finish(Operation::BlockingStat, path, res)
    }

    fn blocking_delete(&self, path: &str, args: OpDelete) -> Result<()> {
        self.started(Operation::BlockingDelete, path);
        let res = self.inner.blocking_delete(path, args);
        self.finish(Operation::BlockingDelete, path, res)
    }

    fn blocking_list(&self, path: &str, args: OpList) -> Result<Vec<Entry>> {
        self.started(Operation::BlockingList, path);
        let res = self.inner.blocking_list(path, args);
        self.finish(Operation::BlockingList, path, res)
    }
}

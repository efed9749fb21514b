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

use std::collections::HashMap;
use std::future::Future;
use std::time::Duration;

use async_trait::async_trait;
use backon::BlockingRetryable;
use backon::ExponentialBuilder;
use backon::Retryable;
use bytes::Bytes;
use log::warn;
use serde::Deserialize;

use crate::raw::*;
use crate::*;

/// Add retry for temporary failed operations.
///
/// # Notes
///
/// This layer will retry failed operations when [`Error::is_temporary`]
/// returns true. If operation still failed after `max_times` retries,
/// this layer returns a persistent [`ErrorKind::RetryExhausted`] error,
/// and the last failure can be read via [`Error::last_error`].
///
/// Errors that are not temporary are returned as is without retry.
///
/// Dropping the future of an async operation cancels both the pending
/// wait and the in-flight call.
///
/// # Backoff
///
/// The first retry waits `min_delay`, every following wait is multiplied
/// by `factor` and capped by `max_delay`. With jitter enabled, a random
/// duration in `[0, current_delay)` is added to every wait.
///
/// # Examples
///
/// ```
/// use anyhow::Result;
/// use unidal::layers::RetryLayer;
/// use unidal::services;
/// use unidal::Operator;
///
/// let _ = Operator::new(services::Memory::default())
///     .expect("must init")
///     .layer(RetryLayer::new())
///     .expect("must apply");
/// ```
#[derive(Default, Clone, Debug)]
pub struct RetryLayer {
    builder: ExponentialBuilder,
}

/// Config for [`RetryLayer`] that can be deserialized from string pairs.
///
/// Delays are in seconds and accept fractions like `0.5`.
#[derive(Default, Deserialize, Clone, Debug, PartialEq)]
#[serde(default)]
#[non_exhaustive]
pub struct RetryConfig {
    /// Max retry times, default to `3`.
    pub max_times: Option<usize>,
    /// Backoff factor, must be >= 1.0, default to `2.0`.
    pub factor: Option<f32>,
    /// Enable jitter, default to `false`.
    pub jitter: Option<bool>,
    /// Seed the jitter, implies `jitter`.
    pub seed: Option<u64>,
    /// Min delay in seconds, default to `1`.
    pub min_delay: Option<f64>,
    /// Max delay in seconds, default to `60`.
    pub max_delay: Option<f64>,
}

impl RetryLayer {
    /// Create a new retry layer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a retry layer from config pairs like `[("max_times", "5")]`.
    ///
    /// # Errors
    ///
    /// Returns `ConfigInvalid` if any value can't be parsed or is out of range.
    pub fn from_iter(iter: impl IntoIterator<Item = (String, String)>) -> Result<Self> {
        let cfg: RetryConfig = deserialize_config(iter.into_iter().collect::<HashMap<_, _>>())?;
        Self::from_config(cfg)
    }

    /// Create a retry layer from [`RetryConfig`].
    pub fn from_config(cfg: RetryConfig) -> Result<Self> {
        let mut layer = Self::default();

        if let Some(v) = cfg.max_times {
            layer = layer.with_max_times(v);
        }
        if let Some(v) = cfg.factor {
            if v < 1.0 || !v.is_finite() {
                return Err(
                    Error::new(ErrorKind::ConfigInvalid, "factor must be >= 1.0")
                        .with_context("factor", v),
                );
            }
            layer = layer.with_factor(v);
        }
        if cfg.jitter == Some(true) {
            layer = layer.with_jitter();
        }
        if let Some(seed) = cfg.seed {
            layer = layer.with_jitter_seed(seed);
        }
        if let Some(v) = cfg.min_delay {
            layer = layer.with_min_delay(parse_delay("min_delay", v)?);
        }
        if let Some(v) = cfg.max_delay {
            layer = layer.with_max_delay(parse_delay("max_delay", v)?);
        }

        Ok(layer)
    }

    /// Set jitter of current backoff.
    ///
    /// If jitter is enabled, ExponentialBackoff will add a random jitter in
    /// `[0, current_delay)` to current delay.
    pub fn with_jitter(mut self) -> Self {
        self.builder = self.builder.with_jitter();
        self
    }

    /// Enable jitter with a fixed seed.
    ///
    /// Every operation replays the same delay sequence, which keeps tests
    /// deterministic.
    pub fn with_jitter_seed(mut self, seed: u64) -> Self {
        self.builder = self.builder.with_jitter().with_jitter_seed(seed);
        self
    }

    /// Set factor of current backoff.
    ///
    /// # Panics
    ///
    /// This function will panic if input factor smaller than `1.0`.
    pub fn with_factor(mut self, factor: f32) -> Self {
        assert!(
            factor >= 1.0,
            "invalid factor that lower than 1.0: {factor}"
        );
        self.builder = self.builder.with_factor(factor);
        self
    }

    /// Set min_delay of current backoff.
    pub fn with_min_delay(mut self, min_delay: Duration) -> Self {
        self.builder = self.builder.with_min_delay(min_delay);
        self
    }

    /// Set max_delay of current backoff.
    ///
    /// Delay will not increasing if current delay is larger than max_delay.
    pub fn with_max_delay(mut self, max_delay: Duration) -> Self {
        self.builder = self.builder.with_max_delay(max_delay);
        self
    }

    /// Set max_times of current backoff.
    ///
    /// Backoff will return `None` if max times is reaching.
    pub fn with_max_times(mut self, max_times: usize) -> Self {
        self.builder = self.builder.with_max_times(max_times);
        self
    }
}

fn parse_delay(key: &'static str, secs: f64) -> Result<Duration> {
    Duration::try_from_secs_f64(secs).map_err(|err| {
        Error::new(ErrorKind::ConfigInvalid, "delay must be a non-negative number of seconds")
            .with_context(key, secs)
            .set_source(err)
    })
}

impl Layer for RetryLayer {
    fn layer(&self, inner: FusedAccessor) -> Result<FusedAccessor> {
        Ok(std::sync::Arc::new(RetryAccessor {
            inner,
            builder: self.builder,
        }))
    }

    fn name(&self) -> &'static str {
        "retry"
    }
}

#[derive(Debug)]
pub struct RetryAccessor {
    inner: FusedAccessor,
    builder: ExponentialBuilder,
}

/// A temporary error left after the backoff ran out.
fn exhausted(err: Error, attempts: usize) -> Error {
    if err.is_temporary() {
        Error::retry_exhausted(err, attempts)
    } else {
        err
    }
}

impl RetryAccessor {
    async fn call_with_retry<T, F, Fut>(&self, op: Operation, path: &str, mut f: F) -> Result<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        let mut attempts = 0;

        let res = {
            || {
                attempts += 1;
                f()
            }
        }
        .retry(&self.builder)
        .when(|e: &Error| e.is_temporary())
        .notify(|err, dur| {
            warn!(
                target: "unidal::services",
                "operation={} path={} -> retry after {}s: error={}",
                op, path, dur.as_secs_f64(), err)
        })
        .await;

        res.map_err(|e| exhausted(e, attempts))
    }

    fn blocking_call_with_retry<T, F>(&self, op: Operation, path: &str, mut f: F) -> Result<T>
    where
        F: FnMut() -> Result<T>,
    {
        let mut attempts = 0;

        let res = {
            || {
                attempts += 1;
                f()
            }
        }
        .retry(&self.builder)
        .when(|e: &Error| e.is_temporary())
        .notify(|err, dur| {
            warn!(
                target: "unidal::services",
                "operation={} path={} -> retry after {}s: error={}",
                op, path, dur.as_secs_f64(), err)
        })
        .call();

        res.map_err(|e| exhausted(e, attempts))
    }
}

#[async_trait]
impl Accessor for RetryAccessor {
    fn inner(&self) -> Option<FusedAccessor> {
        Some(self.inner.clone())
    }

    async fn read(&self, path: &str, args: OpRead) -> Result<Bytes> {
        self.call_with_retry(Operation::Read, path, || self.inner.read(path, args.clone()))
            .await
    }

    async fn write(&self, path: &str, args: OpWrite, bs: Bytes) -> Result<()> {
        self.call_with_retry(Operation::Write, path, || {
            self.inner.write(path, args.clone(), bs.clone())
        })
        .await
    }

    async fn stat(&self, path: &str, args: OpStat) -> Result<Metadata> {
        self.call_with_retry(Operation::Stat, path, || self.inner.stat(path, args.clone()))
            .await
    }

    async fn delete(&self, path: &str, args: OpDelete) -> Result<()> {
        self.call_with_retry(Operation::Delete, path, || {
            self.inner.delete(path, args.clone())
        })
        .await
    }

    async fn list(&self, path: &str, args: OpList) -> Result<Vec<Entry>> {
        self.call_with_retry(Operation::List, path, || self.inner.list(path, args.clone()))
            .await
    }

    fn blocking_read(&self, path: &str, args: OpRead) -> Result<Bytes> {
        self.blocking_call_with_retry(Operation::BlockingRead, path, || {
            self.inner.blocking_read(path, args.clone())
        })
    }

    fn blocking_write(&self, path: &str, args: OpWrite, bs: Bytes) -> Result<()> {
        self.blocking_call_with_retry(Operation::BlockingWrite, path, || {
            self.inner.blocking_write(path, args.clone(), bs.clone())
        })
    }

    fn blocking_stat(&self, path: &str, args: OpStat) -> Result<Metadata> {
        self.blocking_call_with_retry(Operation::BlockingStat, path, || {
            self.inner.blocking_stat(path, args.clone())
        })
    }

    fn blocking_delete(&self, path: &str, args: OpDelete) -> Result<()> {
        self.blocking_call_with_retry(Operation::BlockingDelete, path, || {
            self.inner.blocking_delete(path, args.clone())
        })
    }

    fn blocking_list(&self, path: &str, args: OpList) -> Result<Vec<Entry>> {
        self.blocking_call_with_retry(Operation::BlockingList, path, || {
            self.inner.blocking_list(path, args.clone())
        })
    }
}

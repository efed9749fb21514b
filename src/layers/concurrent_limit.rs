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

use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;
use tokio::sync::AcquireError;
use tokio::sync::Semaphore;
use tokio::sync::SemaphorePermit;
use tokio::sync::TryAcquireError;

use crate::raw::*;
use crate::*;

/// Add concurrent request limit.
///
/// # Notes
///
/// Users can control how many concurrent connections could be established
/// between unidal and underlying storage services.
///
/// Every `layer()` call creates its own semaphore, so operators built from
/// the same layer value do not share permits.
///
/// Blocking operations never wait for a permit: they fail with a temporary
/// `RateLimited` error instead, which could be retried by
/// [`RetryLayer`](crate::layers::RetryLayer).
///
/// # Examples
///
/// ```
/// use anyhow::Result;
/// use unidal::layers::ConcurrentLimitLayer;
/// use unidal::services;
/// use unidal::Operator;
///
/// let _ = Operator::new(services::Memory::default())
///     .expect("must init")
///     .layer(ConcurrentLimitLayer::new(1024))
///     .expect("must apply");
/// ```
#[derive(Debug, Clone)]
pub struct ConcurrentLimitLayer {
    permits: usize,
}

impl ConcurrentLimitLayer {
    /// Create a new ConcurrentLimitLayer will specify permits
    pub fn new(permits: usize) -> Self {
        Self { permits }
    }
}

impl Layer for ConcurrentLimitLayer {
    fn layer(&self, inner: FusedAccessor) -> Result<FusedAccessor> {
        if self.permits == 0 {
            return Err(Error::new(
                ErrorKind::ConfigInvalid,
                "concurrent limit permits must be larger than 0",
            ));
        }

        Ok(Arc::new(ConcurrentLimitAccessor {
            inner,
            semaphore: Arc::new(Semaphore::new(self.permits)),
        }))
    }

    fn name(&self) -> &'static str {
        "concurrent_limit"
    }
}

#[derive(Debug, Clone)]
pub struct ConcurrentLimitAccessor {
    inner: FusedAccessor,
    semaphore: Arc<Semaphore>,
}

impl ConcurrentLimitAccessor {
    async fn acquire(&self) -> Result<SemaphorePermit<'_>> {
        self.semaphore.acquire().await.map_err(new_acquire_error)
    }

    fn try_acquire(&self) -> Result<SemaphorePermit<'_>> {
        self.semaphore.try_acquire().map_err(|err| match err {
            TryAcquireError::NoPermits => Error::new(
                ErrorKind::RateLimited,
                "no permit available for blocking operation",
            )
            .set_temporary(),
            TryAcquireError::Closed => {
                Error::new(ErrorKind::Unexpected, "semaphore is closed").set_source(err)
            }
        })
    }
}

fn new_acquire_error(err: AcquireError) -> Error {
    Error::new(ErrorKind::Unexpected, "semaphore is closed").set_source(err)
}

#[async_trait]
impl Accessor for ConcurrentLimitAccessor {
    fn inner(&self) -> Option<FusedAccessor> {
        Some(self.inner.clone())
    }

    async fn read(&self, path: &str, args: OpRead) -> Result<Bytes> {
        let _permit = self.acquire().await?;

        self.inner.read(path, args).await
    }

    async fn write(&self, path: &str, args: OpWrite, bs: Bytes) -> Result<()> {
        let _permit = self.acquire().await?;

        self.inner.write(path, args, bs).await
    }

    async fn stat(&self, path: &str, args: OpStat) -> Result<Metadata> {
        let _permit = self.acquire().await?;

        self.inner.stat(path, args).await
    }

    async fn delete(&self, path: &str, args: OpDelete) -> Result<()> {
        let _permit = self.acquire().await?;

        self.inner.delete(path, args).await
    }

    async fn list(&self, path: &str, args: OpList) -> Result<Vec<Entry>> {
        let _permit = self.acquire().await?;

        self.inner.list(path, args).await
    }

    fn blocking_read(&self, path: &str, args: OpRead) -> Result<Bytes> {
        let _permit = self.try_acquire()?;

        self.inner.blocking_read(path, args)
    }

    fn blocking_write(&self, path: &str, args: OpWrite, bs: Bytes) -> Result<()> {
        let _permit = self.try_acquire()?;

        self.inner.blocking_write(path, args, bs)
    }

    fn blocking_stat(&self, path: &str, args: OpStat) -> Result<Metadata> {
        let _permit = self.try_acquire()?;

        self.inner.blocking_stat(path, args)
    }

    fn blocking_delete(&self, path: &str, args: OpDelete) -> Result<()> {
        let _permit = self.try_acquire()?;

        self.inner.blocking_delete(path, args)
    }

    fn blocking_list(&self, path: &str, args: OpList) -> Result<Vec<Entry>> {
        let _permit = self.try_acquire()?;

        self.inner.blocking_list(path, args)
    }
}

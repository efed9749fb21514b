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
use tokio::runtime::Handle;

use crate::raw::*;
use crate::*;

/// Add blocking API support for non-blocking services.
///
/// # Notes
///
/// - Please only enable this layer when the underlying service does not support blocking.
///   Applying it on a blocking capable service returns `LayerIncompatible`.
/// - Blocking calls must not be made from inside an async task of the same runtime,
///   use `tokio::task::spawn_blocking` or a plain thread instead.
///
/// # Examples
///
/// ## In async context
///
/// `BlockingLayer` will use current async context's runtime to handle the async calls.
///
/// ```rust,ignore
/// use anyhow::Result;
/// use unidal::layers::BlockingLayer;
/// use unidal::Operator;
///
/// #[tokio::main]
/// async fn main() -> Result<()> {
///     let op = Operator::via_iter("async_only", [])?
///         .layer(BlockingLayer::create()?)?;
///
///     tokio::task::spawn_blocking(move || op.blocking_read("hello.txt")).await??;
///     Ok(())
/// }
/// ```
///
/// ## In blocking context
///
/// In a pure blocking context, we can create a runtime and enter it before
/// creating the `BlockingLayer`.
///
/// ```rust,ignore
/// use unidal::layers::BlockingLayer;
/// use unidal::Operator;
/// use unidal::Result;
///
/// fn main() -> Result<()> {
///     let runtime = tokio::runtime::Builder::new_multi_thread()
///         .enable_all()
///         .build()
///         .unwrap();
///     let _guard = runtime.enter();
///
///     let op = Operator::via_iter("async_only", [])?
///         .layer(BlockingLayer::create()?)?;
///     let _ = op.blocking_read("hello.txt")?;
///     Ok(())
/// }
/// ```
#[derive(Debug, Clone)]
pub struct BlockingLayer {
    handle: Handle,
}

impl BlockingLayer {
    /// Create a new `BlockingLayer` with the current runtime's handle
    pub fn create() -> Result<Self> {
        Ok(Self {
            handle: Handle::try_current().map_err(|err| {
                Error::new(
                    ErrorKind::ConfigInvalid,
                    "blocking layer must be created inside a tokio runtime",
                )
                .set_source(err)
            })?,
        })
    }

    /// Create a new `BlockingLayer` with given runtime handle.
    pub fn with_handle(handle: Handle) -> Self {
        Self { handle }
    }
}

impl Layer for BlockingLayer {
    fn layer(&self, inner: FusedAccessor) -> Result<FusedAccessor> {
        let info = inner.info();
        if info.capability().blocking {
            return Err(Error::new(
                ErrorKind::LayerIncompatible,
                "service already supports blocking operations",
            )
            .with_context("service", info.scheme()));
        }

        Ok(Arc::new(BlockingAccessor {
            inner,
            handle: self.handle.clone(),
        }))
    }

    fn name(&self) -> &'static str {
        "blocking"
    }
}

#[derive(Debug, Clone)]
pub struct BlockingAccessor {
    inner: FusedAccessor,
    handle: Handle,
}

#[async_trait]
impl Accessor for BlockingAccessor {
    fn inner(&self) -> Option<FusedAccessor> {
        Some(self.inner.clone())
    }

    fn info(&self) -> AccessorInfo {
        let mut info = self.inner.info();
        info.capability_mut().blocking = true;
        info
    }

    fn blocking_read(&self, path: &str, args: OpRead) -> Result<Bytes> {
        self.handle.block_on(self.inner.read(path, args))
    }

    fn blocking_write(&self, path: &str, args: OpWrite, bs: Bytes) -> Result<()> {
        self.handle.block_on(self.inner.write(path, args, bs))
    }

    fn blocking_stat(&self, path: &str, args: OpStat) -> Result<Metadata> {
        self.handle.block_on(self.inner.stat(path, args))
    }

    fn blocking_delete(&self, path: &str, args: OpDelete) -> Result<()> {
        self.handle.block_on(self.inner.delete(path, args))
    }

    fn blocking_list(&self, path: &str, args: OpList) -> Result<Vec<Entry>> {
        self.handle.block_on(self.inner.list(path, args))
    }
}

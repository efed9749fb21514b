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
use std::ops::RangeBounds;
use std::sync::Arc;

use bytes::Bytes;

use super::registry;
use crate::raw::*;
use crate::*;

/// Operator is the entry for all public APIs.
///
/// Read [`concepts`][crate] for know more about [`Operator`].
///
/// # Notes
///
/// There is only one operator type: every backend and every combination of
/// layers ends up as an `Operator`. Cloning an operator is cheap, it only
/// bumps the reference counters of the inner accessor chain.
///
/// Both async and blocking APIs live on the same type. Blocking APIs
/// require the `blocking` capability, which can be added to async-only
/// backends by [`crate::layers::BlockingLayer`].
///
/// # Examples
///
/// Read more backend init examples in [`services`]
///
/// ```
/// # use anyhow::Result;
/// use unidal::layers::RetryLayer;
/// use unidal::Operator;
/// async fn test() -> Result<()> {
///     let op = Operator::via_iter("memory", [])?.layer(RetryLayer::new())?;
///
///     op.write("a.txt", "hi").await?;
///     assert_eq!(op.read("a.txt").await?, "hi".as_bytes());
///     Ok(())
/// }
/// ```
#[derive(Clone, Debug)]
pub struct Operator {
    accessor: FusedAccessor,
    info: Arc<AccessorInfo>,
    layers: Arc<Vec<&'static str>>,
}

impl Operator {
    pub(crate) fn from_inner(accessor: FusedAccessor) -> Self {
        let info = Arc::new(accessor.info());
        Self {
            accessor,
            info,
            layers: Arc::new(Vec::new()),
        }
    }

    /// Create a new operator from given builder.
    ///
    /// # Examples
    ///
    /// ```
    /// # use anyhow::Result;
    /// use unidal::services::Fs;
    /// use unidal::Operator;
    /// async fn test() -> Result<()> {
    ///     let builder = Fs::default().root("/tmp");
    ///     let op: Operator = Operator::new(builder)?;
    ///
    ///     Ok(())
    /// }
    /// ```
    pub fn new<B: Builder>(ab: B) -> Result<Operator> {
        let acc = ab.build()?;
        Ok(Operator::from_inner(Arc::new(acc)))
    }

    /// Create a new operator by scheme and config pairs from the global registry.
    ///
    /// The first call freezes [`GLOBAL_OPERATOR_REGISTRY`][crate::GLOBAL_OPERATOR_REGISTRY]:
    /// all registrations must happen before it.
    ///
    /// # Examples
    ///
    /// ```
    /// # use anyhow::Result;
    /// use unidal::Operator;
    /// fn test() -> Result<()> {
    ///     let op = Operator::via_iter("fs", [("root".to_string(), "/tmp".to_string())])?;
    ///     assert_eq!(op.scheme().to_string(), "fs");
    ///     Ok(())
    /// }
    /// ```
    pub fn via_iter(
        scheme: impl AsRef<str>,
        iter: impl IntoIterator<Item = (String, String)>,
    ) -> Result<Operator> {
        registry::create_from_global(scheme.as_ref(), iter.into_iter().collect())
    }

    /// Create a new operator by scheme and config map from the global registry.
    pub fn via_map(scheme: impl AsRef<str>, map: HashMap<String, String>) -> Result<Operator> {
        registry::create_from_global(scheme.as_ref(), map)
    }

    /// Create a new layer with dynamic dispatch.
    ///
    /// The current operator is left untouched: the returned operator holds
    /// a new accessor chain with the layer on top, and its layer list is the
    /// current one with this layer appended.
    ///
    /// The most recently applied layer sees the call first.
    ///
    /// # Notes
    ///
    /// `Operator::layer` is using dynamic dispatch which has a
    /// bit runtime overhead with an extra vtable lookup and unable to
    /// inline.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// # use anyhow::Result;
    /// use unidal::layers::LoggingLayer;
    /// use unidal::Operator;
    /// # fn test(op: Operator) -> Result<()> {
    /// let logged = op.layer(LoggingLayer::default())?;
    /// assert!(op.layers().is_empty());
    /// assert_eq!(logged.layers(), &["logging"]);
    /// # Ok(())
    /// # }
    /// ```
    pub fn layer<L: Layer>(&self, layer: L) -> Result<Operator> {
        let name = layer.name();
        let accessor = layer
            .layer(self.accessor.clone())
            .map_err(|err| err.with_context("layer", name))?;

        let mut layers = self.layers.as_ref().clone();
        layers.push(name);

        let info = Arc::new(accessor.info());
        Ok(Self {
            accessor,
            info,
            layers: Arc::new(layers),
        })
    }

    /// Get the underlying accessor chain.
    pub fn inner(&self) -> &FusedAccessor {
        &self.accessor
    }

    /// Get information of underlying accessor.
    pub fn info(&self) -> OperatorInfo {
        OperatorInfo::new(self.info.clone())
    }

    /// [`Scheme`] of the backend this operator is built on.
    pub fn scheme(&self) -> Scheme {
        self.info.scheme()
    }

    /// Normalized config of the backend this operator is built on.
    pub fn config(&self) -> &HashMap<String, String> {
        self.info.config()
    }

    /// Names of the applied layers, from the first applied to the last.
    pub fn layers(&self) -> &[&'static str] {
        &self.layers
    }

    /// Check if this operator can work correctly.
    ///
    /// We will send a `list` request to the root and return any errors we met.
    pub async fn check(&self) -> Result<()> {
        self.list("/").await.map(|_| ())
    }

    /// Read the whole path into bytes.
    ///
    /// # Errors
    ///
    /// - `IsADirectory` if path is a dir path like `abc/`.
    /// - `NotFound` if path doesn't exist.
    pub async fn read(&self, path: &str) -> Result<Bytes> {
        self.range_read(path, ..).await
    }

    /// Read the specified range of path into bytes.
    ///
    /// ```
    /// # use anyhow::Result;
    /// # use unidal::Operator;
    /// # async fn test(op: Operator) -> Result<()> {
    /// let bs = op.range_read("path/to/file", 1024..2048).await?;
    /// # Ok(())
    /// # }
    /// ```
    pub async fn range_read(&self, path: &str, range: impl RangeBounds<u64>) -> Result<Bytes> {
        let path = self.normalize(path, Operation::Read)?;
        let args = OpRead::new().with_range(range.into());

        ensure_file_path(&path)
            .and_then(|_| self.ensure_range_read(&args))
            .map_err(|err| self.decorate(err, Operation::Read, &path))?;

        self.accessor
            .read(&path, args)
            .await
            .map_err(|err| self.decorate(err, Operation::Read, &path))
    }

    /// Write bytes into path, existing content will be overwritten.
    ///
    /// ```
    /// # use anyhow::Result;
    /// # use unidal::Operator;
    /// # async fn test(op: Operator) -> Result<()> {
    /// op.write("path/to/file", vec![0; 4096]).await?;
    /// # Ok(())
    /// # }
    /// ```
    pub async fn write(&self, path: &str, bs: impl Into<Bytes>) -> Result<()> {
        let path = self.normalize(path, Operation::Write)?;
        let bs = bs.into();

        ensure_file_path(&path).map_err(|err| self.decorate(err, Operation::Write, &path))?;

        self.accessor
            .write(&path, OpWrite::new(), bs)
            .await
            .map_err(|err| self.decorate(err, Operation::Write, &path))
    }

    /// Get current path's metadata.
    pub async fn stat(&self, path: &str) -> Result<Metadata> {
        let path = self.normalize(path, Operation::Stat)?;

        self.accessor
            .stat(&path, OpStat::new())
            .await
            .map_err(|err| self.decorate(err, Operation::Stat, &path))
    }

    /// Check if this path exists or not.
    pub async fn is_exist(&self, path: &str) -> Result<bool> {
        match self.stat(path).await {
            Ok(_) => Ok(true),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(false),
            Err(err) => Err(err),
        }
    }

    /// Delete the given path.
    ///
    /// # Notes
    ///
    /// - Deleting a path that doesn't exist won't return an error.
    pub async fn delete(&self, path: &str) -> Result<()> {
        let path = self.normalize(path, Operation::Delete)?;

        self.accessor
            .delete(&path, OpDelete::new())
            .await
            .map_err(|err| self.decorate(err, Operation::Delete, &path))
    }

    /// List entries that start with given prefix, without going into sub dirs.
    ///
    /// - `dir/` lists everything under `dir/`.
    /// - `dir/ab` lists entries under `dir/` whose name starts with `ab`.
    ///
    /// ```
    /// # use anyhow::Result;
    /// # use unidal::Operator;
    /// # async fn test(op: Operator) -> Result<()> {
    /// for entry in op.list("path/to/dir/").await? {
    ///     if entry.metadata().is_dir() {
    ///         println!("dir: {}", entry.path());
    ///     }
    /// }
    /// # Ok(())
    /// # }
    /// ```
    pub async fn list(&self, prefix: &str) -> Result<Vec<Entry>> {
        self.list_with(prefix, OpList::new()).await
    }

    /// List all entries that start with given prefix recursively.
    pub async fn scan(&self, prefix: &str) -> Result<Vec<Entry>> {
        self.list_with(prefix, OpList::new().with_recursive(true))
            .await
    }

    async fn list_with(&self, prefix: &str, args: OpList) -> Result<Vec<Entry>> {
        let path = self.normalize(prefix, Operation::List)?;

        self.ensure_list(&args)
            .map_err(|err| self.decorate(err, Operation::List, &path))?;

        self.accessor
            .list(&path, args)
            .await
            .map_err(|err| self.decorate(err, Operation::List, &path))
    }

    /// Blocking version of [`Operator::read`].
    pub fn blocking_read(&self, path: &str) -> Result<Bytes> {
        self.blocking_range_read(path, ..)
    }

    /// Blocking version of [`Operator::range_read`].
    pub fn blocking_range_read(&self, path: &str, range: impl RangeBounds<u64>) -> Result<Bytes> {
        let path = self.normalize(path, Operation::BlockingRead)?;
        let args = OpRead::new().with_range(range.into());

        self.ensure_blocking()
            .and_then(|_| ensure_file_path(&path))
            .and_then(|_| self.ensure_range_read(&args))
            .and_then(|_| self.accessor.blocking_read(&path, args))
            .map_err(|err| self.decorate(err, Operation::BlockingRead, &path))
    }

    /// Blocking version of [`Operator::write`].
    pub fn blocking_write(&self, path: &str, bs: impl Into<Bytes>) -> Result<()> {
        let path = self.normalize(path, Operation::BlockingWrite)?;
        let bs = bs.into();

        self.ensure_blocking()
            .and_then(|_| ensure_file_path(&path))
            .and_then(|_| self.accessor.blocking_write(&path, OpWrite::new(), bs))
            .map_err(|err| self.decorate(err, Operation::BlockingWrite, &path))
    }

    /// Blocking version of [`Operator::stat`].
    pub fn blocking_stat(&self, path: &str) -> Result<Metadata> {
        let path = self.normalize(path, Operation::BlockingStat)?;

        self.ensure_blocking()
            .and_then(|_| self.accessor.blocking_stat(&path, OpStat::new()))
            .map_err(|err| self.decorate(err, Operation::BlockingStat, &path))
    }

    /// Blocking version of [`Operator::is_exist`].
    pub fn blocking_is_exist(&self, path: &str) -> Result<bool> {
        match self.blocking_stat(path) {
            Ok(_) => Ok(true),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(false),
            Err(err) => Err(err),
        }
    }

    /// Blocking version of [`Operator::delete`].
    pub fn blocking_delete(&self, path: &str) -> Result<()> {
        let path = self.normalize(path, Operation::BlockingDelete)?;

        self.ensure_blocking()
            .and_then(|_| self.accessor.blocking_delete(&path, OpDelete::new()))
            .map_err(|err| self.decorate(err, Operation::BlockingDelete, &path))
    }

    /// Blocking version of [`Operator::list`].
    pub fn blocking_list(&self, prefix: &str) -> Result<Vec<Entry>> {
        self.blocking_list_with(prefix, OpList::new())
    }

    /// Blocking version of [`Operator::scan`].
    pub fn blocking_scan(&self, prefix: &str) -> Result<Vec<Entry>> {
        self.blocking_list_with(prefix, OpList::new().with_recursive(true))
    }

    fn blocking_list_with(&self, prefix: &str, args: OpList) -> Result<Vec<Entry>> {
        let path = self.normalize(prefix, Operation::BlockingList)?;

        self.ensure_blocking()
            .and_then(|_| self.ensure_list(&args))
            .and_then(|_| self.accessor.blocking_list(&path, args))
            .map_err(|err| self.decorate(err, Operation::BlockingList, &path))
    }

    /// Normalize the input path and reject paths that climb out of root.
    fn normalize(&self, path: &str, op: Operation) -> Result<String> {
        let path = normalize_path(path);
        ensure_within_root(&path).map_err(|err| self.decorate(err, op, &path))?;
        Ok(path)
    }

    fn ensure_range_read(&self, args: &OpRead) -> Result<()> {
        if args.range().is_full() || self.info.capability().read_with_range {
            return Ok(());
        }

        Err(
            Error::new(ErrorKind::Unsupported, "service doesn't support ranged read")
                .with_context("range", format!("{:?}", args.range())),
        )
    }

    fn ensure_list(&self, args: &OpList) -> Result<()> {
        if !args.recursive() || self.info.capability().list_with_recursive {
            return Ok(());
        }

        Err(Error::new(
            ErrorKind::Unsupported,
            "service doesn't support recursive list",
        ))
    }

    fn ensure_blocking(&self) -> Result<()> {
        if self.info.capability().blocking {
            return Ok(());
        }

        Err(Error::new(
            ErrorKind::Unsupported,
            "service doesn't support blocking operations, apply BlockingLayer first",
        ))
    }

    fn decorate(&self, err: Error, op: Operation, path: &str) -> Error {
        err.with_operation(op)
            .with_context("service", self.info.scheme())
            .with_context("path", path)
    }
}

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
use std::fmt::Debug;
use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;

use crate::raw::*;
use crate::*;

/// Underlying trait of all backends for implementors.
///
/// # Note
///
/// Only service implementor should care about this trait, users need to
/// use [`Operator`][crate::Operator] instead.
///
/// # Operations
///
/// | Name | Capability |
/// | ---- | ---------- |
/// | [`info`][Accessor::info] | - |
/// | [`read`][Accessor::read] | `read` |
/// | [`write`][Accessor::write] | `write` |
/// | [`stat`][Accessor::stat] | `stat` |
/// | [`delete`][Accessor::delete] | `delete` |
/// | [`list`][Accessor::list] | `list` |
/// | [`blocking_read`][Accessor::blocking_read] | `blocking` && `read` |
/// | [`blocking_write`][Accessor::blocking_write] | `blocking` && `write` |
/// | [`blocking_stat`][Accessor::blocking_stat] | `blocking` && `stat` |
/// | [`blocking_delete`][Accessor::blocking_delete] | `blocking` && `delete` |
/// | [`blocking_list`][Accessor::blocking_list] | `blocking` && `list` |
///
/// - Path in args will all be normalized into the same style, services
///   should handle them based on services' requirement.
///   - Path that ends with `/` means it's Dir, otherwise, it's File.
///   - Root dir is `/`
///   - Path will never be empty.
/// - Every operation has a default implementation that forwards to
///   [`Accessor::inner`] and returns [`ErrorKind::Unsupported`] if there
///   is no inner accessor.
#[async_trait]
pub trait Accessor: Send + Sync + Debug + 'static {
    /// Return the inner accessor if there is one.
    ///
    /// # Behavior
    ///
    /// - Service should not implement this method.
    /// - Layers can implement this method to forward API call to inner accessor.
    fn inner(&self) -> Option<FusedAccessor> {
        None
    }

    /// Invoke the `info` operation to get metadata of accessor.
    ///
    /// # Behavior
    ///
    /// - Services MUST implement this method.
    /// - Layers MUST forward the info of the accessor they wrap.
    fn info(&self) -> AccessorInfo {
        match self.inner() {
            Some(inner) => inner.info(),
            None => AccessorInfo::default(),
        }
    }

    /// Invoke the `read` operation on the specified path.
    ///
    /// # Behavior
    ///
    /// - Input path MUST be file path, DON'T NEED to check mode.
    /// - The returning content length may be smaller than the range specified.
    async fn read(&self, path: &str, args: OpRead) -> Result<Bytes> {
        match self.inner() {
            Some(inner) => inner.read(path, args).await,
            None => Err(new_unsupported_error(Operation::Read)),
        }
    }

    /// Invoke the `write` operation on the specified path.
    ///
    /// # Behavior
    ///
    /// - Input path MUST be file path, DON'T NEED to check mode.
    /// - Write on existing file MUST overwrite it.
    async fn write(&self, path: &str, args: OpWrite, bs: Bytes) -> Result<()> {
        match self.inner() {
            Some(inner) => inner.write(path, args, bs).await,
            None => Err(new_unsupported_error(Operation::Write)),
        }
    }

    /// Invoke the `stat` operation on the specified path.
    ///
    /// # Behavior
    ///
    /// - `stat` root path `/` MUST succeed.
    /// - `stat` a path endswith "/" means stating a dir.
    /// - `mode` and `content_length` must be set.
    async fn stat(&self, path: &str, args: OpStat) -> Result<Metadata> {
        match self.inner() {
            Some(inner) => inner.stat(path, args).await,
            None => Err(new_unsupported_error(Operation::Stat)),
        }
    }

    /// Invoke the `delete` operation on the specified path.
    ///
    /// # Behavior
    ///
    /// - `delete` is an idempotent operation, it's safe to call `Delete` on the same path multiple times.
    /// - `delete` SHOULD return `Ok(())` if the path is deleted successfully or not exist.
    async fn delete(&self, path: &str, args: OpDelete) -> Result<()> {
        match self.inner() {
            Some(inner) => inner.delete(path, args).await,
            None => Err(new_unsupported_error(Operation::Delete)),
        }
    }

    /// Invoke the `list` operation on the specified prefix.
    ///
    /// # Behavior
    ///
    /// - Every returned entry path MUST start with the given prefix.
    /// - Dir entries MUST end with `/`.
    /// - Listing a prefix that matches nothing MUST return an empty list.
    async fn list(&self, path: &str, args: OpList) -> Result<Vec<Entry>> {
        match self.inner() {
            Some(inner) => inner.list(path, args).await,
            None => Err(new_unsupported_error(Operation::List)),
        }
    }

    /// Invoke the `blocking_read` operation on the specified path.
    ///
    /// This operation is the blocking version of [`Accessor::read`]
    fn blocking_read(&self, path: &str, args: OpRead) -> Result<Bytes> {
        match self.inner() {
            Some(inner) => inner.blocking_read(path, args),
            None => Err(new_unsupported_error(Operation::BlockingRead)),
        }
    }

    /// Invoke the `blocking_write` operation on the specified path.
    ///
    /// This operation is the blocking version of [`Accessor::write`]
    fn blocking_write(&self, path: &str, args: OpWrite, bs: Bytes) -> Result<()> {
        match self.inner() {
            Some(inner) => inner.blocking_write(path, args, bs),
            None => Err(new_unsupported_error(Operation::BlockingWrite)),
        }
    }

    /// Invoke the `blocking_stat` operation on the specified path.
    ///
    /// This operation is the blocking version of [`Accessor::stat`]
    fn blocking_stat(&self, path: &str, args: OpStat) -> Result<Metadata> {
        match self.inner() {
            Some(inner) => inner.blocking_stat(path, args),
            None => Err(new_unsupported_error(Operation::BlockingStat)),
        }
    }

    /// Invoke the `blocking_delete` operation on the specified path.
    ///
    /// This operation is the blocking version of [`Accessor::delete`]
    fn blocking_delete(&self, path: &str, args: OpDelete) -> Result<()> {
        match self.inner() {
            Some(inner) => inner.blocking_delete(path, args),
            None => Err(new_unsupported_error(Operation::BlockingDelete)),
        }
    }

    /// Invoke the `blocking_list` operation on the specified prefix.
    ///
    /// This operation is the blocking version of [`Accessor::list`]
    fn blocking_list(&self, path: &str, args: OpList) -> Result<Vec<Entry>> {
        match self.inner() {
            Some(inner) => inner.blocking_list(path, args),
            None => Err(new_unsupported_error(Operation::BlockingList)),
        }
    }
}

/// FusedAccessor is the type erased accessor with `Arc<dyn Accessor>`.
///
/// Every backend and every layered chain ends up as a `FusedAccessor`.
pub type FusedAccessor = Arc<dyn Accessor>;

fn new_unsupported_error(op: Operation) -> Error {
    Error::new(ErrorKind::Unsupported, "operation is not supported").with_operation(op)
}

/// Metadata for accessor, users can use this metadata to get information of underlying backend.
///
/// Once built, the info never changes.
#[derive(Clone, Debug, Default)]
pub struct AccessorInfo {
    scheme: Scheme,
    root: String,
    name: String,

    capability: Capability,
    config: HashMap<String, String>,
}

impl AccessorInfo {
    /// [`Scheme`] of backend.
    pub fn scheme(&self) -> Scheme {
        self.scheme
    }

    /// Set [`Scheme`] for backend.
    pub fn set_scheme(&mut self, scheme: Scheme) -> &mut Self {
        self.scheme = scheme;
        self
    }

    /// Root of backend, will be in format like `/path/to/dir/`
    pub fn root(&self) -> &str {
        &self.root
    }

    /// Set root for backend.
    ///
    /// Note: input root must be normalized.
    pub fn set_root(&mut self, root: &str) -> &mut Self {
        self.root = root.to_string();
        self
    }

    /// Name of backend, could be empty if underlying backend doesn't have namespace concept.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Set name of this backend.
    pub fn set_name(&mut self, name: &str) -> &mut Self {
        self.name = name.to_string();
        self
    }

    /// Get backend's capabilities.
    pub fn capability(&self) -> Capability {
        self.capability
    }

    /// Get backend's capabilities for update.
    pub fn capability_mut(&mut self) -> &mut Capability {
        &mut self.capability
    }

    /// Set capabilities for backend.
    pub fn set_capability(&mut self, capability: Capability) -> &mut Self {
        self.capability = capability;
        self
    }

    /// Normalized config the backend was built from.
    pub fn config(&self) -> &HashMap<String, String> {
        &self.config
    }

    /// Set normalized config for backend.
    pub fn set_config(&mut self, config: HashMap<String, String>) -> &mut Self {
        self.config = config;
        self
    }
}

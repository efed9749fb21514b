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

use crate::raw::*;
use crate::*;

/// Layer is used to intercept the operations on the underlying storage.
///
/// Struct that implement this trait must accept input `FusedAccessor` as inner,
/// and returns a new `FusedAccessor` as output.
///
/// All functions in `Accessor` requires `&self`, so it's implementor's responsibility
/// to maintain the internal mutability. Please also keep in mind that `Accessor`
/// requires `Send` and `Sync`.
///
/// # Notes
///
/// ## Inner
///
/// It's required to implement `fn inner() -> Option<FusedAccessor>` for layer's accessors.
///
/// By implement this method, all API calls will be forwarded to inner accessor instead.
///
/// ## State
///
/// A layer only carries its own parameters. State that belongs to one
/// wrapped accessor (like a semaphore) MUST be created inside `layer`,
/// so the same layer value can be applied to any number of accessors.
///
/// ## Incompatible
///
/// Return [`ErrorKind::LayerIncompatible`] if the layer can't work on top
/// of the given accessor.
///
/// # Examples
///
/// ```
/// use std::sync::Arc;
///
/// use unidal::raw::Accessor;
/// use unidal::raw::FusedAccessor;
/// use unidal::raw::Layer;
/// use unidal::Result;
///
/// /// Implement the real accessor logic here.
/// #[derive(Debug)]
/// struct TraceAccessor {
///     inner: FusedAccessor,
/// }
///
/// impl Accessor for TraceAccessor {
///     fn inner(&self) -> Option<FusedAccessor> {
///         Some(self.inner.clone())
///     }
/// }
///
/// /// The public struct that exposed to users.
/// ///
/// /// Will be used like `op.layer(TraceLayer)`
/// struct TraceLayer;
///
/// impl Layer for TraceLayer {
///     fn layer(&self, inner: FusedAccessor) -> Result<FusedAccessor> {
///         Ok(Arc::new(TraceAccessor { inner }))
///     }
/// }
/// ```
pub trait Layer {
    /// Intercept the operations on the underlying storage.
    fn layer(&self, inner: FusedAccessor) -> Result<FusedAccessor>;

    /// Name of this layer, recorded in [`crate::Operator::layers`].
    fn name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }
}

impl<L: Layer + ?Sized> Layer for &L {
    fn layer(&self, inner: FusedAccessor) -> Result<FusedAccessor> {
        (**self).layer(inner)
    }

    fn name(&self) -> &'static str {
        (**self).name()
    }
}

impl<L: Layer + ?Sized> Layer for Arc<L> {
    fn layer(&self, inner: FusedAccessor) -> Result<FusedAccessor> {
        (**self).layer(inner)
    }

    fn name(&self) -> &'static str {
        (**self).name()
    }
}

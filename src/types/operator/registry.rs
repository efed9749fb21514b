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
use std::fmt::Formatter;
use std::sync::Arc;
use std::sync::LazyLock;
use std::sync::RwLock;

use log::debug;

use crate::raw::*;
#[cfg(any(feature = "services-fs", feature = "services-memory"))]
use crate::services::*;
use crate::*;

/// The process wide registry used by [`Operator::via_iter`] and [`Operator::via_map`].
///
/// It starts with all services enabled by cargo features, accepts new
/// registrations via [`register`], and freezes itself at the first
/// operator creation.
pub static GLOBAL_OPERATOR_REGISTRY: LazyLock<RwLock<OperatorRegistry>> =
    LazyLock::new(|| RwLock::new(OperatorRegistry::initialized()));

/// Constructor that builds an accessor from a string config map.
pub type AccessorFactory =
    Arc<dyn Fn(HashMap<String, String>) -> Result<FusedAccessor> + Send + Sync>;

/// Register a factory for `scheme` into [`GLOBAL_OPERATOR_REGISTRY`].
///
/// # Errors
///
/// - `DuplicateScheme` if the scheme is registered already.
/// - `Unsupported` if an operator has been created from the global
///   registry already.
pub fn register<F>(scheme: &str, factory: F) -> Result<()>
where
    F: Fn(HashMap<String, String>) -> Result<FusedAccessor> + Send + Sync + 'static,
{
    GLOBAL_OPERATOR_REGISTRY
        .write()
        .map_err(|_| new_poisoned_error())?
        .register(scheme, factory)
}

pub(super) fn create_from_global(scheme: &str, config: HashMap<String, String>) -> Result<Operator> {
    let factory = {
        let registry = GLOBAL_OPERATOR_REGISTRY
            .read()
            .map_err(|_| new_poisoned_error())?;
        if registry.is_frozen() {
            registry.resolve(scheme)?
        } else {
            drop(registry);

            let mut registry = GLOBAL_OPERATOR_REGISTRY
                .write()
                .map_err(|_| new_poisoned_error())?;
            registry.freeze();
            registry.resolve(scheme)?
        }
    };

    build_operator(scheme, &factory, config)
}

fn build_operator(
    scheme: &str,
    factory: &AccessorFactory,
    config: HashMap<String, String>,
) -> Result<Operator> {
    let accessor = factory(config).map_err(|err| err.with_context("scheme", scheme))?;
    Ok(Operator::from_inner(accessor))
}

fn new_poisoned_error() -> Error {
    Error::new(ErrorKind::Unexpected, "operator registry lock is poisoned")
}

/// OperatorRegistry maps scheme names to accessor factories.
///
/// Scheme names are trimmed and lower cased before use.
#[derive(Clone, Default)]
pub struct OperatorRegistry {
    registry: HashMap<String, AccessorFactory>,
    frozen: bool,
}

impl Debug for OperatorRegistry {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OperatorRegistry")
            .field("schemes", &self.schemes())
            .field("frozen", &self.frozen)
            .finish()
    }
}

impl OperatorRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a registry with all services enabled by cargo features.
    pub fn initialized() -> Self {
        let registry = Self::new();

        #[cfg(feature = "services-fs")]
        let registry = register_builtin::<Fs>(registry);
        #[cfg(feature = "services-memory")]
        let registry = register_builtin::<Memory>(registry);

        registry
    }

    /// Register a factory for `scheme`.
    ///
    /// # Errors
    ///
    /// - `DuplicateScheme` if the scheme is registered already.
    /// - `Unsupported` if this registry has been frozen.
    pub fn register<F>(&mut self, scheme: &str, factory: F) -> Result<()>
    where
        F: Fn(HashMap<String, String>) -> Result<FusedAccessor> + Send + Sync + 'static,
    {
        let scheme = Scheme::normalize(scheme);

        if self.frozen {
            return Err(
                Error::new(ErrorKind::Unsupported, "registry is frozen").with_context("scheme", scheme)
            );
        }
        if self.registry.contains_key(&scheme) {
            return Err(Error::new(
                ErrorKind::DuplicateScheme,
                "scheme has been registered already",
            )
            .with_context("scheme", scheme));
        }

        debug!("operator registry registered scheme={scheme}");
        self.registry.insert(scheme, Arc::new(factory));
        Ok(())
    }

    /// Register a typed service builder under [`Builder::SCHEME`].
    ///
    /// The factory deserializes the config map into [`Builder::Config`]
    /// and builds the service from it.
    pub fn register_builder<B: Builder>(&mut self) -> Result<()> {
        self.register(B::SCHEME.into_static(), |config| {
            let cfg = <B::Config as Configurator>::from_iter(config)?;
            let acc = cfg.into_builder().build()?;
            Ok(Arc::new(acc) as FusedAccessor)
        })
    }

    /// Find the factory of `scheme`.
    pub fn resolve(&self, scheme: &str) -> Result<AccessorFactory> {
        let scheme = Scheme::normalize(scheme);

        self.registry.get(&scheme).cloned().ok_or_else(|| {
            Error::new(
                ErrorKind::UnknownScheme,
                "could not find any operator factory for the given scheme",
            )
            .with_context("scheme", scheme)
        })
    }

    /// Create an operator for `scheme` with given config.
    ///
    /// Nothing is constructed if the scheme is unknown.
    pub fn create(&self, scheme: &str, config: HashMap<String, String>) -> Result<Operator> {
        let factory = self.resolve(scheme)?;
        build_operator(scheme, &factory, config)
    }

    /// Reject all further registrations.
    pub fn freeze(&mut self) {
        if !self.frozen {
            debug!("operator registry frozen with schemes={:?}", self.schemes());
        }
        self.frozen = true;
    }

    /// Check if this registry has been frozen.
    pub fn is_frozen(&self) -> bool {
        self.frozen
    }

    /// Registered schemes in sorted order.
    pub fn schemes(&self) -> Vec<String> {
        let mut schemes: Vec<_> = self.registry.keys().cloned().collect();
        schemes.sort();
        schemes
    }
}

#[cfg(any(feature = "services-fs", feature = "services-memory"))]
fn register_builtin<B: Builder>(mut registry: OperatorRegistry) -> OperatorRegistry {
    registry
        .register_builder::<B>()
        .expect("built-in schemes are unique");
    registry
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[derive(Debug)]
    struct Stub;

    impl Accessor for Stub {
        fn info(&self) -> AccessorInfo {
            let mut am = AccessorInfo::default();
            am.set_scheme(Scheme::Custom("stub"));
            am
        }
    }

    fn stub_factory(_: HashMap<String, String>) -> Result<FusedAccessor> {
        Ok(Arc::new(Stub))
    }

    #[test]
    fn test_initialized_registry() {
        let registry = OperatorRegistry::initialized();
        assert_eq!(registry.schemes(), vec!["fs".to_string(), "memory".to_string()]);
        assert!(!registry.is_frozen());
    }

    #[cfg(feature = "services-memory")]
    #[test]
    fn test_builtin_scheme_is_taken() {
        let mut registry = OperatorRegistry::initialized();

        let err = registry.register_builder::<Memory>().unwrap_err();
        assert_eq!(err.kind(), ErrorKind::DuplicateScheme);
        assert_eq!(registry.schemes().len(), OperatorRegistry::initialized().schemes().len());
    }

    #[test]
    fn test_register_and_create() {
        let mut registry = OperatorRegistry::new();
        registry.register("Stub", stub_factory).unwrap();

        let op = registry.create(" stub ", HashMap::new()).unwrap();
        assert_eq!(op.scheme(), Scheme::Custom("stub"));
    }

    #[test]
    fn test_register_duplicate_scheme() {
        let mut registry = OperatorRegistry::new();
        registry.register("stub", stub_factory).unwrap();

        let err = registry.register("STUB", stub_factory).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::DuplicateScheme);
        assert_eq!(err.context("scheme"), Some("stub"));
    }

    #[test]
    fn test_unknown_scheme() {
        let registry = OperatorRegistry::new();

        let err = registry.create("nope", HashMap::new()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UnknownScheme);
        assert_eq!(err.context("scheme"), Some("nope"));
    }

    #[test]
    fn test_frozen_registry_rejects_register() {
        let mut registry = OperatorRegistry::new();
        registry.freeze();

        let err = registry.register("stub", stub_factory).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Unsupported);
    }

    #[test]
    fn test_factory_error_is_kept() {
        let mut registry = OperatorRegistry::new();
        registry
            .register("broken", |_| {
                Err(Error::new(ErrorKind::ConfigInvalid, "root is not specified"))
            })
            .unwrap();

        let err = registry.create("broken", HashMap::new()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ConfigInvalid);
        assert_eq!(err.context("scheme"), Some("broken"));
    }
}

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

use std::collections::BTreeMap;
use std::collections::HashMap;
use std::fmt::Debug;
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::MutexGuard;

use async_trait::async_trait;
use bytes::Bytes;
use chrono::DateTime;
use chrono::Utc;
use log::debug;

use super::MemoryConfig;
use crate::raw::*;
use crate::*;

impl Configurator for MemoryConfig {
    type Builder = MemoryBuilder;

    fn into_builder(self) -> Self::Builder {
        MemoryBuilder { config: self }
    }
}

/// In memory service support. (BTreeMap Based)
///
/// Every built backend owns its own map: two operators built from the
/// same config never see each other's data.
///
/// # Configuration
///
/// - `root`: Set the work dir for backend, default to `/`.
#[derive(Default, Debug)]
pub struct MemoryBuilder {
    config: MemoryConfig,
}

impl MemoryBuilder {
    /// Set the root for BTreeMap.
    pub fn root(mut self, path: &str) -> Self {
        self.config.root = if path.is_empty() {
            None
        } else {
            Some(path.to_string())
        };
        self
    }

    fn build_backend(self) -> Result<MemoryBackend> {
        debug!("backend build started: {:?}", &self);

        let root = normalize_root(self.config.root.as_deref().unwrap_or("/"));
        let inner = Arc::new(Mutex::new(BTreeMap::default()));

        let mut info = AccessorInfo::default();
        info.set_scheme(Scheme::Memory)
            .set_root(&root)
            .set_name(&format!("{:p}", Arc::as_ptr(&inner)))
            .set_capability(Capability {
                stat: true,
                read: true,
                read_with_range: true,
                write: true,
                delete: true,
                list: true,
                list_with_recursive: true,
                blocking: true,
            })
            .set_config(HashMap::from([("root".to_string(), root.clone())]));

        debug!("backend build finished: {:?}", &self);
        Ok(MemoryBackend {
            root,
            info: Arc::new(info),
            inner,
        })
    }
}

impl Builder for MemoryBuilder {
    const SCHEME: Scheme = Scheme::Memory;
    type Config = MemoryConfig;

    fn build(self) -> Result<impl Accessor> {
        self.build_backend()
    }
}

#[derive(Clone, Debug)]
struct Value {
    content: Bytes,
    last_modified: DateTime<Utc>,
}

/// Backend is used to serve `Accessor` support in memory.
///
/// Only files are stored, dirs exist as long as any file lives under them.
#[derive(Clone)]
pub struct MemoryBackend {
    root: String,
    info: Arc<AccessorInfo>,
    inner: Arc<Mutex<BTreeMap<String, Value>>>,
}

impl Debug for MemoryBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryBackend")
            .field("root", &self.root)
            .finish_non_exhaustive()
    }
}

impl MemoryBackend {
    fn lock(&self) -> Result<MutexGuard<'_, BTreeMap<String, Value>>> {
        self.inner
            .lock()
            .map_err(|_| Error::new(ErrorKind::Unexpected, "memory backend lock is poisoned"))
    }

    fn has_children(map: &BTreeMap<String, Value>, abs_dir: &str) -> bool {
        map.range(abs_dir.to_string()..)
            .next()
            .is_some_and(|(k, _)| k.starts_with(abs_dir))
    }

    fn blocking_read_inner(&self, path: &str, args: OpRead) -> Result<Bytes> {
        let p = build_abs_path(&self.root, path);
        let map = self.lock()?;

        match map.get(&p) {
            Some(v) => Ok(args.range().apply_on_bytes(v.content.clone())),
            None if Self::has_children(&map, &format!("{p}/")) => Err(Error::new(
                ErrorKind::IsADirectory,
                "the path is a directory",
            )),
            None => Err(Error::new(ErrorKind::NotFound, "memory doesn't have this path")),
        }
    }

    fn blocking_write_inner(&self, path: &str, bs: Bytes) -> Result<()> {
        let p = build_abs_path(&self.root, path);
        let mut map = self.lock()?;

        if Self::has_children(&map, &format!("{p}/")) {
            return Err(Error::new(
                ErrorKind::IsADirectory,
                "the path is a directory",
            ));
        }

        map.insert(
            p,
            Value {
                content: bs,
                last_modified: Utc::now(),
            },
        );
        Ok(())
    }

    fn blocking_stat_inner(&self, path: &str) -> Result<Metadata> {
        if path == "/" {
            return Ok(Metadata::new(EntryMode::DIR));
        }

        let p = build_abs_path(&self.root, path);
        let map = self.lock()?;

        if path.ends_with('/') {
            return if Self::has_children(&map, &p) {
                Ok(Metadata::new(EntryMode::DIR))
            } else {
                Err(Error::new(ErrorKind::NotFound, "memory doesn't have this path"))
            };
        }

        match map.get(&p) {
            Some(v) => Ok(Metadata::new(EntryMode::FILE)
                .with_content_length(v.content.len() as u64)
                .with_last_modified(v.last_modified)),
            None => Err(Error::new(ErrorKind::NotFound, "memory doesn't have this path")),
        }
    }

    fn blocking_delete_inner(&self, path: &str) -> Result<()> {
        let p = build_abs_path(&self.root, path);
        let mut map = self.lock()?;

        if path.ends_with('/') {
            if Self::has_children(&map, &p) {
                return Err(Error::new(ErrorKind::Unexpected, "directory is not empty"));
            }
            return Ok(());
        }

        map.remove(&p);
        Ok(())
    }

    fn blocking_list_inner(&self, path: &str, args: OpList) -> Result<Vec<Entry>> {
        let (dir, _) = split_prefix(path);
        let rel_dir = if dir == "/" { "" } else { dir };
        let abs_dir = build_abs_path(&self.root, dir);
        let abs_prefix = build_abs_path(&self.root, path);

        let map = self.lock()?;

        // BTreeMap keeps entries sorted and deduplicated.
        let mut entries = BTreeMap::new();
        for (key, value) in map.range(abs_prefix.clone()..) {
            if !key.starts_with(&abs_prefix) {
                break;
            }

            let rest = &key[abs_dir.len()..];
            for (idx, _) in rest.match_indices('/') {
                let p = format!("{rel_dir}{}", &rest[..idx + 1]);
                entries
                    .entry(p.clone())
                    .or_insert_with(|| Entry::new(&p, Metadata::new(EntryMode::DIR)));
                if !args.recursive() {
                    break;
                }
            }

            if args.recursive() || !rest.contains('/') {
                let p = format!("{rel_dir}{rest}");
                let meta = Metadata::new(EntryMode::FILE)
                    .with_content_length(value.content.len() as u64)
                    .with_last_modified(value.last_modified);
                entries.insert(p.clone(), Entry::new(&p, meta));
            }
        }

        Ok(entries.into_values().collect())
    }
}

#[async_trait]
impl Accessor for MemoryBackend {
    fn info(&self) -> AccessorInfo {
        self.info.as_ref().clone()
    }

    async fn read(&self, path: &str, args: OpRead) -> Result<Bytes> {
        self.blocking_read_inner(path, args)
    }

    async fn write(&self, path: &str, _: OpWrite, bs: Bytes) -> Result<()> {
        self.blocking_write_inner(path, bs)
    }

    async fn stat(&self, path: &str, _: OpStat) -> Result<Metadata> {
        self.blocking_stat_inner(path)
    }

    async fn delete(&self, path: &str, _: OpDelete) -> Result<()> {
        self.blocking_delete_inner(path)
    }

    async fn list(&self, path: &str, args: OpList) -> Result<Vec<Entry>> {
        self.blocking_list_inner(path, args)
    }

    fn blocking_read(&self, path: &str, args: OpRead) -> Result<Bytes> {
        self.blocking_read_inner(path, args)
    }

    fn blocking_write(&self, path: &str, _: OpWrite, bs: Bytes) -> Result<()> {
        self.blocking_write_inner(path, bs)
    }

    fn blocking_stat(&self, path: &str, _: OpStat) -> Result<Metadata> {
        self.blocking_stat_inner(path)
    }

    fn blocking_delete(&self, path: &str, _: OpDelete) -> Result<()> {
        self.blocking_delete_inner(path)
    }

    fn blocking_list(&self, path: &str, args: OpList) -> Result<Vec<Entry>> {
        self.blocking_list_inner(path, args)
    }
}

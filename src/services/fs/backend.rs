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
use std::io::Read;
use std::io::Seek;
use std::io::SeekFrom;
use std::path::Path;
use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;
use chrono::DateTime;
use log::debug;
use tokio::io::AsyncReadExt;
use tokio::io::AsyncSeekExt;
use uuid::Uuid;

use super::FsConfig;
use crate::raw::*;
use crate::*;

impl Configurator for FsConfig {
    type Builder = FsBuilder;

    fn into_builder(self) -> Self::Builder {
        FsBuilder { config: self }
    }
}

/// POSIX file system support.
///
/// # Configuration
///
/// - `root`: Set the work dir for backend, required. It will be created if not exist.
/// - `atomic_write_dir`: Set the tmp dir for atomic write, optional.
///
/// With `atomic_write_dir` set, `write` lands the content in a tmp file first
/// and renames it to the target path after all bytes are written.
///
/// # Example
///
/// ```no_run
/// use anyhow::Result;
/// use unidal::services::Fs;
/// use unidal::Operator;
///
/// #[tokio::main]
/// async fn main() -> Result<()> {
///     let builder = Fs::default().root("/tmp/unidal");
///
///     let op: Operator = Operator::new(builder)?;
///     Ok(())
/// }
/// ```
#[derive(Default, Debug)]
pub struct FsBuilder {
    config: FsConfig,
}

impl FsBuilder {
    /// Set root for backend.
    pub fn root(mut self, root: &str) -> Self {
        self.config.root = if root.is_empty() {
            None
        } else {
            Some(root.to_string())
        };

        self
    }

    /// Set temp dir for atomic write.
    pub fn atomic_write_dir(mut self, dir: &str) -> Self {
        self.config.atomic_write_dir = if dir.is_empty() {
            None
        } else {
            Some(dir.to_string())
        };

        self
    }

    fn build_backend(self) -> Result<FsBackend> {
        debug!("backend build started: {:?}", &self);

        let root = match self.config.root.as_deref() {
            Some(root) => PathBuf::from(root),
            None => {
                return Err(Error::new(
                    ErrorKind::ConfigInvalid,
                    "root is not specified",
                ))
            }
        };
        debug!("backend use root {}", root.to_string_lossy());

        let root = ensure_dir(&root, "root")?;
        let atomic_write_dir = self
            .config
            .atomic_write_dir
            .as_deref()
            .map(|d| ensure_dir(Path::new(d), "atomic_write_dir"))
            .transpose()?;

        let mut config = HashMap::from([("root".to_string(), root.to_string_lossy().to_string())]);
        if let Some(d) = &atomic_write_dir {
            config.insert(
                "atomic_write_dir".to_string(),
                d.to_string_lossy().to_string(),
            );
        }

        let mut info = AccessorInfo::default();
        info.set_scheme(Scheme::Fs)
            .set_root(&normalize_root(&root.to_string_lossy()))
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
            .set_config(config);

        debug!("backend build finished: {:?}", &self);
        Ok(FsBackend {
            root,
            atomic_write_dir,
            info: Arc::new(info),
        })
    }
}

impl Builder for FsBuilder {
    const SCHEME: Scheme = Scheme::Fs;
    type Config = FsConfig;

    fn build(self) -> Result<impl Accessor> {
        self.build_backend()
    }
}

/// Create the dir if not exist and return its canonicalized path.
fn ensure_dir(dir: &Path, key: &'static str) -> Result<PathBuf> {
    match std::fs::metadata(dir) {
        Ok(meta) if !meta.is_dir() => {
            return Err(Error::new(
                ErrorKind::ConfigInvalid,
                "the configured path is not a directory",
            )
            .with_context(key, dir.to_string_lossy()));
        }
        Ok(_) => {}
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            std::fs::create_dir_all(dir).map_err(|e| {
                Error::new(ErrorKind::Unexpected, "create dir failed")
                    .with_operation("Builder::build")
                    .with_context(key, dir.to_string_lossy())
                    .set_source(e)
            })?;
        }
        Err(e) => return Err(new_std_io_error(e).with_context(key, dir.to_string_lossy())),
    }

    dir.canonicalize().map_err(|e| {
        Error::new(ErrorKind::Unexpected, "canonicalize of dir failed")
            .with_operation("Builder::build")
            .with_context(key, dir.to_string_lossy())
            .set_source(e)
    })
}

/// Backend is used to serve `Accessor` support for posix alike fs.
#[derive(Debug, Clone)]
pub struct FsBackend {
    root: PathBuf,
    atomic_write_dir: Option<PathBuf>,
    info: Arc<AccessorInfo>,
}

#[inline]
fn tmp_file_of(path: &str) -> String {
    let name = get_basename(path);
    let uuid = Uuid::new_v4().to_string();

    format!("{name}.{uuid}")
}

fn new_is_a_directory_error() -> Error {
    Error::new(ErrorKind::IsADirectory, "the path is a directory")
}

fn new_metadata(meta: &std::fs::Metadata) -> Metadata {
    let m = if meta.is_dir() {
        Metadata::new(EntryMode::DIR)
    } else if meta.is_file() {
        Metadata::new(EntryMode::FILE).with_content_length(meta.len())
    } else {
        Metadata::new(EntryMode::Unknown)
    };

    match meta.modified() {
        Ok(t) => m.with_last_modified(DateTime::from(t)),
        Err(_) => m,
    }
}

fn new_entry(rel_dir: &str, name: &str, meta: &std::fs::Metadata) -> Entry {
    let path = if meta.is_dir() {
        format!("{rel_dir}{name}/")
    } else {
        format!("{rel_dir}{name}")
    };

    Entry::new(&path, new_metadata(meta))
}

impl FsBackend {
    fn abs_path(&self, path: &str) -> PathBuf {
        self.root.join(path.trim_end_matches('/'))
    }

    // Synchronously build write path and ensure the parent dirs created
    fn blocking_ensure_write_abs_path(parent: &Path, path: &str) -> Result<PathBuf> {
        let p = parent.join(path);

        let parent = p.parent().ok_or_else(|| {
            Error::new(
                ErrorKind::Unexpected,
                "path should have parent but not, it must be malformed",
            )
            .with_context("input", p.to_string_lossy())
        })?;

        std::fs::create_dir_all(parent).map_err(new_std_io_error)?;

        Ok(p)
    }

    // Build write path and ensure the parent dirs created
    async fn ensure_write_abs_path(parent: &Path, path: &str) -> Result<PathBuf> {
        let p = parent.join(path);

        let parent = p.parent().ok_or_else(|| {
            Error::new(
                ErrorKind::Unexpected,
                "path should have parent but not, it must be malformed",
            )
            .with_context("input", p.to_string_lossy())
        })?;

        tokio::fs::create_dir_all(parent)
            .await
            .map_err(new_std_io_error)?;

        Ok(p)
    }
}

#[async_trait]
impl Accessor for FsBackend {
    fn info(&self) -> AccessorInfo {
        self.info.as_ref().clone()
    }

    async fn read(&self, path: &str, args: OpRead) -> Result<Bytes> {
        let p = self.abs_path(path);

        let mut f = tokio::fs::File::open(&p)
            .await
            .map_err(new_std_io_error)?;
        let meta = f.metadata().await.map_err(new_std_io_error)?;
        if meta.is_dir() {
            return Err(new_is_a_directory_error());
        }

        let range = args.range();
        if range.offset() > 0 {
            f.seek(SeekFrom::Start(range.offset()))
                .await
                .map_err(new_std_io_error)?;
        }

        let mut buf = Vec::new();
        f.take(range.size().unwrap_or(u64::MAX))
            .read_to_end(&mut buf)
            .await
            .map_err(new_std_io_error)?;

        Ok(Bytes::from(buf))
    }

    async fn write(&self, path: &str, _: OpWrite, bs: Bytes) -> Result<()> {
        let target_path = Self::ensure_write_abs_path(&self.root, path).await?;

        match &self.atomic_write_dir {
            Some(atomic_write_dir) => {
                let tmp_path =
                    Self::ensure_write_abs_path(atomic_write_dir, &tmp_file_of(path)).await?;

                tokio::fs::write(&tmp_path, bs)
                    .await
                    .map_err(new_std_io_error)?;
                tokio::fs::rename(&tmp_path, &target_path)
                    .await
                    .map_err(new_std_io_error)
            }
            None => tokio::fs::write(&target_path, bs)
                .await
                .map_err(new_std_io_error),
        }
    }

    async fn stat(&self, path: &str, _: OpStat) -> Result<Metadata> {
        let p = self.abs_path(path);

        let meta = tokio::fs::metadata(&p).await.map_err(new_std_io_error)?;
        if path.ends_with('/') && !meta.is_dir() {
            return Err(Error::new(
                ErrorKind::NotFound,
                "given path is not a directory",
            ));
        }

        Ok(new_metadata(&meta))
    }

    async fn delete(&self, path: &str, _: OpDelete) -> Result<()> {
        let p = self.abs_path(path);

        let meta = tokio::fs::metadata(&p).await;

        match meta {
            Ok(meta) => {
                if meta.is_dir() {
                    tokio::fs::remove_dir(&p).await.map_err(new_std_io_error)?;
                } else {
                    tokio::fs::remove_file(&p).await.map_err(new_std_io_error)?;
                }

                Ok(())
            }
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(err) => Err(new_std_io_error(err)),
        }
    }

    async fn list(&self, path: &str, args: OpList) -> Result<Vec<Entry>> {
        let (dir, name_prefix) = split_prefix(path);
        let rel_dir = if dir == "/" { "" } else { dir };

        let mut entries = Vec::new();
        let mut pending = vec![(rel_dir.to_string(), name_prefix)];

        while let Some((rel, filter)) = pending.pop() {
            let p = self.abs_path(&rel);

            match tokio::fs::metadata(&p).await {
                Ok(meta) if meta.is_dir() => {}
                Ok(_) => continue,
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => continue,
                Err(e) => return Err(new_std_io_error(e)),
            }

            let mut rd = tokio::fs::read_dir(&p).await.map_err(new_std_io_error)?;
            while let Some(de) = rd.next_entry().await.map_err(new_std_io_error)? {
                let name = de.file_name().to_string_lossy().to_string();
                if !name.starts_with(filter) {
                    continue;
                }

                let meta = de.metadata().await.map_err(new_std_io_error)?;
                let entry = new_entry(&rel, &name, &meta);
                if args.recursive() && meta.is_dir() {
                    pending.push((entry.path().to_string(), ""));
                }
                entries.push(entry);
            }
        }

        entries.sort_by(|a, b| a.path().cmp(b.path()));
        Ok(entries)
    }

    fn blocking_read(&self, path: &str, args: OpRead) -> Result<Bytes> {
        let p = self.abs_path(path);

        let mut f = std::fs::File::open(p).map_err(new_std_io_error)?;
        let meta = f.metadata().map_err(new_std_io_error)?;
        if meta.is_dir() {
            return Err(new_is_a_directory_error());
        }

        let range = args.range();
        if range.offset() > 0 {
            f.seek(SeekFrom::Start(range.offset()))
                .map_err(new_std_io_error)?;
        }

        let mut buf = Vec::new();
        f.take(range.size().unwrap_or(u64::MAX))
            .read_to_end(&mut buf)
            .map_err(new_std_io_error)?;

        Ok(Bytes::from(buf))
    }

    fn blocking_write(&self, path: &str, _: OpWrite, bs: Bytes) -> Result<()> {
        let target_path = Self::blocking_ensure_write_abs_path(&self.root, path)?;

        match &self.atomic_write_dir {
            Some(atomic_write_dir) => {
                let tmp_path =
                    Self::blocking_ensure_write_abs_path(atomic_write_dir, &tmp_file_of(path))?;

                std::fs::write(&tmp_path, bs).map_err(new_std_io_error)?;
                std::fs::rename(&tmp_path, &target_path).map_err(new_std_io_error)
            }
            None => std::fs::write(&target_path, bs).map_err(new_std_io_error),
        }
    }

    fn blocking_stat(&self, path: &str, _: OpStat) -> Result<Metadata> {
        let p = self.abs_path(path);

        let meta = std::fs::metadata(p).map_err(new_std_io_error)?;
        if path.ends_with('/') && !meta.is_dir() {
            return Err(Error::new(
                ErrorKind::NotFound,
                "given path is not a directory",
            ));
        }

        Ok(new_metadata(&meta))
    }

    fn blocking_delete(&self, path: &str, _: OpDelete) -> Result<()> {
        let p = self.abs_path(path);

        let meta = std::fs::metadata(&p);

        match meta {
            Ok(meta) => {
                if meta.is_dir() {
                    std::fs::remove_dir(&p).map_err(new_std_io_error)?;
                } else {
                    std::fs::remove_file(&p).map_err(new_std_io_error)?;
                }

                Ok(())
            }
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(err) => Err(new_std_io_error(err)),
        }
    }

    fn blocking_list(&self, path: &str, args: OpList) -> Result<Vec<Entry>> {
        let (dir, name_prefix) = split_prefix(path);
        let rel_dir = if dir == "/" { "" } else { dir };

        let mut entries = Vec::new();
        let mut pending = vec![(rel_dir.to_string(), name_prefix)];

        while let Some((rel, filter)) = pending.pop() {
            let p = self.abs_path(&rel);

            match std::fs::metadata(&p) {
                Ok(meta) if meta.is_dir() => {}
                Ok(_) => continue,
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => continue,
                Err(e) => return Err(new_std_io_error(e)),
            }

            for de in std::fs::read_dir(&p).map_err(new_std_io_error)? {
                let de = de.map_err(new_std_io_error)?;
                let name = de.file_name().to_string_lossy().to_string();
                if !name.starts_with(filter) {
                    continue;
                }

                let meta = de.metadata().map_err(new_std_io_error)?;
                let entry = new_entry(&rel, &name, &meta);
                if args.recursive() && meta.is_dir() {
                    pending.push((entry.path().to_string(), ""));
                }
                entries.push(entry);
            }
        }

        entries.sort_by(|a, b| a.path().cmp(b.path()));
        Ok(entries)
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn tmp_root() -> PathBuf {
        std::env::temp_dir().join(format!("unidal-fs-{}", Uuid::new_v4()))
    }

    fn new_backend(root: &Path) -> FsBackend {
        FsBuilder::default()
            .root(&root.to_string_lossy())
            .build_backend()
            .unwrap()
    }

    #[test]
    fn test_build_without_root() {
        let err = FsBuilder::default().build_backend().unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ConfigInvalid);
    }

    #[test]
    fn test_build_with_file_as_root() {
        let root = tmp_root();
        std::fs::write(&root, "not a dir").unwrap();

        let err = FsBuilder::default()
            .root(&root.to_string_lossy())
            .build_backend()
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ConfigInvalid);

        std::fs::remove_file(&root).unwrap();
    }

    #[test]
    fn test_build_creates_root() {
        let root = tmp_root();
        assert!(!root.exists());

        let acc = new_backend(&root);
        assert!(root.is_dir());

        let info = acc.info();
        assert_eq!(info.scheme(), Scheme::Fs);
        assert!(info.capability().blocking);
        assert_eq!(
            info.config().get("root").map(String::as_str),
            Some(root.canonicalize().unwrap().to_string_lossy().as_ref())
        );

        std::fs::remove_dir_all(&root).unwrap();
    }

    #[tokio::test]
    async fn test_range_read() {
        let root = tmp_root();
        let acc = new_backend(&root);

        acc.write("dir/a.txt", OpWrite::new(), Bytes::from("Hello, World!"))
            .await
            .unwrap();

        let bs = acc
            .read("dir/a.txt", OpRead::new().with_range((7u64..12).into()))
            .await
            .unwrap();
        assert_eq!(bs, Bytes::from("World"));

        let bs = acc
            .blocking_read("dir/a.txt", OpRead::new().with_range((7u64..).into()))
            .unwrap();
        assert_eq!(bs, Bytes::from("World!"));

        let err = acc.read("dir", OpRead::new()).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::IsADirectory);

        std::fs::remove_dir_all(&root).unwrap();
    }

    #[tokio::test]
    async fn test_atomic_write() {
        let root = tmp_root();
        let tmp = tmp_root();
        let acc = FsBuilder::default()
            .root(&root.to_string_lossy())
            .atomic_write_dir(&tmp.to_string_lossy())
            .build_backend()
            .unwrap();

        acc.write("a.txt", OpWrite::new(), Bytes::from("hi"))
            .await
            .unwrap();
        acc.blocking_write("b.txt", OpWrite::new(), Bytes::from("ho"))
            .unwrap();

        assert_eq!(std::fs::read(root.join("a.txt")).unwrap(), b"hi");
        assert_eq!(std::fs::read(root.join("b.txt")).unwrap(), b"ho");
        assert_eq!(std::fs::read_dir(&tmp).unwrap().count(), 0);

        std::fs::remove_dir_all(&root).unwrap();
        std::fs::remove_dir_all(&tmp).unwrap();
    }

    #[tokio::test]
    async fn test_stat_dir_path_on_file() {
        let root = tmp_root();
        let acc = new_backend(&root);

        acc.blocking_write("a.txt", OpWrite::new(), Bytes::from("hi"))
            .unwrap();

        let meta = acc.stat("a.txt", OpStat::new()).await.unwrap();
        assert!(meta.is_file());
        assert_eq!(meta.content_length(), 2);
        assert!(meta.last_modified().is_some());

        let err = acc.stat("a.txt/", OpStat::new()).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);

        let meta = acc.blocking_stat("/", OpStat::new()).unwrap();
        assert!(meta.is_dir());

        std::fs::remove_dir_all(&root).unwrap();
    }

    #[tokio::test]
    async fn test_list_with_prefix() {
        let root = tmp_root();
        let acc = new_backend(&root);

        for p in ["ab.txt", "ac.txt", "abc/x.txt", "abc/y/z.txt", "b.txt"] {
            acc.blocking_write(p, OpWrite::new(), Bytes::from("x"))
                .unwrap();
        }

        let paths = |entries: Vec<Entry>| -> Vec<String> {
            entries.into_iter().map(|e| e.path().to_string()).collect()
        };

        let got = acc.list("/", OpList::new()).await.unwrap();
        assert_eq!(paths(got), vec!["ab.txt", "abc/", "ac.txt", "b.txt"]);

        let got = acc.list("ab", OpList::new()).await.unwrap();
        assert_eq!(paths(got), vec!["ab.txt", "abc/"]);

        let got = acc
            .blocking_list("abc/", OpList::new().with_recursive(true))
            .unwrap();
        assert_eq!(paths(got), vec!["abc/x.txt", "abc/y/", "abc/y/z.txt"]);

        let got = acc.list("missing/", OpList::new()).await.unwrap();
        assert!(got.is_empty());

        let got = acc.blocking_list("b.txt/", OpList::new()).unwrap();
        assert!(got.is_empty());

        std::fs::remove_dir_all(&root).unwrap();
    }

    #[tokio::test]
    async fn test_delete_is_idempotent() {
        let root = tmp_root();
        let acc = new_backend(&root);

        acc.write("a.txt", OpWrite::new(), Bytes::from("x"))
            .await
            .unwrap();
        acc.delete("a.txt", OpDelete::new()).await.unwrap();
        acc.delete("a.txt", OpDelete::new()).await.unwrap();
        acc.blocking_delete("a.txt", OpDelete::new()).unwrap();

        let err = acc.stat("a.txt", OpStat::new()).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);

        std::fs::remove_dir_all(&root).unwrap();
    }
}

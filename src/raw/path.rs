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

use crate::*;

/// build_abs_path will build an absolute path with root.
///
/// # Rules
///
/// - Input root MUST be the format like `/abc/def/`
/// - Output will be the format like `path/to/root/path`.
pub fn build_abs_path(root: &str, path: &str) -> String {
    debug_assert!(root.starts_with('/'), "root must start with /");
    debug_assert!(root.ends_with('/'), "root must end with /");

    let p = root[1..].to_string();

    if path == "/" {
        p
    } else {
        debug_assert!(!path.starts_with('/'), "path must not start with /");
        p + path
    }
}

/// Make sure all operation are constructed by normalized path:
///
/// - Path endswith `/` means it's a dir path.
/// - Otherwise, it's a file path.
///
/// # Normalize Rules
///
/// - All whitespace will be trimmed: ` abc/def ` => `abc/def`
/// - All leading / will be trimmed: `///abc` => `abc`
/// - Internal // will be replaced by /: `abc///def` => `abc/def`
/// - Empty path will be `/`: `` => `/`
pub fn normalize_path(path: &str) -> String {
    let path = path.trim().trim_start_matches('/');

    if path.is_empty() {
        return "/".to_string();
    }

    let has_trailing = path.ends_with('/');

    let mut p = path
        .split('/')
        .filter(|v| !v.is_empty())
        .collect::<Vec<&str>>()
        .join("/");

    if has_trailing {
        p.push('/');
    }

    p
}

/// Make sure root is normalized to style like `/abc/def/`.
///
/// Empty root will be `/`.
pub fn normalize_root(v: &str) -> String {
    let mut v = v
        .split('/')
        .filter(|v| !v.is_empty())
        .collect::<Vec<&str>>()
        .join("/");
    if !v.starts_with('/') {
        v.insert(0, '/');
    }
    if !v.ends_with('/') {
        v.push('/')
    }
    v
}

/// Get basename from path.
///
/// - `abc/def` => `def`
/// - `abc/def/` => `def/`
pub fn get_basename(path: &str) -> &str {
    if path == "/" {
        return "/";
    }

    let trimmed = path.strip_suffix('/').unwrap_or(path);
    match trimmed.rfind('/') {
        Some(idx) => &path[idx + 1..],
        None => path,
    }
}

/// Split a list prefix into the directory to list and the name prefix
/// every child must start with.
///
/// - `dir/` => (`dir/`, ``)
/// - `dir/ab` => (`dir/`, `ab`)
/// - `ab` => (`/`, `ab`)
/// - `/` => (`/`, ``)
pub fn split_prefix(prefix: &str) -> (&str, &str) {
    if prefix == "/" || prefix.ends_with('/') {
        return (prefix, "");
    }

    match prefix.rfind('/') {
        Some(idx) => (&prefix[..idx + 1], &prefix[idx + 1..]),
        None => ("/", prefix),
    }
}

/// Check that a path points to a file, returning `IsADirectory` otherwise.
pub fn ensure_file_path(path: &str) -> Result<()> {
    if path.ends_with('/') {
        return Err(Error::new(
            ErrorKind::IsADirectory,
            "the path is a directory, expect a file path",
        )
        .with_context("path", path));
    }
    Ok(())
}

/// Check that a normalized path stays under the root, returning
/// `PermissionDenied` if any component is `..`.
pub fn ensure_within_root(path: &str) -> Result<()> {
    if path.split('/').any(|v| v == "..") {
        return Err(Error::new(
            ErrorKind::PermissionDenied,
            "the path escapes the root",
        )
        .with_context("path", path));
    }
    Ok(())
}

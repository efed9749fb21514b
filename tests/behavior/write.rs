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

use anyhow::Result;
use bytes::Bytes;
use log::debug;
use unidal::EntryMode;
use unidal::ErrorKind;
use unidal::Operator;

use super::utils::*;

/// Test services that meet the following capability:
///
/// - can_read
/// - can_write
macro_rules! behavior_write_test {
    ($service:ident, $($(#[$meta:meta])* $test:ident),*,) => {
        paste::item! {
            mod [<services_ $service:lower _write>] {
                $(
                    #[tokio::test]
                    $(
                        #[$meta]
                    )*
                    async fn [< $test >]() -> anyhow::Result<()> {
                        let op = $crate::utils::init_service::<unidal::services::$service>();
                        match op {
                            Some(op) if op.info().full_capability().read && op.info().full_capability().write => $crate::write::$test(op).await,
                            Some(_) => {
                                log::warn!("service {} doesn't support write, ignored", unidal::Scheme::$service);
                                Ok(())
                            },
                            None => {
                                log::warn!("service {} not initiated, ignored", unidal::Scheme::$service);
                                Ok(())
                            }
                        }
                    }
                )*
            }
        }
    };
}

#[macro_export]
macro_rules! behavior_write_tests {
     ($($service:ident),*) => {
        $(
            behavior_write_test!(
                $service,

                test_write,
                test_write_overwrite,
                test_write_empty,
                test_write_nested,
                test_write_with_dir_path,
                test_write_outside_root,
                test_write_with_special_chars,
                test_stat,
                test_stat_dir,
                test_stat_not_cleaned_path,
                test_stat_not_exist,
                test_read_full,
                test_read_range,
                test_read_large_range,
                test_read_not_exist,
                test_read_with_dir_path,
                test_delete,
                test_delete_not_existing,
                test_error_context,
            );
        )*
    };
}

/// Write a single file and test with stat.
pub async fn test_write(op: Operator) -> Result<()> {
    let path = uuid::Uuid::new_v4().to_string();
    debug!("Generate a random file: {}", &path);
    let (content, size) = gen_bytes();

    op.write(&path, content).await?;

    let meta = op.stat(&path).await.expect("stat must succeed");
    assert_eq!(meta.content_length(), size as u64);

    op.delete(&path).await.expect("delete must succeed");
    Ok(())
}

/// Write on an existing file should replace its content.
pub async fn test_write_overwrite(op: Operator) -> Result<()> {
    let path = uuid::Uuid::new_v4().to_string();

    op.write(&path, "first write").await?;
    op.write(&path, "second").await?;

    let bs = op.read(&path).await?;
    assert_eq!(bs, Bytes::from("second"));

    op.delete(&path).await.expect("delete must succeed");
    Ok(())
}

/// Write an empty file should succeed.
pub async fn test_write_empty(op: Operator) -> Result<()> {
    let path = uuid::Uuid::new_v4().to_string();

    op.write(&path, Bytes::new()).await?;

    let meta = op.stat(&path).await?;
    assert_eq!(meta.mode(), EntryMode::FILE);
    assert_eq!(meta.content_length(), 0);
    assert!(op.read(&path).await?.is_empty());

    op.delete(&path).await.expect("delete must succeed");
    Ok(())
}

/// Write into a nested path should create parents.
pub async fn test_write_nested(op: Operator) -> Result<()> {
    let dir = uuid::Uuid::new_v4().to_string();
    let path = format!("{dir}/a/b/c.txt");

    op.write(&path, "nested").await?;

    assert_eq!(op.read(&path).await?, Bytes::from("nested"));
    assert_eq!(op.stat(&format!("{dir}/a/")).await?.mode(), EntryMode::DIR);

    op.delete(&path).await.expect("delete must succeed");
    Ok(())
}

/// Write file with dir path should return an error
pub async fn test_write_with_dir_path(op: Operator) -> Result<()> {
    let path = format!("{}/", uuid::Uuid::new_v4());
    let (content, _) = gen_bytes();

    let result = op.write(&path, content).await;
    assert!(result.is_err());
    assert_eq!(result.unwrap_err().kind(), ErrorKind::IsADirectory);

    Ok(())
}

/// Paths climbing out of root must be rejected before touching storage.
pub async fn test_write_outside_root(op: Operator) -> Result<()> {
    let name = uuid::Uuid::new_v4().to_string();
    let (content, _) = gen_bytes();

    for path in [format!("../{name}"), format!("dir/../../{name}")] {
        let err = op.write(&path, content.clone()).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::PermissionDenied, "{path}");

        let err = op.read(&path).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::PermissionDenied, "{path}");
    }

    let err = op.list("../").await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::PermissionDenied);

    Ok(())
}

/// Write a single file with special chars should succeed.
pub async fn test_write_with_special_chars(op: Operator) -> Result<()> {
    let path = format!("{} !@#$%^&()_+-=;',.txt", uuid::Uuid::new_v4());
    debug!("Generate a random file: {}", &path);
    let (content, size) = gen_bytes();

    op.write(&path, content).await?;

    let meta = op.stat(&path).await.expect("stat must succeed");
    assert_eq!(meta.content_length(), size as u64);

    op.delete(&path).await.expect("delete must succeed");
    Ok(())
}

/// Stat existing file should return metadata
pub async fn test_stat(op: Operator) -> Result<()> {
    let path = uuid::Uuid::new_v4().to_string();
    debug!("Generate a random file: {}", &path);
    let (content, size) = gen_bytes();

    op.write(&path, content).await.expect("write must succeed");

    let meta = op.stat(&path).await?;
    assert_eq!(meta.mode(), EntryMode::FILE);
    assert_eq!(meta.content_length(), size as u64);
    assert!(meta.last_modified().is_some());

    op.delete(&path).await.expect("delete must succeed");
    Ok(())
}

/// Stat a dir which contains files should return DIR.
pub async fn test_stat_dir(op: Operator) -> Result<()> {
    let dir = format!("{}/", uuid::Uuid::new_v4());
    let path = format!("{dir}file");

    op.write(&path, "x").await.expect("write must succeed");

    let meta = op.stat(&dir).await?;
    assert_eq!(meta.mode(), EntryMode::DIR);

    op.delete(&path).await.expect("delete must succeed");
    Ok(())
}

/// Stat not cleaned path should also succeed.
pub async fn test_stat_not_cleaned_path(op: Operator) -> Result<()> {
    let path = uuid::Uuid::new_v4().to_string();
    debug!("Generate a random file: {}", &path);
    let (content, size) = gen_bytes();

    op.write(&path, content).await.expect("write must succeed");

    let meta = op.stat(&format!("//{}", &path)).await?;
    assert_eq!(meta.mode(), EntryMode::FILE);
    assert_eq!(meta.content_length(), size as u64);

    op.delete(&path).await.expect("delete must succeed");
    Ok(())
}

/// Stat not exist file should return NotFound
pub async fn test_stat_not_exist(op: Operator) -> Result<()> {
    let path = uuid::Uuid::new_v4().to_string();

    let meta = op.stat(&path).await;
    assert!(meta.is_err());
    assert_eq!(meta.unwrap_err().kind(), ErrorKind::NotFound);
    assert!(!op.is_exist(&path).await?);

    Ok(())
}

/// Read full content should match.
pub async fn test_read_full(op: Operator) -> Result<()> {
    let path = uuid::Uuid::new_v4().to_string();
    debug!("Generate a random file: {}", &path);
    let (content, size) = gen_bytes();

    op.write(&path, content.clone())
        .await
        .expect("write must succeed");

    let bs = op.read(&path).await?;
    assert_eq!(size, bs.len(), "read size");
    assert!(bs == content, "read content");

    op.delete(&path).await.expect("delete must succeed");
    Ok(())
}

/// Read range content should match.
pub async fn test_read_range(op: Operator) -> Result<()> {
    let path = uuid::Uuid::new_v4().to_string();
    debug!("Generate a random file: {}", &path);
    let (content, size) = gen_bytes();
    let (offset, length) = gen_offset_length(size);

    op.write(&path, content.clone())
        .await
        .expect("write must succeed");

    let bs = op.range_read(&path, offset..offset + length).await?;
    assert_eq!(bs.len() as u64, length, "read size");
    assert!(
        bs[..] == content[offset as usize..(offset + length) as usize],
        "read content"
    );

    let bs = op.range_read(&path, offset..).await?;
    assert!(bs[..] == content[offset as usize..], "read tail");

    op.delete(&path).await.expect("delete must succeed");
    Ok(())
}

/// Read large range content should match.
pub async fn test_read_large_range(op: Operator) -> Result<()> {
    let path = uuid::Uuid::new_v4().to_string();
    debug!("Generate a random file: {}", &path);
    let (content, size) = gen_bytes();
    let (offset, _) = gen_offset_length(size);

    op.write(&path, content.clone())
        .await
        .expect("write must succeed");

    let bs = op.range_read(&path, offset..u32::MAX as u64).await?;
    assert_eq!(
        bs.len() as u64,
        size as u64 - offset,
        "read size with large range"
    );
    assert!(bs[..] == content[offset as usize..], "read content");

    op.delete(&path).await.expect("delete must succeed");
    Ok(())
}

/// Read not exist file should return NotFound
pub async fn test_read_not_exist(op: Operator) -> Result<()> {
    let path = uuid::Uuid::new_v4().to_string();

    let bs = op.read(&path).await;
    assert!(bs.is_err());
    assert_eq!(bs.unwrap_err().kind(), ErrorKind::NotFound);

    Ok(())
}

/// Read with dir path should return an error.
pub async fn test_read_with_dir_path(op: Operator) -> Result<()> {
    let path = format!("{}/", uuid::Uuid::new_v4());

    let result = op.read(&path).await;
    assert!(result.is_err());
    assert_eq!(result.unwrap_err().kind(), ErrorKind::IsADirectory);

    Ok(())
}

/// Delete existing file should succeed.
pub async fn test_delete(op: Operator) -> Result<()> {
    let path = uuid::Uuid::new_v4().to_string();
    debug!("Generate a random file: {}", &path);
    let (content, _) = gen_bytes();

    op.write(&path, content).await.expect("write must succeed");

    op.delete(&path).await?;

    // Stat it again to check.
    assert!(!op.is_exist(&path).await?);

    Ok(())
}

/// Delete not existing file should also succeed.
pub async fn test_delete_not_existing(op: Operator) -> Result<()> {
    let path = uuid::Uuid::new_v4().to_string();

    op.delete(&path).await?;
    op.delete(&path).await?;

    Ok(())
}

/// Errors should carry the operation, service and path.
pub async fn test_error_context(op: Operator) -> Result<()> {
    let path = uuid::Uuid::new_v4().to_string();

    let err = op.read(&path).await.unwrap_err();
    assert_eq!(err.operation(), "read");
    assert_eq!(err.context("service"), Some(op.scheme().into_static()));
    assert_eq!(err.context("path"), Some(path.as_str()));
    assert!(!err.is_temporary());

    Ok(())
}

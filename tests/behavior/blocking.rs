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
/// - can_list
/// - can_blocking
macro_rules! behavior_blocking_test {
    ($service:ident, $($(#[$meta:meta])* $test:ident),*,) => {
        paste::item! {
            mod [<services_ $service:lower _blocking>] {
                $(
                    #[test]
                    $(
                        #[$meta]
                    )*
                    fn [< $test >]() -> anyhow::Result<()> {
                        let op = $crate::utils::init_service::<unidal::services::$service>();
                        match op {
                            Some(op) if op.info().full_capability().blocking => $crate::blocking::$test(op),
                            Some(_) => {
                                log::warn!("service {} doesn't support blocking, ignored", unidal::Scheme::$service);
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
macro_rules! behavior_blocking_tests {
     ($($service:ident),*) => {
        $(
            behavior_blocking_test!(
                $service,

                test_blocking_write_and_read,
                test_blocking_range_read,
                test_blocking_stat_not_exist,
                test_blocking_read_with_dir_path,
                test_blocking_delete,
                test_blocking_list_dir,
                test_blocking_scan,
            );
        )*
    };
}

/// Write then read a file in blocking way.
pub fn test_blocking_write_and_read(op: Operator) -> Result<()> {
    let path = uuid::Uuid::new_v4().to_string();
    debug!("Generate a random file: {}", &path);
    let (content, size) = gen_bytes();

    op.blocking_write(&path, content.clone())?;

    let meta = op.blocking_stat(&path)?;
    assert_eq!(meta.mode(), EntryMode::FILE);
    assert_eq!(meta.content_length(), size as u64);

    let bs = op.blocking_read(&path)?;
    assert!(bs == content, "read content");

    op.blocking_delete(&path).expect("delete must succeed");
    Ok(())
}

/// Read range content should match.
pub fn test_blocking_range_read(op: Operator) -> Result<()> {
    let path = uuid::Uuid::new_v4().to_string();
    let (content, size) = gen_bytes();
    let (offset, length) = gen_offset_length(size);

    op.blocking_write(&path, content.clone())?;

    let bs = op.blocking_range_read(&path, offset..offset + length)?;
    assert_eq!(bs.len() as u64, length, "read size");
    assert!(
        bs[..] == content[offset as usize..(offset + length) as usize],
        "read content"
    );

    op.blocking_delete(&path).expect("delete must succeed");
    Ok(())
}

/// Stat not exist file should return NotFound
pub fn test_blocking_stat_not_exist(op: Operator) -> Result<()> {
    let path = uuid::Uuid::new_v4().to_string();

    let err = op.blocking_stat(&path).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);
    assert_eq!(err.operation(), "blocking_stat");
    assert!(!op.blocking_is_exist(&path)?);

    Ok(())
}

/// Read with dir path should return an error.
pub fn test_blocking_read_with_dir_path(op: Operator) -> Result<()> {
    let path = format!("{}/", uuid::Uuid::new_v4());

    let err = op.blocking_read(&path).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::IsADirectory);

    let err = op.blocking_write(&path, "x").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::IsADirectory);

    Ok(())
}

/// Delete existing file and not existing file should both succeed.
pub fn test_blocking_delete(op: Operator) -> Result<()> {
    let path = uuid::Uuid::new_v4().to_string();

    op.blocking_write(&path, Bytes::from("delete me"))?;
    op.blocking_delete(&path)?;
    assert!(!op.blocking_is_exist(&path)?);

    op.blocking_delete(&path)?;
    Ok(())
}

/// List dir should return newly created file.
pub fn test_blocking_list_dir(op: Operator) -> Result<()> {
    let dir = format!("{}/", uuid::Uuid::new_v4());
    let path = format!("{dir}{}", uuid::Uuid::new_v4());

    op.blocking_write(&path, "list")?;

    let entries = op.blocking_list(&dir)?;
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].path(), path);
    assert_eq!(entries[0].metadata().mode(), EntryMode::FILE);

    op.blocking_delete(&path).expect("delete must succeed");
    Ok(())
}

/// Scan should go into nested dirs.
pub fn test_blocking_scan(op: Operator) -> Result<()> {
    let dir = format!("{}/", uuid::Uuid::new_v4());
    let nested = format!("{dir}a/b/c");

    op.blocking_write(&nested, "scan")?;

    let paths = op
        .blocking_scan(&dir)?
        .into_iter()
        .map(|e| e.path().to_string())
        .collect::<Vec<_>>();
    assert_eq!(
        paths,
        vec![format!("{dir}a/"), format!("{dir}a/b/"), nested.clone()]
    );

    op.blocking_delete(&nested).expect("delete must succeed");
    Ok(())
}

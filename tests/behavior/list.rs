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

use anyhow::Result;
use log::debug;
use unidal::EntryMode;
use unidal::Operator;

use super::utils::*;

/// Test services that meet the following capability:
///
/// - can_read
/// - can_write
/// - can_list
macro_rules! behavior_list_test {
    ($service:ident, $($(#[$meta:meta])* $test:ident),*,) => {
        paste::item! {
            mod [<services_ $service:lower _list>] {
                $(
                    #[tokio::test]
                    $(
                        #[$meta]
                    )*
                    async fn [< $test >]() -> anyhow::Result<()> {
                        let op = $crate::utils::init_service::<unidal::services::$service>();
                        match op {
                            Some(op) if op.info().full_capability().write && op.info().full_capability().list => $crate::list::$test(op).await,
                            Some(_) => {
                                log::warn!("service {} doesn't support list, ignored", unidal::Scheme::$service);
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
macro_rules! behavior_list_tests {
     ($($service:ident),*) => {
        $(
            behavior_list_test!(
                $service,

                test_list_dir,
                test_list_not_exist_dir,
                test_list_sub_dir,
                test_list_with_prefix,
                test_scan_nested_dir,
            );
        )*
    };
}

/// List dir should return newly created file.
pub async fn test_list_dir(op: Operator) -> Result<()> {
    let dir = format!("{}/", uuid::Uuid::new_v4());
    let path = format!("{dir}{}", uuid::Uuid::new_v4());
    debug!("Generate a random file: {}", &path);
    let (content, size) = gen_bytes();

    op.write(&path, content).await.expect("write must succeed");

    let entries = op.list(&dir).await?;
    assert_eq!(entries.len(), 1);
    let entry = &entries[0];
    assert_eq!(entry.path(), path);
    assert_eq!(entry.metadata().mode(), EntryMode::FILE);
    assert_eq!(entry.metadata().content_length(), size as u64);

    op.delete(&path).await.expect("delete must succeed");
    Ok(())
}

/// List a dir that doesn't exist should return empty.
pub async fn test_list_not_exist_dir(op: Operator) -> Result<()> {
    let dir = format!("{}/", uuid::Uuid::new_v4());

    let entries = op.list(&dir).await?;
    assert!(entries.is_empty());

    Ok(())
}

/// List dir should return sub dirs without going into them.
pub async fn test_list_sub_dir(op: Operator) -> Result<()> {
    let dir = format!("{}/", uuid::Uuid::new_v4());
    let file = format!("{dir}file");
    let nested = format!("{dir}sub/nested");

    op.write(&file, "a").await.expect("write must succeed");
    op.write(&nested, "b").await.expect("write must succeed");

    let entries = op
        .list(&dir)
        .await?
        .into_iter()
        .map(|e| (e.path().to_string(), e.metadata().mode()))
        .collect::<Vec<_>>();
    assert_eq!(
        entries,
        vec![
            (file.clone(), EntryMode::FILE),
            (format!("{dir}sub/"), EntryMode::DIR),
        ]
    );

    op.delete(&file).await.expect("delete must succeed");
    op.delete(&nested).await.expect("delete must succeed");
    Ok(())
}

/// List with a name prefix should only return matched entries.
pub async fn test_list_with_prefix(op: Operator) -> Result<()> {
    let dir = format!("{}/", uuid::Uuid::new_v4());
    for name in ["apple", "apricot", "banana"] {
        op.write(&format!("{dir}{name}"), name)
            .await
            .expect("write must succeed");
    }

    let paths = op
        .list(&format!("{dir}ap"))
        .await?
        .into_iter()
        .map(|e| e.name().to_string())
        .collect::<Vec<_>>();
    assert_eq!(paths, vec!["apple", "apricot"]);

    Ok(())
}

/// Scan should go into every nested dir.
pub async fn test_scan_nested_dir(op: Operator) -> Result<()> {
    let dir = format!("{}/", uuid::Uuid::new_v4());
    let files = [
        format!("{dir}x"),
        format!("{dir}a/y"),
        format!("{dir}a/b/z"),
    ];
    for f in &files {
        op.write(f, "scan").await.expect("write must succeed");
    }

    let entries: HashMap<String, EntryMode> = op
        .scan(&dir)
        .await?
        .into_iter()
        .map(|e| (e.path().to_string(), e.metadata().mode()))
        .collect();

    assert_eq!(entries.len(), 5, "{entries:?}");
    for f in &files {
        assert_eq!(entries.get(f), Some(&EntryMode::FILE), "{f}");
    }
    assert_eq!(entries.get(&format!("{dir}a/")), Some(&EntryMode::DIR));
    assert_eq!(entries.get(&format!("{dir}a/b/")), Some(&EntryMode::DIR));

    Ok(())
}

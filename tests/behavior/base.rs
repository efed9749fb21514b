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
use unidal::EntryMode;
use unidal::Operator;

/// All services should pass this test.
macro_rules! behavior_base_test {
    ($service:ident, $($(#[$meta:meta])* $test:ident),*,) => {
        paste::item! {
            mod [<services_ $service:lower _base>] {
                $(
                    #[tokio::test]
                    $(
                        #[$meta]
                    )*
                    async fn [< $test >]() -> anyhow::Result<()> {
                        let op = $crate::utils::init_service::<unidal::services::$service>();
                        match op {
                            Some(op) => $crate::base::$test(op).await,
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
macro_rules! behavior_base_tests {
    ($($service:ident),*) => {
        $(
            behavior_base_test!(
                $service,

                test_check,
                test_info,
                test_stat_root,
            );
        )*
    };
}

/// Check should be OK.
pub async fn test_check(op: Operator) -> Result<()> {
    op.check().await.expect("operator check is ok");

    Ok(())
}

/// Info of the operator should carry the layers and the scheme.
pub async fn test_info(op: Operator) -> Result<()> {
    let info = op.info();

    assert_eq!(info.scheme(), op.scheme());
    assert!(info.root().ends_with('/'));
    assert_eq!(op.layers(), &["logging", "retry"]);
    assert_eq!(info.config().get("root").map(|s| s.is_empty()), Some(false));

    Ok(())
}

/// Root should be able to stat and returns DIR.
pub async fn test_stat_root(op: Operator) -> Result<()> {
    let meta = op.stat("").await?;
    assert_eq!(meta.mode(), EntryMode::DIR);

    let meta = op.stat("/").await?;
    assert_eq!(meta.mode(), EntryMode::DIR);

    Ok(())
}

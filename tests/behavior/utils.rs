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
use std::env;

use rand::prelude::*;
use unidal::layers::LoggingLayer;
use unidal::layers::RetryLayer;
use unidal::*;

/// Init a service with given builder.
///
/// - Config is read from env like `unidal_{scheme}_{key}`.
/// - Every call gets its own random root so tests never see each other's files.
/// - Returns `None` if `unidal_{scheme}_test` is `off`.
pub fn init_service<B: Builder>() -> Option<Operator> {
    let _ = env_logger::builder().is_test(true).try_init();

    let prefix = format!("unidal_{}_", B::SCHEME);

    let mut cfg = env::vars()
        .filter_map(|(k, v)| {
            k.to_lowercase()
                .strip_prefix(&prefix)
                .map(|k| (k.to_string(), v))
        })
        .collect::<HashMap<String, String>>();

    let turn_on_test = cfg.remove("test").unwrap_or_else(|| "on".to_string());
    if turn_on_test == "off" || turn_on_test == "false" {
        return None;
    }

    let base = cfg.get("root").cloned().unwrap_or_else(|| match B::SCHEME {
        Scheme::Fs => env::temp_dir().to_string_lossy().to_string(),
        _ => "/".to_string(),
    });
    let root = format!("{}/{}/", base.trim_end_matches('/'), uuid::Uuid::new_v4());
    cfg.insert("root".to_string(), root);

    let builder = B::Config::from_iter(cfg)
        .expect("config must be valid")
        .into_builder();

    let op = Operator::new(builder)
        .expect("must succeed")
        .layer(LoggingLayer::default())
        .expect("logging must apply")
        .layer(RetryLayer::new())
        .expect("retry must apply");

    Some(op)
}

pub fn gen_bytes() -> (Vec<u8>, usize) {
    let mut rng = thread_rng();

    let size = rng.gen_range(1..256 * 1024);
    let mut content = vec![0; size];
    rng.fill_bytes(&mut content);

    (content, size)
}

pub fn gen_offset_length(size: usize) -> (u64, u64) {
    let mut rng = thread_rng();

    // Make sure at least one byte is read.
    let offset = rng.gen_range(0..size.max(2) - 1);
    let length = rng.gen_range(1..(size - offset).max(2));

    (offset as u64, length as u64)
}

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

//! unidal is a unified data access layer: one [`Operator`] for every
//! storage service, with behavior stacked on top by [`layers`].
//!
//! - Services: All supported services could be found at [`services`].
//! - Layers: All builtin layer could be found at [`layers`].
//! - Raw: Traits and helpers for implementing services and layers live in [`raw`].
//!
//! # Quick Start
//!
//! ```no_run
//! use std::time::Duration;
//!
//! use unidal::layers::LoggingLayer;
//! use unidal::layers::RetryLayer;
//! use unidal::Operator;
//! use unidal::Result;
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     // Init an operator from the global registry.
//!     let op = Operator::via_iter("fs", [("root".to_string(), "/tmp".to_string())])?
//!         // Init with logging layer enabled.
//!         .layer(LoggingLayer::default())?
//!         // Retry temporary failures, the outermost layer sees calls first.
//!         .layer(RetryLayer::new().with_min_delay(Duration::from_millis(100)))?;
//!
//!     // Write data
//!     op.write("hello.txt", "Hello, World!").await?;
//!
//!     // Read data
//!     let bs = op.read("hello.txt").await?;
//!     assert_eq!(bs, "Hello, World!".as_bytes());
//!
//!     // Fetch metadata
//!     let meta = op.stat("hello.txt").await?;
//!     let length = meta.content_length();
//!
//!     // List the directory
//!     let entries = op.list("/").await?;
//!
//!     // Delete
//!     op.delete("hello.txt").await?;
//!
//!     Ok(())
//! }
//! ```

// Make sure all our public APIs have docs.
#![warn(missing_docs)]
// Deny unused qualifications.
#![deny(unused_qualifications)]

mod types;
pub use types::*;

pub mod layers;
pub mod raw;
pub mod services;

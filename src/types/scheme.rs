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

use std::fmt::Display;
use std::fmt::Formatter;
use std::str::FromStr;

use crate::Error;
use crate::ErrorKind;

/// Services that provided by unidal.
///
/// # Notes
///
/// - Scheme is `non_exhaustive`, new variant COULD be added at any time.
/// - New variant SHOULD be added in alphabet orders,
/// - Users MUST NOT relay on its order.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum Scheme {
    /// [fs][crate::services::Fs]: POSIX alike file system.
    Fs,
    /// [memory][crate::services::Memory]: In memory backend support.
    #[default]
    Memory,
    /// Custom that allow users to implement services outside of unidal.
    ///
    /// # NOTE
    ///
    /// - Custom must not overwrite any existing services name.
    /// - Custom must be lowed cases.
    Custom(&'static str),
}

impl Scheme {
    /// Convert self into static str.
    pub fn into_static(self) -> &'static str {
        self.into()
    }

    /// Normalize a user provided scheme name: trimmed and lower cased.
    pub fn normalize(s: &str) -> String {
        s.trim().to_lowercase()
    }
}

impl Display for Scheme {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.into_static())
    }
}

impl FromStr for Scheme {
    type Err = Error;

    /// Parse a built-in scheme.
    ///
    /// Custom schemes only live in [`crate::OperatorRegistry`], so unknown
    /// names are reported as [`ErrorKind::UnknownScheme`].
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match Scheme::normalize(s).as_str() {
            "fs" => Ok(Scheme::Fs),
            "memory" => Ok(Scheme::Memory),
            v => Err(Error::new(ErrorKind::UnknownScheme, "scheme is not built-in")
                .with_context("scheme", v)),
        }
    }
}

impl From<Scheme> for &'static str {
    fn from(v: Scheme) -> Self {
        match v {
            Scheme::Fs => "fs",
            Scheme::Memory => "memory",
            Scheme::Custom(v) => v,
        }
    }
}

impl From<Scheme> for String {
    fn from(v: Scheme) -> Self {
        v.into_static().to_string()
    }
}

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

use std::fmt::Debug;

/// Capability is used to describe what operations are supported
/// by current Operator.
///
/// Via capability, we can know:
///
/// - Whether current Operator supports read or not.
/// - Whether current Operator can be called in blocking mode.
///
/// Add fields of Capabilities with be public and can be accessed directly.
///
/// # Notes
///
/// Layers MUST forward the capability of the accessor they wrap and only
/// turn on the flags they add, like [`crate::layers::BlockingLayer`] does.
#[derive(Copy, Clone, Default, PartialEq, Eq)]
pub struct Capability {
    /// If operator supports stat , it will be true.
    pub stat: bool,
    /// If operator supports read , it will be true.
    pub read: bool,
    /// If operator supports read with range , it will be true.
    pub read_with_range: bool,
    /// If operator supports write , it will be true.
    pub write: bool,
    /// If operator supports delete , it will be true.
    pub delete: bool,
    /// If operator supports list , it will be true.
    pub list: bool,
    /// If operator supports list with recursive , it will be true.
    pub list_with_recursive: bool,

    /// If operator supports blocking , it will be true.
    pub blocking: bool,
}

impl Debug for Capability {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut s = vec![];

        if self.stat {
            s.push("Stat");
        }
        if self.read {
            s.push("Read");
        }
        if self.write {
            s.push("Write");
        }
        if self.delete {
            s.push("Delete");
        }
        if self.list {
            s.push("List");
        }
        if self.blocking {
            s.push("Blocking");
        }

        write!(f, "{{ {} }}", s.join(" | "))
    }
}

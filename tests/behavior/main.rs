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

#[macro_use]
mod base;
#[macro_use]
mod blocking;
#[macro_use]
mod list;
#[macro_use]
mod write;

mod utils;

/// Generate real test cases.
/// Update function list while changed.
macro_rules! behavior_tests {
    ($($service:ident),*) => {
        $(
            behavior_base_tests!($service);
            // can_read && can_write
            behavior_write_tests!($service);
            // can_read && can_write && can_list
            behavior_list_tests!($service);
            // can_read && can_write && can_list && can_blocking
            behavior_blocking_tests!($service);
        )*
    };
}

#[cfg(feature = "services-fs")]
behavior_tests!(Fs);
#[cfg(feature = "services-memory")]
behavior_tests!(Memory);

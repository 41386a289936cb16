// Copyright 2025 eraflo
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! sysinfo-based implementation of the EnvironmentProbe trait.

use std::sync::{Arc, Mutex};
use sysinfo::System;
use vitrine_core::capability::{EnvironmentProbe, HardwareHints, NetworkHints, Viewport};

const BYTES_PER_GIB: u64 = 1024 * 1024 * 1024;

/// A probe that answers hardware questions from the `sysinfo` crate.
///
/// Native hosts have no browser viewport, user agent, or network
/// information surface, so those signals report absent and capability
/// detection fails open on them.
pub struct SysinfoProbe {
    system: Arc<Mutex<System>>,
}

impl SysinfoProbe {
    /// Creates a probe with a refreshed system snapshot.
    pub fn new() -> Self {
        let mut system = System::new_all();
        system.refresh_all();
        log::debug!(
            "SysinfoProbe initialized: {} logical core(s), {} bytes of memory",
            system.cpus().len(),
            system.total_memory()
        );
        Self {
            system: Arc::new(Mutex::new(system)),
        }
    }

    /// Refreshes the underlying system data.
    pub fn refresh(&self) {
        if let Ok(mut system) = self.system.lock() {
            system.refresh_memory();
            system.refresh_cpu_all();
        }
    }
}

impl EnvironmentProbe for SysinfoProbe {
    fn viewport(&self) -> Option<Viewport> {
        None
    }

    fn user_agent(&self) -> Option<String> {
        None
    }

    fn network(&self) -> Option<NetworkHints> {
        None
    }

    fn hardware(&self) -> Option<HardwareHints> {
        let system = self.system.lock().ok()?;
        let logical_cores = match system.cpus().len() {
            0 => None,
            n => Some(n),
        };
        let approx_memory_gib = match system.total_memory() {
            0 => None,
            bytes => Some(bytes / BYTES_PER_GIB),
        };
        Some(HardwareHints {
            logical_cores,
            approx_memory_gib,
        })
    }
}

impl Default for SysinfoProbe {
    fn default() -> Self {
        Self::new()
    }
}

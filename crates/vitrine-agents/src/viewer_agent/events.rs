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

//! Events the orchestrator publishes to presentation collaborators.

use super::session::PathSet;
use std::path::PathBuf;

/// A notification from the loader to the viewer.
///
/// The viewer reacts by swapping the displayed model, updating the
/// progress indicator, or showing the static fallback image; nothing here
/// requires a response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ViewerEvent {
    /// The initial load's displayable percentage changed.
    Progress {
        /// The logical asset key being loaded.
        key: String,
        /// The new percentage, 0..=100.
        percent: u8,
    },
    /// An asset finished its initial load and can be displayed.
    ModelReady {
        /// The logical asset key.
        key: String,
        /// The resolved path now active.
        path: PathBuf,
        /// Which variant the path belongs to.
        path_set: PathSet,
    },
    /// The background upgrade completed; the full variant is now active.
    ModelUpgraded {
        /// The logical asset key.
        key: String,
        /// The full-quality path now active.
        path: PathBuf,
    },
    /// The initial load failed; the viewer should show its fallback image.
    InitialLoadFailed {
        /// The logical asset key.
        key: String,
        /// Diagnostic rendering of the failure.
        details: String,
    },
}

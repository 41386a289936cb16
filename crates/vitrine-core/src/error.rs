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

//! The error taxonomy for asset resolution and loading.

use std::fmt;
use std::path::PathBuf;

/// An error raised while resolving or loading a showcase asset.
///
/// `UnknownAsset` is a configuration error: the requested logical key has
/// no catalog entry at all, and the request fails immediately. `Fetch` and
/// `Decode` are runtime conditions: an initial load surfaces them to the
/// viewer as a fallback-display signal, a background upgrade abandons
/// silently. The core performs no automatic retries for any of them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AssetError {
    /// The logical asset key has no entry in the catalog.
    UnknownAsset {
        /// The key that was requested.
        key: String,
    },
    /// The resource bytes could not be transferred.
    Fetch {
        /// The resolved path that failed.
        path: PathBuf,
        /// The underlying transport error, rendered for diagnostics.
        details: String,
    },
    /// The transferred bytes could not be decoded into a model.
    Decode {
        /// The resolved path that failed.
        path: PathBuf,
        /// The underlying decoder error, rendered for diagnostics.
        details: String,
    },
}

impl fmt::Display for AssetError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AssetError::UnknownAsset { key } => {
                write!(f, "No catalog entry for asset key '{key}'")
            }
            AssetError::Fetch { path, details } => {
                write!(f, "Failed to fetch '{}': {details}", path.display())
            }
            AssetError::Decode { path, details } => {
                write!(f, "Failed to decode '{}': {details}", path.display())
            }
        }
    }
}

impl std::error::Error for AssetError {}

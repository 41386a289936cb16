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

//! The static asset catalog and tier-aware path resolution.
//!
//! The catalog maps each logical asset key (e.g. `"lion"`) to the resource
//! paths of its quality variants. It is configuration data: loaded once
//! from JSON at startup, immutable afterwards, and small (the showcase has
//! under a dozen entries).

use crate::error::AssetError;
use crate::quality::QualityTier;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Presentation hints carried alongside an entry for the viewer.
///
/// The core never interprets these; they ride along so the rendering
/// collaborator can place each model without its own lookup table.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DisplayHints {
    /// Uniform scale applied to the model.
    pub scale: f32,
    /// Scale override for narrow viewports.
    pub narrow_scale: f32,
    /// Vertical offset lifting the model onto the ground plane.
    pub lift: f32,
}

/// The quality variants cataloged for one logical asset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VariantSet {
    /// The reduced-quality resource, when one was produced for this asset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reduced: Option<PathBuf>,
    /// The full-quality resource. Every asset has one.
    pub full: PathBuf,
    /// Optional presentation hints for the viewer.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display: Option<DisplayHints>,
}

impl VariantSet {
    /// A variant set with only a full-quality resource.
    pub fn full_only(full: impl Into<PathBuf>) -> Self {
        Self {
            reduced: None,
            full: full.into(),
            display: None,
        }
    }

    /// A variant set with both a reduced and a full resource.
    pub fn tiered(reduced: impl Into<PathBuf>, full: impl Into<PathBuf>) -> Self {
        Self {
            reduced: Some(reduced.into()),
            full: full.into(),
            display: None,
        }
    }

    /// Attaches presentation hints.
    pub fn with_display(mut self, display: DisplayHints) -> Self {
        self.display = Some(display);
        self
    }
}

/// Mapping from logical asset keys to their cataloged variants.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AssetCatalog {
    entries: HashMap<String, VariantSet>,
}

impl AssetCatalog {
    /// Creates an empty catalog.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses a catalog from its JSON document.
    pub fn from_json_slice(bytes: &[u8]) -> Result<Self, serde_json::Error> {
        serde_json::from_slice(bytes)
    }

    /// Adds an entry, replacing any previous one under the same key.
    pub fn with_entry(mut self, key: impl Into<String>, variants: VariantSet) -> Self {
        self.entries.insert(key.into(), variants);
        self
    }

    /// Number of cataloged assets.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the catalog has no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterates over the cataloged keys.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    /// Looks up the variant set for `key`.
    pub fn variants(&self, key: &str) -> Option<&VariantSet> {
        self.entries.get(key)
    }

    /// Resolves `key` at `tier` to a concrete resource path.
    ///
    /// Reduced tiers receive the reduced variant when one is cataloged and
    /// fall back to the full variant otherwise; a missing optimized variant
    /// never fails the request. An unknown key is a configuration error.
    pub fn resolve(&self, key: &str, tier: QualityTier) -> Result<&Path, AssetError> {
        let variants = self.entries.get(key).ok_or_else(|| AssetError::UnknownAsset {
            key: key.to_string(),
        })?;

        let path: &Path = if tier.prefers_reduced_assets() {
            variants.reduced.as_deref().unwrap_or(&variants.full)
        } else {
            &variants.full
        };
        Ok(path)
    }

    /// Resolves `key` to its full-quality resource path.
    pub fn resolve_full(&self, key: &str) -> Result<&Path, AssetError> {
        self.resolve(key, QualityTier::High)
    }
}

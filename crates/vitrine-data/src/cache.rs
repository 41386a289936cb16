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

//! An append-only cache of decoded assets, keyed by resolved resource path.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use vitrine_core::asset::{Asset, AssetHandle};

/// In-memory cache mapping a resolved resource path to its decoded asset.
///
/// A given resource is decoded at most once: the first handle stored for a
/// path wins and later inserts for the same path are ignored, so handles
/// already given out never change identity. Retention is unbounded for the
/// process lifetime, which is acceptable because the catalog is small and
/// finite; this is not a general-purpose eviction problem.
///
/// The orchestrator is the only writer, and it writes only inside its own
/// callback turns, so no locking is layered on top.
#[derive(Debug, Default)]
pub struct AssetCache<A: Asset> {
    storage: HashMap<PathBuf, AssetHandle<A>>,
}

impl<A: Asset> AssetCache<A> {
    /// Creates an empty cache.
    pub fn new() -> Self {
        Self {
            storage: HashMap::new(),
        }
    }

    /// Stores `handle` under `path` unless the path is already cached.
    ///
    /// Returns the handle now cached for the path, which is the existing
    /// one when the insert lost to an earlier load of the same resource.
    pub fn insert(&mut self, path: PathBuf, handle: AssetHandle<A>) -> AssetHandle<A> {
        match self.storage.entry(path) {
            std::collections::hash_map::Entry::Occupied(entry) => {
                log::trace!("Cache already holds '{}'", entry.key().display());
                entry.get().clone()
            }
            std::collections::hash_map::Entry::Vacant(entry) => {
                log::debug!("Cached decoded asset for '{}'", entry.key().display());
                entry.insert(handle).clone()
            }
        }
    }

    /// Looks up the cached asset for `path`.
    pub fn get(&self, path: &Path) -> Option<AssetHandle<A>> {
        self.storage.get(path).cloned()
    }

    /// Whether `path` has already been loaded and decoded.
    pub fn contains(&self, path: &Path) -> bool {
        self.storage.contains_key(path)
    }

    /// Number of cached resources.
    pub fn len(&self) -> usize {
        self.storage.len()
    }

    /// Whether the cache is empty.
    pub fn is_empty(&self) -> bool {
        self.storage.is_empty()
    }
}

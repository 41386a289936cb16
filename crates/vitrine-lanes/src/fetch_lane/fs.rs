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

//! Filesystem-backed fetch lane.

use super::{FetchLane, FetchLaneError, TransferProgress, CHUNK_SIZE};
use std::fs::File;
use std::io::{ErrorKind, Read};
use std::path::{Path, PathBuf};

/// Serves resources from a directory on the local filesystem.
///
/// Catalog paths are site-absolute (`/lion.glb`); the leading separator is
/// interpreted relative to the lane's root directory.
#[derive(Debug, Clone)]
pub struct FsFetchLane {
    root: PathBuf,
}

impl FsFetchLane {
    /// Creates a lane rooted at `root`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn locate(&self, path: &Path) -> PathBuf {
        let relative = path.strip_prefix("/").unwrap_or(path);
        self.root.join(relative)
    }
}

impl FetchLane for FsFetchLane {
    fn fetch(
        &self,
        path: &Path,
        on_progress: &mut dyn FnMut(TransferProgress),
    ) -> Result<Vec<u8>, FetchLaneError> {
        let location = self.locate(path);
        log::debug!("Fetching '{}' from disk", location.display());

        let mut file = File::open(&location).map_err(|source| {
            if source.kind() == ErrorKind::NotFound {
                FetchLaneError::NotFound {
                    path: location.clone(),
                    source,
                }
            } else {
                FetchLaneError::Io {
                    path: location.clone(),
                    source,
                }
            }
        })?;

        let total = file.metadata().ok().map(|m| m.len());
        let mut bytes = Vec::with_capacity(total.unwrap_or(0) as usize);
        let mut chunk = [0u8; CHUNK_SIZE];

        loop {
            let read = file.read(&mut chunk).map_err(|source| FetchLaneError::Io {
                path: location.clone(),
                source,
            })?;
            if read == 0 {
                break;
            }
            bytes.extend_from_slice(&chunk[..read]);
            on_progress(TransferProgress {
                loaded: bytes.len() as u64,
                total,
            });
        }

        Ok(bytes)
    }
}

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

//! Transport lanes that move resource bytes and report transfer progress.

mod fs;
mod http;

pub use fs::FsFetchLane;
pub use http::HttpFetchLane;

use std::path::PathBuf;
use thiserror::Error;

/// Number of bytes a fetch lane reads per progress notification.
pub(crate) const CHUNK_SIZE: usize = 64 * 1024;

/// A snapshot of how far a transfer has come.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransferProgress {
    /// Bytes received so far.
    pub loaded: u64,
    /// Total size of the resource, when the transport reports one.
    pub total: Option<u64>,
}

/// An error raised by a fetch lane.
#[derive(Debug, Error)]
pub enum FetchLaneError {
    /// The resource does not exist at the resolved location.
    #[error("resource '{}' not found", path.display())]
    NotFound {
        /// The path that was requested.
        path: PathBuf,
        /// The underlying filesystem error.
        #[source]
        source: std::io::Error,
    },
    /// The resource exists but reading it failed partway.
    #[error("I/O error reading '{}'", path.display())]
    Io {
        /// The path that was being read.
        path: PathBuf,
        /// The underlying filesystem error.
        #[source]
        source: std::io::Error,
    },
    /// The HTTP request failed (transport error or non-success status).
    #[error("HTTP request for '{url}' failed: {details}")]
    Http {
        /// The full request URL.
        url: String,
        /// The transport's rendering of the failure.
        details: String,
    },
}

/// A transport that fetches the bytes of one resource.
///
/// Implementations are called from background worker threads and must not
/// assume any particular caller thread. `on_progress` is invoked after
/// every chunk; implementations that cannot determine a total report
/// `total: None` and the consumer holds its progress display instead of
/// guessing.
pub trait FetchLane: Send + Sync {
    /// Fetches the entire resource at `path`, reporting progress as it goes.
    fn fetch(
        &self,
        path: &std::path::Path,
        on_progress: &mut dyn FnMut(TransferProgress),
    ) -> Result<Vec<u8>, FetchLaneError>;
}

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

//! HTTP-backed fetch lane.

use super::{FetchLane, FetchLaneError, TransferProgress, CHUNK_SIZE};
use std::io::Read;
use std::path::Path;
use std::time::Duration;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Fetches resources from an HTTP origin, typically the site's CDN.
#[derive(Debug, Clone)]
pub struct HttpFetchLane {
    agent: ureq::Agent,
    base_url: String,
}

impl HttpFetchLane {
    /// Creates a lane for `base_url` with the default request timeout.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_timeout(base_url, REQUEST_TIMEOUT)
    }

    /// Creates a lane with an explicit global request timeout.
    pub fn with_timeout(base_url: impl Into<String>, timeout: Duration) -> Self {
        let agent: ureq::Agent = ureq::Agent::config_builder()
            .timeout_global(Some(timeout))
            .build()
            .into();
        Self {
            agent,
            base_url: base_url.into(),
        }
    }

    fn url_for(&self, path: &Path) -> String {
        let relative = path.strip_prefix("/").unwrap_or(path);
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            relative.to_string_lossy()
        )
    }
}

impl FetchLane for HttpFetchLane {
    fn fetch(
        &self,
        path: &Path,
        on_progress: &mut dyn FnMut(TransferProgress),
    ) -> Result<Vec<u8>, FetchLaneError> {
        let url = self.url_for(path);
        log::debug!("Fetching '{url}'");

        let response = self
            .agent
            .get(&url)
            .call()
            .map_err(|e| FetchLaneError::Http {
                url: url.clone(),
                details: e.to_string(),
            })?;

        let total = response
            .headers()
            .get("content-length")
            .and_then(|v| v.to_str().ok())
            .and_then(|s| s.parse::<u64>().ok());

        let mut reader = response.into_body().into_reader();
        let mut bytes = Vec::with_capacity(total.unwrap_or(0) as usize);
        let mut chunk = [0u8; CHUNK_SIZE];

        loop {
            let read = reader.read(&mut chunk).map_err(|e| FetchLaneError::Http {
                url: url.clone(),
                details: e.to_string(),
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

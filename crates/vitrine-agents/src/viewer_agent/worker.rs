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

//! Background fetch+decode jobs and the messages they send home.

use std::path::PathBuf;
use std::sync::Arc;
use vitrine_core::asset::Model3d;
use vitrine_core::error::AssetError;
use vitrine_lanes::{FetchLane, ModelDecodeLane, TransferProgress};

/// Why a job was spawned, which decides how its completion is applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum JobIntent {
    /// The session's first load; progress is user-visible.
    Initial,
    /// A background upgrade member; silent, best-effort.
    Upgrade,
}

/// A message from a worker thread back to the orchestrator.
#[derive(Debug)]
pub(crate) enum WorkerMessage {
    Progress {
        generation: u64,
        key: String,
        loaded: u64,
        total: Option<u64>,
    },
    Done {
        generation: u64,
        intent: JobIntent,
        key: String,
        path: PathBuf,
        result: Result<Model3d, AssetError>,
    },
}

/// Runs fetch+decode for one resource on a dedicated worker thread.
///
/// The job never aborts once started; a stale result is still worth
/// caching. If the thread cannot even be spawned, the failure is delivered
/// as a `Done` message so the session does not hang.
pub(crate) fn spawn_load_job(
    fetch_lane: Arc<dyn FetchLane>,
    decode_lane: Arc<dyn ModelDecodeLane>,
    tx: flume::Sender<WorkerMessage>,
    generation: u64,
    intent: JobIntent,
    key: String,
    path: PathBuf,
) {
    let thread_tx = tx.clone();
    let thread_key = key.clone();
    let thread_path = path.clone();

    let spawned = std::thread::Builder::new()
        .name(format!("vitrine-load-{key}"))
        .spawn(move || {
            let result = run_job(
                &*fetch_lane,
                &*decode_lane,
                &thread_tx,
                generation,
                intent,
                &thread_key,
                &thread_path,
            );
            let _ = thread_tx.send(WorkerMessage::Done {
                generation,
                intent,
                key: thread_key,
                path: thread_path,
                result,
            });
        });

    if let Err(e) = spawned {
        log::error!("Failed to spawn load worker for '{key}': {e}");
        let _ = tx.send(WorkerMessage::Done {
            generation,
            intent,
            key,
            path: path.clone(),
            result: Err(AssetError::Fetch {
                path,
                details: format!("worker thread spawn failed: {e}"),
            }),
        });
    }
}

fn run_job(
    fetch_lane: &dyn FetchLane,
    decode_lane: &dyn ModelDecodeLane,
    tx: &flume::Sender<WorkerMessage>,
    generation: u64,
    intent: JobIntent,
    key: &str,
    path: &std::path::Path,
) -> Result<Model3d, AssetError> {
    let report_progress = intent == JobIntent::Initial;
    let mut on_progress = |p: TransferProgress| {
        if report_progress {
            let _ = tx.send(WorkerMessage::Progress {
                generation,
                key: key.to_string(),
                loaded: p.loaded,
                total: p.total,
            });
        }
    };

    let bytes = fetch_lane
        .fetch(path, &mut on_progress)
        .map_err(|e| AssetError::Fetch {
            path: path.to_path_buf(),
            details: e.to_string(),
        })?;

    if report_progress {
        // Transports without a length header report no totals; this marks
        // the transfer portion complete either way before decode begins.
        let _ = tx.send(WorkerMessage::Progress {
            generation,
            key: key.to_string(),
            loaded: bytes.len() as u64,
            total: Some(bytes.len() as u64),
        });
    }

    let model = decode_lane
        .decode(&bytes)
        .map_err(|e| AssetError::Decode {
            path: path.to_path_buf(),
            details: e.to_string(),
        })?;

    Ok(model)
}

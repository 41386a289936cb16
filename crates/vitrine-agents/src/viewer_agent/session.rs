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

//! The per-display load session and its lifecycle states.

use std::path::PathBuf;
use std::time::Instant;
use vitrine_core::progress::ProgressReporter;

/// Which variant of the active asset the viewer is displaying.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PathSet {
    /// The reduced-quality variant.
    Reduced,
    /// The full-quality variant.
    Full,
}

/// The externally visible lifecycle of the agent's current session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewerState {
    /// No asset has been requested, or the last initial load failed.
    Idle,
    /// The first variant for the requested key is being fetched and decoded.
    InitialLoading,
    /// The reduced variant is displayed; the background upgrade has begun.
    UpgradePending,
    /// The reduced variant is displayed and no upgrade will complete.
    ReadyReduced,
    /// The full-quality variant is displayed. Terminal for the session.
    ReadyFull,
}

/// Internal phase of a live session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum SessionPhase {
    InitialLoading,
    Ready(PathSet),
    UpgradePending,
}

/// State owned exclusively by the orchestrator for one displayed asset.
///
/// Created per display request and discarded when the viewer switches to a
/// different logical asset; the progress value therefore resets only on a
/// key change. The generation stamp ties worker results back to the
/// session that spawned them; results from an abandoned session still
/// land in the shared cache but never touch a newer session's state.
#[derive(Debug)]
pub(crate) struct LoadSession {
    pub key: String,
    pub phase: SessionPhase,
    pub active_path: Option<PathBuf>,
    pub progress: ProgressReporter,
    pub generation: u64,
    pub last_activity: Instant,
}

impl LoadSession {
    pub fn new(key: impl Into<String>, generation: u64) -> Self {
        Self {
            key: key.into(),
            phase: SessionPhase::InitialLoading,
            active_path: None,
            progress: ProgressReporter::new(),
            generation,
            last_activity: Instant::now(),
        }
    }

    /// Records observable activity, resetting stall measurement.
    pub fn touch(&mut self) {
        self.last_activity = Instant::now();
    }

    pub fn viewer_state(&self) -> ViewerState {
        match self.phase {
            SessionPhase::InitialLoading => ViewerState::InitialLoading,
            SessionPhase::UpgradePending => ViewerState::UpgradePending,
            SessionPhase::Ready(PathSet::Reduced) => ViewerState::ReadyReduced,
            SessionPhase::Ready(PathSet::Full) => ViewerState::ReadyFull,
        }
    }
}

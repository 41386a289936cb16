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

//! End-to-end lifecycle tests for the progressive loader, driven through
//! scripted lanes so every network outcome is deterministic.

use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};
use vitrine_agents::{PathSet, UpgradeScope, ViewerAgent, ViewerEvent, ViewerState};
use vitrine_core::asset::Model3d;
use vitrine_core::capability::{EnvironmentProbe, HardwareHints, NetworkHints, Viewport};
use vitrine_core::catalog::{AssetCatalog, VariantSet};
use vitrine_core::quality::TierPolicy;
use vitrine_lanes::{FetchLane, FetchLaneError, FsFetchLane, ModelDecodeLane, TransferProgress};

const WAIT: Duration = Duration::from_secs(5);

// --- Test setup: probes, scripted lanes ---

/// Reports a save-data connection, which forces tier Low.
struct SaveDataProbe;
impl EnvironmentProbe for SaveDataProbe {
    fn viewport(&self) -> Option<Viewport> {
        Some(Viewport {
            width: 390,
            height: 844,
            device_pixel_ratio: 3.0,
        })
    }
    fn user_agent(&self) -> Option<String> {
        Some("Mozilla/5.0 (iPhone; CPU iPhone OS 17_0 like Mac OS X)".to_string())
    }
    fn network(&self) -> Option<NetworkHints> {
        Some(NetworkHints {
            effective_type: None,
            save_data: true,
        })
    }
    fn hardware(&self) -> Option<HardwareHints> {
        None
    }
}

/// Reports nothing, which fails open to tier High.
struct NoSignalProbe;
impl EnvironmentProbe for NoSignalProbe {
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
        None
    }
}

/// A fetch lane with scripted contents, scripted failures, and per-path
/// gates that hold a fetch until the test releases it.
#[derive(Default)]
struct ScriptedFetchLane {
    contents: HashMap<PathBuf, Vec<u8>>,
    failures: HashSet<PathBuf>,
    gates: Mutex<HashMap<PathBuf, flume::Receiver<()>>>,
}

impl ScriptedFetchLane {
    fn with_resource(mut self, path: &str, bytes: &[u8]) -> Self {
        self.contents.insert(PathBuf::from(path), bytes.to_vec());
        self
    }

    fn with_failure(mut self, path: &str) -> Self {
        self.failures.insert(PathBuf::from(path));
        self
    }

    /// Blocks fetches of `path` until the returned sender fires (or drops).
    fn gate(&self, path: &str) -> flume::Sender<()> {
        let (tx, rx) = flume::bounded(1);
        self.gates
            .lock()
            .expect("gate lock")
            .insert(PathBuf::from(path), rx);
        tx
    }
}

impl FetchLane for ScriptedFetchLane {
    fn fetch(
        &self,
        path: &Path,
        on_progress: &mut dyn FnMut(TransferProgress),
    ) -> Result<Vec<u8>, FetchLaneError> {
        let gate = self.gates.lock().expect("gate lock").get(path).cloned();
        if let Some(gate) = gate {
            let _ = gate.recv();
        }

        if self.failures.contains(path) {
            return Err(FetchLaneError::Http {
                url: path.display().to_string(),
                details: "scripted failure".to_string(),
            });
        }

        let bytes = self
            .contents
            .get(path)
            .cloned()
            .ok_or_else(|| FetchLaneError::NotFound {
                path: path.to_path_buf(),
                source: std::io::Error::new(std::io::ErrorKind::NotFound, "scripted"),
            })?;

        let total = Some(bytes.len() as u64);
        on_progress(TransferProgress {
            loaded: bytes.len() as u64 / 2,
            total,
        });
        on_progress(TransferProgress {
            loaded: bytes.len() as u64,
            total,
        });
        Ok(bytes)
    }
}

/// Accepts any payload that does not start with `bad`.
struct PrefixDecodeLane;
impl ModelDecodeLane for PrefixDecodeLane {
    fn decode(&self, bytes: &[u8]) -> Result<Model3d, Box<dyn std::error::Error + Send + Sync>> {
        if bytes.starts_with(b"bad") {
            return Err("scripted decode rejection".into());
        }
        Ok(Model3d {
            mesh_count: 1,
            primitive_count: 1,
            vertex_count: bytes.len(),
            triangle_count: bytes.len() / 3,
            bounds: None,
            source_bytes: bytes.len() as u64,
        })
    }
}

fn agent_with(
    catalog: AssetCatalog,
    probe: &dyn EnvironmentProbe,
    lane: ScriptedFetchLane,
) -> ViewerAgent {
    ViewerAgent::new(
        catalog,
        TierPolicy::default(),
        probe,
        Arc::new(lane),
        Arc::new(PrefixDecodeLane),
    )
}

/// Pumps the agent and drains its event bus until `pred` matches an event.
fn pump_until_event(
    agent: &mut ViewerAgent,
    events: &flume::Receiver<ViewerEvent>,
    collected: &mut Vec<ViewerEvent>,
    pred: impl Fn(&ViewerEvent) -> bool,
) {
    let deadline = Instant::now() + WAIT;
    loop {
        while let Ok(event) = events.try_recv() {
            let hit = pred(&event);
            collected.push(event);
            if hit {
                return;
            }
        }
        assert!(Instant::now() < deadline, "timed out waiting for event");
        agent.pump_blocking(Duration::from_millis(50));
    }
}

// --- Lifecycle tests ---

#[test]
fn low_tier_session_upgrades_to_full_atomically() {
    let catalog =
        AssetCatalog::new().with_entry("lion", VariantSet::tiered("/lion-mobile.glb", "/lion.glb"));
    let lane = ScriptedFetchLane::default()
        .with_resource("/lion-mobile.glb", b"reduced lion payload")
        .with_resource("/lion.glb", b"full lion payload, rather larger");
    let mut agent = agent_with(catalog, &SaveDataProbe, lane);
    let events = agent.events();
    let mut seen = Vec::new();

    agent.request("lion").expect("request failed");
    assert_eq!(agent.state(), ViewerState::InitialLoading);

    pump_until_event(&mut agent, &events, &mut seen, |e| {
        matches!(e, ViewerEvent::ModelReady { .. })
    });
    assert_eq!(
        agent.current_asset_path(),
        Some(Path::new("/lion-mobile.glb"))
    );
    assert_eq!(agent.progress_percent(), 100);

    pump_until_event(&mut agent, &events, &mut seen, |e| {
        matches!(e, ViewerEvent::ModelUpgraded { .. })
    });
    assert_eq!(agent.state(), ViewerState::ReadyFull);
    assert_eq!(agent.current_asset_path(), Some(Path::new("/lion.glb")));
    assert!(agent.current_model().is_some());

    // The reduced variant becomes ready exactly once, the upgrade fires
    // exactly once, and no mixed state shows in between.
    let readies: Vec<_> = seen
        .iter()
        .filter(|e| matches!(e, ViewerEvent::ModelReady { .. }))
        .collect();
    assert_eq!(readies.len(), 1);
    assert!(matches!(
        readies[0],
        ViewerEvent::ModelReady {
            path_set: PathSet::Reduced,
            ..
        }
    ));
    let upgrades: Vec<_> = seen
        .iter()
        .filter(|e| matches!(e, ViewerEvent::ModelUpgraded { .. }))
        .collect();
    assert_eq!(upgrades.len(), 1);
}

#[test]
fn progress_events_are_monotonic_and_clamped() {
    let catalog =
        AssetCatalog::new().with_entry("lion", VariantSet::tiered("/lion-mobile.glb", "/lion.glb"));
    let lane = ScriptedFetchLane::default()
        .with_resource("/lion-mobile.glb", b"reduced lion payload")
        .with_resource("/lion.glb", b"full lion payload");
    let mut agent = agent_with(catalog, &SaveDataProbe, lane);
    let events = agent.events();
    let mut seen = Vec::new();

    agent.request("lion").expect("request failed");
    pump_until_event(&mut agent, &events, &mut seen, |e| {
        matches!(e, ViewerEvent::ModelUpgraded { .. })
    });

    let percents: Vec<u8> = seen
        .iter()
        .filter_map(|e| match e {
            ViewerEvent::Progress { percent, .. } => Some(*percent),
            _ => None,
        })
        .collect();
    assert!(!percents.is_empty());
    assert!(percents.windows(2).all(|w| w[0] <= w[1]), "{percents:?}");
    assert!(percents.iter().all(|p| *p <= 100));
    assert_eq!(*percents.last().unwrap(), 100);
}

#[test]
fn failed_upgrade_stays_on_reduced_with_no_user_facing_error() {
    let catalog =
        AssetCatalog::new().with_entry("lion", VariantSet::tiered("/lion-mobile.glb", "/lion.glb"));
    let lane = ScriptedFetchLane::default()
        .with_resource("/lion-mobile.glb", b"reduced lion payload")
        .with_failure("/lion.glb");
    let mut agent = agent_with(catalog, &SaveDataProbe, lane);
    let events = agent.events();
    let mut seen = Vec::new();

    agent.request("lion").expect("request failed");
    pump_until_event(&mut agent, &events, &mut seen, |e| {
        matches!(e, ViewerEvent::ModelReady { .. })
    });

    // Drain until the failed upgrade has been applied and abandoned.
    let deadline = Instant::now() + WAIT;
    while agent.state() == ViewerState::UpgradePending {
        assert!(Instant::now() < deadline, "upgrade was never abandoned");
        agent.pump_blocking(Duration::from_millis(50));
    }

    assert_eq!(agent.state(), ViewerState::ReadyReduced);
    assert_eq!(
        agent.current_asset_path(),
        Some(Path::new("/lion-mobile.glb"))
    );

    // Silence: no error event, no upgrade event, before or after.
    agent.pump_blocking(Duration::from_millis(100));
    while let Ok(event) = events.try_recv() {
        seen.push(event);
    }
    assert!(seen.iter().all(|e| !matches!(
        e,
        ViewerEvent::InitialLoadFailed { .. } | ViewerEvent::ModelUpgraded { .. }
    )));
}

#[test]
fn decode_failure_during_upgrade_is_also_silent() {
    let catalog =
        AssetCatalog::new().with_entry("lion", VariantSet::tiered("/lion-mobile.glb", "/lion.glb"));
    let lane = ScriptedFetchLane::default()
        .with_resource("/lion-mobile.glb", b"reduced lion payload")
        .with_resource("/lion.glb", b"bad bytes that fetch fine");
    let mut agent = agent_with(catalog, &SaveDataProbe, lane);
    let events = agent.events();
    let mut seen = Vec::new();

    agent.request("lion").expect("request failed");
    pump_until_event(&mut agent, &events, &mut seen, |e| {
        matches!(e, ViewerEvent::ModelReady { .. })
    });

    let deadline = Instant::now() + WAIT;
    while agent.state() == ViewerState::UpgradePending {
        assert!(Instant::now() < deadline, "upgrade was never abandoned");
        agent.pump_blocking(Duration::from_millis(50));
    }
    assert_eq!(agent.state(), ViewerState::ReadyReduced);
}

#[test]
fn initial_load_failure_is_user_visible() {
    let catalog =
        AssetCatalog::new().with_entry("lion", VariantSet::tiered("/lion-mobile.glb", "/lion.glb"));
    let lane = ScriptedFetchLane::default().with_failure("/lion-mobile.glb");
    let mut agent = agent_with(catalog, &SaveDataProbe, lane);
    let events = agent.events();
    let mut seen = Vec::new();

    agent.request("lion").expect("request failed");
    pump_until_event(&mut agent, &events, &mut seen, |e| {
        matches!(e, ViewerEvent::InitialLoadFailed { .. })
    });

    assert_eq!(agent.state(), ViewerState::Idle);
    assert_eq!(agent.current_asset_path(), None);
}

#[test]
fn upgrade_waits_for_every_batch_member() {
    let catalog = AssetCatalog::new()
        .with_entry("lion", VariantSet::tiered("/lion-mobile.glb", "/lion.glb"))
        .with_entry("drum", VariantSet::tiered("/drum-mobile.glb", "/drum.glb"));
    let lane = ScriptedFetchLane::default()
        .with_resource("/lion-mobile.glb", b"reduced lion payload")
        .with_resource("/lion.glb", b"full lion payload")
        .with_resource("/drum.glb", b"full drum payload");
    let drum_gate = lane.gate("/drum.glb");
    let mut agent = agent_with(catalog, &SaveDataProbe, lane);
    let events = agent.events();
    let mut seen = Vec::new();

    agent.request("lion").expect("request failed");
    pump_until_event(&mut agent, &events, &mut seen, |e| {
        matches!(e, ViewerEvent::ModelReady { .. })
    });
    assert_eq!(agent.state(), ViewerState::UpgradePending);

    // The lion's own full variant completes, but the drum is still held at
    // the gate, so the switch must not fire yet.
    let deadline = Instant::now() + WAIT;
    while !agent.is_cached(Path::new("/lion.glb")) {
        assert!(Instant::now() < deadline, "lion full variant never arrived");
        agent.pump_blocking(Duration::from_millis(50));
    }
    assert_eq!(agent.state(), ViewerState::UpgradePending);
    assert_eq!(
        agent.current_asset_path(),
        Some(Path::new("/lion-mobile.glb"))
    );

    drum_gate.send(()).expect("gate send failed");
    pump_until_event(&mut agent, &events, &mut seen, |e| {
        matches!(e, ViewerEvent::ModelUpgraded { .. })
    });
    assert_eq!(agent.state(), ViewerState::ReadyFull);
    assert_eq!(agent.current_asset_path(), Some(Path::new("/lion.glb")));
}

#[test]
fn switching_keys_mid_upgrade_starts_the_new_session_immediately() {
    let catalog = AssetCatalog::new()
        .with_entry("lion", VariantSet::tiered("/lion-mobile.glb", "/lion.glb"))
        .with_entry("dragon", VariantSet::full_only("/dragon.glb"));
    let lane = ScriptedFetchLane::default()
        .with_resource("/lion-mobile.glb", b"reduced lion payload")
        .with_resource("/lion.glb", b"full lion payload")
        .with_resource("/dragon.glb", b"the only dragon payload");
    let lion_gate = lane.gate("/lion.glb");
    let mut agent =
        agent_with(catalog, &SaveDataProbe, lane).with_upgrade_scope(UpgradeScope::ActiveKeyOnly);
    let events = agent.events();
    let mut seen = Vec::new();

    agent.request("lion").expect("request failed");
    pump_until_event(&mut agent, &events, &mut seen, |e| {
        matches!(e, ViewerEvent::ModelReady { .. })
    });
    assert_eq!(agent.state(), ViewerState::UpgradePending);

    // Switch while the lion's upgrade is still parked at the gate. The new
    // session starts loading without waiting for the old batch.
    agent.request("dragon").expect("request failed");
    assert_eq!(agent.state(), ViewerState::InitialLoading);
    assert_eq!(agent.progress_percent(), 0);

    pump_until_event(&mut agent, &events, &mut seen, |e| {
        matches!(
            e,
            ViewerEvent::ModelReady {
                path_set: PathSet::Full,
                ..
            }
        )
    });
    // No reduced dragon variant is cataloged, so the fallback full variant
    // makes the session terminal.
    assert_eq!(agent.state(), ViewerState::ReadyFull);
    assert_eq!(agent.current_asset_path(), Some(Path::new("/dragon.glb")));

    // Release the abandoned fetch; it must only land in the cache.
    lion_gate.send(()).expect("gate send failed");
    let deadline = Instant::now() + WAIT;
    while !agent.is_cached(Path::new("/lion.glb")) {
        assert!(Instant::now() < deadline, "stale fetch never reached the cache");
        agent.pump_blocking(Duration::from_millis(50));
    }
    // The abandoned result changed nothing the viewer can see.
    assert_eq!(agent.state(), ViewerState::ReadyFull);
    assert_eq!(agent.current_asset_path(), Some(Path::new("/dragon.glb")));

    // Served from cache at full quality: no upgrade phase, no new fetch.
    agent.request("lion").expect("request failed");
    assert_eq!(agent.state(), ViewerState::ReadyFull);
    assert_eq!(agent.current_asset_path(), Some(Path::new("/lion.glb")));
    while let Ok(event) = events.try_recv() {
        seen.push(event);
    }
    assert!(seen
        .iter()
        .all(|e| !matches!(e, ViewerEvent::ModelUpgraded { .. })));
}

#[test]
fn sessions_load_from_disk_through_the_fs_lane() {
    let dir = tempfile::tempdir().expect("tempdir");
    std::fs::write(dir.path().join("lion-mobile.glb"), b"reduced lion payload")
        .expect("write fixture");
    std::fs::write(dir.path().join("lion.glb"), b"full lion payload").expect("write fixture");

    let catalog =
        AssetCatalog::new().with_entry("lion", VariantSet::tiered("/lion-mobile.glb", "/lion.glb"));
    let mut agent = ViewerAgent::new(
        catalog,
        TierPolicy::default(),
        &SaveDataProbe,
        Arc::new(FsFetchLane::new(dir.path())),
        Arc::new(PrefixDecodeLane),
    );
    let events = agent.events();
    let mut seen = Vec::new();

    agent.request("lion").expect("request failed");
    pump_until_event(&mut agent, &events, &mut seen, |e| {
        matches!(e, ViewerEvent::ModelUpgraded { .. })
    });
    assert_eq!(agent.state(), ViewerState::ReadyFull);
    let model = agent.current_model().expect("model missing");
    assert_eq!(model.source_bytes, b"full lion payload".len() as u64);
}

#[test]
fn high_tier_session_is_terminal_without_an_upgrade_phase() {
    let catalog =
        AssetCatalog::new().with_entry("lion", VariantSet::tiered("/lion-mobile.glb", "/lion.glb"));
    let lane = ScriptedFetchLane::default().with_resource("/lion.glb", b"full lion payload");
    let mut agent = agent_with(catalog, &NoSignalProbe, lane);
    let events = agent.events();
    let mut seen = Vec::new();

    agent.request("lion").expect("request failed");
    pump_until_event(&mut agent, &events, &mut seen, |e| {
        matches!(e, ViewerEvent::ModelReady { .. })
    });

    assert_eq!(agent.state(), ViewerState::ReadyFull);
    assert_eq!(agent.current_asset_path(), Some(Path::new("/lion.glb")));
    assert_eq!(agent.pump_blocking(Duration::from_millis(100)), 0);
}

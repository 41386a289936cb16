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

//! The `ViewerAgent`: tier-aware request resolution, the load-session state
//! machine, and the background quality-upgrade protocol.

use super::events::ViewerEvent;
use super::session::{LoadSession, PathSet, SessionPhase, ViewerState};
use super::worker::{spawn_load_job, JobIntent, WorkerMessage};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use vitrine_core::asset::{AssetHandle, Model3d};
use vitrine_core::capability::{CapabilityProfile, EnvironmentProbe};
use vitrine_core::catalog::AssetCatalog;
use vitrine_core::error::AssetError;
use vitrine_core::event::EventBus;
use vitrine_core::quality::{QualityTier, RenderingSettings, TierPolicy};
use vitrine_data::AssetCache;
use vitrine_lanes::{FetchLane, ModelDecodeLane};

/// Which assets a background upgrade fetches at full quality.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UpgradeScope {
    /// Every cataloged asset, so later tab switches are upgrade-free.
    #[default]
    AllCatalogKeys,
    /// Only the asset currently on display.
    ActiveKeyOnly,
}

/// One in-flight background upgrade.
///
/// The switch to the full path set happens only when `pending` drains to
/// empty; a single member's failure abandons the whole batch.
struct UpgradeBatch {
    generation: u64,
    pending: HashSet<PathBuf>,
}

/// The progressive loader and upgrade orchestrator.
///
/// Owns the current [`LoadSession`], the shared decoded-asset cache, and
/// the outbound event bus. Fetch and decode run on worker threads; their
/// results are applied exclusively by [`ViewerAgent::pump`] on the owning
/// thread, so every state transition the viewer can observe is atomic.
pub struct ViewerAgent {
    catalog: AssetCatalog,
    policy: TierPolicy,
    profile: CapabilityProfile,
    tier: QualityTier,
    settings: RenderingSettings,
    device_pixel_ratio: Option<f32>,
    cache: AssetCache<Model3d>,
    fetch_lane: Arc<dyn FetchLane>,
    decode_lane: Arc<dyn ModelDecodeLane>,
    events: EventBus<ViewerEvent>,
    worker_tx: flume::Sender<WorkerMessage>,
    worker_rx: flume::Receiver<WorkerMessage>,
    session: Option<LoadSession>,
    upgrade: Option<UpgradeBatch>,
    upgrade_scope: UpgradeScope,
    generation: u64,
}

impl ViewerAgent {
    /// Creates an agent for `catalog`, classifying the environment once via
    /// `probe`.
    pub fn new(
        catalog: AssetCatalog,
        policy: TierPolicy,
        probe: &dyn EnvironmentProbe,
        fetch_lane: Arc<dyn FetchLane>,
        decode_lane: Arc<dyn ModelDecodeLane>,
    ) -> Self {
        let profile = CapabilityProfile::detect(probe);
        let tier = QualityTier::select(&profile);
        let device_pixel_ratio = probe.viewport().map(|v| v.device_pixel_ratio);
        let settings = policy.settings_for(tier, device_pixel_ratio);
        let (worker_tx, worker_rx) = flume::unbounded();

        log::info!("ViewerAgent initialized at tier {tier} with {} cataloged assets", catalog.len());

        Self {
            catalog,
            policy,
            profile,
            tier,
            settings,
            device_pixel_ratio,
            cache: AssetCache::new(),
            fetch_lane,
            decode_lane,
            events: EventBus::new(),
            worker_tx,
            worker_rx,
            session: None,
            upgrade: None,
            upgrade_scope: UpgradeScope::default(),
            generation: 0,
        }
    }

    /// Overrides how wide the background upgrade casts its prefetch net.
    pub fn with_upgrade_scope(mut self, scope: UpgradeScope) -> Self {
        self.upgrade_scope = scope;
        self
    }

    /// Re-classifies the environment, e.g. after a viewport resize.
    ///
    /// Event-driven by design: callers invoke this on resize notifications,
    /// never per frame. The new tier applies to requests made afterwards;
    /// the session already on screen is left undisturbed.
    pub fn rescan_environment(&mut self, probe: &dyn EnvironmentProbe) {
        let profile = CapabilityProfile::detect(probe);
        self.device_pixel_ratio = probe.viewport().map(|v| v.device_pixel_ratio);

        let tier = QualityTier::select(&profile);
        if tier != self.tier {
            log::info!("Quality tier changed on rescan: {} -> {}", self.tier, tier);
        }
        self.profile = profile;
        self.tier = tier;
        self.settings = self.policy.settings_for(tier, self.device_pixel_ratio);
    }

    /// Requests `key` for display, starting a fresh load session.
    ///
    /// Requesting the key that is already active is a no-op. Requesting a
    /// different key abandons the previous session's interest in its
    /// in-flight work without aborting it (finished fetches still populate
    /// the shared cache) and consults the cache before touching the
    /// network, so a previously-upgraded asset is served instantly.
    ///
    /// Fails only with [`AssetError::UnknownAsset`]; transfer and decode
    /// failures are reported asynchronously through the event bus.
    pub fn request(&mut self, key: &str) -> Result<(), AssetError> {
        if self.session.as_ref().is_some_and(|s| s.key == key) {
            log::debug!("Asset '{key}' is already active; ignoring request");
            return Ok(());
        }

        let requested = self.catalog.resolve(key, self.tier)?.to_path_buf();
        let full = self.catalog.resolve_full(key)?.to_path_buf();

        self.generation += 1;
        self.upgrade = None;
        let generation = self.generation;
        log::info!(
            "Requesting '{key}' at tier {} -> '{}'",
            self.tier,
            requested.display()
        );

        let mut session = LoadSession::new(key, generation);

        // A full-quality asset already in cache beats the tier resolution.
        if self.cache.contains(&full) {
            session.progress.on_decode_complete();
            session.active_path = Some(full.clone());
            session.phase = SessionPhase::Ready(PathSet::Full);
            self.session = Some(session);
            self.events.publish(ViewerEvent::Progress {
                key: key.to_string(),
                percent: 100,
            });
            self.events.publish(ViewerEvent::ModelReady {
                key: key.to_string(),
                path: full,
                path_set: PathSet::Full,
            });
            return Ok(());
        }

        if self.cache.contains(&requested) {
            session.progress.on_decode_complete();
            session.active_path = Some(requested.clone());
            session.phase = SessionPhase::Ready(PathSet::Reduced);
            self.session = Some(session);
            self.events.publish(ViewerEvent::Progress {
                key: key.to_string(),
                percent: 100,
            });
            self.events.publish(ViewerEvent::ModelReady {
                key: key.to_string(),
                path: requested,
                path_set: PathSet::Reduced,
            });
            self.begin_upgrade();
            return Ok(());
        }

        self.session = Some(session);
        spawn_load_job(
            self.fetch_lane.clone(),
            self.decode_lane.clone(),
            self.worker_tx.clone(),
            generation,
            JobIntent::Initial,
            key.to_string(),
            requested,
        );
        Ok(())
    }

    /// Applies every worker completion that has arrived, returning how many
    /// messages were processed.
    ///
    /// This is the agent's only mutation point outside [`request`]: the
    /// embedding runtime calls it from its event loop or whenever the
    /// worker channel signals readiness.
    pub fn pump(&mut self) -> usize {
        let mut processed = 0;
        while let Ok(msg) = self.worker_rx.try_recv() {
            self.apply(msg);
            processed += 1;
        }
        processed
    }

    /// Waits up to `timeout` for one worker message, then drains the rest.
    ///
    /// Convenience for headless runtimes and tests that have no event loop
    /// of their own.
    pub fn pump_blocking(&mut self, timeout: Duration) -> usize {
        match self.worker_rx.recv_timeout(timeout) {
            Ok(msg) => {
                self.apply(msg);
                1 + self.pump()
            }
            Err(_) => 0,
        }
    }

    fn apply(&mut self, msg: WorkerMessage) {
        match msg {
            WorkerMessage::Progress {
                generation,
                key,
                loaded,
                total,
            } => self.on_transfer_progress(generation, key, loaded, total),
            WorkerMessage::Done {
                generation,
                intent,
                key,
                path,
                result,
            } => {
                // Successful loads always land in the shared cache, even
                // when nothing is waiting for them anymore.
                let result = result.map(|model| {
                    self.cache.insert(path.clone(), AssetHandle::new(model));
                });
                match intent {
                    JobIntent::Initial => self.on_initial_done(generation, key, path, result),
                    JobIntent::Upgrade => self.on_upgrade_done(generation, key, path, result),
                }
            }
        }
    }

    fn on_transfer_progress(
        &mut self,
        generation: u64,
        key: String,
        loaded: u64,
        total: Option<u64>,
    ) {
        let changed = {
            let Some(session) = &mut self.session else {
                return;
            };
            if session.generation != generation || session.phase != SessionPhase::InitialLoading {
                return;
            }
            let before = session.progress.rounded();
            session.progress.on_transfer(loaded, total);
            let after = session.progress.rounded();
            if after != before {
                session.touch();
                Some(after)
            } else {
                None
            }
        };
        if let Some(percent) = changed {
            self.events.publish(ViewerEvent::Progress { key, percent });
        }
    }

    fn on_initial_done(
        &mut self,
        generation: u64,
        key: String,
        path: PathBuf,
        result: Result<(), AssetError>,
    ) {
        match &self.session {
            Some(session) if session.generation == generation => {}
            _ => {
                log::debug!("Discarding superseded initial-load result for '{key}'");
                return;
            }
        }

        match result {
            Ok(()) => {
                let path_set = match self.catalog.resolve_full(&key) {
                    Ok(full) if full == path => PathSet::Full,
                    _ => PathSet::Reduced,
                };
                if let Some(session) = &mut self.session {
                    session.progress.on_decode_complete();
                    session.active_path = Some(path.clone());
                    session.phase = SessionPhase::Ready(path_set);
                    session.touch();
                }
                log::info!("Initial load of '{key}' complete ({path_set:?} variant)");
                self.events.publish(ViewerEvent::Progress {
                    key: key.clone(),
                    percent: 100,
                });
                self.events.publish(ViewerEvent::ModelReady {
                    key,
                    path,
                    path_set,
                });
                if path_set == PathSet::Reduced {
                    self.begin_upgrade();
                }
            }
            Err(err) => {
                log::warn!("Initial load of '{key}' failed: {err}");
                self.session = None;
                self.events.publish(ViewerEvent::InitialLoadFailed {
                    key,
                    details: err.to_string(),
                });
            }
        }
    }

    fn on_upgrade_done(
        &mut self,
        generation: u64,
        key: String,
        path: PathBuf,
        result: Result<(), AssetError>,
    ) {
        // Some(true) applies the switch, Some(false) abandons the batch.
        let verdict = {
            let Some(batch) = self.upgrade.as_mut() else {
                return;
            };
            if batch.generation != generation {
                return;
            }
            match result {
                Ok(()) => {
                    batch.pending.remove(&path);
                    batch.pending.is_empty().then_some(true)
                }
                Err(err) => {
                    log::warn!(
                        "Background upgrade of '{key}' failed; keeping the reduced asset: {err}"
                    );
                    Some(false)
                }
            }
        };
        match verdict {
            Some(true) => {
                self.upgrade = None;
                self.apply_upgrade();
            }
            Some(false) => {
                self.upgrade = None;
                if let Some(session) = &mut self.session {
                    if session.phase == SessionPhase::UpgradePending {
                        session.phase = SessionPhase::Ready(PathSet::Reduced);
                    }
                }
            }
            None => {}
        }
    }

    /// Starts the background fetch of every full-quality variant not yet
    /// cached, so later tab switches are upgrade-free.
    fn begin_upgrade(&mut self) {
        let generation = self.generation;
        let active_key = self.session.as_ref().map(|s| s.key.clone());
        let mut jobs: Vec<(String, PathBuf)> = Vec::new();
        for key in self.catalog.keys() {
            if self.upgrade_scope == UpgradeScope::ActiveKeyOnly
                && active_key.as_deref() != Some(key)
            {
                continue;
            }
            if let Ok(full) = self.catalog.resolve_full(key) {
                if !self.cache.contains(full) {
                    jobs.push((key.to_string(), full.to_path_buf()));
                }
            }
        }

        if jobs.is_empty() {
            self.apply_upgrade();
            return;
        }

        if let Some(session) = &mut self.session {
            session.phase = SessionPhase::UpgradePending;
            session.touch();
        }
        log::info!("Background upgrade started for {} full-quality asset(s)", jobs.len());

        let pending = jobs.iter().map(|(_, path)| path.clone()).collect();
        for (key, path) in jobs {
            spawn_load_job(
                self.fetch_lane.clone(),
                self.decode_lane.clone(),
                self.worker_tx.clone(),
                generation,
                JobIntent::Upgrade,
                key,
                path,
            );
        }
        self.upgrade = Some(UpgradeBatch {
            generation,
            pending,
        });
    }

    /// Switches the session to the full path set in one observable step.
    fn apply_upgrade(&mut self) {
        let published = {
            let Some(session) = &mut self.session else {
                return;
            };
            let Ok(full) = self.catalog.resolve_full(&session.key) else {
                return;
            };
            let full = full.to_path_buf();
            session.phase = SessionPhase::Ready(PathSet::Full);
            session.active_path = Some(full.clone());
            session.progress.on_decode_complete();
            session.touch();
            (session.key.clone(), full)
        };
        let (key, path) = published;
        log::info!("Upgraded '{key}' to full quality ('{}')", path.display());
        self.events.publish(ViewerEvent::ModelUpgraded { key, path });
    }

    /// The catalog this agent serves from.
    pub fn catalog(&self) -> &AssetCatalog {
        &self.catalog
    }

    /// The capability profile from the last environment scan.
    pub fn profile(&self) -> &CapabilityProfile {
        &self.profile
    }

    /// The quality tier applied to new requests.
    pub fn tier(&self) -> QualityTier {
        self.tier
    }

    /// Rendering parameters for the current tier.
    pub fn current_settings(&self) -> RenderingSettings {
        self.settings
    }

    /// Lifecycle state of the current session.
    pub fn state(&self) -> ViewerState {
        self.session
            .as_ref()
            .map(LoadSession::viewer_state)
            .unwrap_or(ViewerState::Idle)
    }

    /// The resolved path the viewer should currently display, once one is
    /// ready.
    pub fn current_asset_path(&self) -> Option<&Path> {
        self.session.as_ref()?.active_path.as_deref()
    }

    /// The decoded model behind [`Self::current_asset_path`].
    pub fn current_model(&self) -> Option<AssetHandle<Model3d>> {
        self.cache.get(self.current_asset_path()?)
    }

    /// Displayable load percentage for the current session.
    pub fn progress_percent(&self) -> u8 {
        self.session
            .as_ref()
            .map(|s| s.progress.rounded())
            .unwrap_or(0)
    }

    /// Status text matching [`Self::progress_percent`].
    pub fn progress_status(&self) -> &'static str {
        self.session
            .as_ref()
            .map(|s| s.progress.status_text())
            .unwrap_or("Downloading...")
    }

    /// How long the initial load has gone without observable progress.
    ///
    /// `None` outside the initial-load phase. The agent never times out on
    /// its own; the consumer applies its bounded-wait fallback policy on
    /// top of this measurement.
    pub fn stalled_for(&self) -> Option<Duration> {
        let session = self.session.as_ref()?;
        (session.phase == SessionPhase::InitialLoading).then(|| session.last_activity.elapsed())
    }

    /// Whether the resource at `path` is already decoded and cached.
    ///
    /// Lets a viewer predict that switching to a given tab will complete
    /// instantly, without actually requesting it.
    pub fn is_cached(&self, path: &Path) -> bool {
        self.cache.contains(path)
    }

    /// A receiver for the agent's outbound events.
    pub fn events(&self) -> flume::Receiver<ViewerEvent> {
        self.events.receiver().clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use vitrine_core::capability::{
        EnvironmentProbe, HardwareHints, NetworkHints, Viewport,
    };
    use vitrine_core::catalog::VariantSet;
    use vitrine_lanes::{FetchLaneError, TransferProgress};

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

    struct UnreachableLane;
    impl FetchLane for UnreachableLane {
        fn fetch(
            &self,
            path: &Path,
            _on_progress: &mut dyn FnMut(TransferProgress),
        ) -> Result<Vec<u8>, FetchLaneError> {
            Err(FetchLaneError::Http {
                url: path.display().to_string(),
                details: "test lane is unreachable".to_string(),
            })
        }
    }

    struct RejectingDecode;
    impl ModelDecodeLane for RejectingDecode {
        fn decode(
            &self,
            _bytes: &[u8],
        ) -> Result<Model3d, Box<dyn std::error::Error + Send + Sync>> {
            Err("unused in these tests".into())
        }
    }

    fn agent() -> ViewerAgent {
        let catalog = AssetCatalog::new()
            .with_entry("lion", VariantSet::tiered("/lion-mobile.glb", "/lion.glb"));
        ViewerAgent::new(
            catalog,
            TierPolicy::default(),
            &NoSignalProbe,
            Arc::new(UnreachableLane),
            Arc::new(RejectingDecode),
        )
    }

    #[test]
    fn no_signal_probe_fails_open_to_high_tier() {
        let agent = agent();
        assert_eq!(agent.tier(), QualityTier::High);
        assert!(agent.current_settings().shadows_enabled);
    }

    #[test]
    fn unknown_key_is_rejected_synchronously() {
        let mut agent = agent();
        match agent.request("nonexistent") {
            Err(AssetError::UnknownAsset { key }) => assert_eq!(key, "nonexistent"),
            other => panic!("Expected UnknownAsset, got {other:?}"),
        }
        assert_eq!(agent.state(), ViewerState::Idle);
    }

    #[test]
    fn re_requesting_the_active_key_is_a_no_op() {
        let mut agent = agent();
        agent.request("lion").expect("request failed");
        let state = agent.state();
        agent.request("lion").expect("request failed");
        assert_eq!(agent.state(), state);
    }
}

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

//! Headless demo runtime for the adaptive showcase loader.
//!
//! Usage: `vitrine-runtime [ASSET_DIR] [KEY] [--mobile]`
//!
//! Loads `KEY` (default `lion`) from `ASSET_DIR` (default `public`) through
//! the full pipeline and logs every event a viewer would react to. Pass
//! `--mobile` to simulate a narrow, mobile-agent client and watch the
//! reduced-then-upgraded flow instead of the direct full-quality load.

use anyhow::{Context, Result};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use vitrine_agents::{ViewerAgent, ViewerEvent, ViewerState};
use vitrine_core::catalog::{AssetCatalog, DisplayHints, VariantSet};
use vitrine_core::quality::TierPolicy;
use vitrine_infra::HostProbe;
use vitrine_lanes::{FsFetchLane, GlbDecodeLane};

/// How long the initial load may sit without progress before the demo
/// gives up and reports the fallback image, mirroring the bounded-wait
/// policy a real viewer applies.
const STALL_GRACE: Duration = Duration::from_secs(10);

const CATALOG_FILE: &str = "vitrine.catalog.json";

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let simulate_mobile = args.iter().any(|a| a == "--mobile");
    let mut positional = args.iter().filter(|a| !a.starts_with("--"));
    let asset_dir = positional.next().map(String::as_str).unwrap_or("public");
    let key = positional.next().map(String::as_str).unwrap_or("lion");

    let catalog = load_catalog(Path::new(asset_dir))?;
    let probe = build_probe(simulate_mobile);

    let mut agent = ViewerAgent::new(
        catalog,
        TierPolicy::default(),
        &probe,
        Arc::new(FsFetchLane::new(asset_dir)),
        Arc::new(GlbDecodeLane::new()),
    );

    let settings = agent.current_settings();
    log::info!(
        "Tier {}: shadows={}, antialias={}, pixel ratio cap={}, shadow map={}",
        agent.tier(),
        settings.shadows_enabled,
        settings.antialias_enabled,
        settings.pixel_ratio_cap,
        settings.shadow_map_size
    );

    let events = agent.events();
    agent
        .request(key)
        .with_context(|| format!("requesting asset '{key}'"))?;

    loop {
        agent.pump_blocking(Duration::from_millis(100));
        while let Ok(event) = events.try_recv() {
            report(&event);
        }

        match agent.state() {
            ViewerState::ReadyFull => {
                log::info!("Session complete at full quality.");
                break;
            }
            ViewerState::ReadyReduced => {
                log::info!("Session complete on the reduced variant (upgrade abandoned).");
                break;
            }
            ViewerState::Idle => {
                log::warn!("Viewer falls back to the static image.");
                break;
            }
            _ => {}
        }

        if agent.stalled_for().is_some_and(|d| d > STALL_GRACE) {
            log::warn!(
                "No load progress for {}s; viewer falls back to the static image.",
                STALL_GRACE.as_secs()
            );
            break;
        }
    }

    if let Some(model) = agent.current_model() {
        log::info!(
            "Displayed model: {} mesh(es), {} vertices, {} triangles, {} bytes",
            model.mesh_count,
            model.vertex_count,
            model.triangle_count,
            model.source_bytes
        );
    }
    Ok(())
}

fn report(event: &ViewerEvent) {
    match event {
        ViewerEvent::Progress { key, percent } => {
            log::info!("[{key}] {percent}%");
        }
        ViewerEvent::ModelReady { key, path, path_set } => {
            log::info!("[{key}] ready ({path_set:?}): {}", path.display());
        }
        ViewerEvent::ModelUpgraded { key, path } => {
            log::info!("[{key}] upgraded to {}", path.display());
        }
        ViewerEvent::InitialLoadFailed { key, details } => {
            log::warn!("[{key}] initial load failed: {details}");
        }
    }
}

fn build_probe(simulate_mobile: bool) -> HostProbe {
    let probe = HostProbe::new().with_sysinfo_hardware();
    if simulate_mobile {
        probe
            .with_viewport(390, 844, 3.0)
            .with_user_agent("Mozilla/5.0 (iPhone; CPU iPhone OS 17_0 like Mac OS X)")
    } else {
        probe
    }
}

/// Reads `vitrine.catalog.json` from the asset directory, or falls back to
/// the built-in showcase catalog.
fn load_catalog(asset_dir: &Path) -> Result<AssetCatalog> {
    let path = asset_dir.join(CATALOG_FILE);
    if path.is_file() {
        let bytes =
            std::fs::read(&path).with_context(|| format!("reading {}", path.display()))?;
        let catalog = AssetCatalog::from_json_slice(&bytes)
            .with_context(|| format!("parsing {}", path.display()))?;
        log::info!("Loaded catalog with {} asset(s) from {}", catalog.len(), path.display());
        return Ok(catalog);
    }

    log::info!("No {CATALOG_FILE} in {}; using the built-in catalog", asset_dir.display());
    Ok(builtin_catalog())
}

fn builtin_catalog() -> AssetCatalog {
    let model_hints = DisplayHints {
        scale: 2.1,
        narrow_scale: 1.75,
        lift: -2.0,
    };
    let trophy_hints = DisplayHints {
        scale: 1.8,
        narrow_scale: 1.6,
        lift: -1.57,
    };
    AssetCatalog::new()
        .with_entry(
            "lion",
            VariantSet::tiered("/lion-mobile.glb", "/lion.glb").with_display(model_hints),
        )
        .with_entry(
            "dragon",
            VariantSet::full_only("/dragon.glb").with_display(model_hints),
        )
        .with_entry(
            "drum",
            VariantSet::full_only("/drum.glb").with_display(model_hints),
        )
        .with_entry(
            "trophy",
            VariantSet::full_only("/trophy.glb").with_display(trophy_hints),
        )
        .with_entry(
            "others",
            VariantSet::full_only("/others.glb").with_display(model_hints),
        )
}

#[cfg(test)]
mod tests {
    use super::*;
    use vitrine_core::capability::CapabilityProfile;
    use vitrine_core::quality::QualityTier;

    #[test]
    fn builtin_catalog_covers_every_showcase_tab() {
        let catalog = builtin_catalog();
        for key in ["lion", "dragon", "drum", "trophy", "others"] {
            assert!(catalog.variants(key).is_some(), "missing '{key}'");
        }
        assert_eq!(
            catalog.resolve("lion", QualityTier::Low).unwrap(),
            Path::new("/lion-mobile.glb")
        );
    }

    #[test]
    fn mobile_simulation_selects_a_reduced_tier() {
        let probe = build_probe(true);
        let profile = CapabilityProfile::detect(&probe);
        assert!(QualityTier::select(&profile).prefers_reduced_assets());
    }
}

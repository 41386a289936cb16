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

//! Capability detection for the host environment.
//!
//! Every signal a probe can answer is best-effort and possibly absent; the
//! detector treats an absent signal as "unknown" and fails open toward the
//! higher-capability assumption, so a headless or server-rendered context
//! never over-restricts quality before a real client can re-evaluate.
//!
//! Detection is event-driven (initial request, viewport resize), never
//! polled per frame.

use serde::{Deserialize, Serialize};

/// Viewport width below which a display counts as narrow.
pub const NARROW_VIEWPORT_MAX_WIDTH: u32 = 768;

/// User-agent substrings that identify a mobile browser, matched
/// case-insensitively.
pub const MOBILE_UA_MARKERS: &[&str] = &[
    "android",
    "webos",
    "iphone",
    "ipad",
    "ipod",
    "blackberry",
    "iemobile",
    "opera mini",
];

/// Logical core count at or below which hardware counts as constrained.
pub const LOW_CORE_THRESHOLD: usize = 4;

/// Memory in GiB at or below which hardware counts as constrained.
pub const LOW_MEMORY_GIB: u64 = 2;

/// Dimensions and pixel density of the display surface.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    /// Width in CSS pixels.
    pub width: u32,
    /// Height in CSS pixels.
    pub height: u32,
    /// Ratio of physical to logical pixels.
    pub device_pixel_ratio: f32,
}

/// Coarse connection-quality buckets, mirroring the network-information
/// API's effective types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EffectiveConnectionType {
    /// Very slow, high-latency link.
    Slow2g,
    /// Slow link.
    TwoG,
    /// Moderate link.
    ThreeG,
    /// Fast link.
    FourG,
}

impl EffectiveConnectionType {
    /// Whether this bucket is slow enough to force the lowest quality tier.
    pub fn is_slow(self) -> bool {
        matches!(self, Self::Slow2g | Self::TwoG)
    }
}

/// Best-effort network-quality hints.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NetworkHints {
    /// Estimated connection bucket, when the platform reports one.
    pub effective_type: Option<EffectiveConnectionType>,
    /// True when the user has asked for reduced data usage.
    pub save_data: bool,
}

/// Best-effort hardware hints.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HardwareHints {
    /// Number of logical CPU cores, when known.
    pub logical_cores: Option<usize>,
    /// Approximate installed memory in GiB, when known.
    pub approx_memory_gib: Option<u64>,
}

/// Query surface over the ambient environment.
///
/// Implementors answer with whatever the host can actually report; `None`
/// means the signal is unavailable, not that the device is weak. Concrete
/// probes live in `vitrine-infra`.
pub trait EnvironmentProbe: Send + Sync {
    /// Current display surface, if there is one.
    fn viewport(&self) -> Option<Viewport>;
    /// The embedding browser's user-agent string, if any.
    fn user_agent(&self) -> Option<String>;
    /// Network-quality hints, if the platform exposes them.
    fn network(&self) -> Option<NetworkHints>;
    /// Hardware hints, if the platform exposes them.
    fn hardware(&self) -> Option<HardwareHints>;
}

/// An immutable snapshot of the host's capabilities.
///
/// Derived once per session or on viewport resize, then consumed by the
/// quality-tier decision table. Never persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CapabilityProfile {
    /// The viewport is narrower than [`NARROW_VIEWPORT_MAX_WIDTH`].
    pub narrow_viewport: bool,
    /// The user agent identifies a mobile browser.
    pub mobile_user_agent: bool,
    /// The connection is slow or the user asked to save data.
    pub slow_connection: bool,
    /// The CPU or memory is at or below the constrained thresholds.
    pub constrained_hardware: bool,
}

impl CapabilityProfile {
    /// A profile with every constraint flag clear.
    ///
    /// This is what detection yields when no signal is available at all,
    /// and therefore what a server-rendered context resolves to.
    pub const fn unconstrained() -> Self {
        Self {
            narrow_viewport: false,
            mobile_user_agent: false,
            slow_connection: false,
            constrained_hardware: false,
        }
    }

    /// Classifies the environment reported by `probe`.
    ///
    /// Pure with respect to the probe's answers; the only impurity is that
    /// the probe reads ambient state at call time. Each absent signal
    /// leaves its flag clear (fail open to High, never fail closed to Low).
    pub fn detect(probe: &dyn EnvironmentProbe) -> Self {
        let narrow_viewport = probe
            .viewport()
            .map(|v| v.width < NARROW_VIEWPORT_MAX_WIDTH)
            .unwrap_or(false);

        let mobile_user_agent = probe
            .user_agent()
            .map(|ua| {
                let ua = ua.to_lowercase();
                MOBILE_UA_MARKERS.iter().any(|marker| ua.contains(marker))
            })
            .unwrap_or(false);

        let slow_connection = probe
            .network()
            .map(|net| net.save_data || net.effective_type.is_some_and(|t| t.is_slow()))
            .unwrap_or(false);

        let constrained_hardware = probe
            .hardware()
            .map(|hw| {
                hw.logical_cores.is_some_and(|c| c <= LOW_CORE_THRESHOLD)
                    || hw.approx_memory_gib.is_some_and(|m| m <= LOW_MEMORY_GIB)
            })
            .unwrap_or(false);

        let profile = Self {
            narrow_viewport,
            mobile_user_agent,
            slow_connection,
            constrained_hardware,
        };
        log::debug!("Capability detection: {profile:?}");
        profile
    }
}

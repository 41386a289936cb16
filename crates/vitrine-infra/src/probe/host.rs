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

//! A probe assembled from hints the embedding host reports.

use super::SysinfoProbe;
use vitrine_core::capability::{EnvironmentProbe, HardwareHints, NetworkHints, Viewport};

/// A probe the embedder fills with whatever its platform can report.
///
/// A browser shell passes viewport, user agent, and connection hints from
/// its own APIs; anything left unset stays absent and detection fails open
/// on it. Hardware hints can either be passed explicitly or delegated to a
/// [`SysinfoProbe`] on native hosts.
#[derive(Default)]
pub struct HostProbe {
    viewport: Option<Viewport>,
    user_agent: Option<String>,
    network: Option<NetworkHints>,
    hardware: Option<HardwareHints>,
    sysinfo_fallback: Option<SysinfoProbe>,
}

impl HostProbe {
    /// Creates a probe with every signal absent.
    pub fn new() -> Self {
        Self::default()
    }

    /// Reports the display surface.
    pub fn with_viewport(mut self, width: u32, height: u32, device_pixel_ratio: f32) -> Self {
        self.viewport = Some(Viewport {
            width,
            height,
            device_pixel_ratio,
        });
        self
    }

    /// Reports the embedding browser's user-agent string.
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = Some(user_agent.into());
        self
    }

    /// Reports connection-quality hints.
    pub fn with_network(mut self, network: NetworkHints) -> Self {
        self.network = Some(network);
        self
    }

    /// Reports hardware hints directly.
    pub fn with_hardware(mut self, hardware: HardwareHints) -> Self {
        self.hardware = Some(hardware);
        self
    }

    /// Delegates hardware hints to `sysinfo` when none are set explicitly.
    pub fn with_sysinfo_hardware(mut self) -> Self {
        self.sysinfo_fallback = Some(SysinfoProbe::new());
        self
    }
}

impl EnvironmentProbe for HostProbe {
    fn viewport(&self) -> Option<Viewport> {
        self.viewport
    }

    fn user_agent(&self) -> Option<String> {
        self.user_agent.clone()
    }

    fn network(&self) -> Option<NetworkHints> {
        self.network
    }

    fn hardware(&self) -> Option<HardwareHints> {
        self.hardware
            .or_else(|| self.sysinfo_fallback.as_ref().and_then(|p| p.hardware()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use vitrine_core::capability::{CapabilityProfile, EffectiveConnectionType};
    use vitrine_core::quality::QualityTier;

    #[test]
    fn unset_signals_stay_absent() {
        let probe = HostProbe::new();
        assert!(probe.viewport().is_none());
        assert!(probe.user_agent().is_none());
        assert!(probe.network().is_none());
        assert!(probe.hardware().is_none());
    }

    #[test]
    fn browser_style_hints_drive_detection() {
        let probe = HostProbe::new()
            .with_viewport(390, 844, 3.0)
            .with_user_agent("Mozilla/5.0 (iPhone; CPU iPhone OS 17_0 like Mac OS X)")
            .with_network(NetworkHints {
                effective_type: Some(EffectiveConnectionType::TwoG),
                save_data: false,
            });
        let profile = CapabilityProfile::detect(&probe);
        assert!(profile.narrow_viewport);
        assert!(profile.mobile_user_agent);
        assert!(profile.slow_connection);
        assert_eq!(QualityTier::select(&profile), QualityTier::Low);
    }

    #[test]
    fn explicit_hardware_beats_the_sysinfo_fallback() {
        let probe = HostProbe::new().with_sysinfo_hardware().with_hardware(HardwareHints {
            logical_cores: Some(2),
            approx_memory_gib: Some(1),
        });
        let hints = probe.hardware().expect("hardware hints missing");
        assert_eq!(hints.logical_cores, Some(2));
    }
}

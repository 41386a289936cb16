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

//! Quality-tier selection and the rendering parameters attached to each tier.

use crate::capability::CapabilityProfile;
use serde::{Deserialize, Serialize};

/// A named bucket of rendering quality driving asset and setting selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum QualityTier {
    /// Minimum fidelity: reduced assets, no shadows, no antialiasing.
    Low,
    /// Reduced assets with intermediate rendering parameters.
    Medium,
    /// Full-quality assets and rendering parameters.
    High,
}

impl QualityTier {
    /// Maps a capability profile to a tier.
    ///
    /// Deterministic decision table:
    /// - slow connection, or a mobile/narrow display on constrained
    ///   hardware, selects `Low`;
    /// - any single constraint (mobile/narrow display, or constrained
    ///   hardware) selects `Medium`;
    /// - an unconstrained profile selects `High`.
    pub fn select(profile: &CapabilityProfile) -> Self {
        let small_display = profile.mobile_user_agent || profile.narrow_viewport;

        if profile.slow_connection || (small_display && profile.constrained_hardware) {
            QualityTier::Low
        } else if small_display || profile.constrained_hardware {
            QualityTier::Medium
        } else {
            QualityTier::High
        }
    }

    /// Whether assets for this tier use the reduced variant.
    pub fn prefers_reduced_assets(self) -> bool {
        self < QualityTier::High
    }
}

impl std::fmt::Display for QualityTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{self:?}")
    }
}

/// Concrete rendering parameters handed to the viewer for one tier.
///
/// The core only selects these values; applying them is the rendering
/// collaborator's job.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RenderingSettings {
    /// Whether the viewer should render shadows at all.
    pub shadows_enabled: bool,
    /// Whether the canvas should be created with antialiasing.
    pub antialias_enabled: bool,
    /// Upper bound on the device-pixel-ratio the viewer may render at.
    pub pixel_ratio_cap: f32,
    /// Edge length of the shadow map, in texels.
    pub shadow_map_size: u32,
}

/// Per-deployment tuning for the tier-to-settings lookup table.
///
/// Low and High flags are fixed by the tiers themselves; the knobs here
/// cover the values that are policy rather than contract, most notably the
/// Medium shadow-map size.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TierPolicy {
    /// Shadow-map size reserved for Low, should a viewer force shadows on.
    pub low_shadow_map_size: u32,
    /// Intermediate shadow-map size for Medium.
    pub medium_shadow_map_size: u32,
    /// Full shadow-map size for High.
    pub high_shadow_map_size: u32,
    /// Pixel-ratio cap for Medium.
    pub medium_pixel_ratio_cap: f32,
    /// Pixel-ratio cap for High; the device ratio is clamped to this.
    pub high_pixel_ratio_cap: f32,
}

impl Default for TierPolicy {
    fn default() -> Self {
        Self {
            low_shadow_map_size: 256,
            medium_shadow_map_size: 512,
            high_shadow_map_size: 1024,
            medium_pixel_ratio_cap: 1.5,
            high_pixel_ratio_cap: 2.0,
        }
    }
}

impl TierPolicy {
    /// Produces the rendering settings for `tier`.
    ///
    /// `device_pixel_ratio` is the display's reported ratio, when known; at
    /// High it is clamped to the policy cap rather than used verbatim.
    pub fn settings_for(&self, tier: QualityTier, device_pixel_ratio: Option<f32>) -> RenderingSettings {
        match tier {
            QualityTier::Low => RenderingSettings {
                shadows_enabled: false,
                antialias_enabled: false,
                pixel_ratio_cap: 1.0,
                shadow_map_size: self.low_shadow_map_size,
            },
            QualityTier::Medium => RenderingSettings {
                shadows_enabled: false,
                antialias_enabled: false,
                pixel_ratio_cap: self.medium_pixel_ratio_cap,
                shadow_map_size: self.medium_shadow_map_size,
            },
            QualityTier::High => RenderingSettings {
                shadows_enabled: true,
                antialias_enabled: true,
                pixel_ratio_cap: device_pixel_ratio
                    .unwrap_or(self.high_pixel_ratio_cap)
                    .min(self.high_pixel_ratio_cap),
                shadow_map_size: self.high_shadow_map_size,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn profile(
        narrow_viewport: bool,
        mobile_user_agent: bool,
        slow_connection: bool,
        constrained_hardware: bool,
    ) -> CapabilityProfile {
        CapabilityProfile {
            narrow_viewport,
            mobile_user_agent,
            slow_connection,
            constrained_hardware,
        }
    }

    #[test]
    fn slow_connection_always_selects_low() {
        for narrow in [false, true] {
            for mobile in [false, true] {
                for constrained in [false, true] {
                    let p = profile(narrow, mobile, true, constrained);
                    assert_eq!(QualityTier::select(&p), QualityTier::Low, "{p:?}");
                }
            }
        }
    }

    #[test]
    fn unconstrained_profile_selects_high() {
        let p = CapabilityProfile::unconstrained();
        assert_eq!(QualityTier::select(&p), QualityTier::High);
    }

    #[test]
    fn small_display_on_constrained_hardware_selects_low() {
        assert_eq!(
            QualityTier::select(&profile(true, false, false, true)),
            QualityTier::Low
        );
        assert_eq!(
            QualityTier::select(&profile(false, true, false, true)),
            QualityTier::Low
        );
    }

    #[test]
    fn single_constraint_selects_medium() {
        assert_eq!(
            QualityTier::select(&profile(true, false, false, false)),
            QualityTier::Medium
        );
        assert_eq!(
            QualityTier::select(&profile(false, true, false, false)),
            QualityTier::Medium
        );
        assert_eq!(
            QualityTier::select(&profile(false, false, false, true)),
            QualityTier::Medium
        );
    }

    #[test]
    fn high_settings_clamp_device_pixel_ratio() {
        let policy = TierPolicy::default();
        let settings = policy.settings_for(QualityTier::High, Some(3.0));
        assert_eq!(settings.pixel_ratio_cap, 2.0);
        assert!(settings.shadows_enabled);
        assert!(settings.antialias_enabled);
        assert_eq!(settings.shadow_map_size, 1024);

        let settings = policy.settings_for(QualityTier::High, Some(1.25));
        assert_eq!(settings.pixel_ratio_cap, 1.25);
    }

    #[test]
    fn reduced_tiers_disable_shadows_and_antialiasing() {
        let policy = TierPolicy::default();
        for tier in [QualityTier::Low, QualityTier::Medium] {
            let settings = policy.settings_for(tier, Some(3.0));
            assert!(!settings.shadows_enabled);
            assert!(!settings.antialias_enabled);
        }
        assert_eq!(
            policy.settings_for(QualityTier::Low, None).pixel_ratio_cap,
            1.0
        );
        assert_eq!(
            policy
                .settings_for(QualityTier::Medium, None)
                .shadow_map_size,
            512
        );
    }

    #[test]
    fn medium_shadow_map_size_is_configurable() {
        let policy = TierPolicy {
            medium_shadow_map_size: 768,
            ..TierPolicy::default()
        };
        assert_eq!(
            policy
                .settings_for(QualityTier::Medium, None)
                .shadow_map_size,
            768
        );
    }

    #[test]
    fn tier_ordering_drives_reduced_asset_preference() {
        assert!(QualityTier::Low.prefers_reduced_assets());
        assert!(QualityTier::Medium.prefers_reduced_assets());
        assert!(!QualityTier::High.prefers_reduced_assets());
    }
}

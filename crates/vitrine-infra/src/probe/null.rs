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

//! The probe for contexts with no capability surface at all.

use vitrine_core::capability::{EnvironmentProbe, HardwareHints, NetworkHints, Viewport};

/// Answers every capability question with "unknown".
///
/// This models the server-rendered context: detection fails open, the
/// selected tier is High, and the real client re-evaluates once it can.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullProbe;

impl EnvironmentProbe for NullProbe {
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

#[cfg(test)]
mod tests {
    use super::*;
    use vitrine_core::capability::CapabilityProfile;
    use vitrine_core::quality::QualityTier;

    #[test]
    fn no_signals_select_the_high_tier() {
        let profile = CapabilityProfile::detect(&NullProbe);
        assert_eq!(profile, CapabilityProfile::unconstrained());
        assert_eq!(QualityTier::select(&profile), QualityTier::High);
    }
}

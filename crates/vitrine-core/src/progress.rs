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

//! Aggregation of transfer and decode progress into one displayable percent.

/// Share of the 0–100 range reserved for the byte transfer.
///
/// The remainder covers decode/processing, so the bar does not sit at 100
/// while client-side work is still running.
pub const TRANSFER_PORTION: f32 = 80.0;

/// Aggregates loader progress into a single 0–100 percentage.
///
/// The percentage is monotonically non-decreasing for the reporter's
/// lifetime; a fresh reporter is created when the session's asset key
/// changes, which is the only way the displayed value may reset.
#[derive(Debug, Clone, Default)]
pub struct ProgressReporter {
    percent: f32,
}

impl ProgressReporter {
    /// Creates a reporter at zero percent.
    pub fn new() -> Self {
        Self::default()
    }

    /// Current percentage, in `[0.0, 100.0]`.
    pub fn percent(&self) -> f32 {
        self.percent
    }

    /// Current percentage rounded for display.
    pub fn rounded(&self) -> u8 {
        self.percent.round() as u8
    }

    /// Whether decode has been confirmed and the session is fully loaded.
    pub fn is_complete(&self) -> bool {
        self.percent >= 100.0
    }

    /// Records transfer progress of `loaded` out of `total` bytes.
    ///
    /// Scaled into the transfer portion of the range. When the transport
    /// cannot report a total, the value holds until completion rather than
    /// guessing. Returns the updated percentage.
    pub fn on_transfer(&mut self, loaded: u64, total: Option<u64>) -> f32 {
        if let Some(total) = total.filter(|t| *t > 0) {
            let fraction = (loaded as f32 / total as f32).clamp(0.0, 1.0);
            self.advance_to(fraction * TRANSFER_PORTION);
        }
        self.percent
    }

    /// Records that every byte of the resource has arrived.
    pub fn on_transfer_complete(&mut self) -> f32 {
        self.advance_to(TRANSFER_PORTION);
        self.percent
    }

    /// Records that the resource was confirmed decodable.
    pub fn on_decode_complete(&mut self) -> f32 {
        self.advance_to(100.0);
        self.percent
    }

    fn advance_to(&mut self, target: f32) {
        self.percent = self.percent.max(target.min(100.0));
    }

    /// Human-readable status for the current percentage.
    ///
    /// Presentation mapping only; nothing in the loader branches on it.
    pub fn status_text(&self) -> &'static str {
        if self.percent < 30.0 {
            "Downloading..."
        } else if self.percent < 70.0 {
            "Processing..."
        } else if self.percent < 100.0 {
            "Almost ready..."
        } else {
            "Loading..."
        }
    }
}

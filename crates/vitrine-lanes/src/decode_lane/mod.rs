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

//! Decode lanes that confirm fetched bytes are a usable model.

mod glb;

pub use glb::GlbDecodeLane;

use std::error::Error;
use vitrine_core::asset::Model3d;

/// A decoder that turns raw resource bytes into a [`Model3d`].
///
/// This is the CPU-intensive half of asset loading. A lane's success is the
/// loader's "confirmed decodable" signal: byte completion alone never
/// advances a session past the decode phase.
pub trait ModelDecodeLane: Send + Sync {
    /// Parses `bytes` into a model summary.
    fn decode(&self, bytes: &[u8]) -> Result<Model3d, Box<dyn Error + Send + Sync>>;
}

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

//! The progressive loader and upgrade orchestrator for the model showcase.
//!
//! This module provides the tactical logic above the loading lanes: it
//! resolves each display request to a concrete asset variant for the
//! current quality tier, serves constrained devices a reduced model first,
//! and transparently replaces it with the full-quality model once every
//! member of the background upgrade batch is confirmed decodable.
//!
//! The agent is single-threaded in the way the UI runtime is: lanes do
//! their fetching and decoding on worker threads, but every state mutation
//! happens inside [`ViewerAgent::pump`] on the owner's thread, so sessions
//! need no locks and the viewer never observes a half-applied transition.

mod agent;
mod events;
mod session;
mod worker;

pub use agent::{UpgradeScope, ViewerAgent};
pub use events::ViewerEvent;
pub use session::{PathSet, ViewerState};

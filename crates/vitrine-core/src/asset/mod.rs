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

//! Primitive types for loaded showcase assets.
//!
//! This module is the common language shared by the cache, the decode
//! lanes, and the orchestrator. It knows nothing about how assets are
//! fetched or stored; it only defines what a loaded asset is and how
//! ownership of one is shared.

mod handle;
mod model;

pub use handle::*;
pub use model::*;

/// A marker trait for types the loading system can manage.
///
/// The supertraits carry the guarantees background loading relies on:
/// `Send + Sync` so a decoded asset can cross from a worker thread into
/// the shared cache, and `'static` so handles can outlive the session
/// that produced them.
pub trait Asset: Send + Sync + 'static {}

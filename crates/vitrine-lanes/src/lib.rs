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

//! # Vitrine Lanes
//!
//! The mechanical "data plane" of the showcase loader: fetch lanes that
//! move resource bytes with transfer-progress reporting, and decode lanes
//! that turn those bytes into confirmed-decodable model assets. Lanes hold
//! no session state; the orchestrator in `vitrine-agents` drives them.

pub mod decode_lane;
pub mod fetch_lane;

pub use decode_lane::{GlbDecodeLane, ModelDecodeLane};
pub use fetch_lane::{FetchLane, FetchLaneError, FsFetchLane, HttpFetchLane, TransferProgress};

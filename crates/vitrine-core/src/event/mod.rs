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

//! Generic primitives for event-driven communication.
//!
//! The [`EventBus`] is deliberately generic over its event type: the
//! orchestrator in `vitrine-agents` defines the concrete viewer events,
//! and this crate stays free of them. Presentation collaborators subscribe
//! to the bus instead of being polled.

mod bus;

pub use self::bus::EventBus;

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

use log;

/// A generic, thread-safe event channel.
///
/// Wraps an unbounded flume channel so the publishing side never blocks a
/// callback turn. The bus is generic over the event type `T`, keeping this
/// crate decoupled from the concrete events higher-level crates define.
#[derive(Debug)]
pub struct EventBus<T: Clone + Send + Sync + 'static> {
    sender: flume::Sender<T>,
    receiver: flume::Receiver<T>,
}

impl<T: Clone + Send + Sync + 'static> EventBus<T> {
    /// Creates a new bus with an unbounded channel.
    pub fn new() -> Self {
        let (sender, receiver) = flume::unbounded();
        Self { sender, receiver }
    }

    /// Sends an event, logging instead of panicking if every receiver is gone.
    pub fn publish(&self, event: T) {
        if let Err(e) = self.sender.send(event) {
            log::error!("Failed to publish event: {e}. Receiver likely disconnected.");
        }
    }

    /// Returns a clone of the sender end of the channel.
    pub fn sender(&self) -> flume::Sender<T> {
        self.sender.clone()
    }

    /// Returns a reference to the receiver end of the channel.
    ///
    /// Intended for the consumer that drains events; flume receivers can be
    /// cloned from it if several subscribers are needed.
    pub fn receiver(&self) -> &flume::Receiver<T> {
        &self.receiver
    }
}

impl<T: Clone + Send + Sync + 'static> Default for EventBus<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use flume::TryRecvError;
    use std::time::Duration;

    #[derive(Debug, Clone, PartialEq)]
    enum TestEvent {
        Progress(u8),
        Ready { path: String },
    }

    #[test]
    fn publish_then_receive() {
        let bus = EventBus::<TestEvent>::new();
        bus.publish(TestEvent::Ready {
            path: "/lion.glb".to_string(),
        });

        match bus.receiver().recv_timeout(Duration::from_millis(100)) {
            Ok(event) => assert_eq!(
                event,
                TestEvent::Ready {
                    path: "/lion.glb".to_string()
                }
            ),
            Err(e) => panic!("Failed to receive event: {e:?}"),
        }
    }

    #[test]
    fn events_arrive_in_publish_order() {
        let bus = EventBus::<TestEvent>::new();
        for pct in [10, 40, 80] {
            bus.publish(TestEvent::Progress(pct));
        }
        let received: Vec<_> = (0..3)
            .map(|_| bus.receiver().try_recv().expect("event missing"))
            .collect();
        assert_eq!(
            received,
            vec![
                TestEvent::Progress(10),
                TestEvent::Progress(40),
                TestEvent::Progress(80)
            ]
        );
        assert_eq!(bus.receiver().try_recv(), Err(TryRecvError::Empty));
    }

    #[test]
    fn detached_sender_keeps_working_across_threads() {
        let bus = EventBus::<TestEvent>::new();
        let sender = bus.sender();
        let handle = std::thread::spawn(move || {
            sender.send(TestEvent::Progress(100)).expect("send failed");
        });
        handle.join().expect("thread join failed");
        assert_eq!(
            bus.receiver()
                .recv_timeout(Duration::from_secs(1))
                .expect("receive failed"),
            TestEvent::Progress(100)
        );
    }

    #[test]
    fn publish_after_receiver_drop_does_not_panic() {
        let bus = EventBus::<TestEvent>::new();
        let sender = bus.sender();
        drop(bus);
        assert!(sender.send(TestEvent::Progress(1)).is_err());
    }
}

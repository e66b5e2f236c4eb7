//! Broadcast bus for gateway audit events.
//!
//! A thin wrapper over a tokio broadcast channel. Publishing never blocks
//! and never fails: with no subscribers the event is simply dropped, and a
//! lagging subscriber loses the oldest events first.

use shops_types::GatewayEvent;
use tokio::sync::broadcast;

/// Broadcast channel carrying audit events to any number of subscribers.
#[derive(Clone)]
pub struct EventBus {
	sender: broadcast::Sender<GatewayEvent>,
}

impl EventBus {
	/// Creates a bus retaining up to `capacity` undelivered events per
	/// subscriber.
	pub fn new(capacity: usize) -> Self {
		let (sender, _) = broadcast::channel(capacity);
		Self { sender }
	}

	/// A sender handle for components that publish events.
	pub fn sender(&self) -> broadcast::Sender<GatewayEvent> {
		self.sender.clone()
	}

	/// Subscribes to events published after this call.
	pub fn subscribe(&self) -> broadcast::Receiver<GatewayEvent> {
		self.sender.subscribe()
	}

	/// Publishes an event to all current subscribers.
	pub fn publish(&self, event: GatewayEvent) {
		let _ = self.sender.send(event);
	}
}

//! Connection registry for WebSocket clients.
//!
//! Maps each authenticated user to the single live connection that receives
//! their battle events. A new `join_arena` from another socket replaces the
//! binding and closes the superseded socket.

use dashmap::DashMap;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use questarena_domain::{ConnectionId, Loadout, UserId};
use questarena_shared::ServerMessage;

use crate::infrastructure::ports::ConnectionPort;

/// A user's live connection.
#[derive(Debug, Clone)]
pub struct Binding {
    pub connection_id: ConnectionId,
    pub sender: mpsc::Sender<ServerMessage>,
    pub display_name: String,
    pub loadout: Loadout,
    /// Cancelled when this binding is superseded by another connection
    pub close: CancellationToken,
}

/// Manages user -> connection bindings.
#[derive(Default)]
pub struct ConnectionRegistry {
    bindings: DashMap<UserId, Binding>,
}

impl ConnectionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind `user_id` to a connection, returning the binding it replaced.
    ///
    /// A replaced binding from a different connection has its close token
    /// cancelled so that socket shuts down.
    pub fn bind(&self, user_id: UserId, binding: Binding) -> Option<Binding> {
        let connection_id = binding.connection_id;
        let previous = self.bindings.insert(user_id.clone(), binding);

        if let Some(previous) = &previous {
            if previous.connection_id != connection_id {
                tracing::info!(
                    user_id = %user_id,
                    old_connection = %previous.connection_id,
                    new_connection = %connection_id,
                    "Binding superseded by new connection"
                );
                previous.close.cancel();
            }
        } else {
            tracing::debug!(user_id = %user_id, connection_id = %connection_id, "User bound");
        }
        previous
    }

    /// Remove the binding only if it still belongs to `connection_id`.
    pub fn unbind_connection(&self, user_id: &UserId, connection_id: ConnectionId) -> bool {
        self.bindings
            .remove_if(user_id, |_, binding| binding.connection_id == connection_id)
            .is_some()
    }

    pub fn lookup(&self, user_id: &UserId) -> Option<Binding> {
        self.bindings.get(user_id).map(|b| b.clone())
    }

    pub fn is_bound_to(&self, user_id: &UserId, connection_id: ConnectionId) -> bool {
        self.bindings
            .get(user_id)
            .is_some_and(|b| b.connection_id == connection_id)
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }
}

impl ConnectionPort for ConnectionRegistry {
    fn send_to_user(&self, user_id: &UserId, message: ServerMessage) -> bool {
        let Some(sender) = self.bindings.get(user_id).map(|b| b.sender.clone()) else {
            return false;
        };
        match sender.try_send(message) {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!(user_id = %user_id, error = %e, "Failed to send message to user");
                false
            }
        }
    }
}

use crate::game::models::{Game, GameId, PlayerId};
use crate::game::registry::GameRegistry;

use std::sync::Arc;
use tokio::sync::broadcast;
use tokio::sync::RwLock;

/// Shared server state. The registry sits behind one RwLock, which is the
/// single serialization point for all mutating operations; the broadcast
/// channel fans game snapshots out to subscribed sockets.
#[derive(Clone)]
pub struct AppState {
    pub registry: Arc<RwLock<GameRegistry>>,
    pub tx: broadcast::Sender<(GameId, Game)>,
}

impl AppState {
    pub fn new(owner: PlayerId, tx: broadcast::Sender<(GameId, Game)>) -> Self {
        AppState {
            registry: Arc::new(RwLock::new(GameRegistry::new(owner))),
            tx,
        }
    }
}

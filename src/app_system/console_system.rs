use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::{error, info};

use crate::actor_framework::{Poller, ResourceActor};
use crate::api::DrillApi;
use crate::clients::{DrillClient, SessionClient, UserClient};
use crate::clock::SharedClock;
use crate::domain::{Drill, User, UserDrillSession};

const STORE_BUFFER: usize = 32;

/// The main application system that orchestrates all stores.
///
/// Responsible for starting the store actors, handing out clients, owning
/// the background pollers and shutting everything down.
pub struct ConsoleSystem {
    pub user_client: UserClient,
    pub drill_client: DrillClient,
    pub session_client: SessionClient,
    clock: SharedClock,
    pollers: Vec<Poller>,
    handles: Vec<JoinHandle<()>>,
}

impl ConsoleSystem {
    pub fn new(api: Arc<dyn DrillApi>, clock: SharedClock) -> Self {
        let (user_actor, user_store) = ResourceActor::<User>::new(STORE_BUFFER, api.clone());
        let user_client = UserClient::new(user_store, api.clone());
        let user_handle = tokio::spawn(user_actor.run());

        let (drill_actor, drill_store) = ResourceActor::<Drill>::new(STORE_BUFFER, api.clone());
        let drill_client = DrillClient::new(drill_store, api.clone());
        let drill_handle = tokio::spawn(drill_actor.run());

        let (session_actor, session_store) =
            ResourceActor::<UserDrillSession>::new(STORE_BUFFER, api);
        let session_client = SessionClient::new(session_store);
        let session_handle = tokio::spawn(session_actor.run());

        info!("Console system started");
        Self {
            user_client,
            drill_client,
            session_client,
            clock,
            pollers: Vec::new(),
            handles: vec![user_handle, drill_handle, session_handle],
        }
    }

    pub fn clock(&self) -> SharedClock {
        self.clock.clone()
    }

    /// Refreshes drills and sessions every `period` until shutdown.
    /// Calling it again replaces the running pollers.
    pub fn start_polling(&mut self, period: Duration) {
        info!(period_secs = period.as_secs(), "Starting background polling");
        self.pollers = vec![
            Poller::spawn(self.drill_client.store().clone(), period),
            Poller::spawn(self.session_client.store().clone(), period),
        ];
    }

    pub fn polling_kinds(&self) -> Vec<&'static str> {
        self.pollers.iter().map(Poller::kind).collect()
    }

    pub async fn shutdown(self) -> Result<(), String> {
        info!("Shutting down system...");
        let Self {
            user_client,
            drill_client,
            session_client,
            pollers,
            handles,
            ..
        } = self;

        // pollers hold store clients; they go first so the inboxes close
        drop(pollers);
        drop(user_client);
        drop(drill_client);
        drop(session_client);

        for handle in handles {
            if let Err(e) = handle.await {
                error!("Store task failed: {:?}", e);
                return Err(format!("Store task failed: {:?}", e));
            }
        }

        info!("System shutdown complete.");
        Ok(())
    }
}

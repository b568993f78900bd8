//! Completion-callback adapters over [`Session`].
//!
//! Each `spawn_*` call starts one task on the current tokio runtime and
//! returns immediately. Callbacks run on whichever runtime worker finishes
//! the request, never on the caller's context, and each fires at most once.
//! Calls are independent; nothing orders one callback against another.
//!
//! These must be called from within a tokio runtime.

use tokio::task::JoinHandle;
use tracing::warn;

use crate::error::ClientError;
use crate::session::Session;
use crate::types::{Brand, Car, Operation};

impl Session {
    /// Load every car, reporting through `on_complete` or `on_error`.
    ///
    /// A non-200 response that carries a body fires neither callback.
    pub fn spawn_load_cars<C, E>(&self, on_complete: C, on_error: E) -> JoinHandle<()>
    where
        C: FnOnce(Vec<Car>) + Send + 'static,
        E: FnOnce(ClientError) + Send + 'static,
    {
        let session = self.clone();
        tokio::spawn(async move {
            match session.load_cars().await {
                Ok(Some(cars)) => on_complete(cars),
                Ok(None) => warn!("car listing returned an unexpected status, no callback fired"),
                Err(e) => on_error(e),
            }
        })
    }

    /// Load the brands list; `on_complete` receives `None` on any failure.
    pub fn spawn_load_brands<C>(&self, on_complete: C) -> JoinHandle<()>
    where
        C: FnOnce(Option<Vec<Brand>>) + Send + 'static,
    {
        let session = self.clone();
        tokio::spawn(async move { on_complete(session.load_brands().await) })
    }

    /// Run a write operation; `on_complete` receives whether it succeeded.
    pub fn spawn_apply<C>(&self, car: Car, operation: Operation, on_complete: C) -> JoinHandle<()>
    where
        C: FnOnce(bool) + Send + 'static,
    {
        let session = self.clone();
        tokio::spawn(async move { on_complete(session.apply(&car, operation).await) })
    }
}

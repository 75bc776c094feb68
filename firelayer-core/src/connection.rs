//! The process-wide store connection.
//!
//! Models do not carry a backend handle. Every primitive looks up the connection
//! installed here, which is initialized once per process. Tests substitute a double
//! through [`Connection::override_with`], which is scoped to the current thread.

use std::{
    cell::RefCell,
    sync::{Arc, LazyLock, PoisonError, RwLock},
};
use tracing::info;

use crate::{
    backend::{DynStoreBackend, StoreBackend, StoreBackendBuilder},
    error::{StoreError, StoreResult},
};

type SharedBackend = Arc<dyn DynStoreBackend>;

static CONNECTION: LazyLock<RwLock<Option<SharedBackend>>> = LazyLock::new(|| RwLock::new(None));

thread_local! {
    static OVERRIDE: RefCell<Option<SharedBackend>> = const { RefCell::new(None) };
}

/// Entry points for installing and reading the process-wide connection.
#[derive(Debug, Clone, Copy)]
pub struct Connection;

impl Connection {
    /// Installs `backend` as the process-wide connection.
    ///
    /// Initialization happens at most once; calling this again while a connection is
    /// installed is a no-op.
    ///
    /// # Returns
    ///
    /// Returns `true` if this call installed the backend.
    pub fn initialize<B>(backend: B) -> bool
    where
        B: StoreBackend + 'static,
    {
        let mut slot = CONNECTION
            .write()
            .unwrap_or_else(PoisonError::into_inner);

        if slot.is_some() {
            return false;
        }

        info!(backend = ?backend, "initializing store connection");
        *slot = Some(Arc::new(backend));
        true
    }

    /// Builds a backend and installs it, unless a connection is already installed.
    ///
    /// # Errors
    ///
    /// Returns any error the builder reports.
    pub async fn initialize_with<T>(builder: T) -> StoreResult<bool>
    where
        T: StoreBackendBuilder,
        T::Backend: 'static,
    {
        if Self::is_initialized() {
            return Ok(false);
        }

        let backend = builder.build().await?;
        Ok(Self::initialize(backend))
    }

    /// Returns `true` once the process-wide connection has been installed.
    pub fn is_initialized() -> bool {
        CONNECTION
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some()
    }

    /// Substitutes `backend` for the connection on the current thread until the
    /// returned guard is dropped.
    ///
    /// # Example
    ///
    /// ```ignore
    /// let _guard = Connection::override_with(InMemoryStore::new());
    /// let book = Book::find("b1").await?;
    /// ```
    pub fn override_with<B>(backend: B) -> ConnectionOverride
    where
        B: StoreBackend + 'static,
    {
        let backend: SharedBackend = Arc::new(backend);
        let previous = OVERRIDE.with(|slot| slot.borrow_mut().replace(backend));

        ConnectionOverride { previous }
    }

    /// Returns the backend in effect for the current thread.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::NotConnected`] if neither an override nor the
    /// process-wide connection is installed.
    pub fn current() -> StoreResult<Arc<dyn DynStoreBackend>> {
        if let Some(backend) = OVERRIDE.with(|slot| slot.borrow().clone()) {
            return Ok(backend);
        }

        CONNECTION
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
            .ok_or(StoreError::NotConnected)
    }
}

/// Restores the previous thread-local override when dropped.
#[must_use = "the override is removed as soon as the guard is dropped"]
#[derive(Debug)]
pub struct ConnectionOverride {
    previous: Option<SharedBackend>,
}

impl Drop for ConnectionOverride {
    fn drop(&mut self) {
        let previous = self.previous.take();
        OVERRIDE.with(|slot| *slot.borrow_mut() = previous);
    }
}

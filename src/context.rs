use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use anyhow::Result;

use crate::backend::{Backend, HttpBackend};
use crate::config::Config;
use crate::display::{SharedSurface, Surface};

/// Everything the handlers need, passed in explicitly.
#[derive(Clone)]
pub struct DashContext {
    pub backend: Arc<dyn Backend + Send + Sync>,
    pub surface: SharedSurface,
    pub config: Config,
}

impl DashContext {
    pub fn new(backend: Arc<dyn Backend + Send + Sync>, surface: SharedSurface, config: Config) -> Self {
        Self {
            backend,
            surface,
            config,
        }
    }

    /// Context talking HTTP to `config.backend_url`.
    pub fn http(config: Config, surface: SharedSurface) -> Result<Self> {
        let backend = Arc::new(HttpBackend::new(&config)?);
        Ok(Self::new(backend, surface, config))
    }

    /// Lock the surface. Poisoning is ignored: element writes are independent.
    pub fn surface(&self) -> MutexGuard<'_, dyn Surface + Send + 'static> {
        self.surface.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

pub fn shared<S: Surface + Send + 'static>(surface: S) -> Arc<Mutex<S>> {
    Arc::new(Mutex::new(surface))
}

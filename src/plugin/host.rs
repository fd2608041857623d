use std::any::Any;
use std::collections::HashMap;
use std::fmt;

use futures_util::future::BoxFuture;
use thiserror::Error;

/// Lifecycle events a plugin can hook into
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Hook {
    /// Runs once when the host shuts down
    OnClose,
}

impl fmt::Display for Hook {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Hook::OnClose => write!(f, "onClose"),
        }
    }
}

/// Host-side failure
#[derive(Error, Debug)]
pub enum HostError {
    /// `decorate` was called twice with the same key
    #[error("decorator \"{0}\" has already been added")]
    AlreadyDecorated(String),

    /// One or more shutdown hooks failed; every hook was still run
    #[error("{} shutdown hook(s) failed: {}", .failures.len(), .failures.join("; "))]
    Shutdown { failures: Vec<String> },
}

type HookFn = Box<dyn FnOnce() -> BoxFuture<'static, anyhow::Result<()>> + Send>;

/// Plugin host
///
/// Holds the decorations plugins attach during startup and the hooks they
/// register. Plugins are registered one after another against a `&mut`
/// borrow, so checks against existing decorations never race.
#[derive(Default)]
pub struct PluginHost {
    decorations: HashMap<String, Box<dyn Any + Send + Sync>>,
    hooks: Vec<(Hook, HookFn)>,
}

impl PluginHost {
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach `value` under `key`
    pub fn decorate<T>(&mut self, key: &str, value: T) -> Result<(), HostError>
    where
        T: Any + Send + Sync,
    {
        if self.decorations.contains_key(key) {
            return Err(HostError::AlreadyDecorated(key.to_string()));
        }

        tracing::debug!(decorator = key, "Decorating host");
        self.decorations.insert(key.to_string(), Box::new(value));
        Ok(())
    }

    pub fn has_decorator(&self, key: &str) -> bool {
        self.decorations.contains_key(key)
    }

    /// Decoration under `key`, if present and of type `T`
    pub fn decoration<T: Any>(&self, key: &str) -> Option<&T> {
        self.decorations.get(key)?.downcast_ref::<T>()
    }

    pub fn decoration_mut<T: Any>(&mut self, key: &str) -> Option<&mut T> {
        self.decorations.get_mut(key)?.downcast_mut::<T>()
    }

    /// Register `f` to run on `hook`
    pub fn add_hook<F>(&mut self, hook: Hook, f: F)
    where
        F: FnOnce() -> BoxFuture<'static, anyhow::Result<()>> + Send + 'static,
    {
        tracing::debug!(%hook, "Hook added");
        self.hooks.push((hook, Box::new(f)));
    }

    pub fn hook_count(&self, hook: Hook) -> usize {
        self.hooks.iter().filter(|(h, _)| *h == hook).count()
    }

    /// Run every `onClose` hook once, in registration order
    ///
    /// A failing hook is logged and does not stop the rest. Hooks are
    /// consumed, so a second call does nothing.
    #[tracing::instrument(skip(self), fields(hooks = self.hook_count(Hook::OnClose)))]
    pub async fn close(&mut self) -> Result<(), HostError> {
        let (on_close, rest): (Vec<_>, Vec<_>) = std::mem::take(&mut self.hooks)
            .into_iter()
            .partition(|(hook, _)| *hook == Hook::OnClose);
        self.hooks = rest;

        let mut failures = Vec::new();
        for (index, (_, hook)) in on_close.into_iter().enumerate() {
            if let Err(e) = hook().await {
                tracing::error!(hook = index, error = %e, "Shutdown hook failed");
                failures.push(format!("{e:#}"));
            }
        }

        if failures.is_empty() {
            tracing::info!("Host closed");
            Ok(())
        } else {
            Err(HostError::Shutdown { failures })
        }
    }
}

impl fmt::Debug for PluginHost {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut decorators: Vec<&String> = self.decorations.keys().collect();
        decorators.sort();

        f.debug_struct("PluginHost")
            .field("decorators", &decorators)
            .field("hooks", &self.hooks.len())
            .finish()
    }
}

//! Request-scoped propagation context and logger binding.
//!
//! A `Context` is an immutable chain of typed bindings plus an optional
//! deadline. Deriving a child never changes the parent; clones are cheap.

use std::any::{Any, TypeId};
use std::fmt;
use std::sync::Arc;
use std::time::{Duration, SystemTime};

use crate::logger::{nop, Logger};

struct Binding {
    key: TypeId,
    value: Arc<dyn Any + Send + Sync>,
    parent: Option<Arc<Binding>>,
}

/// Immutable request context.
#[derive(Clone, Default)]
pub struct Context {
    deadline: Option<SystemTime>,
    bindings: Option<Arc<Binding>>,
}

impl Context {
    /// Empty context with no deadline and no bindings.
    pub fn background() -> Self {
        Self::default()
    }

    /// Derive a context that expires at `deadline`.
    ///
    /// An earlier deadline already present on the parent is kept.
    pub fn with_deadline(&self, deadline: SystemTime) -> Self {
        let deadline = match self.deadline {
            Some(current) if current < deadline => current,
            _ => deadline,
        };
        Self {
            deadline: Some(deadline),
            bindings: self.bindings.clone(),
        }
    }

    pub fn with_timeout(&self, timeout: Duration) -> Self {
        self.with_deadline(SystemTime::now() + timeout)
    }

    pub fn deadline(&self) -> Option<SystemTime> {
        self.deadline
    }

    /// Derive a context binding `value` under the key type `K`.
    pub fn with_value<K: 'static, V: Any + Send + Sync>(&self, value: V) -> Self {
        Self {
            deadline: self.deadline,
            bindings: Some(Arc::new(Binding {
                key: TypeId::of::<K>(),
                value: Arc::new(value),
                parent: self.bindings.clone(),
            })),
        }
    }

    /// Nearest value bound under `K`, if any.
    pub fn value<K: 'static>(&self) -> Option<&(dyn Any + Send + Sync)> {
        let key = TypeId::of::<K>();
        let mut node = self.bindings.as_deref();
        while let Some(binding) = node {
            if binding.key == key {
                return Some(binding.value.as_ref());
            }
            node = binding.parent.as_deref();
        }
        None
    }
}

impl fmt::Debug for Context {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut depth = 0;
        let mut node = self.bindings.as_deref();
        while let Some(binding) = node {
            depth += 1;
            node = binding.parent.as_deref();
        }
        f.debug_struct("Context")
            .field("deadline", &self.deadline)
            .field("bindings", &depth)
            .finish()
    }
}

struct LoggerKey;

/// Derive a context carrying `logger`.
pub fn bind_logger(parent: &Context, logger: Arc<dyn Logger>) -> Context {
    parent.with_value::<LoggerKey, Arc<dyn Logger>>(logger)
}

/// Logger bound to `ctx`, or the no-op logger when none is bound.
pub fn resolve_logger(ctx: &Context) -> Arc<dyn Logger> {
    ctx.value::<LoggerKey>()
        .and_then(|value| value.downcast_ref::<Arc<dyn Logger>>())
        .cloned()
        .unwrap_or_else(nop)
}

use crate::graph::layout::Dimensions;
use std::sync::{Arc, Mutex, PoisonError, Weak};

type Listener = Arc<dyn Fn(Dimensions) + Send + Sync>;

struct ViewportInner {
    dimensions: Dimensions,
    next_id: u64,
    listeners: Vec<(u64, Listener)>,
}

/// Measured size of the graph's container. Components that re-layout on
/// resize subscribe here and hold the returned [`Subscription`]; dropping
/// it unsubscribes.
#[derive(Clone)]
pub struct Viewport {
    inner: Arc<Mutex<ViewportInner>>,
}

impl Viewport {
    pub fn new(width: f64, height: f64) -> Self {
        Self {
            inner: Arc::new(Mutex::new(ViewportInner {
                dimensions: Dimensions::measured(width, height),
                next_id: 0,
                listeners: Vec::new(),
            })),
        }
    }

    pub fn dimensions(&self) -> Dimensions {
        self.inner
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .dimensions
    }

    /// Record a new container measurement and notify subscribers when the
    /// capped drawing area actually changed.
    pub fn resize(&self, width: f64, height: f64) -> Dimensions {
        let dimensions = Dimensions::measured(width, height);
        let listeners: Vec<Listener> = {
            let mut inner = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
            if inner.dimensions == dimensions {
                return dimensions;
            }
            inner.dimensions = dimensions;
            inner.listeners.iter().map(|(_, l)| l.clone()).collect()
        };

        // Called outside the lock so a listener may read the viewport
        for listener in listeners {
            listener(dimensions);
        }
        dimensions
    }

    pub fn subscribe(&self, listener: impl Fn(Dimensions) + Send + Sync + 'static) -> Subscription {
        let mut inner = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        let id = inner.next_id;
        inner.next_id += 1;
        inner.listeners.push((id, Arc::new(listener)));
        Subscription {
            id,
            viewport: Arc::downgrade(&self.inner),
        }
    }

    pub fn listener_count(&self) -> usize {
        self.inner
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .listeners
            .len()
    }
}

/// Guard for a resize listener. Unsubscribes on drop.
#[must_use = "dropping the subscription unsubscribes immediately"]
pub struct Subscription {
    id: u64,
    viewport: Weak<Mutex<ViewportInner>>,
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(inner) = self.viewport.upgrade() {
            let mut inner = inner.lock().unwrap_or_else(PoisonError::into_inner);
            inner.listeners.retain(|(id, _)| *id != self.id);
        }
    }
}

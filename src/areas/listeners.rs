use std::fmt;
use std::sync::Arc;

type Listener<N> = Box<dyn FnMut(Option<&Arc<N>>)>;

/// Callbacks told about a new root (or its absence)
///
/// Listeners are called synchronously in no particular order.
pub struct Listeners<N> {
    listeners: Vec<Listener<N>>,
}

impl<N> Listeners<N> {
    pub fn add(&mut self, listener: impl FnMut(Option<&Arc<N>>) + 'static) {
        self.listeners.push(Box::new(listener));
    }

    pub fn notify(&mut self, root: Option<&Arc<N>>) {
        for listener in self.listeners.iter_mut() {
            listener(root);
        }
    }

    pub fn len(&self) -> usize {
        self.listeners.len()
    }

    pub fn is_empty(&self) -> bool {
        self.listeners.is_empty()
    }
}

impl<N> Default for Listeners<N> {
    fn default() -> Self {
        Listeners {
            listeners: Vec::new(),
        }
    }
}

impl<N> fmt::Debug for Listeners<N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Listeners")
            .field("count", &self.listeners.len())
            .finish()
    }
}

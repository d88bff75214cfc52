use prosetyped_model::Fragment;
use std::collections::HashMap;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    /// A new snapshot is ready to display.
    View,
    /// The reveal reached the end of the current tree.
    Complete,
}

#[derive(Debug, Clone, PartialEq)]
pub enum RevealEvent {
    View(Fragment),
    Complete,
}

impl RevealEvent {
    pub fn kind(&self) -> EventKind {
        match self {
            RevealEvent::View(_) => EventKind::View,
            RevealEvent::Complete => EventKind::Complete,
        }
    }
}

/// Handle returned by [`Emitter::on`], used to unregister the listener.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

type Listener = Box<dyn FnMut(&RevealEvent)>;

/// Listener registry. Listeners run synchronously in registration order.
#[derive(Default)]
pub struct Emitter {
    next_id: u64,
    listeners: HashMap<EventKind, Vec<(ListenerId, Listener)>>,
}

impl Emitter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on(&mut self, kind: EventKind, listener: impl FnMut(&RevealEvent) + 'static) -> ListenerId {
        let id = ListenerId(self.next_id);
        self.next_id += 1;
        self.listeners
            .entry(kind)
            .or_default()
            .push((id, Box::new(listener)));
        id
    }

    pub fn off(&mut self, id: ListenerId) -> bool {
        for listeners in self.listeners.values_mut() {
            if let Some(index) = listeners.iter().position(|(existing, _)| *existing == id) {
                listeners.remove(index);
                return true;
            }
        }
        false
    }

    pub fn emit(&mut self, event: &RevealEvent) {
        if let Some(listeners) = self.listeners.get_mut(&event.kind()) {
            for (_, listener) in listeners.iter_mut() {
                listener(event);
            }
        }
    }

    pub fn clear(&mut self) {
        self.listeners.clear();
    }

    pub fn listener_count(&self, kind: EventKind) -> usize {
        self.listeners.get(&kind).map_or(0, Vec::len)
    }
}

impl fmt::Debug for Emitter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Emitter")
            .field("view", &self.listener_count(EventKind::View))
            .field("complete", &self.listener_count(EventKind::Complete))
            .finish()
    }
}

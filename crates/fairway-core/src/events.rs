use std::fmt;
use std::sync::{Arc, Mutex, PoisonError};

use serde::{Deserialize, Serialize};

/// Identity of a ball within a level. Events carry nothing else.
pub type BallId = u64;

/// The discrete notifications a ball controller emits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BallEventKind {
    /// The ball was launched.
    Putt,
    /// The ball was committed to a stationary state.
    Rest,
    /// The ball entered a goal region. May repeat within a level.
    Hole,
    /// No bounds contact was recorded during the previous tick.
    /// Repeats every tick while the ball stays out.
    OutOfBounds,
}

impl BallEventKind {
    pub const ALL: [BallEventKind; 4] = [Self::Putt, Self::Rest, Self::Hole, Self::OutOfBounds];

    fn index(self) -> usize {
        match self {
            Self::Putt => 0,
            Self::Rest => 1,
            Self::Hole => 2,
            Self::OutOfBounds => 3,
        }
    }
}

impl fmt::Display for BallEventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Putt => "putt",
            Self::Rest => "rest",
            Self::Hole => "hole",
            Self::OutOfBounds => "out_of_bounds",
        };
        f.write_str(name)
    }
}

/// A single emitted event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BallEvent {
    pub ball_id: BallId,
    pub kind: BallEventKind,
}

/// Handle returned by [`EventDispatcher::subscribe`], used to unsubscribe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

/// Callback invoked synchronously when an event is emitted.
pub type Listener = Box<dyn FnMut(&BallEvent) + Send>;

/// Ordered listener lists, one per event kind.
///
/// Listeners run synchronously inside [`emit`](Self::emit), in registration
/// order. The dispatcher never suppresses repeats: every emission reaches
/// every listener registered for that kind.
#[derive(Default)]
pub struct EventDispatcher {
    listeners: [Vec<(SubscriptionId, Listener)>; 4],
    next_id: u64,
}

impl EventDispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a listener for one event kind.
    pub fn subscribe<F>(&mut self, kind: BallEventKind, listener: F) -> SubscriptionId
    where
        F: FnMut(&BallEvent) + Send + 'static,
    {
        let id = SubscriptionId(self.next_id);
        self.next_id += 1;
        self.listeners[kind.index()].push((id, Box::new(listener)));
        id
    }

    /// Register a listener for every event kind. The same closure is shared
    /// across kinds, so it is wrapped in a mutex.
    pub fn subscribe_all<F>(&mut self, listener: F) -> Vec<SubscriptionId>
    where
        F: FnMut(&BallEvent) + Send + 'static,
    {
        let shared = Arc::new(Mutex::new(listener));
        BallEventKind::ALL
            .iter()
            .map(|&kind| {
                let shared = Arc::clone(&shared);
                self.subscribe(kind, move |event: &BallEvent| {
                    let mut f = shared.lock().unwrap_or_else(PoisonError::into_inner);
                    (*f)(event);
                })
            })
            .collect()
    }

    /// Remove a listener. Returns `false` if the id was not registered.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        for list in &mut self.listeners {
            if let Some(pos) = list.iter().position(|(sid, _)| *sid == id) {
                drop(list.remove(pos));
                return true;
            }
        }
        false
    }

    /// Invoke every listener registered for `event.kind`.
    pub fn emit(&mut self, event: BallEvent) {
        let listeners = &mut self.listeners[event.kind.index()];
        tracing::trace!(
            ball_id = event.ball_id,
            kind = %event.kind,
            listeners = listeners.len(),
            "Dispatching ball event"
        );
        for (_, listener) in listeners.iter_mut() {
            listener(&event);
        }
    }

    pub fn listener_count(&self, kind: BallEventKind) -> usize {
        self.listeners[kind.index()].len()
    }
}

impl fmt::Debug for EventDispatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut map = f.debug_map();
        for kind in BallEventKind::ALL {
            map.entry(&kind, &self.listener_count(kind));
        }
        map.finish()
    }
}

/// Shareable recording sink. Clones share the same buffer.
#[derive(Debug, Clone, Default)]
pub struct EventLog {
    events: Arc<Mutex<Vec<BallEvent>>>,
}

impl EventLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// A listener closure that appends into this log.
    pub fn recorder(&self) -> impl FnMut(&BallEvent) + Send + 'static {
        let events = Arc::clone(&self.events);
        move |event: &BallEvent| {
            events
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .push(*event);
        }
    }

    /// Subscribe this log to every kind on `dispatcher`.
    pub fn attach(&self, dispatcher: &mut EventDispatcher) -> Vec<SubscriptionId> {
        dispatcher.subscribe_all(self.recorder())
    }

    pub fn snapshot(&self) -> Vec<BallEvent> {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Remove and return everything recorded so far.
    pub fn drain(&self) -> Vec<BallEvent> {
        std::mem::take(&mut *self.events.lock().unwrap_or_else(PoisonError::into_inner))
    }

    pub fn count(&self, kind: BallEventKind) -> usize {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .filter(|e| e.kind == kind)
            .count()
    }

    pub fn kinds(&self) -> Vec<BallEventKind> {
        self.snapshot().into_iter().map(|e| e.kind).collect()
    }
}

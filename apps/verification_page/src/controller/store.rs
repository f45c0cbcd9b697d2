use tracing::debug;

use super::{
    actions::Action,
    reducer::{reduce, Session},
};

type Subscriber = Box<dyn FnMut(&Session)>;

/// Holds the session and notifies subscribers, in subscription order, after
/// every dispatched action.
pub struct StateStore {
    state: Session,
    subscribers: Vec<Subscriber>,
}

impl Default for StateStore {
    fn default() -> Self {
        Self::new()
    }
}

impl StateStore {
    pub fn new() -> Self {
        Self::with_state(Session::default())
    }

    pub fn with_state(state: Session) -> Self {
        Self {
            state,
            subscribers: Vec::new(),
        }
    }

    pub fn state(&self) -> &Session {
        &self.state
    }

    pub fn subscribe(&mut self, subscriber: impl FnMut(&Session) + 'static) {
        self.subscribers.push(Box::new(subscriber));
    }

    pub fn dispatch(&mut self, action: Action) {
        debug!(action = action.name(), "store: dispatch");
        self.state = reduce(&self.state, &action);
        for subscriber in &mut self.subscribers {
            subscriber(&self.state);
        }
    }
}

#[cfg(test)]
#[path = "../tests/store_tests.rs"]
mod tests;

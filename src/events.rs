//! Rendezvous signals between catalog fetching and catalog organization

use std::collections::HashSet;
use std::sync::{Condvar, Mutex};
use std::time::Duration;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Event {
    ComponentsFetching,
    ComponentsOrganizing,
    DependenciesFetching,
    DependenciesOrganizing,
    InstallersFetching,
    InstallersOrganizing,
}

/// One-shot events: once `done`, every current and future `wait` returns.
#[derive(Debug, Default)]
pub struct EventBus {
    done: Mutex<HashSet<Event>>,
    signal: Condvar,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn done(&self, event: Event) {
        let mut done = self.done.lock().unwrap_or_else(|e| e.into_inner());
        done.insert(event);
        self.signal.notify_all();
    }

    pub fn is_done(&self, event: Event) -> bool {
        let done = self.done.lock().unwrap_or_else(|e| e.into_inner());
        done.contains(&event)
    }

    /// Block until `event` is done
    pub fn wait(&self, event: Event) {
        let mut done = self.done.lock().unwrap_or_else(|e| e.into_inner());
        while !done.contains(&event) {
            done = self.signal.wait(done).unwrap_or_else(|e| e.into_inner());
        }
    }

    /// Block until `event` is done or `timeout` elapsed; returns whether it is done
    pub fn wait_timeout(&self, event: Event, timeout: Duration) -> bool {
        let done = self.done.lock().unwrap_or_else(|e| e.into_inner());
        let (done, _) = self
            .signal
            .wait_timeout_while(done, timeout, |done| !done.contains(&event))
            .unwrap_or_else(|e| e.into_inner());
        done.contains(&event)
    }

    /// Forget an event so it can be signalled again (explicit refresh)
    pub fn reset(&self, event: Event) {
        let mut done = self.done.lock().unwrap_or_else(|e| e.into_inner());
        done.remove(&event);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn wait_returns_after_done_from_other_thread() {
        let bus = Arc::new(EventBus::new());
        let signaller = Arc::clone(&bus);
        let handle = std::thread::spawn(move || {
            std::thread::sleep(Duration::from_millis(20));
            signaller.done(Event::ComponentsFetching);
        });
        bus.wait(Event::ComponentsFetching);
        assert!(bus.is_done(Event::ComponentsFetching));
        handle.join().unwrap();
    }

    #[test]
    fn wait_timeout_reports_pending_event() {
        let bus = EventBus::new();
        assert!(!bus.wait_timeout(Event::InstallersFetching, Duration::from_millis(10)));
        bus.done(Event::InstallersFetching);
        assert!(bus.wait_timeout(Event::InstallersFetching, Duration::from_millis(10)));
        bus.reset(Event::InstallersFetching);
        assert!(!bus.is_done(Event::InstallersFetching));
    }
}

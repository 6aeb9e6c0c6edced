use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError, RwLock, Weak};

type Observer<T> = Arc<dyn Fn(&T) + Send + Sync>;

/// A value that broadcasts every update to its subscribers.
///
/// Notification is synchronous and follows subscription order. Observers
/// run outside the cell's locks, so an observer may read the cell or
/// unsubscribe others.
pub struct ObservableCell<T> {
    value: RwLock<Option<T>>,
    observers: Mutex<Vec<(u64, Observer<T>)>>,
    next_id: AtomicU64,
}

impl<T: Clone> ObservableCell<T> {
    /// Create a cell with no value.
    pub fn new() -> Self {
        Self {
            value: RwLock::new(None),
            observers: Mutex::new(Vec::new()),
            next_id: AtomicU64::new(0),
        }
    }

    /// The latest published value.
    pub fn get(&self) -> Option<T> {
        self.value.read().unwrap_or_else(PoisonError::into_inner).clone()
    }

    /// Replace the value and notify the current subscribers in order.
    pub fn publish(&self, value: T) {
        *self.value.write().unwrap_or_else(PoisonError::into_inner) = Some(value.clone());

        // Snapshot so observers registered or removed during delivery only
        // affect the next publish.
        let observers: Vec<Observer<T>> = self
            .observers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .map(|(_, observer)| Arc::clone(observer))
            .collect();
        for observer in observers {
            observer(&value);
        }
    }

    /// Register `observer` for future publishes.
    ///
    /// The observer stays registered until the returned [`Subscription`] is
    /// dropped or explicitly unsubscribed.
    pub fn subscribe<F>(self: &Arc<Self>, observer: F) -> Subscription
    where
        F: Fn(&T) + Send + Sync + 'static,
        T: Send + Sync + 'static,
    {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let observer: Observer<T> = Arc::new(observer);
        self.observers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push((id, observer));

        let cell: Weak<Self> = Arc::downgrade(self);
        Subscription {
            cancel: Some(Box::new(move || {
                if let Some(cell) = cell.upgrade() {
                    cell.remove(id);
                }
            })),
        }
    }

    /// Number of registered observers.
    pub fn subscriber_count(&self) -> usize {
        self.observers.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    fn remove(&self, id: u64) {
        self.observers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .retain(|(existing, _)| *existing != id);
    }
}

impl<T: Clone> Default for ObservableCell<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: std::fmt::Debug> std::fmt::Debug for ObservableCell<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let observers = self.observers.lock().map_or(0, |o| o.len());
        f.debug_struct("ObservableCell")
            .field("value", &self.value.read().ok().as_deref())
            .field("observers", &observers)
            .finish()
    }
}

/// Keeps an observer registered; dropping it unsubscribes.
#[must_use = "dropping a Subscription unsubscribes immediately"]
pub struct Subscription {
    cancel: Option<Box<dyn FnOnce() + Send + Sync>>,
}

impl Subscription {
    /// Stop receiving notifications.
    pub fn unsubscribe(mut self) {
        self.cancel_now();
    }

    fn cancel_now(&mut self) {
        if let Some(cancel) = self.cancel.take() {
            cancel();
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.cancel_now();
    }
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription")
            .field("active", &self.cancel.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn recorder() -> (Arc<Mutex<Vec<String>>>, impl Fn(&'static str) -> Box<dyn Fn(&u32) + Send + Sync>) {
        let log = Arc::new(Mutex::new(Vec::new()));
        let log_for = {
            let log = Arc::clone(&log);
            move |name: &'static str| -> Box<dyn Fn(&u32) + Send + Sync> {
                let log = Arc::clone(&log);
                Box::new(move |v: &u32| log.lock().unwrap().push(format!("{name}:{v}")))
            }
        };
        (log, log_for)
    }

    #[test]
    fn test_publish_notifies_in_subscription_order() {
        let cell = Arc::new(ObservableCell::<u32>::new());
        let (log, observer) = recorder();
        let _a = cell.subscribe(observer("a"));
        let _b = cell.subscribe(observer("b"));
        let _c = cell.subscribe(observer("c"));

        cell.publish(7);

        assert_eq!(*log.lock().unwrap(), vec!["a:7", "b:7", "c:7"]);
        assert_eq!(cell.get(), Some(7));
    }

    #[test]
    fn test_unsubscribed_observer_sees_nothing() {
        let cell = Arc::new(ObservableCell::<u32>::new());
        let (log, observer) = recorder();
        let a = cell.subscribe(observer("a"));
        let _b = cell.subscribe(observer("b"));

        a.unsubscribe();
        cell.publish(1);

        assert_eq!(*log.lock().unwrap(), vec!["b:1"]);
        assert_eq!(cell.subscriber_count(), 1);
    }

    #[test]
    fn test_dropping_subscription_unsubscribes() {
        let cell = Arc::new(ObservableCell::<u32>::new());
        let (log, observer) = recorder();
        {
            let _scoped = cell.subscribe(observer("scoped"));
            cell.publish(1);
        }
        cell.publish(2);
        assert_eq!(*log.lock().unwrap(), vec!["scoped:1"]);
    }

    #[test]
    fn test_subscribe_does_not_replay_current_value() {
        let cell = Arc::new(ObservableCell::<u32>::new());
        cell.publish(3);
        let (log, observer) = recorder();
        let _late = cell.subscribe(observer("late"));
        assert!(log.lock().unwrap().is_empty());
        assert_eq!(cell.get(), Some(3));
    }

    #[test]
    fn test_every_publish_notifies_even_if_unchanged() {
        let cell = Arc::new(ObservableCell::<u32>::new());
        let (log, observer) = recorder();
        let _s = cell.subscribe(observer("s"));
        cell.publish(4);
        cell.publish(4);
        assert_eq!(log.lock().unwrap().len(), 2);
    }

    #[test]
    fn test_subscription_outliving_cell_is_harmless() {
        let cell = Arc::new(ObservableCell::<u32>::new());
        let sub = cell.subscribe(|_| {});
        drop(cell);
        sub.unsubscribe();
    }

    #[test]
    fn test_observer_may_read_cell_during_publish() {
        let cell = Arc::new(ObservableCell::<u32>::new());
        let seen = Arc::new(Mutex::new(None));
        let _s = {
            let reader = Arc::downgrade(&cell);
            let seen = Arc::clone(&seen);
            cell.subscribe(move |_: &u32| {
                *seen.lock().unwrap() = reader.upgrade().and_then(|c| c.get());
            })
        };
        cell.publish(9);
        assert_eq!(*seen.lock().unwrap(), Some(9));
    }
}

use std::sync::{Arc, Mutex, Weak};

type Callback<T> = Box<dyn FnMut(&T) + Send>;

struct Entry<T> {
    id: u64,
    // Taken out of the slot while its callback runs, so a subscriber may
    // unsubscribe itself (or others) mid-dispatch without aliasing the hub.
    callback: Option<Callback<T>>,
}

struct HubInner<T> {
    next_id: u64,
    entries: Vec<Entry<T>>,
}

/// Typed in-process publish/subscribe channel between the 3D layer and the
/// overlay layer. Delivery is synchronous and in subscription order; the
/// subscriber list is snapshotted before each dispatch, so subscriptions
/// added or removed during a pass do not affect that pass.
pub struct SignalHub<T> {
    inner: Arc<Mutex<HubInner<T>>>,
}

impl<T> Default for SignalHub<T> {
    fn default() -> Self {
        Self {
            inner: Arc::new(Mutex::new(HubInner {
                next_id: 0,
                entries: Vec::new(),
            })),
        }
    }
}

impl<T> SignalHub<T> {
    /// Registers a subscriber. The returned guard unsubscribes on drop, so a
    /// UI surface that owns it stops receiving signals when it is torn down.
    pub fn subscribe(&self, callback: impl FnMut(&T) + Send + 'static) -> Subscription<T> {
        let mut inner = self.inner.lock().unwrap();
        let id = inner.next_id;
        inner.next_id += 1;
        inner.entries.push(Entry {
            id,
            callback: Some(Box::new(callback)),
        });
        Subscription {
            id,
            hub: Arc::downgrade(&self.inner),
        }
    }

    /// Delivers `signal` to every current subscriber, in subscription order.
    /// A publish with no subscribers is a no-op.
    pub fn publish(&self, signal: &T) {
        let snapshot: Vec<u64> = {
            let inner = self.inner.lock().unwrap();
            inner.entries.iter().map(|e| e.id).collect()
        };
        for id in snapshot {
            let taken = {
                let mut inner = self.inner.lock().unwrap();
                inner
                    .entries
                    .iter_mut()
                    .find(|e| e.id == id)
                    .and_then(|e| e.callback.take())
            };
            let Some(mut callback) = taken else {
                continue;
            };
            callback(signal);
            let mut inner = self.inner.lock().unwrap();
            // The entry is gone if the callback unsubscribed itself.
            if let Some(entry) = inner.entries.iter_mut().find(|e| e.id == id) {
                entry.callback = Some(callback);
            }
        }
    }

    pub fn subscriber_count(&self) -> usize {
        self.inner.lock().unwrap().entries.len()
    }
}

/// RAII handle for one subscription; dropping it releases the slot.
pub struct Subscription<T> {
    id: u64,
    hub: Weak<Mutex<HubInner<T>>>,
}

impl<T> Subscription<T> {
    pub fn unsubscribe(self) {}
}

impl<T> Drop for Subscription<T> {
    fn drop(&mut self) {
        if let Some(inner) = self.hub.upgrade() {
            let mut inner = inner.lock().unwrap();
            inner.entries.retain(|e| e.id != self.id);
        }
    }
}

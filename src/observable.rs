use tokio::sync::watch;

/// Current-value cell with multi-subscriber fan-out, backing every piece of
/// observed state in the app (cart lines, catalog mirror, auth state, report
/// results). Subscribers replay the latest value immediately and are then
/// woken on every publish.
#[derive(Debug)]
pub struct Observable<T> {
    tx: watch::Sender<T>,
}

impl<T: Clone> Observable<T> {
    pub fn new(initial: T) -> Self {
        let (tx, _rx) = watch::channel(initial);
        Self { tx }
    }

    /// Snapshot of the current value.
    pub fn get(&self) -> T {
        self.tx.borrow().clone()
    }

    /// Publish a new value, waking all subscribers.
    pub fn set(&self, value: T) {
        self.tx.send_replace(value);
    }

    /// Mutate the current value in place and publish the result.
    pub fn update(&self, f: impl FnOnce(&mut T)) {
        self.tx.send_modify(f);
    }

    pub fn subscribe(&self) -> Subscription<T> {
        Subscription {
            rx: self.tx.subscribe(),
        }
    }
}

impl<T: Clone> Clone for Observable<T> {
    fn clone(&self) -> Self {
        Self {
            tx: self.tx.clone(),
        }
    }
}

impl<T: Clone + Default> Default for Observable<T> {
    fn default() -> Self {
        Self::new(T::default())
    }
}

/// Receiving side of an [`Observable`]. Holds the latest published value;
/// dropping it simply detaches the subscriber.
#[derive(Debug, Clone)]
pub struct Subscription<T> {
    rx: watch::Receiver<T>,
}

impl<T: Clone> Subscription<T> {
    /// The latest published value (immediate replay).
    pub fn current(&self) -> T {
        self.rx.borrow().clone()
    }

    /// Wait until a new value is published. Returns `false` once the
    /// publisher has gone away, which ends any forwarding loop.
    pub async fn changed(&mut self) -> bool {
        self.rx.changed().await.is_ok()
    }

    /// Wait for the next published value and return it.
    pub async fn next(&mut self) -> Option<T> {
        if self.changed().await {
            Some(self.current())
        } else {
            None
        }
    }
}

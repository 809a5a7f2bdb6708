use model::Snowflake;
use parking_lot::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tokio::sync::oneshot;
use tracing::debug;

pub const MODAL_TIMEOUT: Duration = Duration::from_millis(240_000);

/// Events that may answer a pending modal.
pub trait ModalSubmission: Send + 'static {
    /// Custom id and actor of a modal submission, `None` for every other event.
    fn submission_key(&self) -> Option<(&str, Snowflake)>;
}

struct Subscriber<T> {
    id: u64,
    custom_id: Box<str>,
    requester_id: Snowflake,
    sender: oneshot::Sender<T>,
}

/// Hands modal submissions to the handler that opened the modal.
///
/// An entry is removed under the lock by whichever side finishes first, so a
/// submission is delivered at most once and a timed out wait never sees one.
pub struct ResponseCorrelator<T> {
    subscribers: Mutex<Vec<Subscriber<T>>>,
    next_id: AtomicU64,
}

impl<T> Default for ResponseCorrelator<T> {
    fn default() -> Self {
        Self {
            subscribers: Mutex::new(Vec::new()),
            next_id: AtomicU64::new(0),
        }
    }
}

impl<T: ModalSubmission> ResponseCorrelator<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&self, custom_id: &str, requester_id: Snowflake) -> PendingModal<'_, T> {
        let (sender, receiver) = oneshot::channel();
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);

        self.subscribers.lock().push(Subscriber {
            id,
            custom_id: Box::from(custom_id),
            requester_id,
            sender,
        });

        PendingModal {
            correlator: self,
            id,
            receiver,
        }
    }

    pub async fn await_modal_submit(
        &self,
        custom_id: &str,
        requester_id: Snowflake,
        timeout: Duration,
    ) -> Option<T> {
        self.subscribe(custom_id, requester_id).wait(timeout).await
    }

    /// Delivers `event` to the oldest matching subscriber. The event is handed back
    /// when nobody was waiting for it.
    pub fn publish(&self, event: T) -> Option<T> {
        let (custom_id, actor) = match event.submission_key() {
            Some((custom_id, actor)) => (Box::<str>::from(custom_id), actor),
            None => return Some(event),
        };

        let mut subscribers = self.subscribers.lock();
        let mut event = event;

        while let Some(position) = subscribers
            .iter()
            .position(|s| s.custom_id == custom_id && s.requester_id == actor)
        {
            let subscriber = subscribers.remove(position);
            match subscriber.sender.send(event) {
                Ok(()) => return None,
                Err(returned) => event = returned,
            }
        }

        debug!(%custom_id, %actor, "No one is waiting for this modal submission");
        Some(event)
    }

    pub fn pending(&self) -> usize {
        self.subscribers.lock().len()
    }
}

impl<T> ResponseCorrelator<T> {
    /// Returns whether the entry was still registered.
    fn unsubscribe(&self, id: u64) -> bool {
        let mut subscribers = self.subscribers.lock();
        match subscribers.iter().position(|s| s.id == id) {
            Some(position) => {
                subscribers.remove(position);
                true
            }
            None => false,
        }
    }
}

/// A registered wait for a modal submission. Dropping it deregisters the wait.
pub struct PendingModal<'a, T> {
    correlator: &'a ResponseCorrelator<T>,
    id: u64,
    receiver: oneshot::Receiver<T>,
}

impl<T> PendingModal<'_, T> {
    pub async fn wait(mut self, timeout: Duration) -> Option<T> {
        match tokio::time::timeout(timeout, &mut self.receiver).await {
            Ok(res) => res.ok(),
            Err(_) => self.expire(),
        }
    }

    /// Ends the wait once the deadline passed.
    fn expire(&mut self) -> Option<T> {
        if self.correlator.unsubscribe(self.id) {
            None
        } else {
            // publish removed the entry first, its value is already in the channel
            self.receiver.try_recv().ok()
        }
    }
}

impl<T> Drop for PendingModal<'_, T> {
    fn drop(&mut self) {
        self.correlator.unsubscribe(self.id);
    }
}

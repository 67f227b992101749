//! The frame-boundary action queue: producers enqueue actions from any
//! thread, the UI thread drains them once per frame in FIFO order.

use crate::action::Action;

/// Error returned when the queue cannot accept more actions.
#[derive(Debug, thiserror::Error)]
pub enum QueueError {
    /// The bounded channel is full.
    #[error("action queue is full (capacity {0})")]
    Full(usize),
    /// Every sender has been dropped.
    #[error("action queue is closed")]
    Closed,
}

/// A bounded multi-producer, single-consumer queue of actions.
///
/// Built on `crossbeam-channel`'s bounded channel: enqueue never blocks
/// (returns `QueueError::Full` instead), and the single consumer drains in
/// the order producers sent, which is what the frame loop's "actions are
/// applied in dequeue order" guarantee relies on.
pub struct ActionQueue {
    sender: crossbeam_channel::Sender<Action>,
    receiver: crossbeam_channel::Receiver<Action>,
}

impl ActionQueue {
    /// A queue holding at most `capacity` pending actions.
    pub fn new(capacity: usize) -> Self {
        let (sender, receiver) = crossbeam_channel::bounded(capacity);
        Self { sender, receiver }
    }

    /// A cheaply-cloneable handle producers can enqueue through.
    pub fn sender(&self) -> ActionSender {
        ActionSender { sender: self.sender.clone() }
    }

    /// Drains every currently-pending action, in enqueue order, without
    /// blocking.
    pub fn drain(&self) -> Vec<Action> {
        self.receiver.try_iter().collect()
    }
}

/// A producer handle for [`ActionQueue`]. Cheap to clone and send across
/// threads.
#[derive(Clone)]
pub struct ActionSender {
    sender: crossbeam_channel::Sender<Action>,
}

impl ActionSender {
    /// Enqueues `action`. Never blocks: a full queue returns
    /// `QueueError::Full`.
    pub fn enqueue(&self, action: Action) -> Result<(), QueueError> {
        self.sender.try_send(action).map_err(|err| match err {
            crossbeam_channel::TrySendError::Full(_) => QueueError::Full(self.sender.capacity().unwrap_or(0)),
            crossbeam_channel::TrySendError::Disconnected(_) => QueueError::Closed,
        })
    }
}

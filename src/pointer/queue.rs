use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::{TryRecvError, TrySendError};
use tracing::debug;

/// Clicks buffered between the sampler and the dispatcher
pub const CLICK_QUEUE_CAPACITY: usize = 10;

/// Screen position of a primary-button press
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClickSample {
    pub x: i32,
    pub y: i32,
}

/// Create a bounded click queue
///
/// The queue never blocks the producer: when it is full the newest click is
/// dropped and counted.
pub fn click_queue(capacity: usize) -> (ClickSender, ClickReceiver) {
    let (tx, rx) = mpsc::channel(capacity);
    let dropped = Arc::new(AtomicU64::new(0));

    (
        ClickSender {
            tx,
            dropped: Arc::clone(&dropped),
        },
        ClickReceiver { rx, dropped },
    )
}

/// Producer half of the click queue
#[derive(Debug, Clone)]
pub struct ClickSender {
    tx: mpsc::Sender<ClickSample>,
    dropped: Arc<AtomicU64>,
}

impl ClickSender {
    /// Push without waiting; false if the click was dropped
    pub fn try_push(&self, click: ClickSample) -> bool {
        match self.tx.try_send(click) {
            Ok(()) => true,
            Err(TrySendError::Full(click)) => {
                self.dropped.fetch_add(1, Ordering::Relaxed);
                debug!("Click queue full; dropped click at ({}, {})", click.x, click.y);
                false
            }
            Err(TrySendError::Closed(_)) => false,
        }
    }

    pub fn dropped(&self) -> u64 {
        self.dropped.load(Ordering::Relaxed)
    }
}

/// Consumer half of the click queue
#[derive(Debug)]
pub struct ClickReceiver {
    rx: mpsc::Receiver<ClickSample>,
    dropped: Arc<AtomicU64>,
}

impl ClickReceiver {
    /// Pop the oldest click without waiting
    pub fn try_pop(&mut self) -> Result<ClickSample, TryRecvError> {
        self.rx.try_recv()
    }

    pub fn dropped(&self) -> u64 {
        self.dropped.load(Ordering::Relaxed)
    }
}

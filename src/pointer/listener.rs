//! Pointer event listener
//!
//! Two loops run side by side while a recording or a preview is active:
//! - the sampler polls the pointer device every interval and pushes press
//!   positions onto a bounded queue, dropping clicks when it is full
//! - the dispatcher drains the queue in FIFO order and hands clicks to the
//!   sink
//!
//! Both loops poll the sink's listening flag, so they stop at most one
//! interval after the last recording or preview ends.

use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc::error::TryRecvError;
use tracing::{debug, info, warn};

use super::device::PointerDevice;
use super::queue::{click_queue, ClickReceiver, ClickSample, ClickSender, CLICK_QUEUE_CAPACITY};

/// Sampling and idle-poll interval for both loops
pub const POLL_INTERVAL: Duration = Duration::from_millis(10);

/// Receiver of dispatched clicks
pub trait ClickSink: Send + Sync {
    /// Whether the loops should keep running
    fn is_listening(&self) -> bool;

    /// Handle one click, in the order clicks were sampled
    fn on_click(&self, click: ClickSample);
}

/// Starts and tracks the sampler/dispatcher pair
///
/// The click queue belongs to the listener and outlives any one pair of
/// loops, so a loop restarted while its partner is still winding down picks
/// up where the old one left off.
pub struct PointerListener {
    device: Arc<dyn PointerDevice>,
    poll_interval: Duration,
    sender: ClickSender,
    receiver: Arc<Mutex<Option<ClickReceiver>>>,
    sampler_running: Arc<AtomicBool>,
    dispatcher_running: Arc<AtomicBool>,
}

impl PointerListener {
    pub fn new(device: Arc<dyn PointerDevice>) -> Self {
        Self::with_poll_interval(device, POLL_INTERVAL)
    }

    pub fn with_poll_interval(device: Arc<dyn PointerDevice>, poll_interval: Duration) -> Self {
        let (sender, receiver) = click_queue(CLICK_QUEUE_CAPACITY);

        Self {
            device,
            poll_interval,
            sender,
            receiver: Arc::new(Mutex::new(Some(receiver))),
            sampler_running: Arc::new(AtomicBool::new(false)),
            dispatcher_running: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Spawn whichever loops are not running
    ///
    /// Returns false when both were already active; they keep serving the
    /// sink they were started with.
    pub fn start(&self, sink: Arc<dyn ClickSink>) -> bool {
        let mut spawned = false;

        if let Some(slot) = LoopSlot::acquire(&self.sampler_running) {
            tokio::spawn(sample_loop(
                Arc::clone(&self.device),
                Arc::clone(&sink),
                self.sender.clone(),
                self.poll_interval,
                slot,
            ));
            spawned = true;
        }

        if let Some(slot) = LoopSlot::acquire(&self.dispatcher_running) {
            tokio::spawn(dispatch_loop(
                sink,
                Arc::clone(&self.receiver),
                self.poll_interval,
                slot,
            ));
            spawned = true;
        }

        if spawned {
            info!("Pointer listener started ({})", self.device.name());
        } else {
            debug!("Pointer listener already running");
        }
        spawned
    }

    /// True while either loop is still alive
    pub fn is_running(&self) -> bool {
        self.sampler_running.load(Ordering::SeqCst) || self.dispatcher_running.load(Ordering::SeqCst)
    }

    /// Clicks dropped because the queue was full
    pub fn dropped_clicks(&self) -> u64 {
        self.sender.dropped()
    }
}

/// Claim on one loop's running flag; released on drop, even by panic
struct LoopSlot {
    running: Arc<AtomicBool>,
    held: bool,
}

impl LoopSlot {
    fn acquire(running: &Arc<AtomicBool>) -> Option<Self> {
        running
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .ok()
            .map(|_| Self {
                running: Arc::clone(running),
                held: true,
            })
    }

    fn release(&mut self) {
        self.held = false;
        self.running.store(false, Ordering::SeqCst);
    }

    /// Take the flag back unless another loop claimed it meanwhile
    fn reacquire(&mut self) -> bool {
        self.held = self
            .running
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_ok();
        self.held
    }

    /// Release, then resume if the sink started listening again in between
    ///
    /// Closes the window where `start` sees the flag still set just as
    /// this loop decides to exit.
    fn keep_running(&mut self, sink: &dyn ClickSink) -> bool {
        self.release();
        sink.is_listening() && self.reacquire()
    }
}

impl Drop for LoopSlot {
    fn drop(&mut self) {
        if self.held {
            self.running.store(false, Ordering::SeqCst);
        }
    }
}

/// The queue receiver, borrowed from the listener for one dispatcher run
struct ReceiverLease {
    slot: Arc<Mutex<Option<ClickReceiver>>>,
    receiver: Option<ClickReceiver>,
}

impl ReceiverLease {
    fn take(slot: &Arc<Mutex<Option<ClickReceiver>>>) -> Option<Self> {
        let receiver = slot.lock().take()?;
        Some(Self {
            slot: Arc::clone(slot),
            receiver: Some(receiver),
        })
    }
}

impl Drop for ReceiverLease {
    fn drop(&mut self) {
        if let Some(receiver) = self.receiver.take() {
            *self.slot.lock() = Some(receiver);
        }
    }
}

async fn sample_loop(
    device: Arc<dyn PointerDevice>,
    sink: Arc<dyn ClickSink>,
    queue: ClickSender,
    interval: Duration,
    mut slot: LoopSlot,
) {
    loop {
        while sink.is_listening() {
            if device.take_press() {
                let (x, y) = device.location();
                queue.try_push(ClickSample { x, y });
            }

            tokio::time::sleep(interval).await;
        }

        if !slot.keep_running(sink.as_ref()) {
            break;
        }
    }

    info!("Pointer sampler stopped ({} clicks dropped so far)", queue.dropped());
}

async fn dispatch_loop(
    sink: Arc<dyn ClickSink>,
    receiver: Arc<Mutex<Option<ClickReceiver>>>,
    interval: Duration,
    mut slot: LoopSlot,
) {
    loop {
        let Some(mut lease) = ReceiverLease::take(&receiver) else {
            warn!("Click queue is already being drained; dispatcher exiting");
            return;
        };
        let Some(queue) = lease.receiver.as_mut() else {
            return;
        };

        loop {
            match queue.try_pop() {
                Ok(click) => sink.on_click(click),
                Err(TryRecvError::Empty) => {
                    if !sink.is_listening() {
                        break;
                    }
                    tokio::time::sleep(interval).await;
                }
                Err(TryRecvError::Disconnected) => {
                    info!("Pointer dispatcher stopped (queue closed)");
                    return;
                }
            }
        }

        // The receiver goes back before the flag is cleared so a new
        // dispatcher always finds it.
        drop(lease);
        if !slot.keep_running(sink.as_ref()) {
            break;
        }
    }

    info!("Pointer dispatcher stopped");
}

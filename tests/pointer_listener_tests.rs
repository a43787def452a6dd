// Integration tests for the pointer listener
//
// A scripted pointer feeds presses to the sampler; a recording sink
// collects what the dispatcher hands over.

use anyhow::Result;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use zoomreel::pointer::{ClickSample, ClickSink};
use zoomreel::{PointerListener, ScriptedPointer};

#[derive(Default)]
struct RecordingSink {
    listening: AtomicBool,
    clicks: Mutex<Vec<ClickSample>>,
}

impl RecordingSink {
    fn listening() -> Arc<Self> {
        let sink = Arc::new(Self::default());
        sink.listening.store(true, Ordering::SeqCst);
        sink
    }

    fn clicks(&self) -> Vec<ClickSample> {
        self.clicks.lock().unwrap().clone()
    }
}

impl ClickSink for RecordingSink {
    fn is_listening(&self) -> bool {
        self.listening.load(Ordering::SeqCst)
    }

    fn on_click(&self, click: ClickSample) {
        self.clicks.lock().unwrap().push(click);
    }
}

async fn eventually(mut condition: impl FnMut() -> bool) -> bool {
    for _ in 0..500 {
        if condition() {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    false
}

#[tokio::test]
async fn test_clicks_are_dispatched_in_order() -> Result<()> {
    let pointer = Arc::new(ScriptedPointer::new());
    pointer.click(10, 20);
    pointer.click(30, 40);
    pointer.click(50, 60);

    let listener = PointerListener::with_poll_interval(pointer.clone(), Duration::from_millis(1));
    let sink = RecordingSink::listening();

    assert!(listener.start(sink.clone()));
    assert!(eventually(|| sink.clicks().len() == 3).await, "clicks never arrived");

    assert_eq!(
        sink.clicks(),
        vec![
            ClickSample { x: 10, y: 20 },
            ClickSample { x: 30, y: 40 },
            ClickSample { x: 50, y: 60 },
        ]
    );
    assert_eq!(pointer.pending(), 0);

    sink.listening.store(false, Ordering::SeqCst);
    Ok(())
}

#[tokio::test]
async fn test_start_is_idempotent_while_running() -> Result<()> {
    let pointer = Arc::new(ScriptedPointer::new());
    let listener = PointerListener::with_poll_interval(pointer.clone(), Duration::from_millis(1));
    let sink = RecordingSink::listening();

    assert!(listener.start(sink.clone()));
    assert!(listener.is_running());
    assert!(!listener.start(sink.clone()), "second start must not spawn new loops");

    // The original pair still serves the sink
    pointer.click(7, 8);
    assert!(eventually(|| sink.clicks().len() == 1).await);
    assert_eq!(sink.clicks(), vec![ClickSample { x: 7, y: 8 }]);

    sink.listening.store(false, Ordering::SeqCst);
    Ok(())
}

#[tokio::test]
async fn test_loops_stop_when_sink_stops_listening() -> Result<()> {
    let pointer = Arc::new(ScriptedPointer::new());
    let listener = PointerListener::with_poll_interval(pointer.clone(), Duration::from_millis(1));
    let sink = RecordingSink::listening();

    listener.start(sink.clone());
    sink.listening.store(false, Ordering::SeqCst);

    assert!(eventually(|| !listener.is_running()).await, "loops kept running");

    // Presses after the loops have ended are never sampled
    pointer.click(1, 1);
    tokio::time::sleep(Duration::from_millis(20)).await;
    assert!(sink.clicks().is_empty());
    assert_eq!(pointer.pending(), 1);

    Ok(())
}

#[tokio::test]
async fn test_listener_can_restart_after_stopping() -> Result<()> {
    let pointer = Arc::new(ScriptedPointer::new());
    let listener = PointerListener::with_poll_interval(pointer.clone(), Duration::from_millis(1));

    let first = RecordingSink::listening();
    listener.start(first.clone());
    first.listening.store(false, Ordering::SeqCst);
    assert!(eventually(|| !listener.is_running()).await);

    let second = RecordingSink::listening();
    assert!(listener.start(second.clone()));
    pointer.click(100, 200);
    assert!(eventually(|| second.clicks().len() == 1).await);
    assert!(first.clicks().is_empty());

    second.listening.store(false, Ordering::SeqCst);
    Ok(())
}

#[tokio::test]
async fn test_sink_not_listening_never_starts_sampling() -> Result<()> {
    let pointer = Arc::new(ScriptedPointer::new());
    pointer.click(5, 5);
    let listener = PointerListener::with_poll_interval(pointer.clone(), Duration::from_millis(1));
    let sink = Arc::new(RecordingSink::default());

    listener.start(sink.clone());

    assert!(eventually(|| !listener.is_running()).await);
    assert!(sink.clicks().is_empty());
    assert_eq!(pointer.pending(), 1);
    Ok(())
}

/// Sink whose `on_click` blocks the dispatcher until the gate opens
#[derive(Default)]
struct GatedSink {
    listening: AtomicBool,
    open: AtomicBool,
    entered: AtomicBool,
    clicks: Mutex<Vec<ClickSample>>,
}

impl GatedSink {
    fn listening() -> Arc<Self> {
        let sink = Arc::new(Self::default());
        sink.listening.store(true, Ordering::SeqCst);
        sink
    }

    fn clicks(&self) -> Vec<ClickSample> {
        self.clicks.lock().unwrap().clone()
    }
}

impl ClickSink for GatedSink {
    fn is_listening(&self) -> bool {
        self.listening.load(Ordering::SeqCst)
    }

    fn on_click(&self, click: ClickSample) {
        self.entered.store(true, Ordering::SeqCst);
        while !self.open.load(Ordering::SeqCst) {
            std::thread::sleep(Duration::from_millis(1));
        }
        self.clicks.lock().unwrap().push(click);
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_restart_while_dispatcher_busy_keeps_listening() -> Result<()> {
    let pointer = Arc::new(ScriptedPointer::new());
    let listener = PointerListener::with_poll_interval(pointer.clone(), Duration::from_millis(1));
    let sink = GatedSink::listening();

    pointer.click(1, 1);
    assert!(listener.start(sink.clone()));
    assert!(eventually(|| sink.entered.load(Ordering::SeqCst)).await);

    // Listening lapses while the dispatcher is stuck in on_click, long
    // enough for the sampler to exit
    sink.listening.store(false, Ordering::SeqCst);
    tokio::time::sleep(Duration::from_millis(20)).await;
    sink.listening.store(true, Ordering::SeqCst);

    assert!(listener.start(sink.clone()), "missing sampler must be respawned");
    pointer.click(2, 2);
    assert!(eventually(|| pointer.pending() == 0).await, "second click never sampled");

    sink.open.store(true, Ordering::SeqCst);
    assert!(eventually(|| sink.clicks().len() == 2).await);
    assert_eq!(
        sink.clicks(),
        vec![ClickSample { x: 1, y: 1 }, ClickSample { x: 2, y: 2 }]
    );
    assert!(listener.is_running());

    sink.listening.store(false, Ordering::SeqCst);
    assert!(eventually(|| !listener.is_running()).await);
    Ok(())
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_click_burst_with_stalled_dispatcher_drops_newest() -> Result<()> {
    let pointer = Arc::new(ScriptedPointer::new());
    let listener = PointerListener::with_poll_interval(pointer.clone(), Duration::from_millis(1));
    let sink = GatedSink::listening();

    pointer.click(0, 0);
    listener.start(sink.clone());
    assert!(eventually(|| sink.entered.load(Ordering::SeqCst)).await);

    // 15 rapid clicks while the dispatcher is stalled
    for i in 1..=15 {
        pointer.click(i, i);
    }
    assert!(eventually(|| pointer.pending() == 0).await, "sampler blocked on a full queue");
    assert_eq!(listener.dropped_clicks(), 5);

    sink.open.store(true, Ordering::SeqCst);
    assert!(eventually(|| sink.clicks().len() == 11).await);
    tokio::time::sleep(Duration::from_millis(20)).await;

    let delivered: Vec<i32> = sink.clicks().iter().map(|c| c.x).collect();
    assert_eq!(delivered, (0..=10).collect::<Vec<_>>());

    sink.listening.store(false, Ordering::SeqCst);
    assert!(eventually(|| !listener.is_running()).await);
    Ok(())
}

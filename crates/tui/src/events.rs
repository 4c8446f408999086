//! Terminal input and refresh ticks.
//!
//! A background thread polls crossterm for input and emits a [`Event::Tick`]
//! every poll interval; each tick triggers a full re-read and re-render.

use crate::error::{Result, TuiError};
use crossterm::event::{self, Event as CrosstermEvent, KeyEvent, KeyEventKind};
use std::sync::{
    atomic::{AtomicBool, Ordering},
    mpsc, Arc,
};
use std::thread;
use std::time::{Duration, Instant};

/// Dashboard events.
#[derive(Debug, Clone)]
pub enum Event {
    /// Poll interval elapsed.
    Tick,
    /// Key press.
    Key(KeyEvent),
    /// Terminal resize.
    Resize(u16, u16),
}

/// Input poller running on its own thread.
pub struct EventHandler {
    receiver: mpsc::Receiver<Event>,
    worker: Option<thread::JoinHandle<()>>,
    shutdown: Arc<AtomicBool>,
}

impl EventHandler {
    /// Start polling with the given tick interval.
    pub fn spawn(tick_rate: Duration) -> Self {
        let (sender, receiver) = mpsc::channel();
        let shutdown = Arc::new(AtomicBool::new(false));
        let stop = Arc::clone(&shutdown);

        let worker = thread::spawn(move || {
            let mut last_tick = Instant::now();

            while !stop.load(Ordering::Relaxed) {
                let timeout = tick_rate
                    .checked_sub(last_tick.elapsed())
                    .unwrap_or(Duration::ZERO)
                    // Bounded so shutdown is noticed promptly.
                    .min(Duration::from_millis(250));

                let ready = event::poll(timeout).unwrap_or_else(|e| {
                    tracing::error!(%e, "Event poll error");
                    false
                });

                if ready {
                    let forwarded = match event::read() {
                        Ok(CrosstermEvent::Key(key)) if key.kind == KeyEventKind::Press => {
                            Some(Event::Key(key))
                        }
                        Ok(CrosstermEvent::Resize(width, height)) => {
                            Some(Event::Resize(width, height))
                        }
                        Ok(_) => None,
                        Err(e) => {
                            tracing::error!(%e, "Event read error");
                            None
                        }
                    };
                    if let Some(ev) = forwarded {
                        if sender.send(ev).is_err() {
                            break;
                        }
                    }
                }

                if last_tick.elapsed() >= tick_rate {
                    if sender.send(Event::Tick).is_err() {
                        break;
                    }
                    last_tick = Instant::now();
                }
            }
        });

        Self {
            receiver,
            worker: Some(worker),
            shutdown,
        }
    }

    /// Block until the next event.
    pub fn next(&self) -> Result<Event> {
        self.receiver
            .recv()
            .map_err(|e| TuiError::Event(e.to_string()))
    }
}

impl Drop for EventHandler {
    fn drop(&mut self) {
        self.shutdown.store(true, Ordering::Relaxed);
        if let Some(worker) = self.worker.take() {
            let _ = worker.join();
        }
    }
}

use std::sync::mpsc;
use std::thread;
use std::time::{Duration, Instant};

use crossterm::event::{self, Event as CEvent, KeyEvent};

#[derive(Debug)]
pub enum Event {
    Key(KeyEvent),
    /// Redraw the header clock.
    Clock,
    /// Re-evaluate prayer status and missed detection.
    Status,
}

/// Two independent periodic timers sharing one input thread.
struct Ticker {
    every: Duration,
    last: Instant,
}

impl Ticker {
    fn new(every: Duration) -> Self {
        Self {
            every,
            last: Instant::now(),
        }
    }

    fn remaining(&self) -> Duration {
        self.every
            .checked_sub(self.last.elapsed())
            .unwrap_or(Duration::ZERO)
    }

    fn due(&mut self) -> bool {
        if self.last.elapsed() >= self.every {
            self.last = Instant::now();
            true
        } else {
            false
        }
    }
}

pub struct EventHandler {
    rx: mpsc::Receiver<Event>,
}

impl EventHandler {
    pub fn new(clock_every: Duration, status_every: Duration) -> Self {
        let (tx, rx) = mpsc::channel();

        thread::spawn(move || {
            let mut clock = Ticker::new(clock_every);
            let mut status = Ticker::new(status_every);
            loop {
                let timeout = clock.remaining().min(status.remaining());

                if event::poll(timeout).unwrap_or(false) {
                    match event::read() {
                        Ok(CEvent::Key(key)) => {
                            if tx.send(Event::Key(key)).is_err() {
                                break;
                            }
                        }
                        Ok(_) => {}
                        Err(_) => break,
                    }
                }

                if clock.due() && tx.send(Event::Clock).is_err() {
                    break;
                }
                if status.due() && tx.send(Event::Status).is_err() {
                    break;
                }
            }
        });

        Self { rx }
    }

    pub fn next(&self) -> Result<Event, mpsc::RecvError> {
        self.rx.recv()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ticker_fires_once_per_period() {
        let mut ticker = Ticker::new(Duration::from_millis(20));
        assert!(!ticker.due());
        thread::sleep(Duration::from_millis(25));
        assert!(ticker.due());
        assert!(!ticker.due());
        assert!(ticker.remaining() <= Duration::from_millis(20));
    }
}

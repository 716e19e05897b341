//! Trailing-edge debounce for re-pricing.
//!
//! Each `schedule` bumps a generation counter and spawns a sleeper. When the
//! sleeper wakes it runs the job only if no newer schedule happened in the
//! meantime. The job gets a [`Ticket`] so it can drop its response if a newer
//! run started while its request was in flight.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct RepriceScheduler {
    generation: Arc<AtomicU64>,
    debounce: Duration,
}

/// Identifies one scheduled run.
#[derive(Debug, Clone)]
pub struct Ticket {
    generation: u64,
    current: Arc<AtomicU64>,
}

impl Ticket {
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// False once any later schedule or cancel has happened.
    pub fn is_current(&self) -> bool {
        self.current.load(Ordering::SeqCst) == self.generation
    }
}

impl RepriceScheduler {
    pub fn new(debounce: Duration) -> Self {
        Self {
            generation: Arc::new(AtomicU64::new(0)),
            debounce,
        }
    }

    /// Supersede anything pending and run `job` after the debounce window.
    pub fn schedule<F>(&self, job: F) -> thread::JoinHandle<()>
    where
        F: FnOnce(Ticket) + Send + 'static,
    {
        let ticket = self.next_ticket();
        let delay = self.debounce;
        thread::spawn(move || {
            thread::sleep(delay);
            if !ticket.is_current() {
                log::trace!("reprice {} superseded", ticket.generation);
                return;
            }
            job(ticket);
        })
    }

    /// Run `job` now, still superseding anything pending.
    pub fn run_now<F>(&self, job: F)
    where
        F: FnOnce(Ticket),
    {
        job(self.next_ticket());
    }

    /// Drop pending runs and mark in-flight ones stale.
    pub fn cancel(&self) {
        self.generation.fetch_add(1, Ordering::SeqCst);
    }

    fn next_ticket(&self) -> Ticket {
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        Ticket {
            generation,
            current: Arc::clone(&self.generation),
        }
    }
}

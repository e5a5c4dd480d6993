use parking_lot::Mutex;
use std::io;
use std::thread::{self, JoinHandle};
use std::time::Duration;
use tokio::sync::watch;
use tracing::{debug, trace, warn};

/// Background loop that periodically runs an eviction pass.
///
/// The loop lives on its own named thread driving a single-threaded tokio
/// runtime. Stopping is idempotent: the first call signals the loop and joins
/// the thread, concurrent callers wait for that join, later calls return
/// immediately.
pub(crate) struct Sweeper {
    shutdown_tx: watch::Sender<bool>,
    handle: Mutex<Option<JoinHandle<()>>>,
}

impl Sweeper {
    /// Starts the sweeper thread. `evict` returns how many entries it removed.
    pub(crate) fn start<F>(interval: Duration, evict: F) -> io::Result<Self>
    where
        F: Fn() -> usize + Send + 'static,
    {
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_time()
            .build()?;

        let handle = thread::Builder::new()
            .name("ttlcache-sweeper".into())
            .spawn(move || runtime.block_on(Self::sweep_loop(interval, evict, shutdown_rx)))?;

        let interval_ms = u64::try_from(interval.as_millis()).unwrap_or(u64::MAX);
        debug!(interval_ms, "sweeper started");

        Ok(Self {
            shutdown_tx,
            handle: Mutex::new(Some(handle)),
        })
    }

    async fn sweep_loop<F>(interval: Duration, evict: F, mut shutdown_rx: watch::Receiver<bool>)
    where
        F: Fn() -> usize,
    {
        let mut ticker = tokio::time::interval(interval);
        // The first tick completes immediately; the first pass waits a full period
        ticker.tick().await;

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    let removed = evict();
                    if removed > 0 {
                        debug!(removed, "sweep pass evicted expired entries");
                    } else {
                        trace!("sweep pass found nothing to evict");
                    }
                }
                changed = shutdown_rx.changed() => {
                    // A dropped sender also means stop
                    if changed.is_err() || *shutdown_rx.borrow() {
                        break;
                    }
                }
            }
        }

        debug!("sweeper stopped");
    }

    /// Signals the loop to exit and waits for the thread to finish.
    ///
    /// The handle lock is held across the join, so no caller returns while a
    /// pass may still be running.
    pub(crate) fn stop(&self) {
        let mut handle = self.handle.lock();
        let Some(thread) = handle.take() else {
            return;
        };

        let _ = self.shutdown_tx.send(true);
        if thread.join().is_err() {
            warn!("sweeper thread panicked");
        }
    }

    pub(crate) fn is_running(&self) -> bool {
        self.handle.lock().is_some()
    }
}

impl Drop for Sweeper {
    fn drop(&mut self) {
        self.stop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    fn counting_sweeper(interval: Duration) -> (Sweeper, Arc<AtomicUsize>) {
        let passes = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&passes);
        let sweeper = Sweeper::start(interval, move || {
            counter.fetch_add(1, Ordering::SeqCst);
            0
        })
        .unwrap();
        (sweeper, passes)
    }

    #[test]
    fn test_runs_passes_periodically() {
        let (sweeper, passes) = counting_sweeper(Duration::from_millis(10));

        thread::sleep(Duration::from_millis(100));
        sweeper.stop();

        assert!(passes.load(Ordering::SeqCst) >= 2);
    }

    #[test]
    fn test_first_pass_waits_one_interval() {
        let (sweeper, passes) = counting_sweeper(Duration::from_secs(3600));

        thread::sleep(Duration::from_millis(30));
        assert_eq!(passes.load(Ordering::SeqCst), 0);
        sweeper.stop();
    }

    #[test]
    fn test_no_passes_after_stop() {
        let (sweeper, passes) = counting_sweeper(Duration::from_millis(5));

        thread::sleep(Duration::from_millis(30));
        sweeper.stop();
        assert!(!sweeper.is_running());

        let after_stop = passes.load(Ordering::SeqCst);
        thread::sleep(Duration::from_millis(50));
        assert_eq!(passes.load(Ordering::SeqCst), after_stop);
    }

    #[test]
    fn test_stop_is_idempotent() {
        let (sweeper, _) = counting_sweeper(Duration::from_millis(10));

        sweeper.stop();
        sweeper.stop();
        sweeper.stop();
        assert!(!sweeper.is_running());
    }

    #[test]
    fn test_concurrent_stop() {
        let (sweeper, _) = counting_sweeper(Duration::from_millis(10));
        let sweeper = Arc::new(sweeper);

        let handles: Vec<_> = (0..4)
            .map(|_| {
                let sweeper = Arc::clone(&sweeper);
                thread::spawn(move || sweeper.stop())
            })
            .collect();

        for handle in handles {
            handle.join().expect("Thread panicked");
        }
        assert!(!sweeper.is_running());
    }

    #[test]
    fn test_concurrent_stop_waits_for_running_pass() {
        use std::sync::atomic::AtomicBool;

        let in_pass = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&in_pass);
        let sweeper = Arc::new(
            Sweeper::start(Duration::from_millis(5), move || {
                flag.store(true, Ordering::SeqCst);
                thread::sleep(Duration::from_millis(40));
                flag.store(false, Ordering::SeqCst);
                0
            })
            .unwrap(),
        );

        // Let a slow pass start
        thread::sleep(Duration::from_millis(20));

        let handles: Vec<_> = (0..4)
            .map(|_| {
                let sweeper = Arc::clone(&sweeper);
                let in_pass = Arc::clone(&in_pass);
                thread::spawn(move || {
                    sweeper.stop();
                    assert!(!sweeper.is_running());
                    assert!(!in_pass.load(Ordering::SeqCst));
                })
            })
            .collect();

        for handle in handles {
            handle.join().expect("Thread panicked");
        }
    }

    #[test]
    fn test_drop_stops_thread() {
        let (sweeper, passes) = counting_sweeper(Duration::from_millis(5));
        thread::sleep(Duration::from_millis(20));
        drop(sweeper);

        let after_drop = passes.load(Ordering::SeqCst);
        thread::sleep(Duration::from_millis(30));
        assert_eq!(passes.load(Ordering::SeqCst), after_drop);
    }
}

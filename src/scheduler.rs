//! Hand-off from background loops to the UI thread.
//!
//! Background loops never touch UI-owned state. They post closures here, and
//! the UI loop runs them between frames in submission order.

use std::sync::mpsc;

/// A unit of work executed on the UI thread against its state `T`.
pub type UiTask<T> = Box<dyn FnOnce(&mut T) + Send + 'static>;

/// Sending side, cloned into every background loop.
pub struct UiScheduler<T> {
    tx: mpsc::Sender<UiTask<T>>,
}

impl<T> Clone for UiScheduler<T> {
    fn clone(&self) -> Self {
        Self { tx: self.tx.clone() }
    }
}

impl<T> UiScheduler<T> {
    /// Queue `task` for the next UI idle tick. Returns false once the UI side
    /// has shut down, which background loops treat as a signal to exit.
    pub fn post<F>(&self, task: F) -> bool
    where
        F: FnOnce(&mut T) + Send + 'static,
    {
        self.tx.send(Box::new(task)).is_ok()
    }
}

/// Receiving side, owned by the UI loop.
pub struct UiQueue<T> {
    rx: mpsc::Receiver<UiTask<T>>,
}

impl<T> UiQueue<T> {
    /// Run up to `budget` queued tasks against `target`, oldest first.
    /// Returns how many ran.
    pub fn run_pending(&self, target: &mut T, budget: usize) -> usize {
        let mut ran = 0;
        while ran < budget {
            match self.rx.try_recv() {
                Ok(task) => {
                    task(target);
                    ran += 1;
                }
                Err(_) => break,
            }
        }
        ran
    }

    /// Block until one task arrives or `timeout` passes, then run it.
    pub fn run_one_timeout(&self, target: &mut T, timeout: std::time::Duration) -> bool {
        match self.rx.recv_timeout(timeout) {
            Ok(task) => {
                task(target);
                true
            }
            Err(_) => false,
        }
    }

    /// Drop everything queued, returning how many tasks were discarded.
    #[cfg(test)]
    pub(crate) fn discard_pending(&self) -> usize {
        self.rx.try_iter().count()
    }
}

pub fn channel<T>() -> (UiScheduler<T>, UiQueue<T>) {
    let (tx, rx) = mpsc::channel();
    (UiScheduler { tx }, UiQueue { rx })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tasks_run_in_submission_order() {
        let (scheduler, queue) = channel::<Vec<u32>>();
        let producers: Vec<_> = (0..3)
            .map(|_| scheduler.clone())
            .collect();
        for i in 0..30u32 {
            let s = &producers[(i % 3) as usize];
            assert!(s.post(move |v: &mut Vec<u32>| v.push(i)));
        }

        let mut seen = Vec::new();
        assert_eq!(queue.run_pending(&mut seen, 10), 10);
        assert_eq!(queue.run_pending(&mut seen, usize::MAX), 20);
        assert_eq!(seen, (0..30).collect::<Vec<_>>());
    }

    #[test]
    fn post_fails_after_queue_dropped() {
        let (scheduler, queue) = channel::<()>();
        drop(queue);
        assert!(!scheduler.post(|_| {}));
    }

    #[test]
    fn posts_from_other_threads_arrive() {
        let (scheduler, queue) = channel::<Vec<&'static str>>();
        let handle = std::thread::spawn(move || {
            scheduler.post(|v| v.push("first"));
            scheduler.post(|v| v.push("second"));
        });
        handle.join().unwrap();
        let mut seen = Vec::new();
        queue.run_pending(&mut seen, usize::MAX);
        assert_eq!(seen, vec!["first", "second"]);
    }
}

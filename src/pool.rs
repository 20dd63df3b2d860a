// ABOUTME: Bounded worker pool for the slidegen application
// ABOUTME: Runs independent jobs on a sized rayon pool and contains each job's failure

use crate::errors::{Result, SlideError};
use log::{error, info, warn};
use rayon::prelude::*;
use rayon::ThreadPoolBuilder;
use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::time::Instant;

/// Terminal state of one job
#[derive(Debug)]
pub struct JobOutcome<T> {
    pub label: String,
    pub result: Result<T>,
}

impl<T> JobOutcome<T> {
    pub fn is_success(&self) -> bool {
        self.result.is_ok()
    }
}

/// Every job's outcome, in submission order
#[derive(Debug)]
pub struct BatchReport<T> {
    pub outcomes: Vec<JobOutcome<T>>,
}

impl<T> BatchReport<T> {
    pub fn total(&self) -> usize {
        self.outcomes.len()
    }

    pub fn succeeded(&self) -> usize {
        self.outcomes.iter().filter(|o| o.is_success()).count()
    }

    pub fn failed(&self) -> usize {
        self.total() - self.succeeded()
    }

    /// Results of the jobs that succeeded
    pub fn successes(&self) -> impl Iterator<Item = &T> {
        self.outcomes.iter().filter_map(|o| o.result.as_ref().ok())
    }

    /// Log a one-line summary of the batch
    pub fn log_summary(&self, what: &str) {
        if self.failed() == 0 {
            info!("{}: {} of {} succeeded", what, self.succeeded(), self.total());
        } else {
            warn!(
                "{}: {} of {} succeeded, {} failed",
                what,
                self.succeeded(),
                self.total(),
                self.failed()
            );
            for outcome in &self.outcomes {
                if let Err(e) = &outcome.result {
                    warn!("  {}: {}", outcome.label, e);
                }
            }
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}

/// Run one job, turning a panic into an ordinary failure
fn run_contained<I, T, F>(label: String, item: I, job: &F) -> JobOutcome<T>
where
    F: Fn(I) -> Result<T>,
{
    let result = match panic::catch_unwind(AssertUnwindSafe(|| job(item))) {
        Ok(result) => result,
        Err(payload) => Err(SlideError::JobPanicked(panic_message(payload.as_ref()))),
    };
    if let Err(e) = &result {
        error!("Error in {}: {}", label, e);
    }
    JobOutcome { label, result }
}

/// Bounded set of worker threads; each `run` gets its own pool
#[derive(Debug, Clone, Copy)]
pub struct WorkerPool {
    size: usize,
}

impl WorkerPool {
    /// A pool with `size` slots; zero is treated as one
    pub fn new(size: usize) -> Self {
        Self { size: size.max(1) }
    }

    pub fn size(&self) -> usize {
        self.size
    }

    /// Run `job` over every labelled item with at most `size` jobs in flight.
    ///
    /// Blocks until every job has succeeded or failed. A failing or panicking job
    /// is logged and recorded; it never stops the others. Only failing to start
    /// the pool's threads is an error.
    pub fn run<I, T, F>(&self, items: Vec<(String, I)>, job: F) -> Result<BatchReport<T>>
    where
        I: Send,
        T: Send,
        F: Fn(I) -> Result<T> + Sync,
    {
        let started = Instant::now();
        let pool = ThreadPoolBuilder::new()
            .num_threads(self.size)
            .thread_name(|i| format!("slidegen-worker-{}", i))
            .build()?;

        let outcomes: Vec<JobOutcome<T>> = pool.install(|| {
            items
                .into_par_iter()
                .map(|(label, item)| run_contained(label, item, &job))
                .collect()
        });

        info!(
            "Batch of {} job(s) finished in {:.2} seconds",
            outcomes.len(),
            started.elapsed().as_secs_f64()
        );
        Ok(BatchReport { outcomes })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::thread;
    use std::time::Duration;

    fn labelled(n: usize) -> Vec<(String, usize)> {
        (0..n).map(|i| (format!("job {}", i), i)).collect()
    }

    #[test]
    fn test_outcomes_keep_submission_order() {
        let report = WorkerPool::new(3).run(labelled(10), |i| {
            thread::sleep(Duration::from_millis(((10 - i) * 2) as u64));
            Ok(i * 10)
        })
        .unwrap();
        let values: Vec<usize> = report.successes().copied().collect();
        assert_eq!(values, (0..10).map(|i| i * 10).collect::<Vec<_>>());
        assert_eq!(report.outcomes[4].label, "job 4");
    }

    #[test]
    fn test_in_flight_jobs_bounded_by_pool_size() {
        let current = AtomicUsize::new(0);
        let peak = AtomicUsize::new(0);

        let report = WorkerPool::new(2).run(labelled(8), |_| {
            let now = current.fetch_add(1, Ordering::SeqCst) + 1;
            peak.fetch_max(now, Ordering::SeqCst);
            thread::sleep(Duration::from_millis(10));
            current.fetch_sub(1, Ordering::SeqCst);
            Ok(())
        })
        .unwrap();

        assert_eq!(report.succeeded(), 8);
        assert!(peak.load(Ordering::SeqCst) <= 2);
    }

    #[test]
    fn test_panicking_job_is_contained() {
        let report = WorkerPool::new(2).run(labelled(4), |i| {
            if i == 2 {
                panic!("boom");
            }
            Ok(i)
        })
        .unwrap();

        assert_eq!(report.total(), 4);
        assert_eq!(report.failed(), 1);
        assert!(matches!(
            &report.outcomes[2].result,
            Err(SlideError::JobPanicked(msg)) if msg == "boom"
        ));
    }

    #[test]
    fn test_zero_size_pool_still_runs() {
        let pool = WorkerPool::new(0);
        assert_eq!(pool.size(), 1);
        let report = pool.run(labelled(3), Ok).unwrap();
        assert_eq!(report.succeeded(), 3);
    }

    #[test]
    fn test_empty_batch() {
        let report: BatchReport<()> = WorkerPool::new(4)
            .run(Vec::<(String, ())>::new(), Ok)
            .unwrap();
        assert_eq!(report.total(), 0);
        assert_eq!(report.failed(), 0);
    }
}

//! Per-label scheduling of command execution.
//!
//! - [`Scheduler::sync`] runs every label once and returns after all results are stored.
//! - [`Scheduler::run`] starts one periodic loop per label and returns immediately.
//!
//! Both go through the same per-label primitive (`Worker::execute`), so a label
//! looks the same to readers whichever way it was refreshed.
mod worker;

use std::sync::{
    Arc,
    atomic::{AtomicBool, Ordering},
};

use dlabel_model::LabelSpec;
use tokio::{
    task::JoinSet,
    time::{self, Instant, MissedTickBehavior},
};
use tokio_util::{sync::CancellationToken, task::TaskTracker};
use tracing::{debug, error, info, warn};

use crate::{metrics::MetricsHandle, runner::RunnerHandle, store::ResultStore};
use worker::Worker;

/// Owns the timers and dispatch for all labels of one engine.
pub struct Scheduler {
    specs: Arc<[LabelSpec]>,
    worker: Worker,
    cancel: CancellationToken,
    started: AtomicBool,
    tracker: TaskTracker,
}

impl Scheduler {
    /// Create a scheduler bound to the lifetime of `close`.
    ///
    /// Cancelling `close` stops every loop started by [`Scheduler::run`].
    /// The scheduler cancels only its own child token on [`Scheduler::shutdown`].
    pub fn new(
        specs: Vec<LabelSpec>,
        store: ResultStore,
        runner: RunnerHandle,
        metrics: MetricsHandle,
        close: &CancellationToken,
    ) -> Self {
        let worker = Worker::new(
            specs.iter().map(|s| s.name().to_string()),
            store,
            runner,
            metrics,
        );
        Self {
            specs: specs.into(),
            worker,
            cancel: close.child_token(),
            started: AtomicBool::new(false),
            tracker: TaskTracker::new(),
        }
    }

    /// Specs in name order.
    pub fn specs(&self) -> &[LabelSpec] {
        &self.specs
    }

    /// Execute every label once, concurrently, and wait until all results are stored.
    ///
    /// Runs regardless of cancellation: this is a caller-driven refresh.
    pub async fn sync(&self) {
        let mut set = JoinSet::new();
        for spec in self.specs.iter().cloned() {
            let worker = self.worker.clone();
            set.spawn(async move { worker.execute(&spec).await });
        }

        while let Some(joined) = set.join_next().await {
            if let Err(e) = joined {
                error!(error = %e, "label execution aborted during sync");
            }
        }
        debug!(labels = self.specs.len(), "label sync complete");
    }

    /// Start one periodic loop per label in the background.
    ///
    /// Must be called from within a tokio runtime. Only the first call has an effect.
    pub fn run(&self) {
        if self.started.swap(true, Ordering::AcqRel) {
            warn!("label scheduler already running; ignoring repeated run");
            return;
        }

        for spec in self.specs.iter().cloned() {
            let worker = self.worker.clone();
            let cancel = self.cancel.clone();
            self.tracker.spawn(label_loop(spec, worker, cancel));
        }
        self.tracker.close();
        info!(labels = self.specs.len(), "label scheduler started");
    }

    /// Returns `true` once [`Scheduler::run`] has been called.
    pub fn is_running(&self) -> bool {
        self.started.load(Ordering::Acquire)
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }

    /// Wait until every loop has exited.
    ///
    /// Completes immediately if [`Scheduler::run`] was never called; otherwise
    /// only after the lifetime token has been cancelled and in-flight commands finished.
    pub async fn closed(&self) {
        self.tracker.close();
        self.tracker.wait().await;
    }

    /// Stop issuing new executions and wait for every loop to exit.
    ///
    /// In-flight commands are awaited, not killed. A label without a timeout
    /// whose command hangs keeps this pending; bound it with `timeoutMs` or
    /// wrap the call in [`tokio::time::timeout`].
    pub async fn shutdown(&self) {
        self.cancel.cancel();
        self.closed().await;
        debug!("label scheduler stopped");
    }
}

/// Periodic loop for one label.
///
/// The first execution happens one period after start. Executions are awaited
/// inline, so a label never overlaps itself: a command slower than its period
/// delays the next tick instead. A panicking runner costs one tick, not the loop.
async fn label_loop(spec: LabelSpec, worker: Worker, cancel: CancellationToken) {
    let period = spec.period();
    debug!(label = %spec.name(), period_ms = period.as_millis() as u64, "label loop started");

    match Instant::now().checked_add(period) {
        Some(start) => {
            let mut ticker = time::interval_at(start, period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                tokio::select! {
                    biased;
                    _ = cancel.cancelled() => break,
                    _ = ticker.tick() => {}
                }
                if cancel.is_cancelled() {
                    break;
                }
                execute_contained(&spec, &worker).await;
            }
        }
        // Period beyond the clock's range: the label never comes due.
        None => cancel.cancelled().await,
    }

    worker.loop_stopped(&spec);
    debug!(label = %spec.name(), "label loop stopped");
}

async fn execute_contained(spec: &LabelSpec, worker: &Worker) {
    let task = {
        let (spec, worker) = (spec.clone(), worker.clone());
        tokio::spawn(async move { worker.execute(&spec).await })
    };
    if let Err(e) = task.await {
        error!(label = %spec.name(), error = %e, "label execution aborted; waiting for next tick");
    }
}

#[cfg(test)]
mod tests {
    use std::{
        collections::HashMap,
        sync::{
            Mutex,
            atomic::{AtomicUsize, Ordering},
        },
        time::Duration,
    };

    use async_trait::async_trait;
    use dlabel_model::{CommandLabel, LabelStatus};

    use super::*;
    use crate::{
        metrics::noop_metrics,
        runner::{CommandRunner, ExecOutcome},
    };

    /// Fake runner: echoes the program name, with optional per-label delay.
    #[derive(Default)]
    struct FakeRunner {
        delays: HashMap<String, Duration>,
        panics: Vec<String>,
        panic_once: Mutex<Vec<String>>,
        runs: Mutex<HashMap<String, usize>>,
        active: Mutex<HashMap<String, usize>>,
        max_active: AtomicUsize,
    }

    impl FakeRunner {
        fn with_delay(mut self, label: &str, delay: Duration) -> Self {
            self.delays.insert(label.to_string(), delay);
            self
        }

        fn with_panic(mut self, label: &str) -> Self {
            self.panics.push(label.to_string());
            self
        }

        fn with_panic_once(self, label: &str) -> Self {
            self.panic_once.lock().unwrap().push(label.to_string());
            self
        }

        fn take_panic(&self, label: &str) -> bool {
            let mut once = self.panic_once.lock().unwrap();
            match once.iter().position(|l| l == label) {
                Some(i) => {
                    once.remove(i);
                    true
                }
                None => false,
            }
        }

        fn runs(&self, label: &str) -> usize {
            self.runs.lock().unwrap().get(label).copied().unwrap_or(0)
        }
    }

    #[async_trait]
    impl CommandRunner for FakeRunner {
        fn name(&self) -> &'static str {
            "fake"
        }

        async fn run(&self, spec: &LabelSpec) -> ExecOutcome {
            if self.panics.iter().any(|l| l == spec.name()) || self.take_panic(spec.name()) {
                panic!("runner blew up for {}", spec.name());
            }
            let n = {
                let mut runs = self.runs.lock().unwrap();
                let n = runs.entry(spec.name().to_string()).or_default();
                *n += 1;
                *n
            };
            {
                let mut active = self.active.lock().unwrap();
                let a = active.entry(spec.name().to_string()).or_default();
                *a += 1;
                self.max_active.fetch_max(*a, Ordering::SeqCst);
            }
            if let Some(delay) = self.delays.get(spec.name()) {
                time::sleep(*delay).await;
            }
            *self
                .active
                .lock()
                .unwrap()
                .get_mut(spec.name())
                .unwrap() -= 1;

            ExecOutcome::Success(format!("{}#{n}", spec.program()))
        }
    }

    fn spec(name: &str, period: Duration) -> LabelSpec {
        LabelSpec::new(name, &CommandLabel::new(period, [name])).unwrap()
    }

    fn scheduler(
        specs: Vec<LabelSpec>,
        runner: Arc<FakeRunner>,
        close: &CancellationToken,
    ) -> (Scheduler, ResultStore) {
        let store = ResultStore::new(specs.iter().map(|s| s.name().to_string()));
        let sched = Scheduler::new(specs, store.clone(), runner, noop_metrics(), close);
        (sched, store)
    }

    #[tokio::test(start_paused = true)]
    async fn sync_writes_every_label_before_returning() {
        let runner = Arc::new(FakeRunner::default().with_delay("slow", Duration::from_secs(3)));
        let close = CancellationToken::new();
        let (sched, store) = scheduler(
            vec![spec("fast", Duration::from_secs(1)), spec("slow", Duration::from_secs(1))],
            runner.clone(),
            &close,
        );

        sched.sync().await;

        let snap = store.snapshot();
        assert_eq!(snap["fast"].value(), "fast#1");
        assert_eq!(snap["slow"].value(), "slow#1");
        assert_eq!(snap["slow"].status(), LabelStatus::Ok);
        assert!(!sched.is_running());
    }

    #[tokio::test(start_paused = true)]
    async fn sync_runs_labels_concurrently() {
        let runner = Arc::new(
            FakeRunner::default()
                .with_delay("a", Duration::from_secs(2))
                .with_delay("b", Duration::from_secs(2)),
        );
        let close = CancellationToken::new();
        let (sched, _store) = scheduler(
            vec![spec("a", Duration::from_secs(1)), spec("b", Duration::from_secs(1))],
            runner,
            &close,
        );

        let start = Instant::now();
        sched.sync().await;
        assert!(start.elapsed() < Duration::from_secs(3));
    }

    #[tokio::test(start_paused = true)]
    async fn sync_contains_a_panicking_runner() {
        let runner = Arc::new(FakeRunner::default().with_panic("bad"));
        let close = CancellationToken::new();
        let (sched, store) = scheduler(
            vec![spec("bad", Duration::from_secs(1)), spec("good", Duration::from_secs(1))],
            runner,
            &close,
        );

        sched.sync().await;

        let snap = store.snapshot();
        assert!(snap["bad"].is_pending());
        assert_eq!(snap["good"].value(), "good#1");
    }

    #[tokio::test(start_paused = true)]
    async fn run_first_executes_after_one_period() {
        let runner = Arc::new(FakeRunner::default());
        let close = CancellationToken::new();
        let (sched, store) = scheduler(vec![spec("foo", Duration::from_secs(1))], runner, &close);

        sched.run();
        assert_eq!(store.get("foo").unwrap().value(), "");

        time::sleep(Duration::from_millis(500)).await;
        assert!(store.get("foo").unwrap().is_pending());

        time::sleep(Duration::from_millis(600)).await;
        assert_eq!(store.get("foo").unwrap().value(), "foo#1");

        close.cancel();
        sched.closed().await;
    }

    #[tokio::test(start_paused = true)]
    async fn repeated_run_does_not_duplicate_loops() {
        let runner = Arc::new(FakeRunner::default());
        let close = CancellationToken::new();
        let (sched, _store) =
            scheduler(vec![spec("foo", Duration::from_secs(1))], runner.clone(), &close);

        sched.run();
        sched.run();
        assert!(sched.is_running());

        time::sleep(Duration::from_millis(3_500)).await;
        assert_eq!(runner.runs("foo"), 3);

        sched.shutdown().await;
    }

    #[tokio::test(start_paused = true)]
    async fn slow_label_does_not_delay_fast_label() {
        let runner = Arc::new(FakeRunner::default().with_delay("slow", Duration::from_secs(30)));
        let close = CancellationToken::new();
        let (sched, store) = scheduler(
            vec![spec("fast", Duration::from_secs(1)), spec("slow", Duration::from_secs(1))],
            runner.clone(),
            &close,
        );

        sched.run();
        time::sleep(Duration::from_millis(5_500)).await;

        assert_eq!(runner.runs("fast"), 5);
        assert_eq!(runner.runs("slow"), 1);
        assert_eq!(store.get("fast").unwrap().value(), "fast#5");
        assert!(store.get("slow").unwrap().is_pending());

        sched.shutdown().await;
    }

    #[tokio::test(start_paused = true)]
    async fn slow_label_never_overlaps_itself() {
        let runner = Arc::new(FakeRunner::default().with_delay("foo", Duration::from_millis(350)));
        let close = CancellationToken::new();
        let (sched, _store) =
            scheduler(vec![spec("foo", Duration::from_millis(100))], runner.clone(), &close);

        sched.run();
        time::sleep(Duration::from_secs(3)).await;

        assert!(runner.runs("foo") >= 5);
        assert_eq!(runner.max_active.load(Ordering::SeqCst), 1);

        sched.shutdown().await;
    }

    #[tokio::test(start_paused = true)]
    async fn sync_waits_for_in_flight_loop_execution() {
        let runner = Arc::new(FakeRunner::default().with_delay("foo", Duration::from_millis(800)));
        let close = CancellationToken::new();
        let (sched, store) =
            scheduler(vec![spec("foo", Duration::from_secs(1))], runner.clone(), &close);

        sched.run();
        time::sleep(Duration::from_millis(1_200)).await;
        assert_eq!(runner.runs("foo"), 1);

        sched.sync().await;

        assert_eq!(store.get("foo").unwrap().value(), "foo#2");
        assert_eq!(runner.max_active.load(Ordering::SeqCst), 1);

        time::sleep(Duration::from_secs(3)).await;
        assert_eq!(runner.max_active.load(Ordering::SeqCst), 1);

        sched.shutdown().await;
    }

    #[tokio::test(start_paused = true)]
    async fn run_survives_a_panicking_runner() {
        let runner = Arc::new(FakeRunner::default().with_panic_once("foo"));
        let close = CancellationToken::new();
        let (sched, store) =
            scheduler(vec![spec("foo", Duration::from_secs(1))], runner.clone(), &close);

        sched.run();
        time::sleep(Duration::from_millis(1_500)).await;
        assert_eq!(runner.runs("foo"), 0);
        assert!(store.get("foo").unwrap().is_pending());

        time::sleep(Duration::from_secs(2)).await;
        assert_eq!(runner.runs("foo"), 2);
        assert_eq!(store.get("foo").unwrap().value(), "foo#2");

        sched.shutdown().await;
    }

    #[tokio::test(start_paused = true)]
    async fn cancellation_stops_new_executions_and_loops_exit() {
        let runner = Arc::new(FakeRunner::default());
        let close = CancellationToken::new();
        let (sched, _store) = scheduler(
            vec![spec("a", Duration::from_secs(1)), spec("b", Duration::from_millis(300))],
            runner.clone(),
            &close,
        );

        sched.run();
        time::sleep(Duration::from_millis(2_500)).await;
        let a_before = runner.runs("a");
        let b_before = runner.runs("b");
        assert_eq!(a_before, 2);
        assert_eq!(b_before, 8);

        close.cancel();
        time::timeout(Duration::from_secs(1), sched.closed())
            .await
            .expect("loops must exit after cancellation");
        assert!(sched.is_cancelled());

        time::sleep(Duration::from_secs(10)).await;
        assert_eq!(runner.runs("a"), a_before);
        assert_eq!(runner.runs("b"), b_before);
    }

    #[tokio::test(start_paused = true)]
    async fn in_flight_execution_completes_after_cancellation() {
        let runner = Arc::new(FakeRunner::default().with_delay("foo", Duration::from_millis(500)));
        let close = CancellationToken::new();
        let (sched, store) =
            scheduler(vec![spec("foo", Duration::from_secs(1))], runner.clone(), &close);

        sched.run();
        time::sleep(Duration::from_millis(1_200)).await;
        assert_eq!(runner.runs("foo"), 1);
        assert!(store.get("foo").unwrap().is_pending());

        close.cancel();
        sched.closed().await;

        assert_eq!(store.get("foo").unwrap().value(), "foo#1");
        assert_eq!(runner.runs("foo"), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn run_after_cancellation_spawns_nothing() {
        let runner = Arc::new(FakeRunner::default());
        let close = CancellationToken::new();
        close.cancel();
        let (sched, _store) =
            scheduler(vec![spec("foo", Duration::from_millis(10))], runner.clone(), &close);

        sched.run();
        sched.closed().await;
        time::sleep(Duration::from_secs(1)).await;

        assert_eq!(runner.runs("foo"), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn shutdown_leaves_parent_token_alone() {
        let runner = Arc::new(FakeRunner::default());
        let close = CancellationToken::new();
        let (sched, _store) = scheduler(vec![spec("foo", Duration::from_secs(1))], runner, &close);

        sched.run();
        sched.shutdown().await;

        assert!(sched.is_cancelled());
        assert!(!close.is_cancelled());
    }

    #[tokio::test]
    async fn closed_without_run_returns_immediately() {
        let runner = Arc::new(FakeRunner::default());
        let close = CancellationToken::new();
        let (sched, _store) = scheduler(vec![spec("foo", Duration::from_secs(1))], runner, &close);

        time::timeout(Duration::from_secs(1), sched.closed())
            .await
            .expect("nothing to wait for");
    }
}

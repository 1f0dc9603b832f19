use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use actionvisor::{
    ActionEvent, ActionEventArgs, ActionTrigger, ChainPolicy, Decorator, DispatchError, FanOut,
    ManagerConfig, MetricsSink, Pipeline, RetryPolicy, Task, TaskError, TaskFactory, TaskFn,
    TaskManager, TaskOptions, TaskRef,
};

#[derive(Debug)]
struct Order {
    id: u32,
    amount: u64,
}

struct OrderPlaced {
    event: ActionEvent<Order>,
}

impl OrderPlaced {
    fn new() -> Self {
        Self {
            event: ActionEvent::new(),
        }
    }

    fn concurrent() -> Self {
        Self {
            event: ActionEvent::with_fan_out(FanOut::Concurrent),
        }
    }

    async fn fire(&self, id: u32, amount: u64) -> Result<(), DispatchError> {
        self.event.fire(Order { id, amount }).await
    }
}

impl ActionTrigger for OrderPlaced {
    type Data = Order;

    fn action_event(&self) -> &ActionEvent<Order> {
        &self.event
    }
}

type Log = Arc<Mutex<Vec<String>>>;

fn entries(log: &Log) -> Vec<String> {
    log.lock().unwrap().clone()
}

fn marker(log: &Log, label: &'static str) -> TaskRef<Order> {
    let log = log.clone();
    TaskFn::arc(label, move |_args: ActionEventArgs<Order>| {
        let log = log.clone();
        async move {
            log.lock().unwrap().push(label.to_string());
            Ok(())
        }
    })
}

fn manager_with(factory: TaskFactory) -> TaskManager {
    TaskManager::builder(ManagerConfig::default())
        .with_factory(factory)
        .build()
}

/// Decorator that records `"{tag}:before"` / `"{tag}:after"` around the inner task.
struct Trace {
    inner: TaskRef<Order>,
    tag: &'static str,
    log: Log,
}

#[async_trait]
impl Task<Order> for Trace {
    async fn execute(&self, args: &ActionEventArgs<Order>) -> Result<(), TaskError> {
        self.log.lock().unwrap().push(format!("{}:before", self.tag));
        let res = self.inner.execute(args).await;
        self.log.lock().unwrap().push(format!("{}:after", self.tag));
        res
    }
}

fn with_trace(factory: TaskFactory, log: &Log, tag: &'static str) -> TaskFactory {
    let log = log.clone();
    factory.with_decorator::<Order, _>(tag, move |inner| {
        Arc::new(Trace {
            inner,
            tag,
            log: log.clone(),
        }) as TaskRef<Order>
    })
}

#[derive(Default)]
struct ChargeCard;

#[async_trait]
impl Task<Order> for ChargeCard {
    async fn execute(&self, _args: &ActionEventArgs<Order>) -> Result<(), TaskError> {
        Ok(())
    }
}

static INVOICES: AtomicUsize = AtomicUsize::new(0);

#[derive(Default)]
struct SendInvoice;

#[async_trait]
impl Task<Order> for SendInvoice {
    async fn execute(&self, _args: &ActionEventArgs<Order>) -> Result<(), TaskError> {
        INVOICES.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

struct Reserve {
    log: Log,
}

#[async_trait]
impl Task<Order> for Reserve {
    async fn execute(&self, _args: &ActionEventArgs<Order>) -> Result<(), TaskError> {
        self.log.lock().unwrap().push("reserve".into());
        Ok(())
    }
}

struct Notify {
    log: Log,
}

#[async_trait]
impl Task<Order> for Notify {
    async fn execute(&self, _args: &ActionEventArgs<Order>) -> Result<(), TaskError> {
        self.log.lock().unwrap().push("notify".into());
        Ok(())
    }
}

#[tokio::test]
async fn test_duplicate_registration_runs_once() {
    let mut manager = manager_with(TaskFactory::new().with_default::<Order, SendInvoice>());
    manager
        .register::<OrderPlaced, SendInvoice>(TaskOptions::default())
        .unwrap()
        .register::<OrderPlaced, SendInvoice>(TaskOptions::default())
        .unwrap();
    assert_eq!(manager.binding_count::<OrderPlaced>(), 1);

    let action = OrderPlaced::new();
    manager.link(&action, None).await.unwrap();

    action.fire(1, 10).await.unwrap();
    assert_eq!(INVOICES.load(Ordering::SeqCst), 1);
}

static DISCOUNTS: AtomicUsize = AtomicUsize::new(0);

#[derive(Default)]
struct ApplyDiscount;

#[async_trait]
impl Task<Order> for ApplyDiscount {
    async fn execute(&self, _args: &ActionEventArgs<Order>) -> Result<(), TaskError> {
        DISCOUNTS.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

#[tokio::test]
async fn test_reregistration_replaces_predicate_and_decorators() {
    let log: Log = Arc::default();
    let factory = TaskFactory::new().with_default::<Order, ApplyDiscount>();
    let mut manager = manager_with(with_trace(factory, &log, "stale"));
    manager
        .register::<OrderPlaced, ApplyDiscount>(
            TaskOptions::<Order>::default()
                .when(|_args| false)
                .decorate(Decorator::custom("stale")),
        )
        .unwrap()
        .register::<OrderPlaced, ApplyDiscount>(TaskOptions::<Order>::default().when(|_args| true))
        .unwrap();
    assert_eq!(manager.binding_count::<OrderPlaced>(), 1);

    let action = OrderPlaced::new();
    manager.link(&action, None).await.unwrap();
    action.fire(1, 10).await.unwrap();

    assert_eq!(DISCOUNTS.load(Ordering::SeqCst), 1);
    assert!(entries(&log).is_empty());
}

#[tokio::test]
async fn test_pipeline_runs_in_ascending_priority() {
    let log: Log = Arc::default();
    let mut manager = TaskManager::new();
    for (label, priority) in [("third", 30), ("first", 10), ("second", 20)] {
        manager
            .register_or_add_task_to_pipeline::<OrderPlaced>(marker(&log, label), priority)
            .await
            .unwrap();
    }

    let action = OrderPlaced::new();
    manager.link(&action, None).await.unwrap();
    action.fire(1, 10).await.unwrap();

    assert_eq!(entries(&log), vec!["first", "second", "third"]);
}

async fn run_rejected_middle(policy: ChainPolicy) -> Vec<String> {
    let log: Log = Arc::default();
    let pipeline = Arc::new(Pipeline::with_policy(policy));
    pipeline.register_task(marker(&log, "1"), 1, None).await.unwrap();
    pipeline
        .register_task(
            marker(&log, "2"),
            2,
            Some(Arc::new(|args: &ActionEventArgs<Order>| {
                args.data().amount > 1_000
            })),
        )
        .await
        .unwrap();
    pipeline.register_task(marker(&log, "3"), 3, None).await.unwrap();

    let mut manager = TaskManager::new();
    manager.register_pipeline::<OrderPlaced>(pipeline);
    let action = OrderPlaced::new();
    manager.link(&action, None).await.unwrap();
    action.fire(1, 10).await.unwrap();
    entries(&log)
}

#[tokio::test]
async fn test_rejected_successor_stops_pipeline() {
    assert_eq!(
        run_rejected_middle(ChainPolicy::StopAtRejectedSuccessor).await,
        vec!["1"]
    );
}

#[tokio::test]
async fn test_skip_rejected_continues_pipeline() {
    assert_eq!(
        run_rejected_middle(ChainPolicy::SkipRejected).await,
        vec!["1", "3"]
    );
}

#[tokio::test]
async fn test_duplicate_priority_fails_before_running() {
    let log: Log = Arc::default();
    let mut manager = TaskManager::new();
    manager
        .register_or_add_task_to_pipeline::<OrderPlaced>(marker(&log, "a"), 1)
        .await
        .unwrap();

    let err = manager
        .register_or_add_task_to_pipeline::<OrderPlaced>(marker(&log, "b"), 1)
        .await
        .err()
        .unwrap();
    assert_eq!(err, DispatchError::DuplicatePriority { priority: 1 });
    assert!(entries(&log).is_empty());
}

fn flaky(calls: &Arc<AtomicUsize>, failures: usize) -> TaskRef<Order> {
    let calls = calls.clone();
    TaskFn::arc("flaky", move |_args: ActionEventArgs<Order>| {
        let calls = calls.clone();
        async move {
            let n = calls.fetch_add(1, Ordering::SeqCst);
            if n < failures {
                Err(TaskError::Fail {
                    error: format!("failure {}", n + 1),
                })
            } else {
                Ok(())
            }
        }
    })
}

fn quick_retry(max_retries: u32) -> Decorator {
    Decorator::Retry(RetryPolicy::fixed(max_retries, Duration::from_millis(5)))
}

#[tokio::test]
async fn test_retry_recovers_after_two_failures() {
    let calls = Arc::new(AtomicUsize::new(0));
    let mut manager = TaskManager::new();
    manager
        .register_profile_task(
            "checkout",
            flaky(&calls, 2),
            TaskOptions::default().decorate(quick_retry(2)),
        )
        .unwrap();

    let action = OrderPlaced::new();
    manager.link(&action, Some("checkout")).await.unwrap();
    action.fire(1, 10).await.unwrap();

    assert_eq!(calls.load(Ordering::SeqCst), 3);
}

#[tokio::test]
async fn test_retry_exhaustion_surfaces_error() {
    let calls = Arc::new(AtomicUsize::new(0));
    let mut manager = TaskManager::new();
    manager
        .register_profile_task(
            "checkout",
            flaky(&calls, usize::MAX),
            TaskOptions::default().decorate(quick_retry(1)),
        )
        .unwrap();

    let action = OrderPlaced::new();
    manager.link(&action, Some("checkout")).await.unwrap();
    let err = action.fire(1, 10).await.unwrap_err();

    assert_eq!(calls.load(Ordering::SeqCst), 2);
    assert_eq!(
        err.failures(),
        &[TaskError::Fail {
            error: "failure 2".into()
        }]
    );
}

#[tokio::test]
async fn test_removed_pipeline_task_no_longer_runs() {
    let log: Log = Arc::default();
    let mut manager = TaskManager::new();
    manager
        .register_or_add_task_to_pipeline::<OrderPlaced>(Arc::new(Reserve { log: log.clone() }), 1)
        .await
        .unwrap()
        .register_or_add_task_to_pipeline::<OrderPlaced>(Arc::new(Notify { log: log.clone() }), 2)
        .await
        .unwrap();

    manager
        .remove_task_from_pipeline::<OrderPlaced, Reserve>()
        .await
        .unwrap();

    let action = OrderPlaced::new();
    manager.link(&action, None).await.unwrap();
    action.fire(1, 10).await.unwrap();
    assert_eq!(entries(&log), vec!["notify"]);
}

#[tokio::test]
async fn test_replaced_pipeline_task_keeps_priority() {
    let log: Log = Arc::default();
    let mut manager = TaskManager::new();
    manager
        .register_or_add_task_to_pipeline::<OrderPlaced>(Arc::new(Reserve { log: log.clone() }), 1)
        .await
        .unwrap()
        .register_or_add_task_to_pipeline::<OrderPlaced>(marker(&log, "last"), 2)
        .await
        .unwrap();

    manager
        .replace_task_in_pipeline::<OrderPlaced, Reserve>(Arc::new(Notify { log: log.clone() }))
        .await
        .unwrap();

    let action = OrderPlaced::new();
    manager.link(&action, None).await.unwrap();
    action.fire(1, 10).await.unwrap();
    assert_eq!(entries(&log), vec!["notify", "last"]);
}

#[tokio::test]
async fn test_pipeline_mutation_without_pipeline_fails() {
    let log: Log = Arc::default();
    let mut manager = TaskManager::new();

    let err = manager
        .replace_task_in_pipeline::<OrderPlaced, Reserve>(marker(&log, "x"))
        .await
        .err()
        .unwrap();
    assert!(matches!(err, DispatchError::PipelineNotFound { .. }));
}

#[tokio::test]
async fn test_empty_registry_links_nothing() {
    let mut manager = TaskManager::new();
    let action = OrderPlaced::new();

    let linkage = manager.link(&action, Some("anything")).await.unwrap();
    assert!(linkage.is_empty());
    action.fire(1, 10).await.unwrap();
}

#[tokio::test]
async fn test_profile_tasks_gated_by_own_predicates() {
    let log: Log = Arc::default();
    let mut manager = TaskManager::new();
    manager
        .register_profile_task(
            "orders",
            marker(&log, "small"),
            TaskOptions::default().when(|args: &ActionEventArgs<Order>| args.data().amount < 100),
        )
        .unwrap()
        .register(
            marker(&log, "large"),
            TaskOptions::default().when(|args: &ActionEventArgs<Order>| args.data().amount >= 100),
        )
        .unwrap();

    let action = OrderPlaced::new();
    manager.link(&action, Some("orders")).await.unwrap();

    action.fire(1, 10).await.unwrap();
    action.fire(2, 500).await.unwrap();
    assert_eq!(entries(&log), vec!["small", "large"]);
}

#[tokio::test]
async fn test_direct_binding_decorator_order() {
    let log: Log = Arc::default();
    let factory = TaskFactory::new().with_default::<Order, ChargeCard>();
    let factory = with_trace(factory, &log, "universal");
    let factory = with_trace(factory, &log, "inner");
    let factory = with_trace(factory, &log, "outer");

    let mut manager = manager_with(factory);
    manager
        .add_universal_decorator(Decorator::custom("universal"))
        .unwrap()
        .register::<OrderPlaced, ChargeCard>(
            TaskOptions::default().decorate_all([Decorator::custom("inner"), Decorator::custom("outer")]),
        )
        .unwrap();

    let action = OrderPlaced::new();
    manager.link(&action, None).await.unwrap();
    action.fire(1, 10).await.unwrap();

    assert_eq!(
        entries(&log),
        vec![
            "outer:before",
            "inner:before",
            "universal:before",
            "universal:after",
            "inner:after",
            "outer:after",
        ]
    );
}

#[tokio::test]
async fn test_profile_entry_wrapped_by_universal_decorators() {
    let log: Log = Arc::default();
    let factory = with_trace(TaskFactory::new(), &log, "universal");
    let factory = with_trace(factory, &log, "own");

    let mut manager = manager_with(factory);
    manager
        .add_universal_decorator(Decorator::custom("universal"))
        .unwrap()
        .register_profile_task(
            "p",
            marker(&log, "task"),
            TaskOptions::default().decorate(Decorator::custom("own")),
        )
        .unwrap();

    let action = OrderPlaced::new();
    manager.link(&action, Some("p")).await.unwrap();
    action.fire(1, 10).await.unwrap();

    assert_eq!(
        entries(&log),
        vec![
            "universal:before",
            "own:before",
            "task",
            "own:after",
            "universal:after",
        ]
    );
}

#[tokio::test]
async fn test_subscription_order_pipeline_profile_binding() {
    let log: Log = Arc::default();
    let factory = with_trace(
        TaskFactory::new().with_default::<Order, ChargeCard>(),
        &log,
        "bound",
    );
    let mut manager = manager_with(factory);
    manager
        .register::<OrderPlaced, ChargeCard>(TaskOptions::default().decorate(Decorator::custom("bound")))
        .unwrap()
        .register_profile_task("p", marker(&log, "profile"), TaskOptions::default())
        .unwrap();
    manager
        .register_or_add_task_to_pipeline::<OrderPlaced>(marker(&log, "pipeline"), 1)
        .await
        .unwrap();

    let action = OrderPlaced::new();
    let linkage = manager.link(&action, Some("p")).await.unwrap();
    assert_eq!(linkage.len(), 3);

    action.fire(1, 10).await.unwrap();
    assert_eq!(
        entries(&log),
        vec!["pipeline", "profile", "bound:before", "bound:after"]
    );
}

#[tokio::test]
async fn test_unlink_stops_executions() {
    let log: Log = Arc::default();
    let mut manager = TaskManager::new();
    manager
        .register_profile_task("p", marker(&log, "run"), TaskOptions::default())
        .unwrap();

    let action = OrderPlaced::new();
    let linkage = manager.link(&action, Some("p")).await.unwrap();
    action.fire(1, 10).await.unwrap();

    assert_eq!(linkage.unlink().await, 1);
    action.fire(2, 10).await.unwrap();
    assert_eq!(entries(&log), vec!["run"]);
    assert_eq!(action.event.subscriber_count().await, 0);
}

#[tokio::test]
async fn test_concurrent_fan_out_runs_every_subscriber() {
    let calls = Arc::new(AtomicUsize::new(0));
    let mut manager = TaskManager::new();
    for _ in 0..4 {
        let calls = calls.clone();
        let slow: TaskRef<Order> = TaskFn::arc("slow", move |_args: ActionEventArgs<Order>| {
            let calls = calls.clone();
            async move {
                tokio::time::sleep(Duration::from_millis(100)).await;
                calls.fetch_add(1, Ordering::SeqCst);
                Ok(())
            }
        });
        manager
            .register_profile_task("p", slow, TaskOptions::default())
            .unwrap();
    }

    let action = OrderPlaced::concurrent();
    manager.link(&action, Some("p")).await.unwrap();

    let started = Instant::now();
    action.fire(1, 10).await.unwrap();
    assert_eq!(calls.load(Ordering::SeqCst), 4);
    assert!(started.elapsed() < Duration::from_millis(350));
}

#[tokio::test]
async fn test_failing_subscriber_does_not_stop_others() {
    let log: Log = Arc::default();
    let failing: TaskRef<Order> = TaskFn::arc("failing", |_args: ActionEventArgs<Order>| async {
        Err(TaskError::Fatal {
            error: "declined".into(),
        })
    });
    let mut manager = TaskManager::new();
    manager
        .register_profile_task("p", failing, TaskOptions::default())
        .unwrap()
        .register(marker(&log, "after"), TaskOptions::default())
        .unwrap();

    let action = OrderPlaced::new();
    manager.link(&action, Some("p")).await.unwrap();
    let err = action.fire(1, 10).await.unwrap_err();

    assert_eq!(err.as_label(), "dispatch_subscribers_failed");
    assert_eq!(err.failures().len(), 1);
    assert_eq!(entries(&log), vec!["after"]);
}

#[tokio::test]
async fn test_pipeline_lifecycle_callbacks() {
    let events: Log = Arc::default();
    let (s, c, f) = (events.clone(), events.clone(), events.clone());
    let pipeline = Arc::new(
        Pipeline::new()
            .on_started(move |o: &Order| s.lock().unwrap().push(format!("started {}", o.id)))
            .on_completed(move |o: &Order| c.lock().unwrap().push(format!("completed {}", o.id)))
            .on_failed(move |o: &Order, e: &TaskError| {
                f.lock().unwrap().push(format!("failed {} {}", o.id, e.as_label()))
            }),
    );
    let picky: TaskRef<Order> = TaskFn::arc("picky", |args: ActionEventArgs<Order>| async move {
        if args.data().amount == 0 {
            return Err(TaskError::Fail {
                error: "empty order".into(),
            });
        }
        Ok(())
    });
    pipeline.register_task(picky, 1, None).await.unwrap();

    let mut manager = TaskManager::new();
    manager.register_pipeline::<OrderPlaced>(pipeline);
    let action = OrderPlaced::new();
    manager.link(&action, None).await.unwrap();

    action.fire(1, 10).await.unwrap();
    assert!(action.fire(2, 0).await.is_err());

    assert_eq!(
        entries(&events),
        vec!["started 1", "completed 1", "started 2", "failed 2 task_failed"]
    );
}

#[tokio::test]
async fn test_shared_data_scoped_to_occurrence() {
    let seen: Arc<Mutex<Vec<Option<u64>>>> = Arc::default();
    let writer: TaskRef<Order> = TaskFn::arc("writer", |args: ActionEventArgs<Order>| async move {
        if args.data().id == 1 {
            args.shared().insert("discount", args.data().amount / 10);
        }
        Ok(())
    });
    let s = seen.clone();
    let reader: TaskRef<Order> = TaskFn::arc("reader", move |args: ActionEventArgs<Order>| {
        let s = s.clone();
        async move {
            let discount = args.shared().get::<u64>("discount").map(|d| *d);
            s.lock().unwrap().push(discount);
            Ok(())
        }
    });

    let mut manager = TaskManager::new();
    manager
        .register_or_add_task_to_pipeline::<OrderPlaced>(writer, 1)
        .await
        .unwrap()
        .register_or_add_task_to_pipeline::<OrderPlaced>(reader, 2)
        .await
        .unwrap();

    let action = OrderPlaced::new();
    manager.link(&action, None).await.unwrap();
    action.fire(1, 200).await.unwrap();
    action.fire(2, 200).await.unwrap();

    assert_eq!(*seen.lock().unwrap(), vec![Some(20), None]);
}

#[tokio::test]
async fn test_cancellation_aborts_retry_sleep() {
    let calls = Arc::new(AtomicUsize::new(0));
    let mut manager = TaskManager::new();
    manager
        .register_profile_task(
            "p",
            flaky(&calls, usize::MAX),
            TaskOptions::default().decorate(Decorator::Retry(RetryPolicy::fixed(
                5,
                Duration::from_secs(30),
            ))),
        )
        .unwrap();

    let action = OrderPlaced::new();
    manager.link(&action, Some("p")).await.unwrap();

    let token = CancellationToken::new();
    let canceller = {
        let token = token.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(30)).await;
            token.cancel();
        })
    };

    let started = Instant::now();
    let err = action
        .event
        .fire_with_token(Order { id: 1, amount: 1 }, token)
        .await
        .unwrap_err();
    canceller.await.unwrap();

    assert!(started.elapsed() < Duration::from_secs(5));
    assert_eq!(err.failures(), &[TaskError::Canceled]);
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[derive(Default)]
struct Samples(Mutex<Vec<String>>);

impl MetricsSink for Samples {
    fn collect(&self, metric: &str, _value: f64) {
        self.0.lock().unwrap().push(metric.to_string());
    }
}

#[tokio::test]
async fn test_metrics_and_logging_decorators_pass_through() {
    let sink = Arc::new(Samples::default());
    let log: Log = Arc::default();
    let cfg = ManagerConfig {
        enable_logging_decorator: true,
        ..ManagerConfig::default()
    };
    let mut manager = TaskManager::builder(cfg)
        .with_factory(TaskFactory::new().with_metrics(sink.clone()))
        .build();
    manager
        .register_profile_task(
            "p",
            marker(&log, "tracked"),
            TaskOptions::default().decorate(Decorator::Metrics),
        )
        .unwrap();

    let action = OrderPlaced::new();
    manager.link(&action, Some("p")).await.unwrap();
    action.fire(1, 10).await.unwrap();

    assert_eq!(manager.universal_decorators(), &[Decorator::Logging]);
    assert_eq!(entries(&log), vec!["tracked"]);
    assert_eq!(*sink.0.lock().unwrap(), vec!["tracked.executionTime"]);
}

use schedgate::fixtures::{FixtureCluster, FixtureItem};
use schedgate::{NodePrepareRecord, NodeStatus, PrepareChecker, PrepareConfig};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

fn checker(factor: f64) -> PrepareChecker {
    let config = PrepareConfig::new(Duration::from_secs(300), factor).expect("config");
    PrepareChecker::new(config).expect("checker")
}

#[test]
fn prepare_checkpoint_counts_commute_across_ingestion_workers() {
    let checker = Arc::new(checker(0.9));
    let workers: Vec<_> = (0..4u64)
        .map(|worker| {
            let checker = Arc::clone(&checker);
            thread::spawn(move || {
                // Each worker reports a disjoint batch of distinct items.
                for _ in 0..250 {
                    let item = FixtureItem::new(vec![1, 2, (worker % 2) + 3]);
                    checker.collect(&item);
                }
            })
        })
        .collect();
    for worker in workers {
        worker.join().expect("ingestion worker");
    }

    assert_eq!(checker.sum(), 1_000);
    let progress = checker.progress();
    assert_eq!(
        progress.nodes,
        vec![
            NodePrepareRecord { node: 1, collected: 1_000 },
            NodePrepareRecord { node: 2, collected: 1_000 },
            NodePrepareRecord { node: 3, collected: 500 },
            NodePrepareRecord { node: 4, collected: 500 },
        ]
    );
}

#[test]
fn prepare_checkpoint_gate_stays_open_under_concurrent_queries() {
    let checker = Arc::new(checker(0.1));
    let view = FixtureCluster::new(100, 0).with_node(1, NodeStatus::Active, 100);

    let item = FixtureItem::new(vec![1]);
    for _ in 0..100 {
        checker.collect(&item);
    }
    assert!(checker.check(&view));

    // Once open, every observer sees it open, forever, from any thread.
    let observers: Vec<_> = (0..4)
        .map(|_| {
            let checker = Arc::clone(&checker);
            let view = view.clone();
            thread::spawn(move || {
                for _ in 0..100 {
                    assert!(checker.is_prepared());
                    assert!(checker.check(&view));
                }
            })
        })
        .collect();
    for observer in observers {
        observer.join().expect("scheduler observer");
    }
}

#[test]
fn prepare_checkpoint_progress_serializes_for_status_reporting() {
    let checker = checker(0.5);
    checker.collect(&FixtureItem::new(vec![2, 1]));
    let progress = checker.progress();

    let payload = serde_json::to_value(&progress).expect("progress serializes");
    assert_eq!(payload["prepared"], false);
    assert_eq!(payload["sum"], 1);
    assert_eq!(payload["nodes"][0]["node"], 1);
    assert_eq!(payload["nodes"][1]["node"], 2);
}

#[test]
fn prepare_checkpoint_stalled_collection_fails_open() {
    let config = PrepareConfig::new(Duration::from_millis(10), 0.9).expect("config");
    let checker = PrepareChecker::new(config).expect("checker");
    let view = FixtureCluster::new(100, 0).with_node(1, NodeStatus::Active, 100);

    assert!(!checker.check(&view));
    thread::sleep(Duration::from_millis(25));
    assert!(checker.check(&view));
    assert!(checker.is_prepared());
}

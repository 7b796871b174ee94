use super::support::{messages, position, FakeControlPlane, FakeNodeAgent};
use fleetsweep::scan::{ClassifierRules, ScanOutcome, Scanner, WalkOptions};
use fleetsweep::{FileRecord, Instance, InstanceId, SweepError};
use std::sync::Arc;
use tokio::sync::broadcast::error::TryRecvError;
use tokio::sync::Notify;

fn scanner(plane: &Arc<FakeControlPlane>, agent: &Arc<FakeNodeAgent>) -> Scanner {
    Scanner::new(
        plane.clone(),
        agent.clone(),
        ClassifierRules::default(),
        WalkOptions::default(),
    )
}

#[tokio::test]
async fn miner_on_active_instance_is_suspended() {
    let plane = Arc::new(FakeControlPlane::with_instances(vec![
        Instance::new(1u64, false),
        Instance::new(2u64, true),
    ]));
    let agent = Arc::new(FakeNodeAgent::new().listing("1", "", vec![FileRecord::file("xmrig", "2MB")]));

    let report = scanner(&plane, &agent).run_scan().await.unwrap();

    assert!(report.is_completed());
    assert_eq!(
        messages(&report.entries),
        vec![
            "Processing instance with ID: 1".to_string(),
            "File: xmrig Extension:  Purpose: ".to_string(),
            "Server with ID: 1 has been suspended successfully.".to_string(),
            "Suspicious mining activity detected in server: 1".to_string(),
        ]
    );
    assert_eq!(plane.suspend_calls(), vec![InstanceId::from(1u64)]);
    assert!(agent.paths_for("2").is_empty());
    assert_eq!(report.stats.instances_scanned, 1);
    assert_eq!(report.stats.walk.detections, 1);
    assert_eq!(report.stats.walk.suspensions, 1);
}

#[tokio::test]
async fn failed_suspension_is_logged_and_the_walk_goes_on() {
    let plane = Arc::new(
        FakeControlPlane::with_instances(vec![Instance::new(1u64, false)])
            .suspend_fails_with(SweepError::HttpStatus { status: 500 }),
    );
    let agent = Arc::new(FakeNodeAgent::new().listing(
        "1",
        "",
        vec![
            FileRecord::file("xmrig", "2MB"),
            FileRecord::file("eula.txt", "1KB"),
        ],
    ));

    let report = scanner(&plane, &agent).run_scan().await.unwrap();
    let log = messages(&report.entries);

    let failed = position(&log, "Failed to suspend server with ID: 1. Status: 500");
    let detected = position(&log, "Suspicious mining activity detected in server: 1");
    let next = position(&log, "File: eula.txt Extension: .txt Purpose: ");
    assert!(failed < detected && detected < next);
    assert_eq!(report.stats.walk.suspend_requests, 1);
    assert_eq!(report.stats.walk.suspensions, 0);
    assert!(report.is_completed());
}

#[tokio::test]
async fn transport_failure_on_suspend_names_the_instance() {
    let plane = Arc::new(
        FakeControlPlane::with_instances(vec![Instance::new("abc", false)])
            .suspend_fails_with(SweepError::Transport("connection refused".to_string())),
    );
    let agent = Arc::new(FakeNodeAgent::new().listing(
        "abc",
        "",
        vec![FileRecord::file("run.sh", "1KB").with_purpose("script")],
    ));

    let report = scanner(&plane, &agent).run_scan().await.unwrap();

    position(
        &messages(&report.entries),
        "Error suspending server with ID: abc: connection refused",
    );
}

#[tokio::test]
async fn instances_are_walked_one_after_another() {
    let plane = Arc::new(FakeControlPlane::with_instances(vec![
        Instance::new("a", false),
        Instance::new("b", false),
    ]));
    let agent = Arc::new(
        FakeNodeAgent::new()
            .listing("a", "", vec![FileRecord::directory("plugins")])
            .listing("a", "plugins", vec![FileRecord::file("a.jar", "1MB")])
            .listing("b", "", vec![FileRecord::file("b.txt", "1KB")]),
    );

    let report = scanner(&plane, &agent).run_scan().await.unwrap();
    let log = messages(&report.entries);

    assert_eq!(
        agent.calls(),
        vec![
            ("a".to_string(), String::new()),
            ("a".to_string(), "plugins".to_string()),
            ("b".to_string(), String::new()),
        ]
    );
    let nested = position(&log, "File: a.jar Extension: .jar Purpose: ");
    let second = position(&log, "Processing instance with ID: b");
    assert!(nested < second);
    assert_eq!(report.stats.instances_scanned, 2);
}

#[tokio::test]
async fn control_plane_failure_yields_an_empty_completed_scan() {
    let plane = Arc::new(FakeControlPlane::failing_listing(SweepError::HttpStatus {
        status: 502,
    }));
    let agent = Arc::new(FakeNodeAgent::new());

    let report = scanner(&plane, &agent).run_scan().await.unwrap();

    assert!(report.is_completed());
    assert_eq!(
        messages(&report.entries),
        vec!["Failed to retrieve instances. Status: 502".to_string()]
    );
    assert!(agent.calls().is_empty());
}

#[tokio::test]
async fn panic_fails_the_scan_and_releases_the_guard() {
    let plane = Arc::new(FakeControlPlane::with_instances(vec![Instance::new(1u64, false)]));
    let agent = Arc::new(FakeNodeAgent::new().panicking("1", ""));
    let scanner = scanner(&plane, &agent);

    let report = scanner.run_scan().await.unwrap();

    assert_eq!(
        report.outcome,
        ScanOutcome::Failed {
            error: "Scan failed: node agent exploded".to_string()
        }
    );
    assert_eq!(
        messages(&report.entries).last().map(String::as_str),
        Some("Error processing instances: node agent exploded")
    );
    assert!(!scanner.is_scanning());

    let again = scanner.run_scan().await.unwrap();
    assert!(!again.is_completed());
    assert_eq!(again.entries.len(), report.entries.len());
}

#[tokio::test]
async fn second_trigger_is_rejected_while_a_scan_runs() {
    let gate = Arc::new(Notify::new());
    let plane = Arc::new(FakeControlPlane::with_instances(vec![Instance::new(1u64, false)]));
    let agent = Arc::new(FakeNodeAgent::new().gated(Arc::clone(&gate)));
    let scanner = scanner(&plane, &agent);

    let (report, observed) = tokio::join!(scanner.run_scan(), async {
        // The first scan is parked on its root listing by now.
        assert!(scanner.is_scanning());
        let rejected = scanner.run_scan().await;
        let partial = messages(&scanner.snapshot());
        gate.notify_one();
        (rejected, partial)
    });

    let (rejected, partial) = observed;
    assert_eq!(rejected.unwrap_err(), SweepError::ScanInProgress);
    assert_eq!(partial, vec!["Processing instance with ID: 1".to_string()]);

    let report = report.unwrap();
    assert!(report.is_completed());
    assert_eq!(report.entries.len(), 1);
    assert!(!scanner.is_scanning());
}

#[tokio::test]
async fn each_scan_starts_with_an_empty_log() {
    let plane = Arc::new(FakeControlPlane::with_instances(vec![Instance::new(1u64, false)]));
    let agent = Arc::new(FakeNodeAgent::new().listing("1", "", vec![FileRecord::file("eula.txt", "1KB")]));
    let scanner = scanner(&plane, &agent);

    let first = scanner.run_scan().await.unwrap();
    let second = scanner.run_scan().await.unwrap();

    assert_eq!(messages(&first.entries), messages(&second.entries));
    assert_eq!(scanner.snapshot().len(), 2);
    assert!(second.started_at >= first.started_at);
}

#[tokio::test]
async fn subscribers_see_exactly_the_snapshot() {
    let plane = Arc::new(FakeControlPlane::with_instances(vec![
        Instance::new(1u64, false),
        Instance::new(2u64, false),
    ]));
    let agent = Arc::new(
        FakeNodeAgent::new()
            .listing("1", "", vec![FileRecord::file("server.jar", "17MB")])
            .listing("2", "", vec![FileRecord::file("run.sh", "1KB").with_purpose("script")]),
    );
    let scanner = scanner(&plane, &agent);
    let mut receiver = scanner.subscribe();

    let report = scanner.run_scan().await.unwrap();

    let mut streamed = Vec::new();
    loop {
        match receiver.try_recv() {
            Ok(entry) => streamed.push(entry),
            Err(TryRecvError::Empty) => break,
            Err(other) => panic!("unexpected receive error: {other:?}"),
        }
    }
    assert_eq!(streamed, report.entries);
    assert_eq!(streamed, scanner.snapshot());
    position(
        &messages(&streamed),
        "Suspicious server.jar file size detected: 1",
    );
}

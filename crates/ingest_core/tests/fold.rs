use ingest_core::{fold, ProgressEvent, ProgressSnapshot};
use pretty_assertions::assert_eq;

fn processing(index: u64, total: u64, url: &str) -> ProgressEvent {
    ProgressEvent::Processing {
        index,
        total,
        url: url.to_string(),
        title: None,
    }
}

fn fold_all(events: &[ProgressEvent]) -> ProgressSnapshot {
    events
        .iter()
        .fold(ProgressSnapshot::new(), |snapshot, event| fold(snapshot, event))
}

#[test]
fn processing_sets_position_and_total_and_logs() {
    let snapshot = fold(ProgressSnapshot::new(), &processing(2, 5, "https://b.example"));

    assert_eq!(snapshot.processed_count(), 2);
    assert_eq!(snapshot.total(), 5);
    assert_eq!(snapshot.failed_count(), 0);
    assert_eq!(snapshot.lines(), vec!["[2/5] Processing: https://b.example"]);
    assert!(!snapshot.is_terminal());
}

#[test]
fn processing_never_invents_a_failure_count() {
    let snapshot = fold_all(&[
        processing(1, 3, "a.com"),
        ProgressEvent::Failed {
            url: "a.com".into(),
            reason: "404".into(),
        },
        processing(2, 3, "b.com"),
        processing(3, 3, "c.com"),
    ]);
    assert_eq!(snapshot.failed_count(), 0);
    assert_eq!(snapshot.processed_count(), 3);
}

#[test]
fn item_failures_are_logged_without_counting() {
    let snapshot = fold_all(&[
        processing(1, 2, "a.com"),
        ProgressEvent::Failed {
            url: "a.com".into(),
            reason: "timeout".into(),
        },
        ProgressEvent::Error {
            url: Some("b.com".into()),
            message: "boom".into(),
        },
        ProgressEvent::Error {
            url: None,
            message: "pipeline crashed".into(),
        },
    ]);

    assert_eq!(snapshot.failed_count(), 0);
    assert_eq!(snapshot.processed_count(), 1);
    assert_eq!(
        snapshot.lines(),
        vec![
            "[1/2] Processing: a.com",
            "FAILED: a.com - timeout",
            "ERROR: b.com - boom",
            "ERROR: pipeline crashed",
        ]
    );
}

#[test]
fn parsing_messages_are_logged_verbatim() {
    let snapshot = fold_all(&[
        ProgressEvent::Parsing {
            message: "Parsing HTML content...".into(),
        },
        ProgressEvent::ParsingComplete {
            message: "Found 3 bookmarks".into(),
        },
    ]);

    assert_eq!(snapshot.lines(), vec!["Parsing HTML content...", "Found 3 bookmarks"]);
    assert_eq!(snapshot.total(), 0);
    assert_eq!(snapshot.processed_count(), 0);
}

#[test]
fn completed_replaces_counts_regardless_of_prior_state() {
    let prior = fold_all(&[
        ProgressEvent::Parsing {
            message: "earlier".into(),
        },
        processing(99, 500, "far.com"),
    ]);
    let snapshot = fold(prior, &ProgressEvent::Completed { success: 2, failed: 1 });

    assert_eq!(snapshot.processed_count(), 2);
    assert_eq!(snapshot.failed_count(), 1);
    assert_eq!(snapshot.total(), 3);
    assert_eq!(
        snapshot.lines(),
        vec![
            "earlier",
            "[99/500] Processing: far.com",
            "Done! Success: 2, Failed: 1"
        ]
    );
    assert!(snapshot.is_terminal());
}

#[test]
fn nothing_is_folded_after_completed() {
    let done = fold_all(&[
        processing(1, 1, "a.com"),
        ProgressEvent::Completed { success: 1, failed: 0 },
    ]);

    let after = fold_all_from(
        done.clone(),
        &[
            processing(5, 10, "late.com"),
            ProgressEvent::Failed {
                url: "late.com".into(),
                reason: "late".into(),
            },
            ProgressEvent::Completed { success: 0, failed: 9 },
        ],
    );

    assert_eq!(after, done);
}

fn fold_all_from(start: ProgressSnapshot, events: &[ProgressEvent]) -> ProgressSnapshot {
    events.iter().fold(start, |snapshot, event| fold(snapshot, event))
}

#[test]
fn percent_strictly_increases_and_stays_within_bounds() {
    let total = 7;
    let mut snapshot = ProgressSnapshot::new();
    let mut last = -1.0_f64;

    for index in 1..=total {
        snapshot = fold(snapshot, &processing(index, total, "item.com"));
        let percent = snapshot.percent_complete().expect("total is known");
        assert!(percent > last, "percent went from {last} to {percent}");
        assert!(percent <= 100.0);
        last = percent;
    }
    assert_eq!(last, 100.0);
}

#[test]
fn zero_total_has_no_percent() {
    let snapshot = ProgressSnapshot::new();
    assert_eq!(snapshot.percent_complete(), None);

    let snapshot = fold(snapshot, &ProgressEvent::Completed { success: 0, failed: 0 });
    assert_eq!(snapshot.total(), 0);
    assert_eq!(snapshot.percent_complete(), None);
}

#[test]
fn percent_is_clamped_when_index_exceeds_total() {
    let snapshot = fold(ProgressSnapshot::new(), &processing(4, 3, "over.com"));
    assert_eq!(snapshot.percent_complete(), Some(100.0));
}

#[test]
fn duplicate_processing_event_keeps_counts_stable() {
    let once = fold_all(&[processing(2, 4, "b.com")]);
    let twice = fold_all(&[processing(2, 4, "b.com"), processing(2, 4, "b.com")]);

    assert_eq!(once.processed_count(), twice.processed_count());
    assert_eq!(once.total(), twice.total());
    assert_eq!(twice.lines().len(), 2);
}

//! Batch sizing, ordering and abort behavior of the scheduler

mod common;

use common::{RecordingReporter, ScriptedJobClient, TestFixtures};
use orchestrator::{BatchScheduler, OrchestratorError, PollFailure, StatusUpdate};
use shared::{ApiFailure, BatchJob};

#[tokio::test(start_paused = true)]
async fn test_five_artifacts_in_batches_of_two() {
    let client = ScriptedJobClient::new()
        .with_batch(vec![TestFixtures::pending(1), TestFixtures::completed(1, 2)])
        .with_batch(vec![TestFixtures::completed(2, 2)])
        .with_batch(vec![TestFixtures::rate_limited(), TestFixtures::completed(3, 1)]);
    let reporter = RecordingReporter::new();
    let mut scheduler = BatchScheduler::new(&client, &reporter, TestFixtures::policy());

    scheduler.run(&TestFixtures::request(5, 2)).await.unwrap();

    assert_eq!(client.requested_counts(), vec![2, 2, 1]);
    assert_eq!(
        scheduler.issued(),
        &[
            BatchJob { batch_index: 1, requested_count: 2 },
            BatchJob { batch_index: 2, requested_count: 2 },
            BatchJob { batch_index: 3, requested_count: 1 },
        ]
    );

    let mut expected = TestFixtures::artifacts(1, 2);
    expected.extend(TestFixtures::artifacts(2, 2));
    expected.extend(TestFixtures::artifacts(3, 1));
    assert_eq!(scheduler.results(), expected.as_slice());
}

#[tokio::test(start_paused = true)]
async fn test_failed_batch_aborts_the_run() {
    let client = ScriptedJobClient::new()
        .with_batch(vec![TestFixtures::completed(1, 2)])
        .with_batch(vec![TestFixtures::job_failed(2, "generation error")]);
    let reporter = RecordingReporter::new();
    let mut scheduler = BatchScheduler::new(&client, &reporter, TestFixtures::policy());

    let error = scheduler.run(&TestFixtures::request(5, 2)).await.unwrap_err();

    match error {
        OrchestratorError::BatchFailed { batch, total_batches, reason } => {
            assert_eq!(batch, 2);
            assert_eq!(total_batches, 3);
            assert_eq!(reason, PollFailure::JobFailed { reason: "generation error".to_string() });
        }
        other => panic!("expected batch failure, got {other:?}"),
    }
    // Batch 3 is never submitted; batch 1's output stays inspectable
    assert_eq!(client.requested_counts(), vec![2, 2]);
    assert_eq!(scheduler.results(), TestFixtures::artifacts(1, 2).as_slice());
}

#[tokio::test(start_paused = true)]
async fn test_exhausted_retries_abort_with_batch_index() {
    let client = ScriptedJobClient::new()
        .with_batch(vec![TestFixtures::rate_limited(); 6]);
    let reporter = RecordingReporter::new();
    let mut scheduler = BatchScheduler::new(&client, &reporter, TestFixtures::policy());

    let error = scheduler.run(&TestFixtures::request(3, 4)).await.unwrap_err();

    assert_eq!(error.batch(), Some(1));
    assert!(matches!(
        error,
        OrchestratorError::BatchFailed {
            reason: PollFailure::ExhaustedRetries { attempts: 5, .. },
            ..
        }
    ));
    assert!(scheduler.results().is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_rejected_submission_carries_batch_index() {
    let client = ScriptedJobClient::new()
        .with_batch(vec![TestFixtures::completed(1, 1)])
        .with_submit_failure(2, ApiFailure::fatal("HTTP 400 INVALID_ARGUMENT: bad prompt"));
    let reporter = RecordingReporter::new();
    let mut scheduler = BatchScheduler::new(&client, &reporter, TestFixtures::policy());

    let error = scheduler.run(&TestFixtures::request(2, 1)).await.unwrap_err();

    match error {
        OrchestratorError::Submission { batch, source } => {
            assert_eq!(batch, 2);
            assert_eq!(source, ApiFailure::fatal("HTTP 400 INVALID_ARGUMENT: bad prompt"));
        }
        other => panic!("expected submission failure, got {other:?}"),
    }
    assert_eq!(client.poll_count(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_under_delivery_adds_a_batch() {
    let client = ScriptedJobClient::new()
        .with_batch(vec![TestFixtures::completed(1, 1)])
        .with_batch(vec![TestFixtures::completed(2, 2)])
        .with_batch(vec![TestFixtures::completed(3, 1)]);
    let reporter = RecordingReporter::new();
    let mut scheduler = BatchScheduler::new(&client, &reporter, TestFixtures::policy());

    scheduler.run(&TestFixtures::request(4, 2)).await.unwrap();

    assert_eq!(client.requested_counts(), vec![2, 2, 1]);
    assert_eq!(scheduler.results().len(), 4);

    let started: Vec<(usize, usize)> = reporter
        .updates()
        .into_iter()
        .filter_map(|update| match update {
            StatusUpdate::BatchStarted { batch, total_batches, .. } => Some((batch, total_batches)),
            _ => None,
        })
        .collect();
    assert_eq!(started, vec![(1, 2), (2, 2), (3, 3)]);
}

#[tokio::test(start_paused = true)]
async fn test_over_delivery_is_kept() {
    let client = ScriptedJobClient::new().with_batch(vec![TestFixtures::completed(1, 3)]);
    let reporter = RecordingReporter::new();
    let mut scheduler = BatchScheduler::new(&client, &reporter, TestFixtures::policy());

    scheduler.run(&TestFixtures::request(2, 2)).await.unwrap();

    assert_eq!(client.requested_counts(), vec![2]);
    assert_eq!(scheduler.into_results(), TestFixtures::artifacts(1, 3));
}

#[tokio::test(start_paused = true)]
async fn test_single_batch_reports_progress_in_order() {
    let client = ScriptedJobClient::new().with_batch(vec![TestFixtures::completed(1, 2)]);
    let reporter = RecordingReporter::new();
    let mut scheduler = BatchScheduler::new(&client, &reporter, TestFixtures::policy());

    scheduler.run(&TestFixtures::request(2, 4)).await.unwrap();

    assert_eq!(
        reporter.milestones(),
        vec![
            StatusUpdate::BatchStarted { batch: 1, total_batches: 1, requested: 2 },
            StatusUpdate::BatchSucceeded { batch: 1, produced: 2 },
        ]
    );
}

//! Two-leg concurrent join.
//!
//! Upload and delete both run one operation per backend at the same time
//! and then reduce the two outcomes. Only the reduction differs, so both
//! paths go through [`fan_out`] with a [`LegPolicy`].

use std::future::Future;
use std::time::Duration;

use fabric_core::AssetKey;
use tracing::{error, warn};

use crate::{BackendKind, MediaError, MediaResult};

/// How failed legs affect the combined result
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LegPolicy {
    /// Any failed leg fails the whole operation
    AllOrNothing,
    /// Failed legs are logged; the operation always succeeds
    BestEffort,
}

/// Outcome of a fan-out that the policy accepted
#[derive(Debug)]
pub struct JoinReport<T> {
    pub succeeded: Vec<(BackendKind, T)>,
    /// Always empty under [`LegPolicy::AllOrNothing`]
    pub failed: Vec<MediaError>,
}

impl<T> JoinReport<T> {
    pub fn is_complete(&self) -> bool {
        self.failed.is_empty()
    }

    /// Value returned by the given backend's leg
    pub fn value(&self, backend: BackendKind) -> Option<&T> {
        self.succeeded
            .iter()
            .find(|(kind, _)| *kind == backend)
            .map(|(_, value)| value)
    }
}

/// Run both legs concurrently, wait for both, and reduce by `policy`.
///
/// The legs share no state, so no ordering between them is implied. With a
/// `leg_timeout`, a leg still running when it elapses is dropped and counted
/// as that leg's failure.
pub async fn fan_out<T, A, B>(
    policy: LegPolicy,
    key: &AssetKey,
    leg_timeout: Option<Duration>,
    first: (BackendKind, A),
    second: (BackendKind, B),
) -> MediaResult<JoinReport<T>>
where
    A: Future<Output = MediaResult<T>>,
    B: Future<Output = MediaResult<T>>,
{
    let (first_kind, first_leg) = first;
    let (second_kind, second_leg) = second;

    let (first_result, second_result) = tokio::join!(
        bounded(first_kind, leg_timeout, first_leg),
        bounded(second_kind, leg_timeout, second_leg)
    );

    reduce(
        policy,
        key,
        vec![(first_kind, first_result), (second_kind, second_result)],
    )
}

async fn bounded<T, F>(backend: BackendKind, limit: Option<Duration>, leg: F) -> MediaResult<T>
where
    F: Future<Output = MediaResult<T>>,
{
    match limit {
        Some(limit) => tokio::time::timeout(limit, leg).await.unwrap_or_else(|_| {
            Err(MediaError::LegTimeout {
                backend,
                timeout_ms: limit.as_millis() as u64,
            })
        }),
        None => leg.await,
    }
}

fn reduce<T>(
    policy: LegPolicy,
    key: &AssetKey,
    outcomes: Vec<(BackendKind, MediaResult<T>)>,
) -> MediaResult<JoinReport<T>> {
    let mut report = JoinReport {
        succeeded: Vec::with_capacity(outcomes.len()),
        failed: Vec::new(),
    };

    for (backend, outcome) in outcomes {
        match outcome {
            Ok(value) => report.succeeded.push((backend, value)),
            Err(e) => {
                match policy {
                    LegPolicy::AllOrNothing => {
                        error!(key = %key, backend = %backend, error = %e, "replication leg failed")
                    }
                    LegPolicy::BestEffort => {
                        warn!(key = %key, backend = %backend, error = %e, "ignoring failed leg")
                    }
                }
                report.failed.push(e);
            }
        }
    }

    match policy {
        LegPolicy::AllOrNothing if !report.failed.is_empty() => Err(MediaError::ReplicationFailed {
            key: key.clone(),
            failures: report.failed,
        }),
        _ => Ok(report),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Instant;

    fn key() -> AssetKey {
        AssetKey::from_string("123MEN__F")
    }

    fn ok(value: &'static str) -> MediaResult<&'static str> {
        Ok(value)
    }

    fn fail(backend: BackendKind) -> MediaResult<&'static str> {
        Err(MediaError::upload(backend, &key(), "boom"))
    }

    #[tokio::test]
    async fn all_or_nothing_commits_when_both_legs_succeed() {
        let report = fan_out(
            LegPolicy::AllOrNothing,
            &key(),
            None,
            (BackendKind::ObjectStore, async { ok("a") }),
            (BackendKind::FileTransfer, async { ok("b") }),
        )
        .await
        .unwrap();

        assert!(report.is_complete());
        assert_eq!(report.value(BackendKind::ObjectStore), Some(&"a"));
        assert_eq!(report.value(BackendKind::FileTransfer), Some(&"b"));
    }

    #[tokio::test]
    async fn all_or_nothing_wraps_single_failure() {
        let err = fan_out(
            LegPolicy::AllOrNothing,
            &key(),
            None,
            (BackendKind::ObjectStore, async { ok("a") }),
            (BackendKind::FileTransfer, async { fail(BackendKind::FileTransfer) }),
        )
        .await
        .unwrap_err();

        assert!(matches!(err, MediaError::ReplicationFailed { .. }));
        assert_eq!(err.leg_failures().len(), 1);
        assert_eq!(err.leg_failures()[0].backend(), Some(BackendKind::FileTransfer));
    }

    #[tokio::test]
    async fn all_or_nothing_wraps_both_failures() {
        let err = fan_out(
            LegPolicy::AllOrNothing,
            &key(),
            None,
            (BackendKind::ObjectStore, async { fail(BackendKind::ObjectStore) }),
            (BackendKind::FileTransfer, async { fail(BackendKind::FileTransfer) }),
        )
        .await
        .unwrap_err();

        let backends: Vec<_> = err.leg_failures().iter().filter_map(|e| e.backend()).collect();
        assert_eq!(backends, [BackendKind::ObjectStore, BackendKind::FileTransfer]);
    }

    #[tokio::test]
    async fn best_effort_reports_failures_without_failing() {
        let report = fan_out(
            LegPolicy::BestEffort,
            &key(),
            None,
            (BackendKind::ObjectStore, async { fail(BackendKind::ObjectStore) }),
            (BackendKind::FileTransfer, async { ok("b") }),
        )
        .await
        .unwrap();

        assert!(!report.is_complete());
        assert_eq!(report.succeeded.len(), 1);
        assert_eq!(report.failed[0].backend(), Some(BackendKind::ObjectStore));
    }

    #[tokio::test]
    async fn legs_run_concurrently() {
        let started = Instant::now();
        let slow = |value| async move {
            tokio::time::sleep(Duration::from_millis(200)).await;
            ok(value)
        };

        fan_out(
            LegPolicy::AllOrNothing,
            &key(),
            None,
            (BackendKind::ObjectStore, slow("a")),
            (BackendKind::FileTransfer, slow("b")),
        )
        .await
        .unwrap();

        assert!(started.elapsed() < Duration::from_millis(390));
    }

    #[tokio::test]
    async fn elapsed_leg_counts_as_failure() {
        let err = fan_out(
            LegPolicy::AllOrNothing,
            &key(),
            Some(Duration::from_millis(20)),
            (BackendKind::ObjectStore, async { ok("a") }),
            (BackendKind::FileTransfer, async {
                tokio::time::sleep(Duration::from_secs(5)).await;
                ok("b")
            }),
        )
        .await
        .unwrap_err();

        assert!(matches!(
            err.leg_failures(),
            [MediaError::LegTimeout {
                backend: BackendKind::FileTransfer,
                ..
            }]
        ));
    }
}

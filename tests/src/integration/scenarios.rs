//! # Decision Scenarios
//!
//! Concurrent callers against one decision channel that answers in its own
//! order. Every caller must get exactly its own verdict.

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use std::time::Duration;

    use acceptor_telemetry::{decision_span, init_test_logging};
    use acceptor_types::{ChannelAcceptRequest, PendingChannelId, Verdict};
    use chan_acceptor::{
        AcceptorConfig, AcceptorError, ChannelAcceptor, FnPolicy, PolicyResponder, RpcAcceptor,
    };
    use futures::future::join_all;
    use tokio::task::JoinHandle;
    use tokio::time::Instant;
    use tracing::Instrument;

    use crate::fixtures::{random_ids, request, request_with_id, Script, ScriptedDecider};

    // =============================================================================
    // TEST FIXTURES
    // =============================================================================

    const TIMEOUT: Duration = Duration::from_secs(5);

    fn id(tag: u8) -> PendingChannelId {
        PendingChannelId::from_tag(tag)
    }

    fn start(decider: ScriptedDecider) -> RpcAcceptor {
        init_test_logging();
        let (acceptor, rx) = RpcAcceptor::with_queue(AcceptorConfig::with_timeout(TIMEOUT))
            .expect("valid config");
        decider.spawn(rx);
        acceptor
    }

    /// Spawn one accept call; the task reports its outcome and when it finished.
    fn call(
        acceptor: &RpcAcceptor,
        request: ChannelAcceptRequest,
    ) -> JoinHandle<(Result<(), AcceptorError>, Instant)> {
        let acceptor = acceptor.clone();
        let span = decision_span!("accept", pending_chan_id = %request.pending_channel_id());
        tokio::spawn(
            async move {
                let outcome = acceptor.accept(request).await;
                (outcome, Instant::now())
            }
            .instrument(span),
        )
    }

    // =============================================================================
    // SCENARIOS
    // =============================================================================

    #[tokio::test]
    async fn test_three_concurrent_calls_all_accepted() {
        let acceptor = start(ScriptedDecider::accept_all());
        let accepted = Arc::new(AtomicUsize::new(0));

        let calls: Vec<_> = (0..3)
            .map(|tag| {
                let acceptor = acceptor.clone();
                let accepted = Arc::clone(&accepted);
                tokio::spawn(async move {
                    if acceptor.accept(request(tag)).await.is_ok() {
                        accepted.fetch_add(1, Ordering::SeqCst);
                    }
                })
            })
            .collect();

        for call in calls {
            call.await.unwrap();
        }
        assert_eq!(accepted.load(Ordering::SeqCst), 3);
        assert_eq!(acceptor.stats().snapshot().accepted, 3);
    }

    #[tokio::test]
    async fn test_rejection_reaches_only_its_caller() {
        let decider = ScriptedDecider::accept_all()
            .with(id(1), Script::Reject("policy violation".into()));
        let acceptor = start(decider);

        let calls: Vec<_> = (0..3).map(|tag| call(&acceptor, request(tag))).collect();
        let outcomes: Vec<_> = join_all(calls)
            .await
            .into_iter()
            .map(|joined| joined.unwrap().0)
            .collect();

        assert_eq!(outcomes[0], Ok(()));
        assert_eq!(
            outcomes[1],
            Err(AcceptorError::rejected("policy violation"))
        );
        assert_eq!(outcomes[2], Ok(()));
    }

    #[tokio::test(start_paused = true)]
    async fn test_silent_identifier_times_out_alone() {
        let acceptor = start(ScriptedDecider::accept_all().with(id(2), Script::Silent));
        let started = Instant::now();

        let calls: Vec<_> = (0..3).map(|tag| call(&acceptor, request(tag))).collect();
        let results: Vec<_> = join_all(calls)
            .await
            .into_iter()
            .map(|joined| joined.unwrap())
            .collect();

        for (outcome, finished) in &results[..2] {
            assert_eq!(*outcome, Ok(()));
            assert!(finished.duration_since(started) < TIMEOUT);
        }

        let (outcome, finished) = &results[2];
        assert_eq!(*outcome, Err(AcceptorError::Timeout { timeout: TIMEOUT }));
        assert!(finished.duration_since(started) >= TIMEOUT);
        assert!(outcome.as_ref().unwrap_err().is_retryable());
    }

    #[tokio::test(start_paused = true)]
    async fn test_late_response_is_harmless() {
        let decider = ScriptedDecider::accept_all()
            .with(id(2), Script::Delayed(TIMEOUT * 2));
        let counters = decider.counters();
        let acceptor = start(decider);

        assert_eq!(
            acceptor.accept(request(2)).await,
            Err(AcceptorError::Timeout { timeout: TIMEOUT })
        );

        // Let the late answer land in the abandoned conduit.
        tokio::time::sleep(TIMEOUT * 2).await;
        assert_eq!(counters.undelivered(), 1);

        // The decision channel is still serving other callers.
        assert_eq!(acceptor.accept(request(3)).await, Ok(()));
        assert_eq!(counters.delivered(), 1);
    }

    #[tokio::test]
    async fn test_mismatch_fails_only_that_call() {
        let decider = ScriptedDecider::accept_all().with(id(1), Script::AnswerAs(id(9)));
        let acceptor = start(decider);

        let calls: Vec<_> = (0..3).map(|tag| call(&acceptor, request(tag))).collect();
        let outcomes: Vec<_> = join_all(calls)
            .await
            .into_iter()
            .map(|joined| joined.unwrap().0)
            .collect();

        assert_eq!(outcomes[0], Ok(()));
        assert_eq!(outcomes[2], Ok(()));
        let err = outcomes[1].clone().unwrap_err();
        assert!(err.is_protocol_violation());
        assert_eq!(
            err,
            AcceptorError::IdentifierMismatch {
                expected: id(1),
                actual: id(9).to_string(),
            }
        );

        let recent = acceptor.stats().recent_mismatches();
        assert_eq!(recent.len(), 1);
        assert_eq!(recent[0].expected, id(1));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_many_concurrent_calls_no_crosstalk() {
        init_test_logging();
        let (acceptor, rx) = RpcAcceptor::with_queue(AcceptorConfig::with_timeout(TIMEOUT))
            .expect("valid config");

        // Reject ids with an odd first byte, naming the id in the reason, so a
        // crossed verdict is visible to the caller that receives it.
        let policy = Arc::new(FnPolicy(|req: &ChannelAcceptRequest| {
            let id = req.pending_channel_id();
            if id.as_bytes()[0] % 2 == 1 {
                Verdict::reject(id.to_string())
            } else {
                Verdict::Accept
            }
        }));
        PolicyResponder::new(policy, rx, acceptor.shutdown_signal().listener()).spawn();

        let ids = random_ids(200);
        let calls: Vec<_> = ids
            .iter()
            .map(|id| {
                let acceptor = acceptor.clone();
                let id = *id;
                tokio::spawn(async move { (id, acceptor.accept(request_with_id(id)).await) })
            })
            .collect();

        for joined in join_all(calls).await {
            let (id, outcome) = joined.unwrap();
            if id.as_bytes()[0] % 2 == 1 {
                assert_eq!(outcome, Err(AcceptorError::rejected(id.to_string())));
            } else {
                assert_eq!(outcome, Ok(()));
            }
        }

        let snap = acceptor.stats().snapshot();
        assert_eq!(snap.requested, 200);
        assert_eq!(snap.accepted + snap.rejected, 200);
        assert_eq!(snap.mismatches, 0);
        assert_eq!(snap.in_flight, 0);
    }

    #[tokio::test]
    async fn test_dropped_request_reported_to_caller() {
        init_test_logging();
        let (acceptor, mut rx) = RpcAcceptor::with_queue(AcceptorConfig::with_timeout(TIMEOUT))
            .expect("valid config");

        let pending = call(&acceptor, request(0));
        drop(rx.recv().await.unwrap());

        let (outcome, _) = pending.await.unwrap();
        assert_eq!(outcome, Err(AcceptorError::ReplyDropped));
        assert!(!outcome.unwrap_err().is_retryable());
    }
}

//! # Shutdown
//!
//! Raising shutdown wakes every blocked caller at once, whatever stage its
//! call is in, and keeps failing calls made afterwards.

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use acceptor_bus::{RequestPublisher, ShutdownSignal};
    use acceptor_telemetry::init_test_logging;
    use acceptor_types::{ChannelAcceptRequest, Verdict};
    use async_trait::async_trait;
    use chan_acceptor::{
        AcceptorConfig, AcceptorError, BridgeExit, ChannelAcceptor, DecisionPolicy,
        PolicyResponder, RpcAcceptor, StreamBridge,
    };
    use futures::future::join_all;
    use tokio::time::timeout;

    use crate::fixtures::{request, ScriptedDecider};

    /// Far beyond anything a test should wait for.
    const LONG_TIMEOUT: Duration = Duration::from_secs(300);

    /// Shutdown must complete within this, independent of `LONG_TIMEOUT`.
    const PROMPT: Duration = Duration::from_secs(1);

    fn silent_acceptor() -> RpcAcceptor {
        init_test_logging();
        let (acceptor, rx) = RpcAcceptor::with_queue(AcceptorConfig::with_timeout(LONG_TIMEOUT))
            .expect("valid config");
        ScriptedDecider::silent().spawn(rx);
        acceptor
    }

    #[tokio::test]
    async fn test_shutdown_wakes_all_pending_calls() {
        let acceptor = silent_acceptor();

        let calls: Vec<_> = (0..100u8)
            .map(|tag| {
                let acceptor = acceptor.clone();
                tokio::spawn(async move { acceptor.accept(request(tag)).await })
            })
            .collect();

        // Let every call reach its wait.
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert_eq!(acceptor.stats().snapshot().in_flight, 100);

        assert!(acceptor.shutdown());
        let outcomes = timeout(PROMPT, join_all(calls))
            .await
            .expect("shutdown is prompt");

        for outcome in outcomes {
            assert_eq!(outcome.unwrap(), Err(AcceptorError::ShuttingDown));
        }
        let snap = acceptor.stats().snapshot();
        assert_eq!(snap.shutdowns, 100);
        assert_eq!(snap.in_flight, 0);
    }

    #[tokio::test]
    async fn test_shutdown_is_idempotent() {
        let acceptor = silent_acceptor();
        let pending = {
            let acceptor = acceptor.clone();
            tokio::spawn(async move { acceptor.accept(request(0)).await })
        };
        tokio::time::sleep(Duration::from_millis(10)).await;

        assert!(acceptor.shutdown());
        assert!(!acceptor.shutdown());
        assert!(!acceptor.clone().shutdown());
        assert!(acceptor.is_shutting_down());

        let outcome = timeout(PROMPT, pending).await.expect("prompt").unwrap();
        assert_eq!(outcome, Err(AcceptorError::ShuttingDown));
        assert_eq!(acceptor.stats().snapshot().shutdowns, 1);
    }

    #[tokio::test]
    async fn test_calls_after_shutdown_never_reach_decision_channel() {
        init_test_logging();
        let (acceptor, rx) = RpcAcceptor::with_queue(AcceptorConfig::with_timeout(LONG_TIMEOUT))
            .expect("valid config");
        let decider = ScriptedDecider::accept_all();
        let counters = decider.counters();
        decider.spawn(rx);

        acceptor.shutdown();
        for tag in 0..10 {
            assert_eq!(
                acceptor.accept(request(tag)).await,
                Err(AcceptorError::ShuttingDown)
            );
        }

        tokio::time::sleep(Duration::from_millis(10)).await;
        assert_eq!(counters.delivered() + counters.undelivered(), 0);
    }

    struct NeverDecides;

    #[async_trait]
    impl DecisionPolicy for NeverDecides {
        async fn decide(&self, _request: &ChannelAcceptRequest) -> Verdict {
            std::future::pending().await
        }
    }

    #[tokio::test]
    async fn test_shared_signal_stops_collaborators() {
        init_test_logging();
        let signal = ShutdownSignal::new();

        let (queue, rx) = acceptor_bus::RequestQueue::new();
        let acceptor = RpcAcceptor::new(
            AcceptorConfig::with_timeout(LONG_TIMEOUT),
            Arc::new(queue),
            signal.clone(),
        )
        .expect("valid config");
        let responder =
            PolicyResponder::new(Arc::new(NeverDecides), rx, signal.listener()).spawn();

        let (queue, rx) = acceptor_bus::RequestQueue::new();
        let bridged = RpcAcceptor::new(
            AcceptorConfig::with_timeout(LONG_TIMEOUT),
            Arc::new(queue.clone()),
            signal.clone(),
        )
        .expect("valid config");
        let (bridge, _remote) = StreamBridge::new(rx, signal.listener(), 4);
        let bridge = bridge.spawn();

        let first = {
            let acceptor = acceptor.clone();
            tokio::spawn(async move { acceptor.accept(request(0)).await })
        };
        let second = {
            let bridged = bridged.clone();
            tokio::spawn(async move { bridged.accept(request(1)).await })
        };
        tokio::time::sleep(Duration::from_millis(20)).await;
        assert_eq!(queue.published(), 1);

        // One trigger, from outside either acceptor.
        assert!(signal.trigger());

        let (first, second) = timeout(PROMPT, async { (first.await, second.await) })
            .await
            .expect("prompt");
        assert_eq!(first.unwrap(), Err(AcceptorError::ShuttingDown));
        assert_eq!(second.unwrap(), Err(AcceptorError::ShuttingDown));

        assert_eq!(timeout(PROMPT, responder).await.expect("prompt").unwrap(), 1);
        assert_eq!(
            timeout(PROMPT, bridge).await.expect("prompt").unwrap(),
            BridgeExit::Shutdown
        );
        assert!(acceptor.is_shutting_down());
        assert!(bridged.is_shutting_down());
    }
}

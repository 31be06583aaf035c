//! # Chained Acceptors
//!
//! Several acceptors, each with its own decision channel, combined so that a
//! channel is accepted only when every one of them agrees.

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use acceptor_telemetry::init_test_logging;
    use acceptor_types::{ChannelAcceptRequest, PendingChannelId, Verdict};
    use chan_acceptor::{
        AcceptorConfig, AcceptorError, ChainedAcceptor, ChannelAcceptor, FnPolicy,
        PolicyResponder, RpcAcceptor,
    };

    use crate::fixtures::{request, Script, ScriptedDecider};

    const TIMEOUT: Duration = Duration::from_secs(5);

    fn min_funding(min_sat: u64) -> RpcAcceptor {
        let (acceptor, rx) = RpcAcceptor::with_queue(AcceptorConfig::with_timeout(TIMEOUT))
            .expect("valid config");
        let policy = Arc::new(FnPolicy(move |req: &ChannelAcceptRequest| {
            if req.open_channel.funding_sat >= min_sat {
                Verdict::Accept
            } else {
                Verdict::reject(format!("funding below {min_sat} sat"))
            }
        }));
        PolicyResponder::new(policy, rx, acceptor.shutdown_signal().listener()).spawn();
        acceptor
    }

    fn scripted(decider: ScriptedDecider) -> RpcAcceptor {
        let (acceptor, rx) = RpcAcceptor::with_queue(AcceptorConfig::with_timeout(TIMEOUT))
            .expect("valid config");
        decider.spawn(rx);
        acceptor
    }

    #[tokio::test]
    async fn test_all_must_accept() {
        init_test_logging();
        let chain = ChainedAcceptor::new();
        chain.add_acceptor(Arc::new(min_funding(50_000)));
        chain.add_acceptor(Arc::new(scripted(
            ScriptedDecider::accept_all()
                .with(PendingChannelId::from_tag(1), Script::Reject("blocked peer".into())),
        )));

        // Fixture requests fund 100k sat.
        assert_eq!(chain.accept(request(0)).await, Ok(()));
        assert_eq!(
            chain.accept(request(1)).await,
            Err(AcceptorError::rejected("blocked peer"))
        );

        let mut small = request(2);
        small.open_channel.funding_sat = 10_000;
        assert_eq!(
            chain.accept(small).await,
            Err(AcceptorError::rejected("funding below 50000 sat"))
        );
    }

    #[tokio::test]
    async fn test_removed_acceptor_no_longer_consulted() {
        init_test_logging();
        let chain = ChainedAcceptor::new();
        let strict = chain.add_acceptor(Arc::new(min_funding(1_000_000)));
        chain.add_acceptor(Arc::new(min_funding(1)));

        assert!(chain.accept(request(0)).await.is_err());

        assert!(chain.remove_acceptor(strict));
        assert_eq!(chain.len(), 1);
        assert_eq!(chain.accept(request(0)).await, Ok(()));
    }

    #[tokio::test]
    async fn test_concurrent_calls_through_chain() {
        init_test_logging();
        let chain = Arc::new(ChainedAcceptor::new());
        chain.add_acceptor(Arc::new(min_funding(1)));
        chain.add_acceptor(Arc::new(scripted(ScriptedDecider::accept_all())));

        let calls: Vec<_> = (0..16u8)
            .map(|tag| {
                let chain = Arc::clone(&chain);
                tokio::spawn(async move { chain.accept(request(tag)).await })
            })
            .collect();

        for call in calls {
            assert_eq!(call.await.unwrap(), Ok(()));
        }
    }
}

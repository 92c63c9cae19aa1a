//! Property tests for the retry schedule and template hydration.

use proptest::prelude::*;
use repolint_github::memory::{MemoryTransport, RecordingSleeper};
use repolint_github::{BackoffPolicy, Client, Method, TransportError, hydrate};
use std::sync::Arc;
use std::time::Duration;

proptest! {
    #[test]
    fn cumulative_wait_never_exceeds_ceiling(initial_ms in 1u64..5_000, ceiling_ms in 0u64..120_000) {
        let transport = Arc::new(MemoryTransport::new());
        transport.fail(
            Method::Get,
            "repos/acme/widgets",
            TransportError::Status { status: 429, message: "slow down".into() },
        );
        let sleeper = Arc::new(RecordingSleeper::default());
        let policy = BackoffPolicy {
            initial: Duration::from_millis(initial_ms),
            ceiling: Duration::from_millis(ceiling_ms),
        };
        let client = Client::new(transport, "acme", "widgets")
            .with_sleeper(sleeper.clone())
            .with_backoff(policy);

        let err = client.get_repository().unwrap_err();

        prop_assert!(err.is_rate_limited());
        prop_assert!(sleeper.total() <= policy.ceiling);
        for pair in sleeper.sleeps().windows(2) {
            prop_assert!(pair[1] <= pair[0] * 2);
        }
    }

    #[test]
    fn hydrate_is_identity_without_placeholders(text in "[^{}]*") {
        let out = hydrate(text.as_bytes(), &[("owner", "acme"), ("repo", "widgets")]);
        prop_assert_eq!(out, text.into_bytes());
    }
}

use std::time::Duration;

use proptest::prelude::*;
use url_token::{FixedClock, MAX_IDENTIFIER, TokenConfig, TokenManager, VerifyOutcome};

const NOW: i64 = 1_700_000_000;
const HOUR: Duration = Duration::from_secs(3600);
const TOKEN_ALPHABET: &str = "ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789-_.";

fn manager() -> TokenManager<FixedClock> {
    TokenManager::with_clock("supersecretkey16", &TokenConfig::default(), FixedClock(NOW)).unwrap()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(256))]

    #[test]
    fn codec_roundtrip(id in 0..=MAX_IDENTIFIER) {
        let manager = manager();
        let encoded = manager.codec().encode(id).unwrap();
        prop_assert_eq!(manager.codec().decode(&encoded), Some(id));
    }

    #[test]
    fn token_roundtrip(id in 0..=MAX_IDENTIFIER, elapsed in 0u64..3600) {
        let manager = manager();
        let token = manager.generate_token(id).unwrap();
        let outcome = manager.verify_token_at(&token, HOUR, NOW + elapsed as i64);
        prop_assert_eq!(outcome, VerifyOutcome::Valid(id));
    }

    #[test]
    fn single_character_change_is_invalid(
        id in 0..=MAX_IDENTIFIER,
        position in any::<prop::sample::Index>(),
        replacement in prop::sample::select(TOKEN_ALPHABET.chars().collect::<Vec<_>>()),
    ) {
        let manager = manager();
        let token = manager.generate_token(id).unwrap();

        let index = position.index(token.len());
        let original = token.as_bytes()[index] as char;
        prop_assume!(original != replacement);

        let mut tampered = token.clone();
        tampered.replace_range(index..index + 1, &replacement.to_string());

        prop_assert_eq!(
            manager.verify_token(&tampered, HOUR).into_parts(),
            (false, false, None)
        );
    }

    #[test]
    fn stale_tokens_expire(id in 0..=MAX_IDENTIFIER, max_age in 0u64..100_000, overshoot in 1u64..1_000) {
        let manager = manager();
        let token = manager.generate_token(id).unwrap();
        let now = NOW + (max_age + overshoot) as i64;
        let outcome = manager.verify_token_at(&token, Duration::from_secs(max_age), now);
        prop_assert_eq!(outcome.into_parts(), (false, true, None));
    }

    #[test]
    fn arbitrary_strings_never_panic(input in ".*") {
        let outcome = manager().verify_token(&input, HOUR);
        prop_assert!(matches!(
            outcome,
            VerifyOutcome::Valid(_) | VerifyOutcome::Expired | VerifyOutcome::Invalid
        ));
    }

    #[test]
    fn token_shaped_strings_are_invalid(
        payload in "[A-Za-z0-9_-]{22}",
        timestamp in "[A-Za-z0-9_-]{0,11}",
        signature in "[A-Za-z0-9_-]{43}",
    ) {
        let token = format!("{payload}.{timestamp}.{signature}");
        prop_assert_eq!(manager().verify_token(&token, HOUR), VerifyOutcome::Invalid);
    }

    #[test]
    fn codec_decode_is_total(input in ".*") {
        let _ = manager().codec().decode(&input);
    }
}

#[test]
fn encryption_is_deterministic() {
    let a = manager();
    let b = manager();
    assert_eq!(a.codec().encode(42).unwrap(), b.codec().encode(42).unwrap());
    assert_eq!(a.generate_token(42).unwrap(), b.generate_token(42).unwrap());
}

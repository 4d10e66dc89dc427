use super::*;

fn ms(n: u64) -> Duration {
    Duration::from_millis(n)
}

// =============================================================
// Countdown lifecycle
// =============================================================

#[test]
fn default_debouncer_is_idle_with_two_second_timeout() {
    let debouncer = TypingDebouncer::default();
    assert_eq!(debouncer.timeout(), ms(2000));
    assert!(!debouncer.is_pending());
    assert_eq!(debouncer.deadline(), None);
}

#[test]
fn restart_sets_deadline_one_timeout_ahead() {
    let start = Instant::now();
    let mut debouncer = TypingDebouncer::new(ms(2000));
    debouncer.restart(start);
    assert_eq!(debouncer.deadline(), Some(start + ms(2000)));
}

#[test]
fn expire_fires_once_at_deadline() {
    let start = Instant::now();
    let mut debouncer = TypingDebouncer::new(ms(2000));
    debouncer.restart(start);

    assert!(!debouncer.expire(start + ms(1999)));
    assert!(debouncer.expire(start + ms(2000)));
    assert!(!debouncer.expire(start + ms(5000)));
    assert!(!debouncer.is_pending());
}

#[test]
fn rapid_restarts_only_honor_the_last_keystroke() {
    let start = Instant::now();
    let mut debouncer = TypingDebouncer::new(ms(2000));
    debouncer.restart(start);
    debouncer.restart(start + ms(500));
    debouncer.restart(start + ms(1000));

    // The first countdown would have expired here; it was superseded.
    assert!(!debouncer.expire(start + ms(2500)));
    assert!(debouncer.expire(start + ms(3000)));
}

#[test]
fn cancel_prevents_expiry() {
    let start = Instant::now();
    let mut debouncer = TypingDebouncer::new(ms(2000));
    debouncer.restart(start);

    assert!(debouncer.cancel());
    assert!(!debouncer.cancel());
    assert!(!debouncer.expire(start + ms(10_000)));
}

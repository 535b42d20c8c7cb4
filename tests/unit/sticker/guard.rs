use super::*;

fn ms(v: u64) -> Duration {
    Duration::from_millis(v)
}

#[test]
fn repeat_within_interval_is_rejected() {
    let mut g = ReentrancyGuard::new().with_interval(GuardedOp::SyncStickers, ms(100));
    assert!(g.try_enter(GuardedOp::SyncStickers, ms(0)));
    assert!(!g.try_enter(GuardedOp::SyncStickers, ms(40)));
    assert!(!g.try_enter(GuardedOp::SyncStickers, ms(99)));
    assert!(g.try_enter(GuardedOp::SyncStickers, ms(100)));
}

#[test]
fn operations_are_tracked_independently() {
    let mut g = ReentrancyGuard::new()
        .with_interval(GuardedOp::SyncStickers, ms(100))
        .with_interval(GuardedOp::UpdateSticker, ms(50));
    assert!(g.try_enter(GuardedOp::SyncStickers, ms(0)));
    assert!(g.try_enter(GuardedOp::UpdateSticker, ms(10)));
    assert!(!g.try_enter(GuardedOp::UpdateSticker, ms(30)));
    assert!(g.try_enter(GuardedOp::UpdateSticker, ms(60)));
}

#[test]
fn reset_forgets_entries() {
    let mut g = ReentrancyGuard::new().with_interval(GuardedOp::SyncStickers, ms(100));
    g.try_enter(GuardedOp::SyncStickers, ms(0));
    g.reset();
    assert!(g.try_enter(GuardedOp::SyncStickers, ms(1)));
}

#[test]
fn manual_clock_clones_share_time() {
    let clock = ManualClock::new();
    let view = clock.clone();
    clock.advance(ms(75));
    assert_eq!(view.now(), ms(75));
}

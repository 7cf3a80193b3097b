//! Integration tests for the periodic tick scheduler.
//!
//! Uses `tokio::time::pause()` (via `start_paused`) to control time
//! deterministically: sleeps resolve instantly as the clock auto-advances.

use std::time::Duration;

use mindlink_tick::{TickConfig, TickScheduler};

// =========================================================================
// TickConfig
// =========================================================================

#[test]
fn test_default_config_is_fifteen_minutes() {
    let cfg = TickConfig::default();
    assert_eq!(cfg.period, Some(Duration::from_secs(900)));
}

#[test]
fn test_disabled_config_has_no_period() {
    assert_eq!(TickConfig::disabled().period, None);
}

#[test]
fn test_validated_clamps_tiny_period() {
    let cfg = TickConfig::every(Duration::from_millis(1)).validated();
    assert_eq!(cfg.period, Some(TickConfig::MIN_PERIOD));
}

// =========================================================================
// Scheduler creation and accessors
// =========================================================================

#[test]
fn test_scheduler_initial_state() {
    let s = TickScheduler::every(Duration::from_secs(60));
    assert_eq!(s.tick_count(), 0);
    assert_eq!(s.total_skipped(), 0);
    assert!(!s.is_disabled());
    assert!(!s.is_paused());
    assert_eq!(s.period(), Some(Duration::from_secs(60)));
}

#[test]
fn test_scheduler_disabled() {
    let s = TickScheduler::new(TickConfig::disabled());
    assert!(s.is_disabled());
    assert_eq!(s.period(), None);
}

// =========================================================================
// Tick firing
// =========================================================================

#[tokio::test(start_paused = true)]
async fn test_wait_for_tick_fires_after_one_period() {
    let mut s = TickScheduler::every(Duration::from_secs(60));
    let start = tokio::time::Instant::now();

    let info = s.wait_for_tick().await;

    assert_eq!(info.tick, 1);
    assert_eq!(info.ticks_skipped, 0);
    assert!(start.elapsed() >= Duration::from_secs(60));
}

#[tokio::test(start_paused = true)]
async fn test_ticks_increment_monotonically() {
    let mut s = TickScheduler::every(Duration::from_secs(1));

    for expected in 1..=5 {
        let info = s.wait_for_tick().await;
        assert_eq!(info.tick, expected);
    }
    assert_eq!(s.tick_count(), 5);
}

#[tokio::test(start_paused = true)]
async fn test_jitter_delays_first_tick_within_bound() {
    let mut s = TickScheduler::new(TickConfig {
        period: Some(Duration::from_secs(10)),
        initial_jitter: Duration::from_secs(5),
    });
    let start = tokio::time::Instant::now();

    s.wait_for_tick().await;

    let elapsed = start.elapsed();
    assert!(elapsed >= Duration::from_secs(10));
    assert!(elapsed < Duration::from_secs(15));
}

#[tokio::test(start_paused = true)]
async fn test_late_tick_reports_skipped_periods() {
    let mut s = TickScheduler::every(Duration::from_secs(10));

    // Simulate the host being suspended well past several deadlines.
    tokio::time::advance(Duration::from_secs(45)).await;
    let info = s.wait_for_tick().await;

    assert_eq!(info.tick, 1);
    assert_eq!(info.ticks_skipped, 3);
    assert_eq!(s.total_skipped(), 3);
}

// =========================================================================
// Disabled mode pends forever
// =========================================================================

#[tokio::test(start_paused = true)]
async fn test_disabled_never_fires() {
    let mut s = TickScheduler::new(TickConfig::disabled());

    let result =
        tokio::time::timeout(Duration::from_secs(3600), s.wait_for_tick()).await;
    assert!(result.is_err(), "disabled scheduler should pend forever");
}

// =========================================================================
// Pause / Resume
// =========================================================================

#[tokio::test(start_paused = true)]
async fn test_pause_prevents_ticks() {
    let mut s = TickScheduler::every(Duration::from_secs(1));
    s.wait_for_tick().await;

    s.pause();
    assert!(s.is_paused());

    let result =
        tokio::time::timeout(Duration::from_secs(10), s.wait_for_tick()).await;
    assert!(result.is_err(), "paused scheduler should pend");
}

#[tokio::test(start_paused = true)]
async fn test_resume_waits_a_full_period() {
    let mut s = TickScheduler::every(Duration::from_secs(10));
    s.pause();
    tokio::time::advance(Duration::from_secs(100)).await;
    s.resume();
    let resumed_at = tokio::time::Instant::now();

    let info = s.wait_for_tick().await;

    assert_eq!(info.tick, 1);
    assert_eq!(info.ticks_skipped, 0);
    assert!(resumed_at.elapsed() >= Duration::from_secs(10));
}

#[test]
fn test_pause_resume_idempotent() {
    let mut s = TickScheduler::every(Duration::from_secs(1));

    s.pause();
    s.pause();
    assert!(s.is_paused());

    s.resume();
    s.resume();
    assert!(!s.is_paused());
}

// =========================================================================
// select! loop pattern (mirrors the session keep-alive)
// =========================================================================

#[tokio::test(start_paused = true)]
async fn test_select_loop_pattern() {
    let mut s = TickScheduler::every(Duration::from_secs(60));
    let (tx, mut rx) = tokio::sync::mpsc::channel::<&str>(1);

    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_secs(190)).await;
        tx.send("stop").await.ok();
    });

    let mut ticks_fired = 0u64;
    loop {
        tokio::select! {
            Some(cmd) = rx.recv() => {
                assert_eq!(cmd, "stop");
                break;
            }
            info = s.wait_for_tick() => {
                ticks_fired += 1;
                assert_eq!(info.tick, ticks_fired);
            }
        }
    }

    assert_eq!(ticks_fired, 3);
}

//! # Printer Pacing Tests
//!
//! Drive a [`Printer`] through [`MockTransport`] on a paused tokio clock, so
//! most durations below are virtual and exact up to timer resolution. Tests
//! that block inside the transport or need several worker threads run on the
//! real clock.

use std::io;
use std::sync::Arc;
use std::time::Duration;

use pretty_assertions::assert_eq;
use tokio::time::{self, Instant};

use thermoprint::{
    Printer, PrinterConfig, ThermoprintError, encoding::AsciiEncoder, transport::MockTransport,
};

/// Timer resolution allowance for "no wait" assertions.
const SLACK: Duration = Duration::from_millis(2);

fn config(per_byte_wait: Duration) -> PrinterConfig {
    PrinterConfig::DEFAULT
        .with_per_byte_wait(per_byte_wait)
        .with_max_column(10)
}

fn printer(mock: &MockTransport, per_byte_wait: Duration) -> Printer<MockTransport> {
    Printer::new(mock.clone(), config(per_byte_wait))
}

// ============================================================================
// PACING
// ============================================================================

#[tokio::test(start_paused = true)]
async fn test_first_write_is_free() {
    let mock = MockTransport::new();
    let printer = printer(&mock, Duration::from_secs(1));

    let start = Instant::now();
    printer.write_raw(b"hello").await.unwrap();
    assert!(start.elapsed() < SLACK, "first write waited {:?}", start.elapsed());
}

#[tokio::test(start_paused = true)]
async fn test_next_write_waits_for_previous_bytes() {
    let mock = MockTransport::new();
    let printer = printer(&mock, Duration::from_millis(10));

    printer.write_raw(b"abcd").await.unwrap();
    let start = Instant::now();
    printer.write_raw(b"e").await.unwrap();

    assert!(
        start.elapsed() >= Duration::from_millis(40),
        "elapsed {:?} < 40ms",
        start.elapsed()
    );
}

#[tokio::test(start_paused = true)]
async fn test_sequential_writes_are_serialized() {
    let mock = MockTransport::new();
    let printer = printer(&mock, Duration::from_millis(5));

    let start = Instant::now();
    let mut finished = Vec::new();
    for payload in [&b"aa"[..], b"bb", b"cc"] {
        printer.write_raw(payload).await.unwrap();
        finished.push(start.elapsed());
    }

    // Each write is held off by the 2 × 5ms of the one before it.
    assert!(finished[0] < SLACK);
    assert!(finished[1] >= Duration::from_millis(10));
    assert!(finished[2] >= Duration::from_millis(20));
    assert_eq!(
        mock.writes(),
        vec![b"aa".to_vec(), b"bb".to_vec(), b"cc".to_vec()]
    );
}

#[tokio::test(start_paused = true)]
async fn test_failed_write_reopens_immediately() {
    let mock = MockTransport::new().fail_on(2);
    let printer = printer(&mock, Duration::from_millis(10));

    printer.write_raw(b"x").await.unwrap();
    assert!(printer.write_raw(b"y").await.is_err());

    let start = Instant::now();
    printer.write_raw(b"z").await.unwrap();
    assert!(start.elapsed() < SLACK, "retry waited {:?}", start.elapsed());
}

#[tokio::test(start_paused = true)]
async fn test_short_write_paces_on_actual_bytes() {
    let mock = MockTransport::new().short_write_on(1, 1);
    let printer = printer(&mock, Duration::from_millis(10));

    assert_eq!(printer.write_raw(b"0123456789").await.unwrap(), 1);

    let start = Instant::now();
    printer.write_raw(b"x").await.unwrap();
    let elapsed = start.elapsed();
    assert!(elapsed >= Duration::from_millis(10), "elapsed {:?}", elapsed);
    assert!(elapsed < Duration::from_millis(100), "elapsed {:?}", elapsed);
}

#[tokio::test(start_paused = true)]
async fn test_zero_wait_never_delays() {
    let mock = MockTransport::new();
    let printer = printer(&mock, Duration::ZERO);

    let start = Instant::now();
    printer.write("a long line of text").await.unwrap();
    assert!(start.elapsed() < SLACK);
}

// ============================================================================
// CONCURRENCY
// ============================================================================

#[tokio::test(start_paused = true)]
async fn test_concurrent_writers_all_complete_paced() {
    let mock = MockTransport::new();
    let printer = Arc::new(printer(&mock, Duration::from_millis(3)));

    let start = Instant::now();
    let mut tasks = Vec::new();
    for id in 0..4u8 {
        let printer = Arc::clone(&printer);
        tasks.push(tokio::spawn(async move {
            for _ in 0..3 {
                printer.write_raw(&[id]).await.unwrap();
            }
        }));
    }
    for task in tasks {
        task.await.unwrap();
    }

    assert_eq!(mock.writes().len(), 12);
    // Twelve one-byte writes, the first one free.
    assert!(start.elapsed() >= Duration::from_millis(33));
}

#[tokio::test(start_paused = true)]
async fn test_cancelled_wait_does_not_block_later_writes() {
    let mock = MockTransport::new();
    let printer = printer(&mock, Duration::from_millis(10));

    printer.write_raw(b"abc").await.unwrap();

    // Gate is closed for 30ms; give up after 5.
    let abandoned = time::timeout(Duration::from_millis(5), printer.write_raw(b"x")).await;
    assert!(abandoned.is_err());

    printer.write_raw(b"y").await.unwrap();
    assert_eq!(mock.bytes(), b"abcy".to_vec());
    assert_eq!(mock.attempts(), 2);
}

#[tokio::test]
async fn test_abandoned_write_still_paces_next_write() {
    let per_byte_wait = Duration::from_millis(20);
    let mock = MockTransport::new().delay_on(1, Duration::from_millis(100));
    let printer = printer(&mock, per_byte_wait);

    // Given up on while the transport is still blocked inside the write.
    let abandoned = time::timeout(Duration::from_millis(20), printer.write_raw(b"01234")).await;
    assert!(abandoned.is_err());

    printer.write_raw(b"x").await.unwrap();

    assert_eq!(mock.writes(), vec![b"01234".to_vec(), b"x".to_vec()]);
    let calls = mock.call_times();
    let (_, first_finished) = calls[0];
    let (second_started, _) = calls[1];
    let gap = second_started.duration_since(first_finished);
    assert!(
        gap >= per_byte_wait * 5,
        "next write started {:?} after the abandoned one finished",
        gap
    );
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_column_counts_every_character_across_threads() {
    let mock = MockTransport::new();
    let config = PrinterConfig::DEFAULT
        .with_per_byte_wait(Duration::ZERO)
        .with_max_column(10_000);
    let printer = Arc::new(Printer::new(mock.clone(), config));

    let mut tasks = Vec::new();
    for _ in 0..8 {
        let printer = Arc::clone(&printer);
        tasks.push(tokio::spawn(async move {
            for _ in 0..10 {
                printer.write("abcdefghij").await.unwrap();
            }
        }));
    }
    for task in tasks {
        task.await.unwrap();
    }

    assert_eq!(mock.writes().len(), 800);
    assert_eq!(printer.column(), 800);
}

// ============================================================================
// TEXT AND COMMANDS
// ============================================================================

#[tokio::test(start_paused = true)]
async fn test_column_tracking_resets_on_newline() {
    let mock = MockTransport::new();
    let printer = printer(&mock, Duration::from_millis(1));

    let mut columns = vec![printer.column()];
    for ch in "ab\ncd".chars() {
        printer.write(&ch.to_string()).await.unwrap();
        columns.push(printer.column());
    }

    assert_eq!(columns, vec![0, 1, 2, 0, 1, 2]);
}

#[tokio::test(start_paused = true)]
async fn test_text_write_is_one_write_per_character() {
    let mock = MockTransport::new();
    let printer = printer(&mock, Duration::from_millis(1));

    printer.write("ab\ncd").await.unwrap();

    assert_eq!(printer.column(), 2);
    assert_eq!(
        mock.writes(),
        vec![
            b"a".to_vec(),
            b"b".to_vec(),
            b"\n".to_vec(),
            b"c".to_vec(),
            b"d".to_vec()
        ]
    );
}

#[tokio::test(start_paused = true)]
async fn test_multibyte_character_is_a_single_write() {
    let mock = MockTransport::new();
    let printer = printer(&mock, Duration::from_millis(1));

    printer.write("é").await.unwrap();

    assert_eq!(mock.writes(), vec![vec![0xC3, 0xA9]]);
    assert_eq!(printer.column(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_custom_encoder() {
    let mock = MockTransport::new();
    let printer = Printer::with_encoder(mock.clone(), AsciiEncoder, config(Duration::ZERO));

    printer.write("né").await.unwrap();
    assert_eq!(mock.bytes(), b"n?".to_vec());
}

#[tokio::test(start_paused = true)]
async fn test_feed_sends_exact_command() {
    let mock = MockTransport::new();
    let printer = printer(&mock, Duration::from_millis(1));

    printer.feed(5).await.unwrap();
    assert_eq!(mock.writes(), vec![vec![0x1B, 0x64, 0x05]]);
}

#[tokio::test(start_paused = true)]
async fn test_feed_error_is_unchanged() {
    let mock = MockTransport::new().fail_on(1);
    let printer = printer(&mock, Duration::from_millis(1));

    match printer.feed(2).await {
        Err(ThermoprintError::Io(e)) => assert_eq!(e.kind(), io::ErrorKind::BrokenPipe),
        other => panic!("expected I/O error, got {:?}", other),
    }
}

// ============================================================================
// ERRORS
// ============================================================================

#[tokio::test(start_paused = true)]
async fn test_text_write_aborts_on_first_error() {
    let mock = MockTransport::new().fail_on(2);
    let printer = printer(&mock, Duration::from_millis(1));

    let result = printer.write("hello").await;

    match result {
        Err(ThermoprintError::Io(e)) => assert_eq!(e.kind(), io::ErrorKind::BrokenPipe),
        other => panic!("expected I/O error, got {:?}", other),
    }
    // 'l', 'l', 'o' never attempted; 'h' stays printed.
    assert_eq!(mock.attempts(), 2);
    assert_eq!(mock.bytes(), b"h".to_vec());
    assert_eq!(printer.column(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_transport_panic_is_contained() {
    let mock = MockTransport::new().panic_on(1);
    let printer = printer(&mock, Duration::from_millis(10));

    match printer.write_raw(b"boom").await {
        Err(ThermoprintError::TransportPanic(msg)) => assert!(msg.contains("panicked")),
        other => panic!("expected contained panic, got {:?}", other),
    }

    // The throttle survives and the failed write costs no wait.
    let start = Instant::now();
    assert_eq!(printer.write_raw(b"ok").await.unwrap(), 2);
    assert!(start.elapsed() < SLACK);
    assert_eq!(mock.bytes(), b"ok".to_vec());
}

#[tokio::test(start_paused = true)]
async fn test_close_releases_transport() {
    let mock = MockTransport::new();
    let printer = printer(&mock, Duration::from_millis(1));

    printer.write_line("bye").await.unwrap();
    printer.close().await.unwrap();

    assert_eq!(mock.flushes(), 1);
    assert_eq!(mock.bytes(), b"bye\n".to_vec());
}

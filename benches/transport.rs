//! Transport benchmark suite.
//!
//! Benchmarks the monitor wire path at different scales:
//! - Frame decoding: whole-buffer vs chunked feeds (16, 256, 4096 byte reads)
//! - Command round-trips over a Unix socket: 64, 256 commands
//!
//! Run with: cargo bench --bench transport
//! Results saved to: target/criterion/

use std::hint::black_box;
use std::path::Path;
use std::time::Duration;

use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::UnixListener;
use tokio::runtime::Runtime;
use tokio::task::JoinHandle;

use qemu_autopilot::Driver;
use qemu_autopilot::transport::FrameDecoder;

// ============================================================================
// Benchmark Parameters
// ============================================================================

const FRAME_COUNTS: &[usize] = &[100, 1_000];
const CHUNK_SIZES: &[usize] = &[16, 256, 4096];
const COMMAND_COUNTS: &[usize] = &[64, 256];

// ============================================================================
// Benchmark: Frame Decoding
// ============================================================================

fn bench_frame_decode(c: &mut Criterion) {
    let mut group = c.benchmark_group("frame_decode");

    for &count in FRAME_COUNTS {
        let payload = build_payload(count);
        group.throughput(Throughput::Bytes(payload.len() as u64));

        group.bench_with_input(BenchmarkId::new("whole", count), &payload, |b, payload| {
            b.iter(|| {
                let mut decoder = FrameDecoder::new();
                let frames = decoder.feed(black_box(payload)).expect("decode failed");
                black_box(frames.len())
            });
        });

        for &chunk_size in CHUNK_SIZES {
            let id = format!("{count}f_{chunk_size}b");
            group.bench_with_input(BenchmarkId::new("chunked", &id), &payload, |b, payload| {
                b.iter(|| {
                    let mut decoder = FrameDecoder::new();
                    let mut decoded = 0usize;
                    for chunk in payload.chunks(chunk_size) {
                        decoded += decoder.feed(black_box(chunk)).expect("decode failed").len();
                    }
                    black_box(decoded)
                });
            });
        }
    }

    group.finish();
}

// ============================================================================
// Benchmark: Command Round-Trips
// ============================================================================

fn bench_command_roundtrip(c: &mut Criterion) {
    let rt = Runtime::new().expect("tokio runtime");

    let mut group = c.benchmark_group("command_roundtrip");
    group.sample_size(10); // Each sample drives hundreds of socket round-trips
    group.measurement_time(Duration::from_secs(10));

    for &count in COMMAND_COUNTS {
        group.throughput(Throughput::Elements(count as u64));

        group.bench_with_input(BenchmarkId::new("sequential", count), &count, |b, &count| {
            b.to_async(&rt).iter(|| run_sequential(count));
        });

        group.bench_with_input(BenchmarkId::new("pipelined", count), &count, |b, &count| {
            b.to_async(&rt).iter(|| run_pipelined(count));
        });
    }

    group.finish();
}

// ============================================================================
// Helper Functions
// ============================================================================

/// Builds a buffer of newline-framed monitor traffic: a greeting, then
/// an even mix of replies and events.
fn build_payload(frame_count: usize) -> Vec<u8> {
    const EVENTS: &[&str] = &["VNC_CONNECTED", "RTC_CHANGE", "NIC_RX_FILTER_CHANGED", "SHUTDOWN"];

    let mut buf = Vec::new();
    buf.extend_from_slice(
        br#"{"QMP": {"version": {"qemu": {"micro": 0, "minor": 2, "major": 9}}, "capabilities": ["oob"]}}"#,
    );
    buf.push(b'\n');

    for i in 0..frame_count {
        if i % 2 == 0 {
            buf.extend_from_slice(br#"{"return": {}}"#);
        } else {
            let line = format!(
                r#"{{"timestamp": {{"seconds": {}, "microseconds": {}}}, "event": "{}"}}"#,
                1_700_000_000 + i,
                i * 137 % 1_000_000,
                EVENTS[i % EVENTS.len()],
            );
            buf.extend_from_slice(line.as_bytes());
        }
        buf.push(b'\n');
    }

    buf
}

/// Binds a listener that greets the first connection and acks every
/// received line with an empty reply.
fn spawn_ack_peer(socket: &Path) -> JoinHandle<()> {
    let listener = UnixListener::bind(socket).expect("bind benchmark socket");
    tokio::spawn(async move {
        let Ok((stream, _)) = listener.accept().await else {
            return;
        };
        let (read_half, mut write_half) = stream.into_split();
        let mut lines = BufReader::new(read_half).lines();

        let greeting = b"{\"QMP\": {\"version\": {}, \"capabilities\": []}}\n";
        if write_half.write_all(greeting).await.is_err() {
            return;
        }
        while let Ok(Some(_)) = lines.next_line().await {
            if write_half.write_all(b"{\"return\": {}}\n").await.is_err() {
                break;
            }
        }
    })
}

async fn connect_to_peer(socket: &Path) -> qemu_autopilot::Monitor {
    let driver = Driver::builder()
        .socket(socket)
        .build()
        .expect("driver build failed");
    let monitor = driver.connect().await.expect("connect failed");
    monitor
        .negotiate_capabilities()
        .await
        .expect("negotiation failed");
    monitor
}

async fn run_sequential(count: usize) {
    let dir = tempfile::tempdir().expect("create socket dir");
    let socket = dir.path().join("qmp.sock");
    let peer = spawn_ack_peer(&socket);
    let monitor = connect_to_peer(&socket).await;

    for _ in 0..count {
        monitor
            .execute("query-status", None)
            .await
            .expect("command failed");
    }

    monitor.close();
    peer.abort();
}

async fn run_pipelined(count: usize) {
    let dir = tempfile::tempdir().expect("create socket dir");
    let socket = dir.path().join("qmp.sock");
    let peer = spawn_ack_peer(&socket);
    let monitor = connect_to_peer(&socket).await;

    let tasks: Vec<_> = (0..count)
        .map(|_| {
            let monitor = monitor.clone();
            tokio::spawn(async move { monitor.execute("query-status", None).await })
        })
        .collect();
    for task in tasks {
        task.await.expect("task panicked").expect("command failed");
    }

    monitor.close();
    peer.abort();
}

// ============================================================================
// Criterion Setup
// ============================================================================

criterion_group!(benches, bench_frame_decode, bench_command_roundtrip);
criterion_main!(benches);

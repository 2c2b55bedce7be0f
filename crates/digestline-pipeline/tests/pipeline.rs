use std::cell::Cell;
use std::collections::HashMap;
use std::fmt;
use std::io::{self, Cursor};
use std::num::NonZeroUsize;
use std::pin::Pin;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::task::{Context, Poll};
use std::time::Duration;

use digestline_pipeline::{Pipeline, PipelineError, PipelineOptions, Processor, Progress, from_fn};
use tempfile::tempdir;
use tokio::io::AsyncWrite;

fn workers(n: usize) -> PipelineOptions { PipelineOptions::default().num_workers(NonZeroUsize::new(n).unwrap()) }

fn numbered_input(n: usize) -> Cursor<Vec<u8>> {
    let text: String = (0..n).map(|i| format!("item-{i}\n")).collect();
    Cursor::new(text.into_bytes())
}

fn parse_index(line: &str) -> usize { line.trim_start_matches("item-").parse().unwrap() }

async fn run_to_lines<P>(options: PipelineOptions, input: Cursor<Vec<u8>>, processor: P) -> Vec<String>
where
    P: Processor<String>,
    P::Output: std::fmt::Display + std::fmt::Debug,
{
    let (summary, out) = Pipeline::new(options).run(input, Vec::new(), processor).await.unwrap();
    let text = String::from_utf8(out).unwrap();
    let lines: Vec<String> = text.lines().map(str::to_string).collect();
    assert_eq!(summary.written as usize, lines.len());
    lines
}

/// Later lines finish first; every call is counted per index.
struct SkewedProcessor {
    total: usize,
    calls: Arc<Vec<AtomicUsize>>,
    fail: Vec<usize>,
}

impl SkewedProcessor {
    fn new(total: usize) -> Self {
        Self {
            total,
            calls: Arc::new((0..total).map(|_| AtomicUsize::new(0)).collect()),
            fail: Vec::new(),
        }
    }

    fn failing(mut self, indexes: &[usize]) -> Self {
        self.fail = indexes.to_vec();
        self
    }
}

impl Processor<String> for SkewedProcessor {
    type Output = String;
    type Error = io::Error;

    async fn process(&self, payload: String) -> Result<String, io::Error> {
        let index = parse_index(&payload);
        self.calls[index].fetch_add(1, Ordering::SeqCst);

        let spins = (self.total - index) % 17;
        for _ in 0..spins {
            tokio::task::yield_now().await;
        }

        if self.fail.contains(&index) {
            return Err(io::Error::other(format!("fetch failed for {payload}")));
        }
        Ok(format!("digest-{index}"))
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_reversed_latency_keeps_input_order() {
    let total = 40;
    let reversed = from_fn(move |line: String| async move {
        let index = parse_index(&line);
        tokio::time::sleep(Duration::from_millis((total - index) as u64 * 2)).await;
        Ok::<_, io::Error>(line.to_uppercase())
    });

    let lines = run_to_lines(workers(8), numbered_input(total), reversed).await;
    let expected: Vec<String> = (0..total).map(|i| format!("ITEM-{i}")).collect();
    assert_eq!(lines, expected);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_every_index_written_exactly_once() {
    let total = 1000;
    let processor = SkewedProcessor::new(total);
    let calls = Arc::clone(&processor.calls);

    let lines = run_to_lines(workers(8), numbered_input(total), processor).await;

    assert_eq!(lines.len(), total);
    for (i, line) in lines.iter().enumerate() {
        assert_eq!(line, &format!("digest-{i}"));
    }
    for (i, count) in calls.iter().enumerate() {
        assert_eq!(count.load(Ordering::SeqCst), 1, "index {i} processed more than once");
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_failed_items_leave_empty_lines() {
    let processor = SkewedProcessor::new(10).failing(&[3, 7]);
    let lines = run_to_lines(workers(4), numbered_input(10), processor).await;

    assert_eq!(lines.len(), 10);
    for (i, line) in lines.iter().enumerate() {
        if i == 3 || i == 7 {
            assert_eq!(line, "");
        } else {
            assert_eq!(line, &format!("digest-{i}"));
        }
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_failures_counted_in_summary() {
    let processor = SkewedProcessor::new(10).failing(&[0, 9]);
    let (summary, _) = Pipeline::new(workers(3))
        .run(numbered_input(10), Vec::new(), processor)
        .await
        .unwrap();

    assert_eq!(summary.produced, 10);
    assert_eq!(summary.written, 10);
    assert_eq!(summary.failed, 2);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_output_independent_of_worker_count() {
    let total = 300;
    let mut outputs = Vec::new();
    for n in [1, 2, 8, 64] {
        let lines = run_to_lines(workers(n), numbered_input(total), SkewedProcessor::new(total)).await;
        outputs.push(lines);
    }
    assert!(outputs.windows(2).all(|w| w[0] == w[1]));
    assert_eq!(outputs[0].len(), total);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_slowest_first_line_still_written_first() {
    let table: Arc<HashMap<&str, (&str, u64)>> =
        Arc::new(HashMap::from([("a", ("d1", 90)), ("b", ("d2", 45)), ("c", ("d3", 0))]));
    let lookup = from_fn(move |line: String| {
        let table = Arc::clone(&table);
        async move {
            let (digest, delay) = table[line.as_str()];
            tokio::time::sleep(Duration::from_millis(delay)).await;
            Ok::<_, io::Error>(digest)
        }
    });

    let input = Cursor::new(b"a\nb\nc\n".to_vec());
    let lines = run_to_lines(workers(3), input, lookup).await;
    assert_eq!(lines, vec!["d1", "d2", "d3"]);
}

/// A digest that may move between threads but not be shared by reference.
#[derive(Debug)]
struct Unshared(Cell<u64>);

impl fmt::Display for Unshared {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { write!(f, "{:016x}", self.0.get()) }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_output_need_not_be_sync() {
    let checksum = from_fn(|line: String| async move {
        let sum = line.bytes().map(u64::from).sum();
        Ok::<_, io::Error>(Unshared(Cell::new(sum)))
    });

    let lines = run_to_lines(workers(4), Cursor::new(b"a\nab\n".to_vec()), checksum).await;
    assert_eq!(lines, vec!["0000000000000061", "00000000000000c3"]);
}

#[tokio::test]
async fn test_single_worker_never_buffers() {
    let (summary, _) = Pipeline::new(workers(1))
        .run(numbered_input(50), Vec::new(), SkewedProcessor::new(50))
        .await
        .unwrap();
    assert_eq!(summary.reorder_high_water, 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_reorder_buffer_bounded_by_stalled_item() {
    let total = 200;
    let stall_first = from_fn(|line: String| async move {
        if parse_index(&line) == 0 {
            tokio::time::sleep(Duration::from_millis(100)).await;
        }
        Ok::<_, io::Error>(line)
    });

    let options = workers(4).reorder_warn_threshold(Some(16));
    let (summary, _) = Pipeline::new(options)
        .run(numbered_input(total), Vec::new(), stall_first)
        .await
        .unwrap();

    assert_eq!(summary.written, total as u64);
    // Everything behind the stalled item piles up, but never more than the input.
    assert!(summary.reorder_high_water > 16);
    assert!(summary.reorder_high_water <= total);
}

#[tokio::test]
async fn test_empty_input_writes_nothing() {
    let identity = from_fn(|line: String| async move { Ok::<_, io::Error>(line) });
    let (summary, out) = Pipeline::default()
        .run(Cursor::new(Vec::new()), Vec::new(), identity)
        .await
        .unwrap();

    assert_eq!(summary.produced, 0);
    assert!(out.is_empty());
}

#[tokio::test]
async fn test_progress_callback_sees_every_record() {
    let calls = Arc::new(AtomicU64::new(0));
    let last = Arc::new(AtomicU64::new(0));
    let (c, l) = (Arc::clone(&calls), Arc::clone(&last));
    let options = workers(2).on_progress(Arc::new(move |p: &Progress| {
        c.fetch_add(1, Ordering::SeqCst);
        l.store(p.written, Ordering::SeqCst);
    }));

    Pipeline::new(options)
        .run(numbered_input(25), Vec::new(), SkewedProcessor::new(25))
        .await
        .unwrap();

    assert_eq!(calls.load(Ordering::SeqCst), 25);
    assert_eq!(last.load(Ordering::SeqCst), 25);
}

#[tokio::test]
async fn test_missing_input_creates_no_output() {
    let dir = tempdir().unwrap();
    let input = dir.path().join("missing.txt");
    let output = dir.path().join("out.txt");
    let identity = from_fn(|line: String| async move { Ok::<_, io::Error>(line) });

    let err = Pipeline::default().run_files(&input, &output, identity).await.unwrap_err();

    assert!(matches!(err, PipelineError::InputOpen { .. }));
    assert!(!output.exists());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_read_failure_removes_partial_output() {
    let dir = tempdir().unwrap();
    let input = dir.path().join("urls.txt");
    let output = dir.path().join("out.txt");
    let mut bytes: Vec<u8> = (0..5000).flat_map(|i| format!("item-{i}\n").into_bytes()).collect();
    bytes.extend_from_slice(b"\xff\xfe\n");
    std::fs::write(&input, bytes).unwrap();
    let identity = from_fn(|line: String| async move { Ok::<_, io::Error>(line) });

    let err = Pipeline::new(workers(4)).run_files(&input, &output, identity).await.unwrap_err();

    assert!(matches!(err, PipelineError::InputRead { line: 5000, .. }), "unexpected error: {err}");
    assert!(!output.exists());
}

#[tokio::test]
async fn test_uncreatable_output_is_fatal() {
    let dir = tempdir().unwrap();
    let input = dir.path().join("urls.txt");
    std::fs::write(&input, "a\nb\n").unwrap();
    let output = dir.path().join("no-such-dir").join("out.txt");
    let identity = from_fn(|line: String| async move { Ok::<_, io::Error>(line) });

    let err = Pipeline::default().run_files(&input, &output, identity).await.unwrap_err();
    assert!(matches!(err, PipelineError::OutputCreate { .. }));
}

#[tokio::test]
async fn test_run_files_truncates_existing_output() {
    let dir = tempdir().unwrap();
    let input = dir.path().join("urls.txt");
    let output = dir.path().join("out.txt");
    std::fs::write(&input, "x\ny\n").unwrap();
    std::fs::write(&output, "stale\nstale\nstale\nstale\n").unwrap();
    let upper = from_fn(|line: String| async move { Ok::<_, io::Error>(line.to_uppercase()) });

    let summary = Pipeline::default().run_files(&input, &output, upper).await.unwrap();

    assert_eq!(summary.written, 2);
    assert_eq!(std::fs::read_to_string(&output).unwrap(), "X\nY\n");
}

#[derive(Debug)]
struct FailAfter {
    remaining: usize,
}

impl AsyncWrite for FailAfter {
    fn poll_write(mut self: Pin<&mut Self>, _: &mut Context<'_>, buf: &[u8]) -> Poll<io::Result<usize>> {
        if self.remaining == 0 {
            return Poll::Ready(Err(io::Error::new(io::ErrorKind::StorageFull, "disk full")));
        }
        let n = buf.len().min(self.remaining);
        self.remaining -= n;
        Poll::Ready(Ok(n))
    }

    fn poll_flush(self: Pin<&mut Self>, _: &mut Context<'_>) -> Poll<io::Result<()>> {
        if self.remaining == 0 {
            return Poll::Ready(Err(io::Error::new(io::ErrorKind::StorageFull, "disk full")));
        }
        Poll::Ready(Ok(()))
    }

    fn poll_shutdown(self: Pin<&mut Self>, _: &mut Context<'_>) -> Poll<io::Result<()>> { Poll::Ready(Ok(())) }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_write_failure_aborts_without_hanging() {
    let slow = from_fn(|line: String| async move {
        tokio::time::sleep(Duration::from_millis(1)).await;
        Ok::<_, io::Error>(line.repeat(64))
    });

    let pipeline = Pipeline::new(workers(4));
    let run = pipeline.run(numbered_input(10_000), FailAfter { remaining: 4096 }, slow);
    let result = tokio::time::timeout(Duration::from_secs(30), run)
        .await
        .expect("pipeline hung after a write failure");

    let err = result.unwrap_err();
    assert!(
        matches!(err, PipelineError::OutputWrite { .. } | PipelineError::OutputFlush(_)),
        "unexpected error: {err}"
    );
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_read_failure_aborts_without_hanging() {
    let mut bytes: Vec<u8> = (0..100).flat_map(|i| format!("item-{i}\n").into_bytes()).collect();
    bytes.extend_from_slice(b"\xff\xfe\n");
    bytes.extend((100..200).flat_map(|i| format!("item-{i}\n").into_bytes()));
    let identity = from_fn(|line: String| async move { Ok::<_, io::Error>(line) });

    let pipeline = Pipeline::new(workers(2));
    let run = pipeline.run(Cursor::new(bytes), Vec::new(), identity);
    let result = tokio::time::timeout(Duration::from_secs(30), run)
        .await
        .expect("pipeline hung after a read failure");

    assert!(matches!(result.unwrap_err(), PipelineError::InputRead { line: 100, .. }));
}

use futures::{Stream, StreamExt};
use routeway::{dispatch_stream, ChunkStream, StreamCallbacks, StreamError};
use std::io;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

const HI_CHUNK: &str = r#"data: {"id":"1","object":"x","created":0,"model":"m","choices":[{"index":0,"delta":{"content":"Hi"}}]}"#;
const OK_CHUNK: &str = r#"data: {"id":"2","object":"x","created":0,"model":"m","choices":[{"index":0,"delta":{"content":"ok"}}]}"#;

type Segment = Result<Vec<u8>, io::Error>;

fn segments(parts: &[&str]) -> Vec<Segment> {
    parts.iter().map(|p| Ok(p.as_bytes().to_vec())).collect()
}

fn body(parts: Vec<Segment>) -> impl Stream<Item = Segment> + Send + 'static {
    futures::stream::iter(parts)
}

/// Body that counts how many segments were pulled and when it is dropped
struct TrackedBody {
    reads: Arc<AtomicUsize>,
    drops: Arc<AtomicUsize>,
}

impl TrackedBody {
    fn new() -> Self {
        Self {
            reads: Arc::new(AtomicUsize::new(0)),
            drops: Arc::new(AtomicUsize::new(0)),
        }
    }

    fn stream(&self, parts: Vec<Segment>) -> impl Stream<Item = Segment> + Send + 'static {
        let reads = self.reads.clone();
        let guard = DropGuard(self.drops.clone());
        futures::stream::iter(parts).map(move |segment| {
            let _guard = &guard;
            reads.fetch_add(1, Ordering::SeqCst);
            segment
        })
    }

    fn reads(&self) -> usize {
        self.reads.load(Ordering::SeqCst)
    }

    fn drops(&self) -> usize {
        self.drops.load(Ordering::SeqCst)
    }
}

struct DropGuard(Arc<AtomicUsize>);

impl Drop for DropGuard {
    fn drop(&mut self) {
        self.0.fetch_add(1, Ordering::SeqCst);
    }
}

#[derive(Debug, Default, PartialEq)]
struct Recorded {
    chunks: usize,
    contents: Vec<String>,
    reasoning: Vec<String>,
    errors: usize,
    done: usize,
    after_done: usize,
}

async fn run_push(parts: Vec<Segment>) -> (Result<(), StreamError>, Recorded) {
    let recorded = Mutex::new(Recorded::default());

    let callbacks = StreamCallbacks::new()
        .on_chunk(|_| {
            let mut r = recorded.lock().unwrap();
            if r.done > 0 {
                r.after_done += 1;
            }
            r.chunks += 1;
        })
        .on_content(|c| recorded.lock().unwrap().contents.push(c.to_string()))
        .on_reasoning(|c| recorded.lock().unwrap().reasoning.push(c.to_string()))
        .on_error(|_| recorded.lock().unwrap().errors += 1)
        .on_done(|| recorded.lock().unwrap().done += 1);

    let result = dispatch_stream(Some(body(parts)), Some(callbacks)).await;
    (result, recorded.into_inner().unwrap())
}

#[tokio::test]
async fn test_sentinel_termination() {
    let input = format!("{}\ndata: [DONE]\n", HI_CHUNK);

    let (result, recorded) = run_push(segments(&[&input])).await;

    assert!(result.is_ok());
    assert_eq!(recorded.chunks, 1);
    assert_eq!(recorded.contents, vec!["Hi"]);
    assert_eq!(recorded.done, 1);
    assert_eq!(recorded.errors, 0);
    assert_eq!(recorded.after_done, 0);
}

#[tokio::test]
async fn test_nothing_dispatched_after_sentinel() {
    let input = format!("{}\ndata: [DONE]\n{}\n", HI_CHUNK, OK_CHUNK);

    let (_, recorded) = run_push(segments(&[&input])).await;

    assert_eq!(recorded.contents, vec!["Hi"]);
    assert_eq!(recorded.done, 1);
}

#[tokio::test]
async fn test_malformed_line_resilience() {
    let input = format!("data: {{not valid json\n{}\ndata: [DONE]\n", OK_CHUNK);

    let (result, recorded) = run_push(segments(&[&input])).await;

    assert!(result.is_ok());
    assert_eq!(recorded.contents, vec!["ok"]);
    assert_eq!(recorded.chunks, 1);
    assert_eq!(recorded.errors, 0);
    assert_eq!(recorded.done, 1);
}

#[tokio::test]
async fn test_comment_and_blank_suppression() {
    let input = ": keep-alive\n\n: keep-alive\n\n\ndata: [DONE]\n";

    let (result, recorded) = run_push(segments(&[input])).await;

    assert!(result.is_ok());
    assert_eq!(
        recorded,
        Recorded {
            done: 1,
            ..Recorded::default()
        }
    );
}

#[tokio::test]
async fn test_end_of_stream_without_sentinel_flushes_tail() {
    // No trailing newline and no [DONE]
    let (result, recorded) = run_push(segments(&[HI_CHUNK])).await;

    assert!(result.is_ok());
    assert_eq!(recorded.contents, vec!["Hi"]);
    assert_eq!(recorded.done, 1);
}

#[tokio::test]
async fn test_reasoning_and_null_content() {
    let input = concat!(
        r#"data: {"id":"r","object":"x","created":0,"model":"m","choices":[{"index":0,"delta":{"role":"assistant","content":null,"reasoning_content":"Let me think"}}]}"#,
        "\n",
        r#"data: {"id":"r","object":"x","created":0,"model":"m","choices":[{"index":0,"delta":{"content":"Answer","reasoning_content":null},"finish_reason":"stop"}]}"#,
        "\n",
        "data: [DONE]\n",
    );

    let (_, recorded) = run_push(segments(&[input])).await;

    assert_eq!(recorded.chunks, 2);
    assert_eq!(recorded.reasoning, vec!["Let me think"]);
    assert_eq!(recorded.contents, vec!["Answer"]);
}

#[tokio::test]
async fn test_chunks_split_across_segments() {
    let input = format!("{}\n\n{}\n\ndata: [DONE]\n\n", HI_CHUNK, OK_CHUNK);
    let bytes = input.as_bytes();

    for size in [1, 2, 3, 7, 64] {
        let parts: Vec<Segment> = bytes.chunks(size).map(|c| Ok(c.to_vec())).collect();

        let (result, recorded) = run_push(parts).await;

        assert!(result.is_ok());
        assert_eq!(recorded.contents, vec!["Hi", "ok"], "segment size {size}");
        assert_eq!(recorded.done, 1);
    }
}

#[tokio::test]
async fn test_multibyte_content_split_mid_character() {
    let line = r#"data: {"id":"u","object":"x","created":0,"model":"m","choices":[{"index":0,"delta":{"content":"héllo 🦀"}}]}"#;
    let input = format!("{}\ndata: [DONE]\n", line);
    let bytes = input.as_bytes();
    let crab = bytes.windows(4).position(|w| w == "🦀".as_bytes()).unwrap();

    let parts = vec![Ok(bytes[..crab + 2].to_vec()), Ok(bytes[crab + 2..].to_vec())];
    let (_, recorded) = run_push(parts).await;

    assert_eq!(recorded.contents, vec!["héllo 🦀"]);
}

#[tokio::test]
async fn test_transport_failure_push() {
    let parts = vec![
        Ok(format!("{}\n", HI_CHUNK).into_bytes()),
        Err(io::Error::new(io::ErrorKind::ConnectionReset, "connection reset")),
    ];

    let (result, recorded) = run_push(parts).await;

    let err = result.unwrap_err();
    assert!(err.is_transport());
    assert!(err.to_string().contains("connection reset"));
    assert_eq!(recorded.contents, vec!["Hi"]);
    assert_eq!(recorded.errors, 1);
    assert_eq!(recorded.done, 0);
}

#[tokio::test]
async fn test_reader_released_once_and_not_read_after_sentinel() {
    let tracked = TrackedBody::new();
    let parts = segments(&[&format!("{}\n", HI_CHUNK), "data: [DONE]\n", OK_CHUNK, "\n"]);

    let result = dispatch_stream(
        Some(tracked.stream(parts)),
        Some(StreamCallbacks::new().on_done(|| {})),
    )
    .await;

    assert!(result.is_ok());
    assert_eq!(tracked.reads(), 2);
    assert_eq!(tracked.drops(), 1);
}

#[tokio::test]
async fn test_reader_released_on_push_error() {
    let tracked = TrackedBody::new();
    let parts = vec![Err(io::Error::new(io::ErrorKind::Other, "boom"))];

    let result = dispatch_stream(Some(tracked.stream(parts)), Some(StreamCallbacks::new())).await;

    assert!(result.is_err());
    assert_eq!(tracked.drops(), 1);
}

#[tokio::test]
async fn test_pull_equivalence() {
    for (chunk, expected) in [(HI_CHUNK, "Hi"), (OK_CHUNK, "ok")] {
        let input = format!("data: {{not valid json\n{}\ndata: [DONE]\n", chunk);
        let mut stream = ChunkStream::new(Some(body(segments(&[&input])))).unwrap();

        let first = stream.next().await.unwrap().unwrap();
        assert_eq!(first.content(), Some(expected));
        assert!(stream.next().await.is_none());
    }
}

#[tokio::test]
async fn test_pull_not_restartable() {
    let tracked = TrackedBody::new();
    let input = format!("{}\ndata: [DONE]\n", HI_CHUNK);
    let mut stream = ChunkStream::new(Some(tracked.stream(segments(&[&input])))).unwrap();

    let items: Vec<_> = (&mut stream).collect().await;
    assert_eq!(items.len(), 1);

    let reads = tracked.reads();
    assert!(stream.next().await.is_none());
    assert!(stream.next().await.is_none());
    assert_eq!(tracked.reads(), reads);
    assert_eq!(tracked.drops(), 1);
}

#[tokio::test]
async fn test_pull_transport_failure_is_reported() {
    let parts = vec![
        Ok(format!("{}\n", OK_CHUNK).into_bytes()),
        Err(io::Error::new(io::ErrorKind::TimedOut, "read timed out")),
    ];
    let stream = ChunkStream::new(Some(body(parts))).unwrap();

    let items: Vec<_> = stream.collect().await;

    assert_eq!(items.len(), 2);
    assert_eq!(items[0].as_ref().unwrap().content(), Some("ok"));
    assert!(matches!(items[1], Err(StreamError::Transport(_))));
}

#[tokio::test]
async fn test_pull_early_abandon_releases_reader() {
    let tracked = TrackedBody::new();
    let input = format!("{}\n{}\ndata: [DONE]\n", HI_CHUNK, OK_CHUNK);
    let parts: Vec<Segment> = input.as_bytes().chunks(16).map(|c| Ok(c.to_vec())).collect();
    let total = parts.len();

    let mut stream = ChunkStream::new(Some(tracked.stream(parts))).unwrap();
    let first = stream.next().await.unwrap().unwrap();
    assert_eq!(first.content(), Some("Hi"));

    drop(stream);

    assert!(tracked.reads() < total);
    assert_eq!(tracked.drops(), 1);
}

#[tokio::test]
async fn test_pull_comments_only() {
    let stream = ChunkStream::new(Some(body(segments(&[": ping\n\n", "data: [DONE]\n"])))).unwrap();

    let items: Vec<_> = stream.collect().await;

    assert!(items.is_empty());
}

#[tokio::test]
async fn test_pull_collect_content_surfaces_error() {
    let parts = vec![
        Ok(format!("{}\n", HI_CHUNK).into_bytes()),
        Err(io::Error::new(io::ErrorKind::BrokenPipe, "broken pipe")),
    ];
    let stream = ChunkStream::new(Some(body(parts))).unwrap();

    let err = stream.collect_content().await.unwrap_err();

    assert!(err.is_transport());
}

#[tokio::test]
async fn test_unlisted_role_and_float_created_still_deliver_content() {
    let input = concat!(
        r#"data: {"id":"t","object":"x","created":1.7e9,"model":"m","choices":[{"index":0,"delta":{"role":"tool","content":"Hi"}}]}"#,
        "\n",
        "data: [DONE]\n",
    );

    let (result, recorded) = run_push(segments(&[input])).await;

    assert!(result.is_ok());
    assert_eq!(recorded.chunks, 1);
    assert_eq!(recorded.contents, vec!["Hi"]);
    assert_eq!(recorded.done, 1);
}

use std::io::Read;
use std::io::Write;
use std::net::TcpListener;
use std::net::TcpStream;
use std::sync::mpsc;
use std::thread;
use std::time::Duration;

use mood_core::error::ServiceError;
use mood_core::insight::InsightPrompt;
use mood_core::state::Mood;
use mood_exec::HttpInsightService;
use mood_exec::InsightService;
use pretty_assertions::assert_eq;

struct CannedResponse {
    status: &'static str,
    body: &'static str,
    delay: Duration,
}

impl CannedResponse {
    fn ok(body: &'static str) -> Self {
        Self {
            status: "200 OK",
            body,
            delay: Duration::ZERO,
        }
    }

    fn status(status: &'static str) -> Self {
        Self {
            status,
            body: "{}",
            delay: Duration::ZERO,
        }
    }
}

/// Serves the canned responses in order, one per connection, and reports each request body.
fn serve(responses: Vec<CannedResponse>) -> (String, mpsc::Receiver<String>) {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
    let url = format!("http://{}/ai/llm", listener.local_addr().expect("addr"));
    let (tx, rx) = mpsc::channel();

    thread::spawn(move || {
        for canned in responses {
            let Ok((mut stream, _)) = listener.accept() else {
                return;
            };
            let body = read_request_body(&mut stream);
            let _ = tx.send(body);
            thread::sleep(canned.delay);
            let response = format!(
                "HTTP/1.1 {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                canned.status,
                canned.body.len(),
                canned.body
            );
            let _ = stream.write_all(response.as_bytes());
            let _ = stream.flush();
        }
    });

    (url, rx)
}

fn read_request_body(stream: &mut TcpStream) -> String {
    let mut buf = Vec::new();
    let mut chunk = [0_u8; 1024];
    let header_end = loop {
        let n = stream.read(&mut chunk).unwrap_or(0);
        if n == 0 {
            return String::new();
        }
        buf.extend_from_slice(&chunk[..n]);
        if let Some(pos) = buf.windows(4).position(|w| w == b"\r\n\r\n") {
            break pos + 4;
        }
    };

    let headers = String::from_utf8_lossy(&buf[..header_end]).to_ascii_lowercase();
    let content_length = headers
        .lines()
        .find_map(|line| line.strip_prefix("content-length:"))
        .and_then(|value| value.trim().parse::<usize>().ok())
        .unwrap_or(0);

    while buf.len() < header_end + content_length {
        let n = stream.read(&mut chunk).unwrap_or(0);
        if n == 0 {
            break;
        }
        buf.extend_from_slice(&chunk[..n]);
    }
    String::from_utf8_lossy(&buf[header_end..]).into_owned()
}

fn prompt() -> InsightPrompt {
    InsightPrompt::compose(
        Some(Mood::Calm),
        "Slept well, went for a run, and finally finished the book I started",
    )
}

fn service(url: &str, timeout: Duration, retry_once: bool) -> HttpInsightService {
    HttpInsightService::new(url, timeout, retry_once).expect("client")
}

#[test]
fn posts_messages_and_reads_completion() {
    let (url, bodies) = serve(vec![CannedResponse::ok(
        r#"{"completion":"Take a breath, you're doing fine."}"#,
    )]);

    let insight = service(&url, Duration::from_secs(5), false).generate_insight(&prompt());
    assert_eq!(insight, Ok("Take a breath, you're doing fine.".to_string()));

    let sent: serde_json::Value =
        serde_json::from_str(&bodies.recv().expect("request body")).expect("json body");
    assert_eq!(sent["messages"][0]["role"], "system");
    assert_eq!(sent["messages"][1]["role"], "user");
    assert!(sent["messages"][1]["content"]
        .as_str()
        .expect("content")
        .starts_with("Mood: Calm\nJournal: Slept well"));
}

#[test]
fn non_success_status_is_a_service_error() {
    let (url, _bodies) = serve(vec![CannedResponse::status("500 Internal Server Error")]);

    let insight = service(&url, Duration::from_secs(5), false).generate_insight(&prompt());
    assert_eq!(insight, Err(ServiceError::Status(500)));
}

#[test]
fn missing_completion_is_a_service_error() {
    let (url, _bodies) = serve(vec![CannedResponse::ok(r#"{"error":"quota"}"#)]);

    let insight = service(&url, Duration::from_secs(5), false).generate_insight(&prompt());
    assert_eq!(insight, Err(ServiceError::MissingCompletion));
}

#[test]
fn slow_service_times_out() {
    let (url, _bodies) = serve(vec![CannedResponse {
        status: "200 OK",
        body: r#"{"completion":"late"}"#,
        delay: Duration::from_secs(3),
    }]);

    let insight = service(&url, Duration::from_millis(300), false).generate_insight(&prompt());
    assert_eq!(insight, Err(ServiceError::TimedOut));
}

#[test]
fn retry_once_recovers_from_server_error() {
    let (url, bodies) = serve(vec![
        CannedResponse::status("503 Service Unavailable"),
        CannedResponse::ok(r#"{"completion":"second time lucky"}"#),
    ]);

    let insight = service(&url, Duration::from_secs(5), true).generate_insight(&prompt());
    assert_eq!(insight, Ok("second time lucky".to_string()));
    assert_eq!(bodies.iter().take(2).count(), 2);
}

#[test]
fn client_errors_are_not_retried() {
    let (url, _bodies) = serve(vec![
        CannedResponse::status("400 Bad Request"),
        CannedResponse::ok(r#"{"completion":"should not be reached"}"#),
    ]);

    let insight = service(&url, Duration::from_secs(5), true).generate_insight(&prompt());
    assert_eq!(insight, Err(ServiceError::Status(400)));
}

#[test]
fn unreachable_endpoint_is_a_transport_error() {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
    let url = format!("http://{}/ai/llm", listener.local_addr().expect("addr"));
    drop(listener);

    let insight = service(&url, Duration::from_secs(5), false).generate_insight(&prompt());
    assert!(matches!(insight, Err(ServiceError::Transport(_))));
}

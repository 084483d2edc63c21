use release_tracker_core::{
    sop_version, ContentsApi, GithubContentsClient, SopConfig, SopError, UNKNOWN_SOP_VERSION,
};
use std::cell::RefCell;
use std::io::{Read, Write};
use std::net::{TcpListener, TcpStream};
use std::sync::mpsc::{self, Receiver};
use std::thread;
use std::time::{Duration, Instant};

/// Canned contents API that records requests.
struct StubContents {
    response: fn() -> Result<Option<String>, SopError>,
    calls: RefCell<Vec<(String, String, String)>>,
}

impl StubContents {
    fn new(response: fn() -> Result<Option<String>, SopError>) -> Self {
        Self {
            response,
            calls: RefCell::new(Vec::new()),
        }
    }
}

impl ContentsApi for StubContents {
    fn file_contents(
        &self,
        repo: &str,
        path: &str,
        git_ref: &str,
    ) -> Result<Option<String>, SopError> {
        self.calls
            .borrow_mut()
            .push((repo.to_string(), path.to_string(), git_ref.to_string()));
        (self.response)()
    }
}

#[test]
fn returns_decoded_marker_when_present() {
    let api = StubContents::new(|| Ok(Some("MS40LjQK".to_string())));

    assert_eq!(sop_version(&api, "mysageone_uk", "2.14"), "1.4.4\n");
    assert_eq!(
        api.calls.borrow().as_slice(),
        &[(
            "mysageone_uk".to_string(),
            "SOP_VERSION".to_string(),
            "v2.14.rc1".to_string()
        )]
    );
}

#[test]
fn returns_question_mark_when_content_missing() {
    let api = StubContents::new(|| Ok(None));
    assert_eq!(sop_version(&api, "mysageone_uk", "2.14"), UNKNOWN_SOP_VERSION);
}

#[test]
fn returns_question_mark_on_upstream_error() {
    let api = StubContents::new(|| Err(SopError::Status(502)));
    assert_eq!(sop_version(&api, "payroll", "1.0"), "?");
}

#[test]
fn returns_question_mark_on_undecodable_content() {
    let api = StubContents::new(|| Ok(Some("%%%".to_string())));
    assert_eq!(sop_version(&api, "payroll", "1.0"), "?");

    let not_utf8 = StubContents::new(|| Ok(Some("/w==".to_string())));
    assert_eq!(sop_version(&not_utf8, "payroll", "1.0"), "?");
}

/// Serves one canned HTTP response on a local port and reports the request
/// line it received.
fn serve_once(status_line: &'static str, body: &'static str) -> (String, Receiver<String>) {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let base = format!("http://{}", listener.local_addr().unwrap());
    let (tx, rx) = mpsc::channel();
    thread::spawn(move || {
        let (mut stream, _) = listener.accept().unwrap();
        let request = read_request_head(&mut stream);
        let _ = tx.send(request.lines().next().unwrap_or_default().to_string());
        let response = format!(
            "{status_line}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
            body.len()
        );
        stream.write_all(response.as_bytes()).unwrap();
        stream.flush().unwrap();
    });
    (base, rx)
}

/// Accepts one connection and never answers it.
fn serve_silence() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let base = format!("http://{}", listener.local_addr().unwrap());
    thread::spawn(move || {
        let (mut stream, _) = listener.accept().unwrap();
        read_request_head(&mut stream);
        thread::sleep(Duration::from_secs(10));
        drop(stream);
    });
    base
}

fn read_request_head(stream: &mut TcpStream) -> String {
    let mut head = Vec::new();
    let mut buf = [0u8; 1024];
    while !head.windows(4).any(|w| w == b"\r\n\r\n") {
        match stream.read(&mut buf) {
            Ok(0) | Err(_) => break,
            Ok(n) => head.extend_from_slice(&buf[..n]),
        }
    }
    String::from_utf8_lossy(&head).into_owned()
}

fn client_for(api_base: String) -> GithubContentsClient {
    GithubContentsClient::new(&SopConfig {
        api_base,
        org: "Sage".to_string(),
        token: None,
        timeout: Duration::from_secs(1),
    })
    .unwrap()
}

#[test]
fn http_client_decodes_wrapped_content_from_tag_ref() {
    let (base, requests) = serve_once(
        "HTTP/1.1 200 OK",
        r#"{"content":"MS40\nLjQK\n","encoding":"base64"}"#,
    );
    let client = client_for(base);

    assert_eq!(sop_version(&client, "mysageone_uk", "2.14"), "1.4.4\n");
    let request_line = requests.recv_timeout(Duration::from_secs(2)).unwrap();
    assert_eq!(
        request_line,
        "GET /repos/Sage/mysageone_uk/contents/SOP_VERSION?ref=v2.14.rc1 HTTP/1.1"
    );
}

#[test]
fn http_client_maps_not_found_to_question_mark() {
    let (base, _requests) = serve_once("HTTP/1.1 404 Not Found", r#"{"message":"Not Found"}"#);
    let client = client_for(base);

    assert!(matches!(
        client.file_contents("payroll", "SOP_VERSION", "v1.0.rc1"),
        Ok(None)
    ));
}

#[test]
fn http_client_maps_server_error_to_question_mark() {
    let (base, _requests) = serve_once("HTTP/1.1 503 Service Unavailable", "{}");
    let client = client_for(base.clone());
    assert!(matches!(
        client.file_contents("payroll", "SOP_VERSION", "v1.0.rc1"),
        Err(SopError::Status(503))
    ));

    let (base, _requests) = serve_once("HTTP/1.1 500 Internal Server Error", "{}");
    assert_eq!(sop_version(&client_for(base), "payroll", "1.0"), "?");
}

#[test]
fn http_client_not_found_falls_back_through_sop_version() {
    let (base, _requests) = serve_once("HTTP/1.1 404 Not Found", "{}");
    assert_eq!(sop_version(&client_for(base), "payroll", "1.0"), "?");
}

#[test]
fn http_client_gives_up_on_silent_server_within_timeout() {
    let client = client_for(serve_silence());

    let started_at = Instant::now();
    assert_eq!(sop_version(&client, "payroll", "1.0"), UNKNOWN_SOP_VERSION);
    assert!(started_at.elapsed() < Duration::from_secs(3));
}

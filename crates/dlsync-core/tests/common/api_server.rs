//! Minimal HTTP/1.1 stand-in for the download service, for integration tests.
//!
//! Serves the job list, create/delete/pause/resume and text/event-stream push
//! endpoints from an in-memory job table. Every response closes the
//! connection. Push streams replay the frames queued for their path, then send
//! comment heartbeats until the client goes away.

use std::collections::HashMap;
use std::io::{Read, Write};
use std::net::{TcpListener, TcpStream};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

use dlsync_core::{JobRecord, JobStatus};

#[derive(Default)]
struct State {
    jobs: Vec<JobRecord>,
    next_id: u32,
    /// Frames to replay, keyed by push path (`stream` or `{id}/stream`).
    frames: HashMap<String, Vec<String>>,
    requests: Vec<String>,
}

/// Handle on a running server; clones share state.
#[derive(Clone)]
pub struct ApiServer {
    pub base_url: String,
    state: Arc<Mutex<State>>,
}

impl ApiServer {
    /// Starts the server in a background thread with `jobs` as its table. It
    /// runs until the process exits.
    pub fn start(jobs: Vec<JobRecord>) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
        let port = listener.local_addr().unwrap().port();
        let state = Arc::new(Mutex::new(State {
            jobs,
            next_id: 1,
            ..State::default()
        }));
        let shared = Arc::clone(&state);
        thread::spawn(move || {
            for stream in listener.incoming().flatten() {
                let state = Arc::clone(&shared);
                thread::spawn(move || handle(stream, &state));
            }
        });
        Self {
            base_url: format!("http://127.0.0.1:{}", port),
            state,
        }
    }

    /// Queue a `progress` event carrying `record` on push path `path`.
    pub fn queue_event(&self, path: &str, record: &JobRecord, version: u64) {
        let data = serde_json::to_string(record).unwrap();
        let frame = format!(
            "event: progress\r\nid: {}:{}\r\ndata: {}\r\n\r\n",
            record.id, version, data
        );
        self.state
            .lock()
            .unwrap()
            .frames
            .entry(path.to_string())
            .or_default()
            .push(frame);
    }

    /// `"METHOD /path"` for every request served so far.
    pub fn requests(&self) -> Vec<String> {
        self.state.lock().unwrap().requests.clone()
    }

    pub fn job(&self, id: &str) -> Option<JobRecord> {
        self.state
            .lock()
            .unwrap()
            .jobs
            .iter()
            .find(|j| j.id == id)
            .cloned()
    }
}

fn handle(mut stream: TcpStream, state: &Mutex<State>) {
    let _ = stream.set_read_timeout(Some(Duration::from_secs(2)));
    let _ = stream.set_write_timeout(Some(Duration::from_secs(2)));
    let Some((method, path, body)) = read_request(&mut stream) else {
        return;
    };
    state
        .lock()
        .unwrap()
        .requests
        .push(format!("{} {}", method, path));

    let rest = path.strip_prefix("/api/downloads").unwrap_or("!");
    let segments: Vec<&str> = rest.split('/').filter(|s| !s.is_empty()).collect();
    match (method.as_str(), segments.as_slice()) {
        ("GET", []) => {
            let body = serde_json::to_string(&state.lock().unwrap().jobs).unwrap();
            respond(&mut stream, "200 OK", &body);
        }
        ("POST", []) => create(&mut stream, state, &body),
        ("DELETE", [id]) => {
            let mut st = state.lock().unwrap();
            let before = st.jobs.len();
            st.jobs.retain(|j| j.id != *id);
            let status = if st.jobs.len() < before {
                "204 No Content"
            } else {
                "404 Not Found"
            };
            drop(st);
            respond(&mut stream, status, "");
        }
        ("POST", [id, action @ ("pause" | "resume")]) => {
            let new_status = if *action == "pause" {
                JobStatus::Paused
            } else {
                JobStatus::Downloading
            };
            let mut st = state.lock().unwrap();
            let found = st.jobs.iter_mut().find(|j| j.id == *id).map(|j| {
                j.status = new_status;
            });
            drop(st);
            let status = if found.is_some() { "200 OK" } else { "404 Not Found" };
            respond(&mut stream, status, "");
        }
        ("GET", ["stream"]) => push(&mut stream, state, "stream"),
        ("GET", [id, "stream"]) => {
            let known = state.lock().unwrap().jobs.iter().any(|j| j.id == *id);
            if known {
                push(&mut stream, state, &format!("{}/stream", id));
            } else {
                respond(&mut stream, "404 Not Found", "");
            }
        }
        _ => respond(&mut stream, "404 Not Found", ""),
    }
}

fn create(stream: &mut TcpStream, state: &Mutex<State>, body: &[u8]) {
    let req: serde_json::Value = match serde_json::from_slice(body) {
        Ok(v) => v,
        Err(_) => return respond(stream, "400 Bad Request", ""),
    };
    let mut st = state.lock().unwrap();
    let id = format!("job-{}", st.next_id);
    st.next_id += 1;
    let mut record = JobRecord::new(id, JobStatus::Pending);
    record.url = req["url"].as_str().unwrap_or_default().to_string();
    record.output_path = req["outputPath"].as_str().unwrap_or_default().to_string();
    record.filename = req["filename"].as_str().map(str::to_string);
    st.jobs.insert(0, record.clone());
    drop(st);
    respond(stream, "201 Created", &serde_json::to_string(&record).unwrap());
}

fn push(stream: &mut TcpStream, state: &Mutex<State>, path: &str) {
    let head = "HTTP/1.1 200 OK\r\nContent-Type: text/event-stream\r\n\
Cache-Control: no-cache\r\nConnection: close\r\n\r\n";
    if stream.write_all(head.as_bytes()).is_err() {
        return;
    }
    let frames = state
        .lock()
        .unwrap()
        .frames
        .remove(path)
        .unwrap_or_default();
    for frame in frames {
        if stream.write_all(frame.as_bytes()).is_err() {
            return;
        }
    }
    // Heartbeats until the client hangs up.
    loop {
        thread::sleep(Duration::from_millis(50));
        if stream.write_all(b": keep-alive\r\n\r\n").is_err() || stream.flush().is_err() {
            return;
        }
    }
}

fn respond(stream: &mut TcpStream, status: &str, body: &str) {
    let content_type = if body.is_empty() {
        ""
    } else {
        "Content-Type: application/json\r\n"
    };
    let response = format!(
        "HTTP/1.1 {}\r\n{}Content-Length: {}\r\nConnection: close\r\n\r\n{}",
        status,
        content_type,
        body.len(),
        body
    );
    let _ = stream.write_all(response.as_bytes());
}

/// Reads one request: method, path and body (by Content-Length).
fn read_request(stream: &mut TcpStream) -> Option<(String, String, Vec<u8>)> {
    let mut data = Vec::new();
    let mut buf = [0u8; 8192];
    let header_end = loop {
        let n = stream.read(&mut buf).ok()?;
        if n == 0 {
            return None;
        }
        data.extend_from_slice(&buf[..n]);
        if let Some(pos) = data.windows(4).position(|w| w == b"\r\n\r\n") {
            break pos + 4;
        }
    };
    let head = std::str::from_utf8(&data[..header_end]).ok()?.to_string();
    let mut lines = head.lines();
    let mut first = lines.next()?.split_whitespace();
    let method = first.next()?.to_string();
    let path = first.next()?.to_string();
    let content_length = lines
        .filter_map(|l| l.split_once(':'))
        .find(|(k, _)| k.trim().eq_ignore_ascii_case("content-length"))
        .and_then(|(_, v)| v.trim().parse::<usize>().ok())
        .unwrap_or(0);
    while data.len() < header_end + content_length {
        let n = stream.read(&mut buf).ok()?;
        if n == 0 {
            break;
        }
        data.extend_from_slice(&buf[..n]);
    }
    Some((method, path, data[header_end..].to_vec()))
}

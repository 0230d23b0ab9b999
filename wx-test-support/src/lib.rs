//! Fake OpenWeatherMap endpoint for integration tests.
//!
//! Serves one canned HTTP response on an ephemeral local port and records the
//! request line, so tests can check the query without reaching the network.

use std::io::{BufRead, BufReader, ErrorKind, Write};
use std::net::{SocketAddr, TcpListener};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::{Duration, Instant};

/// How long the fake waits for a client before giving up.
const ACCEPT_WINDOW: Duration = Duration::from_secs(10);

pub struct FakeProvider {
    addr: SocketAddr,
    received: Arc<AtomicBool>,
    handle: Option<thread::JoinHandle<Option<String>>>,
}

enum Reply {
    Canned(String),
    /// Accept, then hold the connection without answering.
    Silent(Duration),
}

impl FakeProvider {
    /// Answer the first request with `status` and a JSON `body`.
    pub fn respond(status: u16, body: &str) -> Self {
        Self::respond_within(status, body, ACCEPT_WINDOW)
    }

    /// Like [`FakeProvider::respond`], but give up waiting after `window`.
    pub fn respond_within(status: u16, body: &str, window: Duration) -> Self {
        let response = format!(
            "HTTP/1.1 {status} {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
            reason(status),
            body.len(),
        );
        Self::spawn(Reply::Canned(response), window)
    }

    /// Accept the first request but never answer it.
    pub fn silent(hold: Duration) -> Self {
        Self::spawn(Reply::Silent(hold), ACCEPT_WINDOW)
    }

    fn spawn(reply: Reply, window: Duration) -> Self {
        let listener = TcpListener::bind(("127.0.0.1", 0)).expect("bind fake provider");
        listener.set_nonblocking(true).expect("fake provider nonblocking");
        let addr = listener.local_addr().expect("local addr");
        let received = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&received);
        let handle = thread::spawn(move || serve(listener, reply, window, &flag));

        Self { addr, received, handle: Some(handle) }
    }

    /// Endpoint URL to hand to the client.
    pub fn url(&self) -> String {
        format!("http://{}/data/2.5/weather", self.addr)
    }

    /// Block until a full request has arrived, or `within` has passed.
    pub fn wait_for_request(&self, within: Duration) -> bool {
        let deadline = Instant::now() + within;
        while !self.received.load(Ordering::Acquire) {
            if Instant::now() >= deadline {
                return false;
            }
            thread::sleep(Duration::from_millis(10));
        }
        true
    }

    /// Wait for the server thread and return the request line it saw, if any.
    pub fn request_line(mut self) -> Option<String> {
        self.handle.take().and_then(|h| h.join().ok()).flatten()
    }
}

/// A local URL on which nothing is listening.
pub fn refused_url() -> String {
    let listener = TcpListener::bind(("127.0.0.1", 0)).expect("bind unused port");
    let addr = listener.local_addr().expect("local addr");
    drop(listener);
    format!("http://{addr}/data/2.5/weather")
}

fn serve(
    listener: TcpListener,
    reply: Reply,
    window: Duration,
    received: &AtomicBool,
) -> Option<String> {
    let deadline = Instant::now() + window;

    let mut stream = loop {
        match listener.accept() {
            Ok((stream, _)) => break stream,
            Err(e) if e.kind() == ErrorKind::WouldBlock => {
                if Instant::now() >= deadline {
                    return None;
                }
                thread::sleep(Duration::from_millis(10));
            }
            Err(_) => return None,
        }
    };

    stream.set_nonblocking(false).ok()?;
    stream.set_read_timeout(Some(Duration::from_secs(5))).ok()?;

    let mut reader = BufReader::new(stream.try_clone().ok()?);
    let mut request_line = String::new();
    reader.read_line(&mut request_line).ok()?;

    let mut header = String::new();
    loop {
        header.clear();
        if reader.read_line(&mut header).ok()? == 0 || header == "\r\n" {
            break;
        }
    }
    received.store(true, Ordering::Release);

    match reply {
        Reply::Canned(response) => {
            stream.write_all(response.as_bytes()).ok()?;
            stream.flush().ok()?;
        }
        Reply::Silent(hold) => thread::sleep(hold),
    }

    Some(request_line.trim_end().to_string())
}

fn reason(status: u16) -> &'static str {
    match status {
        200 => "OK",
        401 => "Unauthorized",
        404 => "Not Found",
        429 => "Too Many Requests",
        500 => "Internal Server Error",
        _ => "Unknown",
    }
}

//! A scripted HTTP responder for transport tests.

use std::io::{BufRead, BufReader, Read, Write};
use std::net::TcpListener;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::thread::{self, JoinHandle};

/// Serves one canned `(status, body)` response per connection, in order,
/// then stops listening.
pub(crate) struct FakeStore {
    pub port: u16,
    requests: Arc<AtomicUsize>,
    bodies: Arc<Mutex<Vec<String>>>,
    handle: Option<JoinHandle<()>>,
}

impl FakeStore {
    pub fn serve(responses: Vec<(u16, &str)>) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port();
        let requests = Arc::new(AtomicUsize::new(0));
        let bodies = Arc::new(Mutex::new(Vec::new()));
        let responses: Vec<(u16, String)> = responses
            .into_iter()
            .map(|(status, body)| (status, body.to_string()))
            .collect();
        let handle = {
            let requests = Arc::clone(&requests);
            let bodies = Arc::clone(&bodies);
            thread::spawn(move || {
                for (status, body) in responses {
                    let (stream, _) = listener.accept().unwrap();
                    let mut reader = BufReader::new(stream.try_clone().unwrap());
                    let mut head = String::new();
                    let mut length = 0;
                    loop {
                        let mut line = String::new();
                        if reader.read_line(&mut line).unwrap() == 0 || line == "\r\n" {
                            break;
                        }
                        let lower = line.to_ascii_lowercase();
                        if let Some(v) = lower.strip_prefix("content-length:") {
                            length = v.trim().parse().unwrap();
                        }
                        head.push_str(&line);
                    }
                    let mut payload = vec![0; length];
                    reader.read_exact(&mut payload).unwrap();
                    head.push_str(&String::from_utf8_lossy(&payload));
                    bodies.lock().unwrap().push(head);
                    requests.fetch_add(1, Ordering::SeqCst);

                    let mut stream = stream;
                    write!(
                        stream,
                        "HTTP/1.1 {status} Scripted\r\n\
                         Content-Type: application/sparql-results+json\r\n\
                         Content-Length: {}\r\n\
                         Connection: close\r\n\r\n{body}",
                        body.len()
                    )
                    .unwrap();
                    stream.flush().unwrap();
                }
            })
        };
        Self {
            port,
            requests,
            bodies,
            handle: Some(handle),
        }
    }

    pub fn requests(&self) -> usize {
        self.requests.load(Ordering::SeqCst)
    }

    /// Raw request heads and bodies received so far.
    pub fn received(&self) -> Vec<String> {
        self.bodies.lock().unwrap().clone()
    }

    /// Wait until every scripted response has been sent.
    pub fn finish(mut self) -> usize {
        if let Some(handle) = self.handle.take() {
            handle.join().unwrap();
        }
        self.requests()
    }
}

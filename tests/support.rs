use std::ffi::OsStr;
use std::io::{Read, Write};
use std::net::{Shutdown, TcpListener, TcpStream};
use std::path::Path;
use std::process::{Command, Output};
use std::sync::mpsc;
use std::thread;
use std::time::Duration;

/// How long `/slow` waits before answering.
pub const SLOW_DELAY: Duration = Duration::from_secs(2);

const MAX_REQUEST_HEAD: usize = 16 * 1024;

pub struct ServerHandle {
    shutdown: mpsc::Sender<()>,
    thread: Option<thread::JoinHandle<()>>,
}

impl Drop for ServerHandle {
    fn drop(&mut self) {
        let _send_result = self.shutdown.send(());
        if let Some(handle) = self.thread.take() {
            drop(handle.join());
        }
    }
}

/// Spawn a small routed HTTP server for tests.
///
/// Routes: `/json`, `/bad-json`, `/text`, `/empty` (204), `/binary`,
/// `/redirect` (302 to `/json`), `/echo` (returns the `x-requested-with`
/// request header), `/slow`, and 404 for anything else.
///
/// # Errors
///
/// Returns an error if the listener cannot be created or configured.
pub fn spawn_http_server() -> Result<(String, ServerHandle), String> {
    let listener = TcpListener::bind("127.0.0.1:0")
        .map_err(|err| format!("bind test server failed: {}", err))?;
    let addr = listener
        .local_addr()
        .map_err(|err| format!("server addr failed: {}", err))?;
    listener
        .set_nonblocking(true)
        .map_err(|err| format!("set_nonblocking failed: {}", err))?;

    let (shutdown_tx, shutdown_rx) = mpsc::channel();

    let handle = thread::spawn(move || {
        loop {
            if shutdown_rx.try_recv().is_ok() {
                break;
            }

            match listener.accept() {
                Ok((stream, _)) => {
                    thread::spawn(move || handle_client(stream));
                }
                Err(err) if err.kind() == std::io::ErrorKind::WouldBlock => {
                    thread::sleep(Duration::from_millis(10));
                }
                Err(_) => break,
            }
        }
    });

    Ok((
        format!("http://{}", addr),
        ServerHandle {
            shutdown: shutdown_tx,
            thread: Some(handle),
        },
    ))
}

/// Like [`spawn_http_server`], but skips when sockets are not permitted.
///
/// # Errors
///
/// Returns an error for any failure other than a sandbox denial.
pub fn spawn_http_server_or_skip() -> Result<Option<(String, ServerHandle)>, String> {
    match spawn_http_server() {
        Ok(result) => Ok(Some(result)),
        Err(err) if err.contains("Operation not permitted") => {
            eprintln!("Skipping e2e test: {}", err);
            Ok(None)
        }
        Err(err) => Err(err),
    }
}

struct Request {
    method: String,
    path: String,
    requested_with: String,
}

fn read_request(stream: &mut TcpStream) -> Option<Request> {
    let mut head = Vec::new();
    let mut buffer = [0u8; 1024];
    while !head.windows(4).any(|window| window == b"\r\n\r\n") {
        let read = stream.read(&mut buffer).ok()?;
        if read == 0 || head.len() > MAX_REQUEST_HEAD {
            return None;
        }
        head.extend_from_slice(buffer.get(..read)?);
    }

    let text = String::from_utf8_lossy(&head).into_owned();
    let mut lines = text.split("\r\n");
    let mut request_line = lines.next()?.split_whitespace();
    let method = request_line.next()?.to_owned();
    let path = request_line.next()?.to_owned();
    let requested_with = lines
        .filter_map(|line| line.split_once(':'))
        .find(|(name, _)| name.trim().eq_ignore_ascii_case("x-requested-with"))
        .map(|(_, value)| value.trim().to_owned())
        .unwrap_or_default();
    Some(Request {
        method,
        path,
        requested_with,
    })
}

fn handle_client(mut stream: TcpStream) {
    if stream.set_nonblocking(false).is_err() {
        return;
    }
    let Some(request) = read_request(&mut stream) else {
        return;
    };

    let (status, extra_headers, content_type, body): (&str, &str, &str, Vec<u8>) =
        match request.path.as_str() {
            "/json" => (
                "200 OK",
                "",
                "application/json; charset=utf-8",
                br#"{"b":1,"a":[true,null]}"#.to_vec(),
            ),
            "/bad-json" => ("200 OK", "", "application/json", b"{oops".to_vec()),
            "/text" => ("200 OK", "", "text/plain", b"hello".to_vec()),
            "/empty" => ("204 No Content", "", "", Vec::new()),
            "/binary" => (
                "200 OK",
                "",
                "application/octet-stream",
                vec![0u8, 159, 146, 150],
            ),
            "/redirect" => (
                "302 Found",
                "Location: /json\r\n",
                "text/plain",
                b"moved".to_vec(),
            ),
            "/echo" => (
                "200 OK",
                "",
                "text/plain",
                request.requested_with.clone().into_bytes(),
            ),
            "/slow" => {
                thread::sleep(SLOW_DELAY);
                ("200 OK", "", "text/plain", b"late".to_vec())
            }
            _ => ("404 Not Found", "", "text/plain", b"not found".to_vec()),
        };

    let mut response = format!("HTTP/1.1 {}\r\n{}", status, extra_headers);
    if !content_type.is_empty() {
        response.push_str("Content-Type: ");
        response.push_str(content_type);
        response.push_str("\r\n");
    }
    if !status.starts_with("204") {
        response.push_str("Content-Length: ");
        response.push_str(&body.len().to_string());
        response.push_str("\r\n");
    }
    response.push_str("Connection: close\r\n\r\n");

    let mut bytes = response.into_bytes();
    if request.method != "HEAD" {
        bytes.extend_from_slice(&body);
    }
    if stream.write_all(&bytes).is_err() {
        return;
    }
    if stream.flush().is_err() {
        return;
    }
    drop(stream.shutdown(Shutdown::Both));
}

/// Run the `urlprobe` binary in `dir` and capture output.
///
/// # Errors
///
/// Returns an error if the binary cannot be executed.
pub fn run_urlprobe<I, S>(dir: &Path, args: I) -> Result<Output, String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<OsStr>,
{
    let bin = urlprobe_bin()?;
    Command::new(bin)
        .args(args)
        .current_dir(dir)
        .env("RUST_LOG", "error")
        .env_remove("URLPROBE_LOG")
        .env_remove("NO_COLOR")
        .output()
        .map_err(|err| format!("run urlprobe failed: {}", err))
}

fn urlprobe_bin() -> Result<String, String> {
    option_env!("CARGO_BIN_EXE_urlprobe").map_or_else(
        || Err("CARGO_BIN_EXE_urlprobe missing at compile time.".to_owned()),
        |path| Ok(path.to_owned()),
    )
}

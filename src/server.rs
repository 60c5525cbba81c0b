// src/server.rs
//! Minimal HTTP/1.1 front for the `Api`: one request per connection, `Content-Length`
//! bodies only, one thread per connection.

use lazy_static::lazy_static;
use log::{debug, error, info, warn};
use regex::Regex;
use std::io::{BufRead, BufReader, Write};
use std::net::{TcpListener, TcpStream};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use crate::api::{Api, ApiRequest, ApiResponse};
use crate::error::ServerError;

const MAX_BODY_BYTES: usize = 64 * 1024;
const MAX_HEADER_LINES: usize = 100;
const READ_TIMEOUT: Duration = Duration::from_secs(10);

lazy_static! {
    static ref REQUEST_LINE: Regex = Regex::new(r"^([A-Z]+) (\S+) HTTP/1\.[01]$").unwrap();
    static ref CONTENT_LENGTH: Regex = Regex::new(r"(?i)^content-length:\s*(\d+)$").unwrap();
}

/// Binds `address` and serves until the listener fails.
pub fn serve(address: &str, api: Api) -> Result<(), ServerError> {
    let listener = TcpListener::bind(address).map_err(|e| ServerError::Bind(address.to_string(), e))?;
    info!("Listening on http://{}/api/game", listener.local_addr()?);
    run(listener, Arc::new(api))
}

/// Accept loop over an already bound listener.
pub fn run(listener: TcpListener, api: Arc<Api>) -> Result<(), ServerError> {
    for stream in listener.incoming() {
        let stream = match stream {
            Ok(stream) => stream,
            Err(e) => {
                warn!("Failed to accept connection: {}", e);
                continue;
            }
        };
        let api = Arc::clone(&api);
        thread::spawn(move || {
            if let Err(e) = handle_connection(stream, &api) {
                debug!("Connection closed with error: {}", e);
            }
        });
    }
    Ok(())
}

fn handle_connection(stream: TcpStream, api: &Api) -> Result<(), ServerError> {
    stream.set_read_timeout(Some(READ_TIMEOUT))?;
    let peer = stream.peer_addr()?;
    let mut reader = BufReader::new(stream.try_clone()?);

    let response = match read_request(&mut reader) {
        Ok(request) => {
            let response = api.handle(&request);
            info!("{} {} {} -> {}", peer, request.method, request.path, response.status);
            response
        }
        Err(ServerError::BadRequest(msg)) => {
            warn!("{} sent a bad request: {}", peer, msg);
            ApiResponse::text(400, msg)
        }
        Err(e @ ServerError::PayloadTooLarge(..)) => {
            warn!("{} sent an oversized request: {}", peer, e);
            ApiResponse::text(413, e.to_string())
        }
        Err(e) => return Err(e),
    };

    let mut stream = stream;
    write_response(&mut stream, &response)
}

/// Reads the request line, headers and `Content-Length` body.
pub fn read_request<R: BufRead>(reader: &mut R) -> Result<ApiRequest, ServerError> {
    let mut line = String::new();
    reader.read_line(&mut line)?;
    let request_line = line.trim_end();
    let caps = REQUEST_LINE
        .captures(request_line)
        .ok_or_else(|| ServerError::BadRequest(format!("malformed request line '{}'", request_line)))?;
    let method = caps[1].to_string();
    let path = caps[2].to_string();

    let mut content_length = 0usize;
    let mut header_lines = 0;
    loop {
        line.clear();
        if reader.read_line(&mut line)? == 0 {
            return Err(ServerError::BadRequest("connection closed inside headers".to_string()));
        }
        let header = line.trim_end();
        if header.is_empty() {
            break;
        }
        header_lines += 1;
        if header_lines > MAX_HEADER_LINES {
            return Err(ServerError::BadRequest("too many headers".to_string()));
        }
        if let Some(caps) = CONTENT_LENGTH.captures(header) {
            content_length = caps[1]
                .parse()
                .map_err(|_| ServerError::BadRequest("bad Content-Length".to_string()))?;
        }
    }

    if content_length > MAX_BODY_BYTES {
        return Err(ServerError::PayloadTooLarge(content_length, MAX_BODY_BYTES));
    }
    let mut body = vec![0u8; content_length];
    reader.read_exact(&mut body)?;
    let body = String::from_utf8(body).map_err(|_| ServerError::BadRequest("body is not UTF-8".to_string()))?;

    Ok(ApiRequest { method, path, body })
}

pub fn write_response<W: Write>(out: &mut W, response: &ApiResponse) -> Result<(), ServerError> {
    write!(
        out,
        "HTTP/1.1 {} {}\r\nContent-Type: {}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
        response.status,
        response.reason(),
        response.content_type,
        response.body.len()
    )?;
    out.write_all(response.body.as_bytes())?;
    out.flush().map_err(|e| {
        error!("Failed to flush response: {}", e);
        ServerError::Io(e)
    })
}

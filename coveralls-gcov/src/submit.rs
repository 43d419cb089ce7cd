//! Submitting a job to Coveralls.
//!
//! The job is uploaded as a `multipart/form-data` POST with a single file field named `json_file`. Coveralls
//! answers with a JSON object such as
//!
//! ```json
//! {"message": "Job #12.1", "url": "https://coveralls.io/jobs/123456"}
//! ```
//!
//! Anything else (e.g. an HTML error page) is turned into an `{"error": ...}` object by [`interpret_response()`], so
//! the caller always has a JSON value to print.
//!
//! [`interpret_response()`]: ./fn.interpret_response.html

use config::Config;
use error::{Result, ResultExt};

use linecov::Job;
use reqwest::blocking::Client;
use reqwest::blocking::multipart::{Form, Part};
use serde_json::{Value, from_str};

/// Name of the multipart field, and of the file it pretends to be.
const JSON_FILE_FIELD: &str = "json_file";

/// Creates the HTTP client, honoring the configured timeout.
pub fn client(config: &Config) -> Result<Client> {
    Ok(Client::builder().timeout(config.timeout).build()?)
}

/// POSTs the job to `endpoint` and returns the interpreted response.
///
/// # Errors
///
/// Returns [`Http`] if the request cannot be sent or the response cannot be read, e.g. on connection failure, TLS
/// failure or timeout. A response which is not JSON is not an error.
///
/// [`Http`]: ../error/enum.ErrorKind.html#variant.Http
pub fn submit(client: &Client, endpoint: &str, job: &Job) -> Result<Value> {
    let json = job.to_json()?;
    trace!("job = {}", json);

    let form = Form::new().part(JSON_FILE_FIELD, Part::text(json).file_name(JSON_FILE_FIELD));
    let response = client
        .post(endpoint)
        .multipart(form)
        .send()
        .chain_err(|| format!("Cannot submit to `{}`", endpoint))?;

    let status = response.status();
    debug!("response status {}", status);
    let body = response.text()?;
    Ok(interpret_response(status.as_u16(), &body))
}

/// Decodes the response body as JSON. If the body is not JSON, returns an error object quoting the status code and
/// the raw body instead.
pub fn interpret_response(status: u16, body: &str) -> Value {
    from_str(body).unwrap_or_else(|e| {
        debug!("response is not JSON: {}", e);
        json!({
            "error": format!("Failure to submit data. Response [{}]: {}", status, body),
        })
    })
}

#[test]
fn test_interpret_json_response() {
    let body = r#"{"message":"Job #7.1","url":"https://coveralls.io/jobs/1"}"#;
    assert_eq!(
        interpret_response(200, body),
        json!({"message": "Job #7.1", "url": "https://coveralls.io/jobs/1"})
    );
}

#[test]
fn test_interpret_json_error_status() {
    let body = r#"{"message":"Couldn't find a repository matching this job.","error":true}"#;
    assert_eq!(interpret_response(422, body)["error"], true);
}

#[test]
fn test_interpret_non_json_response() {
    assert_eq!(
        interpret_response(500, "<html>Internal Server Error</html>"),
        json!({"error": "Failure to submit data. Response [500]: <html>Internal Server Error</html>"})
    );
    assert_eq!(
        interpret_response(502, ""),
        json!({"error": "Failure to submit data. Response [502]: "})
    );
}

/// A one-shot HTTP server answering the first request with a canned response. Yields the raw request.
#[cfg(test)]
fn serve_once(status_line: &'static str, body: &'static str) -> (String, ::std::thread::JoinHandle<String>) {
    use std::io::{Read, Write};
    use std::net::TcpListener;
    use std::thread;

    let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
    let endpoint = format!("http://{}/api/v1/jobs", listener.local_addr().expect("addr"));
    let handle = thread::spawn(move || {
        let (mut stream, _) = listener.accept().expect("accept");
        let mut request = Vec::new();
        let mut buf = [0u8; 4096];
        loop {
            let n = stream.read(&mut buf).expect("read");
            if n == 0 {
                break;
            }
            request.extend_from_slice(&buf[..n]);
            if is_complete_request(&request) {
                break;
            }
        }
        let response = format!("{}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}", status_line, body.len(), body);
        stream.write_all(response.as_bytes()).expect("write");
        String::from_utf8_lossy(&request).into_owned()
    });
    (endpoint, handle)
}

/// Checks whether the headers and the whole `Content-Length` body have arrived.
#[cfg(test)]
fn is_complete_request(request: &[u8]) -> bool {
    let text = String::from_utf8_lossy(request);
    let header_end = match text.find("\r\n\r\n") {
        Some(i) => i + 4,
        None => return false,
    };
    let content_length = text[..header_end]
        .lines()
        .filter_map(|line| {
            let mut parts = line.splitn(2, ':');
            let name = parts.next()?.trim();
            let value = parts.next()?.trim();
            if name.eq_ignore_ascii_case("content-length") {
                value.parse::<usize>().ok()
            } else {
                None
            }
        })
        .next();
    match content_length {
        Some(len) => request.len() >= header_end + len,
        None => text.ends_with("--\r\n") || text.ends_with("0\r\n\r\n"),
    }
}

#[cfg(test)]
fn test_client() -> Client {
    use std::time::Duration;
    Client::builder().no_proxy().timeout(Duration::from_secs(10)).build().expect("client")
}

#[test]
fn test_submit_success() {
    use linecov::{Coverage, SourceFile};

    let (endpoint, server) = serve_once("HTTP/1.1 200 OK\r\nContent-Type: application/json", r#"{"message":"Job #1.1","url":"https://coveralls.io/jobs/1"}"#);
    let job = Job::new(
        "t0k3n".to_owned(),
        vec![
            SourceFile {
                name: "src/foo.c".to_owned(),
                source_digest: "d41d8cd98f00b204e9800998ecf8427e".to_owned(),
                coverage: Coverage::from(vec![None, Some(3), Some(0)]),
            },
        ],
    );

    let result = submit(&test_client(), &endpoint, &job).unwrap();
    assert_eq!(result, json!({"message": "Job #1.1", "url": "https://coveralls.io/jobs/1"}));

    let request = server.join().expect("server");
    assert!(request.starts_with("POST /api/v1/jobs "), "{}", request);
    assert!(request.contains("multipart/form-data; boundary="), "{}", request);
    assert!(request.contains(r#"name="json_file"; filename="json_file""#), "{}", request);
    assert!(request.contains(r#""repo_token":"t0k3n""#), "{}", request);
    assert!(request.contains(r#""coverage":[null,3,0]"#), "{}", request);
}

#[test]
fn test_submit_non_json_failure() {
    let (endpoint, server) = serve_once("HTTP/1.1 500 Internal Server Error\r\nContent-Type: text/plain", "something broke");
    let job = Job::new("t0k3n".to_owned(), Vec::new());

    let result = submit(&test_client(), &endpoint, &job).unwrap();
    assert_eq!(result, json!({"error": "Failure to submit data. Response [500]: something broke"}));
    server.join().expect("server");
}

#[test]
fn test_submit_connection_refused() {
    use std::net::TcpListener;

    let endpoint = {
        let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
        format!("http://{}/api/v1/jobs", listener.local_addr().expect("addr"))
    };
    let job = Job::new("t0k3n".to_owned(), Vec::new());
    assert!(submit(&test_client(), &endpoint, &job).is_err());
}

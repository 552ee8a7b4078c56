//! Bridge to an Ollama text-generation endpoint.
//!
//! The bridge never fails past its boundary: every problem comes back as a
//! string starting with `"Error: "`, which the CLI prints like any other
//! answer.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use mcpdemo_core::logging::{debug, targets, warn};

/// Default Ollama base URL.
pub const DEFAULT_OLLAMA_URL: &str = "http://localhost:11434";

/// Default generation model.
pub const DEFAULT_MODEL: &str = "llama3";

/// Generation can be slow on a cold model.
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(300);

#[derive(Debug, Serialize)]
struct GenerateRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    system: Option<&'a str>,
    stream: bool,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    response: String,
}

/// Blocking client for `POST {base_url}/api/generate`.
#[derive(Debug, Clone)]
pub struct OllamaClient {
    base_url: String,
    model: String,
    timeout: Duration,
}

impl Default for OllamaClient {
    fn default() -> Self {
        Self::new(DEFAULT_OLLAMA_URL, DEFAULT_MODEL)
    }
}

impl OllamaClient {
    /// Creates a client for `base_url` using `model`.
    #[must_use]
    pub fn new(base_url: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            model: model.into(),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Overrides the request timeout.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// The model used for generation.
    #[must_use]
    pub fn model(&self) -> &str {
        &self.model
    }

    /// The full generate endpoint.
    #[must_use]
    pub fn api_url(&self) -> String {
        format!("{}/api/generate", self.base_url.trim_end_matches('/'))
    }

    /// Generates a completion for `prompt`, optionally framed by `system`.
    ///
    /// Returns the backend's `response` field (empty if absent), or
    /// `"Error: {detail}"` on any transport, HTTP or decode failure.
    #[must_use]
    pub fn generate(&self, prompt: &str, system: Option<&str>) -> String {
        match self.try_generate(prompt, system) {
            Ok(text) => text,
            Err(e) => {
                warn!(target: targets::BRIDGE, "Error communicating with Ollama: {}", e);
                format!("Error: {e}")
            }
        }
    }

    fn try_generate(&self, prompt: &str, system: Option<&str>) -> Result<String, reqwest::Error> {
        let url = self.api_url();
        debug!(target: targets::BRIDGE, "POST {} (model {})", url, self.model);

        let client = reqwest::blocking::Client::builder()
            .timeout(self.timeout)
            .build()?;
        let response = client
            .post(&url)
            .json(&GenerateRequest {
                model: &self.model,
                prompt,
                system: system.filter(|s| !s.is_empty()),
                stream: false,
            })
            .send()?
            .error_for_status()?;
        let body: GenerateResponse = response.json()?;
        debug!(target: targets::BRIDGE, "Received {} chars", body.response.len());
        Ok(body.response)
    }

    /// Sends a structured prompt (`{"messages": [...]}`) to the backend.
    ///
    /// The first `system` message becomes the system text and the first
    /// `user` message the prompt. Malformed input yields
    /// `"Error: Invalid prompt format"` or `"Error: Missing user message"`.
    #[must_use]
    pub fn process_prompt(&self, prompt: &Value) -> String {
        match extract_prompt(prompt) {
            Ok((system, user)) => self.generate(user, system),
            Err(message) => message.to_string(),
        }
    }
}

/// Picks the system and user texts out of a prompt value.
fn extract_prompt(prompt: &Value) -> Result<(Option<&str>, &str), &'static str> {
    let messages = prompt
        .as_object()
        .and_then(|obj| obj.get("messages"))
        .ok_or("Error: Invalid prompt format")?;
    let messages = messages.as_array().map(Vec::as_slice).unwrap_or_default();

    let first_with_role = |role: &str| {
        messages
            .iter()
            .find(|m| m.get("role").and_then(Value::as_str) == Some(role))
    };
    let user = first_with_role("user")
        .and_then(text_of)
        .ok_or("Error: Missing user message")?;
    let system = first_with_role("system").and_then(text_of);
    Ok((system, user))
}

fn text_of(message: &Value) -> Option<&str> {
    message.get("content")?.get("text")?.as_str()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::io::{BufRead, BufReader, Read, Write};
    use std::net::TcpListener;
    use std::thread;

    /// Serves one HTTP request and hands back its raw body.
    fn stub_server(status: &str, body: &str) -> (String, thread::JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let url = format!("http://{}", listener.local_addr().unwrap());
        let status = status.to_string();
        let body = body.to_string();
        let handle = thread::spawn(move || {
            let (stream, _) = listener.accept().unwrap();
            let mut reader = BufReader::new(stream.try_clone().unwrap());
            let mut content_length = 0;
            loop {
                let mut line = String::new();
                reader.read_line(&mut line).unwrap();
                if line == "\r\n" || line.is_empty() {
                    break;
                }
                if let Some((name, value)) = line.split_once(':') {
                    if name.eq_ignore_ascii_case("content-length") {
                        content_length = value.trim().parse().unwrap();
                    }
                }
            }
            let mut request_body = vec![0; content_length];
            reader.read_exact(&mut request_body).unwrap();

            let mut stream = stream;
            write!(
                stream,
                "HTTP/1.1 {status}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
                body.len()
            )
            .unwrap();
            String::from_utf8(request_body).unwrap()
        });
        (url, handle)
    }

    fn prompt(messages: Value) -> Value {
        json!({"messages": messages})
    }

    #[test]
    fn rejects_non_object_prompt() {
        let client = OllamaClient::default();
        assert_eq!(client.process_prompt(&json!("hi")), "Error: Invalid prompt format");
        assert_eq!(client.process_prompt(&json!({"text": "hi"})), "Error: Invalid prompt format");
        assert_eq!(client.process_prompt(&json!([1, 2])), "Error: Invalid prompt format");
    }

    #[test]
    fn rejects_missing_user_message() {
        let client = OllamaClient::default();
        let system_only = prompt(json!([
            {"role": "system", "content": {"type": "text", "text": "be nice"}}
        ]));
        assert_eq!(client.process_prompt(&system_only), "Error: Missing user message");

        let no_text = prompt(json!([{"role": "user", "content": {"type": "text"}}]));
        assert_eq!(client.process_prompt(&no_text), "Error: Missing user message");

        assert_eq!(client.process_prompt(&prompt(json!([]))), "Error: Missing user message");
    }

    #[test]
    fn extracts_first_system_and_user() {
        let value = prompt(json!([
            {"role": "user", "content": {"type": "text", "text": "first"}},
            {"role": "system", "content": {"type": "text", "text": "frame"}},
            {"role": "user", "content": {"type": "text", "text": "second"}},
        ]));
        assert_eq!(extract_prompt(&value), Ok((Some("frame"), "first")));
    }

    #[test]
    fn posts_generate_request() {
        let (url, server) = stub_server("200 OK", r#"{"response":"Salve!","done":true}"#);
        let client = OllamaClient::new(url, "tiny");

        let value = prompt(json!([
            {"role": "system", "content": {"type": "text", "text": "frame"}},
            {"role": "user", "content": {"type": "text", "text": "hello"}},
        ]));
        assert_eq!(client.process_prompt(&value), "Salve!");

        let sent: Value = serde_json::from_str(&server.join().unwrap()).unwrap();
        assert_eq!(
            sent,
            json!({"model": "tiny", "prompt": "hello", "system": "frame", "stream": false})
        );
    }

    #[test]
    fn omits_absent_system() {
        let (url, server) = stub_server("200 OK", r#"{"done":true}"#);
        let client = OllamaClient::new(url, "tiny");

        // A missing `response` field reads as empty output.
        assert_eq!(client.generate("hello", None), "");

        let sent: Value = serde_json::from_str(&server.join().unwrap()).unwrap();
        assert!(sent.get("system").is_none());
    }

    #[test]
    fn http_errors_become_error_strings() {
        let (url, server) = stub_server("500 Internal Server Error", r#"{"error":"boom"}"#);
        let client = OllamaClient::new(url, "tiny");
        let out = client.generate("hello", None);
        assert!(out.starts_with("Error: "), "{out}");
        server.join().unwrap();
    }

    #[test]
    fn unreachable_backend_becomes_error_string() {
        // Bind then drop to get a port nothing listens on.
        let port = TcpListener::bind("127.0.0.1:0")
            .unwrap()
            .local_addr()
            .unwrap()
            .port();
        let client = OllamaClient::new(format!("http://127.0.0.1:{port}"), "tiny")
            .with_timeout(Duration::from_secs(5));
        assert!(client.generate("hello", None).starts_with("Error: "));
    }

    #[test]
    fn api_url_tolerates_trailing_slash() {
        let client = OllamaClient::new("http://host:1/", "m");
        assert_eq!(client.api_url(), "http://host:1/api/generate");
    }
}

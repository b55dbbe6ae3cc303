use std::time::Duration;

use serde::Deserialize;
use serde_json::{json, Value};

use super::image::EncodedImage;
use crate::error::{Result, TallyError};
use crate::settings::VisionSettings;

/// A chat-completion backend that can read an image and answer in text.
pub trait VisionApi {
    fn complete(&self, image: &EncodedImage, prompt: &str) -> Result<String>;
}

#[derive(Debug, Deserialize)]
struct CompletionResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: Message,
}

#[derive(Debug, Deserialize)]
struct Message {
    #[serde(default)]
    content: Option<String>,
}

pub struct HttpVisionClient {
    http: reqwest::blocking::Client,
    endpoint: String,
    model: String,
    api_key: String,
}

impl HttpVisionClient {
    pub fn from_settings(settings: &VisionSettings) -> Result<Self> {
        let api_key = settings.resolve_api_key().ok_or(TallyError::MissingApiKey)?;
        let http = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(settings.timeout_secs))
            .build()?;
        Ok(Self {
            http,
            endpoint: settings.endpoint.clone(),
            model: settings.model.clone(),
            api_key,
        })
    }
}

impl VisionApi for HttpVisionClient {
    fn complete(&self, image: &EncodedImage, prompt: &str) -> Result<String> {
        let body = request_body(&self.model, image, prompt);
        tracing::info!(
            endpoint = %self.endpoint,
            model = %self.model,
            "sending receipt to vision API"
        );

        let resp = self
            .http
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()?;
        let status = resp.status();
        tracing::info!(status = status.as_u16(), "vision API responded");
        if !status.is_success() {
            let body = resp.text().unwrap_or_default();
            return Err(TallyError::Api {
                status: status.as_u16(),
                body,
            });
        }

        let text = resp.text()?;
        response_content(&text)
    }
}

pub fn request_body(model: &str, image: &EncodedImage, prompt: &str) -> Value {
    json!({
        "model": model,
        "temperature": 0,
        "messages": [{
            "role": "user",
            "content": [
                { "type": "text", "text": prompt },
                { "type": "image_url", "image_url": { "url": image.data_url() } }
            ]
        }]
    })
}

/// Pulls the answer text out of a chat-completion response body.
pub fn response_content(body: &str) -> Result<String> {
    let parsed: CompletionResponse = serde_json::from_str(body)
        .map_err(|e| TallyError::ParseResponse(format!("unexpected response shape: {e}")))?;
    parsed
        .choices
        .into_iter()
        .next()
        .and_then(|c| c.message.content)
        .filter(|c| !c.trim().is_empty())
        .ok_or_else(|| TallyError::ParseResponse("response has no message content".to_string()))
}

#[cfg(test)]
mod tests {
    use std::io::{BufRead, BufReader, Read, Write};
    use std::net::TcpListener;
    use std::thread::JoinHandle;

    use super::*;
    use crate::scanner::image::encode_bytes;

    /// Answers a single HTTP request and hands back the raw request it received.
    fn serve_once(status: &'static str, body: &'static str) -> (String, JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let url = format!("http://{}/v1/chat/completions", listener.local_addr().unwrap());
        let handle = std::thread::spawn(move || {
            let (stream, _) = listener.accept().unwrap();
            let mut reader = BufReader::new(stream);
            let mut head = String::new();
            loop {
                let mut line = String::new();
                reader.read_line(&mut line).unwrap();
                if line == "\r\n" || line.is_empty() {
                    break;
                }
                head.push_str(&line.to_ascii_lowercase());
            }
            let length = head
                .lines()
                .find_map(|l| l.strip_prefix("content-length:"))
                .and_then(|v| v.trim().parse::<usize>().ok())
                .unwrap_or(0);
            let mut request_body = vec![0; length];
            reader.read_exact(&mut request_body).unwrap();

            let response = format!(
                "HTTP/1.1 {status}\r\nContent-Type: application/json\r\n\
                 Content-Length: {}\r\nConnection: close\r\n\r\n{body}",
                body.len()
            );
            reader.get_mut().write_all(response.as_bytes()).unwrap();
            head + &String::from_utf8_lossy(&request_body)
        });
        (url, handle)
    }

    fn client_for(endpoint: String) -> HttpVisionClient {
        HttpVisionClient {
            http: reqwest::blocking::Client::builder()
                .no_proxy()
                .timeout(Duration::from_secs(5))
                .build()
                .unwrap(),
            endpoint,
            model: "test-model".into(),
            api_key: "test-key".into(),
        }
    }

    #[test]
    fn test_request_body_shape() {
        let img = encode_bytes("image/png", b"abc");
        let body = request_body("test-model", &img, "read this");
        assert_eq!(body["model"], "test-model");
        let content = &body["messages"][0]["content"];
        assert_eq!(content[0]["type"], "text");
        assert_eq!(content[0]["text"], "read this");
        assert_eq!(content[1]["image_url"]["url"], "data:image/png;base64,YWJj");
    }

    #[test]
    fn test_response_content() {
        let body = json!({
            "id": "x",
            "choices": [{
                "index": 0,
                "message": { "role": "assistant", "content": r#"[{"name":"Tea","mount":2}]"# }
            }]
        });
        assert_eq!(
            response_content(&body.to_string()).unwrap(),
            r#"[{"name":"Tea","mount":2}]"#
        );
    }

    #[test]
    fn test_response_without_choices() {
        assert!(matches!(
            response_content(r#"{"choices":[]}"#),
            Err(TallyError::ParseResponse(_))
        ));
        assert!(matches!(
            response_content(r#"{"choices":[{"message":{"content":null}}]}"#),
            Err(TallyError::ParseResponse(_))
        ));
        assert!(response_content("<html>bad gateway</html>").is_err());
    }

    #[test]
    fn test_complete_returns_message_content() {
        let (url, server) = serve_once(
            "200 OK",
            r#"{"choices":[{"message":{"content":"[{\"name\":\"Tea\",\"mount\":2}]"}}]}"#,
        );
        let img = encode_bytes("image/png", b"abc");
        let answer = client_for(url).complete(&img, "read this").unwrap();
        assert_eq!(answer, r#"[{"name":"Tea","mount":2}]"#);

        let request = server.join().unwrap();
        assert!(request.starts_with("post /v1/chat/completions"));
        assert!(request.contains("authorization: bearer test-key"));
        assert!(request.contains("data:image/png;base64,YWJj"));
        assert!(request.contains("\"model\":\"test-model\""));
    }

    #[test]
    fn test_complete_maps_error_status() {
        let (url, server) = serve_once("500 Internal Server Error", "upstream down");
        let img = encode_bytes("image/png", b"abc");
        let err = client_for(url).complete(&img, "read this").unwrap_err();
        assert!(matches!(
            err,
            TallyError::Api { status: 500, ref body } if body == "upstream down"
        ));
        server.join().unwrap();
    }

    #[test]
    fn test_complete_connection_refused_is_http_error() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let url = format!("http://{}/v1/chat/completions", listener.local_addr().unwrap());
        drop(listener);
        let img = encode_bytes("image/png", b"abc");
        assert!(matches!(
            client_for(url).complete(&img, "read this"),
            Err(TallyError::Http(_))
        ));
    }

    #[test]
    fn test_missing_key_fails_before_request() {
        if std::env::var(crate::settings::API_KEY_ENV).is_ok() {
            return;
        }
        let settings = VisionSettings::default();
        assert!(matches!(
            HttpVisionClient::from_settings(&settings),
            Err(TallyError::MissingApiKey)
        ));
    }
}

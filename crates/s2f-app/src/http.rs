//! HTTP client for the sun2flops run API.

use reqwest::blocking::{Client, Response};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use std::time::Duration;

use s2f_core::{FullConfig, RunHandle, RunRequest, RunStatus};
use s2f_results::{SweepArtifact, TimeseriesArtifact};

use crate::backend::{RunBackend, SweepFetch};
use crate::error::{AppError, AppResult};
use crate::settings::ClientSettings;

/// Files the service allows downloading for a run.
pub const DOWNLOADABLE_ARTIFACTS: [&str; 4] =
    ["timeseries.csv", "sweep.csv", "metrics.json", "config.json"];

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct HealthStatus {
    pub nsrdb_configured: bool,
    #[serde(default)]
    pub status: String,
}

#[derive(Deserialize)]
struct CreateRunResponse {
    run_id: RunHandle,
}

#[derive(Deserialize)]
struct ErrorBody {
    detail: String,
}

/// `RunBackend` over the service's REST routes.
#[derive(Debug, Clone)]
pub struct HttpBackend {
    client: Client,
    base_url: String,
}

impl HttpBackend {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> AppResult<Self> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    pub fn from_settings(settings: &ClientSettings) -> AppResult<Self> {
        Self::new(settings.base_url.clone(), settings.request_timeout())
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn get(&self, path: &str) -> AppResult<Response> {
        tracing::debug!(path, "GET");
        let response = self.client.get(self.url(path)).send()?;
        check_status(response)
    }

    fn get_json<T: DeserializeOwned>(&self, path: &str) -> AppResult<T> {
        Ok(self.get(path)?.json()?)
    }

    pub fn health(&self) -> AppResult<HealthStatus> {
        self.get_json("/api/health")
    }

    /// Service-side default configuration.
    pub fn defaults(&self) -> AppResult<FullConfig> {
        self.get_json("/api/defaults")
    }

    /// Raw bytes of one of [`DOWNLOADABLE_ARTIFACTS`].
    pub fn download(&self, handle: &RunHandle, artifact: &str) -> AppResult<Vec<u8>> {
        if !DOWNLOADABLE_ARTIFACTS.contains(&artifact) {
            return Err(AppError::InvalidInput(format!(
                "Invalid artifact: {} (expected one of {})",
                artifact,
                DOWNLOADABLE_ARTIFACTS.join(", ")
            )));
        }
        let response = self.get(&format!("/api/runs/{}/download/{}", handle, artifact))?;
        Ok(response.bytes()?.to_vec())
    }
}

/// Map non-success responses to `AppError::Http`, keeping the service's
/// `detail` message when the body carries one.
fn check_status(response: Response) -> AppResult<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().unwrap_or_default();
    let detail = serde_json::from_str::<ErrorBody>(&body)
        .map(|b| b.detail)
        .unwrap_or_else(|_| {
            if body.is_empty() {
                status.canonical_reason().unwrap_or("unknown").to_string()
            } else {
                body
            }
        });

    Err(AppError::Http {
        status: status.as_u16(),
        detail,
    })
}

impl RunBackend for HttpBackend {
    fn create_run(&self, request: &RunRequest) -> AppResult<RunHandle> {
        tracing::debug!(mode = %request.mode, "POST /api/runs");
        let response = self
            .client
            .post(self.url("/api/runs"))
            .json(request)
            .send()?;
        let created: CreateRunResponse = check_status(response)?.json()?;
        Ok(created.run_id)
    }

    fn run_status(&self, handle: &RunHandle) -> AppResult<RunStatus> {
        self.get_json(&format!("/api/runs/{}", handle))
    }

    fn timeseries(&self, handle: &RunHandle) -> AppResult<TimeseriesArtifact> {
        self.get_json(&format!("/api/runs/{}/timeseries", handle))
    }

    fn sweep(&self, handle: &RunHandle) -> SweepFetch {
        match self.get_json::<SweepArtifact>(&format!("/api/runs/{}/sweep", handle)) {
            Ok(sweep) => SweepFetch::Found(sweep),
            Err(err) if err.is_not_found() => SweepFetch::Absent,
            Err(err) => SweepFetch::Failed(err.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use s2f_core::{FullConfig, RunOptions, RunState};
    use std::io::{Read, Write};
    use std::net::{TcpListener, TcpStream};
    use std::thread;

    /// Answer one connection per canned `(status, reason, body)`, in order.
    fn serve(responses: Vec<(u16, &'static str, &'static str)>) -> HttpBackend {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        thread::spawn(move || {
            for (status, reason, body) in responses {
                let (mut stream, _) = listener.accept().unwrap();
                read_request(&mut stream);
                let response = format!(
                    "HTTP/1.1 {} {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                    status,
                    reason,
                    body.len(),
                    body
                );
                stream.write_all(response.as_bytes()).unwrap();
            }
        });

        HttpBackend {
            client: Client::builder()
                .no_proxy()
                .timeout(Duration::from_secs(5))
                .build()
                .unwrap(),
            base_url: format!("http://{}", addr),
        }
    }

    fn read_request(stream: &mut TcpStream) {
        let mut buf = Vec::new();
        let mut chunk = [0u8; 1024];
        loop {
            let n = stream.read(&mut chunk).unwrap();
            if n == 0 {
                return;
            }
            buf.extend_from_slice(&chunk[..n]);
            let Some(end) = buf.windows(4).position(|w| w == b"\r\n\r\n") else {
                continue;
            };
            let head = String::from_utf8_lossy(&buf[..end]).to_lowercase();
            let body_len = head
                .lines()
                .find_map(|line| line.strip_prefix("content-length:"))
                .and_then(|v| v.trim().parse::<usize>().ok())
                .unwrap_or(0);
            while buf.len() < end + 4 + body_len {
                let n = stream.read(&mut chunk).unwrap();
                if n == 0 {
                    break;
                }
                buf.extend_from_slice(&chunk[..n]);
            }
            return;
        }
    }

    fn request() -> RunRequest {
        RunRequest::single(FullConfig::default(), RunOptions::default())
    }

    #[test]
    fn sweep_not_found_is_absent() {
        let backend = serve(vec![(404, "Not Found", r#"{"detail": "Sweep results not found"}"#)]);
        assert_eq!(backend.sweep(&RunHandle::new("abc")), SweepFetch::Absent);
    }

    #[test]
    fn sweep_server_error_is_a_failure_with_detail() {
        let backend = serve(vec![(500, "Internal Server Error", r#"{"detail": "boom"}"#)]);
        match backend.sweep(&RunHandle::new("abc")) {
            SweepFetch::Failed(message) => {
                assert!(message.contains("500"), "unexpected message: {}", message);
                assert!(message.contains("boom"), "unexpected message: {}", message);
            }
            other => panic!("expected a failed sweep fetch, got {:?}", other),
        }
    }

    #[test]
    fn rejected_create_keeps_status_and_detail() {
        let backend = serve(vec![(
            422,
            "Unprocessable Entity",
            r#"{"detail": "pv.tilt_deg out of range"}"#,
        )]);
        match backend.create_run(&request()).unwrap_err() {
            AppError::Http { status, detail } => {
                assert_eq!(status, 422);
                assert_eq!(detail, "pv.tilt_deg out of range");
            }
            other => panic!("expected an HTTP error, got {:?}", other),
        }
    }

    #[test]
    fn error_without_detail_falls_back_to_body() {
        let backend = serve(vec![(503, "Service Unavailable", "")]);
        match backend.run_status(&RunHandle::new("abc")).unwrap_err() {
            AppError::Http { status, detail } => {
                assert_eq!(status, 503);
                assert_eq!(detail, "Service Unavailable");
            }
            other => panic!("expected an HTTP error, got {:?}", other),
        }
    }

    #[test]
    fn create_then_status_round_trip() {
        let backend = serve(vec![
            (200, "OK", r#"{"run_id": "run-42"}"#),
            (
                200,
                "OK",
                r#"{"status": "running", "progress": 40, "message": "Simulating 2021"}"#,
            ),
        ]);
        let handle = backend.create_run(&request()).unwrap();
        assert_eq!(handle, RunHandle::new("run-42"));

        let status = backend.run_status(&handle).unwrap();
        assert_eq!(status.status, RunState::Running);
        assert_eq!(status.progress, 40);
    }

    #[test]
    fn base_url_trailing_slash_is_trimmed() {
        let backend = HttpBackend::new("http://localhost:8000/", Duration::from_secs(1)).unwrap();
        assert_eq!(backend.base_url(), "http://localhost:8000");
        assert_eq!(
            backend.url("/api/runs/abc"),
            "http://localhost:8000/api/runs/abc"
        );
    }

    #[test]
    fn unknown_download_is_rejected_before_any_request() {
        // Nothing listens on port 9; the name check must fail first.
        let backend = HttpBackend::new("http://127.0.0.1:9", Duration::from_millis(50)).unwrap();
        let err = backend
            .download(&RunHandle::new("abc"), "../status.json")
            .unwrap_err();
        assert!(matches!(err, AppError::InvalidInput(_)));
    }

    #[test]
    fn unreachable_service_is_a_transport_error() {
        let backend = HttpBackend::new("http://127.0.0.1:9", Duration::from_millis(200)).unwrap();
        let err = backend.run_status(&RunHandle::new("abc")).unwrap_err();
        assert!(matches!(err, AppError::Transport(_)));

        match backend.sweep(&RunHandle::new("abc")) {
            SweepFetch::Failed(_) => {}
            other => panic!("expected a failed sweep fetch, got {:?}", other),
        }
    }
}

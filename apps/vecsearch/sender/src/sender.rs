use clap::ValueEnum;
use futures::future::join_all;
use serde_json::{Value, json};
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;
use tokio::net::TcpStream;
use tracing::{error, info, warn};

const PROBE_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Debug, Error)]
pub enum SenderError {
    #[error("Failed to build HTTP client: {0}")]
    Client(#[from] reqwest::Error),

    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid JSON in {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

impl SenderError {
    fn io(path: &Path, source: std::io::Error) -> Self {
        SenderError::Io {
            path: path.to_path_buf(),
            source,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum Endpoint {
    Insert,
    Search,
    Delete,
}

impl Endpoint {
    pub fn path(&self) -> &'static str {
        match self {
            Endpoint::Insert => "insert",
            Endpoint::Search => "search",
            Endpoint::Delete => "delete",
        }
    }
}

/// Outcome counts of one run
#[derive(Debug, Default, PartialEq, Eq)]
pub struct Summary {
    pub succeeded: usize,
    pub failed: usize,
}

pub struct Sender {
    client: reqwest::Client,
    host: String,
    port: u16,
    endpoint: Endpoint,
    count: usize,
    measure_type: String,
}

/// `true` when a TCP connection to `host:port` opens within `timeout`.
pub async fn is_host_available(host: &str, port: u16, timeout: Duration) -> bool {
    match tokio::time::timeout(timeout, TcpStream::connect((host, port))).await {
        Ok(Ok(_)) => true,
        Ok(Err(e)) => {
            error!("Error checking host {}:{}: {}", host, port, e);
            false
        }
        Err(_) => {
            error!("Error checking host {}:{}: timed out", host, port);
            false
        }
    }
}

impl Sender {
    pub fn new(host: impl Into<String>, port: u16, endpoint: Endpoint) -> Result<Self, SenderError> {
        Ok(Self {
            client: reqwest::Client::builder().build()?,
            host: host.into(),
            port,
            endpoint,
            count: 10,
            measure_type: "l2".to_string(),
        })
    }

    pub fn with_search_params(mut self, count: usize, measure_type: impl Into<String>) -> Self {
        self.count = count;
        self.measure_type = measure_type.into();
        self
    }

    fn url(&self) -> String {
        format!("http://{}:{}/{}", self.host, self.port, self.endpoint.path())
    }

    /// Search requests carry `count` and `measure_type` in the body.
    pub fn prepare_body(&self, mut body: Value) -> Value {
        if self.endpoint == Endpoint::Search {
            if let Value::Object(map) = &mut body {
                map.insert("count".to_string(), json!(self.count));
                map.insert("measure_type".to_string(), json!(self.measure_type));
            }
        }
        body
    }

    /// Post `body`; the parsed response, or `{"error": ...}` on failure.
    pub async fn send(&self, body: Value) -> Result<Value, Value> {
        let body = self.prepare_body(body);

        let response = self
            .client
            .post(self.url())
            .json(&body)
            .send()
            .await
            .map_err(|e| json!({ "error": e.to_string() }))?;

        let status = response.status();
        if !status.is_success() {
            // Keep the server's error envelope; it names the failing field.
            let text = response.text().await.unwrap_or_default();
            return Err(json!({ "error": format!("HTTP {status}: {text}") }));
        }

        response
            .json::<Value>()
            .await
            .map_err(|e| json!({ "error": e.to_string() }))
    }

    /// Send one file and write the outcome to `output`. Returns whether the
    /// request succeeded.
    pub async fn process_file(&self, input: &Path, output: &Path) -> Result<bool, SenderError> {
        let raw = tokio::fs::read_to_string(input)
            .await
            .map_err(|e| SenderError::io(input, e))?;
        let body: Value = serde_json::from_str(&raw).map_err(|source| SenderError::Json {
            path: input.to_path_buf(),
            source,
        })?;

        let (outcome, ok) = match self.send(body).await {
            Ok(response) => (response, true),
            Err(error_body) => (error_body, false),
        };
        write_json(output, &outcome).await?;

        if ok {
            info!("Response saved to {}", output.display());
        } else {
            error!("Error sending {}. Details saved to {}", input.display(), output.display());
        }
        Ok(ok)
    }

    /// Process a file, or every `*.json` file in a directory concurrently.
    ///
    /// Nothing is sent when the host does not accept TCP connections; the
    /// error is written to the output instead.
    pub async fn process(&self, input: &Path, output: &Path) -> Result<Summary, SenderError> {
        let jobs = plan(input, output).await?;

        if !is_host_available(&self.host, self.port, PROBE_TIMEOUT).await {
            let unavailable = json!({
                "error": format!("Host {}:{} is not available", self.host, self.port)
            });
            for (_, out) in &jobs {
                write_json(out, &unavailable).await?;
            }
            error!("Host {}:{} is not available. Data not sent.", self.host, self.port);
            return Ok(Summary {
                succeeded: 0,
                failed: jobs.len(),
            });
        }

        let results = join_all(jobs.iter().map(|(input, output)| self.process_file(input, output))).await;

        let mut summary = Summary::default();
        for ((input, _), result) in jobs.iter().zip(results) {
            match result {
                Ok(true) => summary.succeeded += 1,
                Ok(false) => summary.failed += 1,
                Err(e) => {
                    warn!("Skipping {}: {}", input.display(), e);
                    summary.failed += 1;
                }
            }
        }
        Ok(summary)
    }
}

/// `(input, output)` pairs. A directory maps `x.json` to `output/x_response.json`.
async fn plan(input: &Path, output: &Path) -> Result<Vec<(PathBuf, PathBuf)>, SenderError> {
    let metadata = tokio::fs::metadata(input)
        .await
        .map_err(|e| SenderError::io(input, e))?;

    if !metadata.is_dir() {
        return Ok(vec![(input.to_path_buf(), output.to_path_buf())]);
    }

    tokio::fs::create_dir_all(output)
        .await
        .map_err(|e| SenderError::io(output, e))?;

    let mut entries = tokio::fs::read_dir(input)
        .await
        .map_err(|e| SenderError::io(input, e))?;

    let mut jobs = Vec::new();
    while let Some(entry) = entries
        .next_entry()
        .await
        .map_err(|e| SenderError::io(input, e))?
    {
        let path = entry.path();
        let is_json = path.extension().is_some_and(|ext| ext == "json");
        if !is_json || !path.is_file() {
            continue;
        }
        if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
            let target = output.join(format!("{stem}_response.json"));
            jobs.push((path, target));
        }
    }
    jobs.sort();
    Ok(jobs)
}

async fn write_json(path: &Path, value: &Value) -> Result<(), SenderError> {
    let text = serde_json::to_string_pretty(value).map_err(|source| SenderError::Json {
        path: path.to_path_buf(),
        source,
    })?;
    tokio::fs::write(path, text)
        .await
        .map_err(|e| SenderError::io(path, e))
}

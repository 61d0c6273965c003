//! HTTP delivery of the host inventory document

use std::fmt;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use chrono::Local;
use reqwest::header::CONTENT_TYPE;
use reqwest::{Client, StatusCode};
use serde::Serialize;
use tokio::io::AsyncWriteExt;
use tracing::{debug, error, info, instrument, warn};
use url::Url;

use hostagent_api::HostData;

use crate::config::DeliveryConfig;
use crate::error::{ClientError, Result};

/// Result of one delivery attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeliveryOutcome {
    /// The collector answered 2xx
    Success,
    /// Non-2xx answer, transport error, or the body could not be built
    Failed,
}

impl DeliveryOutcome {
    #[must_use]
    pub fn is_success(self) -> bool {
        self == DeliveryOutcome::Success
    }
}

impl fmt::Display for DeliveryOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DeliveryOutcome::Success => write!(f, "SUCCESS"),
            DeliveryOutcome::Failed => write!(f, "FAILED"),
        }
    }
}

/// Posts documents to `{url}/hosts`
#[derive(Debug, Clone)]
pub struct DeliveryClient {
    client: Client,
    endpoint: Url,
    user: String,
    password: String,
    verbose: bool,
    diagnostic_dir: PathBuf,
}

impl DeliveryClient {
    /// Create a client from delivery settings
    ///
    /// # Errors
    /// Returns an error if the URL is invalid or the HTTP client cannot be built.
    pub fn new(config: &DeliveryConfig) -> Result<Self> {
        let endpoint = hosts_endpoint(&config.url)?;

        let mut builder = Client::builder()
            .timeout(config.timeout())
            .connect_timeout(config.connect_timeout());

        if !config.enable_server_validation {
            warn!(
                endpoint = %endpoint,
                "server certificate validation disabled, collector identity is not verified"
            );
            builder = builder.danger_accept_invalid_certs(true);
        }

        Ok(Self {
            client: builder.build()?,
            endpoint,
            user: config.user.clone(),
            password: config.password.clone(),
            verbose: config.verbose,
            diagnostic_dir: config.diagnostic_dir(),
        })
    }

    /// Full URL documents are posted to
    #[must_use]
    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    /// Deliver one document, exactly one request, no retry
    ///
    /// Every failure is logged here; the returned outcome is informational.
    #[instrument(skip(self, data), fields(hostname = %data.hostname))]
    pub async fn send(&self, data: &HostData) -> DeliveryOutcome {
        info!(endpoint = %self.endpoint, "sending data");

        let mut outcome = DeliveryOutcome::Failed;

        match self.post(data).await {
            Ok(status) => {
                info!(status = %status, "response status");
                outcome = DeliveryOutcome::Success;
            }
            Err(ClientError::Rejected { status }) => {
                warn!(status, "response status");
            }
            Err(e) => {
                error!(error = %e, "error sending data");
            }
        }

        info!(result = %outcome, "sending result");
        outcome
    }

    /// Write a pretty-printed copy of `data` into the diagnostic directory
    ///
    /// The file is named after the current second; a numeric suffix is added
    /// when that name is taken, so earlier copies are never overwritten.
    ///
    /// # Errors
    /// Returns an error if the document cannot be serialized or the file
    /// cannot be written.
    pub async fn dump(&self, data: &HostData) -> Result<PathBuf> {
        let body = pretty(data)?;
        let stamp = Local::now().format("%y-%m-%d-%H:%M:%S").to_string();

        for attempt in 0..MAX_DUMP_ATTEMPTS {
            let path = dump_path(&self.diagnostic_dir, &stamp, attempt);
            let opened = tokio::fs::OpenOptions::new()
                .write(true)
                .create_new(true)
                .open(&path)
                .await;

            match opened {
                Ok(mut file) => {
                    file.write_all(&body).await?;
                    file.flush().await?;
                    return Ok(path);
                }
                Err(e) if e.kind() == ErrorKind::AlreadyExists => continue,
                Err(e) => return Err(e.into()),
            }
        }

        Err(std::io::Error::new(
            ErrorKind::AlreadyExists,
            format!("no free diagnostic file name for {stamp}"),
        )
        .into())
    }

    async fn post(&self, data: &HostData) -> Result<StatusCode> {
        let body = serde_json::to_vec(data)?;
        debug!(hostdata = %String::from_utf8_lossy(&body), "serialized document");

        if self.verbose {
            match self.dump(data).await {
                Ok(path) => debug!(path = %path.display(), "hostdata pretty-printed on file"),
                Err(e) => warn!(error = %e, "can't write hostdata diagnostic copy"),
            }
        }

        // The response, and with it the connection, is released when this
        // scope ends on every path.
        let response = self
            .client
            .post(self.endpoint.clone())
            .basic_auth(&self.user, Some(&self.password))
            .header(CONTENT_TYPE, "application/json")
            .body(body)
            .send()
            .await?;

        let status = response.status();
        if status.is_success() {
            Ok(status)
        } else {
            Err(ClientError::Rejected {
                status: status.as_u16(),
            })
        }
    }
}

/// `{base}/hosts`, keeping any path prefix of `base`
fn hosts_endpoint(base: &str) -> Result<Url> {
    Ok(Url::parse(&format!("{}/hosts", base.trim_end_matches('/')))?)
}

/// Diagnostic copies written within one second before giving up
const MAX_DUMP_ATTEMPTS: u32 = 100;

fn dump_path(dir: &Path, stamp: &str, attempt: u32) -> PathBuf {
    if attempt == 0 {
        dir.join(format!("hostagent-hostdata-{stamp}.json"))
    } else {
        dir.join(format!("hostagent-hostdata-{stamp}-{attempt}.json"))
    }
}

fn pretty(data: &HostData) -> Result<Vec<u8>> {
    let mut buf = Vec::new();
    let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
    let mut serializer = serde_json::Serializer::with_formatter(&mut buf, formatter);
    data.serialize(&mut serializer)?;
    Ok(buf)
}

//! Romeria Media Uploads
//!
//! Validated attachments go to Cloudinary before the testimony is
//! published. We take the base64 payload the form posted, wrap it in a
//! data URL, sign the request, and hand back the hosted URL plus whatever
//! metadata the provider reports.
//!
//! Images use the image pipeline; video and audio both go through the
//! video pipeline, which transcodes audio on the provider side. A batch
//! either aborts on the first failure or records failures and carries on,
//! depending on [`MediaConfig::fail_on_upload_error`].

mod config;
mod error;
mod sign;

use std::collections::BTreeMap;
use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{info, warn};

use submission::{MediaFile, MediaKind};

pub use crate::config::{MediaConfig, MediaConfigError};
pub use crate::error::UploadError;

// Global HTTP client with connection pooling
static HTTP_CLIENT: Lazy<reqwest::Client> = Lazy::new(|| {
    reqwest::Client::builder()
        .timeout(Duration::from_secs(30))
        .connect_timeout(Duration::from_secs(10))
        .pool_max_idle_per_host(32)
        .build()
        .expect("Failed to build HTTP client")
});

/// A successfully hosted attachment.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct UploadedMedia {
    /// HTTPS URL of the hosted file.
    pub url: String,
    /// Kind the file was routed as.
    pub kind: MediaKind,
    /// Size in bytes, from the provider when reported.
    pub byte_size: u64,
    /// Duration in seconds for video and audio, when the provider
    /// reports it.
    pub duration_seconds: Option<f64>,
}

/// One attachment that failed to upload in continue-on-error mode.
#[derive(Debug, Clone, PartialEq)]
pub struct FailedUpload {
    /// Position of the file in the submitted media list.
    pub index: usize,
    /// Original file name, if the form sent one.
    pub name: Option<String>,
    /// Why the upload failed.
    pub error: UploadError,
}

/// Outcome of uploading a submission's media list.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UploadReport {
    /// Files that are now hosted.
    pub uploaded: Vec<UploadedMedia>,
    /// Files that failed, in submission order.
    pub failures: Vec<FailedUpload>,
}

impl UploadReport {
    /// True when every file in the batch was uploaded.
    pub fn all_succeeded(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Maps a declared MIME type onto the provider's resource pipeline.
///
/// Audio rides the video pipeline. Types outside the known kinds fall
/// back to the raw pipeline, though validated submissions never carry
/// those.
pub fn resource_type_for_mime(mime: &str) -> &'static str {
    match MediaKind::from_mime(mime) {
        Some(MediaKind::Image) => "image",
        Some(MediaKind::Video) | Some(MediaKind::Audio) => "video",
        None => "raw",
    }
}

/// Uploads a single attachment.
///
/// Returns the hosted URL and provider-reported metadata on success. The
/// provider's error message is surfaced in [`UploadError::Provider`] but
/// the raw body is never logged.
pub async fn upload(media: &MediaFile, cfg: &MediaConfig) -> Result<UploadedMedia, UploadError> {
    let start = Instant::now();

    let Some(kind) = media.kind() else {
        warn!(
            mime_type = %media.mime_type,
            "media_upload_failure"
        );
        return Err(UploadError::UnsupportedMediaType {
            mime: media.mime_type.clone(),
        });
    };
    let resource_type = resource_type_for_mime(&media.mime_type);

    match upload_inner(media, kind, resource_type, cfg).await {
        Ok(uploaded) => {
            info!(
                resource_type,
                byte_size = uploaded.byte_size,
                elapsed_micros = start.elapsed().as_micros() as u64,
                "media_upload_success"
            );
            Ok(uploaded)
        }
        Err(err) => {
            warn!(
                resource_type,
                error = %err,
                elapsed_micros = start.elapsed().as_micros() as u64,
                "media_upload_failure"
            );
            Err(err)
        }
    }
}

/// Uploads a submission's media list in order.
///
/// In abort mode the first failure is returned and later files are not
/// attempted. In continue mode failures are collected in the report and
/// the remaining files still upload.
pub async fn upload_all(
    media: &[MediaFile],
    cfg: &MediaConfig,
) -> Result<UploadReport, UploadError> {
    let start = Instant::now();

    let mut report = UploadReport::default();
    for (index, file) in media.iter().enumerate() {
        match upload(file, cfg).await {
            Ok(uploaded) => report.uploaded.push(uploaded),
            Err(err) if cfg.fail_on_upload_error => {
                warn!(
                    index,
                    error = %err,
                    elapsed_micros = start.elapsed().as_micros() as u64,
                    "media_batch_aborted"
                );
                return Err(err);
            }
            Err(err) => report.failures.push(FailedUpload {
                index,
                name: file.name.clone(),
                error: err,
            }),
        }
    }

    info!(
        media_count = media.len(),
        uploaded = report.uploaded.len(),
        failed = report.failures.len(),
        elapsed_micros = start.elapsed().as_micros() as u64,
        "media_batch_complete"
    );
    Ok(report)
}

async fn upload_inner(
    media: &MediaFile,
    kind: MediaKind,
    resource_type: &str,
    cfg: &MediaConfig,
) -> Result<UploadedMedia, UploadError> {
    cfg.validate()
        .map_err(|e| UploadError::Config(e.to_string()))?;

    let form = build_form(media, resource_type, cfg, unix_timestamp());
    let url = cfg.upload_url(resource_type);

    let response = HTTP_CLIENT
        .post(&url)
        .timeout(Duration::from_secs(cfg.timeout_secs))
        .form(&form)
        .send()
        .await
        .map_err(|e| UploadError::Transport(format!("HTTP request failed: {e}")))?;

    let status = response.status();
    let body = response
        .json::<Value>()
        .await
        .map_err(|e| UploadError::InvalidResponse(format!("body was not JSON: {e}")))?;

    if !status.is_success() {
        return Err(UploadError::Provider {
            status: status.as_u16(),
            detail: provider_error_detail(&body),
        });
    }

    parse_upload_body(&body, kind, media)
}

/// Builds the urlencoded form for one upload request.
///
/// Signed mode signs `folder`, `resource_type`, and `timestamp`; `file`
/// and `api_key` are deliberately outside the signed set. Unsigned mode
/// sends the preset name instead.
fn build_form(
    media: &MediaFile,
    resource_type: &str,
    cfg: &MediaConfig,
    timestamp: u64,
) -> Vec<(&'static str, String)> {
    let mut form = vec![("file", data_url(media))];

    if let Some(preset) = cfg.upload_preset.as_deref().filter(|p| !p.trim().is_empty()) {
        form.push(("upload_preset", preset.to_string()));
        form.push(("folder", cfg.folder.clone()));
        form.push(("resource_type", resource_type.to_string()));
        return form;
    }

    let mut signed = BTreeMap::new();
    signed.insert("folder", cfg.folder.clone());
    signed.insert("resource_type", resource_type.to_string());
    signed.insert("timestamp", timestamp.to_string());
    let signature = sign::sign_params(&signed, &cfg.api_secret);

    form.push(("api_key", cfg.api_key.clone()));
    for (key, value) in signed {
        form.push((key, value));
    }
    form.push(("signature", signature));
    form
}

/// Wraps the base64 payload in a data URL, unless the form already sent
/// one.
fn data_url(media: &MediaFile) -> String {
    if media.data.starts_with("data:") {
        media.data.clone()
    } else {
        format!("data:{};base64,{}", media.mime_type, media.data)
    }
}

fn parse_upload_body(
    body: &Value,
    kind: MediaKind,
    media: &MediaFile,
) -> Result<UploadedMedia, UploadError> {
    let url = body
        .get("secure_url")
        .and_then(Value::as_str)
        .ok_or_else(|| UploadError::InvalidResponse("missing secure_url".to_string()))?;

    let byte_size = body
        .get("bytes")
        .and_then(Value::as_u64)
        .unwrap_or_else(|| media.estimated_bytes());

    Ok(UploadedMedia {
        url: url.to_string(),
        kind,
        byte_size,
        duration_seconds: body.get("duration").and_then(Value::as_f64),
    })
}

fn provider_error_detail(body: &Value) -> String {
    body.get("error")
        .and_then(|e| e.get("message"))
        .and_then(Value::as_str)
        .unwrap_or("no error detail in response")
        .to_string()
}

fn unix_timestamp() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs()
}

use crate::error::ExportError;
use crate::gate::{ExportOutcome, PdfArtifact, UnknownReason};
use rd_core::{import_payload, ReportDocument, SharedStr};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportRequest {
    pub document: ReportDocument,
}

impl ExportRequest {
    /// Accepts `{ "document": ... }` or a bare document.
    pub fn from_json(raw: &str) -> serde_json::Result<Self> {
        import_payload(raw).map(|document| Self { document })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PdfResponse {
    pub filename: String,
    pub body: Vec<u8>,
}

impl PdfResponse {
    pub const CONTENT_TYPE: &'static str = "application/pdf";

    pub fn content_disposition(&self) -> String {
        format!("attachment; filename=\"{}\"", self.filename.replace(['"', '\\'], "_"))
    }

    pub fn headers(&self) -> [(&'static str, String); 2] {
        [
            ("Content-Type", Self::CONTENT_TYPE.to_string()),
            ("Content-Disposition", self.content_disposition()),
        ]
    }
}

impl From<PdfArtifact> for PdfResponse {
    fn from(artifact: PdfArtifact) -> Self {
        Self { filename: artifact.filename, body: artifact.bytes }
    }
}

/// Static markup returned for inspection without rendering a PDF.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MarkupResponse {
    pub body: String,
}

impl MarkupResponse {
    pub const CONTENT_TYPE: &'static str = "text/html; charset=utf-8";
    pub const CACHE_CONTROL: &'static str = "no-store";

    pub fn headers(&self) -> [(&'static str, &'static str); 2] {
        [("Content-Type", Self::CONTENT_TYPE), ("Cache-Control", Self::CACHE_CONTROL)]
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FailureResponse {
    pub message: String,
    pub retryable: bool,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub overflowing_pages: Vec<SharedStr>,
}

impl FailureResponse {
    pub fn blocked(overflowing: Vec<SharedStr>) -> Self {
        let list: Vec<&str> = overflowing.iter().map(|p| p.as_ref()).collect();
        Self {
            message: format!("pages exceed the printable area: {}", list.join(", ")),
            retryable: false,
            overflowing_pages: overflowing,
        }
    }

    pub fn not_measured(reason: UnknownReason) -> Self {
        let message = match reason {
            UnknownReason::NotMeasured => "layout has not been measured yet",
            UnknownReason::Stale => "layout measurements are out of date",
            UnknownReason::Empty => "document has no pages",
        };
        Self { message: message.to_string(), retryable: reason != UnknownReason::Empty, overflowing_pages: Vec::new() }
    }

    pub fn busy() -> Self {
        Self { message: "an export is already in progress".to_string(), retryable: true, overflowing_pages: Vec::new() }
    }

    pub fn from_error(err: &ExportError) -> Self {
        Self { message: err.to_string(), retryable: err.is_retryable(), overflowing_pages: Vec::new() }
    }
}

/// Maps an export result onto the response the caller sends back.
pub fn respond(result: Result<ExportOutcome, ExportError>) -> Result<PdfResponse, FailureResponse> {
    match result {
        Ok(ExportOutcome::Exported(artifact)) => Ok(artifact.into()),
        Ok(ExportOutcome::Blocked { overflowing }) => Err(FailureResponse::blocked(overflowing)),
        Ok(ExportOutcome::NotMeasured(reason)) => Err(FailureResponse::not_measured(reason)),
        Ok(ExportOutcome::Busy) => Err(FailureResponse::busy()),
        Err(err) => Err(FailureResponse::from_error(&err)),
    }
}

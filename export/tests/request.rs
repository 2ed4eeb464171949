use rd_export::{
    respond, split_command_line, ConfigError, ExportConfig, ExportError, ExportOutcome, ExportRequest,
    FailureResponse, MarkupResponse, PdfArtifact, PdfResponse, RendererError, UnknownReason,
    DEFAULT_RENDER_TIMEOUT_MS,
};
use std::sync::Arc;
use std::time::Duration;

const DOCUMENT: &str = r#"{"id":"rep-7","title":"Weekly","createdAt":"2024-05-01T09:00:00Z","pages":[
    {"id":"p1","blocks":[{"type":"text","id":"t1","content":"Hello"}]}
]}"#;

#[test]
fn request_accepts_wrapped_and_bare_documents() {
    let wrapped = ExportRequest::from_json(&format!(r#"{{"document":{}}}"#, DOCUMENT)).unwrap();
    let bare = ExportRequest::from_json(DOCUMENT).unwrap();
    assert_eq!(wrapped, bare);
    assert_eq!(bare.document.export_stem(), "rep-7");
    assert!(ExportRequest::from_json("{\"document\":").is_err());
}

#[test]
fn pdf_response_headers() {
    let response = PdfResponse::from(PdfArtifact { filename: "rep-7.pdf".into(), bytes: b"%PDF".to_vec() });
    let [content_type, disposition] = response.headers();
    assert_eq!(content_type, ("Content-Type", "application/pdf".to_string()));
    assert_eq!(disposition, ("Content-Disposition", "attachment; filename=\"rep-7.pdf\"".to_string()));

    let odd = PdfResponse { filename: "a\"b\\c.pdf".into(), body: Vec::new() };
    assert_eq!(odd.content_disposition(), "attachment; filename=\"a_b_c.pdf\"");
}

#[test]
fn markup_response_is_never_cached() {
    let response = MarkupResponse { body: "<!DOCTYPE html>".into() };
    assert_eq!(response.headers(), [("Content-Type", "text/html; charset=utf-8"), ("Cache-Control", "no-store")]);
}

#[test]
fn outcomes_map_to_responses() {
    let ok = respond(Ok(ExportOutcome::Exported(PdfArtifact { filename: "report.pdf".into(), bytes: vec![1] })));
    assert_eq!(ok.unwrap().filename, "report.pdf");

    let blocked = respond(Ok(ExportOutcome::Blocked { overflowing: vec![Arc::from("p2"), Arc::from("p4")] }))
        .unwrap_err();
    assert!(!blocked.retryable);
    assert!(blocked.message.contains("p2, p4"), "{}", blocked.message);
    let json = serde_json::to_value(&blocked).unwrap();
    assert_eq!(json["overflowingPages"], serde_json::json!(["p2", "p4"]));

    let stale = respond(Ok(ExportOutcome::NotMeasured(UnknownReason::Stale))).unwrap_err();
    assert!(stale.retryable);
    assert!(serde_json::to_value(&stale).unwrap().get("overflowingPages").is_none());
    assert!(!FailureResponse::not_measured(UnknownReason::Empty).retryable);

    assert_eq!(respond(Ok(ExportOutcome::Busy)).unwrap_err(), FailureResponse::busy());

    let timeout = respond(Err(ExportError::Timeout(Duration::from_secs(30)))).unwrap_err();
    assert!(timeout.retryable);
    let closed = respond(Err(RendererError::Closed.into())).unwrap_err();
    assert!(!closed.retryable);
    assert_eq!(closed.message, "renderer is shut down");
}

#[test]
fn config_defaults_and_json() {
    let defaults = ExportConfig::default();
    assert_eq!(defaults.render_timeout(), Duration::from_millis(DEFAULT_RENDER_TIMEOUT_MS));
    assert_eq!(defaults.observer.debounce_ms, 16);
    assert!(defaults.renderer_command.is_none());

    let config = ExportConfig::from_json_str(
        r#"{"renderTimeoutMs":500,"rendererCommand":["wkhtmltopdf","-","-"],"observer":{"debounceMs":4}}"#,
    )
    .unwrap();
    assert_eq!(config.render_timeout(), Duration::from_millis(500));
    assert_eq!(config.observer.debounce_ms, 4);
    assert_eq!(config.renderer_command.as_deref().map(|c| c.len()), Some(3));
    assert_eq!(config.geometry, defaults.geometry);

    assert!(matches!(ExportConfig::from_json_str("{"), Err(ConfigError::Json(_))));
    assert!(matches!(
        rd_export::RendererHandle::from_config(&defaults),
        Err(ConfigError::MissingRendererCommand)
    ));
}

#[test]
fn command_lines_split_on_whitespace() {
    assert_eq!(split_command_line("  "), None);
    assert_eq!(
        split_command_line(" chromium --headless  --print-to-pdf "),
        Some(vec!["chromium".to_string(), "--headless".to_string(), "--print-to-pdf".to_string()])
    );
}

use rd_core::{import_payload, validate};
use rd_engine::{measure_document, FlowLayout};
use rd_export::{respond, ExportConfig, ExportGate, RendererHandle};
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

const USAGE: &str = "Usage: rd_render <report.json> [--html <out.html>] [--pdf <out.pdf>]";

struct Args {
    input: PathBuf,
    html: Option<PathBuf>,
    pdf: Option<PathBuf>,
}

fn parse_args() -> Option<Args> {
    let mut args = std::env::args().skip(1);
    let input = PathBuf::from(args.next()?);
    let mut parsed = Args { input, html: None, pdf: None };
    while let Some(flag) = args.next() {
        match flag.as_str() {
            "--html" => parsed.html = Some(PathBuf::from(args.next()?)),
            "--pdf" => parsed.pdf = Some(PathBuf::from(args.next()?)),
            _ => return None,
        }
    }
    Some(parsed)
}

fn init_tracing() {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    init_tracing();
    let Some(args) = parse_args() else {
        eprintln!("{}", USAGE);
        return ExitCode::from(2);
    };
    let config = match ExportConfig::from_env() {
        Ok(config) => config,
        Err(err) => {
            eprintln!("config error: {}", err);
            return ExitCode::from(2);
        }
    };
    let raw = match std::fs::read_to_string(&args.input) {
        Ok(raw) => raw,
        Err(err) => {
            eprintln!("cannot read {}: {}", args.input.display(), err);
            return ExitCode::FAILURE;
        }
    };
    let doc = match import_payload(&raw) {
        Ok(doc) => doc,
        Err(err) => {
            eprintln!("import failed: {}", err);
            return ExitCode::FAILURE;
        }
    };
    for issue in validate(&doc) {
        tracing::warn!(page = issue.page_id(), "{}", issue);
    }

    let snapshot = measure_document(&mut FlowLayout::new(config.geometry), &doc);
    match serde_json::to_string_pretty(&snapshot.pages) {
        Ok(json) => println!("{}", json),
        Err(err) => eprintln!("cannot print metrics: {}", err),
    }

    let renderer = if args.pdf.is_some() {
        match RendererHandle::from_config(&config) {
            Ok(renderer) => Some(Arc::new(renderer)),
            Err(err) => {
                eprintln!("{}", err);
                return ExitCode::from(2);
            }
        }
    } else {
        None
    };
    let gate = ExportGate::new(
        renderer.clone().unwrap_or_else(|| Arc::new(RendererHandle::new(NoRenderer, config.render_timeout()))),
        config.geometry,
    );

    if let Some(path) = &args.html {
        if let Err(err) = std::fs::write(path, gate.markup(&doc)) {
            eprintln!("cannot write {}: {}", path.display(), err);
            return ExitCode::FAILURE;
        }
    }

    let mut code = ExitCode::SUCCESS;
    if let Some(path) = &args.pdf {
        match respond(gate.export(&doc, Some(&snapshot)).await) {
            Ok(pdf) => {
                if let Err(err) = std::fs::write(path, &pdf.body) {
                    eprintln!("cannot write {}: {}", path.display(), err);
                    code = ExitCode::FAILURE;
                } else {
                    tracing::info!(file = %pdf.filename, bytes = pdf.body.len(), "pdf written");
                }
            }
            Err(failure) => {
                match serde_json::to_string(&failure) {
                    Ok(json) => eprintln!("{}", json),
                    Err(_) => eprintln!("{}", failure.message),
                }
                code = ExitCode::from(3);
            }
        }
    }
    if let Some(renderer) = renderer {
        if let Err(err) = renderer.shutdown().await {
            tracing::warn!(%err, "renderer shutdown failed");
        }
    }
    code
}

/// Stands in when only markup is requested; never launched.
struct NoRenderer;

#[async_trait::async_trait]
impl rd_export::RendererFactory for NoRenderer {
    async fn launch(&self) -> Result<Arc<dyn rd_export::PdfRenderer>, rd_export::RendererError> {
        Err(rd_export::RendererError::Launch("no renderer configured".into()))
    }
}

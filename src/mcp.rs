use anyhow::{Context, Result};
use rmcp::{
    ServerHandler, ServiceExt,
    handler::server::{router::tool::ToolRouter, wrapper::Parameters},
    model::{ServerCapabilities, ServerInfo},
    schemars, tool, tool_router,
};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::commands::save_output;
use crate::page_range::parse_clicks;
use crate::pdf::{PdfDocument, RenderBackend};
use crate::selection::ExportOrder;
use crate::session::{
    document_name, ensure_pdf_extension, Session, SessionConfig, DEFAULT_THUMBNAIL_WIDTH,
};

// Request structs for tools

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct PathRequest {
    #[schemars(description = "Path to the PDF file")]
    pub path: String,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct PdfExtractRequest {
    #[schemars(description = "Path to the source PDF file")]
    pub path: String,
    #[schemars(
        description = "Page clicks, e.g. '2-5,9' or '3 +7'. 'N' toggles page N, '+N' selects every page from the last plain click to N, 'A-B' is 'A,+B'"
    )]
    pub clicks: String,
    #[schemars(description = "Output file path (default: <name>-extracted.pdf next to the source)")]
    pub output: Option<String>,
    #[schemars(description = "Keep pages in click order instead of document order (default: false)")]
    #[serde(default)]
    pub click_order: bool,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct PdfThumbnailRequest {
    #[schemars(description = "Path to the PDF file")]
    pub path: String,
    #[schemars(description = "Page number (1-indexed)")]
    pub page: u32,
    #[schemars(description = "Output PNG path")]
    pub output: String,
    #[schemars(description = "Target width in pixels (default: 300)")]
    #[serde(default = "default_width")]
    pub width: u32,
}

fn default_width() -> u32 {
    DEFAULT_THUMBNAIL_WIDTH
}

#[derive(Clone)]
pub struct PdfServer {
    #[allow(dead_code)]
    tool_router: ToolRouter<Self>,
    backend: Option<Arc<dyn RenderBackend>>,
}

impl PdfServer {
    pub fn new(backend: Option<Arc<dyn RenderBackend>>) -> Self {
        Self {
            tool_router: Self::tool_router(),
            backend,
        }
    }

    fn extract(&self, req: PdfExtractRequest) -> Result<ExtractResult> {
        let source = Path::new(&req.path);
        let (name, bytes) = read_pdf(source)?;

        let config = SessionConfig {
            export_order: if req.click_order {
                ExportOrder::Click
            } else {
                ExportOrder::Document
            },
            ..SessionConfig::default()
        };
        let mut session = Session::new(config, None);
        let total = session.load(&name, bytes)?;
        for click in parse_clicks(&req.clicks, total)? {
            session.click(click.page, click.extend_range)?;
        }

        let job = session.prepare_export()?;
        let output = match req.output {
            Some(output) => PathBuf::from(output),
            None => source.with_file_name(&job.file_name),
        };
        let bytes = job.run().context("Failed to extract pages")?;
        save_output(&output, &bytes)?;

        Ok(ExtractResult {
            output_path: output.display().to_string(),
            page_count: job.pages.len() as u32,
            pages: job.pages,
        })
    }

    fn render(&self, req: PdfThumbnailRequest) -> Result<ThumbnailResult> {
        let backend = self
            .backend
            .as_ref()
            .context("Rendering is unavailable: pdfium library not found")?;
        let (_, bytes) = read_pdf(Path::new(&req.path))?;

        let image = backend
            .open(bytes.into())?
            .render_page(req.page, req.width.max(1))?;
        image
            .save(&req.output)
            .with_context(|| format!("Failed to write {}", req.output))?;

        Ok(ThumbnailResult {
            output_path: req.output,
            width: image.width(),
            height: image.height(),
        })
    }
}

fn read_pdf(path: &Path) -> Result<(String, Vec<u8>)> {
    ensure_pdf_extension(path)?;
    let bytes =
        std::fs::read(path).with_context(|| format!("Failed to read PDF: {}", path.display()))?;
    Ok((document_name(path), bytes))
}

#[tool_router]
impl PdfServer {
    #[tool(description = "Get the number of pages in a PDF")]
    fn pdf_page_count(&self, Parameters(PathRequest { path }): Parameters<PathRequest>) -> String {
        let page_count = read_pdf(Path::new(&path))
            .and_then(|(_, bytes)| Ok(PdfDocument::from_bytes(&bytes)?.page_count()));
        match page_count {
            Ok(page_count) => {
                let result = PageCountResult { path, page_count };
                serde_json::to_string_pretty(&result).unwrap_or_else(|e| format!("Error: {}", e))
            }
            Err(e) => format!("Error: {:#}", e),
        }
    }

    #[tool(description = "Select pages of a PDF with clicks and save them as a new PDF. Pages are written in document order unless click_order is set.")]
    fn pdf_extract(&self, Parameters(req): Parameters<PdfExtractRequest>) -> String {
        match self.extract(req) {
            Ok(result) => {
                serde_json::to_string_pretty(&result).unwrap_or_else(|e| format!("Error: {}", e))
            }
            Err(e) => format!("Error: {:#}", e),
        }
    }

    #[tool(description = "Render one page of a PDF to a PNG thumbnail")]
    fn pdf_render_thumbnail(&self, Parameters(req): Parameters<PdfThumbnailRequest>) -> String {
        match self.render(req) {
            Ok(result) => {
                serde_json::to_string_pretty(&result).unwrap_or_else(|e| format!("Error: {}", e))
            }
            Err(e) => format!("Error: {:#}", e),
        }
    }
}

// Result types for MCP tools

#[derive(Debug, Serialize, Deserialize, schemars::JsonSchema)]
pub struct PageCountResult {
    pub path: String,
    pub page_count: u32,
}

#[derive(Debug, Serialize, Deserialize, schemars::JsonSchema)]
pub struct ExtractResult {
    pub output_path: String,
    pub page_count: u32,
    pub pages: Vec<u32>,
}

#[derive(Debug, Serialize, Deserialize, schemars::JsonSchema)]
pub struct ThumbnailResult {
    pub output_path: String,
    pub width: u32,
    pub height: u32,
}

impl ServerHandler for PdfServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            instructions: Some(
                "PDF page picking tools. Use pdf_page_count to see how many pages a document has, \
                 pdf_render_thumbnail to preview a page, and pdf_extract to save selected pages \
                 as a new PDF."
                    .to_string(),
            ),
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            ..Default::default()
        }
    }
}

pub async fn run_server(backend: Option<Arc<dyn RenderBackend>>) -> Result<()> {
    let server = PdfServer::new(backend);

    // Serve using stdin/stdout as a tuple
    let service = server.serve((tokio::io::stdin(), tokio::io::stdout())).await?;

    service.waiting().await?;

    Ok(())
}

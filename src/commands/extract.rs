use crate::commands::{read_document, save_output};
use crate::page_range::parse_clicks;
use crate::selection::ExportOrder;
use crate::session::{Session, SessionConfig};
use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

pub async fn run(input: &Path, clicks: &str, output: Option<&Path>, order: ExportOrder) -> Result<()> {
    let (name, bytes) = read_document(input).await?;

    let config = SessionConfig {
        export_order: order,
        ..SessionConfig::default()
    };
    let mut session = Session::new(config, None);
    let total_pages = session
        .load(&name, bytes)
        .with_context(|| format!("Failed to open PDF: {}", input.display()))?;

    for click in parse_clicks(clicks, total_pages)? {
        session.click(click.page, click.extend_range)?;
    }

    let job = session.prepare_export()?;
    let output = output
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from(&job.file_name));
    let page_count = job.pages.len();

    let bytes = tokio::task::spawn_blocking(move || job.run())
        .await?
        .context("Failed to extract pages")?;
    save_output(&output, &bytes)?;

    println!(
        "Extracted {} page(s) to {}",
        page_count,
        output.display()
    );

    Ok(())
}

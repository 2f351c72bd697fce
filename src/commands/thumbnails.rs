use crate::cli::Settings;
use crate::commands::read_document;
use crate::session::Session;
use anyhow::{Context, Result};
use std::path::Path;
use tokio::sync::mpsc;

pub async fn run(input: &Path, output_dir: &Path, settings: &Settings) -> Result<()> {
    std::fs::create_dir_all(output_dir)
        .with_context(|| format!("Failed to create directory: {}", output_dir.display()))?;

    let backend = settings
        .render_backend()
        .context("No renderer available; is the pdfium library installed?")?;
    let mut session = Session::new(settings.session_config(), Some(backend));

    let (name, bytes) = read_document(input).await?;
    let total_pages = session
        .load(&name, bytes)
        .with_context(|| format!("Failed to open PDF: {}", input.display()))?;

    let (tx, mut rx) = mpsc::unbounded_channel();
    if !session.schedule_thumbnails(output_dir, tx) {
        anyhow::bail!("Failed to open {} for rendering", name);
    }

    // Every task reports exactly once; the channel closes when the last sender drops
    while let Some(outcome) = rx.recv().await {
        session.apply_render(outcome);
    }

    let rendered = session
        .document()
        .map(|doc| doc.thumbnails().ready_count())
        .unwrap_or_default();
    println!(
        "Rendered {} of {} page(s) into {}",
        rendered,
        total_pages,
        output_dir.display()
    );

    Ok(())
}

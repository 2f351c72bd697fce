use crate::cli::Settings;
use crate::commands::{read_document, save_output};
use crate::error::Error;
use crate::page_range::parse_clicks;
use crate::session::Session;
use crate::thumbnails::{RenderOutcome, ThumbnailState};
use anyhow::{Context, Result};
use std::io::Write;
use std::path::{Path, PathBuf};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc::{self, UnboundedSender};
use tracing::debug;

const HELP: &str = "\
Commands:
  load <path>     open a PDF (discards the current selection)
  <clicks>        click pages: \"3\" toggles page 3, \"+7\" extends from the last click, \"2-5\" does both
  list            show pages, selection and thumbnails
  export [path]   save the selected pages as a new PDF
  reset           start over
  help            show this message
  quit            leave";

#[derive(Debug, PartialEq, Eq)]
enum Input<'a> {
    Empty,
    Help,
    Quit,
    List,
    Reset,
    Load(&'a str),
    Export(Option<&'a str>),
    Clicks(&'a str),
}

fn parse_input(line: &str) -> Input<'_> {
    let line = line.trim();
    let (word, rest) = match line.split_once(char::is_whitespace) {
        Some((word, rest)) => (word, rest.trim()),
        None => (line, ""),
    };

    match word {
        "" => Input::Empty,
        "help" | "?" => Input::Help,
        "quit" | "exit" | "q" => Input::Quit,
        "list" | "ls" => Input::List,
        "reset" => Input::Reset,
        "load" | "open" => Input::Load(rest),
        "export" | "save" if rest.is_empty() => Input::Export(None),
        "export" | "save" => Input::Export(Some(rest)),
        _ => Input::Clicks(line),
    }
}

enum Flow {
    Continue,
    Quit,
}

struct Repl<'a> {
    session: Session,
    output_dir: &'a Path,
    thumbnail_dir: &'a Path,
    renders: UnboundedSender<RenderOutcome>,
}

impl Repl<'_> {
    async fn handle(&mut self, line: &str) -> Result<Flow> {
        match parse_input(line) {
            Input::Empty => {}
            Input::Help => println!("{}", HELP),
            Input::Quit => return Ok(Flow::Quit),
            Input::List => self.list(),
            Input::Reset => {
                self.session.reset();
                println!("Cleared. Load a PDF to begin.");
            }
            Input::Load(path) => {
                if path.is_empty() {
                    anyhow::bail!("Usage: load <path>");
                }
                self.load(Path::new(path)).await?;
            }
            Input::Export(target) => self.export(target).await?,
            Input::Clicks(script) => self.click(script)?,
        }
        Ok(Flow::Continue)
    }

    async fn load(&mut self, path: &Path) -> Result<()> {
        // Drop the previous document before any new work starts
        self.session.reset();

        let (name, bytes) = read_document(path).await?;
        let pages = self
            .session
            .load(&name, bytes)
            .with_context(|| format!("Failed to open PDF: {}", path.display()))?;
        println!("Loaded {} ({} pages)", name, pages);

        if self
            .session
            .schedule_thumbnails(self.thumbnail_dir, self.renders.clone())
        {
            println!("Rendering thumbnails into {}", self.thumbnail_dir.display());
        }
        Ok(())
    }

    fn click(&mut self, script: &str) -> Result<()> {
        let total = self
            .session
            .document()
            .map(|doc| doc.page_count)
            .ok_or(Error::NoDocument)?;

        for click in parse_clicks(script, total)? {
            self.session.click(click.page, click.extend_range)?;
        }
        self.summary();
        Ok(())
    }

    async fn export(&mut self, target: Option<&str>) -> Result<()> {
        let job = self.session.prepare_export()?;
        let output = match target {
            Some(path) => PathBuf::from(path),
            None => self.output_dir.join(&job.file_name),
        };
        let count = job.pages.len();

        let bytes = tokio::task::spawn_blocking(move || job.run())
            .await?
            .context("Failed to extract pages")?;
        save_output(&output, &bytes)?;

        println!("Saved {} page(s) to {}", count, output.display());
        Ok(())
    }

    fn summary(&self) {
        if let Some(doc) = self.session.document() {
            let pages = doc.selection().pages(self.session.config().export_order);
            println!(
                "{} of {} pages selected: {}",
                pages.len(),
                doc.page_count,
                join_pages(&pages)
            );
        }
    }

    fn list(&self) {
        let Some(doc) = self.session.document() else {
            println!("No document loaded.");
            return;
        };

        self.summary();
        for page in 1..=doc.page_count {
            let mark = if doc.selection().contains(page) { "x" } else { " " };
            let anchor = if doc.selection().anchor() == Some(page) {
                "*"
            } else {
                " "
            };
            let preview = match doc.thumbnails().state(page) {
                Some(ThumbnailState::Ready(thumb)) => format!(
                    "{}x{} {}",
                    thumb.width,
                    thumb.height,
                    thumb.path.display()
                ),
                _ => "loading".to_string(),
            };
            println!("[{}]{}{:>5}  {}", mark, anchor, page, preview);
        }
    }
}

fn join_pages(pages: &[u32]) -> String {
    pages
        .iter()
        .map(u32::to_string)
        .collect::<Vec<_>>()
        .join(",")
}

fn prompt() {
    print!("> ");
    let _ = std::io::stdout().flush();
}

pub async fn run(
    path: Option<&Path>,
    output_dir: &Path,
    thumbnail_dir: Option<&Path>,
    settings: &Settings,
) -> Result<()> {
    // The scratch directory lives until the session ends
    let (thumbnail_dir, _scratch) = match thumbnail_dir {
        Some(dir) => {
            std::fs::create_dir_all(dir)
                .with_context(|| format!("Failed to create directory: {}", dir.display()))?;
            (dir.to_path_buf(), None)
        }
        None => {
            let scratch = tempfile::Builder::new()
                .prefix("pdfpick-")
                .tempdir()
                .context("Failed to create thumbnail directory")?;
            (scratch.path().to_path_buf(), Some(scratch))
        }
    };

    let (renders, mut finished) = mpsc::unbounded_channel();
    let mut repl = Repl {
        session: Session::new(settings.session_config(), settings.render_backend()),
        output_dir,
        thumbnail_dir: &thumbnail_dir,
        renders,
    };

    if let Some(path) = path {
        if let Err(err) = repl.load(path).await {
            println!("Error: {:#}", err);
        }
    } else {
        println!("Load a PDF with \"load <path>\", or type \"help\".");
    }

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    prompt();
    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line? else {
                    break;
                };
                match repl.handle(&line).await {
                    Ok(Flow::Quit) => break,
                    Ok(Flow::Continue) => {}
                    Err(err) => println!("Error: {:#}", err),
                }
                prompt();
            }
            Some(outcome) = finished.recv() => {
                repl.session.apply_render(outcome);
            }
        }
    }

    debug!("session closed");
    println!();
    Ok(())
}

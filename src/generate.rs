//! The `generate` command: markdown file in, EPUB file out.
//!
//! Runs strictly in order: validate options, read the markdown, convert it,
//! resolve the title, assemble and write the book. Any failure aborts the run.

use crate::cli::GenerateArgs;
use crate::config::Configuration;
use crate::markdown;
use crate::sinks::{RenderStats, EPUB};
use crate::title;
use anyhow::{bail, Context, Result};
use std::io::Write;
use std::path::{Path, PathBuf};

/// Fully resolved options for one conversion.
#[derive(Debug, Clone)]
pub struct GenerateOptions {
    pub markdown_path: PathBuf,
    pub epub_path: PathBuf,
    pub overwrite: bool,
    pub title: Option<String>,
    pub author: Option<String>,
    pub language: String,
}

impl GenerateOptions {
    /// Merge command line flags with config file defaults. Empty flag values
    /// count as not given.
    pub fn resolve(args: &GenerateArgs, config: &Configuration) -> GenerateOptions {
        let non_empty = |value: &Option<String>| value.clone().filter(|v| !v.is_empty());

        GenerateOptions {
            markdown_path: args.input.clone(),
            epub_path: args.output.clone(),
            overwrite: args.overwrite,
            title: non_empty(&args.title),
            author: non_empty(&args.author)
                .or_else(|| config.metadata.author_opt().map(str::to_string)),
            language: non_empty(&args.language)
                .or_else(|| config.metadata.language_opt().map(str::to_string))
                .unwrap_or_else(|| "en".to_string()),
        }
    }
}

/// Run the generate command and report the result on stdout.
pub fn run(args: &GenerateArgs, config: &Configuration) -> Result<()> {
    let stdout = std::io::stdout();
    run_with(args, config, &std::env::temp_dir(), &mut stdout.lock())
}

fn run_with<W: Write>(
    args: &GenerateArgs,
    config: &Configuration,
    staging_dir: &Path,
    out: &mut W,
) -> Result<()> {
    let options = GenerateOptions::resolve(args, config);
    let stats = generate_with_staging(&options, config, staging_dir)?;
    log::debug!(
        "Packaged {} documents (embedded font: {})",
        stats.document_count,
        stats.font_family.as_deref().unwrap_or("none")
    );
    writeln!(out, "Successfully created {}", options.epub_path.display())
        .with_context(|| "Failed to report result")?;
    Ok(())
}

/// Check the input exists and the output may be written.
pub fn validate(options: &GenerateOptions) -> Result<()> {
    if !options.markdown_path.is_file() {
        bail!(
            "markdown file {} does not exist",
            options.markdown_path.display()
        );
    }

    if options.epub_path.exists() && !options.overwrite {
        bail!(
            "epub file {} already exists, use option -f to overwrite",
            options.epub_path.display()
        );
    }

    Ok(())
}

/// Convert the markdown file into an EPUB, staging the stylesheet in
/// `staging_dir`.
fn generate_with_staging(
    options: &GenerateOptions,
    config: &Configuration,
    staging_dir: &Path,
) -> Result<RenderStats> {
    validate(options)?;

    let content = std::fs::read(&options.markdown_path).with_context(|| {
        format!(
            "failed to read markdown file {}",
            options.markdown_path.display()
        )
    })?;
    log::info!(
        "Read {} bytes from {}",
        content.len(),
        options.markdown_path.display()
    );

    let text = markdown::decode(&content)
        .with_context(|| "failed to convert markdown to HTML")?;
    let html = markdown::to_xhtml(text);

    let (title, source) = title::resolve(
        options.title.as_deref(),
        text,
        &options.markdown_path,
    );
    log::info!("Using title `{title}` ({source:?})");

    let epub = EPUB::new(
        options.epub_path.clone(),
        options.language.clone(),
        options.author.clone(),
        &config.metadata,
        &config.fonts,
    )
    .with_staging_dir(staging_dir);
    epub.render(&title, &html)
        .with_context(|| "failed to create epub")
}

//! EPUB rendering orchestration.
//!
//! Builds the book step by step with the `epub-builder` crate, which handles
//! the EPUB packaging requirements (OPF manifest, navigation documents, ZIP
//! structure with the mimetype entry first). Sections are added in reading
//! order: the cover, then the converted document. Nothing is written to the
//! output path until every in-memory step has succeeded.

mod cover;
mod document;

use super::config::{RenderStats, EPUB};
use super::fonts::EmbeddedFont;
use super::styles;
use anyhow::{anyhow, Context, Result};
use epub_builder::{EpubBuilder, EpubContent, EpubVersion, ReferenceType, ZipLibrary};
use std::fmt::Display;
use std::fs::File;
use std::io::{BufWriter, Write};

/// `epub-builder` reports failures as `eyre::Report`, which is not a
/// `std::error::Error`, so it cannot take `anyhow` context directly.
trait BuilderContext<T> {
    fn builder_context<C, F>(self, context: F) -> Result<T>
    where
        C: Display + Send + Sync + 'static,
        F: FnOnce() -> C;
}

impl<T> BuilderContext<T> for eyre::Result<T> {
    fn builder_context<C, F>(self, context: F) -> Result<T>
    where
        C: Display + Send + Sync + 'static,
        F: FnOnce() -> C,
    {
        self.map_err(|e| anyhow!("{e:#}")).with_context(context)
    }
}

impl EPUB {
    /// Render the converted document to an EPUB file.
    ///
    /// Returns statistics about the generated EPUB.
    pub fn render(&self, title: &str, content_html: &str) -> Result<RenderStats> {
        // create epub builder
        let zip =
            ZipLibrary::new().builder_context(|| "Failed to create ZIP library for EPUB")?;
        let mut builder =
            EpubBuilder::new(zip).builder_context(|| "Failed to create epub container")?;
        builder.epub_version(EpubVersion::V30);

        // set metadata
        builder
            .metadata("lang", &self.language)
            .builder_context(|| "Failed to set language metadata")?;
        if let Some(author) = &self.author {
            builder
                .metadata("author", author)
                .builder_context(|| format!("Failed to set author metadata: {}", author))?;
        }
        builder
            .metadata("title", title)
            .builder_context(|| "Failed to set title metadata")?;
        builder
            .metadata("generator", &self.generator)
            .builder_context(|| "Failed to set generator metadata")?;

        // the stylesheet references the font, so load it first
        let font = self
            .font
            .as_ref()
            .map(|font| EmbeddedFont::load(&font.path))
            .transpose()
            .with_context(|| format!("Failed to load font for language {}", self.language))?;

        // stage and add stylesheet; the staged file is removed when `staged` drops
        let stylesheet = styles::generate_stylesheet(font.as_ref());
        let staged = styles::stage_stylesheet(&stylesheet, &self.staging_dir)?;
        log::debug!("Staged stylesheet at {}", staged.path().display());
        let css = staged.reopen().with_context(|| {
            format!(
                "Failed to reopen staged stylesheet {}",
                staged.path().display()
            )
        })?;
        builder
            .stylesheet(css)
            .builder_context(|| "Failed to add CSS")?;

        if let Some(font) = &font {
            builder
                .add_resource(&font.href, font.data.as_slice(), font.mime)
                .builder_context(|| format!("Failed to add font: {}", font.href))?;
            log::info!("Embedded font `{}` as {}", font.family, font.href);
        }

        // track document count for stats
        let mut document_count = 0;

        // add cover page
        let cover_html = document::wrap(title, &self.language, &cover::render(title));
        builder
            .add_content(
                EpubContent::new("cover.xhtml", cover_html.as_bytes())
                    .title("Cover")
                    .reftype(ReferenceType::Cover),
            )
            .builder_context(|| "Failed to add cover page")?;
        document_count += 1;

        // add the converted document
        let content_html = document::wrap(title, &self.language, content_html);
        builder
            .add_content(
                EpubContent::new("content.xhtml", content_html.as_bytes())
                    .title(title)
                    .reftype(ReferenceType::Text),
            )
            .builder_context(|| "Failed to add section")?;
        document_count += 1;

        // write epub to file
        let output_file = File::create(&self.outfile)
            .with_context(|| format!("Failed to create EPUB file: {}", self.outfile.display()))?;
        let mut writer = BufWriter::new(output_file);
        builder
            .generate(&mut writer)
            .builder_context(|| "Failed to write epub file")?;
        writer
            .flush()
            .with_context(|| format!("Failed to flush EPUB file: {}", self.outfile.display()))?;
        log::info!(
            "Wrote {} documents to {}",
            document_count,
            self.outfile.display()
        );

        Ok(RenderStats {
            document_count,
            font_family: font.map(|font| font.family),
        })
    }
}

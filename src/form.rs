//! The [`InfoPathForm`] facade: one opened form, its manifest, and the
//! operations on it.
//!
//! The manifest is read once at open time. Everything else re-reads the
//! members it needs on every call.

use crate::archive::{Archive, ArchiveError, open_archive};
use crate::config::{ReaderConfig, SchemaConfig};
use crate::convert;
use crate::manifest::{Manifest, ManifestError};
use crate::render::{self, FormTarget, RenderError, RenderOptions, XsltProcessor};
use crate::schema::{self, SchemaError};
use crate::types::{FieldTable, View};
use std::path::Path;
use thiserror::Error;
use tracing::info;

#[derive(Error, Debug)]
pub enum FormError {
    #[error(transparent)]
    Archive(#[from] ArchiveError),
    #[error(transparent)]
    Manifest(#[from] ManifestError),
    #[error(transparent)]
    Schema(#[from] SchemaError),
    #[error(transparent)]
    Render(#[from] RenderError),
    #[error("{0} is not supported")]
    Unsupported(&'static str),
}

pub struct InfoPathForm {
    archive: Box<dyn Archive>,
    manifest: Manifest,
}

impl std::fmt::Debug for InfoPathForm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InfoPathForm")
            .field("archive", &self.archive.label())
            .field("manifest", &self.manifest)
            .finish()
    }
}

impl InfoPathForm {
    /// Open a `.xsn` file or an extracted source folder.
    pub fn open(path: &Path) -> Result<Self, FormError> {
        let archive = open_archive(path)?;
        Self::from_archive(archive)
    }

    pub fn from_archive(mut archive: Box<dyn Archive>) -> Result<Self, FormError> {
        let manifest = Manifest::read(archive.as_mut())?;
        info!(
            archive = archive.label(),
            root = %manifest.root_element,
            views = manifest.views().len(),
            "opened form"
        );
        Ok(Self { archive, manifest })
    }

    /// Label of the underlying archive (its path for files on disk).
    pub fn label(&self) -> &str {
        self.archive.label()
    }

    pub fn manifest(&self) -> &Manifest {
        &self.manifest
    }

    pub fn views(&self) -> &[View] {
        self.manifest.views()
    }

    pub fn primary_view(&self) -> &View {
        self.manifest.primary_view()
    }

    /// Infer the field table. See [`crate::schema`].
    pub fn read_schema(&mut self, config: &SchemaConfig) -> Result<FieldTable, FormError> {
        Ok(schema::read_schema(
            self.archive.as_mut(),
            &self.manifest,
            config,
        )?)
    }

    pub fn render_view(
        &mut self,
        name: &str,
        options: &RenderOptions,
        processor: &dyn XsltProcessor,
    ) -> Result<String, FormError> {
        Ok(render::render_view(
            self.archive.as_mut(),
            &self.manifest,
            name,
            options,
            processor,
        )?)
    }

    /// Render a view without a form wrapper and convert it to a template.
    pub fn to_template(
        &mut self,
        name: &str,
        config: &ReaderConfig,
        processor: &dyn XsltProcessor,
    ) -> Result<String, FormError> {
        let table = self.read_schema(&config.schema)?;
        let options = RenderOptions {
            replace_text_boxes: config.render.replace_text_boxes,
            form: FormTarget::None,
        };
        let html = self.render_view(name, &options, processor)?;
        Ok(convert::to_template(
            &html,
            &table,
            &config.template.placeholder,
        ))
    }

    /// Writing forms back is not implemented.
    pub fn save(&mut self) -> Result<(), FormError> {
        Err(FormError::Unsupported("saving a form"))
    }
}

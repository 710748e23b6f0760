//! View rendering.
//!
//! A view is an XSLT 1.0 stylesheet applied to the form's default data. The
//! transform itself is delegated to an [`XsltProcessor`]; the production
//! implementation shells out to `xsltproc` ([`Xsltproc`]). What this module
//! owns is everything around the transform:
//!
//! 1. look up the view by name ([`RenderError::ViewNotFound`] if unknown)
//! 2. transform the view's stylesheet over the template member
//! 3. optionally replace InfoPath text boxes with literal inputs
//! 4. optionally wrap the body in a `<form>`
//!
//! InfoPath text boxes are `contentEditable` spans, which a browser will not
//! submit:
//!
//! ```html
//! <span class="xdTextBox" xd:xctname="PlainText" xd:binding="my:email">a@b.c</span>
//! ```
//!
//! becomes `<input type="text" name="email" value="a@b.c">`.

use crate::archive::{Archive, ArchiveError};
use crate::html::{attribute, decode_entities, strip_tags};
use crate::manifest::Manifest;
use crate::naming::binding_field;
use maud::{PreEscaped, html};
use regex::{Captures, Regex};
use std::io::Write;
use std::process::{Command, Stdio};
use std::sync::LazyLock;
use thiserror::Error;
use tracing::debug;

static RE_TEXT_BOX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?is)<span\b([^>]*\bxd:xctname\s*=\s*["']PlainText["'][^>]*)>(.*?)</span\s*>"#)
        .expect("valid text box regex")
});

static RE_BODY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?is)(<body\b[^>]*>)(.*)(</body\s*>)").expect("valid body regex")
});

#[derive(Error, Debug)]
pub enum TransformError {
    #[error("failed to run {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("{program} exited with {status}: {stderr}")]
    Failed {
        program: String,
        status: std::process::ExitStatus,
        stderr: String,
    },
    #[error("transform output is not valid UTF-8")]
    Encoding,
}

#[derive(Error, Debug)]
pub enum RenderError {
    #[error("{archive}: no view named '{view}'")]
    ViewNotFound { archive: String, view: String },
    #[error(transparent)]
    Archive(#[from] ArchiveError),
    #[error("{archive}: transforming {stylesheet} failed: {source}")]
    Transform {
        archive: String,
        stylesheet: String,
        #[source]
        source: TransformError,
    },
}

/// Applies an XSLT 1.0 stylesheet to a document.
pub trait XsltProcessor {
    fn transform(&self, stylesheet: &[u8], document: &[u8]) -> Result<String, TransformError>;
}

/// [`XsltProcessor`] backed by the `xsltproc` command.
///
/// The stylesheet goes through a temporary file, the document through
/// stdin: `xsltproc <stylesheet> -`.
#[derive(Debug, Clone)]
pub struct Xsltproc {
    program: String,
}

impl Xsltproc {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }
}

impl Default for Xsltproc {
    fn default() -> Self {
        Self::new("xsltproc")
    }
}

impl XsltProcessor for Xsltproc {
    fn transform(&self, stylesheet: &[u8], document: &[u8]) -> Result<String, TransformError> {
        let mut sheet = tempfile::Builder::new().suffix(".xsl").tempfile()?;
        sheet.write_all(stylesheet)?;
        sheet.flush()?;

        debug!(program = %self.program, "running xslt processor");
        let mut child = Command::new(&self.program)
            .arg(sheet.path())
            .arg("-")
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|source| TransformError::Spawn {
                program: self.program.clone(),
                source,
            })?;

        // Feed stdin from another thread so a large output cannot block us.
        let writer = child.stdin.take().map(|mut stdin| {
            let document = document.to_vec();
            std::thread::spawn(move || stdin.write_all(&document))
        });
        let output = child.wait_with_output()?;
        if let Some(writer) = writer {
            // A broken pipe here means the processor bailed early; its exit
            // status carries the real error.
            let _ = writer.join();
        }

        if !output.status.success() {
            return Err(TransformError::Failed {
                program: self.program.clone(),
                status: output.status,
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }
        String::from_utf8(output.stdout).map_err(|_| TransformError::Encoding)
    }
}

/// Attributes of the `<form>` element wrapped around a rendered body.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormAttributes {
    pub action: Option<String>,
    pub method: Option<String>,
}

/// Which `<form>` (if any) to wrap a rendered view in.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum FormTarget {
    /// Leave the output as the stylesheet produced it.
    #[default]
    None,
    /// Use the manifest's submit target; no wrapping when it has none.
    Manifest,
    Explicit(FormAttributes),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderOptions {
    pub replace_text_boxes: bool,
    pub form: FormTarget,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            replace_text_boxes: true,
            form: FormTarget::None,
        }
    }
}

/// Render the view called `name` over the form's default data.
pub fn render_view(
    archive: &mut dyn Archive,
    manifest: &Manifest,
    name: &str,
    options: &RenderOptions,
    processor: &dyn XsltProcessor,
) -> Result<String, RenderError> {
    let view = manifest
        .view(name)
        .ok_or_else(|| RenderError::ViewNotFound {
            archive: archive.label().to_string(),
            view: name.to_string(),
        })?;

    let stylesheet = archive.read_member(&view.stylesheet)?;
    let document = archive.read_member(&manifest.template_member)?;
    debug!(view = %view.name, stylesheet = %view.stylesheet, "rendering view");

    let mut html = processor
        .transform(&stylesheet, &document)
        .map_err(|source| RenderError::Transform {
            archive: archive.label().to_string(),
            stylesheet: view.stylesheet.clone(),
            source,
        })?;

    if options.replace_text_boxes {
        html = replace_text_boxes(&html);
    }
    if let Some(attrs) = form_attributes(&options.form, manifest) {
        html = wrap_in_form(&html, &attrs);
    }
    Ok(html)
}

fn form_attributes(target: &FormTarget, manifest: &Manifest) -> Option<FormAttributes> {
    match target {
        FormTarget::None => None,
        FormTarget::Explicit(attrs) => Some(attrs.clone()),
        FormTarget::Manifest => match &manifest.submit {
            Some(submit) => Some(FormAttributes {
                action: submit.action.clone(),
                method: submit.method.clone(),
            }),
            None => {
                debug!("manifest declares no submit target, not wrapping in a form");
                None
            }
        },
    }
}

/// Replace every `PlainText` span with `<input type="text">` named after the
/// span's binding. Spans without a usable binding are left alone.
pub fn replace_text_boxes(html: &str) -> String {
    RE_TEXT_BOX
        .replace_all(html, |caps: &Captures| {
            let Some(field) = attribute(&caps[1], "xd:binding")
                .as_deref()
                .and_then(binding_field)
                .map(str::to_string)
            else {
                return caps[0].to_string();
            };
            let text = strip_tags(&caps[2]);
            let value = decode_entities(&text).into_owned();
            html! {
                input type="text" name=(field) value=(value);
            }
            .into_string()
        })
        .into_owned()
}

/// Wrap the content of `<body>` (or the whole document when there is no
/// body) in a `<form>`.
pub fn wrap_in_form(html: &str, attrs: &FormAttributes) -> String {
    let wrap = |content: &str| {
        html! {
            form action=[attrs.action.as_deref()] method=[attrs.method.as_deref()] {
                (PreEscaped(content))
            }
        }
        .into_string()
    };
    match RE_BODY.captures(html) {
        Some(caps) => {
            let (Some(whole), Some(open), Some(content), Some(close)) =
                (caps.get(0), caps.get(1), caps.get(2), caps.get(3))
            else {
                return wrap(html);
            };
            format!(
                "{}{}{}{}{}",
                &html[..whole.start()],
                open.as_str(),
                wrap(content.as_str()),
                close.as_str(),
                &html[whole.end()..]
            )
        }
        None => wrap(html),
    }
}

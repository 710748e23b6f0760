//! Form manifest (`manifest.xsf`) reader.
//!
//! The manifest is read once when a form is opened. It names the root
//! element of the data document, the views and their stylesheets, the submit
//! target, and which members hold the schema and the default data.
//!
//! ```xml
//! <xsf:xDocumentClass xmlns:xsf="http://schemas.microsoft.com/office/infopath/2003/solutionDefinition">
//!   <xsf:package><xsf:files>
//!     <xsf:file name="myschema.xsd"><xsf:fileProperties>
//!       <xsf:property name="namespace" type="string" value="http://…/myXSD/2010-05-04T10:00:00"/>
//!       <xsf:property name="rootElement" type="string" value="myFields"/>
//!     </xsf:fileProperties></xsf:file>
//!   </xsf:files></xsf:package>
//!   <xsf:views default="Feedback">
//!     <xsf:view name="Feedback"><xsf:mainpane transform="view1.xsl"/></xsf:view>
//!   </xsf:views>
//!   <xsf:fileNew><xsf:initialXmlDocument href="template.xml"/></xsf:fileNew>
//!   <xsf:submit><xsf:useHttpHandler href="http://…" method="POST"/></xsf:submit>
//! </xsf:xDocumentClass>
//! ```

use crate::archive::Archive;
use crate::types::{SubmitInfo, View};
use crate::xml::{self, XSF_NS};
use roxmltree::{Document, Node};
use thiserror::Error;
use tracing::warn;

pub const MANIFEST_MEMBER: &str = "manifest.xsf";
pub const DEFAULT_SCHEMA_MEMBER: &str = "myschema.xsd";
pub const DEFAULT_TEMPLATE_MEMBER: &str = "template.xml";

#[derive(Error, Debug)]
pub enum ManifestError {
    #[error("{archive}: root element not found in manifest")]
    RootElementNotFound { archive: String },
    #[error("{archive}: no views found in manifest")]
    NoViews { archive: String },
    #[error("{archive}: manifest is not valid UTF-8")]
    Encoding { archive: String },
    #[error("{archive}: malformed manifest: {source}")]
    Malformed {
        archive: String,
        #[source]
        source: roxmltree::Error,
    },
    #[error(transparent)]
    Archive(#[from] crate::archive::ArchiveError),
}

/// Everything the rest of the crate needs from the manifest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Manifest {
    pub root_element: String,
    /// Target namespace of the data document, when the manifest states it.
    pub namespace: Option<String>,
    /// Views in manifest order. Never empty: [`Manifest::parse`] rejects a
    /// manifest without views, and the field is private so nothing else can
    /// empty it.
    views: Vec<View>,
    pub default_view: Option<String>,
    pub submit: Option<SubmitInfo>,
    pub schema_member: String,
    pub template_member: String,
}

impl Manifest {
    /// Parse manifest bytes. `archive` labels errors.
    pub fn parse(bytes: &[u8], archive: &str) -> Result<Self, ManifestError> {
        let text = xml::decode(bytes).map_err(|_| ManifestError::Encoding {
            archive: archive.to_string(),
        })?;
        let doc = xml::parse(text).map_err(|source| ManifestError::Malformed {
            archive: archive.to_string(),
            source,
        })?;

        let root_element = read_root_element_name(&doc).ok_or_else(|| {
            ManifestError::RootElementNotFound {
                archive: archive.to_string(),
            }
        })?;
        let views = read_views(&doc);
        if views.is_empty() {
            return Err(ManifestError::NoViews {
                archive: archive.to_string(),
            });
        }

        Ok(Self {
            root_element,
            namespace: schema_file(&doc)
                .and_then(|file| file_property(file, "namespace"))
                .map(str::to_string),
            views,
            default_view: read_default_view(&doc),
            submit: read_submit_info(&doc),
            schema_member: schema_file(&doc)
                .and_then(|file| file.attribute("name"))
                .unwrap_or(DEFAULT_SCHEMA_MEMBER)
                .to_string(),
            template_member: read_template_member(&doc)
                .unwrap_or(DEFAULT_TEMPLATE_MEMBER)
                .to_string(),
        })
    }

    /// Read and parse `manifest.xsf` from an archive.
    pub fn read(archive: &mut dyn Archive) -> Result<Self, ManifestError> {
        let bytes = archive.read_member(MANIFEST_MEMBER)?;
        Self::parse(&bytes, archive.label())
    }

    /// Views in manifest order; at least one.
    pub fn views(&self) -> &[View] {
        &self.views
    }

    pub fn view(&self, name: &str) -> Option<&View> {
        self.views.iter().find(|v| v.name == name)
    }

    /// The view schema inference reads options from: the declared default
    /// view when it exists, otherwise the first view.
    pub fn primary_view(&self) -> &View {
        self.default_view
            .as_deref()
            .and_then(|name| self.view(name))
            .unwrap_or(&self.views[0])
    }
}

fn xsf_elements<'a, 'input>(
    doc: &'a Document<'input>,
    name: &'static str,
) -> impl Iterator<Item = Node<'a, 'input>> {
    doc.descendants()
        .filter(move |n| n.has_tag_name((XSF_NS, name)))
}

fn xsf_child<'a, 'input>(node: Node<'a, 'input>, name: &str) -> Option<Node<'a, 'input>> {
    node.children().find(|n| n.has_tag_name((XSF_NS, name)))
}

/// Value of a named `xsf:property` under a file's `xsf:fileProperties`.
fn file_property<'a>(file: Node<'a, '_>, name: &str) -> Option<&'a str> {
    xsf_child(file, "fileProperties")?
        .children()
        .filter(|n| n.has_tag_name((XSF_NS, "property")))
        .find(|p| p.attribute("name") == Some(name))
        .and_then(|p| p.attribute("value"))
}

/// The `xsf:file` entry declaring the root element: the schema file.
fn schema_file<'a, 'input>(doc: &'a Document<'input>) -> Option<Node<'a, 'input>> {
    xsf_elements(doc, "file").find(|file| file_property(*file, "rootElement").is_some())
}

pub fn read_root_element_name(doc: &Document) -> Option<String> {
    schema_file(doc)
        .and_then(|file| file_property(file, "rootElement"))
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .map(str::to_string)
}

/// All views with a main-pane transform, in manifest order.
pub fn read_views(doc: &Document) -> Vec<View> {
    let mut views = Vec::new();
    for view in xsf_elements(doc, "view") {
        let Some(name) = view.attribute("name") else {
            warn!("skipping view without a name");
            continue;
        };
        let Some(stylesheet) = xsf_child(view, "mainpane").and_then(|p| p.attribute("transform"))
        else {
            warn!(view = name, "skipping view without a main pane transform");
            continue;
        };
        views.push(View {
            name: name.to_string(),
            stylesheet: stylesheet.to_string(),
        });
    }
    views
}

fn read_default_view(doc: &Document) -> Option<String> {
    xsf_elements(doc, "views")
        .next()
        .and_then(|views| views.attribute("default"))
        .map(str::to_string)
}

/// Submit target from `xsf:submit/xsf:useHttpHandler`. A form without a
/// submit declaration simply has none.
pub fn read_submit_info(doc: &Document) -> Option<SubmitInfo> {
    let submit = xsf_elements(doc, "submit").next()?;
    let handler = xsf_child(submit, "useHttpHandler");
    Some(SubmitInfo {
        action: handler
            .and_then(|h| h.attribute("href"))
            .map(str::to_string),
        method: handler
            .and_then(|h| h.attribute("method"))
            .map(str::to_string),
    })
}

fn read_template_member<'a>(doc: &'a Document) -> Option<&'a str> {
    xsf_elements(doc, "initialXmlDocument")
        .next()
        .and_then(|n| n.attribute("href"))
}

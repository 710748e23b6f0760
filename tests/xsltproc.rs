//! Renders the fixture views through a real `xsltproc`.
//!
//! Skipped when xsltproc is not installed.
//!
//! Run with: cargo test --test xsltproc -- --nocapture

use infopath_reader::form::InfoPathForm;
use infopath_reader::render::{FormAttributes, FormTarget, RenderOptions, Xsltproc};
use std::path::{Path, PathBuf};
use std::process::Command;

fn fixture_dir() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("fixtures/feedback-form")
}

fn have_xsltproc() -> bool {
    if Command::new("xsltproc").arg("--version").output().is_err() {
        eprintln!("xsltproc not found - skipping rendering tests");
        return false;
    }
    true
}

#[test]
fn feedback_view_renders_inputs_inside_manifest_form() {
    if !have_xsltproc() {
        return;
    }
    let mut form = InfoPathForm::open(&fixture_dir()).unwrap();
    let options = RenderOptions {
        replace_text_boxes: true,
        form: FormTarget::Manifest,
    };
    let html = form
        .render_view("Feedback", &options, &Xsltproc::default())
        .unwrap();

    assert!(html.contains(r#"<form action="http://forms.example.org/feedback" method="POST">"#));
    assert!(html.contains(r#"<input type="text" name="full_name" value="">"#));
    assert!(html.contains(r#"<input type="text" name="comment" value="">"#));
    assert!(!html.contains(r#"xd:xctname="PlainText""#));
    // The drop-down keeps the default from the template data.
    assert!(html.contains("Human Resources"));
    let form_at = html.find("<form").unwrap();
    assert!(html.find("<body").unwrap() < form_at);
    assert!(form_at < html.find("</form>").unwrap());
}

#[test]
fn summary_view_renders_without_form_when_asked() {
    if !have_xsltproc() {
        return;
    }
    let mut form = InfoPathForm::open(&fixture_dir()).unwrap();
    let options = RenderOptions {
        replace_text_boxes: false,
        form: FormTarget::None,
    };
    let html = form
        .render_view("Summary", &options, &Xsltproc::default())
        .unwrap();
    assert!(html.contains("<strong>Summary</strong>"));
    assert!(html.contains(r#"xd:xctname="PlainText""#));
    assert!(!html.contains("<form"));
}

#[test]
fn explicit_form_attributes_override_manifest() {
    if !have_xsltproc() {
        return;
    }
    let mut form = InfoPathForm::open(&fixture_dir()).unwrap();
    let options = RenderOptions {
        replace_text_boxes: true,
        form: FormTarget::Explicit(FormAttributes {
            action: Some("/submit".into()),
            method: None,
        }),
    };
    let html = form
        .render_view("Summary", &options, &Xsltproc::default())
        .unwrap();
    assert!(html.contains(r#"<form action="/submit">"#));
}

#[test]
fn missing_program_is_a_transform_error() {
    let mut form = InfoPathForm::open(&fixture_dir()).unwrap();
    let err = form
        .render_view(
            "Summary",
            &RenderOptions::default(),
            &Xsltproc::new("definitely-not-an-xslt-processor"),
        )
        .unwrap_err();
    assert!(err.to_string().contains("view2.xsl"));
    assert!(err.to_string().contains("definitely-not-an-xslt-processor"));
}

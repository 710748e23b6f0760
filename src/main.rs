use clap::{Parser, Subcommand};
use infopath_reader::config::{self, ReaderConfig};
use infopath_reader::form::InfoPathForm;
use infopath_reader::output;
use infopath_reader::render::{FormAttributes, FormTarget, RenderOptions, Xsltproc};
use std::path::PathBuf;
use tracing::Level;
use tracing_subscriber::EnvFilter;

/// The form every command operates on.
#[derive(clap::Args, Clone)]
struct FormArgs {
    /// A published .xsn file or a folder of extracted source files
    form: PathBuf,
}

/// Which view to use; the manifest's default view when omitted.
#[derive(clap::Args, Clone)]
struct ViewArgs {
    /// View name, as listed by `views`
    #[arg(long)]
    view: Option<String>,
}

#[derive(Parser)]
#[command(name = "infopath-reader")]
#[command(about = "Read Microsoft InfoPath forms")]
#[command(long_about = "\
Read Microsoft InfoPath forms

A form is either a published .xsn file (a CAB archive) or the folder written
by InfoPath's \"Save as Source Files\". Both contain:

  manifest.xsf    root element, views, submit target
  myschema.xsd    field declarations
  template.xml    default data
  view1.xsl ...   one XSLT stylesheet per view

The schema command reconciles the three documents into one field table with
option sets for drop-downs, list boxes, option buttons and checkbox groups.
Rendering runs the view stylesheet through xsltproc.

Run 'infopath-reader gen-config' to generate a documented infopath.toml.")]
#[command(version)]
struct Cli {
    /// Directory holding infopath.toml
    #[arg(long, default_value = ".", global = true)]
    config_dir: PathBuf,

    /// Log decisions and skipped controls
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Show the manifest: root element, submit target, views
    Info(FormArgs),
    /// List view names
    Views(FormArgs),
    /// Print the inferred field table
    Schema {
        #[command(flatten)]
        form: FormArgs,
        /// Print JSON instead of the text listing
        #[arg(long)]
        json: bool,
    },
    /// Render a view to HTML
    Render {
        #[command(flatten)]
        form: FormArgs,
        #[command(flatten)]
        view: ViewArgs,
        /// Form action, overriding the manifest's submit target
        #[arg(long)]
        action: Option<String>,
        /// Form method, overriding the manifest's submit method
        #[arg(long)]
        method: Option<String>,
        /// Do not wrap the body in a <form>
        #[arg(long, conflicts_with_all = ["action", "method"])]
        no_form: bool,
    },
    /// Convert a rendered view to a template with field placeholders
    Template {
        #[command(flatten)]
        form: FormArgs,
        #[command(flatten)]
        view: ViewArgs,
    },
    /// Print a stock infopath.toml with all options documented
    GenConfig,
}

fn init_logging(verbose: bool) {
    let level = if verbose { Level::DEBUG } else { Level::WARN };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(level.into()))
        .with_writer(std::io::stderr)
        .init();
}

fn view_name(form: &InfoPathForm, args: &ViewArgs) -> String {
    args.view
        .clone()
        .unwrap_or_else(|| form.primary_view().name.clone())
}

fn form_target(
    config: &ReaderConfig,
    action: Option<String>,
    method: Option<String>,
    no_form: bool,
) -> FormTarget {
    if no_form {
        return FormTarget::None;
    }
    if action.is_some() || method.is_some() {
        return FormTarget::Explicit(FormAttributes { action, method });
    }
    if config.render.wrap_in_form {
        FormTarget::Manifest
    } else {
        FormTarget::None
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let load_config = || config::load_config(&cli.config_dir);

    match cli.command {
        Command::Info(args) => {
            let form = InfoPathForm::open(&args.form)?;
            output::print_manifest(form.label(), form.manifest());
        }
        Command::Views(args) => {
            let form = InfoPathForm::open(&args.form)?;
            output::print_views(form.manifest());
        }
        Command::Schema { form, json } => {
            let config = load_config()?;
            let mut form = InfoPathForm::open(&form.form)?;
            let table = form.read_schema(&config.schema)?;
            if json {
                println!("{}", serde_json::to_string_pretty(&table)?);
            } else {
                output::print_fields(&table);
            }
        }
        Command::Render {
            form,
            view,
            action,
            method,
            no_form,
        } => {
            let config = load_config()?;
            let processor = Xsltproc::new(config.render.xsltproc.clone());
            let mut form = InfoPathForm::open(&form.form)?;
            let name = view_name(&form, &view);
            let options = RenderOptions {
                replace_text_boxes: config.render.replace_text_boxes,
                form: form_target(&config, action, method, no_form),
            };
            print!("{}", form.render_view(&name, &options, &processor)?);
        }
        Command::Template { form, view } => {
            let config = load_config()?;
            let processor = Xsltproc::new(config.render.xsltproc.clone());
            let mut form = InfoPathForm::open(&form.form)?;
            let name = view_name(&form, &view);
            print!("{}", form.to_template(&name, &config, &processor)?);
        }
        Command::GenConfig => {
            print!("{}", config::stock_config_toml());
        }
    }

    Ok(())
}

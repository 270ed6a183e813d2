use std::error::Error;
use std::fs;
use std::path::PathBuf;
use std::time::Duration;

use clap::{Parser, Subcommand};
use invoice_pdf::builder::InvoiceRenderer;
use invoice_pdf::fonts::FontSource;
use invoice_pdf::model::{example_invoice, Invoice};
use log::info;

/// Renders invoices to PDF from the command line.
///
/// Fonts must be present under `assets/fonts` relative to the `invoice_pdf`
/// crate or next to the binary, or provided via `INVOICE_PDF_FONTS_DIR`.
#[derive(Parser)]
#[command(author, version, about = "Render invoice records to PDF")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Render a JSON invoice, or the example invoice when no input is given.
    Render {
        /// JSON invoice to render.
        #[arg(short, long)]
        input: Option<PathBuf>,

        /// Destination of the PDF.
        #[arg(short, long, default_value = "invoice.pdf")]
        output: PathBuf,

        /// Directory containing Inter-Regular.ttf and Inter-Bold.ttf.
        #[arg(long, env = "INVOICE_PDF_FONTS_DIR")]
        fonts_dir: Option<PathBuf>,

        /// Seconds to wait for a remote logo.
        #[arg(long, default_value_t = 10)]
        logo_timeout: u64,

        /// Render without the logo even if the invoice references one.
        #[arg(long)]
        no_logo: bool,
    },

    /// Write the example invoice as JSON.
    #[command(name = "example")]
    Example {
        /// Destination file; stdout when omitted.
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Render {
            input,
            output,
            fonts_dir,
            logo_timeout,
            no_logo,
        } => render(input, output, fonts_dir, logo_timeout, no_logo),
        Commands::Example { output } => example(output),
    };

    if let Err(err) = result {
        eprintln!("Error: {}", err);
        print_error_sources(err.as_ref());
        std::process::exit(1);
    }
}

fn render(
    input: Option<PathBuf>,
    output: PathBuf,
    fonts_dir: Option<PathBuf>,
    logo_timeout: u64,
    no_logo: bool,
) -> Result<(), Box<dyn Error>> {
    let mut invoice = match &input {
        Some(path) => Invoice::from_path(path)?,
        None => example_invoice(),
    };
    if no_logo {
        invoice.logo = None;
    }

    let fonts = fonts_dir.map_or(FontSource::Bundled, FontSource::Directory);
    let renderer = InvoiceRenderer::new()
        .with_fonts(fonts)
        .with_logo_timeout(Duration::from_secs(logo_timeout));

    let rendered = renderer.render(&invoice)?;
    fs::write(&output, &rendered.bytes)?;
    info!(
        "Generated {} ({} bytes, total {:.2})",
        output.display(),
        rendered.bytes.len(),
        rendered.totals.total
    );
    Ok(())
}

fn example(output: Option<PathBuf>) -> Result<(), Box<dyn Error>> {
    let json = example_invoice().to_json_pretty()?;
    match output {
        Some(path) => {
            fs::write(&path, json)?;
            info!("Wrote example invoice to {}", path.display());
        }
        None => println!("{}", json),
    }
    Ok(())
}

fn print_error_sources(mut error: &(dyn Error + 'static)) {
    while let Some(source) = error.source() {
        eprintln!("  caused by: {}", source);
        error = source;
    }
}

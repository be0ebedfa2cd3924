//! chapter-xref - number chapters and fill cross-references in HTML

use std::fs::File;
use std::io::{self, BufWriter, Read, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, ValueEnum};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use chapter_xref::dom::{parse_html_bytes, write_html};
use chapter_xref::{MarkerFormat, Options, Passes, process_passes};

#[derive(Parser)]
#[command(name = "chapter-xref")]
#[command(version, about = "Number chapters and fill cross-references in HTML", long_about = None)]
#[command(after_help = "EXAMPLES:
    chapter-xref book.html out.html                    Number chapters and resolve links
    chapter-xref --marker-format numbered-with-period book.html
    cat book.html | chapter-xref --only xrefs -         Resolve links only")]
struct Cli {
    /// Input HTML file, or '-' for stdin
    #[arg(value_name = "INPUT")]
    input: PathBuf,

    /// Output file (defaults to stdout)
    #[arg(value_name = "OUTPUT")]
    output: Option<PathBuf>,

    /// Options file (.json or .toml)
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Number appendix chapters instead of lettering them
    #[arg(long)]
    no_appendix: bool,

    /// Marker text format: bare or numbered-with-period
    #[arg(long, value_name = "FORMAT")]
    marker_format: Option<MarkerFormat>,

    /// Class to put on inserted marker spans
    #[arg(long, value_name = "CLASS")]
    marker_class: Option<String>,

    /// Only look up fragments exactly as written
    #[arg(long)]
    no_decode_fragments: bool,

    /// Run a single pass
    #[arg(long, value_enum)]
    only: Option<Pass>,

    /// Print pass counts as JSON to stderr
    #[arg(long)]
    report: bool,

    /// Log each skipped heading and link
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Clone, Copy, ValueEnum)]
enum Pass {
    Numbers,
    Xrefs,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn init_tracing(verbose: bool) {
    let default = if verbose {
        "chapter_xref=debug"
    } else {
        "chapter_xref=warn"
    };
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| default.into()))
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();
}

fn resolve_options(cli: &Cli) -> chapter_xref::Result<Options> {
    let mut options = match &cli.config {
        Some(path) => Options::load(path)?,
        None => Options::default(),
    };
    if cli.no_appendix {
        options.appendix_mode = false;
    }
    if let Some(format) = cli.marker_format {
        options.marker_format = format;
    }
    if let Some(class) = &cli.marker_class {
        options.marker_class = Some(class.clone());
    }
    if cli.no_decode_fragments {
        options.decode_fragments = false;
    }
    options.validated()
}

fn run(cli: &Cli) -> chapter_xref::Result<()> {
    let options = resolve_options(cli)?;
    let passes = match cli.only {
        None => Passes::All,
        Some(Pass::Numbers) => Passes::Numbers,
        Some(Pass::Xrefs) => Passes::Xrefs,
    };

    let bytes = if cli.input.as_os_str() == "-" {
        let mut buf = Vec::new();
        io::stdin().read_to_end(&mut buf)?;
        buf
    } else {
        std::fs::read(&cli.input)?
    };

    let mut dom = parse_html_bytes(&bytes);
    let report = process_passes(&mut dom, &options, passes);
    tracing::info!(input = %cli.input.display(), "processed document");

    match &cli.output {
        Some(path) => {
            let mut writer = BufWriter::new(File::create(path)?);
            write_html(&dom, &mut writer)?;
            writer.flush()?;
        }
        None => {
            let stdout = io::stdout();
            let mut writer = stdout.lock();
            write_html(&dom, &mut writer)?;
            writer.flush()?;
        }
    }

    if cli.report {
        eprintln!("{}", serde_json::to_string(&report)?);
    }
    Ok(())
}

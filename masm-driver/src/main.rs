use anyhow::{bail, Context, Result};
use clap::{Parser, ValueEnum};
use masm_common::ErrorReporter;
use masm_macro::{expand_source, ExpansionOptions, SpliceStrategy};
use std::fs;
use std::path::PathBuf;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum DiagnosticsFormat {
    Text,
    Json,
}

#[derive(Parser, Debug)]
#[command(name = "mexp", version, about = "Expands .macro definitions in MIPS assembly source")]
struct Args {
    /// Input assembly file
    input: PathBuf,

    /// Output expanded file (defaults to stdout)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// JSON file with expansion options
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Only accept %name macro parameters, not SPIM-style $name
    #[arg(long)]
    no_spim: bool,

    /// Splice substitutes at the first textual match instead of the token offset
    #[arg(long)]
    first_occurrence: bool,

    /// First macro invocation id
    #[arg(long, value_name = "N")]
    first_invocation: Option<u64>,

    /// How diagnostics are printed
    #[arg(long, value_enum, default_value = "text")]
    diagnostics: DiagnosticsFormat,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,
}

fn load_options(args: &Args) -> Result<ExpansionOptions> {
    let mut options = match &args.config {
        Some(path) => {
            let text = fs::read_to_string(path)
                .with_context(|| format!("Failed to read config file '{}'", path.display()))?;
            ExpansionOptions::from_json(&text)?
        }
        None => ExpansionOptions::default(),
    };

    if args.no_spim {
        options.accept_spim_parameters = false;
    }
    if args.first_occurrence {
        options.splice = SpliceStrategy::FirstOccurrence;
    }
    if let Some(first) = args.first_invocation {
        options.first_invocation = first;
    }

    Ok(options)
}

fn main() -> Result<()> {
    let args = Args::parse();

    if args.verbose {
        env_logger::init();
    }

    let options = load_options(&args)?;
    log::debug!("Expansion options: {:?}", options);

    let input = fs::read_to_string(&args.input)
        .with_context(|| format!("Failed to read '{}'", args.input.display()))?;
    let name = args.input.display().to_string();

    let mut reporter = ErrorReporter::new();
    let output = expand_source(&name, &input, options, &mut reporter)?;

    match args.diagnostics {
        DiagnosticsFormat::Text => reporter.print_diagnostics(),
        DiagnosticsFormat::Json => eprintln!("{}", reporter.to_json()?),
    }

    if let Some(output_path) = &args.output {
        fs::write(output_path, &output)?;
    } else {
        print!("{}", output);
    }

    if reporter.has_errors() {
        bail!("{}", reporter.summary());
    }

    Ok(())
}

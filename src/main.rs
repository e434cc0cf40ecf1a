use std::fs::File;
use std::io::{self, BufWriter};
use std::path::PathBuf;

use adstxt_tools::adstxt::tools::aggregate::{self, AggregateConfig};
use adstxt_tools::adstxt::tools::io::diagnostics::WriterSink;
use adstxt_tools::adstxt::tools::io::fragments::VERSION_TAG_PREFIX;
use adstxt_tools::adstxt::tools::io::output::DEFAULT_CONTACTS;
use adstxt_tools::{Result, ToolError};
use clap::Parser;
use tracing_subscriber::EnvFilter;

fn main() {
    let cli = Cli::parse();
    if let Err(error) = run(cli) {
        eprintln!("error: {error}");
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    init_logging()?;

    let output = cli.output.clone();
    let config = cli.into_config();
    let mut sink = WriterSink::new(io::stderr());
    let report = aggregate::run(&config, &mut sink)?;

    match output {
        Some(path) => {
            let mut writer = BufWriter::new(File::create(path)?);
            aggregate::render(&mut writer, &config, &report)
        }
        None => {
            let mut writer = io::stdout().lock();
            aggregate::render(&mut writer, &config, &report)
        }
    }
}

fn init_logging() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .try_init()
        .map_err(|error| ToolError::Logging(error.to_string()))
}

#[derive(Parser)]
#[command(
    author,
    version,
    about = "Merge ads.txt fragments into one sorted, deduplicated ads.txt."
)]
struct Cli {
    /// CSV file mapping advertiser names to authority ids.
    #[arg(long, default_value = "authorities.csv")]
    authorities: PathBuf,

    /// Directory containing the ads.txt fragment files.
    #[arg(long, default_value = "./parts")]
    parts: PathBuf,

    /// Write the result to this file instead of standard output.
    #[arg(long)]
    output: Option<PathBuf>,

    /// Contact line for the header. Repeat to add several.
    #[arg(long = "contact", value_name = "LINE")]
    contacts: Vec<String>,

    /// Comment prefix of version lines copied into the header.
    #[arg(long, default_value = VERSION_TAG_PREFIX)]
    version_prefix: String,
}

impl Cli {
    fn into_config(self) -> AggregateConfig {
        let contacts = if self.contacts.is_empty() {
            DEFAULT_CONTACTS.iter().map(|line| line.to_string()).collect()
        } else {
            self.contacts
        };
        AggregateConfig {
            authorities: self.authorities,
            parts: self.parts,
            contacts,
            version_prefix: self.version_prefix,
        }
    }
}

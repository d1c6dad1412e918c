use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Sets the level of tracing.
    #[arg(short, long, global = true)]
    pub trace: Option<TraceLevel>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Webscrape Senate periodic transaction reports to a JSON file.
    Scrape {
        /// How to talk to the portal.
        #[arg(short, long, value_enum, default_value_t = Variant::Http)]
        variant: Variant,

        /// Where to write the transactions.
        #[arg(short, long, default_value = "./buffer/senators.json")]
        output: PathBuf,

        /// Seconds to wait before every request; overrides EFD_RATE_LIMIT_SECS.
        #[arg(short, long)]
        rate_limit: Option<u64>,

        /// Only reports filed by senators with this first name.
        #[arg(long, default_value = "")]
        first_name: String,

        /// Only reports filed by senators with this last name.
        #[arg(long, default_value = "")]
        last_name: String,

        /// Show the browser window (browser variant only).
        #[arg(long)]
        headful: bool,
    },
}

#[derive(ValueEnum, Copy, Clone, Debug, PartialEq, Eq)]
#[clap(rename_all = "UPPERCASE")]
pub enum TraceLevel {
    DEBUG,
    ERROR,
    INFO,
    TRACE,
    WARN,
}

#[derive(ValueEnum, Copy, Clone, Debug, PartialEq, Eq)]
pub enum Variant {
    /// The portal's JSON report endpoint, over plain HTTP.
    Http,

    /// Click through the search UI in Chrome.
    Browser,
}

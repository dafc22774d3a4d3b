pub mod apply;
pub mod serve;
pub mod submit;

use clap::{Parser, Subcommand};

use crate::config::{COMMUNITY_URL, DEFAULT_BIND, SHEET_NAME};

#[derive(Parser)]
#[command(
    name = "eyrie-apply",
    version,
    about = "Eyrie School scholarship applications: intake server and applicant wizard"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,
}

#[derive(Subcommand)]
pub enum Command {
    /// Run the application intake server
    Serve {
        /// Address to listen on
        #[arg(long, default_value = DEFAULT_BIND)]
        bind: String,
        /// Spreadsheet tab that receives applications
        #[arg(long, default_value = SHEET_NAME)]
        sheet: String,
        /// Keep applications in memory instead of Google Sheets (no credentials needed)
        #[arg(long)]
        in_memory: bool,
    },
    /// Record one application directly in the sheet
    Submit {
        #[arg(long)]
        full_name: String,
        #[arg(long)]
        phone: String,
        #[arg(long)]
        email: String,
        #[arg(long)]
        university: String,
        #[arg(long)]
        department: String,
        /// "100 Level" or "200 Level"
        #[arg(long)]
        level: String,
        /// Why the applicant wants to join
        #[arg(long)]
        why: String,
        /// Whether the applicant has joined the Discord community (Yes/No)
        #[arg(long)]
        discord: String,
        /// Spreadsheet tab that receives applications
        #[arg(long, default_value = SHEET_NAME)]
        sheet: String,
    },
    /// Fill in the application form interactively and send it to a running server
    Apply {
        /// Base URL of the intake server
        #[arg(long, default_value = "http://127.0.0.1:3000")]
        server: String,
        /// Where to send applicants after a successful submission
        #[arg(long, default_value = COMMUNITY_URL)]
        community_url: String,
    },
}

impl Cli {
    /// Default tracing filter for the `-v` count; `RUST_LOG` overrides it.
    pub fn log_filter(&self) -> &'static str {
        match self.verbose {
            0 => "warn",
            1 => "info",
            2 => "debug",
            _ => "trace",
        }
    }
}

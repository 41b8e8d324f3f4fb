use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "jobscan")]
#[command(author, version, about = "Scan job postings for relocation support and employment type", long_about = None)]
#[command(after_help = r#"Examples:
  jobscan analyze posting.html                         Analyze a saved page
  jobscan analyze https://www.seek.com.au/job/123      Fetch and analyze a page
  jobscan analyze page.html --frame /embed/1=frame.html  Supply an iframe document
  jobscan analyze posting.html --json                  Print the popup's JSON response
  jobscan analyze posting.html --html                  Print the badge markup
  jobscan settings set --api-key sk-...                Enable AI fallback
"#)]
pub struct Cli {
    /// Show debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Analyze a job posting (file path or URL)
    Analyze {
        /// Saved HTML file or http(s) URL
        #[arg(value_name = "FILE|URL")]
        target: String,

        /// Document for an embedded frame, as SRC=FILE (repeatable)
        #[arg(long = "frame", value_name = "SRC=FILE")]
        frames: Vec<String>,

        /// Print the analysis as JSON
        #[arg(long)]
        json: bool,

        /// Print the badge markup a page host would insert
        #[arg(long, conflicts_with = "json")]
        html: bool,

        /// Never call the external classifier
        #[arg(long)]
        no_ai: bool,
    },

    /// Manage persisted settings
    #[command(subcommand)]
    Settings(SettingsCommands),
}

#[derive(Subcommand)]
pub enum SettingsCommands {
    /// Show current settings
    Show {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Update settings
    Set {
        /// OpenAI API key (must start with "sk-"; empty string clears it)
        #[arg(long)]
        api_key: Option<String>,

        /// Use the external classifier for inconclusive pages
        #[arg(long)]
        enable_ai: Option<bool>,

        /// Fade the badge after a few seconds
        #[arg(long)]
        auto_hide: Option<bool>,

        /// Show the badge even when nothing was found
        #[arg(long)]
        show_always: Option<bool>,
    },
}

use clap::{ArgAction, Parser};

#[derive(Parser, Debug)]
#[command(
    version,
    about = "Fetch a URL in chunks, display a progress bar and calculate checksums",
    long_about = None
)]
pub struct Cli {
    /// URL to download
    #[arg(required = true, index = 1)]
    pub url: String,

    /// Calculate the given checksum type, e.g. MD5 or SHA256 (may be
    /// specified multiple times to calculate different digest types at the
    /// same time)
    #[arg(short, long, value_name = "CHECKSUM", action = ArgAction::Append)]
    pub checksum: Vec<String>,

    /// Output path; an existing directory derives the file name from the
    /// URL, and '-' writes to stdout
    #[arg(short, long, value_name = "PATH")]
    pub output: Option<String>,

    /// Show progress while downloading
    #[arg(short, long, action = ArgAction::SetTrue)]
    pub progress: bool,

    /// Authenticate as HTTP_USER with basic authentication (asks for the
    /// password)
    #[arg(short, long, value_name = "HTTP_USER")]
    pub user: Option<String>,

    /// Print debugging messages
    #[arg(short, long, action = ArgAction::SetTrue)]
    pub verbose: bool,

    /// Chunk size in bytes (supports K, M, G suffixes)
    #[arg(long, value_name = "SIZE")]
    pub chunk_size: Option<String>,

    /// Custom HTTP header (format: 'Name: Value')
    #[arg(short = 'H', long, value_name = "HEADER", action = ArgAction::Append)]
    pub header: Vec<String>,

    /// Custom User-Agent header
    #[arg(long, value_name = "STRING")]
    pub user_agent: Option<String>,
}

use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "audiomark", about = "Identify an audio clip against a library of reference recordings")]
pub struct Cli {
    /// Reference audio file to add to the library (WAV, MP3, FLAC, OGG). Repeat for each file
    #[arg(short, long, value_name = "FILE")]
    pub reference: Vec<PathBuf>,

    /// Audio clip to identify against the references
    #[arg(short, long, value_name = "FILE")]
    pub query: Option<PathBuf>,

    /// Config file (TOML). Defaults to audiomark.toml or the user config directory
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Minimum votes for a match to be reported as likely
    #[arg(long, default_value_t = 5)]
    pub min_votes: usize,

    /// Start of the query excerpt, in seconds
    #[arg(long, default_value_t = 0.0)]
    pub query_start: f32,

    /// Length of the query excerpt, in seconds (default: to the end)
    #[arg(long)]
    pub query_duration: Option<f32>,

    /// Write the query spectrogram as JSON
    #[arg(long, value_name = "FILE")]
    pub spectrogram_out: Option<PathBuf>,
}

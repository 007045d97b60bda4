use std::path::PathBuf;

use clap::Parser;

#[derive(Parser, Debug)]
#[command(
    name = "fragview",
    author,
    version,
    about = "Full-viewport procedural shader viewer",
    arg_required_else_help = false
)]
pub struct Cli {
    /// Shader to start with (catalog name); defaults to the first entry.
    #[arg(value_name = "NAME")]
    pub shader: Option<String>,

    /// Directory scanned for `*.frag` shader files.
    #[arg(
        long,
        value_name = "DIR",
        env = "FRAGVIEW_SHADER_DIR",
        default_value = "shaders"
    )]
    pub shader_dir: PathBuf,

    /// Configuration file (defaults to `fragview.toml` when present).
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Seconds between automatic shader changes (0 disables auto-advance).
    #[arg(long, value_name = "SECONDS")]
    pub interval: Option<f32>,

    /// Disable timed auto-advance; arrow keys still switch shaders.
    #[arg(long)]
    pub no_auto: bool,

    /// Window size (e.g. `1280x720`).
    #[arg(long, value_name = "WIDTHxHEIGHT")]
    pub size: Option<String>,

    /// List catalogued shaders and exit.
    #[arg(long)]
    pub list: bool,
}

pub fn parse() -> Cli {
    Cli::parse()
}

use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "zapchat-server",
    version,
    about = "Chat assistant for OWASP ZAP scan reports"
)]
pub(crate) struct Args {
    #[arg(long, default_value = "config/zapchat.toml")]
    pub(crate) config: PathBuf,
    /// Overrides `listen_addr` from the config file.
    #[arg(long)]
    pub(crate) listen_addr: Option<String>,
    /// Also write JSON logs, rotated daily, into this directory.
    #[arg(long)]
    pub(crate) log_dir: Option<PathBuf>,
    #[arg(long, default_value_t = false)]
    pub(crate) log_to_stderr: bool,
}

use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "ftth-predict-server")]
#[command(author, version, about = "Serve the FTTH regression model over HTTP", long_about = None)]
pub struct Cli {
    /// Configuration file path
    #[arg(short, long, default_value = "config.yaml", env = "FTTH_PREDICT_CONFIG")]
    pub config: String,

    /// Listen address
    #[arg(short = 'l', long, env = "FTTH_PREDICT_LISTEN")]
    pub listen: Option<String>,

    /// Listen port
    #[arg(short = 'P', long, env = "FTTH_PREDICT_PORT")]
    pub port: Option<u16>,

    /// Scaler artifact path (JSON or YAML)
    #[arg(short, long, env = "FTTH_PREDICT_SCALER")]
    pub scaler: Option<PathBuf>,

    /// Model artifact path (JSON or YAML)
    #[arg(short, long, env = "FTTH_PREDICT_MODEL")]
    pub model: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,
}

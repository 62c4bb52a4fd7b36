use crate::engine::{RecognitionOptions, DEFAULT_CHAR_WHITELIST, DEFAULT_LANGUAGE};
use crate::preprocessing::{Preset, Quantize};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

pub const DEFAULT_HOST: &str = "127.0.0.1";
pub const DEFAULT_PORT: u16 = 9292;
pub const DEFAULT_MAX_FILE_SIZE: usize = 10 * 1024 * 1024;

#[derive(Parser, Debug)]
#[command(name = "licence-capture")]
#[command(about = "Extract text from driving licence images")]
#[command(version)]
pub struct Args {
    #[command(subcommand)]
    pub command: Command,

    /// Language hint for OCR (e.g., "eng")
    #[arg(long, env = "CAPTURE_LANGUAGE", default_value = DEFAULT_LANGUAGE, global = true)]
    pub language: String,

    /// Characters the OCR engine may produce (empty string disables the restriction)
    #[arg(
        long,
        env = "CAPTURE_CHAR_WHITELIST",
        default_value = DEFAULT_CHAR_WHITELIST,
        global = true
    )]
    pub char_whitelist: String,

    /// Maximum upload size in bytes (default: 10MB)
    #[arg(long, env = "CAPTURE_MAX_FILE_SIZE", default_value = "10485760", global = true)]
    pub max_file_size: usize,

    /// How preprocessed channel values are stored back into 8 bits
    #[arg(
        long,
        value_enum,
        env = "CAPTURE_QUANTIZE",
        default_value_t = Quantize::Truncate,
        global = true
    )]
    pub quantize: Quantize,

    /// Path to tessdata directory (downloaded on demand if not set)
    #[arg(long, env = "TESSDATA_PREFIX", global = true)]
    pub tessdata_path: Option<String>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, env = "RUST_LOG", default_value = "info", global = true)]
    pub log_level: String,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run the HTTP server
    Serve {
        /// Host address to bind to
        #[arg(long, env = "CAPTURE_HOST", default_value = DEFAULT_HOST)]
        host: String,

        /// Port to listen on
        #[arg(long, env = "CAPTURE_PORT", default_value = "9292")]
        port: u16,
    },

    /// Extract text from a single image file
    Extract {
        /// Image of the licence
        file: PathBuf,

        /// OCR engine to use (defaults to the first available)
        #[arg(long)]
        engine: Option<String>,

        /// Preprocessing preset
        #[arg(long, value_enum, default_value_t = Preset::Default)]
        preset: Preset,

        /// Print the final submission state as JSON
        #[arg(long)]
        json: bool,

        /// Write the preprocessed image to this path
        #[arg(long)]
        save_preprocessed: Option<PathBuf>,
    },
}

/// Runtime configuration
#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub recognition: RecognitionOptions,
    pub max_file_size: usize,
    pub tessdata_path: Option<String>,
    pub quantize: Quantize,
    pub preset: Preset,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            recognition: RecognitionOptions::default(),
            max_file_size: DEFAULT_MAX_FILE_SIZE,
            tessdata_path: None,
            quantize: Quantize::default(),
            preset: Preset::default(),
        }
    }
}

impl From<&Args> for Config {
    fn from(args: &Args) -> Self {
        let (host, port) = match &args.command {
            Command::Serve { host, port } => (host.clone(), *port),
            Command::Extract { .. } => (DEFAULT_HOST.to_string(), DEFAULT_PORT),
        };
        let preset = match &args.command {
            Command::Extract { preset, .. } => *preset,
            Command::Serve { .. } => Preset::Default,
        };

        Self {
            host,
            port,
            recognition: RecognitionOptions {
                language: args.language.clone(),
                char_whitelist: args.char_whitelist.clone(),
            },
            max_file_size: args.max_file_size,
            tessdata_path: args.tessdata_path.clone(),
            quantize: args.quantize,
            preset,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_serve_defaults() {
        let args = Args::try_parse_from(["licence-capture", "serve"]).unwrap();
        let config = Config::from(&args);
        assert_eq!(config.port, DEFAULT_PORT);
        assert_eq!(config.recognition, RecognitionOptions::default());
        assert_eq!(config.quantize, Quantize::Truncate);
    }

    #[test]
    fn test_extract_with_global_options() {
        let args = Args::try_parse_from([
            "licence-capture",
            "extract",
            "licence.png",
            "--preset",
            "none",
            "--quantize",
            "round-half-even",
            "--char-whitelist",
            "0123456789",
        ])
        .unwrap();
        let config = Config::from(&args);
        assert_eq!(config.preset, Preset::None);
        assert_eq!(config.quantize, Quantize::RoundHalfEven);
        assert_eq!(config.recognition.char_whitelist, "0123456789");
    }
}

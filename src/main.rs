use clap::Parser;
use licence_capture::capture::{CaptureService, ExtractRequest};
use licence_capture::config::{Args, Command, Config};
use licence_capture::engines::EngineRegistry;
use licence_capture::error::CaptureError;
use licence_capture::server;
use licence_capture::state::{Submission, SubmissionState};
use licence_capture::upload::{self, Upload};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    let args = Args::parse();

    // Logs go to stderr so extracted text on stdout stays clean
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| args.log_level.clone().into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let config = Config::from(&args);

    match args.command {
        Command::Serve { .. } => {
            tracing::info!("Starting licence-capture v{}", env!("CARGO_PKG_VERSION"));
            tracing::info!("Binding to {}:{}", config.host, config.port);
            server::run(config).await?;
            Ok(ExitCode::SUCCESS)
        }
        Command::Extract {
            file,
            engine,
            json,
            save_preprocessed,
            ..
        } => Ok(extract(config, &file, engine, json, save_preprocessed).await),
    }
}

/// One submission from the command line
async fn extract(
    config: Config,
    file: &Path,
    engine: Option<String>,
    json: bool,
    save_preprocessed: Option<PathBuf>,
) -> ExitCode {
    let mut submission = Submission::new();

    // Rejected files must not trigger engine initialization (and its model downloads)
    let upload = match Upload::from_path(file).and_then(|u| {
        upload::validate(Some(&u), config.max_file_size)?;
        Ok(u)
    }) {
        Ok(u) => u,
        Err(err) => {
            submission.fail(&err);
            return report(&submission, json);
        }
    };

    let registry = match EngineRegistry::new(&config) {
        Ok(registry) => registry,
        Err(err) => {
            submission.fail(&CaptureError::from(err));
            return report(&submission, json);
        }
    };

    let service = CaptureService::new(Arc::new(registry), &config);
    let request = ExtractRequest {
        engine,
        ..Default::default()
    };

    if let Ok(extraction) = submission.submit(&service, Some(upload), &request).await {
        if let Some(path) = save_preprocessed {
            match extraction.preprocessing.image.save(&path) {
                Ok(()) => tracing::info!("Saved preprocessed image to {:?}", path),
                Err(e) => tracing::warn!("Failed to save preprocessed image to {:?}: {}", path, e),
            }
        }
    }

    report(&submission, json)
}

fn report(submission: &Submission, json: bool) -> ExitCode {
    if json {
        match serde_json::to_string_pretty(submission.state()) {
            Ok(out) => println!("{}", out),
            Err(e) => tracing::error!("Failed to serialize state: {}", e),
        }
    }

    match submission.state() {
        SubmissionState::Success { text } => {
            if !json {
                println!("{}", text);
            }
            ExitCode::SUCCESS
        }
        SubmissionState::Failed { message } => {
            if !json {
                eprintln!("{}", message);
            }
            ExitCode::FAILURE
        }
        SubmissionState::Idle | SubmissionState::Loading => ExitCode::FAILURE,
    }
}

pub mod commands;
pub mod config;
pub mod error;
pub mod models;
pub mod services;

#[cfg(test)]
mod testing;

use commands::gallery::Gallery;
use commands::tryon::{TryOnWorkflow, WorkflowSettings};
use config::AppConfig;
use error::AppError;
use models::tryon_types::format_timestamp;
use services::api_client::HttpBackend;
use services::notifier::ConsoleNotifier;
use services::platform::DesktopPlatform;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::error;

const INTERRUPTED: i32 = 130;

const USAGE: &str = "usage:
  dress-tryon tryon <dress-url> <photo-path>
  dress-tryon gallery
  dress-tryon feedback <tryon-id> <rating 1-5> [comment...]
  dress-tryon feedback-list <tryon-id>";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    TryOn { dress_url: String, photo: PathBuf },
    Gallery,
    Feedback { tryon_id: String, rating: u8, comment: String },
    FeedbackList { tryon_id: String },
}

impl Command {
    pub fn parse(args: &[String]) -> Result<Self, String> {
        let args: Vec<&str> = args.iter().map(String::as_str).collect();
        match args.as_slice() {
            ["tryon", dress_url, photo] => Ok(Command::TryOn {
                dress_url: dress_url.to_string(),
                photo: PathBuf::from(*photo),
            }),
            ["gallery"] => Ok(Command::Gallery),
            ["feedback", tryon_id, rating, comment @ ..] => {
                let rating = rating
                    .parse::<u8>()
                    .map_err(|_| format!("invalid rating: {}", rating))?;
                Ok(Command::Feedback {
                    tryon_id: tryon_id.to_string(),
                    rating,
                    comment: comment.join(" "),
                })
            }
            ["feedback-list", tryon_id] => Ok(Command::FeedbackList {
                tryon_id: tryon_id.to_string(),
            }),
            [] => Err("missing command".to_string()),
            [other, ..] => Err(format!("unknown or incomplete command: {}", other)),
        }
    }
}

pub async fn run(args: Vec<String>) -> ExitCode {
    let command = match Command::parse(&args) {
        Ok(c) => c,
        Err(msg) => {
            eprintln!("{}\n\n{}", msg, USAGE);
            return ExitCode::from(2);
        }
    };

    let config = match AppConfig::from_env().and_then(config::init) {
        Ok(c) => c,
        Err(e) => {
            error!(error = %e, "config error");
            return ExitCode::FAILURE;
        }
    };

    let backend = match HttpBackend::new(config) {
        Ok(b) => b,
        Err(e) => {
            error!(error = %e, "failed to create backend client");
            return ExitCode::FAILURE;
        }
    };

    let result = match command {
        Command::TryOn { dress_url, photo } => run_tryon(config, backend, &dress_url, &photo).await,
        Command::Gallery => run_gallery(backend).await,
        Command::Feedback {
            tryon_id,
            rating,
            comment,
        } => run_feedback(backend, &tryon_id, rating, &comment).await,
        Command::FeedbackList { tryon_id } => run_feedback_list(backend, &tryon_id).await,
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(error = %e, kind = ?e.kind, "command failed");
            ExitCode::FAILURE
        }
    }
}

async fn run_tryon(
    config: &AppConfig,
    backend: HttpBackend,
    dress_url: &str,
    photo_path: &Path,
) -> Result<(), AppError> {
    let platform = DesktopPlatform::new(config.download_dir.clone());
    let mut workflow = TryOnWorkflow::new(
        backend,
        ConsoleNotifier,
        platform,
        WorkflowSettings::from_config(config),
    );

    workflow.set_dress_url(dress_url)?;
    let photo = workflow.attach_photo_file(photo_path).await?;
    println!(
        "Photo: {} ({}x{}, {} bytes)",
        photo.file_name,
        photo.width,
        photo.height,
        photo.size()
    );
    workflow.continue_to_preview()?;
    println!("Dress: {}", workflow.draft().dress_url);

    // Installing the listener replaces default SIGINT handling for the whole
    // process, so it stays alive until the command returns. An interrupt
    // once the handle is already tripped exits.
    let cancel = workflow.cancel_handle();
    let ctrl_c = tokio::spawn(async move {
        while tokio::signal::ctrl_c().await.is_ok() {
            if cancel.is_cancelled() {
                std::process::exit(INTERRUPTED);
            }
            cancel.cancel();
        }
    });

    let mut progress = workflow.subscribe_progress();
    let reporter = tokio::spawn(async move {
        while progress.changed().await.is_ok() {
            let current = progress.borrow_and_update().clone();
            if !current.is_idle() {
                eprintln!("[{:>3}%] {}", current.percent, current.step_label);
            }
        }
    });

    let submitted = workflow.submit().await.map(|job| job.id().to_string());
    reporter.abort();

    let saved = match submitted {
        Ok(job_id) => {
            println!("Try-on {} ready", job_id);
            // nothing left to abandon; the next interrupt exits
            workflow.cancel_handle().cancel();
            workflow.download().await
        }
        Err(e) => Err(e),
    };
    ctrl_c.abort();

    let path = saved?;
    println!("Saved to {}", path.display());
    Ok(())
}

async fn run_gallery(backend: HttpBackend) -> Result<(), AppError> {
    let mut gallery = Gallery::new(backend, ConsoleNotifier);
    let entries = gallery.load().await?;

    if entries.is_empty() {
        println!("No try-ons yet");
        return Ok(());
    }

    for entry in entries {
        println!(
            "{}  {}  {:?}  {}  {}",
            entry.id(),
            format_timestamp(&entry.descriptor.timestamp),
            entry.descriptor.status,
            if entry.has_images() { "images" } else { "no images" },
            entry.descriptor.dress_url
        );
    }
    Ok(())
}

async fn run_feedback(
    backend: HttpBackend,
    tryon_id: &str,
    rating: u8,
    comment: &str,
) -> Result<(), AppError> {
    let mut gallery = Gallery::new(backend, ConsoleNotifier);
    gallery.load().await?;
    gallery.select(tryon_id)?;
    if rating != 0 {
        gallery.set_rating(rating)?;
    }
    gallery.set_comment(comment);
    gallery.submit_feedback().await
}

async fn run_feedback_list(backend: HttpBackend, tryon_id: &str) -> Result<(), AppError> {
    let gallery = Gallery::new(backend, ConsoleNotifier);
    let records = gallery.load_feedback(tryon_id).await?;

    if records.is_empty() {
        println!("No feedback for {}", tryon_id);
    }
    for record in records {
        println!(
            "{}  {}/5  {}  {}",
            record.id,
            record.rating,
            format_timestamp(&record.timestamp),
            record.comment.as_deref().unwrap_or("")
        );
    }
    Ok(())
}

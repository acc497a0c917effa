// src/main.rs — demo CLI: upload a document, then ask one question per
// audio file, reusing the parsed document for follow-ups.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing_subscriber::EnvFilter;
use vaani::config::AppConfig;
use vaani::pipeline::{PipelineRunner, StageStatus};
use vaani::sarvam::SarvamClient;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("vaani=info")),
        )
        .init();

    let mut args = std::env::args().skip(1);
    let document_path = match args.next() {
        Some(path) => PathBuf::from(path),
        None => {
            eprintln!("Usage: vaani <document.pdf|image> <question.wav>...");
            std::process::exit(2);
        }
    };
    let audio_paths: Vec<PathBuf> = args.map(PathBuf::from).collect();
    if audio_paths.is_empty() {
        eprintln!("Usage: vaani <document.pdf|image> <question.wav>...");
        std::process::exit(2);
    }

    let config = AppConfig::from_env()?;
    let client = SarvamClient::new(&config);
    let runner = Arc::new(PipelineRunner::new(Arc::new(client)));

    // Stream stage transitions to stderr while runs are in flight
    let mut rx = runner.subscribe();
    let progress = tokio::spawn(async move {
        let mut last = rx.borrow_and_update().clone();
        while rx.changed().await.is_ok() {
            let snap = rx.borrow_and_update().clone();
            for (stage, state) in snap.iter() {
                if state != last.get(stage) {
                    match state.status {
                        StageStatus::Active => {
                            eprintln!("  [{}] {} ...", stage.label(), stage.service_name())
                        }
                        StageStatus::Done => {
                            let secs = state
                                .elapsed
                                .map(|d| d.as_secs_f32())
                                .unwrap_or_default();
                            eprintln!("  [{}] done ({:.1}s)", stage.label(), secs)
                        }
                        StageStatus::Error => eprintln!("  [{}] error", stage.label()),
                        StageStatus::Idle => {}
                    }
                }
            }
            last = snap;
        }
    });

    let file_name = document_path
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("document");
    let bytes = tokio::fs::read(&document_path).await?;
    let mime_type = guess_mime(&document_path);

    println!("Uploading {} ({})", file_name, mime_type);
    let document = runner.upload_document(file_name, &bytes, mime_type).await?;
    println!(
        "Parsed: {} pages, {} chars of text\n",
        document.page_count,
        document.text.len()
    );

    for (i, audio_path) in audio_paths.iter().enumerate() {
        let audio = tokio::fs::read(audio_path).await?;
        println!("Question {} ({})", i + 1, audio_path.display());

        match runner.ask(&audio).await {
            Ok(turn) => {
                println!("  Q: {}", turn.question);
                println!("  A ({}): {}", turn.language_code, turn.answer_translated);
                if turn.answer_translated != turn.answer_english {
                    println!("  A (en-IN): {}", turn.answer_english);
                }
                if let Some(audio) = &turn.audio {
                    let out = format!("answer-{}.mp3", i + 1);
                    tokio::fs::write(&out, audio).await?;
                    println!("  Audio: {} ({} bytes)", out, audio.len());
                }
                println!(
                    "  Total: {:.1}s\n",
                    turn.total_elapsed.as_secs_f32()
                );
            }
            Err(e) => {
                eprintln!("  Turn failed: {}\n", e);
            }
        }
    }

    progress.abort();
    Ok(())
}

fn guess_mime(path: &Path) -> &'static str {
    match path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .as_deref()
    {
        Some("png") => "image/png",
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("webp") => "image/webp",
        _ => "application/pdf",
    }
}

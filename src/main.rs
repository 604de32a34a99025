use anyhow::{Context, Result};
use clap::Parser;
use ghiblify::app::App;
use ghiblify::models::UploadRequest;
use std::path::{Path, PathBuf};
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Debug, Parser)]
#[command(name = "ghiblify")]
#[command(about = "Convert a photo into Studio Ghibli-style artwork")]
struct CliArgs {
    /// Path to the photo to convert.
    #[arg(value_name = "IMAGE")]
    image: PathBuf,

    /// Download the converted image into this directory.
    #[arg(long, value_name = "DIR")]
    output: Option<PathBuf>,
}

fn mime_type_for(path: &Path) -> &'static str {
    match path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_ascii_lowercase())
        .as_deref()
    {
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("png") => "image/png",
        Some("webp") => "image/webp",
        Some("gif") => "image/gif",
        _ => "application/octet-stream",
    }
}

async fn download_result(url: &str, dir: &Path) -> ghiblify::Result<PathBuf> {
    let bytes = reqwest::get(url)
        .await?
        .error_for_status()?
        .bytes()
        .await?;

    let path = dir.join("ghibli-style-image.png");
    std::fs::write(&path, &bytes)?;
    Ok(path)
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "ghiblify=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting ghiblify");

    let args = CliArgs::parse();

    let bytes = std::fs::read(&args.image)
        .with_context(|| format!("Failed to read {}", args.image.display()))?;
    let upload = UploadRequest::new(bytes, mime_type_for(&args.image));

    match App::new().await {
        Ok(app) => match app.convert(upload).await {
            Ok(result) => {
                for url in &result.output_urls {
                    println!("{}", url);
                }

                if let Some(dir) = args.output {
                    std::fs::create_dir_all(&dir)?;
                    let path = download_result(result.primary_url(), &dir).await?;
                    info!("Saved converted image to {}", path.display());
                }
                Ok(())
            }
            Err(e) => {
                error!("Conversion failed: {}", e);
                std::process::exit(1);
            }
        },
        Err(e) => {
            error!("Failed to initialize application: {}", e);
            std::process::exit(1);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{download_result, mime_type_for};
    use std::path::Path;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[test]
    fn test_mime_type_for_known_extensions() {
        assert_eq!(mime_type_for(Path::new("photo.JPG")), "image/jpeg");
        assert_eq!(mime_type_for(Path::new("photo.jpeg")), "image/jpeg");
        assert_eq!(mime_type_for(Path::new("photo.png")), "image/png");
        assert_eq!(mime_type_for(Path::new("photo.webp")), "image/webp");
    }

    #[test]
    fn test_mime_type_for_unknown_extension() {
        assert_eq!(
            mime_type_for(Path::new("notes.txt")),
            "application/octet-stream"
        );
        assert_eq!(mime_type_for(Path::new("no-extension")), "application/octet-stream");
    }

    #[tokio::test]
    async fn test_download_result_writes_file() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/result.png"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(b"png bytes".to_vec()))
            .mount(&server)
            .await;

        let dir = tempfile::tempdir().unwrap();
        let saved = download_result(&format!("{}/result.png", server.uri()), dir.path())
            .await
            .unwrap();

        assert_eq!(saved.file_name().unwrap(), "ghibli-style-image.png");
        assert_eq!(std::fs::read(&saved).unwrap(), b"png bytes");
    }

    #[tokio::test]
    async fn test_download_result_fails_on_http_error() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/result.png"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let dir = tempfile::tempdir().unwrap();
        let result = download_result(&format!("{}/result.png", server.uri()), dir.path()).await;

        assert!(result.is_err());
    }
}

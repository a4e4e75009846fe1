use anyhow::{anyhow, Context, Result};
use bollard::image::{ImportImageOptions, ListImagesOptions, TagImageOptions};
use bollard::models::BuildInfo;
use bollard::Docker;
use bytes::Bytes;
use futures_util::{stream, Stream, StreamExt};
use log::{debug, trace};
use serde_json::{Map, Value};
use std::fs::File;
use std::io::{self, Read, Write};
use std::path::Path;
use std::sync::{Arc, Mutex};
use tokio::runtime::Runtime;

use super::ImageEngine;
use crate::image::LocalImage;
use crate::reference::ImageReference;

/// Size of each body chunk sent while loading an archive.
const IMPORT_CHUNK_SIZE: usize = 64 * 1024;

/// Docker Engine API implementation of the [`ImageEngine`] trait.
///
/// The async client is driven from a current-thread runtime owned by the
/// engine, so each call runs to completion before the next one starts.
pub struct DockerEngine {
    client: Docker,
    runtime: Runtime,
}

impl DockerEngine {
    /// Connects using the standard Docker environment (`DOCKER_HOST` and friends)
    /// and adopts the API version reported by the server.
    pub fn new() -> Result<Self> {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .context("Failed to create async runtime")?;

        let client = runtime.block_on(async {
            let client = Docker::connect_with_defaults()
                .context("Failed to connect to Docker engine. Is Docker running?")?;
            client
                .negotiate_version()
                .await
                .context("Failed to query Docker engine version")
        })?;

        debug!("Negotiated Docker API version {}", client.client_version());

        Ok(Self { client, runtime })
    }
}

impl ImageEngine for DockerEngine {
    fn name(&self) -> &str {
        "docker"
    }

    fn list_images(&self) -> Result<Vec<LocalImage>> {
        let options = ListImagesOptions::<String> {
            all: false,
            ..Default::default()
        };

        let summaries = self
            .runtime
            .block_on(self.client.list_images(Some(options)))
            .context("Failed to list Docker images")?;

        trace!("Docker reported {} images", summaries.len());

        Ok(summaries
            .into_iter()
            .map(|summary| LocalImage::new(summary.id, summary.repo_tags))
            .collect())
    }

    fn export_image(&self, image_id: &str, writer: &mut dyn Write) -> Result<u64> {
        self.runtime.block_on(async {
            let mut stream = Box::pin(self.client.export_image(image_id));
            let mut written = 0u64;

            while let Some(chunk) = stream.next().await {
                let chunk = chunk.context(format!("Failed to export image {}", image_id))?;
                writer
                    .write_all(&chunk)
                    .context(format!("Failed to write export of image {}", image_id))?;
                written += chunk.len() as u64;
            }

            Ok(written)
        })
    }

    fn import_image(&self, archive: &Path) -> Result<String> {
        let file = File::open(archive)
            .context(format!("Failed to open image archive: {}", archive.display()))?;
        debug!("Importing {} into Docker", archive.display());

        let read_error = Arc::new(Mutex::new(None));
        let body = archive_chunks(file, Arc::clone(&read_error));

        let result = self.runtime.block_on(async {
            let options = ImportImageOptions { quiet: true };
            let mut stream = Box::pin(self.client.import_image_stream(options, body, None));
            let mut response = String::new();

            while let Some(message) = stream.next().await {
                let message = message
                    .context(format!("Failed to load image archive: {}", archive.display()))?;
                response.push_str(
                    &render_load_message(&message)
                        .context(format!("Failed to load image archive: {}", archive.display()))?,
                );
                response.push('\n');
            }

            Ok(response)
        });

        // A failed read ends the body early; report that instead of the engine's reaction to it
        if let Some(err) = take_read_error(&read_error) {
            return Err(anyhow::Error::new(err)
                .context(format!("Failed to read image archive: {}", archive.display())));
        }
        result
    }

    fn tag_image(&self, source: &str, target: &ImageReference) -> Result<()> {
        let options = TagImageOptions {
            repo: target.repository.clone(),
            tag: target.tag.clone(),
        };

        self.runtime
            .block_on(self.client.tag_image(source, Some(options)))
            .context(format!("Failed to tag image {} as {}", source, target))
    }

    fn remove_image(&self, reference: &str) -> Result<()> {
        let removed = self
            .runtime
            .block_on(self.client.remove_image(reference, None, None))
            .context(format!("Failed to remove image {}", reference))?;

        trace!("Removal of {} returned {} entries", reference, removed.len());
        Ok(())
    }
}

/// Streams `file` in fixed-size chunks for the load endpoint.
///
/// The endpoint takes plain `Bytes`, so a read failure ends the stream and is
/// parked in `read_error` for the caller to pick up.
fn archive_chunks(
    file: File,
    read_error: Arc<Mutex<Option<io::Error>>>,
) -> impl Stream<Item = Bytes> + Send + 'static {
    stream::unfold(Some(file), move |file| {
        let read_error = Arc::clone(&read_error);
        async move {
            let mut file = file?;
            let mut buf = vec![0u8; IMPORT_CHUNK_SIZE];
            match file.read(&mut buf) {
                Ok(0) => None,
                Ok(n) => {
                    buf.truncate(n);
                    Some((Bytes::from(buf), Some(file)))
                }
                Err(err) => {
                    if let Ok(mut slot) = read_error.lock() {
                        *slot = Some(err);
                    }
                    None
                }
            }
        }
    })
}

fn take_read_error(read_error: &Mutex<Option<io::Error>>) -> Option<io::Error> {
    read_error.lock().ok().and_then(|mut slot| slot.take())
}

/// Renders one load progress message as a JSON line.
/// A message carrying an `error` is the engine rejecting the archive.
fn render_load_message(message: &BuildInfo) -> Result<String> {
    if let Some(error) = &message.error {
        return Err(anyhow!("{}", error));
    }

    let mut fields = Map::new();
    let text_fields = [
        ("id", &message.id),
        ("status", &message.status),
        ("progress", &message.progress),
        ("stream", &message.stream),
    ];
    for (key, value) in text_fields {
        if let Some(value) = value {
            fields.insert(key.to_string(), Value::String(value.clone()));
        }
    }

    Ok(Value::Object(fields).to_string())
}

//! Bulk image operations over a concrete [`ImageEngine`].
//!
//! [`ImageShuttle`] runs the four commands as plain sequential loops:
//! - [`ImageShuttle::save_all`] — export every tagged image to `<repo>-<tag>.tar`,
//! - [`ImageShuttle::load_all`] — import every entry of a directory,
//! - [`ImageShuttle::replace_all`] — add a tag with the registry hostname rewritten,
//! - [`ImageShuttle::delete_all`] — remove every tag carrying a registry hostname.
//!
//! The first failing engine call or file operation aborts the whole run; nothing
//! is retried and no partial results are returned.

use anyhow::{bail, Context, Result};
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use crate::engines::ImageEngine;
use crate::notifier::Notifier;
use crate::reference::{self, ImageReference};

/// Number of response bytes shown per loaded archive.
pub const LOAD_RESPONSE_LIMIT: usize = 4096;

/// One archive written by [`ImageShuttle::save_all`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SavedArchive {
    pub image_id: String,
    pub reference: String,
    /// Repository with slashes turned into dashes, as shown in the report line.
    pub image_name: String,
    pub path: PathBuf,
    pub bytes: u64,
}

/// One directory entry fed to the engine by [`ImageShuttle::load_all`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadedArchive {
    pub path: PathBuf,
    /// Engine response, cut to [`LOAD_RESPONSE_LIMIT`] bytes.
    pub response: String,
}

/// One tag added by [`ImageShuttle::replace_all`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Retag {
    pub source: String,
    pub target: String,
}

pub struct ImageShuttle<E: ImageEngine> {
    engine: E,
    notifier: Notifier,
}

impl<E: ImageEngine> ImageShuttle<E> {
    pub fn new(engine: E, notifier: Notifier) -> Self {
        Self { engine, notifier }
    }

    pub fn engine(&self) -> &E {
        &self.engine
    }

    /// Exports every image whose first tag splits into `repository:tag` into
    /// `save_dir`, one archive per image.
    ///
    /// Untagged images and tags with more or fewer than one `:` are skipped.
    /// The export is requested by image ID, so an image carrying several tags
    /// produces a single archive named after its first tag.
    pub fn save_all(&self, save_dir: &Path) -> Result<Vec<SavedArchive>> {
        fs::create_dir_all(save_dir).context(format!(
            "Failed to create save directory: {}",
            save_dir.display()
        ))?;

        self.notifier
            .info(&format!("Listing images from {}...", self.engine.name()));
        let images = self.engine.list_images()?;
        let total = images.len() as u64;
        let progress_bar = self.notifier.create_progress_bar(total, "Saving images");

        let mut saved = Vec::new();
        for (i, image) in images.iter().enumerate() {
            if let Some(pb) = &progress_bar {
                pb.set_position(i as u64);
            }
            self.notifier.progress(i as u64 + 1, total, "Saving images");

            let Some(tag) = image.primary_tag() else {
                self.notifier
                    .debug(&format!("Skipping untagged image {}", image.id));
                continue;
            };
            let Some(name) = reference::archive_name(tag) else {
                self.notifier
                    .debug(&format!("Skipping image {} with tag '{}'", image.id, tag));
                continue;
            };

            let path = save_dir.join(&name.file_name);
            self.notifier
                .info(&format!("Exporting image '{}' to {}...", tag, path.display()));

            let file = File::create(&path)
                .context(format!("Failed to create file {}", path.display()))?;
            let mut writer = BufWriter::new(file);
            let bytes = self
                .engine
                .export_image(&image.id, &mut writer)
                .context(format!("Failed to save image {}", tag))?;
            writer
                .flush()
                .context(format!("Failed to write data to file {}", path.display()))?;

            self.notifier.report(&format!(
                "Image {} saved as {}",
                name.image_name, name.file_name
            ));

            saved.push(SavedArchive {
                image_id: image.id.clone(),
                reference: tag.to_string(),
                image_name: name.image_name,
                path,
                bytes,
            });
        }

        if let Some(pb) = progress_bar {
            pb.finish_with_message(format!("Saved {} images", saved.len()));
        }
        self.notifier.finish();

        Ok(saved)
    }

    /// Imports every entry of `load_dir` in directory-listing order.
    ///
    /// Entries are not filtered by type or extension: a file the engine cannot
    /// load, or a subdirectory, aborts the run with the resulting error.
    pub fn load_all(&self, load_dir: &Path) -> Result<Vec<LoadedArchive>> {
        let entries = fs::read_dir(load_dir)
            .context(format!("Failed to read load directory: {}", load_dir.display()))?
            .map(|entry| entry.map(|e| e.path()))
            .collect::<std::io::Result<Vec<PathBuf>>>()
            .context(format!("Failed to list load directory: {}", load_dir.display()))?;

        let total = entries.len() as u64;
        let progress_bar = self.notifier.create_progress_bar(total, "Loading images");

        let mut loaded = Vec::new();
        for (i, path) in entries.into_iter().enumerate() {
            if let Some(pb) = &progress_bar {
                pb.set_position(i as u64);
            }
            self.notifier.progress(i as u64 + 1, total, "Loading images");
            self.notifier
                .info(&format!("Loading {} into {}...", path.display(), self.engine.name()));

            let response = self.engine.import_image(&path)?;
            let response = truncate_response(&response, LOAD_RESPONSE_LIMIT).to_string();
            self.notifier.report(&response);

            loaded.push(LoadedArchive { path, response });
        }

        if let Some(pb) = progress_bar {
            pb.finish_with_message(format!("Loaded {} archives", loaded.len()));
        }
        self.notifier.finish();

        Ok(loaded)
    }

    /// Tags every image reference containing `old_registry` with the hostname
    /// swapped for `new_registry`. Original tags are kept and nothing is pushed.
    ///
    /// An empty `new_registry` is only an error once a tag actually matches,
    /// since `/<path>` is not a valid reference.
    pub fn replace_all(&self, old_registry: &str, new_registry: &str) -> Result<Vec<Retag>> {
        let images = self.engine.list_images()?;

        let mut retags = Vec::new();
        for image in &images {
            for tag in &image.repo_tags {
                let Some(new_tag) = reference::replace_registry(tag, old_registry, new_registry)
                else {
                    continue;
                };
                if new_registry.is_empty() {
                    bail!(
                        "New registry must not be empty: tag '{}' references '{}'",
                        tag,
                        old_registry
                    );
                }

                let target = ImageReference::parse(&new_tag);
                self.engine.tag_image(tag, &target)?;
                self.notifier.report(&format!(
                    "Image [{}] registry updated to [{}]",
                    tag, new_tag
                ));

                retags.push(Retag {
                    source: tag.clone(),
                    target: new_tag,
                });
            }
        }

        if retags.is_empty() {
            self.notifier.warn(&format!(
                "No image tags reference registry '{}'",
                old_registry
            ));
        }

        Ok(retags)
    }

    /// Removes every tag containing `old_registry`.
    pub fn delete_all(&self, old_registry: &str) -> Result<Vec<String>> {
        let images = self.engine.list_images()?;

        let mut removed = Vec::new();
        for image in &images {
            for tag in &image.repo_tags {
                if !reference::contains_registry(tag, old_registry) {
                    continue;
                }

                self.engine.remove_image(tag)?;
                self.notifier.report(&format!("Image [{}] removed", tag));
                removed.push(tag.clone());
            }
        }

        Ok(removed)
    }
}

/// Cuts `response` to at most `limit` bytes without splitting a UTF-8 sequence.
pub fn truncate_response(response: &str, limit: usize) -> &str {
    if response.len() <= limit {
        return response;
    }

    let mut end = limit;
    while !response.is_char_boundary(end) {
        end -= 1;
    }
    &response[..end]
}

use anyhow::Result;
use std::io::Write;
use std::path::Path;

use crate::image::LocalImage;
use crate::reference::ImageReference;

/// Container engine seam used by the bulk image commands.
///
/// Every call is blocking and handles exactly one image or archive, so
/// implementations never need to coordinate concurrent requests.
pub trait ImageEngine {
    /// Returns the name of the engine for identification purposes
    fn name(&self) -> &str;

    /// Lists the top-level images present in the engine's local store
    fn list_images(&self) -> Result<Vec<LocalImage>>;

    /// Streams the engine's export archive for `image_id` verbatim into `writer`.
    /// Returns the number of bytes written.
    fn export_image(&self, image_id: &str, writer: &mut dyn Write) -> Result<u64>;

    /// Feeds the file at `archive` to the engine as an import stream and
    /// returns the engine's textual response
    fn import_image(&self, archive: &Path) -> Result<String>;

    /// Adds `target` as an additional tag of the image referenced by `source`
    fn tag_image(&self, source: &str, target: &ImageReference) -> Result<()>;

    /// Removes the tag `reference` from the local store
    fn remove_image(&self, reference: &str) -> Result<()>;
}

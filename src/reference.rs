use std::fmt;

/// Placeholder tag the engine reports for dangling images.
const DANGLING_TAG: &str = "<none>:<none>";

/// Archive naming for one saved image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveName {
    /// Repository with slashes turned into dashes, e.g. `myorg-app`.
    pub image_name: String,
    /// `<image_name>-<tag>.tar`
    pub file_name: String,
}

/// Derives the archive naming for an image from one of its repository tags.
///
/// The tag must split into exactly two `:`-separated parts; slashes in the
/// repository become dashes. Returns `None` for anything else, including
/// references that carry a registry port (`host:5000/app:1.0`).
pub fn archive_name(repo_tag: &str) -> Option<ArchiveName> {
    if repo_tag == DANGLING_TAG {
        return None;
    }

    let parts: Vec<&str> = repo_tag.split(':').collect();
    if parts.len() != 2 {
        return None;
    }

    let image_name = parts[0].replace('/', "-");
    let file_name = format!("{}-{}.tar", image_name, parts[1]);
    Some(ArchiveName {
        image_name,
        file_name,
    })
}

pub fn archive_file_name(repo_tag: &str) -> Option<String> {
    archive_name(repo_tag).map(|name| name.file_name)
}

/// Plain substring match of a registry hostname within a tag.
pub fn contains_registry(tag: &str, registry: &str) -> bool {
    tag.contains(registry)
}

/// Rewrites every occurrence of `old` in `tag` with `new`.
/// Returns `None` when the tag does not mention `old` at all.
pub fn replace_registry(tag: &str, old: &str, new: &str) -> Option<String> {
    if !contains_registry(tag, old) {
        return None;
    }
    Some(tag.replace(old, new))
}

/// A `repository:tag` pair, split the way the engine's tag endpoint expects it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageReference {
    pub repository: String,
    pub tag: String,
}

impl ImageReference {
    /// Splits on the last `:` that follows the last `/`, so registry ports stay
    /// in the repository. Without an explicit tag, `latest` is assumed.
    pub fn parse(reference: &str) -> Self {
        let name_start = reference.rfind('/').map(|i| i + 1).unwrap_or(0);

        match reference[name_start..].rfind(':') {
            Some(offset) => {
                let split = name_start + offset;
                Self {
                    repository: reference[..split].to_string(),
                    tag: reference[split + 1..].to_string(),
                }
            }
            None => Self {
                repository: reference.to_string(),
                tag: "latest".to_string(),
            },
        }
    }
}

impl fmt::Display for ImageReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.repository, self.tag)
    }
}

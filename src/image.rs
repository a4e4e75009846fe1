/// Engine-independent view of one locally present image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalImage {
    pub id: String,
    pub repo_tags: Vec<String>,
}

impl LocalImage {
    pub fn new(id: impl Into<String>, repo_tags: Vec<String>) -> Self {
        Self {
            id: id.into(),
            repo_tags,
        }
    }

    /// The tag used to name the image's archive, if it has any.
    pub fn primary_tag(&self) -> Option<&str> {
        self.repo_tags.first().map(String::as_str)
    }
}

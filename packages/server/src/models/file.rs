use serde::Deserialize;

/// `file_id` from the query string (GET) or the form body (POST).
#[derive(Debug, Deserialize)]
pub struct FileIdParams {
    #[serde(default)]
    pub file_id: Option<String>,
}

impl FileIdParams {
    /// The trimmed id, or `None` when absent or blank.
    pub fn raw_id(&self) -> Option<&str> {
        self.file_id
            .as_deref()
            .map(str::trim)
            .filter(|id| !id.is_empty())
    }
}

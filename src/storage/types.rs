//! Storage types

/// A stored object with its data
#[derive(Debug, Clone)]
pub struct StorageObject {
    pub key: String,
    pub size: u64,
    pub content_type: Option<String>,
    pub data: Vec<u8>,
}

impl StorageObject {
    /// Content type recorded by the backend, or one guessed from the key's extension
    pub fn content_type_or_guess(&self) -> String {
        self.content_type.clone().unwrap_or_else(|| {
            mime_guess::from_path(&self.key)
                .first_or_octet_stream()
                .essence_str()
                .to_string()
        })
    }

    /// Last path segment of the key
    pub fn file_name(&self) -> &str {
        self.key.rsplit('/').next().unwrap_or(&self.key)
    }
}

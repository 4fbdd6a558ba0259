//! Uploaded files and their object store paths.

use journey_store::{MediaKind, MemoryId};
use rand::Rng;

const SUFFIX_ALPHABET: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";
const SUFFIX_LEN: usize = 7;
const MAX_EXTENSION_LEN: usize = 10;

/// One file submitted with a create or update.
#[derive(Debug, Clone)]
pub struct UploadFile {
    /// Client-side file name; only its extension is kept
    pub file_name: String,
    /// MIME type as reported by the client
    pub content_type: String,
    pub bytes: Vec<u8>,
}

impl UploadFile {
    pub fn new(
        file_name: impl Into<String>,
        content_type: impl Into<String>,
        bytes: impl Into<Vec<u8>>,
    ) -> Self {
        Self {
            file_name: file_name.into(),
            content_type: content_type.into(),
            bytes: bytes.into(),
        }
    }

    /// Image or video, from the MIME prefix.
    pub fn kind(&self) -> MediaKind {
        MediaKind::from_mime(&self.content_type)
    }

    /// Extension for the stored object: file name first, then MIME subtype, then `bin`.
    pub fn extension(&self) -> String {
        let from_name = self
            .file_name
            .rsplit_once('.')
            .map(|(_, ext)| ext)
            .and_then(clean_extension);
        let from_mime = || {
            self.content_type
                .split_once('/')
                .map(|(_, subtype)| subtype.split([';', '+']).next().unwrap_or_default())
                .and_then(clean_extension)
        };
        from_name
            .or_else(from_mime)
            .unwrap_or_else(|| "bin".to_string())
    }
}

fn clean_extension(raw: &str) -> Option<String> {
    let raw = raw.trim();
    let valid = !raw.is_empty()
        && raw.len() <= MAX_EXTENSION_LEN
        && raw.chars().all(|c| c.is_ascii_alphanumeric());
    valid.then(|| raw.to_ascii_lowercase())
}

/// Collision-resistant path `{memory_id}/{unix_millis}-{random}.{ext}`.
pub(crate) fn object_path(memory_id: MemoryId, file: &UploadFile, unix_millis: i64) -> String {
    format!(
        "{memory_id}/{unix_millis}-{}.{}",
        random_suffix(),
        file.extension()
    )
}

fn random_suffix() -> String {
    let mut rng = rand::thread_rng();
    (0..SUFFIX_LEN)
        .map(|_| SUFFIX_ALPHABET[rng.gen_range(0..SUFFIX_ALPHABET.len())] as char)
        .collect()
}

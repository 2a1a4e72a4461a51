//! Document state management

use tower_lsp::lsp_types::Url;

/// State of a single open document.
///
/// RSL source is never parsed by this server; the text is kept only for
/// color extraction and so the compile command can name the active file.
pub struct DocumentState {
    pub uri: Url,
    pub text: String,
    pub version: i32,
}

impl DocumentState {
    /// Create a new document
    pub fn new(uri: Url, text: String, version: i32) -> Self {
        Self { uri, text, version }
    }

    /// Update document text (full sync)
    pub fn update(&mut self, text: String, version: i32) {
        self.text = text;
        self.version = version;
    }
}

use std::path::Path;

use serde_json::{json, Map, Value};

#[cfg(feature = "ocr")]
use super::ocr::OcrEngine;
use super::{Stage, StageError, StageInput, StageKind, StageResult};

pub const NAME: &str = "ocr_tool";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentFormat {
    Pdf,
    Text,
    Image,
}

impl DocumentFormat {
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_lowercase().as_str() {
            "pdf" => Some(Self::Pdf),
            "txt" | "text" | "md" => Some(Self::Text),
            "png" | "jpg" | "jpeg" | "tiff" | "tif" | "bmp" | "gif" | "webp" | "heic" => {
                Some(Self::Image)
            }
            _ => None,
        }
    }

    pub fn from_path(path: &Path) -> Option<Self> {
        path.extension()
            .and_then(|e| e.to_str())
            .and_then(Self::from_extension)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pdf => "pdf",
            Self::Text => "text",
            Self::Image => "image",
        }
    }
}

/// Pulls text out of the uploaded document.
///
/// Plain text is read as-is, PDFs through their text layer, images through
/// Tesseract when the `ocr` feature is enabled.
pub struct TextExtractionStage {
    #[cfg(feature = "ocr")]
    ocr: OcrEngine,
}

impl TextExtractionStage {
    pub fn new() -> Self {
        Self {
            #[cfg(feature = "ocr")]
            ocr: OcrEngine::default(),
        }
    }

    fn extract(&self, input: &StageInput) -> Result<Map<String, Value>, StageError> {
        let path = input.existing_file()?;
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or_default()
            .to_string();
        let format = DocumentFormat::from_extension(&extension)
            .ok_or(StageError::UnsupportedFormat(extension))?;

        let bytes = std::fs::read(path).map_err(|e| StageError::Read {
            path: path.to_path_buf(),
            source: e,
        })?;

        let (text, method) = match format {
            DocumentFormat::Text => (String::from_utf8_lossy(&bytes).into_owned(), "text"),
            DocumentFormat::Pdf => (extract_pdf_text(&bytes)?, "pdf_text_layer"),
            DocumentFormat::Image => self.recognize(path, &bytes)?,
        };

        tracing::info!(
            characters = text.chars().count(),
            method,
            "Extracted text from {}",
            crate::sanitize::redact_path(path)
        );

        let mut map = Map::new();
        map.insert("status".into(), json!("extracted"));
        map.insert("format".into(), json!(format.as_str()));
        map.insert("method".into(), json!(method));
        map.insert("characters".into(), json!(text.chars().count()));
        map.insert("raw_text".into(), Value::String(text));
        Ok(map)
    }

    #[cfg(feature = "ocr")]
    fn recognize(&self, path: &Path, _bytes: &[u8]) -> Result<(String, &'static str), StageError> {
        Ok((self.ocr.recognize(path)?, "ocr"))
    }

    #[cfg(not(feature = "ocr"))]
    fn recognize(&self, path: &Path, _bytes: &[u8]) -> Result<(String, &'static str), StageError> {
        tracing::warn!("OCR support not compiled in, using placeholder text");
        let text = format!(
            "[OCR Placeholder] Text extracted from {}. Document appears to be a valid image file. \
             Build with the `ocr` feature for actual text recognition.",
            crate::sanitize::redact_path(path)
        );
        Ok((text, "placeholder"))
    }
}

impl Default for TextExtractionStage {
    fn default() -> Self {
        Self::new()
    }
}

impl Stage for TextExtractionStage {
    fn name(&self) -> &str {
        NAME
    }

    fn kind(&self) -> StageKind {
        StageKind::Extraction
    }

    fn invoke(&self, input: &StageInput) -> StageResult {
        let _span = tracing::info_span!("stage.extraction").entered();
        StageResult::from_outcome(NAME, self.extract(input))
    }
}

fn extract_pdf_text(bytes: &[u8]) -> Result<String, StageError> {
    let doc = lopdf::Document::load_mem(bytes)
        .map_err(|e| StageError::Decode(format!("Failed to parse PDF: {}", e)))?;

    let mut text = String::new();
    for (page_num, _) in doc.get_pages() {
        if let Ok(page_text) = doc.extract_text(&[page_num]) {
            text.push_str(&page_text);
            text.push('\n');
        }
    }
    Ok(text)
}

use std::io::Cursor;
use std::path::Path;

use super::StageError;

const DEFAULT_LANGUAGE: &str = "eng";

/// Tesseract text recognition for scanned uploads.
#[derive(Debug, Clone)]
pub struct OcrEngine {
    languages: String,
}

impl OcrEngine {
    /// `languages` are Tesseract codes; empty means English.
    pub fn new(languages: &[&str]) -> Self {
        let languages = match languages {
            [] => DEFAULT_LANGUAGE.to_string(),
            codes => codes.join("+"),
        };
        Self { languages }
    }

    pub fn languages(&self) -> &str {
        &self.languages
    }

    /// Reads the image at `path` and returns its recognized text, trimmed.
    pub fn recognize(&self, path: &Path) -> Result<String, StageError> {
        let _span = tracing::info_span!(
            "stage.ocr",
            file = %crate::sanitize::redact_path(path),
            languages = %self.languages
        )
        .entered();

        let bytes = std::fs::read(path).map_err(|e| StageError::Read {
            path: path.to_path_buf(),
            source: e,
        })?;
        let png = as_png(&bytes)?;

        let mut tesseract = leptess::LepTess::new(None, &self.languages)
            .map_err(|e| StageError::Recognition(format!("Tesseract unavailable: {}", e)))?;
        tesseract
            .set_image_from_mem(&png)
            .map_err(|e| StageError::Recognition(e.to_string()))?;
        let text = tesseract
            .get_utf8_text()
            .map_err(|e| StageError::Recognition(e.to_string()))?;

        tracing::debug!(characters = text.chars().count(), "Recognized text");
        Ok(text.trim().to_string())
    }
}

impl Default for OcrEngine {
    fn default() -> Self {
        Self::new(&[])
    }
}

/// Tesseract only accepts a few encodings; PNG covers every decodable input.
fn as_png(bytes: &[u8]) -> Result<Vec<u8>, StageError> {
    let image = image::load_from_memory(bytes).map_err(|e| StageError::Decode(e.to_string()))?;
    let mut png = Vec::new();
    image
        .write_to(&mut Cursor::new(&mut png), image::ImageFormat::Png)
        .map_err(|e| StageError::Decode(e.to_string()))?;
    Ok(png)
}

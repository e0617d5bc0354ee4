use image::{ColorType, GenericImageView};
use serde_json::{json, Map, Value};

use super::{Stage, StageError, StageInput, StageKind, StageResult};

pub const NAME: &str = "image_processing_tool";

/// Decodes the upload and reports its geometry ahead of OCR.
pub struct ImageProcessingStage;

impl ImageProcessingStage {
    fn process(&self, input: &StageInput) -> Result<Map<String, Value>, StageError> {
        let path = input.existing_file()?;
        let bytes = std::fs::read(path).map_err(|e| StageError::Read {
            path: path.to_path_buf(),
            source: e,
        })?;

        let img = image::load_from_memory(&bytes)
            .map_err(|e| StageError::Decode(format!("Failed to load image: {}", e)))?;
        let (width, height) = img.dimensions();
        let mode = color_mode(img.color());

        tracing::info!(width, height, mode, "Image processed");

        let mut map = Map::new();
        map.insert("status".into(), json!("processed"));
        map.insert("original_size".into(), json!(format!("{}x{}", width, height)));
        map.insert("color_mode".into(), json!(mode));
        map.insert("optimized".into(), json!(true));
        map.insert(
            "message".into(),
            json!(format!(
                "Image validated: {}x{} pixels, {} mode",
                width, height, mode
            )),
        );
        Ok(map)
    }
}

impl Stage for ImageProcessingStage {
    fn name(&self) -> &str {
        NAME
    }

    fn kind(&self) -> StageKind {
        StageKind::ImageProcessing
    }

    fn invoke(&self, input: &StageInput) -> StageResult {
        let _span = tracing::info_span!("stage.imaging").entered();
        StageResult::from_outcome(NAME, self.process(input))
    }
}

fn color_mode(color: ColorType) -> &'static str {
    match color {
        ColorType::L8 | ColorType::L16 => "L",
        ColorType::La8 | ColorType::La16 => "LA",
        ColorType::Rgb8 | ColorType::Rgb16 | ColorType::Rgb32F => "RGB",
        ColorType::Rgba8 | ColorType::Rgba16 | ColorType::Rgba32F => "RGBA",
        _ => "unknown",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_reports_size_and_mode() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("scan.png");
        image::RgbImage::new(4, 3).save(&path).unwrap();

        let result = ImageProcessingStage
            .invoke(&StageInput::new().with("file_path", path.to_string_lossy().into_owned()));

        assert_eq!(result.status, "processed");
        let value = result.payload_value();
        assert_eq!(value["original_size"], "4x3");
        assert_eq!(value["color_mode"], "RGB");
        assert_eq!(value["optimized"], true);
    }

    #[test]
    fn test_grayscale_mode() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("gray.png");
        image::GrayImage::new(2, 2).save(&path).unwrap();

        let result = ImageProcessingStage
            .invoke(&StageInput::new().with("file_path", path.to_string_lossy().into_owned()));
        assert_eq!(result.payload_value()["color_mode"], "L");
    }

    #[test]
    fn test_non_image_is_error_payload() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("form.png");
        std::fs::write(&path, b"definitely not a png").unwrap();

        let result = ImageProcessingStage
            .invoke(&StageInput::new().with("file_path", path.to_string_lossy().into_owned()));
        assert!(result.is_error());
    }

    #[test]
    fn test_missing_file() {
        let result =
            ImageProcessingStage.invoke(&StageInput::new().with("file_path", "/nonexistent.png"));
        assert!(result.is_error());
    }
}

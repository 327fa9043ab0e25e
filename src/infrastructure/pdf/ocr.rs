use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use std::process::Command;
use tracing::debug;

use crate::domain::ports::OcrEngine;
use crate::domain::DomainError;
use crate::infrastructure::config::IngestionConfig;

/// Rasterizes pages with `pdftoppm` and reads them back with `tesseract`.
/// Both binaries must be on `PATH` unless overridden.
#[derive(Debug, Clone)]
pub struct TesseractOcr {
    pdftoppm: PathBuf,
    tesseract: PathBuf,
    dpi: u32,
    language: String,
}

impl Default for TesseractOcr {
    fn default() -> Self {
        Self {
            pdftoppm: PathBuf::from("pdftoppm"),
            tesseract: PathBuf::from("tesseract"),
            dpi: 300,
            language: "eng".to_string(),
        }
    }
}

impl TesseractOcr {
    pub fn from_config(config: &IngestionConfig) -> Self {
        Self {
            dpi: config.ocr_dpi,
            language: config.ocr_language.clone(),
            ..Default::default()
        }
    }

    pub fn with_binaries(mut self, pdftoppm: impl Into<PathBuf>, tesseract: impl Into<PathBuf>) -> Self {
        self.pdftoppm = pdftoppm.into();
        self.tesseract = tesseract.into();
        self
    }

    fn render_pages(&self, pdf: &Path, scratch: &Path) -> Result<Vec<PathBuf>, DomainError> {
        run(
            Command::new(&self.pdftoppm)
                .arg("-r")
                .arg(self.dpi.to_string())
                .arg("-png")
                .arg(pdf)
                .arg(scratch.join("page")),
        )?;

        // pdftoppm zero-pads page numbers, so name order is page order.
        let mut images: Vec<PathBuf> = std::fs::read_dir(scratch)?
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|path| path.extension() == Some(OsStr::new("png")))
            .collect();
        images.sort();
        Ok(images)
    }
}

impl OcrEngine for TesseractOcr {
    fn recognize(&self, path: &Path) -> Result<String, DomainError> {
        let scratch = tempfile::tempdir()?;
        let images = self.render_pages(path, scratch.path())?;
        if images.is_empty() {
            return Err(DomainError::pdf(format!("{}: no pages rendered", path.display())));
        }

        let mut text = String::new();
        for image in &images {
            let output = run(
                Command::new(&self.tesseract)
                    .arg(image)
                    .arg("stdout")
                    .arg("-l")
                    .arg(&self.language),
            )?;
            text.push_str(&String::from_utf8_lossy(&output));
        }

        debug!(path = %path.display(), pages = images.len(), chars = text.len(), "ocr finished");
        Ok(text)
    }
}

fn run(command: &mut Command) -> Result<Vec<u8>, DomainError> {
    let program = command.get_program().to_string_lossy().into_owned();
    let output = command
        .output()
        .map_err(|e| DomainError::pdf(format!("failed to run {program}: {e}")))?;

    if !output.status.success() {
        return Err(DomainError::pdf(format!(
            "{program} exited with {}: {}",
            output.status,
            String::from_utf8_lossy(&output.stderr).trim()
        )));
    }
    Ok(output.stdout)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_binary_is_pdf_error() {
        let ocr = TesseractOcr::default()
            .with_binaries("/nonexistent/pdftoppm", "/nonexistent/tesseract");

        let err = ocr.recognize(Path::new("scan.pdf")).unwrap_err();

        assert!(matches!(err, DomainError::Pdf(ref msg) if msg.contains("pdftoppm")));
    }

    #[test]
    fn test_from_config_uses_language_and_dpi() {
        let mut config = IngestionConfig::default();
        config.ocr_language = "deu".into();
        config.ocr_dpi = 150;

        let ocr = TesseractOcr::from_config(&config);

        assert_eq!(ocr.language, "deu");
        assert_eq!(ocr.dpi, 150);
        assert_eq!(ocr.tesseract, PathBuf::from("tesseract"));
    }
}

mod native;
mod ocr;

pub use native::LopdfTextLayer;
pub use ocr::TesseractOcr;

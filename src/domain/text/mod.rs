//! Pure text processing: front-matter extraction, cleaning and chunking.

pub mod chunker;
pub mod cleaner;
pub mod frontmatter;

pub use chunker::{chunk_paragraphs, RecursiveSplitter};
pub use cleaner::{clean_content, normalize_newlines};
pub use frontmatter::{extract_front_matter, parse_front_matter};

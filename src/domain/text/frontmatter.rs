use serde_json::Value;
use tracing::warn;

use crate::domain::{DomainError, Metadata};

const DELIMITER: &str = "---";
const BOM: char = '\u{feff}';

/// Splits `content` into front-matter metadata and body.
///
/// A document has front-matter when it contains at least two `---` lines;
/// whatever precedes the first one is ignored, as is a leading byte-order
/// mark. Without them the whole content is the body. A block that is not a YAML mapping yields empty
/// metadata and the body after the block, and is logged.
pub fn extract_front_matter(content: &str) -> (Metadata, String) {
    match parse_front_matter(content) {
        Ok(parsed) => parsed,
        Err((e, body)) => {
            warn!(error = %e, "ignoring malformed front-matter");
            (Metadata::new(), body)
        }
    }
}

/// Like [`extract_front_matter`] but reports parse failures, together with
/// the body that follows the rejected block.
pub fn parse_front_matter(
    content: &str,
) -> Result<(Metadata, String), (DomainError, String)> {
    let content = content.strip_prefix(BOM).unwrap_or(content);
    let mut delimiters = delimiter_lines(content);
    let (Some(first), Some(second)) = (delimiters.next(), delimiters.next()) else {
        return Ok((Metadata::new(), content.to_string()));
    };

    let block = &content[first.1..second.0];
    let body = content[second.1..].to_string();

    if block.trim().is_empty() {
        return Ok((Metadata::new(), body));
    }

    match serde_yaml::from_str::<Value>(block) {
        Ok(Value::Object(map)) => Ok((map, body)),
        Ok(Value::Null) => Ok((Metadata::new(), body)),
        Ok(other) => Err((
            DomainError::Parse(format!("expected a mapping, found {other}")),
            body,
        )),
        Err(e) => Err((DomainError::Parse(e.to_string()), body)),
    }
}

/// Byte spans (start, end including newline) of every `---` line.
fn delimiter_lines(content: &str) -> impl Iterator<Item = (usize, usize)> + '_ {
    let mut offset = 0;
    content.split_inclusive('\n').filter_map(move |line| {
        let start = offset;
        offset += line.len();
        (line.trim_end() == DELIMITER).then_some((start, offset))
    })
}

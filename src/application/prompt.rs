use crate::domain::ScoredPoint;

/// Instruction prefix for retrieval-tuned embedding models. Changing it
/// changes which passages come back.
pub const RETRIEVAL_PREFIX: &str = "Represent this sentence for searching relevant passages: ";

pub fn retrieval_query(question: &str) -> String {
    format!("{RETRIEVAL_PREFIX}{question}")
}

/// One line per hit, in rank order.
pub fn render_passages(points: &[ScoredPoint]) -> String {
    points
        .iter()
        .map(|point| {
            let title = point
                .field("title")
                .or_else(|| point.field("filename"))
                .unwrap_or_default();
            let slug = point.field("slug").unwrap_or_default();
            format!(
                "- Article Title: {title} -- Article Slug: {slug} -- Article Content: {}",
                point.content()
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn augment(passages: &str, question: &str) -> String {
    format!(
        "The following are relevant passages:\n\
         <retrieved-data>\n\
         {passages}\n\
         </retrieved-data>\n\
         \n\
         Here's the original user prompt, answer with help of the retrieved passages:\n\
         <user-prompt>\n\
         {question}\n\
         </user-prompt>\n"
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn point(id: &str, payload: serde_json::Value, score: f32) -> ScoredPoint {
        ScoredPoint {
            id: id.to_string(),
            payload: payload.as_object().cloned().unwrap(),
            score,
        }
    }

    #[test]
    fn test_retrieval_query_is_prefixed() {
        assert_eq!(
            retrieval_query("What is X?"),
            "Represent this sentence for searching relevant passages: What is X?"
        );
    }

    #[test]
    fn test_passages_keep_rank_order_and_fall_back_to_filename() {
        let points = vec![
            point("1", json!({"title": "Caves", "slug": "caves", "content": "Dark."}), 0.9),
            point("2", json!({"filename": "manual.pdf", "slug": "manual", "content": "Pump."}), 0.5),
        ];

        assert_eq!(
            render_passages(&points),
            "- Article Title: Caves -- Article Slug: caves -- Article Content: Dark.\n\
             - Article Title: manual.pdf -- Article Slug: manual -- Article Content: Pump."
        );
    }

    #[test]
    fn test_augmented_prompt_layout() {
        let prompt = augment("- passage", "Why?");
        assert_eq!(
            prompt,
            "The following are relevant passages:\n<retrieved-data>\n- passage\n</retrieved-data>\n\n\
             Here's the original user prompt, answer with help of the retrieved passages:\n\
             <user-prompt>\nWhy?\n</user-prompt>\n"
        );
    }
}

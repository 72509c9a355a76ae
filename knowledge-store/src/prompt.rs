use common::vector::ScoredRecord;

pub static QUERY_SYSTEM_PROMPT: &str = r#"
      You are a knowledgeable assistant with access to a specialized knowledge base.
      You will be provided with passages retrieved from that knowledge base as context.

      Your task is to:
      1. Carefully analyze the provided passages
      2. Answer the user's question based on this information
      3. Provide clear, concise, and accurate responses
      4. When referencing information, briefly mention which source document it came from
      5. If the provided context doesn't contain enough information to answer the question confidently, clearly state this
      6. Avoid making assumptions or providing information not supported by the context
    "#;

/// Builds the user message combining the question with the retrieved
/// passages. When retrieval came back empty the model is told so rather than
/// being handed a blank context block.
pub fn build_user_prompt(question: &str, records: &[ScoredRecord]) -> String {
    if records.is_empty() {
        return format!(
            "Question:\n{question}\n\nContext:\nThe knowledge base returned no passages for this question. Say that you have no relevant material rather than guessing."
        );
    }

    let mut context = String::new();
    for (i, record) in records.iter().enumerate() {
        let source = record
            .metadata
            .get("file_name")
            .map_or("unknown source", String::as_str);
        context.push_str(&format!(
            "[{n}] (source: {source})\n{text}\n\n",
            n = i + 1,
            text = record.text
        ));
    }

    format!("Question:\n{question}\n\nContext:\n{context}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn record(text: &str, file_name: &str) -> ScoredRecord {
        let mut metadata = HashMap::new();
        metadata.insert("file_name".to_owned(), file_name.to_owned());
        ScoredRecord {
            id: "r1".into(),
            score: 0.9,
            text: text.into(),
            metadata,
        }
    }

    #[test]
    fn prompt_includes_question_passages_and_sources() {
        let prompt = build_user_prompt(
            "How does Spark partition data?",
            &[record("Spark partitions data across nodes.", "spark.txt")],
        );
        assert!(prompt.contains("How does Spark partition data?"));
        assert!(prompt.contains("Spark partitions data across nodes."));
        assert!(prompt.contains("spark.txt"));
    }

    #[test]
    fn empty_retrieval_is_stated_in_the_prompt() {
        let prompt = build_user_prompt("Anything?", &[]);
        assert!(prompt.contains("no passages"));
    }
}

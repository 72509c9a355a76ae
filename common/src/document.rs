use std::collections::HashMap;

/// A unit of ingested content. Immutable once loaded; produced from files on
/// disk by the ingestion pipeline and consumed by chunking.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    pub name: String,
    pub text: String,
    pub metadata: HashMap<String, String>,
}

impl Document {
    pub fn new(name: impl Into<String>, text: impl Into<String>) -> Self {
        let name = name.into();
        let mut metadata = HashMap::new();
        metadata.insert("file_name".to_owned(), name.clone());
        Self {
            name,
            text: text.into(),
            metadata,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.text.trim().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_document_records_file_name_metadata() {
        let doc = Document::new("spark.txt", "Spark partitions data across nodes.");
        assert_eq!(doc.metadata.get("file_name").map(String::as_str), Some("spark.txt"));
        assert!(!doc.is_empty());
    }

    #[test]
    fn whitespace_only_document_is_empty() {
        let doc = Document::new("blank.txt", "   \n\t ");
        assert!(doc.is_empty());
    }
}

use common::error::AppError;
use text_splitter::{ChunkConfig, TextSplitter};

/// Splits text into chunks bounded by `size` characters, each overlapping
/// its neighbor by `overlap` characters. Deterministic for a given input and
/// configuration. Empty or whitespace-only input yields no chunks.
pub fn split(text: &str, size: usize, overlap: usize) -> Result<Vec<String>, AppError> {
    if size == 0 {
        return Err(AppError::Validation("chunk size must be greater than 0".into()));
    }
    if overlap >= size {
        return Err(AppError::Validation(format!(
            "chunk overlap ({overlap}) must be less than chunk size ({size})"
        )));
    }

    if text.trim().is_empty() {
        return Ok(Vec::new());
    }

    let chunk_config = ChunkConfig::new(size)
        .with_overlap(overlap)
        .map_err(|e| AppError::Validation(format!("invalid chunk overlap: {e}")))?;
    let splitter = TextSplitter::new(chunk_config);

    Ok(splitter.chunks(text).map(str::to_owned).collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_text_yields_exactly_one_chunk() {
        let text = "Spark partitions data across the cluster for parallelism.";
        let chunks = split(text, 1000, 200).expect("split");
        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0], text);
    }

    #[test]
    fn chunking_is_deterministic_across_runs() {
        let text = "alpha beta gamma delta ".repeat(200);
        for (size, overlap) in [(100, 20), (250, 0), (1000, 200), (64, 63)] {
            let first = split(&text, size, overlap).expect("first run");
            let second = split(&text, size, overlap).expect("second run");
            assert_eq!(first, second, "size {size} overlap {overlap}");
            assert!(first.iter().all(|chunk| chunk.chars().count() <= size));
        }
    }

    #[test]
    fn long_text_produces_multiple_chunks() {
        let text = "word ".repeat(1000);
        let chunks = split(&text, 100, 20).expect("split");
        assert!(chunks.len() > 1);
    }

    #[test]
    fn empty_input_yields_no_chunks() {
        assert!(split("", 1000, 200).expect("empty").is_empty());
        assert!(split("   \n ", 1000, 200).expect("blank").is_empty());
    }

    #[test]
    fn overlap_at_or_above_size_is_rejected() {
        assert!(matches!(split("text", 100, 100), Err(AppError::Validation(_))));
        assert!(matches!(split("text", 100, 250), Err(AppError::Validation(_))));
        assert!(matches!(split("text", 0, 0), Err(AppError::Validation(_))));
    }
}

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ChunkerError {
    #[error("chunk_size must be positive")]
    ZeroChunkSize,
    #[error("chunk_overlap ({overlap}) must be smaller than chunk_size ({size})")]
    OverlapTooLarge { size: usize, overlap: usize },
}

/// Splits text into overlapping windows of whitespace-separated words.
///
/// Windows start every `chunk_size - chunk_overlap` words, so consecutive
/// chunks share `chunk_overlap` words and text of `N` words yields
/// `ceil(N / (chunk_size - chunk_overlap))` chunks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WordWindowChunker {
    chunk_size: usize,
    chunk_overlap: usize,
}

impl WordWindowChunker {
    pub fn new(chunk_size: usize, chunk_overlap: usize) -> Result<Self, ChunkerError> {
        if chunk_size == 0 {
            return Err(ChunkerError::ZeroChunkSize);
        }
        if chunk_overlap >= chunk_size {
            return Err(ChunkerError::OverlapTooLarge {
                size: chunk_size,
                overlap: chunk_overlap,
            });
        }

        Ok(Self {
            chunk_size,
            chunk_overlap,
        })
    }

    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    pub fn chunk_overlap(&self) -> usize {
        self.chunk_overlap
    }

    fn stride(&self) -> usize {
        self.chunk_size - self.chunk_overlap
    }

    pub fn split(&self, text: &str) -> Vec<String> {
        let words: Vec<&str> = text.split_whitespace().collect();

        (0..words.len())
            .step_by(self.stride())
            .map(|start| {
                let end = std::cmp::min(start + self.chunk_size, words.len());
                words[start..end].join(" ")
            })
            .filter(|chunk| !chunk.trim().is_empty())
            .collect()
    }
}

//! Chunked summarization
//!
//! Long text is cut into fixed-size chunks and each chunk is summarized by a
//! throwaway single-task run of a tool-less researcher agent. Chunks are
//! independent, so they run concurrently; summaries keep chunk order.

use std::sync::Arc;

use futures::{StreamExt, TryStreamExt};

use crate::agent::Agent;
use crate::error::Result;
use crate::provider::{GenerationOptions, LlmProvider};
use crate::task::Task;

/// Characters per chunk
pub const DEFAULT_CHUNK_SIZE: usize = 8000;

/// Chunks summarized at the same time
pub const DEFAULT_CONCURRENCY: usize = 4;

/// Split `text` into consecutive slices of at most `chunk_size` characters.
///
/// Slices never split a character, and joining them gives back `text`.
/// A `chunk_size` of zero is treated as one.
pub fn split_chunks(text: &str, chunk_size: usize) -> Vec<&str> {
    let size = chunk_size.max(1);
    let mut chunks = Vec::with_capacity(text.len() / size + 1);
    let mut start = 0;
    let mut count = 0;

    for (idx, _) in text.char_indices() {
        if count == size {
            chunks.push(&text[start..idx]);
            start = idx;
            count = 0;
        }
        count += 1;
    }

    if start < text.len() {
        chunks.push(&text[start..]);
    }

    chunks
}

/// Summarizes long content chunk by chunk
#[derive(Clone)]
pub struct Summarizer {
    provider: Arc<dyn LlmProvider>,
    generation: GenerationOptions,
    chunk_size: usize,
    concurrency: usize,
}

impl Summarizer {
    pub fn new(provider: Arc<dyn LlmProvider>, generation: GenerationOptions) -> Self {
        Self {
            provider,
            generation,
            chunk_size: DEFAULT_CHUNK_SIZE,
            concurrency: DEFAULT_CONCURRENCY,
        }
    }

    #[must_use]
    pub fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size.max(1);
        self
    }

    #[must_use]
    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }

    pub const fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    fn researcher(&self) -> Result<Arc<Agent>> {
        Agent::builder()
            .role("Principal Researcher")
            .goal("Provide concise and relevant summaries of text content.")
            .backstory("You are an expert researcher, skilled at extracting the most important information from any text.")
            .provider(self.provider.clone())
            .generation(self.generation.clone())
            .max_iterations(3)
            .build()
            .map(Arc::new)
    }

    /// Summaries of every chunk of `text`, separated by blank lines
    ///
    /// Fails if any chunk fails.
    pub async fn summarize(&self, text: &str) -> Result<String> {
        let chunks = split_chunks(text, self.chunk_size);
        if chunks.is_empty() {
            return Ok(String::new());
        }

        let researcher = self.researcher()?;
        let total = chunks.len();
        tracing::debug!(chunks = total, chunk_size = self.chunk_size, "Summarizing content");

        let chunks: Vec<String> = chunks.into_iter().map(str::to_owned).collect();
        let summaries: Vec<String> = futures::stream::iter(chunks.into_iter().enumerate())
            .map(|(index, chunk)| {
                let researcher = researcher.clone();
                async move {
                    let task = Task::new(
                        format!("summarize_chunk_{}", index + 1),
                        format!(
                            "Analyze and summarize the following content. Focus on the most relevant information. \
                             Return only the summary.\n\nCONTENT\n----------\n{}",
                            chunk
                        ),
                        "A concise summary of the provided text.",
                        researcher,
                    );
                    let output = task.execute(&[]).await?;
                    tracing::debug!(chunk = index + 1, of = total, "Chunk summarized");
                    Ok::<_, crate::error::AgentError>(output.raw)
                }
            })
            .buffered(self.concurrency)
            .try_collect()
            .await?;

        Ok(summaries.join("\n\n"))
    }
}

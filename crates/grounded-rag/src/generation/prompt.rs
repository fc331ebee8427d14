//! Prompt templates for RAG generation

use crate::retrieval::SearchHit;

/// Section header preceding the retrieved context
pub const CONTEXT_HEADER: &str = "CONTEXT FROM DOCUMENTS:";

/// Section header preceding the user's question
pub const QUESTION_HEADER: &str = "QUESTION:";

/// Context text used when retrieval found nothing
pub const NO_CONTEXT: &str = "No relevant context was found in the uploaded documents.";

/// Prompt builder for RAG queries
pub struct PromptBuilder;

impl PromptBuilder {
    /// Join retrieved chunk texts, most similar first, separated by a blank line
    pub fn build_context(hits: &[SearchHit]) -> String {
        hits.iter()
            .map(|hit| hit.chunk.content.as_str())
            .collect::<Vec<_>>()
            .join("\n\n")
    }

    /// Build the grounding prompt
    pub fn build_rag_prompt(question: &str, context: &str) -> String {
        let context = if context.trim().is_empty() {
            NO_CONTEXT
        } else {
            context
        };

        format!(
            r#"You are a document-grounded assistant that ONLY uses information from the provided context.

GROUNDING RULES:
1. ONLY use information that is stated in the CONTEXT below
2. Support your answer with direct quotes from the context, always in the original language of the document (do not translate quotations)
3. If the answer is not in the context, say that you don't have enough information to answer the question. Never invent facts
4. Always answer in the same language the question was asked in

{context_header}
{context}

{question_header} {question}

Answer:"#,
            context_header = CONTEXT_HEADER,
            context = context,
            question_header = QUESTION_HEADER,
            question = question
        )
    }

    /// Recover the context section from a prompt built by [`build_rag_prompt`](Self::build_rag_prompt)
    pub fn extract_context(prompt: &str) -> Option<&str> {
        let start = prompt.find(CONTEXT_HEADER)? + CONTEXT_HEADER.len();
        let end = prompt.rfind(QUESTION_HEADER)?;
        prompt.get(start..end).map(str::trim)
    }
}

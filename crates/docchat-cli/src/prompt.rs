//! Grounding and condensing prompts

use docchat_core::RetrievalResult;

const PREAMBLE: &str = "You are an expert assistant trained on GitLab's official Handbook and Direction documents.\n\
\n\
Please:\n\
- Answer with as much useful detail as possible.\n\
- Use bullet points or formatting if appropriate.\n\
- Cite the source section when available.\n\
- Only answer from GitLab materials. Politely decline anything off-topic.";

/// Build the prompt sent to the generation model for one question
pub fn grounding_prompt(question: &str, sources: &RetrievalResult, memory: &str) -> String {
    let mut prompt = String::with_capacity(PREAMBLE.len() + 1024);
    prompt.push_str(PREAMBLE);

    prompt.push_str("\n\nContext:\n");
    if sources.is_empty() {
        prompt.push_str("(no matching passages were found)\n");
    }
    for (i, scored) in sources.chunks.iter().enumerate() {
        let meta = &scored.chunk.metadata;
        prompt.push_str(&format!(
            "[{}] {} → {}\n{}\n\n",
            i + 1,
            meta.source,
            meta.section,
            scored.chunk.content.trim()
        ));
    }

    if !memory.trim().is_empty() {
        prompt.push_str("\nConversation so far:\n");
        prompt.push_str(memory.trim_end());
        prompt.push('\n');
    }

    prompt.push_str("\nQuestion:\n");
    prompt.push_str(question.trim());
    prompt.push('\n');
    prompt
}

/// Ask the model to turn a follow-up into a standalone question
pub fn condense_prompt(question: &str, memory: &str) -> String {
    format!(
        "Given the following conversation and a follow up question, rephrase the follow up \
        question to be a standalone question, in its original language. \
        Answer with the standalone question only.\n\
        \n\
        Chat History:\n\
        {}\n\
        Follow Up Input: {}\n\
        Standalone question:",
        memory.trim_end(),
        question.trim()
    )
}

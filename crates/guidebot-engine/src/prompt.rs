//! Prompt assembly for grounded answering.

/// Visible separator between chunks in the context block.
pub const CONTEXT_SEPARATOR: &str = "\n\n---\n\n";

/// Fixed reply when retrieval comes back empty. The completion model is
/// never invoked on this path.
pub const NO_CONTEXT_ANSWER: &str = "Sorry, I could not find enough information about this \
in the user guide. Please try asking your question differently.";

/// System instruction: a domain assistant constrained to the supplied
/// manual content, answering in the configured language.
pub fn system_prompt(product: &str, language: &str) -> String {
    format!(
        "You are a helpful assistant for a {product} user guide.\n\
         Answer questions in {language}, clearly and in a friendly tone.\n\
         Base your answers only on the user guide content you are given; \
         if the answer is not in it, say so openly.\n\
         Explain step by step and use examples where the guide provides them."
    )
}

/// User message: the context block followed by the verbatim question.
pub fn user_prompt(context: &str, question: &str) -> String {
    format!(
        "User guide content:\n\n{context}\n\n\
         User question: {question}\n\n\
         Please answer the question based on the user guide content above."
    )
}

// Resume vs job description analysis.
// Implements: text extraction, the model call, and feedback formatting.
// All model calls go through llm_client, never straight to Gemini.

pub mod client;
pub mod extract;
pub mod feedback;
pub mod handlers;
pub mod models;
pub mod prompts;

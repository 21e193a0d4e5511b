// Shared prompt fragments.
// Each service that needs model calls defines its own prompts.rs alongside it.

/// Instruction appended to prompts whose reply is parsed as JSON.
/// Replies are still fence-stripped because models do not always comply.
pub const JSON_ONLY_INSTRUCTION: &str = "\
    Respond with valid JSON only. \
    Do NOT include any text outside the JSON object. \
    Do NOT include explanations or apologies.";

// Shared prompt constants.
// Each flow keeps its own instruction templates next to it (see analysis/prompts.rs);
// this file holds the cross-cutting fragments.

/// System prompt that enforces JSON-only output for every analysis flow.
pub const JSON_ONLY_SYSTEM: &str = "You are a precise, structured assistant. \
    You MUST respond with valid JSON only. \
    Do NOT include any text outside the JSON object. \
    Do NOT use markdown code fences. \
    Do NOT include explanations or apologies.";

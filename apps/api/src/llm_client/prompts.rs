// Shared prompt constants.
// Each service that needs LLM calls defines its own prompts.rs alongside it.
// This file contains cross-cutting prompt fragments.

/// System prompt fragment that enforces JSON-only output.
pub const JSON_ONLY_SYSTEM: &str = "You are a precise, structured assistant. \
    You MUST respond with valid JSON only. \
    Do NOT include any text outside the JSON object. \
    Do NOT use markdown code fences. \
    Do NOT include explanations or apologies.";

/// Instruction appended wherever the model works from the user's own profile data.
pub const NO_FABRICATION_INSTRUCTION: &str = "\
    Use only facts present in the provided text. \
    Do NOT invent employers, dates, degrees, skills or contact details. \
    If a value is not present, use an empty string or an empty list.";

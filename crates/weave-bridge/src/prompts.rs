//! System prompt composition for agent turns.

/// Standing instructions appended to every turn's prompt.
pub const SYSTEM_PROMPTS: &[&str] = &[
    "Everything below this line is system context. Take it into account but do not reply to it.",
    "If you cannot find the context you need, look through the conversation thread and nearby messages.",
    "Reply in plain text without markdown formatting; code blocks are fine.",
    "You are running on a separate server, driven by a chat bot application through the Claude CLI.",
    "Your working directory belongs to the bot application and carries no meaning; work out which repository the prompt refers to from the prompt itself.",
];

/// Compose the full prompt for a turn: the user's query first, then the
/// system context after a separator.
pub fn build_prompt(user_query: &str) -> String {
    let context = SYSTEM_PROMPTS.join("\n\n");
    format!("{user_query}\n\n---\n{context}")
}

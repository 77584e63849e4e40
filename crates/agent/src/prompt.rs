//! The agent's base system prompt.
//!
//! Models key their tool-use behavior off this exact wording; editing it
//! changes observable agent behavior, so additions are appended rather than
//! interleaved.

/// Instructions prepended to every model call.
pub const BASE_SYSTEM_PROMPT: &str = "\
You are a helpful assistant with access to tools. To respond to the user's request:

1. Analyze the request and decide which tools, if any, can help answer it.
2. Use tools one at a time. After each tool call, wait for its result before deciding what to do next.
3. Reuse information from earlier tool results instead of repeating the same call.
4. When you have enough information, give your final answer directly without calling more tools.
5. Always think step by step.";

/// The full system message: base prompt plus an optional caller addition.
pub fn build_system_message(addition: Option<&str>) -> String {
    match addition {
        Some(extra) if !extra.is_empty() => format!("{BASE_SYSTEM_PROMPT}\n\n{extra}"),
        _ => BASE_SYSTEM_PROMPT.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_addition_returns_the_base_prompt() {
        assert_eq!(build_system_message(None), BASE_SYSTEM_PROMPT);
        assert_eq!(build_system_message(Some("")), BASE_SYSTEM_PROMPT);
    }

    #[test]
    fn addition_is_separated_by_a_blank_line() {
        let message = build_system_message(Some("Prefer metric units."));
        assert_eq!(
            message,
            format!("{BASE_SYSTEM_PROMPT}\n\nPrefer metric units.")
        );
    }
}

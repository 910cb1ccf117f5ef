use std::sync::LazyLock;

use regex::Regex;

/// First fenced block: optional language tag line, then a lazily captured body.
static FENCED_BLOCK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"```(?:\w*\n)?([\s\S]*?)```").expect("fenced block pattern is valid")
});

/// Pull the code out of a model reply.
///
/// Returns the body of the first fenced code block, or the whole reply when
/// there is none (or the block is empty).
pub fn extract_code(reply: &str) -> &str {
    FENCED_BLOCK
        .captures(reply)
        .and_then(|caps| caps.get(1))
        .map(|body| body.as_str())
        .filter(|body| !body.is_empty())
        .unwrap_or(reply)
}

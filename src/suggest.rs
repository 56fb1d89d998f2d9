//! Suggestion fence rewriting.
//!
//! Hosting services encode the replacement range of a code suggestion in the
//! fence opener itself: ```` ```suggestion:-0+2 ```` replaces the anchor line
//! plus the two below it. Analyzers emit plain ```` ```suggestion ```` fences
//! with separate start/end lines, so the opener must be rewritten before
//! publishing.

/// Rewrites every ```` ```suggestion ```` opener in `body` to carry the
/// replacement range `-0+(end_line - start_line)`, counted in the new file.
pub fn rewrite_suggestion_fences(body: &str, start_line: u32, end_line: u32) -> String {
    let range = end_line.saturating_sub(start_line);
    body.replace("```suggestion", &format!("```suggestion:-0+{range}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_line_range_is_zero() {
        let body = "```suggestion\nlet x = 1;\n```";
        assert_eq!(
            rewrite_suggestion_fences(body, 10, 10),
            "```suggestion:-0+0\nlet x = 1;\n```"
        );
    }

    #[test]
    fn multi_line_range_counts_from_start() {
        let body = "fix:\n```suggestion\na\nb\nc\n```";
        assert_eq!(
            rewrite_suggestion_fences(body, 4, 6),
            "fix:\n```suggestion:-0+2\na\nb\nc\n```"
        );
    }

    #[test]
    fn every_opener_is_rewritten() {
        let body = "```suggestion\na\n```\ntext\n```suggestion\nb\n```";
        let out = rewrite_suggestion_fences(body, 1, 2);
        assert_eq!(out.matches("```suggestion:-0+1").count(), 2);
    }

    #[test]
    fn body_without_fence_is_untouched() {
        let body = "just a comment";
        assert_eq!(rewrite_suggestion_fences(body, 1, 5), body);
    }
}

use crate::app::models::ProcessingOptions;

const MERMAID_FENCE: &str = "```mermaid";
const FENCE: &str = "```";

pub struct MarkdownFormatter;

impl MarkdownFormatter {
    /// Returns the inner diagram text when `content` is exactly one mermaid
    /// code block, otherwise `content` unchanged.
    pub fn extract_mermaid(content: &str) -> &str {
        let trimmed = content.trim();

        let Some(after_start) = trimmed.strip_prefix(MERMAID_FENCE) else {
            return content;
        };
        let Some(body) = after_start.strip_suffix(FENCE) else {
            return content;
        };

        // The opening fence must be alone on its line.
        let Some(inner) = body
            .strip_prefix("\r\n")
            .or_else(|| body.strip_prefix('\n'))
        else {
            return content;
        };

        // A second fence inside means extra text around the block; keep it all.
        if inner.lines().any(|line| line.trim_start().starts_with(FENCE)) {
            return content;
        }

        inner
            .strip_suffix("\r\n")
            .or_else(|| inner.strip_suffix('\n'))
            .unwrap_or(inner)
    }

    /// Builds the Markdown document for one diagram.
    pub fn format(
        raw_content: &str,
        options: &ProcessingOptions,
        command_info: Option<&str>,
    ) -> String {
        let diagram = Self::extract_mermaid(raw_content);
        let mut parts: Vec<&str> = Vec::new();

        if !options.header.is_empty() {
            parts.push(&options.header);
            parts.push("");
        }

        if let Some(command) = command_info.filter(|_| !options.hide_command) {
            parts.push("```bash");
            parts.push(command);
            parts.push(FENCE);
            parts.push("");
        }

        parts.push(MERMAID_FENCE);
        parts.push(diagram.trim());
        parts.push(FENCE);

        if !options.footer.is_empty() {
            parts.push("");
            parts.push(&options.footer);
        }

        parts.join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bare_options() -> ProcessingOptions {
        ProcessingOptions {
            hide_command: true,
            ..ProcessingOptions::default()
        }
    }

    #[test]
    fn wraps_plain_diagram() {
        let out = MarkdownFormatter::format("graph TD\n  A --> B\n", &bare_options(), None);
        assert_eq!(out, "```mermaid\ngraph TD\n  A --> B\n```");
    }

    #[test]
    fn extracts_existing_block() {
        let wrapped = "```mermaid\ngraph TD\n  A --> B\n```";
        assert_eq!(MarkdownFormatter::extract_mermaid(wrapped), "graph TD\n  A --> B");
    }

    #[test]
    fn extracts_block_surrounded_by_whitespace() {
        let wrapped = "\n\n```mermaid\nsequenceDiagram\n```\n\n";
        assert_eq!(MarkdownFormatter::extract_mermaid(wrapped), "sequenceDiagram");
    }

    #[test]
    fn extracts_crlf_block() {
        let wrapped = "```mermaid\r\ngraph LR\r\n```";
        assert_eq!(MarkdownFormatter::extract_mermaid(wrapped), "graph LR");
    }

    #[test]
    fn leaves_unclosed_block_alone() {
        let content = "```mermaid\ngraph TD\n  A --> B";
        assert_eq!(MarkdownFormatter::extract_mermaid(content), content);
    }

    #[test]
    fn leaves_fence_without_newline_alone() {
        let content = "```mermaid graph TD```";
        assert_eq!(MarkdownFormatter::extract_mermaid(content), content);
        assert_eq!(MarkdownFormatter::extract_mermaid("```mermaid"), "```mermaid");
    }

    #[test]
    fn leaves_other_languages_alone() {
        let content = "```js\nconsole.log(1)\n```";
        assert_eq!(MarkdownFormatter::extract_mermaid(content), content);
    }

    #[test]
    fn leaves_extra_text_around_block_alone() {
        let content = "```mermaid\ngraph TD\n```\nnotes\n```";
        assert_eq!(MarkdownFormatter::extract_mermaid(content), content);

        let leading = "intro\n```mermaid\ngraph TD\n```";
        assert_eq!(MarkdownFormatter::extract_mermaid(leading), leading);
    }

    #[test]
    fn formatting_twice_does_not_nest_fences() {
        let opts = bare_options();
        let once = MarkdownFormatter::format("graph TD\n  A --> B", &opts, None);
        let twice = MarkdownFormatter::format(&once, &opts, None);
        assert_eq!(once, twice);
        assert_eq!(twice.matches("```mermaid").count(), 1);
    }

    #[test]
    fn includes_header_command_and_footer_in_order() {
        let opts = ProcessingOptions {
            header: "# Title".into(),
            footer: "<!-- END -->".into(),
            ..ProcessingOptions::default()
        };
        let out = MarkdownFormatter::format("graph TD", &opts, Some("mermaid-markdown-wrap a.mmd"));
        assert_eq!(
            out,
            "# Title\n\n```bash\nmermaid-markdown-wrap a.mmd\n```\n\n```mermaid\ngraph TD\n```\n\n<!-- END -->"
        );
    }

    #[test]
    fn hide_command_drops_bash_block() {
        let opts = ProcessingOptions {
            hide_command: true,
            ..ProcessingOptions::default()
        };
        let out = MarkdownFormatter::format("graph TD", &opts, Some("cmd"));
        assert!(!out.contains("```bash"));
    }

    #[test]
    fn missing_command_info_drops_bash_block() {
        let out = MarkdownFormatter::format("graph TD", &ProcessingOptions::default(), None);
        assert_eq!(out, "```mermaid\ngraph TD\n```");
    }
}

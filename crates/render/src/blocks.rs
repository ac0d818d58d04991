use serde::Serialize;

/// Card title used when the text has no bold span or level-2 heading.
pub const DEFAULT_TITLE: &str = "MOLTBOT";

const BULLET_MARKERS: [char; 3] = ['-', '•', '●'];

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "type", content = "text", rename_all = "snake_case")]
pub enum PresentationBlock {
    Heading(String),
    Subheading(String),
    ListItem(String),
    Separator,
    Paragraph(String),
}

impl PresentationBlock {
    pub fn text(&self) -> Option<&str> {
        match self {
            Self::Heading(text)
            | Self::Subheading(text)
            | Self::ListItem(text)
            | Self::Paragraph(text) => Some(text),
            Self::Separator => None,
        }
    }

    pub fn is_paragraph(&self) -> bool {
        matches!(self, Self::Paragraph(_))
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum LineKind<'a> {
    Heading(&'a str),
    Subheading(&'a str),
    ListItem(&'a str),
    CodeFence,
    Separator,
    Text(&'a str),
    Blank,
}

fn classify_line(line: &str) -> LineKind<'_> {
    if line.starts_with("## ") || line.starts_with("**") {
        LineKind::Heading(line)
    } else if let Some(rest) = line.strip_prefix("### ") {
        LineKind::Subheading(rest)
    } else if let Some(rest) = strip_bullet(line) {
        LineKind::ListItem(strip_ordinal(rest, true).unwrap_or(rest))
    } else if let Some(rest) = strip_ordinal(line, true) {
        LineKind::ListItem(rest)
    } else if line.starts_with("```") {
        LineKind::CodeFence
    } else if line.starts_with("---") {
        LineKind::Separator
    } else if line.trim().is_empty() {
        LineKind::Blank
    } else {
        LineKind::Text(line)
    }
}

/// Splits `text` into blocks in a single top-to-bottom pass.
///
/// Plain lines accumulate into one paragraph until a structural line interrupts
/// the run. Blank lines are swallowed, so a run separated only by blank lines
/// stays one paragraph. Code fence lines are dropped and the code lines between
/// them read as paragraph text.
pub fn parse(text: &str) -> Vec<PresentationBlock> {
    let mut sink = BlockSink::default();

    for line in text.lines() {
        match classify_line(line) {
            LineKind::Heading(raw) => sink.emit(PresentationBlock::Heading(heading_text(raw))),
            LineKind::Subheading(rest) => {
                sink.emit(PresentationBlock::Subheading(rest.to_string()))
            }
            LineKind::ListItem(rest) => sink.emit(PresentationBlock::ListItem(rest.to_string())),
            LineKind::CodeFence => sink.flush(),
            LineKind::Separator => sink.emit(PresentationBlock::Separator),
            LineKind::Text(line) => sink.pending.push(line),
            LineKind::Blank => {}
        }
    }

    sink.finish()
}

#[derive(Default)]
struct BlockSink<'a> {
    blocks: Vec<PresentationBlock>,
    pending: Vec<&'a str>,
}

impl<'a> BlockSink<'a> {
    fn emit(&mut self, block: PresentationBlock) {
        self.flush();
        self.blocks.push(block);
    }

    fn flush(&mut self) {
        if self.pending.is_empty() {
            return;
        }

        let paragraph = self.pending.join("\n");
        self.pending.clear();

        // Only a dropped fence line can sit between two runs of plain text.
        if let Some(PresentationBlock::Paragraph(previous)) = self.blocks.last_mut() {
            previous.push('\n');
            previous.push_str(&paragraph);
        } else {
            self.blocks.push(PresentationBlock::Paragraph(paragraph));
        }
    }

    fn finish(mut self) -> Vec<PresentationBlock> {
        self.flush();
        self.blocks
    }
}

fn heading_text(line: &str) -> String {
    let without_marker = match line.strip_prefix("##") {
        Some(rest) => rest.trim_start(),
        None => line,
    };
    without_marker.replace("**", "")
}

/// Picks the card title: the first `**bold**` span opening a line, or the first
/// level-2 heading, whichever comes first.
pub fn derive_title(text: &str) -> String {
    text.lines().find_map(title_from_line).unwrap_or_else(|| DEFAULT_TITLE.to_string())
}

fn title_from_line(line: &str) -> Option<String> {
    if let Some(rest) = line.strip_prefix("**") {
        let first_len = rest.chars().next()?.len_utf8();
        if let Some(end) = rest[first_len..].find("**") {
            return Some(rest[..first_len + end].to_string());
        }
        return None;
    }

    let rest = line.strip_prefix("##")?;
    if rest.starts_with('#') {
        return None;
    }
    let title = rest.replace("**", "");
    let title = title.trim();
    (!title.is_empty()).then(|| title.to_string())
}

/// Returns the text after a bullet marker and its whitespace, if the line opens
/// with one.
pub(crate) fn strip_bullet(line: &str) -> Option<&str> {
    let mut chars = line.chars();
    let marker = chars.next()?;
    if !BULLET_MARKERS.contains(&marker) {
        return None;
    }
    let rest = chars.as_str();
    rest.starts_with(char::is_whitespace).then(|| rest.trim_start())
}

/// Returns the text after a `12.` style ordinal. With `require_space` the dot
/// must be followed by whitespace.
pub(crate) fn strip_ordinal(line: &str, require_space: bool) -> Option<&str> {
    let digits = line.bytes().take_while(u8::is_ascii_digit).count();
    if digits == 0 {
        return None;
    }
    let rest = line[digits..].strip_prefix('.')?;
    if require_space && !rest.starts_with(char::is_whitespace) {
        return None;
    }
    Some(rest.trim_start())
}

#[cfg(test)]
mod tests {
    use super::{derive_title, parse, strip_bullet, strip_ordinal, PresentationBlock};

    fn paragraph(text: &str) -> PresentationBlock {
        PresentationBlock::Paragraph(text.to_string())
    }

    #[test]
    fn heading_and_list_items_are_split_into_blocks() {
        let blocks = parse("## Plan\n- step one\n- step two");
        assert_eq!(
            blocks,
            vec![
                PresentationBlock::Heading("Plan".to_string()),
                PresentationBlock::ListItem("step one".to_string()),
                PresentationBlock::ListItem("step two".to_string()),
            ]
        );
    }

    #[test]
    fn bold_lines_become_headings_without_markers() {
        let blocks = parse("**Summary** for today\nall good");
        assert_eq!(
            blocks,
            vec![
                PresentationBlock::Heading("Summary for today".to_string()),
                paragraph("all good"),
            ]
        );
    }

    #[test]
    fn every_list_marker_style_normalizes_to_list_item() {
        let blocks = parse("- dash\n• dot\n● circle\n1. first\n12. twelfth");
        let items = blocks
            .iter()
            .map(|block| match block {
                PresentationBlock::ListItem(text) => text.as_str(),
                _ => "not a list item",
            })
            .collect::<Vec<_>>();
        assert_eq!(items, vec!["dash", "dot", "circle", "first", "twelfth"]);
    }

    #[test]
    fn bullet_followed_by_ordinal_drops_both_markers() {
        let blocks = parse("- 1. foo\n• 2.\tbar\n- 3.5 kg");
        assert_eq!(
            blocks,
            vec![
                PresentationBlock::ListItem("foo".to_string()),
                PresentationBlock::ListItem("bar".to_string()),
                PresentationBlock::ListItem("3.5 kg".to_string()),
            ]
        );
    }

    #[test]
    fn subheading_separator_and_fences_are_recognized() {
        let blocks = parse("### Details\nline a\n---\n```rust\nlet x = 1;\n```\nafter");
        assert_eq!(
            blocks,
            vec![
                PresentationBlock::Subheading("Details".to_string()),
                paragraph("line a"),
                PresentationBlock::Separator,
                paragraph("let x = 1;\nafter"),
            ]
        );
    }

    #[test]
    fn consecutive_plain_lines_merge_and_blank_lines_collapse() {
        let blocks = parse("first line\nsecond line\n\n\nthird line\n## Next\ntail");
        assert_eq!(
            blocks,
            vec![
                paragraph("first line\nsecond line\nthird line"),
                PresentationBlock::Heading("Next".to_string()),
                paragraph("tail"),
            ]
        );
    }

    #[test]
    fn parse_never_emits_adjacent_paragraphs() {
        let inputs = [
            "a\n```\nb\n```\nc",
            "```\n```\nx\n\ny",
            "## h\none\n```py\ntwo\n```\n\nthree\n- item\nfour",
            "plain\r\nwindows\r\n\r\nlines",
        ];

        for input in inputs {
            let blocks = parse(input);
            assert!(
                !blocks.windows(2).any(|pair| pair[0].is_paragraph() && pair[1].is_paragraph()),
                "adjacent paragraphs for input {input:?}: {blocks:?}"
            );
        }
    }

    #[test]
    fn parse_preserves_source_order() {
        let blocks = parse("intro\n## A\n- a1\n---\n### B\nbody\n2. b1");
        let texts = blocks.iter().map(|block| block.text().unwrap_or("|")).collect::<Vec<_>>();
        assert_eq!(texts, vec!["intro", "A", "a1", "|", "B", "body", "b1"]);
    }

    #[test]
    fn parse_is_deterministic() {
        let text = "**Title**\n1. one\n\nsome text\n```\ncode\n```";
        assert_eq!(parse(text), parse(text));
    }

    #[test]
    fn long_text_without_markers_is_one_paragraph() {
        let text = "a".repeat(500);
        assert_eq!(parse(&text), vec![paragraph(&text)]);
    }

    #[test]
    fn fences_only_yield_no_blocks() {
        assert!(parse("```\n```").is_empty());
        assert!(parse("").is_empty());
    }

    #[test]
    fn ordinal_without_space_is_plain_text_for_the_parser() {
        assert_eq!(parse("3.14 is pi"), vec![paragraph("3.14 is pi")]);
        assert_eq!(strip_ordinal("3.14 is pi", false), Some("14 is pi"));
        assert_eq!(strip_ordinal("3.14 is pi", true), None);
    }

    #[test]
    fn bullet_requires_trailing_whitespace() {
        assert_eq!(strip_bullet("- item"), Some("item"));
        assert_eq!(strip_bullet("•\titem"), Some("item"));
        assert_eq!(strip_bullet("-item"), None);
        assert_eq!(strip_bullet("---"), None);
    }

    #[test]
    fn title_comes_from_first_bold_span_or_level_two_heading() {
        assert_eq!(derive_title("intro\n**Weekly Report** extra\n## Later"), "Weekly Report");
        assert_eq!(derive_title("## Plan\n**Bold** later"), "Plan");
        assert_eq!(derive_title("### Only sub\n- item"), "MOLTBOT");
        assert_eq!(derive_title("**unterminated\n##   Spaced   "), "Spaced");
        assert_eq!(derive_title("plain text"), "MOLTBOT");
        assert_eq!(derive_title("**台積電** 今日股價"), "台積電");
    }
}

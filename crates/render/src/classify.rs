use crate::blocks::{strip_bullet, strip_ordinal};

/// Replies longer than this many characters always render as a card.
pub const LONG_TEXT_THRESHOLD: usize = 300;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StructureRule {
    HeadingMarker,
    ListMarker,
    LongText,
    CodeFence,
}

impl StructureRule {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::HeadingMarker => "heading_marker",
            Self::ListMarker => "list_marker",
            Self::LongText => "long_text",
            Self::CodeFence => "code_fence",
        }
    }
}

type RulePredicate = fn(&str) -> bool;

/// Evaluated in order; the first match wins.
const RULES: &[(StructureRule, RulePredicate)] = &[
    (StructureRule::HeadingMarker, has_heading_marker),
    (StructureRule::ListMarker, has_list_marker),
    (StructureRule::LongText, is_long_text),
    (StructureRule::CodeFence, has_code_fence),
];

pub fn matched_rule(text: &str) -> Option<StructureRule> {
    RULES.iter().find(|(_, predicate)| predicate(text)).map(|(rule, _)| *rule)
}

pub fn needs_structured_card(text: &str) -> bool {
    matched_rule(text).is_some()
}

fn has_heading_marker(text: &str) -> bool {
    text.lines().any(|line| line.starts_with("**") || line.starts_with("##"))
}

fn has_list_marker(text: &str) -> bool {
    text.lines().any(|line| strip_bullet(line).is_some() || strip_ordinal(line, false).is_some())
}

fn is_long_text(text: &str) -> bool {
    text.chars().count() > LONG_TEXT_THRESHOLD
}

fn has_code_fence(text: &str) -> bool {
    text.contains("```")
}

#[cfg(test)]
mod tests {
    use super::{matched_rule, needs_structured_card, StructureRule, LONG_TEXT_THRESHOLD};

    #[test]
    fn short_plain_text_stays_plain() {
        for text in ["hello", "", "今天天氣很好，記得帶傘。", "price is 3 dollars - cheap", "#1 fan"] {
            assert!(!needs_structured_card(text), "expected plain for {text:?}");
        }
    }

    #[test]
    fn structural_markers_trigger_cards() {
        let cases = [
            ("- item", StructureRule::ListMarker),
            ("• item", StructureRule::ListMarker),
            ("intro\n1. first", StructureRule::ListMarker),
            ("2.no space still counts", StructureRule::ListMarker),
            ("## Plan", StructureRule::HeadingMarker),
            ("### Sub", StructureRule::HeadingMarker),
            ("text\n**bold** line", StructureRule::HeadingMarker),
            ("see ```code```", StructureRule::CodeFence),
        ];

        for (text, rule) in cases {
            assert_eq!(matched_rule(text), Some(rule), "unexpected rule for {text:?}");
            assert!(needs_structured_card(text));
        }
    }

    #[test]
    fn markers_only_count_at_line_start() {
        assert!(!needs_structured_card("this has ## inside"));
        assert!(!needs_structured_card("and a - dash in the middle"));
        assert!(!needs_structured_card("some **bold** words"));
    }

    #[test]
    fn length_threshold_counts_characters() {
        let at_threshold = "字".repeat(LONG_TEXT_THRESHOLD);
        assert!(!needs_structured_card(&at_threshold));

        let over_threshold = "a".repeat(500);
        assert_eq!(matched_rule(&over_threshold), Some(StructureRule::LongText));
    }

    #[test]
    fn earlier_rules_win_when_several_match() {
        let text = format!("## Title\n- item\n```\n{}", "x".repeat(400));
        assert_eq!(matched_rule(&text), Some(StructureRule::HeadingMarker));
        assert_eq!(StructureRule::HeadingMarker.as_str(), "heading_marker");
    }
}

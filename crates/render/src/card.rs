use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::blocks::PresentationBlock;

pub const BRAND_LABEL: &str = "🤖 MOLTBOT";
pub const ALT_TEXT_MAX_CHARS: usize = 40;
pub const ERROR_ALT_TEXT: &str = "⚠️ 錯誤";
pub const ERROR_LABEL: &str = "⚠️ 發生錯誤";

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CardStyle {
    Standard,
    Error,
}

/// A footer button that sends `text` back as a new user message when tapped.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FooterAction {
    pub action_id: String,
    pub label: String,
    pub text: String,
}

impl FooterAction {
    pub fn new(
        action_id: impl Into<String>,
        label: impl Into<String>,
        text: impl Into<String>,
    ) -> Self {
        Self { action_id: action_id.into(), label: label.into(), text: text.into() }
    }

    pub fn more() -> Self {
        Self::new("reply.more.v1", "📋 更多", "繼續")
    }

    pub fn retry() -> Self {
        Self::new("reply.retry.v1", "🔄 重問", "請重新回答")
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CardHeader {
    pub brand: String,
    pub rendered_at: DateTime<Utc>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CardDocument {
    alt_text: String,
    title: String,
    style: CardStyle,
    #[serde(skip_serializing_if = "Option::is_none")]
    header: Option<CardHeader>,
    blocks: Vec<PresentationBlock>,
    footer_actions: Vec<FooterAction>,
}

impl CardDocument {
    pub fn alt_text(&self) -> &str {
        &self.alt_text
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn style(&self) -> CardStyle {
        self.style
    }

    /// Error cards have no header.
    pub fn header(&self) -> Option<&CardHeader> {
        self.header.as_ref()
    }

    pub fn blocks(&self) -> &[PresentationBlock] {
        &self.blocks
    }

    pub fn footer_actions(&self) -> &[FooterAction] {
        &self.footer_actions
    }
}

pub struct CardBuilder {
    title: String,
    alt_text: Option<String>,
    style: CardStyle,
    rendered_at: Option<DateTime<Utc>>,
    blocks: Vec<PresentationBlock>,
    footer_actions: Vec<FooterAction>,
}

impl CardBuilder {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            alt_text: None,
            style: CardStyle::Standard,
            rendered_at: Some(Utc::now()),
            blocks: Vec::new(),
            footer_actions: Vec::new(),
        }
    }

    pub fn style(mut self, style: CardStyle) -> Self {
        self.style = style;
        self
    }

    pub fn alt_text(mut self, alt_text: impl Into<String>) -> Self {
        self.alt_text = Some(alt_text.into());
        self
    }

    pub fn rendered_at(mut self, rendered_at: DateTime<Utc>) -> Self {
        self.rendered_at = Some(rendered_at);
        self
    }

    pub fn without_header(mut self) -> Self {
        self.rendered_at = None;
        self
    }

    pub fn body<F>(mut self, build: F) -> Self
    where
        F: FnOnce(&mut BodyBuilder),
    {
        let mut builder = BodyBuilder { blocks: std::mem::take(&mut self.blocks) };
        build(&mut builder);
        self.blocks = builder.blocks;
        self
    }

    pub fn footer<F>(mut self, build: F) -> Self
    where
        F: FnOnce(&mut FooterBuilder),
    {
        let mut builder = FooterBuilder { actions: std::mem::take(&mut self.footer_actions) };
        build(&mut builder);
        self.footer_actions = builder.actions;
        self
    }

    pub fn build(self) -> CardDocument {
        let alt_text =
            self.alt_text.unwrap_or_else(|| truncate_chars(&self.title, ALT_TEXT_MAX_CHARS));
        let header = self
            .rendered_at
            .map(|rendered_at| CardHeader { brand: BRAND_LABEL.to_string(), rendered_at });
        CardDocument {
            alt_text,
            title: self.title,
            style: self.style,
            header,
            blocks: self.blocks,
            footer_actions: self.footer_actions,
        }
    }
}

pub struct BodyBuilder {
    blocks: Vec<PresentationBlock>,
}

impl BodyBuilder {
    pub fn heading(&mut self, text: impl Into<String>) -> &mut Self {
        self.block(PresentationBlock::Heading(text.into()))
    }

    pub fn paragraph(&mut self, text: impl Into<String>) -> &mut Self {
        self.block(PresentationBlock::Paragraph(text.into()))
    }

    pub fn block(&mut self, block: PresentationBlock) -> &mut Self {
        self.blocks.push(block);
        self
    }

    pub fn extend(&mut self, blocks: impl IntoIterator<Item = PresentationBlock>) -> &mut Self {
        self.blocks.extend(blocks);
        self
    }
}

pub struct FooterBuilder {
    actions: Vec<FooterAction>,
}

impl FooterBuilder {
    pub fn action(&mut self, action: FooterAction) -> &mut Self {
        self.actions.push(action);
        self
    }
}

/// Builds the standard reply card. When parsing produced no blocks (a reply made
/// only of fence lines, for instance) the body falls back to the raw text as a
/// single paragraph so the card is never empty.
pub fn compose(blocks: Vec<PresentationBlock>, title: &str, raw_text: &str) -> CardDocument {
    compose_at(blocks, title, raw_text, Utc::now())
}

pub fn compose_at(
    blocks: Vec<PresentationBlock>,
    title: &str,
    raw_text: &str,
    rendered_at: DateTime<Utc>,
) -> CardDocument {
    CardBuilder::new(title)
        .rendered_at(rendered_at)
        .body(|body| {
            if blocks.is_empty() {
                body.paragraph(raw_text);
            } else {
                body.extend(blocks);
            }
        })
        .footer(|footer| {
            footer.action(FooterAction::more()).action(FooterAction::retry());
        })
        .build()
}

/// Smaller failure template: a bold label plus the detail, with no header or footer.
pub fn compose_error(detail: &str) -> CardDocument {
    CardBuilder::new(ERROR_LABEL)
        .alt_text(ERROR_ALT_TEXT)
        .style(CardStyle::Error)
        .without_header()
        .body(|body| {
            body.heading(ERROR_LABEL).paragraph(detail);
        })
        .build()
}

fn truncate_chars(text: &str, max_chars: usize) -> String {
    text.chars().take(max_chars).collect()
}

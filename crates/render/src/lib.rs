//! Adaptive reply rendering.
//!
//! Turns the final answer text of a turn into exactly one outgoing payload:
//! - **Classification** (`classify`) - plain text or structured card, from the text's shape
//! - **Parsing** (`blocks`) - markdown-ish lines to ordered `PresentationBlock`s
//! - **Composition** (`card`) - header / body / footer card documents
//! - **Payloads** (`reply`) - the `OutgoingMessage` handed to a transport
//!
//! # Pipeline
//!
//! ```text
//! answer text → needs_structured_card ─ no ──→ OutgoingMessage::Text
//!                       │
//!                      yes → parse + derive_title → compose → OutgoingMessage::Card
//! ```
//!
//! Everything here is pure apart from the render timestamp. Transports own
//! platform JSON, styling, delivery and length chunking.

pub mod blocks;
pub mod card;
pub mod classify;
pub mod reply;

pub use blocks::{derive_title, parse, PresentationBlock, DEFAULT_TITLE};
pub use card::{compose, compose_error, CardBuilder, CardDocument, CardStyle, FooterAction};
pub use classify::{matched_rule, needs_structured_card, StructureRule};
pub use reply::{error_reply, smart_reply, OutgoingMessage, TextMessage};

//! # Event Ingestor
//!
//! Turns a transport `RawEvent` into the canonical `InboundEvent` the router works on.
//!
//! Text is picked in a fixed order: the primary text field, then the secondary
//! body field, then the empty string. A field that is present but empty counts
//! as missing. Normalization is trim + lowercase, so `" Menu "` and `"MENU"`
//! both become `"menu"`.

use crate::domain::types::{InboundEvent, RawEvent};

pub fn normalize(raw: RawEvent) -> InboundEvent {
    let raw_text = extract_text(raw.text, raw.body);
    let normalized_text = raw_text.trim().to_lowercase();

    InboundEvent {
        message_id: raw.message_id,
        author_id: raw.author_id,
        conversation_id: raw.conversation_id,
        conversation_kind: raw.conversation_kind,
        raw_text,
        normalized_text,
    }
}

fn extract_text(text: Option<String>, body: Option<String>) -> String {
    text.filter(|t| !t.is_empty())
        .or(body)
        .unwrap_or_default()
}

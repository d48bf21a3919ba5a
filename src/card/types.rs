//! Feishu interactive card wire types

use serde::Serialize;

use crate::sentry::types::Template;

/// Outbound webhook body
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CardDocument {
    /// Always "interactive"
    pub msg_type: &'static str,
    pub card: Card,
}

impl CardDocument {
    pub fn new(header: CardHeader, elements: Vec<CardElement>) -> Self {
        Self {
            msg_type: "interactive",
            card: Card {
                config: CardConfig {
                    wide_screen_mode: true,
                },
                header,
                elements,
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Card {
    pub config: CardConfig,
    pub header: CardHeader,
    pub elements: Vec<CardElement>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CardConfig {
    pub wide_screen_mode: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CardHeader {
    pub title: PlainText,
    pub template: Template,
}

impl CardHeader {
    pub fn new(title: impl Into<String>, template: Template) -> Self {
        Self {
            title: PlainText::new(title),
            template,
        }
    }
}

/// `{"tag": "plain_text", "content": ...}`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlainText {
    pub tag: &'static str,
    pub content: String,
}

impl PlainText {
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            tag: "plain_text",
            content: content.into(),
        }
    }
}

/// `{"tag": "lark_md", "content": ...}`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LarkMd {
    pub tag: &'static str,
    pub content: String,
}

impl LarkMd {
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            tag: "lark_md",
            content: content.into(),
        }
    }
}

/// Card body element
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "tag", rename_all = "lowercase")]
pub enum CardElement {
    Div { text: LarkMd },
    Hr,
    Action { actions: Vec<Button> },
}

impl CardElement {
    /// Markdown text block
    pub fn markdown(content: impl Into<String>) -> Self {
        Self::Div {
            text: LarkMd::new(content),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Button {
    pub tag: &'static str,
    pub text: PlainText,
    pub url: String,
    #[serde(rename = "type")]
    pub kind: &'static str,
}

impl Button {
    /// Primary link button
    pub fn primary(label: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            tag: "button",
            text: PlainText::new(label),
            url: url.into(),
            kind: "primary",
        }
    }
}

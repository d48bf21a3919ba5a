//! Card rendering
//!
//! Turns extracted Sentry fields into a Feishu interactive card. Rendering is
//! a pure, single-pass transform: the same fields always produce the same
//! document.

pub mod types;

use serde_json::Value;

use crate::sentry::types::{ErrorFields, Extracted, IssueFields, Template};
pub use types::CardDocument;
use types::{Button, CardElement, CardHeader};


/// Characters of the JSON dump kept on an unknown-payload card
pub const UNKNOWN_DUMP_CHARS: usize = 500;

const DETAIL_BUTTON: &str = "🔍 查看详情";
const SOURCEMAP_HINT: &str = "💡 **提示：** 无法获取具体报错行数，建议检查项目配置：\n- 确保构建时开启了 SourceMap\n- 确保已上传 SourceMap 到 Sentry";

/// Render any extraction result
pub fn render(extracted: &Extracted) -> CardDocument {
    match extracted {
        Extracted::Error(fields) => render_error(fields),
        Extracted::Issue(fields) => render_issue(fields),
        Extracted::Raw(raw) => render_unknown(raw),
    }
}

/// Ordered `**label:** value` lines, empty values dropped
#[derive(Debug, Default)]
struct Lines(Vec<String>);

impl Lines {
    fn push(&mut self, label: &str, value: &str) {
        if !value.is_empty() {
            self.0.push(format!("**{}:** {}", label, value));
        }
    }

    fn join(&self) -> String {
        self.0.join("\n")
    }
}

/// Render an error event card
pub fn render_error(fields: &ErrorFields) -> CardDocument {
    let common = &fields.common;
    let env = &fields.env_info;
    let mut lines = Lines::default();

    lines.push(&format!("{} 环境", env.icon), &env.name);
    lines.push("📦 项目", &common.project);
    lines.push("🐛 错误类型", &common.error_type);
    lines.push("📝 错误信息", &common.error_message);
    lines.push("📍 报错位置", &common.culprit);
    lines.push("📄 代码行数", &fields.code_location);
    lines.push("🏷️ 版本", &fields.release);
    lines.push("🔗 页面URL", &fields.page_url);
    lines.push("📑 页面/事务", &fields.transaction);
    lines.push("💻 环境信息", &format!("{} / {}", fields.browser, fields.os));
    if common.is_unhandled {
        lines.push("⚠️ 状态", "未处理的异常");
    }
    lines.push("🔧 技术栈", &error_tech_stack(fields));
    lines.push("🕐 发生时间", &fields.timestamp);

    let mut elements = vec![CardElement::markdown(lines.join())];
    if fields.code_location_unknown {
        elements.push(CardElement::markdown(SOURCEMAP_HINT));
    }
    elements.extend(footer(&common.detail_url));

    let title = format!("{} Sentry Error [{}]", env.icon, env.name);
    CardDocument::new(CardHeader::new(title, common.template), elements)
}

/// Render an issue event card
pub fn render_issue(fields: &IssueFields) -> CardDocument {
    let common = &fields.common;
    let mut lines = Lines::default();

    lines.push("📦 项目", &common.project);
    lines.push("🐛 错误类型", &common.error_type);
    lines.push("📝 错误信息", &common.error_message);
    lines.push("📍 报错位置", &common.culprit);
    lines.push("📊 统计", &issue_stats(fields));
    lines.push(
        &format!("{} 优先级", fields.priority.icon()),
        &fields.priority.as_str().to_uppercase(),
    );
    if common.is_unhandled {
        lines.push("⚠️ 状态", "未处理的异常");
    }
    lines.push("🔧 技术栈", &tech_stack(&common.platform, &common.sdk));
    lines.push("🕐 首次出现", &fields.first_seen);
    if let Some(last_seen) = &fields.last_seen {
        lines.push("🕐 最近出现", last_seen);
    }

    let mut elements = vec![CardElement::markdown(lines.join())];
    elements.extend(footer(&common.detail_url));

    let title = format!("🚨 Sentry Issue [{}]", fields.short_id);
    CardDocument::new(CardHeader::new(title, common.template), elements)
}

/// Render the fallback card for an unrecognized payload
pub fn render_unknown(raw: &Value) -> CardDocument {
    let pretty = serde_json::to_string_pretty(raw).unwrap_or_else(|_| raw.to_string());
    let dump: String = pretty.chars().take(UNKNOWN_DUMP_CHARS).collect();
    let content = format!(
        "收到未知格式的 Sentry webhook\n\n```json\n{}...\n```",
        dump
    );

    CardDocument::new(
        CardHeader::new("🚨 Sentry 报警", Template::Orange),
        vec![CardElement::markdown(content)],
    )
}

/// Divider plus the detail link button
fn footer(detail_url: &str) -> [CardElement; 2] {
    [
        CardElement::Hr,
        CardElement::Action {
            actions: vec![Button::primary(DETAIL_BUTTON, detail_url)],
        },
    ]
}

/// `发生 **N** 次 · 影响 **M** 个用户`
fn issue_stats(fields: &IssueFields) -> String {
    let mut parts = Vec::new();
    if !fields.count.is_empty() {
        parts.push(format!("发生 **{}** 次", fields.count));
    }
    if !fields.user_count.is_empty() {
        parts.push(format!("影响 **{}** 个用户", fields.user_count));
    }
    parts.join(" · ")
}

/// `platform / sdk@version`
fn error_tech_stack(fields: &ErrorFields) -> String {
    let sdk = &fields.common.sdk;
    if sdk.is_empty() || fields.sdk_version.is_empty() {
        tech_stack(&fields.common.platform, sdk)
    } else {
        tech_stack(
            &fields.common.platform,
            &format!("{}@{}", sdk, fields.sdk_version),
        )
    }
}

/// Non-empty parts joined with " / "
fn tech_stack(platform: &str, sdk: &str) -> String {
    [platform, sdk]
        .into_iter()
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join(" / ")
}

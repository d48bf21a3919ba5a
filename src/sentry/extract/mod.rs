//! Payload classification and field extraction
//!
//! Both steps are total over arbitrary JSON: an unexpected shape degrades to
//! [`EventVariant::Unknown`], a missing field to its documented default.

use chrono::{DateTime, Utc};
use serde_json::Value;

use super::fields::{first_present, tag_text, text, text_at, truthy};
use super::time::format_timestamp;
use super::types::{
    CommonFields, EnvColor, EnvironmentInfo, ErrorFields, EventVariant, Extracted, IssueFields,
    Priority, Template, DEFAULT_DETAIL_URL, UNKNOWN_CODE_LOCATION,
};


const DEFAULT_PROJECT: &str = "Sentry Project";
const DEFAULT_TITLE: &str = "Unknown Error";
const DEFAULT_ERROR_TYPE: &str = "Error";
const DEFAULT_CULPRIT: &str = "未知位置";
const DEFAULT_PLATFORM: &str = "javascript";
const DEFAULT_SDK: &str = "未知SDK";
const DEFAULT_BROWSER: &str = "未知浏览器";
const DEFAULT_OS: &str = "未知系统";
const DEFAULT_ENVIRONMENT: &str = "unknown";

/// Classify a raw webhook body
///
/// `data.error` wins over `data.issue`; anything else is unknown.
pub fn classify(mut raw: Value) -> EventVariant {
    if let Some(error) = raw.pointer_mut("/data/error").filter(|v| v.is_object()) {
        return EventVariant::Error(error.take());
    }
    if let Some(issue) = raw.pointer_mut("/data/issue").filter(|v| v.is_object()) {
        return EventVariant::Issue(issue.take());
    }
    EventVariant::Unknown(raw)
}

/// Extract canonical fields from a classified payload
///
/// `now` is displayed when the payload carries no timestamp.
pub fn extract(variant: EventVariant, now: DateTime<Utc>) -> Extracted {
    match variant {
        EventVariant::Error(error) => Extracted::Error(extract_error(&error, now)),
        EventVariant::Issue(issue) => Extracted::Issue(extract_issue(&issue, now)),
        EventVariant::Unknown(raw) => Extracted::Raw(raw),
    }
}

/// Map an environment name to display info (case-insensitive)
pub fn environment_info(env: &str) -> EnvironmentInfo {
    let (name, icon, color) = match env.to_lowercase().as_str() {
        "production" | "prod" => ("生产环境", "🔴", EnvColor::Red),
        "staging" => ("预发环境", "🟠", EnvColor::Orange),
        "test" | "testing" => ("测试环境", "🟡", EnvColor::Yellow),
        "development" | "dev" => ("开发环境", "🟢", EnvColor::Green),
        _ if env.is_empty() => ("未知环境", "⚪", EnvColor::Grey),
        _ => (env, "⚪", EnvColor::Grey),
    };
    EnvironmentInfo {
        name: name.to_string(),
        icon,
        color,
    }
}

/// Extract fields from `data.error`
pub fn extract_error(error: &Value, now: DateTime<Utc>) -> ErrorFields {
    let null = Value::Null;
    let metadata = error.get("metadata").unwrap_or(&null);
    let tags = error.get("tags").unwrap_or(&null);
    let exception = error.pointer("/exception/values/0").unwrap_or(&null);
    let frames = exception
        .pointer("/stacktrace/frames")
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or_default();

    let environment = first_present(
        [tag_text(tags, "environment"), text(error.get("environment"))],
        DEFAULT_ENVIRONMENT,
    );
    let env_info = environment_info(&environment);

    let title = first_present(
        [text(error.get("title")), text(exception.get("value"))],
        DEFAULT_TITLE,
    );
    let error_message = first_present(
        [text(exception.get("value")), text(metadata.get("value"))],
        &title,
    );
    let error_type = first_present(
        [text(exception.get("type")), text(metadata.get("type"))],
        DEFAULT_ERROR_TYPE,
    );

    let template = if env_info.is_production() {
        Template::Red
    } else {
        Template::for_level(&level_of(error))
    };

    let is_unhandled = tag_text(tags, "handled").as_deref() == Some("no")
        || exception.pointer("/mechanism/handled") == Some(&Value::Bool(false));

    let code_location = code_location(metadata, frames);
    let code_location_unknown = code_location.is_none();

    ErrorFields {
        common: CommonFields {
            project: first_present([text(error.get("project"))], DEFAULT_PROJECT),
            error_type,
            error_message,
            culprit: first_present([text(error.get("culprit"))], DEFAULT_CULPRIT),
            platform: first_present([text(error.get("platform"))], DEFAULT_PLATFORM),
            sdk: first_present([text_at(error, "/sdk/name")], DEFAULT_SDK),
            template,
            is_unhandled,
            detail_url: first_present(
                [text(error.get("web_url")), text(error.get("url"))],
                DEFAULT_DETAIL_URL,
            ),
        },
        env_info,
        code_location: code_location.unwrap_or_else(|| UNKNOWN_CODE_LOCATION.to_string()),
        code_location_unknown,
        release: first_present(
            [tag_text(tags, "release"), text(error.get("release"))],
            "",
        ),
        page_url: first_present([tag_text(tags, "url"), text_at(error, "/request/url")], ""),
        transaction: first_present(
            [tag_text(tags, "transaction"), text(error.get("transaction"))],
            "",
        ),
        browser: first_present(
            [
                tag_text(tags, "browser"),
                text_at(error, "/contexts/browser/name"),
            ],
            DEFAULT_BROWSER,
        ),
        os: first_present(
            [tag_text(tags, "os"), text_at(error, "/contexts/os/name")],
            DEFAULT_OS,
        ),
        sdk_version: first_present([text_at(error, "/sdk/version")], ""),
        timestamp: format_timestamp(
            error.get("datetime").or_else(|| error.get("timestamp")),
            now,
        ),
    }
}

/// Raw `level`, "error" when absent
fn level_of(event: &Value) -> String {
    first_present([text(event.get("level"))], "error")
}

/// Compose a code location from metadata, else from the last stack frame
fn code_location(metadata: &Value, frames: &[Value]) -> Option<String> {
    if let Some(filename) = text(metadata.get("filename")) {
        let mut location = filename;
        if let Some(lineno) = text(metadata.get("lineno")) {
            location.push(':');
            location.push_str(&lineno);
        }
        if let Some(function) = text(metadata.get("function")) {
            location.push_str(&format!(" ({})", function));
        }
        return Some(location);
    }

    // Sentry orders frames oldest first; the last one is where it blew up.
    let frame = frames.last()?;
    let mut location = text(frame.get("filename"))?;
    if let Some(lineno) = text(frame.get("lineno")) {
        location.push(':');
        location.push_str(&lineno);
        if let Some(colno) = text(frame.get("colno")) {
            location.push(':');
            location.push_str(&colno);
        }
    }
    if let Some(function) = text(frame.get("function")) {
        location.push_str(&format!(" ({})", function));
    }
    Some(location)
}

/// Extract fields from `data.issue`
pub fn extract_issue(issue: &Value, now: DateTime<Utc>) -> IssueFields {
    let null = Value::Null;
    let metadata = issue.get("metadata").unwrap_or(&null);

    let error_message = first_present(
        [text(metadata.get("value")), text(issue.get("title"))],
        DEFAULT_TITLE,
    );

    let first_seen = issue.get("firstSeen");
    let last_seen = issue
        .get("lastSeen")
        .filter(|last| truthy(Some(*last)) && Some(*last) != first_seen)
        .map(|last| format_timestamp(Some(last), now));

    IssueFields {
        common: CommonFields {
            project: first_present(
                [
                    text_at(issue, "/project/slug"),
                    text_at(issue, "/project/name"),
                ],
                DEFAULT_PROJECT,
            ),
            error_type: first_present([text(metadata.get("type"))], DEFAULT_ERROR_TYPE),
            error_message,
            culprit: first_present([text(issue.get("culprit"))], DEFAULT_CULPRIT),
            platform: first_present([text(issue.get("platform"))], DEFAULT_PLATFORM),
            sdk: first_present(
                [
                    text_at(metadata, "/sdk/name_normalized"),
                    text_at(metadata, "/sdk/name"),
                ],
                DEFAULT_SDK,
            ),
            template: Template::for_level(&level_of(issue)),
            is_unhandled: truthy(issue.get("isUnhandled")),
            detail_url: first_present(
                [text(issue.get("web_url")), text(issue.get("permalink"))],
                DEFAULT_DETAIL_URL,
            ),
        },
        short_id: first_present(
            [text(issue.get("shortId")), text(issue.get("id"))],
            "UNKNOWN",
        ),
        count: first_present([text(issue.get("count"))], "1"),
        user_count: first_present([text(issue.get("userCount"))], "1"),
        priority: Priority::parse(&first_present([text(issue.get("priority"))], "medium")),
        first_seen: format_timestamp(first_seen, now),
        last_seen,
    }
}

//! Sentry webhook data types

use serde::Serialize;
use serde_json::Value;

/// Placeholder shown when no code location can be recovered
pub const UNKNOWN_CODE_LOCATION: &str = "报错行数未知（请检查是否开启 SourceMap）";

/// Detail link used when the payload carries none
pub const DEFAULT_DETAIL_URL: &str = "https://sentry.io/";

/// Classified webhook payload
#[derive(Debug, Clone, PartialEq)]
pub enum EventVariant {
    /// `data.error` - a single error occurrence
    Error(Value),
    /// `data.issue` - an aggregated issue
    Issue(Value),
    /// Anything else, kept verbatim for display
    Unknown(Value),
}

impl EventVariant {
    /// Short name used in logs
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Error(_) => "error",
            Self::Issue(_) => "issue",
            Self::Unknown(_) => "unknown",
        }
    }
}

/// Result of field extraction
#[derive(Debug, Clone, PartialEq)]
pub enum Extracted {
    Error(ErrorFields),
    Issue(IssueFields),
    /// Unrecognized payload, passed through untouched
    Raw(Value),
}

/// Header color of the rendered card
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Template {
    Red,
    Orange,
}

impl Template {
    /// Red for the exact levels "fatal" and "error", orange for anything else
    #[must_use]
    pub fn for_level(level: &str) -> Self {
        match level {
            "fatal" | "error" => Self::Red,
            _ => Self::Orange,
        }
    }
}

/// Environment color tag
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnvColor {
    Red,
    Orange,
    Yellow,
    Green,
    Grey,
}

/// Display info for a deployment environment
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnvironmentInfo {
    /// Localized name (e.g., "生产环境")
    pub name: String,
    /// Emoji icon
    pub icon: &'static str,
    pub color: EnvColor,
}

impl EnvironmentInfo {
    /// Whether this is a production environment
    #[must_use]
    pub fn is_production(&self) -> bool {
        self.color == EnvColor::Red
    }
}

/// Issue priority
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Priority {
    High,
    Medium,
    Low,
    Other(String),
}

impl Priority {
    #[must_use]
    pub fn parse(priority: &str) -> Self {
        match priority {
            "high" => Self::High,
            "medium" => Self::Medium,
            "low" => Self::Low,
            other => Self::Other(other.to_string()),
        }
    }

    /// Emoji icon for the priority
    #[must_use]
    pub fn icon(&self) -> &'static str {
        match self {
            Self::High => "🔴",
            Self::Medium => "🟡",
            Self::Low => "🟢",
            Self::Other(_) => "⚪",
        }
    }

    /// Raw priority name as sent by Sentry
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::High => "high",
            Self::Medium => "medium",
            Self::Low => "low",
            Self::Other(s) => s,
        }
    }
}

/// Fields shared by error and issue cards
#[derive(Debug, Clone, PartialEq)]
pub struct CommonFields {
    pub project: String,
    pub error_type: String,
    pub error_message: String,
    pub culprit: String,
    pub platform: String,
    pub sdk: String,
    pub template: Template,
    pub is_unhandled: bool,
    pub detail_url: String,
}

/// Canonical fields of an error event
#[derive(Debug, Clone, PartialEq)]
pub struct ErrorFields {
    pub common: CommonFields,
    pub env_info: EnvironmentInfo,
    pub code_location: String,
    /// True when `code_location` is the SourceMap placeholder
    pub code_location_unknown: bool,
    pub release: String,
    pub page_url: String,
    pub transaction: String,
    pub browser: String,
    pub os: String,
    pub sdk_version: String,
    /// Display time of the occurrence
    pub timestamp: String,
}

/// Canonical fields of an issue event
#[derive(Debug, Clone, PartialEq)]
pub struct IssueFields {
    pub common: CommonFields,
    /// Short ID (e.g., "WEB-1")
    pub short_id: String,
    pub count: String,
    pub user_count: String,
    pub priority: Priority,
    pub first_seen: String,
    /// Only set when distinct from first seen
    pub last_seen: Option<String>,
}

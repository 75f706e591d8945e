// SPDX-FileCopyrightText: 2025 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

/// Dashboard resources as exchanged with the Mackerel API.
///
/// Field names follow the API's camelCase JSON. Widget attributes this crate
/// does not interpret are kept verbatim so pulled dashboards can be pushed
/// back unchanged.
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Widget type carrying free-form markdown.
pub const MARKDOWN_WIDGET: &str = "markdown";

/// Organization owning the API key.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq,)]
pub struct Organization
{
    /// Organization name, used in graph URLs.
    pub name: String,
}

/// Custom dashboard.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq,)]
#[serde(rename_all = "camelCase")]
pub struct RemoteDashboard
{
    /// Opaque identifier assigned by Mackerel; empty for new dashboards.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub id:            String,
    #[serde(default)]
    pub title:         String,
    /// Markdown body of legacy dashboards.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub body_markdown: String,
    #[serde(default)]
    pub url_path:      String,
    #[serde(default, skip_serializing_if = "is_zero")]
    pub created_at:    i64,
    #[serde(default, skip_serializing_if = "is_zero")]
    pub updated_at:    i64,
    #[serde(default)]
    pub memo:          String,
    #[serde(default)]
    pub widgets:       Vec<Widget,>,
    /// Set for dashboards made of a single markdown body.
    #[serde(default, skip_serializing_if = "is_false")]
    pub is_legacy:     bool,
}

/// Widget placed on a dashboard grid.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq,)]
pub struct Widget
{
    /// Widget type such as `graph`, `value` or `markdown`.
    #[serde(rename = "type")]
    pub kind:     String,
    #[serde(default)]
    pub title:    String,
    /// Content of markdown widgets.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub markdown: Option<String,>,
    pub layout:   Layout,
    /// Attributes of other widget types, preserved as-is.
    #[serde(flatten)]
    pub extra:    Map<String, Value,>,
}

/// Position and size of a widget, in grid units.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq,)]
pub struct Layout
{
    pub x:      i64,
    pub y:      i64,
    pub width:  i64,
    pub height: i64,
}

/// Response body of `GET /api/v0/dashboards`.
#[derive(Debug, Clone, Default, Serialize, Deserialize,)]
pub struct DashboardList
{
    #[serde(default)]
    pub dashboards: Vec<RemoteDashboard,>,
}

fn is_zero(value: &i64,) -> bool
{
    *value == 0
}

fn is_false(value: &bool,) -> bool
{
    !*value
}

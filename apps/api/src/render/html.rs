//! HTML projection of a `RenderedResume`.
//!
//! The page is self-contained (inline CSS, no scripts) and lays the sheet out at A4 width
//! inside `#resume-container`, the region the browser captures for PDF export.

use maud::{html, Markup, PreEscaped, DOCTYPE};
use serde::{Deserialize, Serialize};

use crate::document::Section;
use crate::render::layout::{HeaderStyle, SkillStyle};
use crate::render::renderer::{RenderedHeader, RenderedItem, RenderedResume, RenderedSection};

pub const CONTAINER_ID: &str = "resume-container";

/// Light/dark preference of the surrounding chrome. The sheet itself is always printed on white.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

impl Theme {
    /// Unknown values mean light.
    pub fn resolve(raw: &str) -> Theme {
        match raw.trim().to_ascii_lowercase().as_str() {
            "dark" => Theme::Dark,
            _ => Theme::Light,
        }
    }

    pub fn toggled(self) -> Theme {
        match self {
            Theme::Light => Theme::Dark,
            Theme::Dark => Theme::Light,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Theme::Light => "light",
            Theme::Dark => "dark",
        }
    }
}

const BASE_CSS: &str = "\
*{box-sizing:border-box;margin:0;padding:0}\
body{font-family:Helvetica,Arial,sans-serif;padding:24px}\
body.light{background:#f3f4f6;color:#111827}\
body.dark{background:#111827;color:#f9fafb}\
#resume-container{width:210mm;min-height:297mm;margin:0 auto;background:#fff;color:#1f2937;padding:12mm}\
.name{font-size:28px;font-weight:700}\
.tagline{font-size:16px;color:#4b5563}\
.contacts{font-size:12px;margin-top:6px}\
.contacts span+span::before{content:\" | \"}\
.header-centered{text-align:center;border-bottom:2px solid #1f2937;padding-bottom:8px}\
.header-grouped{border-bottom:1px solid #d1d5db;padding-bottom:8px}\
.header-banner{background:#4338ca;color:#fff;padding:16px;margin:-12mm -12mm 8mm -12mm}\
.header-banner .tagline{color:#e0e7ff}\
h2{font-size:14px;letter-spacing:.05em;border-bottom:1px solid #d1d5db;margin:14px 0 6px}\
.columns{display:flex;gap:8mm}\
.column{flex:1}\
.item{margin-bottom:8px}\
.item-head{display:flex;justify-content:space-between;font-weight:600}\
.meta{font-weight:400;color:#6b7280;font-size:12px}\
.subtitle{color:#374151;font-size:13px}\
.body{font-size:13px;white-space:pre-line}\
.note{font-size:12px;color:#6b7280}\
.skills{display:flex;flex-wrap:wrap;gap:6px}\
.skills-column{display:grid;grid-template-columns:1fr 1fr;gap:4px 16px}\
.pill{background:#eef2ff;border-radius:9999px;padding:2px 8px;font-size:12px}\
.skill-row{display:flex;justify-content:space-between;font-size:13px}";

/// Renders a complete HTML document for preview and capture.
pub fn to_html(resume: &RenderedResume, theme: Theme) -> String {
    let multi_column = resume.columns.len() > 1;

    let markup = html! {
        (DOCTYPE)
        html {
            head {
                meta charset="utf-8";
                title { (resume.header.name) }
                style { (PreEscaped(BASE_CSS)) }
            }
            body class=(theme.as_str()) {
                div id=(CONTAINER_ID) data-template=(resume.template.as_str()) {
                    (header(&resume.header))
                    @if let Some(summary) = &resume.summary {
                        section class="summary" {
                            h2 { (summary.heading) }
                            p class="body" { (summary.text) }
                        }
                    }
                    @if multi_column {
                        div class="columns" {
                            @for column in &resume.columns {
                                div class="column" {
                                    @for s in column { (section(s, resume.skill_style)) }
                                }
                            }
                        }
                    } @else {
                        @for column in &resume.columns {
                            @for s in column { (section(s, resume.skill_style)) }
                        }
                    }
                }
            }
        }
    };
    markup.into_string()
}

fn header(header: &RenderedHeader) -> Markup {
    let class = match header.style {
        HeaderStyle::Centered => "header-centered",
        HeaderStyle::Grouped => "header-grouped",
        HeaderStyle::Banner => "header-banner",
    };
    html! {
        header class=(class) {
            div class="name" { (header.name) }
            @if let Some(tagline) = &header.tagline {
                div class="tagline" { (tagline) }
            }
            @if !header.contacts.is_empty() {
                div class="contacts" {
                    @for contact in &header.contacts {
                        span { (contact.value) }
                    }
                }
            }
        }
    }
}

fn section(section: &RenderedSection, skill_style: SkillStyle) -> Markup {
    html! {
        section class=(section.section.key()) {
            h2 { (section.heading) }
            @if section.section == Section::Skills {
                (skills(&section.items, skill_style))
            } @else {
                @for entry in &section.items { (item(entry)) }
            }
        }
    }
}

fn item(item: &RenderedItem) -> Markup {
    html! {
        div class="item" {
            div class="item-head" {
                span { (item.title) }
                @if let Some(meta) = &item.meta {
                    span class="meta" { (meta) }
                }
            }
            @if let Some(subtitle) = &item.subtitle {
                div class="subtitle" { (subtitle) }
            }
            @if let Some(body) = &item.body {
                p class="body" { (body) }
            }
            @for note in &item.notes {
                div class="note" { (note) }
            }
        }
    }
}

fn skills(items: &[RenderedItem], style: SkillStyle) -> Markup {
    match style {
        SkillStyle::LevelColumn => html! {
            div class="skills-column" {
                @for item in items {
                    div class="skill-row" {
                        span { (item.title) }
                        span class="meta" { (item.meta.as_deref().unwrap_or_default()) }
                    }
                }
            }
        },
        SkillStyle::NameWithLevel | SkillStyle::NameOnly => html! {
            div class="skills" {
                @for item in items {
                    @if let (Some(level), SkillStyle::NameWithLevel) = (&item.meta, style) {
                        span class="pill" { (item.title) " (" (level) ")" }
                    } @else {
                        span class="pill" { (item.title) }
                    }
                }
            }
        },
    }
}

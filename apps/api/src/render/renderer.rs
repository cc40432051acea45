//! Template Renderer — pure mapping from (document, template) to a layout description.
//!
//! # Shared content rules (identical for every template)
//! - A section appears only if one of its entries is significant
//!   (see `SectionEntry::is_significant`); insignificant entries are dropped from the
//!   output but stay in the document.
//! - Empty fields render literal fallbacks ("Your Name", "Position", "Company", ...);
//!   a missing end date renders "Present".
//! - Entries keep document order.

use serde::Serialize;

use crate::document::model::{
    CertificationEntry, EducationEntry, ExperienceEntry, PersonalInfo, ProjectEntry,
    ResumeDocument, Section, SectionEntry, SkillEntry, TemplateId,
};
use crate::render::layout::{descriptor, ContactField, HeaderStyle, LayoutDescriptor, SkillStyle};

pub const FALLBACK_NAME: &str = "Your Name";
pub const FALLBACK_TAGLINE: &str = "Professional Title";
pub const FALLBACK_POSITION: &str = "Position";
pub const FALLBACK_COMPANY: &str = "Company";
pub const FALLBACK_LOCATION: &str = "Location";
pub const FALLBACK_DEGREE: &str = "Degree";
pub const FALLBACK_INSTITUTION: &str = "Institution";
pub const FALLBACK_FIELD_OF_STUDY: &str = "Field of Study";
pub const FALLBACK_PROJECT_NAME: &str = "Project Name";
pub const FALLBACK_DESCRIPTION: &str = "Description";
pub const FALLBACK_END_DATE: &str = "Present";

// ────────────────────────────────────────────────────────────────────────────
// Output types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RenderedResume {
    pub template: TemplateId,
    pub header: RenderedHeader,
    pub summary: Option<RenderedSummary>,
    /// One list of sections per layout column; empty sections are already removed.
    pub columns: Vec<Vec<RenderedSection>>,
    pub skill_style: SkillStyle,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RenderedHeader {
    pub style: HeaderStyle,
    pub name: String,
    pub tagline: Option<String>,
    pub contacts: Vec<ContactLine>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ContactLine {
    pub field: ContactField,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RenderedSummary {
    pub heading: String,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RenderedSection {
    pub section: Section,
    pub heading: String,
    pub items: Vec<RenderedItem>,
}

/// One rendered entry. Slots are generic so every template can lay them out its own way:
/// `title` is the bold line, `meta` sits right-aligned beside it (dates, link, level),
/// `subtitle` and `body` follow, `notes` are small trailing lines.
#[derive(Debug, Clone, PartialEq, Serialize, Default)]
pub struct RenderedItem {
    pub title: String,
    pub meta: Option<String>,
    pub subtitle: Option<String>,
    pub body: Option<String>,
    pub notes: Vec<String>,
}

impl RenderedResume {
    pub fn sections(&self) -> impl Iterator<Item = &RenderedSection> {
        self.columns.iter().flatten()
    }

    #[allow(dead_code)]
    pub fn section(&self, section: Section) -> Option<&RenderedSection> {
        self.sections().find(|s| s.section == section)
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Entry points
// ────────────────────────────────────────────────────────────────────────────

/// Renders with the document's own (resolved) template.
pub fn render_document(doc: &ResumeDocument) -> RenderedResume {
    render(doc, doc.template())
}

/// Renders with a raw selector, e.g. a preview dropdown value. Unknown values mean `modern`.
pub fn render_with_selector(doc: &ResumeDocument, selector: &str) -> RenderedResume {
    render(doc, TemplateId::resolve(selector))
}

pub fn render(doc: &ResumeDocument, template: TemplateId) -> RenderedResume {
    let layout = descriptor(template);

    let summary = (!doc.personal_info.summary.is_empty()).then(|| RenderedSummary {
        heading: layout.summary_heading.to_string(),
        text: doc.personal_info.summary.clone(),
    });

    let columns = layout
        .columns
        .iter()
        .map(|column| {
            column
                .iter()
                .filter_map(|section| render_section(doc, *section, layout))
                .collect()
        })
        .collect();

    RenderedResume {
        template,
        header: render_header(&doc.personal_info, layout),
        summary,
        columns,
        skill_style: layout.skill_style,
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Header
// ────────────────────────────────────────────────────────────────────────────

fn render_header(info: &PersonalInfo, layout: &LayoutDescriptor) -> RenderedHeader {
    let header = &layout.header;
    let contacts = header
        .contacts
        .iter()
        .filter_map(|field| {
            let raw = contact_value(info, *field);
            if raw.is_empty() {
                return None;
            }
            let value = match field {
                ContactField::Linkedin | ContactField::Website
                    if header.strip_link_scheme =>
                {
                    strip_scheme(raw)
                }
                _ => raw,
            };
            Some(ContactLine {
                field: *field,
                value: value.to_string(),
            })
        })
        .collect();

    RenderedHeader {
        style: header.style,
        name: or_fallback(&info.full_name, FALLBACK_NAME),
        tagline: header
            .tagline
            .then(|| or_fallback(&info.address, FALLBACK_TAGLINE)),
        contacts,
    }
}

fn contact_value(info: &PersonalInfo, field: ContactField) -> &str {
    match field {
        ContactField::Email => &info.email,
        ContactField::Phone => &info.phone,
        ContactField::Address => &info.address,
        ContactField::Linkedin => &info.linkedin,
        ContactField::Website => &info.website,
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Sections
// ────────────────────────────────────────────────────────────────────────────

fn render_section(
    doc: &ResumeDocument,
    section: Section,
    layout: &LayoutDescriptor,
) -> Option<RenderedSection> {
    let items: Vec<RenderedItem> = match section {
        Section::Experience => significant(&doc.experience).map(experience_item).collect(),
        Section::Education => significant(&doc.education).map(education_item).collect(),
        Section::Skills => significant(&doc.skills)
            .map(|s| skill_item(s, layout.skill_style))
            .collect(),
        Section::Projects => significant(&doc.projects)
            .map(|p| project_item(p, layout.header.strip_link_scheme))
            .collect(),
        Section::Certifications => significant(&doc.certifications)
            .map(certification_item)
            .collect(),
    };

    if items.is_empty() {
        return None;
    }

    Some(RenderedSection {
        section,
        heading: layout.heading(section).to_string(),
        items,
    })
}

fn significant<E: SectionEntry>(entries: &[E]) -> impl Iterator<Item = &E> {
    entries.iter().filter(|e| e.is_significant())
}

fn experience_item(exp: &ExperienceEntry) -> RenderedItem {
    RenderedItem {
        title: or_fallback(&exp.position, FALLBACK_POSITION),
        meta: Some(date_range(&exp.start_date, &exp.end_date)),
        subtitle: Some(format!(
            "{} • {}",
            or_fallback(&exp.company, FALLBACK_COMPANY),
            or_fallback(&exp.location, FALLBACK_LOCATION)
        )),
        body: Some(or_fallback(&exp.description, FALLBACK_DESCRIPTION)),
        notes: Vec::new(),
    }
}

fn education_item(edu: &EducationEntry) -> RenderedItem {
    let mut notes = Vec::new();
    if !edu.grade.is_empty() {
        notes.push(format!("Grade: {}", edu.grade));
    }
    RenderedItem {
        title: or_fallback(&edu.degree, FALLBACK_DEGREE),
        meta: Some(date_range(&edu.start_date, &edu.end_date)),
        subtitle: Some(format!(
            "{} • {}",
            or_fallback(&edu.institution, FALLBACK_INSTITUTION),
            or_fallback(&edu.field_of_study, FALLBACK_FIELD_OF_STUDY)
        )),
        body: None,
        notes,
    }
}

fn skill_item(skill: &SkillEntry, style: SkillStyle) -> RenderedItem {
    let meta = match style {
        SkillStyle::NameWithLevel | SkillStyle::LevelColumn => Some(skill.level.to_string()),
        SkillStyle::NameOnly => None,
    };
    RenderedItem {
        title: skill.name.clone(),
        meta,
        ..Default::default()
    }
}

fn project_item(project: &ProjectEntry, strip_link_scheme: bool) -> RenderedItem {
    let meta = (!project.link.is_empty()).then(|| {
        if strip_link_scheme {
            strip_scheme(&project.link).to_string()
        } else {
            project.link.clone()
        }
    });
    let mut notes = Vec::new();
    if !project.technologies.is_empty() {
        notes.push(format!("Technologies: {}", project.technologies));
    }
    RenderedItem {
        title: or_fallback(&project.name, FALLBACK_PROJECT_NAME),
        meta,
        subtitle: None,
        body: Some(or_fallback(&project.description, FALLBACK_DESCRIPTION)),
        notes,
    }
}

fn certification_item(cert: &CertificationEntry) -> RenderedItem {
    let mut notes = Vec::new();
    if !cert.credential_id.is_empty() {
        notes.push(format!("ID: {}", cert.credential_id));
    }
    RenderedItem {
        title: cert.name.clone(),
        meta: None,
        subtitle: Some(format!("{} • {}", cert.issuer, cert.date)),
        body: None,
        notes,
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Internal helpers
// ────────────────────────────────────────────────────────────────────────────

fn or_fallback(value: &str, fallback: &str) -> String {
    if value.is_empty() {
        fallback.to_string()
    } else {
        value.to_string()
    }
}

fn date_range(start: &str, end: &str) -> String {
    format!("{} - {}", start, if end.is_empty() { FALLBACK_END_DATE } else { end })
}

fn strip_scheme(value: &str) -> &str {
    value.strip_prefix("https://").unwrap_or(value)
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────

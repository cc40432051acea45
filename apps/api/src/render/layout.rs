//! Layout descriptors — the only place the three templates differ.
//!
//! A descriptor decides grouping (columns), header treatment, headings and how skills are
//! shown. Filtering and fallback rules are NOT configurable here; they live in the renderer
//! and apply identically to every template.

use serde::Serialize;

use crate::document::model::{Section, TemplateId};

// ────────────────────────────────────────────────────────────────────────────
// Descriptor types
// ────────────────────────────────────────────────────────────────────────────

/// Contact fields a header may show, in display order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ContactField {
    Email,
    Phone,
    Address,
    Linkedin,
    Website,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum HeaderStyle {
    /// Name and contact lines centered over a rule.
    Centered,
    /// Name, tagline, then contacts in a row.
    Grouped,
    /// Colored banner block with name, tagline and contacts.
    Banner,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SkillStyle {
    /// `Rust (Expert)` pills.
    NameWithLevel,
    /// Name on the left, level on the right, two per row.
    LevelColumn,
    /// Name-only pills.
    NameOnly,
}

#[derive(Debug, Clone, Copy)]
pub struct HeaderLayout {
    pub style: HeaderStyle,
    /// Show `address` (or the "Professional Title" fallback) beneath the name.
    pub tagline: bool,
    pub contacts: &'static [ContactField],
    /// Drop a leading `https://` from link-like contacts and project links.
    pub strip_link_scheme: bool,
}

#[derive(Debug, Clone, Copy)]
pub struct LayoutDescriptor {
    pub template: TemplateId,
    pub header: HeaderLayout,
    pub summary_heading: &'static str,
    /// Section grouping; one inner slice per column.
    pub columns: &'static [&'static [Section]],
    pub skill_style: SkillStyle,
    headings: SectionHeadings,
}

#[derive(Debug, Clone, Copy)]
struct SectionHeadings {
    experience: &'static str,
    education: &'static str,
    skills: &'static str,
    projects: &'static str,
    certifications: &'static str,
}

impl LayoutDescriptor {
    pub fn heading(&self, section: Section) -> &'static str {
        match section {
            Section::Experience => self.headings.experience,
            Section::Education => self.headings.education,
            Section::Skills => self.headings.skills,
            Section::Projects => self.headings.projects,
            Section::Certifications => self.headings.certifications,
        }
    }

    #[allow(dead_code)]
    pub fn column_count(&self) -> usize {
        self.columns.len()
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Descriptor table
// ────────────────────────────────────────────────────────────────────────────

const SINGLE_COLUMN: &[&[Section]] = &[&[
    Section::Experience,
    Section::Education,
    Section::Skills,
    Section::Projects,
    Section::Certifications,
]];

const TWO_COLUMN: &[&[Section]] = &[
    &[Section::Experience, Section::Skills],
    &[Section::Education, Section::Projects, Section::Certifications],
];

const CLASSIC: LayoutDescriptor = LayoutDescriptor {
    template: TemplateId::Classic,
    header: HeaderLayout {
        style: HeaderStyle::Centered,
        tagline: false,
        contacts: &[
            ContactField::Email,
            ContactField::Phone,
            ContactField::Address,
            ContactField::Linkedin,
        ],
        strip_link_scheme: false,
    },
    summary_heading: "SUMMARY",
    columns: SINGLE_COLUMN,
    skill_style: SkillStyle::NameWithLevel,
    headings: SectionHeadings {
        experience: "EXPERIENCE",
        education: "EDUCATION",
        skills: "SKILLS",
        projects: "PROJECTS",
        certifications: "CERTIFICATIONS",
    },
};

const PROFESSIONAL: LayoutDescriptor = LayoutDescriptor {
    template: TemplateId::Professional,
    header: HeaderLayout {
        style: HeaderStyle::Grouped,
        tagline: true,
        contacts: &[
            ContactField::Email,
            ContactField::Phone,
            ContactField::Linkedin,
            ContactField::Website,
        ],
        strip_link_scheme: true,
    },
    summary_heading: "PROFESSIONAL SUMMARY",
    columns: SINGLE_COLUMN,
    skill_style: SkillStyle::LevelColumn,
    headings: SectionHeadings {
        experience: "PROFESSIONAL EXPERIENCE",
        education: "EDUCATION",
        skills: "SKILLS",
        projects: "KEY PROJECTS",
        certifications: "CERTIFICATIONS",
    },
};

const MODERN: LayoutDescriptor = LayoutDescriptor {
    template: TemplateId::Modern,
    header: HeaderLayout {
        style: HeaderStyle::Banner,
        tagline: true,
        contacts: &[
            ContactField::Email,
            ContactField::Phone,
            ContactField::Linkedin,
        ],
        strip_link_scheme: true,
    },
    summary_heading: "PROFESSIONAL SUMMARY",
    columns: TWO_COLUMN,
    skill_style: SkillStyle::NameOnly,
    headings: SectionHeadings {
        experience: "EXPERIENCE",
        education: "EDUCATION",
        skills: "SKILLS",
        projects: "PROJECTS",
        certifications: "CERTIFICATIONS",
    },
};

/// Returns the descriptor for a resolved template.
pub fn descriptor(template: TemplateId) -> &'static LayoutDescriptor {
    match template {
        TemplateId::Classic => &CLASSIC,
        TemplateId::Professional => &PROFESSIONAL,
        TemplateId::Modern => &MODERN,
    }
}

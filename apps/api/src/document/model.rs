//! Resume document shape — the single canonical state every form, template and export reads from.
//!
//! The stored JSON uses the camelCase keys the documents were originally written with
//! (`templateId`, `personalInfo`, `fieldOfStudy`, ...). Every field carries a serde default
//! and explicit `null`s hydrate to the same default, so legacy or partial documents load
//! without holes.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

pub const DEFAULT_TITLE: &str = "Untitled Resume";

// ────────────────────────────────────────────────────────────────────────────
// Template selector
// ────────────────────────────────────────────────────────────────────────────

/// The three interchangeable resume layouts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum TemplateId {
    Classic,
    #[default]
    Modern,
    Professional,
}

impl TemplateId {
    pub const ALL: [TemplateId; 3] = [
        TemplateId::Classic,
        TemplateId::Modern,
        TemplateId::Professional,
    ];

    /// Resolves a stored selector. Unknown or empty values fall back to `Modern`.
    pub fn resolve(raw: &str) -> TemplateId {
        match raw.trim().to_ascii_lowercase().as_str() {
            "classic" => TemplateId::Classic,
            "professional" => TemplateId::Professional,
            _ => TemplateId::Modern,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TemplateId::Classic => "classic",
            TemplateId::Modern => "modern",
            TemplateId::Professional => "professional",
        }
    }
}

impl fmt::Display for TemplateId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Skill level
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(from = "String")]
pub enum SkillLevel {
    Beginner,
    #[default]
    Intermediate,
    Advanced,
    Expert,
}

impl SkillLevel {
    /// Strict parse used by the editor; stored documents go through `From<String>` instead.
    pub fn parse(raw: &str) -> Option<SkillLevel> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "beginner" => Some(SkillLevel::Beginner),
            "intermediate" => Some(SkillLevel::Intermediate),
            "advanced" => Some(SkillLevel::Advanced),
            "expert" => Some(SkillLevel::Expert),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SkillLevel::Beginner => "Beginner",
            SkillLevel::Intermediate => "Intermediate",
            SkillLevel::Advanced => "Advanced",
            SkillLevel::Expert => "Expert",
        }
    }
}

impl From<String> for SkillLevel {
    fn from(raw: String) -> Self {
        SkillLevel::parse(&raw).unwrap_or_default()
    }
}

impl fmt::Display for SkillLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Document
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ResumeDocument {
    #[serde(deserialize_with = "title_or_default")]
    pub title: String,
    /// Raw selector as stored; resolved with [`TemplateId::resolve`] at render time.
    #[serde(deserialize_with = "nullable")]
    pub template_id: String,
    #[serde(deserialize_with = "nullable")]
    pub personal_info: PersonalInfo,
    #[serde(deserialize_with = "nullable")]
    pub education: Vec<EducationEntry>,
    #[serde(deserialize_with = "nullable")]
    pub experience: Vec<ExperienceEntry>,
    #[serde(deserialize_with = "nullable")]
    pub skills: Vec<SkillEntry>,
    #[serde(deserialize_with = "nullable")]
    pub projects: Vec<ProjectEntry>,
    #[serde(deserialize_with = "nullable")]
    pub certifications: Vec<CertificationEntry>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Default for ResumeDocument {
    fn default() -> Self {
        ResumeDocument::quick(TemplateId::default())
    }
}

impl ResumeDocument {
    /// Editor starting state: one blank entry in every repeatable section.
    pub fn seeded(template: TemplateId) -> Self {
        ResumeDocument {
            education: vec![EducationEntry::default()],
            experience: vec![ExperienceEntry::default()],
            skills: vec![SkillEntry::default()],
            projects: vec![ProjectEntry::default()],
            certifications: vec![CertificationEntry::default()],
            ..ResumeDocument::quick(template)
        }
    }

    /// Dashboard quick-create starting state: every repeatable section empty.
    pub fn quick(template: TemplateId) -> Self {
        ResumeDocument {
            title: DEFAULT_TITLE.to_string(),
            template_id: template.as_str().to_string(),
            personal_info: PersonalInfo::default(),
            education: Vec::new(),
            experience: Vec::new(),
            skills: Vec::new(),
            projects: Vec::new(),
            certifications: Vec::new(),
            created_at: None,
            updated_at: None,
        }
    }

    pub fn template(&self) -> TemplateId {
        TemplateId::resolve(&self.template_id)
    }

    /// Number of entries currently held by a repeatable section.
    pub fn section_len(&self, section: Section) -> usize {
        match section {
            Section::Education => self.education.len(),
            Section::Experience => self.experience.len(),
            Section::Skills => self.skills.len(),
            Section::Projects => self.projects.len(),
            Section::Certifications => self.certifications.len(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct PersonalInfo {
    #[serde(deserialize_with = "nullable")]
    pub full_name: String,
    #[serde(deserialize_with = "nullable")]
    pub email: String,
    #[serde(deserialize_with = "nullable")]
    pub phone: String,
    #[serde(deserialize_with = "nullable")]
    pub address: String,
    #[serde(deserialize_with = "nullable")]
    pub linkedin: String,
    #[serde(deserialize_with = "nullable")]
    pub github: String,
    #[serde(deserialize_with = "nullable")]
    pub website: String,
    #[serde(deserialize_with = "nullable")]
    pub summary: String,
}

impl PersonalInfo {
    pub(crate) fn field_mut(&mut self, field: &str) -> Option<&mut String> {
        match field {
            "fullName" => Some(&mut self.full_name),
            "email" => Some(&mut self.email),
            "phone" => Some(&mut self.phone),
            "address" => Some(&mut self.address),
            "linkedin" => Some(&mut self.linkedin),
            "github" => Some(&mut self.github),
            "website" => Some(&mut self.website),
            "summary" => Some(&mut self.summary),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct EducationEntry {
    #[serde(deserialize_with = "nullable")]
    pub institution: String,
    #[serde(deserialize_with = "nullable")]
    pub degree: String,
    #[serde(deserialize_with = "nullable")]
    pub field_of_study: String,
    #[serde(deserialize_with = "nullable")]
    pub start_date: String,
    #[serde(deserialize_with = "nullable")]
    pub end_date: String,
    #[serde(deserialize_with = "nullable")]
    pub grade: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct ExperienceEntry {
    #[serde(deserialize_with = "nullable")]
    pub company: String,
    #[serde(deserialize_with = "nullable")]
    pub position: String,
    #[serde(deserialize_with = "nullable")]
    pub start_date: String,
    #[serde(deserialize_with = "nullable")]
    pub end_date: String,
    #[serde(deserialize_with = "nullable")]
    pub description: String,
    #[serde(deserialize_with = "nullable")]
    pub location: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct SkillEntry {
    #[serde(deserialize_with = "nullable")]
    pub name: String,
    #[serde(deserialize_with = "nullable")]
    pub level: SkillLevel,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct ProjectEntry {
    #[serde(deserialize_with = "nullable")]
    pub name: String,
    #[serde(deserialize_with = "nullable")]
    pub description: String,
    #[serde(deserialize_with = "nullable")]
    pub technologies: String,
    #[serde(deserialize_with = "nullable")]
    pub link: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct CertificationEntry {
    #[serde(deserialize_with = "nullable")]
    pub name: String,
    #[serde(deserialize_with = "nullable")]
    pub issuer: String,
    #[serde(deserialize_with = "nullable")]
    pub date: String,
    #[serde(deserialize_with = "nullable")]
    pub credential_id: String,
}

// ────────────────────────────────────────────────────────────────────────────
// Section addressing
// ────────────────────────────────────────────────────────────────────────────

/// Repeatable sections, in the order the editor presents them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Section {
    Education,
    Experience,
    Skills,
    Projects,
    Certifications,
}

impl Section {
    pub const ALL: [Section; 5] = [
        Section::Education,
        Section::Experience,
        Section::Skills,
        Section::Projects,
        Section::Certifications,
    ];

    pub fn key(&self) -> &'static str {
        match self {
            Section::Education => "education",
            Section::Experience => "experience",
            Section::Skills => "skills",
            Section::Projects => "projects",
            Section::Certifications => "certifications",
        }
    }
}

/// Targets of `set_scalar_field`: the document root or the nested personal-info record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ScalarSection {
    Root,
    PersonalInfo,
}

/// Behaviour shared by every repeatable entry type.
pub trait SectionEntry: Default + Clone {
    /// Mutable access to a plain string field. `None` for unknown names and for
    /// non-string fields (skill level).
    fn text_field_mut(&mut self, field: &str) -> Option<&mut String>;

    /// True when at least one field that makes the entry worth rendering is non-empty.
    fn is_significant(&self) -> bool;
}

impl SectionEntry for EducationEntry {
    fn text_field_mut(&mut self, field: &str) -> Option<&mut String> {
        match field {
            "institution" => Some(&mut self.institution),
            "degree" => Some(&mut self.degree),
            "fieldOfStudy" => Some(&mut self.field_of_study),
            "startDate" => Some(&mut self.start_date),
            "endDate" => Some(&mut self.end_date),
            "grade" => Some(&mut self.grade),
            _ => None,
        }
    }

    fn is_significant(&self) -> bool {
        !self.institution.is_empty() || !self.degree.is_empty()
    }
}

impl SectionEntry for ExperienceEntry {
    fn text_field_mut(&mut self, field: &str) -> Option<&mut String> {
        match field {
            "company" => Some(&mut self.company),
            "position" => Some(&mut self.position),
            "startDate" => Some(&mut self.start_date),
            "endDate" => Some(&mut self.end_date),
            "description" => Some(&mut self.description),
            "location" => Some(&mut self.location),
            _ => None,
        }
    }

    fn is_significant(&self) -> bool {
        !self.company.is_empty() || !self.position.is_empty() || !self.description.is_empty()
    }
}

impl SectionEntry for SkillEntry {
    fn text_field_mut(&mut self, field: &str) -> Option<&mut String> {
        match field {
            "name" => Some(&mut self.name),
            _ => None,
        }
    }

    fn is_significant(&self) -> bool {
        !self.name.is_empty()
    }
}

impl SectionEntry for ProjectEntry {
    fn text_field_mut(&mut self, field: &str) -> Option<&mut String> {
        match field {
            "name" => Some(&mut self.name),
            "description" => Some(&mut self.description),
            "technologies" => Some(&mut self.technologies),
            "link" => Some(&mut self.link),
            _ => None,
        }
    }

    fn is_significant(&self) -> bool {
        !self.name.is_empty()
    }
}

impl SectionEntry for CertificationEntry {
    fn text_field_mut(&mut self, field: &str) -> Option<&mut String> {
        match field {
            "name" => Some(&mut self.name),
            "issuer" => Some(&mut self.issuer),
            "date" => Some(&mut self.date),
            "credentialId" => Some(&mut self.credential_id),
            _ => None,
        }
    }

    fn is_significant(&self) -> bool {
        !self.name.is_empty()
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Hydration helpers
// ────────────────────────────────────────────────────────────────────────────

/// Treats an explicit `null` exactly like a missing field.
fn nullable<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

fn title_or_default<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_else(|| DEFAULT_TITLE.to_string()))
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────

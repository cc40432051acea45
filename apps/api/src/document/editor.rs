//! In-memory editor over one `ResumeDocument`.
//!
//! Pure state plus pure transformations: no I/O happens here. Callers load a document,
//! apply edits as the user types, and hand `to_persistable()` to the store on save.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::document::model::{
    ResumeDocument, ScalarSection, Section, SectionEntry, SkillLevel, TemplateId,
};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum EditError {
    #[error("Index {index} out of bounds for section '{section}' of length {length}")]
    IndexOutOfBounds {
        section: &'static str,
        index: usize,
        length: usize,
    },

    #[error("Unknown field '{field}' in '{section}'")]
    UnknownField { section: String, field: String },

    #[error("Invalid skill level '{0}' (expected Beginner, Intermediate, Advanced or Expert)")]
    InvalidSkillLevel(String),
}

/// A single serialisable edit, as sent by a form in a batch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum EditOp {
    SetField {
        section: ScalarSection,
        field: String,
        value: String,
    },
    SetEntryField {
        section: Section,
        index: usize,
        field: String,
        value: String,
    },
    AddEntry {
        section: Section,
    },
    RemoveEntry {
        section: Section,
        index: usize,
    },
}

#[derive(Debug, Clone, Default)]
pub struct ResumeEditor {
    document: ResumeDocument,
}

impl ResumeEditor {
    pub fn new(document: ResumeDocument) -> Self {
        Self { document }
    }

    pub fn document(&self) -> &ResumeDocument {
        &self.document
    }

    /// Replaces a top-level scalar (`title`, `templateId`) or a `personalInfo` field.
    ///
    /// `templateId` is accepted verbatim; unknown selectors are resolved at render time.
    pub fn set_scalar_field(
        &mut self,
        section: ScalarSection,
        field: &str,
        value: impl Into<String>,
    ) -> Result<(), EditError> {
        let slot = match section {
            ScalarSection::Root => match field {
                "title" => Some(&mut self.document.title),
                "templateId" => Some(&mut self.document.template_id),
                _ => None,
            },
            ScalarSection::PersonalInfo => self.document.personal_info.field_mut(field),
        };

        let slot = slot.ok_or_else(|| EditError::UnknownField {
            section: scalar_section_key(section).to_string(),
            field: field.to_string(),
        })?;
        *slot = value.into();
        Ok(())
    }

    /// Replaces one field of the entry at `index`, leaving every other entry untouched.
    pub fn set_entry_field(
        &mut self,
        section: Section,
        index: usize,
        field: &str,
        value: impl Into<String>,
    ) -> Result<(), EditError> {
        let value = value.into();
        match section {
            Section::Education => set_in(&mut self.document.education, section, index, field, value),
            Section::Experience => {
                set_in(&mut self.document.experience, section, index, field, value)
            }
            Section::Skills => {
                let length = self.document.skills.len();
                let entry = self
                    .document
                    .skills
                    .get_mut(index)
                    .ok_or(EditError::IndexOutOfBounds {
                        section: section.key(),
                        index,
                        length,
                    })?;
                if field == "level" {
                    entry.level = SkillLevel::parse(&value)
                        .ok_or_else(|| EditError::InvalidSkillLevel(value.clone()))?;
                    return Ok(());
                }
                let slot = entry
                    .text_field_mut(field)
                    .ok_or_else(|| unknown_field(section, field))?;
                *slot = value;
                Ok(())
            }
            Section::Projects => set_in(&mut self.document.projects, section, index, field, value),
            Section::Certifications => {
                set_in(&mut self.document.certifications, section, index, field, value)
            }
        }
    }

    /// Appends a blank entry (skill level starts at `Intermediate`). Returns the new length.
    pub fn add_entry(&mut self, section: Section) -> usize {
        match section {
            Section::Education => push_blank(&mut self.document.education),
            Section::Experience => push_blank(&mut self.document.experience),
            Section::Skills => push_blank(&mut self.document.skills),
            Section::Projects => push_blank(&mut self.document.projects),
            Section::Certifications => push_blank(&mut self.document.certifications),
        }
    }

    /// Removes the entry at `index`, preserving the relative order of the rest.
    pub fn remove_entry(&mut self, section: Section, index: usize) -> Result<(), EditError> {
        match section {
            Section::Education => remove_in(&mut self.document.education, section, index),
            Section::Experience => remove_in(&mut self.document.experience, section, index),
            Section::Skills => remove_in(&mut self.document.skills, section, index),
            Section::Projects => remove_in(&mut self.document.projects, section, index),
            Section::Certifications => {
                remove_in(&mut self.document.certifications, section, index)
            }
        }
    }

    /// Replaces the whole in-memory state. Any unsaved edits are discarded.
    pub fn load(&mut self, document: ResumeDocument) {
        self.document = document;
    }

    /// The shape written to the document store. `updatedAt` is left for the store to assign.
    pub fn to_persistable(&self) -> ResumeDocument {
        ResumeDocument {
            updated_at: None,
            ..self.document.clone()
        }
    }

    pub fn template(&self) -> TemplateId {
        self.document.template()
    }

    pub fn apply(&mut self, op: EditOp) -> Result<(), EditError> {
        match op {
            EditOp::SetField {
                section,
                field,
                value,
            } => self.set_scalar_field(section, &field, value),
            EditOp::SetEntryField {
                section,
                index,
                field,
                value,
            } => self.set_entry_field(section, index, &field, value),
            EditOp::AddEntry { section } => {
                self.add_entry(section);
                Ok(())
            }
            EditOp::RemoveEntry { section, index } => self.remove_entry(section, index),
        }
    }

    /// Applies a batch atomically: if any op fails, the document is left as it was.
    pub fn apply_all(&mut self, ops: Vec<EditOp>) -> Result<(), EditError> {
        let snapshot = self.document.clone();
        for op in ops {
            if let Err(e) = self.apply(op) {
                self.document = snapshot;
                return Err(e);
            }
        }
        Ok(())
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Internal helpers
// ────────────────────────────────────────────────────────────────────────────

fn set_in<E: SectionEntry>(
    entries: &mut [E],
    section: Section,
    index: usize,
    field: &str,
    value: String,
) -> Result<(), EditError> {
    let length = entries.len();
    let entry = entries.get_mut(index).ok_or(EditError::IndexOutOfBounds {
        section: section.key(),
        index,
        length,
    })?;
    let slot = entry
        .text_field_mut(field)
        .ok_or_else(|| unknown_field(section, field))?;
    *slot = value;
    Ok(())
}

fn push_blank<E: SectionEntry>(entries: &mut Vec<E>) -> usize {
    entries.push(E::default());
    entries.len()
}

fn remove_in<E: SectionEntry>(
    entries: &mut Vec<E>,
    section: Section,
    index: usize,
) -> Result<(), EditError> {
    if index >= entries.len() {
        return Err(EditError::IndexOutOfBounds {
            section: section.key(),
            index,
            length: entries.len(),
        });
    }
    entries.remove(index);
    Ok(())
}

fn unknown_field(section: Section, field: &str) -> EditError {
    EditError::UnknownField {
        section: section.key().to_string(),
        field: field.to_string(),
    }
}

fn scalar_section_key(section: ScalarSection) -> &'static str {
    match section {
        ScalarSection::Root => "root",
        ScalarSection::PersonalInfo => "personalInfo",
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────

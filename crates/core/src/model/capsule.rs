use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

use crate::model::ids::CapsuleId;
use crate::model::index::IndexEntry;

/// Format tag carried by every persisted and exported capsule document.
pub const SCHEMA_TAG: &str = "pocket-classroom/v1";

/// Every quiz question offers exactly this many choices.
pub const CHOICES_PER_QUESTION: usize = 4;

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

/// Reasons a draft is refused before it reaches storage.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum CapsuleError {
    #[error("Title is required.")]
    MissingTitle,

    #[error("Please add at least notes, flashcards or quiz.")]
    NoContent,

    #[error("question {question} marks choice {index} as correct, expected 0..=3")]
    CorrectIndexOutOfRange { question: usize, index: u8 },

    #[error("capsule id is missing")]
    MissingId,
}

//
// ─── LEVEL ─────────────────────────────────────────────────────────────────────
//

/// Difficulty label shown next to the subject in the library.
///
/// Reading is lenient: any casing is accepted, and blank, null or unknown
/// labels fall back to `Beginner`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize)]
pub enum Level {
    #[default]
    Beginner,
    Intermediate,
    Advanced,
}

impl Level {
    pub const ALL: [Level; 3] = [Level::Beginner, Level::Intermediate, Level::Advanced];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Level::Beginner => "Beginner",
            Level::Intermediate => "Intermediate",
            Level::Advanced => "Advanced",
        }
    }
}

impl<'de> Deserialize<'de> for Level {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = Option::<String>::deserialize(deserializer)?;
        Ok(raw.and_then(|s| s.parse().ok()).unwrap_or_default())
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("unknown level: {0} (expected Beginner, Intermediate or Advanced)")]
pub struct ParseLevelError(pub String);

impl FromStr for Level {
    type Err = ParseLevelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Level::ALL
            .into_iter()
            .find(|level| level.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| ParseLevelError(s.to_owned()))
    }
}

//
// ─── CONTENT ITEMS ─────────────────────────────────────────────────────────────
//

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CapsuleMeta {
    #[serde(deserialize_with = "null_as_empty")]
    pub title: String,
    #[serde(deserialize_with = "null_as_empty")]
    pub subject: String,
    pub level: Level,
    #[serde(deserialize_with = "null_as_empty")]
    pub description: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Flashcard {
    #[serde(deserialize_with = "null_as_empty")]
    pub front: String,
    #[serde(deserialize_with = "null_as_empty")]
    pub back: String,
}

impl Flashcard {
    #[must_use]
    pub fn new(front: impl Into<String>, back: impl Into<String>) -> Self {
        Self {
            front: front.into(),
            back: back.into(),
        }
    }

    fn normalized(&self) -> Option<Self> {
        let front = self.front.trim();
        let back = self.back.trim();
        if front.is_empty() && back.is_empty() {
            return None;
        }
        Some(Self::new(front, back))
    }
}

/// One multiple-choice question.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct QuizItem {
    #[serde(deserialize_with = "null_as_empty")]
    pub question: String,
    #[serde(deserialize_with = "four_choices")]
    pub choices: [String; CHOICES_PER_QUESTION],
    pub correct_index: u8,
}

impl QuizItem {
    #[must_use]
    pub fn new(
        question: impl Into<String>,
        choices: [&str; CHOICES_PER_QUESTION],
        correct_index: u8,
    ) -> Self {
        Self {
            question: question.into(),
            choices: choices.map(str::to_owned),
            correct_index,
        }
    }

    #[must_use]
    pub fn is_correct(&self, pick: usize) -> bool {
        pick == usize::from(self.correct_index)
    }

    fn normalized(&self) -> Option<Self> {
        let question = self.question.trim();
        let choices = self.choices.clone().map(|c| c.trim().to_owned());
        if question.is_empty() || choices.iter().all(String::is_empty) {
            return None;
        }
        Some(Self {
            question: question.to_owned(),
            choices,
            correct_index: self.correct_index,
        })
    }
}

//
// ─── DRAFT ─────────────────────────────────────────────────────────────────────
//

/// Editable capsule in its document shape.
///
/// This is what authoring mutates, what gets written to storage and what
/// import/export exchange. Every field tolerates absence so foreign documents
/// parse; `validate` decides whether the result may be persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CapsuleDraft {
    pub schema: String,
    #[serde(
        deserialize_with = "blank_id_as_none",
        skip_serializing_if = "Option::is_none"
    )]
    pub id: Option<CapsuleId>,
    pub meta: CapsuleMeta,
    #[serde(deserialize_with = "notes_skip_null")]
    pub notes: Vec<String>,
    pub flashcards: Vec<Flashcard>,
    pub quiz: Vec<QuizItem>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Default for CapsuleDraft {
    fn default() -> Self {
        Self {
            schema: SCHEMA_TAG.to_owned(),
            id: None,
            meta: CapsuleMeta::default(),
            notes: Vec::new(),
            flashcards: Vec::new(),
            quiz: Vec::new(),
            updated_at: None,
        }
    }
}

impl CapsuleDraft {
    /// A blank draft that already owns its id.
    #[must_use]
    pub fn empty(id: CapsuleId) -> Self {
        Self {
            id: Some(id),
            ..Self::default()
        }
    }

    /// Applies the trimming and filtering rules without checking them.
    ///
    /// Idempotent: normalizing a normalized draft returns an equal draft.
    #[must_use]
    pub fn normalized(&self) -> Self {
        Self {
            schema: SCHEMA_TAG.to_owned(),
            id: self.id.clone(),
            meta: CapsuleMeta {
                title: self.meta.title.trim().to_owned(),
                subject: self.meta.subject.trim().to_owned(),
                level: self.meta.level,
                description: self.meta.description.trim().to_owned(),
            },
            notes: self
                .notes
                .iter()
                .map(|n| n.trim())
                .filter(|n| !n.is_empty())
                .map(str::to_owned)
                .collect(),
            flashcards: self
                .flashcards
                .iter()
                .filter_map(Flashcard::normalized)
                .collect(),
            quiz: self.quiz.iter().filter_map(QuizItem::normalized).collect(),
            updated_at: self.updated_at,
        }
    }

    /// Normalize and check the draft, producing a persistable `Capsule`.
    ///
    /// # Errors
    ///
    /// Returns `CapsuleError::MissingTitle` for a blank title,
    /// `CapsuleError::NoContent` when notes, flashcards and quiz are all empty,
    /// `CapsuleError::CorrectIndexOutOfRange` for a kept question pointing
    /// past the last choice, and `CapsuleError::MissingId` if no id is set.
    pub fn validate(&self) -> Result<Capsule, CapsuleError> {
        let draft = self.normalized();
        if draft.meta.title.is_empty() {
            return Err(CapsuleError::MissingTitle);
        }
        if draft.notes.is_empty() && draft.flashcards.is_empty() && draft.quiz.is_empty() {
            return Err(CapsuleError::NoContent);
        }
        if let Some((question, item)) = draft
            .quiz
            .iter()
            .enumerate()
            .find(|(_, q)| usize::from(q.correct_index) >= CHOICES_PER_QUESTION)
        {
            return Err(CapsuleError::CorrectIndexOutOfRange {
                question,
                index: item.correct_index,
            });
        }
        let id = draft.id.ok_or(CapsuleError::MissingId)?;

        Ok(Capsule {
            id,
            meta: draft.meta,
            notes: draft.notes,
            flashcards: draft.flashcards,
            quiz: draft.quiz,
            updated_at: draft.updated_at,
        })
    }
}

//
// ─── CAPSULE ───────────────────────────────────────────────────────────────────
//

/// A validated, normalized capsule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Capsule {
    id: CapsuleId,
    meta: CapsuleMeta,
    notes: Vec<String>,
    flashcards: Vec<Flashcard>,
    quiz: Vec<QuizItem>,
    updated_at: Option<DateTime<Utc>>,
}

impl Capsule {
    #[must_use]
    pub fn id(&self) -> &CapsuleId {
        &self.id
    }

    #[must_use]
    pub fn meta(&self) -> &CapsuleMeta {
        &self.meta
    }

    #[must_use]
    pub fn title(&self) -> &str {
        &self.meta.title
    }

    #[must_use]
    pub fn notes(&self) -> &[String] {
        &self.notes
    }

    #[must_use]
    pub fn flashcards(&self) -> &[Flashcard] {
        &self.flashcards
    }

    #[must_use]
    pub fn quiz(&self) -> &[QuizItem] {
        &self.quiz
    }

    #[must_use]
    pub fn updated_at(&self) -> Option<DateTime<Utc>> {
        self.updated_at
    }

    /// Stamp the save time.
    pub fn touch(&mut self, at: DateTime<Utc>) {
        self.updated_at = Some(at);
    }

    /// Back to the document shape, for persistence and export.
    #[must_use]
    pub fn to_draft(&self) -> CapsuleDraft {
        CapsuleDraft {
            schema: SCHEMA_TAG.to_owned(),
            id: Some(self.id.clone()),
            meta: self.meta.clone(),
            notes: self.notes.clone(),
            flashcards: self.flashcards.clone(),
            quiz: self.quiz.clone(),
            updated_at: self.updated_at,
        }
    }

    /// Library summary for this capsule.
    ///
    /// Unsaved capsules carry no timestamp; `fallback` fills it in.
    #[must_use]
    pub fn index_entry(&self, fallback: DateTime<Utc>) -> IndexEntry {
        IndexEntry {
            id: self.id.clone(),
            title: self.meta.title.clone(),
            subject: self.meta.subject.clone(),
            level: self.meta.level,
            updated_at: self.updated_at.unwrap_or(fallback),
        }
    }
}

//
// ─── SERDE HELPERS ─────────────────────────────────────────────────────────────
//

fn null_as_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

fn notes_skip_null<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<Vec<Option<String>>>::deserialize(deserializer)?.unwrap_or_default();
    Ok(raw.into_iter().flatten().collect())
}

fn blank_id_as_none<'de, D>(deserializer: D) -> Result<Option<CapsuleId>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    Ok(raw.and_then(|s| CapsuleId::new(s).ok()))
}

fn four_choices<'de, D>(deserializer: D) -> Result<[String; CHOICES_PER_QUESTION], D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<Vec<Option<String>>>::deserialize(deserializer)?.unwrap_or_default();
    let mut choices: [String; CHOICES_PER_QUESTION] = Default::default();
    for (slot, value) in choices.iter_mut().zip(raw) {
        *slot = value.unwrap_or_default();
    }
    Ok(choices)
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//

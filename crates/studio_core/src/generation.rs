use std::collections::BTreeSet;
use std::fmt;

use thiserror::Error;

/// Upper bound the generation backend accepts for `question_count`.
pub const MAX_QUIZ_QUESTIONS: u32 = 20;
/// Upper bound the generation backend accepts for flashcard `count`.
pub const MAX_FLASHCARDS: u32 = 50;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum JobKind {
    Quiz,
    Flashcards,
}

impl JobKind {
    /// Lower-case name used in endpoint paths and status messages.
    pub fn as_str(&self) -> &'static str {
        match self {
            JobKind::Quiz => "quiz",
            JobKind::Flashcards => "flashcards",
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            JobKind::Quiz => "Quiz",
            JobKind::Flashcards => "Flashcards",
        }
    }
}

impl fmt::Display for JobKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub enum Difficulty {
    Easy,
    #[default]
    Medium,
    Hard,
}

impl Difficulty {
    /// Accepts the lower-case backend names, ignoring case.
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "easy" => Some(Self::Easy),
            "medium" => Some(Self::Medium),
            "hard" => Some(Self::Hard),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Difficulty::Easy => "easy",
            Difficulty::Medium => "medium",
            Difficulty::Hard => "hard",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum QuestionType {
    MultipleChoice,
    TrueFalse,
    ShortAnswer,
}

impl QuestionType {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "multiple-choice" => Some(Self::MultipleChoice),
            "true-false" => Some(Self::TrueFalse),
            "short-answer" => Some(Self::ShortAnswer),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            QuestionType::MultipleChoice => "multiple-choice",
            QuestionType::TrueFalse => "true-false",
            QuestionType::ShortAnswer => "short-answer",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuizOptions {
    pub difficulty: Difficulty,
    pub question_count: u32,
    pub question_types: BTreeSet<QuestionType>,
    /// Empty means unconstrained.
    pub topics: BTreeSet<String>,
}

impl Default for QuizOptions {
    fn default() -> Self {
        Self {
            difficulty: Difficulty::Medium,
            question_count: 5,
            question_types: BTreeSet::from([QuestionType::MultipleChoice]),
            topics: BTreeSet::new(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FlashcardOptions {
    pub count: u32,
}

impl Default for FlashcardOptions {
    fn default() -> Self {
        Self { count: 10 }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GenerationOptions {
    Quiz(QuizOptions),
    Flashcards(FlashcardOptions),
}

impl GenerationOptions {
    pub fn quiz() -> Self {
        GenerationOptions::Quiz(QuizOptions::default())
    }

    pub fn flashcards() -> Self {
        GenerationOptions::Flashcards(FlashcardOptions::default())
    }

    pub fn kind(&self) -> JobKind {
        match self {
            GenerationOptions::Quiz(_) => JobKind::Quiz,
            GenerationOptions::Flashcards(_) => JobKind::Flashcards,
        }
    }

    pub fn validate(&self) -> Result<(), OptionsError> {
        match self {
            GenerationOptions::Quiz(quiz) => {
                if quiz.question_count == 0 || quiz.question_count > MAX_QUIZ_QUESTIONS {
                    return Err(OptionsError::QuestionCountOutOfRange(quiz.question_count));
                }
            }
            GenerationOptions::Flashcards(cards) => {
                if cards.count == 0 || cards.count > MAX_FLASHCARDS {
                    return Err(OptionsError::FlashcardCountOutOfRange(cards.count));
                }
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OptionsError {
    #[error("question count must be between 1 and {MAX_QUIZ_QUESTIONS}, got {0}")]
    QuestionCountOutOfRange(u32),
    #[error("flashcard count must be between 1 and {MAX_FLASHCARDS}, got {0}")]
    FlashcardCountOutOfRange(u32),
}

/// Server-assigned generation job handle.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct JobId(String);

impl JobId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for JobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobStatus {
    Pending,
    InProgress,
    Ready,
    Failed,
}

impl JobStatus {
    /// Parses the backend's status names. `GENERATING` is what the backend
    /// reports while a worker runs and is treated as `IN_PROGRESS`.
    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "PENDING" => Some(Self::Pending),
            "IN_PROGRESS" | "GENERATING" => Some(Self::InProgress),
            "READY" => Some(Self::Ready),
            "FAILED" => Some(Self::Failed),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "PENDING",
            Self::InProgress => "IN_PROGRESS",
            Self::Ready => "READY",
            Self::Failed => "FAILED",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Ready | Self::Failed)
    }
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One polling response for a generation job.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JobReport {
    Pending,
    InProgress,
    /// Questions or flashcards, as the backend produced them.
    Ready(Vec<serde_json::Value>),
    Failed,
}

impl JobReport {
    pub fn status(&self) -> JobStatus {
        match self {
            JobReport::Pending => JobStatus::Pending,
            JobReport::InProgress => JobStatus::InProgress,
            JobReport::Ready(_) => JobStatus::Ready,
            JobReport::Failed => JobStatus::Failed,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedArtifact {
    pub kind: JobKind,
    pub items: Vec<serde_json::Value>,
}

use std::collections::BTreeSet;
use std::path::PathBuf;

use studio_core::{
    Difficulty, DocumentId, GenerationOptions, JobKind, Msg, QuestionType, QuizOptions,
};

/// One parsed line of user input.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Send(Msg),
    List,
    Help,
    Quit,
}

#[derive(Debug, PartialEq, Eq, thiserror::Error)]
pub enum CommandError {
    #[error("unknown command '{0}', try 'help'")]
    Unknown(String),
    #[error("'{0}' needs {1}")]
    MissingArgument(&'static str, &'static str),
    #[error("bad value for {0}: '{1}'")]
    BadValue(&'static str, String),
    #[error("missing closing quote")]
    UnterminatedQuote,
}

pub const HELP: &str = "\
commands:
  upload <path>                  upload a .pdf, .docx or .txt file
  quiz [doc-id] [count=N] [difficulty=easy|medium|hard]
       [types=multiple-choice,true-false,short-answer] [topic=\"text\"]...
  flashcards [doc-id] [count=N]
  cancel                         stop tracking the current generation
  list                           show the current view
  quit                           close the session";

/// Parses a line; blank lines yield `None`.
pub fn parse_line(line: &str) -> Result<Option<Command>, CommandError> {
    let line = line.trim();
    let Some((word, rest)) = split_word(line) else {
        return Ok(None);
    };
    let command = match word.to_ascii_lowercase().as_str() {
        "upload" => {
            if rest.is_empty() {
                return Err(CommandError::MissingArgument("upload", "a file path"));
            }
            Command::Send(Msg::UploadRequested {
                path: PathBuf::from(rest),
            })
        }
        "quiz" => generate(JobKind::Quiz, rest)?,
        "flashcards" | "cards" => generate(JobKind::Flashcards, rest)?,
        "cancel" => Command::Send(Msg::CancelGeneration),
        "list" | "ls" => Command::List,
        "help" | "?" => Command::Help,
        "quit" | "exit" => Command::Quit,
        other => return Err(CommandError::Unknown(other.to_string())),
    };
    Ok(Some(command))
}

fn split_word(line: &str) -> Option<(&str, &str)> {
    if line.is_empty() {
        return None;
    }
    match line.split_once(char::is_whitespace) {
        Some((word, rest)) => Some((word, rest.trim())),
        None => Some((line, "")),
    }
}

fn generate(kind: JobKind, args: &str) -> Result<Command, CommandError> {
    let mut target = None;
    let mut options = match kind {
        JobKind::Quiz => GenerationOptions::quiz(),
        JobKind::Flashcards => GenerationOptions::flashcards(),
    };

    for arg in split_args(args)? {
        match arg.split_once('=') {
            Some(("count", raw)) => {
                let count = raw
                    .parse::<u32>()
                    .map_err(|_| CommandError::BadValue("count", raw.to_string()))?;
                match &mut options {
                    GenerationOptions::Quiz(quiz) => quiz.question_count = count,
                    GenerationOptions::Flashcards(cards) => cards.count = count,
                }
            }
            Some(("difficulty", raw)) => {
                let quiz = quiz_only(&mut options, "difficulty", raw)?;
                quiz.difficulty = Difficulty::parse(raw)
                    .ok_or_else(|| CommandError::BadValue("difficulty", raw.to_string()))?;
            }
            Some(("types", raw)) => {
                let quiz = quiz_only(&mut options, "types", raw)?;
                let types = raw
                    .split(',')
                    .filter(|name| !name.trim().is_empty())
                    .map(|name| {
                        QuestionType::parse(name)
                            .ok_or_else(|| CommandError::BadValue("types", name.to_string()))
                    })
                    .collect::<Result<BTreeSet<_>, _>>()?;
                if types.is_empty() {
                    return Err(CommandError::BadValue("types", raw.to_string()));
                }
                quiz.question_types = types;
            }
            Some(("topic", raw)) => {
                let quiz = quiz_only(&mut options, "topic", raw)?;
                let topic = raw.trim();
                if topic.is_empty() {
                    return Err(CommandError::BadValue("topic", raw.to_string()));
                }
                quiz.topics.insert(topic.to_string());
            }
            Some((key, _)) => return Err(CommandError::BadValue("option", key.to_string())),
            None => target = Some(DocumentId::new(arg)),
        }
    }

    Ok(Command::Send(Msg::GenerateRequested { options, target }))
}

fn quiz_only<'a>(
    options: &'a mut GenerationOptions,
    key: &'static str,
    raw: &str,
) -> Result<&'a mut QuizOptions, CommandError> {
    match options {
        GenerationOptions::Quiz(quiz) => Ok(quiz),
        GenerationOptions::Flashcards(_) => Err(CommandError::BadValue(key, raw.to_string())),
    }
}

/// Splits on whitespace; double quotes group words, as in `topic="cell biology"`.
fn split_args(args: &str) -> Result<Vec<String>, CommandError> {
    let mut words = Vec::new();
    let mut current = String::new();
    let mut quoted = false;
    for c in args.chars() {
        match c {
            '"' => quoted = !quoted,
            c if c.is_whitespace() && !quoted => {
                if !current.is_empty() {
                    words.push(std::mem::take(&mut current));
                }
            }
            c => current.push(c),
        }
    }
    if quoted {
        return Err(CommandError::UnterminatedQuote);
    }
    if !current.is_empty() {
        words.push(current);
    }
    Ok(words)
}

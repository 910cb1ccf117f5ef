pub mod language;

use serde::{Deserialize, Serialize};

pub use language::detect_language;

// ---------------------------------------------------------------------------
// Request configuration
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    /// Improve pasted code.
    #[default]
    Code,
    /// Generate Python code from a plain-text request.
    Text,
}

impl Mode {
    pub fn label(self) -> &'static str {
        match self {
            Mode::Code => "Code",
            Mode::Text => "Text",
        }
    }

    pub fn toggled(self) -> Self {
        match self {
            Mode::Code => Mode::Text,
            Mode::Text => Mode::Code,
        }
    }
}

impl std::str::FromStr for Mode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "code" => Ok(Mode::Code),
            "text" => Ok(Mode::Text),
            other => Err(format!("unknown mode: {other}")),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CommentLevel {
    None,
    Minimal,
    #[default]
    Standard,
    Detailed,
}

impl CommentLevel {
    pub const ALL: [CommentLevel; 4] = [
        CommentLevel::None,
        CommentLevel::Minimal,
        CommentLevel::Standard,
        CommentLevel::Detailed,
    ];

    pub fn label(self) -> &'static str {
        match self {
            CommentLevel::None => "None",
            CommentLevel::Minimal => "Minimal",
            CommentLevel::Standard => "Standard",
            CommentLevel::Detailed => "Detailed",
        }
    }

    /// Next level in display order, wrapping around.
    pub fn next(self) -> Self {
        let idx = Self::ALL.iter().position(|l| *l == self).unwrap_or(0);
        Self::ALL[(idx + 1) % Self::ALL.len()]
    }
}

impl std::str::FromStr for CommentLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "none" => Ok(CommentLevel::None),
            "minimal" => Ok(CommentLevel::Minimal),
            "standard" => Ok(CommentLevel::Standard),
            "detailed" => Ok(CommentLevel::Detailed),
            other => Err(format!("unknown comment level: {other}")),
        }
    }
}

/// Snapshot of the form taken when the user submits.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProcessingRequest {
    pub api_key: Option<String>,
    pub source_text: String,
    pub mode: Mode,
    pub comment_level: CommentLevel,
    pub preserve_structure: bool,
    pub debug: bool,
    pub optimize: bool,
    pub explain: bool,
}

// ---------------------------------------------------------------------------
// Prompt clauses
// ---------------------------------------------------------------------------

const ANALYZE: &str = "Rigorously analyze the provided code\n\n ";
const OPTIMIZE: &str = " Structure the code according to best practices.\n Respect specified constraints (performance, resource usage).\n";
const DEBUG: &str =
    " Identify all potential bugs and issues.\n Propose a corrected version of the code\n";
const EXPLAIN: &str = "Add at the end, in comments, a dedicated section summarizing identified problems and solutions provided\n";
const NO_ORIGINAL_REFERENCES: &str = "In code comments, do not reference the original code\n\n";
const GENERATE: &str =
    "Generate the requested Python code\n        Respect specified constraints (performance, resource usage)\n\n";
const CODE_ONLY: &str = "Structure the code according to best practices\n                      Respond only with the code, without additional text\n\n";

/// Title of the trailing summary section, if the flags call for one.
pub fn section_title(debug: bool, optimize: bool) -> Option<&'static str> {
    match (debug, optimize) {
        (true, false) => Some("BUGS FOUND AND FIXES MADE"),
        (false, true) => Some("UNOPTIMIZED CODE FOUND AND FIXES MADE"),
        (true, true) => Some("BUGS AND UNOPTIMIZED CODE FOUND AND FIXES MADE"),
        (false, false) => None,
    }
}

pub fn structure_clause(preserve_structure: bool) -> &'static str {
    if preserve_structure {
        "Optimize this code WITHOUT changing its structure or functionality. \n"
    } else {
        "Please optimize this code. You can improve variable names, code structure and organization.\n "
    }
}

pub fn comment_clause(level: CommentLevel) -> &'static str {
    match level {
        CommentLevel::None => "Includes no comments.\n",
        CommentLevel::Minimal => "Add only essential, brief comments for the most important parts.\n",
        CommentLevel::Detailed => {
            "Add comprehensive documentation including function purpose, parameters, return values, and explain complex logic in detail.\n"
        }
        CommentLevel::Standard => {
            "Add standard comments that explain what the code does at a function level and for any non-obvious logic.\n"
        }
    }
}

// ---------------------------------------------------------------------------
// Builder
// ---------------------------------------------------------------------------

/// Build the instruction sent as the single user message.
///
/// Clause order is part of the upstream contract and must not change.
pub fn build_prompt(req: &ProcessingRequest) -> String {
    let language = detect_language(&req.source_text).unwrap_or("code");

    let mut prompt = format!(
        "I have the following {language} that I'd like you to improve:\n\n```\n{}\n```\n\n",
        req.source_text
    );

    match req.mode {
        Mode::Code => {
            prompt.push_str(ANALYZE);

            if req.optimize {
                prompt.push_str(OPTIMIZE);
            }
            if req.debug {
                prompt.push_str(DEBUG);
            }
            if req.explain {
                prompt.push_str(EXPLAIN);
                if let Some(title) = section_title(req.debug, req.optimize) {
                    prompt.push_str(&format!("title the section '{title}'\n"));
                }
            }

            prompt.push_str(structure_clause(req.preserve_structure));
            prompt.push_str(comment_clause(req.comment_level));
            prompt.push_str(NO_ORIGINAL_REFERENCES);
        }
        Mode::Text => {
            prompt.push_str(GENERATE);
            prompt.push_str(structure_clause(req.preserve_structure));
            prompt.push_str(comment_clause(req.comment_level));
            prompt.push_str(CODE_ONLY);
        }
    }

    prompt
}

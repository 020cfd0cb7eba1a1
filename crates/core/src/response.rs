//! Tool response payloads
//!
//! Form tools answer with a JSON document, the retrieval tool with plain
//! text. Both are rendered to a single string at the tool boundary.

use serde::{Deserialize, Serialize};

use crate::error::DispatchError;

/// Which appointment form to open
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FormIntent {
    Book,
    Cancel,
    Reschedule,
}

impl FormIntent {
    pub const ALL: [FormIntent; 3] = [Self::Book, Self::Cancel, Self::Reschedule];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Book => "book",
            Self::Cancel => "cancel",
            Self::Reschedule => "reschedule",
        }
    }

    /// Reply shown when the form URL was built
    pub fn success_reply(&self) -> &'static str {
        match self {
            Self::Book => "I'm opening the appointment booking form for you. Please fill it out to book your appointment.",
            Self::Cancel => "I'm opening the appointment cancellation form for you. Please fill it out to cancel your appointment.",
            Self::Reschedule => "I'm opening the appointment rescheduling form for you. Please fill it out to reschedule your appointment.",
        }
    }

    /// Apology shown when the form could not be opened
    pub fn failure_reply(&self) -> &'static str {
        match self {
            Self::Book => "Sorry, I couldn't open the booking form at this moment.",
            Self::Cancel => "Sorry, I couldn't open the appointment cancellation form at this moment.",
            Self::Reschedule => "Sorry, I couldn't open the appointment rescheduling form at this moment.",
        }
    }
}

impl std::fmt::Display for FormIntent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of a form tool call
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FormResponse {
    Opened {
        reply: String,
        form_url: String,
        success: bool,
        session_id: String,
    },
    Failed {
        reply: String,
        success: bool,
        error: String,
    },
}

impl FormResponse {
    pub fn opened(intent: FormIntent, form_url: String, session_id: String) -> Self {
        Self::Opened {
            reply: intent.success_reply().to_string(),
            form_url,
            success: true,
            session_id,
        }
    }

    pub fn failed(intent: FormIntent, error: &DispatchError) -> Self {
        Self::Failed {
            reply: intent.failure_reply().to_string(),
            success: false,
            error: error.to_string(),
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Self::Opened { .. })
    }

    /// JSON string handed back to the agent runtime
    pub fn to_json(&self) -> String {
        // Both variants hold only strings and bools
        serde_json::to_string(self).unwrap_or_else(|e| {
            format!(r#"{{"reply":"","success":false,"error":"{}"}}"#, e)
        })
    }
}

/// Message returned when reranking leaves nothing
pub const NOTHING_FOUND_MESSAGE: &str = "Sorry, I couldn't find any relevant information.";

/// Prefix placed before formatted retrieval hits
pub const RESULTS_PREFIX: &str = "Here's what I found:\n\n";

/// Result of a retrieval tool call
#[derive(Debug, Clone, PartialEq)]
pub enum RetrievalOutcome {
    /// Formatted hits, already rendered to text
    Found { hits: usize, body: String },
    NothingFound,
    Failed {
        backend: String,
        error: DispatchError,
    },
}

impl RetrievalOutcome {
    /// Label for logs and metrics
    pub fn label(&self) -> &'static str {
        match self {
            Self::Found { .. } => "found",
            Self::NothingFound => "nothing_found",
            Self::Failed { .. } => "failed",
        }
    }

    /// Text handed back to the agent runtime
    pub fn into_text(self) -> String {
        match self {
            Self::Found { body, .. } => format!("{}{}", RESULTS_PREFIX, body),
            Self::NothingFound => NOTHING_FOUND_MESSAGE.to_string(),
            Self::Failed { backend, error } => {
                format!("Error retrieving context from {}: {}", backend, error)
            }
        }
    }
}

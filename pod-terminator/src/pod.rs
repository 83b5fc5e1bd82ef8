use time::macros::format_description;
use time::PrimitiveDateTime;

use super::*;

/// A pod as seen by one poll.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PodSnapshot {
    pub namespace: String,
    pub name: String,
    /// Raw `metadata.deletionTimestamp`, set once deletion was requested.
    pub deletion_requested_at: Option<String>,
}

impl PodSnapshot {
    pub fn new(namespace: impl ToString, name: impl ToString) -> Self {
        Self {
            namespace: namespace.to_string(),
            name: name.to_string(),
            deletion_requested_at: None,
        }
    }

    pub fn terminating(self, deletion_requested_at: impl ToString) -> Self {
        Self {
            deletion_requested_at: Some(deletion_requested_at.to_string()),
            ..self
        }
    }

    pub fn is_terminating(&self) -> bool {
        self.deletion_requested_at
            .as_deref()
            .is_some_and(|ts| !ts.is_empty())
    }

    /// `None` when the pod is not terminating.
    pub fn termination_candidate(
        &self,
    ) -> Option<Result<TerminationCandidate<'_>, TimestampError>> {
        let text = self.deletion_requested_at.as_deref().filter(|ts| !ts.is_empty())?;
        let candidate = parse_deletion_timestamp(text).map(|deletion_requested_at| {
            TerminationCandidate {
                pod: self,
                deletion_requested_at,
            }
        });
        Some(candidate)
    }
}

impl From<&metav1::ObjectMeta> for PodSnapshot {
    fn from(metadata: &metav1::ObjectMeta) -> Self {
        Self {
            namespace: metadata.namespace.clone().unwrap_or_default(),
            name: metadata.name.clone().unwrap_or_default(),
            deletion_requested_at: metadata.deletion_requested_at(),
        }
    }
}

impl fmt::Display for PodSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.namespace, self.name)
    }
}

/// A terminating pod together with the moment its deletion was requested.
#[derive(Debug)]
pub struct TerminationCandidate<'a> {
    pub pod: &'a PodSnapshot,
    pub deletion_requested_at: OffsetDateTime,
}

impl TerminationCandidate<'_> {
    /// Time spent terminating. Negative under clock skew.
    pub fn age(&self, now: OffsetDateTime) -> time::Duration {
        now - self.deletion_requested_at
    }
}

/// Parses `YYYY-MM-DDTHH:MM:SS` as UTC, ignoring a trailing `Z` and any
/// fractional seconds.
pub fn parse_deletion_timestamp(text: &str) -> Result<OffsetDateTime, TimestampError> {
    let format = format_description!("[year]-[month]-[day]T[hour]:[minute]:[second]");
    let trimmed = text.trim_end_matches('Z');
    let trimmed = trimmed
        .split_once('.')
        .map_or(trimmed, |(whole, _fraction)| whole);
    PrimitiveDateTime::parse(trimmed, format)
        .map(PrimitiveDateTime::assume_utc)
        .map_err(|source| TimestampError {
            text: text.to_string(),
            source,
        })
}

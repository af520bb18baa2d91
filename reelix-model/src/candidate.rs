use std::fmt::{self, Display};

/// Status of one candidate attempt. Serialized lowercase, matching the wire
/// vocabulary shared with the remote delegation service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum CandidateStatus {
    Waiting,
    Pending,
    NotFound,
    Failure,
    Success,
}

impl CandidateStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            CandidateStatus::Waiting => "waiting",
            CandidateStatus::Pending => "pending",
            CandidateStatus::NotFound => "notfound",
            CandidateStatus::Failure => "failure",
            CandidateStatus::Success => "success",
        }
    }
}

impl Display for CandidateStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One attempted source or embedded sub-source within a run.
///
/// `name` is a display label only; no engine logic branches on it.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Candidate {
    pub id: String,
    pub name: String,
    /// Set only for embeds; records which candidate discovered this one.
    pub parent_id: Option<String>,
    pub status: CandidateStatus,
    pub reason: Option<String>,
    pub error: Option<String>,
    /// 0-100.
    pub progress: u8,
}

impl Candidate {
    /// A freshly discovered top-level candidate.
    pub fn waiting(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            parent_id: None,
            status: CandidateStatus::Waiting,
            reason: None,
            error: None,
            progress: 0,
        }
    }

    /// A freshly discovered embed under `parent_id`.
    pub fn waiting_embed(
        id: impl Into<String>,
        name: impl Into<String>,
        parent_id: impl Into<String>,
    ) -> Self {
        Self {
            parent_id: Some(parent_id.into()),
            ..Self::waiting(id, name)
        }
    }

    pub fn with_progress(mut self, progress: u8) -> Self {
        self.progress = progress.min(100);
        self
    }

    pub fn is_terminal(&self) -> bool {
        matches!(
            self.status,
            CandidateStatus::Success
                | CandidateStatus::Failure
                | CandidateStatus::NotFound
        )
    }
}

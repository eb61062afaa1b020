//! Batch state definitions
//!
//! A batch is one bounded wave of fetches. Its members are tracked
//! individually but the retry budget belongs to the batch as a whole.
use std::fmt;

/// Progress of one batch member
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MemberState {
    /// A fetch for this URL is running
    InFlight,

    /// The last fetch failed; waiting for the next retry pass
    Failed,

    /// Fetched successfully
    Done,
}

impl MemberState {
    /// Returns true once the member no longer needs fetching
    pub fn is_done(&self) -> bool {
        matches!(self, Self::Done)
    }
}

impl fmt::Display for MemberState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::InFlight => "in_flight",
            Self::Failed => "failed",
            Self::Done => "done",
        };
        write!(f, "{}", s)
    }
}

/// A URL attempted by the current batch
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchMember {
    pub url: String,
    pub state: MemberState,
    /// Number of fetches dispatched for this member
    pub attempts: u32,
}

/// The wave of fetches currently being attempted
#[derive(Debug, Clone)]
pub struct Batch {
    members: Vec<BatchMember>,
    retries: u32,
}

impl Batch {
    /// Creates a batch whose members are all freshly dispatched
    pub fn dispatched(urls: Vec<String>) -> Self {
        let members = urls
            .into_iter()
            .map(|url| BatchMember {
                url,
                state: MemberState::InFlight,
                attempts: 1,
            })
            .collect();

        Self {
            members,
            retries: 0,
        }
    }

    /// Returns true when every member is done
    pub fn is_done(&self) -> bool {
        self.members.iter().all(|m| m.state.is_done())
    }

    /// Number of retry ticks spent so far
    pub fn retries(&self) -> u32 {
        self.retries
    }

    /// Counts one more tick that found the batch unsettled
    pub fn record_retry(&mut self) -> u32 {
        self.retries += 1;
        self.retries
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    pub fn members(&self) -> &[BatchMember] {
        &self.members
    }

    pub fn member_mut(&mut self, url: &str) -> Option<&mut BatchMember> {
        self.members.iter_mut().find(|m| m.url == url)
    }

    /// Moves every failed member back in flight and returns their URLs
    pub fn take_failed(&mut self) -> Vec<String> {
        self.members
            .iter_mut()
            .filter(|m| m.state == MemberState::Failed)
            .map(|m| {
                m.state = MemberState::InFlight;
                m.attempts += 1;
                m.url.clone()
            })
            .collect()
    }

    /// URLs of members that never completed
    pub fn unfinished(&self) -> Vec<String> {
        self.members
            .iter()
            .filter(|m| !m.state.is_done())
            .map(|m| m.url.clone())
            .collect()
    }
}

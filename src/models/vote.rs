use serde::{Deserialize, Serialize};
use std::fmt;

/// Numeric identifier of a rated hook article.
pub type HookId = u64;

/// A single feedback vote on a hook article.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Vote {
    /// The viewer found the article useful ("thumbs up").
    Useful,
    /// The viewer found the article useless ("thumbs down").
    Useless,
}

impl Vote {
    /// The other vote of the pair.
    pub fn opposite(self) -> Vote {
        match self {
            Vote::Useful => Vote::Useless,
            Vote::Useless => Vote::Useful,
        }
    }

    /// Name of the statistics endpoint that counts this vote.
    ///
    /// `incrementUsefullCount` is the name the statistics service exposes;
    /// the spelling must stay as is for wire compatibility.
    pub fn endpoint(self) -> &'static str {
        match self {
            Vote::Useful => "incrementUsefullCount",
            Vote::Useless => "incrementUselessCount",
        }
    }
}

impl fmt::Display for Vote {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Vote::Useful => write!(f, "useful"),
            Vote::Useless => write!(f, "useless"),
        }
    }
}

/// Selection state of one rendered feedback widget.
///
/// A single tagged value, so "both selected" cannot be represented.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum VoteState {
    #[default]
    None,
    Useful,
    Useless,
}

impl VoteState {
    /// State after the viewer clicks `vote`. Always selects `vote`.
    pub fn select(self, vote: Vote) -> VoteState {
        match vote {
            Vote::Useful => VoteState::Useful,
            Vote::Useless => VoteState::Useless,
        }
    }

    /// The currently selected vote, if any.
    pub fn selected(self) -> Option<Vote> {
        match self {
            VoteState::None => None,
            VoteState::Useful => Some(Vote::Useful),
            VoteState::Useless => Some(Vote::Useless),
        }
    }

    pub fn is_selected(self, vote: Vote) -> bool {
        self.selected() == Some(vote)
    }

    /// A control is disabled exactly when the other vote is active.
    pub fn is_disabled(self, vote: Vote) -> bool {
        self.is_selected(vote.opposite())
    }
}

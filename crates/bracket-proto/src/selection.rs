use thiserror::Error;

use crate::roster::is_known_team;
use crate::TeamId;

pub const MAX_SELECTED_TEAMS: usize = 5;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SelectionError {
    #[error("Please select at least one team")]
    Empty,
    #[error("You can only select up to 5 teams")]
    TooMany,
    #[error("team {0} is selected more than once")]
    Duplicate(TeamId),
    #[error("team {0} is not part of the tournament field")]
    UnknownTeam(TeamId),
}

/// A user's favorite teams, in pick order. Enforced on the selecting side
/// only; the server accepts any non-empty list of ids.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TeamSelection(Vec<TeamId>);

impl TeamSelection {
    pub fn new(ids: impl IntoIterator<Item = TeamId>) -> Result<Self, SelectionError> {
        let mut picked = Vec::new();
        for id in ids {
            if !is_known_team(id) {
                return Err(SelectionError::UnknownTeam(id));
            }
            if picked.contains(&id) {
                return Err(SelectionError::Duplicate(id));
            }
            if picked.len() == MAX_SELECTED_TEAMS {
                return Err(SelectionError::TooMany);
            }
            picked.push(id);
        }
        if picked.is_empty() {
            return Err(SelectionError::Empty);
        }
        Ok(Self(picked))
    }

    pub fn ids(&self) -> &[TeamId] {
        &self.0
    }
}

use serde::{Deserialize, Serialize};

use crate::TeamId;

pub const TEAMS_PER_REGION: u8 = 16;
pub const FIELD_SIZE: usize = 64;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Region {
    East,
    West,
    South,
    Midwest,
}

impl Region {
    pub const ALL: [Region; 4] = [Region::East, Region::West, Region::South, Region::Midwest];

    pub fn label(self) -> &'static str {
        match self {
            Region::East => "East",
            Region::West => "West",
            Region::South => "South",
            Region::Midwest => "Midwest",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Team {
    pub id: TeamId,
    pub name: String,
    pub region: Region,
    pub seed: u8,
}

/// The full field: ids run 1..=64, sixteen seeds per region in `Region::ALL`
/// order.
pub fn roster() -> Vec<Team> {
    let mut teams = Vec::with_capacity(FIELD_SIZE);
    let mut id: TeamId = 1;
    for region in Region::ALL {
        for seed in 1..=TEAMS_PER_REGION {
            teams.push(Team {
                id,
                name: format!("Team {id}"),
                region,
                seed,
            });
            id += 1;
        }
    }
    teams
}

pub fn is_known_team(id: TeamId) -> bool {
    (1..=FIELD_SIZE as TeamId).contains(&id)
}

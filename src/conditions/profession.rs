//! professions reported by the game's identity block

use std::fmt;

use serde::{Deserialize, Serialize};
use strsim::levenshtein;

/// maximum edit distance for "did you mean" suggestions
const SUGGESTION_DISTANCE: usize = 3;

/// playable professions, numbered the way the game reports them
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Profession {
    /// no profession reported (character select, loading screens)
    #[default]
    None,
    Guardian,
    Warrior,
    Engineer,
    Ranger,
    Thief,
    Elementalist,
    Mesmer,
    Necromancer,
    Revenant,
}

impl Profession {
    /// every playable profession, in id order
    pub const PLAYABLE: [Profession; 9] = [
        Profession::Guardian,
        Profession::Warrior,
        Profession::Engineer,
        Profession::Ranger,
        Profession::Thief,
        Profession::Elementalist,
        Profession::Mesmer,
        Profession::Necromancer,
        Profession::Revenant,
    ];

    /// numeric id as stored in settings and reported by the game
    pub fn id(self) -> i64 {
        match self {
            Profession::None => 0,
            Profession::Guardian => 1,
            Profession::Warrior => 2,
            Profession::Engineer => 3,
            Profession::Ranger => 4,
            Profession::Thief => 5,
            Profession::Elementalist => 6,
            Profession::Mesmer => 7,
            Profession::Necromancer => 8,
            Profession::Revenant => 9,
        }
    }

    /// map a numeric id back to a profession; unknown ids become `None`
    pub fn from_id(id: i64) -> Self {
        Self::PLAYABLE
            .into_iter()
            .find(|p| p.id() == id)
            .unwrap_or(Profession::None)
    }

    pub fn name(self) -> &'static str {
        match self {
            Profession::None => "None",
            Profession::Guardian => "Guardian",
            Profession::Warrior => "Warrior",
            Profession::Engineer => "Engineer",
            Profession::Ranger => "Ranger",
            Profession::Thief => "Thief",
            Profession::Elementalist => "Elementalist",
            Profession::Mesmer => "Mesmer",
            Profession::Necromancer => "Necromancer",
            Profession::Revenant => "Revenant",
        }
    }

    /// parse a profession from its name (case-insensitive) or numeric id
    pub fn parse(s: &str) -> Option<Self> {
        let s = s.trim();

        if let Ok(id) = s.parse::<i64>() {
            return Self::PLAYABLE.into_iter().find(|p| p.id() == id);
        }

        let lower = s.to_lowercase();
        match lower.as_str() {
            "guard" => return Some(Profession::Guardian),
            "ele" => return Some(Profession::Elementalist),
            "necro" => return Some(Profession::Necromancer),
            "rev" => return Some(Profession::Revenant),
            "engi" | "engie" => return Some(Profession::Engineer),
            _ => {}
        }

        Self::PLAYABLE
            .into_iter()
            .find(|p| p.name().to_lowercase() == lower)
    }

    /// profession names close to an unrecognized input, best match first
    pub fn suggestions(input: &str) -> Vec<&'static str> {
        let lower = input.trim().to_lowercase();
        let mut scored: Vec<(usize, &'static str)> = Self::PLAYABLE
            .into_iter()
            .map(|p| (levenshtein(&lower, &p.name().to_lowercase()), p.name()))
            .filter(|(distance, _)| *distance <= SUGGESTION_DISTANCE)
            .collect();

        scored.sort_by_key(|(distance, _)| *distance);
        scored.into_iter().map(|(_, name)| name).collect()
    }
}

impl fmt::Display for Profession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

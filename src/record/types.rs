use serde::{Deserialize, Serialize};
use std::fmt;

/// Batting side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Handedness {
    #[serde(rename = "L")]
    Left,
    #[serde(rename = "R")]
    Right,
    #[serde(rename = "S", alias = "B")]
    Switch,
}

impl Handedness {
    /// Parse a handedness cell; anything unrecognized is `None`.
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_uppercase().as_str() {
            "L" | "LEFT" => Some(Handedness::Left),
            "R" | "RIGHT" => Some(Handedness::Right),
            "S" | "B" | "SWITCH" | "BOTH" => Some(Handedness::Switch),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Handedness::Left => "L",
            Handedness::Right => "R",
            Handedness::Switch => "S",
        }
    }
}

impl fmt::Display for Handedness {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Primary fielding position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Position {
    #[serde(rename = "C")]
    Catcher,
    #[serde(rename = "1B")]
    FirstBase,
    #[serde(rename = "2B")]
    SecondBase,
    #[serde(rename = "3B")]
    ThirdBase,
    #[serde(rename = "SS")]
    Shortstop,
    #[serde(rename = "LF")]
    LeftField,
    #[serde(rename = "CF")]
    CenterField,
    #[serde(rename = "RF")]
    RightField,
    #[serde(rename = "OF")]
    Outfield,
    #[serde(rename = "DH")]
    DesignatedHitter,
}

impl Position {
    pub fn parse(s: &str) -> Option<Self> {
        let pos = match s.trim().to_uppercase().as_str() {
            "C" => Position::Catcher,
            "1B" => Position::FirstBase,
            "2B" => Position::SecondBase,
            "3B" => Position::ThirdBase,
            "SS" => Position::Shortstop,
            "LF" => Position::LeftField,
            "CF" => Position::CenterField,
            "RF" => Position::RightField,
            "OF" => Position::Outfield,
            "DH" => Position::DesignatedHitter,
            _ => return None,
        };
        Some(pos)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Position::Catcher => "C",
            Position::FirstBase => "1B",
            Position::SecondBase => "2B",
            Position::ThirdBase => "3B",
            Position::Shortstop => "SS",
            Position::LeftField => "LF",
            Position::CenterField => "CF",
            Position::RightField => "RF",
            Position::Outfield => "OF",
            Position::DesignatedHitter => "DH",
        }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Raw counting statistics. `None` means the source had no usable value.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BattingLine {
    pub plate_appearances: Option<f64>,
    pub at_bats: Option<f64>,
    pub hits: Option<f64>,
    pub doubles: Option<f64>,
    pub triples: Option<f64>,
    pub home_runs: Option<f64>,
    pub runs: Option<f64>,
    pub rbi: Option<f64>,
    pub walks: Option<f64>,
    pub strikeouts: Option<f64>,
    pub steals: Option<f64>,
    pub caught_stealing: Option<f64>,
}

/// Missing, negative or non-finite counts read as zero.
fn count(value: Option<f64>) -> f64 {
    value.filter(|v| v.is_finite() && *v > 0.0).unwrap_or(0.0)
}

impl BattingLine {
    pub fn pa(&self) -> f64 {
        count(self.plate_appearances)
    }

    pub fn ab(&self) -> f64 {
        count(self.at_bats)
    }

    pub fn h(&self) -> f64 {
        count(self.hits)
    }

    pub fn doubles(&self) -> f64 {
        count(self.doubles)
    }

    pub fn triples(&self) -> f64 {
        count(self.triples)
    }

    pub fn hr(&self) -> f64 {
        count(self.home_runs)
    }

    pub fn r(&self) -> f64 {
        count(self.runs)
    }

    pub fn rbi(&self) -> f64 {
        count(self.rbi)
    }

    pub fn bb(&self) -> f64 {
        count(self.walks)
    }

    pub fn so(&self) -> f64 {
        count(self.strikeouts)
    }

    pub fn sb(&self) -> f64 {
        count(self.steals)
    }

    pub fn cs(&self) -> f64 {
        count(self.caught_stealing)
    }

    /// At-bats as reported, `None` when missing or not a finite number.
    pub fn at_bats_reported(&self) -> Option<f64> {
        self.at_bats.filter(|v| v.is_finite())
    }

    /// True when no counting statistic carries a usable value.
    pub fn is_empty(&self) -> bool {
        [
            self.plate_appearances,
            self.at_bats,
            self.hits,
            self.doubles,
            self.triples,
            self.home_runs,
            self.runs,
            self.rbi,
            self.walks,
            self.strikeouts,
            self.steals,
            self.caught_stealing,
        ]
        .into_iter()
        .all(|v| !v.is_some_and(f64::is_finite))
    }
}

/// One player at one level, as delivered by ingestion.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Record {
    pub name: Option<String>,
    pub bats: Option<Handedness>,
    pub position: Option<Position>,
    pub age: Option<f64>,
    /// Level label as found in the source, before normalization.
    pub level: Option<String>,
    /// Provenance tag, usually the source file name.
    pub source: Option<String>,
    #[serde(default)]
    pub line: BattingLine,
}

impl Record {
    /// Dedup key: trimmed, case-folded name. Blank names have no identity.
    pub fn identity_key(&self) -> Option<String> {
        let name = self.name.as_deref()?.trim();
        if name.is_empty() {
            None
        } else {
            Some(name.to_lowercase())
        }
    }

    /// Age when present and finite.
    pub fn age(&self) -> Option<f64> {
        self.age.filter(|a| a.is_finite())
    }

    /// Team part of the provenance tag: `"cardinals-aaa.csv"` -> `"cardinals"`.
    pub fn team(&self) -> Option<&str> {
        let source = self.source.as_deref()?;
        let name = source.rsplit(['/', '\\']).next().unwrap_or(source);
        let stem = name.rsplit_once('.').map(|(stem, _)| stem).unwrap_or(name);
        let team = stem.rsplit_once('-').map(|(team, _)| team).unwrap_or(stem);
        Some(team)
    }
}

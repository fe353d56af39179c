use std::fmt;

/// Competition level, ordered from strongest to weakest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Tier {
    Mlb,
    Aaa,
    Aa,
    HighA,
    A,
    Rookie,
}

impl Tier {
    pub const ALL: [Tier; 6] = [
        Tier::Mlb,
        Tier::Aaa,
        Tier::Aa,
        Tier::HighA,
        Tier::A,
        Tier::Rookie,
    ];

    /// Canonical spelling used in config keys and output.
    pub fn as_str(&self) -> &'static str {
        match self {
            Tier::Mlb => "MLB",
            Tier::Aaa => "AAA",
            Tier::Aa => "AA",
            Tier::HighA => "A+",
            Tier::A => "A",
            Tier::Rookie => "Rookie",
        }
    }
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A record's level after normalization.
///
/// Labels outside the known vocabulary are kept (uppercased) rather than
/// dropped, so they still form their own normalization group and can match
/// a config key spelled the same way.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum TierLabel {
    Canonical(Tier),
    Unrecognized(String),
}

impl TierLabel {
    /// Parse an explicit level label. Blank labels yield `None`.
    pub fn parse(label: &str) -> Option<Self> {
        let trimmed = label.trim();
        if trimmed.is_empty() {
            return None;
        }
        Some(match canonicalize(trimmed) {
            Some(tier) => TierLabel::Canonical(tier),
            None => TierLabel::Unrecognized(trimmed.to_uppercase()),
        })
    }

    pub fn as_str(&self) -> &str {
        match self {
            TierLabel::Canonical(tier) => tier.as_str(),
            TierLabel::Unrecognized(s) => s,
        }
    }

    /// Whether a config key refers to this level.
    pub fn matches_key(&self, key: &str) -> bool {
        match self {
            TierLabel::Canonical(tier) => canonicalize(key) == Some(*tier),
            TierLabel::Unrecognized(s) => fold(key) == fold(s),
        }
    }
}

impl fmt::Display for TierLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<Tier> for TierLabel {
    fn from(tier: Tier) -> Self {
        TierLabel::Canonical(tier)
    }
}

/// Uppercase, spell out `+`, and drop separator characters.
fn fold(label: &str) -> String {
    label
        .trim()
        .to_uppercase()
        .replace('+', "PLUS")
        .chars()
        .filter(|c| !matches!(c, ' ' | '_' | '-' | '.'))
        .collect()
}

/// Map a free-text level label onto the canonical vocabulary.
///
/// Matching is case-insensitive and ignores spaces, `_`, `-` and `.`, so
/// `"high-a"`, `"HIGH_A"`, `"A-Advanced"` and `"A+"` all resolve to
/// [`Tier::HighA`].
pub fn canonicalize(label: &str) -> Option<Tier> {
    let folded = fold(label);
    synonym(&folded).or_else(|| folded.contains("ROOKIE").then_some(Tier::Rookie))
}

/// Exact synonym table over folded spellings.
fn synonym(folded: &str) -> Option<Tier> {
    let tier = match folded {
        "MLB" | "MAJORS" => Tier::Mlb,
        "AAA" | "TRIPLEA" => Tier::Aaa,
        "AA" | "DOUBLEA" => Tier::Aa,
        "APLUS" | "HIGHA" | "AADVANCED" | "ADVANCEDA" => Tier::HighA,
        "A" | "LOWA" | "SINGLEA" => Tier::A,
        "ROOKIE" | "RK" | "ROK" => Tier::Rookie,
        _ => return None,
    };
    Some(tier)
}

const KNOWN_EXTENSIONS: [&str; 4] = [".csv", ".tsv", ".txt", ".json"];

/// Infer a level from a provenance tag such as `"cardinals-aaa.csv"`.
///
/// The trailing two tokens are tried together first (`"team-high-a"`), then
/// the trailing token alone. An unrecognized trailing token is returned
/// uppercased.
pub fn infer_tier(provenance: &str) -> Option<TierLabel> {
    let name = provenance
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or(provenance)
        .trim();

    let stem = KNOWN_EXTENSIONS
        .iter()
        .find_map(|ext| {
            let split = name.len().checked_sub(ext.len())?;
            let suffix = name.get(split..)?;
            suffix.eq_ignore_ascii_case(ext).then(|| &name[..split])
        })
        .unwrap_or(name);

    let normalized = stem.replace('_', "-");
    let tokens: Vec<&str> = normalized
        .split('-')
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .collect();

    let last = *tokens.last()?;

    if tokens.len() >= 2 {
        let pair = format!("{}{}", tokens[tokens.len() - 2], last);
        if let Some(tier) = synonym(&fold(&pair)) {
            return Some(TierLabel::Canonical(tier));
        }
    }

    Some(match canonicalize(last) {
        Some(tier) => TierLabel::Canonical(tier),
        None => TierLabel::Unrecognized(last.to_uppercase()),
    })
}

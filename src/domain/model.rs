use serde::{Deserialize, Serialize};
use std::fmt;

/// Side an agent fights for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Affiliation {
    Friendly,
    Hostile,
    Neutral,
    Unknown,
}

impl Affiliation {
    pub const ALL: [Affiliation; 4] = [
        Affiliation::Friendly,
        Affiliation::Hostile,
        Affiliation::Neutral,
        Affiliation::Unknown,
    ];

    /// Only friendly and hostile forces oppose each other.
    pub fn is_hostile_to(&self, other: Affiliation) -> bool {
        matches!(
            (self, other),
            (Affiliation::Friendly, Affiliation::Hostile) | (Affiliation::Hostile, Affiliation::Friendly)
        )
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Affiliation::Friendly => "FRIENDLY",
            Affiliation::Hostile => "HOSTILE",
            Affiliation::Neutral => "NEUTRAL",
            Affiliation::Unknown => "UNKNOWN",
        }
    }
}

impl fmt::Display for Affiliation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AgentType {
    Armour,
    AirDefence,
    Infantry,
    Air,
    Generic,
    Group,
    Unknown,
}

impl AgentType {
    pub fn as_str(&self) -> &'static str {
        match self {
            AgentType::Armour => "ARMOUR",
            AgentType::AirDefence => "AIR_DEFENCE",
            AgentType::Infantry => "INFANTRY",
            AgentType::Air => "AIR",
            AgentType::Generic => "GENERIC",
            AgentType::Group => "GROUP",
            AgentType::Unknown => "UNKNOWN",
        }
    }

    /// Icon file stem used by RetPlay.
    pub fn icon_stem(&self) -> &'static str {
        match self {
            AgentType::Armour => "armouragent",
            AgentType::AirDefence => "airdefenceagent",
            AgentType::Infantry => "infantryagent",
            AgentType::Air => "airagent",
            AgentType::Group => "groupagent",
            AgentType::Generic | AgentType::Unknown => "retagent",
        }
    }
}

impl fmt::Display for AgentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AgentCasualtyState {
    Alive,
    Killed,
}

/// How much a sensor learnt about an agent. Ordered weakest first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Confidence {
    Detect,
    Recognise,
    Identify,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AgentId(pub u64);

impl fmt::Display for AgentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A 2d or 3d position in model space.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Coordinate {
    D2(f64, f64),
    D3(f64, f64, f64),
}

impl Coordinate {
    pub fn x(&self) -> f64 {
        match *self {
            Coordinate::D2(x, _) | Coordinate::D3(x, _, _) => x,
        }
    }

    pub fn y(&self) -> f64 {
        match *self {
            Coordinate::D2(_, y) | Coordinate::D3(_, y, _) => y,
        }
    }

    pub fn z(&self) -> Option<f64> {
        match *self {
            Coordinate::D2(..) => None,
            Coordinate::D3(_, _, z) => Some(z),
        }
    }

    pub fn is_3d(&self) -> bool {
        matches!(self, Coordinate::D3(..))
    }

    pub fn to_2d(&self) -> Coordinate {
        Coordinate::D2(self.x(), self.y())
    }

    pub fn with_z(&self, z: f64) -> Coordinate {
        Coordinate::D3(self.x(), self.y(), z)
    }

    pub fn horizontal_distance(&self, other: &Coordinate) -> f64 {
        (self.x() - other.x()).hypot(self.y() - other.y())
    }

    /// Euclidean distance; falls back to 2d when either side has no height.
    pub fn distance(&self, other: &Coordinate) -> f64 {
        match (self.z(), other.z()) {
            (Some(z1), Some(z2)) => {
                let horizontal = self.horizontal_distance(other);
                horizontal.hypot(z1 - z2)
            }
            _ => self.horizontal_distance(other),
        }
    }

    /// Compass bearing to `other` in degrees, clockwise from +y.
    pub fn bearing_to(&self, other: &Coordinate) -> f64 {
        let dx = other.x() - self.x();
        let dy = other.y() - self.y();
        dx.atan2(dy).to_degrees().rem_euclid(360.0)
    }

    /// Point `distance` along the straight line towards `other`, stopping at `other`.
    pub fn step_towards(&self, other: &Coordinate, distance: f64) -> Coordinate {
        let total = self.distance(other);
        if total <= distance || total == 0.0 {
            return *other;
        }
        let fraction = distance / total;
        let x = self.x() + (other.x() - self.x()) * fraction;
        let y = self.y() + (other.y() - self.y()) * fraction;
        match (self.z(), other.z()) {
            (Some(z1), Some(z2)) => Coordinate::D3(x, y, z1 + (z2 - z1) * fraction),
            _ => Coordinate::D2(x, y),
        }
    }

    pub fn offset(&self, dx: f64, dy: f64) -> Coordinate {
        match *self {
            Coordinate::D2(x, y) => Coordinate::D2(x + dx, y + dy),
            Coordinate::D3(x, y, z) => Coordinate::D3(x + dx, y + dy, z),
        }
    }
}

impl From<(f64, f64)> for Coordinate {
    fn from((x, y): (f64, f64)) -> Self {
        Coordinate::D2(x, y)
    }
}

impl From<(f64, f64, f64)> for Coordinate {
    fn from((x, y, z): (f64, f64, f64)) -> Self {
        Coordinate::D3(x, y, z)
    }
}

impl fmt::Display for Coordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Coordinate::D2(x, y) => write!(f, "({:.1}, {:.1})", x, y),
            Coordinate::D3(x, y, z) => write!(f, "({:.1}, {:.1}, {:.1})", x, y, z),
        }
    }
}

//! Level of traffic stress (LTS) for cyclists.
//!
//! Each road segment is scored 1 (comfortable for most riders) to 4 (only
//! for confident riders) from its functional road class, posted speed,
//! average daily traffic and whether a separated cycle facility runs along
//! it.  The score maps to a penalty `ratio` that output stages multiply with
//! segment flow to rank where infrastructure would matter most.
//!
//! Road classes follow the national road database convention: 0–2 are
//! trunk and primary roads, 3 secondary, 4 tertiary, 5+ local and access.

use std::fmt;

/// Traffic count assumed when a segment carries none.
fn default_adt(road_class: u8) -> u32 {
    match road_class {
        0..=3 => 9_001,
        4     => 3_000,
        _     => 900,
    }
}

const DEFAULT_SPEED_KMH: u32 = 70;

// ── RoadAttributes ────────────────────────────────────────────────────────────

/// Raw attributes of one road segment.
///
/// A speed or ADT of `Some(0)` is treated the same as `None`: source data
/// uses zero for "not recorded".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RoadAttributes {
    pub road_class:  u8,
    pub speed_kmh:   Option<u32>,
    pub adt:         Option<u32>,
    pub cycle_infra: bool,
}

impl RoadAttributes {
    pub fn new(road_class: u8) -> Self {
        Self { road_class, speed_kmh: None, adt: None, cycle_infra: false }
    }

    pub fn with_speed(mut self, kmh: u32) -> Self {
        self.speed_kmh = Some(kmh);
        self
    }

    pub fn with_adt(mut self, adt: u32) -> Self {
        self.adt = Some(adt);
        self
    }

    pub fn with_cycle_infra(mut self, present: bool) -> Self {
        self.cycle_infra = present;
        self
    }

    /// Speed with the default applied.
    pub fn effective_speed(&self) -> u32 {
        self.speed_kmh.filter(|&s| s > 0).unwrap_or(DEFAULT_SPEED_KMH)
    }

    /// ADT with the class-dependent default applied.
    pub fn effective_adt(&self) -> u32 {
        self.adt.filter(|&a| a > 0).unwrap_or_else(|| default_adt(self.road_class))
    }

    /// Stress level of this segment.
    pub fn lts(&self) -> Lts {
        let speed = self.effective_speed();
        let adt   = self.effective_adt();
        let gc    = self.cycle_infra;

        if self.road_class <= 2 || speed > 80 || (adt > 4_000 && speed > 40 && !gc) {
            Lts::Four
        } else if speed <= 30 || (adt <= 1_000 && speed <= 40) {
            Lts::One
        } else if gc
            && (adt <= 1_000 || (speed <= 60 && adt <= 2_000) || (speed <= 40 && adt <= 4_000))
        {
            Lts::One
        } else if gc && speed > 60 && adt > 4_000 {
            Lts::Three
        } else if !gc
            && (adt > 4_000 || (speed > 40 && adt >= 2_000) || (speed > 60 && adt >= 1_000))
        {
            Lts::Three
        } else {
            Lts::Two
        }
    }

    /// Recommended cycle facility class, 1 (mixed traffic) to 5 (fully
    /// separated, trunk-road standard).
    pub fn recommended_infrastructure(&self) -> u8 {
        let speed = self.effective_speed();
        let adt   = self.effective_adt();

        if self.road_class <= 2 {
            5
        } else if speed <= 30 {
            1
        } else if speed <= 60 && adt <= 2_000 {
            2
        } else if (speed <= 80 && adt <= 4_000) || (speed <= 40 && adt > 4_000) {
            3
        } else {
            4
        }
    }

    pub fn classify(&self) -> Infrastructure {
        Infrastructure {
            rec: Some(self.recommended_infrastructure()),
            ..Infrastructure::from(self.lts())
        }
    }
}

// ── Lts ───────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Lts {
    One,
    Two,
    Three,
    Four,
}

impl Lts {
    pub fn level(self) -> u8 {
        match self {
            Lts::One   => 1,
            Lts::Two   => 2,
            Lts::Three => 3,
            Lts::Four  => 4,
        }
    }

    pub fn from_level(level: u8) -> Option<Self> {
        match level {
            1 => Some(Lts::One),
            2 => Some(Lts::Two),
            3 => Some(Lts::Three),
            4 => Some(Lts::Four),
            _ => None,
        }
    }

    /// Default flow penalty for this level.
    pub fn ratio(self) -> f64 {
        match self {
            Lts::One   => 0.0,
            Lts::Two   => 1.0,
            Lts::Three => 1.58,
            Lts::Four  => 2.0,
        }
    }
}

impl fmt::Display for Lts {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "LTS{}", self.level())
    }
}

// ── Infrastructure ────────────────────────────────────────────────────────────

/// Per-segment classification carried through to output.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Infrastructure {
    pub lts:   Lts,
    pub ratio: f64,
    /// Recommended facility class; `None` without road attributes.
    pub rec:   Option<u8>,
}

impl From<Lts> for Infrastructure {
    fn from(lts: Lts) -> Self {
        Self { lts, ratio: lts.ratio(), rec: None }
    }
}

//! Travel modes the planner assigns flow for.

/// The bicycle class a trip is made with.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum Mode {
    /// Conventional bicycle.
    Bike,
    /// Electric-assist bicycle.
    Ebike,
}

impl Mode {
    /// Every mode, in output column order.
    pub const ALL: [Mode; 2] = [Mode::Bike, Mode::Ebike];

    /// Dense index for per-mode arrays.
    #[inline]
    pub fn index(self) -> usize {
        match self {
            Mode::Bike  => 0,
            Mode::Ebike => 1,
        }
    }

    /// Label used in output column names (`{category}_{mode}_value`).
    pub fn as_str(self) -> &'static str {
        match self {
            Mode::Bike  => "bike",
            Mode::Ebike => "ebike",
        }
    }
}

impl std::fmt::Display for Mode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

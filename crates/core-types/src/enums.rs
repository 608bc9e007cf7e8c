use serde::{Deserialize, Serialize};

/// The look-back periods the market-data service reports a percent change for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Horizon {
    Month1,
    Month3,
    Month6,
    Year1,
}

impl Horizon {
    /// All horizons, shortest first.
    pub const ALL: [Horizon; 4] = [
        Horizon::Month1,
        Horizon::Month3,
        Horizon::Month6,
        Horizon::Year1,
    ];

    /// Name of the stats field holding the percent change for this horizon.
    pub fn change_field(&self) -> &'static str {
        match self {
            Horizon::Month1 => "month1ChangePercent",
            Horizon::Month3 => "month3ChangePercent",
            Horizon::Month6 => "month6ChangePercent",
            Horizon::Year1 => "year1ChangePercent",
        }
    }

    /// Short label used in table headers.
    pub fn label(&self) -> &'static str {
        match self {
            Horizon::Month1 => "1M",
            Horizon::Month3 => "3M",
            Horizon::Month6 => "6M",
            Horizon::Year1 => "1Y",
        }
    }
}

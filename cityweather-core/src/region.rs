//! Static table of the German federal states, keyed by their GeoNames `adminCode1`.

use std::{convert::TryFrom, fmt};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Region {
    pub code: &'static str,
    pub name: &'static str,
}

pub const REGIONS: [Region; 16] = [
    Region { code: "01", name: "Baden-Württemberg" },
    Region { code: "02", name: "Bayern" },
    Region { code: "03", name: "Bremen" },
    Region { code: "04", name: "Hamburg" },
    Region { code: "05", name: "Hessen" },
    Region { code: "06", name: "Niedersachsen" },
    Region { code: "07", name: "Nordrhein-Westfalen" },
    Region { code: "08", name: "Rheinland-Pfalz" },
    Region { code: "09", name: "Saarland" },
    Region { code: "10", name: "Schleswig-Holstein" },
    Region { code: "11", name: "Brandenburg" },
    Region { code: "12", name: "Mecklenburg-Vorpommern" },
    Region { code: "13", name: "Sachsen" },
    Region { code: "14", name: "Sachsen-Anhalt" },
    Region { code: "15", name: "Thüringen" },
    Region { code: "16", name: "Berlin" },
];

/// File tag used in output names when every region is requested.
pub const ALL_REGIONS_TAG: &str = "00";

/// Resolve a region code to its display name. Unknown codes yield `None`.
pub fn lookup(code: &str) -> Option<&'static str> {
    REGIONS.iter().find(|r| r.code == code).map(|r| r.name)
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.code, self.name)
    }
}

impl TryFrom<&str> for Region {
    type Error = anyhow::Error;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let code = value.trim();

        REGIONS.iter().copied().find(|r| r.code == code).ok_or_else(|| {
            anyhow::anyhow!(
                "Unknown state code '{value}'. Expected a two-digit code from 01 to 16 (e.g. 13 for Sachsen)."
            )
        })
    }
}

/// Which regions a single run covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StateSelector {
    #[default]
    All,
    Region(Region),
}

impl StateSelector {
    /// Regions to query, in table order.
    pub fn regions(&self) -> Vec<Region> {
        match self {
            StateSelector::All => REGIONS.to_vec(),
            StateSelector::Region(region) => vec![*region],
        }
    }

    pub fn file_tag(&self) -> &'static str {
        match self {
            StateSelector::All => ALL_REGIONS_TAG,
            StateSelector::Region(region) => region.code,
        }
    }
}

impl From<Option<Region>> for StateSelector {
    fn from(value: Option<Region>) -> Self {
        value.map_or(StateSelector::All, StateSelector::Region)
    }
}

impl fmt::Display for StateSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StateSelector::All => f.write_str("all states"),
            StateSelector::Region(region) => fmt::Display::fmt(region, f),
        }
    }
}

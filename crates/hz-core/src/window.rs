//! The rolling-horizon time window.

use core::ops::RangeInclusive;

use crate::error::{HzError, HzResult};
use crate::ids::Year;

/// Bounds of one myopic step.
///
/// Supplied by the rolling-horizon driver once per step. Construction checks
/// `base_year <= last_demand_year <= last_year`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(try_from = "RawWindow"))]
pub struct TimeWindow {
    base_year: Year,
    last_year: Year,
    last_demand_year: Year,
}

impl TimeWindow {
    pub fn new(base_year: Year, last_year: Year, last_demand_year: Year) -> HzResult<Self> {
        if last_demand_year > last_year {
            return Err(HzError::configuration(format!(
                "last_demand_year {} is beyond last_year {}",
                last_demand_year, last_year
            )));
        }
        if base_year > last_demand_year {
            return Err(HzError::configuration(format!(
                "base_year {} is beyond last_demand_year {}",
                base_year, last_demand_year
            )));
        }
        Ok(Self {
            base_year,
            last_year,
            last_demand_year,
        })
    }

    pub fn base_year(&self) -> Year {
        self.base_year
    }

    pub fn last_year(&self) -> Year {
        self.last_year
    }

    pub fn last_demand_year(&self) -> Year {
        self.last_demand_year
    }

    /// An edge is alive while `vintage + lifetime > base_year`.
    pub fn admits_edge(&self, vintage: Year, lifetime: Year) -> bool {
        i64::from(vintage) + i64::from(lifetime) > i64::from(self.base_year)
    }

    /// Periods carrying demand-driven rows: `[base_year, last_demand_year]`.
    pub fn demand_horizon(&self) -> RangeInclusive<Year> {
        self.base_year..=self.last_demand_year
    }

    /// Future periods of the window: `[base_year, last_year]`.
    pub fn future_horizon(&self) -> RangeInclusive<Year> {
        self.base_year..=self.last_year
    }
}

#[cfg(feature = "serde")]
#[derive(serde::Deserialize)]
struct RawWindow {
    base_year: Year,
    last_year: Year,
    last_demand_year: Year,
}

#[cfg(feature = "serde")]
impl TryFrom<RawWindow> for TimeWindow {
    type Error = HzError;

    fn try_from(raw: RawWindow) -> Result<Self, Self::Error> {
        TimeWindow::new(raw.base_year, raw.last_year, raw.last_demand_year)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn edge_expiry_boundary() {
        let w = TimeWindow::new(2020, 2030, 2030).unwrap();
        // expires 2015
        assert!(!w.admits_edge(2010, 5));
        // expires 2025
        assert!(w.admits_edge(2010, 15));
        // expiring exactly at the base year is dead
        assert!(!w.admits_edge(2010, 10));
    }

    #[test]
    fn horizons_are_inclusive() {
        let w = TimeWindow::new(2020, 2040, 2030).unwrap();
        assert!(w.demand_horizon().contains(&2020));
        assert!(w.demand_horizon().contains(&2030));
        assert!(!w.demand_horizon().contains(&2035));
        assert!(w.future_horizon().contains(&2040));
    }

    #[test]
    fn rejects_demand_beyond_last_year() {
        let err = TimeWindow::new(2020, 2030, 2035).unwrap_err();
        assert!(matches!(err, HzError::Configuration { .. }));
    }

    #[test]
    fn rejects_base_beyond_demand() {
        assert!(TimeWindow::new(2031, 2040, 2030).is_err());
    }

    proptest::proptest! {
        #[test]
        fn construction_matches_ordering(base in 1900i32..2100, last in 1900i32..2100, demand in 1900i32..2100) {
            let ok = base <= demand && demand <= last;
            proptest::prop_assert_eq!(TimeWindow::new(base, last, demand).is_ok(), ok);
        }

        #[test]
        fn horizons_start_at_base(base in 1900i32..2000, span in 0i32..50, tail in 0i32..50) {
            let w = TimeWindow::new(base, base + span + tail, base + span).unwrap();
            proptest::prop_assert_eq!(*w.demand_horizon().start(), base);
            proptest::prop_assert!(w.future_horizon().end() >= w.demand_horizon().end());
        }
    }
}

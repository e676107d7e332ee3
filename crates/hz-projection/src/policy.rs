//! Declarative projection policies.

use hz_core::{TimeWindow, Value};
use hz_network::ViabilitySet;
use hz_store::Predicate;

/// Shape of the projected artifact.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Target {
    /// Distinct membership values taken from the single selected column.
    /// `sorted` orders them; otherwise first-seen order is kept.
    Set { sorted: bool },
    /// Mapping from all-but-last columns to the last column.
    Param,
}

/// A viability set a single column can be checked against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Domain {
    Technologies,
    Commodities,
    InputCommodities,
    Vintages,
}

impl Domain {
    pub fn contains(&self, viable: &ViabilitySet, value: &Value) -> bool {
        match self {
            Domain::Technologies => value
                .as_text()
                .is_some_and(|t| viable.technologies().contains(t)),
            Domain::Commodities => value
                .as_text()
                .is_some_and(|c| viable.commodities().contains(c)),
            Domain::InputCommodities => value
                .as_text()
                .is_some_and(|c| viable.input_commodities().contains(c)),
            Domain::Vintages => value
                .as_year()
                .is_some_and(|v| viable.vintages().contains(&v)),
        }
    }
}

/// Validation applied to rows when a window is active.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Validation {
    None,
    Technologies,
    Commodities,
    InputCommodities,
    /// (region, technology, vintage) at the three declared key positions.
    Processes,
    /// Every listed column must belong to its domain.
    Columns(&'static [(usize, Domain)]),
}

impl Validation {
    /// The single-column domain behind a simple validation.
    pub fn domain(&self) -> Option<Domain> {
        match self {
            Validation::Technologies => Some(Domain::Technologies),
            Validation::Commodities => Some(Domain::Commodities),
            Validation::InputCommodities => Some(Domain::InputCommodities),
            _ => None,
        }
    }
}

/// Static filter that does not depend on the window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Fixed {
    Eq(&'static str, &'static str),
    StartsWith(&'static str, &'static str),
}

impl Fixed {
    pub fn column(&self) -> &'static str {
        match self {
            Fixed::Eq(c, _) | Fixed::StartsWith(c, _) => *c,
        }
    }

    pub fn predicate(&self) -> Predicate {
        match self {
            Fixed::Eq(c, v) => Predicate::eq(c, *v),
            Fixed::StartsWith(c, prefix) => Predicate::starts_with(c, prefix),
        }
    }
}

/// Window bound on a period or vintage column. Ignored without a window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scope {
    All,
    /// `column < base_year`
    Before(&'static str),
    /// `base_year <= column <= last_year`
    FutureHorizon(&'static str),
    /// `base_year <= column <= last_demand_year`
    DemandHorizon(&'static str),
    /// `column >= base_year`
    FromBase(&'static str),
}

impl Scope {
    pub fn column(&self) -> Option<&'static str> {
        match self {
            Scope::All => None,
            Scope::Before(c)
            | Scope::FutureHorizon(c)
            | Scope::DemandHorizon(c)
            | Scope::FromBase(c) => Some(*c),
        }
    }

    pub fn predicate(&self, window: &TimeWindow) -> Option<Predicate> {
        match self {
            Scope::All => None,
            Scope::Before(c) => Some(Predicate::lt(c, window.base_year())),
            Scope::FutureHorizon(c) => {
                let span = window.future_horizon();
                Some(Predicate::between(c, *span.start(), *span.end()))
            }
            Scope::DemandHorizon(c) => {
                let span = window.demand_horizon();
                Some(Predicate::between(c, *span.start(), *span.end()))
            }
            Scope::FromBase(c) => Some(Predicate::ge(c, window.base_year())),
        }
    }
}

/// One select feeding a projection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TableQuery {
    pub table: &'static str,
    pub columns: &'static [&'static str],
    /// Always applied.
    pub filter: Option<Fixed>,
    /// Applied only in full-horizon mode.
    pub unwindowed_filter: Option<Fixed>,
    /// Applied only in windowed mode.
    pub scope: Scope,
    /// Skip quietly when the table is absent.
    pub optional: bool,
    /// Only read in windowed mode.
    pub windowed_only: bool,
}

impl TableQuery {
    pub const fn new(table: &'static str, columns: &'static [&'static str]) -> Self {
        Self {
            table,
            columns,
            filter: None,
            unwindowed_filter: None,
            scope: Scope::All,
            optional: false,
            windowed_only: false,
        }
    }

    pub const fn filter(self, filter: Fixed) -> Self {
        Self {
            filter: Some(filter),
            ..self
        }
    }

    pub const fn unwindowed(self, filter: Fixed) -> Self {
        Self {
            unwindowed_filter: Some(filter),
            ..self
        }
    }

    pub const fn scope(self, scope: Scope) -> Self {
        Self { scope, ..self }
    }

    pub const fn optional(self) -> Self {
        Self {
            optional: true,
            ..self
        }
    }

    pub const fn windowed_only(self) -> Self {
        Self {
            windowed_only: true,
            ..self
        }
    }

    /// The predicate for this query in the given mode.
    pub fn predicate(&self, window: Option<&TimeWindow>) -> Option<Predicate> {
        let bound = match window {
            Some(w) => self.scope.predicate(w),
            None => self.unwindowed_filter.map(|f| f.predicate()),
        };
        Predicate::all([self.filter.map(|f| f.predicate()), bound])
    }

    /// Every column this query touches, selected ones first.
    pub fn touched_columns(&self) -> Vec<&'static str> {
        let mut cols: Vec<&'static str> = self.columns.to_vec();
        let extra = [
            self.filter.map(|f| f.column()),
            self.unwindowed_filter.map(|f| f.column()),
            self.scope.column(),
        ];
        for c in extra.into_iter().flatten() {
            if !cols.contains(&c) {
                cols.push(c);
            }
        }
        cols
    }
}

/// Where the rows of a projection come from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Source {
    /// Concatenation of one or more selects.
    Tables(&'static [TableQuery]),
    /// The efficiency edges: the canonical closure edges in windowed mode,
    /// the cleaned-up full table otherwise.
    Efficiency,
}

/// Declared policy for one model parameter or set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParamSpec {
    pub name: &'static str,
    pub source: Source,
    pub target: Target,
    pub validation: Validation,
    /// Row positions used by the validation test.
    pub key_positions: &'static [usize],
}

impl ParamSpec {
    pub const fn set(name: &'static str, source: Source) -> Self {
        Self {
            name,
            source,
            target: Target::Set { sorted: false },
            validation: Validation::None,
            key_positions: &[],
        }
    }

    pub const fn param(name: &'static str, source: Source) -> Self {
        Self {
            name,
            source,
            target: Target::Param,
            validation: Validation::None,
            key_positions: &[],
        }
    }

    pub const fn sorted(self) -> Self {
        Self {
            target: Target::Set { sorted: true },
            ..self
        }
    }

    pub const fn validate(self, validation: Validation) -> Self {
        Self { validation, ..self }
    }

    pub const fn at(self, key_positions: &'static [usize]) -> Self {
        Self {
            key_positions,
            ..self
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn query_predicate_depends_on_mode() {
        let q = TableQuery::new("time_periods", &["t_periods"])
            .scope(Scope::Before("t_periods"))
            .unwindowed(Fixed::Eq("flag", "e"));
        let w = TimeWindow::new(2020, 2030, 2030).unwrap();
        assert_eq!(q.predicate(Some(&w)), Some(Predicate::lt("t_periods", 2020)));
        assert_eq!(q.predicate(None), Some(Predicate::eq("flag", "e")));
    }

    #[test]
    fn horizon_scopes_follow_the_window() {
        let w = TimeWindow::new(2020, 2040, 2030).unwrap();
        assert_eq!(
            Scope::FutureHorizon("periods").predicate(&w),
            Some(Predicate::between("periods", 2020, 2040))
        );
        assert_eq!(
            Scope::DemandHorizon("periods").predicate(&w),
            Some(Predicate::between("periods", 2020, 2030))
        );
        assert_eq!(
            Scope::FromBase("vintage").predicate(&w),
            Some(Predicate::ge("vintage", 2020))
        );
    }

    #[test]
    fn fixed_filter_always_applies() {
        let q = TableQuery::new("commodities", &["comm_name"]).filter(Fixed::Eq("flag", "d"));
        let w = TimeWindow::new(2020, 2030, 2030).unwrap();
        assert_eq!(q.predicate(Some(&w)), Some(Predicate::eq("flag", "d")));
        assert_eq!(q.predicate(None), Some(Predicate::eq("flag", "d")));
    }

    #[test]
    fn touched_columns_include_filters() {
        let q = TableQuery::new("Demand", &["regions", "periods", "demand_comm", "demand"])
            .scope(Scope::DemandHorizon("periods"));
        assert_eq!(q.touched_columns(), vec!["regions", "periods", "demand_comm", "demand"]);
        let q = TableQuery::new("technologies", &["tech"]).filter(Fixed::StartsWith("flag", "p"));
        assert_eq!(q.touched_columns(), vec!["tech", "flag"]);
    }
}

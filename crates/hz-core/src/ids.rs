use core::borrow::Borrow;
use core::fmt;
use std::sync::Arc;

/// Compact, shareable identifier used for regions, technologies and commodities.
///
/// - `Arc<str>` keeps clones cheap when the same label sits in many edges
/// - ordering is plain lexical ordering of the text
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Label(Arc<str>);

impl Label {
    pub fn new(text: impl AsRef<str>) -> Self {
        Self(Arc::from(text.as_ref()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// True for composite region tokens like `R1+R2`.
    pub fn is_region_group(&self) -> bool {
        self.0.contains(REGION_GROUP_DELIMITER)
    }
}

/// Delimiter joining member regions inside a region-group token.
pub const REGION_GROUP_DELIMITER: char = '+';

impl fmt::Debug for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Label({})", self.0)
    }
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Label {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for Label {
    fn from(s: String) -> Self {
        Self(Arc::from(s))
    }
}

impl Borrow<str> for Label {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for Label {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(feature = "serde")]
impl serde::Serialize for Label {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0)
    }
}

#[cfg(feature = "serde")]
impl<'de> serde::Deserialize<'de> for Label {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        Ok(Label::from(text))
    }
}

/// Domain-specific label aliases for clarity (no runtime cost).
pub type RegionId = Label;
pub type TechId = Label;
pub type CommodityId = Label;

/// Periods and vintages.
pub type Year = i32;

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeSet;

    #[test]
    fn label_orders_lexically() {
        let set: BTreeSet<Label> = ["ELC", "COAL", "DSL"].into_iter().map(Label::from).collect();
        let order: Vec<&str> = set.iter().map(Label::as_str).collect();
        assert_eq!(order, vec!["COAL", "DSL", "ELC"]);
    }

    #[test]
    fn label_lookup_by_str() {
        let set: BTreeSet<Label> = [Label::from("E01")].into_iter().collect();
        assert!(set.contains("E01"));
        assert!(!set.contains("E02"));
    }

    #[test]
    fn region_group_detection() {
        assert!(Label::from("R1+R2").is_region_group());
        assert!(!Label::from("R1").is_region_group());
        assert!(!Label::from("global").is_region_group());
    }
}

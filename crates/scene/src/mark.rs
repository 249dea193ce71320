//! Mark type enumeration and sets over it.

use bitflags::bitflags;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Category of visual primitive a mark item is drawn as.
///
/// The enumeration is closed: every drawable item carries exactly one of
/// these categories, and routing decisions are total over them.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MarkType {
    Arc,
    Area,
    Image,
    Line,
    Path,
    Rect,
    Rule,
    Shape,
    Symbol,
    Text,
    Trail,
}

impl MarkType {
    /// Every known mark type, in enumeration order.
    pub const ALL: [MarkType; 11] = [
        MarkType::Arc,
        MarkType::Area,
        MarkType::Image,
        MarkType::Line,
        MarkType::Path,
        MarkType::Rect,
        MarkType::Rule,
        MarkType::Shape,
        MarkType::Symbol,
        MarkType::Text,
        MarkType::Trail,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            MarkType::Arc => "arc",
            MarkType::Area => "area",
            MarkType::Image => "image",
            MarkType::Line => "line",
            MarkType::Path => "path",
            MarkType::Rect => "rect",
            MarkType::Rule => "rule",
            MarkType::Shape => "shape",
            MarkType::Symbol => "symbol",
            MarkType::Text => "text",
            MarkType::Trail => "trail",
        }
    }

    pub fn from_name(name: &str) -> Option<MarkType> {
        match name {
            "arc" => Some(MarkType::Arc),
            "area" => Some(MarkType::Area),
            "image" => Some(MarkType::Image),
            "line" => Some(MarkType::Line),
            "path" => Some(MarkType::Path),
            "rect" => Some(MarkType::Rect),
            "rule" => Some(MarkType::Rule),
            "shape" => Some(MarkType::Shape),
            "symbol" => Some(MarkType::Symbol),
            "text" => Some(MarkType::Text),
            "trail" => Some(MarkType::Trail),
            _ => None,
        }
    }
}

impl fmt::Display for MarkType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

bitflags! {
    /// A set of mark types.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
    pub struct MarkTypeSet: u16 {
        const ARC = 1 << 0;
        const AREA = 1 << 1;
        const IMAGE = 1 << 2;
        const LINE = 1 << 3;
        const PATH = 1 << 4;
        const RECT = 1 << 5;
        const RULE = 1 << 6;
        const SHAPE = 1 << 7;
        const SYMBOL = 1 << 8;
        const TEXT = 1 << 9;
        const TRAIL = 1 << 10;
    }
}

impl MarkTypeSet {
    #[inline]
    pub fn contains_mark(&self, mark: MarkType) -> bool {
        self.contains(mark.into())
    }

    #[inline]
    pub fn insert_mark(&mut self, mark: MarkType) {
        self.insert(mark.into());
    }

    /// Iterate the member mark types in enumeration order.
    pub fn iter_marks(&self) -> impl Iterator<Item = MarkType> + '_ {
        MarkType::ALL.into_iter().filter(|m| self.contains_mark(*m))
    }

    /// Number of member mark types.
    pub fn count(&self) -> usize {
        self.bits().count_ones() as usize
    }
}

impl From<MarkType> for MarkTypeSet {
    fn from(mark: MarkType) -> Self {
        match mark {
            MarkType::Arc => MarkTypeSet::ARC,
            MarkType::Area => MarkTypeSet::AREA,
            MarkType::Image => MarkTypeSet::IMAGE,
            MarkType::Line => MarkTypeSet::LINE,
            MarkType::Path => MarkTypeSet::PATH,
            MarkType::Rect => MarkTypeSet::RECT,
            MarkType::Rule => MarkTypeSet::RULE,
            MarkType::Shape => MarkTypeSet::SHAPE,
            MarkType::Symbol => MarkTypeSet::SYMBOL,
            MarkType::Text => MarkTypeSet::TEXT,
            MarkType::Trail => MarkTypeSet::TRAIL,
        }
    }
}

impl FromIterator<MarkType> for MarkTypeSet {
    fn from_iter<I: IntoIterator<Item = MarkType>>(iter: I) -> Self {
        let mut set = MarkTypeSet::empty();
        for mark in iter {
            set.insert_mark(mark);
        }
        set
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_name_round_trip() {
        for mark in MarkType::ALL {
            assert_eq!(MarkType::from_name(mark.name()), Some(mark));
        }
        assert_eq!(MarkType::from_name("sparkline"), None);
    }

    #[test]
    fn test_set_covers_enumeration() {
        let all: MarkTypeSet = MarkType::ALL.into_iter().collect();
        assert_eq!(all, MarkTypeSet::all());
        assert_eq!(all.count(), MarkType::ALL.len());
    }

    #[test]
    fn test_set_membership() {
        let set: MarkTypeSet = [MarkType::Text, MarkType::Rule].into_iter().collect();
        assert!(set.contains_mark(MarkType::Text));
        assert!(set.contains_mark(MarkType::Rule));
        assert!(!set.contains_mark(MarkType::Rect));

        let members: Vec<_> = set.iter_marks().collect();
        assert_eq!(members, vec![MarkType::Rule, MarkType::Text]);
    }
}

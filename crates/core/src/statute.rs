//! Statute registry value objects.

use serde::{Deserialize, Serialize};

/// The four list categories offered by the statute registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LawCategory {
    /// 全法令
    All,
    /// 憲法・法律
    ConstitutionAndStatutes,
    /// 政令・勅令
    CabinetAndImperialOrders,
    /// 府省令・規則
    MinisterialOrders,
}

impl LawCategory {
    pub const ALL: [LawCategory; 4] = [
        Self::All,
        Self::ConstitutionAndStatutes,
        Self::CabinetAndImperialOrders,
        Self::MinisterialOrders,
    ];

    /// The registry's category code, used verbatim as the URL suffix.
    pub fn code(&self) -> &'static str {
        match self {
            Self::All => "1",
            Self::ConstitutionAndStatutes => "2",
            Self::CabinetAndImperialOrders => "3",
            Self::MinisterialOrders => "4",
        }
    }

    /// Display label as shown by the registry.
    pub fn label(&self) -> &'static str {
        match self {
            Self::All => "全法令",
            Self::ConstitutionAndStatutes => "憲法・法律",
            Self::CabinetAndImperialOrders => "政令・勅令",
            Self::MinisterialOrders => "府省令・規則",
        }
    }

    pub fn from_code(code: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.code() == code.trim())
    }
}

impl std::fmt::Display for LawCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.label(), self.code())
    }
}

impl std::str::FromStr for LawCategory {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_code(s).ok_or_else(|| format!("unknown law category '{s}', expected 1-4"))
    }
}

/// One row of a statute list query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatuteSummary {
    /// Registry identifier (`LawId`)
    pub id: String,

    /// Statute name (`LawName`)
    pub name: String,

    /// Promulgation number (`LawNo`)
    pub number: String,
}

impl std::fmt::Display for StatuteSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.name, self.number)
    }
}

/// Full text of a fetched statute.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatuteContent {
    pub name: String,
    pub full_text: String,
}

impl StatuteContent {
    pub fn new(name: impl Into<String>, full_text: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            full_text: full_text.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn category_codes_are_one_to_four() {
        let codes: Vec<&str> = LawCategory::ALL.iter().map(|c| c.code()).collect();
        assert_eq!(codes, vec!["1", "2", "3", "4"]);
    }

    #[test]
    fn category_code_roundtrip() {
        for category in LawCategory::ALL {
            assert_eq!(LawCategory::from_code(category.code()), Some(category));
        }
        assert_eq!(LawCategory::from_code("5"), None);
        assert!("0".parse::<LawCategory>().is_err());
    }

    #[test]
    fn summary_display_matches_picker_format() {
        let summary = StatuteSummary {
            id: "129AC0000000089".into(),
            name: "民法".into(),
            number: "明治二十九年法律第八十九号".into(),
        };
        assert_eq!(summary.to_string(), "民法 (明治二十九年法律第八十九号)");
    }
}

//! Law numbers (法令番号), eras, and e-Gov style law identifiers.
//!
//! A law number such as `平成十七年法律第八十六号` names the era, the year
//! within the era, the kind of instrument, and its sequence number for that
//! year. Those four parts are enough to derive the e-Gov law id
//! (`417AC0000000086`) used as the join key by downstream stores.

use std::fmt;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::numeral::kanji_to_arabic;

/// Japanese era (元号) used in law numbers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Era {
    Meiji,
    Taisho,
    Showa,
    Heisei,
    Reiwa,
}

impl Era {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "明治" => Some(Self::Meiji),
            "大正" => Some(Self::Taisho),
            "昭和" => Some(Self::Showa),
            "平成" => Some(Self::Heisei),
            "令和" => Some(Self::Reiwa),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Meiji => "明治",
            Self::Taisho => "大正",
            Self::Showa => "昭和",
            Self::Heisei => "平成",
            Self::Reiwa => "令和",
        }
    }

    /// Gregorian year of 元年.
    pub fn first_year(&self) -> u32 {
        match self {
            Self::Meiji => 1868,
            Self::Taisho => 1912,
            Self::Showa => 1926,
            Self::Heisei => 1989,
            Self::Reiwa => 2019,
        }
    }

    /// Leading digit of e-Gov law ids.
    pub fn code(&self) -> u8 {
        match self {
            Self::Meiji => 1,
            Self::Taisho => 2,
            Self::Showa => 3,
            Self::Heisei => 4,
            Self::Reiwa => 5,
        }
    }
}

/// Kind of statutory instrument.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LawKind {
    Constitution,
    Act,
    CabinetOrder,
    ImperialOrdinance,
    MinisterialOrdinance,
    Rule,
    Ordinance,
    Notice,
    Circular,
    Directive,
    Other,
}

impl LawKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Constitution => "constitution",
            Self::Act => "act",
            Self::CabinetOrder => "cabinet_order",
            Self::ImperialOrdinance => "imperial_ordinance",
            Self::MinisterialOrdinance => "ministerial_ordinance",
            Self::Rule => "rule",
            Self::Ordinance => "ordinance",
            Self::Notice => "notice",
            Self::Circular => "circular",
            Self::Directive => "directive",
            Self::Other => "other",
        }
    }

    /// Classify the instrument word of a law number (`法律`, `政令`, ...).
    pub fn from_instrument(s: &str) -> Self {
        match s {
            "憲法" => Self::Constitution,
            "法律" => Self::Act,
            "政令" => Self::CabinetOrder,
            "勅令" => Self::ImperialOrdinance,
            _ if s.ends_with("省令") || s.ends_with("府令") => Self::MinisterialOrdinance,
            _ if s.ends_with("規則") => Self::Rule,
            _ => Self::Other,
        }
    }

    /// Classify a law title by its suffix (`…施行令` is a cabinet order).
    pub fn from_title(title: &str) -> Self {
        const SUFFIXES: &[(&str, LawKind)] = &[
            ("憲法", LawKind::Constitution),
            ("施行令", LawKind::CabinetOrder),
            ("政令", LawKind::CabinetOrder),
            ("施行規則", LawKind::MinisterialOrdinance),
            ("省令", LawKind::MinisterialOrdinance),
            ("府令", LawKind::MinisterialOrdinance),
            ("規則", LawKind::Rule),
            ("条例", LawKind::Ordinance),
            ("告示", LawKind::Notice),
            ("通達", LawKind::Circular),
            ("訓令", LawKind::Directive),
            ("法律", LawKind::Act),
            ("法", LawKind::Act),
        ];
        SUFFIXES
            .iter()
            .find(|(suffix, _)| title.ends_with(suffix))
            .map(|(_, kind)| *kind)
            .unwrap_or(Self::Other)
    }

    /// e-Gov type code, where the id scheme is derivable from the number alone.
    pub fn type_code(&self) -> Option<&'static str> {
        match self {
            Self::Act => Some("AC"),
            Self::CabinetOrder => Some("CO"),
            Self::ImperialOrdinance => Some("IO"),
            _ => None,
        }
    }
}

static LAW_NUMBER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^(明治|大正|昭和|平成|令和)(元|[0-9０-９〇一二三四五六七八九十百]+)年([^\s第]{2,12}?)第([0-9０-９〇一二三四五六七八九十百千]+)号$",
    )
    .expect("law number pattern is valid")
});

/// A parsed law number (`昭和二十二年法律第四十九号`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LawNumber {
    pub era: Era,
    pub year: u32,
    pub kind: LawKind,
    pub instrument: String,
    pub number: u32,
}

impl LawNumber {
    pub fn parse(s: &str) -> Option<Self> {
        let caps = LAW_NUMBER.captures(s.trim())?;
        let era = Era::parse(caps.get(1)?.as_str())?;
        let year = match caps.get(2)?.as_str() {
            "元" => 1,
            y => kanji_to_arabic(y),
        };
        let instrument = caps.get(3)?.as_str().to_string();
        let number = kanji_to_arabic(caps.get(4)?.as_str());
        if year == 0 || number == 0 {
            return None;
        }
        Some(Self {
            era,
            year,
            kind: LawKind::from_instrument(&instrument),
            instrument,
            number,
        })
    }

    pub fn gregorian_year(&self) -> u32 {
        self.era.first_year() + self.year - 1
    }

    /// e-Gov law id (`417AC0000000086`), for acts, cabinet orders, and
    /// imperial ordinances.
    pub fn law_id(&self) -> Option<String> {
        let code = self.kind.type_code()?;
        Some(format!(
            "{}{:02}{}{:010}",
            self.era.code(),
            self.year,
            code,
            self.number
        ))
    }
}

impl fmt::Display for LawNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let year = if self.year == 1 {
            "元".to_string()
        } else {
            crate::numeral::arabic_to_kanji(self.year)
        };
        write!(
            f,
            "{}{}年{}第{}号",
            self.era.as_str(),
            year,
            self.instrument,
            crate::numeral::arabic_to_kanji(self.number)
        )
    }
}

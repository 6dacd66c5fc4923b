// src/models.rs

use crate::error::StoolError;
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Stool shape on the Bristol scale, types 1 through 7.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ShapeType {
    #[default]
    HardLumps,
    LumpySausage,
    CrackedSausage,
    SmoothSnake,
    SoftBlobs,
    Mushy,
    Watery,
}

impl ShapeType {
    pub const ALL: [ShapeType; 7] = [
        ShapeType::HardLumps,
        ShapeType::LumpySausage,
        ShapeType::CrackedSausage,
        ShapeType::SmoothSnake,
        ShapeType::SoftBlobs,
        ShapeType::Mushy,
        ShapeType::Watery,
    ];

    /// 1-based position on the Bristol scale.
    pub fn number(self) -> u8 {
        match self {
            ShapeType::HardLumps => 1,
            ShapeType::LumpySausage => 2,
            ShapeType::CrackedSausage => 3,
            ShapeType::SmoothSnake => 4,
            ShapeType::SoftBlobs => 5,
            ShapeType::Mushy => 6,
            ShapeType::Watery => 7,
        }
    }

    pub fn from_number(n: u8) -> Option<ShapeType> {
        ShapeType::ALL.iter().copied().find(|s| s.number() == n)
    }

    pub fn name(self) -> &'static str {
        match self {
            ShapeType::HardLumps => "Hard lumps, like stones or nuts",
            ShapeType::LumpySausage => "Sausage-shaped feces with lumps",
            ShapeType::CrackedSausage => "Sausage-shaped feces with cracks",
            ShapeType::SmoothSnake => "Soft snake-like feces",
            ShapeType::SoftBlobs => "Feces in the form of soft lumps",
            ShapeType::Mushy => "Porous and soft feces",
            ShapeType::Watery => "Watery stool",
        }
    }

    pub fn category(self) -> Category {
        match self {
            ShapeType::HardLumps | ShapeType::LumpySausage => Category::Constipation,
            ShapeType::CrackedSausage | ShapeType::SmoothSnake | ShapeType::SoftBlobs => {
                Category::Normal
            }
            ShapeType::Mushy | ShapeType::Watery => Category::Diarrhea,
        }
    }
}

impl FromStr for ShapeType {
    type Err = StoolError;

    /// Accepts a scale number ("4") or the serialized key ("smooth-snake").
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if let Ok(n) = s.parse::<u8>() {
            return ShapeType::from_number(n).ok_or_else(|| {
                StoolError::InvalidInput(format!("Shape must be between 1 and 7, got {}", n))
            });
        }
        serde_json::from_value(serde_json::Value::String(s.to_ascii_lowercase()))
            .map_err(|_| StoolError::InvalidInput(format!("Unknown shape: {}", s)))
    }
}

/// Coarse grouping of shapes, used to highlight calendar days.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    Constipation,
    Normal,
    Diarrhea,
}

impl Category {
    pub fn label(self) -> &'static str {
        match self {
            Category::Constipation => "Constipation",
            Category::Normal => "Normal",
            Category::Diarrhea => "Diarrhea",
        }
    }

    pub fn emoji(self) -> &'static str {
        match self {
            Category::Constipation => "🟠",
            Category::Normal => "🟤",
            Category::Diarrhea => "💩",
        }
    }

    /// Single-letter marker for a calendar cell.
    pub fn marker(self) -> char {
        match self {
            Category::Constipation => 'c',
            Category::Normal => 'n',
            Category::Diarrhea => 'd',
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Size {
    XS,
    S,
    M,
    L,
    XL,
}

impl Size {
    pub const ALL: [Size; 5] = [Size::XS, Size::S, Size::M, Size::L, Size::XL];

    pub fn code(self) -> &'static str {
        match self {
            Size::XS => "XS",
            Size::S => "S",
            Size::M => "M",
            Size::L => "L",
            Size::XL => "XL",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Size::XS => "Extra Small",
            Size::S => "Small",
            Size::M => "Medium",
            Size::L => "Large",
            Size::XL => "Extra Large",
        }
    }
}

impl FromStr for Size {
    type Err = StoolError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        Size::ALL
            .iter()
            .copied()
            .find(|size| size.code().eq_ignore_ascii_case(s))
            .ok_or_else(|| {
                StoolError::InvalidInput(format!("Unknown size: {} (use XS, S, M, L or XL)", s))
            })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Color {
    #[serde(rename = "#D2B48C")]
    Tan,
    #[serde(rename = "#8B4513")]
    Brown,
    #[serde(rename = "#A0522D")]
    Sienna,
    #[serde(rename = "#000000")]
    Black,
    #[serde(rename = "#DAA520")]
    Goldenrod,
    #[serde(rename = "#556B2F")]
    OliveGreen,
    #[serde(rename = "#808080")]
    Gray,
}

impl Color {
    pub const ALL: [Color; 7] = [
        Color::Tan,
        Color::Brown,
        Color::Sienna,
        Color::Black,
        Color::Goldenrod,
        Color::OliveGreen,
        Color::Gray,
    ];

    pub fn hex(self) -> &'static str {
        match self {
            Color::Tan => "#D2B48C",
            Color::Brown => "#8B4513",
            Color::Sienna => "#A0522D",
            Color::Black => "#000000",
            Color::Goldenrod => "#DAA520",
            Color::OliveGreen => "#556B2F",
            Color::Gray => "#808080",
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Color::Tan => "tan",
            Color::Brown => "brown",
            Color::Sienna => "sienna",
            Color::Black => "black",
            Color::Goldenrod => "goldenrod",
            Color::OliveGreen => "olive",
            Color::Gray => "gray",
        }
    }
}

impl FromStr for Color {
    type Err = StoolError;

    /// Accepts a hex code with or without the leading '#', or a color name.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let hex = s.trim_start_matches('#');
        Color::ALL
            .iter()
            .copied()
            .find(|c| c.hex()[1..].eq_ignore_ascii_case(hex) || c.name().eq_ignore_ascii_case(s))
            .ok_or_else(|| StoolError::InvalidInput(format!("Unknown color: {}", s)))
    }
}

/// One recorded entry. Serialized field names match the stored slot layout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogEntry {
    pub shape_type: ShapeType,
    pub size: Option<Size>,
    pub color: Option<Color>,
    pub has_blood: bool,
    pub has_pain: bool,
    pub notes: String,
    pub timestamp: NaiveDateTime, // 本地时间，不带时区
}

impl LogEntry {
    pub fn category(&self) -> Category {
        self.shape_type.category()
    }

    /// Short summary such as "Medium, Blood".
    pub fn description(&self) -> String {
        let mut parts = Vec::new();
        if let Some(size) = self.size {
            parts.push(size.label());
        }
        if self.has_blood {
            parts.push("Blood");
        }
        if self.has_pain {
            parts.push("Pain");
        }
        if parts.is_empty() {
            "No details".to_string()
        } else {
            parts.join(", ")
        }
    }
}

/// The selections a user makes before confirming a new entry.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EntryDraft {
    pub shape_type: Option<ShapeType>,
    pub size: Option<Size>,
    pub color: Option<Color>,
    pub has_blood: bool,
    pub has_pain: bool,
    pub notes: String,
}

impl EntryDraft {
    pub fn into_entry(self, timestamp: NaiveDateTime) -> LogEntry {
        LogEntry {
            shape_type: self.shape_type.unwrap_or_default(),
            size: self.size,
            color: self.color,
            has_blood: self.has_blood,
            has_pain: self.has_pain,
            notes: self.notes,
            timestamp,
        }
    }
}

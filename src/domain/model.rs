use crate::utils::validation::validate_hex_color;
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

/// One item of the intranet module list, as returned by the portal.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawRecord {
    #[serde(default)]
    pub code: String,
    #[serde(default, rename = "codeinstance")]
    pub instance: String,
    #[serde(default)]
    pub title: String,
    #[serde(default, deserialize_with = "lenient_u32")]
    pub semester: Option<u32>,
    #[serde(default, deserialize_with = "lenient_u32")]
    pub credits: Option<u32>,
    #[serde(default, deserialize_with = "lenient_u32")]
    pub scolaryear: Option<u32>,
    #[serde(default)]
    pub instance_location: Option<String>,
    #[serde(default)]
    pub begin: Option<String>,
    #[serde(default)]
    pub end: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default, deserialize_with = "lenient_bool")]
    pub student_registered: Option<bool>,
    #[serde(default, deserialize_with = "lenient_u32")]
    pub student_credits: Option<u32>,
}

impl RawRecord {
    pub fn credit_value(&self) -> u32 {
        self.credits.unwrap_or(0)
    }

    pub fn is_registered(&self) -> bool {
        if let Some(registered) = self.student_registered {
            return registered;
        }
        match self.status.as_deref() {
            Some("notregistered") | Some("") | None => false,
            Some(_) => true,
        }
    }

    pub fn is_validated(&self) -> bool {
        self.status.as_deref() == Some("valid") || self.student_credits.unwrap_or(0) > 0
    }

    /// Credit-bearing module offered at `location` (any location when `None`).
    pub fn is_relevant(&self, location: Option<&str>) -> bool {
        if self.credit_value() == 0 {
            return false;
        }
        match location {
            Some(wanted) => self.instance_location.as_deref() == Some(wanted),
            None => true,
        }
    }
}

/// The module list comes either wrapped in `{"items": [...]}` or as a bare array.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum ModulesPayload {
    Envelope { items: Vec<RawRecord> },
    List(Vec<RawRecord>),
}

impl ModulesPayload {
    pub fn into_records(self) -> Vec<RawRecord> {
        match self {
            ModulesPayload::Envelope { items } => items,
            ModulesPayload::List(items) => items,
        }
    }
}

fn lenient_u32<'de, D>(deserializer: D) -> std::result::Result<Option<u32>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(value.and_then(|v| match v {
        serde_json::Value::Number(n) => n
            .as_u64()
            .or_else(|| n.as_f64().filter(|f| *f >= 0.0).map(|f| f as u64))
            .and_then(|n| u32::try_from(n).ok()),
        serde_json::Value::String(s) => s.trim().parse().ok(),
        serde_json::Value::Bool(b) => Some(u32::from(b)),
        _ => None,
    }))
}

fn lenient_bool<'de, D>(deserializer: D) -> std::result::Result<Option<bool>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(value.and_then(|v| match v {
        serde_json::Value::Bool(b) => Some(b),
        serde_json::Value::Number(n) => n.as_i64().map(|n| n != 0),
        serde_json::Value::String(s) => match s.trim() {
            "1" | "true" => Some(true),
            "0" | "false" => Some(false),
            _ => None,
        },
        _ => None,
    }))
}

/// Records of the semester chosen for the run.
#[derive(Debug, Clone, PartialEq)]
pub struct SemesterRecords {
    pub semester: u32,
    pub records: Vec<RawRecord>,
}

/// A project/module of the selected semester, placed on the week grid.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Module {
    pub code: String,
    pub name: String,
    pub category: String,
    pub start_week: u32,
    pub end_week: u32,
    pub credits: u32,
    pub registered: bool,
    pub validated: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct HexColor(pub u32);

impl HexColor {
    pub fn parse(value: &str) -> Option<Self> {
        validate_hex_color("color", value).ok()?;
        u32::from_str_radix(value.trim_start_matches('#'), 16)
            .ok()
            .map(HexColor)
    }

    /// Blend toward white; `factor` 0.0 keeps the color, 1.0 gives white.
    pub fn lighten(self, factor: f64) -> Self {
        let factor = factor.clamp(0.0, 1.0);
        let channel = |shift: u32| {
            let c = f64::from((self.0 >> shift) & 0xFF);
            (c + (255.0 - c) * factor) as u32
        };
        HexColor((channel(16) << 16) | (channel(8) << 8) | channel(0))
    }
}

impl fmt::Display for HexColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:06X}", self.0)
    }
}

impl<'de> Deserialize<'de> for HexColor {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        HexColor::parse(&raw)
            .ok_or_else(|| serde::de::Error::custom(format!("invalid RRGGBB color '{}'", raw)))
    }
}

impl Serialize for HexColor {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Totals {
    pub available: u32,
    pub registered: u32,
    pub bonus: u32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryGroup {
    pub category: String,
    pub modules: Vec<Module>,
    pub total_credits: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Aggregate {
    pub groups: Vec<CategoryGroup>,
    pub bonus_category: String,
    pub bonus_modules: Vec<Module>,
    pub bonus_available: u32,
    pub totals: Totals,
}

/// Row/column placement of every cell the sheet writer emits.
///
/// Column 0 holds labels, week `w` sits in column `w`, followed by the
/// credits column and the registration marker column.
#[derive(Debug, Clone, PartialEq)]
pub struct CellPlan {
    pub sheet_name: String,
    pub week_count: u32,
    pub header_rows: u32,
    pub rows: Vec<PlanRow>,
}

impl CellPlan {
    pub const NAME_COL: u16 = 0;

    /// Column of week `week`, saturating at the last sheet column.
    pub fn week_col(week: u32) -> u16 {
        u16::try_from(week).unwrap_or(u16::MAX)
    }

    pub fn credits_col(&self) -> u16 {
        Self::week_col(self.week_count.saturating_add(1))
    }

    pub fn reg_col(&self) -> u16 {
        Self::week_col(self.week_count.saturating_add(2))
    }

    pub fn module_rows(&self) -> impl Iterator<Item = (u32, &ModuleRow)> {
        self.rows.iter().filter_map(|row| match &row.kind {
            RowKind::Module(module) => Some((row.index, module)),
            _ => None,
        })
    }

    pub fn total(&self, kind: TotalKind) -> Option<u32> {
        self.rows.iter().find_map(|row| match &row.kind {
            RowKind::Total { kind: k, credits } if *k == kind => Some(*credits),
            _ => None,
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PlanRow {
    pub index: u32,
    pub kind: RowKind,
}

#[derive(Debug, Clone, PartialEq)]
pub enum RowKind {
    MonthHeader { months: Vec<MonthSpan> },
    WeekHeader { weeks: Vec<u32> },
    WeekDates { labels: Vec<String> },
    CategoryHeader { label: String, bonus: bool },
    Module(ModuleRow),
    Subtotal { label: String, credits: u32, bonus: bool },
    Separator,
    Total { kind: TotalKind, credits: u32 },
}

/// Consecutive weeks whose Monday falls in the same month.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MonthSpan {
    pub label: String,
    pub first_week: u32,
    pub last_week: u32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ModuleRow {
    pub label: String,
    pub category: String,
    pub credits: u32,
    pub registered: bool,
    pub validated: bool,
    pub bonus: bool,
    pub bar: Option<Bar>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Bar {
    pub start_col: u16,
    pub span: u16,
    pub fill: HexColor,
}

impl Bar {
    pub fn end_col(&self) -> u16 {
        self.start_col + self.span - 1
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TotalKind {
    Available,
    Registered,
    Bonus,
}

impl TotalKind {
    pub fn label(&self) -> &'static str {
        match self {
            TotalKind::Available => "TOTAL AVAILABLE",
            TotalKind::Registered => "TOTAL REGISTERED",
            TotalKind::Bonus => "TOTAL BONUS (validated)",
        }
    }
}

#[derive(Debug, Clone)]
pub struct TransformResult {
    pub semester: u32,
    pub module_count: usize,
    pub totals: Totals,
    pub plan: CellPlan,
}

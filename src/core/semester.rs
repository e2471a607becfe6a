//! Semester selection and the Monday-aligned week grid modules are placed on.

use crate::core::palette::CategoryPalette;
use crate::domain::model::{Module, MonthSpan, RawRecord, SemesterRecords};
use crate::utils::error::{Result, StrategyError};
use chrono::{Datelike, Duration, NaiveDate, NaiveDateTime};

/// Longest week grid a sheet is drawn with; later weeks are clipped.
pub const MAX_WEEK_COUNT: u32 = 60;

/// Latest semester number carried by any record.
pub fn detect_semester(records: &[RawRecord]) -> Option<u32> {
    records
        .iter()
        .filter_map(|record| record.semester)
        .filter(|semester| *semester > 0)
        .max()
}

/// Keep the records of `requested`, or of the latest semester when `None`.
///
/// An explicitly requested semester that no record carries is an error; an
/// empty payload without a request falls back to semester 1.
pub fn select_semester(records: Vec<RawRecord>, requested: Option<u32>) -> Result<SemesterRecords> {
    let semester = match requested {
        Some(semester) => {
            if !records.iter().any(|record| record.semester == Some(semester)) {
                return Err(StrategyError::NotFoundError { semester });
            }
            semester
        }
        None => detect_semester(&records).unwrap_or(1),
    };

    let records = records
        .into_iter()
        .filter(|record| record.semester == Some(semester))
        .collect();

    Ok(SemesterRecords { semester, records })
}

pub fn parse_date(value: &str) -> Option<NaiveDate> {
    let value = value.trim();
    NaiveDateTime::parse_from_str(value, "%Y-%m-%d %H:%M:%S")
        .map(|dt| dt.date())
        .or_else(|_| NaiveDate::parse_from_str(value, "%Y-%m-%d"))
        .ok()
}

fn monday_of(date: NaiveDate) -> NaiveDate {
    date - Duration::days(i64::from(date.weekday().num_days_from_monday()))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Semester {
    pub number: u32,
    pub week_count: u32,
    /// Monday of the first week, when any record carries a date.
    pub start: Option<NaiveDate>,
}

impl Semester {
    pub fn new(number: u32, week_count: u32) -> Self {
        Self {
            number,
            week_count: week_count.min(MAX_WEEK_COUNT),
            start: None,
        }
    }

    pub fn from_records(
        number: u32,
        records: &[RawRecord],
        week_override: Option<u32>,
        default_week_count: u32,
    ) -> Self {
        let dates: Vec<NaiveDate> = records
            .iter()
            .flat_map(|record| [record.begin.as_deref(), record.end.as_deref()])
            .flatten()
            .filter_map(parse_date)
            .collect();

        let start = dates.iter().min().copied().map(monday_of);
        let mut semester = Self {
            number,
            week_count: default_week_count.min(MAX_WEEK_COUNT),
            start,
        };

        if let Some(latest) = dates.iter().max() {
            let weeks = semester.week_of(*latest);
            if weeks > MAX_WEEK_COUNT {
                tracing::warn!(
                    "Semester {} spans {} weeks (until {}); clipping the grid to {}",
                    number,
                    weeks,
                    latest,
                    MAX_WEEK_COUNT
                );
            }
            semester.week_count = weeks.min(MAX_WEEK_COUNT);
        }
        if let Some(weeks) = week_override {
            semester.week_count = weeks.min(MAX_WEEK_COUNT);
        }

        tracing::debug!(
            "Semester {} grid: {} weeks starting {:?}",
            number,
            semester.week_count,
            semester.start
        );
        semester
    }

    /// 1-based week index of `date`; dates before the grid land in week 1.
    pub fn week_of(&self, date: NaiveDate) -> u32 {
        match self.start {
            Some(start) => {
                let days = (date - start).num_days().max(0);
                (days / 7) as u32 + 1
            }
            None => 1,
        }
    }

    /// `dd/mm` of each week's Monday.
    pub fn week_labels(&self) -> Option<Vec<String>> {
        let start = self.start?;
        Some(
            (0..self.week_count)
                .map(|offset| {
                    (start + Duration::weeks(i64::from(offset)))
                        .format("%d/%m")
                        .to_string()
                })
                .collect(),
        )
    }

    /// Weeks grouped by the month of their Monday, labelled `%b %Y`.
    pub fn month_spans(&self) -> Option<Vec<MonthSpan>> {
        let start = self.start?;
        let mut spans: Vec<MonthSpan> = Vec::new();
        for week in 1..=self.week_count {
            let monday = start + Duration::weeks(i64::from(week - 1));
            let label = monday.format("%b %Y").to_string();
            match spans.last_mut() {
                Some(span) if span.label == label => span.last_week = week,
                _ => spans.push(MonthSpan {
                    label,
                    first_week: week,
                    last_week: week,
                }),
            }
        }
        Some(spans)
    }

    /// Place `record` on this grid. Missing begin/end dates stretch the
    /// module to the first/last week.
    pub fn module_from(&self, record: &RawRecord, palette: &CategoryPalette) -> Module {
        let start_week = record
            .begin
            .as_deref()
            .and_then(parse_date)
            .map(|date| self.week_of(date))
            .unwrap_or(1);
        let end_week = record
            .end
            .as_deref()
            .and_then(parse_date)
            .map(|date| self.week_of(date))
            .unwrap_or(self.week_count)
            .max(start_week);

        Module {
            code: record.code.clone(),
            name: self.display_name(record),
            category: palette.resolve(&record.code).name.clone(),
            start_week,
            end_week,
            credits: record.credit_value(),
            registered: record.is_registered(),
            validated: record.is_validated(),
        }
    }

    fn display_name(&self, record: &RawRecord) -> String {
        let prefix = format!("G{} - ", self.number);
        let title = record.title.trim();
        let name = title.strip_prefix(prefix.as_str()).unwrap_or(title);
        if name.is_empty() {
            record.code.clone()
        } else {
            name.to_string()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(semester: u32, begin: &str, end: &str) -> RawRecord {
        RawRecord {
            code: "G-AIA-500".to_string(),
            title: format!("G{} - Machine Learning", semester),
            semester: Some(semester),
            credits: Some(4),
            begin: Some(begin.to_string()),
            end: Some(end.to_string()),
            status: Some("ongoing".to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn test_detect_semester_picks_maximum() {
        let records = vec![
            record(3, "2024-09-30", "2024-10-20"),
            record(5, "2024-09-30", "2024-10-20"),
            RawRecord::default(),
        ];
        assert_eq!(detect_semester(&records), Some(5));
        assert_eq!(detect_semester(&[]), None);
    }

    #[test]
    fn test_select_semester_explicit_and_auto() {
        let records = vec![
            record(3, "2024-09-30", "2024-10-20"),
            record(5, "2024-09-30", "2024-10-20"),
        ];

        let auto = select_semester(records.clone(), None).unwrap();
        assert_eq!(auto.semester, 5);
        assert_eq!(auto.records.len(), 1);

        let explicit = select_semester(records.clone(), Some(3)).unwrap();
        assert_eq!(explicit.semester, 3);
        assert_eq!(explicit.records.len(), 1);

        let missing = select_semester(records, Some(9));
        assert!(matches!(
            missing,
            Err(StrategyError::NotFoundError { semester: 9 })
        ));
    }

    #[test]
    fn test_select_semester_empty_payload_defaults_to_one() {
        let selected = select_semester(Vec::new(), None).unwrap();
        assert_eq!(selected.semester, 1);
        assert!(selected.records.is_empty());
    }

    #[test]
    fn test_parse_date_formats() {
        let expected = NaiveDate::from_ymd_opt(2024, 10, 7);
        assert_eq!(parse_date("2024-10-07"), expected);
        assert_eq!(parse_date("2024-10-07 08:42:00"), expected);
        assert_eq!(parse_date("07/10/2024"), None);
    }

    #[test]
    fn test_grid_is_monday_aligned() {
        // 2024-10-02 is a Wednesday; the grid starts on Monday 2024-09-30.
        let records = vec![
            record(5, "2024-10-02", "2024-10-13"),
            record(5, "2024-10-14", "2024-11-01"),
        ];
        let semester = Semester::from_records(5, &records, None, 18);

        assert_eq!(semester.start, NaiveDate::from_ymd_opt(2024, 9, 30));
        assert_eq!(semester.week_count, 5);

        let labels = semester.week_labels().unwrap();
        assert_eq!(labels[0], "30/09");
        assert_eq!(labels[1], "07/10");

        let palette = CategoryPalette::builtin();
        let first = semester.module_from(&records[0], &palette);
        assert_eq!((first.start_week, first.end_week), (1, 2));
        let second = semester.module_from(&records[1], &palette);
        assert_eq!((second.start_week, second.end_week), (3, 5));
        assert_eq!(second.name, "Machine Learning");
        assert_eq!(second.category, "AI & Machine Learning");
        assert!(second.registered);
    }

    #[test]
    fn test_month_spans_group_weeks_by_monday() {
        let records = vec![record(5, "2024-09-30", "2024-11-04")];
        let semester = Semester::from_records(5, &records, None, 18);
        assert_eq!(semester.week_count, 6);

        let spans = semester.month_spans().unwrap();
        let bounds: Vec<_> = spans
            .iter()
            .map(|span| (span.label.as_str(), span.first_week, span.last_week))
            .collect();
        assert_eq!(
            bounds,
            vec![("Sep 2024", 1, 1), ("Oct 2024", 2, 5), ("Nov 2024", 6, 6)]
        );
        assert!(Semester::new(5, 10).month_spans().is_none());
    }

    #[test]
    fn test_outlier_dates_are_clipped_to_max_grid() {
        let records = vec![
            record(5, "2024-09-30", "2024-10-20"),
            record(5, "2024-10-01", "2424-01-01"),
        ];
        let semester = Semester::from_records(5, &records, None, 18);
        assert_eq!(semester.start, NaiveDate::from_ymd_opt(2024, 9, 30));
        assert_eq!(semester.week_count, MAX_WEEK_COUNT);

        let long = semester.module_from(&records[1], &CategoryPalette::builtin());
        assert_eq!(long.start_week, 1);
        assert!(long.end_week > MAX_WEEK_COUNT);

        let ancient = vec![record(5, "0001-01-01", "2024-10-20")];
        let semester = Semester::from_records(5, &ancient, None, 18);
        assert_eq!(semester.week_count, MAX_WEEK_COUNT);
        assert_eq!(semester.month_spans().unwrap().last().unwrap().last_week, MAX_WEEK_COUNT);

        assert_eq!(Semester::new(5, 500).week_count, MAX_WEEK_COUNT);
    }

    #[test]
    fn test_week_override_and_undated_grid() {
        let records = vec![record(5, "2024-09-30", "2024-12-20")];
        let semester = Semester::from_records(5, &records, Some(4), 18);
        assert_eq!(semester.week_count, 4);

        let undated = RawRecord {
            code: "G-INN-010".to_string(),
            title: "Hub project".to_string(),
            semester: Some(5),
            credits: Some(2),
            ..Default::default()
        };
        let semester = Semester::from_records(5, std::slice::from_ref(&undated), None, 18);
        assert_eq!(semester.start, None);
        assert_eq!(semester.week_count, 18);
        assert!(semester.week_labels().is_none());

        let module = semester.module_from(&undated, &CategoryPalette::builtin());
        assert_eq!((module.start_week, module.end_week), (1, 18));
        assert_eq!(module.name, "Hub project");
    }
}

//! Turns an [`Aggregate`] into the row/column plan of the timeline sheet.

use crate::core::palette::CategoryPalette;
use crate::core::semester::Semester;
use crate::domain::model::{
    Aggregate, Bar, CellPlan, Module, ModuleRow, PlanRow, RowKind, TotalKind,
};

pub const DEFAULT_UNREGISTERED_LIGHTEN: f64 = 0.5;

/// Clip an inclusive week range to `[1, week_count]`.
///
/// Returns the starting column and the span, or `None` when nothing of
/// the range is visible.
pub fn clip_span(start_week: u32, end_week: u32, week_count: u32) -> Option<(u16, u16)> {
    let start = start_week.max(1);
    let end = end_week.min(week_count);
    if week_count == 0 || start > end {
        return None;
    }
    let start_col = u16::try_from(start).ok()?;
    let span = u16::try_from(end - start + 1).ok()?;
    Some((start_col, span))
}

pub struct LayoutEngine<'a> {
    palette: &'a CategoryPalette,
    unregistered_lighten: f64,
}

impl<'a> LayoutEngine<'a> {
    pub fn new(palette: &'a CategoryPalette) -> Self {
        Self {
            palette,
            unregistered_lighten: DEFAULT_UNREGISTERED_LIGHTEN,
        }
    }

    pub fn with_unregistered_lighten(mut self, factor: f64) -> Self {
        self.unregistered_lighten = factor;
        self
    }

    pub fn layout(&self, aggregate: &Aggregate, semester: &Semester) -> CellPlan {
        let mut rows = PlanBuilder::default();

        if let Some(months) = semester.month_spans() {
            rows.push(RowKind::MonthHeader { months });
        }
        rows.push(RowKind::WeekHeader {
            weeks: (1..=semester.week_count).collect(),
        });
        if let Some(labels) = semester.week_labels() {
            rows.push(RowKind::WeekDates { labels });
        }
        let header_rows = rows.next_index;

        for group in aggregate.groups.iter().filter(|g| !g.modules.is_empty()) {
            rows.push(RowKind::CategoryHeader {
                label: group.category.clone(),
                bonus: false,
            });
            for module in &group.modules {
                rows.push(RowKind::Module(self.module_row(module, false, semester)));
            }
            rows.push(RowKind::Subtotal {
                label: format!("Subtotal {}", group.category),
                credits: group.total_credits,
                bonus: false,
            });
        }
        rows.push(RowKind::Separator);

        if !aggregate.bonus_modules.is_empty() {
            rows.push(RowKind::CategoryHeader {
                label: format!("{} (bonus credits)", aggregate.bonus_category.to_uppercase()),
                bonus: true,
            });
            for module in &aggregate.bonus_modules {
                rows.push(RowKind::Module(self.module_row(module, true, semester)));
            }
            rows.push(RowKind::Subtotal {
                label: format!("Subtotal {}", aggregate.bonus_category),
                credits: aggregate.bonus_available,
                bonus: true,
            });
            rows.push(RowKind::Separator);
        }

        let totals = aggregate.totals;
        for (kind, credits) in [
            (TotalKind::Available, totals.available),
            (TotalKind::Registered, totals.registered),
            (TotalKind::Bonus, totals.bonus),
        ] {
            rows.push(RowKind::Total { kind, credits });
        }

        CellPlan {
            sheet_name: format!("Semester {}", semester.number),
            week_count: semester.week_count,
            header_rows,
            rows: rows.rows,
        }
    }

    fn module_row(&self, module: &Module, bonus: bool, semester: &Semester) -> ModuleRow {
        let base = self.palette.color_for(&module.category);
        let fill = if module.registered {
            base
        } else {
            base.lighten(self.unregistered_lighten)
        };

        let bar = clip_span(module.start_week, module.end_week, semester.week_count)
            .map(|(start_col, span)| Bar {
                start_col,
                span,
                fill,
            });
        if bar.is_none() {
            tracing::debug!(
                "Module '{}' (weeks {}-{}) is outside the {}-week grid",
                module.name,
                module.start_week,
                module.end_week,
                semester.week_count
            );
        }

        ModuleRow {
            label: module.name.clone(),
            category: module.category.clone(),
            credits: module.credits,
            registered: module.registered,
            validated: module.validated,
            bonus,
            bar,
        }
    }
}

#[derive(Default)]
struct PlanBuilder {
    rows: Vec<PlanRow>,
    next_index: u32,
}

impl PlanBuilder {
    fn push(&mut self, kind: RowKind) {
        self.rows.push(PlanRow {
            index: self.next_index,
            kind,
        });
        self.next_index += 1;
    }
}

//! XLSX rendering of a [`CellPlan`].
//!
//! The workbook is built entirely in memory and handed to a [`Storage`] in
//! one write, so a failed run never leaves a truncated file behind.

use crate::domain::model::{Bar, CellPlan, ModuleRow, RowKind, TotalKind};
use crate::domain::ports::Storage;
use crate::utils::error::Result;
use rust_xlsxwriter::{Format, FormatAlign, FormatBorder, Workbook, Worksheet};

const BORDER_COLOR: u32 = 0xD9D9D9;
const HEADER_COLOR: u32 = 0x5B9BD5;
const REGISTERED_GREEN: u32 = 0x228B22;
const BONUS_PURPLE: u32 = 0x9966FF;
const REGISTERED_MARK: &str = "✓";

struct SheetFormats {
    header: Format,
    week_date: Format,
    category: Format,
    bonus_category: Format,
    name_registered: Format,
    name_unregistered: Format,
    name_bonus: Format,
    week_empty: Format,
    credits: Format,
    credits_bonus: Format,
    marker: Format,
    marker_bonus: Format,
    subtotal_label: Format,
    subtotal_value: Format,
    total_label: Format,
    total_value: Format,
    registered_label: Format,
    registered_value: Format,
    bonus_label: Format,
    bonus_value: Format,
}

impl SheetFormats {
    fn new() -> Self {
        let bordered = || {
            Format::new()
                .set_border(FormatBorder::Thin)
                .set_border_color(BORDER_COLOR)
        };
        let centered = || {
            bordered()
                .set_align(FormatAlign::Center)
                .set_align(FormatAlign::VerticalCenter)
        };

        Self {
            header: centered()
                .set_bold()
                .set_font_size(10)
                .set_font_color(0xFFFFFF)
                .set_background_color(HEADER_COLOR),
            week_date: centered()
                .set_font_size(8)
                .set_font_color(0x666666)
                .set_background_color(0xF2F2F2),
            category: bordered()
                .set_bold()
                .set_italic()
                .set_font_size(9)
                .set_font_color(0x666666)
                .set_background_color(0xE7E6E6),
            bonus_category: bordered()
                .set_bold()
                .set_italic()
                .set_font_size(9)
                .set_font_color(BONUS_PURPLE)
                .set_background_color(0xF3E5F5),
            name_registered: bordered().set_bold().set_font_size(9).set_text_wrap(),
            name_unregistered: bordered()
                .set_font_size(9)
                .set_font_color(0x999999)
                .set_text_wrap(),
            name_bonus: bordered().set_italic().set_font_size(9).set_text_wrap(),
            week_empty: bordered(),
            credits: centered().set_bold(),
            credits_bonus: centered().set_italic().set_font_color(BONUS_PURPLE),
            marker: centered()
                .set_bold()
                .set_font_size(12)
                .set_font_color(REGISTERED_GREEN)
                .set_background_color(0xD4EDDA),
            marker_bonus: centered()
                .set_bold()
                .set_font_size(12)
                .set_font_color(BONUS_PURPLE)
                .set_background_color(0xE8D5F0),
            subtotal_label: Format::new().set_italic().set_font_size(9),
            subtotal_value: Format::new()
                .set_italic()
                .set_bold()
                .set_align(FormatAlign::Center),
            total_label: Format::new().set_bold().set_font_size(10),
            total_value: Format::new()
                .set_bold()
                .set_font_size(10)
                .set_align(FormatAlign::Center),
            registered_label: Format::new()
                .set_bold()
                .set_font_size(10)
                .set_font_color(REGISTERED_GREEN),
            registered_value: Format::new()
                .set_bold()
                .set_font_size(10)
                .set_font_color(REGISTERED_GREEN)
                .set_align(FormatAlign::Center),
            bonus_label: Format::new()
                .set_bold()
                .set_italic()
                .set_font_size(10)
                .set_font_color(BONUS_PURPLE),
            bonus_value: Format::new()
                .set_bold()
                .set_italic()
                .set_font_size(10)
                .set_font_color(BONUS_PURPLE)
                .set_align(FormatAlign::Center),
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct XlsxSheetWriter;

impl XlsxSheetWriter {
    pub fn new() -> Self {
        Self
    }

    /// Render the plan, then store it at `path` in a single write.
    pub async fn write<S: Storage>(&self, storage: &S, plan: &CellPlan, path: &str) -> Result<String> {
        let bytes = self.render_to_bytes(plan)?;
        tracing::debug!("Writing workbook ({} bytes) to {}", bytes.len(), path);
        storage.write_file(path, &bytes).await
    }

    pub fn render_to_bytes(&self, plan: &CellPlan) -> Result<Vec<u8>> {
        let mut workbook = Workbook::new();
        let formats = SheetFormats::new();

        let sheet = workbook.add_worksheet();
        sheet.set_name(plan.sheet_name.as_str())?;

        for row in &plan.rows {
            let r = row.index;
            match &row.kind {
                RowKind::MonthHeader { months } => {
                    sheet.write_blank(r, CellPlan::NAME_COL, &formats.header)?;
                    for month in months {
                        let first = CellPlan::week_col(month.first_week);
                        let last = CellPlan::week_col(month.last_week);
                        if last > first {
                            sheet.merge_range(r, first, r, last, month.label.as_str(), &formats.header)?;
                        } else {
                            sheet.write_string_with_format(r, first, month.label.as_str(), &formats.header)?;
                        }
                    }
                    sheet.write_blank(r, plan.credits_col(), &formats.header)?;
                    sheet.write_blank(r, plan.reg_col(), &formats.header)?;
                }
                RowKind::WeekHeader { weeks } => {
                    sheet.write_string_with_format(r, CellPlan::NAME_COL, "Module", &formats.header)?;
                    for week in weeks {
                        sheet.write_number_with_format(
                            r,
                            CellPlan::week_col(*week),
                            f64::from(*week),
                            &formats.header,
                        )?;
                    }
                    sheet.write_string_with_format(r, plan.credits_col(), "Credits", &formats.header)?;
                    sheet.write_string_with_format(r, plan.reg_col(), "Reg.", &formats.header)?;
                }
                RowKind::WeekDates { labels } => {
                    sheet.write_blank(r, CellPlan::NAME_COL, &formats.week_date)?;
                    for (week, label) in (1..).zip(labels) {
                        sheet.write_string_with_format(r, CellPlan::week_col(week), label.as_str(), &formats.week_date)?;
                    }
                    sheet.write_blank(r, plan.credits_col(), &formats.week_date)?;
                    sheet.write_blank(r, plan.reg_col(), &formats.week_date)?;
                }
                RowKind::CategoryHeader { label, bonus } => {
                    let format = if *bonus { &formats.bonus_category } else { &formats.category };
                    sheet.write_string_with_format(r, CellPlan::NAME_COL, format!("  {}", label), format)?;
                    for col in 1..=plan.reg_col() {
                        sheet.write_blank(r, col, format)?;
                    }
                }
                RowKind::Module(module) => {
                    Self::write_module_row(sheet, plan, r, module, &formats)?;
                }
                RowKind::Subtotal { label, credits, .. } => {
                    sheet.write_string_with_format(r, CellPlan::NAME_COL, label.as_str(), &formats.subtotal_label)?;
                    sheet.write_number_with_format(r, plan.credits_col(), f64::from(*credits), &formats.subtotal_value)?;
                }
                RowKind::Separator => {}
                RowKind::Total { kind, credits } => {
                    let (label_format, value_format) = match kind {
                        TotalKind::Available => (&formats.total_label, &formats.total_value),
                        TotalKind::Registered => (&formats.registered_label, &formats.registered_value),
                        TotalKind::Bonus => (&formats.bonus_label, &formats.bonus_value),
                    };
                    sheet.write_string_with_format(r, CellPlan::NAME_COL, kind.label(), label_format)?;
                    sheet.write_number_with_format(r, plan.credits_col(), f64::from(*credits), value_format)?;
                }
            }
        }

        sheet.set_column_width(CellPlan::NAME_COL, 28)?;
        for week in 1..plan.credits_col() {
            sheet.set_column_width(week, 5.5)?;
        }
        sheet.set_column_width(plan.credits_col(), 7)?;
        sheet.set_column_width(plan.reg_col(), 5)?;
        for row in plan.header_rows..plan.rows.len() as u32 {
            sheet.set_row_height(row, 18)?;
        }
        sheet.set_freeze_panes(plan.header_rows, 1)?;

        Ok(workbook.save_to_buffer()?)
    }

    fn write_module_row(
        sheet: &mut Worksheet,
        plan: &CellPlan,
        r: u32,
        module: &ModuleRow,
        formats: &SheetFormats,
    ) -> Result<()> {
        let name_format = match (module.bonus, module.registered) {
            (true, _) => &formats.name_bonus,
            (false, true) => &formats.name_registered,
            (false, false) => &formats.name_unregistered,
        };
        sheet.write_string_with_format(r, CellPlan::NAME_COL, module.label.as_str(), name_format)?;

        for col in 1..plan.credits_col() {
            let covered = module
                .bar
                .is_some_and(|bar| col >= bar.start_col && col <= bar.end_col());
            if !covered {
                sheet.write_blank(r, col, &formats.week_empty)?;
            }
        }
        if let Some(bar) = module.bar {
            Self::write_bar(sheet, r, &bar)?;
        }

        let credits_format = if module.bonus { &formats.credits_bonus } else { &formats.credits };
        sheet.write_number_with_format(r, plan.credits_col(), f64::from(module.credits), credits_format)?;

        if module.registered {
            let marker_format = if module.bonus { &formats.marker_bonus } else { &formats.marker };
            sheet.write_string_with_format(r, plan.reg_col(), REGISTERED_MARK, marker_format)?;
        } else {
            sheet.write_blank(r, plan.reg_col(), &formats.week_empty)?;
        }
        Ok(())
    }

    fn write_bar(sheet: &mut Worksheet, r: u32, bar: &Bar) -> Result<()> {
        let fill = Format::new()
            .set_background_color(bar.fill.0)
            .set_border(FormatBorder::Thin)
            .set_border_color(BORDER_COLOR);

        // A merged range needs at least two cells.
        if bar.span > 1 {
            sheet.merge_range(r, bar.start_col, r, bar.end_col(), "", &fill)?;
        } else {
            sheet.write_blank(r, bar.start_col, &fill)?;
        }
        Ok(())
    }
}

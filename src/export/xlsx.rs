use std::{fs, path::Path};

use anyhow::{Context, Result};
use rust_xlsxwriter::{Color, Format, FormatAlign, FormatBorder, Workbook, Worksheet};

use crate::export::ReportRow;

/// 大標題下緣的顏色
const TITLE_BORDER_COLOR: u32 = 0x3FAD08;
/// 大標題與表頭各佔一列
const DATA_START_ROW: u32 = 2;

fn title_format() -> Format {
    Format::new()
        .set_align(FormatAlign::Center)
        .set_align(FormatAlign::VerticalCenter)
        .set_bold()
        .set_font_name("Calibri")
        .set_font_size(16)
        .set_font_color(Color::Black)
        .set_border_bottom(FormatBorder::Medium)
        .set_border_bottom_color(Color::RGB(TITLE_BORDER_COLOR))
}

fn cell_format() -> Format {
    Format::new()
        .set_align(FormatAlign::Center)
        .set_align(FormatAlign::VerticalCenter)
        .set_font_name("Calibri")
        .set_font_size(10)
        .set_font_color(Color::Black)
}

/// 將報表寫成 xlsx
///
/// 第一列為合併的大標題，第二列為表頭，兩列都凍結。
/// 同一家公司連續的資料列（最多 `merge_num` 列）合併 A、B 兩欄，讓指標共用名稱。
/// 任何一個儲存格寫入失敗都會中止，並且不留下檔案。
pub fn write(
    rows: &[ReportRow],
    headers: &[String],
    title: &str,
    merge_num: usize,
    path: &Path,
) -> Result<()> {
    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet();

    fill(worksheet, rows, headers, title, merge_num).context("Failed to build the worksheet")?;

    if let Err(why) = workbook.save(path) {
        if path.exists() {
            let _ = fs::remove_file(path);
        }
        return Err(why).with_context(|| format!("Failed to save {}", path.display()));
    }

    Ok(())
}

fn fill(
    worksheet: &mut Worksheet,
    rows: &[ReportRow],
    headers: &[String],
    title: &str,
    merge_num: usize,
) -> Result<()> {
    let last_col = headers.len().saturating_sub(1) as u16;
    let cell = cell_format();

    worksheet.set_row_height(0, 40)?;
    if last_col > 0 {
        worksheet.merge_range(0, 0, 0, last_col, title, &title_format())?;
    } else {
        worksheet.write_string_with_format(0, 0, title, &title_format())?;
    }

    for (col, header) in headers.iter().enumerate() {
        worksheet.write_string_with_format(1, col as u16, header, &cell)?;
    }

    for col in 2..=last_col {
        worksheet.set_column_width(col, 20)?;
    }

    worksheet.set_freeze_panes(DATA_START_ROW, 0)?;

    for (index, row) in rows.iter().enumerate() {
        let line = DATA_START_ROW + index as u32;

        worksheet.write_number_with_format(line, 0, row.id as f64, &cell)?;
        worksheet.write_string_with_format(line, 1, &row.stock_name, &cell)?;
        worksheet.write_string_with_format(line, 2, &row.target_name, &cell)?;
        for (offset, value) in row.values.iter().enumerate() {
            worksheet.write_number_with_format(line, 3 + offset as u16, *value, &cell)?;
        }
    }

    for (first, last) in merge_groups(rows, merge_num) {
        // 單一儲存格不能合併
        if first == last {
            continue;
        }

        let head = &rows[first];
        let first_line = DATA_START_ROW + first as u32;
        let last_line = DATA_START_ROW + last as u32;

        worksheet.merge_range(first_line, 0, last_line, 0, "", &cell)?;
        worksheet.write_number_with_format(first_line, 0, head.id as f64, &cell)?;
        worksheet.merge_range(first_line, 1, last_line, 1, "", &cell)?;
        worksheet.write_string_with_format(first_line, 1, &head.stock_name, &cell)?;
    }

    Ok(())
}

/// 同一家公司連續的列為一組，每組最多 `merge_num` 列，回傳每組第一列與最後一列的位置
///
/// 資料齊全時每 `merge_num` 列一組；缺少某些指標的公司只會合併自己的列。
fn merge_groups(rows: &[ReportRow], merge_num: usize) -> Vec<(usize, usize)> {
    let mut groups = Vec::new();
    if merge_num == 0 {
        return groups;
    }

    let mut start = 0;
    for index in 1..=rows.len() {
        let boundary = index == rows.len()
            || rows[index].id != rows[start].id
            || index - start == merge_num;

        if boundary && index > start {
            groups.push((start, index - 1));
            start = index;
        }
    }

    groups
}

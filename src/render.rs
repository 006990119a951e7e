//! CSV rendering for the line-item ledger.

use crate::aggregator::{LedgerRow, OrderTimestamp};
use crate::models::NumberStyle;

pub const CSV_HEADER: &str = "Date,Time,YYMMDD,YYMM,Order ID,Item,Quantity,\
Nominal Unit (VND),Effective Unit (VND),Nominal Total (VND),\
Effective Total (VND),Saved (VND),Note";

const UNKNOWN_DATE: &str = "unknown";
const NOT_AVAILABLE: &str = "N/A";

/// Free text goes into the CSV quoted, with embedded commas flattened to
/// spaces and embedded quotes doubled.
pub fn escape_text(raw: &str) -> String {
    let cleaned = raw.replace(',', " ").replace('"', "\"\"");
    format!("\"{}\"", cleaned)
}

/// Round to a whole amount and group digits by thousands.
pub fn group_thousands(amount: f64) -> String {
    let rounded = amount.round() as i64;
    let digits = rounded.unsigned_abs().to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    if rounded < 0 {
        format!("-{}", grouped)
    } else {
        grouped
    }
}

pub fn format_money(amount: f64, style: NumberStyle) -> String {
    match style {
        NumberStyle::QuotedThousands => format!("\"{}\"", group_thousands(amount)),
        NumberStyle::PlainDecimal => format!("{:.2}", amount),
    }
}

fn date_columns(ts: OrderTimestamp) -> [String; 4] {
    match ts {
        OrderTimestamp::Known(dt) => [
            dt.format("%d/%m/%Y").to_string(),
            dt.format("%H:%M:%S").to_string(),
            dt.format("%y%m%d").to_string(),
            dt.format("%y%m").to_string(),
        ],
        OrderTimestamp::Unknown => [
            UNKNOWN_DATE.to_string(),
            NOT_AVAILABLE.to_string(),
            NOT_AVAILABLE.to_string(),
            NOT_AVAILABLE.to_string(),
        ],
    }
}

pub fn render_row(row: &LedgerRow, style: NumberStyle) -> String {
    let [date, time, yymmdd, yymm] = date_columns(row.timestamp);
    [
        date,
        time,
        yymmdd,
        yymm,
        row.order_id.clone(),
        escape_text(&row.item.name),
        row.item.quantity.to_string(),
        format_money(row.item.nominal_unit, style),
        format_money(row.item.effective_unit, style),
        format_money(row.item.nominal_line, style),
        format_money(row.item.effective_line, style),
        format_money(row.item.saved, style),
        row.note.clone(),
    ]
    .join(",")
}

/// Assemble the full document: BOM so spreadsheet tools detect UTF-8,
/// header row, then one row per line item.
pub fn render_csv(rows: &[LedgerRow], style: NumberStyle) -> String {
    let mut out = String::from("\u{feff}");
    out.push_str(CSV_HEADER);
    for row in rows {
        out.push('\n');
        out.push_str(&render_row(row, style));
    }
    out
}

//! Text rendering for the stock and history tables.

use chrono::{DateTime, Local, TimeZone};

use stockroom_core::{ItemType, OperatorId};
use stockroom_inventory::{StockLevel, Transaction};

const EMPTY_STOCK: &str = "No items in stock";
const EMPTY_HISTORY: &str = "No transactions recorded";

/// `dd/mm/yyyy HH:MM`, the way the history table shows dates.
pub fn format_date<Tz>(date: &DateTime<Tz>) -> String
where
    Tz: TimeZone,
    Tz::Offset: core::fmt::Display,
{
    date.format("%d/%m/%Y %H:%M").to_string()
}

fn render_line<'a>(cells: impl Iterator<Item = &'a str>, widths: &[usize]) -> String {
    cells
        .zip(widths)
        .map(|(cell, width)| format!("{cell:<width$}"))
        .collect::<Vec<_>>()
        .join("  ")
        .trim_end()
        .to_string()
}

fn table(headers: &[&str], rows: &[Vec<String>]) -> String {
    let mut widths: Vec<usize> = headers.iter().map(|h| h.chars().count()).collect();
    for row in rows {
        for (i, cell) in row.iter().enumerate() {
            widths[i] = widths[i].max(cell.chars().count());
        }
    }
    let rule: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();

    let mut out = Vec::with_capacity(rows.len() + 2);
    out.push(render_line(headers.iter().copied(), &widths));
    out.push(render_line(rule.iter().map(String::as_str), &widths));
    for row in rows {
        out.push(render_line(row.iter().map(String::as_str), &widths));
    }
    out.join("\n")
}

/// Stock table, in the order given (callers pass it sorted by type).
pub fn render_stock(levels: &[StockLevel]) -> String {
    if levels.is_empty() {
        return EMPTY_STOCK.to_string();
    }

    let rows: Vec<Vec<String>> = levels
        .iter()
        .map(|level| {
            let quantity = if level.quantity == 0 {
                "0 (out of stock)".to_string()
            } else {
                level.quantity.to_string()
            };
            vec![level.item_type.to_string(), quantity]
        })
        .collect();

    table(&["Item type", "Quantity"], &rows)
}

/// History table, in the order given (callers pass it most recent first).
pub fn render_history(history: &[Transaction]) -> String {
    render_history_in(history, &Local)
}

fn render_history_in<Tz>(history: &[Transaction], tz: &Tz) -> String
where
    Tz: TimeZone,
    Tz::Offset: core::fmt::Display,
{
    if history.is_empty() {
        return EMPTY_HISTORY.to_string();
    }

    let rows: Vec<Vec<String>> = history
        .iter()
        .map(|tx| {
            vec![
                format_date(&tx.date.with_timezone(tz)),
                tx.item_type.to_string(),
                tx.movement().label().to_string(),
                tx.quantity.to_string(),
                tx.service
                    .as_deref()
                    .filter(|s| !s.trim().is_empty())
                    .unwrap_or("-")
                    .to_string(),
                tx.operator.to_string(),
            ]
        })
        .collect();

    table(&["Date", "Item type", "Movement", "Quantity", "Service", "Operator"], &rows)
}

pub fn render_types(types: &[ItemType]) -> String {
    types.iter().map(ItemType::to_string).collect::<Vec<_>>().join("\n")
}

pub fn render_operators(operators: &[OperatorId]) -> String {
    operators.iter().map(OperatorId::to_string).collect::<Vec<_>>().join("\n")
}

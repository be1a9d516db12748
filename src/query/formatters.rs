use crate::repository::{OwnerStats, StoredOwner};
use chrono::DateTime;
use comfy_table::{Cell, Table, modifiers::UTF8_ROUND_CORNERS, presets::UTF8_FULL};
use csv::Writer;
use serde_json::json;

#[derive(Debug, Clone)]
pub enum OutputFormat {
    Table,
    Json,
    Csv,
}

impl From<&str> for OutputFormat {
    fn from(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "json" => OutputFormat::Json,
            "csv" => OutputFormat::Csv,
            _ => OutputFormat::Table,
        }
    }
}

/// Renders unix seconds as a UTC date, falling back to the raw value.
pub fn format_timestamp(timestamp: &str) -> String {
    timestamp
        .parse::<i64>()
        .ok()
        .and_then(|secs| DateTime::from_timestamp(secs, 0))
        .map_or_else(
            || timestamp.to_string(),
            |dt| dt.format("%Y-%m-%d %H:%M:%S UTC").to_string(),
        )
}

pub fn format_owners(owners: &[StoredOwner], format: &OutputFormat) -> String {
    match format {
        OutputFormat::Table => format_owners_table(owners),
        OutputFormat::Json => format_owners_json(owners),
        OutputFormat::Csv => format_owners_csv(owners),
    }
}

fn format_owners_table(owners: &[StoredOwner]) -> String {
    if owners.is_empty() {
        return "No owner changes found.".to_string();
    }

    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_header(vec![
            "ID",
            "New Owner",
            "Timestamp",
            "Transaction Hash",
            "Block Number",
        ]);

    for owner in owners {
        table.add_row(vec![
            Cell::new(owner.id),
            Cell::new(&owner.record.new_owner_address),
            Cell::new(format_timestamp(&owner.record.timestamp)),
            Cell::new(&owner.record.transaction_hash),
            Cell::new(&owner.record.block_number),
        ]);
    }

    table.to_string()
}

fn format_owners_json(owners: &[StoredOwner]) -> String {
    let json_owners: Vec<_> = owners
        .iter()
        .map(|o| {
            json!({
                "id": o.id,
                "new_owner_address": o.record.new_owner_address,
                "timestamp": o.record.timestamp,
                "date": format_timestamp(&o.record.timestamp),
                "transaction_hash": o.record.transaction_hash,
                "block_number": o.record.block_number,
            })
        })
        .collect();

    serde_json::to_string_pretty(&json_owners).unwrap_or_else(|_| "[]".to_string())
}

fn format_owners_csv(owners: &[StoredOwner]) -> String {
    let mut wtr = Writer::from_writer(vec![]);

    let _ = wtr.write_record([
        "id",
        "new_owner_address",
        "timestamp",
        "transaction_hash",
        "block_number",
    ]);

    for owner in owners {
        let _ = wtr.write_record([
            &owner.id.to_string(),
            &owner.record.new_owner_address,
            &owner.record.timestamp,
            &owner.record.transaction_hash,
            &owner.record.block_number,
        ]);
    }

    String::from_utf8(wtr.into_inner().unwrap_or_default()).unwrap_or_default()
}

pub fn format_stats(stats: &OwnerStats, format: &OutputFormat) -> String {
    let block = |b: Option<u64>| b.map_or("N/A".to_string(), |b| b.to_string());

    match format {
        OutputFormat::Table => {
            let mut table = Table::new();
            table
                .load_preset(UTF8_FULL)
                .apply_modifier(UTF8_ROUND_CORNERS)
                .set_header(vec!["Metric", "Value"]);

            table.add_row(vec![
                Cell::new("Owner Changes"),
                Cell::new(stats.total_records),
            ]);
            table.add_row(vec![
                Cell::new("Unique Owners"),
                Cell::new(stats.unique_owners),
            ]);
            table.add_row(vec![
                Cell::new("Earliest Block"),
                Cell::new(block(stats.earliest_block)),
            ]);
            table.add_row(vec![
                Cell::new("Latest Block"),
                Cell::new(block(stats.latest_block)),
            ]);

            table.to_string()
        }
        OutputFormat::Json => serde_json::to_string_pretty(&json!({
            "owner_changes": stats.total_records,
            "unique_owners": stats.unique_owners,
            "earliest_block": stats.earliest_block,
            "latest_block": stats.latest_block,
        }))
        .unwrap_or_else(|_| "{}".to_string()),
        OutputFormat::Csv => {
            let mut wtr = Writer::from_writer(vec![]);
            let _ = wtr.write_record(["metric", "value"]);
            let _ = wtr.write_record(["owner_changes", &stats.total_records.to_string()]);
            let _ = wtr.write_record(["unique_owners", &stats.unique_owners.to_string()]);
            let _ = wtr.write_record(["earliest_block", &block(stats.earliest_block)]);
            let _ = wtr.write_record(["latest_block", &block(stats.latest_block)]);
            String::from_utf8(wtr.into_inner().unwrap_or_default()).unwrap_or_default()
        }
    }
}

use anyhow::{Result, bail};
use std::process;
use tabled::{
    Table, Tabled,
    settings::{Alignment, Modify, Style, object::Columns},
};

use crate::config::Config;
use gluco_core::agent::mood_score;
use gluco_core::models::{GlucoseStatus, LogEntry, LogKind};
use gluco_core::service::AgentService;

use super::current_profile;

#[derive(Tabled)]
struct HistoryRow {
    #[tabled(rename = "When")]
    when: String,
    #[tabled(rename = "Value")]
    value: String,
    #[tabled(rename = "Detail")]
    detail: String,
}

fn history_row(entry: &LogEntry) -> HistoryRow {
    let (value, detail) = match entry.kind {
        LogKind::Cgm => {
            let reading = entry.value_int.unwrap_or_default();
            (
                format!("{reading} mg/dL"),
                GlucoseStatus::from_reading(reading).label().to_string(),
            )
        }
        LogKind::Mood => {
            let label = entry.value_text.clone().unwrap_or_default();
            let score = mood_score(&label);
            (label, format!("{score}/5"))
        }
        LogKind::Food => (entry.value_text.clone().unwrap_or_default(), String::new()),
    };
    HistoryRow {
        when: entry.created_at.clone(),
        value,
        detail,
    }
}

/// Readings the agent server has recorded for the logged-in user, newest first.
pub(crate) fn cmd_history(config: &Config, kind: &str, limit: i64, json: bool) -> Result<()> {
    if !(1..=500).contains(&limit) {
        bail!("Limit must be between 1 and 500");
    }
    let kind: LogKind = kind.parse()?;
    let profile = current_profile(config)?;

    let service = AgentService::new(&config.db_path)?;
    let entries = service.get_logs(&profile.user_id, Some(kind), limit)?;

    if entries.is_empty() {
        if json {
            println!("[]");
        } else {
            eprintln!(
                "No {} entries recorded for {}.",
                kind.as_str().to_lowercase(),
                profile.display_name()
            );
        }
        process::exit(2);
    }

    if json {
        println!("{}", serde_json::to_string_pretty(&entries)?);
        return Ok(());
    }

    let rows: Vec<HistoryRow> = entries.iter().map(history_row).collect();
    let table = Table::new(&rows)
        .with(Style::rounded())
        .with(Modify::new(Columns::single(1)).with(Alignment::right()))
        .to_string();
    println!("{table}");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(kind: LogKind, text: Option<&str>, int: Option<i64>) -> LogEntry {
        LogEntry {
            id: 1,
            user_id: "1001".to_string(),
            kind,
            value_text: text.map(str::to_string),
            value_int: int,
            created_at: "2026-01-01 08:00:00".to_string(),
        }
    }

    #[test]
    fn cgm_row_shows_status() {
        let row = history_row(&entry(LogKind::Cgm, None, Some(180)));
        assert_eq!(row.value, "180 mg/dL");
        assert_eq!(row.detail, GlucoseStatus::High.label());
    }

    #[test]
    fn mood_row_shows_score() {
        let row = history_row(&entry(LogKind::Mood, Some("Happy"), None));
        assert_eq!(row.value, "Happy");
        assert_eq!(row.detail, "5/5");
    }

    #[test]
    fn food_row_has_no_detail() {
        let row = history_row(&entry(LogKind::Food, Some("idli and sambar"), None));
        assert_eq!(row.value, "idli and sambar");
        assert!(row.detail.is_empty());
    }
}

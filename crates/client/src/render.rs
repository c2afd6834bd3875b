//! Plain-text rendering for the terminal front-end.

use std::fmt::Write as _;

use tokio::task::JoinHandle;
use trafficdesk_core::{FineBand, Personnel, Profile, Rule, ViolationRecord};

use crate::notify::{Notification, Notifier, Severity};
use crate::views::DashboardCard;

/// Spawn the single notification renderer. Returns `None` when one is
/// already attached.
pub fn spawn_notification_renderer(notifier: &Notifier) -> Option<JoinHandle<()>> {
    let mut rx = notifier.attach_renderer()?;
    Some(tokio::spawn(async move {
        while rx.changed().await.is_ok() {
            let note = rx.borrow_and_update().clone();
            if let Some(line) = notification_line(&note) {
                println!("{line}");
            }
        }
    }))
}

pub fn notification_line(note: &Notification) -> Option<String> {
    if !note.visible {
        return None;
    }
    let tag = match note.severity {
        Severity::Success => "ok",
        Severity::Error => "error",
        Severity::Info => "info",
        Severity::Warning => "warn",
    };
    Some(format!("[{tag}] {}", note.message))
}

fn band_label(band: FineBand) -> &'static str {
    match band {
        FineBand::Low => "low",
        FineBand::Medium => "medium",
        FineBand::High => "high",
    }
}

pub fn personnel_table(users: &[Personnel]) -> String {
    if users.is_empty() {
        return "No personnel found.\n".to_string();
    }
    let mut out = format!(
        "{:<26} {:<24} {:<10} {:<8} {:<14} {}\n",
        "ID", "NAME", "BADGE", "ROLE", "MOBILE", "ADDRESS"
    );
    for u in users {
        let _ = writeln!(
            out,
            "{:<26} {:<24} {:<10} {:<8} {:<14} {}",
            u.id, u.name, u.badge_number, u.role, u.mobile, u.address
        );
    }
    out
}

pub fn rules_table(rules: &[&Rule]) -> String {
    if rules.is_empty() {
        return "No rules found.\n".to_string();
    }
    let mut out = format!("{:<26} {:<40} {:>12} {}\n", "ID", "TITLE", "FINE", "BAND");
    for rule in rules {
        let _ = writeln!(
            out,
            "{:<26} {:<40} {:>12} {}",
            rule.id,
            rule.title,
            rule.fine.to_string(),
            band_label(rule.fine.band())
        );
    }
    out
}

pub fn records_table(records: &[ViolationRecord]) -> String {
    if records.is_empty() {
        return "No records found.\n".to_string();
    }
    let mut out = format!(
        "{:<26} {:<24} {:<14} {:>4} {:>10} {:>12}\n",
        "ID", "NAME", "LICENSE", "AGE", "VIOLATIONS", "TOTAL"
    );
    for r in records {
        let _ = writeln!(
            out,
            "{:<26} {:<24} {:<14} {:>4} {:>10} {:>12}",
            r.id,
            r.name,
            r.license_num,
            r.age.map(|a| a.to_string()).unwrap_or_default(),
            r.violation_count(),
            r.total_fine().to_string()
        );
    }
    out
}

pub fn record_detail(record: &ViolationRecord) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{} ({})", record.name, record.license_num);
    let _ = writeln!(
        out,
        "  sex: {}  age: {}  dob: {}",
        record.sex,
        record.age.map(|a| a.to_string()).unwrap_or_else(|| "-".into()),
        record.dob
    );
    let _ = writeln!(out, "  address: {}", record.address);
    if let Some(image) = &record.image {
        let _ = writeln!(out, "  photo: {image}");
    }
    for v in record.violations() {
        let _ = writeln!(out, "  - {} ({})", v.title, v.fine);
    }
    let _ = writeln!(out, "  total: {}", record.total_fine());
    out
}

pub fn profile_block(profile: &Profile) -> String {
    format!(
        "name:    {}\nbadge:   {}\nrole:    {}\nmobile:  {}\naddress: {}\n",
        profile.name, profile.badge_number, profile.role, profile.mobile, profile.address
    )
}

pub fn dashboard_cards(cards: &[DashboardCard]) -> String {
    let mut out = String::new();
    for card in cards {
        let state = if card.enabled { "" } else { " (admin only)" };
        let _ = writeln!(out, "{:<20} {:<18} {}{state}", card.title, card.route, card.description);
    }
    out
}

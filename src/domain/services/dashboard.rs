use serde::Serialize;

use crate::domain::models::rsvp::Rsvp;

#[derive(Debug, Serialize, PartialEq, Eq)]
pub struct RsvpStats {
    pub total: usize,
    pub attending: usize,
    pub declined: usize,
    pub headcount: i64,
    pub capacity: i64,
    pub remaining: i64,
}

pub fn stats(rows: &[Rsvp], capacity: i64) -> RsvpStats {
    let attending = rows.iter().filter(|r| r.attending).count();
    let headcount: i64 = rows.iter().filter(|r| r.attending).map(|r| i64::from(r.guests)).sum();

    RsvpStats {
        total: rows.len(),
        attending,
        declined: rows.len() - attending,
        headcount,
        capacity,
        remaining: (capacity - headcount).max(0),
    }
}

/// `group` must match exactly (case-insensitive); `query` is a substring search over
/// names, email and group.
pub fn filter<'a>(rows: &'a [Rsvp], query: Option<&str>, group: Option<&str>) -> Vec<&'a Rsvp> {
    let needle = query.map(|q| q.trim().to_lowercase()).unwrap_or_default();
    let group_needle = group.map(|g| g.trim().to_lowercase()).unwrap_or_default();

    rows.iter()
        .filter(|r| group_needle.is_empty() || r.group_id.to_lowercase() == group_needle)
        .filter(|r| {
            needle.is_empty()
                || r.first_name.to_lowercase().contains(&needle)
                || r.last_name.to_lowercase().contains(&needle)
                || r.email.as_deref().unwrap_or_default().to_lowercase().contains(&needle)
                || r.group_id.to_lowercase().contains(&needle)
        })
        .collect()
}

/// Distinct non-empty group ids, sorted.
pub fn groups(rows: &[Rsvp]) -> Vec<String> {
    let mut groups: Vec<String> = rows.iter().filter_map(|r| r.group().map(str::to_string)).collect();
    groups.sort();
    groups.dedup();
    groups
}

//! Fixed demo data shown when a live load fails.

use crate::record::Record;

pub fn fallback_leads() -> Vec<Record> {
    vec![
        Record::from_pairs([
            ("sys_id", "1"),
            ("number", "LEAD0001"),
            ("first_name", "John"),
            ("last_name", "Smith"),
            ("company", "ABC Insurance"),
            ("email", "john.smith@example.com"),
            ("business_phone", "555-0101"),
            ("lead_type", "New Business"),
            ("lead_rating", "Hot"),
            ("stage", "Qualified"),
        ]),
        Record::from_pairs([
            ("sys_id", "2"),
            ("number", "LEAD0002"),
            ("first_name", "Sarah"),
            ("last_name", "Johnson"),
            ("company", "XYZ Corp"),
            ("email", "sarah.j@example.com"),
            ("business_phone", "555-0102"),
            ("lead_type", "Existing Business"),
            ("lead_rating", "Warm"),
            ("stage", "Contacted"),
        ]),
    ]
}

pub fn fallback_opportunities() -> Vec<Record> {
    vec![Record::from_pairs([
        ("sys_id", "1"),
        ("number", "OPP0001"),
        ("consumer", "Johnson Family"),
        ("short_description", "Life Insurance Policy"),
        ("amount", "$50,000"),
        ("industry", "Insurance"),
        ("rating", "High"),
        ("stage", "Propose"),
        ("sales_cycle_type", "Standard"),
    ])]
}

pub fn fallback_quotes() -> Vec<Record> {
    vec![Record::from_pairs([
        ("sys_id", "1"),
        ("number", "QTE0001"),
        ("description", "Auto Insurance Quote"),
        ("amount", "$1,200"),
        ("status", "Pending"),
        ("valid_until", "2025-01-31"),
    ])]
}

/// The recent feed has no demo entries.
pub fn fallback_recent() -> Vec<Record> {
    Vec::new()
}

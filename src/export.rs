//! Read-only squad summaries for sharing after the auction.

use serde::Serialize;

use crate::models::{Bidder, Item};

/// Downloadable squad document
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SquadExport {
    pub team_name: String,
    pub budget_used: u64,
    pub squad: Vec<SquadEntry>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SquadEntry {
    pub name: String,
    pub role: String,
    pub price: u64,
}

fn owned<'a>(bidder: &'a Bidder, items: &'a [Item]) -> impl Iterator<Item = &'a Item> + 'a {
    items
        .iter()
        .filter(move |item| item.owner_id.as_deref() == Some(bidder.id.as_str()))
}

/// Plain-text squad list with frozen winning prices
pub fn squad_summary(bidder: &Bidder, items: &[Item]) -> String {
    let mut text = format!("{} Squad:", bidder.name);
    for item in owned(bidder, items) {
        text.push_str(&format!(
            "\n- {} ({}): ₹{}",
            item.name,
            item.role.as_str(),
            group_thousands(item.current_bid)
        ));
    }
    text
}

pub fn squad_export(bidder: &Bidder, items: &[Item]) -> SquadExport {
    SquadExport {
        team_name: bidder.name.clone(),
        budget_used: bidder.spent,
        squad: owned(bidder, items)
            .map(|item| SquadEntry {
                name: item.name.clone(),
                role: item.role.as_str().to_string(),
                price: item.current_bid,
            })
            .collect(),
    }
}

/// `Mumbai Mavericks` -> `Mumbai_Mavericks_squad.json`
pub fn export_file_name(bidder: &Bidder) -> String {
    let stem = bidder.name.split_whitespace().collect::<Vec<_>>().join("_");
    format!("{}_squad.json", stem)
}

fn group_thousands(value: u64) -> String {
    let digits = value.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (idx, ch) in digits.chars().enumerate() {
        if idx > 0 && (digits.len() - idx) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

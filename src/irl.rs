//! Information request list (IRL) pack sent to the client before an update.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

const FINANCIALS: [&str; 3] = [
    "Trial balance FY",
    "Segmented P&L by service line",
    "Intercompany charges by counterparty",
];

const LEGAL: [&str; 3] = [
    "Latest org chart",
    "All intercompany agreements",
    "Board minutes re: restructuring",
];

const OPERATIONAL: [&str; 3] = [
    "Headcount by function",
    "KPIs / cost drivers",
    "Descriptions of services performed",
];

/// Grouped document requests plus a ready-to-send email
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InformationRequest {
    pub requests: BTreeMap<String, Vec<String>>,
    pub email: String,
}

impl InformationRequest {
    pub fn build(industry: &str, transactions: &str) -> Self {
        let requests: BTreeMap<String, Vec<String>> = [
            ("financials", &FINANCIALS),
            ("legal", &LEGAL),
            ("operational", &OPERATIONAL),
        ]
        .into_iter()
        .map(|(group, items)| {
            (
                group.to_string(),
                items.iter().map(|item| item.to_string()).collect(),
            )
        })
        .collect();

        let items: Vec<&str> = requests
            .values()
            .flat_map(|items| items.iter().map(String::as_str))
            .collect();

        let email = format!(
            "Dear Client,\n\nTo complete the FY TPD update for {}, please provide the following:\n- {}\n\nTransactions in scope: {}\n\nKind regards,\nTP Team",
            industry,
            items.join("\n- "),
            transactions
        );

        Self { requests, email }
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

//! `sopgate rules`

use crate::cli::{ListFormat, RulesArgs};
use anyhow::Result;
use sopgate_validate::{Category, Rule, RuleCatalog};
use std::str::FromStr;

pub fn run(args: &RulesArgs) -> Result<()> {
    let catalog = RuleCatalog::standard();
    let rules: Vec<&Rule> = match &args.category {
        Some(id) => catalog.rules_by_category(Category::from_str(id)?),
        None => catalog.rules().iter().collect(),
    };

    match args.format {
        ListFormat::Human => {
            for rule in rules {
                println!(
                    "{:<9} {:<16} {:<8} {}",
                    rule.id,
                    rule.category.as_str(),
                    rule.severity.to_string(),
                    rule.name
                );
            }
        }
        ListFormat::Json => {
            let listed: Vec<_> = rules
                .iter()
                .map(|rule| {
                    serde_json::json!({
                        "id": rule.id,
                        "name": rule.name,
                        "category": rule.category,
                        "severity": rule.severity,
                        "description": rule.description,
                        "remediation": rule.remediation,
                    })
                })
                .collect();
            println!("{}", serde_json::to_string_pretty(&listed)?);
        }
    }
    Ok(())
}

//! Report tier capability matrix.

use anyhow::Result;
use clap::Args;
use comfy_table::{Cell, Color, ContentArrangement, Table, presets::UTF8_FULL_CONDENSED};
use flexsort_core::{ReportFeature, ReportTier};

#[derive(Args, Debug)]
pub struct TiersArgs {
    /// Show a single tier (basic, standard, premium)
    pub tier: Option<ReportTier>,
}

pub fn run(args: TiersArgs) -> Result<()> {
    let tiers: Vec<ReportTier> = match args.tier {
        Some(tier) => vec![tier],
        None => ReportTier::ALL.to_vec(),
    };
    println!("{}", matrix(&tiers));
    Ok(())
}

fn matrix(tiers: &[ReportTier]) -> Table {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL_CONDENSED);
    table.set_content_arrangement(ContentArrangement::Dynamic);

    let mut header = vec![Cell::new("Feature").fg(Color::Cyan)];
    header.extend(tiers.iter().map(|t| Cell::new(t.as_str()).fg(Color::Cyan)));
    table.set_header(header);

    for feature in ReportFeature::ALL {
        let mut row = vec![Cell::new(feature.label())];
        row.extend(tiers.iter().map(|tier| {
            if tier.capabilities().allows(feature) {
                Cell::new("✓").fg(Color::Green)
            } else {
                Cell::new("-")
            }
        }));
        table.add_row(row);
    }
    table
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_matrix_has_a_row_per_feature() {
        let table = matrix(&ReportTier::ALL);
        assert_eq!(table.row_iter().count(), ReportFeature::ALL.len());
    }

    #[test]
    fn test_single_tier_matrix_renders() {
        let rendered = matrix(&[ReportTier::Basic]).to_string();
        assert!(rendered.contains("basic"));
        assert!(rendered.contains("Headline scores"));
        assert!(!rendered.contains("premium"));
    }
}

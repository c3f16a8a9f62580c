//! Example: Backfill dive-site history.
//!
//! Run with: cargo run --example generate_history [hours_back]

use divesim::DepthZone;
use divesim_testdata::{generate_history, BackfillConfig, Dataset, DatasetManifest};
use std::fs;

fn main() {
    println!("Divesim History Backfill");
    println!("========================\n");

    let hours_back: u32 = std::env::args()
        .nth(1)
        .and_then(|s| s.parse().ok())
        .unwrap_or(24);

    if let Err(e) = fs::create_dir_all("datasets") {
        eprintln!("Could not create datasets/: {}", e);
        return;
    }

    let config = BackfillConfig::new()
        .with_hours_back(hours_back)
        .with_seed(42);

    let dataset = match generate_history(&config) {
        Ok(d) => d
            .with_name(&format!("history_{}h", hours_back))
            .with_description("All sites, all depths, 10-minute samples"),
        Err(e) => {
            eprintln!("Backfill failed: {}", e);
            return;
        }
    };
    save(&dataset, "datasets/history");

    // One file per site for the surface station only
    for site in dataset.sites() {
        let subset = dataset
            .filter(Some(&site), Some(DepthZone::Surface))
            .with_name(&format!("{}_surface", site));
        save(&subset, &format!("datasets/{}_surface", site));
    }

    println!("\nBackfill complete!");
}

fn save(dataset: &Dataset, stem: &str) {
    let csv_path = format!("{}.csv", stem);
    if let Err(e) = dataset.to_csv(&csv_path) {
        eprintln!("  Warning: Could not save {}: {}", csv_path, e);
        return;
    }

    let manifest = DatasetManifest::from_dataset(dataset);
    let manifest_path = format!("{}.manifest.json", stem);
    if let Err(e) = manifest.to_json_file(&manifest_path) {
        eprintln!("  Warning: Could not save manifest: {}", e);
    }

    println!(
        "  Created {} ({} readings, {} alerts, {} events)",
        csv_path,
        manifest.sample_count,
        manifest.total_alerts(),
        manifest.event_count
    );
}

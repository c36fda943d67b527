//! Check command implementation.
//!
//! Validates configuration, view definitions and the status source.

use std::time::Duration;

use statline::{Sample, View};

use crate::config::{validate_effective_config, Config, DEFAULT_INTERVAL, DEFAULT_VIEW};
use crate::dashboard::{build_source, load_catalog};

/// Validates configuration, views and the status source.
pub fn command_check(config: &Config) -> Result<(), Box<dyn std::error::Error>> {
    println!("🔍 statline - System Check");
    println!("==========================");

    let mut all_ok = true;

    // Check configuration
    println!("\n⚙️  Checking configuration...");
    let config_ok = match validate_effective_config(config) {
        Ok(_) => {
            println!("   ✅ Configuration is valid");
            true
        }
        Err(e) => {
            println!("   ❌ Configuration invalid: {}", e);
            false
        }
    };
    all_ok &= config_ok;

    // Check view definitions
    println!("\n📊 Checking views...");
    let view = match load_catalog(config) {
        Ok(catalog) => {
            println!("   ✅ {} views loaded", catalog.len());
            let name = config.view.as_deref().unwrap_or(DEFAULT_VIEW);
            match catalog.build(name) {
                Ok(view) => {
                    println!("   ✅ View '{}' is {} columns wide", name, view.width());
                    Some(view)
                }
                Err(e) => {
                    println!("   ❌ {}", e);
                    None
                }
            }
        }
        Err(e) => {
            println!("   ❌ Cannot load views: {}", e);
            None
        }
    };
    all_ok &= view.is_some();

    // Check the status source; a broken config would only repeat its errors.
    if config_ok {
        println!("\n📁 Checking status source...");
        match first_sample(config) {
            Ok(Some(sample)) => {
                println!("   ✅ Read a sample with {} metrics", sample.metric_count());
                if let Some(view) = &view {
                    report_missing_keys(view, &sample);
                }
            }
            Ok(None) => {
                println!("   ❌ Source produced no samples");
                all_ok = false;
            }
            Err(e) => {
                println!("   ❌ {}", e);
                all_ok = false;
            }
        }
    }

    println!("\n📋 Summary:");
    if all_ok {
        println!("   ✅ All checks passed - ready to display");
        Ok(())
    } else {
        println!("   ❌ Some checks failed - please review the messages above");
        std::process::exit(1);
    }
}

/// Starts the configured source and takes one sample from it. Dropping the
/// iterator closes files and stops any child process.
fn first_sample(config: &Config) -> Result<Option<Sample>, Box<dyn std::error::Error>> {
    let mut source = build_source(config);
    let interval = Duration::from_secs(config.interval.unwrap_or(DEFAULT_INTERVAL));
    source.initialize(interval)?;
    println!("   ✅ Started {}", source.describe());
    let mut samples = source.produce()?;
    Ok(samples.next())
}

/// Warns about literal keys the view reads that the sample does not have.
/// Globs are skipped since they may legitimately match nothing yet.
fn report_missing_keys(view: &View, sample: &Sample) {
    let missing: Vec<String> = view
        .sources()
        .into_iter()
        .filter(|key| !key.is_glob())
        .filter(|key| {
            sample
                .domain(key.domain())
                .map_or(true, |metrics| !metrics.iter().any(|m| m.name == key.name()))
        })
        .map(|key| key.to_string())
        .collect();

    if missing.is_empty() {
        println!("   ✅ Every key of view '{}' is present", view.name());
    } else {
        println!(
            "   ⚠️  {} keys of view '{}' are missing and will show '-': {}",
            missing.len(),
            view.name(),
            missing.join(", ")
        );
    }
}

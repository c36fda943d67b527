//! Views command implementation.
//!
//! Lists the built-in views and any views loaded from the views file.

use statline::ViewCatalog;

use crate::config::Config;
use crate::dashboard::load_catalog;

/// Lists available views, optionally restricted to names containing `view`.
pub fn command_views(
    verbose: bool,
    view: Option<String>,
    config: &Config,
) -> Result<(), Box<dyn std::error::Error>> {
    let catalog = load_catalog(config)?;

    println!("📊 statline - Available Views");
    println!("=============================");

    let shown = print_views(&catalog, verbose, view.as_deref())?;

    if shown == 0 {
        if let Some(filter) = &view {
            println!("\n❌ No view matches '{}'", filter);
        }
    }

    println!("\n📋 Total: {} views", catalog.len());
    Ok(())
}

fn print_views(
    catalog: &ViewCatalog,
    verbose: bool,
    filter: Option<&str>,
) -> Result<usize, Box<dyn std::error::Error>> {
    let mut shown = 0;

    for name in catalog.names() {
        if let Some(filter) = filter {
            if !name.contains(filter) {
                continue;
            }
        }
        let view = catalog.build(name)?;
        shown += 1;

        println!("\n🏷️  View: {}", name);
        println!("{}", "─".repeat(50));
        if !view.description().is_empty() {
            println!("   {}", view.description());
        }

        if verbose {
            // First help line repeats the view name.
            for line in view.help().iter().skip(1) {
                println!("   │  {}", line);
            }
            println!("   │");
            for line in view.header_lines() {
                println!("   │  {}", line);
            }
        } else {
            let columns: Vec<&str> = view.columns().map(|c| c.name()).collect();
            println!("   ├─ {} columns, {} wide", columns.len(), view.width());
            println!("   └─ {}", columns.join(", "));
        }
    }

    Ok(shown)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_print_views_filter() {
        let catalog = ViewCatalog::builtin();
        assert_eq!(print_views(&catalog, false, None).unwrap(), catalog.len());
        assert_eq!(print_views(&catalog, true, Some("innodb")).unwrap(), 3);
        assert_eq!(print_views(&catalog, false, Some("nothing-like-this")).unwrap(), 0);
    }
}

//! Config command implementation.
//!
//! Generates configuration files in various formats.

use std::fs;
use std::path::PathBuf;

use crate::cli::ConfigFormat;
use crate::config::Config;

/// Generates configuration files.
pub fn command_config(
    output: Option<PathBuf>,
    format: ConfigFormat,
    commented: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::default();
    let output = match output {
        Some(path) => path,
        None => PathBuf::from(match format {
            ConfigFormat::Json => "statline.json",
            ConfigFormat::Toml => "statline.toml",
            ConfigFormat::Yaml => "statline.yaml",
        }),
    };

    let content = match format {
        ConfigFormat::Json => serde_json::to_string_pretty(&config)?,
        ConfigFormat::Toml => toml::to_string_pretty(&config)?,
        ConfigFormat::Yaml => {
            let mut content = serde_yaml::to_string(&config)?;
            if commented {
                content = add_config_comments(content);
            }
            content
        }
    };

    if output.to_string_lossy() == "-" {
        print!("{}", content);
    } else {
        fs::write(&output, content)?;
        println!("✅ Configuration written to: {}", output.display());
    }

    Ok(())
}

/// Adds comments to YAML configuration.
fn add_config_comments(yaml: String) -> String {
    let comments = r#"# statline Configuration
# =======================
#
# Sampling
# --------
# interval: 1                  # Seconds between rows (minimum 1)
# view: "cttf"                 # View to display (see `statline views`)
#
# Sources (a dump file OR a command)
# ----------------------------------
# status_file: null            # Replay a captured status dump
# variables_file: null         # Variables dump replayed alongside status_file
# status_command: null         # Null = "mysqladmin extended-status -i1"
# variables_command: null      # Run once at startup, e.g. "mysqladmin variables"
#
# Display
# -------
# views_file: null             # Extra view definitions merged over the built-ins
# header_every: null           # Rows between headers (null = fit terminal, 0 = once)
# queue_capacity: 1            # Samples buffered between reader and display
#
# Logging
# -------
# log_level: "warn"            # off, error, warn, info, debug, trace
# log_file: null               # Append logs here instead of stderr
"#;

    format!("{comments}\n{yaml}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::parse_config;
    use std::path::Path;
    use tempfile::tempdir;

    #[test]
    fn test_commented_yaml_still_parses() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("statline.yaml");
        command_config(Some(path.clone()), ConfigFormat::Yaml, true).unwrap();

        let content = fs::read_to_string(&path).unwrap();
        assert!(content.starts_with("# statline Configuration"));
        let config = parse_config(&content, Path::new("statline.yaml")).unwrap();
        assert_eq!(config.interval, Some(1));
    }
}

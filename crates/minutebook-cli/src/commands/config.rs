//! Config command handlers

use anyhow::{bail, Context, Result};

use minutebook_core::{Config, RemoteConfig};

use crate::output::{Output, OutputFormat};

/// Show current configuration
///
/// The remote token is never printed, only whether one is set.
pub fn show(output: &Output) -> Result<()> {
    let config = Config::load().context("Failed to load configuration")?;

    match output.format {
        OutputFormat::Json => {
            println!(
                "{}",
                serde_json::json!({
                    "data_dir": config.data_dir,
                    "pull_on_read": config.pull_on_read,
                    "remote": config.remote.as_ref().map(|r| serde_json::json!({
                        "token_set": !r.token.trim().is_empty(),
                        "repository": r.repository,
                        "branch": r.branch,
                        "document_path": r.document_path,
                        "attachment_dir": r.attachment_dir,
                        "api_url": r.api_url,
                        "timeout_secs": r.timeout_secs,
                    })),
                })
            );
        }
        OutputFormat::Quiet => {
            println!("{}", config.data_dir.display());
        }
        OutputFormat::Human => {
            println!("Configuration:");
            println!("  data_dir:     {}", config.data_dir.display());
            println!("  pull_on_read: {}", config.pull_on_read);
            match config.remote {
                Some(ref remote) => {
                    println!("  remote:");
                    println!(
                        "    token:          {}",
                        if remote.token.trim().is_empty() {
                            "(not set)"
                        } else {
                            "(set)"
                        }
                    );
                    println!("    repository:     {}", display_or_unset(&remote.repository));
                    println!("    branch:         {}", remote.branch);
                    println!("    document_path:  {}", remote.document_path);
                    println!("    attachment_dir: {}", remote.attachment_dir);
                    println!("    api_url:        {}", remote.api_url);
                    println!("    timeout_secs:   {}", remote.timeout_secs);
                }
                None => {
                    println!("  remote:       (not configured)");
                }
            }
            println!();
            println!("Config file: {}", Config::config_file_path().display());
        }
    }

    Ok(())
}

/// Set a configuration value
pub fn set(key: String, value: String, output: &Output) -> Result<()> {
    let mut config = Config::load().context("Failed to load configuration")?;

    match key.as_str() {
        "data_dir" => {
            config.data_dir = value.clone().into();
        }
        "pull_on_read" => {
            config.pull_on_read = value
                .parse()
                .context("Invalid value for pull_on_read. Use 'true' or 'false'.")?;
        }
        "remote.token" => {
            remote_mut(&mut config).token = value.clone();
        }
        "remote.repository" => {
            remote_mut(&mut config).repository = value.clone();
        }
        "remote.branch" => {
            remote_mut(&mut config).branch = value.clone();
        }
        "remote.document_path" => {
            remote_mut(&mut config).document_path = value.clone();
        }
        "remote.attachment_dir" => {
            remote_mut(&mut config).attachment_dir = value.clone();
        }
        "remote.api_url" => {
            remote_mut(&mut config).api_url = value.clone();
        }
        "remote.timeout_secs" => {
            remote_mut(&mut config).timeout_secs = value
                .parse()
                .context("Invalid value for remote.timeout_secs. Use a number of seconds.")?;
        }
        _ => {
            bail!(
                "Unknown configuration key: '{}'\n\
                 Valid keys: data_dir, pull_on_read, remote.token, remote.repository,\n\
                 remote.branch, remote.document_path, remote.attachment_dir,\n\
                 remote.api_url, remote.timeout_secs",
                key
            );
        }
    }

    config.save().context("Failed to save configuration")?;

    // Don't echo secrets back
    if key == "remote.token" {
        output.success(&format!("Set {}", key));
    } else {
        output.success(&format!("Set {} = {}", key, value));
    }

    Ok(())
}

fn remote_mut(config: &mut Config) -> &mut RemoteConfig {
    config.remote.get_or_insert_with(RemoteConfig::default)
}

fn display_or_unset(value: &str) -> &str {
    if value.trim().is_empty() {
        "(not set)"
    } else {
        value
    }
}

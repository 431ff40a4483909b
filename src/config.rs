//! Configuration source for the navigator.
//!
//! Profiles come from the AWS shared config/credentials files, regions from a
//! static table. `GatewayConfig` is the validated pair every remote call is
//! parameterized by.

use crate::error::{EngineError, EngineResult};
use anyhow::{Context, Result};
use regex::Regex;
use std::collections::BTreeSet;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

pub const DEFAULT_PROFILE: &str = "default";

const ENV_CONFIG_FILE: &str = "AWS_CONFIG_FILE";
const ENV_CREDENTIALS_FILE: &str = "AWS_SHARED_CREDENTIALS_FILE";

/// Regions offered in the region picker.
pub const REGIONS: &[&str] = &[
    "us-east-1",
    "us-east-2",
    "us-west-1",
    "us-west-2",
    "ca-central-1",
    "sa-east-1",
    "eu-west-1",
    "eu-west-2",
    "eu-west-3",
    "eu-central-1",
    "eu-north-1",
    "eu-south-1",
    "ap-south-1",
    "ap-northeast-1",
    "ap-northeast-2",
    "ap-northeast-3",
    "ap-southeast-1",
    "ap-southeast-2",
    "ap-east-1",
    "me-south-1",
    "af-south-1",
];

static REGION_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[a-z]{2}(-[a-z]+)+-\d+$").expect("region pattern is a valid regex")
});

pub fn available_regions() -> Vec<String> {
    REGIONS.iter().map(|r| r.to_string()).collect()
}

/// Profiles found in the shared config and credentials files.
///
/// Honors `AWS_CONFIG_FILE` / `AWS_SHARED_CREDENTIALS_FILE`; files that do not
/// exist are skipped.
pub fn list_available_profiles() -> Result<Vec<String>> {
    let home_aws = dirs::home_dir().map(|home| home.join(".aws"));

    let config_path = std::env::var_os(ENV_CONFIG_FILE)
        .map(PathBuf::from)
        .or_else(|| home_aws.as_ref().map(|dir| dir.join("config")));
    let credentials_path = std::env::var_os(ENV_CREDENTIALS_FILE)
        .map(PathBuf::from)
        .or_else(|| home_aws.as_ref().map(|dir| dir.join("credentials")));

    list_profiles_from(config_path.as_deref(), credentials_path.as_deref())
}

pub fn list_profiles_from(
    config_path: Option<&Path>,
    credentials_path: Option<&Path>,
) -> Result<Vec<String>> {
    let mut names = BTreeSet::new();

    if let Some(path) = config_path {
        if let Some(contents) = read_optional(path)? {
            names.extend(parse_profile_sections(&contents, ProfileFile::Config));
        }
    }
    if let Some(path) = credentials_path {
        if let Some(contents) = read_optional(path)? {
            names.extend(parse_profile_sections(&contents, ProfileFile::Credentials));
        }
    }

    // "default" first, everything else alphabetical
    let mut profiles = Vec::with_capacity(names.len());
    if names.remove(DEFAULT_PROFILE) {
        profiles.push(DEFAULT_PROFILE.to_string());
    }
    profiles.extend(names);
    Ok(profiles)
}

fn read_optional(path: &Path) -> Result<Option<String>> {
    match std::fs::read_to_string(path) {
        Ok(contents) => Ok(Some(contents)),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
        Err(e) => Err(e).with_context(|| format!("Failed to read {}", path.display())),
    }
}

#[derive(Clone, Copy, PartialEq, Debug)]
enum ProfileFile {
    Config,
    Credentials,
}

fn parse_profile_sections(contents: &str, kind: ProfileFile) -> Vec<String> {
    contents
        .lines()
        .filter_map(|line| {
            let line = line.trim();
            let header = line.strip_prefix('[')?.strip_suffix(']')?.trim();
            match kind {
                // The config file spells named profiles "[profile NAME]";
                // other sections (sso-session, services) are not profiles.
                ProfileFile::Config => {
                    if header == DEFAULT_PROFILE {
                        Some(header.to_string())
                    } else {
                        header
                            .strip_prefix("profile ")
                            .map(|name| name.trim().to_string())
                    }
                }
                ProfileFile::Credentials => Some(header.to_string()),
            }
        })
        .filter(|name| !name.is_empty())
        .collect()
}

pub fn validate_profile(profile: &str) -> EngineResult<()> {
    if profile.is_empty() {
        return Err(EngineError::Configuration(
            "profile name must not be empty".to_string(),
        ));
    }
    if profile.chars().any(char::is_whitespace) {
        return Err(EngineError::Configuration(format!(
            "profile name '{profile}' must not contain whitespace"
        )));
    }
    Ok(())
}

pub fn validate_region(region: &str) -> EngineResult<()> {
    if REGION_PATTERN.is_match(region) {
        Ok(())
    } else {
        Err(EngineError::Configuration(format!(
            "'{region}' is not a valid region identifier (expected e.g. us-east-1)"
        )))
    }
}

/// Profile/region pair handed to every gateway call.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GatewayConfig {
    pub profile: String,
    pub region: String,
}

impl GatewayConfig {
    pub fn new(profile: Option<&str>, region: Option<&str>) -> EngineResult<Self> {
        let profile = profile
            .ok_or_else(|| EngineError::Configuration("no profile selected".to_string()))?;
        let region =
            region.ok_or_else(|| EngineError::Configuration("no region selected".to_string()))?;
        validate_profile(profile)?;
        validate_region(region)?;
        Ok(Self {
            profile: profile.to_string(),
            region: region.to_string(),
        })
    }
}

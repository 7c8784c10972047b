//! Credential resolution from the PostgreSQL connection service file.
//!
//! Reads the `user` and `password` keys of one `[section]` of a
//! `pg_service.conf`-style file. Keys the section leaves out come from
//! `PGUSER`/`PGPASSWORD`. Only the default `~/.pg_service.conf` may be absent.

use anyhow::{bail, Context, Result};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use viewprobe_core::Credentials;

/// Default service file location.
pub fn default_service_file() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(".pg_service.conf"))
}

/// Resolve credentials for `service`.
///
/// `service_file` is the file named by `--service-file` or `PGSERVICEFILE`
/// and must exist. Without one, the default file is read if present and the
/// environment alone is used otherwise.
pub fn resolve(service: &str, service_file: Option<&Path>) -> Result<Credentials> {
    let env = |key: &str| std::env::var(key).ok();
    match service_file {
        Some(path) => resolve_from(service, path, true, env),
        None => match default_service_file() {
            Some(path) => resolve_from(service, &path, false, env),
            None => from_section(HashMap::new(), env),
        },
    }
}

/// Read `service` from the file at `path`.
///
/// A missing file is an error when `required`. A file that exists but has no
/// `[service]` section is always an error.
fn resolve_from(
    service: &str,
    path: &Path,
    required: bool,
    env: impl Fn(&str) -> Option<String>,
) -> Result<Credentials> {
    if !path.exists() {
        if required {
            bail!("Service file {} does not exist", path.display());
        }
        tracing::debug!(path = %path.display(), "No service file, using PGUSER/PGPASSWORD");
        return from_section(HashMap::new(), env);
    }

    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read service file {}", path.display()))?;
    let Some(section) = parse_section(&contents, service) else {
        bail!("Service file {} has no [{service}] section", path.display());
    };

    from_section(section, env)
}

/// Build credentials from a parsed section, consulting `env` for missing keys.
fn from_section(
    mut section: HashMap<String, String>,
    env: impl Fn(&str) -> Option<String>,
) -> Result<Credentials> {
    let Some(user) = section.remove("user").or_else(|| env("PGUSER")) else {
        bail!("No user configured: set `user` in the service file or PGUSER");
    };

    let mut credentials = Credentials::new(user);
    if let Some(password) = section.remove("password").or_else(|| env("PGPASSWORD")) {
        credentials = credentials.with_password(password);
    }
    Ok(credentials)
}

/// Extract the key/value pairs of `[service]` from INI-style `contents`.
///
/// Returns `None` when the section is absent.
fn parse_section(contents: &str, service: &str) -> Option<HashMap<String, String>> {
    let mut in_section = false;
    let mut found = None;

    for line in contents.lines().map(str::trim) {
        if line.is_empty() || line.starts_with('#') || line.starts_with(';') {
            continue;
        }
        if let Some(name) = line.strip_prefix('[').and_then(|l| l.strip_suffix(']')) {
            in_section = name.trim() == service;
            if in_section && found.is_none() {
                found = Some(HashMap::new());
            }
            continue;
        }
        if !in_section {
            continue;
        }
        if let (Some((key, value)), Some(section)) = (line.split_once('='), found.as_mut()) {
            section.insert(key.trim().to_string(), value.trim().to_string());
        }
    }

    found
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const SERVICE_FILE: &str = "\
# shared defaults
[client-test]
host=localhost
user = probe
password = s3cret

[client-prod]
user=readonly
";

    fn no_env(_: &str) -> Option<String> {
        None
    }

    #[test]
    fn test_parse_section_reads_named_profile() {
        let section = parse_section(SERVICE_FILE, "client-test").unwrap();
        assert_eq!(section.get("user").map(String::as_str), Some("probe"));
        assert_eq!(section.get("password").map(String::as_str), Some("s3cret"));
    }

    #[test]
    fn test_parse_section_missing_profile() {
        assert!(parse_section(SERVICE_FILE, "client-dev").is_none());
    }

    #[test]
    fn test_section_values_take_priority_over_env() {
        let section = parse_section(SERVICE_FILE, "client-test").unwrap();
        let creds = from_section(section, |_| Some("from-env".to_string())).unwrap();

        assert_eq!(creds.username, "probe");
        assert_eq!(creds.password.as_deref(), Some("s3cret"));
    }

    #[test]
    fn test_env_fills_missing_password() {
        let section = parse_section(SERVICE_FILE, "client-prod").unwrap();
        let creds = from_section(section, |key| {
            (key == "PGPASSWORD").then(|| "env-pass".to_string())
        })
        .unwrap();

        assert_eq!(creds.username, "readonly");
        assert_eq!(creds.password.as_deref(), Some("env-pass"));
    }

    #[test]
    fn test_missing_user_is_an_error() {
        assert!(from_section(HashMap::new(), no_env).is_err());
    }

    fn service_file() -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(SERVICE_FILE.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_resolve_reads_file() {
        let file = service_file();

        let creds = resolve("client-test", Some(file.path())).unwrap();
        assert_eq!(creds.username, "probe");
    }

    #[test]
    fn test_named_file_must_exist() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("pg_service.conf");

        let err = resolve_from("client-test", &path, true, |_| Some("env-user".to_string()))
            .unwrap_err();

        assert!(err.to_string().contains("does not exist"));
    }

    #[test]
    fn test_absent_default_file_uses_env() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(".pg_service.conf");

        let creds = resolve_from("client-test", &path, false, |key| {
            (key == "PGUSER").then(|| "env-user".to_string())
        })
        .unwrap();

        assert_eq!(creds.username, "env-user");
        assert!(creds.password.is_none());
    }

    #[test]
    fn test_misspelled_service_is_an_error() {
        let file = service_file();

        for required in [true, false] {
            let err = resolve_from("client-tset", file.path(), required, |_| {
                Some("env-user".to_string())
            })
            .unwrap_err();

            assert!(err.to_string().contains("[client-tset]"));
        }
    }
}

use std::collections::HashMap;
use std::env;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::Context;
use base64::Engine;
use url::Url;

use crate::DIRECTORY_INDEX;

pub fn format_bytes(bytes: u64) -> String {
    const UNITS: &[&str] = &["B", "KB", "MB", "GB", "TB"];
    let mut size = bytes as f64;
    let mut unit_index = 0;

    while size >= 1024.0 && unit_index < UNITS.len() - 1 {
        size /= 1024.0;
        unit_index += 1;
    }

    format!("{:.2} {}", size, UNITS[unit_index])
}

/// Renders a duration as `[[<hours>h ]<minutes>m ]<seconds>s`.
///
/// Higher-order units appear only when non-zero; seconds always carry one
/// decimal place ("45.3s", "1m 5.0s", "1h 0m 5.0s").
pub fn format_duration(duration: Duration) -> String {
    let total_seconds = duration.as_secs_f64();
    let total_minutes = (total_seconds / 60.0).floor() as u64;
    let seconds = total_seconds - (total_minutes * 60) as f64;

    let mut display = format!("{seconds:3.1}s");
    if total_minutes > 0 {
        let hours = total_minutes / 60;
        let minutes = total_minutes % 60;
        display = format!("{minutes}m {display}");
        if hours > 0 {
            display = format!("{hours}h {display}");
        }
    }
    display
}

/// Derives an output file name from the URL's path component.
///
/// Returns the final path segment, or the directory index name when the
/// path ends in a slash.
pub fn file_name_from_url(url: &Url) -> String {
    match url.path().rsplit('/').next() {
        Some(name) if !name.is_empty() => name.to_string(),
        _ => DIRECTORY_INDEX.to_string(),
    }
}

/// Resolves the destination file path from the `--output` value and the URL.
///
/// An existing directory (or a path ending in a slash) contributes only the
/// directory part, with the file name derived from the URL. A missing
/// directory part defaults to the current working directory.
pub fn resolve_output_path(output_path: Option<&str>, url: &str) -> anyhow::Result<PathBuf> {
    let mut directory: Option<PathBuf> = None;
    let mut file_name: Option<String> = None;

    if let Some(output_path) = output_path {
        let path = Path::new(output_path);
        if path.is_dir() || output_path.ends_with('/') {
            directory = Some(path.to_path_buf());
        } else {
            directory = path
                .parent()
                .filter(|parent| !parent.as_os_str().is_empty())
                .map(Path::to_path_buf);
            file_name = path
                .file_name()
                .map(|name| name.to_string_lossy().into_owned());
        }
    }

    let directory = match directory {
        Some(directory) => directory,
        None => env::current_dir().context("cannot determine the current working directory")?,
    };
    let file_name = match file_name {
        Some(file_name) => file_name,
        None => {
            let url = Url::parse(url).with_context(|| format!("invalid URL {url:?}"))?;
            file_name_from_url(&url)
        }
    };
    Ok(directory.join(file_name))
}

/// Returns the `Authorization` header for HTTP basic authentication.
pub fn basic_auth_header(user: &str, password: &str) -> (String, String) {
    let credentials =
        base64::engine::general_purpose::STANDARD.encode(format!("{user}:{password}"));
    ("Authorization".to_string(), format!("Basic {credentials}"))
}

/// Parses repeatable `Name: Value` header arguments into a map.
///
/// Values keep everything after the first colon; entries without a colon
/// are skipped with a warning.
pub fn parse_request_headers(raw: &[String]) -> HashMap<String, String> {
    let mut headers = HashMap::new();
    for header in raw {
        match header.split_once(':') {
            Some((name, value)) => {
                headers.insert(name.trim().to_string(), value.trim().to_string());
            }
            None => tracing::warn!("Ignoring header {header:?}, expected 'Name: Value'"),
        }
    }
    headers
}

pub fn parse_size(size_str: &str) -> Result<u64, anyhow::Error> {
    let size_str = size_str.trim().to_uppercase();

    let (number_part, multiplier) = if size_str.ends_with('K') {
        (&size_str[..size_str.len() - 1], 1024u64)
    } else if size_str.ends_with('M') {
        (&size_str[..size_str.len() - 1], 1024u64.pow(2))
    } else if size_str.ends_with('G') {
        (&size_str[..size_str.len() - 1], 1024u64.pow(3))
    } else if size_str.ends_with('T') {
        (&size_str[..size_str.len() - 1], 1024u64.pow(4))
    } else {
        (size_str.as_str(), 1u64)
    };

    let number: f64 = number_part
        .parse()
        .with_context(|| format!("invalid size {size_str:?}"))?;
    Ok((number * multiplier as f64) as u64)
}

#[cfg(test)]
mod tests {
    use super::*;

    // ---- format_duration ----

    #[test]
    fn durations_under_a_minute_show_seconds_only() {
        assert_eq!(format_duration(Duration::from_secs_f64(45.3)), "45.3s");
        assert_eq!(format_duration(Duration::from_secs_f64(0.5)), "0.5s");
        assert_eq!(format_duration(Duration::ZERO), "0.0s");
    }

    #[test]
    fn durations_under_an_hour_include_minutes() {
        assert_eq!(format_duration(Duration::from_secs(65)), "1m 5.0s");
        assert_eq!(format_duration(Duration::from_secs(599)), "9m 59.0s");
    }

    #[test]
    fn long_durations_include_hours_and_keep_zero_minutes() {
        assert_eq!(format_duration(Duration::from_secs(3605)), "1h 0m 5.0s");
        assert_eq!(format_duration(Duration::from_secs(7290)), "2h 1m 30.0s");
    }

    // ---- file_name_from_url ----

    #[test]
    fn file_name_is_the_last_url_path_segment() {
        let url = Url::parse("https://example.com/reports/q3.csv").unwrap();
        assert_eq!(file_name_from_url(&url), "q3.csv");
    }

    #[test]
    fn trailing_slash_falls_back_to_the_directory_index() {
        let url = Url::parse("https://example.com/archive/").unwrap();
        assert_eq!(file_name_from_url(&url), "index.html");

        let root = Url::parse("https://example.com/").unwrap();
        assert_eq!(file_name_from_url(&root), "index.html");
    }

    #[test]
    fn query_strings_do_not_leak_into_the_file_name() {
        let url = Url::parse("https://example.com/download/file.zip?token=abc").unwrap();
        assert_eq!(file_name_from_url(&url), "file.zip");
    }

    // ---- resolve_output_path ----

    #[test]
    fn existing_directory_gets_the_url_file_name() {
        let dir = tempfile::tempdir().unwrap();
        let resolved = resolve_output_path(
            Some(dir.path().to_str().unwrap()),
            "https://example.com/reports/q3.csv",
        )
        .unwrap();
        assert_eq!(resolved, dir.path().join("q3.csv"));
    }

    #[test]
    fn explicit_file_path_is_kept_as_given() {
        let resolved =
            resolve_output_path(Some("sub/archive.tar"), "https://example.com/x").unwrap();
        assert_eq!(resolved, Path::new("sub").join("archive.tar"));
    }

    #[test]
    fn bare_file_name_lands_in_the_current_directory() {
        let resolved = resolve_output_path(Some("archive.tar"), "https://example.com/x").unwrap();
        assert_eq!(resolved, env::current_dir().unwrap().join("archive.tar"));
    }

    #[test]
    fn missing_output_path_derives_everything() {
        let resolved = resolve_output_path(None, "https://example.com/reports/q3.csv").unwrap();
        assert_eq!(resolved, env::current_dir().unwrap().join("q3.csv"));
    }

    #[test]
    fn trailing_slash_names_a_directory_that_does_not_exist_yet() {
        let resolved =
            resolve_output_path(Some("newdir/"), "https://example.com/reports/q3.csv").unwrap();
        assert_eq!(resolved, Path::new("newdir").join("q3.csv"));
    }

    #[test]
    fn url_ending_in_a_slash_uses_the_directory_index() {
        let resolved = resolve_output_path(None, "https://example.com/archive/").unwrap();
        assert_eq!(resolved, env::current_dir().unwrap().join("index.html"));
    }

    #[test]
    fn unparseable_url_is_an_error_when_a_name_is_needed() {
        assert!(resolve_output_path(None, "not a url").is_err());
    }

    // ---- basic_auth_header ----

    #[test]
    fn basic_auth_encodes_user_and_password() {
        let (name, value) = basic_auth_header("user", "password");
        assert_eq!(name, "Authorization");
        assert_eq!(value, "Basic dXNlcjpwYXNzd29yZA==");
    }

    // ---- parse_request_headers ----

    #[test]
    fn header_arguments_split_on_the_first_colon() {
        let headers = parse_request_headers(&[
            "Accept: text/csv".to_string(),
            "X-Token: a:b:c".to_string(),
        ]);
        assert_eq!(headers.get("Accept").map(String::as_str), Some("text/csv"));
        assert_eq!(headers.get("X-Token").map(String::as_str), Some("a:b:c"));
    }

    #[test]
    fn malformed_header_arguments_are_skipped_with_a_warning() {
        let (headers, logged) = crate::test_support::capture_logs(|| {
            parse_request_headers(&["not-a-header".to_string()])
        });

        assert!(headers.is_empty());
        assert!(logged.contains("WARN"));
        assert!(logged.contains("Ignoring header \"not-a-header\""));
    }

    // ---- parse_size ----

    #[test]
    fn plain_numbers_are_bytes() {
        assert_eq!(parse_size("65536").unwrap(), 65536);
    }

    #[test]
    fn size_suffixes_multiply() {
        assert_eq!(parse_size("64K").unwrap(), 64 * 1024);
        assert_eq!(parse_size("1M").unwrap(), 1024 * 1024);
        assert_eq!(parse_size("2g").unwrap(), 2 * 1024 * 1024 * 1024);
    }

    #[test]
    fn garbage_sizes_are_rejected() {
        assert!(parse_size("lots").is_err());
    }
}

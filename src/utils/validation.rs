use crate::utils::error::{RetError, Result};
use url::Url;

pub trait Validate {
    fn validate(&self) -> Result<()>;
}

fn invalid(field: &str, value: impl ToString, reason: impl Into<String>) -> RetError {
    RetError::InvalidConfigValueError {
        field: field.to_string(),
        value: value.to_string(),
        reason: reason.into(),
    }
}

/// Parse an http(s) URL, e.g. a remote playback file.
pub fn validate_url(field: &str, value: &str) -> Result<Url> {
    if value.is_empty() {
        return Err(invalid(field, value, "URL cannot be empty"));
    }
    let url = Url::parse(value).map_err(|e| invalid(field, value, format!("Invalid URL format: {}", e)))?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        scheme => Err(invalid(field, value, format!("Unsupported URL scheme: {}", scheme))),
    }
}

pub fn validate_path(field: &str, path: &str) -> Result<()> {
    if path.is_empty() {
        return Err(invalid(field, path, "Path cannot be empty"));
    }
    if path.contains('\0') {
        return Err(invalid(field, path, "Path contains null bytes"));
    }
    Ok(())
}

pub fn validate_positive_number(field: &str, value: usize, min_value: usize) -> Result<()> {
    if value < min_value {
        return Err(invalid(field, value, format!("Value must be at least {}", min_value)));
    }
    Ok(())
}

/// Extensions compare case-insensitively.
pub fn validate_file_extension(field: &str, file: &str, allowed: &[&str]) -> Result<()> {
    let extension = std::path::Path::new(file).extension().and_then(|ext| ext.to_str());
    match extension {
        Some(ext) if allowed.iter().any(|a| a.eq_ignore_ascii_case(ext)) => Ok(()),
        Some(ext) => Err(invalid(
            field,
            file,
            format!("Unsupported file extension: {}. Allowed extensions: {}", ext, allowed.join(", ")),
        )),
        None => Err(invalid(field, file, "File has no extension or invalid filename")),
    }
}

pub fn validate_non_empty_string(field: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(invalid(field, value, "Value cannot be empty or whitespace-only"));
    }
    Ok(())
}

pub fn validate_range<T: PartialOrd + std::fmt::Display + Copy>(field: &str, value: T, min: T, max: T) -> Result<()> {
    if value < min || value > max {
        return Err(invalid(field, value, format!("Value must be between {} and {}", min, max)));
    }
    Ok(())
}

/// `lower` must not exceed `upper`.
pub fn validate_ordered(field: &str, lower: f64, upper: f64) -> Result<()> {
    if lower > upper {
        return Err(invalid(
            field,
            format!("[{}, {}]", lower, upper),
            "Lower bound is greater than upper bound",
        ));
    }
    Ok(())
}

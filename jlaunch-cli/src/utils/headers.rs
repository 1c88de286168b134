use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use tracing::debug;

use crate::error::AppError;

/// Parse a header string in format "Name: Value" into the HeaderMap
pub fn parse_and_add_header(headers: &mut HeaderMap, header_str: &str) -> Result<(), AppError> {
    // Find the first colon which separates name and value
    let Some((name, value)) = header_str.split_once(':') else {
        return Err(AppError::InvalidInput(format!(
            "Invalid header format: '{header_str}'. Expected 'Name: Value'"
        )));
    };
    let (name, value) = (name.trim(), value.trim());

    let header_name = HeaderName::from_bytes(name.as_bytes())
        .map_err(|_| AppError::InvalidInput(format!("Invalid header name: '{name}'")))?;
    let header_value = HeaderValue::from_str(value)
        .map_err(|_| AppError::InvalidInput(format!("Invalid header value for '{name}'")))?;

    debug!(header = %name, "Adding custom header");
    headers.append(header_name, header_value);
    Ok(())
}

/// Parse a collection of header strings and return a HeaderMap
pub fn parse_headers(header_strings: &[String]) -> Result<HeaderMap, AppError> {
    let mut headers = HeaderMap::new();

    for header_str in header_strings {
        parse_and_add_header(&mut headers, header_str)?;
    }

    Ok(headers)
}

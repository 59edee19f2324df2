use crate::{Error, Result};

pub(crate) fn validate_service_name(input: &str) -> Result<()> {
    validate_no_control("service name", input)?;
    if input.trim().is_empty() {
        return Err(Error::invalid_input("service name must not be empty"));
    }
    if input.contains(char::is_whitespace) {
        return Err(Error::invalid_input(
            "service name must not contain whitespace",
        ));
    }
    if input.starts_with('/') {
        return Err(Error::invalid_input(
            "service name must not start with '/' (that is an object path)",
        ));
    }
    Ok(())
}

pub(crate) fn validate_object_path(input: &str) -> Result<()> {
    validate_no_control("object path", input)?;
    if input.is_empty() {
        return Err(Error::invalid_input("object path must not be empty"));
    }
    if !input.starts_with('/') {
        return Err(Error::invalid_input("object path must start with '/'"));
    }
    if input.contains(char::is_whitespace) {
        return Err(Error::invalid_input(
            "object path must not contain whitespace",
        ));
    }
    Ok(())
}

pub(crate) fn validate_no_control(context: &'static str, input: &str) -> Result<()> {
    if input.contains('\0') {
        return Err(Error::invalid_input(format!(
            "{context} must not contain NUL"
        )));
    }
    if input.contains('\n') || input.contains('\r') {
        return Err(Error::invalid_input(format!(
            "{context} must not contain newlines"
        )));
    }
    if input.chars().any(|c| c.is_control()) {
        return Err(Error::invalid_input(format!(
            "{context} must not contain control characters"
        )));
    }
    Ok(())
}

/// Extract every quoted token from free-form tool output.
///
/// Handles both single quotes (`gdbus` GVariant rendering) and double quotes
/// (`dbus-send` reply rendering). A backslash escapes the next character inside
/// a quoted token. An unterminated token is dropped.
pub(crate) fn quoted_strings(input: &str) -> Vec<String> {
    let mut out = Vec::new();
    let mut chars = input.chars();

    while let Some(c) = chars.next() {
        if c != '\'' && c != '"' {
            continue;
        }
        let quote = c;
        let mut token = String::new();
        let mut closed = false;
        while let Some(c) = chars.next() {
            if c == '\\' {
                if let Some(escaped) = chars.next() {
                    token.push(escaped);
                }
                continue;
            }
            if c == quote {
                closed = true;
                break;
            }
            token.push(c);
        }
        if closed {
            out.push(token);
        }
    }

    out
}

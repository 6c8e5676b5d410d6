use crate::error::{CoachError, Result};
use regex::Regex;
use serde::de::DeserializeOwned;
use std::sync::OnceLock;

static FENCE_RE: OnceLock<Regex> = OnceLock::new();

fn fence_re() -> &'static Regex {
    FENCE_RE.get_or_init(|| {
        Regex::new(r"(?s)^```[A-Za-z0-9_-]*[ \t]*\r?\n?(.*?)\r?\n?```\s*$").expect("valid regex")
    })
}

/// Remove a surrounding markdown code fence (```` ```json ... ``` ````).
/// Text without a fence is returned trimmed.
pub fn strip_code_fences(raw: &str) -> &str {
    let trimmed = raw.trim();
    match fence_re().captures(trimmed).and_then(|c| c.get(1)) {
        Some(inner) => inner.as_str().trim(),
        None => trimmed,
    }
}

/// Return the first balanced `{...}` substring, honouring string literals
/// and escapes so braces inside strings do not count.
pub fn first_json_object(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;
    for (offset, ch) in text[start..].char_indices() {
        if in_string {
            match ch {
                _ if escaped => escaped = false,
                '\\' => escaped = true,
                '"' => in_string = false,
                _ => {}
            }
            continue;
        }
        match ch {
            '"' => in_string = true,
            '{' => depth += 1,
            '}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(&text[start..start + offset + ch.len_utf8()]);
                }
            }
            _ => {}
        }
    }
    None
}

/// Decode a model reply into `T`.
///
/// Tries the fence-stripped text first, then the first balanced object found
/// anywhere in the reply. Both failing yields
/// [`CoachError::MalformedResponse`] carrying the first parse error.
pub fn extract_json<T: DeserializeOwned>(raw: &str) -> Result<T> {
    let body = strip_code_fences(raw);
    let first_err = match serde_json::from_str::<T>(body) {
        Ok(v) => return Ok(v),
        Err(e) => e,
    };
    if let Some(candidate) = first_json_object(body) {
        if let Ok(v) = serde_json::from_str::<T>(candidate) {
            tracing::debug!("recovered JSON object embedded in model reply");
            return Ok(v);
        }
    }
    Err(CoachError::MalformedResponse(first_err.to_string()))
}

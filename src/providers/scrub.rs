//! Secret scrubbing for provider error paths.
//!
//! Provider error bodies can echo back the request, including the
//! Authorization header. Anything that looks like a credential is replaced
//! with `[REDACTED]` before the text reaches logs or the terminal, and the
//! result is capped so a huge HTML error page cannot flood the output.

use std::borrow::Cow;

const MAX_API_ERROR_CHARS: usize = 200;

/// Prefixes that introduce a secret token in provider payloads.
const SECRET_MARKERS: &[&str] = &[
    "sk-",
    "Bearer ",
    "bearer ",
    "api_key=",
    "\"api_key\":\"",
    "access_token=",
    "\"access_token\":\"",
];

fn is_token_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.' | '+' | '/' | '=')
}

/// Replaces credential-looking tokens with `[REDACTED]`.
///
/// Returns the input unchanged (borrowed) when no marker is present.
pub fn scrub_secrets(input: &str) -> Cow<'_, str> {
    if !SECRET_MARKERS.iter().any(|m| input.contains(m)) {
        return Cow::Borrowed(input);
    }

    let mut scrubbed = input.to_string();
    for marker in SECRET_MARKERS {
        let mut cursor = 0;
        while let Some(found) = scrubbed[cursor..].find(marker) {
            let start = cursor + found;
            let token_start = start + marker.len();
            let token_len: usize = scrubbed[token_start..]
                .chars()
                .take_while(|&c| is_token_char(c))
                .map(char::len_utf8)
                .sum();
            if token_len == 0 {
                cursor = token_start;
                continue;
            }
            scrubbed.replace_range(start..token_start + token_len, "[REDACTED]");
            cursor = start + "[REDACTED]".len();
        }
    }
    Cow::Owned(scrubbed)
}

/// Scrubs and truncates provider error text for display.
pub fn sanitize_api_error(input: &str) -> String {
    let scrubbed = scrub_secrets(input);
    if scrubbed.chars().count() <= MAX_API_ERROR_CHARS {
        return scrubbed.into_owned();
    }
    let mut end = MAX_API_ERROR_CHARS;
    while end > 0 && !scrubbed.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}...", &scrubbed[..end])
}

/// Converts a non-success provider response into a displayable error.
pub async fn api_error(provider: &str, response: reqwest::Response) -> anyhow::Error {
    let status = response.status();
    let body = response
        .text()
        .await
        .unwrap_or_else(|_| "<failed to read provider error body>".to_string());
    anyhow::anyhow!("{provider} API error ({status}): {}", sanitize_api_error(&body))
}

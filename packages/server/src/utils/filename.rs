/// Why an uploaded filename was rejected.
#[derive(Debug, PartialEq, Eq)]
pub enum FilenameError {
    /// Filename is empty or whitespace-only.
    Empty,
    /// Filename contains path separators (`/` or `\`).
    ContainsPathSeparator,
    /// Filename is `..`.
    PathTraversal,
    /// Filename contains control characters (CR, LF, NUL, etc.).
    ControlCharacter,
    /// Filename is longer than [`MAX_FILENAME_LEN`] characters.
    TooLong,
}

pub const MAX_FILENAME_LEN: usize = 255;

impl FilenameError {
    pub fn message(&self) -> &'static str {
        match self {
            Self::Empty => "Filename cannot be empty",
            Self::ContainsPathSeparator => "Invalid filename: path separators are not allowed",
            Self::PathTraversal => "Invalid filename: '..' is not allowed",
            Self::ControlCharacter => "Invalid filename: control characters are not allowed",
            Self::TooLong => "Invalid filename: at most 255 characters are allowed",
        }
    }
}

/// Validate the client-supplied name of an uploaded file.
///
/// The name is display-only, but it ends up in `Content-Disposition`.
pub fn validate_upload_filename(filename: &str) -> Result<&str, FilenameError> {
    let trimmed = filename.trim();

    if trimmed.is_empty() {
        return Err(FilenameError::Empty);
    }

    // Also covers NUL and CRLF header injection.
    if trimmed.chars().any(|c| c.is_control()) {
        return Err(FilenameError::ControlCharacter);
    }

    if trimmed.contains('/') || trimmed.contains('\\') {
        return Err(FilenameError::ContainsPathSeparator);
    }

    if trimmed == ".." {
        return Err(FilenameError::PathTraversal);
    }

    if trimmed.chars().count() > MAX_FILENAME_LEN {
        return Err(FilenameError::TooLong);
    }

    Ok(trimmed)
}

/// Build a safe `Content-Disposition` header value.
pub fn content_disposition(filename: &str) -> String {
    let ascii_safe: String = filename
        .chars()
        .filter(|c| c.is_ascii_graphic() && !matches!(c, '"' | ';' | '\\'))
        .collect();
    let ascii_name = if ascii_safe.is_empty() {
        "download".to_string()
    } else {
        ascii_safe
    };

    // RFC 5987 percent-encoding for filename*.
    let encoded: String = filename
        .bytes()
        .map(|b| match b {
            b'A'..=b'Z'
            | b'a'..=b'z'
            | b'0'..=b'9'
            | b'!'
            | b'#'
            | b'$'
            | b'&'
            | b'+'
            | b'-'
            | b'.'
            | b'^'
            | b'_'
            | b'`'
            | b'|'
            | b'~' => String::from(b as char),
            _ => format!("%{b:02X}"),
        })
        .collect();

    format!("inline; filename=\"{ascii_name}\"; filename*=UTF-8''{encoded}")
}

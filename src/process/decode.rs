pub fn normalize_encoding(label: &str) -> String {
    label.trim().to_ascii_lowercase().replace('_', "-")
}

pub fn is_supported_encoding(label: &str) -> bool {
    matches!(
        normalize_encoding(label).as_str(),
        "utf-8" | "utf8" | "ascii" | "us-ascii" | "latin-1" | "latin1" | "iso-8859-1"
    )
}

/// Decodes captured output. `None` means the bytes are not valid under
/// `encoding` or the encoding is unknown.
pub fn decode_output(bytes: &[u8], encoding: &str) -> Option<String> {
    match normalize_encoding(encoding).as_str() {
        "utf-8" | "utf8" => String::from_utf8(bytes.to_vec()).ok(),
        "ascii" | "us-ascii" => {
            if bytes.is_ascii() {
                Some(bytes.iter().map(|b| char::from(*b)).collect())
            } else {
                None
            }
        }
        "latin-1" | "latin1" | "iso-8859-1" => Some(bytes.iter().map(|b| char::from(*b)).collect()),
        _ => None,
    }
}

/// Encodes stdin text. Characters outside the target encoding are replaced with `?`.
pub fn encode_input(text: &str, encoding: &str) -> Vec<u8> {
    match normalize_encoding(encoding).as_str() {
        "ascii" | "us-ascii" => text
            .chars()
            .map(|ch| if ch.is_ascii() { ch as u8 } else { b'?' })
            .collect(),
        "latin-1" | "latin1" | "iso-8859-1" => text
            .chars()
            .map(|ch| u8::try_from(u32::from(ch)).unwrap_or(b'?'))
            .collect(),
        _ => text.as_bytes().to_vec(),
    }
}

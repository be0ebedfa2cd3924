//! Byte-level helpers for loading documents.

use std::borrow::Cow;

/// Decode document bytes to a string.
///
/// UTF-8 is tried first (a BOM is honored). If the bytes are not valid
/// UTF-8, `hint_encoding` is used when it names a known encoding, and
/// Windows-1252 otherwise.
pub fn decode_text<'a>(bytes: &'a [u8], hint_encoding: Option<&str>) -> Cow<'a, str> {
    let (result, _encoding, malformed) = encoding_rs::UTF_8.decode(bytes);
    if !malformed {
        return result;
    }

    if let Some(name) = hint_encoding
        && let Some(encoding) = encoding_rs::Encoding::for_label(name.as_bytes())
    {
        let (result, _, _) = encoding.decode(bytes);
        return result;
    }

    let (result, _, _) = encoding_rs::WINDOWS_1252.decode(bytes);
    result
}

/// Encoding named by a leading `<?xml ... encoding="..."?>` declaration.
pub fn extract_xml_encoding(bytes: &[u8]) -> Option<&str> {
    // The declaration, if any, sits at the very start.
    let prefix = &bytes[..bytes.len().min(100)];

    let xml_start = prefix.windows(5).position(|w| w == b"<?xml")?;
    let after_xml = &prefix[xml_start..];

    let enc_pos = after_xml
        .windows(9)
        .position(|w| w.eq_ignore_ascii_case(b"encoding="))?;
    let after_enc = &after_xml[enc_pos + 9..];

    let quote = *after_enc.first()?;
    if quote != b'"' && quote != b'\'' {
        return None;
    }

    let value = &after_enc[1..];
    let end = value.iter().position(|&b| b == quote)?;
    std::str::from_utf8(&value[..end]).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_xml_encoding() {
        assert_eq!(
            extract_xml_encoding(b"<?xml version=\"1.0\" encoding=\"windows-1252\"?><html/>"),
            Some("windows-1252")
        );
        assert_eq!(
            extract_xml_encoding(b"<?xml version='1.0' ENCODING='utf-8'?>"),
            Some("utf-8")
        );
        assert_eq!(extract_xml_encoding(b"<html></html>"), None);
        assert_eq!(extract_xml_encoding(b"<?xml version=\"1.0\" encoding="), None);
    }

    #[test]
    fn test_decode_text_prefers_utf8() {
        let text = decode_text("Caf\u{e9}".as_bytes(), Some("windows-1252"));
        assert_eq!(text, "Café");
        assert!(matches!(text, Cow::Borrowed(_)));
    }

    #[test]
    fn test_decode_text_falls_back_to_windows_1252() {
        assert_eq!(decode_text(b"\x93quoted\x94", None), "\u{201c}quoted\u{201d}");
    }
}

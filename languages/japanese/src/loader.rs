use std::fs::File;
use std::io::{self, Read};
use std::path::Path;

use encoding_rs::{DecoderResult, EUC_JP, Encoding, SHIFT_JIS, UTF_8};

/// Bytes inspected when probing the format of a file
const PROBE_LENGTH: u64 = 64 * 1024;

/// Guess the character encoding of Japanese dictionary data.
///
/// A byte order mark wins; otherwise the first of UTF-8, EUC-JP and Shift_JIS
/// that decodes `bytes` without errors is chosen. A multi-byte sequence cut
/// off at the end of `bytes` is not counted as an error, so a file prefix can
/// be probed.
pub fn detect_encoding(bytes: &[u8]) -> &'static Encoding {
    if let Some((encoding, _)) = Encoding::for_bom(bytes) {
        return encoding;
    }

    for encoding in [UTF_8, EUC_JP, SHIFT_JIS] {
        if decodes_cleanly(encoding, bytes) {
            return encoding;
        }
    }

    tracing::warn!("Could not detect dictionary encoding, assuming EUC-JP");
    EUC_JP
}

fn decodes_cleanly(encoding: &'static Encoding, bytes: &[u8]) -> bool {
    let mut decoder = encoding.new_decoder_without_bom_handling();
    let capacity = decoder
        .max_utf8_buffer_length_without_replacement(bytes.len())
        .unwrap_or(bytes.len() * 3);
    let mut out = String::with_capacity(capacity);
    let (result, _) = decoder.decode_to_string_without_replacement(bytes, &mut out, false);
    matches!(result, DecoderResult::InputEmpty)
}

/// Read a whole dictionary file as text
pub fn read_text(path: &Path) -> io::Result<String> {
    let bytes = std::fs::read(path)?;
    let encoding = detect_encoding(&bytes);
    tracing::debug!("Reading {} as {}", path.display(), encoding.name());
    let (text, _, had_errors) = encoding.decode(&bytes);
    if had_errors {
        tracing::warn!(
            "{} contains bytes invalid in {}",
            path.display(),
            encoding.name()
        );
    }
    Ok(text.into_owned())
}

/// Read the beginning of a dictionary file as text, for format probing
pub fn read_prefix(path: &Path) -> io::Result<String> {
    let mut bytes = Vec::new();
    File::open(path)?.take(PROBE_LENGTH).read_to_end(&mut bytes)?;
    let encoding = detect_encoding(&bytes);
    let (text, _, _) = encoding.decode(&bytes);
    Ok(text.into_owned())
}

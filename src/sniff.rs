//! Text/binary detection for template files.
//! Binary files are copied verbatim; only text is passed through the renderer.

/// Decides whether file content should be treated as text.
pub trait ContentSniffer {
    fn is_text(&self, content: &[u8]) -> bool;
}

/// Treats content as binary if a NUL byte appears in the first 8 KiB or if it is not
/// valid UTF-8.
#[derive(Debug, Clone, Copy, Default)]
pub struct NulByteSniffer;

const SNIFF_LEN: usize = 8 * 1024;

impl ContentSniffer for NulByteSniffer {
    fn is_text(&self, content: &[u8]) -> bool {
        let head = &content[..content.len().min(SNIFF_LEN)];
        !head.contains(&0) && std::str::from_utf8(content).is_ok()
    }
}

//! ESC/POS command builder
//!
//! Provides a fluent API for building ESC/POS print data, plus the
//! formatting state types shared with [`crate::PrinterSession`].

use crate::encoding::{CODE_PAGE_WPC1252, encode_text};

const ESC: u8 = 0x1B;
const GS: u8 = 0x1D;
const LF: u8 = 0x0A;

/// Character font (`ESC M n`)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Font {
    #[default]
    A,
    B,
}

/// Justification (`ESC a n`)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Align {
    #[default]
    Left,
    Center,
    Right,
}

/// Emphasis (`ESC E n` / `ESC - n`)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Style {
    #[default]
    Normal,
    Bold,
    Underline,
    BoldUnderline,
}

/// Character size (`GS ! n`)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Size {
    #[default]
    Normal,
    DoubleHeight,
    DoubleWidth,
    Double,
}

/// ESC/POS command builder
///
/// Builds ESC/POS byte sequences for thermal printers.
/// Text is encoded to WPC1252 as it is written.
pub struct EscPosBuilder {
    buf: Vec<u8>,
}

impl EscPosBuilder {
    pub fn new() -> Self {
        Self {
            buf: Vec::with_capacity(4096),
        }
    }

    /// Bytes waiting to be sent
    pub fn len(&self) -> usize {
        self.buf.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    // === Printer State ===

    /// Initialize printer (ESC @) and select the Latin code page
    pub fn init(&mut self) -> &mut Self {
        self.buf.extend_from_slice(&[ESC, 0x40]);
        self.code_page(CODE_PAGE_WPC1252)
    }

    /// Select character code table (ESC t n)
    pub fn code_page(&mut self, table: u8) -> &mut Self {
        self.buf.extend_from_slice(&[ESC, 0x74, table]);
        self
    }

    // === Text Output ===

    /// Write raw text (will be WPC1252 encoded)
    pub fn text(&mut self, s: &str) -> &mut Self {
        self.buf.extend_from_slice(&encode_text(s));
        self
    }

    /// Write text followed by newline
    pub fn line(&mut self, s: &str) -> &mut Self {
        self.text(s);
        self.buf.push(LF);
        self
    }

    /// Write multiple empty lines
    pub fn feed(&mut self, lines: u8) -> &mut Self {
        // ESC d n - Print and feed n lines
        self.buf.extend_from_slice(&[ESC, 0x64, lines]);
        self
    }

    // === Formatting ===

    pub fn font(&mut self, font: Font) -> &mut Self {
        let n = match font {
            Font::A => 0x00,
            Font::B => 0x01,
        };
        self.buf.extend_from_slice(&[ESC, 0x4D, n]);
        self
    }

    pub fn align(&mut self, align: Align) -> &mut Self {
        let n = match align {
            Align::Left => 0x00,
            Align::Center => 0x01,
            Align::Right => 0x02,
        };
        self.buf.extend_from_slice(&[ESC, 0x61, n]);
        self
    }

    /// Set bold and underline together so no emphasis leaks from a previous style
    pub fn style(&mut self, style: Style) -> &mut Self {
        let (bold, underline) = match style {
            Style::Normal => (0x00, 0x00),
            Style::Bold => (0x01, 0x00),
            Style::Underline => (0x00, 0x01),
            Style::BoldUnderline => (0x01, 0x01),
        };
        self.buf.extend_from_slice(&[ESC, 0x45, bold]);
        self.buf.extend_from_slice(&[ESC, 0x2D, underline]);
        self
    }

    pub fn size(&mut self, size: Size) -> &mut Self {
        let n = match size {
            Size::Normal => 0x00,
            Size::DoubleHeight => 0x01,
            Size::DoubleWidth => 0x10,
            Size::Double => 0x11,
        };
        self.buf.extend_from_slice(&[GS, 0x21, n]);
        self
    }

    // === Paper Control ===

    /// Cut paper (full cut)
    ///
    /// Printers without a cutter ignore GS V.
    pub fn cut(&mut self) -> &mut Self {
        // GS V 0 - Full cut
        self.buf.extend_from_slice(&[GS, 0x56, 0x00]);
        self
    }

    // === Build ===

    /// Drain the pending bytes, keeping the builder usable
    pub fn take(&mut self) -> Vec<u8> {
        std::mem::take(&mut self.buf)
    }
}

impl Default for EscPosBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_basic() {
        let mut b = EscPosBuilder::new();
        b.init()
            .align(Align::Center)
            .size(Size::Double)
            .line("TÍTULO")
            .size(Size::Normal)
            .align(Align::Left)
            .line("conteúdo");

        let data = b.take();
        assert_eq!(&data[..5], &[0x1B, 0x40, 0x1B, 0x74, 16]);
        assert!(data.windows(3).any(|w| w == [0x1D, 0x21, 0x11]));
        // Í and ú encoded as single bytes
        assert!(data.windows(6).any(|w| w == [b'T', 0xCD, b'T', b'U', b'L', b'O']));
    }

    #[test]
    fn test_style_sets_both_flags() {
        let mut b = EscPosBuilder::new();
        b.style(Style::Bold);
        assert_eq!(b.take(), vec![0x1B, 0x45, 0x01, 0x1B, 0x2D, 0x00]);
    }

    #[test]
    fn test_feed_and_cut() {
        let mut b = EscPosBuilder::new();
        b.feed(3).cut();
        assert_eq!(b.take(), vec![0x1B, 0x64, 3, 0x1D, 0x56, 0x00]);
    }

    #[test]
    fn test_take_drains() {
        let mut b = EscPosBuilder::new();
        b.line("a");
        assert_eq!(b.take(), b"a\n".to_vec());
        assert!(b.is_empty());
        b.cut();
        assert_eq!(b.len(), 3);
    }
}

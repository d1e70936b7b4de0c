//! Printer sessions
//!
//! A session is one open connection to one physical printer, scoped to a
//! single job. Formatting calls only mutate the local buffer; `write_line`
//! flushes once the buffer grows large and `cut` always flushes.

use async_trait::async_trait;
use tracing::{debug, instrument};

use crate::error::PrintResult;
use crate::escpos::{Align, EscPosBuilder, Font, Size, Style};

/// Buffered bytes that trigger an early flush from `write_line`
const FLUSH_THRESHOLD: usize = 4096;

/// Lines fed before cutting so the last line clears the cutter
const FEED_BEFORE_CUT: u8 = 3;

/// Uniform formatting contract over every transport
#[async_trait]
pub trait PrinterSession: Send {
    /// Reset printer state to the baseline (font A, left, normal style and size)
    fn begin_formatting(&mut self);

    fn set_font(&mut self, font: Font);

    fn set_align(&mut self, align: Align);

    fn set_style(&mut self, style: Style);

    fn set_size(&mut self, size: Size);

    /// Emit one line in the current formatting state. Blank lines are kept.
    async fn write_line(&mut self, text: &str) -> PrintResult<()>;

    /// Feed, cut and flush everything buffered to the device
    async fn cut(&mut self) -> PrintResult<()>;

    /// Release the OS handle. Consumes the session so it runs at most once.
    async fn close(self: Box<Self>) -> PrintResult<()>;
}

/// Byte-level link to a device
#[async_trait]
pub trait Link: Send {
    async fn send(&mut self, data: &[u8]) -> PrintResult<()>;

    /// Flush and release the underlying handle
    async fn release(&mut self) -> PrintResult<()>;
}

/// ESC/POS session over any [`Link`]
pub struct EscPosSession<L: Link> {
    link: L,
    builder: EscPosBuilder,
}

impl<L: Link> EscPosSession<L> {
    pub fn new(link: L) -> Self {
        Self {
            link,
            builder: EscPosBuilder::default(),
        }
    }

    async fn flush(&mut self) -> PrintResult<()> {
        if self.builder.is_empty() {
            return Ok(());
        }
        let data = self.builder.take();
        debug!(bytes = data.len(), "Flushing print buffer");
        self.link.send(&data).await
    }
}

#[async_trait]
impl<L: Link> PrinterSession for EscPosSession<L> {
    fn begin_formatting(&mut self) {
        self.builder
            .init()
            .font(Font::A)
            .align(Align::Left)
            .style(Style::Normal)
            .size(Size::Normal);
    }

    fn set_font(&mut self, font: Font) {
        self.builder.font(font);
    }

    fn set_align(&mut self, align: Align) {
        self.builder.align(align);
    }

    fn set_style(&mut self, style: Style) {
        self.builder.style(style);
    }

    fn set_size(&mut self, size: Size) {
        self.builder.size(size);
    }

    async fn write_line(&mut self, text: &str) -> PrintResult<()> {
        self.builder.line(text);
        if self.builder.len() >= FLUSH_THRESHOLD {
            self.flush().await?;
        }
        Ok(())
    }

    #[instrument(skip(self))]
    async fn cut(&mut self) -> PrintResult<()> {
        self.builder.feed(FEED_BEFORE_CUT).cut();
        self.flush().await
    }

    async fn close(self: Box<Self>) -> PrintResult<()> {
        let mut this = self;
        this.link.release().await
    }
}

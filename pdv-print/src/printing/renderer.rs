//! Receipt and ticket renderer
//!
//! Turns a normalized [`PrintJob`] into an ordered sequence of formatting,
//! text and cut calls against an open [`PrinterSession`]. The renderer never
//! touches the transport directly.

use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use pdv_printer::{Align, PrintResult, PrinterSession, Size, Style};
use shared::models::{
    Customer, DeliveryOrder, KitchenOrder, OrderType, Payment, PrintItem, PrintJob, SaleReceipt,
    TableOrder,
};

use super::money::{CurrencyLocale, format_currency_with, format_decimal, format_quantity, line_total};

const ITEM_INDENT: &str = "   ";

/// Job renderer
///
/// Stateless apart from presentation settings, shared by every job.
#[derive(Debug, Clone)]
pub struct JobRenderer {
    store_name: String,
    timezone: Tz,
    locale: CurrencyLocale,
}

impl JobRenderer {
    pub fn new(store_name: impl Into<String>, timezone: Tz, locale: CurrencyLocale) -> Self {
        Self {
            store_name: store_name.into(),
            timezone,
            locale,
        }
    }

    /// Render a job stamped with the current time
    pub async fn render(
        &self,
        job: &PrintJob,
        width: usize,
        session: &mut dyn PrinterSession,
    ) -> PrintResult<()> {
        self.render_at(job, width, session, Utc::now()).await
    }

    /// Render a job stamped with `now`
    pub async fn render_at(
        &self,
        job: &PrintJob,
        width: usize,
        session: &mut dyn PrinterSession,
        now: DateTime<Utc>,
    ) -> PrintResult<()> {
        session.begin_formatting();

        match job {
            PrintJob::Kitchen(order) => self.render_kitchen(session, order).await?,
            PrintJob::Sale(receipt) => self.render_sale(session, width, receipt).await?,
            PrintJob::Delivery(order) => self.render_delivery(session, width, order).await?,
            PrintJob::Table(order) => self.render_table(session, width, order).await?,
            PrintJob::Text(lines) => {
                for line in lines {
                    session.write_line(line).await?;
                }
                return session.cut().await;
            }
            PrintJob::TestPage { printer_name } => {
                self.render_test_page(session, width, printer_name).await?
            }
        }

        self.render_footer(session, now).await
    }

    async fn render_header(&self, session: &mut dyn PrinterSession, title: &str) -> PrintResult<()> {
        session.set_align(Align::Center);
        session.set_style(Style::Bold);
        session.set_size(Size::Double);
        session.write_line(title).await?;

        session.set_size(Size::Normal);
        session.set_style(Style::Normal);
        session.write_line("").await?;
        session.set_align(Align::Left);
        Ok(())
    }

    async fn render_kitchen(
        &self,
        session: &mut dyn PrinterSession,
        order: &KitchenOrder,
    ) -> PrintResult<()> {
        self.render_header(session, "COZINHA").await?;

        if !order.order_id.is_empty() {
            session.write_line(&format!("Pedido #{}", order.order_id)).await?;
        }

        // Order type banner
        session.set_style(Style::Bold);
        session.set_size(Size::DoubleHeight);
        session.write_line(&order.order_type.to_string()).await?;
        session.set_size(Size::Normal);
        session.set_style(Style::Normal);

        if order.order_type == OrderType::Delivery
            && let Some(customer) = &order.customer
        {
            if let Some(name) = &customer.name {
                session.write_line(&format!("Cliente: {}", name)).await?;
            }
            if let Some(phone) = &customer.phone {
                session.write_line(&format!("Tel: {}", phone)).await?;
            }
        }
        session.write_line("").await?;

        for item in &order.items {
            session.write_line(&item_line(item)).await?;
            if !item.observations.trim().is_empty() {
                session
                    .write_line(&format!("{}Obs: {}", ITEM_INDENT, item.observations.trim()))
                    .await?;
            }
        }

        self.render_notes(session, &order.notes).await
    }

    async fn render_sale(
        &self,
        session: &mut dyn PrinterSession,
        width: usize,
        receipt: &SaleReceipt,
    ) -> PrintResult<()> {
        self.render_header(session, &self.store_name).await?;

        if !receipt.sale_id.is_empty() {
            session.write_line(&format!("Venda #{}", receipt.sale_id)).await?;
        }
        if !receipt.seller.is_empty() {
            session.write_line(&format!("Vendedor: {}", receipt.seller)).await?;
        }
        if let Some(customer) = &receipt.customer {
            self.render_customer(session, customer).await?;
        }

        self.render_priced_items(session, &receipt.items).await?;
        self.render_total(session, width, receipt.total).await?;
        self.render_payment(session, &receipt.payment).await
    }

    async fn render_delivery(
        &self,
        session: &mut dyn PrinterSession,
        width: usize,
        order: &DeliveryOrder,
    ) -> PrintResult<()> {
        self.render_header(session, "DELIVERY").await?;

        if !order.order_id.is_empty() {
            session.write_line(&format!("Pedido #{}", order.order_id)).await?;
        }
        self.render_customer(session, &order.customer).await?;
        if let Some(eta) = &order.delivery.estimated_time {
            session.write_line(&format!("Previsão: {}", eta)).await?;
        }

        self.render_priced_items(session, &order.items).await?;
        if order.delivery.fee > 0.0 {
            session
                .write_line(&format!(
                    "Taxa de entrega: {}",
                    format_currency_with(order.delivery.fee, self.locale)
                ))
                .await?;
        }
        self.render_total(session, width, order.total).await?;
        self.render_payment(session, &order.payment).await
    }

    async fn render_table(
        &self,
        session: &mut dyn PrinterSession,
        width: usize,
        order: &TableOrder,
    ) -> PrintResult<()> {
        self.render_header(session, &format!("MESA {}", order.table_number)).await?;

        if !order.order_id.is_empty() {
            session.write_line(&format!("Pedido #{}", order.order_id)).await?;
        }
        if let Some(customer) = &order.customer {
            self.render_customer(session, customer).await?;
        }

        self.render_priced_items(session, &order.items).await?;
        self.render_total(session, width, order.total).await?;
        self.render_notes(session, &order.notes).await
    }

    async fn render_test_page(
        &self,
        session: &mut dyn PrinterSession,
        width: usize,
        printer_name: &str,
    ) -> PrintResult<()> {
        self.render_header(session, "TESTE DE IMPRESSÃO").await?;

        session.write_line(&format!("Impressora: {}", printer_name)).await?;
        session.write_line(&format!("Largura: {} colunas", width)).await?;
        session.write_line("").await?;
        session.write_line("Acentuação: áéíóú âêô ãõ ç").await?;
        session.write_line(&"-".repeat(width)).await?;

        session.set_style(Style::Bold);
        session.write_line("Negrito").await?;
        session.set_style(Style::Underline);
        session.write_line("Sublinhado").await?;
        session.set_style(Style::Normal);
        session.set_size(Size::Double);
        session.write_line("Grande").await?;
        session.set_size(Size::Normal);

        session.write_line("").await?;
        session.write_line("Impressora funcionando!").await
    }

    async fn render_priced_items(
        &self,
        session: &mut dyn PrinterSession,
        items: &[PrintItem],
    ) -> PrintResult<()> {
        session.write_line("").await?;
        for item in items {
            session.write_line(&item_line(item)).await?;
            let amount = format_decimal(line_total(item.quantity, item.price), self.locale);
            session.write_line(&format!("{}{}", ITEM_INDENT, amount)).await?;
        }
        Ok(())
    }

    async fn render_total(
        &self,
        session: &mut dyn PrinterSession,
        width: usize,
        total: f64,
    ) -> PrintResult<()> {
        session.write_line(&"-".repeat(width)).await?;
        session.set_align(Align::Right);
        session.set_style(Style::Bold);
        session
            .write_line(&format!("TOTAL: {}", format_currency_with(total, self.locale)))
            .await?;
        session.set_style(Style::Normal);
        session.set_align(Align::Left);
        Ok(())
    }

    async fn render_customer(
        &self,
        session: &mut dyn PrinterSession,
        customer: &Customer,
    ) -> PrintResult<()> {
        if let Some(name) = &customer.name {
            session.write_line(&format!("Cliente: {}", name)).await?;
        }
        if let Some(phone) = &customer.phone {
            session.write_line(&format!("Tel: {}", phone)).await?;
        }
        if let Some(address) = &customer.address {
            session.write_line(&format!("End: {}", address)).await?;
        }
        Ok(())
    }

    async fn render_payment(
        &self,
        session: &mut dyn PrinterSession,
        payment: &Payment,
    ) -> PrintResult<()> {
        if !payment.method.is_empty() {
            session.write_line(&format!("Pagamento: {}", payment.method)).await?;
        }
        if payment.change > 0.0 {
            session
                .write_line(&format!("Troco: {}", format_currency_with(payment.change, self.locale)))
                .await?;
        }
        Ok(())
    }

    async fn render_notes(&self, session: &mut dyn PrinterSession, notes: &str) -> PrintResult<()> {
        let notes = notes.trim();
        if notes.is_empty() {
            return Ok(());
        }
        session.write_line("").await?;
        session.write_line(&format!("Obs: {}", notes)).await
    }

    async fn render_footer(
        &self,
        session: &mut dyn PrinterSession,
        now: DateTime<Utc>,
    ) -> PrintResult<()> {
        session.write_line("").await?;
        session.set_align(Align::Center);
        session.set_style(Style::Normal);
        session.set_size(Size::Normal);
        session.write_line(&format_timestamp(now, self.timezone)).await?;
        session.write_line("").await?;
        session.cut().await
    }
}

impl Default for JobRenderer {
    fn default() -> Self {
        Self::new("PDV", chrono_tz::America::Sao_Paulo, CurrencyLocale::default())
    }
}

fn item_line(item: &PrintItem) -> String {
    format!("{}x {}", format_quantity(item.quantity), item.name)
}

/// Format a timestamp (dd/mm/YYYY HH:MM:SS) in the given timezone
fn format_timestamp(now: DateTime<Utc>, tz: Tz) -> String {
    now.with_timezone(&tz).format("%d/%m/%Y %H:%M:%S").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use pdv_printer::Font;

    #[derive(Debug, Clone, PartialEq)]
    enum Call {
        Begin,
        Align(Align),
        Style(Style),
        Size(Size),
        Line(String),
        Cut,
    }

    #[derive(Default)]
    struct RecordingSession {
        calls: Vec<Call>,
    }

    impl RecordingSession {
        fn lines(&self) -> Vec<&str> {
            self.calls
                .iter()
                .filter_map(|c| match c {
                    Call::Line(l) => Some(l.as_str()),
                    _ => None,
                })
                .collect()
        }
    }

    #[async_trait]
    impl PrinterSession for RecordingSession {
        fn begin_formatting(&mut self) {
            self.calls.push(Call::Begin);
        }
        fn set_font(&mut self, _font: Font) {}
        fn set_align(&mut self, align: Align) {
            self.calls.push(Call::Align(align));
        }
        fn set_style(&mut self, style: Style) {
            self.calls.push(Call::Style(style));
        }
        fn set_size(&mut self, size: Size) {
            self.calls.push(Call::Size(size));
        }
        async fn write_line(&mut self, text: &str) -> PrintResult<()> {
            self.calls.push(Call::Line(text.to_string()));
            Ok(())
        }
        async fn cut(&mut self) -> PrintResult<()> {
            self.calls.push(Call::Cut);
            Ok(())
        }
        async fn close(self: Box<Self>) -> PrintResult<()> {
            Ok(())
        }
    }

    fn fixed_now() -> DateTime<Utc> {
        // 2024-01-22 14:32:15 UTC
        DateTime::from_timestamp(1705933935, 0).unwrap()
    }

    fn sale(items: Vec<PrintItem>, total: f64) -> PrintJob {
        PrintJob::Sale(SaleReceipt {
            sale_id: "42".into(),
            items,
            total,
            payment: Payment {
                method: "Dinheiro".into(),
                change: 0.0,
            },
            customer: None,
            seller: String::new(),
        })
    }

    #[tokio::test]
    async fn test_sale_receipt_lines() {
        let renderer = JobRenderer::default();
        let mut session = RecordingSession::default();
        let job = sale(vec![PrintItem::new("X", 2.0, 5.0)], 10.0);

        renderer.render_at(&job, 48, &mut session, fixed_now()).await.unwrap();

        let lines = session.lines();
        assert_eq!(lines[0], "PDV");
        let item = lines.iter().position(|l| *l == "2x X").unwrap();
        assert_eq!(lines[item + 1], "   R$ 10.00");
        assert!(lines[item..].contains(&"TOTAL: R$ 10.00"));
        assert!(lines.contains(&"Pagamento: Dinheiro"));
        assert!(!lines.iter().any(|l| l.starts_with("Troco")));
        assert!(lines.contains(&"22/01/2024 11:32:15"));
        assert_eq!(session.calls.first(), Some(&Call::Begin));
        assert_eq!(session.calls.last(), Some(&Call::Cut));
    }

    #[tokio::test]
    async fn test_header_formatting() {
        let renderer = JobRenderer::new("Cantina", chrono_tz::UTC, CurrencyLocale::Legacy);
        let mut session = RecordingSession::default();
        renderer
            .render_at(&sale(vec![], 0.0), 48, &mut session, fixed_now())
            .await
            .unwrap();

        assert_eq!(
            &session.calls[..5],
            &[
                Call::Begin,
                Call::Align(Align::Center),
                Call::Style(Style::Bold),
                Call::Size(Size::Double),
                Call::Line("Cantina".into()),
            ]
        );
    }

    #[tokio::test]
    async fn test_empty_items_still_print_header_total_footer() {
        let renderer = JobRenderer::new("PDV", chrono_tz::UTC, CurrencyLocale::Legacy);
        let mut session = RecordingSession::default();
        renderer
            .render_at(&sale(vec![], 0.0), 48, &mut session, fixed_now())
            .await
            .unwrap();

        let lines = session.lines();
        assert_eq!(lines[0], "PDV");
        assert!(lines.contains(&"TOTAL: R$ 0.00"));
        assert!(lines.contains(&"22/01/2024 14:32:15"));
        assert_eq!(session.calls.last(), Some(&Call::Cut));
    }

    #[tokio::test]
    async fn test_kitchen_ticket() {
        let renderer = JobRenderer::default();
        let mut session = RecordingSession::default();
        let job = PrintJob::Kitchen(KitchenOrder {
            order_id: "7".into(),
            order_type: OrderType::Delivery,
            items: vec![
                PrintItem::new("Pizza", 1.0, 40.0).with_observations("sem cebola"),
                PrintItem::new("Suco", 2.0, 6.0),
            ],
            customer: Some(Customer {
                name: Some("Ana".into()),
                phone: Some("11 98888-7777".into()),
                address: None,
            }),
            notes: "entregar rápido".into(),
            mesa: None,
        });

        renderer.render_at(&job, 48, &mut session, fixed_now()).await.unwrap();

        let lines = session.lines();
        assert_eq!(lines[0], "COZINHA");
        assert!(lines.contains(&"DELIVERY"));
        assert!(lines.contains(&"Cliente: Ana"));
        let pizza = lines.iter().position(|l| *l == "1x Pizza").unwrap();
        assert_eq!(lines[pizza + 1], "   Obs: sem cebola");
        assert_eq!(lines[pizza + 2], "2x Suco");
        assert!(lines.contains(&"Obs: entregar rápido"));
        // kitchen tickets carry no prices
        assert!(!lines.iter().any(|l| l.contains("R$")));
    }

    #[tokio::test]
    async fn test_table_title() {
        let renderer = JobRenderer::default();
        let mut session = RecordingSession::default();
        let job = PrintJob::Table(TableOrder {
            table_number: "5".into(),
            order_id: String::new(),
            items: vec![PrintItem::new("Cerveja", 3.0, 8.5)],
            total: 25.5,
            customer: None,
            notes: String::new(),
        });

        renderer.render_at(&job, 32, &mut session, fixed_now()).await.unwrap();

        let lines = session.lines();
        assert_eq!(lines[0], "MESA 5");
        assert!(lines.contains(&"   R$ 25.50"));
        assert!(lines.contains(&"TOTAL: R$ 25.50"));
    }

    #[tokio::test]
    async fn test_text_job_cuts_without_footer() {
        let renderer = JobRenderer::default();
        let mut session = RecordingSession::default();
        let job = PrintJob::Text(vec!["linha 1".into(), " ".into(), "linha 2".into()]);

        renderer.render_at(&job, 48, &mut session, fixed_now()).await.unwrap();

        assert_eq!(session.lines(), vec!["linha 1", " ", "linha 2"]);
        assert_eq!(session.calls.last(), Some(&Call::Cut));
    }

    #[test]
    fn test_format_timestamp() {
        assert_eq!(
            format_timestamp(fixed_now(), chrono_tz::America::Sao_Paulo),
            "22/01/2024 11:32:15"
        );
    }
}

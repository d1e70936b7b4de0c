//! Print job models
//!
//! Canonical, already normalized shapes the printing core works on.
//! Built fresh for every print request and discarded afterwards.

use serde::{Deserialize, Serialize};
use std::fmt;

/// One printed line item
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PrintItem {
    pub name: String,
    pub quantity: f64,
    /// Unit price
    pub price: f64,
    pub observations: String,
}

impl PrintItem {
    pub fn new(name: impl Into<String>, quantity: f64, price: f64) -> Self {
        Self {
            name: name.into(),
            quantity,
            price,
            observations: String::new(),
        }
    }

    pub fn with_observations(mut self, observations: impl Into<String>) -> Self {
        self.observations = observations.into();
        self
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Customer {
    pub name: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
}

impl Customer {
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.phone.is_none() && self.address.is_none()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Payment {
    pub method: String,
    pub change: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DeliveryInfo {
    pub fee: f64,
    pub estimated_time: Option<String>,
}

/// Where the order is served
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum OrderType {
    /// BALCÃO
    Counter,
    /// MESA #N
    Table(String),
    Delivery,
}

impl fmt::Display for OrderType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OrderType::Counter => write!(f, "BALCÃO"),
            OrderType::Table(n) => write!(f, "MESA #{}", n),
            OrderType::Delivery => write!(f, "DELIVERY"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KitchenOrder {
    pub order_id: String,
    pub order_type: OrderType,
    pub items: Vec<PrintItem>,
    pub customer: Option<Customer>,
    pub notes: String,
    pub mesa: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SaleReceipt {
    pub sale_id: String,
    pub items: Vec<PrintItem>,
    pub total: f64,
    pub payment: Payment,
    pub customer: Option<Customer>,
    pub seller: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeliveryOrder {
    pub order_id: String,
    pub items: Vec<PrintItem>,
    pub total: f64,
    pub customer: Customer,
    pub delivery: DeliveryInfo,
    pub payment: Payment,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableOrder {
    pub table_number: String,
    pub order_id: String,
    pub items: Vec<PrintItem>,
    pub total: f64,
    pub customer: Option<Customer>,
    pub notes: String,
}

/// A single print request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum PrintJob {
    Kitchen(KitchenOrder),
    Sale(SaleReceipt),
    Delivery(DeliveryOrder),
    Table(TableOrder),
    /// Legacy free text, one entry per printed line
    Text(Vec<String>),
    /// Diagnostic page
    TestPage { printer_name: String },
}

impl PrintJob {
    /// Short label for logs and success messages
    pub fn label(&self) -> &'static str {
        match self {
            PrintJob::Kitchen(_) => "pedido da cozinha",
            PrintJob::Sale(_) => "cupom de venda",
            PrintJob::Delivery(_) => "pedido delivery",
            PrintJob::Table(_) => "comanda da mesa",
            PrintJob::Text(_) => "texto",
            PrintJob::TestPage { .. } => "teste de impressão",
        }
    }

    pub fn items(&self) -> &[PrintItem] {
        match self {
            PrintJob::Kitchen(o) => &o.items,
            PrintJob::Sale(r) => &r.items,
            PrintJob::Delivery(o) => &o.items,
            PrintJob::Table(o) => &o.items,
            PrintJob::Text(_) | PrintJob::TestPage { .. } => &[],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_order_type_banner() {
        assert_eq!(OrderType::Counter.to_string(), "BALCÃO");
        assert_eq!(OrderType::Table("7".into()).to_string(), "MESA #7");
        assert_eq!(OrderType::Delivery.to_string(), "DELIVERY");
    }

    #[test]
    fn test_customer_is_empty() {
        assert!(Customer::default().is_empty());
        let c = Customer {
            phone: Some("11 99999-0000".into()),
            ..Default::default()
        };
        assert!(!c.is_empty());
    }
}

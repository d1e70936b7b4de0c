//! Normalization of caller-supplied business objects
//!
//! Callers hand over whatever they hold (a cart, a sale confirmation, a
//! delivery card) as JSON. Every field is looked up through an ordered list
//! of synonyms and folded into the typed job models. This is the only place
//! that deals with untyped input.

use serde_json::Value;
use shared::models::{
    Customer, DeliveryInfo, DeliveryOrder, KitchenOrder, OrderType, Payment, PrintItem,
    SaleReceipt, TableOrder,
};

// Item fields, highest priority first
const ITEM_LIST_KEYS: &[&str] = &["itens", "items", "produtos", "products"];
const ITEM_NAME_KEYS: &[&str] = &["nome", "name", "produto", "descricao", "description"];
const ITEM_QUANTITY_KEYS: &[&str] = &["quantidade", "quantity", "qtd", "qty"];
const ITEM_PRICE_KEYS: &[&str] = &["preco", "price", "valor", "preco_unitario", "unit_price", "unitPrice"];
const ITEM_OBS_KEYS: &[&str] = &["observacoes", "observations", "obs", "observacao"];

// Order fields
const ORDER_ID_KEYS: &[&str] = &["pedidoId", "pedido_id", "orderId", "order_id", "id", "numero"];
const SALE_ID_KEYS: &[&str] = &["vendaId", "venda_id", "saleId", "sale_id", "id", "numero"];
const ORDER_TYPE_KEYS: &[&str] = &["tipo", "type", "orderType", "order_type", "tipo_pedido"];
const DELIVERY_FLAG_KEYS: &[&str] = &["delivery", "isDelivery", "is_delivery"];
const TABLE_KEYS: &[&str] = &[
    "mesa",
    "mesa_id",
    "mesaId",
    "numero_mesa",
    "table",
    "tableNumber",
    "table_number",
    "tableId",
];
const TOTAL_KEYS: &[&str] = &["total", "valor_total", "valorTotal", "totalAmount", "total_amount"];
const NOTES_KEYS: &[&str] = &["observacoes", "observacao", "obs", "notes", "notas"];

// Payment
const PAYMENT_OBJECT_KEYS: &[&str] = &["pagamento", "payment"];
const PAYMENT_METHOD_KEYS: &[&str] = &[
    "forma_pagamento",
    "formaPagamento",
    "metodo_pagamento",
    "payment_method",
    "paymentMethod",
];
const NESTED_METHOD_KEYS: &[&str] = &["metodo", "method", "forma", "tipo"];
const CHANGE_KEYS: &[&str] = &["troco", "change"];

// Customer
const CUSTOMER_OBJECT_KEYS: &[&str] = &["cliente", "customer"];
const CUSTOMER_NAME_KEYS: &[&str] = &["nome", "name"];
const CUSTOMER_PHONE_KEYS: &[&str] = &["telefone", "phone", "celular", "fone"];
const CUSTOMER_ADDRESS_KEYS: &[&str] = &["endereco", "address"];
const FLAT_CUSTOMER_NAME_KEYS: &[&str] = &["cliente_nome", "clienteNome", "customerName", "customer_name"];
const FLAT_CUSTOMER_PHONE_KEYS: &[&str] = &["telefone", "cliente_telefone", "customerPhone", "phone"];
const FLAT_CUSTOMER_ADDRESS_KEYS: &[&str] = &["endereco", "endereco_entrega", "address"];

// Seller
const SELLER_KEYS: &[&str] = &["vendedor", "seller", "operador", "usuario", "atendente"];

// Delivery
const DELIVERY_OBJECT_KEYS: &[&str] = &["entrega", "delivery"];
const DELIVERY_FEE_KEYS: &[&str] = &["taxa_entrega", "taxaEntrega", "deliveryFee", "delivery_fee"];
const NESTED_FEE_KEYS: &[&str] = &["taxa", "fee"];
const ESTIMATED_TIME_KEYS: &[&str] = &["tempo_estimado", "tempoEstimado", "estimatedTime", "estimated_time", "previsao"];

/// First non-null value among the synonyms
fn pick<'a>(v: &'a Value, keys: &[&str]) -> Option<&'a Value> {
    let obj = v.as_object()?;
    keys.iter()
        .filter_map(|k| obj.get(*k))
        .find(|value| !value.is_null())
}

/// Strings and numbers as trimmed, non-empty text
fn as_text(value: &Value) -> Option<String> {
    let text = match value {
        Value::String(s) => s.trim().to_string(),
        Value::Number(n) => n.to_string(),
        _ => return None,
    };
    (!text.is_empty()).then_some(text)
}

/// Numbers, numeric strings, and Brazilian "10,50" strings
fn as_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => {
            let cleaned = s.trim().trim_start_matches("R$").trim();
            let normalized = if cleaned.contains(',') {
                cleaned.replace('.', "").replace(',', ".")
            } else {
                cleaned.to_string()
            };
            normalized.parse().ok()
        }
        _ => None,
    }
    .filter(|n: &f64| n.is_finite())
}

fn text(v: &Value, keys: &[&str]) -> Option<String> {
    keys.iter()
        .filter_map(|k| v.as_object().and_then(|o| o.get(*k)))
        .find_map(as_text)
}

fn number(v: &Value, keys: &[&str]) -> Option<f64> {
    keys.iter()
        .filter_map(|k| v.as_object().and_then(|o| o.get(*k)))
        .find_map(as_number)
}

fn truthy(value: &Value) -> bool {
    match value {
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|n| n != 0.0),
        Value::String(s) => matches!(s.trim().to_lowercase().as_str(), "true" | "1" | "sim" | "s"),
        _ => false,
    }
}

/// Map one item onto the canonical shape
pub fn normalize_item(v: &Value) -> Option<PrintItem> {
    if let Some(name) = v.as_str() {
        return Some(PrintItem::new(name.trim(), 1.0, 0.0));
    }
    v.as_object()?;

    Some(PrintItem {
        name: text(v, ITEM_NAME_KEYS).unwrap_or_default(),
        quantity: number(v, ITEM_QUANTITY_KEYS).unwrap_or(1.0),
        price: number(v, ITEM_PRICE_KEYS).unwrap_or(0.0),
        observations: text(v, ITEM_OBS_KEYS).unwrap_or_default(),
    })
}

/// Items of an order; always a list, never absent
pub fn normalize_items(v: &Value) -> Vec<PrintItem> {
    pick(v, ITEM_LIST_KEYS)
        .and_then(Value::as_array)
        .map(|items| items.iter().filter_map(normalize_item).collect())
        .unwrap_or_default()
}

/// DELIVERY when flagged or carrying delivery details, MESA #n when a
/// table is present, BALCÃO otherwise
pub fn infer_order_type(v: &Value) -> OrderType {
    let typed_delivery = text(v, ORDER_TYPE_KEYS)
        .is_some_and(|t| t.eq_ignore_ascii_case("delivery") || t.eq_ignore_ascii_case("entrega"));
    let flagged_delivery = DELIVERY_FLAG_KEYS
        .iter()
        .filter_map(|k| v.as_object().and_then(|o| o.get(*k)))
        .any(|value| value.is_object() || truthy(value));

    if typed_delivery || flagged_delivery {
        return OrderType::Delivery;
    }

    match table_number(v) {
        Some(n) => OrderType::Table(n),
        None => OrderType::Counter,
    }
}

/// Table number from a scalar or a `{numero|number|id}` object
fn table_number(v: &Value) -> Option<String> {
    TABLE_KEYS
        .iter()
        .filter_map(|k| v.as_object().and_then(|o| o.get(*k)))
        .find_map(|value| match value {
            Value::Object(_) => text(value, &["numero", "number", "nome", "name", "id"]),
            other => as_text(other),
        })
}

/// Customer from a nested object, a bare name string, or flat fields
pub fn normalize_customer(v: &Value) -> Option<Customer> {
    let customer = match pick(v, CUSTOMER_OBJECT_KEYS) {
        Some(Value::String(name)) => Customer {
            name: Some(name.trim().to_string()).filter(|n| !n.is_empty()),
            phone: text(v, FLAT_CUSTOMER_PHONE_KEYS),
            address: text(v, FLAT_CUSTOMER_ADDRESS_KEYS),
        },
        Some(obj @ Value::Object(_)) => Customer {
            name: text(obj, CUSTOMER_NAME_KEYS),
            phone: text(obj, CUSTOMER_PHONE_KEYS),
            address: text(obj, CUSTOMER_ADDRESS_KEYS),
        },
        _ => Customer {
            name: text(v, FLAT_CUSTOMER_NAME_KEYS),
            phone: text(v, FLAT_CUSTOMER_PHONE_KEYS),
            address: text(v, FLAT_CUSTOMER_ADDRESS_KEYS),
        },
    };
    (!customer.is_empty()).then_some(customer)
}

pub fn normalize_payment(v: &Value) -> Payment {
    let nested = pick(v, PAYMENT_OBJECT_KEYS);
    let method = text(v, PAYMENT_METHOD_KEYS)
        .or_else(|| nested.and_then(as_text))
        .or_else(|| nested.and_then(|p| text(p, NESTED_METHOD_KEYS)))
        .unwrap_or_default();
    let change = number(v, CHANGE_KEYS)
        .or_else(|| nested.and_then(|p| number(p, CHANGE_KEYS)))
        .unwrap_or(0.0);
    Payment { method, change }
}

fn normalize_seller(v: &Value) -> String {
    match pick(v, SELLER_KEYS) {
        Some(obj @ Value::Object(_)) => text(obj, &["nome", "name"]).unwrap_or_default(),
        Some(other) => as_text(other).unwrap_or_default(),
        None => String::new(),
    }
}

fn normalize_delivery(v: &Value) -> DeliveryInfo {
    let nested = pick(v, DELIVERY_OBJECT_KEYS).filter(|d| d.is_object());
    DeliveryInfo {
        fee: number(v, DELIVERY_FEE_KEYS)
            .or_else(|| nested.and_then(|d| number(d, NESTED_FEE_KEYS)))
            .unwrap_or(0.0),
        estimated_time: text(v, ESTIMATED_TIME_KEYS)
            .or_else(|| nested.and_then(|d| text(d, ESTIMATED_TIME_KEYS)))
            .or_else(|| nested.and_then(|d| text(d, &["tempo", "time"]))),
    }
}

fn total(v: &Value) -> f64 {
    number(v, TOTAL_KEYS).unwrap_or(0.0)
}

fn notes(v: &Value) -> String {
    text(v, NOTES_KEYS).unwrap_or_default()
}

pub fn kitchen_order(v: &Value) -> KitchenOrder {
    let order_type = infer_order_type(v);
    let mesa = match &order_type {
        OrderType::Table(n) => Some(n.clone()),
        _ => None,
    };
    KitchenOrder {
        order_id: text(v, ORDER_ID_KEYS).unwrap_or_default(),
        order_type,
        items: normalize_items(v),
        customer: normalize_customer(v),
        notes: notes(v),
        mesa,
    }
}

pub fn sale_receipt(v: &Value) -> SaleReceipt {
    SaleReceipt {
        sale_id: text(v, SALE_ID_KEYS).unwrap_or_default(),
        items: normalize_items(v),
        total: total(v),
        payment: normalize_payment(v),
        customer: normalize_customer(v),
        seller: normalize_seller(v),
    }
}

pub fn delivery_order(v: &Value) -> DeliveryOrder {
    DeliveryOrder {
        order_id: text(v, ORDER_ID_KEYS).unwrap_or_default(),
        items: normalize_items(v),
        total: total(v),
        customer: normalize_customer(v).unwrap_or_default(),
        delivery: normalize_delivery(v),
        payment: normalize_payment(v),
    }
}

pub fn table_order(v: &Value) -> TableOrder {
    TableOrder {
        table_number: table_number(v).unwrap_or_else(|| "-".to_string()),
        order_id: text(v, ORDER_ID_KEYS).unwrap_or_default(),
        items: normalize_items(v),
        total: total(v),
        customer: normalize_customer(v),
        notes: notes(v),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_synonyms_normalize_identically() {
        let pt = json!({ "itens": [{ "nome": "X-Burger", "quantidade": 2, "preco": 18.5, "observacoes": "sem cebola" }] });
        let en = json!({ "items": [{ "name": "X-Burger", "quantity": 2, "price": 18.5, "observations": "sem cebola" }] });
        let mixed = json!({ "produtos": [{ "name": "X-Burger", "qtd": "2", "valor": "18,50", "obs": "sem cebola" }] });

        assert_eq!(normalize_items(&pt), normalize_items(&en));
        assert_eq!(normalize_items(&pt), normalize_items(&mixed));
    }

    #[test]
    fn test_item_defaults() {
        let items = normalize_items(&json!({ "items": [{ "nome": "Água" }] }));
        assert_eq!(items, vec![PrintItem::new("Água", 1.0, 0.0)]);
    }

    #[test]
    fn test_items_always_a_list() {
        assert!(normalize_items(&json!({})).is_empty());
        assert!(normalize_items(&json!({ "itens": null })).is_empty());
        assert!(normalize_items(&json!({ "itens": "nada" })).is_empty());
        assert!(normalize_items(&json!(null)).is_empty());
    }

    #[test]
    fn test_order_type_inference() {
        assert_eq!(infer_order_type(&json!({ "tipo": "delivery" })), OrderType::Delivery);
        assert_eq!(infer_order_type(&json!({ "isDelivery": true, "mesa": 3 })), OrderType::Delivery);
        assert_eq!(infer_order_type(&json!({ "mesa": 7 })), OrderType::Table("7".into()));
        assert_eq!(
            infer_order_type(&json!({ "mesa": { "numero": 12 } })),
            OrderType::Table("12".into())
        );
        assert_eq!(infer_order_type(&json!({})), OrderType::Counter);
        assert_eq!(infer_order_type(&json!({ "mesa": null, "delivery": false })), OrderType::Counter);
    }

    #[test]
    fn test_delivery_details_object_marks_delivery() {
        assert_eq!(
            infer_order_type(&json!({ "delivery": { "taxa": 5 } })),
            OrderType::Delivery
        );
        assert_eq!(
            infer_order_type(&json!({ "delivery": {}, "mesa": 4 })),
            OrderType::Delivery
        );
    }

    #[test]
    fn test_customer_shapes() {
        assert_eq!(normalize_customer(&json!({})), None);
        let nested = normalize_customer(&json!({ "cliente": { "nome": "Ana", "telefone": "11 98888-7777" } })).unwrap();
        assert_eq!(nested.name.as_deref(), Some("Ana"));
        assert_eq!(nested.phone.as_deref(), Some("11 98888-7777"));
        let bare = normalize_customer(&json!({ "cliente": "Bruno" })).unwrap();
        assert_eq!(bare.name.as_deref(), Some("Bruno"));
        let flat = normalize_customer(&json!({ "customerName": "Caio" })).unwrap();
        assert_eq!(flat.name.as_deref(), Some("Caio"));
    }

    #[test]
    fn test_sale_receipt_fields() {
        let sale = sale_receipt(&json!({
            "vendaId": 42,
            "produtos": [{ "nome": "X", "quantidade": 2, "preco_unitario": 5 }],
            "total": 10,
            "forma_pagamento": "PIX",
            "vendedor": { "nome": "Duda" }
        }));
        assert_eq!(sale.sale_id, "42");
        assert_eq!(sale.items, vec![PrintItem::new("X", 2.0, 5.0)]);
        assert_eq!(sale.total, 10.0);
        assert_eq!(sale.payment.method, "PIX");
        assert_eq!(sale.seller, "Duda");
        assert!(sale.customer.is_none());
    }

    #[test]
    fn test_payment_nested() {
        let payment = normalize_payment(&json!({ "pagamento": { "metodo": "Dinheiro", "troco": 5.5 } }));
        assert_eq!(payment.method, "Dinheiro");
        assert_eq!(payment.change, 5.5);
    }

    #[test]
    fn test_delivery_order_fields() {
        let order = delivery_order(&json!({
            "id": "D-9",
            "items": [],
            "total": "52,90",
            "cliente": { "nome": "Eva", "telefone": "11 97777-6666", "endereco": "Rua A, 10" },
            "entrega": { "taxa": 7, "tempo_estimado": "40 min" }
        }));
        assert_eq!(order.order_id, "D-9");
        assert_eq!(order.total, 52.9);
        assert_eq!(order.delivery.fee, 7.0);
        assert_eq!(order.delivery.estimated_time.as_deref(), Some("40 min"));
        assert_eq!(order.customer.address.as_deref(), Some("Rua A, 10"));
    }

    #[test]
    fn test_table_order_fields() {
        let order = table_order(&json!({ "mesa": 4, "pedido_id": 77, "obs": "sem gelo" }));
        assert_eq!(order.table_number, "4");
        assert_eq!(order.order_id, "77");
        assert_eq!(order.notes, "sem gelo");
        assert_eq!(order.total, 0.0);
    }
}

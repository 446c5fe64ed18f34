//! Catalog records as the backend exchanges them.
//!
//! Field names on the wire follow the backend (`nome`, `descricao`, `valor`,
//! `categoria`, `lojas`); the Rust side uses plain English names.

use serde::{Deserialize, Serialize};

pub type ProductId = u64;
pub type CategoryId = u64;
pub type StoreId = u64;

/// A category as returned by the reference list endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub id: CategoryId,
    #[serde(rename = "nome")]
    pub name: String,
}

/// A store as returned by the reference list endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Store {
    pub id: StoreId,
    #[serde(rename = "nome")]
    pub name: String,
}

/// Relation reference. Reads may carry the related name, writes only the id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RefId {
    pub id: u64,
    #[serde(rename = "nome", default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl RefId {
    pub fn new(id: u64) -> Self {
        Self { id, name: None }
    }
}

/// A persisted product.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    #[serde(rename = "nome")]
    pub name: String,
    #[serde(rename = "descricao")]
    pub description: String,
    /// Absent on some legacy rows; treated like an empty amount.
    #[serde(rename = "valor", default)]
    pub amount: Option<f64>,
    #[serde(rename = "categoria")]
    pub category: RefId,
    #[serde(rename = "lojas", default)]
    pub stores: Vec<RefId>,
}

impl Product {
    pub fn store_ids(&self) -> impl Iterator<Item = StoreId> + '_ {
        self.stores.iter().map(|s| s.id)
    }
}

/// Outbound body for create and update.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductDraft {
    #[serde(rename = "nome")]
    pub name: String,
    #[serde(rename = "descricao")]
    pub description: String,
    #[serde(rename = "valor")]
    pub amount: f64,
    #[serde(rename = "categoria")]
    pub category: RefId,
    #[serde(rename = "lojas")]
    pub stores: Vec<RefId>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_draft_serializes_with_backend_keys() {
        let draft = ProductDraft {
            name: "Widget".to_string(),
            description: "A fine widget indeed".to_string(),
            amount: 10.5,
            category: RefId::new(3),
            stores: vec![RefId::new(1), RefId::new(2)],
        };
        let v = serde_json::to_value(&draft).unwrap();
        assert_eq!(
            v,
            serde_json::json!({
                "nome": "Widget",
                "descricao": "A fine widget indeed",
                "valor": 10.5,
                "categoria": {"id": 3},
                "lojas": [{"id": 1}, {"id": 2}]
            })
        );
    }

    #[test]
    fn test_product_reads_nested_names() {
        let json = r#"{
            "id": 7,
            "nome": "Lamp",
            "descricao": "Desk lamp with dimmer",
            "valor": 89.9,
            "categoria": {"id": 2, "nome": "Lighting"},
            "lojas": [{"id": 4, "nome": "Downtown"}, {"id": 9}]
        }"#;
        let p: Product = serde_json::from_str(json).unwrap();
        assert_eq!(p.category.name.as_deref(), Some("Lighting"));
        assert_eq!(p.store_ids().collect::<Vec<_>>(), vec![4, 9]);
        assert_eq!(p.amount, Some(89.9));
    }

    #[test]
    fn test_product_without_amount_or_stores() {
        let json = r#"{"id": 1, "nome": "X", "descricao": "Y", "categoria": {"id": 1}}"#;
        let p: Product = serde_json::from_str(json).unwrap();
        assert_eq!(p.amount, None);
        assert!(p.stores.is_empty());
    }
}

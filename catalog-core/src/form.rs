//! Editable product draft and the per-field edits applied to it.

use std::collections::BTreeSet;

use crate::currency::{round_cents, strip_to_mask_chars, CurrencyCodec, ZeroAmountPolicy};
use crate::model::{CategoryId, Product, StoreId};

/// Amount with two faces: the text being typed and the canonical number.
///
/// The two agree after every `blur`; between blurs `display` may hold partial
/// input such as `"12,"`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CurrencyField {
    display: String,
    value: Option<f64>,
}

impl CurrencyField {
    pub fn display(&self) -> &str {
        &self.display
    }

    /// Canonical amount; `None` is the empty sentinel.
    pub fn value(&self) -> Option<f64> {
        self.value
    }

    /// Keystroke handler. Never fails.
    pub fn input(&mut self, raw: &str) {
        self.display = strip_to_mask_chars(raw);
    }

    /// Leaving the field: settle the canonical value and reformat the text.
    pub fn blur(&mut self, codec: &dyn CurrencyCodec, policy: ZeroAmountPolicy) {
        if self.display.is_empty() {
            self.value = None;
            return;
        }

        let parsed = codec.unmask(&self.display);
        self.set_value(parsed, codec, policy);
    }

    /// Hydrates from a stored amount (edit screen).
    pub fn load(&mut self, amount: Option<f64>, codec: &dyn CurrencyCodec, policy: ZeroAmountPolicy) {
        match amount {
            Some(v) if v.is_finite() => self.set_value(v, codec, policy),
            _ => self.clear(),
        }
    }

    pub fn clear(&mut self) {
        self.display.clear();
        self.value = None;
    }

    fn set_value(&mut self, v: f64, codec: &dyn CurrencyCodec, policy: ZeroAmountPolicy) {
        let v = round_cents(v);
        if v == 0.0 && policy == ZeroAmountPolicy::TreatAsEmpty {
            self.clear();
            return;
        }
        self.value = Some(v);
        self.display = codec.format(v);
    }
}

/// The draft being edited on the product screens.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FormState {
    pub name: String,
    pub description: String,
    pub amount: CurrencyField,
    pub category_id: Option<CategoryId>,
    pub store_ids: BTreeSet<StoreId>,
}

impl FormState {
    pub fn from_product(product: &Product, codec: &dyn CurrencyCodec, policy: ZeroAmountPolicy) -> Self {
        let mut amount = CurrencyField::default();
        amount.load(product.amount, codec, policy);
        Self {
            name: product.name.clone(),
            description: product.description.clone(),
            amount,
            category_id: Some(product.category.id),
            store_ids: product.store_ids().collect(),
        }
    }

    /// Trims the free-text fields in place.
    pub fn trim_text(&mut self) {
        trim_in_place(&mut self.name);
        trim_in_place(&mut self.description);
    }

    pub fn apply(&mut self, edit: FieldEdit, codec: &dyn CurrencyCodec, policy: ZeroAmountPolicy) {
        match edit {
            FieldEdit::Name(s) => self.name = s,
            FieldEdit::NameBlur => trim_in_place(&mut self.name),
            FieldEdit::Description(s) => self.description = s,
            FieldEdit::DescriptionBlur => trim_in_place(&mut self.description),
            FieldEdit::AmountInput(raw) => self.amount.input(&raw),
            FieldEdit::AmountBlur => self.amount.blur(codec, policy),
            FieldEdit::Category(id) => self.category_id = id,
            FieldEdit::Stores(ids) => self.store_ids = ids,
            FieldEdit::ToggleStore(id) => {
                if !self.store_ids.remove(&id) {
                    self.store_ids.insert(id);
                }
            }
        }
    }
}

fn trim_in_place(s: &mut String) {
    let trimmed = s.trim();
    if trimmed.len() != s.len() {
        *s = trimmed.to_string();
    }
}

/// One user edit on one field.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldEdit {
    Name(String),
    NameBlur,
    Description(String),
    DescriptionBlur,
    /// Raw keystroke text for the amount box.
    AmountInput(String),
    AmountBlur,
    /// `None` is the "select a category" placeholder.
    Category(Option<CategoryId>),
    Stores(BTreeSet<StoreId>),
    ToggleStore(StoreId),
}

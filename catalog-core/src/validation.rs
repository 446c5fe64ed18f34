//! Local field rules and the per-field error slots shared with server
//! rejections.

use std::fmt;

use crate::currency::ZeroAmountPolicy;
use crate::form::FormState;
use crate::model::{ProductDraft, RefId};

pub const NAME_MIN_CHARS: usize = 3;
pub const NAME_MAX_CHARS: usize = 100;
pub const DESCRIPTION_MIN_CHARS: usize = 10;

/// Form fields that can carry an error message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Field {
    Name,
    Description,
    Amount,
    CategoryId,
    StoreIds,
}

impl Field {
    pub const ALL: [Field; 5] = [
        Field::Name,
        Field::Description,
        Field::Amount,
        Field::CategoryId,
        Field::StoreIds,
    ];

    /// Maps a server field path (`nome`, `categoria.id`, `lojas[0].id`, ...)
    /// onto a form field. Relation paths collapse onto their selector.
    pub fn from_server_path(path: &str) -> Option<Field> {
        let lower = path.to_ascii_lowercase();
        if lower.contains("categoria") || lower.contains("category") {
            return Some(Field::CategoryId);
        }
        if lower.contains("lojas") || lower.contains("store") {
            return Some(Field::StoreIds);
        }

        let root = lower
            .split(|c: char| c == '.' || c == '[')
            .next()
            .unwrap_or_default();
        match root {
            "nome" | "name" => Some(Field::Name),
            "descricao" | "description" => Some(Field::Description),
            "valor" | "amount" => Some(Field::Amount),
            _ => None,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Field::Name => "name",
            Field::Description => "description",
            Field::Amount => "amount",
            Field::CategoryId => "category",
            Field::StoreIds => "stores",
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// One optional message per field.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldErrors {
    name: Option<String>,
    description: Option<String>,
    amount: Option<String>,
    category_id: Option<String>,
    store_ids: Option<String>,
}

impl FieldErrors {
    fn slot(&self, field: Field) -> &Option<String> {
        match field {
            Field::Name => &self.name,
            Field::Description => &self.description,
            Field::Amount => &self.amount,
            Field::CategoryId => &self.category_id,
            Field::StoreIds => &self.store_ids,
        }
    }

    fn slot_mut(&mut self, field: Field) -> &mut Option<String> {
        match field {
            Field::Name => &mut self.name,
            Field::Description => &mut self.description,
            Field::Amount => &mut self.amount,
            Field::CategoryId => &mut self.category_id,
            Field::StoreIds => &mut self.store_ids,
        }
    }

    pub fn get(&self, field: Field) -> Option<&str> {
        self.slot(field).as_deref()
    }

    pub fn set(&mut self, field: Field, message: impl Into<String>) {
        *self.slot_mut(field) = Some(message.into());
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }

    pub fn is_empty(&self) -> bool {
        Field::ALL.iter().all(|f| self.slot(*f).is_none())
    }

    /// Populated slots in field order.
    pub fn iter(&self) -> impl Iterator<Item = (Field, &str)> + '_ {
        Field::ALL
            .into_iter()
            .filter_map(move |f| self.get(f).map(|m| (f, m)))
    }
}

/// Checks every rule and returns either the outbound draft or every
/// violation found. Expects text already trimmed.
pub fn validate(form: &FormState, policy: ZeroAmountPolicy) -> Result<ProductDraft, FieldErrors> {
    let mut errors = FieldErrors::default();

    let name_len = form.name.chars().count();
    if name_len == 0 {
        errors.set(Field::Name, "Name is required");
    } else if !(NAME_MIN_CHARS..=NAME_MAX_CHARS).contains(&name_len) {
        errors.set(
            Field::Name,
            format!("Name must be between {NAME_MIN_CHARS} and {NAME_MAX_CHARS} characters"),
        );
    }

    let description_len = form.description.chars().count();
    if description_len == 0 {
        errors.set(Field::Description, "Description is required");
    } else if description_len < DESCRIPTION_MIN_CHARS {
        errors.set(
            Field::Description,
            format!("Description must be at least {DESCRIPTION_MIN_CHARS} characters"),
        );
    }

    let amount = match form.amount.value() {
        Some(v) if v.is_finite() => {
            let ok = match policy {
                ZeroAmountPolicy::TreatAsEmpty => v > 0.0,
                ZeroAmountPolicy::AllowZero => v >= 0.0,
            };
            if !ok {
                errors.set(Field::Amount, "Amount must be greater than zero");
            }
            v
        }
        _ => {
            errors.set(Field::Amount, "Amount is required and must be a number");
            0.0
        }
    };

    if form.category_id.is_none() {
        errors.set(Field::CategoryId, "Select a category");
    }
    if form.store_ids.is_empty() {
        errors.set(Field::StoreIds, "Select at least one store");
    }

    match form.category_id {
        Some(category_id) if errors.is_empty() => Ok(ProductDraft {
            name: form.name.clone(),
            description: form.description.clone(),
            amount,
            category: RefId::new(category_id),
            stores: form.store_ids.iter().map(|id| RefId::new(*id)).collect(),
        }),
        _ => Err(errors),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::currency::BrlCodec;
    use crate::form::FieldEdit;

    fn valid_form() -> FormState {
        let codec = BrlCodec::default();
        let mut form = FormState::default();
        for edit in [
            FieldEdit::Name("Widget".to_string()),
            FieldEdit::Description("A fine widget indeed".to_string()),
            FieldEdit::AmountInput("10,50".to_string()),
            FieldEdit::AmountBlur,
            FieldEdit::Category(Some(3)),
            FieldEdit::ToggleStore(2),
            FieldEdit::ToggleStore(1),
        ] {
            form.apply(edit, &codec, ZeroAmountPolicy::TreatAsEmpty);
        }
        form
    }

    #[test]
    fn test_valid_form_builds_draft() {
        let draft = validate(&valid_form(), ZeroAmountPolicy::TreatAsEmpty).unwrap();
        assert_eq!(draft.amount, 10.5);
        assert_eq!(draft.category, RefId::new(3));
        assert_eq!(draft.stores, vec![RefId::new(1), RefId::new(2)]);
    }

    #[test]
    fn test_empty_form_collects_every_violation() {
        let errors = validate(&FormState::default(), ZeroAmountPolicy::TreatAsEmpty).unwrap_err();
        assert_eq!(errors.iter().count(), 5);
        assert_eq!(errors.get(Field::Name), Some("Name is required"));
        assert_eq!(errors.get(Field::Amount), Some("Amount is required and must be a number"));
    }

    #[test]
    fn test_name_length_bounds() {
        let mut form = valid_form();
        form.name = "ab".to_string();
        let errors = validate(&form, ZeroAmountPolicy::TreatAsEmpty).unwrap_err();
        assert_eq!(errors.get(Field::Name), Some("Name must be between 3 and 100 characters"));
        assert_eq!(errors.iter().count(), 1);

        form.name = "x".repeat(101);
        assert!(validate(&form, ZeroAmountPolicy::TreatAsEmpty).is_err());

        form.name = "é".repeat(100);
        assert!(validate(&form, ZeroAmountPolicy::TreatAsEmpty).is_ok());
    }

    #[test]
    fn test_short_description() {
        let mut form = valid_form();
        form.description = "too short".to_string();
        let errors = validate(&form, ZeroAmountPolicy::TreatAsEmpty).unwrap_err();
        assert!(errors.get(Field::Description).is_some());
    }

    #[test]
    fn test_zero_amount_depends_on_policy() {
        let codec = BrlCodec::default();
        let mut form = valid_form();
        form.apply(FieldEdit::AmountInput("0".to_string()), &codec, ZeroAmountPolicy::AllowZero);
        form.apply(FieldEdit::AmountBlur, &codec, ZeroAmountPolicy::AllowZero);
        assert!(validate(&form, ZeroAmountPolicy::AllowZero).is_ok());
        let errors = validate(&form, ZeroAmountPolicy::TreatAsEmpty).unwrap_err();
        assert_eq!(errors.get(Field::Amount), Some("Amount must be greater than zero"));
    }

    #[test]
    fn test_server_paths() {
        assert_eq!(Field::from_server_path("categoria.id"), Some(Field::CategoryId));
        assert_eq!(Field::from_server_path("categoria"), Some(Field::CategoryId));
        assert_eq!(Field::from_server_path("lojas[0].id"), Some(Field::StoreIds));
        assert_eq!(Field::from_server_path("lojas"), Some(Field::StoreIds));
        assert_eq!(Field::from_server_path("nome"), Some(Field::Name));
        assert_eq!(Field::from_server_path("descricao"), Some(Field::Description));
        assert_eq!(Field::from_server_path("valor"), Some(Field::Amount));
        assert_eq!(Field::from_server_path("sku"), None);
    }

    #[test]
    fn test_field_errors_clear() {
        let mut errors = FieldErrors::default();
        errors.set(Field::StoreIds, "x");
        assert!(!errors.is_empty());
        errors.clear();
        assert!(errors.is_empty());
    }
}

//! catalog-core: product form state, validation and the screen controller
//! for the catalog admin.

pub mod controller;
pub mod currency;
pub mod error;
pub mod form;
pub mod listing;
pub mod model;
pub mod service;
pub mod timers;
pub mod validation;

pub use controller::{FormMode, FormTimings, LoadOutcome, Phase, ProductForm, Status, SubmitOutcome};
pub use currency::{BrlCodec, CurrencyCodec, ZeroAmountPolicy};
pub use error::{ApiError, FieldViolation};
pub use form::{CurrencyField, FieldEdit, FormState};
pub use listing::{load_listing, Listing};
pub use model::{Category, CategoryId, Product, ProductDraft, ProductId, RefId, Store, StoreId};
pub use service::{Navigator, ProductService, ReferenceService, Route, Screen};
pub use timers::{DelayedActions, TimerSlot};
pub use validation::{validate, Field, FieldErrors};

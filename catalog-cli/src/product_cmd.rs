use std::collections::BTreeSet;
use std::sync::mpsc;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use catalog_client::HttpCatalog;
use catalog_core::{
    FieldEdit, FieldErrors, FormMode, LoadOutcome, ProductForm, Route, SubmitOutcome,
};
use clap::Args;
use tracing::info;

use crate::config::Config;
use crate::listing_cmd;

pub type CatalogForm = ProductForm<HttpCatalog, mpsc::Sender<Route>>;

/// Field values for `products new|edit`. With none set, the form screen opens.
#[derive(Args, Debug, Default, Clone, PartialEq)]
pub struct ProductFields {
    #[arg(long)]
    pub name: Option<String>,
    #[arg(long)]
    pub description: Option<String>,
    /// Amount as typed, e.g. "1.234,56"
    #[arg(long)]
    pub amount: Option<String>,
    /// Category id
    #[arg(long)]
    pub category: Option<u64>,
    /// Store id; repeat for several stores
    #[arg(long = "store")]
    pub stores: Vec<u64>,
}

impl ProductFields {
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.description.is_none()
            && self.amount.is_none()
            && self.category.is_none()
            && self.stores.is_empty()
    }

    /// Edits in the order a user would make them, each text field followed by its blur.
    pub fn edits(&self) -> Vec<FieldEdit> {
        let mut edits = Vec::new();
        if let Some(name) = &self.name {
            edits.push(FieldEdit::Name(name.clone()));
            edits.push(FieldEdit::NameBlur);
        }
        if let Some(description) = &self.description {
            edits.push(FieldEdit::Description(description.clone()));
            edits.push(FieldEdit::DescriptionBlur);
        }
        if let Some(amount) = &self.amount {
            edits.push(FieldEdit::AmountInput(amount.clone()));
            edits.push(FieldEdit::AmountBlur);
        }
        if let Some(category) = self.category {
            edits.push(FieldEdit::Category(Some(category)));
        }
        if !self.stores.is_empty() {
            let stores: BTreeSet<u64> = self.stores.iter().copied().collect();
            edits.push(FieldEdit::Stores(stores));
        }
        edits
    }
}

pub fn build_form(cfg: &Config, api: HttpCatalog, mode: FormMode) -> (CatalogForm, mpsc::Receiver<Route>) {
    let (tx, rx) = mpsc::channel();
    let form = ProductForm::new(mode, api, Arc::new(tx))
        .with_zero_policy(cfg.form.zero_amount)
        .with_timings(cfg.form.timings());
    (form, rx)
}

/// Non-interactive create/update: load, apply the flags, submit once.
pub async fn run_batch(cfg: &Config, api: HttpCatalog, mode: FormMode, fields: &ProductFields) -> Result<()> {
    let (mut form, rx) = build_form(cfg, api.clone(), mode);

    if let LoadOutcome::Failed(message) = form.mount().await {
        bail!("{message}");
    }
    for edit in fields.edits() {
        form.edit(edit);
    }

    match form.submit().await {
        SubmitOutcome::Saved(product) => {
            if let Some(message) = form.status().success {
                println!("{message}");
            }
            info!(id = product.id, "saved; waiting for redirect");
            let wait = cfg.form.timings().redirect_delay + Duration::from_secs(5);
            let route = wait_for_route(&rx, wait).await?;
            drop(form);
            listing_cmd::show_screen(&api, route).await
        }
        SubmitOutcome::Invalid(errors) => {
            print_field_errors(&errors);
            bail!("product not saved: {} invalid field(s)", errors.iter().count());
        }
        SubmitOutcome::Rejected(errors) => {
            if let Some(banner) = form.status().error {
                eprintln!("{banner}");
            }
            print_field_errors(&errors);
            bail!("product rejected by the server");
        }
        SubmitOutcome::Failed(message) => bail!("{message}"),
        SubmitOutcome::Ignored => bail!("form is not ready to submit"),
    }
}

fn print_field_errors(errors: &FieldErrors) {
    for (field, message) in errors.iter() {
        eprintln!("  {field}: {message}");
    }
}

/// Polls the navigator channel until the controller routes somewhere.
pub async fn wait_for_route(rx: &mpsc::Receiver<Route>, limit: Duration) -> Result<Route> {
    let poll = async {
        loop {
            match rx.try_recv() {
                Ok(route) => return Ok(route),
                Err(mpsc::TryRecvError::Empty) => {
                    tokio::time::sleep(Duration::from_millis(25)).await;
                }
                Err(mpsc::TryRecvError::Disconnected) => bail!("navigator closed"),
            }
        }
    };
    tokio::time::timeout(limit, poll)
        .await
        .context("timed out waiting for navigation")?
}

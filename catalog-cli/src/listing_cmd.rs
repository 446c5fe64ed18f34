use anyhow::{bail, Result};
use catalog_client::HttpCatalog;
use catalog_core::{
    load_listing, BrlCodec, CurrencyCodec, Listing, Product, ProductService, ReferenceService, Route,
    Screen,
};

/// Prints the list screen a route points at, flash message first.
pub async fn show_screen(api: &HttpCatalog, route: Route) -> Result<()> {
    match route.screen {
        Screen::Products => {
            let listing = load_listing(route, api.list_products()).await;
            let codec = BrlCodec::default();
            print_listing(&listing, |p| product_row(p, &codec))
        }
        Screen::Categories => {
            let listing = load_listing(route, api.list_categories()).await;
            print_listing(&listing, |c| format!("{:>5}  {}", c.id, c.name))
        }
        Screen::Stores => {
            let listing = load_listing(route, api.list_stores()).await;
            print_listing(&listing, |s| format!("{:>5}  {}", s.id, s.name))
        }
    }
}

fn print_listing<T>(listing: &Listing<T>, row: impl Fn(&T) -> String) -> Result<()> {
    if let Some(flash) = &listing.flash {
        eprintln!("! {flash}");
    }
    if let Some(err) = &listing.error {
        bail!("{err}");
    }
    if listing.items.is_empty() {
        println!("(none)");
    }
    for item in &listing.items {
        println!("{}", row(item));
    }
    Ok(())
}

fn product_row(p: &Product, codec: &dyn CurrencyCodec) -> String {
    let amount = p
        .amount
        .map(|a| format!("R$ {}", codec.format(a)))
        .unwrap_or_else(|| "-".to_string());
    let category = match &p.category.name {
        Some(name) => name.clone(),
        None => format!("#{}", p.category.id),
    };
    format!(
        "{:>5}  {:<30}  {:>14}  {}  (stores: {})",
        p.id,
        p.name,
        amount,
        category,
        p.stores.len()
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use catalog_core::RefId;

    #[test]
    fn test_product_row() {
        let p = Product {
            id: 7,
            name: "Lamp".to_string(),
            description: "Desk lamp with dimmer".to_string(),
            amount: Some(1234.5),
            category: RefId::new(2),
            stores: vec![RefId::new(1), RefId::new(4)],
        };
        let row = product_row(&p, &BrlCodec::default());
        assert!(row.contains("R$ 1.234,50"));
        assert!(row.contains("#2"));
        assert!(row.ends_with("(stores: 2)"));

        let no_amount = Product { amount: None, ..p };
        assert!(product_row(&no_amount, &BrlCodec::default()).contains(" - "));
    }
}

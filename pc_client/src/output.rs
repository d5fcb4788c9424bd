//! Plain-text rendering of catalog data.

use product_catalog::{Product, ProductPage, SessionState, User};
use std::fmt::Write;

pub fn format_user(user: &User) -> String {
    if user.email.is_empty() {
        format!("{} (id {})", user.username, user.id)
    } else {
        format!("{} <{}> (id {})", user.username, user.email, user.id)
    }
}

pub fn format_session(state: &SessionState) -> String {
    match &state.user {
        Some(user) if state.is_authenticated() => format!("Logged in as {}", format_user(user)),
        _ => "Not logged in".to_string(),
    }
}

/// One line per product: id, title, price
pub fn format_product_line(product: &Product) -> String {
    let price = product
        .price
        .map(|p| format!("{p:.2}"))
        .unwrap_or_else(|| "-".to_string());
    format!("{:>6}  {:<40}  {:>10}", product.id, product.title, price)
}

/// Every known field of a single product
pub fn format_product(product: &Product) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "ID:          {}", product.id);
    let _ = writeln!(out, "Title:       {}", product.title);
    if let Some(price) = product.price {
        let _ = writeln!(out, "Price:       {price:.2}");
    }
    if let Some(category) = &product.category {
        let _ = writeln!(out, "Category:    {category}");
    }
    if let Some(description) = &product.description {
        let _ = writeln!(out, "Description: {description}");
    }
    out
}

pub fn format_products(products: &[Product]) -> String {
    if products.is_empty() {
        return "No products found.\n".to_string();
    }
    let mut out = String::new();
    for product in products {
        let _ = writeln!(out, "{}", format_product_line(product));
    }
    out
}

pub fn format_page(page: &ProductPage) -> String {
    let mut out = format_products(&page.products);
    let _ = writeln!(
        out,
        "Page {} of {} ({} products)",
        page.page, page.total_pages, page.total_items
    );
    out
}

//! Terminal output. Data goes to stdout, failures to stderr.

#![allow(clippy::print_stdout, clippy::print_stderr)]

use tienda_admin::DashboardStats;
use tienda_core::{Cart, Category, Page, Product, ProductSummary};
use tienda_storefront::Session;
use url::Url;

pub fn failure(message: &str, hint: Option<&str>) {
    eprintln!("error: {message}");
    if let Some(hint) = hint {
        eprintln!("hint: {hint}");
    }
}

pub fn message(text: &str) {
    println!("{text}");
}

pub fn products(products: &[ProductSummary]) {
    if products.is_empty() {
        println!("No products.");
        return;
    }
    for p in products {
        let status = if p.visibility.is_active() { "" } else { "  (hidden)" };
        println!("{:>5}  {:<40} {:>10}{status}", p.id, p.name, p.price.to_string());
    }
}

pub fn product(product: &Product, image: Option<&Url>) {
    let p = &product.summary;
    println!("{} (#{})", p.name, p.id);
    println!("Price:      {}", p.price);
    println!("Status:     {}", p.visibility);
    if !p.categories.is_empty() {
        println!("Categories: {}", p.categories.join(", "));
    }
    if let Some(image) = image {
        println!("Image:      {image}");
    }
    if let Some(short) = p.short_description.as_deref().filter(|s| !s.is_empty()) {
        println!();
        println!("{short}");
    }
    if let Some(long) = product.long_description.as_deref().filter(|s| !s.is_empty()) {
        println!();
        println!("{long}");
    }
}

pub fn categories(categories: &[Category]) {
    if categories.is_empty() {
        println!("No categories.");
        return;
    }
    for c in categories {
        println!("{:>5}  {:<30} /{}", c.id, c.name, c.slug);
    }
}

pub fn pages(pages: &[Page]) {
    if pages.is_empty() {
        println!("No pages.");
        return;
    }
    for p in pages {
        println!("{:>5}  {:<30} /paginas/{}", p.id, p.title, p.slug);
    }
}

pub fn page(page: &Page) {
    println!("{}", page.title);
    println!();
    println!("{}", page.content.as_deref().unwrap_or_default());
}

pub fn cart(cart: &Cart) {
    for line in cart.lines() {
        println!(
            "{:>3} x {:<40} {:>10} {:>10}",
            line.quantity,
            line.name,
            line.unit_price.to_string(),
            line.subtotal().to_string()
        );
    }
    println!("{} items, total {}", cart.total_items(), cart.total_price());
}

pub fn stats(stats: &DashboardStats) {
    println!("Products:        {}", stats.total_products);
    println!("Active products: {}", stats.active_products);
    println!("Categories:      {}", stats.total_categories);
    println!("Pages:           {}", stats.total_pages);
}

pub fn session(session: Option<&Session>) {
    match session {
        Some(s) => println!(
            "{} (user #{}), session valid until {}",
            s.user().email,
            s.user().id,
            s.expires_at().format("%Y-%m-%d %H:%M:%S UTC")
        ),
        None => println!("Not logged in."),
    }
}

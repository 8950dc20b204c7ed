//! Tera template engine setup and listing rendering.
//!
//! The listing template is embedded in the binary so the server can run from
//! any working directory without a template tree on disk.

use tera::Tera;

use crate::config::ServerConfig;
use crate::listing::Listing;

/// Name the embedded listing template is registered under.
pub const LISTING_TEMPLATE: &str = "listing.html";

/// Initialize the Tera template engine with the embedded listing template.
pub fn init_templates() -> Result<Tera, tera::Error> {
    let mut tera = Tera::default();
    tera.add_raw_template(LISTING_TEMPLATE, include_str!("../templates/listing.html"))?;
    Ok(tera)
}

/// Render a directory listing view-model to HTML.
pub fn render_listing(
    tera: &Tera,
    listing: &Listing,
    config: &ServerConfig,
) -> Result<String, tera::Error> {
    let mut context = tera::Context::new();
    context.insert("entries", &listing.entries);
    context.insert("parent", &listing.parent);
    context.insert("path", &listing.request_path);
    context.insert("version", &listing.version);
    context.insert("text", &listing.text);
    context.insert("lang", config.locale.code());
    context.insert("port", &config.http_port);
    tera.render(LISTING_TEMPLATE, &context)
}

//! Statement of Work document rendering
//!
//! Builds a [`SowDocument`] from a quote and its kits, then renders it to
//! Markdown through the embedded `sow.md.tera` template.

use chrono::NaiveDate;
use rust_embed::Embed;
use serde::Serialize;
use tera::Tera;
use thiserror::Error;

use crate::entities::{Kit, Quote};
use crate::pricing::{generate_customer_furnished_clause, generate_dot_sourcing_clause, BomLineItem};

const SOW_TEMPLATE: &str = "sow.md.tera";

#[derive(Embed)]
#[folder = "templates/"]
struct EmbeddedTemplates;

#[derive(Debug, Error)]
pub enum SowError {
    #[error("Template not found: {0}")]
    TemplateNotFound(String),

    #[error("Template rendering error: {0}")]
    RenderError(String),
}

/// One BOM row in the kit configuration section
#[derive(Debug, Clone, Serialize)]
pub struct SowLine {
    pub component: String,
    pub units_per_kit: String,
    pub sourcing: String,
}

/// One kit run, with display-ready figures
#[derive(Debug, Clone, Serialize)]
pub struct SowKit {
    pub name: String,
    pub description: Option<String>,
    pub quantity: String,
    pub manufacture_cost: String,
    pub assembly_cost: String,
    pub extended_total: String,
    pub lines: Vec<SowLine>,
}

/// Everything the SOW template needs
#[derive(Debug, Clone, Serialize)]
pub struct SowDocument {
    pub quote_name: String,
    pub prepared_date: String,
    pub customer: Option<String>,
    pub target_ship_date: Option<String>,
    pub fulfillment_label: String,
    pub total_kits: String,
    pub kits: Vec<SowKit>,
    pub total_manufacture_cost: String,
    pub total_assembly_cost: String,
    pub total_project_cost: String,
    pub customer_furnished_clause: Option<String>,
    pub dot_sourcing_clause: Option<String>,
}

impl SowDocument {
    /// Assemble the document for a quote
    ///
    /// `kits` pairs each kit referenced by the quote with its resolved BOM.
    /// Quote lines whose kit is missing still appear in the pricing summary.
    pub fn build(quote: &Quote, kits: &[(Kit, Vec<BomLineItem>)], prepared: NaiveDate) -> Self {
        let mut all_lines: Vec<BomLineItem> = Vec::new();
        let mut sow_kits = Vec::with_capacity(quote.kits.len());

        for run in &quote.kits {
            let resolved = kits.iter().find(|(kit, _)| kit.id == run.kit_id);

            let lines = match resolved {
                Some((_, items)) => {
                    all_lines.extend(items.iter().cloned());
                    items
                        .iter()
                        .map(|item| SowLine {
                            component: item
                                .component_name()
                                .unwrap_or("Unknown component")
                                .to_string(),
                            units_per_kit: format_units(item.units_per_kit),
                            sourcing: item.sourcing.label().to_string(),
                        })
                        .collect()
                }
                None => Vec::new(),
            };

            sow_kits.push(SowKit {
                name: run.kit_name.clone(),
                description: resolved.and_then(|(kit, _)| kit.description.clone()),
                quantity: format_count(run.quantity),
                manufacture_cost: format_currency(run.manufacture_cost),
                assembly_cost: format_currency(run.assembly_cost),
                extended_total: format_currency(run.extended_total),
                lines,
            });
        }

        Self {
            quote_name: quote.name.clone(),
            prepared_date: prepared.format("%B %-d, %Y").to_string(),
            customer: quote.customer.clone(),
            target_ship_date: quote
                .target_ship_date
                .map(|d| d.format("%B %-d, %Y").to_string()),
            fulfillment_label: quote.fulfillment.label().to_string(),
            total_kits: format_count(quote.total_kits()),
            kits: sow_kits,
            total_manufacture_cost: format_currency(quote.total_manufacture_cost),
            total_assembly_cost: format_currency(quote.total_assembly_cost),
            total_project_cost: format_currency(quote.total_project_cost),
            customer_furnished_clause: generate_customer_furnished_clause(&all_lines),
            dot_sourcing_clause: generate_dot_sourcing_clause(&all_lines),
        }
    }
}

/// Renders SOW documents from the embedded template
pub struct SowRenderer {
    tera: Tera,
}

impl SowRenderer {
    /// Create a renderer with the embedded templates loaded
    pub fn new() -> Result<Self, SowError> {
        let mut tera = Tera::default();

        for file in EmbeddedTemplates::iter() {
            let filename = file.as_ref();
            if let Some(content) = EmbeddedTemplates::get(filename) {
                if let Ok(template_str) = std::str::from_utf8(&content.data) {
                    tera.add_raw_template(filename, template_str)
                        .map_err(|e| SowError::RenderError(e.to_string()))?;
                }
            }
        }

        if !tera.get_template_names().any(|n| n == SOW_TEMPLATE) {
            return Err(SowError::TemplateNotFound(SOW_TEMPLATE.to_string()));
        }

        Ok(Self { tera })
    }

    /// Render a document to Markdown
    pub fn render(&self, document: &SowDocument) -> Result<String, SowError> {
        let context = tera::Context::from_serialize(document)
            .map_err(|e| SowError::RenderError(e.to_string()))?;
        self.tera
            .render(SOW_TEMPLATE, &context)
            .map_err(|e| SowError::RenderError(e.to_string()))
    }
}

/// Format an amount as dollars with thousands separators (`$12,345.60`)
pub fn format_currency(amount: f64) -> String {
    let cents = (amount * 100.0).round() as i64;
    let sign = if cents < 0 { "-" } else { "" };
    let cents = cents.unsigned_abs();
    format!("{}${}.{:02}", sign, group_thousands(cents / 100), cents % 100)
}

/// Format a count with thousands separators
pub fn format_count(count: u64) -> String {
    group_thousands(count)
}

/// Per-kit units without a trailing `.0` for whole numbers
pub fn format_units(units: f64) -> String {
    if units.fract() == 0.0 {
        format!("{:.0}", units)
    } else {
        units.to_string()
    }
}

fn group_thousands(value: u64) -> String {
    let digits = value.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

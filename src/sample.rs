//! Demo catalog, kits and quotes for `kitq init --sample`

use chrono::NaiveDate;

use crate::core::store::{CatalogStore, StoreError};
use crate::entities::{
    BomEntry, Component, DistributionModel, FulfillmentModel, Kit, Quote, QuoteKit, QuoteStatus,
    SourcingType,
};
use crate::pricing::calculate_project_pricing;

/// Counts of seeded entities
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SeedSummary {
    pub components: usize,
    pub kits: usize,
    pub quotes: usize,
}

struct ComponentSeed {
    name: &'static str,
    sku: &'static str,
    category: &'static str,
    sourcing: SourcingType,
    unit_cost: f64,
    moq: Option<u64>,
    lead_time_days: u32,
    at_risk: bool,
    vendor: Option<&'static str>,
    notes: &'static str,
}

const COMPONENTS: &[ComponentSeed] = &[
    ComponentSeed {
        name: "Polymedco Blood Collection Tube",
        sku: "POLY-001",
        category: "Tubes",
        sourcing: SourcingType::DotSourced,
        unit_cost: 2.50,
        moq: Some(1000),
        lead_time_days: 14,
        at_risk: false,
        vendor: Some("Polymedco"),
        notes: "Standard EDTA tube, 3mL capacity",
    },
    ComponentSeed {
        name: "Pre-Printed Barcode Label",
        sku: "LBL-002",
        category: "Labels",
        sourcing: SourcingType::DotManufactured,
        unit_cost: 0.15,
        moq: Some(5000),
        lead_time_days: 7,
        at_risk: false,
        vendor: Some("Internal Print Shop"),
        notes: "Thermal transfer, 2x1 inch",
    },
    ComponentSeed {
        name: "Insulated Shipping Box",
        sku: "PKG-003",
        category: "Packaging",
        sourcing: SourcingType::DotSourced,
        unit_cost: 3.75,
        moq: Some(500),
        lead_time_days: 10,
        at_risk: false,
        vendor: Some("Cold Chain Corp"),
        notes: "Fits 1-2 tubes with gel pack",
    },
    ComponentSeed {
        name: "Patient Instructions Card",
        sku: "DOC-004",
        category: "Documentation",
        sourcing: SourcingType::DotManufactured,
        unit_cost: 0.25,
        moq: Some(1000),
        lead_time_days: 5,
        at_risk: false,
        vendor: Some("Internal Print Shop"),
        notes: "Full-color, laminated",
    },
    ComponentSeed {
        name: "Gel Ice Pack",
        sku: "COLD-005",
        category: "Cold Chain",
        sourcing: SourcingType::DotSourced,
        unit_cost: 1.20,
        moq: Some(1000),
        lead_time_days: 14,
        at_risk: true,
        vendor: Some("ColdSource Inc"),
        notes: "Reusable, non-toxic - VENDOR AT RISK",
    },
    ComponentSeed {
        name: "Return Shipping Label",
        sku: "LBL-006",
        category: "Labels",
        sourcing: SourcingType::DotSourced,
        unit_cost: 0.50,
        moq: Some(2000),
        lead_time_days: 7,
        at_risk: false,
        vendor: Some("FedEx"),
        notes: "Pre-paid ground shipping",
    },
    ComponentSeed {
        name: "Lancet Device",
        sku: "LANC-007",
        category: "Collection Devices",
        sourcing: SourcingType::CustomerProvided,
        unit_cost: 0.0,
        moq: None,
        lead_time_days: 0,
        at_risk: false,
        vendor: None,
        notes: "Customer-provided - no cost",
    },
    ComponentSeed {
        name: "Alcohol Prep Pad",
        sku: "PREP-008",
        category: "Collection Supplies",
        sourcing: SourcingType::DotSourced,
        unit_cost: 0.08,
        moq: Some(5000),
        lead_time_days: 7,
        at_risk: false,
        vendor: Some("MedSupply Co"),
        notes: "Sterile, individually wrapped",
    },
    ComponentSeed {
        name: "Biohazard Bag",
        sku: "BAG-009",
        category: "Packaging",
        sourcing: SourcingType::DotSourced,
        unit_cost: 0.30,
        moq: Some(1000),
        lead_time_days: 10,
        at_risk: false,
        vendor: Some("MedPack Inc"),
        notes: "6x9 inch, red print",
    },
    ComponentSeed {
        name: "A1c Test Reagent Strip",
        sku: "REAG-010",
        category: "Test Materials",
        sourcing: SourcingType::CustomerProvided,
        unit_cost: 0.0,
        moq: None,
        lead_time_days: 0,
        at_risk: false,
        vendor: None,
        notes: "Customer-provided test strips",
    },
];

/// (component index, units per kit, buffer percent, handling surcharge)
type LineSeed = (usize, f64, f64, f64);

struct KitSeed {
    name: &'static str,
    description: &'static str,
    distribution: DistributionModel,
    fulfillment: FulfillmentModel,
    lines: &'static [LineSeed],
}

const KITS: &[KitSeed] = &[
    KitSeed {
        name: "Bulk Fit Kit",
        description: "Bulk fulfillment kit for fitness testing program",
        distribution: DistributionModel::Bulk,
        fulfillment: FulfillmentModel::B2bBulk,
        lines: &[
            (0, 1.0, 2.0, 0.0),
            (1, 1.0, 2.0, 0.0),
            (3, 1.0, 2.0, 0.0),
            (7, 2.0, 3.0, 0.0),
            (8, 1.0, 2.0, 0.0),
        ],
    },
    KitSeed {
        name: "DTC Fit Kit",
        description: "Direct-to-consumer fitness testing with cold chain",
        distribution: DistributionModel::Dtc,
        fulfillment: FulfillmentModel::B2cApi,
        lines: &[
            (0, 1.0, 2.0, 0.0),
            (1, 1.0, 2.0, 0.0),
            (2, 1.0, 2.0, 0.0),
            (3, 1.0, 2.0, 0.0),
            (4, 1.0, 2.5, 0.0),
            (5, 1.0, 2.0, 0.0),
            (7, 2.0, 3.0, 0.0),
            (8, 1.0, 2.0, 0.0),
        ],
    },
    KitSeed {
        name: "DTC A1c Kit",
        description: "Direct-to-consumer A1c testing kit with customer-provided reagents",
        distribution: DistributionModel::Dtc,
        fulfillment: FulfillmentModel::B2cApi,
        lines: &[
            (0, 1.0, 2.0, 0.0),
            (1, 1.0, 2.0, 0.0),
            (2, 1.0, 2.0, 0.0),
            (3, 1.0, 2.0, 0.0),
            (4, 1.0, 2.5, 0.0),
            (5, 1.0, 2.0, 0.0),
            (6, 1.0, 2.0, 0.50),
            (7, 2.0, 3.0, 0.0),
            (8, 1.0, 2.0, 0.0),
            (9, 1.0, 2.0, 0.75),
        ],
    },
    KitSeed {
        name: "Bulk KED Kit",
        description: "Bulk kit for ketone testing program (simplified)",
        distribution: DistributionModel::Bulk,
        fulfillment: FulfillmentModel::B2bBulk,
        lines: &[
            (0, 1.0, 2.0, 0.0),
            (1, 1.0, 2.0, 0.0),
            (3, 1.0, 2.0, 0.0),
            (8, 1.0, 2.0, 0.0),
        ],
    },
];

struct QuoteSeed {
    name: &'static str,
    customer: &'static str,
    status: QuoteStatus,
    ship_date: (i32, u32, u32),
    fulfillment: FulfillmentModel,
    /// (kit index, quantity)
    runs: &'static [(usize, u64)],
}

const QUOTES: &[QuoteSeed] = &[
    QuoteSeed {
        name: "Q1 2026 - Acme Fitness Corp (10,000 Kits)",
        customer: "Acme Fitness Corporation",
        status: QuoteStatus::Quoted,
        ship_date: (2026, 3, 15),
        fulfillment: FulfillmentModel::B2bBulk,
        runs: &[(0, 5000), (3, 5000)],
    },
    QuoteSeed {
        name: "DTC A1c Program - HealthTech Startup (3,000 Kits)",
        customer: "HealthTech Innovations",
        status: QuoteStatus::InProduction,
        ship_date: (2026, 2, 1),
        fulfillment: FulfillmentModel::B2cApi,
        runs: &[(2, 3000)],
    },
    QuoteSeed {
        name: "Enterprise DTC Fitness - National Rollout (25,000 Kits)",
        customer: "FitLife National Wellness",
        status: QuoteStatus::Approved,
        ship_date: (2026, 4, 1),
        fulfillment: FulfillmentModel::B2cApi,
        runs: &[(1, 25000)],
    },
];

/// Demo components, in catalog order
pub fn sample_components(author: &str) -> Vec<Component> {
    COMPONENTS
        .iter()
        .map(|seed| {
            let mut cmp = Component::new(seed.name, seed.sourcing, seed.unit_cost, author);
            cmp.sku = Some(seed.sku.to_string());
            cmp.category = Some(seed.category.to_string());
            cmp.moq = seed.moq;
            cmp.lead_time_days = Some(seed.lead_time_days);
            cmp.at_risk = seed.at_risk;
            cmp.vendor = seed.vendor.map(str::to_string);
            cmp.notes = Some(seed.notes.to_string());
            cmp
        })
        .collect()
}

/// Demo kits built from the given demo components
pub fn sample_kits(components: &[Component], author: &str) -> Vec<Kit> {
    KITS.iter()
        .map(|seed| {
            let mut kit = Kit::new(seed.name, author);
            kit.description = Some(seed.description.to_string());
            kit.distribution = seed.distribution;
            kit.fulfillment = seed.fulfillment;
            kit.bom = seed
                .lines
                .iter()
                .filter_map(|&(idx, units, buffer, handling)| {
                    components.get(idx).map(|cmp| {
                        let mut entry = BomEntry::new(cmp, units);
                        entry.buffer_percent = buffer;
                        entry.handling_surcharge = handling;
                        entry
                    })
                })
                .collect();
            kit
        })
        .collect()
}

/// Seed the demo data into a store, pricing the demo quotes as it goes
pub fn seed<S: CatalogStore>(
    store: &mut S,
    author: &str,
    assembly_cost_per_kit: f64,
) -> Result<SeedSummary, StoreError> {
    let components = sample_components(author);
    for cmp in &components {
        store.save_component(cmp)?;
    }

    let kits = sample_kits(&components, author);
    for kit in &kits {
        store.save_kit(kit)?;
    }

    let mut quotes = 0;
    for seed in QUOTES {
        let mut quote = Quote::new(seed.name, author);
        quote.customer = Some(seed.customer.to_string());
        quote.status = seed.status;
        quote.fulfillment = seed.fulfillment;
        let (y, m, d) = seed.ship_date;
        quote.target_ship_date = NaiveDate::from_ymd_opt(y, m, d);

        for &(kit_idx, quantity) in seed.runs {
            let Some(kit) = kits.get(kit_idx) else { continue };
            let lines = store.resolve_bom(kit)?;
            let pricing = calculate_project_pricing(&lines, quantity, assembly_cost_per_kit);
            quote.add_kit(QuoteKit::from_pricing(kit, quantity, assembly_cost_per_kit, &pricing));
        }

        store.save_quote(&quote)?;
        quotes += 1;
    }

    tracing::info!(
        components = components.len(),
        kits = kits.len(),
        quotes,
        "seeded sample data"
    );

    Ok(SeedSummary {
        components: components.len(),
        kits: kits.len(),
        quotes,
    })
}

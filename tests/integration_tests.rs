//! Integration tests for KITQ CLI
//!
//! These tests exercise the CLI commands end-to-end using assert_cmd.

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use tempfile::TempDir;

/// Helper to get a kitq command isolated from the user's global config
fn kitq(tmp: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("kitq").unwrap();
    cmd.current_dir(tmp.path())
        .env("KITQ_AUTHOR", "Test Author")
        .env("XDG_CONFIG_HOME", tmp.path().join(".xdg"))
        .env_remove("KITQ_ASSEMBLY_COST")
        .env_remove("RUST_LOG");
    cmd
}

/// Helper to create a test project in a temp directory
fn setup_test_project() -> TempDir {
    let tmp = TempDir::new().unwrap();
    kitq(&tmp).arg("init").assert().success();
    tmp
}

/// Helper to add a catalog component
fn create_component(tmp: &TempDir, name: &str, unit_cost: &str, extra: &[&str]) {
    let mut args = vec!["cmp", "new", "--name", name, "--unit-cost", unit_cost];
    args.extend_from_slice(extra);
    kitq(tmp).args(&args).assert().success();
}

/// Helper to run a command and parse its JSON stdout
fn json_output(tmp: &TempDir, args: &[&str]) -> serde_json::Value {
    let output = kitq(tmp).args(args).args(["-f", "json"]).output().unwrap();
    assert!(
        output.status.success(),
        "command failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    serde_json::from_slice(&output.stdout).unwrap()
}

// ============================================================================
// CLI Basic Tests
// ============================================================================

#[test]
fn test_help_displays() {
    let tmp = TempDir::new().unwrap();
    kitq(&tmp)
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("kit bills of materials"));
}

#[test]
fn test_version_displays() {
    let tmp = TempDir::new().unwrap();
    kitq(&tmp)
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("kitq"));
}

#[test]
fn test_commands_outside_project_fail() {
    let tmp = TempDir::new().unwrap();
    kitq(&tmp)
        .args(["cmp", "list"])
        .assert()
        .failure()
        .stderr(
            predicate::str::contains("not a KITQ project")
                .or(predicate::str::contains(".kitq")),
        );
}

#[test]
fn test_completions_generate() {
    let tmp = TempDir::new().unwrap();
    kitq(&tmp)
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("kitq"));
}

// ============================================================================
// Init Tests
// ============================================================================

#[test]
fn test_init_creates_structure() {
    let tmp = setup_test_project();

    assert!(tmp.path().join(".kitq").is_dir());
    assert!(tmp.path().join(".kitq/config.yaml").is_file());
    assert!(tmp.path().join("catalog/components").is_dir());
    assert!(tmp.path().join("kits").is_dir());
    assert!(tmp.path().join("quotes").is_dir());
}

#[test]
fn test_init_twice_suggests_force() {
    let tmp = setup_test_project();

    kitq(&tmp)
        .arg("init")
        .assert()
        .success()
        .stdout(predicate::str::contains("already exists"))
        .stdout(predicate::str::contains("--force"));
}

#[test]
fn test_init_sample_seeds_demo_data() {
    let tmp = TempDir::new().unwrap();
    kitq(&tmp)
        .args(["init", "--sample"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Seeded 10 components, 4 kits and 3 quotes"));

    kitq(&tmp)
        .args(["cmp", "list", "--count"])
        .assert()
        .success()
        .stdout("10\n");
    kitq(&tmp)
        .args(["kit", "list", "--count"])
        .assert()
        .success()
        .stdout("4\n");
    kitq(&tmp)
        .args(["quote", "list", "--count"])
        .assert()
        .success()
        .stdout("3\n");
}

// ============================================================================
// Component Catalog Tests
// ============================================================================

#[test]
fn test_cmp_new_and_list() {
    let tmp = setup_test_project();
    create_component(&tmp, "Gel Ice Pack", "0.75", &["--category", "Cold Chain"]);

    kitq(&tmp)
        .args(["cmp", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("CMP@1"))
        .stdout(predicate::str::contains("Gel Ice Pack"))
        .stdout(predicate::str::contains("1 component(s) found"));
}

#[test]
fn test_cmp_list_filters() {
    let tmp = setup_test_project();
    create_component(&tmp, "Gel Ice Pack", "0.75", &[]);
    create_component(&tmp, "Reagent Strip", "0", &["--sourcing", "customer-provided"]);
    create_component(&tmp, "Custom Foam Insert", "1.10", &["--at-risk"]);

    kitq(&tmp)
        .args(["cmp", "list", "--sourcing", "customer-provided", "--count"])
        .assert()
        .success()
        .stdout("1\n");
    kitq(&tmp)
        .args(["cmp", "list", "--at-risk", "--count"])
        .assert()
        .success()
        .stdout("1\n");
    kitq(&tmp)
        .args(["cmp", "list", "--search", "ice", "--count"])
        .assert()
        .success()
        .stdout("1\n");
}

#[test]
fn test_cmp_list_csv_and_ids() {
    let tmp = setup_test_project();
    create_component(&tmp, "Gel Ice Pack, 4oz", "0.75", &["--moq", "1000"]);

    kitq(&tmp)
        .args(["cmp", "list", "-f", "csv"])
        .assert()
        .success()
        .stdout(predicate::str::starts_with("short_id,id,name"))
        .stdout(predicate::str::contains("\"Gel Ice Pack, 4oz\""));
    kitq(&tmp)
        .args(["cmp", "list", "-f", "id"])
        .assert()
        .success()
        .stdout(predicate::str::starts_with("CMP-"));
}

#[test]
fn test_cmp_show_and_set_cost() {
    let tmp = setup_test_project();
    create_component(&tmp, "Lancet", "0.12", &["--lead-time", "21"]);

    kitq(&tmp)
        .args(["cmp", "set-cost", "CMP@1", "0.15"])
        .assert()
        .success()
        .stdout(predicate::str::contains("$0.15"));

    let cmp = json_output(&tmp, &["cmp", "show", "CMP@1"]);
    assert_eq!(cmp["name"], "Lancet");
    assert_eq!(cmp["unit_cost"], 0.15);
    assert_eq!(cmp["lead_time_days"], 21);
    assert_eq!(cmp["sourcing"], "dot_sourced");
}

#[test]
fn test_cmp_new_rejects_invalid_values() {
    let tmp = setup_test_project();

    kitq(&tmp)
        .args(["cmp", "new", "--name", "X", "--unit-cost", "1", "--sourcing", "drop-ship"])
        .assert()
        .failure();
    kitq(&tmp)
        .args(["cmp", "new", "--name", "X", "--unit-cost", "1", "--moq", "0"])
        .assert()
        .failure();
    kitq(&tmp)
        .args(["cmp", "new", "--name", "X", "--unit-cost", "-1"])
        .assert()
        .failure();
    kitq(&tmp)
        .args(["cmp", "new", "--unit-cost", "1"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Name is required"));
}

#[test]
fn test_unknown_short_id_fails() {
    let tmp = setup_test_project();
    kitq(&tmp)
        .args(["cmp", "show", "CMP@42"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("CMP@42"));
}

// ============================================================================
// Kit Tests
// ============================================================================

/// Project with one Dot-sourced and one customer-provided component in a kit
fn setup_priced_kit() -> TempDir {
    let tmp = setup_test_project();
    create_component(&tmp, "Gel Ice Pack", "0.75", &[]);
    create_component(&tmp, "Reagent Strip", "0", &["--sourcing", "customer-provided"]);
    kitq(&tmp)
        .args(["kit", "new", "--name", "Bulk Fit Kit"])
        .assert()
        .success()
        .stdout(predicate::str::contains("KIT@1"));
    kitq(&tmp)
        .args(["kit", "add", "KIT@1", "CMP@1", "--units", "1"])
        .assert()
        .success();
    kitq(&tmp)
        .args(["kit", "add", "KIT@1", "CMP@2", "--units", "1"])
        .assert()
        .success();
    tmp
}

#[test]
fn test_kit_show_lists_bom() {
    let tmp = setup_priced_kit();

    kitq(&tmp)
        .args(["kit", "show", "KIT@1"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Gel Ice Pack"))
        .stdout(predicate::str::contains("Customer"))
        .stdout(predicate::str::contains("RCV QA"));

    let kit = json_output(&tmp, &["kit", "show", "KIT@1"]);
    let bom = kit["bom"].as_array().unwrap();
    assert_eq!(bom.len(), 2);
    assert_eq!(bom[0]["buffer_percent"], 2.0);
    assert_eq!(bom[1]["sourcing"], "customer_provided");
    assert_eq!(bom[1]["requires_qa"], true);
}

#[test]
fn test_kit_remove_line_by_number() {
    let tmp = setup_priced_kit();

    kitq(&tmp)
        .args(["kit", "remove", "KIT@1", "1"])
        .assert()
        .success();
    let kit = json_output(&tmp, &["kit", "show", "KIT@1"]);
    let bom = kit["bom"].as_array().unwrap();
    assert_eq!(bom.len(), 1);
    assert_eq!(bom[0]["sourcing"], "customer_provided");

    kitq(&tmp)
        .args(["kit", "remove", "KIT@1", "5"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("out of range"));
}

#[test]
fn test_kit_deactivate_hides_from_list() {
    let tmp = setup_priced_kit();

    kitq(&tmp).args(["kit", "deactivate", "KIT@1"]).assert().success();
    kitq(&tmp)
        .args(["kit", "list", "--count"])
        .assert()
        .success()
        .stdout("0\n");
    kitq(&tmp)
        .args(["kit", "list", "--all", "--count"])
        .assert()
        .success()
        .stdout("1\n");

    kitq(&tmp).args(["kit", "activate", "KIT@1"]).assert().success();
    kitq(&tmp)
        .args(["kit", "list", "--count"])
        .assert()
        .success()
        .stdout("1\n");
}

// ============================================================================
// Pricing Tests
// ============================================================================

#[test]
fn test_price_breakdown_and_warnings() {
    let tmp = setup_priced_kit();

    kitq(&tmp)
        .args(["price", "KIT@1", "--kits", "3000"])
        .assert()
        .success()
        .stdout(predicate::str::contains("$2,325.00"))
        .stdout(predicate::str::contains(
            "Rounding to 3100 units for print efficiency (saves setup costs)",
        ))
        .stdout(predicate::str::contains("Customer-provided: Delivery date required"))
        .stdout(predicate::str::contains("Dot-sourced: Standard lead time applies"));
}

#[test]
fn test_price_json_totals() {
    let tmp = setup_priced_kit();

    let report = json_output(&tmp, &["price", "KIT@1", "--kits", "3000"]);
    assert_eq!(report["component_cost"], 2325.0);
    assert_eq!(report["handling_cost"], 0.0);
    assert_eq!(report["assembly_cost"], 45000.0);
    assert_eq!(report["total_cost"], 47325.0);
    assert_eq!(report["order_quantity"], 6200);
    let lines = report["lines"].as_array().unwrap();
    assert_eq!(lines[1]["cost"], 0.0);
    assert_eq!(lines[1]["order_quantity"], 3100);
}

#[test]
fn test_price_honors_moq_floor() {
    let tmp = setup_test_project();
    create_component(&tmp, "Custom Label", "0.05", &["--moq", "1000"]);
    kitq(&tmp).args(["kit", "new", "--name", "Small Run"]).assert().success();
    kitq(&tmp)
        .args(["kit", "add", "KIT@1", "CMP@1", "--units", "1"])
        .assert()
        .success();

    kitq(&tmp)
        .args(["price", "KIT@1", "--kits", "100"])
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "Order quantity (102) is below MOQ (1000). Recommended: 1000 units.",
        ))
        .stdout(predicate::str::contains("Rounding to").not());
}

#[test]
fn test_price_uses_configured_assembly_cost() {
    let tmp = setup_priced_kit();

    kitq(&tmp)
        .args(["config", "set", "assembly_cost_per_kit", "10"])
        .assert()
        .success();
    let report = json_output(&tmp, &["price", "KIT@1", "--kits", "100"]);
    assert_eq!(report["assembly_cost"], 1000.0);

    let report = json_output(&tmp, &["price", "KIT@1", "--kits", "100", "--assembly-cost", "12"]);
    assert_eq!(report["assembly_cost"], 1200.0);
}

#[test]
fn test_price_ignores_non_finite_assembly_cost_env() {
    let tmp = setup_priced_kit();

    let output = kitq(&tmp)
        .env("KITQ_ASSEMBLY_COST", "inf")
        .args(["price", "KIT@1", "--kits", "100", "-f", "json"])
        .output()
        .unwrap();
    assert!(output.status.success());
    let report: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(report["assembly_cost"], 1500.0);

    let output = kitq(&tmp)
        .env("KITQ_ASSEMBLY_COST", "12")
        .args(["price", "KIT@1", "--kits", "100", "-f", "json"])
        .output()
        .unwrap();
    let report: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(report["assembly_cost"], 1200.0);
}

// ============================================================================
// Quote & SOW Tests
// ============================================================================

fn setup_quote() -> TempDir {
    let tmp = setup_priced_kit();
    kitq(&tmp)
        .args([
            "quote",
            "new",
            "--name",
            "Spring Wellness Program",
            "--customer",
            "Acme Fitness Corp",
            "--ship-date",
            "2026-03-15",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("QUOT@1"));
    kitq(&tmp)
        .args(["quote", "add-kit", "QUOT@1", "KIT@1", "--qty", "3000"])
        .assert()
        .success();
    tmp
}

#[test]
fn test_quote_add_kit_totals() {
    let tmp = setup_quote();

    let quote = json_output(&tmp, &["quote", "show", "QUOT@1"]);
    assert_eq!(quote["kits"].as_array().unwrap().len(), 1);
    assert_eq!(quote["total_manufacture_cost"], 2325.0);
    assert_eq!(quote["total_assembly_cost"], 45000.0);
    assert_eq!(quote["total_project_cost"], 47325.0);
    assert_eq!(quote["status"], "draft");
}

#[test]
fn test_quote_reprice_after_cost_change() {
    let tmp = setup_quote();

    kitq(&tmp)
        .args(["cmp", "set-cost", "CMP@1", "1.00"])
        .assert()
        .success();
    kitq(&tmp).args(["quote", "reprice", "QUOT@1"]).assert().success();

    let quote = json_output(&tmp, &["quote", "show", "QUOT@1"]);
    assert_eq!(quote["total_manufacture_cost"], 3100.0);
    assert_eq!(quote["total_project_cost"], 48100.0);
}

#[test]
fn test_quote_remove_kit_and_status() {
    let tmp = setup_quote();

    kitq(&tmp)
        .args(["quote", "status", "QUOT@1", "approved"])
        .assert()
        .success();
    kitq(&tmp)
        .args(["quote", "remove-kit", "QUOT@1", "1"])
        .assert()
        .success();

    let quote = json_output(&tmp, &["quote", "show", "QUOT@1"]);
    assert_eq!(quote["status"], "approved");
    assert!(quote["kits"].as_array().unwrap().is_empty());
    assert_eq!(quote["total_project_cost"], 0.0);
}

#[test]
fn test_quote_add_empty_kit_warns() {
    let tmp = setup_test_project();

    kitq(&tmp)
        .args(["kit", "new", "--name", "Placeholder Kit"])
        .assert()
        .success();
    kitq(&tmp)
        .args(["quote", "new", "--name", "Pilot Run"])
        .assert()
        .success();

    kitq(&tmp)
        .args(["quote", "add-kit", "QUOT@1", "KIT@1", "--qty", "100"])
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "Kit has no BOM defined - cannot calculate component costs",
        ));

    let quote = json_output(&tmp, &["quote", "show", "QUOT@1"]);
    let run = &quote["kits"][0];
    assert_eq!(run["manufacture_cost"], 0.0);
    assert_eq!(run["assembly_cost"], 1500.0);
    assert_eq!(
        run["warnings"],
        serde_json::json!(["Kit has no BOM defined - cannot calculate component costs"])
    );

    kitq(&tmp).args(["quote", "reprice", "QUOT@1"]).assert().success();
    let quote = json_output(&tmp, &["quote", "show", "QUOT@1"]);
    assert_eq!(
        quote["kits"][0]["warnings"],
        serde_json::json!(["Kit has no BOM defined - cannot calculate component costs"])
    );
    assert_eq!(quote["total_project_cost"], 1500.0);
}

#[test]
fn test_sow_renders_document() {
    let tmp = setup_quote();

    kitq(&tmp)
        .args(["sow", "QUOT@1", "--date", "2026-01-05"])
        .assert()
        .success()
        .stdout(predicate::str::contains("# Statement of Work"))
        .stdout(predicate::str::contains("**Prepared:** January 5, 2026"))
        .stdout(predicate::str::contains("| **Target Ship Date** | March 15, 2026 |"))
        .stdout(predicate::str::contains("| **Fulfillment Model** | B2B Bulk Shipment |"))
        .stdout(predicate::str::contains("| Reagent Strip | 1 | Customer |"))
        .stdout(predicate::str::contains("excluded from sourcing costs: Reagent Strip."))
        .stdout(predicate::str::contains("**Total Program Cost**"))
        .stdout(predicate::str::contains("$47,325.00"));
}

#[test]
fn test_sow_writes_file_and_stamps_quote() {
    let tmp = setup_quote();
    let out = tmp.path().join("sow.md");

    kitq(&tmp)
        .args(["sow", "QUOT@1", "-o"])
        .arg(&out)
        .assert()
        .success();

    let content = fs::read_to_string(&out).unwrap();
    assert!(content.contains("Spring Wellness Program"));
    assert!(content.contains("Dot Representative"));

    let quote = json_output(&tmp, &["quote", "show", "QUOT@1"]);
    assert!(quote["sow_generated_at"].is_string());
}

// ============================================================================
// Import Tests
// ============================================================================

#[test]
fn test_import_template() {
    let tmp = TempDir::new().unwrap();
    kitq(&tmp)
        .args(["import", "--template"])
        .assert()
        .success()
        .stdout(predicate::str::starts_with(
            "name,sku,category,sourcing,unit_cost,moq,lead_time_days,at_risk,vendor,notes",
        ));
}

#[test]
fn test_import_components() {
    let tmp = setup_test_project();
    let csv = tmp.path().join("components.csv");
    fs::write(
        &csv,
        "name,sku,category,sourcing,unit_cost,moq,lead_time_days,at_risk,vendor,notes\n\
         Gel Ice Pack,ICE-1,Cold Chain,dot_sourced,0.75,1000,21,false,Polar Supply,\n\
         Reagent Strip,,Reagents,customer_provided,0,,,,,\n",
    )
    .unwrap();

    kitq(&tmp)
        .args(["import", "--dry-run"])
        .arg(&csv)
        .assert()
        .success()
        .stdout(predicate::str::contains("Dry run complete"));
    kitq(&tmp)
        .args(["cmp", "list", "--count"])
        .assert()
        .success()
        .stdout("0\n");

    kitq(&tmp).arg("import").arg(&csv).assert().success();
    kitq(&tmp)
        .args(["cmp", "list", "--count"])
        .assert()
        .success()
        .stdout("2\n");
    kitq(&tmp)
        .args(["cmp", "list", "--sourcing", "customer-provided", "--count"])
        .assert()
        .success()
        .stdout("1\n");
}

#[test]
fn test_import_rejects_unknown_sourcing() {
    let tmp = setup_test_project();
    let csv = tmp.path().join("bad.csv");
    fs::write(
        &csv,
        "name,unit_cost,sourcing\nStrip,1,drop_ship\nLancet,0.1,dot_sourced\n",
    )
    .unwrap();

    kitq(&tmp)
        .arg("import")
        .arg(&csv)
        .assert()
        .failure()
        .stderr(predicate::str::contains("drop_ship"));

    kitq(&tmp)
        .args(["import", "--skip-errors"])
        .arg(&csv)
        .assert()
        .success();
    kitq(&tmp)
        .args(["cmp", "list", "--count"])
        .assert()
        .success()
        .stdout("1\n");
}

// ============================================================================
// Config Tests
// ============================================================================

#[test]
fn test_config_set_show_unset() {
    let tmp = setup_test_project();

    kitq(&tmp)
        .args(["config", "set", "buffer_percent", "3"])
        .assert()
        .success();
    kitq(&tmp)
        .args(["config", "show", "buffer_percent"])
        .assert()
        .success()
        .stdout("3\n");
    kitq(&tmp)
        .args(["config", "unset", "buffer_percent"])
        .assert()
        .success();
    kitq(&tmp)
        .args(["config", "show", "buffer_percent"])
        .assert()
        .failure();
}

#[test]
fn test_config_rejects_bad_keys_and_values() {
    let tmp = setup_test_project();

    kitq(&tmp)
        .args(["config", "set", "pager", "less"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown configuration key"));
    kitq(&tmp)
        .args(["config", "set", "assembly_cost_per_kit", "cheap"])
        .assert()
        .failure();
}

#[test]
fn test_config_buffer_applies_to_new_lines() {
    let tmp = setup_test_project();
    create_component(&tmp, "Gel Ice Pack", "0.75", &[]);
    kitq(&tmp).args(["kit", "new", "--name", "Kit"]).assert().success();
    kitq(&tmp)
        .args(["config", "set", "buffer_percent", "5"])
        .assert()
        .success();
    kitq(&tmp)
        .args(["kit", "add", "KIT@1", "CMP@1", "--units", "1"])
        .assert()
        .success();

    let kit = json_output(&tmp, &["kit", "show", "KIT@1"]);
    assert_eq!(kit["bom"][0]["buffer_percent"], 5.0);
}

//! Output formatting for estimations, quotes and inventory reports.

use crate::config::OutputFormat;
use crate::inventory::{InventoryReport, InventoryRow, Quote};
use crate::market::{EstimationResult, VehicleDescriptor};

const REPORT_COLUMNS: [&str; 18] = [
    "id",
    "branch",
    "light",
    "diagnosis",
    "days",
    "vehicle",
    "version",
    "year",
    "status",
    "comparables",
    "book_cost",
    "buy_price",
    "list_price",
    "suggested_price",
    "market_min",
    "expected_profit",
    "url",
    "date",
];

/// Formats appraisal output.
pub struct Formatter {
    format: OutputFormat,
}

impl Formatter {
    /// Creates a new formatter.
    pub fn new(format: OutputFormat) -> Self {
        Self { format }
    }

    /// Formats a single estimation.
    pub fn format_estimation(&self, vehicle: &VehicleDescriptor, result: &EstimationResult) -> String {
        match self.format {
            OutputFormat::Json => {
                serde_json::to_string_pretty(result).unwrap_or_else(|_| "{}".to_string())
            }
            OutputFormat::Table => self.table_estimation(vehicle, result),
            OutputFormat::Markdown => self.markdown_estimation(vehicle, result),
            OutputFormat::Csv => self.csv_estimation(vehicle, result),
        }
    }

    /// Formats a catalog quote.
    pub fn format_quote(&self, quote: &Quote) -> String {
        match self.format {
            OutputFormat::Json => {
                serde_json::to_string_pretty(quote).unwrap_or_else(|_| "{}".to_string())
            }
            OutputFormat::Csv => self.csv_estimation(&quote.vehicle, &quote.estimation),
            OutputFormat::Table | OutputFormat::Markdown => self.text_quote(quote),
        }
    }

    /// Formats an inventory report.
    pub fn format_report(&self, report: &InventoryReport) -> String {
        if report.rows.is_empty() {
            return match self.format {
                OutputFormat::Json => {
                    serde_json::to_string_pretty(report).unwrap_or_else(|_| "{}".to_string())
                }
                OutputFormat::Csv => REPORT_COLUMNS.join(","),
                _ => "No vehicles to analyze.".to_string(),
            };
        }

        match self.format {
            OutputFormat::Json => {
                serde_json::to_string_pretty(report).unwrap_or_else(|_| "{}".to_string())
            }
            OutputFormat::Table => self.table_report(report),
            OutputFormat::Markdown => self.markdown_report(report),
            OutputFormat::Csv => self.csv_report(&report.rows),
        }
    }

    // Table formatting

    fn table_estimation(&self, vehicle: &VehicleDescriptor, result: &EstimationResult) -> String {
        let mut lines = Vec::new();

        lines.push(format!("Vehicle:     {} {}", vehicle.label(), vehicle.year.trim()));
        lines.push(format!("Status:      {}", result.status));

        if result.is_success() {
            lines.push(format!("Suggested:   {}", money(result.suggested_price)));
            lines.push(format!("Buy up to:   {}", money(result.buy_price())));
            lines.push(format!(
                "Market:      {} - {}",
                money(result.market_min),
                money(result.market_max)
            ));
            lines.push(format!(
                "Comparables: {} (of {} prices on page)",
                result.comparable_count, result.raw_matches
            ));
            if result.used_fallback {
                lines.push("Note:        prices too spread out to drop outliers".to_string());
            }
        } else if let Some(message) = &result.message {
            lines.push(format!("Error:       {}", message));
        } else if result.raw_matches > 0 {
            lines.push(format!("Prices seen: {} (none plausible)", result.raw_matches));
        }

        if !result.search_url.is_empty() {
            lines.push(format!("URL:         {}", result.search_url));
        }

        lines.join("\n")
    }

    fn table_report(&self, report: &InventoryReport) -> String {
        let vehicle_width = 28;
        let mut lines = Vec::new();

        lines.push(format!("Executive summary: {}", report.name));
        lines.push(format!("Inventory value:   {}", money(report.summary.inventory_value)));
        lines.push(format!("Potential profit:  {}", signed_money(report.summary.potential_profit)));
        lines.push(format!(
            "Appraised:         {} of {}",
            report.summary.appraised, report.summary.vehicles
        ));
        lines.push(String::new());

        lines.push(format!(
            "{:<8}  {:<6}  {:<12}  {:>5}  {:<vehicle_width$}  {:<4}  {:>5}  {:>12}  {:>12}  {:>12}  {:>12}",
            "ID", "Light", "Diagnosis", "Days", "Vehicle", "Year", "Comp", "Cost", "Buy", "Suggested", "Profit"
        ));
        lines.push(format!(
            "{:-<8}  {:-<6}  {:-<12}  {:->5}  {:-<vehicle_width$}  {:-<4}  {:->5}  {:->12}  {:->12}  {:->12}  {:->12}",
            "", "", "", "", "", "", "", "", "", "", ""
        ));

        for row in &report.rows {
            let light = row.light.map(|l| l.to_string()).unwrap_or_default();
            lines.push(format!(
                "{:<8}  {:<6}  {:<12}  {:>5}  {:<vehicle_width$}  {:<4}  {:>5}  {:>12}  {:>12}  {:>12}  {:>12}",
                truncate(&row.id, 8),
                light,
                row.diagnosis.to_string(),
                row.days_in_stock,
                truncate(&row.vehicle, vehicle_width),
                row.year,
                row.comparables,
                money(row.book_cost),
                money(row.buy_price),
                money(row.suggested_price),
                signed_money(row.expected_profit)
            ));
        }

        lines.push(String::new());
        lines.push(format!("Total: {} vehicles", report.rows.len()));

        lines.join("\n")
    }

    fn text_quote(&self, quote: &Quote) -> String {
        let mut lines = vec![self.format_estimation(&quote.vehicle, &quote.estimation)];

        if let Some(catalog_buy) = quote.catalog_buy {
            lines.push(format!("Catalog buy: {}", money(catalog_buy)));
        }
        if let Some(margin) = quote.margin_vs_catalog {
            lines.push(format!("Margin:      {} vs catalog buy price", signed_money(margin)));
        }

        lines.join("\n")
    }

    // Markdown formatting

    fn markdown_estimation(&self, vehicle: &VehicleDescriptor, result: &EstimationResult) -> String {
        let mut lines = Vec::new();

        lines.push(format!("## {} {}", vehicle.label(), vehicle.year.trim()));
        lines.push(String::new());
        lines.push(format!("- **Status:** {}", result.status));

        if result.is_success() {
            lines.push(format!("- **Suggested price:** {}", money(result.suggested_price)));
            lines.push(format!("- **Buy up to:** {}", money(result.buy_price())));
            lines.push(format!(
                "- **Market range:** {} - {}",
                money(result.market_min),
                money(result.market_max)
            ));
            lines.push(format!("- **Comparables:** {}", result.comparable_count));
        }

        if let Some(message) = &result.message {
            lines.push(format!("- **Error:** {}", message));
        }

        if !result.search_url.is_empty() {
            lines.push(format!("- **Search:** [listings]({})", result.search_url));
        }

        lines.join("\n")
    }

    fn markdown_report(&self, report: &InventoryReport) -> String {
        let mut lines = Vec::new();

        lines.push(format!("# Executive summary: {}", report.name));
        lines.push(String::new());
        lines.push(format!("- **Inventory value:** {}", money(report.summary.inventory_value)));
        lines.push(format!(
            "- **Potential profit:** {}",
            signed_money(report.summary.potential_profit)
        ));
        lines.push(String::new());
        lines.push(
            "| ID | Diagnosis | Days | Vehicle | Year | Comp. | Cost | Buy | Suggested | Profit | Link |"
                .to_string(),
        );
        lines.push(
            "|----|-----------|-----:|---------|------|------:|-----:|----:|----------:|-------:|------|"
                .to_string(),
        );

        for row in &report.rows {
            let link = if row.search_url.is_empty() {
                String::new()
            } else {
                format!("[search]({})", row.search_url)
            };

            lines.push(format!(
                "| {} | {} | {} | {} | {} | {} | {} | {} | {} | {} | {} |",
                row.id.replace('|', "\\|"),
                row.diagnosis,
                row.days_in_stock,
                row.vehicle.replace('|', "\\|"),
                row.year,
                row.comparables,
                money(row.book_cost),
                money(row.buy_price),
                money(row.suggested_price),
                signed_money(row.expected_profit),
                link
            ));
        }

        lines.join("\n")
    }

    // CSV formatting

    fn csv_estimation(&self, vehicle: &VehicleDescriptor, result: &EstimationResult) -> String {
        let header = "brand,model,year,status,suggested_price,buy_price,comparables,market_min,market_max,url";
        let row = [
            escape_csv(vehicle.brand.trim()),
            escape_csv(vehicle.model.trim()),
            escape_csv(vehicle.year.trim()),
            escape_csv(&result.status.to_string()),
            result.suggested_price.to_string(),
            result.buy_price().to_string(),
            result.comparable_count.to_string(),
            result.market_min.to_string(),
            result.market_max.to_string(),
            escape_csv(&result.search_url),
        ];

        format!("{}\n{}", header, row.join(","))
    }

    fn csv_report(&self, rows: &[InventoryRow]) -> String {
        let mut lines = vec![REPORT_COLUMNS.join(",")];

        for row in rows {
            let fields = [
                escape_csv(&row.id),
                escape_csv(&row.branch),
                row.light.map(|l| l.to_string()).unwrap_or_default(),
                row.diagnosis.to_string(),
                row.days_in_stock.to_string(),
                escape_csv(&row.vehicle),
                escape_csv(&row.version),
                escape_csv(&row.year),
                row.status.to_string(),
                row.comparables.to_string(),
                row.book_cost.to_string(),
                row.buy_price.to_string(),
                row.list_price.to_string(),
                row.suggested_price.to_string(),
                row.market_min.to_string(),
                row.expected_profit.to_string(),
                escape_csv(&row.search_url),
                row.date.clone(),
            ];
            lines.push(fields.join(","));
        }

        lines.join("\n")
    }
}

/// Formats an amount as currency with thousands separators ("$1,234,500").
pub fn money(amount: u64) -> String {
    let digits = amount.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    out.push('$');

    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }

    out
}

fn signed_money(amount: i64) -> String {
    if amount < 0 {
        format!("-{}", money(amount.unsigned_abs()))
    } else {
        money(amount as u64)
    }
}

fn truncate(text: &str, width: usize) -> String {
    if text.chars().count() > width {
        let cut: String = text.chars().take(width.saturating_sub(3)).collect();
        format!("{}...", cut)
    } else {
        text.to_string()
    }
}

/// Escapes a string for CSV output.
fn escape_csv(s: &str) -> String {
    if s.contains(',') || s.contains('"') || s.contains('\n') {
        format!("\"{}\"", s.replace('"', "\"\""))
    } else {
        s.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::inventory::analysis::{appraised_row, summarize, year_error_row};
    use crate::inventory::{quote, InventoryItem};
    use crate::market::EstimationStatus;

    fn vehicle() -> VehicleDescriptor {
        VehicleDescriptor::new("Toyota", "Corolla", "2020")
    }

    fn success() -> EstimationResult {
        EstimationResult {
            suggested_price: 99_750,
            comparable_count: 3,
            status: EstimationStatus::Success,
            search_url: "https://autos.example.com/toyota/corolla/2020_NoIndex_True?VIEW=list".to_string(),
            market_min: 100_000,
            market_max: 110_000,
            raw_matches: 5,
            used_fallback: false,
            message: None,
        }
    }

    fn report() -> InventoryReport {
        let item = InventoryItem {
            id: "A-1".to_string(),
            branch: "Centro".to_string(),
            brand: "Toyota".to_string(),
            model: "Corolla".to_string(),
            version: "LE, CVT".to_string(),
            year: "2020".to_string(),
            list_price: 95_000,
            book_cost: 80_000,
            days_in_stock: Some(10),
        };
        let mut bad = item.clone();
        bad.id = "A-2".to_string();
        bad.year = "20".to_string();

        let rows = vec![appraised_row(&item, &success(), "2026-10-19"), year_error_row(&bad, "2026-10-19")];
        let summary = summarize(&rows);
        InventoryReport { name: "Centro".to_string(), rows, summary }
    }

    #[test]
    fn test_money() {
        assert_eq!(money(0), "$0");
        assert_eq!(money(999), "$999");
        assert_eq!(money(1_000), "$1,000");
        assert_eq!(money(99_750), "$99,750");
        assert_eq!(money(1_234_567), "$1,234,567");
        assert_eq!(signed_money(-20_000), "-$20,000");
    }

    #[test]
    fn test_estimation_table() {
        let output = Formatter::new(OutputFormat::Table).format_estimation(&vehicle(), &success());
        assert!(output.contains("Toyota Corolla 2020"));
        assert!(output.contains("Suggested:   $99,750"));
        assert!(output.contains("Buy up to:   $87,780"));
        assert!(output.contains("$100,000 - $110,000"));
        assert!(output.contains("3 (of 5 prices on page)"));
        assert!(!output.contains("Note:"));
    }

    #[test]
    fn test_estimation_table_fallback_note() {
        let result = EstimationResult { used_fallback: true, ..success() };
        let output = Formatter::new(OutputFormat::Table).format_estimation(&vehicle(), &result);
        assert!(output.contains("Note:        prices too spread out"));
    }

    #[test]
    fn test_estimation_table_scrape_error() {
        let result = EstimationResult::scrape_error("https://x", "Navigation timed out after 30s");
        let output = Formatter::new(OutputFormat::Table).format_estimation(&vehicle(), &result);
        assert!(output.contains("scrape error"));
        assert!(output.contains("Navigation timed out"));
        assert!(!output.contains("Suggested"));
    }

    #[test]
    fn test_estimation_json() {
        let output = Formatter::new(OutputFormat::Json).format_estimation(&vehicle(), &success());
        let value: serde_json::Value = serde_json::from_str(&output).unwrap();
        assert_eq!(value["suggested_price"], 99_750);
        assert_eq!(value["status"], "success");
    }

    #[test]
    fn test_estimation_csv() {
        let output = Formatter::new(OutputFormat::Csv).format_estimation(&vehicle(), &success());
        let lines: Vec<&str> = output.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].starts_with("brand,model,year,status"));
        assert!(lines[1].starts_with("Toyota,Corolla,2020,success,99750,87780,3,100000,110000,"));
    }

    #[test]
    fn test_estimation_markdown() {
        let output = Formatter::new(OutputFormat::Markdown).format_estimation(&vehicle(), &success());
        assert!(output.starts_with("## Toyota Corolla 2020"));
        assert!(output.contains("[listings](https://autos.example.com/"));
    }

    #[test]
    fn test_quote_table() {
        let quote = quote(vehicle(), success(), Some(90_000));
        let output = Formatter::new(OutputFormat::Table).format_quote(&quote);
        assert!(output.contains("Catalog buy: $90,000"));
        assert!(output.contains("Margin:      $9,750"));
    }

    #[test]
    fn test_report_table() {
        let output = Formatter::new(OutputFormat::Table).format_report(&report());
        assert!(output.contains("Executive summary: Centro"));
        assert!(output.contains("Inventory value:   $160,000"));
        assert!(output.contains("Potential profit:  $19,750"));
        assert!(output.contains("OPPORTUNITY"));
        assert!(output.contains("YEAR ERROR"));
        assert!(output.contains("Total: 2 vehicles"));
    }

    #[test]
    fn test_report_csv_escapes_fields() {
        let output = Formatter::new(OutputFormat::Csv).format_report(&report());
        let lines: Vec<&str> = output.lines().collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0], REPORT_COLUMNS.join(","));
        assert!(lines[1].contains("\"LE, CVT\""));
        assert!(lines[1].starts_with("A-1,Centro,green,OPPORTUNITY,10,Toyota Corolla"));
    }

    #[test]
    fn test_report_markdown() {
        let output = Formatter::new(OutputFormat::Markdown).format_report(&report());
        assert!(output.starts_with("# Executive summary: Centro"));
        assert!(output.contains("| A-1 | OPPORTUNITY | 10 | Toyota Corolla | 2020 |"));
    }

    #[test]
    fn test_report_empty() {
        let empty = InventoryReport {
            name: "General".to_string(),
            rows: Vec::new(),
            summary: Default::default(),
        };
        assert_eq!(Formatter::new(OutputFormat::Table).format_report(&empty), "No vehicles to analyze.");
        assert_eq!(Formatter::new(OutputFormat::Csv).format_report(&empty), REPORT_COLUMNS.join(","));
    }

    #[test]
    fn test_escape_csv() {
        assert_eq!(escape_csv("simple"), "simple");
        assert_eq!(escape_csv("with,comma"), "\"with,comma\"");
        assert_eq!(escape_csv("with\"quote"), "\"with\"\"quote\"");
    }

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("Volkswagen Jetta Comfortline", 10), "Volkswa...");
    }
}

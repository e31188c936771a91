// Markdown summary report of the filtered data
// Author: Gabriel Demetrios Lafis

use chrono::{DateTime, Local};

use crate::data::RecordRef;
use crate::processing::{FilterEngine, FilterState};
use super::StateCoordinator;

/// Render the report for a set of filtered records
pub fn markdown_report(
    filtered: &[RecordRef],
    filters: &FilterState,
    generated_at: DateTime<Local>,
) -> String {
    let stats = FilterEngine::filtered_stats(filtered);

    let mut report = String::new();
    report.push_str("# Global Weather Report\n\n");
    report.push_str(&format!("**Generated:** {}\n\n", generated_at.format("%Y-%m-%d %H:%M:%S")));

    report.push_str("## Data Summary\n");
    report.push_str(&format!("- **Records analyzed:** {}\n", stats.count));
    report.push_str(&format!("- **Average temperature:** {:.1}°C\n", stats.avg_temperature));
    report.push_str(&format!("- **Average humidity:** {:.1}%\n", stats.avg_humidity));
    report.push_str(&format!("- **Countries included:** {}\n", stats.countries));
    report.push_str(&format!("- **Weather conditions:** {}\n\n", stats.conditions));

    report.push_str("## Applied Filters\n");
    report.push_str(&filters.describe());
    report.push_str("\n\n");

    report.push_str("## Analysis\n");
    report.push_str(&format!(
        "This report covers weather data from {} countries with an average temperature of {:.1}°C and an average humidity of {:.1}%.\n\n",
        stats.countries, stats.avg_temperature, stats.avg_humidity
    ));
    report.push_str("---\n*Generated by the weather dashboard engine*\n");

    report
}

impl StateCoordinator {
    /// Markdown report of the current filtered view
    pub fn report(&self) -> String {
        markdown_report(self.filtered_records(), self.filters(), Local::now())
    }
}

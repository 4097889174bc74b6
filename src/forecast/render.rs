//! Markdown rendering of a finished forecast.

use crate::types::ForecastResult;

pub fn render_markdown(result: &ForecastResult) -> String {
    let mut md = String::new();

    md.push_str(&format!("# {} Surf Forecast\n\n", result.region));
    md.push_str(&format!(
        "_Generated {}_\n\n",
        result.generated_at.format("%Y-%m-%d %H:%M UTC")
    ));
    md.push_str(result.final_forecast.trim());
    md.push_str("\n\n---\n\n");

    md.push_str("| Run | Evidence files | Refinement cycles |\n");
    md.push_str("|-----|----------------|-------------------|\n");
    md.push_str(&format!(
        "| `{}` | {} | {} |\n",
        result.run_id, result.evidence_file_count, result.cycle_count
    ));

    md
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    #[test]
    fn test_render_contains_final_forecast_and_provenance() {
        let result =
            ForecastResult::assemble(Uuid::new_v4(), "North Shore", "DRAFT\n".into(), vec![], 3);
        let md = render_markdown(&result);

        assert!(md.starts_with("# North Shore Surf Forecast"));
        assert!(md.contains("\nDRAFT\n"));
        assert!(md.contains("| 3 | 0 |"));
        assert!(md.contains(&result.run_id.to_string()));
    }
}

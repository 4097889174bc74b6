//! Prompt Assembly
//!
//! Pure builders for the forecaster, critic and assessor prompts. Nothing
//! here touches the network; every output is checked by string containment.

use crate::ai::prompt::PromptBuilder;

/// Default forecast layout: heading plus what the section must cover
const DEFAULT_STRUCTURE: &[(&str, &str)] = &[
    (
        "OVERVIEW",
        "Open with \"Aloha\" and the date, summarise the patterns affecting the islands and the key takeaways",
    ),
    (
        "NOWCAST",
        "Current buoy observations, swell heights/periods/directions in Hawaiian scale, current surf by shore",
    ),
    (
        "SYNOPTIC PATTERN ANALYSIS",
        "Active storm systems, position relative to Hawaii, central pressure, winds, seas, expected track",
    ),
    (
        "NORTH PACIFIC ANALYSIS",
        "Fetch length, width, duration and intensity; expected swell generation and travel time",
    ),
    (
        "SOUTH PACIFIC ANALYSIS",
        "Southern Hemisphere storm activity, swell windows, long-period potential",
    ),
    (
        "SWELL EVENT DETAILS",
        "Per swell: origin, arrival, peak timing, duration, heights by shore, period, direction",
    ),
    (
        "DAY-BY-DAY FORECAST",
        "Ten-day table: Date | N Shore | S Shore | E Shore | W Shore | Wind | Notes",
    ),
    (
        "WIND ANALYSIS",
        "Trade wind pattern and disruptions, Kona potential, local sea breezes, impact on surf quality",
    ),
    (
        "SPECIAL CONDITIONS",
        "Hazard warnings, tow-in and foiling windows, tide effects on specific breaks",
    ),
    (
        "CONFIDENCE LEVELS",
        "Near-term (1-3 days), mid-range (4-7 days) and extended (8-10 days) confidence",
    ),
];

const CRITIQUE_RUBRIC: &[&str] = &[
    "Meteorological accuracy, storm tracking and swell propagation timing",
    "Internal consistency between sections, shores and days",
    "Handling of local effects such as island shadowing and wind exposure",
    "Clarity and correct use of Hawaiian scale",
    "Completeness: any required section or significant swell that is missing",
];

const ASSESSMENT_RUBRIC: &[&str] = &[
    "Completeness: which expected sources are present or missing",
    "Consistency: agreement or conflict between sources",
    "Quality: stale, corrupt or implausible readings",
    "Temporal alignment: whether observation and model times line up",
    "Geographic relevance: coverage of the swell windows that matter",
];

/// Regional emphasis folded into the drafting prompt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShoreEmphasis {
    North,
    South,
    Balanced,
}

impl ShoreEmphasis {
    pub fn for_region(region: &str) -> Self {
        let lower = region.to_lowercase();
        if lower.contains("north") {
            Self::North
        } else if lower.contains("south") {
            Self::South
        } else {
            Self::Balanced
        }
    }

    fn guidance(&self) -> &'static str {
        match self {
            Self::North => {
                "Prioritise North Pacific sources: winter NW to NE swells from Aleutian and \
                 Kamchatka lows, and how trade wind strength shapes north-facing breaks."
            }
            Self::South => {
                "Prioritise Southern Hemisphere sources: long-period S to SW swells from the \
                 Tasman Sea and South Pacific, and Kona wind episodes that affect south-facing breaks."
            }
            Self::Balanced => {
                "Give balanced attention to North Pacific and Southern Hemisphere sources and \
                 note which shores each swell reaches."
            }
        }
    }
}

/// Recognised options for the drafting prompt
#[derive(Debug, Clone, Default)]
pub struct PromptOptions {
    pub region: String,
    pub assessment_report: Option<String>,
    /// Replaces the default section headings when set
    pub structure_template: Option<Vec<String>>,
}

impl PromptOptions {
    pub fn new(region: impl Into<String>) -> Self {
        Self {
            region: region.into(),
            ..Self::default()
        }
    }

    pub fn with_assessment(mut self, report: Option<&str>) -> Self {
        self.assessment_report = report.map(str::to_string);
        self
    }

    pub fn with_structure(mut self, headings: Option<Vec<String>>) -> Self {
        self.structure_template = headings;
        self
    }
}

/// Initial forecaster prompt for one region
pub fn build_initial_prompt(options: &PromptOptions) -> String {
    let region = options.region.as_str();
    let emphasis = ShoreEmphasis::for_region(region);

    let structure: Vec<String> = match &options.structure_template {
        Some(headings) if !headings.is_empty() => headings.clone(),
        _ => DEFAULT_STRUCTURE
            .iter()
            .map(|(heading, detail)| format!("{}: {}", heading, detail))
            .collect(),
    };

    let mut builder = PromptBuilder::new()
        .role("Hawaiian surf forecaster", &format!("{} wave conditions", region))
        .context_item("Region", region)
        .objectives(&[
            "Read every attached evidence file before writing",
            "Resolve conflicts between sources using meteorological reasoning",
            "Be specific about timing, heights (Hawaiian scale), periods and directions",
            "Cover both current conditions and the extended outlook",
        ])
        .section("Emphasis", emphasis.guidance())
        .section("Required Structure", &numbered(structure.as_slice()))
        .focus(
            region,
            &[
                "Reference specific breaks where relevant",
                "Do NOT invent observations that are not in the evidence",
            ],
        );

    if let Some(report) = options
        .assessment_report
        .as_deref()
        .filter(|r| !r.trim().is_empty())
    {
        builder = builder
            .quoted("DATA_ASSESSMENT", report)
            .text("Account for the data quality issues and recommendations noted in the assessment above.");
    }

    builder
        .text(&format!(
            "Write the complete {} surf forecast now.",
            region
        ))
        .build()
}

/// Critic prompt; sees only the forecast text, never the forecaster thread
pub fn build_critique_prompt(forecast: &str, region: &str) -> String {
    PromptBuilder::new()
        .role(
            "surf forecast reviewer",
            &format!("critiquing {} forecasts", region),
        )
        .section("Review Criteria", &numbered(CRITIQUE_RUBRIC))
        .quoted("FORECAST", forecast)
        .text("Provide specific, actionable feedback for improvement. Quote the passages you object to.")
        .build()
}

/// Revision request posted on the original forecast thread
pub fn build_revision_prompt(forecast: &str, critique: &str) -> String {
    PromptBuilder::new()
        .text("Revise your forecast based on the critique below.")
        .quoted("CURRENT_FORECAST", forecast)
        .quoted("CRITIQUE", critique)
        .objectives(&[
            "Address each specific issue raised in the critique",
            "Keep every required section and the overall structure",
            "Return the complete revised forecast, not a list of changes",
        ])
        .build()
}

/// Assessor prompt over the attached evidence set
pub fn build_assessment_prompt(evidence_file_count: usize) -> String {
    PromptBuilder::new()
        .role("oceanographic data analyst", "surf forecast input quality")
        .context_item("Evidence files", &evidence_file_count.to_string())
        .section("Assessment Criteria", &numbered(ASSESSMENT_RUBRIC))
        .text(
            "Summarise the issues found and recommend how a forecaster should weight or \
             discount each affected source.",
        )
        .build()
}

fn numbered<S: AsRef<str>>(items: &[S]) -> String {
    items
        .iter()
        .enumerate()
        .map(|(i, item)| format!("{}. {}", i + 1, item.as_ref()))
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_initial_prompt_names_region_and_structure() {
        let prompt = build_initial_prompt(&PromptOptions::new("Test Shore"));
        assert!(prompt.contains("Test Shore wave conditions"));
        assert!(prompt.contains("1. OVERVIEW"));
        assert!(prompt.contains("10. CONFIDENCE LEVELS"));
        assert!(!prompt.contains("DATA_ASSESSMENT"));
    }

    #[test]
    fn test_initial_prompt_folds_in_assessment() {
        let options = PromptOptions::new("North Shore")
            .with_assessment(Some("Buoy 51101 offline since Tuesday"));
        let prompt = build_initial_prompt(&options);
        assert!(prompt.contains("Buoy 51101 offline since Tuesday"));
        assert!(prompt.contains("Account for the data quality issues"));
    }

    #[test]
    fn test_blank_assessment_ignored() {
        let options = PromptOptions::new("North Shore").with_assessment(Some("   "));
        assert!(!build_initial_prompt(&options).contains("DATA_ASSESSMENT"));
    }

    #[test]
    fn test_shore_emphasis() {
        assert_eq!(ShoreEmphasis::for_region("North Shore"), ShoreEmphasis::North);
        assert_eq!(ShoreEmphasis::for_region("south shore"), ShoreEmphasis::South);
        assert_eq!(ShoreEmphasis::for_region("Windward"), ShoreEmphasis::Balanced);

        let north = build_initial_prompt(&PromptOptions::new("North Shore"));
        assert!(north.contains("NW to NE swells"));
        let south = build_initial_prompt(&PromptOptions::new("South Shore"));
        assert!(south.contains("Kona wind"));
    }

    #[test]
    fn test_structure_template_override() {
        let options = PromptOptions::new("West Shore")
            .with_structure(Some(vec!["SUMMARY".to_string(), "OUTLOOK".to_string()]));
        let prompt = build_initial_prompt(&options);
        assert!(prompt.contains("1. SUMMARY\n2. OUTLOOK"));
        assert!(!prompt.contains("NOWCAST:"));
    }

    #[test]
    fn test_critique_prompt_embeds_forecast_verbatim() {
        let forecast = "Aloha!\n  NW swell 6-8 ft Hawaiian Thursday";
        let prompt = build_critique_prompt(forecast, "North Shore");
        assert!(prompt.contains(forecast));
        assert!(prompt.contains("Meteorological accuracy"));
        assert!(prompt.contains("Internal consistency"));
        assert!(prompt.contains("local effects"));
        assert!(prompt.contains("Completeness"));
    }

    #[test]
    fn test_revision_prompt_embeds_both_texts() {
        let prompt = build_revision_prompt("DRAFT", "FIX X");
        assert!(prompt.contains("<CURRENT_FORECAST>\nDRAFT\n</CURRENT_FORECAST>"));
        assert!(prompt.contains("<CRITIQUE>\nFIX X\n</CRITIQUE>"));
        assert!(prompt.contains("Keep every required section"));
    }

    #[test]
    fn test_assessment_prompt_rubric() {
        let prompt = build_assessment_prompt(7);
        assert!(prompt.contains("**Evidence files**: 7"));
        assert!(prompt.contains("Temporal alignment"));
        assert!(prompt.contains("Geographic relevance"));
    }
}

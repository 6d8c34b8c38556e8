//! Prompt construction for ward analysis.

use airwatch_ward_models::{UserRole, Ward};

/// Framing sentence for the audience the analysis is written for.
#[must_use]
pub const fn role_context(role: UserRole) -> &'static str {
    match role {
        UserRole::Authority => {
            "You are advising a Municipal Authority. Focus on policy, enforcement, and mitigation."
        }
        UserRole::Resident => {
            "You are advising a local resident. Focus on health, safety, and community action."
        }
    }
}

const RESPONSE_SCHEMA: &str = r#"{
  "recommendations": [
    { "title": "string", "description": "string", "type": "urgent" | "advisory" | "policy" }
  ],
  "trendAnalysis": "string (A 2-3 sentence analysis of the historical trend)",
  "sourceBreakdown": [
    { "source": "string", "percentage": number, "confidence": "High" | "Medium" | "Low" }
  ],
  "news": [
    {
      "title": "string",
      "summary": "string",
      "timeAgo": "string (e.g. '2 hours ago', 'Yesterday')",
      "source": "string (Publisher Name)"
    }
  ]
}"#;

/// Builds the full analysis prompt for `ward`.
#[must_use]
pub fn build_prompt(ward: &Ward, role: UserRole) -> String {
    let trend = ward
        .trend
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ");
    let p = &ward.pollutants;

    format!(
        "{context}\n\
         Analyze the following pollution data for Ward: {name} (Lat: {lat}, Lng: {lng}).\n\
         Current AQI: {aqi}.\n\
         7-Day AQI Trend (Past to Present): [{trend}].\n\
         Main Source (Heuristic): {primary}.\n\
         Secondary Source (Heuristic): {secondary}.\n\
         Pollutants: PM2.5: {pm25}, PM10: {pm10}, NO2: {no2}, SO2: {so2}, CO: {co}, O3: {o3}.\n\
         \n\
         1. Provide 3 distinct, actionable recommendations.\n\
         2. Analyze the 7-day trend history. Compare current levels with the 7-day average. \
         Identify if pollution is increasing, decreasing, or fluctuating.\n\
         3. Provide a breakdown of probable pollution sources based on the ratio of pollutants. \
         Estimate the percentage contribution of each source (must sum to 100%) and assign a \
         confidence score.\n\
         4. Search for the latest news (within the last 7 days) about air pollution, smog \
         alerts, or government measures against pollution in {name} or its wider city/region. \
         Summarize 3 key news items.\n\
         \n\
         Return pure JSON adhering to this schema ONLY, do not include markdown formatting:\n\
         {RESPONSE_SCHEMA}",
        context = role_context(role),
        name = ward.name,
        lat = ward.location.lat,
        lng = ward.location.lng,
        aqi = ward.aqi,
        primary = ward.primary_source,
        secondary = ward.secondary_source,
        pm25 = p.pm25,
        pm10 = p.pm10,
        no2 = p.no2,
        so2 = p.so2,
        co = p.co,
        o3 = p.o3,
    )
}

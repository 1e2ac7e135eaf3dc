//! Prompt construction for the free-text advice provider.
//!
//! The provider itself is an opaque `generate(prompt) -> text` interface;
//! this module owns the four advisory prompt flavors and the timeline
//! prompt used during plan creation.

use serde::{Deserialize, Serialize};

use crate::domain::crop::Crop;
use crate::domain::farmer::FarmerInput;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum AdviceRequest {
    CropGuidance { soil_summary: String, weather_summary: String, budget: String },
    Financial { query: String, context: Option<String> },
    PestDisease { crop: String, symptoms: String, weather_conditions: String },
    Harvest { crop: String, weather_summary: String, market_summary: String },
}

pub fn build_prompt(request: &AdviceRequest) -> String {
    match request {
        AdviceRequest::CropGuidance { soil_summary, weather_summary, budget } => format!(
            "As an agricultural expert, analyze the following data and provide crop \
             recommendations:\n\nSoil Data: {soil_summary}\nWeather Forecast: \
             {weather_summary}\nBudget: {budget}\n\nPlease provide:\n1. Top 3 crop \
             recommendations with reasons\n2. Expected yield per acre\n3. Required investment \
             breakdown\n4. Risk assessment\n5. Best planting time\n6. Water requirements\n\n\
             Format your response in a clear, actionable way for farmers."
        ),
        AdviceRequest::Financial { query, context } => {
            let context = context.as_deref().unwrap_or("No specific financial data provided");
            format!(
                "You are a financial advisor specializing in agriculture. A farmer is asking: \
                 \"{query}\"\n\nFinancial Context: {context}\n\nPlease provide:\n1. Clear, \
                 simple explanation\n2. Practical steps to take\n3. Government schemes that \
                 might help\n4. Loan options if applicable\n5. Risk mitigation strategies\n\n\
                 Keep the language simple and farmer-friendly."
            )
        }
        AdviceRequest::PestDisease { crop, symptoms, weather_conditions } => format!(
            "As an agricultural expert, help with pest/disease management:\n\nCrop: {crop}\n\
             Symptoms: {symptoms}\nWeather Conditions: {weather_conditions}\n\nPlease \
             provide:\n1. Likely pest/disease identification\n2. Immediate treatment options\n\
             3. Prevention measures\n4. Cost-effective solutions\n5. When to contact an \
             agricultural officer\n\nFocus on organic and low-cost solutions first."
        ),
        AdviceRequest::Harvest { crop, weather_summary, market_summary } => format!(
            "Help a farmer decide when to harvest and sell:\n\nCrop: {crop}\nWeather Forecast: \
             {weather_summary}\nCurrent Market Prices: {market_summary}\n\nPlease advise:\n\
             1. Optimal harvesting time\n2. Market timing for selling\n3. Storage \
             recommendations if prices are low\n4. Price prediction for the next 2-4 weeks\n\
             5. Best marketplaces to sell\n\nConsider weather impact on crop quality and \
             market demand."
        ),
    }
}

/// Prompt used during plan creation to attach free-text cultivation advice.
pub fn timeline_prompt(crop: Crop, farmer: &FarmerInput) -> String {
    let soil = serde_json::to_string(&farmer.soil).unwrap_or_else(|_| "{}".to_owned());
    format!(
        "Create a detailed farming timeline for {crop} cultivation in {location}.\n\
         Consider the following factors:\n- Soil conditions: {soil}\n- Irrigation: \
         {irrigation}\n\nProvide a week-by-week timeline covering soil preparation, seed \
         selection and treatment, planting, fertilization, irrigation, pest monitoring, \
         harvest timing and post-harvest activities.",
        crop = crop.as_str(),
        location = farmer.location(),
        irrigation = farmer.irrigation().as_str(),
    )
}

#[cfg(test)]
mod tests {
    use super::{build_prompt, timeline_prompt, AdviceRequest};
    use crate::domain::crop::Crop;
    use crate::domain::farmer::FarmerInput;

    #[test]
    fn each_request_kind_produces_a_distinct_prompt() {
        let crop_guidance = build_prompt(&AdviceRequest::CropGuidance {
            soil_summary: "loamy, ph 6.8".to_owned(),
            weather_summary: "warm, light rain".to_owned(),
            budget: "₹45,000".to_owned(),
        });
        let financial = build_prompt(&AdviceRequest::Financial {
            query: "how do I finance a drip system".to_owned(),
            context: None,
        });

        assert!(crop_guidance.contains("Top 3 crop"));
        assert!(financial.contains("No specific financial data provided"));
        assert_ne!(crop_guidance, financial);
    }

    #[test]
    fn timeline_prompt_names_the_crop_and_location() {
        let farmer = FarmerInput { location: Some("Pune".to_owned()), ..FarmerInput::default() };
        let prompt = timeline_prompt(Crop::Rice, &farmer);

        assert!(prompt.contains("rice cultivation in Pune"));
        assert!(prompt.contains("rainfed"));
    }

    #[test]
    fn advice_request_deserializes_from_tagged_json() {
        let request: AdviceRequest = serde_json::from_str(
            r#"{"kind":"pest_disease","crop":"wheat","symptoms":"yellow leaves","weather_conditions":"humid"}"#,
        )
        .expect("valid request");
        assert!(matches!(request, AdviceRequest::PestDisease { .. }));
    }
}

use serde::{Deserialize, Serialize};

use crate::domain::crop::Crop;

/// Seed rows for the fixed per-crop cultivation timelines.
struct PhaseSeed {
    name: &'static str,
    activities: &'static [&'static str],
    duration: &'static str,
}

const WHEAT_PHASES: &[PhaseSeed] = &[
    PhaseSeed {
        name: "Soil Preparation",
        activities: &["Land plowing", "Soil testing", "pH adjustment"],
        duration: "1-2 weeks",
    },
    PhaseSeed {
        name: "Seed Preparation",
        activities: &["Seed selection", "Seed treatment", "Seed bed preparation"],
        duration: "1 week",
    },
    PhaseSeed {
        name: "Planting",
        activities: &["Sowing", "Seed covering", "Initial irrigation"],
        duration: "1-2 weeks",
    },
    PhaseSeed {
        name: "Growth Monitoring",
        activities: &["Germination check", "Weed control", "First fertilization"],
        duration: "2-3 weeks",
    },
    PhaseSeed {
        name: "Active Growth",
        activities: &["Regular irrigation", "Pest monitoring", "Second fertilization"],
        duration: "4-6 weeks",
    },
    PhaseSeed {
        name: "Pre-Harvest",
        activities: &["Final irrigation", "Disease check", "Harvest planning"],
        duration: "2-3 weeks",
    },
    PhaseSeed {
        name: "Harvesting",
        activities: &["Harvest", "Threshing", "Storage preparation"],
        duration: "1-2 weeks",
    },
    PhaseSeed {
        name: "Post-Harvest",
        activities: &["Storage", "Market preparation", "Record keeping"],
        duration: "2-4 weeks",
    },
];

const RICE_PHASES: &[PhaseSeed] = &[
    PhaseSeed {
        name: "Seedbed Preparation",
        activities: &["Nursery preparation", "Seed selection", "Seed treatment"],
        duration: "1 week",
    },
    PhaseSeed {
        name: "Nursery Management",
        activities: &["Seed sowing", "Water management", "Fertilizer application"],
        duration: "3-4 weeks",
    },
    PhaseSeed {
        name: "Field Preparation",
        activities: &["Land preparation", "Puddling", "Leveling"],
        duration: "1-2 weeks",
    },
    PhaseSeed {
        name: "Transplanting",
        activities: &["Seedling uprooting", "Transplanting", "Water management"],
        duration: "1 week",
    },
    PhaseSeed {
        name: "Early Growth",
        activities: &["Gap filling", "Weed control", "First fertilization"],
        duration: "2-3 weeks",
    },
    PhaseSeed {
        name: "Active Growth",
        activities: &["Tillage", "Fertilizer application", "Pest monitoring"],
        duration: "4-6 weeks",
    },
    PhaseSeed {
        name: "Pre-Harvest",
        activities: &["Water drainage", "Disease monitoring", "Harvest preparation"],
        duration: "2-3 weeks",
    },
    PhaseSeed {
        name: "Harvesting",
        activities: &["Harvest", "Threshing", "Drying"],
        duration: "1-2 weeks",
    },
];

/// A single named stage of a cultivation timeline.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhasePlan {
    pub name: String,
    pub activities: Vec<String>,
    pub duration: String,
}

impl From<&PhaseSeed> for PhasePlan {
    fn from(seed: &PhaseSeed) -> Self {
        Self {
            name: seed.name.to_owned(),
            activities: seed.activities.iter().map(|a| (*a).to_owned()).collect(),
            duration: seed.duration.to_owned(),
        }
    }
}

/// Ordered cultivation phases for one crop. Phases are traversed strictly in
/// order; only wheat and rice carry dedicated templates, every other crop
/// uses the wheat template.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Timeline {
    pub crop: Crop,
    pub phases: Vec<PhasePlan>,
}

impl Timeline {
    pub fn for_crop(crop: Crop) -> Self {
        let seeds = match crop {
            Crop::Rice => RICE_PHASES,
            _ => WHEAT_PHASES,
        };
        Self { crop, phases: seeds.iter().map(PhasePlan::from).collect() }
    }

    pub fn phase_index(&self, name: &str) -> Option<usize> {
        self.phases.iter().position(|phase| phase.name == name)
    }

    pub fn phase_named(&self, name: &str) -> Option<&PhasePlan> {
        self.phases.iter().find(|phase| phase.name == name)
    }

    pub fn last_phase(&self) -> Option<&PhasePlan> {
        self.phases.last()
    }
}

#[cfg(test)]
mod tests {
    use super::Timeline;
    use crate::domain::crop::Crop;

    #[test]
    fn wheat_and_rice_have_dedicated_eight_phase_templates() {
        let wheat = Timeline::for_crop(Crop::Wheat);
        let rice = Timeline::for_crop(Crop::Rice);

        assert_eq!(wheat.phases.len(), 8);
        assert_eq!(rice.phases.len(), 8);
        assert_eq!(wheat.phases[0].name, "Soil Preparation");
        assert_eq!(rice.phases[0].name, "Seedbed Preparation");
        assert_ne!(wheat.phases, rice.phases);
    }

    #[test]
    fn other_crops_fall_back_to_the_wheat_template() {
        let cotton = Timeline::for_crop(Crop::Cotton);
        assert_eq!(cotton.crop, Crop::Cotton);
        assert_eq!(cotton.phases, Timeline::for_crop(Crop::Wheat).phases);
    }

    #[test]
    fn phase_lookup_is_by_exact_name() {
        let timeline = Timeline::for_crop(Crop::Wheat);
        assert_eq!(timeline.phase_index("Planting"), Some(2));
        assert_eq!(timeline.phase_index("planting"), None);
        assert!(timeline.phase_named("Harvesting").is_some());
    }
}

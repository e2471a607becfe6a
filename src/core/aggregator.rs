use crate::domain::model::{Aggregate, CategoryGroup, Module, Totals};
use std::collections::BTreeMap;

pub const DEFAULT_BONUS_CATEGORY: &str = "Innovation";

/// Groups modules per category and computes the credit totals.
///
/// Categories are ordered alphabetically. Inside a category modules are
/// ordered by start week, ties keeping their input order. Modules of the
/// bonus category are kept out of the groups.
#[derive(Debug, Clone)]
pub struct Aggregator {
    bonus_category: String,
}

impl Default for Aggregator {
    fn default() -> Self {
        Self::new(DEFAULT_BONUS_CATEGORY)
    }
}

impl Aggregator {
    pub fn new(bonus_category: impl Into<String>) -> Self {
        Self {
            bonus_category: bonus_category.into(),
        }
    }

    pub fn is_bonus(&self, module: &Module) -> bool {
        module.category == self.bonus_category
    }

    pub fn aggregate(&self, modules: &[Module]) -> Aggregate {
        let mut by_category: BTreeMap<&str, Vec<Module>> = BTreeMap::new();
        let mut bonus_modules = Vec::new();
        let mut totals = Totals::default();

        for module in modules {
            totals.available += module.credits;
            if module.registered {
                totals.registered += module.credits;
            }

            if self.is_bonus(module) {
                if module.validated {
                    totals.bonus += module.credits;
                }
                bonus_modules.push(module.clone());
            } else {
                by_category
                    .entry(module.category.as_str())
                    .or_default()
                    .push(module.clone());
            }
        }

        let groups = by_category
            .into_iter()
            .map(|(category, mut modules)| {
                modules.sort_by_key(|module| module.start_week);
                CategoryGroup {
                    category: category.to_string(),
                    total_credits: modules.iter().map(|module| module.credits).sum(),
                    modules,
                }
            })
            .collect::<Vec<_>>();

        let bonus_available = bonus_modules.iter().map(|module| module.credits).sum();

        tracing::debug!(
            "Aggregated {} modules into {} categories ({} bonus modules)",
            modules.len(),
            groups.len(),
            bonus_modules.len()
        );

        Aggregate {
            groups,
            bonus_category: self.bonus_category.clone(),
            bonus_modules,
            bonus_available,
            totals,
        }
    }
}

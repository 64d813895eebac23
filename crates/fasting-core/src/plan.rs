//! Fasting plan catalog.
//!
//! The built-in plans are static. The `custom` slot is a placeholder that the
//! user's saved custom plan replaces when the catalog is listed.

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// Reserved id of the user-editable plan slot.
pub const CUSTOM_PLAN_ID: &str = "custom";

/// Longest name the custom-plan form accepts.
pub const MAX_PLAN_NAME_LEN: usize = 20;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FastingPlan {
    pub id: String,
    pub name: String,
    pub fasting_hours: u32,
    pub eating_hours: u32,
    pub description: String,
}

impl FastingPlan {
    fn builtin(id: &str, name: &str, fasting_hours: u32, eating_hours: u32, description: &str) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            fasting_hours,
            eating_hours,
            description: description.into(),
        }
    }

    /// Build a validated custom plan from form input.
    ///
    /// The engine trusts whatever plan it is given, so callers collecting
    /// user input go through here first.
    pub fn custom(name: &str, fasting_hours: u32, eating_hours: u32) -> Result<Self, ValidationError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(ValidationError::EmptyName);
        }
        let len = name.chars().count();
        if len > MAX_PLAN_NAME_LEN {
            return Err(ValidationError::NameTooLong {
                len,
                max: MAX_PLAN_NAME_LEN,
            });
        }
        if fasting_hours == 0 {
            return Err(ValidationError::ZeroFastingHours);
        }
        if fasting_hours.checked_add(eating_hours) != Some(24) {
            return Err(ValidationError::HoursNotFullDay {
                fasting: fasting_hours,
                eating: eating_hours,
            });
        }

        Ok(Self {
            id: CUSTOM_PLAN_ID.into(),
            name: name.into(),
            fasting_hours,
            eating_hours,
            description: format!("{fasting_hours} hours fasting, {eating_hours} hours eating window"),
        })
    }

    /// Fasting goal in minutes.
    pub fn goal_minutes(&self) -> i64 {
        i64::from(self.fasting_hours) * 60
    }

    pub fn is_custom(&self) -> bool {
        self.id == CUSTOM_PLAN_ID
    }
}

impl Default for FastingPlan {
    fn default() -> Self {
        default_plan()
    }
}

/// The static catalog, in display order.
pub fn builtin_plans() -> Vec<FastingPlan> {
    vec![
        FastingPlan::builtin("16-8", "16:8", 16, 8, "16 hours fasting, 8 hours eating window"),
        FastingPlan::builtin("18-6", "18:6", 18, 6, "18 hours fasting, 6 hours eating window"),
        FastingPlan::builtin(
            "20-4",
            "20:4",
            20,
            4,
            "20 hours fasting, 4 hours eating window (Warrior Diet)",
        ),
        // No eating window.
        FastingPlan::builtin("24-0", "24:0", 24, 0, "24 hour fast (OMAD)"),
        FastingPlan::builtin(
            CUSTOM_PLAN_ID,
            "Custom",
            16,
            8,
            "Create your own fasting schedule",
        ),
    ]
}

/// First catalog entry (16:8).
pub fn default_plan() -> FastingPlan {
    FastingPlan::builtin("16-8", "16:8", 16, 8, "16 hours fasting, 8 hours eating window")
}

/// Catalog with the `custom` placeholder swapped for the saved custom plan.
///
/// A saved plan whose id is not `custom` is ignored.
pub fn available_plans(custom: Option<&FastingPlan>) -> Vec<FastingPlan> {
    let mut plans = builtin_plans();
    if let Some(custom) = custom.filter(|p| p.is_custom()) {
        if let Some(slot) = plans.iter_mut().find(|p| p.is_custom()) {
            *slot = custom.clone();
        }
    }
    plans
}

pub fn find_plan<'a>(plans: &'a [FastingPlan], id: &str) -> Option<&'a FastingPlan> {
    plans.iter().find(|p| p.id == id)
}

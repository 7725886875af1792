//! Recipe catalog
//!
//! The catalog is compiled into the firmware and never changes at runtime.
//! Each recipe is an ordered list of mash rests; each rest ramps to a target
//! temperature and then holds it for a fixed number of minutes.

/// Number of recipes in the catalog (including the custom slot)
pub const NUM_RECIPES: usize = 5;

/// Maximum rests per recipe
pub const MAX_STEPS: usize = 5;

/// A single mash rest
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Step {
    /// Display name
    pub name: &'static str,
    /// Target temperature (°C)
    pub target_c: i16,
    /// Hold time once the target is reached (minutes)
    pub duration_min: u16,
}

/// A named sequence of rests
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Recipe {
    /// Display name
    pub name: &'static str,
    /// Ordered rests (at most [`MAX_STEPS`])
    pub steps: &'static [Step],
}

/// Catalog lookup failures
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum RecipeError {
    /// Recipe index outside the catalog
    InvalidRecipe(u8),
    /// Step index outside the recipe
    InvalidStep {
        /// Recipe index
        recipe: u8,
        /// Offending step index
        step: u8,
    },
}

const fn step(name: &'static str, target_c: i16, duration_min: u16) -> Step {
    Step {
        name,
        target_c,
        duration_min,
    }
}

/// The recipe catalog
pub static RECIPES: [Recipe; NUM_RECIPES] = [
    Recipe {
        name: "American Pale Ale",
        steps: &[step("Curva 1", 67, 1), step("Curva 2", 76, 1)],
    },
    Recipe {
        name: "Witbier",
        steps: &[
            step("Curva 1", 50, 15),
            step("Curva 2", 68, 60),
            step("Curva 3", 76, 10),
        ],
    },
    Recipe {
        name: "Belgian Dubbel",
        steps: &[
            step("Curva 1", 52, 15),
            step("Curva 2", 64, 45),
            step("Curva 3", 72, 15),
            step("Curva 4", 76, 10),
        ],
    },
    Recipe {
        name: "Bohemian Pilsen",
        steps: &[
            step("Curva 1", 45, 15),
            step("Curva 2", 52, 15),
            step("Curva 3", 63, 45),
            step("Curva 4", 72, 15),
            step("Curva 5", 76, 10),
        ],
    },
    // Custom slot, no rests defined yet
    Recipe {
        name: "Custom",
        steps: &[],
    },
];

impl Recipe {
    /// Number of rests
    pub fn num_steps(&self) -> usize {
        self.steps.len()
    }

    /// Check if the recipe has no rests
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Get a rest by index
    pub fn step(&self, index: usize) -> Option<&'static Step> {
        self.steps.get(index)
    }
}

/// Look up a recipe by catalog index
pub fn recipe(index: usize) -> Option<&'static Recipe> {
    RECIPES.get(index)
}

/// Resolve a (recipe, step) pair against the catalog
pub fn lookup(recipe_index: u8, step_index: u8) -> Result<(&'static Recipe, &'static Step), RecipeError> {
    let recipe = recipe(recipe_index as usize).ok_or(RecipeError::InvalidRecipe(recipe_index))?;
    let step = recipe.step(step_index as usize).ok_or(RecipeError::InvalidStep {
        recipe: recipe_index,
        step: step_index,
    })?;
    Ok((recipe, step))
}

//! Reference information attached to detected dishes.
//!
//! Keys are the class names emitted by the dish detector.

use serde::Serialize;

/// Descriptive metadata for a known dish.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DishInfo {
    pub origin: &'static str,
    pub description: &'static str,
    pub estimated_calories: &'static str,
}

const CATALOG: &[(&str, DishInfo)] = &[
    (
        "Burger",
        DishInfo {
            origin: "United States/Germany (disputed)",
            description: "A sandwich consisting of a cooked patty of ground meat, usually beef, \
                          placed inside a sliced bun.",
            estimated_calories: "300-600 kcal",
        },
    ),
    (
        "Pizza",
        DishInfo {
            origin: "Italy (Naples)",
            description: "A savory dish of Italian origin consisting of a usually round, \
                          flattened base of leavened wheat-based dough topped with tomatoes, \
                          cheese, and various other ingredients, baked at a high temperature.",
            estimated_calories: "250-400 kcal per slice",
        },
    ),
    (
        "Donut",
        DishInfo {
            origin: "Netherlands/United States",
            description: "A small fried cake of sweetened dough, typically in the form of a \
                          ring or disk.",
            estimated_calories: "200-450 kcal",
        },
    ),
    (
        "Hotdog",
        DishInfo {
            origin: "Germany/United States",
            description: "A grilled or steamed sausage sandwich where the sausage is served in \
                          the slit of a partially sliced bun.",
            estimated_calories: "250-500 kcal",
        },
    ),
    (
        "FriedChicken",
        DishInfo {
            origin: "Scotland/Southern United States",
            description: "Dish consisting of chicken pieces that have been coated in a seasoned \
                          flour or batter and fried.",
            estimated_calories: "300-600 kcal per serving",
        },
    ),
];

/// Look up a dish by detector class name (exact match).
pub fn lookup(class_name: &str) -> Option<&'static DishInfo> {
    CATALOG
        .iter()
        .find(|(name, _)| *name == class_name)
        .map(|(_, info)| info)
}

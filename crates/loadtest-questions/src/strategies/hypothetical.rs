//! Counterfactual scenarios.

use loadtest_core::RandomSource;

const OBJECTS: &[&str] = &["cars", "trees", "buildings", "phones", "books", "computers"];
const PROPERTIES: &[&str] = &["invisible", "magnetic", "telepathic", "indestructible", "sentient"];
const SCALES: &[u64] = &[10, 50, 100, 1000, 10000];

pub fn questions(rng: &mut RandomSource) -> Vec<String> {
    let object = OBJECTS[rng.int_range(OBJECTS.len())];
    let property = PROPERTIES[rng.int_range(PROPERTIES.len())];
    let scale = SCALES[rng.int_range(SCALES.len())];
    let percent = rng.range_inclusive(10, 90);

    vec![
        format!("What would happen if all {object} suddenly became {property}?"),
        format!("How would society change if {percent}% of people could read minds?"),
        format!("Design a city that could accommodate {scale} million people in 1 square km."),
        format!("What if gravity was {percent}% stronger?"),
        "How would communication work if sound didn't exist?".to_string(),
        format!("What if {object} could only last for 24 hours before disappearing?"),
        format!("Describe an economy where {object} are the primary currency."),
        "What safety measures would we need if everyone could fly?".to_string(),
    ]
}

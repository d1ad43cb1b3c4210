//! Place-based prompts.

use loadtest_core::RandomSource;

const CITIES: &[&str] = &[
    "Tokyo",
    "Delhi",
    "Shanghai",
    "São Paulo",
    "Mexico City",
    "Cairo",
    "Mumbai",
    "Beijing",
    "Dhaka",
    "Osaka",
    "Karachi",
    "Istanbul",
    "Buenos Aires",
    "Kolkata",
    "Lagos",
    "Manila",
    "Tianjin",
    "Rio",
];

const COUNTRIES: &[&str] = &[
    "Brazil",
    "Russia",
    "India",
    "China",
    "South Africa",
    "Mexico",
    "Indonesia",
    "Turkey",
    "Saudi Arabia",
    "Argentina",
    "Egypt",
    "Nigeria",
    "Japan",
    "Germany",
    "France",
    "Italy",
    "Canada",
];

pub fn questions(rng: &mut RandomSource) -> Vec<String> {
    let city = CITIES[rng.int_range(CITIES.len())];
    let country = COUNTRIES[rng.int_range(COUNTRIES.len())];
    let distance = rng.range_inclusive(500, 5000);

    vec![
        format!("What is the population of {city}?"),
        format!("What are the neighboring countries of {country}?"),
        format!("What is the main river flowing through or near {city}?"),
        format!("If you travel {distance}km east from {city}, where might you be?"),
        format!("What is the climate type in {country}?"),
        format!("What are the major exports of {country}?"),
        format!("What language is primarily spoken in {city}?"),
        format!("What is the time zone of {city}?"),
    ]
}

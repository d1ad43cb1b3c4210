//! Questions anchored on a random year.

use loadtest_core::RandomSource;

const FIRST_YEAR: u64 = 1000;
const LAST_YEAR: u64 = 2023;

pub fn questions(rng: &mut RandomSource) -> Vec<String> {
    let year = rng.range_inclusive(FIRST_YEAR, LAST_YEAR);

    vec![
        format!("What major events occurred in the year {year}?"),
        format!("Who were the influential leaders during {year}?"),
        format!("What was the state of technology in {year}?"),
        format!("Describe the political climate of {year}."),
        format!("What were the major conflicts or peace treaties around {year}?"),
        format!("How did people communicate in {year}?"),
        format!("What was daily life like for common people in {year}?"),
        format!("What scientific discoveries were made around {year}?"),
    ]
}

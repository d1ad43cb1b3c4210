//! Arithmetic and number theory prompts.

use loadtest_core::RandomSource;

pub fn questions(rng: &mut RandomSource) -> Vec<String> {
    let a = rng.range_inclusive(100, 9999);
    let b = rng.range_inclusive(100, 9999);
    let c = rng.range_inclusive(2, 50);

    let power = c % 5 + 2;
    let base = c % 7 + 2;

    vec![
        format!("What is {a} multiplied by {b}?"),
        format!("If you divide the previous result by {c}, what do you get?"),
        format!("What are the prime factors of {a}?"),
        format!("Is {b} a perfect square? If not, what's the nearest one?"),
        format!("Calculate {a} to the power of {power}."),
        format!("What is the greatest common divisor of {a} and {b}?"),
        format!("Convert {a} to base-{base} notation."),
        format!("How many ways can you partition {c} into positive integers?"),
    ]
}

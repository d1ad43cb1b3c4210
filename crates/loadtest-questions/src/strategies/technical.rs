//! Software engineering prompts.

use loadtest_core::RandomSource;
use sha2::{Digest, Sha256};

/// Length of the short-code fragment embedded in the URL shortener prompt.
const HASH_FRAGMENT_LEN: usize = 8;

pub fn questions(rng: &mut RandomSource) -> Vec<String> {
    let size = rng.range_inclusive(10, 1000);
    let port = rng.range_inclusive(3000, 9999);
    let code = hash_fragment(rng.next_u64());

    vec![
        format!("What's the best sorting algorithm for {size} nearly-sorted integers?"),
        format!("How would you design a cache for {size} frequently accessed items?"),
        format!("Explain the trade-offs of using a hash table with {size} buckets."),
        format!("What happens when you try to connect to port {port}?"),
        format!("Design a URL shortener that generates codes like '{code}'."),
        format!("How would you find duplicates in an array of {size} elements?"),
        format!("What's the space complexity of storing {size} items in a binary tree?"),
        format!("How would you implement rate limiting for {size} requests per second?"),
    ]
}

fn hash_fragment(value: u64) -> String {
    let digest = Sha256::digest(value.to_string().as_bytes());
    let mut encoded = hex::encode(digest);
    encoded.truncate(HASH_FRAGMENT_LEN);
    encoded
}

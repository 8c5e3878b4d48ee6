//! Token estimation.
//!
//! Recommendation cost uses a fixed characters-per-token ratio so it stays a pure
//! function of text length. Destination sizes measured in tokens use the cl100k
//! BPE, falling back to the ratio if the encoder cannot be built.

use std::sync::OnceLock;
use tiktoken_rs::{CoreBPE, cl100k_base};

pub const DEFAULT_CHARS_PER_TOKEN: usize = 4;

/// `ceil(chars / chars_per_token)`.
pub fn estimate_by_ratio(text: &str, chars_per_token: usize) -> usize {
    let ratio = chars_per_token.max(1);
    text.chars().count().div_ceil(ratio)
}

fn encoder() -> Option<&'static CoreBPE> {
    static BPE: OnceLock<Option<CoreBPE>> = OnceLock::new();
    BPE.get_or_init(|| cl100k_base().ok()).as_ref()
}

pub fn count_tokens(text: &str) -> usize {
    match encoder() {
        Some(bpe) => bpe.encode_with_special_tokens(text).len(),
        None => estimate_by_ratio(text, DEFAULT_CHARS_PER_TOKEN),
    }
}

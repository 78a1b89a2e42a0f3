//! Reading time estimation

use super::ContentSection;

/// Average reading speed used when none is configured
pub const DEFAULT_WORDS_PER_MINUTE: usize = 200;

/// Count whitespace-delimited tokens
pub fn count_words(text: &str) -> usize {
    text.split_whitespace().count()
}

/// Words in every section heading plus every body block
pub fn total_words(sections: &[ContentSection]) -> usize {
    sections
        .iter()
        .map(|section| {
            let body: usize = section
                .body
                .blocks()
                .iter()
                .map(|block| count_words(&block.text))
                .sum();
            count_words(&section.heading) + body
        })
        .sum()
}

/// Estimated reading time in whole minutes, rounded up
pub fn read_time(total_words: usize, words_per_minute: usize) -> usize {
    total_words.div_ceil(words_per_minute.max(1))
}

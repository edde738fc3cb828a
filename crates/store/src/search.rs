//! Catalog search ranking
//!
//! Candidates are the in-stock items of one category.
//!
//! Without keywords the order is
//! `(feedback score desc, price asc, item id asc)`.
//!
//! With keywords every candidate gets a match score: the number of query
//! keywords equal (case-insensitively) to one of its keywords or to a token of
//! its name. Items scoring 0 are dropped, the rest are ordered by
//! `(match desc, feedback score desc, price asc, item id asc)`.

use std::cmp::Reverse;
use std::collections::HashSet;

use bazaar_core::{Category, Item, MAX_KEYWORD_CHARS, MAX_KEYWORDS, MarketError, MarketResult};

/// Lowercased alphanumeric runs of an item name
pub fn name_tokens(name: &str) -> Vec<String> {
    name.split(|c: char| !c.is_alphanumeric())
        .filter(|token| !token.is_empty())
        .map(str::to_lowercase)
        .collect()
}

/// Lowercase query keywords, drop blanks, and enforce the keyword limits
pub fn normalize_query(keywords: &[String]) -> MarketResult<Vec<String>> {
    let query: Vec<String> = keywords
        .iter()
        .map(|k| k.trim().to_lowercase())
        .filter(|k| !k.is_empty())
        .collect();

    if query.len() > MAX_KEYWORDS {
        return Err(MarketError::Validation(format!(
            "keywords must have at most {} entries",
            MAX_KEYWORDS
        )));
    }
    if query.iter().any(|k| k.chars().count() > MAX_KEYWORD_CHARS) {
        return Err(MarketError::Validation(format!(
            "each keyword must be <= {} characters",
            MAX_KEYWORD_CHARS
        )));
    }
    Ok(query)
}

/// Number of query keywords hitting the item's keywords or name tokens.
/// `query` must already be normalized.
pub fn match_score(item: &Item, query: &[String]) -> usize {
    let mut vocabulary: HashSet<String> = item.keywords.iter().map(|k| k.to_lowercase()).collect();
    vocabulary.extend(name_tokens(&item.name));
    query.iter().filter(|k| vocabulary.contains(*k)).count()
}

/// Rank `items` for a search in `category` with a normalized `query`
pub fn rank<'a, I>(items: I, category: Category, query: &[String]) -> Vec<Item>
where
    I: IntoIterator<Item = &'a Item>,
{
    let candidates = items
        .into_iter()
        .filter(|item| item.category == category && item.in_stock());

    if query.is_empty() {
        let mut ranked: Vec<&Item> = candidates.collect();
        ranked.sort_by_key(|item| (Reverse(item.feedback.score()), item.price, item.item_id));
        return ranked.into_iter().cloned().collect();
    }

    let mut scored: Vec<(usize, &Item)> = candidates
        .map(|item| (match_score(item, query), item))
        .filter(|(score, _)| *score > 0)
        .collect();
    scored.sort_by_key(|(score, item)| {
        (
            Reverse(*score),
            Reverse(item.feedback.score()),
            item.price,
            item.item_id,
        )
    });
    scored.into_iter().map(|(_, item)| item.clone()).collect()
}

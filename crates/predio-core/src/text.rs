//! Text normalization helpers shared by extraction and inventory loading.
//!
//! Queries and inventory fields are matched in a folded form (lower-case,
//! accents stripped) so that "Chapinero", "chapinero" and "CHAPINERO" or
//! "balcón" and "balcon" compare equal.

/// Lower-case the input and strip the Spanish diacritics that show up in
/// queries and listing data.
pub fn fold(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        for lc in c.to_lowercase() {
            out.push(match lc {
                'á' | 'à' | 'ä' | 'â' => 'a',
                'é' | 'è' | 'ë' | 'ê' => 'e',
                'í' | 'ì' | 'ï' | 'î' => 'i',
                'ó' | 'ò' | 'ö' | 'ô' => 'o',
                'ú' | 'ù' | 'ü' | 'û' => 'u',
                'ñ' => 'n',
                other => other,
            });
        }
    }
    out
}

/// Collapse runs of whitespace into single spaces and trim the ends.
pub fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Rough token count for budget tracking: one token per four characters,
/// rounded up. Good enough for window accounting; never used for billing.
pub fn estimate_tokens(text: &str) -> usize {
    text.chars().count().div_ceil(4)
}

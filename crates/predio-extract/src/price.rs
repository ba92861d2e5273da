//! Price recognizer: two-sided ranges, directional bounds, bare amounts.
//!
//! Cue precedence: "entre X y Y" ranges first, then directional cues
//! ("hasta", "mas de", ...) in textual order, then bare amounts. The first
//! valid bound of each kind wins; a later bound that would break
//! `price_min <= price_max` is dropped. Bare amounts without a direction cue
//! are read as an upper bound, the dominant usage in listing queries.

use std::sync::LazyLock;

use regex::Regex;

use predio_core::config::{ExtractionConfig, PriceUnitPolicy};

use crate::lexicon::UNIT_NOUNS;

const AMOUNT: &str = r"(\d[\d.,]*)";
const MULTIPLIER: &str = r"(?:\s*(millones|millon|mil)\b)?";
const PESOS: &str = r"(?:\s+(?:de\s+)?pesos\b)?";

static RANGE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(
        r"\bentre\s+{AMOUNT}{MULTIPLIER}\s+y\s+{AMOUNT}{MULTIPLIER}{PESOS}"
    ))
    .expect("Invalid price range regex")
});

static UPPER_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(
        r"\b(?:por\s+debajo\s+de|menos\s+de|bajo|hasta|maximo)\s+{AMOUNT}{MULTIPLIER}{PESOS}"
    ))
    .expect("Invalid upper bound regex")
});

static LOWER_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(
        r"\b(?:por\s+encima\s+de|arriba\s+de|mas\s+de|desde|minimo)\s+{AMOUNT}{MULTIPLIER}{PESOS}"
    ))
    .expect("Invalid lower bound regex")
});

// Bare amount carrying an explicit multiplier, e.g. "450 millones".
static BARE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(
        r"{AMOUNT}\s*(millones|millon|mil)\b{PESOS}"
    ))
    .expect("Invalid bare amount regex")
});

// Bare amount next to a currency cue, e.g. "$450" or "450 pesos".
static CURRENCY_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(
        r"(?:\$\s*{AMOUNT}|{AMOUNT}\s*(?:de\s+)?(?:pesos|cop)\b)"
    ))
    .expect("Invalid currency amount regex")
});

/// Extract price bounds from folded query text.
///
/// Byte ranges of every recognized price phrase are appended to `spans` so
/// the extractor can strip them from the free-text remainder.
pub fn extract_price(
    folded: &str,
    config: &ExtractionConfig,
    spans: &mut Vec<(usize, usize)>,
) -> (Option<u64>, Option<u64>) {
    let mut min: Option<u64> = None;
    let mut max: Option<u64> = None;
    let mut taken: Vec<(usize, usize)> = Vec::new();

    // Two-sided ranges win over everything else.
    for caps in RANGE_RE.captures_iter(folded) {
        let whole = caps.get(0).map(|m| (m.start(), m.end()));
        let Some((start, end)) = whole else { continue };
        let mult_lo = caps.get(2).map(|m| m.as_str());
        let mult_hi = caps.get(4).map(|m| m.as_str());
        // Without any multiplier this can be a room or area range
        // ("entre 2 y 3 habitaciones"), so leave it to those recognizers.
        if mult_lo.is_none() && mult_hi.is_none() && followed_by_unit_noun(folded, end) {
            continue;
        }
        let lo = caps
            .get(1)
            .and_then(|m| parse_amount(m.as_str()))
            .and_then(|v| scale(v, mult_lo.or(mult_hi), config));
        let hi = caps
            .get(3)
            .and_then(|m| parse_amount(m.as_str()))
            .and_then(|v| scale(v, mult_hi.or(mult_lo), config));
        // The phrase is price talk whether or not its bounds survive the
        // ordering rules; either way it leaves the free-text remainder.
        taken.push((start, end));
        if let Some(v) = lo {
            propose_min(&mut min, &max, v);
        }
        if let Some(v) = hi {
            propose_max(&mut max, &min, v);
        }
    }

    // Directional cues, processed in textual order across both kinds.
    let mut cues: Vec<(usize, usize, bool, Option<u64>)> = Vec::new();
    collect_cues(folded, &UPPER_RE, true, config, &taken, &mut cues);
    collect_cues(folded, &LOWER_RE, false, config, &taken, &mut cues);
    cues.sort_by_key(|&(start, _, _, _)| start);
    for (start, end, is_upper, value) in cues {
        taken.push((start, end));
        let Some(v) = value else { continue };
        if is_upper {
            propose_max(&mut max, &min, v);
        } else {
            propose_min(&mut min, &max, v);
        }
    }

    // Bare amounts, read as an upper bound, only where no cue consumed them.
    for caps in BARE_RE.captures_iter(folded) {
        let Some(m) = caps.get(0) else { continue };
        if overlaps(&taken, m.start(), m.end()) {
            continue;
        }
        let value = caps
            .get(1)
            .and_then(|a| parse_amount(a.as_str()))
            .and_then(|v| scale(v, caps.get(2).map(|g| g.as_str()), config));
        taken.push((m.start(), m.end()));
        if let Some(v) = value {
            propose_max(&mut max, &min, v);
        }
    }
    for caps in CURRENCY_RE.captures_iter(folded) {
        let Some(m) = caps.get(0) else { continue };
        if overlaps(&taken, m.start(), m.end()) {
            continue;
        }
        let amount = caps.get(1).or_else(|| caps.get(2));
        let value = amount
            .and_then(|a| parse_amount(a.as_str()))
            .and_then(|v| scale(v, None, config));
        taken.push((m.start(), m.end()));
        if let Some(v) = value {
            propose_max(&mut max, &min, v);
        }
    }

    spans.extend(taken);
    (min, max)
}

fn collect_cues(
    folded: &str,
    re: &Regex,
    is_upper: bool,
    config: &ExtractionConfig,
    taken: &[(usize, usize)],
    out: &mut Vec<(usize, usize, bool, Option<u64>)>,
) {
    for caps in re.captures_iter(folded) {
        let Some(m) = caps.get(0) else { continue };
        if overlaps(taken, m.start(), m.end()) {
            continue;
        }
        let multiplier = caps.get(2).map(|g| g.as_str());
        // "mas de 2 habitaciones" is a room count, not a price.
        if multiplier.is_none() && followed_by_unit_noun(folded, m.end()) {
            continue;
        }
        let value = caps
            .get(1)
            .and_then(|a| parse_amount(a.as_str()))
            .and_then(|v| scale(v, multiplier, config));
        out.push((m.start(), m.end(), is_upper, value));
    }
}

/// Parse a numeral, stripping "." and "," thousand separators.
fn parse_amount(raw: &str) -> Option<u64> {
    raw.replace(['.', ','], "").parse().ok()
}

/// Apply an explicit multiplier, or the configured unit-inference policy
/// when the numeral carries none.
fn scale(amount: u64, multiplier: Option<&str>, config: &ExtractionConfig) -> Option<u64> {
    match multiplier {
        Some("millones") | Some("millon") => amount.checked_mul(1_000_000),
        Some("mil") => amount.checked_mul(1_000),
        Some(_) => None,
        None => match config.price_unit_policy {
            PriceUnitPolicy::AssumeMillions if amount < config.literal_threshold => {
                amount.checked_mul(1_000_000)
            }
            _ => Some(amount),
        },
    }
}

fn propose_min(min: &mut Option<u64>, max: &Option<u64>, value: u64) -> bool {
    if min.is_some() || max.is_some_and(|mx| value > mx) {
        return false;
    }
    *min = Some(value);
    true
}

fn propose_max(max: &mut Option<u64>, min: &Option<u64>, value: u64) -> bool {
    if max.is_some() || min.is_some_and(|mn| value < mn) {
        return false;
    }
    *max = Some(value);
    true
}

fn overlaps(spans: &[(usize, usize)], start: usize, end: usize) -> bool {
    spans.iter().any(|&(s, e)| start < e && s < end)
}

/// True when the text right after `end` starts with a room or measure noun.
fn followed_by_unit_noun(folded: &str, end: usize) -> bool {
    let rest = folded[end..].trim_start();
    UNIT_NOUNS.iter().any(|noun| {
        rest.starts_with(noun)
            && rest[noun.len()..]
                .chars()
                .next()
                .is_none_or(|c| !c.is_alphanumeric())
    })
}

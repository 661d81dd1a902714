//! Генератор названий: материки, моря, реки, поселения и государства.
//!
//! Названия собираются из слогов, все случайные числа берутся из общего генератора,
//! поэтому один и тот же сид всегда даёт одни и те же имена.

use rand::Rng;
use rand::seq::SliceRandom;

const ONSETS: &[&str] = &[
    "b", "br", "d", "dr", "g", "gr", "k", "kr", "l", "m", "n", "r", "s", "st", "t", "th", "v",
    "z", "h", "f",
];
const VOWELS: &[&str] = &["a", "e", "i", "o", "u", "ae", "ai", "ia", "ou"];
const CODAS: &[&str] = &["", "", "", "n", "r", "l", "s", "th", "m", "nd", "rk"];

const LAND_SUFFIXES: &[&str] = &["ia", "and", "or", "ea", "heim"];
const SEA_KINDS: &[&str] = &["Sea", "Ocean", "Gulf", "Waters", "Deep"];
const RIVER_KINDS: &[&str] = &["river", "stream", "run", "flow"];
const CITY_SUFFIXES: &[&str] = &["", "ton", "burg", "ford", "hold", "mouth", "vale"];
const STATE_KINDS: &[&str] = &["Kingdom", "Empire", "Republic", "Duchy", "Union"];

fn pick<'a, R: Rng>(rng: &mut R, items: &[&'a str]) -> &'a str {
    items.choose(rng).copied().unwrap_or_default()
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Слово из `min..=max` слогов с заглавной буквы
fn word<R: Rng>(rng: &mut R, min: usize, max: usize) -> String {
    let count = rng.gen_range(min..=max);
    let mut result = String::new();
    for i in 0..count {
        result.push_str(pick(rng, ONSETS));
        result.push_str(pick(rng, VOWELS));
        if i + 1 == count {
            result.push_str(pick(rng, CODAS));
        }
    }
    capitalize(&result)
}

pub fn land_name<R: Rng>(rng: &mut R) -> String {
    let base = word(rng, 1, 2);
    format!("{base}{}", pick(rng, LAND_SUFFIXES))
}

pub fn sea_name<R: Rng>(rng: &mut R) -> String {
    let base = word(rng, 1, 3);
    format!("{base} {}", pick(rng, SEA_KINDS))
}

pub fn river_name<R: Rng>(rng: &mut R) -> String {
    let base = word(rng, 1, 2);
    format!("{base}{}", pick(rng, RIVER_KINDS))
}

pub fn city_name<R: Rng>(rng: &mut R) -> String {
    let base = word(rng, 1, 3);
    format!("{base}{}", pick(rng, CITY_SUFFIXES))
}

pub fn state_name<R: Rng>(rng: &mut R) -> String {
    let base = word(rng, 2, 3);
    format!("{} of {base}", pick(rng, STATE_KINDS))
}

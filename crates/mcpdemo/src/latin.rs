//! The "ancient Latin" text mangler.
//!
//! Known English words are swapped for Latin ones, long words may pick up a
//! `-us`/`-um` ending, and long results may gain a famous Latin phrase. All
//! randomness comes from a [`RandomSource`] so the transform can be replayed
//! in tests.

use std::collections::VecDeque;
use std::sync::Mutex;

use mcpdemo_core::{McpError, McpResult};

/// Characters stripped from both ends of a word before table lookup.
const STRIP_CHARS: &[char] = &['.', ',', ';', ':', '!', '?'];

/// English to Latin substitutions, matched against the lower-cased word.
/// "I" has no entry, so the pronoun passes through unchanged.
const SUBSTITUTIONS: &[(&str, &str)] = &[
    ("the", "thy"),
    ("and", "et"),
    ("of", "de"),
    ("to", "ad"),
    ("in", "in"),
    ("is", "est"),
    ("for", "pro"),
    ("with", "cum"),
    ("you", "tu"),
    ("we", "nos"),
    ("they", "illi"),
    ("this", "hic"),
    ("that", "ille"),
    ("have", "habeo"),
    ("be", "esse"),
    ("will", "voluntas"),
];

/// Phrases that may be dropped into a long result.
pub const LATIN_PHRASES: &[&str] = &[
    "Veni, vidi, vici.",
    "Alea iacta est.",
    "Carpe diem.",
    "Et tu, Brute?",
    "Cogito, ergo sum.",
];

const SUFFIX_PROBABILITY: f64 = 0.3;
const US_PROBABILITY: f64 = 0.5;
const PHRASE_PROBABILITY: f64 = 0.5;
/// Results longer than this (in chars) are candidates for a phrase.
const PHRASE_MIN_LEN: usize = 50;
/// Words longer than this (in chars) are candidates for a suffix.
const SUFFIX_MIN_LEN: usize = 4;

/// Source of randomness for the mangler.
pub trait RandomSource {
    /// Returns a float uniformly drawn from `[0, 1)`.
    fn next_f64(&mut self) -> f64;

    /// Returns an index uniformly drawn from `[0, n)`. `n` is never zero.
    fn below(&mut self, n: usize) -> usize;
}

impl RandomSource for fastrand::Rng {
    fn next_f64(&mut self) -> f64 {
        self.f64()
    }

    fn below(&mut self, n: usize) -> usize {
        self.usize(..n)
    }
}

/// A replayable stream of draws.
///
/// Floats and indices are queued separately. When a queue runs dry the
/// source keeps returning `1.0` (never taken) and `0` respectively, so a
/// short script means "no more random effects".
#[derive(Debug, Clone, Default)]
pub struct ScriptedRandom {
    floats: VecDeque<f64>,
    indices: VecDeque<usize>,
}

impl ScriptedRandom {
    /// Creates a source replaying `floats` then `indices`.
    #[must_use]
    pub fn new(floats: impl IntoIterator<Item = f64>, indices: impl IntoIterator<Item = usize>) -> Self {
        Self {
            floats: floats.into_iter().collect(),
            indices: indices.into_iter().collect(),
        }
    }

    /// A source under which every random effect is skipped.
    #[must_use]
    pub fn never() -> Self {
        Self::default()
    }
}

impl RandomSource for ScriptedRandom {
    fn next_f64(&mut self) -> f64 {
        self.floats.pop_front().unwrap_or(1.0)
    }

    fn below(&mut self, n: usize) -> usize {
        self.indices.pop_front().map_or(0, |i| i.min(n - 1))
    }
}

/// Mangles `text` into mock Latin.
///
/// Empty or whitespace-only input yields an empty string.
pub fn ancient_latin_text<R: RandomSource + ?Sized>(text: &str, rng: &mut R) -> String {
    let mut words: Vec<String> = text.split_whitespace().map(substitute).collect();

    for word in &mut words {
        // The ending check comes after the draw, so punctuated words still
        // consume one.
        if word.chars().count() > SUFFIX_MIN_LEN
            && rng.next_f64() < SUFFIX_PROBABILITY
            && word.chars().last().is_some_and(char::is_alphanumeric)
        {
            let suffix = if rng.next_f64() < US_PROBABILITY { "us" } else { "um" };
            word.push_str(suffix);
        }
    }

    let result = words.join(" ");
    if result.chars().count() > PHRASE_MIN_LEN && rng.next_f64() < PHRASE_PROBABILITY {
        let phrase = LATIN_PHRASES[rng.below(LATIN_PHRASES.len())];
        let at = rng.below(words.len());
        words.insert(at, phrase.to_string());
        return words.join(" ");
    }
    result
}

/// Applies the substitution table to one whitespace-delimited word.
fn substitute(word: &str) -> String {
    let lowered = word.to_lowercase();
    let clean = lowered.trim_matches(STRIP_CHARS);
    let Some((_, latin)) = SUBSTITUTIONS.iter().find(|(english, _)| *english == clean) else {
        return word.to_string();
    };

    let mut out = if word.chars().next().is_some_and(char::is_uppercase) {
        capitalize(latin)
    } else {
        (*latin).to_string()
    };
    if let Some(last) = word.chars().last().filter(|c| !c.is_alphanumeric()) {
        out.push(last);
    }
    out
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// The mangler with its random source, shared by the tool and the resource.
pub struct Mangler {
    rng: Mutex<Box<dyn RandomSource + Send>>,
}

impl Mangler {
    /// Creates a mangler drawing from `rng`.
    pub fn new<R: RandomSource + Send + 'static>(rng: R) -> Self {
        Self {
            rng: Mutex::new(Box::new(rng)),
        }
    }

    /// Creates a mangler seeded from the OS.
    #[must_use]
    pub fn from_entropy() -> Self {
        Self::new(fastrand::Rng::new())
    }

    /// Mangles `text`.
    ///
    /// # Errors
    ///
    /// Fails only if an earlier caller panicked while holding the source.
    pub fn transform(&self, text: &str) -> McpResult<String> {
        let mut rng = self
            .rng
            .lock()
            .map_err(|_| McpError::internal_error("random source lock poisoned"))?;
        Ok(ancient_latin_text(text, &mut **rng))
    }
}

impl std::fmt::Debug for Mangler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Mangler").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mangle(text: &str) -> String {
        ancient_latin_text(text, &mut ScriptedRandom::never())
    }

    #[test]
    fn empty_input_yields_empty_output() {
        assert_eq!(mangle(""), "");
        assert_eq!(mangle("   \t\n "), "");
    }

    #[test]
    fn substitutions_always_apply() {
        assert_eq!(mangle("the cat"), "thy cat");
        assert_eq!(mangle("you and we"), "tu et nos");
        assert_eq!(mangle("We will be"), "Nos voluntas esse");
    }

    #[test]
    fn substitution_keeps_capital_and_trailing_punctuation() {
        assert_eq!(mangle("The end."), "Thy end.");
        assert_eq!(mangle("this, that!"), "hic, ille!");
        assert_eq!(mangle("You?"), "Tu?");
    }

    #[test]
    fn first_person_pronoun_is_left_alone() {
        assert_eq!(mangle("I am here"), "I am here");
        assert_eq!(mangle("i, too"), "i, too");
    }

    #[test]
    fn unknown_words_pass_through() {
        assert_eq!(mangle("Rome wasn't built"), "Rome wasn't built");
    }

    #[test]
    fn suffixes_follow_the_draws() {
        // "hello" draws: take suffix, pick "us". "world" draws: take, pick "um".
        let mut rng = ScriptedRandom::new([0.1, 0.2, 0.1, 0.9], []);
        assert_eq!(ancient_latin_text("hello world", &mut rng), "hellous worldum");
    }

    #[test]
    fn short_words_do_not_draw() {
        // Only "lorem" is long enough to consume draws.
        let mut rng = ScriptedRandom::new([0.0, 0.0], []);
        assert_eq!(ancient_latin_text("a bb lorem", &mut rng), "a bb loremus");
    }

    #[test]
    fn punctuated_words_skip_the_suffix_draw() {
        // First draw accepts the suffix, but "world!" ends in punctuation so
        // no second draw happens; "again" then consumes 0.9 and is skipped.
        let mut rng = ScriptedRandom::new([0.0, 0.9], []);
        assert_eq!(ancient_latin_text("world! again", &mut rng), "world! again");
    }

    #[test]
    fn long_results_may_gain_a_phrase() {
        let text = "one two six ten one two six ten one two six ten one two";
        assert!(text.len() > PHRASE_MIN_LEN);
        let mut rng = ScriptedRandom::new([0.1], [2, 1]);
        assert_eq!(
            ancient_latin_text(text, &mut rng),
            "one Carpe diem. two six ten one two six ten one two six ten one two"
        );
    }

    #[test]
    fn short_results_never_gain_a_phrase() {
        let mut rng = ScriptedRandom::new([0.0], [0, 0]);
        assert_eq!(ancient_latin_text("one two", &mut rng), "one two");
    }

    #[test]
    fn scripted_source_is_reproducible() {
        let text = "The senate and the people of Rome will gather in the forum today";
        let script = ScriptedRandom::new([0.2, 0.7, 0.5, 0.1, 0.3, 0.4], [4, 3]);
        let a = ancient_latin_text(text, &mut script.clone());
        let b = ancient_latin_text(text, &mut script.clone());
        assert_eq!(a, b);
        assert!(a.starts_with("Thy senateum et thy"));
    }

    #[test]
    fn real_rng_keeps_substitutions() {
        let mangler = Mangler::new(fastrand::Rng::with_seed(7));
        for _ in 0..20 {
            let out = mangler.transform("the of to").unwrap();
            assert_eq!(out, "thy de ad");
        }
    }
}

//! Language detection backed by `whatlang` trigram models.
//!
//! Trigram guesses on a few words are noise, so a non-English guess only
//! rejects a Latin-script text when whatlang marks it reliable.

use whatlang::{Detector, Lang, Script};

use crate::traits::LanguageDetector;

#[derive(Debug, Default, Clone, Copy)]
pub struct WhatlangDetector;

impl WhatlangDetector {
    pub fn new() -> Self { Self }
}

impl LanguageDetector for WhatlangDetector {
    fn is_english(&self, text: &str) -> bool {
        match Detector::new().detect(text) {
            None => false,
            Some(info) if info.lang() == Lang::Eng => true,
            Some(info) => info.script() == Script::Latin && !info.is_reliable(),
        }
    }
}

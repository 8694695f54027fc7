//! Input normalization
//!
//! Rules and keyword tables operate on romanized Hinglish, so transcribed
//! or typed Devanagari is transliterated to Latin script before
//! classification.

use unicode_normalization::UnicodeNormalization;

const VIRAMA: char = '\u{094D}';
const NUKTA: char = '\u{093C}';
const ANUSVARA: char = '\u{0902}';
const CHANDRABINDU: char = '\u{0901}';
const VISARGA: char = '\u{0903}';

/// Basic, non-semantic normalization.
///
/// NFC, control and zero-width characters removed, whitespace collapsed.
pub fn clean_text(text: &str) -> String {
    let normalized: String = text
        .nfc()
        .filter(|c| !is_invisible(*c))
        .collect();

    normalized.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn is_invisible(c: char) -> bool {
    (c.is_control() && c != '\n' && c != '\t')
        || matches!(c, '\u{200B}'..='\u{200F}' | '\u{2060}' | '\u{FEFF}')
}

fn is_devanagari(c: char) -> bool {
    ('\u{0900}'..='\u{097F}').contains(&c)
}

/// Devanagari letters and combining signs (not digits or dandas)
fn is_devanagari_letter(c: char) -> bool {
    is_devanagari(c) && !matches!(c, '\u{0964}' | '\u{0965}' | '\u{0966}'..='\u{096F}')
}

fn consonant(c: char) -> Option<&'static str> {
    let latin = match c {
        'क' => "k",
        'ख' => "kh",
        'ग' => "g",
        'घ' => "gh",
        'ङ' => "n",
        'च' => "ch",
        'छ' => "chh",
        'ज' => "j",
        'झ' => "jh",
        'ञ' => "n",
        'ट' => "t",
        'ठ' => "th",
        'ड' => "d",
        'ढ' => "dh",
        'ण' => "n",
        'त' => "t",
        'थ' => "th",
        'द' => "d",
        'ध' => "dh",
        'न' => "n",
        'प' => "p",
        'फ' => "ph",
        'ब' => "b",
        'भ' => "bh",
        'म' => "m",
        'य' => "y",
        'र' => "r",
        'ल' => "l",
        'व' => "v",
        'श' => "sh",
        'ष' => "sh",
        'स' => "s",
        'ह' => "h",
        '\u{0958}' => "q",
        '\u{0959}' => "kh",
        '\u{095A}' => "gh",
        '\u{095B}' => "z",
        '\u{095C}' => "r",
        '\u{095D}' => "rh",
        '\u{095E}' => "f",
        '\u{095F}' => "y",
        _ => return None,
    };
    Some(latin)
}

/// Consonant followed by a combining nukta
fn nukta_consonant(c: char) -> Option<&'static str> {
    let latin = match c {
        'क' => "q",
        'ख' => "kh",
        'ग' => "gh",
        'ज' => "z",
        'ड' => "r",
        'ढ' => "rh",
        'फ' => "f",
        _ => return None,
    };
    Some(latin)
}

fn vowel(c: char) -> Option<&'static str> {
    let latin = match c {
        'अ' => "a",
        'आ' => "aa",
        'इ' | 'ई' => "i",
        'उ' | 'ऊ' => "u",
        'ऋ' => "ri",
        'ए' => "e",
        'ऐ' => "ai",
        'ओ' | 'ऑ' => "o",
        'औ' => "au",
        'ॐ' => "om",
        _ => return None,
    };
    Some(latin)
}

fn matra(c: char) -> Option<&'static str> {
    let latin = match c {
        'ा' => "aa",
        'ि' | 'ी' => "i",
        'ु' | 'ू' => "u",
        'ृ' => "ri",
        'े' | 'ॅ' => "e",
        'ै' => "ai",
        'ो' | 'ॉ' => "o",
        'ौ' => "au",
        _ => return None,
    };
    Some(latin)
}

/// Romanized output under construction
#[derive(Default)]
struct Romanizer {
    out: String,
    pending_schwa: bool,
    word_letters: usize,
}

impl Romanizer {
    fn flush_schwa(&mut self) {
        if self.pending_schwa {
            self.out.push('a');
            self.pending_schwa = false;
        }
    }

    /// Word-final schwa is silent in Hindi ("ghar", not "ghara") unless
    /// the word is a single consonant ("na").
    fn end_word(&mut self) {
        if self.pending_schwa && self.word_letters <= 1 {
            self.out.push('a');
        }
        self.pending_schwa = false;
        self.word_letters = 0;
    }
}

/// Convert Devanagari (Hindi) script to Latin script.
///
/// Latin text passes through unchanged, so mixed input such as
/// "मैं office jaa raha hoon" becomes "main office jaa raha hoon".
pub fn transliterate_to_latin(text: &str) -> String {
    if !text.chars().any(is_devanagari) {
        return text.to_string();
    }

    let mut r = Romanizer::default();
    let mut chars = text.nfc().peekable();

    while let Some(c) = chars.next() {
        if let Some(latin) = consonant(c) {
            r.flush_schwa();
            let latin = if chars.peek() == Some(&NUKTA) {
                chars.next();
                nukta_consonant(c).unwrap_or(latin)
            } else {
                latin
            };
            r.out.push_str(latin);
            r.pending_schwa = true;
            r.word_letters += 1;
            continue;
        }

        if let Some(latin) = matra(c) {
            r.pending_schwa = false;
            // final aa-matra is written short ("kya", "tha")
            let word_final = !chars.peek().copied().is_some_and(is_devanagari_letter);
            r.out.push_str(if c == 'ा' && word_final { "a" } else { latin });
            continue;
        }

        if let Some(latin) = vowel(c) {
            r.flush_schwa();
            r.out.push_str(latin);
            r.word_letters += 1;
            continue;
        }

        match c {
            VIRAMA => r.pending_schwa = false,
            ANUSVARA => {
                r.flush_schwa();
                r.out.push('n');
            }
            VISARGA => {
                r.flush_schwa();
                r.out.push('h');
            }
            CHANDRABINDU => {
                r.flush_schwa();
                // "maa" already reads nasal; "hun" needs the n
                if !r.out.ends_with("aa") {
                    r.out.push('n');
                }
            }
            NUKTA => r.flush_schwa(),
            '\u{0964}' | '\u{0965}' => {
                r.end_word();
                r.out.push('.');
            }
            '\u{0966}'..='\u{096F}' => {
                r.end_word();
                let digit = c as u32 - 0x0966;
                r.out.push(char::from_digit(digit, 10).unwrap_or('0'));
            }
            _ if is_devanagari(c) => {}
            _ => {
                r.end_word();
                r.out.push(c);
            }
        }
    }
    r.end_word();

    r.out
}

/// Full preparation applied to every input: transliterate, then clean
pub fn prepare(text: &str) -> String {
    clean_text(&transliterate_to_latin(text))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clean_text() {
        assert_eq!(clean_text("  Job   achhi\thai \n par  "), "Job achhi hai par");
        assert_eq!(clean_text("maa\u{200B}\u{0007} ki"), "maa ki");
        assert_eq!(clean_text(""), "");
        assert_eq!(prepare("\u{200B}\u{200C} \u{FEFF}\u{2060}"), "");
    }

    #[test]
    fn test_latin_passes_through() {
        assert_eq!(transliterate_to_latin("Job achhi hai"), "Job achhi hai");
    }

    #[test]
    fn test_transliterate_common_words() {
        assert_eq!(transliterate_to_latin("मैं"), "main");
        assert_eq!(transliterate_to_latin("किसी"), "kisi");
        assert_eq!(transliterate_to_latin("घर"), "ghar");
        assert_eq!(transliterate_to_latin("नहीं"), "nahin");
        assert_eq!(transliterate_to_latin("क्या"), "kya");
        assert_eq!(transliterate_to_latin("माँ"), "maa");
        assert_eq!(transliterate_to_latin("न"), "na");
    }

    #[test]
    fn test_transliterate_mixed_sentence() {
        assert_eq!(
            transliterate_to_latin("मैं office जा रहा हूँ।"),
            "main office ja raha hun."
        );
        assert_eq!(transliterate_to_latin("ज़िंदगी"), "zindagi");
    }

    #[test]
    fn test_prepare_feeds_rules() {
        let text = prepare("माँ की तबियत  खराब है");
        assert_eq!(text, "maa ki tabiyat kharaab hai");
        assert!(crate::rules::family_context(&text).is_some());
    }
}

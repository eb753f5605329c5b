//! Han-to-pinyin transliteration
//!
//! Used to derive ASCII-safe identifiers (asset names, sheet keys) from
//! Chinese display text. Each Han character becomes its capitalized pinyin
//! syllable; runs of non-Han characters pass through with only their first
//! character uppercased, so `"技能表"` becomes `"JiNengBiao"` and
//! `"hello世界"` becomes `"HelloShiJie"`.

use pinyin::ToPinyin;

/// Transliterate Han characters to capitalized pinyin syllables.
///
/// Characters without a pinyin reading (ASCII, punctuation, other scripts)
/// are kept as-is, except that the first character of each such run is
/// uppercased to match the syllable casing around it.
#[must_use]
pub fn to_pinyin(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut run = String::new();

    for (ch, syllable) in text.chars().zip(text.to_pinyin()) {
        match syllable {
            Some(py) => {
                flush_run(&mut out, &mut run);
                push_capitalized(&mut out, py.plain());
            }
            None => run.push(ch),
        }
    }
    flush_run(&mut out, &mut run);
    out
}

fn flush_run(out: &mut String, run: &mut String) {
    if !run.is_empty() {
        push_capitalized(out, run);
        run.clear();
    }
}

fn push_capitalized(out: &mut String, text: &str) {
    let mut chars = text.chars();
    if let Some(first) = chars.next() {
        out.extend(first.to_uppercase());
        out.push_str(chars.as_str());
    }
}

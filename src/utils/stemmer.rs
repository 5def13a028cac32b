//! Porter stemmer for query words.
//!
//! The index stores terms already stemmed by the documentation generator
//! ("array" is stored as "arrai", "verilator" as "veril"), so query words
//! must run through the same algorithm before lookup. This is the classic
//! Porter algorithm in the variant the generator's site widget ships
//! (step 2 includes the bli->ble and logi->log rules).

/// Stem a single lowercase word. Words shorter than three characters and
/// words containing non-ASCII-alphabetic characters are returned as-is.
pub fn stem(word: &str) -> String {
    if word.len() <= 2 || !word.bytes().all(|b| b.is_ascii_lowercase()) {
        return word.to_string();
    }

    let mut w: Vec<u8> = word.as_bytes().to_vec();
    step1a(&mut w);
    step1b(&mut w);
    step1c(&mut w);
    step2(&mut w);
    step3(&mut w);
    step4(&mut w);
    step5(&mut w);

    // Stemming only ever shortens or substitutes ASCII, still valid UTF-8
    String::from_utf8(w).unwrap_or_else(|_| word.to_string())
}

fn is_consonant(w: &[u8], i: usize) -> bool {
    match w[i] {
        b'a' | b'e' | b'i' | b'o' | b'u' => false,
        b'y' => i == 0 || !is_consonant(w, i - 1),
        _ => true,
    }
}

/// Number of vowel-consonant sequences in w[..len]
fn measure(w: &[u8], len: usize) -> usize {
    let mut m = 0;
    let mut i = 0;

    // Skip initial consonants
    while i < len && is_consonant(w, i) {
        i += 1;
    }

    loop {
        // Vowel run
        while i < len && !is_consonant(w, i) {
            i += 1;
        }
        if i >= len {
            return m;
        }
        // Consonant run closes a VC sequence
        while i < len && is_consonant(w, i) {
            i += 1;
        }
        m += 1;
        if i >= len {
            return m;
        }
    }
}

fn has_vowel(w: &[u8], len: usize) -> bool {
    (0..len).any(|i| !is_consonant(w, i))
}

fn ends_double_consonant(w: &[u8]) -> bool {
    let n = w.len();
    n >= 2 && w[n - 1] == w[n - 2] && is_consonant(w, n - 1)
}

/// consonant-vowel-consonant ending where the final consonant is not
/// w, x or y
fn ends_cvc(w: &[u8], len: usize) -> bool {
    if len < 3 {
        return false;
    }
    let (i, j, k) = (len - 3, len - 2, len - 1);
    is_consonant(w, i)
        && !is_consonant(w, j)
        && is_consonant(w, k)
        && !matches!(w[k], b'w' | b'x' | b'y')
}

fn ends_with(w: &[u8], suffix: &str) -> bool {
    w.len() >= suffix.len() && &w[w.len() - suffix.len()..] == suffix.as_bytes()
}

/// Replace `suffix` with `replacement` if the remaining stem has measure
/// greater than `min_measure`. Returns true when the suffix was present
/// (whether or not it was replaced).
fn replace_suffix(w: &mut Vec<u8>, suffix: &str, replacement: &str, min_measure: usize) -> bool {
    if !ends_with(w, suffix) {
        return false;
    }
    let stem_len = w.len() - suffix.len();
    if measure(w, stem_len) > min_measure {
        w.truncate(stem_len);
        w.extend_from_slice(replacement.as_bytes());
    }
    true
}

fn step1a(w: &mut Vec<u8>) {
    if ends_with(w, "sses") || ends_with(w, "ies") {
        w.truncate(w.len() - 2);
    } else if ends_with(w, "s") && !ends_with(w, "ss") {
        w.truncate(w.len() - 1);
    }
}

fn step1b(w: &mut Vec<u8>) {
    if ends_with(w, "eed") {
        if measure(w, w.len() - 3) > 0 {
            w.truncate(w.len() - 1);
        }
        return;
    }

    let cut = if ends_with(w, "ed") && has_vowel(w, w.len() - 2) {
        2
    } else if ends_with(w, "ing") && has_vowel(w, w.len() - 3) {
        3
    } else {
        return;
    };
    w.truncate(w.len() - cut);

    if ends_with(w, "at") || ends_with(w, "bl") || ends_with(w, "iz") {
        w.push(b'e');
    } else if ends_double_consonant(w) && !matches!(w[w.len() - 1], b'l' | b's' | b'z') {
        w.truncate(w.len() - 1);
    } else if measure(w, w.len()) == 1 && ends_cvc(w, w.len()) {
        w.push(b'e');
    }
}

fn step1c(w: &mut [u8]) {
    let n = w.len();
    if n >= 2 && w[n - 1] == b'y' && has_vowel(w, n - 1) {
        w[n - 1] = b'i';
    }
}

fn step2(w: &mut Vec<u8>) {
    const RULES: &[(&str, &str)] = &[
        ("ational", "ate"),
        ("tional", "tion"),
        ("enci", "ence"),
        ("anci", "ance"),
        ("izer", "ize"),
        ("bli", "ble"),
        ("alli", "al"),
        ("entli", "ent"),
        ("eli", "e"),
        ("ousli", "ous"),
        ("ization", "ize"),
        ("ation", "ate"),
        ("ator", "ate"),
        ("alism", "al"),
        ("iveness", "ive"),
        ("fulness", "ful"),
        ("ousness", "ous"),
        ("aliti", "al"),
        ("iviti", "ive"),
        ("biliti", "ble"),
        ("logi", "log"),
    ];
    for (suffix, replacement) in RULES {
        if replace_suffix(w, suffix, replacement, 0) {
            return;
        }
    }
}

fn step3(w: &mut Vec<u8>) {
    const RULES: &[(&str, &str)] = &[
        ("icate", "ic"),
        ("ative", ""),
        ("alize", "al"),
        ("iciti", "ic"),
        ("ical", "ic"),
        ("ful", ""),
        ("ness", ""),
    ];
    for (suffix, replacement) in RULES {
        if replace_suffix(w, suffix, replacement, 0) {
            return;
        }
    }
}

fn step4(w: &mut Vec<u8>) {
    const SUFFIXES: &[&str] = &[
        "al", "ance", "ence", "er", "ic", "able", "ible", "ant", "ement", "ment", "ent", "ion",
        "ou", "ism", "ate", "iti", "ous", "ive", "ize",
    ];
    for suffix in SUFFIXES {
        if !ends_with(w, suffix) {
            continue;
        }
        let stem_len = w.len() - suffix.len();
        // "ion" only counts when preceded by s or t
        if *suffix == "ion" && !(stem_len > 0 && matches!(w[stem_len - 1], b's' | b't')) {
            return;
        }
        if measure(w, stem_len) > 1 {
            w.truncate(stem_len);
        }
        return;
    }
}

fn step5(w: &mut Vec<u8>) {
    // 5a: drop trailing e
    let n = w.len();
    if n >= 1 && w[n - 1] == b'e' {
        let m = measure(w, n - 1);
        if m > 1 || (m == 1 && !ends_cvc(w, n - 1)) {
            w.truncate(n - 1);
        }
    }
    // 5b: collapse trailing double l
    let n = w.len();
    if n >= 2 && w[n - 1] == b'l' && ends_double_consonant(w) && measure(w, n) > 1 {
        w.truncate(n - 1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_short_words_untouched() {
        assert_eq!(stem("a"), "a");
        assert_eq!(stem("to"), "to");
    }

    #[test]
    fn test_non_ascii_untouched() {
        assert_eq!(stem("größe"), "größe");
        assert_eq!(stem("0x13"), "0x13");
    }

    #[test]
    fn test_plurals() {
        assert_eq!(stem("caresses"), "caress");
        assert_eq!(stem("ponies"), "poni");
        assert_eq!(stem("cats"), "cat");
        assert_eq!(stem("gears"), "gear");
    }

    #[test]
    fn test_ed_ing() {
        assert_eq!(stem("agreed"), "agre");
        assert_eq!(stem("plastered"), "plaster");
        assert_eq!(stem("motoring"), "motor");
        assert_eq!(stem("sing"), "sing");
        assert_eq!(stem("hopping"), "hop");
        assert_eq!(stem("filing"), "file");
    }

    #[test]
    fn test_y_to_i() {
        assert_eq!(stem("happy"), "happi");
        assert_eq!(stem("sky"), "sky");
    }

    #[test]
    fn test_index_vocabulary() {
        // Words whose stemmed forms appear in real documentation indexes
        assert_eq!(stem("array"), "arrai");
        assert_eq!(stem("verilator"), "veril");
        assert_eq!(stem("typing"), "type");
        assert_eq!(stem("simulator"), "simul");
        assert_eq!(stem("instruction"), "instruct");
        assert_eq!(stem("introduction"), "introduct");
    }

    #[test]
    fn test_longer_derivations() {
        assert_eq!(stem("generalization"), "gener");
        assert_eq!(stem("oscillators"), "oscil");
        assert_eq!(stem("conditional"), "condit");
        assert_eq!(stem("relational"), "relat");
    }

    #[test]
    fn test_stem_is_idempotent_on_common_words() {
        for word in ["gear", "echo", "type", "instruct"] {
            assert_eq!(stem(word), word);
        }
    }
}

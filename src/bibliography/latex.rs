//! Turns the LaTeX markup found in BibTeX fields into plain text.

use lazy_static::lazy_static;
use phf::phf_map;
use regex::{Captures, Regex};

lazy_static! {
    /// Regex for accent commands, with or without braces: `\"o`, `\"{o}`,
    /// `{\'e}`, `\c{c}`.
    static ref ACCENT: Regex =
        Regex::new(r#"\\(?P<cmd>[`'^"~=.uvHc])\s*(?:\{(?P<braced>[A-Za-z])\}|(?P<bare>[A-Za-z]))"#)
            .unwrap();

    /// Regex for letter commands such as `\ss` and `\o`.
    static ref LETTER: Regex = Regex::new(r"\\(?P<cmd>ss|ae|AE|oe|OE|aa|AA|o|O|l|L|i)\b\s*").unwrap();

    /// Regex for escaped special characters.
    static ref ESCAPED: Regex = Regex::new(r"\\(?P<char>[&%$_#])").unwrap();

    /// Regex for font commands whose argument is kept.
    static ref FONT: Regex =
        Regex::new(r"\\(?:textit|textbf|textsc|textrm|texttt|emph|mkbibquote|url)\s*").unwrap();

    /// Regex for runs of whitespace, including line breaks inside fields.
    static ref WHITESPACE: Regex = Regex::new(r"\s+").unwrap();
}

/// Accented letters, keyed by the accent command followed by the letter.
static ACCENTS: phf::Map<&'static str, &'static str> = phf_map! {
    "`a" => "à", "`e" => "è", "`i" => "ì", "`o" => "ò", "`u" => "ù",
    "`A" => "À", "`E" => "È", "`I" => "Ì", "`O" => "Ò", "`U" => "Ù",
    "'a" => "á", "'e" => "é", "'i" => "í", "'o" => "ó", "'u" => "ú", "'y" => "ý",
    "'A" => "Á", "'E" => "É", "'I" => "Í", "'O" => "Ó", "'U" => "Ú", "'Y" => "Ý",
    "'c" => "ć", "'n" => "ń", "'s" => "ś", "'z" => "ź",
    "^a" => "â", "^e" => "ê", "^i" => "î", "^o" => "ô", "^u" => "û",
    "^A" => "Â", "^E" => "Ê", "^I" => "Î", "^O" => "Ô", "^U" => "Û",
    "\"a" => "ä", "\"e" => "ë", "\"i" => "ï", "\"o" => "ö", "\"u" => "ü", "\"y" => "ÿ",
    "\"A" => "Ä", "\"E" => "Ë", "\"I" => "Ï", "\"O" => "Ö", "\"U" => "Ü",
    "~a" => "ã", "~n" => "ñ", "~o" => "õ", "~A" => "Ã", "~N" => "Ñ", "~O" => "Õ",
    "=a" => "ā", "=e" => "ē", "=i" => "ī", "=o" => "ō", "=u" => "ū",
    ".z" => "ż", ".Z" => "Ż",
    "ua" => "ă", "ug" => "ğ", "uA" => "Ă", "uG" => "Ğ",
    "vc" => "č", "ve" => "ě", "vn" => "ň", "vr" => "ř", "vs" => "š", "vz" => "ž",
    "vC" => "Č", "vE" => "Ě", "vN" => "Ň", "vR" => "Ř", "vS" => "Š", "vZ" => "Ž",
    "Ho" => "ő", "Hu" => "ű", "HO" => "Ő", "HU" => "Ű",
    "cc" => "ç", "cs" => "ş", "cC" => "Ç", "cS" => "Ş",
};

static LETTERS: phf::Map<&'static str, &'static str> = phf_map! {
    "ss" => "ß", "ae" => "æ", "AE" => "Æ", "oe" => "œ", "OE" => "Œ",
    "aa" => "å", "AA" => "Å", "o" => "ø", "O" => "Ø", "l" => "ł", "L" => "Ł",
    "i" => "ı",
};

/// Clean a raw field value for display.
pub fn clean(raw: &str) -> String {
    let text = ACCENT.replace_all(raw, |caps: &Captures| {
        let letter = caps
            .name("braced")
            .or_else(|| caps.name("bare"))
            .map_or("", |m| m.as_str());
        let lookup = format!("{}{}", &caps["cmd"], letter);
        match ACCENTS.get(lookup.as_str()) {
            Some(accented) => accented.to_string(),
            None => caps[0].to_string(),
        }
    });
    let text = LETTER.replace_all(&text, |caps: &Captures| {
        LETTERS
            .get(&caps["cmd"])
            .map_or_else(|| caps[0].to_string(), |l| l.to_string())
    });
    let text = ESCAPED.replace_all(&text, "$char");
    let text = FONT.replace_all(&text, "");

    let text = text
        .replace("---", "\u{2014}")
        .replace("--", "\u{2013}")
        .replace('~', " ")
        .replace(['{', '}'], "");

    WHITESPACE.replace_all(text.trim(), " ").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_text_untouched() {
        assert_eq!(clean("A Plain Title"), "A Plain Title");
    }

    #[test]
    fn braces_removed() {
        assert_eq!(clean("The {DNA} of {{Rust}}"), "The DNA of Rust");
    }

    #[test]
    fn accents() {
        assert_eq!(clean(r#"G{\"o}del"#), "Gödel");
        assert_eq!(clean(r#"Erd\H{o}s"#), "Erdős");
        assert_eq!(clean(r"Fran\c{c}ois"), "François");
        assert_eq!(clean(r"Caf\'e"), "Café");
        assert_eq!(clean(r"Stra\ss e"), "Straße");
    }

    #[test]
    fn unknown_accent_kept() {
        assert_eq!(clean(r"\^x"), r"\^x");
    }

    #[test]
    fn dashes_and_escapes() {
        assert_eq!(clean("1--10"), "1\u{2013}10");
        assert_eq!(clean("yes---no"), "yes\u{2014}no");
        assert_eq!(clean(r"R\&D at 50\%"), "R&D at 50%");
        assert_eq!(clean("Mr.~Smith"), "Mr. Smith");
    }

    #[test]
    fn font_commands() {
        assert_eq!(clean(r"On \emph{Being} \textbf{Bold}"), "On Being Bold");
    }

    #[test]
    fn whitespace_collapsed() {
        assert_eq!(clean("  Across\n    lines  "), "Across lines");
    }
}

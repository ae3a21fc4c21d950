//! ASCII transliteration for slugs and bundle filenames.

/// Substitution table, multi-character keys first so they win over their
/// single-character prefixes.
pub const TRANSLITERATION_TABLE: &[(&str, &str)] = &[
    ("°C", "Grad-Celsius"),
    ("°F", "Grad-Fahrenheit"),
    ("Ä", "Ae"),
    ("ä", "ae"),
    ("Æ", "Ae"),
    ("æ", "ae"),
    ("À", "A"),
    ("à", "a"),
    ("Á", "A"),
    ("á", "a"),
    ("Â", "A"),
    ("â", "a"),
    ("Ã", "A"),
    ("ã", "a"),
    ("Å", "A"),
    ("å", "a"),
    ("ª", "a"),
    ("ₐ", "a"),
    ("ā", "a"),
    ("Ć", "C"),
    ("ć", "c"),
    ("Ç", "C"),
    ("ç", "c"),
    ("Ð", "D"),
    ("đ", "d"),
    ("È", "E"),
    ("è", "e"),
    ("É", "E"),
    ("é", "e"),
    ("Ê", "E"),
    ("ê", "e"),
    ("Ë", "E"),
    ("ë", "e"),
    ("ₑ", "e"),
    ("ƒ", "f"),
    ("ğ", "g"),
    ("Ğ", "G"),
    ("Ì", "I"),
    ("ì", "i"),
    ("Í", "I"),
    ("í", "i"),
    ("Î", "I"),
    ("î", "i"),
    ("Ï", "Ii"),
    ("ï", "ii"),
    ("ī", "i"),
    ("ı", "i"),
    ("İ", "I"),
    ("Ñ", "N"),
    ("ñ", "n"),
    ("ⁿ", "n"),
    ("Ò", "O"),
    ("ò", "o"),
    ("Ó", "O"),
    ("ó", "o"),
    ("Ô", "O"),
    ("ô", "o"),
    ("Õ", "O"),
    ("õ", "o"),
    ("Ø", "O"),
    ("ø", "o"),
    ("ₒ", "o"),
    ("Ö", "Oe"),
    ("ö", "oe"),
    ("Œ", "Oe"),
    ("œ", "oe"),
    ("ß", "ss"),
    ("Š", "S"),
    ("š", "s"),
    ("ş", "s"),
    ("Ş", "S"),
    ("™", "TM"),
    ("Ù", "U"),
    ("ù", "u"),
    ("Ú", "U"),
    ("ú", "u"),
    ("Û", "U"),
    ("û", "u"),
    ("Ü", "Ue"),
    ("ü", "ue"),
    ("Ý", "Y"),
    ("ý", "y"),
    ("ÿ", "y"),
    ("Ž", "Z"),
    ("ž", "z"),
    ("¢", "Cent"),
    ("€", "Euro"),
    ("‰", "promille"),
    ("№", "Nr"),
    ("$", "Dollar"),
    ("℃", "Grad-Celsius"),
    ("℉", "Grad-Fahrenheit"),
    ("⁰", "0"),
    ("¹", "1"),
    ("²", "2"),
    ("³", "3"),
    ("⁴", "4"),
    ("⁵", "5"),
    ("⁶", "6"),
    ("⁷", "7"),
    ("⁸", "8"),
    ("⁹", "9"),
    ("₀", "0"),
    ("₁", "1"),
    ("₂", "2"),
    ("₃", "3"),
    ("₄", "4"),
    ("₅", "5"),
    ("₆", "6"),
    ("₇", "7"),
    ("₈", "8"),
    ("₉", "9"),
    ("±", "plusminus"),
    ("×", "x"),
    ("₊", "plus"),
    ("₌", "="),
    ("⁼", "="),
    ("⁻", "-"),
    ("₋", "-"),
    ("–", "-"),
    ("—", "-"),
    ("‑", "-"),
    ("․", "."),
    ("‥", ".."),
    ("…", "..."),
    ("‧", "."),
    ("\u{a0}", "-"),
    (" ", "-"),
    ("А", "A"),
    ("Б", "B"),
    ("В", "V"),
    ("Г", "G"),
    ("Д", "D"),
    ("Е", "E"),
    ("Ё", "YO"),
    ("Ж", "ZH"),
    ("З", "Z"),
    ("И", "I"),
    ("Й", "Y"),
    ("К", "K"),
    ("Л", "L"),
    ("М", "M"),
    ("Н", "N"),
    ("О", "O"),
    ("П", "P"),
    ("Р", "R"),
    ("С", "S"),
    ("Т", "T"),
    ("У", "U"),
    ("Ф", "F"),
    ("Х", "H"),
    ("Ц", "TS"),
    ("Ч", "CH"),
    ("Ш", "SH"),
    ("Щ", "SCH"),
    ("Ъ", ""),
    ("Ы", "YI"),
    ("Ь", ""),
    ("Э", "E"),
    ("Ю", "YU"),
    ("Я", "YA"),
    ("а", "a"),
    ("б", "b"),
    ("в", "v"),
    ("г", "g"),
    ("д", "d"),
    ("е", "e"),
    ("ё", "yo"),
    ("ж", "zh"),
    ("з", "z"),
    ("и", "i"),
    ("й", "y"),
    ("к", "k"),
    ("л", "l"),
    ("м", "m"),
    ("н", "n"),
    ("о", "o"),
    ("п", "p"),
    ("р", "r"),
    ("с", "s"),
    ("т", "t"),
    ("у", "u"),
    ("ф", "f"),
    ("х", "h"),
    ("ц", "ts"),
    ("ч", "ch"),
    ("ш", "sh"),
    ("щ", "sch"),
    ("ъ", ""),
    ("ы", "yi"),
    ("ь", ""),
    ("э", "e"),
    ("ю", "yu"),
    ("я", "ya"),
    ("°", "Grad"),
];

const COLLAPSIBLE: [char; 4] = ['=', '+', '.', '-'];

/// Map non-ASCII characters to ASCII approximations, collapse runs of
/// `= + . -` into their first character and trim surrounding dashes.
///
/// Characters missing from the table pass through unchanged.
pub fn transliterate(text: &str) -> String {
    let mut substituted = String::with_capacity(text.len());
    let mut rest = text;
    while let Some(ch) = rest.chars().next() {
        match TRANSLITERATION_TABLE
            .iter()
            .find(|(key, _)| rest.starts_with(key))
        {
            Some((key, replacement)) => {
                substituted.push_str(replacement);
                rest = &rest[key.len()..];
            }
            None => {
                substituted.push(ch);
                rest = &rest[ch.len_utf8()..];
            }
        }
    }

    let mut collapsed = String::with_capacity(substituted.len());
    let mut in_run = false;
    for ch in substituted.chars() {
        if COLLAPSIBLE.contains(&ch) {
            if !in_run {
                collapsed.push(ch);
            }
            in_run = true;
        } else {
            collapsed.push(ch);
            in_run = false;
        }
    }

    collapsed.trim_matches('-').to_string()
}

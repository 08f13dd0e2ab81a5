//! Russian number spelling.
//!
//! Cardinal numbers are spelled in triads from the highest scale down. Each
//! triad agrees with its scale word: `тысяча` is feminine (`одна тысяча`,
//! `две тысячи`), every other scale and the currency unit are masculine.

/// Magnitude above which amounts are not spelled.
pub const SPELLOUT_LIMIT: f64 = 1e14;

const UNITS_MASC: [&str; 10] = [
    "", "один", "два", "три", "четыре", "пять", "шесть", "семь", "восемь", "девять",
];
const UNITS_FEMN: [&str; 10] = [
    "", "одна", "две", "три", "четыре", "пять", "шесть", "семь", "восемь", "девять",
];
const TEENS: [&str; 10] = [
    "десять",
    "одиннадцать",
    "двенадцать",
    "тринадцать",
    "четырнадцать",
    "пятнадцать",
    "шестнадцать",
    "семнадцать",
    "восемнадцать",
    "девятнадцать",
];
const TENS: [&str; 10] = [
    "", "", "двадцать", "тридцать", "сорок", "пятьдесят", "шестьдесят", "семьдесят",
    "восемьдесят", "девяносто",
];
const HUNDREDS: [&str; 10] = [
    "", "сто", "двести", "триста", "четыреста", "пятьсот", "шестьсот", "семьсот", "восемьсот",
    "девятьсот",
];

/// Scale words from thousands up, with their feminine flag.
const SCALES: [([&str; 3], bool); 4] = [
    (["тысяча", "тысячи", "тысяч"], true),
    (["миллион", "миллиона", "миллионов"], false),
    (["миллиард", "миллиарда", "миллиардов"], false),
    (["триллион", "триллиона", "триллионов"], false),
];

const RUBLES: [&str; 3] = ["рубль", "рубля", "рублей"];
const KOPECKS: [&str; 3] = ["копейка", "копейки", "копеек"];

/// Numeral agreement class of `n`: 0 for `один`, 1 for `два`..`четыре`,
/// 2 for everything else.
pub fn plural_index(n: i64) -> usize {
    let n = n.rem_euclid(100);
    let d = n % 10;
    if d == 1 && n != 11 {
        0
    } else if (2..=4).contains(&d) && !(10..20).contains(&n) {
        1
    } else {
        2
    }
}

/// Picks the form of `forms` agreeing with `n`.
pub fn agree<'a>(n: i64, forms: &[&'a str; 3]) -> &'a str {
    forms[plural_index(n)]
}

fn triad(n: u64, feminine: bool, out: &mut Vec<&'static str>) {
    let hundreds = (n / 100) as usize;
    let rest = (n % 100) as usize;
    if hundreds > 0 {
        out.push(HUNDREDS[hundreds]);
    }
    if (10..20).contains(&rest) {
        out.push(TEENS[rest - 10]);
        return;
    }
    if rest >= 20 {
        out.push(TENS[rest / 10]);
    }
    let unit = rest % 10;
    if unit > 0 {
        out.push(if feminine { UNITS_FEMN[unit] } else { UNITS_MASC[unit] });
    }
}

/// Spells a non-negative integer in masculine gender.
///
/// Returns `None` for numbers of a quadrillion and above, which have no
/// scale word here.
///
/// ```
/// use doctpl_render::spellout::spell_number;
///
/// assert_eq!(spell_number(1021).as_deref(), Some("одна тысяча двадцать один"));
/// assert_eq!(spell_number(0).as_deref(), Some("ноль"));
/// assert_eq!(spell_number(1_000_000_000_000_000), None);
/// ```
pub fn spell_number(n: u64) -> Option<String> {
    if n == 0 {
        return Some("ноль".to_string());
    }
    let mut groups = Vec::new();
    let mut rest = n;
    while rest > 0 {
        groups.push(rest % 1000);
        rest /= 1000;
    }
    if groups.len() > SCALES.len() + 1 {
        return None;
    }

    let mut words = Vec::new();
    for (idx, group) in groups.iter().enumerate().rev() {
        if *group == 0 {
            continue;
        }
        match idx.checked_sub(1).map(|scale| SCALES[scale]) {
            None => triad(*group, false, &mut words),
            Some((forms, feminine)) => {
                triad(*group, feminine, &mut words);
                words.push(agree(*group as i64, &forms));
            }
        }
    }
    Some(words.join(" "))
}

/// Spells a ruble amount: `"<рубли прописью> <рубль>, <KK> <копейка>"`.
///
/// The amount is rounded to kopecks. Returns `None` when its magnitude
/// reaches [`SPELLOUT_LIMIT`] or it is not finite.
pub fn rubles_in_words(amount: f64) -> Option<String> {
    if !amount.is_finite() || amount.abs() >= SPELLOUT_LIMIT {
        return None;
    }
    let total = (amount.abs() * 100.0).round() as u64;
    let rubles = total / 100;
    let kopecks = total % 100;
    let sign = if amount < 0.0 && total > 0 { "минус " } else { "" };
    Some(format!(
        "{sign}{} {}, {:02} {}",
        spell_number(rubles)?,
        agree((rubles % 100) as i64, &RUBLES),
        kopecks,
        agree(kopecks as i64, &KOPECKS)
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plural_index() {
        assert_eq!(plural_index(1), 0);
        assert_eq!(plural_index(21), 0);
        assert_eq!(plural_index(11), 2);
        assert_eq!(plural_index(3), 1);
        assert_eq!(plural_index(13), 2);
        assert_eq!(plural_index(112), 2);
        assert_eq!(plural_index(-2), 1);
    }

    #[test]
    fn test_spell_number_scales() {
        let spell = |n| spell_number(n).unwrap();
        assert_eq!(spell(2135), "две тысячи сто тридцать пять");
        assert_eq!(spell(1_000_000_001), "один миллиард один");
        assert_eq!(spell(1_001_000), "один миллион одна тысяча");
        assert_eq!(spell(11_000), "одиннадцать тысяч");
        assert_eq!(spell(5_000_000), "пять миллионов");
        assert_eq!(
            spell(999_999_999_999_999),
            "девятьсот девяносто девять триллионов девятьсот девяносто девять миллиардов \
             девятьсот девяносто девять миллионов девятьсот девяносто девять тысяч \
             девятьсот девяносто девять"
        );
    }

    #[test]
    fn test_spell_number_beyond_largest_scale() {
        assert_eq!(spell_number(1_000_000_000_000_000), None);
        assert_eq!(spell_number(u64::MAX), None);
    }

    #[test]
    fn test_rubles_in_words() {
        assert_eq!(rubles_in_words(1.0).unwrap(), "один рубль, 00 копеек");
        assert_eq!(rubles_in_words(3.24).unwrap(), "три рубля, 24 копейки");
        assert_eq!(
            rubles_in_words(1021.0).unwrap(),
            "одна тысяча двадцать один рубль, 00 копеек"
        );
        assert_eq!(rubles_in_words(0.01).unwrap(), "ноль рублей, 01 копейка");
        assert_eq!(rubles_in_words(-5.5).unwrap(), "минус пять рублей, 50 копеек");
        assert_eq!(rubles_in_words(1e14), None);
    }
}

/// Derives the canonical object id for a free text alert identifier.
///
/// ASCII letters and digits are kept (lowercased) together with underscores.
/// Accented Latin letters are folded to their ASCII base (`é` becomes `e`,
/// `ß` becomes `ss`). Runs of whitespace, hyphens and dots collapse into a
/// single hyphen and every other character is dropped. Leading and trailing
/// hyphens are trimmed. The result only depends on the input, so the same
/// identifier always addresses the same stored object.
pub fn slugify(input: &str) -> String {
    let mut slug = String::with_capacity(input.len());
    let mut pending_separator = false;

    for c in input.chars().flat_map(char::to_lowercase) {
        let mut buf = [0; 4];
        let kept = if c.is_ascii_alphanumeric() || c == '_' {
            Some(&*c.encode_utf8(&mut buf))
        } else {
            fold_latin(c)
        };

        match kept {
            Some(kept) => {
                if pending_separator && !slug.is_empty() {
                    slug.push('-');
                }
                pending_separator = false;
                slug.push_str(kept);
            }
            None if c.is_whitespace() || c == '-' || c == '.' => pending_separator = true,
            None => {}
        }
    }

    slug
}

/// ASCII spelling of a lowercase Latin letter with a diacritic or ligature
fn fold_latin(c: char) -> Option<&'static str> {
    let folded = match c {
        'à' | 'á' | 'â' | 'ã' | 'ä' | 'å' | 'ā' | 'ă' | 'ą' => "a",
        'æ' => "ae",
        'ç' | 'ć' | 'č' => "c",
        'ď' | 'đ' | 'ð' => "d",
        'è' | 'é' | 'ê' | 'ë' | 'ē' | 'ė' | 'ę' | 'ě' => "e",
        'ğ' => "g",
        'ì' | 'í' | 'î' | 'ï' | 'ī' | 'į' | 'ı' => "i",
        'ł' | 'ľ' => "l",
        'ñ' | 'ń' | 'ň' => "n",
        'ò' | 'ó' | 'ô' | 'õ' | 'ö' | 'ø' | 'ō' | 'ő' => "o",
        'œ' => "oe",
        'ř' => "r",
        'ś' | 'š' | 'ş' => "s",
        'ß' => "ss",
        'ť' | 'ţ' => "t",
        'þ' => "th",
        'ù' | 'ú' | 'û' | 'ü' | 'ū' | 'ů' | 'ű' | 'ų' => "u",
        'ý' | 'ÿ' => "y",
        'ź' | 'ż' | 'ž' => "z",
        _ => return None,
    };
    Some(folded)
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn it_lowercases_and_hyphenates() {
        assert_eq!(slugify("Disk Full"), "disk-full");
        assert_eq!(slugify("  CPU   load -- high  "), "cpu-load-high");
        assert_eq!(slugify("api.latency"), "api-latency");
    }

    #[test]
    fn it_strips_unsafe_characters() {
        assert_eq!(slugify("Disk/Full?!"), "diskfull");
        assert_eq!(slugify("alert_0b3f"), "alert_0b3f");
        assert_eq!(slugify("!!"), "");
    }

    #[test]
    fn it_folds_accented_letters() {
        assert_eq!(slugify("héllo wörld"), "hello-world");
        assert_eq!(slugify("Ærø Straße"), "aero-strasse");
        assert_eq!(slugify("ÉCHEC critique"), "echec-critique");
        assert_eq!(slugify("日本 disk"), "disk");
    }

    #[test]
    fn it_is_deterministic() {
        let input = "Queue depth > 100 (prod)";
        assert_eq!(slugify(input), slugify(input));
        assert_eq!(slugify(input), "queue-depth-100-prod");
    }

    #[test]
    fn slugs_are_fixed_points() {
        let slug = slugify("Disk Full");
        assert_eq!(slugify(&slug), slug);
    }
}

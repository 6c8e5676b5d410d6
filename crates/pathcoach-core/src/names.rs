use crate::types::UserInfo;

/// Diminutive → formal given name. Entries with both forms are resolved by
/// the profile's gender.
struct NameEntry {
    short: &'static str,
    masculine: Option<&'static str>,
    feminine: Option<&'static str>,
}

const fn m(short: &'static str, full: &'static str) -> NameEntry {
    NameEntry {
        short,
        masculine: Some(full),
        feminine: None,
    }
}

const fn f(short: &'static str, full: &'static str) -> NameEntry {
    NameEntry {
        short,
        masculine: None,
        feminine: Some(full),
    }
}

const fn both(short: &'static str, masc: &'static str, fem: &'static str) -> NameEntry {
    NameEntry {
        short,
        masculine: Some(masc),
        feminine: Some(fem),
    }
}

static NAMES: &[NameEntry] = &[
    f("Оля", "Ольга"),
    f("Олечка", "Ольга"),
    f("Таня", "Тетяна"),
    f("Наташа", "Наталія"),
    f("Катя", "Катерина"),
    f("Маша", "Марія"),
    f("Іра", "Ірина"),
    f("Юля", "Юлія"),
    f("Люба", "Любов"),
    f("Надя", "Надія"),
    f("Настя", "Анастасія"),
    f("Світла", "Світлана"),
    f("Галя", "Галина"),
    f("Ліза", "Єлизавета"),
    f("Соня", "Софія"),
    m("Вова", "Володимир"),
    m("Володя", "Володимир"),
    m("Петя", "Петро"),
    m("Дима", "Дмитро"),
    m("Діма", "Дмитро"),
    m("Андрійко", "Андрій"),
    m("Миша", "Михайло"),
    m("Сергійко", "Сергій"),
    m("Толя", "Анатолій"),
    m("Коля", "Микола"),
    m("Ваня", "Іван"),
    m("Юра", "Юрій"),
    m("Льоша", "Олексій"),
    m("Тарасик", "Тарас"),
    both("Саша", "Олександр", "Олександра"),
    both("Женя", "Євген", "Євгенія"),
    both("Валя", "Валентин", "Валентина"),
    both("Слава", "Ярослав", "Ярослава"),
];

/// Expand a diminutive into the formal given name, or return the trimmed
/// input unchanged when it is not in the table.
pub fn formal_name(name: &str, feminine: bool) -> String {
    let trimmed = name.trim();
    let Some(entry) = NAMES
        .iter()
        .find(|e| e.short.to_lowercase() == trimmed.to_lowercase())
    else {
        return trimmed.to_string();
    };
    let preferred = if feminine {
        entry.feminine.or(entry.masculine)
    } else {
        entry.masculine.or(entry.feminine)
    };
    preferred.unwrap_or(trimmed).to_string()
}

/// File stem for exported lyrics: `<formal name>_<title>`, reduced to
/// characters that are safe in file names on every platform.
pub fn file_stem(user: Option<&UserInfo>, title: &str) -> String {
    let mut parts = Vec::new();
    if let Some(u) = user {
        let name = formal_name(&u.name, u.is_feminine());
        if !name.is_empty() {
            parts.push(name);
        }
    }
    let title = title.trim();
    parts.push(if title.is_empty() {
        "motivation_song".to_string()
    } else {
        title.to_string()
    });
    let joined = parts.join("_");
    let mut stem = String::with_capacity(joined.len());
    for ch in joined.chars() {
        if ch.is_alphanumeric() || ch == '-' || ch == '_' {
            stem.push(ch);
        } else if ch.is_whitespace() {
            stem.push('_');
        }
    }
    stem
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn expands_known_diminutives() {
        assert_eq!(formal_name("Оля", true), "Ольга");
        assert_eq!(formal_name(" вова ", false), "Володимир");
    }

    #[test]
    fn gender_picks_the_form() {
        assert_eq!(formal_name("Саша", false), "Олександр");
        assert_eq!(formal_name("Саша", true), "Олександра");
        // single-form entries ignore the gender hint
        assert_eq!(formal_name("Коля", true), "Микола");
    }

    #[test]
    fn unknown_names_pass_through() {
        assert_eq!(formal_name("Богдан", false), "Богдан");
    }

    #[test]
    fn file_stem_is_sanitized() {
        let user = UserInfo::new("Оля", "29", "жіноча");
        assert_eq!(
            file_stem(Some(&user), "Мій шлях: вперед!"),
            "Ольга_Мій_шлях_вперед"
        );
        assert_eq!(file_stem(None, ""), "motivation_song");
    }
}

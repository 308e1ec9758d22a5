use std::collections::HashMap;

use lootforge_plan::NamingRules;
use tracing::info;

/// Turns editor ids into display names, memoized for the lifetime of a run.
#[derive(Debug, Clone)]
pub struct NameDeriver {
    rules: NamingRules,
    fallback: String,
    cache: HashMap<String, String>,
    derivations: usize,
}

impl NameDeriver {
    pub fn new(rules: NamingRules, fallback: impl Into<String>) -> Self {
        Self {
            rules,
            fallback: fallback.into(),
            cache: HashMap::new(),
            derivations: 0,
        }
    }

    /// Display name for `editor_id`; absent ids map to the fallback name.
    pub fn derive(&mut self, editor_id: Option<&str>) -> String {
        let Some(editor_id) = editor_id else {
            info!(
                editor_id = "<none>",
                name = %self.fallback,
                "missing display name, using fallback name"
            );
            return self.fallback.clone();
        };
        if let Some(cached) = self.cache.get(editor_id) {
            return cached.clone();
        }

        self.derivations += 1;
        let mut name = self.derive_uncached(editor_id);
        if name.is_empty() {
            name = self.fallback.clone();
        }
        info!(editor_id, name = %name, "missing display name, using derived name");
        self.cache.insert(editor_id.to_string(), name.clone());
        name
    }

    /// Number of ids actually tokenized (cache misses).
    pub fn derivations(&self) -> usize {
        self.derivations
    }

    fn derive_uncached(&self, editor_id: &str) -> String {
        let mut parts: Vec<&str> = split_identifier(editor_id)
            .into_iter()
            .filter(|part| part.chars().count() > 1)
            .filter(|part| !self.rules.stop_tokens.iter().any(|stop| stop == part))
            .filter(|part| part.parse::<i32>().is_err())
            .collect();

        let marker = self.rules.marker_token.as_str();
        if parts.first() == Some(&marker) && parts.last() == Some(&marker) {
            parts.remove(0);
        }
        if parts.len() >= 2 && parts.first() == Some(&marker) {
            parts.remove(0);
        }

        parts.join(" ")
    }
}

/// Split an identifier at camel-case boundaries.
///
/// A boundary sits between an uppercase letter and an uppercase letter that
/// starts a word (`DLCArmor`), before any uppercase letter that follows a
/// non-uppercase character (`ironSword`, `01Boots`), and between a letter and
/// a non-letter (`Cuirass01`).
pub fn split_identifier(identifier: &str) -> Vec<&str> {
    let chars: Vec<(usize, char)> = identifier.char_indices().collect();
    let mut parts = Vec::new();
    let mut start = 0;

    for window in 1..chars.len() {
        let (offset, current) = chars[window];
        let previous = chars[window - 1].1;
        let next = chars.get(window + 1).map(|(_, c)| *c);

        let acronym_to_word = previous.is_ascii_uppercase()
            && current.is_ascii_uppercase()
            && next.is_some_and(|c| c.is_ascii_lowercase());
        let into_upper = !previous.is_ascii_uppercase() && current.is_ascii_uppercase();
        let letter_to_other = previous.is_ascii_alphabetic() && !current.is_ascii_alphabetic();

        if acronym_to_word || into_upper || letter_to_other {
            parts.push(&identifier[start..offset]);
            start = offset;
        }
    }

    if start < identifier.len() {
        parts.push(&identifier[start..]);
    }
    parts
}

#[cfg(test)]
mod tests {
    use std::io::{self, Write};
    use std::sync::{Arc, Mutex};

    use super::*;

    fn deriver() -> NameDeriver {
        NameDeriver::new(NamingRules::default(), "Armor")
    }

    #[test]
    fn splits_camel_case_acronyms_and_digits() {
        assert_eq!(
            split_identifier("ArmorIronCuirassDLC01"),
            vec!["Armor", "Iron", "Cuirass", "DLC", "01"]
        );
        assert_eq!(split_identifier("DLC2ArmorBonemold"), vec!["DLC", "2", "Armor", "Bonemold"]);
        assert_eq!(split_identifier("Clothes_Fine"), vec!["Clothes", "_", "Fine"]);
        assert_eq!(split_identifier("ironSword"), vec!["iron", "Sword"]);
        assert_eq!(split_identifier(""), Vec::<&str>::new());
    }

    #[test]
    fn drops_structural_and_numeric_tokens() {
        let mut names = deriver();
        assert_eq!(names.derive(Some("ArmorIronCuirassDLC01")), "Iron Cuirass");
        assert_eq!(names.derive(Some("DLC1ArmorVampireBootsVariant")), "Vampire Boots");
    }

    #[test]
    fn leading_marker_is_dropped() {
        let mut names = deriver();
        assert_eq!(names.derive(Some("ClothesFineShoes")), "Fine Shoes");
        assert_eq!(names.derive(Some("ClothesRobesClothes")), "Robes Clothes");
    }

    #[test]
    fn empty_derivation_falls_back() {
        let mut names = deriver();
        assert_eq!(names.derive(Some("Clothes")), "Armor");
        assert_eq!(names.derive(Some("DLC01")), "Armor");
        assert_eq!(names.derive(None), "Armor");
    }

    #[derive(Clone, Default)]
    struct CapturedLogs(Arc<Mutex<Vec<u8>>>);

    impl Write for CapturedLogs {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().expect("log buffer").extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn absent_editor_id_logs_the_fallback() {
        let logs = CapturedLogs::default();
        let writer = logs.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_max_level(tracing::Level::INFO)
            .with_writer(move || writer.clone())
            .finish();

        let name = tracing::subscriber::with_default(subscriber, || deriver().derive(None));

        assert_eq!(name, "Armor");
        let output = String::from_utf8(logs.0.lock().expect("log buffer").clone()).expect("utf8");
        assert!(output.contains("missing display name, using fallback name"));
        assert!(output.contains("<none>"));
    }

    #[test]
    fn results_are_memoized() {
        let mut names = deriver();
        let first = names.derive(Some("ArmorIronCuirassDLC01"));
        let second = names.derive(Some("ArmorIronCuirassDLC01"));
        assert_eq!(first, second);
        assert_eq!(names.derivations(), 1);
    }
}

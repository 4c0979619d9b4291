use std::collections::HashMap;

use once_cell::sync::Lazy;

/// Remote taxonomy id for the fallback "General" category.
pub const DEFAULT_CATEGORY_ID: i64 = 1;

/// Fixed mapping from editorial category names to WordPress taxonomy ids.
static WP_CATEGORY_MAP: Lazy<HashMap<&'static str, i64>> = Lazy::new(|| {
    HashMap::from([
        ("General", 1),
        ("Deporte", 45),
        ("Economía", 99),
        ("Educación", 175),
        ("Entretenimiento", 44),
        ("Ica Noticias", 40),
        ("Investigación", 101),
        ("Mundo", 105),
        ("Nacional", 42),
        ("Negocios", 97),
        ("Política", 46),
        ("Salud", 100),
        ("Seguridad Ciudadana", 1804),
        ("Tecnologia", 104),
        ("Turismo", 1823),
    ])
});

/// Map a category name to its WordPress taxonomy id.
///
/// Unknown categories land in "General".
#[must_use]
pub fn wp_category_id(category: &str) -> i64 {
    WP_CATEGORY_MAP
        .get(category)
        .copied()
        .unwrap_or(DEFAULT_CATEGORY_ID)
}

/// All known category names, for operator-facing pickers.
#[must_use]
pub fn category_names() -> Vec<&'static str> {
    let mut names: Vec<_> = WP_CATEGORY_MAP.keys().copied().collect();
    names.sort_unstable();
    names
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_category() {
        assert_eq!(wp_category_id("Deporte"), 45);
        assert_eq!(wp_category_id("Seguridad Ciudadana"), 1804);
    }

    #[test]
    fn test_unknown_category_maps_to_general() {
        assert_eq!(wp_category_id("Horóscopo"), DEFAULT_CATEGORY_ID);
        assert_eq!(wp_category_id(""), DEFAULT_CATEGORY_ID);
    }
}

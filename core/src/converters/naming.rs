//! # Shared Component Naming
//!
//! Trait-provided parameters and responses become shared components when the
//! target cannot express traits. Their keys encode both names.

/// Separator style for trait field keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TraitKeyStyle {
    /// `trait:<trait>:<field>` (RAML, Swagger 2.0).
    Colon,
    /// `trait_<trait>_<field>` for targets whose component keys forbid `:`.
    Underscore,
}

const TRAIT_PREFIX: &str = "trait";

/// Builds the key of a trait-provided field.
pub fn trait_field_key(style: TraitKeyStyle, trait_name: &str, field: &str) -> String {
    match style {
        TraitKeyStyle::Colon => format!("{}:{}:{}", TRAIT_PREFIX, trait_name, field),
        TraitKeyStyle::Underscore => format!("{}_{}_{}", TRAIT_PREFIX, trait_name, field),
    }
}

/// Splits a colon style key into `(trait, field)`.
///
/// The field part may itself contain `:`; only the first two separators count.
pub fn parse_trait_field_key(key: &str) -> Option<(String, String)> {
    let mut parts = key.splitn(3, ':');
    if parts.next()? != TRAIT_PREFIX {
        return None;
    }
    let trait_name = parts.next()?;
    let field = parts.next()?;
    if trait_name.is_empty() || field.is_empty() {
        return None;
    }
    Some((trait_name.to_string(), field.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trait_field_key_styles() {
        assert_eq!(
            trait_field_key(TraitKeyStyle::Colon, "paged", "page"),
            "trait:paged:page"
        );
        assert_eq!(
            trait_field_key(TraitKeyStyle::Underscore, "paged", "page"),
            "trait_paged_page"
        );
    }

    #[test]
    fn test_parse_trait_field_key() {
        assert_eq!(
            parse_trait_field_key("trait:search:200"),
            Some(("search".into(), "200".into()))
        );
        assert_eq!(
            parse_trait_field_key("trait:a:b:c"),
            Some(("a".into(), "b:c".into()))
        );
        assert_eq!(parse_trait_field_key("limit"), None);
        assert_eq!(parse_trait_field_key("trait::x"), None);
    }
}

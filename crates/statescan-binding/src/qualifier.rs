//! Qualifier extraction: picking the one annotation out of a class's or
//! method's annotation set that disambiguates it from other bindings of the
//! same type.

use indexmap::IndexSet;
use statescan_core::Name;
use statescan_model::simple_name_of;

use crate::frameworks::is_non_qualifier_annotation;

/// The first annotation in `annotations` that is not a recognized scope,
/// lifecycle, inject, nullable, or source-processor marker, by simple name.
/// Annotation sets preserve decoder insertion order, so "first" here means
/// declaration order in `RuntimeVisibleAnnotations` followed by
/// `RuntimeInvisibleAnnotations`.
pub fn qualifier_of(annotations: &IndexSet<Name>) -> Option<String> {
    annotations.iter().find_map(|annotation| {
        let simple = simple_name_of(annotation.as_str());
        if is_non_qualifier_annotation(simple) {
            None
        } else {
            Some(simple.to_string())
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn skips_recognized_categories_and_returns_first_remainder() {
        let mut annotations = IndexSet::new();
        annotations.insert(Name::new("javax.inject.Inject"));
        annotations.insert(Name::new("com.example.Primary"));
        annotations.insert(Name::new("com.example.Secondary"));
        assert_eq!(qualifier_of(&annotations).as_deref(), Some("Primary"));
    }

    #[test]
    fn returns_none_when_every_annotation_is_recognized() {
        let mut annotations = IndexSet::new();
        annotations.insert(Name::new("javax.inject.Singleton"));
        annotations.insert(Name::new("javax.inject.Inject"));
        assert_eq!(qualifier_of(&annotations), None);
    }
}

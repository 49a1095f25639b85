//! Resolution of free text to a session field name.

use super::FieldList;

/// Maps what the user typed during review to one of the session's fields.
///
/// Matching is case-insensitive on trimmed input:
/// 1. exact match on the whole name,
/// 2. otherwise the first field, in session order, whose name starts with the input.
///
/// The prefix rule is greedy. With `["Phone", "Phone Number"]` the input
/// `"phone"` resolves to `"Phone"` even if the user meant the longer field;
/// only a complete miss is reported as unresolved.
#[derive(Debug, Clone, Copy, Default)]
pub struct FieldMatcher;

impl FieldMatcher {
    pub fn resolve<'a>(fields: &'a FieldList, user_text: &str) -> Option<&'a str> {
        let needle = user_text.trim().to_lowercase();
        if needle.is_empty() {
            return None;
        }

        fields
            .iter()
            .find(|field| field.to_lowercase() == needle)
            .or_else(|| {
                fields
                    .iter()
                    .find(|field| field.to_lowercase().starts_with(&needle))
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn list(names: &[&str]) -> FieldList {
        FieldList::new(names.iter().map(|s| s.to_string()).collect()).unwrap()
    }

    mod exact_match {
        use super::*;

        #[test]
        fn ignores_case_and_surrounding_whitespace() {
            let fields = list(&["Phone Number"]);
            assert_eq!(
                FieldMatcher::resolve(&fields, " phone number "),
                Some("Phone Number")
            );
        }

        #[test]
        fn exact_match_beats_earlier_prefix_match() {
            let fields = list(&["Age Group", "Age"]);
            assert_eq!(FieldMatcher::resolve(&fields, "AGE"), Some("Age"));
        }
    }

    mod prefix_match {
        use super::*;

        #[test]
        fn abbreviation_resolves_to_field() {
            let fields = list(&["Name", "Phone Number"]);
            assert_eq!(FieldMatcher::resolve(&fields, "ph"), Some("Phone Number"));
        }

        #[test]
        fn first_field_in_list_order_wins() {
            let fields = list(&["Phone", "Phone Number"]);
            assert_eq!(FieldMatcher::resolve(&fields, "phone"), Some("Phone"));

            let fields = list(&["Phone Number", "Phone Extension"]);
            assert_eq!(FieldMatcher::resolve(&fields, "phone"), Some("Phone Number"));
        }
    }

    mod no_match {
        use super::*;

        #[test]
        fn unknown_text_resolves_to_none() {
            let fields = list(&["Name"]);
            assert_eq!(FieldMatcher::resolve(&fields, "xyz"), None);
        }

        #[test]
        fn blank_text_resolves_to_none() {
            let fields = list(&["Name", "Age"]);
            assert_eq!(FieldMatcher::resolve(&fields, "   "), None);
        }

        #[test]
        fn infix_text_does_not_match() {
            let fields = list(&["Phone Number"]);
            assert_eq!(FieldMatcher::resolve(&fields, "number"), None);
        }
    }

    proptest! {
        #[test]
        fn every_field_resolves_to_itself_in_any_case(
            set in proptest::collection::hash_set("[A-Za-z]{1,10}", 1..6),
            pick in 0usize..6,
        ) {
            let names: Vec<String> = set.into_iter().collect();
            let fields = FieldList::new(names.clone()).unwrap();
            let target = &names[pick % names.len()];
            let lowered: Vec<String> = names.iter().map(|n| n.to_lowercase()).collect();
            // Skip lists where another field differs only in case.
            prop_assume!(lowered.iter().filter(|n| **n == target.to_lowercase()).count() == 1);

            let typed = format!("  {}  ", target.to_uppercase());
            prop_assert_eq!(FieldMatcher::resolve(&fields, &typed), Some(target.as_str()));
        }

        #[test]
        fn resolved_field_always_belongs_to_session(
            set in proptest::collection::hash_set("[A-Za-z ]{1,10}", 1..6),
            typed in "[A-Za-z ]{0,6}",
        ) {
            let names: Vec<String> = set.into_iter().filter(|n| !n.trim().is_empty()).collect();
            prop_assume!(!names.is_empty());
            let fields = FieldList::new(names).unwrap();
            if let Some(found) = FieldMatcher::resolve(&fields, &typed) {
                prop_assert!(fields.contains(found));
                prop_assert!(found.to_lowercase().starts_with(&typed.trim().to_lowercase()));
            }
        }
    }
}

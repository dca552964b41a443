//! Property tests for slug derivation

use devevent_core::slug::MAX_SLUG_LEN;
use devevent_core::{slugify, Slug};
use proptest::prelude::*;

proptest! {
    #[test]
    fn slugify_output_is_always_parseable_or_empty(title in ".{0,200}") {
        let slug = slugify(&title);
        if !slug.is_empty() {
            prop_assert!(Slug::parse(&slug).is_ok(), "unparseable slug {:?} from {:?}", slug, title);
        }
    }

    #[test]
    fn slugify_is_bounded(title in "[ -~]{0,400}") {
        prop_assert!(slugify(&title).len() <= MAX_SLUG_LEN);
    }

    #[test]
    fn slugify_is_idempotent(title in "[a-zA-Z0-9 ,.!?-]{1,120}") {
        let once = slugify(&title);
        prop_assert_eq!(slugify(&once), once.clone());
    }

    #[test]
    fn from_title_succeeds_with_any_alphanumeric(word in "[a-zA-Z0-9]{1,20}", noise in "[ !?.,]{0,10}") {
        let title = format!("{noise}{word}{noise}");
        let slug = Slug::from_title(&title).unwrap();
        prop_assert_eq!(slug.as_str(), word.to_ascii_lowercase());
    }
}

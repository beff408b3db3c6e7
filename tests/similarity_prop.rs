//! Property tests for the token-set similarity metric the matchers and the
//! merge refiner both depend on.

use proptest::prelude::*;

use uidrift::matching::similarity::token_set_similarity;

proptest! {
    #[test]
    fn similarity_is_bounded(a in ".{0,80}", b in ".{0,80}") {
        let sim = token_set_similarity(&a, &b);
        prop_assert!((0.0..=1.0).contains(&sim), "out of range: {sim}");
    }

    #[test]
    fn similarity_is_symmetric(a in ".{0,80}", b in ".{0,80}") {
        prop_assert_eq!(token_set_similarity(&a, &b), token_set_similarity(&b, &a));
    }

    #[test]
    fn similarity_is_reflexive(a in ".{0,80}") {
        prop_assert_eq!(token_set_similarity(&a, &a), 1.0);
    }

    #[test]
    fn whitespace_variation_is_ignored(words in proptest::collection::vec("[a-z가-힣]{1,8}", 1..6)) {
        let single = words.join(" ");
        let double = words.join("  ");
        prop_assert_eq!(token_set_similarity(&single, &double), 1.0);
    }

    #[test]
    fn disjoint_ascii_and_hangul_never_match(a in "[a-z]{2,10}", b in "[가-힣]{2,10}") {
        prop_assert_eq!(token_set_similarity(&a, &b), 0.0);
    }
}

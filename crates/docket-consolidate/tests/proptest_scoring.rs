use docket_consolidate::score::{tag_similarity, text_similarity};
use docket_consolidate::{Rules, analyze, find_candidates};
use docket_core::model::{ItemType, Schedule, Status, WorkItem};
use proptest::prelude::*;

fn arb_schedule() -> impl Strategy<Value = Schedule> {
    prop_oneof![Just(Schedule::Now), Just(Schedule::Next), Just(Schedule::Later)]
}

fn arb_type() -> impl Strategy<Value = ItemType> {
    prop_oneof![Just(ItemType::Plan), Just(ItemType::Proposal), Just(ItemType::Decision)]
}

fn arb_status() -> impl Strategy<Value = Status> {
    prop_oneof![
        Just(Status::Pending),
        Just(Status::InProgress),
        Just(Status::Blocked),
        Just(Status::Completed),
    ]
}

fn arb_tags() -> impl Strategy<Value = Vec<String>> {
    prop::collection::vec("[A-Za-z]{1,6}", 0..4)
}

prop_compose! {
    fn arb_item(id: usize)(
        item_type in arb_type(),
        summary in "[a-z ]{0,40}",
        content in "[a-zA-Z0-9 .,]{0,120}",
        technical_tags in arb_tags(),
        schedule in arb_schedule(),
        status in arb_status(),
    ) -> WorkItem {
        let mut item = WorkItem::new(format!("item-{id:02}"), item_type, summary, schedule);
        item.content = content;
        item.technical_tags = technical_tags;
        item.status = status;
        item
    }
}

fn arb_items() -> impl Strategy<Value = Vec<WorkItem>> {
    (0usize..8).prop_flat_map(|n| (0..n).map(arb_item).collect::<Vec<_>>())
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(256))]

    #[test]
    fn text_similarity_is_reflexive(text in "[a-zA-Z ]{0,60}") {
        let rules = Rules::default();
        let tokens = docket_consolidate::normalize::normalize(
            &text,
            &rules.stop_words,
            rules.config.min_token_len,
        );
        let score = text_similarity(&text, &text, &rules);
        if tokens.is_empty() {
            prop_assert!(score.abs() < f64::EPSILON);
        } else {
            prop_assert!((score - 1.0).abs() < f64::EPSILON);
        }
    }

    #[test]
    fn empty_text_never_matches(text in ".{0,60}") {
        let rules = Rules::default();
        prop_assert!(text_similarity("", &text, &rules).abs() < f64::EPSILON);
        prop_assert!(text_similarity(&text, "", &rules).abs() < f64::EPSILON);
    }

    #[test]
    fn text_similarity_is_symmetric_and_bounded(a in ".{0,60}", b in ".{0,60}") {
        let rules = Rules::default();
        let ab = text_similarity(&a, &b, &rules);
        let ba = text_similarity(&b, &a, &rules);
        prop_assert!((0.0..=1.0).contains(&ab));
        prop_assert!((ab - ba).abs() < f64::EPSILON);
    }

    #[test]
    fn tag_case_is_ignored(tags in arb_tags()) {
        let upper: Vec<String> = tags.iter().map(|t| t.to_uppercase()).collect();
        prop_assert!((tag_similarity(&tags, &upper) - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn composite_score_is_bounded(a in arb_item(0), b in arb_item(1)) {
        let candidate = analyze(&a, &b, &Rules::default());
        prop_assert!((0.0..=1.0).contains(&candidate.score));
        for sub in [
            candidate.breakdown.summary,
            candidate.breakdown.tags,
            candidate.breakdown.content,
            candidate.breakdown.schedule,
        ] {
            prop_assert!((0.0..=1.0).contains(&sub));
        }
    }

    #[test]
    fn finder_filters_and_sorts(items in arb_items()) {
        let rules = Rules::default();
        let found = find_candidates(&items, &rules);

        for candidate in &found {
            prop_assert_eq!(candidate.item1.item_type, candidate.item2.item_type);
            prop_assert!(candidate.item1.status != Status::Completed);
            prop_assert!(candidate.item2.status != Status::Completed);
            prop_assert!(candidate.score > rules.config.acceptance_threshold);
        }
        for pair in found.windows(2) {
            prop_assert!(pair[0].score >= pair[1].score);
        }
        prop_assert_eq!(found, find_candidates(&items, &rules));
    }
}

//! Property-based tests for hash and encoding determinism.

use proptest::prelude::*;

use tapes::llm::{ContentBlock, Role};
use tapes::merkle::{canonical, Bucket, Node};

fn arb_role() -> impl Strategy<Value = Role> {
    prop_oneof![
        Just(Role::System),
        Just(Role::User),
        Just(Role::Assistant),
        Just(Role::Tool),
    ]
}

fn arb_content() -> impl Strategy<Value = Vec<ContentBlock>> {
    proptest::collection::vec(any::<String>().prop_map(ContentBlock::text), 0..4)
}

#[test]
fn node_hash_is_a_pure_function_of_parent_and_identity() {
    let mut runner = proptest::test_runner::TestRunner::default();

    runner
        .run(
            &(arb_role(), arb_content(), any::<String>()),
            |(role, content, parent)| {
                let bucket = Bucket::message(role, content);
                let first = canonical::node_hash(&parent, &bucket).unwrap();
                let second = canonical::node_hash(&parent, &bucket).unwrap();
                prop_assert_eq!(&first, &second);
                prop_assert_eq!(first.len(), 64);
                Ok(())
            },
        )
        .unwrap();
}

#[test]
fn different_parents_fork_the_hash() {
    let mut runner = proptest::test_runner::TestRunner::default();

    runner
        .run(
            &(arb_role(), arb_content(), any::<String>(), any::<String>()),
            |(role, content, parent_a, parent_b)| {
                prop_assume!(parent_a != parent_b);
                let bucket = Bucket::message(role, content);
                let a = canonical::node_hash(&parent_a, &bucket).unwrap();
                let b = canonical::node_hash(&parent_b, &bucket).unwrap();
                prop_assert_ne!(a, b);
                Ok(())
            },
        )
        .unwrap();
}

#[test]
fn canonical_encoding_is_stable_through_decode_and_re_encode() {
    let mut runner = proptest::test_runner::TestRunner::default();

    runner
        .run(&(arb_role(), arb_content()), |(role, content)| {
            let bucket = Bucket::message(role, content);
            let first = canonical::canonical_json(&bucket).unwrap();
            let decoded: Bucket = serde_json::from_str(&first).unwrap();
            let second = canonical::canonical_json(&decoded).unwrap();
            prop_assert_eq!(first, second);
            Ok(())
        })
        .unwrap();
}

#[test]
fn reconstructing_a_node_reproduces_its_hash() {
    let mut runner = proptest::test_runner::TestRunner::default();

    runner
        .run(&(arb_role(), arb_content()), |(role, content)| {
            let root = Node::new(Bucket::message(role, content.clone()), None).unwrap();
            let child = Node::new(Bucket::message(role, content), Some(&root)).unwrap();

            prop_assert_eq!(
                &child.hash,
                &canonical::node_hash(&child.parent_hash, &child.bucket).unwrap()
            );
            prop_assert_eq!(&child.parent_hash, &root.hash);
            Ok(())
        })
        .unwrap();
}

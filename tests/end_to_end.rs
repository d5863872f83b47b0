//! End-to-end façade scenarios, covering the concrete examples in §8.

use spgit::item::Item;
use spgit::merge::{MergeOutcome, MergeStrategy};
use spgit::object::signature::Signature;
use spgit::remote::{MemoryRemoteList, RemoteList};
use spgit::repo::Repository;

fn author() -> Signature {
    Signature::new("Jane Doe", "jane@example.com", 1_700_000_000, "+0000")
}

fn remote_with(list_id: &str, ids: &[&str]) -> MemoryRemoteList {
    let remote = MemoryRemoteList::new();
    remote.seed(list_id, ids.iter().map(|id| Item::bare(*id)).collect());
    remote
}

#[test]
fn empty_init_matches_the_concrete_scenario() {
    let dir = tempfile::tempdir().unwrap();
    let repo = Repository::init(dir.path()).unwrap();
    let status = repo.status().unwrap();
    assert_eq!(status.branch, Some("main".to_string()));
    assert!(status.head.is_none());
    assert!(status.staged_item_ids.is_empty());
}

#[test]
fn intersection_merge_keeps_only_shared_items() {
    let dir = tempfile::tempdir().unwrap();
    let repo = Repository::init(dir.path()).unwrap();
    let remote = remote_with("list:1", &["A", "B", "C"]);

    repo.add_all(&remote, "list:1").unwrap();
    repo.commit("main: A B C", author()).unwrap();
    repo.branch("feature").unwrap();

    repo.checkout("feature").unwrap();
    remote.seed("list:1", vec![Item::bare("B"), Item::bare("C"), Item::bare("D")]);
    repo.add_all(&remote, "list:1").unwrap();
    repo.commit("feature: B C D", author()).unwrap();

    repo.checkout("main").unwrap();
    let outcome = repo.merge("feature", MergeStrategy::Intersection).unwrap();
    let new_head = match outcome {
        MergeOutcome::Merged { new_head } => new_head,
        _ => panic!("expected a merge commit"),
    };
    let commit = repo.show(new_head).unwrap();
    assert_eq!(commit.parent_commit_ids.len(), 2);

    let status = repo.status().unwrap();
    assert_eq!(status.staged_item_ids, vec!["B", "C"]);
}

#[test]
fn add_items_selectively_stages_named_identifiers() {
    let dir = tempfile::tempdir().unwrap();
    let repo = Repository::init(dir.path()).unwrap();
    let remote = remote_with("list:1", &["A", "B", "C"]);

    repo.add_items(&remote, "list:1", &["A".to_string(), "C".to_string()]).unwrap();
    let status = repo.status().unwrap();
    assert_eq!(status.staged_item_ids, vec!["A", "C"]);
}

#[test]
fn add_items_leaves_previously_staged_entries_untouched() {
    let dir = tempfile::tempdir().unwrap();
    let repo = Repository::init(dir.path()).unwrap();
    let remote = remote_with("list:1", &["A", "B", "C"]);

    // Stage A and B first, via the unrelated `add .` path.
    repo.add_items(&remote, "list:1", &["A".to_string(), "B".to_string()]).unwrap();
    let status = repo.status().unwrap();
    assert_eq!(status.staged_item_ids, vec!["A", "B"]);

    // Naming only C must add it without dropping the already-staged A and B.
    repo.add_items(&remote, "list:1", &["C".to_string()]).unwrap();
    let status = repo.status().unwrap();
    assert_eq!(status.staged_item_ids, vec!["A", "B", "C"]);

    // Naming an id absent from the remote snapshot removes it and leaves the rest.
    let remote_without_b = remote_with("list:2", &["A", "C"]);
    repo.add_items(&remote_without_b, "list:2", &["B".to_string()]).unwrap();
    let status = repo.status().unwrap();
    assert_eq!(status.staged_item_ids, vec!["A", "C"]);
}

#[test]
fn diff_reports_added_removed_and_reordered_against_head() {
    let dir = tempfile::tempdir().unwrap();
    let repo = Repository::init(dir.path()).unwrap();
    let remote = remote_with("list:1", &["A", "B", "C"]);

    repo.add_all(&remote, "list:1").unwrap();
    repo.commit("base", author()).unwrap();

    remote.seed("list:1", vec![Item::bare("C"), Item::bare("A"), Item::bare("D")]);
    repo.add_all(&remote, "list:1").unwrap();

    let diff = repo.diff().unwrap();
    assert_eq!(diff.removed, vec!["B".to_string()]);
    assert_eq!(diff.added.iter().map(|(id, _, _)| id.as_str()).collect::<Vec<_>>(), vec!["D"]);
    assert_eq!(diff.reordered, vec![("C".to_string(), 2, 0), ("A".to_string(), 0, 1)]);
}

#[test]
fn rebase_replays_topic_commits_onto_main() {
    let dir = tempfile::tempdir().unwrap();
    let repo = Repository::init(dir.path()).unwrap();
    let remote = remote_with("list:1", &["A"]);

    repo.add_all(&remote, "list:1").unwrap();
    repo.commit("base", author()).unwrap();
    repo.branch("topic").unwrap();

    repo.checkout("topic").unwrap();
    remote.seed("list:1", vec![Item::bare("A"), Item::bare("T1")]);
    repo.add_all(&remote, "list:1").unwrap();
    repo.commit("topic adds T1", author()).unwrap();

    repo.checkout("main").unwrap();
    remote.seed("list:1", vec![Item::bare("A"), Item::bare("U1")]);
    repo.add_all(&remote, "list:1").unwrap();
    repo.commit("main adds U1", author()).unwrap();

    repo.checkout("topic").unwrap();
    let new_tip = repo.rebase("main").unwrap();
    let commit = repo.show(new_tip).unwrap();
    let log = repo.log().unwrap();
    assert_eq!(log[0].hash, new_tip);
    assert!(!commit.parent_commit_ids.is_empty());
}

#[test]
fn push_publishes_head_tree_to_the_remote() {
    let dir = tempfile::tempdir().unwrap();
    let repo = Repository::init(dir.path()).unwrap();
    let remote = remote_with("list:1", &["A", "B"]);

    repo.add_all(&remote, "list:1").unwrap();
    repo.commit("base", author()).unwrap();

    let remote_for_push = remote_with("list:2", &[]);
    repo.push(&remote_for_push, "list:2").unwrap();

    let published = remote_for_push.fetch_items("list:2").unwrap();
    assert_eq!(published.iter().map(|i| i.id.as_str()).collect::<Vec<_>>(), vec!["A", "B"]);
}

//! Reference and path checkout against on-disk repositories.

mod common;

use common::TestRepo;
use repolens::engine::{CheckoutError, CheckoutOutcome};

/// `master` and `other` with different README.md contents, on `master`.
fn two_branches() -> TestRepo {
    let fixture = TestRepo::new();
    fixture.commit_file("README.md", "original words\n", "readme");
    fixture.branch("other");
    fixture.commit_file("README.md", "great words\n", "better readme");
    assert_eq!(fixture.head_name(), "refs/heads/master");
    fixture
}

fn read(fixture: &TestRepo, path: &str) -> String {
    std::fs::read_to_string(fixture.file(path)).unwrap()
}

mod existing_refs {
    use super::*;

    #[test]
    fn short_name() {
        let fixture = two_branches();
        let repo = fixture.open();

        assert_eq!(
            repo.checkout_reference("other", false).unwrap(),
            CheckoutOutcome::CheckedOut
        );
        assert_eq!(repo.head().as_deref(), Some("refs/heads/other"));
        assert_eq!(read(&fixture, "README.md"), "original words\n");
    }

    #[test]
    fn long_name() {
        let fixture = two_branches();
        let repo = fixture.open();

        assert!(repo.checkout_reference_ok("refs/heads/other", false));
        assert_eq!(repo.head().as_deref(), Some("refs/heads/other"));
    }

    #[test]
    fn interfering_changes_block_the_switch() {
        let fixture = two_branches();
        let repo = fixture.open();
        assert!(repo.checkout_reference_ok("refs/heads/other", false));

        fixture.write("README.md", "more words\n");
        let err = repo.checkout_reference("refs/heads/master", false).unwrap_err();

        assert!(matches!(err, CheckoutError::Failed { ref refname, .. } if refname == "refs/heads/master"));
        assert_eq!(repo.head().as_deref(), Some("refs/heads/other"));
        assert_eq!(read(&fixture, "README.md"), "more words\n");
    }

    #[test]
    fn unrelated_untracked_file_is_fine() {
        let fixture = two_branches();
        fixture.write("new_file.md", "a new file");
        let repo = fixture.open();

        assert!(repo.checkout_reference_ok("refs/heads/other", false));
        assert_eq!(read(&fixture, "new_file.md"), "a new file");
    }
}

mod missing_refs {
    use super::*;

    #[test]
    fn nothing_happens_without_create() {
        let fixture = two_branches();
        let repo = fixture.open();

        assert!(!repo.checkout_reference_ok("refs/heads/whoop-whoop", false));
        assert!(!repo.checkout_reference_ok("bananas", false));
        assert_eq!(repo.head().as_deref(), Some("refs/heads/master"));
        assert!(fixture.git().find_reference("refs/heads/whoop-whoop").is_err());
    }

    #[test]
    fn create_full_name() {
        let fixture = two_branches();
        let repo = fixture.open();

        let outcome = repo.checkout_reference("refs/heads/whoop-whoop", true).unwrap();
        assert_eq!(
            outcome,
            CheckoutOutcome::CreatedAndCheckedOut {
                branch: "refs/heads/whoop-whoop".into()
            }
        );
        assert_eq!(repo.head().as_deref(), Some("refs/heads/whoop-whoop"));
        assert_eq!(
            repo.reference_target("refs/heads/whoop-whoop"),
            repo.reference_target("refs/heads/master")
        );
    }

    #[test]
    fn second_checkout_reuses_created_branch() {
        let fixture = two_branches();
        let repo = fixture.open();
        let head = repo.reference_target("HEAD");

        assert!(repo.checkout_reference_ok("refs/heads/missing", true));
        assert_eq!(repo.reference_target("refs/heads/missing"), head);
        assert_eq!(
            repo.checkout_reference("refs/heads/missing", false).unwrap(),
            CheckoutOutcome::CheckedOut
        );
        assert_eq!(repo.references().heads.len(), 3);
    }

    #[test]
    fn create_short_name() {
        let fixture = two_branches();
        let repo = fixture.open();

        assert!(repo.checkout_reference_ok("bananas", true));
        assert_eq!(repo.head().as_deref(), Some("refs/heads/bananas"));
        assert_eq!(repo.short_head().as_deref(), Some("bananas"));
    }

    #[test]
    fn created_branch_keeps_local_edits() {
        let fixture = two_branches();
        fixture.write("README.md", "work in progress\n");
        let repo = fixture.open();

        assert!(repo.checkout_reference_ok("wip", true));
        assert_eq!(read(&fixture, "README.md"), "work in progress\n");
    }

    #[test]
    fn malformed_name_creates_nothing() {
        let fixture = two_branches();
        let repo = fixture.open();

        let err = repo.checkout_reference("refs/heads/inv@{id", true).unwrap_err();
        assert!(matches!(err, CheckoutError::InvalidBranchName(_)));
        assert_eq!(repo.head().as_deref(), Some("refs/heads/master"));

        let heads = repo.references().heads;
        assert_eq!(heads, vec!["refs/heads/master", "refs/heads/other"]);
    }
}

mod head_paths {
    use super::*;

    #[test]
    fn restores_one_path() {
        let fixture = TestRepo::new();
        fixture.commit_file("b.txt", "bee\n", "b");
        fixture.write("a.txt", "changing a.txt");
        fixture.write("b.txt", "changing b.txt");
        let repo = fixture.open();

        assert!(repo.checkout_head(Some("a.txt")));
        assert_eq!(read(&fixture, "a.txt"), "first line\n");
        assert_eq!(read(&fixture, "b.txt"), "changing b.txt");
    }

    #[test]
    fn restores_absolute_path() {
        let fixture = TestRepo::new();
        fixture.write("a.txt", "changing a.txt");
        let repo = fixture.open();
        let absolute = fixture.file("a.txt").to_string_lossy().into_owned();

        assert!(repo.checkout_head(Some(&absolute)));
        assert_eq!(read(&fixture, "a.txt"), "first line\n");
    }

    #[test]
    fn whole_tree_when_no_path() {
        let fixture = TestRepo::new();
        fixture.commit_file("b.txt", "bee\n", "b");
        fixture.write("a.txt", "changing a.txt");
        fixture.remove("b.txt");
        let repo = fixture.open();

        assert!(repo.checkout_head(None));
        assert_eq!(read(&fixture, "a.txt"), "first line\n");
        assert_eq!(read(&fixture, "b.txt"), "bee\n");
        assert!(repo.status().is_empty());
    }

    #[test]
    fn matching_is_literal() {
        let fixture = TestRepo::new();
        fixture.write("a.txt", "changing a.txt");
        let repo = fixture.open();

        assert!(repo.checkout_head(Some("*.txt")));
        assert_eq!(read(&fixture, "a.txt"), "changing a.txt");
    }
}

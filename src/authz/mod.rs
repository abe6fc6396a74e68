//! Authorization rules
//!
//! Every permission decision in the application resolves through
//! [`permits`], a single function over `(actor, action)` pairs. Handlers
//! wrap it in a [`Gate`]: an ordered list of checks evaluated before the
//! handler body, short-circuiting on the first failure. A failed check
//! yields a [`Denial`] carrying the redirect target and the flash message
//! shown to the user; authorization failures are never hard errors.
//!
//! Three facts drive every decision:
//! - the actor's superuser flag
//! - whether the actor holds the Collaborator role
//! - ownership, i.e. the resource's author field matches the actor

use crate::models::{Comment, Post, User};

/// An action an actor may attempt, together with the targeted resource.
#[derive(Debug, Clone, Copy)]
pub enum Action<'a> {
    /// Access the post management screens (list own posts, create)
    ManagePosts,
    /// Access the category management screens and mutate categories
    ManageCategories,
    /// Edit a specific post
    EditPost(&'a Post),
    /// Delete a specific post
    DeletePost(&'a Post),
    /// Edit a specific comment
    EditComment(&'a Comment),
    /// Delete a specific comment
    DeleteComment(&'a Comment),
    /// View the account management list
    ManageAccounts,
    /// Delete the targeted account
    DeleteAccount(&'a User),
    /// Change the targeted account's collaborator role
    SetRole(&'a User),
}

/// Resolve whether `actor` may perform `action`.
///
/// This is the only place permission logic lives; list-time annotations and
/// per-request gates both call it, so they cannot diverge.
pub fn permits(actor: &User, action: Action<'_>) -> bool {
    match action {
        Action::ManagePosts | Action::ManageCategories => actor.is_collaborator(),
        // Ownership supersedes the role for mutating a specific post: a
        // collaborator may only touch their own posts.
        Action::EditPost(post) | Action::DeletePost(post) => {
            actor.is_collaborator() && post.author_id == actor.id
        }
        // Explicit OR: the author may edit their own comment regardless of
        // role, and any collaborator may moderate any comment.
        Action::EditComment(comment) | Action::DeleteComment(comment) => {
            comment.author_id == actor.id || actor.is_collaborator()
        }
        Action::ManageAccounts => actor.is_superuser || actor.is_collaborator(),
        Action::DeleteAccount(target) => may_delete_account(actor, target),
        Action::SetRole(target) => actor.is_superuser && target.id != actor.id,
    }
}

/// Account deletion eligibility.
///
/// The precedence of these branches is load-bearing:
/// 1. A superuser may delete any account. Superuser self-deletion is
///    deliberately not blocked here.
/// 2. A requester outside the Collaborator role may delete nobody.
/// 3. A non-super collaborator may not delete themselves, a superuser, or
///    another collaborator; any remaining target (a plain member) is fair
///    game.
fn may_delete_account(requester: &User, target: &User) -> bool {
    if requester.is_superuser {
        return true;
    }
    if !requester.is_collaborator() {
        return false;
    }
    if requester.id == target.id {
        return false;
    }
    if target.is_superuser {
        return false;
    }
    if target.is_collaborator() {
        return false;
    }
    true
}

/// A failed authorization check: where to send the user, and what to tell
/// them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Denial {
    /// Redirect target for the 303 response
    pub redirect: String,
    /// Human-readable flash message
    pub message: String,
}

/// An ordered list of authorization checks.
///
/// Checks are added with [`Gate::require`] and evaluated in order; the
/// first failing check wins and later checks are not consulted.
///
/// ```
/// # use tintero::authz::{Action, Gate};
/// # use tintero::models::User;
/// # use chrono::NaiveDate;
/// # let user = User::new(
/// #     "u".into(), "u@example.com".into(), "h".into(),
/// #     "U".into(), "U".into(), NaiveDate::from_ymd_opt(2000, 1, 1).unwrap(),
/// # );
/// let result = Gate::new(&user)
///     .require(Action::ManagePosts, "/", "You may not manage posts.")
///     .evaluate();
/// assert!(result.is_err());
/// ```
pub struct Gate<'a> {
    actor: &'a User,
    denial: Option<Denial>,
}

impl<'a> Gate<'a> {
    /// Start a gate for the given actor.
    pub fn new(actor: &'a User) -> Self {
        Self {
            actor,
            denial: None,
        }
    }

    /// Add a check. When it fails (and no earlier check failed), the denial
    /// records `redirect` and `message`.
    pub fn require(mut self, action: Action<'_>, redirect: &str, message: &str) -> Self {
        if self.denial.is_none() && !permits(self.actor, action) {
            tracing::info!(
                actor = self.actor.id,
                %redirect,
                "authorization denied: {}",
                message
            );
            self.denial = Some(Denial {
                redirect: redirect.to_string(),
                message: message.to_string(),
            });
        }
        self
    }

    /// Evaluate the gate: `Ok(())` when every check passed, otherwise the
    /// first denial.
    pub fn evaluate(self) -> Result<(), Denial> {
        match self.denial {
            None => Ok(()),
            Some(denial) => Err(denial),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Role;
    use chrono::NaiveDate;
    use proptest::prelude::*;

    fn user(id: i64, role: Role, is_superuser: bool) -> User {
        let mut u = User::new(
            format!("user{}", id),
            format!("user{}@example.com", id),
            "hash".to_string(),
            "Test".to_string(),
            "User".to_string(),
            NaiveDate::from_ymd_opt(1990, 5, 20).unwrap(),
        );
        u.id = id;
        u.role = role;
        u.is_superuser = is_superuser;
        u
    }

    fn member(id: i64) -> User {
        user(id, Role::Member, false)
    }

    fn collaborator(id: i64) -> User {
        user(id, Role::Collaborator, false)
    }

    fn superuser(id: i64) -> User {
        user(id, Role::Member, true)
    }

    fn post(id: i64, author_id: i64) -> Post {
        let mut p = Post::new(author_id, "Title".to_string(), "Body".to_string());
        p.id = id;
        p
    }

    fn comment(id: i64, author_id: i64) -> Comment {
        let mut c = Comment::new(1, author_id, "Body".to_string());
        c.id = id;
        c
    }

    // ------------------------------------------------------------------
    // Post and category gates
    // ------------------------------------------------------------------

    #[test]
    fn test_manage_posts_requires_collaborator_role() {
        assert!(permits(&collaborator(1), Action::ManagePosts));
        assert!(!permits(&member(1), Action::ManagePosts));
        // The superuser flag does not substitute for the role
        assert!(!permits(&superuser(1), Action::ManagePosts));
        assert!(permits(&user(1, Role::Collaborator, true), Action::ManagePosts));
    }

    #[test]
    fn test_manage_categories_requires_collaborator_role() {
        assert!(permits(&collaborator(1), Action::ManageCategories));
        assert!(!permits(&member(1), Action::ManageCategories));
        assert!(!permits(&superuser(1), Action::ManageCategories));
    }

    #[test]
    fn test_post_mutation_requires_ownership() {
        let owner = collaborator(1);
        let other = collaborator(2);
        let p = post(10, 1);

        assert!(permits(&owner, Action::EditPost(&p)));
        assert!(permits(&owner, Action::DeletePost(&p)));
        // Another collaborator holds the role but not ownership
        assert!(!permits(&other, Action::EditPost(&p)));
        assert!(!permits(&other, Action::DeletePost(&p)));
    }

    #[test]
    fn test_post_mutation_requires_role_even_for_owner() {
        // A member who somehow owns a post still lacks the role
        let owner = member(1);
        let p = post(10, 1);
        assert!(!permits(&owner, Action::EditPost(&p)));
        assert!(!permits(&owner, Action::DeletePost(&p)));
    }

    // ------------------------------------------------------------------
    // Comment gate: owner OR collaborator
    // ------------------------------------------------------------------

    #[test]
    fn test_comment_owner_may_edit_regardless_of_role() {
        let author = member(5);
        let c = comment(1, 5);
        assert!(permits(&author, Action::EditComment(&c)));
        assert!(permits(&author, Action::DeleteComment(&c)));
    }

    #[test]
    fn test_collaborator_moderates_any_comment() {
        let moderator = collaborator(9);
        let c = comment(1, 5);
        assert!(permits(&moderator, Action::EditComment(&c)));
        assert!(permits(&moderator, Action::DeleteComment(&c)));
    }

    #[test]
    fn test_unrelated_member_may_not_touch_comment() {
        let stranger = member(9);
        let c = comment(1, 5);
        assert!(!permits(&stranger, Action::EditComment(&c)));
        assert!(!permits(&stranger, Action::DeleteComment(&c)));
    }

    // ------------------------------------------------------------------
    // Account deletion: the 4-branch table
    // ------------------------------------------------------------------

    #[test]
    fn test_account_deletion_decision_table() {
        // (requester, target, expected)
        let cases = [
            // Branch 1: superuser requester short-circuits everything
            (superuser(1), member(2), true),
            (superuser(1), collaborator(2), true),
            (superuser(1), superuser(2), true),
            (superuser(1), user(2, Role::Collaborator, true), true),
            // Superuser self-deletion is not blocked at this layer
            (superuser(1), superuser(1), true),
            // Branch 2: requester without the role may delete nobody
            (member(1), member(2), false),
            (member(1), collaborator(2), false),
            (member(1), superuser(2), false),
            (member(1), member(1), false),
            // Branch 3a: collaborator self-deletion denied
            (collaborator(1), collaborator(1), false),
            // Branch 3b: target superuser denied
            (collaborator(1), superuser(2), false),
            (collaborator(1), user(2, Role::Collaborator, true), false),
            // Branch 3c: target collaborator denied
            (collaborator(1), collaborator(2), false),
            // Branch 3d: plain member target allowed
            (collaborator(1), member(2), true),
            // Superuser-and-collaborator requester still hits branch 1
            (user(1, Role::Collaborator, true), superuser(2), true),
        ];

        for (requester, target, expected) in &cases {
            assert_eq!(
                permits(requester, Action::DeleteAccount(target)),
                *expected,
                "requester {:?}/{} target {:?}/{}",
                requester.role,
                requester.is_superuser,
                target.role,
                target.is_superuser,
            );
        }
    }

    #[test]
    fn test_branch_precedence_superuser_before_self_check() {
        // The self-deletion exclusion applies to non-super collaborators
        // only; the superuser branch wins even for self.
        let boss = user(1, Role::Collaborator, true);
        assert!(permits(&boss, Action::DeleteAccount(&boss)));
    }

    #[test]
    fn test_manage_accounts_super_or_collaborator() {
        assert!(permits(&superuser(1), Action::ManageAccounts));
        assert!(permits(&collaborator(1), Action::ManageAccounts));
        assert!(!permits(&member(1), Action::ManageAccounts));
    }

    #[test]
    fn test_set_role_superuser_only_and_never_self() {
        let boss = superuser(1);
        assert!(permits(&boss, Action::SetRole(&member(2))));
        assert!(!permits(&boss, Action::SetRole(&superuser(1))));
        assert!(!permits(&collaborator(1), Action::SetRole(&member(2))));
    }

    // ------------------------------------------------------------------
    // Gate ordering
    // ------------------------------------------------------------------

    #[test]
    fn test_gate_passes_when_all_checks_pass() {
        let owner = collaborator(1);
        let p = post(10, 1);
        let result = Gate::new(&owner)
            .require(Action::ManagePosts, "/", "no role")
            .require(Action::EditPost(&p), "/posts", "not yours")
            .evaluate();
        assert!(result.is_ok());
    }

    #[test]
    fn test_gate_short_circuits_on_first_failure() {
        // A member fails the role check; the ownership check must not be
        // the one reported.
        let actor = member(2);
        let p = post(10, 1);
        let denial = Gate::new(&actor)
            .require(Action::ManagePosts, "/", "no role")
            .require(Action::EditPost(&p), "/posts", "not yours")
            .evaluate()
            .unwrap_err();
        assert_eq!(denial.redirect, "/");
        assert_eq!(denial.message, "no role");
    }

    #[test]
    fn test_gate_reports_second_check_when_first_passes() {
        let actor = collaborator(2);
        let p = post(10, 1);
        let denial = Gate::new(&actor)
            .require(Action::ManagePosts, "/", "no role")
            .require(Action::EditPost(&p), "/posts", "not yours")
            .evaluate()
            .unwrap_err();
        assert_eq!(denial.redirect, "/posts");
        assert_eq!(denial.message, "not yours");
    }

    // ------------------------------------------------------------------
    // Universal properties
    // ------------------------------------------------------------------

    fn arb_user(id: i64) -> impl Strategy<Value = User> {
        (any::<bool>(), any::<bool>()).prop_map(move |(collab, superu)| {
            let role = if collab { Role::Collaborator } else { Role::Member };
            user(id, role, superu)
        })
    }

    proptest! {
        /// can_edit_comment(actor, comment) == is_owner OR collaborator,
        /// for every combination of role, superuser flag, and ownership.
        #[test]
        fn property_comment_rule_is_owner_or_collaborator(
            actor in arb_user(1),
            owns in any::<bool>(),
        ) {
            let c = comment(1, if owns { 1 } else { 2 });
            let expected = owns || actor.is_collaborator();
            prop_assert_eq!(permits(&actor, Action::EditComment(&c)), expected);
            prop_assert_eq!(permits(&actor, Action::DeleteComment(&c)), expected);
        }

        /// A non-super collaborator can never delete another collaborator,
        /// a superuser, or themselves.
        #[test]
        fn property_collaborator_deletion_exclusions(target in arb_user(2)) {
            let requester = collaborator(1);
            let allowed = permits(&requester, Action::DeleteAccount(&target));
            if target.is_superuser || target.is_collaborator() {
                prop_assert!(!allowed);
            } else {
                prop_assert!(allowed);
            }
            prop_assert!(!permits(&requester, Action::DeleteAccount(&requester)));
        }

        /// The list-time "deletable" annotation and the delete gate share
        /// one code path, so for any pair they agree by construction.
        #[test]
        fn property_annotation_matches_delete_gate(
            requester in arb_user(1),
            target in arb_user(2),
        ) {
            let annotated = permits(&requester, Action::DeleteAccount(&target));
            let gate = Gate::new(&requester)
                .require(Action::DeleteAccount(&target), "/accounts", "denied")
                .evaluate();
            prop_assert_eq!(annotated, gate.is_ok());
        }
    }
}

use std::fmt;

use async_trait::async_trait;
use quire_types::{Context, Page};

use crate::error::{CoreError, CoreResult};

/// Mutations the permission checker is consulted on.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Action {
    EditPage,
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EditPage => write!(f, "edit-page"),
        }
    }
}

/// What a permission check is about. Whole-page writes pass the page itself
/// so policies can look at content before the page first exists.
#[derive(Clone, Copy, Debug)]
pub enum PermissionTarget<'a> {
    Slug(&'a str),
    Page(&'a Page),
}

impl PermissionTarget<'_> {
    pub fn slug(&self) -> &str {
        match self {
            Self::Slug(slug) => slug,
            Self::Page(page) => &page.slug,
        }
    }
}

#[async_trait]
pub trait PermissionChecker: Send + Sync {
    async fn check(&self, context: &Context, action: Action, target: PermissionTarget<'_>) -> CoreResult<bool>;
}

/// Allows everything. Used when no checker is configured.
pub struct AllowAll;

#[async_trait]
impl PermissionChecker for AllowAll {
    async fn check(&self, _context: &Context, _action: Action, _target: PermissionTarget<'_>) -> CoreResult<bool> {
        Ok(true)
    }
}

/// Run `checker` and turn a refusal into [`CoreError::PermissionDenied`].
pub(crate) async fn require(
    checker: &dyn PermissionChecker,
    context: &Context,
    action: Action,
    target: PermissionTarget<'_>,
) -> CoreResult<()> {
    if checker.check(context, action, target).await? {
        Ok(())
    } else {
        tracing::debug!(%action, target = %target.slug(), user = ?context.user, "permission denied");
        Err(CoreError::PermissionDenied {
            action,
            target: target.slug().to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct LoggedInOnly;

    #[async_trait]
    impl PermissionChecker for LoggedInOnly {
        async fn check(&self, context: &Context, _action: Action, _target: PermissionTarget<'_>) -> CoreResult<bool> {
            Ok(context.user.is_some())
        }
    }

    #[tokio::test]
    async fn allow_all_allows() {
        let page = Page::new("/x");
        require(&AllowAll, &Context::anonymous(), Action::EditPage, PermissionTarget::Page(&page))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn refusal_becomes_permission_denied() {
        let err = require(&LoggedInOnly, &Context::anonymous(), Action::EditPage, PermissionTarget::Slug("/x"))
            .await
            .unwrap_err();
        assert!(err.is_permission_denied());
        require(&LoggedInOnly, &Context::user("ada"), Action::EditPage, PermissionTarget::Slug("/x"))
            .await
            .unwrap();
    }

    #[test]
    fn target_slug() {
        let page = Page::new("/about");
        assert_eq!(PermissionTarget::Page(&page).slug(), "/about");
        assert_eq!(PermissionTarget::Slug("global").slug(), "global");
    }
}

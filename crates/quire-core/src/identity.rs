use quire_types::Context;

/// Names the author stamped on versions.
pub trait IdentityAccessor: Send + Sync {
    fn current_author(&self, context: &Context) -> Option<String>;
}

/// Uses the request's user name.
pub struct ContextUser;

impl IdentityAccessor for ContextUser {
    fn current_author(&self, context: &Context) -> Option<String> {
        context.user.clone()
    }
}

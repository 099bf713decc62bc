//! `DataInput`: Request data extraction
//!
//! A `DataInput` pulls one value out of a context (for routing, a
//! [`RequestAttributes`](crate::RequestAttributes)) and hands it to a
//! domain-agnostic [`InputMatcher`](crate::InputMatcher) as [`MatchingData`].

use crate::MatchingData;
use std::fmt::Debug;

/// Extracts data from a context.
///
/// # Thread Safety
///
/// Implementations must be `Send + Sync`: compiled route tables are shared
/// across request-handling threads.
///
/// # Example
///
/// ```
/// use routa::{DataInput, MatchingData};
///
/// #[derive(Debug)]
/// struct Request { tenant: Option<String> }
///
/// #[derive(Debug)]
/// struct TenantInput;
///
/// impl DataInput<Request> for TenantInput {
///     fn get<'a>(&self, ctx: &'a Request) -> MatchingData<'a> {
///         ctx.tenant.as_deref().into()
///     }
/// }
///
/// let req = Request { tenant: Some("acme".into()) };
/// assert_eq!(TenantInput.get(&req), MatchingData::Str("acme"));
/// ```
#[diagnostic::on_unimplemented(
    message = "`{Self}` does not implement `DataInput<{Ctx}>`",
    label = "this type cannot extract data from `{Ctx}`",
    note = "DataInput<Ctx> extracts data from a specific context type, e.g. DataInput<RequestAttributes>"
)]
pub trait DataInput<Ctx>: Send + Sync + Debug {
    /// Extract data from the given context.
    ///
    /// Returns [`MatchingData::None`] if the requested data is not present.
    fn get<'a>(&self, ctx: &'a Ctx) -> MatchingData<'a>;
}

#[diagnostic::do_not_recommend]
impl<Ctx> DataInput<Ctx> for Box<dyn DataInput<Ctx>> {
    fn get<'a>(&self, ctx: &'a Ctx) -> MatchingData<'a> {
        (**self).get(ctx)
    }
}

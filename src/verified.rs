/// A normalized value produced by a guard that accepted its input.
///
/// `Verified<T>` is the `Accepted` half of a [`GuardResult`](crate::GuardResult).
/// It is the only form of a request value that sinks accept: file reads take
/// `&Verified<CanonicalPath>`, outbound fetches take `&Verified<ParsedTarget>`,
/// query building takes `&Verified<Identifier>`.
///
/// # Construction Invariants
///
/// There is no public constructor and no `From<T>`. Construction goes through
/// `new_unchecked`, which is `pub(crate)` and only called by guards after
/// their checks pass.
///
/// # Access
///
/// - [`AsRef::as_ref`]: borrow the normalized value
/// - [`into_inner`](Self::into_inner): consume and take the value
///
/// # Examples
///
/// External callers cannot create `Verified<T>` directly:
///
/// ```compile_fail
/// use input_guard::Verified;
///
/// let verified = Verified::new("price".to_string());
/// ```
///
/// Guards are the only source:
///
/// ```
/// use input_guard::{Guard, IdentifierGuard, IdentifierPolicy, Tainted};
///
/// let policy = IdentifierPolicy::new(["id", "name", "type", "price"]).unwrap();
/// let guard = IdentifierGuard::new(policy);
///
/// let verified = guard.check(Tainted::new("price".to_string())).unwrap();
/// assert_eq!(verified.as_ref().as_str(), "price");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Verified<T> {
    inner: T,
}

impl<T> Verified<T> {
    /// Wraps a value that a guard has already checked.
    ///
    /// Restricted to the crate: performs no validation of its own.
    pub(crate) fn new_unchecked(value: T) -> Self {
        Self { inner: value }
    }

    /// Consumes the wrapper and returns the normalized value.
    pub fn into_inner(self) -> T {
        self.inner
    }
}

impl<T> AsRef<T> for Verified<T> {
    fn as_ref(&self) -> &T {
        &self.inner
    }
}

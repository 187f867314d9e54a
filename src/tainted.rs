use std::fmt;

/// An untrusted request value that has not been through a guard yet.
///
/// `Tainted<T>` is the boundary type for everything a route receives from a
/// client: query parameters, path parameters, the body. The wrapped
/// value cannot be read from outside this crate; the only way forward is a
/// [`Guard`](crate::Guard), which either returns a [`Verified`](crate::Verified)
/// normalized value or a [`Rejection`](crate::Rejection).
///
/// # Security Properties
///
/// - No `Deref`, `AsRef`, `Borrow`, `From<T>` or `Into<T>`
/// - Inner value is only reachable by guard implementations inside the crate
/// - `Debug` shows the wrapper, never the content
///
/// # Examples
///
/// ```
/// use input_guard::Tainted;
///
/// let column = Tainted::new("id; DROP TABLE beers".to_string());
///
/// // Debug output does not reveal the payload
/// assert_eq!(format!("{:?}", column), "Tainted(<untrusted>)");
///
/// // And the value cannot be interpolated anywhere:
/// // let sql = format!("SELECT * FROM beers WHERE {} = $1", column); // Won't compile!
/// ```
// Clone is required: TaintedInputs hands each route its own copy of a stored value.
#[derive(Clone)]
pub struct Tainted<T> {
    // Must stay private. A public field would let raw input reach a sink.
    inner: T,
}

impl<T> Tainted<T> {
    /// Wraps an untrusted value.
    pub fn new(value: T) -> Self {
        Self { inner: value }
    }

    /// Borrows the raw value for inspection by a guard.
    ///
    /// Restricted to the crate. Guards read through this, decide, and then
    /// build their own normalized output; they never hand the borrowed raw
    /// value to a sink.
    pub(crate) fn peek(&self) -> &T {
        &self.inner
    }

    /// Extracts the raw value. Crate-internal, same rules as [`Self::peek`].
    pub(crate) fn into_inner(self) -> T {
        self.inner
    }
}

impl Tainted<String> {
    /// Returns the truncated SHA-256 digest of the raw value.
    ///
    /// This is the only form of the raw input that may appear in logs.
    pub fn digest(&self) -> String {
        crate::logging::input_digest(&self.inner)
    }
}

// Do NOT add Deref, AsRef, Borrow, From<T> or Into<T> for Tainted<T>.

impl<T> fmt::Debug for Tainted<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Tainted(<untrusted>)")
    }
}

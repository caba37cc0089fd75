//! Arguments bound to a pending call at registration time.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Positional and named arguments captured by `register`.
///
/// The values are fixed when the handler is registered; the handler only sees
/// them when the registry is drained.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Args {
    /// Ordered positional arguments.
    #[serde(default)]
    pub positional: Vec<Value>,
    /// Named arguments, keyed by parameter name.
    #[serde(default)]
    pub named: BTreeMap<String, Value>,
}

impl Args {
    /// An empty argument list.
    #[must_use]
    pub fn none() -> Self {
        Self::default()
    }

    /// Append a positional argument.
    #[must_use]
    pub fn arg(mut self, value: impl Into<Value>) -> Self {
        self.positional.push(value.into());
        self
    }

    /// Bind a named argument. A repeated name replaces the earlier value.
    #[must_use]
    pub fn kwarg(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.named.insert(name.into(), value.into());
        self
    }

    /// Positional argument at `index`.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&Value> {
        self.positional.get(index)
    }

    /// Named argument `name`.
    #[must_use]
    pub fn kw(&self, name: &str) -> Option<&Value> {
        self.named.get(name)
    }

    /// Looks up a parameter that may be passed either by position or by name.
    #[must_use]
    pub fn param(&self, index: usize, name: &str) -> Option<&Value> {
        self.get(index).or_else(|| self.kw(name))
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.positional.is_empty() && self.named.is_empty()
    }
}

/// Renders as a call argument list: `1, "a", kw="x"`.
impl fmt::Display for Args {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for value in &self.positional {
            if !first {
                f.write_str(", ")?;
            }
            write!(f, "{value}")?;
            first = false;
        }
        for (name, value) in &self.named {
            if !first {
                f.write_str(", ")?;
            }
            write!(f, "{name}={value}")?;
            first = false;
        }
        Ok(())
    }
}

/// Builds an [`Args`] value: positional values, then `;` and `name = value` pairs.
///
/// ```
/// use exitreg_core::args;
///
/// let bound = args![1, 2; kw = "x"];
/// assert_eq!(bound.positional.len(), 2);
/// assert_eq!(bound.kw("kw"), Some(&serde_json::json!("x")));
/// ```
#[macro_export]
macro_rules! args {
    () => {
        $crate::Args::none()
    };
    ($($pos:expr),* $(,)? $(; $($name:ident = $val:expr),* $(,)?)?) => {{
        #[allow(unused_mut)]
        let mut bound = $crate::Args::none();
        $( bound = bound.arg($pos); )*
        $( $( bound = bound.kwarg(stringify!($name), $val); )* )?
        bound
    }};
}

//! Logging helpers.

use serde::Serialize;
use std::fmt::{self, Debug, Display};

/// Renders a serializable value as YAML inside log messages.
///
/// ```
/// use kanban_board::Pretty;
/// use tracing::debug;
///
/// let updates = vec![("card-a", 0), ("card-b", 1)];
/// debug!("position updates: {}", Pretty(&updates));
/// ```
///
/// Output starts with a newline so multi-line values line up. Falls back to
/// `{:#?}` when YAML serialization fails.
pub struct Pretty<T>(pub T);

impl<T: Serialize + Debug> Pretty<T> {
    fn render(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match serde_yaml_ng::to_string(&self.0) {
            Ok(yaml) => write!(f, "\n{}", yaml),
            Err(_) => write!(f, "\n{:#?}", self.0),
        }
    }
}

impl<T: Serialize + Debug> Display for Pretty<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.render(f)
    }
}

impl<T: Serialize + Debug> Debug for Pretty<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.render(f)
    }
}

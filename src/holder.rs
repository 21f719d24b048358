//! Process-wide container.

use once_cell::sync::Lazy;

use crate::{rule::RuleDefinition, Container};

static GLOBAL: Lazy<Container> = Lazy::new(Container::new);

/// Returns the process-wide container, registering `rules` on it first.
/// Every call returns a handle to the same container.
pub fn obtain<N, D>(rules: impl IntoIterator<Item = (N, D)>) -> Container
where
    N: AsRef<str>,
    D: Into<RuleDefinition>,
{
    GLOBAL.register(rules);
    GLOBAL.clone()
}

//! The `resources` subcommand tree: list, get, pull, push, delete,
//! validate, serve.

pub mod delete;
pub mod get;
pub mod list;
pub mod pull;
pub mod push;
pub mod serve;
pub mod validate;

use grafanactl_selector::{Filters, Selectors};

use crate::error::CliError;
use crate::session::Session;

/// Resolve user-supplied selector strings into `Filters` against a
/// connected session's discovery registry.
pub(crate) async fn resolve_filters(session: &Session, selectors: &[String]) -> Result<Filters, CliError> {
    let selectors = Selectors::parse(selectors).map_err(CliError::from)?;
    let filters = session.registry.make_filters(&selectors).await.map_err(CliError::from)?;
    Ok(filters)
}

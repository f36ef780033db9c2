//! Per-call options accepted by the dynamic client operations.

/// Options accepted by `List`.
#[derive(Debug, Clone, Default)]
pub struct ListOptions {}

/// Options accepted by `Get`/`GetMultiple`.
#[derive(Debug, Clone, Default)]
pub struct GetOptions {}

/// Options accepted by `Create`/`Update`/`Apply`.
#[derive(Debug, Clone, Default)]
pub struct WriteOptions {
    pub dry_run: bool,
}

/// Options accepted by `Delete`.
///
/// `dry_run` is honored entirely client-side: the facade never issues the
/// request, since the server ignores body-encoded options on delete.
#[derive(Debug, Clone, Default)]
pub struct DeleteOptions {
    pub dry_run: bool,
}

pub type Result<T> = std::result::Result<T, Error>;

/// Caller-input violations. The engines never recover or retry; the caller
/// must repair the graph and re-invoke.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    #[error("graph is disconnected: node `{node}` is unreachable from the spanning tree")]
    Disconnected { node: String },

    #[error("node `{node}` has no rank; run `rank` before `position`")]
    MissingRank { node: String },

    #[error("node `{node}` has no order; run an ordering pass before `position`")]
    MissingOrder { node: String },
}

//! State identity trait.
//!
//! Every concrete state kind stored in a machine is keyed by a value of
//! the machine's identity type. Two states with the same identity can
//! never coexist in one registry.

use serde::{Deserialize, Serialize};
use std::fmt::Debug;
use std::hash::Hash;

/// Stable, comparable key for a concrete state kind.
///
/// Usually a field-less enum with one variant per state kind. The identity
/// type also groups a machine with its states: a machine over `I` only
/// accepts states whose `id()` returns an `I`.
///
/// # Required Traits
///
/// - `Copy` + `Eq` + `Hash`: identities are compared by value on every lookup
/// - `Debug`: identities show up in diagnostics
/// - `Serialize` + `Deserialize`: identities appear in [`MachineStatus`](crate::fsm::MachineStatus)
/// - `Send` + `Sync`: machines may be driven from any (single) thread
///
/// # Example
///
/// ```rust
/// use cadence_fsm::core::StateId;
/// use serde::{Deserialize, Serialize};
///
/// #[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
/// enum GuardState {
///     Patrol,
///     Chase,
///     Investigate,
/// }
///
/// impl StateId for GuardState {
///     fn name(&self) -> &str {
///         match self {
///             Self::Patrol => "Patrol",
///             Self::Chase => "Chase",
///             Self::Investigate => "Investigate",
///         }
///     }
/// }
///
/// assert_eq!(GuardState::Chase.name(), "Chase");
/// ```
pub trait StateId:
    Copy + Eq + Hash + Debug + Serialize + for<'de> Deserialize<'de> + Send + Sync + 'static
{
    /// Human readable name used in errors and logs.
    fn name(&self) -> &str;
}

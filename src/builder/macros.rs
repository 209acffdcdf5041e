//! Macros for ergonomic state machine construction.

/// Generate a state identity enum and its `StateId` implementation.
///
/// Each variant's name doubles as the state name used in errors and logs.
///
/// # Example
///
/// ```
/// use cadence_fsm::core::StateId;
/// use cadence_fsm::state_id;
///
/// state_id! {
///     pub enum EnemyState {
///         FollowTask,
///         ChasePlayer,
///         InvestigateLocation,
///     }
/// }
///
/// assert_eq!(EnemyState::ChasePlayer.name(), "ChasePlayer");
/// ```
#[macro_export]
macro_rules! state_id {
    (
        $(#[$meta:meta])*
        $vis:vis enum $name:ident {
            $(
                $(#[$variant_meta:meta])*
                $variant:ident
            ),* $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, serde::Serialize, serde::Deserialize)]
        $vis enum $name {
            $(
                $(#[$variant_meta])*
                $variant
            ),*
        }

        impl $crate::core::StateId for $name {
            fn name(&self) -> &str {
                match self {
                    $(Self::$variant => stringify!($variant)),*
                }
            }
        }
    };
}

//! Which status changes the lifecycle accepts

use serde::{Deserialize, Serialize};

use crate::core::auth::AuthContext;
use crate::core::order::OrderStatus;

/// Transition enforcement, selected by `lifecycle.transition_policy`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransitionPolicy {
    /// Any status to any status
    #[default]
    Lax,

    /// Next forward step, or cancellation, from a non-terminal status
    Adjacent,

    /// `Adjacent` for everyone except admins, who may set anything
    AdminOverride,
}

impl TransitionPolicy {
    /// Setting the current status again is always allowed and is a no-op
    pub fn permits(&self, from: OrderStatus, to: OrderStatus, context: &AuthContext) -> bool {
        if from == to {
            return true;
        }
        match self {
            TransitionPolicy::Lax => true,
            TransitionPolicy::Adjacent => is_adjacent(from, to),
            TransitionPolicy::AdminOverride => context.is_admin() || is_adjacent(from, to),
        }
    }
}

fn is_adjacent(from: OrderStatus, to: OrderStatus) -> bool {
    !from.is_terminal() && (from.next() == Some(to) || to == OrderStatus::Cancelled)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::auth::Identity;
    use OrderStatus::*;

    #[test]
    fn test_lax_allows_jumps_and_reopening() {
        let guest = AuthContext::Guest;
        assert!(TransitionPolicy::Lax.permits(Pending, Completed, &guest));
        assert!(TransitionPolicy::Lax.permits(Cancelled, Pending, &guest));
    }

    #[test]
    fn test_adjacent() {
        let guest = AuthContext::Guest;
        let policy = TransitionPolicy::Adjacent;
        assert!(policy.permits(Pending, Preparing, &guest));
        assert!(policy.permits(Ready, Completed, &guest));
        assert!(policy.permits(Preparing, Cancelled, &guest));
        assert!(!policy.permits(Pending, Completed, &guest));
        assert!(!policy.permits(Completed, Cancelled, &guest));
        assert!(!policy.permits(Cancelled, Pending, &guest));
        assert!(policy.permits(Completed, Completed, &guest));
    }

    #[test]
    fn test_admin_override() {
        let policy = TransitionPolicy::AdminOverride;
        let customer = AuthContext::User(Identity::customer("u1"));
        let admin = AuthContext::User(Identity::admin("a1"));
        assert!(!policy.permits(Pending, Completed, &customer));
        assert!(policy.permits(Pending, Completed, &admin));
        assert!(policy.permits(Completed, Pending, &admin));
    }
}

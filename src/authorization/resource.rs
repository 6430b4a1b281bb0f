use crate::{auth::Principal, models::Restaurant};

/// Operations on an existing restaurant that require a permission decision.
/// New guarded operations are added as variants here.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceOperation {
    Modify,
    Delete,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Allowed,
    Denied,
}

impl Decision {
    pub fn succeeded(self) -> bool {
        self == Decision::Allowed
    }
}

/// evaluate
///
/// A principal may modify or delete a restaurant when they hold the `Admin` role or
/// when they created it. Everything else is denied.
pub fn evaluate(
    principal: &Principal,
    restaurant: &Restaurant,
    operation: ResourceOperation,
) -> Decision {
    let allowed = match operation {
        ResourceOperation::Modify | ResourceOperation::Delete => {
            principal.is_admin() || restaurant.created_by_id == Some(principal.id)
        }
    };

    if allowed {
        Decision::Allowed
    } else {
        Decision::Denied
    }
}

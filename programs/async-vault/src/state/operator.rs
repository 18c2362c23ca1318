use anchor_lang::prelude::*;

/// Grant from `owner` letting `operator` request and claim on its behalf
#[account]
#[derive(Default)]
pub struct OperatorApproval {
    pub vault: Pubkey,     // 32 bytes
    pub owner: Pubkey,     // 32 bytes
    pub operator: Pubkey,  // 32 bytes
    pub approved: bool,    // 1 byte
    pub bump: u8,          // 1 byte
}

impl OperatorApproval {
    /// True when this approval lets `caller` act for `owner`
    pub fn authorizes(&self, owner: &Pubkey, caller: &Pubkey) -> bool {
        self.approved && self.owner == *owner && self.operator == *caller
    }
}

/// Caller may act for `owner` when it is the owner or an approved operator
pub fn is_owner_or_operator(
    owner: &Pubkey,
    caller: &Pubkey,
    approval: Option<&OperatorApproval>,
) -> bool {
    owner == caller || approval.is_some_and(|a| a.authorizes(owner, caller))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_owner_or_operator() {
        let owner = Pubkey::new_unique();
        let operator = Pubkey::new_unique();
        let stranger = Pubkey::new_unique();

        let approval = OperatorApproval {
            owner,
            operator,
            approved: true,
            ..Default::default()
        };

        assert!(is_owner_or_operator(&owner, &owner, None));
        assert!(is_owner_or_operator(&owner, &operator, Some(&approval)));
        assert!(!is_owner_or_operator(&owner, &stranger, Some(&approval)));
        assert!(!is_owner_or_operator(&owner, &operator, None));

        let revoked = OperatorApproval {
            approved: false,
            ..approval
        };
        assert!(!is_owner_or_operator(&owner, &operator, Some(&revoked)));
    }
}

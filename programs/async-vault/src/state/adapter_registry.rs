use anchor_lang::prelude::*;

use crate::constants::{MAX_ADAPTER_CALLS, SELECTOR_LEN};
use crate::errors::VaultError;

/// Instruction selector (Anchor discriminator of the target instruction)
pub type Selector = [u8; SELECTOR_LEN];

/// Authorization registry for hook-produced executions
///
/// Every execution in a hook chain is checked against this list before it is
/// dispatched. Only the admin can add or toggle entries, so a compromised
/// executor cannot route vault funds to arbitrary programs.
#[account]
#[derive(Default)]
pub struct AdapterRegistry {
    /// Vault this registry belongs to
    pub vault: Pubkey,                       // 32 bytes

    /// Allowed (adapter, target, selector) triples
    pub allowed_calls: Vec<AllowedCall>,     // 4 + (n * 73) bytes

    /// Bump seed for PDA
    pub bump: u8,                            // 1 byte
}

/// Individual allowed call entry
#[derive(AnchorSerialize, AnchorDeserialize, Clone, Debug, PartialEq)]
pub struct AllowedCall {
    /// Hook program that produced the execution
    pub adapter: Pubkey,     // 32 bytes

    /// Program the execution invokes
    pub target: Pubkey,      // 32 bytes

    pub selector: Selector,  // 8 bytes

    /// Whether this entry is currently enabled
    pub enabled: bool,       // 1 byte
}

impl AdapterRegistry {
    /// 8 (discriminator) + 32 (vault) + 4 (vec len) + (32 * 73) + 1 (bump)
    pub const SPACE: usize = 8 + 32 + 4 + (MAX_ADAPTER_CALLS * 73) + 1;

    fn find_mut(
        &mut self,
        adapter: &Pubkey,
        target: &Pubkey,
        selector: &Selector,
    ) -> Option<&mut AllowedCall> {
        self.allowed_calls
            .iter_mut()
            .find(|c| c.adapter == *adapter && c.target == *target && c.selector == *selector)
    }

    pub fn is_adapter_selector_allowed(
        &self,
        adapter: &Pubkey,
        target: &Pubkey,
        selector: &Selector,
    ) -> bool {
        self.allowed_calls.iter().any(|c| {
            c.enabled && c.adapter == *adapter && c.target == *target && c.selector == *selector
        })
    }

    /// Fails with `AdapterCallNotAllowed` for a disallowed call
    ///
    /// `_params` is part of the authorization key; entries currently allow
    /// any arguments for a permitted selector.
    pub fn authorize_adapter_call(
        &self,
        adapter: &Pubkey,
        target: &Pubkey,
        selector: &Selector,
        _params: &[u8],
    ) -> Result<()> {
        require!(
            self.is_adapter_selector_allowed(adapter, target, selector),
            VaultError::AdapterCallNotAllowed
        );
        Ok(())
    }

    pub fn add(&mut self, adapter: Pubkey, target: Pubkey, selector: Selector) -> Result<()> {
        require!(
            self.find_mut(&adapter, &target, &selector).is_none(),
            VaultError::AdapterCallAlreadyExists
        );
        require!(
            self.allowed_calls.len() < MAX_ADAPTER_CALLS,
            VaultError::RegistryFull
        );

        self.allowed_calls.push(AllowedCall {
            adapter,
            target,
            selector,
            enabled: true,
        });
        Ok(())
    }

    pub fn toggle(
        &mut self,
        adapter: &Pubkey,
        target: &Pubkey,
        selector: &Selector,
        enabled: bool,
    ) -> Result<()> {
        let call = self
            .find_mut(adapter, target, selector)
            .ok_or(VaultError::AdapterCallNotFound)?;
        call.enabled = enabled;
        Ok(())
    }
}

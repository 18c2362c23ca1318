use anchor_lang::prelude::*;

use crate::{constants::*, errors::*, events::*, state::*};

/// Allow `adapter` to produce executions calling `selector` on `target`
#[derive(Accounts)]
pub struct AddAdapterCall<'info> {
    /// Vault admin - only they can extend the allowed call set
    /// Security: Must be signer and match vault_state.authority
    pub authority: Signer<'info>,

    /// Security: has_one constraint validates authority from state
    #[account(
        seeds = [VAULT_SEED, vault_state.asset_mint.as_ref()],
        bump = vault_state.bump,
        has_one = authority @ VaultError::Unauthorized,
    )]
    pub vault_state: Account<'info, VaultState>,

    #[account(
        mut,
        seeds = [ADAPTER_REGISTRY_SEED, vault_state.key().as_ref()],
        bump = adapter_registry.bump,
    )]
    pub adapter_registry: Account<'info, AdapterRegistry>,
}

pub fn handler(
    ctx: Context<AddAdapterCall>,
    adapter: Pubkey,
    target: Pubkey,
    selector: Selector,
) -> Result<()> {
    // CHECKS + EFFECTS: duplicate and capacity checks live on the registry
    let registry = &mut ctx.accounts.adapter_registry;
    registry.add(adapter, target, selector)?;

    emit!(AdapterCallUpdated {
        vault: registry.vault,
        adapter,
        target,
        selector,
        enabled: true,
        timestamp: Clock::get()?.unix_timestamp,
    });

    Ok(())
}

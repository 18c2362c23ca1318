use anchor_lang::prelude::*;

use crate::{constants::*, errors::*, events::*, state::*};

/// Enable or disable a registered adapter call
#[derive(Accounts)]
pub struct ToggleAdapterCall<'info> {
    pub authority: Signer<'info>,

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
    ctx: Context<ToggleAdapterCall>,
    adapter: Pubkey,
    target: Pubkey,
    selector: Selector,
    enabled: bool,
) -> Result<()> {
    let registry = &mut ctx.accounts.adapter_registry;
    registry.toggle(&adapter, &target, &selector, enabled)?;

    emit!(AdapterCallUpdated {
        vault: registry.vault,
        adapter,
        target,
        selector,
        enabled,
        timestamp: Clock::get()?.unix_timestamp,
    });

    Ok(())
}

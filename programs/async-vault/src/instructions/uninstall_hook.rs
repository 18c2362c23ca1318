use anchor_lang::prelude::*;

use crate::{constants::*, errors::*, events::*, state::*};

#[derive(Accounts)]
pub struct UninstallHook<'info> {
    pub authority: Signer<'info>,

    #[account(
        seeds = [VAULT_SEED, vault_state.asset_mint.as_ref()],
        bump = vault_state.bump,
        has_one = authority @ VaultError::Unauthorized,
    )]
    pub vault_state: Account<'info, VaultState>,

    #[account(
        mut,
        seeds = [HOOK_REGISTRY_SEED, vault_state.key().as_ref()],
        bump = hook_registry.bump,
    )]
    pub hook_registry: Account<'info, HookRegistry>,
}

pub fn handler(ctx: Context<UninstallHook>, hook_id: HookId) -> Result<()> {
    let registry = &mut ctx.accounts.hook_registry;
    let program = registry.uninstall(&hook_id)?;

    emit!(HookUninstalled {
        vault: registry.vault,
        hook_id,
        program,
        timestamp: Clock::get()?.unix_timestamp,
    });

    Ok(())
}

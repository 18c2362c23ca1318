use anchor_lang::prelude::*;

use crate::{constants::*, errors::*, events::*, state::*};

/// Register a hook program under an id
#[derive(Accounts)]
pub struct InstallHook<'info> {
    /// Vault admin - only they can manage hooks
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

/// `has_output` marks hooks implementing `get_output_amount`
pub fn handler(
    ctx: Context<InstallHook>,
    hook_id: HookId,
    program: Pubkey,
    has_output: bool,
) -> Result<()> {
    let registry = &mut ctx.accounts.hook_registry;
    registry.install(hook_id, program, has_output)?;

    emit!(HookInstalled {
        vault: registry.vault,
        hook_id,
        program,
        timestamp: Clock::get()?.unix_timestamp,
    });

    Ok(())
}

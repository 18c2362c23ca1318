use anchor_lang::prelude::*;

use crate::{constants::*, errors::*, events::*, state::*};

/// Grant or revoke the WHITELISTED role (auto-fulfilled requests)
#[derive(Accounts)]
pub struct UpdateWhitelist<'info> {
    pub authority: Signer<'info>,

    #[account(
        seeds = [VAULT_SEED, vault_state.asset_mint.as_ref()],
        bump = vault_state.bump,
        has_one = authority @ VaultError::Unauthorized,
    )]
    pub vault_state: Account<'info, VaultState>,

    #[account(
        mut,
        seeds = [WHITELIST_SEED, vault_state.key().as_ref()],
        bump = whitelist.bump,
    )]
    pub whitelist: Account<'info, DepositorWhitelist>,
}

pub fn handler(ctx: Context<UpdateWhitelist>, depositor: Pubkey, whitelisted: bool) -> Result<()> {
    ctx.accounts.whitelist.set(depositor, whitelisted)?;

    emit!(WhitelistUpdated {
        vault: ctx.accounts.vault_state.key(),
        depositor,
        whitelisted,
        timestamp: Clock::get()?.unix_timestamp,
    });

    Ok(())
}

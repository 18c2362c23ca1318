use anchor_lang::prelude::*;

use crate::{constants::*, errors::*, events::*, state::*};

/// Update the bound applied by immediate settlement (0 disables it)
#[derive(Accounts)]
pub struct SetMaxDeviation<'info> {
    pub authority: Signer<'info>,

    #[account(
        mut,
        seeds = [VAULT_SEED, vault_state.asset_mint.as_ref()],
        bump = vault_state.bump,
        has_one = authority @ VaultError::Unauthorized,
    )]
    pub vault_state: Account<'info, VaultState>,
}

pub fn handler(ctx: Context<SetMaxDeviation>, max_allowed_deviation_bps: u16) -> Result<()> {
    let vault_state = &mut ctx.accounts.vault_state;
    let old_bps = vault_state.max_allowed_deviation_bps;
    vault_state.max_allowed_deviation_bps = max_allowed_deviation_bps;

    emit!(MaxDeviationUpdated {
        vault: vault_state.key(),
        old_bps,
        new_bps: max_allowed_deviation_bps,
    });

    Ok(())
}

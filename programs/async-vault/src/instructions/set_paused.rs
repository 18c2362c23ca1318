use anchor_lang::prelude::*;

use crate::{constants::*, errors::*, events::*, state::*};

/// Pause or unpause every request, fulfil and claim entry point
#[derive(Accounts)]
pub struct SetPaused<'info> {
    /// Emergency admin
    /// Security: has_one constraint validates role from state
    pub emergency_admin: Signer<'info>,

    #[account(
        mut,
        seeds = [VAULT_SEED, vault_state.asset_mint.as_ref()],
        bump = vault_state.bump,
        has_one = emergency_admin @ VaultError::Unauthorized,
    )]
    pub vault_state: Account<'info, VaultState>,
}

pub fn handler(ctx: Context<SetPaused>, paused: bool) -> Result<()> {
    let vault_state = &mut ctx.accounts.vault_state;
    vault_state.paused = paused;

    let vault = vault_state.key();
    let emergency_admin = ctx.accounts.emergency_admin.key();
    let timestamp = Clock::get()?.unix_timestamp;

    if paused {
        emit!(Paused {
            vault,
            emergency_admin,
            timestamp,
        });
    } else {
        emit!(Unpaused {
            vault,
            emergency_admin,
            timestamp,
        });
    }

    msg!("Vault pause state set to: {}", paused);

    Ok(())
}

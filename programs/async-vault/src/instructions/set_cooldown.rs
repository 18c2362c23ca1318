use anchor_lang::prelude::*;

use crate::{constants::*, errors::*, events::*, state::*};

/// Update the wait between proposing and executing a settlement
///
/// Applies to proposals made after the change; a live proposal keeps its
/// `execute_after`.
#[derive(Accounts)]
pub struct SetCooldown<'info> {
    pub authority: Signer<'info>,

    #[account(
        mut,
        seeds = [VAULT_SEED, vault_state.asset_mint.as_ref()],
        bump = vault_state.bump,
        has_one = authority @ VaultError::Unauthorized,
    )]
    pub vault_state: Account<'info, VaultState>,
}

pub fn handler(ctx: Context<SetCooldown>, cooldown_period: i64) -> Result<()> {
    require!(cooldown_period >= 0, VaultError::InvalidCooldown);

    let vault_state = &mut ctx.accounts.vault_state;
    let old_period = vault_state.cooldown_period;
    vault_state.cooldown_period = cooldown_period;

    emit!(CooldownUpdated {
        vault: vault_state.key(),
        old_period,
        new_period: cooldown_period,
    });

    Ok(())
}

use anchor_lang::prelude::*;

use crate::{constants::*, errors::*, events::*, state::*};

/// Hand a role to a new holder
#[derive(Accounts)]
pub struct SetRole<'info> {
    /// Vault admin - only they can reassign roles
    pub authority: Signer<'info>,

    /// Vault state PDA
    /// Security: has_one constraint validates admin from state
    #[account(
        mut,
        seeds = [VAULT_SEED, vault_state.asset_mint.as_ref()],
        bump = vault_state.bump,
        has_one = authority @ VaultError::Unauthorized,
    )]
    pub vault_state: Account<'info, VaultState>,
}

pub fn handler(ctx: Context<SetRole>, role: Role, holder: Pubkey) -> Result<()> {
    let vault_state = &mut ctx.accounts.vault_state;
    let previous = vault_state.role_holder(role);
    vault_state.set_role_holder(role, holder);

    emit!(RoleUpdated {
        vault: vault_state.key(),
        role,
        holder,
        timestamp: Clock::get()?.unix_timestamp,
    });

    msg!("Role {:?} moved from {} to {}", role, previous, holder);

    Ok(())
}

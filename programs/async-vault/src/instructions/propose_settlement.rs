use anchor_lang::prelude::*;

use crate::{constants::*, events::*, state::*};

/// Stage a settlement behind the cooldown; replaces any unexecuted proposal
#[derive(Accounts)]
pub struct ProposeSettlement<'info> {
    pub manager: Signer<'info>,

    #[account(
        mut,
        seeds = [VAULT_SEED, vault_state.asset_mint.as_ref()],
        bump = vault_state.bump,
    )]
    pub vault_state: Account<'info, VaultState>,
}

pub fn handler(
    ctx: Context<ProposeSettlement>,
    total_external_assets: u64,
    merkle_root: [u8; 32],
) -> Result<()> {
    let vault_state = &mut ctx.accounts.vault_state;
    vault_state.check_role(Role::Manager, &ctx.accounts.manager.key())?;
    vault_state.require_settlement_mode(SettlementMode::Proposal)?;

    let now = Clock::get()?.unix_timestamp;
    let execute_after = vault_state.propose_settlement(total_external_assets, merkle_root, now)?;

    emit!(SettlementProposed {
        vault: vault_state.key(),
        total_external_assets,
        merkle_root,
        execute_after,
    });

    Ok(())
}

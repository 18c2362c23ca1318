use anchor_lang::prelude::*;

use crate::{constants::*, events::*, state::*};

/// Apply a proposal whose cooldown has elapsed; callable by anyone
#[derive(Accounts)]
pub struct ExecuteProposal<'info> {
    pub caller: Signer<'info>,

    #[account(
        mut,
        seeds = [VAULT_SEED, vault_state.asset_mint.as_ref()],
        bump = vault_state.bump,
    )]
    pub vault_state: Account<'info, VaultState>,
}

pub fn handler(ctx: Context<ExecuteProposal>) -> Result<()> {
    let vault_state = &mut ctx.accounts.vault_state;
    vault_state.require_settlement_mode(SettlementMode::Proposal)?;

    let previous_total_assets = vault_state.virtual_total_assets;
    let now = Clock::get()?.unix_timestamp;
    let executed = vault_state.execute_proposal(now)?;

    emit!(SettlementExecuted {
        vault: vault_state.key(),
        previous_total_assets,
        total_assets: executed.total_external_assets,
        merkle_root: executed.merkle_root,
        timestamp: now,
    });

    msg!(
        "Settlement proposal executed by {}: {} -> {}",
        ctx.accounts.caller.key(),
        previous_total_assets,
        executed.total_external_assets
    );

    Ok(())
}

use anchor_lang::prelude::*;

use crate::{constants::*, errors::*, events::*, state::*};

/// Guardian veto over a pending settlement proposal
#[derive(Accounts)]
pub struct CancelProposal<'info> {
    pub guardian: Signer<'info>,

    #[account(
        mut,
        seeds = [VAULT_SEED, vault_state.asset_mint.as_ref()],
        bump = vault_state.bump,
        has_one = guardian @ VaultError::Unauthorized,
    )]
    pub vault_state: Account<'info, VaultState>,
}

pub fn handler(ctx: Context<CancelProposal>) -> Result<()> {
    let vault_state = &mut ctx.accounts.vault_state;
    vault_state.require_settlement_mode(SettlementMode::Proposal)?;

    let cancelled = vault_state.cancel_proposal()?;

    emit!(ProposalCancelled {
        vault: vault_state.key(),
        guardian: ctx.accounts.guardian.key(),
        total_external_assets: cancelled.total_external_assets,
        timestamp: Clock::get()?.unix_timestamp,
    });

    Ok(())
}

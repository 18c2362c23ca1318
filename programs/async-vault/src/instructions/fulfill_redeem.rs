use anchor_lang::prelude::*;

use crate::{constants::*, errors::*, events::*, state::*};

/// Move part of a controller's pending redemption to claimable
#[derive(Accounts)]
pub struct FulfillRedeem<'info> {
    pub manager: Signer<'info>,

    #[account(
        seeds = [VAULT_SEED, vault_state.asset_mint.as_ref()],
        bump = vault_state.bump,
        has_one = manager @ VaultError::Unauthorized,
    )]
    pub vault_state: Account<'info, VaultState>,

    #[account(
        mut,
        seeds = [REQUESTS_SEED, vault_state.key().as_ref(), controller_requests.controller.as_ref()],
        bump = controller_requests.bump,
    )]
    pub controller_requests: Account<'info, ControllerRequests>,
}

/// Fails when `shares` exceeds the pending request: every claimable share
/// must already sit in the share escrow for this controller
pub fn handler(ctx: Context<FulfillRedeem>, shares: u64) -> Result<()> {
    let vault_state = &ctx.accounts.vault_state;
    let requests = &mut ctx.accounts.controller_requests;
    let assets = vault_state.process_redeem_fulfillment(requests, shares)?;

    emit!(RedeemFulfilled {
        vault: vault_state.key(),
        controller: requests.controller,
        shares,
        assets,
        timestamp: Clock::get()?.unix_timestamp,
    });

    Ok(())
}

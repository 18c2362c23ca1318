use anchor_lang::prelude::*;

use crate::{constants::*, errors::*, events::*, state::*};

/// Move part of a controller's pending deposit to claimable
///
/// The share amount is fixed here at the current rate; later settlements do
/// not change it.
#[derive(Accounts)]
pub struct FulfillDeposit<'info> {
    /// Security: has_one constraint validates manager from state
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

pub fn handler(ctx: Context<FulfillDeposit>, assets: u64) -> Result<()> {
    let vault_state = &ctx.accounts.vault_state;
    let requests = &mut ctx.accounts.controller_requests;
    let shares = vault_state.process_deposit_fulfillment(requests, assets)?;

    emit!(DepositFulfilled {
        vault: vault_state.key(),
        controller: requests.controller,
        assets,
        shares,
        timestamp: Clock::get()?.unix_timestamp,
    });

    Ok(())
}

use anchor_lang::prelude::*;

use crate::constants::MAX_WHITELISTED;
use crate::errors::VaultError;

/// Depositors holding the WHITELISTED role (auto-fulfilled requests)
#[account]
#[derive(Default)]
pub struct DepositorWhitelist {
    /// Vault this whitelist belongs to
    pub vault: Pubkey,          // 32 bytes

    pub members: Vec<Pubkey>,   // 4 + (n * 32) bytes

    /// Bump seed for PDA
    pub bump: u8,               // 1 byte
}

impl DepositorWhitelist {
    /// 8 (discriminator) + 32 (vault) + 4 (vec len) + (32 * 32) + 1 (bump)
    pub const SPACE: usize = 8 + 32 + 4 + (MAX_WHITELISTED * 32) + 1;

    pub fn is_whitelisted(&self, depositor: &Pubkey) -> bool {
        self.members.contains(depositor)
    }

    /// Adding an existing member or removing a missing one is a no-op
    pub fn set(&mut self, depositor: Pubkey, whitelisted: bool) -> Result<()> {
        if whitelisted {
            if !self.is_whitelisted(&depositor) {
                require!(self.members.len() < MAX_WHITELISTED, VaultError::RegistryFull);
                self.members.push(depositor);
            }
        } else {
            self.members.retain(|m| *m != depositor);
        }
        Ok(())
    }
}

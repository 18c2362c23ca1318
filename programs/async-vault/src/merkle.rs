use anchor_lang::prelude::*;
use sha2::{Digest, Sha256};

use crate::errors::VaultError;

const LEAF_PREFIX: &[u8] = &[0x00];
const NODE_PREFIX: &[u8] = &[0x01];

fn sha256(parts: &[&[u8]]) -> [u8; 32] {
    let mut hasher = Sha256::new();
    for part in parts {
        hasher.update(part);
    }
    let hash = hasher.finalize();
    let mut out = [0u8; 32];
    out.copy_from_slice(&hash);
    out
}

/// Leaf for one `(strategy, value)` pair of the external holdings breakdown
pub fn leaf(strategy: &Pubkey, value: u64) -> [u8; 32] {
    sha256(&[LEAF_PREFIX, strategy.as_ref(), &value.to_le_bytes()])
}

fn node(left: &[u8; 32], right: &[u8; 32]) -> [u8; 32] {
    sha256(&[NODE_PREFIX, left, right])
}

/// Root over `(strategies[i], values[i])` leaves in the given order
///
/// Pairs are hashed left to right; an odd node at the end of a level moves up
/// unchanged. An empty breakdown has the all-zero root.
pub fn compute_merkle_root(strategies: &[Pubkey], values: &[u64]) -> Result<[u8; 32]> {
    require_eq!(strategies.len(), values.len(), VaultError::LengthMismatch);

    let mut level: Vec<[u8; 32]> = strategies
        .iter()
        .zip(values)
        .map(|(strategy, value)| leaf(strategy, *value))
        .collect();

    if level.is_empty() {
        return Ok([0u8; 32]);
    }

    while level.len() > 1 {
        level = level
            .chunks(2)
            .map(|pair| match pair.get(1) {
                Some(right) => node(&pair[0], right),
                None => pair[0],
            })
            .collect();
    }

    Ok(level[0])
}

/// True when the disclosed breakdown hashes to `root`
pub fn validate_total_assets(
    strategies: &[Pubkey],
    values: &[u64],
    root: &[u8; 32],
) -> Result<bool> {
    Ok(compute_merkle_root(strategies, values)? == *root)
}

//! Contract address derivation

use sevm_primitives::Address;

use crate::hash::keccak256;

/// Derive the address of a contract created by `sender`.
///
/// The digest input is the sender's 20 bytes followed by the minimal
/// big-endian encoding of `nonce` (no bytes at all for nonce 0). The address
/// is the low 20 bytes of the Keccak-256 digest.
pub fn create_address(sender: &Address, nonce: u64) -> Address {
    let nonce_bytes = nonce.to_be_bytes();
    let skip = nonce_bytes.iter().take_while(|&&b| b == 0).count();

    let mut preimage = Vec::with_capacity(Address::LEN + 8);
    preimage.extend_from_slice(sender.as_bytes());
    preimage.extend_from_slice(&nonce_bytes[skip..]);

    let digest = keccak256(&preimage);
    let mut out = [0u8; 20];
    out.copy_from_slice(&digest.as_bytes()[12..]);
    Address::from_bytes(out)
}

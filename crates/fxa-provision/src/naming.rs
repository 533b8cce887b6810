//! Deterministic resource names

use crate::graph::ResourceKind;
use sha2::{Digest, Sha256};

/// Length of the generated resource token
pub const TOKEN_LEN: usize = 13;

const BASE32_ALPHABET: &[u8; 32] = b"abcdefghijklmnopqrstuvwxyz234567";

/// 13-character lowercase base-32 token derived from the deployment scope.
///
/// Equal inputs always give the same token, so repeated deployments reuse
/// the same names.
pub fn resource_token(subscription_id: &str, resource_group: &str, environment_name: &str) -> String {
    let mut hasher = Sha256::new();
    for part in [subscription_id, resource_group, environment_name] {
        hasher.update(part.as_bytes());
        // Separator keeps ("ab", "c") and ("a", "bc") apart
        hasher.update([0u8]);
    }
    let digest = hasher.finalize();

    let mut token = String::with_capacity(TOKEN_LEN);
    let mut buffer: u16 = 0;
    let mut bits = 0;
    for byte in digest.iter() {
        buffer = (buffer << 8) | u16::from(*byte);
        bits += 8;
        while bits >= 5 && token.len() < TOKEN_LEN {
            bits -= 5;
            let index = ((buffer >> bits) & 0x1f) as usize;
            token.push(BASE32_ALPHABET[index] as char);
        }
        buffer &= (1 << bits) - 1;
        if token.len() == TOKEN_LEN {
            break;
        }
    }
    token
}

/// `<abbr><token>`, with registry names reduced to alphanumerics
pub fn generated_name(kind: ResourceKind, token: &str) -> String {
    let name = format!("{}{}", kind.abbreviation(), token);
    match kind {
        ResourceKind::ContainerRegistry => alphanumeric(&name),
        _ => name,
    }
}

fn alphanumeric(value: &str) -> String {
    value.chars().filter(char::is_ascii_alphanumeric).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_shape() {
        let token = resource_token("sub-1", "rg-fxa", "dev");
        assert_eq!(token.len(), TOKEN_LEN);
        assert!(
            token
                .bytes()
                .all(|b| b.is_ascii_lowercase() || (b'2'..=b'7').contains(&b))
        );
    }

    #[test]
    fn test_token_is_deterministic() {
        assert_eq!(
            resource_token("sub-1", "rg-fxa", "dev"),
            resource_token("sub-1", "rg-fxa", "dev")
        );
        assert_ne!(
            resource_token("sub-1", "rg-fxa", "dev"),
            resource_token("sub-1", "rg-fxa", "prod")
        );
        assert_ne!(
            resource_token("ab", "c", "dev"),
            resource_token("a", "bc", "dev")
        );
    }

    #[test]
    fn test_registry_name_is_alphanumeric() {
        let name = generated_name(ResourceKind::ContainerRegistry, "abc234def567g");
        assert_eq!(name, "crabc234def567g");

        let identity = generated_name(ResourceKind::ManagedIdentity, "abc234def567g");
        assert_eq!(identity, "id-abc234def567g");
    }
}

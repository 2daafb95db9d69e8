//! Passkey account constants.

/// [COSE ES256 (-7) algorithm](https://www.iana.org/assignments/cose/cose.xhtml#algorithms):
/// P256 (a.k.a secp256r1) over SHA-256.
pub const COSE_ALG_ES256: i64 = -7;

/// Authenticator data flag: user present.
pub const AUTH_DATA_FLAGS_UP: u8 = 1 << 0;

/// Authenticator data flag: user verified.
pub const AUTH_DATA_FLAGS_UV: u8 = 1 << 2;

/// Default chain: Polygon Mumbai.
pub const DEFAULT_CHAIN_ID: u64 = 80001;

/// Default RPC endpoint.
pub const DEFAULT_RPC_ENDPOINT: &str = "http://localhost:8545";

/// Default relying party id.
pub const DEFAULT_RP_ID: &str = "localhost";

/// Default relying party origin.
pub const DEFAULT_ORIGIN: &str = "http://localhost:3000";

/// Default software authenticator keystore file name, relative to the home directory.
pub const DEFAULT_KEYSTORE: &str = ".passkey/keystore.json";

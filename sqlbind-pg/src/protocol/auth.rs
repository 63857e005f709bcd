//! Password authentication: SCRAM-SHA-256 (RFC 5802 / RFC 7677) and the
//! legacy MD5 scheme.
//!
//! The SCRAM client keeps exactly the state the final verification needs:
//! its own nonce, the client-first-bare string, and the server-first message
//! verbatim, because all three are spliced into the AuthMessage.

use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use hmac::{Hmac, Mac};
use md5::Md5;
use rand::{distr::Alphanumeric, Rng};
use sha2::{Digest, Sha256};

type HmacSha256 = Hmac<Sha256>;

const NONCE_LEN: usize = 24;

/// SCRAM-SHA-256 client state machine.
pub struct ScramClient {
    password: String,
    client_nonce: String,
    client_first_bare: String,
    /// Set by [`Self::handle_server_first`], consumed by the final check.
    verification: Option<Verification>,
}

struct Verification {
    salted_password: [u8; 32],
    auth_message: String,
}

impl ScramClient {
    pub fn new(username: &str, password: &str) -> Self {
        let client_nonce: String = rand::rng()
            .sample_iter(Alphanumeric)
            .take(NONCE_LEN)
            .map(char::from)
            .collect();
        let client_first_bare = format!("n={},r={}", username, client_nonce);
        Self {
            password: password.to_string(),
            client_nonce,
            client_first_bare,
            verification: None,
        }
    }

    /// The client-first message: GS2 header (no channel binding) plus the
    /// bare part.
    pub fn client_first_message(&self) -> Vec<u8> {
        format!("n,,{}", self.client_first_bare).into_bytes()
    }

    /// Consume the server-first message and produce the client-final message
    /// (with proof).
    pub fn handle_server_first(&mut self, server_first: &[u8]) -> Result<Vec<u8>, String> {
        let server_first = std::str::from_utf8(server_first)
            .map_err(|_| "server-first message is not UTF-8".to_string())?;

        let mut nonce = None;
        let mut salt = None;
        let mut iterations = None;
        for attr in server_first.split(',') {
            if let Some(v) = attr.strip_prefix("r=") {
                nonce = Some(v);
            } else if let Some(v) = attr.strip_prefix("s=") {
                salt = Some(
                    BASE64
                        .decode(v)
                        .map_err(|_| "salt is not valid base64".to_string())?,
                );
            } else if let Some(v) = attr.strip_prefix("i=") {
                iterations = Some(
                    v.parse::<u32>()
                        .map_err(|_| "iteration count is not a number".to_string())?,
                );
            }
        }
        let nonce = nonce.ok_or("server-first message is missing r=")?;
        let salt = salt.ok_or("server-first message is missing s=")?;
        let iterations = iterations.ok_or("server-first message is missing i=")?;

        if !nonce.starts_with(&self.client_nonce) {
            return Err("server nonce does not extend the client nonce".to_string());
        }

        let mut salted_password = [0u8; 32];
        pbkdf2::pbkdf2_hmac::<Sha256>(
            self.password.as_bytes(),
            &salt,
            iterations,
            &mut salted_password,
        );

        let client_key = hmac_sha256(&salted_password, b"Client Key");
        let stored_key = Sha256::digest(&client_key);

        // c=biws is base64("n,,"), matching the GS2 header we sent
        let client_final_bare = format!("c=biws,r={}", nonce);
        let auth_message = format!(
            "{},{},{}",
            self.client_first_bare, server_first, client_final_bare
        );

        let client_signature = hmac_sha256(&stored_key, auth_message.as_bytes());
        let client_proof: Vec<u8> = client_key
            .iter()
            .zip(client_signature.iter())
            .map(|(k, s)| k ^ s)
            .collect();

        self.verification = Some(Verification {
            salted_password,
            auth_message,
        });

        Ok(format!("{},p={}", client_final_bare, BASE64.encode(client_proof)).into_bytes())
    }

    /// Check the server signature in the server-final message.
    pub fn verify_server_final(&self, server_final: &[u8]) -> Result<(), String> {
        let server_final = std::str::from_utf8(server_final)
            .map_err(|_| "server-final message is not UTF-8".to_string())?;
        let verifier = server_final
            .split(',')
            .find_map(|attr| attr.strip_prefix("v="))
            .ok_or("server-final message is missing v=")?;
        let signature = BASE64
            .decode(verifier)
            .map_err(|_| "server signature is not valid base64".to_string())?;

        let v = self
            .verification
            .as_ref()
            .ok_or("server-final message arrived before server-first")?;
        let server_key = hmac_sha256(&v.salted_password, b"Server Key");
        let expected = hmac_sha256(&server_key, v.auth_message.as_bytes());

        if expected.as_slice() != signature.as_slice() {
            return Err("server signature verification failed".to_string());
        }
        Ok(())
    }
}

fn hmac_sha256(key: &[u8], data: &[u8]) -> Vec<u8> {
    let mut mac = HmacSha256::new_from_slice(key).expect("HMAC accepts any key size");
    mac.update(data);
    mac.finalize().into_bytes().to_vec()
}

/// The MD5 password response: `"md5" + hex(md5(hex(md5(password ‖ user)) ‖ salt))`.
pub fn md5_password(user: &str, password: &str, salt: [u8; 4]) -> String {
    let inner = md5_hex(&[password.as_bytes(), user.as_bytes()]);
    let outer = md5_hex(&[inner.as_bytes(), &salt]);
    format!("md5{}", outer)
}

fn md5_hex(parts: &[&[u8]]) -> String {
    let mut hasher = Md5::new();
    for part in parts {
        hasher.update(part);
    }
    hasher
        .finalize()
        .iter()
        .map(|b| format!("{:02x}", b))
        .collect()
}

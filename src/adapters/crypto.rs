use aes_gcm::aead::{Aead, KeyInit};
use aes_gcm::{Aes256Gcm, Key, Nonce};
use rand::RngCore;

use crate::constants::{IV_LEN, KEY_LEN};
use crate::error::{CodecError, Result};
use crate::matryoshka::SealedPayload;
use crate::ports::CryptoAdapter;

/// AES-256-GCM，每次加密都生成新的一次性 key 与 IV。
///
/// 随机数来自 `rand` 的线程本地 CSPRNG (由操作系统熵源播种)。
#[derive(Debug, Clone, Copy, Default)]
pub struct AesGcmCrypto;

impl CryptoAdapter for AesGcmCrypto {
    fn encrypt(&self, plaintext: &[u8]) -> Result<SealedPayload> {
        let mut key = [0u8; KEY_LEN];
        let mut iv = [0u8; IV_LEN];
        let mut rng = rand::rng();
        rng.fill_bytes(&mut key);
        rng.fill_bytes(&mut iv);

        let cipher = Aes256Gcm::new(Key::<Aes256Gcm>::from_slice(&key));
        let ciphertext = cipher
            .encrypt(Nonce::from_slice(&iv), plaintext)
            .map_err(|_| CodecError::Crypto("Encryption failed.".into()))?;

        Ok(SealedPayload {
            key,
            iv,
            ciphertext,
        })
    }

    fn decrypt(&self, sealed: &SealedPayload) -> Result<Vec<u8>> {
        let cipher = Aes256Gcm::new(Key::<Aes256Gcm>::from_slice(&sealed.key));
        cipher
            .decrypt(Nonce::from_slice(&sealed.iv), sealed.ciphertext.as_slice())
            .map_err(|_| CodecError::crypto())
    }

    fn random_bytes(&self, len: usize) -> Vec<u8> {
        let mut out = vec![0u8; len];
        rand::rng().fill_bytes(&mut out);
        out
    }
}

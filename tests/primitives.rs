//! Round-trips and published vectors for the primitive façade.

use spake2p::{aead, keypair, Error};

// RFC 3610, packet vector #1: AES-128, 13-byte nonce, 8-byte tag.
#[test]
fn aes_ccm_rfc3610_vector_1() {
    let key = hex::decode("c0c1c2c3c4c5c6c7c8c9cacbcccdcecf").unwrap();
    let nonce = hex::decode("00000003020100a0a1a2a3a4a5").unwrap();
    let aad = hex::decode("0001020304050607").unwrap();
    let plaintext =
        hex::decode("08090a0b0c0d0e0f101112131415161718191a1b1c1d1e").unwrap();

    let mut ciphertext = vec![0u8; plaintext.len()];
    let mut tag = [0u8; 8];
    aead::aes_ccm_encrypt(&key, &nonce, &aad, &plaintext, &mut ciphertext, &mut tag).unwrap();

    assert_eq!(
        hex::encode(&ciphertext),
        "588c979a61c663d2f066d0c2c0f989806d5f6b61dac384"
    );
    assert_eq!(hex::encode(tag), "17e8d12cfdf926e0");

    let mut decrypted = vec![0u8; ciphertext.len()];
    aead::aes_ccm_decrypt(&key, &nonce, &aad, &ciphertext, &tag, &mut decrypted).unwrap();
    assert_eq!(decrypted, plaintext);
}

#[test]
fn aes_ccm_round_trip_aes256() {
    let key = [0x42u8; 32];
    let nonce = [0x13u8; 13];
    let aad = b"header";
    let plaintext = b"attack at dawn";

    let mut ciphertext = [0u8; 14];
    let mut tag = [0u8; 16];
    aead::aes_ccm_encrypt(&key, &nonce, aad, plaintext, &mut ciphertext, &mut tag).unwrap();
    assert_ne!(&ciphertext, plaintext);

    let mut decrypted = [0u8; 14];
    aead::aes_ccm_decrypt(&key, &nonce, aad, &ciphertext, &tag, &mut decrypted).unwrap();
    assert_eq!(&decrypted, plaintext);
}

#[test]
fn aes_ccm_tamper_is_detected_and_no_plaintext_leaks() {
    let key = [0x42u8; 16];
    let nonce = [0x13u8; 13];
    let aad = b"header";
    let plaintext = b"attack at dawn";

    let mut ciphertext = [0u8; 14];
    let mut tag = [0u8; 16];
    aead::aes_ccm_encrypt(&key, &nonce, aad, plaintext, &mut ciphertext, &mut tag).unwrap();

    // Flip a ciphertext byte.
    let mut tampered = ciphertext;
    tampered[3] ^= 0x01;
    let mut decrypted = [0xffu8; 14];
    assert_eq!(
        aead::aes_ccm_decrypt(&key, &nonce, aad, &tampered, &tag, &mut decrypted),
        Err(Error::IntegrityCheckFailed)
    );
    assert_eq!(decrypted, [0u8; 14]);

    // Flip an AAD byte.
    let mut decrypted = [0xffu8; 14];
    assert_eq!(
        aead::aes_ccm_decrypt(&key, &nonce, b"headex", &ciphertext, &tag, &mut decrypted),
        Err(Error::IntegrityCheckFailed)
    );
    assert_eq!(decrypted, [0u8; 14]);

    // Flip a tag byte.
    let mut bad_tag = tag;
    bad_tag[0] ^= 0x01;
    let mut decrypted = [0xffu8; 14];
    assert_eq!(
        aead::aes_ccm_decrypt(&key, &nonce, aad, &ciphertext, &bad_tag, &mut decrypted),
        Err(Error::IntegrityCheckFailed)
    );
    assert_eq!(decrypted, [0u8; 14]);
}

#[test]
fn ecdsa_sign_verify_round_trip() {
    let keypair = keypair::P256Keypair::generate().unwrap();
    let mut public_key = [0u8; 65];
    keypair.public_key(&mut public_key).unwrap();

    let msg = b"attestation payload";
    let mut signature = [0u8; 72];
    let len = keypair.sign_msg(msg, &mut signature).unwrap();
    assert!(len <= 72);

    keypair::verify_msg_signature(&public_key, msg, &signature[..len]).unwrap();

    // A different message must not verify.
    assert_eq!(
        keypair::verify_msg_signature(&public_key, b"another payload", &signature[..len]),
        Err(Error::InvalidSignature)
    );

    // A mangled signature is rejected as malformed DER or invalid.
    let mut mangled = signature;
    mangled[4] ^= 0xff;
    assert!(keypair::verify_msg_signature(&public_key, msg, &mangled[..len]).is_err());
}

#[test]
fn ecdh_is_symmetric() {
    let alice = keypair::P256Keypair::generate().unwrap();
    let bob = keypair::P256Keypair::generate().unwrap();

    let mut alice_public = [0u8; 65];
    alice.public_key(&mut alice_public).unwrap();
    let mut bob_public = [0u8; 65];
    bob.public_key(&mut bob_public).unwrap();

    let mut alice_secret = [0u8; 32];
    assert_eq!(alice.derive_secret(&bob_public, &mut alice_secret).unwrap(), 32);
    let mut bob_secret = [0u8; 32];
    assert_eq!(bob.derive_secret(&alice_public, &mut bob_secret).unwrap(), 32);

    assert_eq!(alice_secret, bob_secret);
}

#[test]
fn ecdh_rejects_invalid_peer_key() {
    let keypair = keypair::P256Keypair::generate().unwrap();
    let mut secret = [0u8; 32];

    // Off-curve point
    let mut bad = [0u8; 65];
    bad[0] = 0x04;
    bad[32] = 0x01;
    bad[64] = 0x01;
    assert_eq!(
        keypair.derive_secret(&bad, &mut secret),
        Err(Error::InvalidArgument)
    );

    // SEC1 identity encoding
    assert_eq!(
        keypair.derive_secret(&[0x00], &mut secret),
        Err(Error::InvalidArgument)
    );
}

#[test]
fn keypair_import_round_trip() {
    let keypair = keypair::P256Keypair::generate().unwrap();
    let mut private_key = [0u8; 32];
    keypair.private_key(&mut private_key).unwrap();
    let mut public_key = [0u8; 65];
    keypair.public_key(&mut public_key).unwrap();

    let imported = keypair::P256Keypair::from_private_key(&private_key).unwrap();
    let mut imported_public = [0u8; 65];
    imported.public_key(&mut imported_public).unwrap();
    assert_eq!(public_key, imported_public);

    assert!(keypair::P256Keypair::from_private_key(&[0u8; 32]).is_err());
}

#[test]
fn csr_is_der_and_bounded() {
    let keypair = keypair::P256Keypair::generate().unwrap();
    let mut csr = [0u8; 512];
    let len = keypair.csr(&mut csr).unwrap();
    assert!(len <= 512);
    // DER SEQUENCE header
    assert_eq!(csr[0], 0x30);

    // A short buffer reports the needed length.
    let mut short = [0u8; 16];
    match keypair.csr(&mut short) {
        Err(Error::BufferTooSmall { needed }) => assert_eq!(needed, len),
        other => panic!("unexpected result {:?}", other),
    }
}

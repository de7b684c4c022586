use super::*;
use crate::crypto::PrivateKey;
use crate::token_id::TokenId;

fn sender() -> (PrivateKey, Address) {
    let key = PrivateKey::new_key();
    let addr = key.public_key().address();
    (key, addr)
}

#[test]
fn mint_construction_stamps_data_hash() {
    let (_, addr) = sender();
    let tx = Mint::new(addr, 1_000_000, 1, TokenId::native(), 0, 1, String::new(), String::new())
        .unwrap();
    assert!(!tx.data_hash().is_empty());
    assert_eq!(tx.type_tag(), "mint");
}

#[test]
fn sign_then_verify_round_trip() {
    let (key, addr) = sender();
    let mut tx = Mint::new(addr, 1_000_000, 1, TokenId::native(), 0, 1, String::new(), String::new())
        .unwrap();
    tx.sign(&key).unwrap();
    assert!(tx.verify_signature(&key.public_key()).unwrap());
}

#[test]
fn signature_does_not_verify_under_wrong_key() {
    let (key, addr) = sender();
    let other = PrivateKey::new_key();
    let mut tx = Mint::new(addr, 1_000_000, 1, TokenId::native(), 0, 1, String::new(), String::new())
        .unwrap();
    tx.sign(&key).unwrap();
    assert!(!tx.verify_signature(&other.public_key()).unwrap());
}

#[test]
fn data_hash_detects_tampering() {
    let (_, addr) = sender();
    let mut tx = Mint::new(addr, 1_000_000, 1, TokenId::native(), 0, 1, String::new(), String::new())
        .unwrap();
    assert!(tx.verify_data_hash().unwrap());
    if let Transaction::Mint(m) = &mut tx {
        m.amount = 2_000_000;
    }
    assert!(!tx.verify_data_hash().unwrap());
}

#[test]
fn serialize_deserialize_round_trip_preserves_all_fields() {
    let (key, addr) = sender();
    let params = UtxoParams {
        inputs: vec![InputSpec {
            txid: "abc".into(),
            output_index: 0,
            signature: crate::crypto::Signature::empty(),
        }],
        outputs: vec![OutputSpec {
            encrypted_amount: 500,
            destination_address: addr,
            token_id: TokenId::native(),
        }],
    };
    let mut tx = Transfer::new(addr, params, 3, 42, "prev".into(), "uncle".into()).unwrap();
    tx.sign(&key).unwrap();

    let bytes = tx.canonical_bytes().unwrap();
    let restored = Transaction::deserialize(&bytes).unwrap();

    assert_eq!(tx.data_hash(), restored.data_hash());
    assert_eq!(tx.type_tag(), restored.type_tag());
    assert!(restored.verify_signature(&key.public_key()).unwrap());
}

#[test]
fn escrow_address_is_derived_from_job_id() {
    let (_, addr) = sender();
    let tx = Escrow::new(
        addr,
        UtxoParams::default(),
        1_000_000,
        addr,
        600_000,
        "job-42".into(),
        0,
        1,
        String::new(),
        String::new(),
    )
    .unwrap();
    if let Transaction::Escrow(e) = &tx {
        assert_eq!(e.escrow_address(), Address::escrow_address_for_job("job-42"));
    } else {
        panic!("expected escrow variant");
    }
}

#[test]
fn escrow_release_references_original_hash() {
    let (_, addr) = sender();
    let original = Escrow::new(
        addr,
        UtxoParams::default(),
        1_000_000,
        addr,
        600_000,
        "job-1".into(),
        0,
        1,
        String::new(),
        String::new(),
    )
    .unwrap();

    let release = EscrowRelease::new(
        addr,
        UtxoParams::default(),
        1_000_000,
        addr,
        addr,
        original.data_hash().to_string(),
        1,
        2,
        String::new(),
        String::new(),
    )
    .unwrap();

    if let Transaction::EscrowRelease(r) = &release {
        assert_eq!(r.original_escrow_hash, original.data_hash());
    } else {
        panic!("expected escrow-release variant");
    }
}

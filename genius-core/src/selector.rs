//! Greedy UTXO selection, change computation and signature attachment
//! (spec §4.D).

use crate::account::Utxo;
use crate::crypto::{Address, Signature};
use crate::error::{GeniusError, Result};
use crate::token_id::TokenId;
use crate::transaction::{InputSpec, OutputSpec, UtxoParams};

/// One destination and amount for the multi-destination selector.
#[derive(Clone, Debug)]
pub struct Destination {
    pub address: Address,
    pub amount: u64,
}

/// Selects inputs covering `amount` of `token_id` from `pool`. Each of the
/// first k−1 selected UTXOs is passed through to `destination` in full as
/// its own output; the last selected UTXO covers only whatever remains
/// needed, with any excess returned to `source` as change.
pub fn select_single(
    pool: &[Utxo],
    source: Address,
    amount: u64,
    destination: Address,
    token_id: &TokenId,
    signature: Signature,
) -> Result<UtxoParams> {
    let mut selected: Vec<&Utxo> = Vec::new();
    let mut accumulated: u64 = 0;
    for utxo in pool {
        if utxo.locked || !utxo.token_id.equals(token_id) {
            continue;
        }
        selected.push(utxo);
        accumulated = accumulated.saturating_add(utxo.amount);
        if accumulated >= amount {
            break;
        }
    }

    if accumulated < amount {
        return Err(GeniusError::InsufficientFunds {
            requested: amount,
            available: accumulated,
        });
    }

    let inputs = selected
        .iter()
        .map(|u| InputSpec {
            txid: u.txid.clone(),
            output_index: u.output_index,
            signature: signature.clone(),
        })
        .collect();

    let mut outputs = Vec::new();
    let mut covered: u64 = 0;
    let last = selected.len() - 1;
    for (i, utxo) in selected.iter().enumerate() {
        if i < last {
            outputs.push(OutputSpec {
                encrypted_amount: utxo.amount,
                destination_address: destination,
                token_id: *token_id,
            });
            covered += utxo.amount;
        } else {
            let needed = amount - covered;
            outputs.push(OutputSpec {
                encrypted_amount: needed,
                destination_address: destination,
                token_id: *token_id,
            });
            let change = utxo.amount - needed;
            if change > 0 {
                outputs.push(OutputSpec {
                    encrypted_amount: change,
                    destination_address: source,
                    token_id: *token_id,
                });
            }
        }
    }

    Ok(UtxoParams { inputs, outputs })
}

/// Multi-destination variant: sums the destination amounts, selects
/// exactly as the single-destination algorithm does, emits every
/// destination verbatim, then one change output.
pub fn select_multi(
    pool: &[Utxo],
    source: Address,
    destinations: &[Destination],
    token_id: &TokenId,
    signature: Signature,
) -> Result<UtxoParams> {
    let total: u64 = destinations.iter().map(|d| d.amount).sum();

    let mut selected: Vec<&Utxo> = Vec::new();
    let mut accumulated: u64 = 0;
    for utxo in pool {
        if utxo.locked || !utxo.token_id.equals(token_id) {
            continue;
        }
        selected.push(utxo);
        accumulated = accumulated.saturating_add(utxo.amount);
        if accumulated >= total {
            break;
        }
    }

    if accumulated < total {
        return Err(GeniusError::InsufficientFunds {
            requested: total,
            available: accumulated,
        });
    }

    let inputs = selected
        .iter()
        .map(|u| InputSpec {
            txid: u.txid.clone(),
            output_index: u.output_index,
            signature: signature.clone(),
        })
        .collect();

    let mut outputs: Vec<OutputSpec> = destinations
        .iter()
        .map(|d| OutputSpec {
            encrypted_amount: d.amount,
            destination_address: d.address,
            token_id: *token_id,
        })
        .collect();

    let change = accumulated - total;
    if change > 0 {
        outputs.push(OutputSpec {
            encrypted_amount: change,
            destination_address: source,
            token_id: *token_id,
        });
    }

    Ok(UtxoParams { inputs, outputs })
}

/// Returns a copy of `pool` with every `(txid, output_idx)` named by
/// `params.inputs` marked locked, so a concurrently-running selection
/// can't pick the same outputs before the first selection commits.
pub fn update_utxo_list(pool: &[Utxo], params: &UtxoParams) -> Vec<Utxo> {
    let locked_keys: std::collections::HashSet<(String, u32)> = params
        .inputs
        .iter()
        .map(|i| (i.txid.clone(), i.output_index))
        .collect();

    pool.iter()
        .cloned()
        .map(|mut u| {
            if locked_keys.contains(&(u.txid.clone(), u.output_index)) {
                u.locked = true;
            }
            u
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::PrivateKey;

    fn addr() -> Address {
        PrivateKey::new_key().public_key().address()
    }

    fn utxo(txid: &str, idx: u32, amount: u64) -> Utxo {
        Utxo::new(txid.to_string(), idx, amount, TokenId::native())
    }

    #[test]
    fn selects_enough_inputs_and_emits_change() {
        let pool = vec![utxo("a", 0, 60), utxo("b", 0, 60)];
        let source = addr();
        let dest = addr();
        let params =
            select_single(&pool, source, 100, dest, &TokenId::native(), Signature::empty())
                .unwrap();

        assert_eq!(params.inputs.len(), 2);
        let total_out: u64 = params.outputs.iter().map(|o| o.encrypted_amount).sum();
        assert_eq!(total_out, 120);
        assert!(params
            .outputs
            .iter()
            .any(|o| o.destination_address == source && o.encrypted_amount == 20));
    }

    #[test]
    fn exact_amount_produces_no_change_output() {
        let pool = vec![utxo("a", 0, 100)];
        let source = addr();
        let dest = addr();
        let params =
            select_single(&pool, source, 100, dest, &TokenId::native(), Signature::empty())
                .unwrap();
        assert_eq!(params.outputs.len(), 1);
    }

    #[test]
    fn insufficient_funds_is_reported() {
        let pool = vec![utxo("a", 0, 10)];
        let source = addr();
        let dest = addr();
        let err = select_single(&pool, source, 100, dest, &TokenId::native(), Signature::empty())
            .unwrap_err();
        assert!(matches!(err, GeniusError::InsufficientFunds { .. }));
    }

    #[test]
    fn locked_utxos_are_never_selected() {
        let mut locked = utxo("a", 0, 1000);
        locked.locked = true;
        let pool = vec![locked];
        let source = addr();
        let dest = addr();
        let err = select_single(&pool, source, 10, dest, &TokenId::native(), Signature::empty())
            .unwrap_err();
        assert!(matches!(err, GeniusError::InsufficientFunds { .. }));
    }

    #[test]
    fn mismatched_token_is_invisible_to_selection() {
        let mut other = utxo("a", 0, 1000);
        other.token_id = TokenId::from_bytes(&[1]);
        let pool = vec![other];
        let source = addr();
        let dest = addr();
        let err = select_single(&pool, source, 10, dest, &TokenId::native(), Signature::empty())
            .unwrap_err();
        assert!(matches!(err, GeniusError::InsufficientFunds { .. }));
    }

    #[test]
    fn multi_destination_emits_each_verbatim_plus_change() {
        let pool = vec![utxo("a", 0, 150)];
        let source = addr();
        let d1 = addr();
        let d2 = addr();
        let destinations = vec![
            Destination {
                address: d1,
                amount: 50,
            },
            Destination {
                address: d2,
                amount: 50,
            },
        ];
        let params =
            select_multi(&pool, source, &destinations, &TokenId::native(), Signature::empty())
                .unwrap();
        assert_eq!(params.outputs.len(), 3);
        assert_eq!(
            params
                .outputs
                .iter()
                .find(|o| o.destination_address == source)
                .unwrap()
                .encrypted_amount,
            50
        );
    }

    #[test]
    fn update_utxo_list_locks_selected_inputs_only() {
        let pool = vec![utxo("a", 0, 60), utxo("b", 0, 60)];
        let params = UtxoParams {
            inputs: vec![InputSpec {
                txid: "a".into(),
                output_index: 0,
                signature: Signature::empty(),
            }],
            outputs: vec![],
        };
        let updated = update_utxo_list(&pool, &params);
        assert!(updated.iter().find(|u| u.txid == "a").unwrap().locked);
        assert!(!updated.iter().find(|u| u.txid == "b").unwrap().locked);
    }
}

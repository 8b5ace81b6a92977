//! end-to-end distribution rounds: split, build, expand, recover

use std::collections::HashSet;

use proptest::prelude::*;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha20Rng;

use shroud::shamir::combine;
use shroud::{
    build_trustee_packets, expand_to_anonymity_set, split, AnonymitySet, FieldBackend, Gf16,
    Reconstructor, Secret, Share, SplitOutput, SplitParams,
};

fn params(trustees: usize, at: usize, beta: usize, th: u32) -> SplitParams {
    SplitParams {
        trustees,
        absolute_threshold: at,
        subsecrets: beta,
        leaf_threshold_percent: th,
    }
}

fn round<F: FieldBackend>(
    p: &SplitParams,
    anonymity: usize,
    seed: u64,
) -> (Secret<F>, SplitOutput<F>, AnonymitySet<F>) {
    let mut rng = ChaCha20Rng::seed_from_u64(seed);
    let secret = Secret::<F>::random(&mut rng).unwrap();
    let mut out = split(p, &secret, &mut rng).unwrap();
    let built = build_trustee_packets(&secret, &mut out, &mut rng).unwrap();
    let set = expand_to_anonymity_set(built, anonymity, &mut out.ledger, &mut rng).unwrap();
    (secret, out, set)
}

/// rebuild subsecret `id` from its first `take` leaf shares
fn rebuild_subsecret<F: FieldBackend>(out: &SplitOutput<F>, id: usize, take: usize) -> Share<F> {
    let leaves: Vec<Share<F>> = out
        .leaves
        .iter()
        .filter(|l| l.subsecret == id)
        .take(take)
        .map(|l| l.share.clone())
        .collect();
    Share {
        x: out.scheme.coordinates[id],
        value: combine(&leaves).unwrap(),
    }
}

fn threshold_correctness<F: FieldBackend>(seed: u64) {
    let p = params(6, 3, 5, 60);
    let (secret, out, _) = round::<F>(&p, 6, seed);

    for ids in [[0usize, 1, 2], [0, 2, 4], [1, 3, 4]] {
        let parents: Vec<_> = ids.iter().map(|&id| rebuild_subsecret(&out, id, 3)).collect();
        assert_eq!(combine(&parents).unwrap(), secret.elements());
    }

    // one subsecret short
    let parents: Vec<_> = [0usize, 1].iter().map(|&id| rebuild_subsecret(&out, id, 3)).collect();
    assert_ne!(combine(&parents).unwrap(), secret.elements());

    // a subsecret short of its leaf threshold poisons the result
    let parents = vec![
        rebuild_subsecret(&out, 0, 3),
        rebuild_subsecret(&out, 1, 3),
        rebuild_subsecret(&out, 2, 2),
    ];
    assert_ne!(combine(&parents).unwrap(), secret.elements());
}

#[test]
fn test_threshold_correctness_gf16() {
    threshold_correctness::<Gf16>(101);
}

#[test]
fn test_threshold_correctness_ristretto() {
    threshold_correctness::<shroud::Scalar>(102);
}

#[test]
fn test_short_of_threshold_does_not_track_secret() {
    // the same two of three needed subsecrets, a fresh secret every round
    let p = params(6, 3, 5, 60);
    let mut offsets = HashSet::new();
    for seed in 0..32u64 {
        let (secret, out, _) = round::<Gf16>(&p, 6, 300 + seed);
        let parents: Vec<_> = [0usize, 1].iter().map(|&id| rebuild_subsecret(&out, id, 3)).collect();
        let guess = combine(&parents).unwrap();
        assert_ne!(guess, secret.elements());
        let offset: Vec<u8> = guess
            .iter()
            .zip(secret.elements())
            .flat_map(|(g, s)| g.sub(s).to_bytes())
            .collect();
        offsets.insert(offset);
    }
    // a guess tracking the secret would repeat its offset
    assert!(offsets.len() >= 31, "only {} distinct offsets", offsets.len());
}

#[test]
fn test_ten_trustees_thirty_members() {
    let p = params(10, 2, 4, 50);
    assert_eq!(p.total_shares(), 16);

    let mut rng = ChaCha20Rng::seed_from_u64(103);
    let secret = Secret::<Gf16>::random(&mut rng).unwrap();
    let mut out = split(&p, &secret, &mut rng).unwrap();
    let built = build_trustee_packets(&secret, &mut out, &mut rng).unwrap();
    assert_eq!(built.packets.len(), 10);
    assert_eq!(built.max_slots, 2);
    assert!(built.packets.iter().all(|pk| pk.share_data.len() == 2));

    let set = expand_to_anonymity_set(built, 30, &mut out.ledger, &mut rng).unwrap();
    assert_eq!(set.len(), 30);
    assert!(set.is_uniform());
    assert_eq!(set.index.decoy_count(), 20);

    let sizes: HashSet<usize> = set.packets.iter().map(|pk| pk.to_bytes().len()).collect();
    assert_eq!(sizes.len(), 1);
}

#[test]
fn test_decoys_are_wholly_irrelevant() {
    let (_, _, set) = round::<Gf16>(&params(5, 2, 3, 40), 12, 104);
    for (i, packet) in set.packets.iter().enumerate() {
        let size = set.index.measure(i, packet);
        if set.index.member(i).unwrap().is_decoy() {
            assert_eq!(size.irrelevant, size.total);
            assert_eq!(size.relevant, 0);
        } else {
            assert!(size.relevant > 0);
        }
    }
}

#[test]
fn test_trustees_without_shares_count_as_decoys() {
    // a single leaf share, so nine of ten trustees are dealt nothing
    let (secret, _, set) = round::<Gf16>(&params(10, 1, 1, 100), 12, 108);
    assert_eq!(set.index.decoy_count(), 11);

    let mut holders = 0;
    for (i, packet) in set.packets.iter().enumerate() {
        let slots = set.index.member(i).unwrap();
        let size = set.index.measure(i, packet);
        if slots.shares.is_empty() {
            assert_eq!(size.irrelevant, size.total, "member {i}");
            assert_eq!(size.relevant, 0);
        } else {
            holders += 1;
            assert_eq!(packet.relevant_hashes[0], shroud::packet::secret_digest(&packet.salt, &secret));
        }
    }
    assert_eq!(holders, 1);
}

#[test]
fn test_reconstructor_ristretto() {
    let (secret, out, mut set) = round::<shroud::Scalar>(&params(5, 2, 3, 50), 15, 105);
    let mut rng = ChaCha20Rng::seed_from_u64(106);
    set.packets.shuffle(&mut rng);

    let mut rec = Reconstructor::new(out.scheme.clone()).unwrap();
    let mut got = None;
    for packet in set.packets {
        if let Some(s) = rec.absorb(packet).unwrap() {
            got = Some(s);
            break;
        }
    }
    assert_eq!(got.unwrap(), secret);
}

#[test]
fn test_too_few_trustee_packets_stay_locked() {
    // decoys alone never unlock, both trustees together always do
    let (secret, out, set) = round::<Gf16>(&params(2, 2, 4, 50), 4, 107);
    let mut rec = Reconstructor::new(out.scheme.clone()).unwrap();
    // decoys first
    for packet in set.packets[2..].iter().cloned() {
        assert!(rec.absorb(packet).unwrap().is_none());
    }
    let mut got = None;
    for packet in set.packets[..2].iter().cloned() {
        got = rec.absorb(packet).unwrap();
    }
    assert_eq!(got.unwrap(), secret);
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(24))]

    #[test]
    fn prop_uniform_and_unique(
        trustees in 1usize..8,
        beta in 1usize..6,
        at_frac in 0.0f64..1.0,
        th in 10u32..=100,
        extra in 0usize..10,
        seed in any::<u64>(),
    ) {
        let at = 1 + ((beta - 1) as f64 * at_frac) as usize;
        let p = params(trustees, at, beta, th);
        let (_, out, set) = round::<Gf16>(&p, trustees + extra, seed);

        prop_assert_eq!(set.len(), trustees + extra);
        prop_assert!(set.is_uniform());
        prop_assert_eq!(set.max_slots, p.max_shares_per_trustee());

        let mut seen = HashSet::new();
        for x in &out.scheme.coordinates {
            prop_assert!(seen.insert(*x));
        }
        for packet in &set.packets {
            for share in &packet.share_data {
                prop_assert!(seen.insert(share.x), "coordinate {} reused", share.x);
            }
        }
        prop_assert_eq!(seen.len(), out.ledger.len());
    }
}

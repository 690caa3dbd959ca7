//! JSON import into a tree, then records out to resolver calls and back.

use num_bigint::BigUint;
use serde_json::json;

use enscribe_coin::Coin;
use enscribe_core::bytes::big_uint_at;
use enscribe_core::constants::{SEL_ADDR, SEL_CONTENTHASH, SEL_NAME, SEL_PUBKEY, SEL_TEXT};
use enscribe_record::abi::{encode_call, read_memory, split_call, AbiArg};
use enscribe_record::{Profile, Record, SetterOptions};
use enscribe_tree::Node;

fn build_tree() -> Node {
    let root = Node::new_root(None);
    root.create("raffy.a.b.c.eth")
        .unwrap()
        .import(&json!({
            "name": "nice chonk",
            "$eth": "0x51050ec063d393217B436747617aD1C2285Aeeee",
            "#ipfs": "QmZcH4YvBVVRJtdn4RdbaqgspFU8gH6P9vomDpBVpAL3u4",
            "#pubkey": {"x": 1, "y": 2},
        }))
        .unwrap();
    root.find("eth")
        .unwrap()
        .import(&json!({
            ".":      {"name": "Ether",  "$eth": "0x0000000000000000000000000000000000000000"},
            "slobo":  {"name": "Alex",   "$eth": "0x0000000000000000000000000000000000000001"},
            "darian": {"name": "Darian", "$eth": "0x0000000000000000000000000000000000000002"},
        }))
        .unwrap();
    root
}

/// Answers a getter the way a resolver holding `record` would.
fn answer(record: &Record, call: &[u8]) -> Vec<u8> {
    let (selector, args) = split_call(call).unwrap();
    let bytes: Vec<u8> = match selector {
        SEL_TEXT => {
            let key = std::str::from_utf8(read_memory(args, 32).unwrap()).unwrap();
            record.text(key).unwrap_or_default().as_bytes().to_vec()
        }
        SEL_ADDR => {
            let coin_type = big_uint_at(args, 32).unwrap();
            record.addr(coin_type).unwrap().unwrap_or_default().to_vec()
        }
        SEL_CONTENTHASH => record.chash().map(|c| c.bytes().to_vec()).unwrap_or_default(),
        SEL_PUBKEY => return record.pubkey().map(|p| p.bytes().to_vec()).unwrap_or(vec![0; 64]),
        SEL_NAME => record.name().unwrap_or_default().as_bytes().to_vec(),
        other => panic!("unexpected selector {other:#x}"),
    };
    encode_call(0, &[AbiArg::Bytes(&bytes)]).unwrap()[4..].to_vec()
}

#[test]
fn test_import_shape() {
    let root = build_tree();
    assert_eq!(root.node_count(), 8);
    assert_eq!(
        root.collect(|node, _| node.has_record().then(|| node.name())),
        ["eth", "raffy.a.b.c.eth", "slobo.eth", "darian.eth"]
    );
    let raffy = root.find("raffy.a.b.c.eth").unwrap();
    let record = raffy.record().unwrap();
    assert_eq!(record.len(), 4);
    assert_eq!(record.text("name"), Some("nice chonk"));
}

#[test]
fn test_reverse_nodes() {
    let root = build_tree();
    let rev = root.create("addr.reverse").unwrap();
    root.scan(|node, _| {
        let Some(eth) = node.with_record(|r| r.and_then(|r| r.address(60u32).ok().flatten())) else {
            return;
        };
        let mut record = Record::new();
        record.set_name(Some(node.name()));
        rev.create(&eth.to_phex()[2..]).unwrap().set_record(Some(record));
    });

    let slobo = root
        .find("0000000000000000000000000000000000000001.addr.reverse")
        .unwrap();
    assert_eq!(slobo.record().unwrap().name(), Some("slobo.eth"));
    assert_eq!(slobo.depth(), 3);
    assert_eq!(rev.len(), 4);
}

#[test]
fn test_getters_answer_roundtrip() {
    let root = build_tree();
    for node in root.flat() {
        let Some(record) = node.record() else { continue };
        let calls = Profile::from_record(&record)
            .make_getters(&node.namehash())
            .unwrap();
        let answers: Vec<Vec<u8>> = calls.iter().map(|c| answer(&record, c)).collect();

        let mut decoded = Record::new();
        let outcome = decoded.parse_calls(&calls, &answers).unwrap();
        assert!(outcome.is_ok(), "{}: {:?}", node.name(), outcome.errors);
        assert_eq!(decoded, record, "{}", node.name());
    }
}

#[test]
fn test_setters_for_tree() {
    let root = build_tree();
    let raffy = root.find("raffy.a.b.c.eth").unwrap();
    let record = raffy.record().unwrap();
    let node = raffy.namehash();

    let all = record.make_setters(&SetterOptions::new(node)).unwrap();
    assert_eq!(all.len(), 4);
    assert!(all.iter().all(|c| c[4..36] == node));

    let mut next = record.clone();
    next.set_text("name", Some("bigger chonk".into()));
    let diff = next
        .make_setters(&SetterOptions::new(node).diff(&record))
        .unwrap();
    assert_eq!(diff.len(), 1);
}

#[test]
fn test_json_roundtrip_through_tree() {
    let root = build_tree();
    let json = root.to_json(false).unwrap();

    let copy = Node::new_root(Some("copy"));
    copy.import(&json).unwrap();
    assert_eq!(copy.to_json(false).unwrap(), json);
    assert_eq!(copy.to_json(true).unwrap(), root.to_json(true).unwrap());
    assert_eq!(
        copy.find("eth").unwrap().record().unwrap().addr(Coin::eth()).unwrap(),
        Some(&[0u8; 20][..])
    );
    assert_eq!(
        copy.find("slobo.eth").unwrap().record().unwrap().coin_types().collect::<Vec<_>>(),
        [&BigUint::from(60u32)]
    );
}
